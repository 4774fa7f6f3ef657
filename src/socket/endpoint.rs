//! Endpoint address handling
//!
//! The service is configured with its HTTP address. The WebSocket transport
//! lives under the Socket.IO path on the same host.

use crate::error::EndpointError;
use std::fmt;
use url::Url;

/// Engine.IO protocol revision spoken by the client
const ENGINE_IO_VERSION: &str = "4";

/// WebSocket URL of a Socket.IO service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    url: Url,
}

impl Endpoint {
    /// Build the transport URL from a service address and Socket.IO path
    ///
    /// `http` maps to `ws` and `https` to `wss`; `ws`/`wss` are kept as is.
    /// The address must point at the server root.
    pub fn parse(address: &str, socket_path: &str) -> Result<Self, EndpointError> {
        let mut url = Url::parse(address.trim()).map_err(|e| EndpointError::Malformed {
            address: address.to_string(),
            reason: e.to_string(),
        })?;

        let scheme = match url.scheme() {
            "http" | "ws" => "ws",
            "https" | "wss" => "wss",
            other => return Err(EndpointError::UnsupportedScheme(other.to_string())),
        };
        if url.host_str().map_or(true, str::is_empty) {
            return Err(EndpointError::MissingHost(address.to_string()));
        }
        if url.path() != "/" {
            return Err(EndpointError::UnexpectedPath(url.path().to_string()));
        }
        url.set_scheme(scheme)
            .map_err(|_| EndpointError::UnsupportedScheme(url.scheme().to_string()))?;

        let path = if socket_path.starts_with('/') {
            socket_path.to_string()
        } else {
            format!("/{}", socket_path)
        };
        url.set_path(&path);
        url.set_fragment(None);
        url.query_pairs_mut()
            .clear()
            .append_pair("EIO", ENGINE_IO_VERSION)
            .append_pair("transport", "websocket");

        Ok(Self { url })
    }

    /// Transport URL as a string
    pub fn as_str(&self) -> &str {
        self.url.as_str()
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
