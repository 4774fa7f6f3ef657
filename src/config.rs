//! Application configuration
//!
//! Start-up configuration read from environment variables with sensible
//! defaults. Read once in `main`; nothing reloads it.

use std::env;
use std::time::Duration;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Connection to the framework AI service
    pub connection: ConnectionConfig,
    /// Window and widget presentation
    pub window: WindowConfig,
}

/// Connection configuration
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    /// Service address, e.g. `http://localhost:3000`
    pub url: String,
    /// Socket.IO path on the service
    pub socket_path: String,
    /// Socket.IO namespace to join
    pub namespace: String,
    /// Bound on connecting plus the namespace handshake
    pub connect_timeout: Duration,
    /// How long the app waits at exit for the close handshake
    pub close_grace: Duration,
}

/// Window configuration
#[derive(Debug, Clone)]
pub struct WindowConfig {
    /// Window title, also shown as the heading
    pub title: String,
    /// Label of the auxiliary identifier field
    pub id_label: String,
    /// Height of the scrollable history, in points
    pub history_height: f32,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:3000".to_string(),
            socket_path: "/socket.io/".to_string(),
            namespace: "/".to_string(),
            connect_timeout: Duration::from_secs(20),
            close_grace: Duration::from_millis(500),
        }
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "ChatGPT".to_string(),
            id_label: "SkinX ID".to_string(),
            history_height: 400.0,
        }
    }
}

impl Config {
    /// Load configuration from environment variables with defaults
    pub fn from_env() -> Self {
        let connection = ConnectionConfig::default();
        let window = WindowConfig::default();

        Self {
            connection: ConnectionConfig {
                url: env::var("FRAMEWORK_URL").unwrap_or(connection.url),
                socket_path: env::var("FRAMEWORK_SOCKET_PATH").unwrap_or(connection.socket_path),
                namespace: env::var("FRAMEWORK_NAMESPACE").unwrap_or(connection.namespace),
                connect_timeout: env::var("FRAMEWORK_CONNECT_TIMEOUT_SECS")
                    .ok()
                    .and_then(|t| t.parse().ok())
                    .map(Duration::from_secs)
                    .unwrap_or(connection.connect_timeout),
                close_grace: env::var("FRAMEWORK_CLOSE_GRACE_MS")
                    .ok()
                    .and_then(|t| t.parse().ok())
                    .map(Duration::from_millis)
                    .unwrap_or(connection.close_grace),
            },
            window: WindowConfig {
                title: env::var("CHAT_WINDOW_TITLE").unwrap_or(window.title),
                id_label: env::var("CHAT_ID_LABEL").unwrap_or(window.id_label),
                history_height: env::var("CHAT_HISTORY_HEIGHT")
                    .ok()
                    .and_then(|h| h.parse().ok())
                    .filter(|h: &f32| h.is_finite() && *h > 0.0)
                    .unwrap_or(window.history_height),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const VARS: [&str; 8] = [
        "FRAMEWORK_URL",
        "FRAMEWORK_SOCKET_PATH",
        "FRAMEWORK_NAMESPACE",
        "FRAMEWORK_CONNECT_TIMEOUT_SECS",
        "FRAMEWORK_CLOSE_GRACE_MS",
        "CHAT_WINDOW_TITLE",
        "CHAT_ID_LABEL",
        "CHAT_HISTORY_HEIGHT",
    ];

    fn clear_env() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    #[test]
    #[serial]
    fn test_defaults() {
        clear_env();
        let config = Config::from_env();

        assert_eq!(config.connection.url, "http://localhost:3000");
        assert_eq!(config.connection.socket_path, "/socket.io/");
        assert_eq!(config.connection.namespace, "/");
        assert_eq!(config.connection.connect_timeout, Duration::from_secs(20));
        assert_eq!(config.connection.close_grace, Duration::from_millis(500));
        assert_eq!(config.window.title, "ChatGPT");
        assert_eq!(config.window.id_label, "SkinX ID");
        assert_eq!(config.window.history_height, 400.0);
    }

    #[test]
    #[serial]
    fn test_overrides() {
        clear_env();
        env::set_var("FRAMEWORK_URL", "https://framework.example:8443");
        env::set_var("FRAMEWORK_NAMESPACE", "/chat");
        env::set_var("FRAMEWORK_CONNECT_TIMEOUT_SECS", "5");
        env::set_var("CHAT_ID_LABEL", "Customer ID");
        env::set_var("CHAT_HISTORY_HEIGHT", "250");

        let config = Config::from_env();
        clear_env();

        assert_eq!(config.connection.url, "https://framework.example:8443");
        assert_eq!(config.connection.namespace, "/chat");
        assert_eq!(config.connection.connect_timeout, Duration::from_secs(5));
        assert_eq!(config.window.id_label, "Customer ID");
        assert_eq!(config.window.history_height, 250.0);
    }

    #[test]
    #[serial]
    fn test_unparseable_numbers_fall_back() {
        clear_env();
        env::set_var("FRAMEWORK_CONNECT_TIMEOUT_SECS", "soon");
        env::set_var("FRAMEWORK_CLOSE_GRACE_MS", "-1");
        env::set_var("CHAT_HISTORY_HEIGHT", "-20");

        let config = Config::from_env();
        clear_env();

        assert_eq!(config.connection.connect_timeout, Duration::from_secs(20));
        assert_eq!(config.connection.close_grace, Duration::from_millis(500));
        assert_eq!(config.window.history_height, 400.0);
    }
}
