//! Framework Chat
//!
//! Native chat window for a framework AI service. Opens one Socket.IO
//! connection at start-up and releases it when the window closes.

use anyhow::Context as _;
use eframe::egui;
use framework_chat::app::ChatApp;
use framework_chat::config::Config;
use framework_chat::socket::{ConnectionManager, Endpoint};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = Config::from_env();
    info!("Configuration loaded: {:?}", config);

    let endpoint = Endpoint::parse(&config.connection.url, &config.connection.socket_path)
        .context("Invalid FRAMEWORK_URL")?;

    // Network I/O runs here; the UI keeps the main thread
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .thread_name("framework-chat-io")
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;

    let connection = ConnectionManager::open(endpoint, &config.connection, runtime.handle());
    let mut status = connection.status();

    // Configure window options
    let window = config.window.clone();
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(&window.title)
            .with_inner_size([520.0, 640.0])
            .with_min_inner_size([360.0, 480.0]),
        ..Default::default()
    };

    // Run the application; the connection moves into the app and is released with it
    let title = window.title.clone();
    eframe::run_native(
        &title,
        options,
        Box::new(move |cc| Box::new(ChatApp::new(&cc.egui_ctx, connection, window))),
    )
    .map_err(|e| anyhow::anyhow!("Failed to run chat window: {}", e))?;

    // Give the session a moment to write its disconnect before the runtime goes away
    let grace = config.connection.close_grace;
    let closed = runtime.block_on(async {
        tokio::time::timeout(grace, status.wait_for(|s| s.is_terminal()))
            .await
            .is_ok()
    });
    if !closed {
        warn!(grace_ms = grace.as_millis() as u64, "Connection still closing at exit");
    }

    info!("Chat window closed");
    Ok(())
}
