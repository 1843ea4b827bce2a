//! Flux Timer - A floating countdown timer daemon
//!
//! This is the main entry point for the flux-timer application.

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

use flux_timer::{
    api::create_router,
    config::Config,
    services::{check_notifier_available, NotificationMode, PresetStore},
    state::AppState,
    tasks::{notifier_task, ticker_task},
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("flux_timer={},tower_http=info", config.log_level()))
        .init();

    info!("Starting flux-timer server v{}", env!("CARGO_PKG_VERSION"));

    let settings = match config.timer_settings() {
        Ok(settings) => settings,
        Err(e) => {
            error!("Invalid snap configuration: {}", e);
            std::process::exit(1);
        }
    };
    info!(
        "Configuration: host={}, port={}, snooze={:?}, notification={:?}, banner_timeout={:?}",
        config.host, config.port, settings.snooze_options, settings.notification, settings.banner_timeout
    );

    // System notifications are best effort; a missing notifier only loses banners
    if settings.notification == NotificationMode::System {
        if let Err(e) = check_notifier_available(settings.notify_command.as_deref()).await {
            warn!("{}", e);
        }
    }

    let preset_store = match config.presets_path() {
        Some(path) => {
            info!("Presets stored at {}", path.display());
            PresetStore::new(path)
        }
        None => {
            warn!("No data directory found, presets will not be saved");
            PresetStore::in_memory()
        }
    };

    // Create application state
    let state = Arc::new(AppState::new(
        config.port,
        config.host.clone(),
        settings,
        preset_store,
    ));

    // Start the countdown clock and the completion notifier
    tokio::spawn(ticker_task(Arc::clone(&state)));
    tokio::spawn(notifier_task(Arc::clone(&state)));

    // Create HTTP router with all endpoints
    let app = create_router(state);

    // Bind to the specified address
    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  GET/POST /timers            - List or start timers");
    info!("  DELETE   /timers/:id        - Stop a timer");
    info!("  POST     /timers/:id/snooze - Snooze a timer");
    info!("  POST     /timers/:id/dismiss - Dismiss a finished timer");
    info!("  *        /drag/...          - Time-selection capsule");
    info!("  *        /presets/...       - Favorite durations");
    info!("  GET      /events            - Server-sent timer events");
    info!("  GET      /status            - Daemon status");
    info!("  GET      /health            - Health check");

    // Setup graceful shutdown
    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                error!("Server error: {}", e);
            }
        }
        _ = shutdown_signal() => {
            info!("Shutdown signal received");
        }
    }

    info!("Server shutdown complete");
    Ok(())
}
