pub mod calendar;
pub mod config;
pub mod notifications;
pub mod store;
pub mod web;

use std::sync::Arc;

use tracing::{info, warn};

use calendar::CalendarService;
use config::Configuration;
use notifications::mailer::Mailer;
use notifications::scheduler;
use store::TaskStore;
use web::AppState;

pub async fn run_hub() -> anyhow::Result<()> {
    // Load configuration
    let config = Configuration::create()?;

    info!(
        port = config.listen_port,
        host = %config.listen_host,
        timezone = %config.timezone.name(),
        tasks_path = %config.tasks_path.display(),
        "starting hub"
    );

    // Open the authoritative task store
    let store = Arc::new(TaskStore::open(&config.tasks_path)?);

    // Calendar mirror (optional, disabled without credentials)
    let calendar = Arc::new(CalendarService::new(
        config.calendar.clone(),
        config.timezone,
        config.default_event_duration_min,
    ));
    if !calendar.is_configured() {
        warn!("calendar credentials incomplete; mirror disabled");
    }

    // Mail channel (optional, disabled without credentials)
    let mailer = Arc::new(Mailer::new(config.mail.clone()));
    if !mailer.is_configured() {
        warn!("mail credentials incomplete; daily summaries disabled");
    }

    // Build AppState for HTTP routes
    let app_state = AppState {
        store: store.clone(),
        calendar,
        mailer: mailer.clone(),
        timezone: config.timezone,
        cors_origins: config.cors_origins.clone(),
    };
    let app = web::build_router(app_state);

    // Start the recurring daily summary trigger
    scheduler::spawn(
        store,
        mailer,
        config.timezone,
        config.daily_summary_time,
    );

    // Bind and serve
    let addr = format!("{}:{}", config.listen_host, config.listen_port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(addr = %addr, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("hub stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("shutdown signal received");
}
