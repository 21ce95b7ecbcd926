use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use tokio::signal;
use tracing::{error, info};

use realty_api as api;
use api::notifications::{LogNotifier, Notifier, WebhookNotifier};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cfg = api::config::load_config()?;
    api::config::init_tracing(&cfg.log_level, cfg.log_json);

    // Init DB
    let db_pool = api::db::establish_connection_from_app_config(&cfg)
        .await
        .context("failed to connect to the database")?;
    if cfg.auto_migrate {
        api::db::run_migrations(&db_pool).await.map_err(|e| {
            error!("Failed running migrations: {}", e);
            e
        })?;
    }
    let db_arc = Arc::new(db_pool);

    // Init events
    let (event_sender, event_rx) = api::events::EventSender::channel(cfg.event_channel_capacity);

    let notifier: Arc<dyn Notifier> = match cfg.notification_webhook_url.clone() {
        Some(url) => {
            info!(url = %url, "Lease notifications delivered by webhook");
            Arc::new(
                WebhookNotifier::new(url, cfg.notification_webhook_secret.clone())
                    .context("failed to build webhook notifier")?,
            )
        }
        None => {
            info!("Webhook URL not configured; lease notifications are logged");
            Arc::new(LogNotifier)
        }
    };
    tokio::spawn(api::events::process_events(event_rx, notifier));

    let app_state = api::AppState::new(db_arc, cfg.clone(), Arc::new(event_sender));
    let app = api::build_router(app_state);

    // Bind and serve
    let addr: SocketAddr = cfg
        .bind_address()
        .parse()
        .with_context(|| format!("invalid bind address {}", cfg.bind_address()))?;
    info!("realty-api listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("realty-api stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("Shutdown signal received");
}
