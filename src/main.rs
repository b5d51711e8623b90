use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::EnvFilter;

use frontdesk::config::AppConfig;
use frontdesk::db;
use frontdesk::services::notify::log::LogNotifier;
use frontdesk::services::notify::smtp::SmtpNotifier;
use frontdesk::services::notify::CheckinNotifier;
use frontdesk::services::sessions;
use frontdesk::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::from_env();

    let conn = db::init_db(&config.database_url)?;

    let notifier: Arc<dyn CheckinNotifier> = if config.smtp_configured() {
        tracing::info!("sending check-in emails via SMTP ({}:{})", config.smtp_host, config.smtp_port);
        Arc::new(SmtpNotifier::new(
            config.smtp_host.clone(),
            config.smtp_port,
            config.smtp_username.clone(),
            config.smtp_password.clone(),
            config.smtp_from_email.clone(),
            config.smtp_from_name.clone(),
        ))
    } else {
        tracing::warn!("SMTP not configured, check-in emails will only be logged");
        Arc::new(LogNotifier)
    };

    let state = Arc::new(AppState::new(conn, config.clone(), notifier));

    spawn_session_sweep(Arc::clone(&state), config.session_sweep_interval_secs);

    let app = frontdesk::app(state);

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn spawn_session_sweep(state: Arc<AppState>, interval_secs: u64) {
    if interval_secs == 0 {
        return;
    }
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_secs(interval_secs));
        loop {
            ticker.tick().await;
            let result = state
                .conn()
                .and_then(|conn| sessions::sweep_expired(&conn, chrono::Utc::now().naive_utc()));
            if let Err(e) = result {
                tracing::error!(error = %e, "session sweep failed");
            }
        }
    });
}
