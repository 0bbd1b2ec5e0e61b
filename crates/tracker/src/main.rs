use std::time::Duration;

use verdict_common::config::AppConfig;
use verdict_notifier::TelegramNotifier;
use verdict_tracker::client::PracticumClient;
use verdict_tracker::poller::ReviewPoller;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "verdict_tracker=info,verdict_notifier=info".into()),
        )
        .json()
        .init();

    tracing::info!("Verdict tracker starting...");

    // Load configuration; missing credentials are the only fatal startup condition
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Required configuration is missing, shutting down");
            return Err(e.into());
        }
    };

    let timeout = Duration::from_secs(config.http_timeout_secs);
    let source = PracticumClient::new(&config.practicum_endpoint, &config.practicum_token, timeout)?;
    let notifier = TelegramNotifier::new(&config.telegram_api_url, &config.telegram_token, timeout)?;

    let mut poller = ReviewPoller::new(
        source,
        notifier,
        config.telegram_chat_id.clone(),
        Duration::from_secs(config.retry_interval_secs),
    );
    if let Some(from_date) = config.from_date {
        poller = poller.with_cursor(from_date);
    }

    tracing::info!(
        endpoint = %config.practicum_endpoint,
        chat_id = %config.telegram_chat_id,
        "Starting review poller"
    );

    // Run with graceful shutdown on Ctrl+C
    tokio::select! {
        result = poller.run() => {
            if let Err(e) = result {
                tracing::error!(error = %e, "Review poller exited with error");
                return Err(e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Received shutdown signal, stopping gracefully...");
        }
    }

    tracing::info!("Verdict tracker stopped.");
    Ok(())
}
