use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use trendcall::config::Config;
use trendcall::services::run_once;
use trendcall::sinks::{AlertSink, LogSink, TelegramSink};
use trendcall::sources::OkxClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "trendcall=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    config.validate()?;
    info!(
        instruments = ?config.instruments,
        reference = ?config.reference_instruments,
        fast_bar = %config.fast_bar,
        daily_bar = %config.daily_bar,
        policy = config.engine.level_policy.name(),
        "Starting trendcall"
    );

    let source = OkxClient::new(&config)?;

    match TelegramSink::from_config(&config)? {
        Some(sink) => serve(&config, &source, &sink).await,
        None => {
            warn!("TELEGRAM_TOKEN or CHAT_ID not set, alerts will be logged only");
            serve(&config, &source, &LogSink).await
        }
    }
}

/// Run once, or poll on the configured interval.
async fn serve<K: AlertSink>(config: &Config, source: &OkxClient, sink: &K) -> anyhow::Result<()> {
    let Some(secs) = config.run_interval_secs else {
        run_once(config, source, sink).await;
        return Ok(());
    };

    info!(interval_secs = secs, "Polling");
    let mut ticker = tokio::time::interval(Duration::from_secs(secs));
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                run_once(config, source, sink).await;
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Shutting down");
                return Ok(());
            }
        }
    }
}
