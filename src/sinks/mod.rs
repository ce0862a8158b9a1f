//! Alert delivery.

pub mod telegram;

pub use telegram::TelegramSink;

use crate::error::Result;
use crate::types::{AlertEventType, AlertRecord};
use tracing::info;

const HEADER: &str = "CONFIRMED TREND SIGNAL";

/// Receiver of the alert records produced by a run.
#[allow(async_fn_in_trait)]
pub trait AlertSink {
    async fn deliver(&self, alerts: &[AlertRecord]) -> Result<()>;
}

/// Sink that writes the formatted message to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl AlertSink for LogSink {
    async fn deliver(&self, alerts: &[AlertRecord]) -> Result<()> {
        if alerts.is_empty() {
            return Ok(());
        }
        info!("\n{}", format_message(alerts));
        Ok(())
    }
}

/// Render a run's alerts as one plain-text message.
pub fn format_message(alerts: &[AlertRecord]) -> String {
    let blocks: Vec<String> = alerts.iter().map(format_alert).collect();
    format!("{}\n\n{}", HEADER, blocks.join("\n"))
}

/// Render a single alert block.
pub fn format_alert(alert: &AlertRecord) -> String {
    let mut lines = Vec::new();

    let title = match alert.direction {
        Some(direction) => format!("{} {}", alert.base_asset(), direction.side()),
        None => format!("{} NO SIGNAL", alert.base_asset()),
    };
    lines.push(match alert.event_type {
        AlertEventType::TrendChange => title,
        AlertEventType::ReEntry => format!("{} (re-entry)", title),
        AlertEventType::DailySummary => format!("{} (daily summary)", title),
    });

    lines.push(format!(
        "Structure: {} / {}",
        alert.high_type.map(|h| h.label()).unwrap_or("-"),
        alert.low_type.map(|l| l.label()).unwrap_or("-"),
    ));
    lines.push(format!("Entry: {}", format_price(alert.close)));
    if let Some(stop) = alert.stop {
        lines.push(format!("SL: {}", format_price(stop)));
    }
    for (i, tp) in alert.take_profits.iter().enumerate() {
        lines.push(format!("TP{}: {}", i + 1, format_price(*tp)));
    }
    lines.push(format!(
        "Flow: {} (net {:+.0})",
        alert.flow.category.label(),
        alert.flow.net
    ));
    if let Some(ratio) = alert.volume_ratio {
        lines.push(format!("Volume: {:.2}x avg", ratio));
    }
    lines.push(format!("Daily: {}", alert.daily_bias));
    if let Some(strength) = alert.strength {
        lines.push(format!("Strength: {}", strength.label()));
    }
    if alert.regime_suppressed {
        lines.push("Longs suppressed: majors bearish".to_string());
    }

    lines.join("\n") + "\n"
}

/// Format a price with precision suited to its magnitude.
fn format_price(price: f64) -> String {
    let abs = price.abs();
    if abs >= 100.0 {
        format!("{:.2}", price)
    } else if abs >= 1.0 {
        format!("{:.4}", price)
    } else {
        format!("{:.6}", price)
    }
}
