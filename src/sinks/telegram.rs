use super::{format_message, AlertSink};
use crate::config::Config;
use crate::error::{AppError, Result};
use crate::types::AlertRecord;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info};

/// Telegram Bot API sink.
#[derive(Clone)]
pub struct TelegramSink {
    client: Client,
    base_url: String,
    token: String,
    chat_id: String,
}

impl TelegramSink {
    pub fn new(base_url: &str, token: &str, chat_id: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
            chat_id: chat_id.to_string(),
        })
    }

    /// Build from configuration. `Ok(None)` when token or chat id is missing.
    pub fn from_config(config: &Config) -> Result<Option<Self>> {
        match (&config.telegram_token, &config.telegram_chat_id) {
            (Some(token), Some(chat_id)) => Self::new(
                &config.telegram_base_url,
                token,
                chat_id,
                Duration::from_secs(config.request_timeout_secs),
            )
            .map(Some),
            _ => Ok(None),
        }
    }

    /// Send a raw text message.
    pub async fn send_text(&self, text: &str) -> Result<()> {
        let url = format!("{}/bot{}/sendMessage", self.base_url, self.token);
        let params = [("chat_id", self.chat_id.as_str()), ("text", text)];

        let response = self.client.post(&url).form(&params).send().await?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Sink(format!(
                "Telegram returned {}: {}",
                status,
                body.chars().take(200).collect::<String>()
            )));
        }

        debug!(chars = text.len(), "Telegram message sent");
        Ok(())
    }
}

impl AlertSink for TelegramSink {
    async fn deliver(&self, alerts: &[AlertRecord]) -> Result<()> {
        if alerts.is_empty() {
            return Ok(());
        }
        self.send_text(&format_message(alerts)).await?;
        info!(count = alerts.len(), "Delivered alerts to Telegram");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AlertEventType, Direction, FlowSummary, TrendBias};
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn sink_for(server: &MockServer) -> TelegramSink {
        TelegramSink::new(&server.uri(), "123:abc", "42", Duration::from_secs(5)).unwrap()
    }

    fn alert() -> AlertRecord {
        AlertRecord {
            instrument: "ETH-USDT".to_string(),
            event_type: AlertEventType::TrendChange,
            direction: Some(Direction::Down),
            high_type: None,
            low_type: None,
            close: 2500.0,
            stop: Some(2600.0),
            take_profits: vec![2400.0, 2300.0],
            flow: FlowSummary::default(),
            volume_ratio: None,
            daily_bias: TrendBias::Neutral,
            strength: None,
            regime_suppressed: false,
        }
    }

    #[test]
    fn test_from_config_requires_credentials() {
        let mut config = Config {
            telegram_token: Some("t".into()),
            ..Config::default()
        };
        assert!(TelegramSink::from_config(&config).unwrap().is_none());

        config.telegram_chat_id = Some("1".into());
        assert!(TelegramSink::from_config(&config).unwrap().is_some());
    }

    #[tokio::test]
    async fn test_deliver_posts_form() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/bot123:abc/sendMessage"))
            .and(body_string_contains("chat_id=42"))
            .and(body_string_contains("ETH+SHORT"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": true})))
            .expect(1)
            .mount(&server)
            .await;

        sink_for(&server).deliver(&[alert()]).await.unwrap();
    }

    #[tokio::test]
    async fn test_empty_run_sends_nothing() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        sink_for(&server).deliver(&[]).await.unwrap();
    }

    #[tokio::test]
    async fn test_rejected_message_is_sink_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_string("Unauthorized"))
            .mount(&server)
            .await;

        let err = sink_for(&server).deliver(&[alert()]).await.unwrap_err();
        assert!(matches!(err, AppError::Sink(_)));
    }
}
