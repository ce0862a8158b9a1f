use super::{CandleSource, TradeSource};
use crate::config::Config;
use crate::error::{AppError, Result};
use crate::types::{Candle, Series, Timeframe, Trade, TradeSide};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

/// OKX response envelope.
#[derive(Debug, Deserialize)]
struct OkxResponse<T> {
    code: String,
    #[serde(default)]
    msg: String,
    #[serde(default = "Vec::new")]
    data: Vec<T>,
}

/// Candle row: `[ts, o, h, l, c, vol, volCcy, volCcyQuote, confirm]`, all strings.
type OkxCandleRow = Vec<String>;

#[derive(Debug, Deserialize)]
struct OkxTrade {
    px: String,
    sz: String,
    side: String,
}

/// OKX public market data client.
#[derive(Clone)]
pub struct OkxClient {
    client: Client,
    base_url: String,
    fast_bar: String,
    daily_bar: String,
}

impl OkxClient {
    /// Create a client for the configured base URL and bar sizes.
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .user_agent("trendcall/0.1")
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.okx_base_url.trim_end_matches('/').to_string(),
            fast_bar: config.fast_bar.clone(),
            daily_bar: config.daily_bar.clone(),
        })
    }

    /// OKX bar size for a timeframe.
    pub fn bar(&self, timeframe: Timeframe) -> &str {
        match timeframe {
            Timeframe::Fast => &self.fast_bar,
            Timeframe::Daily => &self.daily_bar,
        }
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<Vec<T>> {
        let url = format!("{}{}", self.base_url, path);
        let response = self.client.get(&url).query(query).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApi(format!(
                "OKX returned {}: {}",
                status,
                text.chars().take(200).collect::<String>()
            )));
        }

        let body: OkxResponse<T> = response.json().await?;
        if body.code != "0" {
            return Err(AppError::ExternalApi(format!(
                "OKX error {}: {}",
                body.code, body.msg
            )));
        }

        Ok(body.data)
    }
}

impl CandleSource for OkxClient {
    async fn fetch_candles(
        &self,
        instrument: &str,
        timeframe: Timeframe,
        limit: usize,
    ) -> Result<Series> {
        let query = [
            ("instId", instrument.to_string()),
            ("bar", self.bar(timeframe).to_string()),
            ("limit", limit.to_string()),
        ];
        let rows: Vec<OkxCandleRow> = self.get("/api/v5/market/candles", &query).await?;

        let total = rows.len();
        let candles: Vec<Candle> = rows.iter().filter_map(|row| parse_candle(row)).collect();
        if candles.len() < total {
            warn!(
                instrument,
                timeframe = %timeframe,
                dropped = total - candles.len(),
                "Dropped malformed OKX candle rows"
            );
        }

        debug!(instrument, timeframe = %timeframe, count = candles.len(), "Fetched OKX candles");
        // Rows arrive newest first; Series::new orders by timestamp
        Ok(Series::new(candles))
    }
}

impl TradeSource for OkxClient {
    async fn fetch_trades(&self, instrument: &str, limit: usize) -> Result<Vec<Trade>> {
        let query = [("instId", instrument.to_string()), ("limit", limit.to_string())];
        let rows: Vec<OkxTrade> = self.get("/api/v5/market/trades", &query).await?;

        let total = rows.len();
        let trades: Vec<Trade> = rows.iter().filter_map(parse_trade).collect();
        if trades.len() < total {
            warn!(instrument, dropped = total - trades.len(), "Dropped malformed OKX trades");
        }

        Ok(trades)
    }
}

/// Parse one candle row. Any unparseable or non-finite field drops the row.
fn parse_candle(row: &[String]) -> Option<Candle> {
    if row.len() < 6 {
        return None;
    }

    let time: i64 = row[0].parse().ok()?;
    let mut values = [0.0; 5];
    for (slot, raw) in values.iter_mut().zip(&row[1..6]) {
        let v: f64 = raw.parse().ok()?;
        if !v.is_finite() {
            return None;
        }
        *slot = v;
    }

    let [open, high, low, close, volume] = values;
    Some(Candle::new(time, open, high, low, close, volume))
}

fn parse_trade(trade: &OkxTrade) -> Option<Trade> {
    let price: f64 = trade.px.parse().ok()?;
    let size: f64 = trade.sz.parse().ok()?;
    let side = TradeSide::from_str(&trade.side)?;

    if !price.is_finite() || !size.is_finite() {
        return None;
    }

    Some(Trade { price, size, side })
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn row(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    fn client_for(server: &MockServer) -> OkxClient {
        let config = Config {
            okx_base_url: server.uri(),
            ..Config::default()
        };
        OkxClient::new(&config).unwrap()
    }

    // =========================================================================
    // Parsing Tests
    // =========================================================================

    #[test]
    fn test_parse_candle_row() {
        let candle = parse_candle(&row(&[
            "1700000000000", "100.5", "110", "95", "105.25", "1234.5", "0", "0", "1",
        ]))
        .unwrap();
        assert_eq!(candle.time, 1_700_000_000_000);
        assert_eq!(candle.open, 100.5);
        assert_eq!(candle.high, 110.0);
        assert_eq!(candle.low, 95.0);
        assert_eq!(candle.close, 105.25);
        assert_eq!(candle.volume, 1234.5);
    }

    #[test]
    fn test_parse_candle_rejects_malformed() {
        assert!(parse_candle(&row(&["1700000000000", "abc", "1", "1", "1", "1"])).is_none());
        assert!(parse_candle(&row(&["1700000000000", "1", "1"])).is_none());
        assert!(parse_candle(&row(&["x", "1", "1", "1", "1", "1"])).is_none());
        assert!(parse_candle(&row(&["1", "NaN", "1", "1", "1", "1"])).is_none());
    }

    #[test]
    fn test_parse_trade() {
        let trade = parse_trade(&OkxTrade {
            px: "43000.5".into(),
            sz: "0.5".into(),
            side: "sell".into(),
        })
        .unwrap();
        assert_eq!(trade.price, 43000.5);
        assert_eq!(trade.side, TradeSide::Sell);

        assert!(parse_trade(&OkxTrade {
            px: "1".into(),
            sz: "1".into(),
            side: "hold".into(),
        })
        .is_none());
    }

    #[test]
    fn test_envelope_deserialization() {
        let json = r#"{"code":"51001","msg":"Instrument ID does not exist","data":[]}"#;
        let response: OkxResponse<OkxTrade> = serde_json::from_str(json).unwrap();
        assert_eq!(response.code, "51001");
        assert!(response.data.is_empty());
    }

    // =========================================================================
    // HTTP Tests
    // =========================================================================

    #[tokio::test]
    async fn test_fetch_candles_reverses_and_drops_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v5/market/candles"))
            .and(query_param("instId", "BTC-USDT"))
            .and(query_param("bar", "4H"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "code": "0",
                "msg": "",
                "data": [
                    ["3000", "3", "4", "2", "3.5", "10", "0", "0", "0"],
                    ["2000", "bad", "3", "1", "2.5", "10", "0", "0", "1"],
                    ["1000", "1", "2", "0.5", "1.5", "10", "0", "0", "1"]
                ]
            })))
            .mount(&server)
            .await;

        let series = client_for(&server)
            .fetch_candles("BTC-USDT", Timeframe::Fast, 200)
            .await
            .unwrap();

        assert_eq!(series.len(), 2);
        assert_eq!(series.candles()[0].time, 1000);
        assert_eq!(series.candles()[1].time, 3000);
    }

    #[tokio::test]
    async fn test_fetch_candles_uses_daily_bar() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v5/market/candles"))
            .and(query_param("bar", "1D"))
            .and(query_param("limit", "100"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "code": "0",
                "msg": "",
                "data": [["1000", "1", "2", "0.5", "1.5", "10"]]
            })))
            .mount(&server)
            .await;

        let series = client_for(&server)
            .fetch_candles("ETH-USDT", Timeframe::Daily, 100)
            .await
            .unwrap();
        assert_eq!(series.len(), 1);
    }

    #[tokio::test]
    async fn test_api_error_code() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v5/market/trades"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "code": "51001",
                "msg": "Instrument ID does not exist",
                "data": []
            })))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .fetch_trades("NOPE-USDT", 100)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ExternalApi(_)));
    }

    #[tokio::test]
    async fn test_http_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v5/market/candles"))
            .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .fetch_candles("BTC-USDT", Timeframe::Fast, 200)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("503"));
    }

    #[tokio::test]
    async fn test_fetch_trades() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v5/market/trades"))
            .and(query_param("instId", "SOL-USDT"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "code": "0",
                "msg": "",
                "data": [
                    {"instId": "SOL-USDT", "tradeId": "1", "px": "150", "sz": "10", "side": "buy", "ts": "1"},
                    {"instId": "SOL-USDT", "tradeId": "2", "px": "151", "sz": "x", "side": "sell", "ts": "2"}
                ]
            })))
            .mount(&server)
            .await;

        let trades = client_for(&server).fetch_trades("SOL-USDT", 100).await.unwrap();
        assert_eq!(trades.len(), 1);
        assert_eq!(trades[0].notional(), 1500.0);
        assert_eq!(trades[0].side, TradeSide::Buy);
    }
}
