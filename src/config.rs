use crate::error::AppError;
use crate::services::signals::levels::LevelPolicy;
use std::env;
use std::str::FromStr;

const DEFAULT_INSTRUMENTS: &[&str] = &[
    "BTC-USDT", "ETH-USDT", "BNB-USDT", "SOL-USDT", "XRP-USDT", "ADA-USDT", "DOGE-USDT",
];
const DEFAULT_REFERENCE_INSTRUMENTS: &[&str] = &["BTC-USDT", "ETH-USDT"];
const DEFAULT_OKX_BASE_URL: &str = "https://www.okx.com";
const DEFAULT_TELEGRAM_BASE_URL: &str = "https://api.telegram.org";

/// Notional thresholds for bucketing the largest trade.
#[derive(Debug, Clone, PartialEq)]
pub struct FlowBuckets {
    pub medium: f64,
    pub large: f64,
    pub extra_large: f64,
    pub huge: f64,
}

impl Default for FlowBuckets {
    fn default() -> Self {
        Self {
            medium: 50_000.0,
            large: 150_000.0,
            extra_large: 500_000.0,
            huge: 1_000_000.0,
        }
    }
}

/// Parameters of the trend engine. Passed explicitly into every analysis entry point.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Fast EMA span (default: 14).
    pub ema_fast_span: usize,
    /// Slow EMA span (default: 28).
    pub ema_slow_span: usize,
    /// MACD fast EMA span (default: 12).
    pub macd_fast: usize,
    /// MACD slow EMA span (default: 26).
    pub macd_slow: usize,
    /// MACD signal EMA span (default: 9).
    pub macd_signal: usize,
    /// Volume SMA window (default: 20).
    pub volume_sma_period: usize,
    /// Neighbors on each side a swing must beat (default: 2).
    pub swing_look: usize,
    /// Minimum fast-timeframe bars (default: 60).
    pub min_fast_bars: usize,
    /// Minimum daily bars (default: 30).
    pub min_daily_bars: usize,
    /// Absolute net notional flow required to count flow as a vote (default: 80,000).
    pub flow_threshold: f64,
    pub flow_buckets: FlowBuckets,
    /// Votes required to confirm (default: 3).
    pub vote_threshold: u8,
    /// Bars examined for a pullback-and-resume (default: 3).
    pub reentry_window: usize,
    pub level_policy: LevelPolicy,
    /// Long stop buffer applied to the slow EMA (default: 0.995).
    pub long_buffer: f64,
    /// Short stop buffer applied to the slow EMA (default: 1.005).
    pub short_buffer: f64,
    /// Percentage stop used when no usable swing exists (default: 3%).
    pub fallback_stop_pct: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            ema_fast_span: 14,
            ema_slow_span: 28,
            macd_fast: 12,
            macd_slow: 26,
            macd_signal: 9,
            volume_sma_period: 20,
            swing_look: 2,
            min_fast_bars: 60,
            min_daily_bars: 30,
            flow_threshold: 80_000.0,
            flow_buckets: FlowBuckets::default(),
            vote_threshold: 3,
            reentry_window: 3,
            level_policy: LevelPolicy::default(),
            long_buffer: 0.995,
            short_buffer: 1.005,
            fallback_stop_pct: 0.03,
        }
    }
}

impl EngineConfig {
    /// Load engine parameters from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            ema_fast_span: env_parse("EMA_FAST_SPAN").unwrap_or(defaults.ema_fast_span),
            ema_slow_span: env_parse("EMA_SLOW_SPAN").unwrap_or(defaults.ema_slow_span),
            swing_look: env_parse("SWING_LOOK").unwrap_or(defaults.swing_look),
            min_fast_bars: env_parse("MIN_FAST_BARS").unwrap_or(defaults.min_fast_bars),
            min_daily_bars: env_parse("MIN_DAILY_BARS").unwrap_or(defaults.min_daily_bars),
            flow_threshold: env_parse("FLOW_THRESHOLD").unwrap_or(defaults.flow_threshold),
            vote_threshold: env_parse("VOTE_THRESHOLD").unwrap_or(defaults.vote_threshold),
            reentry_window: env_parse("REENTRY_WINDOW").unwrap_or(defaults.reentry_window),
            level_policy: env::var("LEVEL_POLICY")
                .ok()
                .and_then(|v| LevelPolicy::from_str(&v))
                .unwrap_or(defaults.level_policy),
            ..defaults
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Instruments analyzed each run (OKX instrument IDs).
    pub instruments: Vec<String>,
    /// Instruments whose bearish confirmation vetoes bullish alerts elsewhere.
    pub reference_instruments: Vec<String>,
    /// OKX bar size of the fast timeframe.
    pub fast_bar: String,
    /// OKX bar size of the daily timeframe.
    pub daily_bar: String,
    /// Fast candles requested per instrument.
    pub candle_limit: usize,
    /// Daily candles requested per instrument.
    pub daily_limit: usize,
    /// Recent trades requested per instrument.
    pub trade_limit: usize,
    pub okx_base_url: String,
    pub request_timeout_secs: u64,
    pub telegram_base_url: String,
    pub telegram_token: Option<String>,
    pub telegram_chat_id: Option<String>,
    /// Poll interval; None runs once and exits.
    pub run_interval_secs: Option<u64>,
    /// Append a daily-summary record per instrument.
    pub daily_summary: bool,
    pub engine: EngineConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            instruments: DEFAULT_INSTRUMENTS.iter().map(|s| s.to_string()).collect(),
            reference_instruments: DEFAULT_REFERENCE_INSTRUMENTS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            fast_bar: "4H".to_string(),
            daily_bar: "1D".to_string(),
            candle_limit: 200,
            daily_limit: 100,
            trade_limit: 100,
            okx_base_url: DEFAULT_OKX_BASE_URL.to_string(),
            request_timeout_secs: 10,
            telegram_base_url: DEFAULT_TELEGRAM_BASE_URL.to_string(),
            telegram_token: None,
            telegram_chat_id: None,
            run_interval_secs: None,
            daily_summary: false,
            engine: EngineConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            instruments: env::var("INSTRUMENTS")
                .ok()
                .map(|s| parse_list(&s))
                .filter(|list| !list.is_empty())
                .unwrap_or(defaults.instruments),
            reference_instruments: env::var("REFERENCE_INSTRUMENTS")
                .ok()
                .map(|s| parse_list(&s))
                .unwrap_or(defaults.reference_instruments),
            fast_bar: env::var("FAST_BAR").unwrap_or(defaults.fast_bar),
            daily_bar: env::var("DAILY_BAR").unwrap_or(defaults.daily_bar),
            candle_limit: env_parse("CANDLE_LIMIT").unwrap_or(defaults.candle_limit),
            daily_limit: env_parse("DAILY_LIMIT").unwrap_or(defaults.daily_limit),
            trade_limit: env_parse("TRADE_LIMIT").unwrap_or(defaults.trade_limit),
            okx_base_url: env::var("OKX_BASE_URL").unwrap_or(defaults.okx_base_url),
            request_timeout_secs: env_parse("REQUEST_TIMEOUT_SECS")
                .unwrap_or(defaults.request_timeout_secs),
            telegram_base_url: env::var("TELEGRAM_BASE_URL").unwrap_or(defaults.telegram_base_url),
            telegram_token: env::var("TELEGRAM_TOKEN").ok().filter(|v| !v.is_empty()),
            telegram_chat_id: env::var("CHAT_ID").ok().filter(|v| !v.is_empty()),
            run_interval_secs: env_parse("RUN_INTERVAL_SECS").filter(|secs| *secs > 0),
            daily_summary: env::var("DAILY_SUMMARY")
                .ok()
                .map(|v| v == "true" || v == "1")
                .unwrap_or(defaults.daily_summary),
            engine: EngineConfig::from_env(),
        }
    }

    /// Reject settings the engine cannot run with.
    pub fn validate(&self) -> Result<(), AppError> {
        let engine = &self.engine;
        if self.instruments.is_empty() {
            return Err(AppError::Config("no instruments configured".to_string()));
        }
        if engine.swing_look == 0 {
            return Err(AppError::Config("SWING_LOOK must be at least 1".to_string()));
        }
        if engine.ema_fast_span == 0 || engine.ema_fast_span >= engine.ema_slow_span {
            return Err(AppError::Config(format!(
                "EMA spans must satisfy 0 < fast < slow (got {} / {})",
                engine.ema_fast_span, engine.ema_slow_span
            )));
        }
        // Two structural votes plus MACD and flow
        if engine.vote_threshold > 4 {
            return Err(AppError::Config(format!(
                "VOTE_THRESHOLD {} can never be reached",
                engine.vote_threshold
            )));
        }
        if engine.reentry_window < 2 {
            return Err(AppError::Config("REENTRY_WINDOW must be at least 2".to_string()));
        }
        Ok(())
    }
}

fn env_parse<T: FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

/// Split a comma separated list, trimming and upper-casing entries.
fn parse_list(s: &str) -> Vec<String> {
    s.split(',')
        .map(|item| item.trim().to_uppercase())
        .filter(|item| !item.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // Tests that touch process environment run one at a time
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn with_env<T>(vars: &[(&str, &str)], f: impl FnOnce() -> T) -> T {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        for (key, value) in vars {
            env::set_var(key, value);
        }
        let out = f();
        for (key, _) in vars {
            env::remove_var(key);
        }
        out
    }

    // =========================================================================
    // EngineConfig Tests
    // =========================================================================

    #[test]
    fn test_engine_config_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.ema_fast_span, 14);
        assert_eq!(config.ema_slow_span, 28);
        assert_eq!(config.swing_look, 2);
        assert_eq!(config.min_fast_bars, 60);
        assert_eq!(config.min_daily_bars, 30);
        assert_eq!(config.flow_threshold, 80_000.0);
        assert_eq!(config.vote_threshold, 3);
        assert_eq!(config.reentry_window, 3);
        assert_eq!(config.level_policy, LevelPolicy::EmaBuffered);
    }

    #[test]
    fn test_flow_buckets_defaults() {
        let buckets = FlowBuckets::default();
        assert_eq!(buckets.medium, 50_000.0);
        assert_eq!(buckets.large, 150_000.0);
        assert_eq!(buckets.extra_large, 500_000.0);
        assert_eq!(buckets.huge, 1_000_000.0);
    }

    #[test]
    fn test_engine_config_override() {
        let config = EngineConfig {
            vote_threshold: 4,
            swing_look: 3,
            ..Default::default()
        };
        assert_eq!(config.vote_threshold, 4);
        assert_eq!(config.swing_look, 3);
        assert_eq!(config.ema_fast_span, 14);
    }

    // =========================================================================
    // Config Tests
    // =========================================================================

    #[test]
    fn test_config_default_values() {
        let config = Config::default();
        assert_eq!(config.instruments.len(), 7);
        assert_eq!(config.reference_instruments, vec!["BTC-USDT", "ETH-USDT"]);
        assert_eq!(config.fast_bar, "4H");
        assert_eq!(config.daily_bar, "1D");
        assert_eq!(config.candle_limit, 200);
        assert!(config.telegram_token.is_none());
        assert!(config.run_interval_secs.is_none());
    }

    #[test]
    fn test_validate() {
        assert!(Config::default().validate().is_ok());

        let mut config = Config::default();
        config.engine.vote_threshold = 5;
        assert!(matches!(config.validate(), Err(AppError::Config(_))));

        let mut config = Config::default();
        config.engine.ema_fast_span = 30;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.instruments.clear();
        assert!(config.validate().is_err());
    }

    // =========================================================================
    // Environment Tests
    // =========================================================================

    #[test]
    fn test_instruments_from_env() {
        let config = with_env(&[("INSTRUMENTS", " sol-usdt, btc-usdt,")], Config::from_env);
        assert_eq!(config.instruments, vec!["SOL-USDT", "BTC-USDT"]);

        let config = with_env(&[("INSTRUMENTS", " , ")], Config::from_env);
        assert_eq!(config.instruments, Config::default().instruments);
    }

    #[test]
    fn test_level_policy_from_env() {
        let engine = with_env(&[("LEVEL_POLICY", "swing_anchored")], EngineConfig::from_env);
        assert_eq!(engine.level_policy, LevelPolicy::SwingAnchored);

        let engine = with_env(&[("LEVEL_POLICY", "bogus")], EngineConfig::from_env);
        assert_eq!(engine.level_policy, LevelPolicy::EmaBuffered);
    }

    #[test]
    fn test_inverted_ema_spans_from_env_fail_validation() {
        let config = with_env(
            &[("EMA_FAST_SPAN", "30"), ("EMA_SLOW_SPAN", "20")],
            Config::from_env,
        );
        assert_eq!(config.engine.ema_fast_span, 30);
        assert_eq!(config.engine.ema_slow_span, 20);
        assert!(matches!(config.validate(), Err(AppError::Config(_))));

        let config = with_env(&[("EMA_FAST_SPAN", "10")], Config::from_env);
        assert_eq!(config.engine.ema_fast_span, 10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_list() {
        assert_eq!(
            parse_list(" btc-usdt, ETH-USDT ,,sol-usdt"),
            vec!["BTC-USDT", "ETH-USDT", "SOL-USDT"]
        );
        assert!(parse_list("").is_empty());
    }
}
