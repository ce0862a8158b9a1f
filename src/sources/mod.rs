pub mod okx;

pub use okx::OkxClient;

use crate::error::Result;
use crate::types::{Series, Timeframe, Trade};

/// Supplier of OHLCV candles, oldest first.
#[allow(async_fn_in_trait)]
pub trait CandleSource {
    async fn fetch_candles(
        &self,
        instrument: &str,
        timeframe: Timeframe,
        limit: usize,
    ) -> Result<Series>;
}

/// Supplier of the recent public trade tape.
#[allow(async_fn_in_trait)]
pub trait TradeSource {
    async fn fetch_trades(&self, instrument: &str, limit: usize) -> Result<Vec<Trade>>;
}
