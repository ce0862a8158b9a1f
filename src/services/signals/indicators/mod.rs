//! Technical indicator implementations.

pub mod ema;
pub mod macd;
pub mod sma;

pub use ema::Ema;
pub use macd::{Macd, MacdSeries};
pub use sma::Sma;
