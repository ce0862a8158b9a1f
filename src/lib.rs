//! Trendcall - confirmed trend calls with stop/target levels for crypto instruments

pub mod config;
pub mod error;
pub mod services;
pub mod sinks;
pub mod sources;
pub mod types;

// Re-export commonly used types
pub use config::{Config, EngineConfig};
pub use error::{AnalysisError, AppError};
pub use services::{analyze, run_once, AnalysisResult, RunReport};
pub use types::*;
