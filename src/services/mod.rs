pub mod analyzer;
pub mod flow;
pub mod regime;
pub mod runner;
pub mod signals;

pub use analyzer::{analyze, AnalysisResult, SwingRange};
pub use regime::RegimeGate;
pub use runner::{compose_alerts, run_once, RunReport, SkippedInstrument};
