pub mod alert;
pub mod chart;
pub mod signals;

pub use alert::*;
pub use chart::*;
pub use signals::*;
