pub mod charts;
pub mod ranking;
pub mod stats;

pub use charts::*;
pub use ranking::*;
pub use stats::*;
