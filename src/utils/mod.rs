pub mod format;
pub mod logging;
pub mod metrics;

pub use format::*;
