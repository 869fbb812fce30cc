//! Flags shared by rbridge binaries.

mod log;
pub use log::LogArgs;

mod metrics;
pub use metrics::MetricsArgs;
