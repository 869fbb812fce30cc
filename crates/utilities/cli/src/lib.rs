#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

mod flags;
pub use flags::{LogArgs, MetricsArgs};

mod log;
pub use log::{FileLogConfig, LogConfig, LogRotation, StdoutLogConfig};

mod styles;
pub use styles::cli_styles;

mod tracing;
pub use tracing::LogFormat;
