#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

mod config;
pub use config::{MonitorConfig, WaiterConfig};

mod error;
pub use error::{MonitorError, WaitError};

mod metrics;
pub use metrics::Metrics;

mod monitor;
pub use monitor::{
    Callback, Correlation, MonitorState, Predicate, ReactiveMonitor, Subscription,
};

mod timeline;
pub use timeline::TimelineRecorder;

mod waiter;
pub use waiter::{ConfirmationOutcome, ConfirmationWaiter};
