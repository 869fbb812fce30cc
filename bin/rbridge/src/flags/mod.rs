//! CLI flags.

mod globals;
pub use globals::GlobalArgs;

mod polling;
pub use polling::{MonitorArgs, WaiterArgs};
