//! Subcommands of the rbridge CLI.

mod head;
pub use head::HeadCommand;

mod mapping;
pub use mapping::MappingCommand;

mod monitor;
pub use monitor::MonitorCommand;

mod status;
pub use status::StatusCommand;

mod track;
pub use track::TrackCommand;

mod wait;
pub use wait::WaitCommand;

use anyhow::Context;
use std::time::{SystemTime, UNIX_EPOCH};

/// Current unix time, in seconds.
pub(crate) fn unix_now() -> anyhow::Result<u64> {
    let elapsed =
        SystemTime::now().duration_since(UNIX_EPOCH).context("system clock is before 1970")?;
    Ok(elapsed.as_secs())
}
