//! Log layer configuration.

use crate::{LogArgs, LogFormat};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing_subscriber::filter::LevelFilter;

/// How often the log file rolls over.
#[derive(
    Default, Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[clap(rename_all = "lowercase")]
pub enum LogRotation {
    /// Every minute.
    Minutely,
    /// Every hour.
    Hourly,
    /// Every day.
    Daily,
    /// Never.
    #[default]
    Never,
}

/// Stdout layer settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StdoutLogConfig {
    /// Line format.
    pub format: LogFormat,
}

/// Rolling file layer settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileLogConfig {
    /// Directory the log files are written to.
    pub directory_path: PathBuf,
    /// Line format.
    pub format: LogFormat,
    /// Rollover schedule.
    pub rotation: LogRotation,
}

/// Resolved logging configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// Most verbose level emitted by any layer.
    pub global_level: LevelFilter,
    /// Stdout layer, if enabled.
    pub stdout_logs: Option<StdoutLogConfig>,
    /// File layer, if enabled.
    pub file_logs: Option<FileLogConfig>,
}

impl LogConfig {
    /// Resolves `args`.
    pub fn new(args: LogArgs) -> Self {
        let stdout_logs =
            (!args.stdout_quiet).then_some(StdoutLogConfig { format: args.stdout_format });
        let file_logs = args.file_directory.map(|directory_path| FileLogConfig {
            directory_path,
            format: args.file_format,
            rotation: args.file_rotation,
        });
        Self { global_level: level_filter(args.level), stdout_logs, file_logs }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self::new(LogArgs::default())
    }
}

impl From<LogArgs> for LogConfig {
    fn from(args: LogArgs) -> Self {
        Self::new(args)
    }
}

const fn level_filter(verbosity: u8) -> LevelFilter {
    match verbosity {
        0 => LevelFilter::OFF,
        1 => LevelFilter::ERROR,
        2 => LevelFilter::WARN,
        3 => LevelFilter::INFO,
        4 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    }
}
