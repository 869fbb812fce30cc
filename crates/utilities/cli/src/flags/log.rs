//! Logging flags.

use crate::{LogFormat, LogRotation};
use clap::{ArgAction, Parser};
use std::path::PathBuf;

/// Logging flags.
#[derive(Debug, Clone, PartialEq, Eq, Parser)]
pub struct LogArgs {
    /// Verbosity: 0 silences logs, each `-v` raises the level from error (1) to trace (5).
    #[arg(
        short = 'v',
        long = "verbosity",
        action = ArgAction::Count,
        default_value_t = 3,
        global = true
    )]
    pub level: u8,
    /// Disable logging to stdout.
    #[arg(long = "log.stdout.quiet", short = 'q', global = true)]
    pub stdout_quiet: bool,
    /// Format of stdout logs.
    #[arg(
        long = "log.stdout.format",
        default_value = "full",
        env = "RBRIDGE_LOG_STDOUT_FORMAT",
        global = true
    )]
    pub stdout_format: LogFormat,
    /// Directory for rolling file logs. File logging is off when unset.
    #[arg(long = "log.file.directory", env = "RBRIDGE_LOG_FILE_DIRECTORY", global = true)]
    pub file_directory: Option<PathBuf>,
    /// Format of file logs.
    #[arg(
        long = "log.file.format",
        default_value = "full",
        env = "RBRIDGE_LOG_FILE_FORMAT",
        global = true
    )]
    pub file_format: LogFormat,
    /// Rotation of file logs.
    #[arg(
        long = "log.file.rotation",
        default_value = "never",
        env = "RBRIDGE_LOG_FILE_ROTATION",
        global = true
    )]
    pub file_rotation: LogRotation,
}

impl Default for LogArgs {
    fn default() -> Self {
        Self {
            level: 3,
            stdout_quiet: false,
            stdout_format: LogFormat::Full,
            file_directory: None,
            file_format: LogFormat::Full,
            file_rotation: LogRotation::Never,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[derive(Parser, Debug)]
    struct MockCommand {
        #[clap(flatten)]
        log: LogArgs,
    }

    #[test]
    fn test_defaults() {
        let args = MockCommand::parse_from(["test"]);
        assert_eq!(args.log, LogArgs::default());
    }

    #[rstest]
    #[case::one(&["test", "-v"], 1)]
    #[case::four(&["test", "-vvvv"], 4)]
    #[case::long(&["test", "--verbosity", "--verbosity"], 2)]
    fn test_verbosity_counts(#[case] argv: &[&str], #[case] level: u8) {
        assert_eq!(MockCommand::parse_from(argv).log.level, level);
    }

    #[test]
    fn test_file_logging() {
        let args = MockCommand::parse_from([
            "test",
            "--log.file.directory",
            "/tmp/rbridge",
            "--log.file.format",
            "json",
            "--log.file.rotation",
            "daily",
        ]);
        assert_eq!(args.log.file_directory, Some(PathBuf::from("/tmp/rbridge")));
        assert_eq!(args.log.file_format, LogFormat::Json);
        assert_eq!(args.log.file_rotation, LogRotation::Daily);
    }
}
