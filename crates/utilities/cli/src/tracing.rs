//! [tracing_subscriber] setup.

use crate::{LogConfig, LogRotation};
use serde::{Deserialize, Serialize};
use tracing_appender::rolling::{self, RollingFileAppender};
use tracing_subscriber::{
    EnvFilter, Layer, Registry,
    prelude::__tracing_subscriber_SubscriberExt,
    util::{SubscriberInitExt, TryInitError},
};

/// File name prefix of rolling log files.
const LOG_FILE_NAME: &str = "rbridge.log";

/// Line format of a log layer.
#[derive(
    Default, Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[clap(rename_all = "lowercase")]
pub enum LogFormat {
    /// Full format (default).
    #[default]
    Full,
    /// One JSON object per line.
    Json,
    /// Multi-line, human-oriented.
    Pretty,
    /// Abbreviated single-line.
    Compact,
}

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

impl LogFormat {
    fn stdout_layer(self) -> BoxedLayer {
        match self {
            Self::Full => tracing_subscriber::fmt::layer().boxed(),
            Self::Json => tracing_subscriber::fmt::layer().json().boxed(),
            Self::Pretty => tracing_subscriber::fmt::layer().pretty().boxed(),
            Self::Compact => tracing_subscriber::fmt::layer().compact().boxed(),
        }
    }

    fn file_layer(self, appender: RollingFileAppender) -> BoxedLayer {
        let layer = tracing_subscriber::fmt::layer().with_ansi(false).with_writer(appender);
        match self {
            Self::Full => layer.boxed(),
            Self::Json => layer.json().boxed(),
            Self::Pretty => layer.pretty().boxed(),
            Self::Compact => layer.compact().boxed(),
        }
    }
}

impl LogConfig {
    /// Installs the global subscriber.
    ///
    /// `env_filter` defaults to `RUST_LOG`; the configured verbosity is added on top of it.
    pub fn init_tracing_subscriber(
        &self,
        env_filter: Option<EnvFilter>,
    ) -> Result<(), TryInitError> {
        let file_layer = self.file_logs.as_ref().map(|file_logs| {
            let directory = file_logs.directory_path.clone();
            let appender = match file_logs.rotation {
                LogRotation::Minutely => rolling::minutely(directory, LOG_FILE_NAME),
                LogRotation::Hourly => rolling::hourly(directory, LOG_FILE_NAME),
                LogRotation::Daily => rolling::daily(directory, LOG_FILE_NAME),
                LogRotation::Never => rolling::never(directory, LOG_FILE_NAME),
            };
            file_logs.format.file_layer(appender)
        });
        let stdout_layer = self.stdout_logs.map(|stdout_logs| stdout_logs.format.stdout_layer());

        let env_filter = env_filter
            .unwrap_or_else(EnvFilter::from_default_env)
            .add_directive(self.global_level.into());

        let layers: Vec<BoxedLayer> = file_layer.into_iter().chain(stdout_layer).collect();
        tracing_subscriber::registry().with(layers).with(env_filter).try_init()
    }
}
