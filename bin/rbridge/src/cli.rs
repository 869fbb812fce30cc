//! Contains the rbridge CLI.

use crate::{
    commands::{
        HeadCommand, MappingCommand, MonitorCommand, StatusCommand, TrackCommand, WaitCommand,
    },
    flags::GlobalArgs,
};
use anyhow::Result;
use clap::{Parser, Subcommand};
use rbridge_cli::{LogConfig, cli_styles};
use rbridge_tracker_core::Metrics;
use std::future::Future;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Subcommands for the CLI.
#[derive(Debug, PartialEq, Eq, Clone, Subcommand)]
pub enum Commands {
    /// Waits for a transaction to be confirmed.
    #[command(alias = "w")]
    Wait(WaitCommand),
    /// Follows the coordinating ledger for matching transactions.
    #[command(alias = "m")]
    Monitor(MonitorCommand),
    /// Tracks a deposit through its coordinating ledger relay.
    #[command(alias = "t")]
    Track(TrackCommand),
    /// Resolves an order's status and fill progress.
    #[command(alias = "s")]
    Status(StatusCommand),
    /// Looks up a contract's coordinating ledger address.
    Mapping(MappingCommand),
    /// Prints the coordinating ledger head sequence number.
    Head(HeadCommand),
}

/// The rbridge CLI.
#[derive(Parser, Clone, Debug)]
#[command(author, version, about, styles = cli_styles(), long_about = None)]
pub struct Cli {
    /// The subcommand to run.
    #[command(subcommand)]
    pub subcommand: Commands,
    /// Global arguments for the CLI.
    #[command(flatten)]
    pub global: GlobalArgs,
}

impl Cli {
    /// Runs the CLI.
    pub fn run(self) -> Result<()> {
        let Self { subcommand, global } = self;
        LogConfig::new(global.log_args.clone()).init_tracing_subscriber(None)?;

        match subcommand {
            Commands::Status(status) => status.run(),
            Commands::Wait(wait) => {
                Self::run_until_ctrl_c(&global, |token| wait.run(&global, token))
            }
            Commands::Monitor(monitor) => {
                Self::run_until_ctrl_c(&global, |token| monitor.run(&global, token))
            }
            Commands::Track(track) => {
                Self::run_until_ctrl_c(&global, |token| track.run(&global, token))
            }
            Commands::Mapping(mapping) => Self::run_until_ctrl_c(&global, |_| mapping.run(&global)),
            Commands::Head(head) => Self::run_until_ctrl_c(&global, |_| head.run(&global)),
        }
    }

    /// Runs `command` on a fresh runtime. Ctrl-C cancels the token handed to it.
    pub fn run_until_ctrl_c<F, Fut>(global: &GlobalArgs, command: F) -> Result<()>
    where
        F: FnOnce(CancellationToken) -> Fut,
        Fut: Future<Output = Result<()>>,
    {
        let rt = Self::tokio_runtime()?;
        rt.block_on(async move {
            global.metrics.init_metrics()?;
            if global.metrics.enabled {
                Metrics::init();
                info!(target: "rbridge", addr = %global.metrics.socket_addr(), "Serving metrics");
            }

            let cancellation = CancellationToken::new();
            let signal = cancellation.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    info!(target: "rbridge", "Received Ctrl-C, shutting down...");
                    signal.cancel();
                }
            });
            command(cancellation).await
        })
    }

    /// Creates a new default tokio multi-thread [Runtime](tokio::runtime::Runtime) with all
    /// features enabled
    pub fn tokio_runtime() -> Result<tokio::runtime::Runtime, std::io::Error> {
        tokio::runtime::Builder::new_multi_thread().enable_all().build()
    }
}
