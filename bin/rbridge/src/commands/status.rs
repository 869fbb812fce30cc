//! Status Subcommand

use crate::commands::unix_now;
use alloy_primitives::U256;
use clap::Parser;
use rbridge_settlement::{
    OrderStatus,
    amount::{display_precision, format_units_truncated, percent_filled},
    resolve_status,
};

/// The `status` Subcommand
///
/// Resolves an order's status and fill progress from its on-chain fields, offline.
///
/// # Usage
///
/// ```sh
/// rbridge status --requested 1000000 --remaining 250000 --expires-at 1760000000
/// ```
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(about = "Resolves an order's status and fill progress")]
pub struct StatusCommand {
    /// Amount originally requested, in base units.
    #[arg(long = "requested")]
    pub requested: U256,
    /// Amount still unfilled, in base units.
    #[arg(long = "remaining")]
    pub remaining: U256,
    /// Expiry, unix seconds.
    #[arg(long = "expires-at")]
    pub expires_at: u64,
    /// The order was cancelled or settled on-chain.
    #[arg(long = "inactive")]
    pub inactive: bool,
    /// Evaluate at this unix time instead of now.
    #[arg(long = "now")]
    pub now: Option<u64>,
    /// Token decimals, to print the remaining amount in whole units.
    #[arg(long = "decimals")]
    pub decimals: Option<u8>,
}

impl StatusCommand {
    /// Status and percent filled at `now`.
    pub fn evaluate(&self, now: u64) -> (OrderStatus, u8) {
        let status = resolve_status(!self.inactive, self.remaining, self.expires_at, now);
        (status, percent_filled(self.requested, self.remaining))
    }

    /// Runs the subcommand.
    pub fn run(self) -> anyhow::Result<()> {
        let now = match self.now {
            Some(now) => now,
            None => unix_now()?,
        };
        let (status, filled) = self.evaluate(now);
        println!("status:    {status}");
        println!("filled:    {filled}%");
        if let Some(decimals) = self.decimals {
            let remaining =
                format_units_truncated(self.remaining, decimals, display_precision(decimals))?;
            println!("remaining: {remaining}");
        }
        Ok(())
    }
}
