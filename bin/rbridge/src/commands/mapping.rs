//! Mapping Subcommand

use crate::flags::GlobalArgs;
use alloy_primitives::Address;
use clap::Parser;
use rbridge_rpc::ReactiveLedgerReader;

/// The `mapping` Subcommand
///
/// Prints the coordinating ledger counterpart of a contract address.
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(about = "Looks up a contract's coordinating ledger address")]
pub struct MappingCommand {
    /// Contract address to map.
    #[arg(long = "address", short = 'a')]
    pub address: Address,
}

impl MappingCommand {
    /// Runs the subcommand.
    pub async fn run(self, args: &GlobalArgs) -> anyhow::Result<()> {
        let registry = args.registry()?;
        let reader = args.reactive_reader(&registry)?;
        let mapped = reader.address_mapping(self.address).await?;
        println!("{mapped}");
        Ok(())
    }
}
