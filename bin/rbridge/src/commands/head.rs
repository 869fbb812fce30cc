//! Head Subcommand

use crate::flags::GlobalArgs;
use clap::Parser;
use rbridge_rpc::ReactiveLedgerReader;

/// The `head` Subcommand
///
/// Prints the latest sequence number executed in an execution environment.
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(about = "Prints the coordinating ledger head sequence number")]
pub struct HeadCommand {
    /// Execution environment to query. Defaults to the registry's.
    #[arg(long = "rvm-id", env = "RBRIDGE_RVM_ID")]
    pub rvm_id: Option<String>,
}

impl HeadCommand {
    /// Runs the subcommand.
    pub async fn run(self, args: &GlobalArgs) -> anyhow::Result<()> {
        let registry = args.registry()?;
        let reader = args.reactive_reader(&registry)?;
        let rvm_id = args.rvm_id(&registry, self.rvm_id)?;
        println!("{}", reader.head_number(&rvm_id).await?);
        Ok(())
    }
}
