//! Flags shared by every subcommand.

use alloy_primitives::ChainId;
use anyhow::Context;
use clap::Parser;
use rbridge_cli::{LogArgs, MetricsArgs};
use rbridge_rpc::{DEFAULT_RPC_TIMEOUT, OriginChainClient, ReactiveLedgerClient, RpcClient};
use rbridge_settlement::ChainRegistry;
use std::{path::PathBuf, time::Duration};
use url::Url;

/// Global arguments for the CLI.
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
pub struct GlobalArgs {
    /// Logging flags.
    #[command(flatten)]
    pub log_args: LogArgs,
    /// Prometheus metrics flags.
    #[command(flatten)]
    pub metrics: MetricsArgs,
    /// Chain registry JSON file. The built-in testnet registry is used when unset.
    #[arg(long = "registry", env = "RBRIDGE_REGISTRY", global = true)]
    pub registry: Option<PathBuf>,
    /// Overrides the RPC endpoint of a chain, as `<chain-id>=<url>`. Repeatable.
    #[arg(long = "rpc", value_parser = parse_rpc_override, global = true)]
    pub rpc_overrides: Vec<(ChainId, Url)>,
    /// Overrides the coordinating ledger RPC endpoint.
    #[arg(long = "reactive-rpc", env = "RBRIDGE_REACTIVE_RPC", global = true)]
    pub reactive_rpc: Option<Url>,
    /// Per-request RPC timeout, in milliseconds.
    #[arg(
        long = "rpc-timeout-ms",
        default_value_t = DEFAULT_RPC_TIMEOUT.as_millis() as u64,
        env = "RBRIDGE_RPC_TIMEOUT_MS",
        global = true
    )]
    pub rpc_timeout_ms: u64,
}

impl Default for GlobalArgs {
    fn default() -> Self {
        Self {
            log_args: LogArgs::default(),
            metrics: MetricsArgs::default(),
            registry: None,
            rpc_overrides: Vec::new(),
            reactive_rpc: None,
            rpc_timeout_ms: DEFAULT_RPC_TIMEOUT.as_millis() as u64,
        }
    }
}

impl GlobalArgs {
    /// Loads the chain registry.
    pub fn registry(&self) -> anyhow::Result<ChainRegistry> {
        let Some(path) = &self.registry else {
            return Ok(ChainRegistry::testnet()?);
        };
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read registry {}", path.display()))?;
        ChainRegistry::from_json_str(&json)
            .with_context(|| format!("invalid registry {}", path.display()))
    }

    /// Per-request RPC timeout.
    pub const fn rpc_timeout(&self) -> Duration {
        Duration::from_millis(self.rpc_timeout_ms)
    }

    /// A reader for every registered chain, with endpoint overrides applied.
    pub fn origin_reader(&self, registry: &ChainRegistry) -> anyhow::Result<OriginChainClient> {
        let mut reader = OriginChainClient::from_registry(registry, self.rpc_timeout())?;
        for (chain_id, url) in &self.rpc_overrides {
            let client = RpcClient::http(url.as_str(), self.rpc_timeout())
                .with_context(|| format!("invalid RPC override for chain {chain_id}"))?;
            reader = reader.with_chain(*chain_id, client);
        }
        Ok(reader)
    }

    /// A reader for the coordinating ledger.
    pub fn reactive_reader(
        &self,
        registry: &ChainRegistry,
    ) -> anyhow::Result<ReactiveLedgerClient> {
        let url =
            self.reactive_rpc.as_ref().map_or(registry.reactive().rpc_url.as_str(), Url::as_str);
        let client = RpcClient::http(url, self.rpc_timeout())
            .with_context(|| format!("invalid coordinating ledger endpoint {url}"))?;
        Ok(ReactiveLedgerClient::new(client))
    }

    /// The execution environment to follow: `rvm_id` if given, else the registry default.
    pub fn rvm_id(
        &self,
        registry: &ChainRegistry,
        rvm_id: Option<String>,
    ) -> anyhow::Result<String> {
        rvm_id
            .or_else(|| registry.reactive().default_rvm_id.clone())
            .context("no --rvm-id given and the registry has no default")
    }
}

fn parse_rpc_override(value: &str) -> Result<(ChainId, Url), String> {
    let (chain_id, url) =
        value.split_once('=').ok_or_else(|| format!("expected <chain-id>=<url>, got `{value}`"))?;
    let chain_id =
        chain_id.trim().parse().map_err(|err| format!("invalid chain id `{chain_id}`: {err}"))?;
    let url = Url::parse(url.trim()).map_err(|err| format!("invalid url `{url}`: {err}"))?;
    Ok((chain_id, url))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[derive(Parser, Debug)]
    struct MockCommand {
        #[clap(flatten)]
        global: GlobalArgs,
    }

    #[test]
    fn test_defaults() {
        let args = MockCommand::parse_from(["test"]);
        assert_eq!(args.global, GlobalArgs::default());
        assert_eq!(args.global.rpc_timeout(), DEFAULT_RPC_TIMEOUT);
    }

    #[test]
    fn test_rpc_overrides() {
        let args = MockCommand::parse_from([
            "test",
            "--rpc",
            "11155111=http://localhost:8545",
            "--rpc",
            "84532=http://localhost:9545",
        ]);
        let chains: Vec<_> = args.global.rpc_overrides.iter().map(|(id, _)| *id).collect();
        assert_eq!(chains, vec![11155111, 84532]);
        assert_eq!(args.global.rpc_overrides[0].1.as_str(), "http://localhost:8545/");
    }

    #[rstest]
    #[case::missing_separator("11155111")]
    #[case::bad_chain("sepolia=http://localhost:8545")]
    #[case::bad_url("11155111=not a url")]
    fn test_invalid_rpc_override(#[case] value: &str) {
        assert!(parse_rpc_override(value).is_err());
    }

    #[test]
    fn test_builtin_registry_readers() {
        let args = GlobalArgs::default();
        let registry = args.registry().unwrap();
        assert!(args.origin_reader(&registry).is_ok());
        assert!(args.reactive_reader(&registry).is_ok());
        assert_eq!(args.rvm_id(&registry, Some("0xabc".to_string())).unwrap(), "0xabc");
    }

    #[test]
    fn test_missing_registry_file() {
        let args = GlobalArgs {
            registry: Some(PathBuf::from("/nonexistent/registry.json")),
            ..Default::default()
        };
        assert!(args.registry().is_err());
    }
}
