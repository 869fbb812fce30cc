//! Static lookup table of supported chains and tokens.
//!
//! The registry is loaded once and passed to whatever needs it. Nothing in the workspace
//! reads it from a global.

use crate::RegistryError;
use alloy_primitives::{Address, B256, ChainId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// The registry document for the public testnets.
const TESTNET_JSON: &str = include_str!("../res/testnet.json");

/// Native currency of a chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NativeCurrency {
    /// Display name.
    pub name: String,
    /// Ticker symbol.
    pub symbol: String,
    /// Decimal count.
    pub decimals: u8,
}

/// An origin or destination chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainConfig {
    /// Chain id.
    pub id: ChainId,
    /// Display name.
    pub name: String,
    /// JSON-RPC endpoint.
    pub rpc_url: String,
    /// Block explorer base URL.
    pub explorer: String,
    /// Native currency.
    pub native_currency: NativeCurrency,
    /// Bridge contract on this chain. Zero while undeployed.
    pub bridge_contract: Address,
}

impl ChainConfig {
    /// Explorer link for a transaction.
    pub fn explorer_tx_url(&self, tx_hash: B256) -> String {
        format!("{}/tx/{tx_hash}", self.explorer.trim_end_matches('/'))
    }

    /// `true` once a bridge contract is deployed.
    pub fn has_bridge(&self) -> bool {
        !self.bridge_contract.is_zero()
    }
}

/// The coordinating ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReactiveNetworkConfig {
    /// Display name.
    pub name: String,
    /// JSON-RPC endpoint.
    pub rpc_url: String,
    /// Explorer base URL.
    pub explorer: String,
    /// Execution environment queried when the caller does not name one.
    #[serde(default)]
    pub default_rvm_id: Option<String>,
    /// Reactive contract relaying bridge events.
    #[serde(default)]
    pub reactive_contract: Option<Address>,
}

/// An ERC-20 token, or the native currency at the zero address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenConfig {
    /// Contract address.
    pub address: Address,
    /// Ticker symbol.
    pub symbol: String,
    /// Display name.
    pub name: String,
    /// Decimal count.
    pub decimals: u8,
}

impl TokenConfig {
    /// `true` for the chain's native currency.
    pub fn is_native(&self) -> bool {
        self.address.is_zero()
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RegistryDocument {
    chains: Vec<ChainConfig>,
    reactive: ReactiveNetworkConfig,
    #[serde(default)]
    tokens: BTreeMap<ChainId, Vec<TokenConfig>>,
    #[serde(default)]
    canonical_tokens: HashMap<Address, Address>,
}

/// Supported chains, their tokens, and the coordinating ledger.
#[derive(Debug, Clone)]
pub struct ChainRegistry {
    chains: BTreeMap<ChainId, ChainConfig>,
    reactive: ReactiveNetworkConfig,
    tokens: BTreeMap<ChainId, Vec<TokenConfig>>,
    canonical_tokens: HashMap<Address, Address>,
}

impl ChainRegistry {
    /// Parses and validates a registry document.
    pub fn from_json_str(json: &str) -> Result<Self, RegistryError> {
        let document: RegistryDocument = serde_json::from_str(json)?;

        let mut chains = BTreeMap::new();
        for chain in document.chains {
            let id = chain.id;
            if chains.insert(id, chain).is_some() {
                return Err(RegistryError::DuplicateChain(id));
            }
        }
        for (chain_id, tokens) in &document.tokens {
            if !chains.contains_key(chain_id) {
                let token = tokens.first().map(|t| t.address).unwrap_or_default();
                return Err(RegistryError::UnknownTokenChain { chain_id: *chain_id, token });
            }
        }

        Ok(Self {
            chains,
            reactive: document.reactive,
            tokens: document.tokens,
            canonical_tokens: document.canonical_tokens,
        })
    }

    /// The built-in public testnet registry.
    pub fn testnet() -> Result<Self, RegistryError> {
        Self::from_json_str(TESTNET_JSON)
    }

    /// Looks up a chain by id.
    pub fn chain(&self, chain_id: ChainId) -> Option<&ChainConfig> {
        self.chains.get(&chain_id)
    }

    /// All registered chains, ordered by id.
    pub fn chains(&self) -> impl Iterator<Item = &ChainConfig> {
        self.chains.values()
    }

    /// `true` if the chain is registered.
    pub fn supports(&self, chain_id: ChainId) -> bool {
        self.chains.contains_key(&chain_id)
    }

    /// Display name of a chain, or `Chain <id>` when it is not registered.
    pub fn chain_name(&self, chain_id: ChainId) -> String {
        self.chain(chain_id).map_or_else(|| format!("Chain {chain_id}"), |c| c.name.clone())
    }

    /// Explorer link for a transaction on a registered chain.
    pub fn explorer_tx_url(&self, chain_id: ChainId, tx_hash: B256) -> Option<String> {
        self.chain(chain_id).map(|chain| chain.explorer_tx_url(tx_hash))
    }

    /// The coordinating ledger.
    pub const fn reactive(&self) -> &ReactiveNetworkConfig {
        &self.reactive
    }

    /// Tokens listed for a chain. Empty for unknown chains.
    pub fn tokens(&self, chain_id: ChainId) -> &[TokenConfig] {
        self.tokens.get(&chain_id).map(Vec::as_slice).unwrap_or_default()
    }

    /// Looks up a token by chain and address.
    pub fn token(&self, chain_id: ChainId, address: Address) -> Option<&TokenConfig> {
        self.tokens(chain_id).iter().find(|token| token.address == address)
    }

    /// The canonical address of a token, or the address itself when it has no mapping.
    pub fn canonical_token(&self, address: Address) -> Address {
        self.canonical_tokens.get(&address).copied().unwrap_or(address)
    }
}
