//! Network, token and bridge route configuration.
//!
//! These types are deserialized straight from the `[networks.<chainId>]` and
//! `[[routes]]` sections of the configuration file and later turned into the
//! immutable route registry used by the classifier.

use alloy_primitives::Address;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;

/// A token known on a network.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct TokenConfig {
	pub address: Address,
	pub symbol: String,
	pub decimals: u8,
}

/// Per-chain settings.
///
/// * `spoke_pool_address` - bridge deposit entry point on this chain
/// * `multicall_handler_address` - destination multicall executor on this chain
/// * `tokens` - tokens that may appear in requests or routes on this chain
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NetworkConfig {
	pub rpc_url: String,
	pub spoke_pool_address: Address,
	pub multicall_handler_address: Address,
	#[serde(default)]
	pub tokens: Vec<TokenConfig>,
}

impl NetworkConfig {
	pub fn token(&self, address: &Address) -> Option<&TokenConfig> {
		self.tokens.iter().find(|t| &t.address == address)
	}
}

/// Chain id to network configuration.
pub type NetworksConfig = HashMap<u64, NetworkConfig>;

/// An enabled bridge route between two bridgeable tokens.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct BridgeRouteConfig {
	pub origin_chain_id: u64,
	pub destination_chain_id: u64,
	pub origin_token: Address,
	pub destination_token: Address,
	pub origin_token_symbol: String,
	pub destination_token_symbol: String,
	/// Whether the origin token is bridged from the chain's native asset.
	#[serde(default)]
	pub is_native: bool,
}

/// Deserializes `[networks.<chainId>]` tables.
///
/// TOML table keys are always strings, so chain ids are parsed here.
pub fn deserialize_networks<'de, D>(deserializer: D) -> Result<NetworksConfig, D::Error>
where
	D: Deserializer<'de>,
{
	let string_map: HashMap<String, NetworkConfig> = HashMap::deserialize(deserializer)?;
	string_map
		.into_iter()
		.map(|(key, value)| {
			key.parse::<u64>()
				.map(|chain_id| (chain_id, value))
				.map_err(|e| serde::de::Error::custom(format!("Invalid chain_id '{}': {}", key, e)))
		})
		.collect()
}
