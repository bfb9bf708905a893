//! Configuration for the cross-swap engine.
//!
//! Configuration is loaded from TOML. Values may reference environment
//! variables with `${VAR}` or `${VAR:-default}`, and a file may pull other
//! files in with `include = ["networks.toml", "routes.toml"]`. Each top-level
//! section must live in exactly one file.

mod loader;

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::str::FromStr;
use swap_types::{networks::deserialize_networks, BridgeRouteConfig, NetworksConfig};
use thiserror::Error;

pub use loader::ConfigLoader;

#[derive(Debug, Error)]
pub enum ConfigError {
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
	#[error("Configuration error: {0}")]
	Parse(String),
	#[error("Validation error: {0}")]
	Validation(String),
}

impl From<toml::de::Error> for ConfigError {
	fn from(err: toml::de::Error) -> Self {
		// Keep the message only; the default Display dumps the whole input.
		ConfigError::Parse(err.message().to_string())
	}
}

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
	pub engine: EngineConfig,
	/// Per-chain RPC endpoints, bridge contracts and known tokens.
	#[serde(deserialize_with = "deserialize_networks")]
	pub networks: NetworksConfig,
	/// Enabled bridgeable-to-bridgeable routes.
	#[serde(default)]
	pub routes: Vec<BridgeRouteConfig>,
	/// DEX strategy implementations.
	pub dex: CollaboratorConfig,
	/// Bridge quote provider implementations.
	pub bridge: CollaboratorConfig,
	/// Chain reader implementations.
	pub chain: CollaboratorConfig,
}

/// Engine-wide tuning knobs.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EngineConfig {
	pub id: String,
	/// Markup applied to the indicative origin-swap input before the firm
	/// re-quote. Defaults to 50 bps (0.5%).
	#[serde(default = "default_indicative_quote_buffer_bps")]
	pub indicative_quote_buffer_bps: u32,
	/// Intermediate bridge token symbols tried first for any-to-any routes.
	#[serde(default = "default_preferred_bridge_tokens")]
	pub preferred_bridge_tokens: Vec<String>,
	/// Upper bound on bridge routes composed concurrently for any-to-any routes.
	#[serde(default = "default_max_bridge_route_candidates")]
	pub max_bridge_route_candidates: usize,
	/// EIP-712 domain version used when a token reports no usable version.
	#[serde(default = "default_eip712_version")]
	pub default_eip712_version: u64,
}

fn default_indicative_quote_buffer_bps() -> u32 {
	50
}

fn default_preferred_bridge_tokens() -> Vec<String> {
	["WETH", "USDC", "USDT", "DAI"]
		.into_iter()
		.map(String::from)
		.collect()
}

fn default_max_bridge_route_candidates() -> usize {
	1
}

fn default_eip712_version() -> u64 {
	1
}

/// Selects one primary implementation among named, raw TOML implementation tables.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CollaboratorConfig {
	pub primary: String,
	pub implementations: HashMap<String, toml::Value>,
}

impl CollaboratorConfig {
	/// The raw table of the primary implementation.
	pub fn primary_config(&self) -> Option<&toml::Value> {
		self.implementations.get(&self.primary)
	}

	fn validate(&self, section: &str) -> Result<(), ConfigError> {
		if self.primary.is_empty() {
			return Err(ConfigError::Validation(format!(
				"{} primary implementation cannot be empty",
				section
			)));
		}
		if !self.implementations.contains_key(&self.primary) {
			return Err(ConfigError::Validation(format!(
				"Primary {} '{}' not found in implementations",
				section, self.primary
			)));
		}
		Ok(())
	}
}

/// Replaces `${VAR}` and `${VAR:-default}` with environment values.
///
/// Inputs over 1MB are rejected to bound regex work.
pub(crate) fn resolve_env_vars(input: &str) -> Result<String, ConfigError> {
	const MAX_INPUT_SIZE: usize = 1024 * 1024;
	if input.len() > MAX_INPUT_SIZE {
		return Err(ConfigError::Validation(format!(
			"Configuration file too large: {} bytes (max: {} bytes)",
			input.len(),
			MAX_INPUT_SIZE
		)));
	}

	let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]{0,127})(?::-([^}]{0,256}))?\}")
		.map_err(|e| ConfigError::Parse(format!("Regex error: {}", e)))?;

	let mut result = String::with_capacity(input.len());
	let mut last_end = 0;
	for cap in re.captures_iter(input) {
		let (Some(full_match), Some(var_name)) = (cap.get(0), cap.get(1)) else {
			continue;
		};
		let value = match (std::env::var(var_name.as_str()), cap.get(2)) {
			(Ok(v), _) => v,
			(Err(_), Some(default)) => default.as_str().to_string(),
			(Err(_), None) => {
				return Err(ConfigError::Validation(format!(
					"Environment variable '{}' not found",
					var_name.as_str()
				)))
			},
		};
		result.push_str(&input[last_end..full_match.start()]);
		result.push_str(&value);
		last_end = full_match.end();
	}
	result.push_str(&input[last_end..]);

	Ok(result)
}

impl Config {
	/// Loads a configuration file together with its includes.
	pub async fn from_file(path: &str) -> Result<Self, ConfigError> {
		let path_buf = Path::new(path);
		let base_dir = path_buf.parent().unwrap_or_else(|| Path::new("."));
		let file_name = path_buf
			.file_name()
			.ok_or_else(|| ConfigError::Validation(format!("Invalid path: {}", path)))?;

		let mut loader = ConfigLoader::new(base_dir);
		loader.load_config(file_name).await
	}

	fn validate(&self) -> Result<(), ConfigError> {
		if self.engine.id.is_empty() {
			return Err(ConfigError::Validation("Engine ID cannot be empty".into()));
		}
		if self.engine.indicative_quote_buffer_bps > 10_000 {
			return Err(ConfigError::Validation(format!(
				"indicative_quote_buffer_bps must be at most 10000, got {}",
				self.engine.indicative_quote_buffer_bps
			)));
		}
		if self.engine.max_bridge_route_candidates == 0 {
			return Err(ConfigError::Validation(
				"max_bridge_route_candidates must be at least 1".into(),
			));
		}
		if self.engine.default_eip712_version == 0 {
			return Err(ConfigError::Validation(
				"default_eip712_version must be at least 1".into(),
			));
		}

		if self.networks.len() < 2 {
			return Err(ConfigError::Validation(
				"At least 2 different networks must be configured".into(),
			));
		}
		for (chain_id, network) in &self.networks {
			if network.rpc_url.is_empty() {
				return Err(ConfigError::Validation(format!(
					"Network {} must have rpc_url",
					chain_id
				)));
			}
		}

		self.validate_routes()?;

		self.dex.validate("dex")?;
		self.bridge.validate("bridge")?;
		self.chain.validate("chain")?;

		Ok(())
	}

	/// Every route must connect two distinct configured networks, reference
	/// tokens listed on them and appear only once.
	fn validate_routes(&self) -> Result<(), ConfigError> {
		let mut seen = HashSet::new();
		for route in &self.routes {
			if route.origin_chain_id == route.destination_chain_id {
				return Err(ConfigError::Validation(format!(
					"Route {} -> {} must connect two different chains",
					route.origin_token_symbol, route.destination_token_symbol
				)));
			}
			for (chain_id, token) in [
				(route.origin_chain_id, &route.origin_token),
				(route.destination_chain_id, &route.destination_token),
			] {
				let network = self.networks.get(&chain_id).ok_or_else(|| {
					ConfigError::Validation(format!(
						"Route references network {} which doesn't exist in networks config",
						chain_id
					))
				})?;
				if network.token(token).is_none() {
					return Err(ConfigError::Validation(format!(
						"Route token {} is not configured on network {}",
						token, chain_id
					)));
				}
			}
			if !seen.insert((
				route.origin_chain_id,
				route.origin_token,
				route.destination_chain_id,
				route.destination_token,
			)) {
				return Err(ConfigError::Validation(format!(
					"Duplicate route {}@{} -> {}@{}",
					route.origin_token_symbol,
					route.origin_chain_id,
					route.destination_token_symbol,
					route.destination_chain_id
				)));
			}
		}
		Ok(())
	}
}

/// Parses, resolves environment variables and validates.
impl FromStr for Config {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let resolved = resolve_env_vars(s)?;
		let config: Config = toml::from_str(&resolved)?;
		config.validate()?;
		tracing::debug!(
			engine_id = %config.engine.id,
			networks = config.networks.len(),
			routes = config.routes.len(),
			"Configuration parsed"
		);
		Ok(config)
	}
}

#[cfg(test)]
pub(crate) mod tests {
	use super::*;

	pub(crate) const NETWORKS: &str = r#"
[networks.1]
rpc_url = "http://localhost:8545"
spoke_pool_address = "0x5c7BCd6E7De5423a257D81B442095A1a6ced35C5"
multicall_handler_address = "0x924a9f036260DdD5808007E1AA95f08eD08aA569"
[[networks.1.tokens]]
address = "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48"
symbol = "USDC"
decimals = 6

[networks.10]
rpc_url = "http://localhost:8546"
spoke_pool_address = "0x6f26Bf09B1C792e3228e5467807a900A503c0281"
multicall_handler_address = "0x924a9f036260DdD5808007E1AA95f08eD08aA569"
[[networks.10.tokens]]
address = "0x0b2C639c533813f4Aa9D7837CAf62653d097Ff85"
symbol = "USDC"
decimals = 6
"#;

	pub(crate) const ROUTES: &str = r#"
[[routes]]
origin_chain_id = 1
destination_chain_id = 10
origin_token = "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48"
destination_token = "0x0b2C639c533813f4Aa9D7837CAf62653d097Ff85"
origin_token_symbol = "USDC"
destination_token_symbol = "USDC"
"#;

	pub(crate) const COLLABORATORS: &str = r#"
[dex]
primary = "mock"
[dex.implementations.mock]

[bridge]
primary = "mock"
[bridge.implementations.mock]

[chain]
primary = "mock"
[chain.implementations.mock]
"#;

	fn full_config(engine: &str) -> String {
		format!("{}\n{}\n{}\n{}", engine, NETWORKS, ROUTES, COLLABORATORS)
	}

	#[test]
	fn test_env_var_resolution() {
		std::env::set_var("SWAP_TEST_HOST", "localhost");
		std::env::set_var("SWAP_TEST_PORT", "8545");

		let input = "url = \"http://${SWAP_TEST_HOST}:${SWAP_TEST_PORT}\"";
		let result = resolve_env_vars(input).unwrap();
		assert_eq!(result, "url = \"http://localhost:8545\"");

		std::env::remove_var("SWAP_TEST_HOST");
		std::env::remove_var("SWAP_TEST_PORT");
	}

	#[test]
	fn test_env_var_default_and_missing() {
		let with_default = resolve_env_vars("v = \"${SWAP_MISSING_VAR:-fallback}\"").unwrap();
		assert_eq!(with_default, "v = \"fallback\"");

		let missing = resolve_env_vars("v = \"${SWAP_MISSING_VAR}\"");
		assert!(missing.unwrap_err().to_string().contains("SWAP_MISSING_VAR"));
	}

	#[test]
	fn test_engine_defaults() {
		let config: Config = full_config("[engine]\nid = \"swap-1\"").parse().unwrap();

		assert_eq!(config.engine.indicative_quote_buffer_bps, 50);
		assert_eq!(config.engine.max_bridge_route_candidates, 1);
		assert_eq!(config.engine.default_eip712_version, 1);
		assert_eq!(
			config.engine.preferred_bridge_tokens,
			vec!["WETH", "USDC", "USDT", "DAI"]
		);
		assert_eq!(config.routes.len(), 1);
		assert_eq!(config.networks[&10].tokens[0].symbol, "USDC");
		assert!(config.dex.primary_config().is_some());
	}

	#[test]
	fn test_rejects_invalid_engine_settings() {
		let empty_id = full_config("[engine]\nid = \"\"").parse::<Config>();
		assert!(empty_id.unwrap_err().to_string().contains("Engine ID"));

		let zero_candidates =
			full_config("[engine]\nid = \"x\"\nmax_bridge_route_candidates = 0").parse::<Config>();
		assert!(zero_candidates
			.unwrap_err()
			.to_string()
			.contains("max_bridge_route_candidates"));

		let huge_buffer =
			full_config("[engine]\nid = \"x\"\nindicative_quote_buffer_bps = 20000").parse::<Config>();
		assert!(huge_buffer.is_err());
	}

	#[test]
	fn test_rejects_route_to_unknown_network() {
		let raw = format!(
			"[engine]\nid = \"x\"\n{}\n{}\n{}",
			NETWORKS,
			ROUTES.replace("destination_chain_id = 10", "destination_chain_id = 137"),
			COLLABORATORS
		);
		let err = raw.parse::<Config>().unwrap_err().to_string();
		assert!(err.contains("network 137"));
	}

	#[test]
	fn test_rejects_unknown_primary() {
		let raw = full_config("[engine]\nid = \"x\"").replace(
			"[dex]\nprimary = \"mock\"",
			"[dex]\nprimary = \"aggregator\"",
		);
		let err = raw.parse::<Config>().unwrap_err().to_string();
		assert!(err.contains("Primary dex 'aggregator'"));
	}
}
