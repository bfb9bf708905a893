//! Read-only chain access.
//!
//! The engine reads token metadata for typed-data signing (`name`,
//! `version`, `nonces`, `DOMAIN_SEPARATOR`) and the bridge spoke pool's
//! clock and fill-deadline buffer. Nothing here sends transactions.

use alloy_primitives::{Address, B256, U256};
use async_trait::async_trait;
use swap_types::{ConfigSchema, ImplementationRegistry, NetworksConfig, ReportedVersion};
use thiserror::Error;

pub mod implementations {
	pub mod evm {
		pub mod alloy;
	}
	pub mod mock;
}

#[derive(Debug, Error)]
pub enum ChainError {
	/// The contract call reverted or the RPC failed.
	#[error("Call to {method} on {contract} failed: {reason}")]
	Call {
		method: &'static str,
		contract: Address,
		reason: String,
	},
	#[error("Failed to decode {method} result: {reason}")]
	Decode {
		method: &'static str,
		reason: String,
	},
	#[error("No network configured for chain {0}")]
	UnsupportedChain(u64),
	#[error("Configuration error: {0}")]
	Configuration(String),
}

#[async_trait]
pub trait ChainReaderInterface: Send + Sync {
	fn config_schema(&self) -> Box<dyn ConfigSchema>;

	async fn token_name(&self, chain_id: u64, token: Address) -> Result<String, ChainError>;

	/// The token's `version()`, as a string or an integer depending on the contract.
	async fn token_version(
		&self,
		chain_id: u64,
		token: Address,
	) -> Result<ReportedVersion, ChainError>;

	/// EIP-2612 `nonces(owner)`.
	async fn permit_nonce(
		&self,
		chain_id: u64,
		token: Address,
		owner: Address,
	) -> Result<U256, ChainError>;

	async fn domain_separator(&self, chain_id: u64, token: Address) -> Result<B256, ChainError>;

	/// `getCurrentTime()` of the spoke pool configured for `chain_id`.
	async fn spoke_pool_current_time(&self, chain_id: u64) -> Result<u32, ChainError>;

	/// `fillDeadlineBuffer()` of the spoke pool configured for `chain_id`.
	async fn fill_deadline_buffer(&self, chain_id: u64) -> Result<u32, ChainError>;
}

pub type ChainFactory =
	fn(&toml::Value, &NetworksConfig) -> Result<Box<dyn ChainReaderInterface>, ChainError>;

pub trait ChainRegistry: ImplementationRegistry<Factory = ChainFactory> {}

pub fn get_all_implementations() -> Vec<(&'static str, ChainFactory)> {
	use implementations::{evm::alloy, mock};

	vec![
		(alloy::Registry::NAME, alloy::Registry::factory()),
		(mock::Registry::NAME, mock::Registry::factory()),
	]
}
