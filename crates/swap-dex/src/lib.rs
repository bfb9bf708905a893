//! DEX strategy collaborators.
//!
//! A DEX strategy prices single-chain swaps and exposes the router and
//! periphery contracts used to execute them. The engine treats a strategy as
//! stateless per call; any caching of router addresses is owned by the
//! implementation (see [`router_cache`]).

use alloy_primitives::Address;
use async_trait::async_trait;
use swap_types::{ConfigSchema, ImplementationRegistry, SwapQuote, SwapSpec, TradeType};
use thiserror::Error;

pub mod router_cache;

pub mod implementations {
	pub mod aggregator;
	pub mod mock;
}

#[derive(Debug, Error)]
pub enum DexError {
	/// No liquidity path exists between the two tokens.
	#[error("No swap route: {0}")]
	NoRoute(String),
	#[error("Network error: {0}")]
	Network(String),
	#[error("Invalid response: {0}")]
	InvalidResponse(String),
	#[error("Unsupported chain: {0}")]
	UnsupportedChain(u64),
	#[error("Configuration error: {0}")]
	Configuration(String),
}

/// Per-request options for [`DexStrategyInterface::fetch_quote`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetchOptions {
	/// Request a cheaper, non-binding price used only to size a firm request.
	pub use_indicative_quote: bool,
}

impl FetchOptions {
	pub fn indicative() -> Self {
		Self {
			use_indicative_quote: true,
		}
	}
}

#[async_trait]
pub trait DexStrategyInterface: Send + Sync {
	fn config_schema(&self) -> Box<dyn ConfigSchema>;

	/// Router contract that executes swaps on `chain_id`.
	async fn router_address(&self, chain_id: u64) -> Result<Address, DexError>;

	/// Origin-chain periphery contract that swaps and deposits in one call.
	async fn periphery_address(&self, chain_id: u64) -> Result<Address, DexError>;

	/// Quotes a swap.
	///
	/// For [`TradeType::ExactInput`] `spec.amount` is the input; for
	/// [`TradeType::ExactOutput`] it is the output. The returned
	/// `maximum_amount_in` and `min_amount_out` embed the slippage tolerance.
	async fn fetch_quote(
		&self,
		spec: &SwapSpec,
		trade_type: TradeType,
		options: FetchOptions,
	) -> Result<SwapQuote, DexError>;
}

pub type DexFactory = fn(&toml::Value) -> Result<Box<dyn DexStrategyInterface>, DexError>;

pub trait DexRegistry: ImplementationRegistry<Factory = DexFactory> {}

/// All DEX strategies that can be selected from configuration.
pub fn get_all_implementations() -> Vec<(&'static str, DexFactory)> {
	use implementations::{aggregator, mock};

	vec![
		(aggregator::Registry::NAME, aggregator::Registry::factory()),
		(mock::Registry::NAME, mock::Registry::factory()),
	]
}
