//! Errors surfaced by the cross-swap engine.
//!
//! Every failure is terminal for the request that produced it: the engine
//! never retries and never returns a partially composed quote.

use alloy_primitives::{B256, U256};
use swap_bridge::BridgeError;
use swap_chain::ChainError;
use swap_dex::DexError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CrossSwapError {
	/// No bridge route or no DEX route exists for a required leg.
	#[error("Route not found: {0}")]
	RouteNotFound(String),

	/// A re-quoted leg's worst-case output does not cover the input required
	/// by the leg it feeds.
	#[error("Quote invariant violated: worst-case output {min_output} is below required input {required}")]
	QuoteInvariantViolated { required: U256, min_output: U256 },

	/// The token does not expose the fields needed for typed-data signing.
	#[error("Signature scheme not supported: {0}")]
	SignatureSchemeUnsupported(String),

	/// The on-chain EIP-712 domain separator differs from the recomputed one.
	#[error("Domain separator mismatch: expected {expected}, token reports {actual}")]
	DomainSeparatorMismatch { expected: B256, actual: B256 },

	#[error("Invalid cross-swap type: {0}")]
	InvalidCrossSwapType(String),

	#[error("Invalid request: {0}")]
	InvalidRequest(String),

	#[error("DEX error: {0}")]
	Dex(DexError),

	#[error("Bridge error: {0}")]
	Bridge(BridgeError),

	#[error("Chain error: {0}")]
	Chain(ChainError),

	#[error("Configuration error: {0}")]
	Config(String),
}

impl From<DexError> for CrossSwapError {
	fn from(err: DexError) -> Self {
		match err {
			DexError::NoRoute(msg) => CrossSwapError::RouteNotFound(format!("no swap route: {}", msg)),
			other => CrossSwapError::Dex(other),
		}
	}
}

impl From<BridgeError> for CrossSwapError {
	fn from(err: BridgeError) -> Self {
		match err {
			BridgeError::NoRoute(msg) => {
				CrossSwapError::RouteNotFound(format!("no bridge route: {}", msg))
			},
			other => CrossSwapError::Bridge(other),
		}
	}
}

impl From<ChainError> for CrossSwapError {
	fn from(err: ChainError) -> Self {
		CrossSwapError::Chain(err)
	}
}
