//! Route classification.
//!
//! Maps a token pair to the composition strategy that can serve it. The
//! checks run in a fixed order and the first match wins: a direct route beats
//! a bridgeable output token, which beats a bridgeable input token.

use crate::routes::RouteRegistry;
use alloy_primitives::Address;
use swap_types::CrossSwapType;

/// Classifies a token pair. Total: unsupported pairs classify as
/// `AnyToAny` and fail later when no candidate route or quote exists.
pub fn classify(
	registry: &RouteRegistry,
	input_token: Address,
	origin_chain_id: u64,
	output_token: Address,
	destination_chain_id: u64,
) -> CrossSwapType {
	if registry.is_route_enabled(input_token, origin_chain_id, output_token, destination_chain_id)
	{
		CrossSwapType::BridgeableToBridgeable
	} else if registry.is_output_token_bridgeable(
		output_token,
		origin_chain_id,
		destination_chain_id,
	) {
		CrossSwapType::AnyToBridgeable
	} else if registry.is_input_token_bridgeable(input_token, origin_chain_id, destination_chain_id)
	{
		CrossSwapType::BridgeableToAny
	} else {
		CrossSwapType::AnyToAny
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::routes::tests::{registry, DAI_1, OP_10, USDC_1, USDC_10, WETH_1, WETH_10};

	#[test]
	fn test_direct_route_wins() {
		// USDC_10 is also an output-bridgeable token; the direct route still wins.
		let registry = registry();
		assert_eq!(
			classify(&registry, USDC_1, 1, USDC_10, 10),
			CrossSwapType::BridgeableToBridgeable
		);
	}

	#[test]
	fn test_output_bridgeable_beats_input_bridgeable() {
		// WETH_1 is bridgeable and USDC_10 is bridgeable, but they are not a route.
		let registry = registry();
		assert_eq!(
			classify(&registry, WETH_1, 1, USDC_10, 10),
			CrossSwapType::AnyToBridgeable
		);
		assert_eq!(
			classify(&registry, DAI_1, 1, WETH_10, 10),
			CrossSwapType::AnyToBridgeable
		);
	}

	#[test]
	fn test_input_bridgeable_and_fallback() {
		let registry = registry();
		assert_eq!(
			classify(&registry, USDC_1, 1, OP_10, 10),
			CrossSwapType::BridgeableToAny
		);
		assert_eq!(
			classify(&registry, DAI_1, 1, OP_10, 10),
			CrossSwapType::AnyToAny
		);
	}

	#[test]
	fn test_unknown_chains_classify_as_any_to_any() {
		let registry = registry();
		assert_eq!(
			classify(&registry, USDC_1, 1, USDC_10, 8453),
			CrossSwapType::AnyToAny
		);
	}
}
