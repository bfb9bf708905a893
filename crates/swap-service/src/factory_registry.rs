//! Factory maps for every collaborator implementation compiled into the
//! binary.

use std::collections::HashMap;
use swap_bridge::BridgeFactory;
use swap_chain::ChainFactory;
use swap_core::EngineFactories;
use swap_dex::DexFactory;

fn into_map<F>(implementations: Vec<(&'static str, F)>) -> HashMap<String, F> {
	implementations
		.into_iter()
		.map(|(name, factory)| (name.to_string(), factory))
		.collect()
}

/// All registered dex, bridge and chain reader factories, keyed by the name
/// used in the `implementations` tables of the configuration.
pub fn engine_factories() -> EngineFactories<DexFactory, BridgeFactory, ChainFactory> {
	EngineFactories {
		dex_factories: into_map(swap_dex::get_all_implementations()),
		bridge_factories: into_map(swap_bridge::get_all_implementations()),
		chain_factories: into_map(swap_chain::get_all_implementations()),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_mock_and_live_implementations_are_registered() {
		let factories = engine_factories();
		assert!(factories.dex_factories.contains_key("mock"));
		assert!(factories.dex_factories.contains_key("aggregator"));
		assert!(factories.bridge_factories.contains_key("across"));
		assert!(factories.chain_factories.contains_key("alloy"));
	}
}
