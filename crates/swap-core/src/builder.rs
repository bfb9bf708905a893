//! Builder for the cross-swap engine.
//!
//! Collaborators are created from their `[dex]`, `[bridge]` and `[chain]`
//! configuration sections through name-keyed factory maps, so that the
//! binary decides which implementations are available.

use crate::engine::CrossSwapEngine;
use crate::routes::RouteRegistry;
use std::collections::HashMap;
use std::fmt::Display;
use std::sync::Arc;
use swap_bridge::{BridgeError, BridgeQuoteInterface};
use swap_chain::{ChainError, ChainReaderInterface};
use swap_config::{CollaboratorConfig, Config};
use swap_dex::{DexError, DexStrategyInterface};
use swap_types::NetworksConfig;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BuilderError {
	#[error("Configuration error: {0}")]
	Config(String),
	#[error("Missing required component: {0}")]
	MissingComponent(String),
}

/// Factory functions keyed by implementation name.
pub struct EngineFactories<DF, BF, CF> {
	pub dex_factories: HashMap<String, DF>,
	pub bridge_factories: HashMap<String, BF>,
	pub chain_factories: HashMap<String, CF>,
}

pub struct EngineBuilder {
	config: Config,
}

impl EngineBuilder {
	pub fn new(config: Config) -> Self {
		Self { config }
	}

	pub fn build<DF, BF, CF>(
		self,
		factories: EngineFactories<DF, BF, CF>,
	) -> Result<CrossSwapEngine, BuilderError>
	where
		DF: Fn(&toml::Value) -> Result<Box<dyn DexStrategyInterface>, DexError>,
		BF: Fn(&toml::Value) -> Result<Box<dyn BridgeQuoteInterface>, BridgeError>,
		CF: Fn(&toml::Value, &NetworksConfig) -> Result<Box<dyn ChainReaderInterface>, ChainError>,
	{
		let dex = load_primary("dex", &self.config.dex, |name, config| {
			factories.dex_factories.get(name).map(|f| f(config))
		})?;
		let bridge = load_primary("bridge", &self.config.bridge, |name, config| {
			factories.bridge_factories.get(name).map(|f| f(config))
		})?;
		let networks = &self.config.networks;
		let chain = load_primary("chain", &self.config.chain, |name, config| {
			factories
				.chain_factories
				.get(name)
				.map(|f| f(config, networks))
		})?;

		let routes = Arc::new(RouteRegistry::from_config(&self.config));
		tracing::info!(
			engine_id = %self.config.engine.id,
			networks = self.config.networks.len(),
			routes = self.config.routes.len(),
			"Engine ready"
		);

		Ok(CrossSwapEngine::new(
			self.config.engine,
			routes,
			Arc::from(dex),
			Arc::from(bridge),
			Arc::from(chain),
		))
	}
}

/// Creates every configured implementation of a collaborator that has a
/// registered factory and returns the primary one.
fn load_primary<T: ?Sized, E: Display>(
	component: &'static str,
	section: &CollaboratorConfig,
	create: impl Fn(&str, &toml::Value) -> Option<Result<Box<T>, E>>,
) -> Result<Box<T>, BuilderError> {
	let mut implementations = HashMap::new();
	for (name, config) in &section.implementations {
		match create(name, config) {
			Some(Ok(implementation)) => {
				let is_primary = &section.primary == name;
				tracing::info!(component, implementation = %name, enabled = %is_primary, "Loaded");
				implementations.insert(name.clone(), implementation);
			},
			Some(Err(e)) => {
				tracing::error!(
					component,
					implementation = %name,
					error = %e,
					"Failed to create implementation"
				);
				return Err(BuilderError::Config(format!(
					"Failed to create {} implementation '{}': {}",
					component, name, e
				)));
			},
			None => {
				tracing::warn!(component, implementation = %name, "No factory registered");
			},
		}
	}

	if implementations.is_empty() {
		return Err(BuilderError::MissingComponent(format!(
			"No {} implementations available",
			component
		)));
	}

	implementations.remove(&section.primary).ok_or_else(|| {
		BuilderError::Config(format!(
			"Primary {} '{}' failed to load or has invalid configuration",
			component, section.primary
		))
	})
}
