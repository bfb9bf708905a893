//! Immutable registry of enabled bridge routes and known tokens.
//!
//! Built once from configuration and shared by the classifier and the
//! composers. Nothing mutates it after construction.

use crate::CrossSwapError;
use alloy_primitives::Address;
use swap_config::Config;
use swap_types::{BridgeRouteConfig, NetworkConfig, NetworksConfig, Token};

#[derive(Debug, Clone)]
pub struct RouteRegistry {
	networks: NetworksConfig,
	routes: Vec<BridgeRouteConfig>,
}

impl RouteRegistry {
	pub fn new(networks: NetworksConfig, routes: Vec<BridgeRouteConfig>) -> Self {
		Self { networks, routes }
	}

	pub fn from_config(config: &Config) -> Self {
		Self::new(config.networks.clone(), config.routes.clone())
	}

	/// Whether a direct route connects the exact token pair.
	pub fn is_route_enabled(
		&self,
		origin_token: Address,
		origin_chain_id: u64,
		destination_token: Address,
		destination_chain_id: u64,
	) -> bool {
		self.routes.iter().any(|r| {
			r.origin_chain_id == origin_chain_id
				&& r.origin_token == origin_token
				&& r.destination_chain_id == destination_chain_id
				&& r.destination_token == destination_token
		})
	}

	/// Whether `token` can enter the bridge on the origin chain towards the
	/// destination chain.
	pub fn is_input_token_bridgeable(
		&self,
		token: Address,
		origin_chain_id: u64,
		destination_chain_id: u64,
	) -> bool {
		self.route_by_input_token_and_destination_chain(token, origin_chain_id, destination_chain_id)
			.is_some()
	}

	/// Whether `token` can leave the bridge on the destination chain when
	/// coming from the origin chain.
	pub fn is_output_token_bridgeable(
		&self,
		token: Address,
		origin_chain_id: u64,
		destination_chain_id: u64,
	) -> bool {
		self.route_by_output_token_and_origin_chain(token, destination_chain_id, origin_chain_id)
			.is_some()
	}

	pub fn route_by_input_token_and_destination_chain(
		&self,
		input_token: Address,
		origin_chain_id: u64,
		destination_chain_id: u64,
	) -> Option<&BridgeRouteConfig> {
		self.routes.iter().find(|r| {
			r.origin_chain_id == origin_chain_id
				&& r.origin_token == input_token
				&& r.destination_chain_id == destination_chain_id
		})
	}

	pub fn route_by_output_token_and_origin_chain(
		&self,
		output_token: Address,
		destination_chain_id: u64,
		origin_chain_id: u64,
	) -> Option<&BridgeRouteConfig> {
		self.routes.iter().find(|r| {
			r.destination_chain_id == destination_chain_id
				&& r.destination_token == output_token
				&& r.origin_chain_id == origin_chain_id
		})
	}

	/// All routes between two chains, in configuration order.
	pub fn routes_by_chain_pair(
		&self,
		origin_chain_id: u64,
		destination_chain_id: u64,
	) -> Vec<&BridgeRouteConfig> {
		self.routes
			.iter()
			.filter(|r| {
				r.origin_chain_id == origin_chain_id
					&& r.destination_chain_id == destination_chain_id
			})
			.collect()
	}

	pub fn resolve_token(&self, address: Address, chain_id: u64) -> Result<Token, CrossSwapError> {
		let token = self.network(chain_id)?.token(&address).ok_or_else(|| {
			CrossSwapError::InvalidRequest(format!(
				"Token {:#x} is not configured on chain {}",
				address, chain_id
			))
		})?;
		Ok(Token::new(
			token.address,
			chain_id,
			token.decimals,
			token.symbol.clone(),
		))
	}

	pub fn network(&self, chain_id: u64) -> Result<&NetworkConfig, CrossSwapError> {
		self.networks
			.get(&chain_id)
			.ok_or_else(|| CrossSwapError::Config(format!("Network {} is not configured", chain_id)))
	}
}
