//! JSON-RPC chain reader built on alloy providers, one per configured network.

use crate::{ChainError, ChainFactory, ChainReaderInterface, ChainRegistry};
use alloy_primitives::{Address, Bytes, B256, U256};
use alloy_provider::{Provider, ProviderBuilder};
use alloy_rpc_types::TransactionRequest;
use alloy_sol_types::{sol, SolCall};
use alloy_transport_http::Http;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use swap_types::{
	ConfigSchema, Field, FieldType, ImplementationRegistry, NetworksConfig, ReportedVersion,
	Schema, ValidationError,
};
use tracing::debug;

sol! {
	interface IERC20Permit {
		function name() external view returns (string);
		function version() external view returns (string);
		function nonces(address owner) external view returns (uint256);
		function DOMAIN_SEPARATOR() external view returns (bytes32);
	}

	interface INumericVersion {
		function version() external view returns (uint256);
	}

	interface ISpokePoolClock {
		function getCurrentTime() external view returns (uint256);
		function fillDeadlineBuffer() external view returns (uint32);
	}
}

type HttpProvider = Arc<dyn Provider<Http<reqwest::Client>> + Send + Sync>;

pub struct AlloyChainSchema;

impl ConfigSchema for AlloyChainSchema {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		Schema::new(
			vec![],
			vec![Field::new(
				"network_ids",
				FieldType::Array(Box::new(FieldType::Integer {
					min: Some(1),
					max: None,
				})),
			)],
		)
		.validate(config)
	}
}

pub struct AlloyChainReader {
	providers: HashMap<u64, HttpProvider>,
	spoke_pools: HashMap<u64, Address>,
}

impl AlloyChainReader {
	/// Creates providers for `network_ids`, or for every network when empty.
	pub fn new(network_ids: &[u64], networks: &NetworksConfig) -> Result<Self, ChainError> {
		let selected: Vec<u64> = if network_ids.is_empty() {
			networks.keys().copied().collect()
		} else {
			network_ids.to_vec()
		};

		let mut providers = HashMap::new();
		let mut spoke_pools = HashMap::new();
		for chain_id in selected {
			let network = networks
				.get(&chain_id)
				.ok_or(ChainError::UnsupportedChain(chain_id))?;
			let url = network.rpc_url.parse().map_err(|e| {
				ChainError::Configuration(format!("Invalid RPC URL for network {}: {}", chain_id, e))
			})?;
			let provider = ProviderBuilder::new().on_http(url);
			providers.insert(chain_id, Arc::new(provider) as HttpProvider);
			spoke_pools.insert(chain_id, network.spoke_pool_address);
		}

		Ok(Self {
			providers,
			spoke_pools,
		})
	}

	fn provider(&self, chain_id: u64) -> Result<&HttpProvider, ChainError> {
		self.providers
			.get(&chain_id)
			.ok_or(ChainError::UnsupportedChain(chain_id))
	}

	fn spoke_pool(&self, chain_id: u64) -> Result<Address, ChainError> {
		self.spoke_pools
			.get(&chain_id)
			.copied()
			.ok_or(ChainError::UnsupportedChain(chain_id))
	}

	async fn eth_call(
		&self,
		chain_id: u64,
		contract: Address,
		method: &'static str,
		calldata: Vec<u8>,
	) -> Result<Bytes, ChainError> {
		let provider = self.provider(chain_id)?;
		debug!(chain_id, %contract, method, "eth_call");
		provider
			.call(&TransactionRequest::default().to(contract).input(calldata.into()))
			.await
			.map_err(|e| ChainError::Call {
				method,
				contract,
				reason: e.to_string(),
			})
	}
}

fn decode_error(method: &'static str) -> impl Fn(alloy_sol_types::Error) -> ChainError {
	move |e| ChainError::Decode {
		method,
		reason: e.to_string(),
	}
}

/// Decodes a `version()` result, trying a string first and an integer second.
pub fn decode_version(data: &[u8]) -> Result<ReportedVersion, ChainError> {
	if let Ok(text) = IERC20Permit::versionCall::abi_decode_returns(data, true) {
		return Ok(ReportedVersion::Text(text._0));
	}
	let numeric = INumericVersion::versionCall::abi_decode_returns(data, true)
		.map_err(decode_error("version"))?;
	let value = u64::try_from(numeric._0).map_err(|_| ChainError::Decode {
		method: "version",
		reason: format!("numeric version {} out of range", numeric._0),
	})?;
	Ok(ReportedVersion::Numeric(value))
}

#[async_trait]
impl ChainReaderInterface for AlloyChainReader {
	fn config_schema(&self) -> Box<dyn ConfigSchema> {
		Box::new(AlloyChainSchema)
	}

	async fn token_name(&self, chain_id: u64, token: Address) -> Result<String, ChainError> {
		let data = self
			.eth_call(chain_id, token, "name", IERC20Permit::nameCall {}.abi_encode())
			.await?;
		Ok(IERC20Permit::nameCall::abi_decode_returns(&data, true)
			.map_err(decode_error("name"))?
			._0)
	}

	async fn token_version(
		&self,
		chain_id: u64,
		token: Address,
	) -> Result<ReportedVersion, ChainError> {
		let data = self
			.eth_call(
				chain_id,
				token,
				"version",
				IERC20Permit::versionCall {}.abi_encode(),
			)
			.await?;
		decode_version(&data)
	}

	async fn permit_nonce(
		&self,
		chain_id: u64,
		token: Address,
		owner: Address,
	) -> Result<U256, ChainError> {
		let data = self
			.eth_call(
				chain_id,
				token,
				"nonces",
				IERC20Permit::noncesCall { owner }.abi_encode(),
			)
			.await?;
		Ok(IERC20Permit::noncesCall::abi_decode_returns(&data, true)
			.map_err(decode_error("nonces"))?
			._0)
	}

	async fn domain_separator(&self, chain_id: u64, token: Address) -> Result<B256, ChainError> {
		let data = self
			.eth_call(
				chain_id,
				token,
				"DOMAIN_SEPARATOR",
				IERC20Permit::DOMAIN_SEPARATORCall {}.abi_encode(),
			)
			.await?;
		Ok(
			IERC20Permit::DOMAIN_SEPARATORCall::abi_decode_returns(&data, true)
				.map_err(decode_error("DOMAIN_SEPARATOR"))?
				._0,
		)
	}

	async fn spoke_pool_current_time(&self, chain_id: u64) -> Result<u32, ChainError> {
		let spoke_pool = self.spoke_pool(chain_id)?;
		let data = self
			.eth_call(
				chain_id,
				spoke_pool,
				"getCurrentTime",
				ISpokePoolClock::getCurrentTimeCall {}.abi_encode(),
			)
			.await?;
		let now = ISpokePoolClock::getCurrentTimeCall::abi_decode_returns(&data, true)
			.map_err(decode_error("getCurrentTime"))?
			._0;
		u32::try_from(now).map_err(|_| ChainError::Decode {
			method: "getCurrentTime",
			reason: format!("timestamp {} does not fit in uint32", now),
		})
	}

	async fn fill_deadline_buffer(&self, chain_id: u64) -> Result<u32, ChainError> {
		let spoke_pool = self.spoke_pool(chain_id)?;
		let data = self
			.eth_call(
				chain_id,
				spoke_pool,
				"fillDeadlineBuffer",
				ISpokePoolClock::fillDeadlineBufferCall {}.abi_encode(),
			)
			.await?;
		Ok(
			ISpokePoolClock::fillDeadlineBufferCall::abi_decode_returns(&data, true)
				.map_err(decode_error("fillDeadlineBuffer"))?
				._0,
		)
	}
}

pub struct Registry;

impl ImplementationRegistry for Registry {
	const NAME: &'static str = "alloy";
	type Factory = ChainFactory;

	fn factory() -> Self::Factory {
		create_chain_reader
	}
}

impl ChainRegistry for Registry {}

pub fn create_chain_reader(
	config: &toml::Value,
	networks: &NetworksConfig,
) -> Result<Box<dyn ChainReaderInterface>, ChainError> {
	AlloyChainSchema
		.validate(config)
		.map_err(|e| ChainError::Configuration(e.to_string()))?;

	let network_ids: Vec<u64> = config
		.get("network_ids")
		.and_then(|v| v.as_array())
		.map(|ids| {
			ids.iter()
				.filter_map(|v| v.as_integer())
				.map(|v| v as u64)
				.collect()
		})
		.unwrap_or_default();

	Ok(Box::new(AlloyChainReader::new(&network_ids, networks)?))
}
