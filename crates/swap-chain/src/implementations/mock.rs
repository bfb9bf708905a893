//! In-memory chain reader for tests and local development.
//!
//! Tokens are registered with their EIP-712 metadata. Unless overridden, a
//! token's domain separator is derived from its name, version, chain and
//! address so that it verifies; tests override it to simulate forged domains.

use crate::{ChainError, ChainFactory, ChainReaderInterface, ChainRegistry};
use alloy_primitives::{Address, B256, U256};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use swap_types::utils::compute_domain_hash;
use swap_types::{
	current_timestamp, CallJournal, ConfigSchema, Field, FieldType, ImplementationRegistry,
	NetworksConfig, ReportedVersion, Schema, ValidationError,
};

const DEFAULT_FILL_DEADLINE_BUFFER: u32 = 6 * 60 * 60;

/// EIP-712 metadata of a mock token. `None` fields make the matching read fail.
#[derive(Debug, Clone, Deserialize)]
pub struct MockToken {
	pub chain_id: u64,
	pub address: Address,
	#[serde(default)]
	pub name: Option<String>,
	#[serde(default)]
	pub version: Option<ReportedVersion>,
	#[serde(default)]
	pub nonce: Option<u64>,
	#[serde(default)]
	pub domain_separator: Option<B256>,
}

impl MockToken {
	pub fn new(chain_id: u64, address: Address, name: &str, version: ReportedVersion) -> Self {
		Self {
			chain_id,
			address,
			name: Some(name.to_string()),
			version: Some(version),
			nonce: Some(0),
			domain_separator: None,
		}
	}

	fn derived_domain_separator(&self) -> Option<B256> {
		let name = self.name.as_ref()?;
		let version = match &self.version {
			Some(ReportedVersion::Text(v)) => v.clone(),
			Some(ReportedVersion::Numeric(v)) => v.to_string(),
			None => "1".to_string(),
		};
		Some(compute_domain_hash(name, &version, self.chain_id, &self.address))
	}
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MockChainConfig {
	#[serde(default)]
	pub current_time: Option<u32>,
	#[serde(default)]
	pub fill_deadline_buffer: Option<u32>,
	#[serde(default)]
	pub tokens: Vec<MockToken>,
}

pub struct MockChainSchema;

impl ConfigSchema for MockChainSchema {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		let token = Schema::new(
			vec![
				Field::new(
					"chain_id",
					FieldType::Integer {
						min: Some(1),
						max: None,
					},
				),
				Field::new("address", FieldType::Address),
			],
			vec![
				Field::new("name", FieldType::String),
				Field::new(
					"nonce",
					FieldType::Integer {
						min: Some(0),
						max: None,
					},
				),
			],
		);
		Schema::new(
			vec![],
			vec![
				Field::new(
					"current_time",
					FieldType::Integer {
						min: Some(0),
						max: Some(u32::MAX as i64),
					},
				),
				Field::new(
					"fill_deadline_buffer",
					FieldType::Integer {
						min: Some(0),
						max: Some(u32::MAX as i64),
					},
				),
				Field::new("tokens", FieldType::Array(Box::new(FieldType::Table(token)))),
			],
		)
		.validate(config)
	}
}

pub struct MockChainReader {
	current_time: Option<u32>,
	fill_deadline_buffer: u32,
	tokens: HashMap<(u64, Address), MockToken>,
	journal: CallJournal,
}

impl Default for MockChainReader {
	fn default() -> Self {
		Self::new(MockChainConfig::default())
	}
}

impl MockChainReader {
	pub fn new(config: MockChainConfig) -> Self {
		let tokens = config
			.tokens
			.into_iter()
			.map(|t| ((t.chain_id, t.address), t))
			.collect();
		Self {
			current_time: config.current_time,
			fill_deadline_buffer: config
				.fill_deadline_buffer
				.unwrap_or(DEFAULT_FILL_DEADLINE_BUFFER),
			tokens,
			journal: CallJournal::new(),
		}
	}

	pub fn with_token(mut self, token: MockToken) -> Self {
		self.tokens.insert((token.chain_id, token.address), token);
		self
	}

	pub fn with_clock(mut self, current_time: u32, fill_deadline_buffer: u32) -> Self {
		self.current_time = Some(current_time);
		self.fill_deadline_buffer = fill_deadline_buffer;
		self
	}

	pub fn with_journal(mut self, journal: CallJournal) -> Self {
		self.journal = journal;
		self
	}

	fn token(
		&self,
		chain_id: u64,
		token: Address,
		method: &'static str,
	) -> Result<&MockToken, ChainError> {
		self.journal
			.record(format!("chain.{} {:#x}@{}", method, token, chain_id));
		self.tokens
			.get(&(chain_id, token))
			.ok_or_else(|| not_exposed(method, token))
	}
}

fn not_exposed(method: &'static str, contract: Address) -> ChainError {
	ChainError::Call {
		method,
		contract,
		reason: "execution reverted".to_string(),
	}
}

#[async_trait]
impl ChainReaderInterface for MockChainReader {
	fn config_schema(&self) -> Box<dyn ConfigSchema> {
		Box::new(MockChainSchema)
	}

	async fn token_name(&self, chain_id: u64, token: Address) -> Result<String, ChainError> {
		self.token(chain_id, token, "name")?
			.name
			.clone()
			.ok_or_else(|| not_exposed("name", token))
	}

	async fn token_version(
		&self,
		chain_id: u64,
		token: Address,
	) -> Result<ReportedVersion, ChainError> {
		self.token(chain_id, token, "version")?
			.version
			.clone()
			.ok_or_else(|| not_exposed("version", token))
	}

	async fn permit_nonce(
		&self,
		chain_id: u64,
		token: Address,
		_owner: Address,
	) -> Result<U256, ChainError> {
		self.token(chain_id, token, "nonces")?
			.nonce
			.map(U256::from)
			.ok_or_else(|| not_exposed("nonces", token))
	}

	async fn domain_separator(&self, chain_id: u64, token: Address) -> Result<B256, ChainError> {
		let entry = self.token(chain_id, token, "DOMAIN_SEPARATOR")?;
		entry
			.domain_separator
			.or_else(|| entry.derived_domain_separator())
			.ok_or_else(|| not_exposed("DOMAIN_SEPARATOR", token))
	}

	async fn spoke_pool_current_time(&self, chain_id: u64) -> Result<u32, ChainError> {
		self.journal
			.record(format!("chain.getCurrentTime @{}", chain_id));
		Ok(self
			.current_time
			.unwrap_or_else(|| current_timestamp() as u32))
	}

	async fn fill_deadline_buffer(&self, chain_id: u64) -> Result<u32, ChainError> {
		self.journal
			.record(format!("chain.fillDeadlineBuffer @{}", chain_id));
		Ok(self.fill_deadline_buffer)
	}
}

pub struct Registry;

impl ImplementationRegistry for Registry {
	const NAME: &'static str = "mock";
	type Factory = ChainFactory;

	fn factory() -> Self::Factory {
		create_chain_reader
	}
}

impl ChainRegistry for Registry {}

pub fn create_chain_reader(
	config: &toml::Value,
	_networks: &NetworksConfig,
) -> Result<Box<dyn ChainReaderInterface>, ChainError> {
	MockChainSchema
		.validate(config)
		.map_err(|e| ChainError::Configuration(e.to_string()))?;
	let parsed: MockChainConfig = config
		.clone()
		.try_into()
		.map_err(|e: toml::de::Error| ChainError::Configuration(e.message().to_string()))?;
	Ok(Box::new(MockChainReader::new(parsed)))
}
