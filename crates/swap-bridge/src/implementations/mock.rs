//! Deterministic bridge quote provider for tests and local development.
//!
//! Charges a flat percentage relay fee in the input token and delivers the
//! rest rescaled to the output token's decimals.

use crate::{BridgeError, BridgeFactory, BridgeQuoteInterface, BridgeRegistry};
use alloy_primitives::{Address, Bytes, U256};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashSet;
use std::sync::Mutex;
use swap_types::utils::{convert_decimals, convert_decimals_ceil, BPS_DENOMINATOR};
use swap_types::{
	current_timestamp, BridgeQuote, BridgeQuoteRequest, CallJournal, ConfigSchema, Field,
	FieldType, ImplementationRegistry, Schema, SuggestedFees, ValidationError,
};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MockBridgeConfig {
	#[serde(default)]
	pub relay_fee_bps: u64,
	#[serde(default)]
	pub exclusive_relayer: Option<Address>,
	#[serde(default)]
	pub exclusivity_period_seconds: u32,
}

pub struct MockBridgeSchema;

impl ConfigSchema for MockBridgeSchema {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		Schema::new(
			vec![],
			vec![
				Field::new(
					"relay_fee_bps",
					FieldType::Integer {
						min: Some(0),
						max: Some(9_999),
					},
				),
				Field::new("exclusive_relayer", FieldType::Address),
				Field::new(
					"exclusivity_period_seconds",
					FieldType::Integer {
						min: Some(0),
						max: Some(u32::MAX as i64),
					},
				),
			],
		)
		.validate(config)
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgeQuoteKind {
	MinOutput,
	ExactInput,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedBridgeQuote {
	pub kind: BridgeQuoteKind,
	pub input_token: Address,
	pub output_token: Address,
	pub amount: U256,
	pub recipient: Address,
	pub message: Bytes,
}

pub struct MockBridgeQuotes {
	config: MockBridgeConfig,
	disabled: HashSet<(u64, Address)>,
	quotes: Mutex<Vec<RecordedBridgeQuote>>,
	journal: CallJournal,
}

impl Default for MockBridgeQuotes {
	fn default() -> Self {
		Self::new(MockBridgeConfig::default())
	}
}

impl MockBridgeQuotes {
	pub fn new(config: MockBridgeConfig) -> Self {
		Self {
			config,
			disabled: HashSet::new(),
			quotes: Mutex::new(Vec::new()),
			journal: CallJournal::new(),
		}
	}

	pub fn with_relay_fee_bps(mut self, bps: u64) -> Self {
		self.config.relay_fee_bps = bps.min(BPS_DENOMINATOR - 1);
		self
	}

	/// Makes every quote from `(chain_id, input_token)` fail with no route.
	pub fn without_route(mut self, chain_id: u64, input_token: Address) -> Self {
		self.disabled.insert((chain_id, input_token));
		self
	}

	pub fn with_journal(mut self, journal: CallJournal) -> Self {
		self.journal = journal;
		self
	}

	pub fn quotes(&self) -> Vec<RecordedBridgeQuote> {
		self.quotes.lock().map(|q| q.clone()).unwrap_or_default()
	}

	fn record(&self, kind: BridgeQuoteKind, request: &BridgeQuoteRequest) -> Result<(), BridgeError> {
		self.journal.record(format!(
			"bridge.{} {} -> {} amount={}",
			match kind {
				BridgeQuoteKind::MinOutput => "quote_for_min_output",
				BridgeQuoteKind::ExactInput => "quote_for_exact_input",
			},
			request.input_token.symbol,
			request.output_token.symbol,
			request.amount
		));
		if let Ok(mut quotes) = self.quotes.lock() {
			quotes.push(RecordedBridgeQuote {
				kind,
				input_token: request.input_token.address,
				output_token: request.output_token.address,
				amount: request.amount,
				recipient: request.recipient,
				message: request.message.clone(),
			});
		}

		let key = (request.input_token.chain_id, request.input_token.address);
		if self.disabled.contains(&key) {
			return Err(BridgeError::NoRoute(format!(
				"{} -> {}",
				request.input_token, request.output_token
			)));
		}
		Ok(())
	}

	fn fee(&self, input_amount: U256) -> U256 {
		input_amount.saturating_mul(U256::from(self.config.relay_fee_bps))
			/ U256::from(BPS_DENOMINATOR)
	}

	fn build_quote(&self, request: &BridgeQuoteRequest, input_amount: U256) -> BridgeQuote {
		let fee = self.fee(input_amount);
		let output_amount = convert_decimals(
			input_amount - fee,
			request.input_token.decimals,
			request.output_token.decimals,
		);
		let timestamp = current_timestamp() as u32;
		let (exclusive_relayer, exclusivity_deadline) = match self.config.exclusive_relayer {
			Some(relayer) => (
				relayer,
				timestamp.saturating_add(self.config.exclusivity_period_seconds),
			),
			None => (Address::ZERO, 0),
		};

		BridgeQuote {
			input_token: request.input_token.clone(),
			output_token: request.output_token.clone(),
			input_amount,
			output_amount,
			message: request.message.clone(),
			suggested_fees: SuggestedFees {
				exclusive_relayer,
				timestamp,
				exclusivity_deadline,
				total_relay_fee: fee,
			},
		}
	}
}

#[async_trait]
impl BridgeQuoteInterface for MockBridgeQuotes {
	fn config_schema(&self) -> Box<dyn ConfigSchema> {
		Box::new(MockBridgeSchema)
	}

	async fn quote_for_min_output(
		&self,
		request: &BridgeQuoteRequest,
	) -> Result<BridgeQuote, BridgeError> {
		self.record(BridgeQuoteKind::MinOutput, request)?;

		// Smallest input whose post-fee output still covers the request.
		let net_input = convert_decimals_ceil(
			request.amount,
			request.output_token.decimals,
			request.input_token.decimals,
		);
		let keep = U256::from(BPS_DENOMINATOR - self.config.relay_fee_bps);
		let scaled = net_input.saturating_mul(U256::from(BPS_DENOMINATOR));
		let input_amount = if scaled.is_zero() {
			U256::ZERO
		} else {
			(scaled - U256::from(1)) / keep + U256::from(1)
		};
		Ok(self.build_quote(request, input_amount))
	}

	async fn quote_for_exact_input(
		&self,
		request: &BridgeQuoteRequest,
	) -> Result<BridgeQuote, BridgeError> {
		self.record(BridgeQuoteKind::ExactInput, request)?;
		Ok(self.build_quote(request, request.amount))
	}
}

pub struct Registry;

impl ImplementationRegistry for Registry {
	const NAME: &'static str = "mock";
	type Factory = BridgeFactory;

	fn factory() -> Self::Factory {
		create_bridge
	}
}

impl BridgeRegistry for Registry {}

pub fn create_bridge(config: &toml::Value) -> Result<Box<dyn BridgeQuoteInterface>, BridgeError> {
	MockBridgeSchema
		.validate(config)
		.map_err(|e| BridgeError::Configuration(e.to_string()))?;
	let parsed: MockBridgeConfig = config
		.clone()
		.try_into()
		.map_err(|e: toml::de::Error| BridgeError::Configuration(e.message().to_string()))?;
	Ok(Box::new(MockBridgeQuotes::new(parsed)))
}
