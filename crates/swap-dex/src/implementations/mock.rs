//! Deterministic DEX strategy for tests and local development.
//!
//! Prices every pair at a fixed rate (1:1 after decimal conversion unless
//! configured otherwise) and applies the request's slippage tolerance the way
//! a real aggregator would. Calls are recorded so tests can assert on the
//! exact requests the engine made.

use crate::{DexError, DexFactory, DexRegistry, DexStrategyInterface, FetchOptions};
use alloy_primitives::{address, Address, Bytes, U256};
use alloy_sol_types::{sol, SolCall};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use swap_types::utils::{convert_decimals, with_max_slippage, with_min_slippage, BPS_DENOMINATOR};
use swap_types::{
	CallJournal, ConfigSchema, Field, FieldType, ImplementationRegistry, Schema, SwapQuote,
	SwapSpec, SwapTx, TradeType, ValidationError,
};

sol! {
	interface IMockRouter {
		function swapExactInput(address tokenIn, address tokenOut, uint256 amountIn, uint256 minAmountOut, address recipient) external returns (uint256);
		function swapExactOutput(address tokenIn, address tokenOut, uint256 amountOut, uint256 maxAmountIn, address recipient) external returns (uint256);
	}
}

const DEFAULT_ROUTER: Address = address!("00000000000000000000000000000000000d3e01");
const DEFAULT_PERIPHERY: Address = address!("00000000000000000000000000000000000d3e02");

#[derive(Debug, Clone, Deserialize)]
pub struct MockPairConfig {
	pub chain_id: u64,
	pub token_in: Address,
	pub token_out: Address,
	/// Output per input in basis points, after decimal conversion.
	pub rate_bps: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MockDexConfig {
	#[serde(default)]
	pub router: Option<Address>,
	#[serde(default)]
	pub periphery: Option<Address>,
	#[serde(default)]
	pub pairs: Vec<MockPairConfig>,
}

pub struct MockDexSchema;

impl ConfigSchema for MockDexSchema {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		let pair = Schema::new(
			vec![
				Field::new(
					"chain_id",
					FieldType::Integer {
						min: Some(1),
						max: None,
					},
				),
				Field::new("token_in", FieldType::Address),
				Field::new("token_out", FieldType::Address),
				Field::new(
					"rate_bps",
					FieldType::Integer {
						min: Some(1),
						max: None,
					},
				),
			],
			vec![],
		);
		Schema::new(
			vec![],
			vec![
				Field::new("router", FieldType::Address),
				Field::new("periphery", FieldType::Address),
				Field::new("pairs", FieldType::Array(Box::new(FieldType::Table(pair)))),
			],
		)
		.validate(config)
	}
}

/// One `fetch_quote` call as seen by the mock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedFetch {
	pub chain_id: u64,
	pub token_in: Address,
	pub token_out: Address,
	pub amount: U256,
	pub trade_type: TradeType,
	pub indicative: bool,
}

type PairKey = (u64, Address, Address);

pub struct MockDexStrategy {
	router: Address,
	periphery: Address,
	rates: HashMap<PairKey, u64>,
	unroutable: HashSet<PairKey>,
	/// Extra haircut on firm exact-input quotes, to simulate a price move
	/// between the indicative and the firm request.
	firm_penalty_bps: u64,
	fetches: Mutex<Vec<RecordedFetch>>,
	journal: CallJournal,
}

impl Default for MockDexStrategy {
	fn default() -> Self {
		Self::new(MockDexConfig {
			router: None,
			periphery: None,
			pairs: Vec::new(),
		})
	}
}

impl MockDexStrategy {
	pub fn new(config: MockDexConfig) -> Self {
		let rates = config
			.pairs
			.iter()
			.map(|p| ((p.chain_id, p.token_in, p.token_out), p.rate_bps))
			.collect();
		Self {
			router: config.router.unwrap_or(DEFAULT_ROUTER),
			periphery: config.periphery.unwrap_or(DEFAULT_PERIPHERY),
			rates,
			unroutable: HashSet::new(),
			firm_penalty_bps: 0,
			fetches: Mutex::new(Vec::new()),
			journal: CallJournal::new(),
		}
	}

	pub fn with_rate(mut self, chain_id: u64, token_in: Address, token_out: Address, rate_bps: u64) -> Self {
		self.rates.insert((chain_id, token_in, token_out), rate_bps);
		self
	}

	pub fn without_route(mut self, chain_id: u64, token_in: Address, token_out: Address) -> Self {
		self.unroutable.insert((chain_id, token_in, token_out));
		self
	}

	pub fn with_firm_penalty_bps(mut self, bps: u64) -> Self {
		self.firm_penalty_bps = bps;
		self
	}

	pub fn with_journal(mut self, journal: CallJournal) -> Self {
		self.journal = journal;
		self
	}

	pub fn fetches(&self) -> Vec<RecordedFetch> {
		self.fetches
			.lock()
			.map(|f| f.clone())
			.unwrap_or_default()
	}

	fn rate(&self, key: &PairKey) -> u64 {
		self.rates.get(key).copied().unwrap_or(BPS_DENOMINATOR)
	}

	fn record(&self, spec: &SwapSpec, trade_type: TradeType, options: FetchOptions) {
		let fetch = RecordedFetch {
			chain_id: spec.chain_id,
			token_in: spec.token_in.address,
			token_out: spec.token_out.address,
			amount: spec.amount,
			trade_type,
			indicative: options.use_indicative_quote,
		};
		self.journal.record(format!(
			"dex.fetch_quote {:?} {} -> {} amount={}",
			trade_type, spec.token_in.symbol, spec.token_out.symbol, spec.amount
		));
		if let Ok(mut fetches) = self.fetches.lock() {
			fetches.push(fetch);
		}
	}
}

fn ceil_div(numerator: U256, denominator: U256) -> U256 {
	if numerator.is_zero() {
		return U256::ZERO;
	}
	(numerator - U256::from(1)) / denominator + U256::from(1)
}

#[async_trait]
impl DexStrategyInterface for MockDexStrategy {
	fn config_schema(&self) -> Box<dyn ConfigSchema> {
		Box::new(MockDexSchema)
	}

	async fn router_address(&self, _chain_id: u64) -> Result<Address, DexError> {
		Ok(self.router)
	}

	async fn periphery_address(&self, _chain_id: u64) -> Result<Address, DexError> {
		Ok(self.periphery)
	}

	async fn fetch_quote(
		&self,
		spec: &SwapSpec,
		trade_type: TradeType,
		options: FetchOptions,
	) -> Result<SwapQuote, DexError> {
		self.record(spec, trade_type, options);

		let key = (spec.chain_id, spec.token_in.address, spec.token_out.address);
		if self.unroutable.contains(&key) {
			return Err(DexError::NoRoute(format!(
				"{} -> {} on chain {}",
				spec.token_in, spec.token_out, spec.chain_id
			)));
		}

		let rate = U256::from(self.rate(&key));
		let bps = U256::from(BPS_DENOMINATOR);
		let (decimals_in, decimals_out) = (spec.token_in.decimals, spec.token_out.decimals);

		let (expected_in, expected_out, maximum_in, min_out) = match trade_type {
			TradeType::ExactInput => {
				let converted = convert_decimals(spec.amount, decimals_in, decimals_out);
				let out = converted.saturating_mul(rate) / bps;
				let mut min_out = with_min_slippage(out, spec.slippage_tolerance);
				if !options.use_indicative_quote && self.firm_penalty_bps > 0 {
					let keep = U256::from(BPS_DENOMINATOR.saturating_sub(self.firm_penalty_bps));
					min_out = min_out.saturating_mul(keep) / bps;
				}
				(spec.amount, out, spec.amount, min_out)
			},
			TradeType::ExactOutput => {
				let in_at_out_decimals = ceil_div(spec.amount.saturating_mul(bps), rate);
				let input = if decimals_in >= decimals_out {
					convert_decimals(in_at_out_decimals, decimals_out, decimals_in)
				} else {
					let scale = U256::from(10u64).pow(U256::from(decimals_out - decimals_in));
					ceil_div(in_at_out_decimals, scale)
				};
				let maximum_in = with_max_slippage(input, spec.slippage_tolerance);
				(input, spec.amount, maximum_in, spec.amount)
			},
		};

		let data: Bytes = match trade_type {
			TradeType::ExactInput => IMockRouter::swapExactInputCall {
				tokenIn: spec.token_in.address,
				tokenOut: spec.token_out.address,
				amountIn: spec.amount,
				minAmountOut: min_out,
				recipient: spec.recipient,
			}
			.abi_encode(),
			TradeType::ExactOutput => IMockRouter::swapExactOutputCall {
				tokenIn: spec.token_in.address,
				tokenOut: spec.token_out.address,
				amountOut: spec.amount,
				maxAmountIn: maximum_in,
				recipient: spec.recipient,
			}
			.abi_encode(),
		}
		.into();

		Ok(SwapQuote {
			token_in: spec.token_in.clone(),
			token_out: spec.token_out.clone(),
			maximum_amount_in: maximum_in,
			min_amount_out: min_out,
			expected_amount_in: expected_in,
			expected_amount_out: expected_out,
			slippage_tolerance: spec.slippage_tolerance,
			swap_tx: SwapTx {
				to: self.router,
				data,
				value: U256::ZERO,
			},
		})
	}
}

pub struct Registry;

impl ImplementationRegistry for Registry {
	const NAME: &'static str = "mock";
	type Factory = DexFactory;

	fn factory() -> Self::Factory {
		create_dex
	}
}

impl DexRegistry for Registry {}

pub fn create_dex(config: &toml::Value) -> Result<Box<dyn DexStrategyInterface>, DexError> {
	MockDexSchema
		.validate(config)
		.map_err(|e| DexError::Configuration(e.to_string()))?;
	let parsed: MockDexConfig = config
		.clone()
		.try_into()
		.map_err(|e: toml::de::Error| DexError::Configuration(e.message().to_string()))?;
	Ok(Box::new(MockDexStrategy::new(parsed)))
}
