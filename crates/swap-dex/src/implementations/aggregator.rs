//! DEX strategy backed by an HTTP swap-aggregation service.
//!
//! Quotes come from `GET {api_url}/swap/quote`; router and periphery
//! contracts come from configuration overrides or `GET {api_url}/swap/routers`
//! and are held in a [`RouterCache`].

use crate::router_cache::{ChainRouters, RouterCache};
use crate::{DexError, DexFactory, DexRegistry, DexStrategyInterface, FetchOptions};
use alloy_primitives::{Address, Bytes, U256};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::StatusCode;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use swap_types::utils::{with_max_slippage, with_min_slippage};
use swap_types::{
	ConfigSchema, Field, FieldType, ImplementationRegistry, Schema, SwapQuote, SwapSpec, SwapTx,
	TradeType, ValidationError,
};
use tracing::{debug, warn};

#[derive(Debug, Clone, Deserialize)]
pub struct AggregatorConfig {
	pub api_url: String,
	#[serde(default)]
	pub api_key: Option<String>,
	#[serde(default = "default_timeout_ms")]
	pub timeout_ms: u64,
	#[serde(default = "default_router_cache_ttl_seconds")]
	pub router_cache_ttl_seconds: u64,
	/// Static router overrides keyed by chain id.
	#[serde(default)]
	pub routers: HashMap<String, RouterOverride>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct RouterOverride {
	pub router: Address,
	pub periphery: Address,
}

fn default_timeout_ms() -> u64 {
	10_000
}

fn default_router_cache_ttl_seconds() -> u64 {
	60 * 60
}

pub struct AggregatorSchema;

impl ConfigSchema for AggregatorSchema {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		let schema = Schema::new(
			vec![Field::new("api_url", FieldType::String).with_validator(|value| {
				match value.as_str() {
					Some(url) if url.starts_with("http://") || url.starts_with("https://") => {
						Ok(())
					},
					_ => Err("api_url must be an http(s) URL".to_string()),
				}
			})],
			vec![
				Field::new("api_key", FieldType::String),
				Field::new(
					"timeout_ms",
					FieldType::Integer {
						min: Some(1),
						max: Some(120_000),
					},
				),
				Field::new(
					"router_cache_ttl_seconds",
					FieldType::Integer {
						min: Some(0),
						max: None,
					},
				),
			],
		);
		schema.validate(config)?;

		if let Some(routers) = config.get("routers").and_then(|r| r.as_table()) {
			let entry = Schema::new(
				vec![
					Field::new("router", FieldType::Address),
					Field::new("periphery", FieldType::Address),
				],
				vec![],
			);
			for (chain, value) in routers {
				chain.parse::<u64>().map_err(|_| ValidationError::InvalidValue {
					field: format!("routers.{}", chain),
					message: "router keys must be chain ids".to_string(),
				})?;
				entry.validate(value)?;
			}
		}
		Ok(())
	}
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AggregatorQuoteResponse {
	amount_in: String,
	amount_out: String,
	tx: AggregatorTx,
}

#[derive(Debug, Deserialize)]
struct AggregatorTx {
	to: Address,
	data: Bytes,
	#[serde(default)]
	value: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AggregatorRoutersResponse {
	router: Address,
	periphery: Address,
}

#[derive(Debug, Deserialize)]
struct AggregatorErrorResponse {
	#[serde(default)]
	code: Option<String>,
	#[serde(default)]
	message: Option<String>,
}

pub struct AggregatorDexStrategy {
	client: reqwest::Client,
	api_url: String,
	overrides: HashMap<u64, ChainRouters>,
	cache: RouterCache,
}

impl AggregatorDexStrategy {
	pub fn new(config: AggregatorConfig) -> Result<Self, DexError> {
		let mut headers = HeaderMap::new();
		headers.insert("Accept", HeaderValue::from_static("application/json"));
		if let Some(key) = &config.api_key {
			let value = HeaderValue::from_str(key)
				.map_err(|e| DexError::Configuration(format!("Invalid api_key: {}", e)))?;
			headers.insert("x-api-key", value);
		}

		let client = reqwest::Client::builder()
			.default_headers(headers)
			.timeout(Duration::from_millis(config.timeout_ms))
			.build()
			.map_err(|e| DexError::Configuration(e.to_string()))?;

		let mut overrides = HashMap::new();
		for (chain, routers) in &config.routers {
			let chain_id = chain.parse::<u64>().map_err(|e| {
				DexError::Configuration(format!("Invalid chain_id '{}': {}", chain, e))
			})?;
			overrides.insert(
				chain_id,
				ChainRouters {
					router: routers.router,
					periphery: routers.periphery,
				},
			);
		}

		Ok(Self {
			client,
			api_url: config.api_url.trim_end_matches('/').to_string(),
			overrides,
			cache: RouterCache::with_ttl(Duration::from_secs(config.router_cache_ttl_seconds)),
		})
	}

	async fn routers(&self, chain_id: u64) -> Result<ChainRouters, DexError> {
		if let Some(routers) = self.overrides.get(&chain_id) {
			return Ok(*routers);
		}
		if let Some(routers) = self.cache.get(chain_id) {
			return Ok(routers);
		}

		let url = format!("{}/swap/routers", self.api_url);
		debug!(chain_id, %url, "Fetching router addresses");
		let response = self
			.client
			.get(&url)
			.query(&[("chainId", chain_id.to_string())])
			.send()
			.await
			.map_err(|e| DexError::Network(e.to_string()))?;

		if response.status() == StatusCode::NOT_FOUND {
			return Err(DexError::UnsupportedChain(chain_id));
		}
		if !response.status().is_success() {
			return Err(DexError::Network(format!(
				"Router endpoint returned status {}",
				response.status()
			)));
		}

		let body: AggregatorRoutersResponse = response
			.json()
			.await
			.map_err(|e| DexError::InvalidResponse(format!("Failed to parse routers: {}", e)))?;
		Ok(self.cache.insert(
			chain_id,
			ChainRouters {
				router: body.router,
				periphery: body.periphery,
			},
		))
	}
}

fn trade_type_param(trade_type: TradeType) -> &'static str {
	match trade_type {
		TradeType::ExactInput => "EXACT_INPUT",
		TradeType::ExactOutput => "EXACT_OUTPUT",
	}
}

fn parse_amount(field: &str, raw: &str) -> Result<U256, DexError> {
	U256::from_str_radix(raw, 10)
		.map_err(|e| DexError::InvalidResponse(format!("Invalid {} '{}': {}", field, raw, e)))
}

/// Turns an aggregator response into a quote with worst-case bounds.
///
/// The exact side of the trade is taken from the request; the floating side
/// is widened by the slippage tolerance.
fn into_swap_quote(
	spec: &SwapSpec,
	trade_type: TradeType,
	response: AggregatorQuoteResponse,
) -> Result<SwapQuote, DexError> {
	let expected_in = parse_amount("amountIn", &response.amount_in)?;
	let expected_out = parse_amount("amountOut", &response.amount_out)?;
	let value = match response.tx.value.as_deref() {
		None | Some("") => U256::ZERO,
		Some(raw) => parse_amount("value", raw)?,
	};

	let (maximum_amount_in, min_amount_out) = match trade_type {
		TradeType::ExactInput => (
			expected_in,
			with_min_slippage(expected_out, spec.slippage_tolerance),
		),
		TradeType::ExactOutput => (
			with_max_slippage(expected_in, spec.slippage_tolerance),
			expected_out,
		),
	};

	Ok(SwapQuote {
		token_in: spec.token_in.clone(),
		token_out: spec.token_out.clone(),
		maximum_amount_in,
		min_amount_out,
		expected_amount_in: expected_in,
		expected_amount_out: expected_out,
		slippage_tolerance: spec.slippage_tolerance,
		swap_tx: SwapTx {
			to: response.tx.to,
			data: response.tx.data,
			value,
		},
	})
}

#[async_trait]
impl DexStrategyInterface for AggregatorDexStrategy {
	fn config_schema(&self) -> Box<dyn ConfigSchema> {
		Box::new(AggregatorSchema)
	}

	async fn router_address(&self, chain_id: u64) -> Result<Address, DexError> {
		Ok(self.routers(chain_id).await?.router)
	}

	async fn periphery_address(&self, chain_id: u64) -> Result<Address, DexError> {
		Ok(self.routers(chain_id).await?.periphery)
	}

	async fn fetch_quote(
		&self,
		spec: &SwapSpec,
		trade_type: TradeType,
		options: FetchOptions,
	) -> Result<SwapQuote, DexError> {
		let url = format!("{}/swap/quote", self.api_url);
		debug!(
			chain_id = spec.chain_id,
			token_in = %spec.token_in,
			token_out = %spec.token_out,
			amount = %spec.amount,
			trade_type = trade_type_param(trade_type),
			indicative = options.use_indicative_quote,
			"Requesting swap quote"
		);

		let response = self
			.client
			.get(&url)
			.query(&[
				("chainId", spec.chain_id.to_string()),
				("tokenIn", format!("{:#x}", spec.token_in.address)),
				("tokenOut", format!("{:#x}", spec.token_out.address)),
				("amount", spec.amount.to_string()),
				("tradeType", trade_type_param(trade_type).to_string()),
				("recipient", format!("{:#x}", spec.recipient)),
				("slippageTolerance", spec.slippage_tolerance.to_string()),
				("indicative", options.use_indicative_quote.to_string()),
			])
			.send()
			.await
			.map_err(|e| DexError::Network(e.to_string()))?;

		let status = response.status();
		if !status.is_success() {
			let body = response
				.json::<AggregatorErrorResponse>()
				.await
				.ok();
			let no_route = status == StatusCode::NOT_FOUND
				|| body
					.as_ref()
					.and_then(|b| b.code.as_deref())
					.is_some_and(|code| code == "NO_ROUTE");
			let message = body
				.and_then(|b| b.message)
				.unwrap_or_else(|| format!("status {}", status));
			if no_route {
				return Err(DexError::NoRoute(format!(
					"{} -> {} on chain {}: {}",
					spec.token_in, spec.token_out, spec.chain_id, message
				)));
			}
			warn!(%status, %message, "Swap quote request failed");
			return Err(DexError::Network(message));
		}

		let body: AggregatorQuoteResponse = response
			.json()
			.await
			.map_err(|e| DexError::InvalidResponse(format!("Failed to parse quote: {}", e)))?;
		into_swap_quote(spec, trade_type, body)
	}
}

pub struct Registry;

impl ImplementationRegistry for Registry {
	const NAME: &'static str = "aggregator";
	type Factory = DexFactory;

	fn factory() -> Self::Factory {
		create_dex
	}
}

impl DexRegistry for Registry {}

pub fn create_dex(config: &toml::Value) -> Result<Box<dyn DexStrategyInterface>, DexError> {
	AggregatorSchema
		.validate(config)
		.map_err(|e| DexError::Configuration(e.to_string()))?;
	let parsed: AggregatorConfig = config
		.clone()
		.try_into()
		.map_err(|e: toml::de::Error| DexError::Configuration(e.message().to_string()))?;
	Ok(Box::new(AggregatorDexStrategy::new(parsed)?))
}

#[cfg(test)]
mod tests {
	use super::*;
	use swap_types::Token;

	fn spec() -> SwapSpec {
		SwapSpec {
			chain_id: 8453,
			token_in: Token::new(Address::repeat_byte(0x01), 8453, 6, "USDC"),
			token_out: Token::new(Address::repeat_byte(0x02), 8453, 18, "WETH"),
			amount: U256::from(1_000u64),
			recipient: Address::repeat_byte(0x03),
			slippage_tolerance: 1.0,
		}
	}

	fn response(amount_in: &str, amount_out: &str) -> AggregatorQuoteResponse {
		serde_json::from_value(serde_json::json!({
			"amountIn": amount_in,
			"amountOut": amount_out,
			"tx": {
				"to": "0x4444444444444444444444444444444444444444",
				"data": "0xdeadbeef",
				"value": "0"
			}
		}))
		.unwrap()
	}

	#[test]
	fn test_exact_input_widens_output_only() {
		let quote = into_swap_quote(&spec(), TradeType::ExactInput, response("1000", "2000")).unwrap();
		assert_eq!(quote.maximum_amount_in, U256::from(1_000u64));
		assert_eq!(quote.min_amount_out, U256::from(1_980u64));
		assert_eq!(quote.swap_tx.data, Bytes::from(vec![0xde, 0xad, 0xbe, 0xef]));
	}

	#[test]
	fn test_exact_output_widens_input_only() {
		let quote = into_swap_quote(&spec(), TradeType::ExactOutput, response("1000", "2000")).unwrap();
		assert_eq!(quote.maximum_amount_in, U256::from(1_010u64));
		assert_eq!(quote.min_amount_out, U256::from(2_000u64));
	}

	#[test]
	fn test_rejects_malformed_amount() {
		let result = into_swap_quote(&spec(), TradeType::ExactInput, response("1e3", "2000"));
		assert!(matches!(result, Err(DexError::InvalidResponse(_))));
	}

	#[tokio::test]
	async fn test_router_overrides_skip_the_service() {
		let config: toml::Value = toml::from_str(
			r#"
api_url = "http://127.0.0.1:9"
[routers.8453]
router = "0x1111111111111111111111111111111111111111"
periphery = "0x2222222222222222222222222222222222222222"
"#,
		)
		.unwrap();
		let dex = create_dex(&config).unwrap();
		assert_eq!(
			dex.router_address(8453).await.unwrap(),
			Address::repeat_byte(0x11)
		);
		assert_eq!(
			dex.periphery_address(8453).await.unwrap(),
			Address::repeat_byte(0x22)
		);
	}

	#[test]
	fn test_schema_rejects_non_numeric_router_key() {
		let config: toml::Value = toml::from_str(
			r#"
api_url = "https://swap.example"
[routers.base]
router = "0x1111111111111111111111111111111111111111"
periphery = "0x2222222222222222222222222222222222222222"
"#,
		)
		.unwrap();
		assert!(AggregatorSchema.validate(&config).is_err());
	}
}
