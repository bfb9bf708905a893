//! Bridge quote provider backed by a suggested-fees HTTP endpoint.
//!
//! `GET {api_url}/suggested-fees` returns the relay fee for an exact input
//! amount; the output is the input minus the total relay fee, rescaled to
//! the output token's decimals.

use crate::{
	search_min_output, BridgeError, BridgeFactory, BridgeQuoteInterface, BridgeRegistry,
};
use alloy_primitives::{Address, U256};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::StatusCode;
use serde::Deserialize;
use std::time::Duration;
use swap_types::utils::convert_decimals;
use swap_types::{
	with_0x_prefix, BridgeQuote, BridgeQuoteRequest, ConfigSchema, Field, FieldType,
	ImplementationRegistry, Schema, SuggestedFees, ValidationError,
};
use tracing::{debug, warn};

#[derive(Debug, Clone, Deserialize)]
pub struct AcrossConfig {
	pub api_url: String,
	#[serde(default = "default_timeout_ms")]
	pub timeout_ms: u64,
	/// Optional integrator id forwarded to the fee service.
	#[serde(default)]
	pub integrator_id: Option<String>,
}

fn default_timeout_ms() -> u64 {
	10_000
}

pub struct AcrossSchema;

impl ConfigSchema for AcrossSchema {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		Schema::new(
			vec![Field::new("api_url", FieldType::String)],
			vec![
				Field::new(
					"timeout_ms",
					FieldType::Integer {
						min: Some(1),
						max: Some(120_000),
					},
				),
				Field::new("integrator_id", FieldType::String),
			],
		)
		.validate(config)
	}
}

#[derive(Debug, Deserialize)]
pub struct AcrossFeeBand {
	pub pct: String,
	pub total: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestedFeesResponse {
	pub total_relay_fee: AcrossFeeBand,
	pub timestamp: String,
	#[serde(default)]
	pub is_amount_too_low: bool,
	pub exclusive_relayer: Address,
	#[serde(default)]
	pub exclusivity_deadline: u64,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
	#[serde(default)]
	code: Option<String>,
	#[serde(default)]
	message: Option<String>,
}

pub struct AcrossBridgeQuotes {
	client: reqwest::Client,
	api_url: String,
	integrator_id: Option<String>,
}

fn parse_u256(field: &str, raw: &str) -> Result<U256, BridgeError> {
	U256::from_str_radix(raw, 10)
		.map_err(|e| BridgeError::InvalidResponse(format!("Invalid {} '{}': {}", field, raw, e)))
}

/// Builds a bridge quote from a fee response and returns the relay fee percentage.
pub fn quote_from_fees(
	request: &BridgeQuoteRequest,
	fees: &SuggestedFeesResponse,
) -> Result<(BridgeQuote, U256), BridgeError> {
	if fees.is_amount_too_low {
		return Err(BridgeError::AmountTooLow(format!(
			"{} {} is below the minimum deposit",
			request.amount, request.input_token.symbol
		)));
	}

	let total_fee = parse_u256("totalRelayFee.total", &fees.total_relay_fee.total)?;
	let fee_pct = parse_u256("totalRelayFee.pct", &fees.total_relay_fee.pct)?;
	let timestamp = fees
		.timestamp
		.parse::<u32>()
		.map_err(|e| BridgeError::InvalidResponse(format!("Invalid timestamp: {}", e)))?;
	let exclusivity_deadline = u32::try_from(fees.exclusivity_deadline).map_err(|_| {
		BridgeError::InvalidResponse(format!(
			"Exclusivity deadline {} out of range",
			fees.exclusivity_deadline
		))
	})?;

	let net_input = request.amount.checked_sub(total_fee).ok_or_else(|| {
		BridgeError::AmountTooLow(format!(
			"relay fee {} exceeds input {}",
			total_fee, request.amount
		))
	})?;
	let output_amount = convert_decimals(
		net_input,
		request.input_token.decimals,
		request.output_token.decimals,
	);

	let quote = BridgeQuote {
		input_token: request.input_token.clone(),
		output_token: request.output_token.clone(),
		input_amount: request.amount,
		output_amount,
		message: request.message.clone(),
		suggested_fees: SuggestedFees {
			exclusive_relayer: fees.exclusive_relayer,
			timestamp,
			exclusivity_deadline,
			total_relay_fee: total_fee,
		},
	};
	Ok((quote, fee_pct))
}

impl AcrossBridgeQuotes {
	pub fn new(config: AcrossConfig) -> Result<Self, BridgeError> {
		let mut headers = HeaderMap::new();
		headers.insert("Accept", HeaderValue::from_static("application/json"));
		let client = reqwest::Client::builder()
			.default_headers(headers)
			.timeout(Duration::from_millis(config.timeout_ms))
			.build()
			.map_err(|e| BridgeError::Configuration(e.to_string()))?;

		Ok(Self {
			client,
			api_url: config.api_url.trim_end_matches('/').to_string(),
			integrator_id: config.integrator_id,
		})
	}

	async fn exact_input_with_fee(
		&self,
		request: &BridgeQuoteRequest,
	) -> Result<(BridgeQuote, U256), BridgeError> {
		let url = format!("{}/suggested-fees", self.api_url);
		let mut query = vec![
			("inputToken", format!("{:#x}", request.input_token.address)),
			("outputToken", format!("{:#x}", request.output_token.address)),
			(
				"originChainId",
				request.input_token.chain_id.to_string(),
			),
			(
				"destinationChainId",
				request.output_token.chain_id.to_string(),
			),
			("amount", request.amount.to_string()),
			("recipient", format!("{:#x}", request.recipient)),
		];
		if !request.message.is_empty() {
			query.push(("message", with_0x_prefix(&request.message.to_string())));
		}
		if let Some(integrator) = &self.integrator_id {
			query.push(("integratorId", integrator.clone()));
		}

		debug!(
			input_token = %request.input_token,
			output_token = %request.output_token,
			amount = %request.amount,
			"Requesting suggested fees"
		);

		let response = self
			.client
			.get(&url)
			.query(&query)
			.send()
			.await
			.map_err(|e| BridgeError::Network(e.to_string()))?;

		let status = response.status();
		if !status.is_success() {
			let body = response.json::<ErrorResponse>().await.ok();
			let route_disabled = status == StatusCode::NOT_FOUND
				|| body
					.as_ref()
					.and_then(|b| b.code.as_deref())
					.is_some_and(|code| code == "ROUTE_NOT_ENABLED");
			let message = body
				.and_then(|b| b.message)
				.unwrap_or_else(|| format!("status {}", status));
			if route_disabled {
				return Err(BridgeError::NoRoute(format!(
					"{} -> {}: {}",
					request.input_token, request.output_token, message
				)));
			}
			warn!(%status, %message, "Suggested fees request failed");
			return Err(BridgeError::Network(message));
		}

		let fees: SuggestedFeesResponse = response.json().await.map_err(|e| {
			BridgeError::InvalidResponse(format!("Failed to parse suggested fees: {}", e))
		})?;
		quote_from_fees(request, &fees)
	}
}

#[async_trait]
impl BridgeQuoteInterface for AcrossBridgeQuotes {
	fn config_schema(&self) -> Box<dyn ConfigSchema> {
		Box::new(AcrossSchema)
	}

	async fn quote_for_min_output(
		&self,
		request: &BridgeQuoteRequest,
	) -> Result<BridgeQuote, BridgeError> {
		search_min_output(request, |attempt| async move {
			self.exact_input_with_fee(&attempt).await
		})
		.await
	}

	async fn quote_for_exact_input(
		&self,
		request: &BridgeQuoteRequest,
	) -> Result<BridgeQuote, BridgeError> {
		Ok(self.exact_input_with_fee(request).await?.0)
	}
}

pub struct Registry;

impl ImplementationRegistry for Registry {
	const NAME: &'static str = "across";
	type Factory = BridgeFactory;

	fn factory() -> Self::Factory {
		create_bridge
	}
}

impl BridgeRegistry for Registry {}

pub fn create_bridge(config: &toml::Value) -> Result<Box<dyn BridgeQuoteInterface>, BridgeError> {
	AcrossSchema
		.validate(config)
		.map_err(|e| BridgeError::Configuration(e.to_string()))?;
	let parsed: AcrossConfig = config
		.clone()
		.try_into()
		.map_err(|e: toml::de::Error| BridgeError::Configuration(e.message().to_string()))?;
	Ok(Box::new(AcrossBridgeQuotes::new(parsed)?))
}
