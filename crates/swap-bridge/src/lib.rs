//! Bridge quote collaborators.
//!
//! A bridge quote provider prices the cross-chain leg: how much of the
//! origin bridgeable token must be deposited so that the relayer delivers a
//! given amount of the destination bridgeable token, and which relayer
//! parameters the deposit must carry.

use alloy_primitives::U256;
use async_trait::async_trait;
use std::future::Future;
use swap_types::utils::{apply_markup_bps, convert_decimals};
use swap_types::{BridgeQuote, BridgeQuoteRequest, ConfigSchema, ImplementationRegistry};
use thiserror::Error;
use tracing::debug;

pub mod implementations {
	pub mod across;
	pub mod mock;
}

#[derive(Debug, Error)]
pub enum BridgeError {
	/// The token pair is not an enabled bridge route.
	#[error("No bridge route: {0}")]
	NoRoute(String),
	#[error("Amount too low: {0}")]
	AmountTooLow(String),
	/// Repeated exact-input quotes never reached the requested minimum output.
	#[error("Could not reach minimum output {min_output} after {attempts} attempts (last output {last_output})")]
	MinOutputUnreachable {
		min_output: U256,
		last_output: U256,
		attempts: usize,
	},
	#[error("Network error: {0}")]
	Network(String),
	#[error("Invalid response: {0}")]
	InvalidResponse(String),
	#[error("Configuration error: {0}")]
	Configuration(String),
}

#[async_trait]
pub trait BridgeQuoteInterface: Send + Sync {
	fn config_schema(&self) -> Box<dyn ConfigSchema>;

	/// Quotes a deposit whose output is at least `request.amount` of the output token.
	async fn quote_for_min_output(
		&self,
		request: &BridgeQuoteRequest,
	) -> Result<BridgeQuote, BridgeError>;

	/// Quotes a deposit of exactly `request.amount` of the input token.
	async fn quote_for_exact_input(
		&self,
		request: &BridgeQuoteRequest,
	) -> Result<BridgeQuote, BridgeError>;
}

pub type BridgeFactory = fn(&toml::Value) -> Result<Box<dyn BridgeQuoteInterface>, BridgeError>;

pub trait BridgeRegistry: ImplementationRegistry<Factory = BridgeFactory> {}

pub fn get_all_implementations() -> Vec<(&'static str, BridgeFactory)> {
	use implementations::{across, mock};

	vec![
		(across::Registry::NAME, across::Registry::factory()),
		(mock::Registry::NAME, mock::Registry::factory()),
	]
}

/// Relay fee percentages are reported with 18 decimals: 1e18 is 100%.
pub const FEE_PCT_SCALE: u128 = 1_000_000_000_000_000_000;

/// Markup on the first exact-input guess, in basis points.
pub const MIN_OUTPUT_INITIAL_MARKUP_BPS: u32 = 50;

/// Maximum exact-input quotes spent searching for a minimum output.
pub const MIN_OUTPUT_MAX_ATTEMPTS: usize = 3;

/// Finds an input amount whose exact-input quote yields at least `request.amount`.
///
/// Starts from the minimum output converted to input decimals plus 0.5%, then
/// grows the input by the relay fee percentage the last quote reported until
/// the output is large enough or the attempts run out.
pub async fn search_min_output<F, Fut>(
	request: &BridgeQuoteRequest,
	quote_exact_input: F,
) -> Result<BridgeQuote, BridgeError>
where
	F: Fn(BridgeQuoteRequest) -> Fut,
	Fut: Future<Output = Result<(BridgeQuote, U256), BridgeError>>,
{
	let min_output = request.amount;
	let initial = convert_decimals(
		min_output,
		request.output_token.decimals,
		request.input_token.decimals,
	);
	let mut input_amount = apply_markup_bps(initial, MIN_OUTPUT_INITIAL_MARKUP_BPS);
	let mut last_output = U256::ZERO;

	for attempt in 1..=MIN_OUTPUT_MAX_ATTEMPTS {
		let attempt_request = BridgeQuoteRequest {
			amount: input_amount,
			..request.clone()
		};
		let (quote, fee_pct) = quote_exact_input(attempt_request).await?;
		debug!(
			attempt,
			input_amount = %input_amount,
			output_amount = %quote.output_amount,
			min_output = %min_output,
			"Bridge min-output attempt"
		);
		if quote.output_amount >= min_output {
			return Ok(quote);
		}
		last_output = quote.output_amount;
		input_amount = scale_by_fee_pct(input_amount, fee_pct)?;
	}

	Err(BridgeError::MinOutputUnreachable {
		min_output,
		last_output,
		attempts: MIN_OUTPUT_MAX_ATTEMPTS,
	})
}

/// Returns `amount / (1 - fee_pct)`, rounded up, with at least one unit of growth.
fn scale_by_fee_pct(amount: U256, fee_pct: U256) -> Result<U256, BridgeError> {
	let scale = U256::from(FEE_PCT_SCALE);
	if fee_pct >= scale {
		return Err(BridgeError::InvalidResponse(format!(
			"Relay fee percentage {} is not below 100%",
			fee_pct
		)));
	}
	let keep = scale - fee_pct;
	let numerator = amount.saturating_mul(scale);
	let scaled = (numerator + keep - U256::from(1)) / keep;
	Ok(scaled.max(amount + U256::from(1)))
}
