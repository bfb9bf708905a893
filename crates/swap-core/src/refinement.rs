//! Two-step refinement of an origin-chain swap quote.
//!
//! An origin swap that feeds the bridge must produce at least the bridge's
//! required input, without stranding a surplus in the periphery contract.
//! The swap is therefore priced in two steps:
//!
//! 1. `Indicative`: an EXACT_OUTPUT quote for the required amount, used only
//!    to size the input.
//! 2. `Firm`: an EXACT_INPUT quote for the indicative worst-case input plus a
//!    buffer.
//!
//! The firm quote is then either `Validated` (its worst-case output covers
//! the required amount) or `Rejected`, which fails the whole composition.

use crate::CrossSwapError;
use alloy_primitives::U256;
use swap_dex::{DexStrategyInterface, FetchOptions};
use swap_types::utils::apply_markup_bps;
use swap_types::{SwapQuote, SwapSpec, TradeType};
use tracing::{debug, warn};

/// First state: an indicative EXACT_OUTPUT quote.
#[derive(Debug, Clone)]
pub struct Indicative {
	spec: SwapSpec,
	quote: SwapQuote,
}

impl Indicative {
	/// Requests the indicative quote. `spec.amount` is the output the swap
	/// must produce.
	pub async fn fetch(
		dex: &dyn DexStrategyInterface,
		spec: SwapSpec,
	) -> Result<Self, CrossSwapError> {
		let quote = dex
			.fetch_quote(&spec, TradeType::ExactOutput, FetchOptions::indicative())
			.await?;
		debug!(
			chain_id = spec.chain_id,
			required_output = %spec.amount,
			maximum_amount_in = %quote.maximum_amount_in,
			"Indicative origin swap quote"
		);
		Ok(Self { spec, quote })
	}

	pub fn quote(&self) -> &SwapQuote {
		&self.quote
	}

	/// Input for the firm request: the indicative worst-case input marked up
	/// by `buffer_bps`.
	pub fn firm_amount_in(&self, buffer_bps: u32) -> U256 {
		apply_markup_bps(self.quote.maximum_amount_in, buffer_bps)
	}

	/// Requests the firm EXACT_INPUT quote.
	pub async fn firm(
		self,
		dex: &dyn DexStrategyInterface,
		buffer_bps: u32,
	) -> Result<Firm, CrossSwapError> {
		let amount_in = self.firm_amount_in(buffer_bps);
		let spec = self.spec.with_amount(amount_in);
		let quote = dex
			.fetch_quote(&spec, TradeType::ExactInput, FetchOptions::default())
			.await?;
		Ok(Firm::new(quote, self.spec.amount))
	}
}

/// Second state: a firm EXACT_INPUT quote awaiting validation.
#[derive(Debug, Clone)]
pub struct Firm {
	quote: SwapQuote,
	required_output: U256,
}

impl Firm {
	pub fn new(quote: SwapQuote, required_output: U256) -> Self {
		Self {
			quote,
			required_output,
		}
	}

	pub fn validate(self) -> Outcome {
		if self.quote.min_amount_out >= self.required_output {
			Outcome::Validated(self.quote)
		} else {
			Outcome::Rejected {
				required_output: self.required_output,
				min_output: self.quote.min_amount_out,
			}
		}
	}
}

/// Terminal state of a refinement.
#[derive(Debug, Clone)]
pub enum Outcome {
	Validated(SwapQuote),
	Rejected { required_output: U256, min_output: U256 },
}

impl Outcome {
	pub fn into_result(self) -> Result<SwapQuote, CrossSwapError> {
		match self {
			Outcome::Validated(quote) => Ok(quote),
			Outcome::Rejected {
				required_output,
				min_output,
			} => {
				warn!(
					required_output = %required_output,
					min_output = %min_output,
					"Firm origin swap quote does not cover the bridge input"
				);
				Err(CrossSwapError::QuoteInvariantViolated {
					required: required_output,
					min_output,
				})
			},
		}
	}
}

/// Runs `Indicative -> Firm -> Validated | Rejected` for `spec`.
pub async fn refine_origin_swap(
	dex: &dyn DexStrategyInterface,
	spec: SwapSpec,
	buffer_bps: u32,
) -> Result<SwapQuote, CrossSwapError> {
	Indicative::fetch(dex, spec)
		.await?
		.firm(dex, buffer_bps)
		.await?
		.validate()
		.into_result()
}

#[cfg(test)]
mod tests {
	use super::*;
	use alloy_primitives::{Address, Bytes};
	use swap_dex::implementations::mock::MockDexStrategy;
	use swap_types::{SwapTx, Token};

	fn spec(amount: u64) -> SwapSpec {
		SwapSpec {
			chain_id: 1,
			token_in: Token::new(Address::repeat_byte(0xda), 1, 18, "DAI"),
			token_out: Token::new(Address::repeat_byte(0x0c), 1, 6, "USDC"),
			amount: U256::from(amount),
			recipient: Address::repeat_byte(0x77),
			slippage_tolerance: 0.5,
		}
	}

	fn quote(min_amount_out: u64) -> SwapQuote {
		let spec = spec(0);
		SwapQuote {
			token_in: spec.token_in,
			token_out: spec.token_out,
			maximum_amount_in: U256::from(1_000u64),
			min_amount_out: U256::from(min_amount_out),
			expected_amount_in: U256::from(1_000u64),
			expected_amount_out: U256::from(min_amount_out),
			slippage_tolerance: 0.5,
			swap_tx: SwapTx {
				to: Address::ZERO,
				data: Bytes::new(),
				value: U256::ZERO,
			},
		}
	}

	#[test]
	fn test_validate_boundaries() {
		assert!(matches!(
			Firm::new(quote(100), U256::from(100u64)).validate(),
			Outcome::Validated(_)
		));
		match Firm::new(quote(99), U256::from(100u64)).validate() {
			Outcome::Rejected {
				required_output,
				min_output,
			} => {
				assert_eq!(required_output, U256::from(100u64));
				assert_eq!(min_output, U256::from(99u64));
			},
			other => panic!("expected rejection, got {:?}", other),
		}
	}

	#[tokio::test]
	async fn test_refinement_requests_indicative_then_firm() {
		let dex = MockDexStrategy::default();
		let quote = refine_origin_swap(&dex, spec(1_000_000), 50).await.unwrap();
		assert!(quote.min_amount_out >= U256::from(1_000_000u64));

		let fetches = dex.fetches();
		assert_eq!(fetches.len(), 2);
		assert_eq!(fetches[0].trade_type, TradeType::ExactOutput);
		assert!(fetches[0].indicative);
		assert_eq!(fetches[0].amount, U256::from(1_000_000u64));

		// 1 USDC at 1:1 is 1e18 DAI; 0.5% slippage then 0.5% buffer.
		let indicative_max_in = U256::from(1_005_000_000_000_000_000u128);
		assert_eq!(fetches[1].trade_type, TradeType::ExactInput);
		assert!(!fetches[1].indicative);
		assert_eq!(fetches[1].amount, apply_markup_bps(indicative_max_in, 50));
	}

	#[tokio::test]
	async fn test_refinement_rejects_price_move() {
		let dex = MockDexStrategy::default().with_firm_penalty_bps(200);
		let result = refine_origin_swap(&dex, spec(1_000_000), 50).await;
		assert!(matches!(
			result,
			Err(CrossSwapError::QuoteInvariantViolated { .. })
		));
	}
}
