//! Quote types produced by the DEX and bridge collaborators and the composed
//! cross-swap aggregate.

use crate::swap::{CrossSwap, CrossSwapType, Token};
use crate::utils::u256_serde;
use alloy_primitives::{Address, Bytes, U256};
use serde::{Deserialize, Serialize};

/// Parameters for a single-chain DEX swap request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapSpec {
	pub chain_id: u64,
	pub token_in: Token,
	pub token_out: Token,
	/// Exact input or exact output amount depending on the trade type.
	#[serde(with = "u256_serde")]
	pub amount: U256,
	/// Address that receives the swap output.
	pub recipient: Address,
	/// Slippage tolerance in percent.
	pub slippage_tolerance: f64,
}

impl SwapSpec {
	/// Returns a copy of this spec with a different amount.
	pub fn with_amount(&self, amount: U256) -> Self {
		Self {
			amount,
			..self.clone()
		}
	}
}

/// Transaction that executes a swap through a DEX router.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapTx {
	pub to: Address,
	pub data: Bytes,
	#[serde(with = "u256_serde")]
	pub value: U256,
}

/// A DEX quote.
///
/// `maximum_amount_in` and `min_amount_out` already embed the slippage
/// tolerance: they are worst-case bounds, not expected values.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapQuote {
	pub token_in: Token,
	pub token_out: Token,
	#[serde(with = "u256_serde")]
	pub maximum_amount_in: U256,
	#[serde(with = "u256_serde")]
	pub min_amount_out: U256,
	#[serde(with = "u256_serde")]
	pub expected_amount_in: U256,
	#[serde(with = "u256_serde")]
	pub expected_amount_out: U256,
	pub slippage_tolerance: f64,
	pub swap_tx: SwapTx,
}

/// Relayer parameters suggested by the bridge fee service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestedFees {
	pub exclusive_relayer: Address,
	pub timestamp: u32,
	pub exclusivity_deadline: u32,
	/// Total relay fee charged, denominated in the input token.
	#[serde(with = "u256_serde")]
	pub total_relay_fee: U256,
}

/// A bridge quote.
///
/// `message` is the opaque instruction blob for the destination multicall
/// executor. It is empty for plain bridge-only transfers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BridgeQuote {
	pub input_token: Token,
	pub output_token: Token,
	#[serde(with = "u256_serde")]
	pub input_amount: U256,
	#[serde(with = "u256_serde")]
	pub output_amount: U256,
	pub message: Bytes,
	pub suggested_fees: SuggestedFees,
}

/// Request for a bridge quote.
#[derive(Debug, Clone)]
pub struct BridgeQuoteRequest {
	pub input_token: Token,
	pub output_token: Token,
	/// Minimum output for min-output quotes, exact input for exact-input quotes.
	pub amount: U256,
	pub recipient: Address,
	pub message: Bytes,
}

/// The composed result of a cross-swap quote.
///
/// The bridge leg is always present. The presence of the swap legs matches the
/// cross-swap type: none for bridgeable-to-bridgeable, destination only for
/// bridgeable-to-any, origin only for any-to-bridgeable, both for any-to-any.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrossSwapQuotes {
	pub cross_swap: CrossSwap,
	pub bridge_quote: BridgeQuote,
	pub origin_swap_quote: Option<SwapQuote>,
	pub destination_swap_quote: Option<SwapQuote>,
}

impl CrossSwapQuotes {
	/// The cross-swap type implied by which swap legs are present.
	pub fn cross_swap_type(&self) -> CrossSwapType {
		match (&self.origin_swap_quote, &self.destination_swap_quote) {
			(None, None) => CrossSwapType::BridgeableToBridgeable,
			(None, Some(_)) => CrossSwapType::BridgeableToAny,
			(Some(_), None) => CrossSwapType::AnyToBridgeable,
			(Some(_), Some(_)) => CrossSwapType::AnyToAny,
		}
	}

	/// Worst-case amount of the output token produced for the recipient.
	pub fn effective_output(&self) -> U256 {
		match &self.destination_swap_quote {
			Some(quote) => quote.min_amount_out,
			None => self.bridge_quote.output_amount,
		}
	}

	/// Worst-case amount of the input token pulled from the depositor.
	pub fn required_input(&self) -> U256 {
		match &self.origin_swap_quote {
			Some(quote) => quote.maximum_amount_in,
			None => self.bridge_quote.input_amount,
		}
	}
}
