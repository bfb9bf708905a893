//! Cross-swap intent types.
//!
//! A `CrossSwap` is the single user intent threaded through quote composition:
//! convert `input_token` on the origin chain into `output_token` on the
//! destination chain, with `amount` interpreted according to `amount_type`.

use crate::utils::u256_serde;
use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};
use std::fmt;

/// An ERC-20 token on a specific chain.
///
/// Native assets are represented by their wrapped token; the owning
/// `CrossSwap` carries `is_input_native` / `is_output_native` flags instead.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Token {
	pub address: Address,
	pub chain_id: u64,
	pub decimals: u8,
	pub symbol: String,
}

impl Token {
	pub fn new(address: Address, chain_id: u64, decimals: u8, symbol: impl Into<String>) -> Self {
		Self {
			address,
			chain_id,
			decimals,
			symbol: symbol.into(),
		}
	}
}

impl fmt::Display for Token {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}({:#x})@{}", self.symbol, self.address, self.chain_id)
	}
}

/// How the requested amount of a cross-swap is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AmountType {
	/// Spend exactly `amount` of the input token; the output floats.
	ExactInput,
	/// Deliver exactly `amount` of the output token; leftovers are refunded.
	ExactOutput,
	/// Deliver at least `amount` of the output token; any surplus goes to the recipient.
	MinOutput,
}

impl AmountType {
	/// Whether the amount is a target on the output side.
	pub fn is_output_based(&self) -> bool {
		matches!(self, AmountType::ExactOutput | AmountType::MinOutput)
	}
}

/// Composition strategy selected by the route classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CrossSwapType {
	BridgeableToBridgeable,
	BridgeableToAny,
	AnyToBridgeable,
	AnyToAny,
}

impl fmt::Display for CrossSwapType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let name = match self {
			CrossSwapType::BridgeableToBridgeable => "bridgeable-to-bridgeable",
			CrossSwapType::BridgeableToAny => "bridgeable-to-any",
			CrossSwapType::AnyToBridgeable => "any-to-bridgeable",
			CrossSwapType::AnyToAny => "any-to-any",
		};
		f.write_str(name)
	}
}

/// Direction of a single DEX trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TradeType {
	ExactInput,
	ExactOutput,
}

/// A single cross-chain swap intent.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrossSwap {
	pub input_token: Token,
	pub output_token: Token,
	#[serde(with = "u256_serde")]
	pub amount: U256,
	pub amount_type: AmountType,
	pub depositor: Address,
	pub recipient: Address,
	#[serde(default)]
	pub refund_address: Option<Address>,
	#[serde(default)]
	pub refund_on_origin: bool,
	#[serde(default)]
	pub is_input_native: bool,
	#[serde(default)]
	pub is_output_native: bool,
	/// Slippage tolerance in percent, e.g. `0.5` for 0.5%.
	pub slippage_tolerance: f64,
}

impl CrossSwap {
	pub fn origin_chain_id(&self) -> u64 {
		self.input_token.chain_id
	}

	pub fn destination_chain_id(&self) -> u64 {
		self.output_token.chain_id
	}

	/// Address that receives leftovers and refunds: `refund_address ?? depositor`.
	pub fn refund_target(&self) -> Address {
		self.refund_address.unwrap_or(self.depositor)
	}

	/// Recipient used by the multicall executor when an action reverts.
	///
	/// With `refund_on_origin` the zero address is returned so the fill reverts
	/// and the deposit is refunded on the origin chain instead.
	pub fn fallback_recipient(&self) -> Address {
		if self.refund_on_origin {
			Address::ZERO
		} else {
			self.refund_target()
		}
	}
}
