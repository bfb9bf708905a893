//! Destination-chain multicall actions, the bridge deposit structure and the
//! final transaction artifact.

use crate::utils::u256_serde;
use alloy_primitives::{Address, Bytes, U256};
use serde::{Deserialize, Serialize};

/// A single call executed by the destination multicall executor.
///
/// Actions run sequentially; their order is significant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MulticallAction {
	pub target: Address,
	pub call_data: Bytes,
	#[serde(with = "u256_serde")]
	pub value: U256,
}

impl MulticallAction {
	/// An action that sends no native value.
	pub fn call(target: Address, call_data: impl Into<Bytes>) -> Self {
		Self {
			target,
			call_data: call_data.into(),
			value: U256::ZERO,
		}
	}

	/// A plain native transfer with empty calldata.
	pub fn native_transfer(recipient: Address, value: U256) -> Self {
		Self {
			target: recipient,
			call_data: Bytes::new(),
			value,
		}
	}
}

/// Fields submitted to (or signed for) the bridge deposit entry point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepositStruct {
	pub depositor: Address,
	pub recipient: Address,
	pub input_token: Address,
	pub output_token: Address,
	#[serde(with = "u256_serde")]
	pub input_amount: U256,
	#[serde(with = "u256_serde")]
	pub output_amount: U256,
	pub destination_chain_id: u64,
	pub exclusive_relayer: Address,
	pub quote_timestamp: u32,
	pub fill_deadline: u32,
	pub exclusivity_deadline: u32,
	pub message: Bytes,
}

/// A ready-to-send origin-chain transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrossSwapTx {
	pub chain_id: u64,
	pub from: Address,
	pub to: Address,
	pub data: Bytes,
	#[serde(with = "u256_serde")]
	pub value: U256,
}
