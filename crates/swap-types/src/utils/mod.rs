//! Utility functions shared by the engine and its collaborators.

pub mod amounts;
pub mod eip712;
pub mod formatting;
pub mod helpers;

pub use amounts::{
	apply_markup_bps, convert_decimals, convert_decimals_ceil, slippage_bps, with_max_slippage,
	with_min_slippage, BPS_DENOMINATOR,
};
pub use eip712::{
	compute_domain_hash, compute_final_digest, permit_struct_hash,
	transfer_with_authorization_struct_hash, Eip712AbiEncoder, DOMAIN_TYPE, PERMIT_TYPE,
	TRANSFER_WITH_AUTHORIZATION_TYPE,
};
pub use formatting::{format_token_amount, truncate_id, with_0x_prefix, without_0x_prefix};
pub use helpers::current_timestamp;

/// Serde adapter encoding `U256` as a decimal string.
pub mod u256_serde {
	use alloy_primitives::U256;
	use serde::{de::Error, Deserialize, Deserializer, Serialize, Serializer};

	pub fn serialize<S>(value: &U256, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		value.to_string().serialize(serializer)
	}

	pub fn deserialize<'de, D>(deserializer: D) -> Result<U256, D::Error>
	where
		D: Deserializer<'de>,
	{
		let s = String::deserialize(deserializer)?;
		U256::from_str_radix(&s, 10).map_err(D::Error::custom)
	}
}
