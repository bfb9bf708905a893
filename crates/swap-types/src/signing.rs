//! Values read from token contracts when building signature payloads.

use alloy_primitives::{B256, U256};
use serde::{Deserialize, Serialize};

/// The EIP-712 `version()` value a token contract reports.
///
/// Most tokens return a string, a few return an integer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ReportedVersion {
	Text(String),
	Numeric(u64),
}

/// Domain fields read from a token contract for typed-data signing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenDomain {
	pub name: String,
	/// Resolved EIP-712 domain version, as used in the domain hash.
	pub version: String,
	pub domain_separator: B256,
	/// Permit nonce of the signer; absent for authorization flows.
	pub nonce: Option<U256>,
}
