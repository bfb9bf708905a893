//! Gasless-approval payloads.
//!
//! Before a permit or transfer authorization is built for a token, its
//! EIP-712 domain is read from the contract and the domain separator is
//! recomputed locally. A token whose on-chain separator differs is never
//! trusted: the signature the user produces would not be valid there, or
//! would be valid for a different domain.

use crate::transaction::CallTemplate;
use crate::CrossSwapError;
use alloy_primitives::{keccak256, Address, B256, U256};
use serde::Serialize;
use serde_json::json;
use swap_chain::ChainReaderInterface;
use swap_types::utils::{
	compute_domain_hash, compute_final_digest, permit_struct_hash,
	transfer_with_authorization_struct_hash,
};
use swap_types::{ReportedVersion, TokenDomain};
use tracing::{debug, warn};

/// Resolves the domain version from the token's `version()`.
///
/// Only the literal values "1", "2", 1 and 2 are accepted; anything else,
/// including a missing `version()`, falls back to `default_version`.
pub fn resolve_domain_version(reported: Option<&ReportedVersion>, default_version: u64) -> String {
	match reported {
		Some(ReportedVersion::Text(v)) if v == "1" || v == "2" => v.clone(),
		Some(ReportedVersion::Numeric(v @ (1 | 2))) => v.to_string(),
		_ => default_version.to_string(),
	}
}

/// Reads and verifies the EIP-712 domain of `token`.
///
/// `owner` is the permit signer; pass `None` for authorization flows, which
/// use random nonces instead of the token's counter.
pub async fn verify_token_domain(
	chain: &dyn ChainReaderInterface,
	chain_id: u64,
	token: Address,
	owner: Option<Address>,
	default_version: u64,
) -> Result<TokenDomain, CrossSwapError> {
	let nonce = async {
		match owner {
			Some(owner) => chain.permit_nonce(chain_id, token, owner).await.map(Some),
			None => Ok(None),
		}
	};
	let (name, version, nonce, domain_separator) = tokio::join!(
		chain.token_name(chain_id, token),
		chain.token_version(chain_id, token),
		nonce,
		chain.domain_separator(chain_id, token),
	);

	let unsupported = |field: &str, e: swap_chain::ChainError| {
		warn!(chain_id, token = %token, field, error = %e, "Token does not support typed-data signing");
		CrossSwapError::SignatureSchemeUnsupported(format!(
			"token {:#x} on chain {} does not expose {}",
			token, chain_id, field
		))
	};
	let name = name.map_err(|e| unsupported("name", e))?;
	let nonce = nonce.map_err(|e| unsupported("nonces", e))?;
	let actual = domain_separator.map_err(|e| unsupported("DOMAIN_SEPARATOR", e))?;

	let version = resolve_domain_version(version.ok().as_ref(), default_version);
	let expected = compute_domain_hash(&name, &version, chain_id, &token);
	if expected != actual {
		warn!(
			chain_id,
			token = %token,
			expected = %expected,
			actual = %actual,
			"Domain separator mismatch"
		);
		return Err(CrossSwapError::DomainSeparatorMismatch { expected, actual });
	}

	debug!(chain_id, token = %token, name = %name, version = %version, "Token domain verified");
	Ok(TokenDomain {
		name,
		version,
		domain_separator: actual,
		nonce,
	})
}

/// Typed data to sign, its digest and the call to submit with the signature.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignablePayload {
	pub eip712: serde_json::Value,
	pub digest: B256,
	pub call_template: CallTemplate,
}

/// Fields of an EIP-2612 permit.
#[derive(Debug, Clone)]
pub struct PermitFields {
	pub owner: Address,
	pub spender: Address,
	pub value: U256,
	pub deadline: U256,
}

/// Fields of an EIP-3009 transfer authorization.
#[derive(Debug, Clone)]
pub struct AuthorizationFields {
	pub from: Address,
	pub to: Address,
	pub value: U256,
	pub valid_after: U256,
	pub valid_before: U256,
	pub nonce: B256,
}

impl AuthorizationFields {
	/// A fresh random authorization nonce.
	pub fn random_nonce() -> B256 {
		keccak256(uuid::Uuid::new_v4().as_bytes())
	}
}

fn domain_json(domain: &TokenDomain, chain_id: u64, token: Address) -> serde_json::Value {
	json!({
		"name": domain.name,
		"version": domain.version,
		"chainId": chain_id,
		"verifyingContract": token,
	})
}

fn domain_types() -> serde_json::Value {
	json!([
		{"name": "name", "type": "string"},
		{"name": "version", "type": "string"},
		{"name": "chainId", "type": "uint256"},
		{"name": "verifyingContract", "type": "address"},
	])
}

/// Builds a permit payload for a verified token.
pub fn permit_payload(
	domain: &TokenDomain,
	chain_id: u64,
	token: Address,
	fields: &PermitFields,
	call_template: CallTemplate,
) -> Result<SignablePayload, CrossSwapError> {
	let nonce = domain.nonce.ok_or_else(|| {
		CrossSwapError::SignatureSchemeUnsupported(format!(
			"no permit nonce read for token {:#x}",
			token
		))
	})?;
	let struct_hash = permit_struct_hash(
		&fields.owner,
		&fields.spender,
		fields.value,
		nonce,
		fields.deadline,
	);
	let digest = compute_final_digest(&domain.domain_separator, &struct_hash);

	let eip712 = json!({
		"types": {
			"EIP712Domain": domain_types(),
			"Permit": [
				{"name": "owner", "type": "address"},
				{"name": "spender", "type": "address"},
				{"name": "value", "type": "uint256"},
				{"name": "nonce", "type": "uint256"},
				{"name": "deadline", "type": "uint256"},
			],
		},
		"domain": domain_json(domain, chain_id, token),
		"primaryType": "Permit",
		"message": {
			"owner": fields.owner,
			"spender": fields.spender,
			"value": fields.value.to_string(),
			"nonce": nonce.to_string(),
			"deadline": fields.deadline.to_string(),
		},
	});

	Ok(SignablePayload {
		eip712,
		digest,
		call_template,
	})
}

/// Builds a transfer-with-authorization payload for a verified token.
pub fn authorization_payload(
	domain: &TokenDomain,
	chain_id: u64,
	token: Address,
	fields: &AuthorizationFields,
	call_template: CallTemplate,
) -> SignablePayload {
	let struct_hash = transfer_with_authorization_struct_hash(
		&fields.from,
		&fields.to,
		fields.value,
		fields.valid_after,
		fields.valid_before,
		&fields.nonce,
	);
	let digest = compute_final_digest(&domain.domain_separator, &struct_hash);

	let eip712 = json!({
		"types": {
			"EIP712Domain": domain_types(),
			"TransferWithAuthorization": [
				{"name": "from", "type": "address"},
				{"name": "to", "type": "address"},
				{"name": "value", "type": "uint256"},
				{"name": "validAfter", "type": "uint256"},
				{"name": "validBefore", "type": "uint256"},
				{"name": "nonce", "type": "bytes32"},
			],
		},
		"domain": domain_json(domain, chain_id, token),
		"primaryType": "TransferWithAuthorization",
		"message": {
			"from": fields.from,
			"to": fields.to,
			"value": fields.value.to_string(),
			"validAfter": fields.valid_after.to_string(),
			"validBefore": fields.valid_before.to_string(),
			"nonce": fields.nonce,
		},
	});

	SignablePayload {
		eip712,
		digest,
		call_template,
	}
}
