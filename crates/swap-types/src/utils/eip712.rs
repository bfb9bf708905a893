//! EIP-712 hashing helpers for token permit and transfer-authorization flows.
//!
//! - Domain hash computation (name, version, chainId, verifyingContract)
//! - Struct hashes for `Permit` and `TransferWithAuthorization`
//! - Final digest computation (0x1901 || domainHash || structHash)

use alloy_primitives::{keccak256, Address, B256, U256};

pub const DOMAIN_TYPE: &str =
	"EIP712Domain(string name,string version,uint256 chainId,address verifyingContract)";
pub const PERMIT_TYPE: &str =
	"Permit(address owner,address spender,uint256 value,uint256 nonce,uint256 deadline)";
pub const TRANSFER_WITH_AUTHORIZATION_TYPE: &str = "TransferWithAuthorization(address from,address to,uint256 value,uint256 validAfter,uint256 validBefore,bytes32 nonce)";

/// keccak256(abi.encode(typeHash, keccak256(name), keccak256(version), chainId, verifyingContract))
pub fn compute_domain_hash(
	name: &str,
	version: &str,
	chain_id: u64,
	verifying_contract: &Address,
) -> B256 {
	let mut enc = Eip712AbiEncoder::new();
	enc.push_b256(&keccak256(DOMAIN_TYPE.as_bytes()));
	enc.push_b256(&keccak256(name.as_bytes()));
	enc.push_b256(&keccak256(version.as_bytes()));
	enc.push_u256(U256::from(chain_id));
	enc.push_address(verifying_contract);
	keccak256(enc.finish())
}

pub fn permit_struct_hash(
	owner: &Address,
	spender: &Address,
	value: U256,
	nonce: U256,
	deadline: U256,
) -> B256 {
	let mut enc = Eip712AbiEncoder::new();
	enc.push_b256(&keccak256(PERMIT_TYPE.as_bytes()));
	enc.push_address(owner);
	enc.push_address(spender);
	enc.push_u256(value);
	enc.push_u256(nonce);
	enc.push_u256(deadline);
	keccak256(enc.finish())
}

pub fn transfer_with_authorization_struct_hash(
	from: &Address,
	to: &Address,
	value: U256,
	valid_after: U256,
	valid_before: U256,
	nonce: &B256,
) -> B256 {
	let mut enc = Eip712AbiEncoder::new();
	enc.push_b256(&keccak256(TRANSFER_WITH_AUTHORIZATION_TYPE.as_bytes()));
	enc.push_address(from);
	enc.push_address(to);
	enc.push_u256(value);
	enc.push_u256(valid_after);
	enc.push_u256(valid_before);
	enc.push_b256(nonce);
	keccak256(enc.finish())
}

/// keccak256(0x1901 || domainHash || structHash)
pub fn compute_final_digest(domain_hash: &B256, struct_hash: &B256) -> B256 {
	let mut out = Vec::with_capacity(2 + 32 + 32);
	out.extend_from_slice(&[0x19, 0x01]);
	out.extend_from_slice(domain_hash.as_slice());
	out.extend_from_slice(struct_hash.as_slice());
	keccak256(out)
}

/// ABI encoder for the static word types used in the struct hashes above.
#[derive(Default)]
pub struct Eip712AbiEncoder {
	buf: Vec<u8>,
}

impl Eip712AbiEncoder {
	pub fn new() -> Self {
		Self { buf: Vec::new() }
	}

	pub fn push_b256(&mut self, v: &B256) {
		self.buf.extend_from_slice(v.as_slice());
	}

	pub fn push_address(&mut self, addr: &Address) {
		self.buf.extend_from_slice(addr.into_word().as_slice());
	}

	pub fn push_u256(&mut self, v: U256) {
		self.buf.extend_from_slice(&v.to_be_bytes::<32>());
	}

	pub fn finish(self) -> Vec<u8> {
		self.buf
	}
}
