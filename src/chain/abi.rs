//! Minimal Solidity ABI encoding for the sale contract's entry points.
//!
//! Only the shapes the contract needs are supported: static `uint256`/`address`/`bool` words and
//! a single trailing dynamic `bytes32[]` (the Merkle proof).

use crate::chain::types::{ContractCall, RpcError};
use crate::whitelist::MerkleProof;

use alloy_primitives::{Address, U256, keccak256};

pub const MAX_SUPPLY: &str = "maxSupply()";
pub const TOTAL_SUPPLY: &str = "totalSupply()";
pub const MAX_MINT_AMOUNT_PER_TX: &str = "maxMintAmountPerTx()";
pub const COST: &str = "cost()";
pub const PAUSED: &str = "paused()";
pub const WHITELIST_MINT_ENABLED: &str = "whitelistMintEnabled()";
pub const PREMINTLIST_MINT_ENABLED: &str = "premintlistMintEnabled()";
pub const CLAIM_UTILITY_OPEN: &str = "claimUtilityOpen()";
pub const BALANCE_TO_CLAIM: &str = "getBalanceToClaimForAddress(address)";

const MINT: &str = "mint(uint256)";
const WHITELIST_MINT: &str = "whitelistMint(uint256,uint256,bytes32[])";
const PREMINTLIST_MINT: &str = "premintlistMint(uint256,bytes32[])";
const CLAIM_UTILITY: &str = "claimUtility(uint256)";

/// First four bytes of `keccak256(signature)`.
pub fn selector(signature: &str) -> [u8; 4] {
	let hash = keccak256(signature.as_bytes());
	[hash[0], hash[1], hash[2], hash[3]]
}

fn uint_word(value: U256) -> [u8; 32] {
	value.to_be_bytes::<32>()
}

fn address_word(address: &Address) -> [u8; 32] {
	let mut word = [0u8; 32];
	word[12..].copy_from_slice(address.as_slice());
	word
}

struct CallData(Vec<u8>);

impl CallData {
	fn new(signature: &str) -> Self {
		Self(selector(signature).to_vec())
	}

	fn word(mut self, word: [u8; 32]) -> Self {
		self.0.extend_from_slice(&word);
		self
	}

	fn uint(self, value: u64) -> Self {
		self.word(uint_word(U256::from(value)))
	}

	/// Tail of a `bytes32[]`: length word followed by the elements.
	fn bytes32_array(mut self, proof: &MerkleProof) -> Self {
		self.0.extend_from_slice(&uint_word(U256::from(proof.len())));
		for sibling in proof.siblings() {
			self.0.extend_from_slice(sibling.as_slice());
		}
		self
	}

	fn finish(self) -> Vec<u8> {
		self.0
	}
}

/// Calldata for a view function without arguments.
pub fn encode_query(signature: &str) -> Vec<u8> {
	CallData::new(signature).finish()
}

pub fn encode_balance_query(address: &Address) -> Vec<u8> {
	CallData::new(BALANCE_TO_CLAIM)
		.word(address_word(address))
		.finish()
}

/// Calldata for a state-changing call.
pub fn encode_call(call: &ContractCall) -> Vec<u8> {
	match call {
		ContractCall::Mint { quantity } => CallData::new(MINT).uint(*quantity).finish(),
		ContractCall::WhitelistMint {
			quantity,
			token_id,
			proof,
		} => CallData::new(WHITELIST_MINT)
			.uint(*quantity)
			.uint(*token_id)
			// offset of the array tail, past three head words
			.uint(96)
			.bytes32_array(proof)
			.finish(),
		ContractCall::PremintlistMint { quantity, proof } => CallData::new(PREMINTLIST_MINT)
			.uint(*quantity)
			.uint(64)
			.bytes32_array(proof)
			.finish(),
		ContractCall::ClaimUtility { amount } => {
			CallData::new(CLAIM_UTILITY).word(uint_word(*amount)).finish()
		}
	}
}

fn first_word(data: &[u8]) -> Result<&[u8], RpcError> {
	data.get(..32).ok_or_else(|| {
		RpcError::DecodeError(format!("expected a 32-byte word, got {} bytes", data.len()))
	})
}

pub fn decode_u256(data: &[u8]) -> Result<U256, RpcError> {
	Ok(U256::from_be_slice(first_word(data)?))
}

/// Decode a `uint256` that must fit in a `u64` (supplies, per-tx limits).
pub fn decode_u64(data: &[u8]) -> Result<u64, RpcError> {
	let value = decode_u256(data)?;
	if value > U256::from(u64::MAX) {
		return Err(RpcError::DecodeError(format!("value {} does not fit in u64", value)));
	}
	Ok(value.as_limbs()[0])
}

pub fn decode_bool(data: &[u8]) -> Result<bool, RpcError> {
	match decode_u256(data)? {
		v if v.is_zero() => Ok(false),
		v if v == U256::from(1u8) => Ok(true),
		v => Err(RpcError::DecodeError(format!("invalid bool word {}", v))),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use alloy_primitives::B256;

	#[test]
	fn test_known_selectors() {
		assert_eq!(selector(MINT), [0xa0, 0x71, 0x2d, 0x68]);
		assert_eq!(selector(TOTAL_SUPPLY), [0x18, 0x16, 0x0d, 0xdd]);
		assert_eq!(selector(PAUSED), [0x5c, 0x97, 0x5a, 0xbb]);
	}

	#[test]
	fn test_whitelist_mint_layout() {
		let proof = MerkleProof::new(vec![B256::repeat_byte(0x11), B256::repeat_byte(0x22)]);
		let data = encode_call(&ContractCall::WhitelistMint {
			quantity: 2,
			token_id: 273,
			proof,
		});

		assert_eq!(data.len(), 4 + 32 * 6);
		assert_eq!(&data[..4], &selector(WHITELIST_MINT));
		let word = |i: usize| &data[4 + 32 * i..4 + 32 * (i + 1)];
		assert_eq!(decode_u64(word(0)).unwrap(), 2);
		assert_eq!(decode_u64(word(1)).unwrap(), 273);
		assert_eq!(decode_u64(word(2)).unwrap(), 96);
		assert_eq!(decode_u64(word(3)).unwrap(), 2);
		assert_eq!(word(4), B256::repeat_byte(0x11).as_slice());
		assert_eq!(word(5), B256::repeat_byte(0x22).as_slice());
	}

	#[test]
	fn test_premint_and_empty_proof() {
		let data = encode_call(&ContractCall::PremintlistMint {
			quantity: 1,
			proof: MerkleProof::default(),
		});
		assert_eq!(data.len(), 4 + 32 * 3);
		assert_eq!(decode_u64(&data[36..68]).unwrap(), 64);
		assert_eq!(decode_u64(&data[68..100]).unwrap(), 0);
	}

	#[test]
	fn test_balance_query_pads_address() {
		let address = Address::repeat_byte(0xee);
		let data = encode_balance_query(&address);
		assert_eq!(data.len(), 36);
		assert!(data[4..16].iter().all(|b| *b == 0));
		assert_eq!(&data[16..], address.as_slice());
	}

	#[test]
	fn test_decoding() {
		let mut word = [0u8; 32];
		assert!(!decode_bool(&word).unwrap());
		word[31] = 1;
		assert!(decode_bool(&word).unwrap());
		word[31] = 2;
		assert!(decode_bool(&word).is_err());

		assert!(decode_u256(&word[..31]).is_err());

		let big = [0xffu8; 32];
		assert_eq!(decode_u256(&big).unwrap(), U256::MAX);
		assert!(decode_u64(&big).is_err());
	}
}
