use crate::whitelist::address::{self, AddressError};

use alloy_primitives::{Address, B256, U256, keccak256};
use serde::{Deserialize, Serialize};

/// One allow-listed account, optionally bound to a token id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WhitelistEntry {
	pub address: Address,
	/// Associated token id, `0` when the source list did not carry one.
	pub token_id: u64,
}

impl WhitelistEntry {
	pub fn new(address: Address, token_id: u64) -> Self {
		Self { address, token_id }
	}

	/// Parse an entry from a raw address string, normalizing the address.
	pub fn parse(raw_address: &str, token_id: Option<u64>) -> Result<Self, AddressError> {
		Ok(Self::new(address::normalize(raw_address)?, token_id.unwrap_or(0)))
	}

	/// Canonical encoding fed to the leaf hash.
	///
	/// Mirrors Solidity's `abi.encodePacked`: the raw 20 address bytes, followed by the token id as
	/// a 32-byte big-endian `uint256` when the encoding includes it.
	pub fn encode(&self, encoding: LeafEncoding) -> Vec<u8> {
		match encoding {
			LeafEncoding::Address => self.address.to_vec(),
			LeafEncoding::AddressAndTokenId => {
				let mut bytes = Vec::with_capacity(20 + 32);
				bytes.extend_from_slice(self.address.as_slice());
				bytes.extend_from_slice(&U256::from(self.token_id).to_be_bytes::<32>());
				bytes
			}
		}
	}

	/// `keccak256(encode(entry))`
	pub fn leaf_hash(&self, encoding: LeafEncoding) -> B256 {
		keccak256(self.encode(encoding))
	}
}

/// Which fields of an entry the contract hashes into a leaf.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LeafEncoding {
	/// `keccak256(abi.encodePacked(address))`
	#[default]
	Address,
	/// `keccak256(abi.encodePacked(address, uint256 tokenId))`
	AddressAndTokenId,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WhitelistError {
	#[error("address {} is not in the whitelist", address::canonical(.0))]
	NotInWhitelist(Address),

	#[error(transparent)]
	InvalidAddress(#[from] AddressError),

	#[error("raw proof length {0} is not a multiple of 32 bytes")]
	MalformedProof(usize),
}
