//! Merkle proofs over the whitelist tree.
//!
//! Internal nodes are `keccak256(min(a, b) ‖ max(a, b))`: the smaller of the two child hashes
//! (compared as big-endian byte strings) always goes first. Because of that a proof is just the
//! list of sibling hashes from the leaf upwards; no left/right flags are needed, which is also
//! what OpenZeppelin's `MerkleProof.verify` expects on-chain.

use crate::whitelist::types::{LeafEncoding, WhitelistEntry, WhitelistError};

use alloy_primitives::{B256, keccak256};
use std::fmt;

/// Hash two sibling nodes in sorted order.
pub fn hash_pair(a: &B256, b: &B256) -> B256 {
	let (left, right) = if a <= b { (a, b) } else { (b, a) };
	let mut buf = [0u8; 64];
	buf[..32].copy_from_slice(left.as_slice());
	buf[32..].copy_from_slice(right.as_slice());
	keccak256(buf)
}

/// Sibling hashes from a leaf up to (but excluding) the root.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MerkleProof {
	siblings: Vec<B256>,
}

impl MerkleProof {
	pub fn new(siblings: Vec<B256>) -> Self {
		Self { siblings }
	}

	pub fn siblings(&self) -> &[B256] {
		&self.siblings
	}

	pub fn len(&self) -> usize {
		self.siblings.len()
	}

	pub fn is_empty(&self) -> bool {
		self.siblings.is_empty()
	}

	/// Fold the proof over `leaf` and return the implied root.
	pub fn compute_root(&self, leaf: B256) -> B256 {
		self.siblings
			.iter()
			.fold(leaf, |node, sibling| hash_pair(&node, sibling))
	}

	/// Check that `entry` hashes up to `root` through this proof.
	pub fn verify(&self, entry: &WhitelistEntry, encoding: LeafEncoding, root: B256) -> bool {
		self.compute_root(entry.leaf_hash(encoding)) == root
	}

	/// Flat concatenation of the sibling hashes, 32 bytes each.
	pub fn to_bytes(&self) -> Vec<u8> {
		self.siblings
			.iter()
			.flat_map(|sibling| sibling.as_slice().iter().copied())
			.collect()
	}

	/// Parse a flat concatenation produced by [`MerkleProof::to_bytes`].
	pub fn from_bytes(bytes: &[u8]) -> Result<Self, WhitelistError> {
		if bytes.len() % 32 != 0 {
			return Err(WhitelistError::MalformedProof(bytes.len()));
		}
		Ok(Self::new(bytes.chunks_exact(32).map(B256::from_slice).collect()))
	}

	/// `[0x…,0x…]`, the form block explorers accept for a `bytes32[]` argument.
	pub fn to_hex_array(&self) -> String {
		self.to_string()
	}
}

impl fmt::Display for MerkleProof {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str("[")?;
		for (i, sibling) in self.siblings.iter().enumerate() {
			if i > 0 {
				f.write_str(",")?;
			}
			write!(f, "0x{}", hex::encode(sibling.as_slice()))?;
		}
		f.write_str("]")
	}
}
