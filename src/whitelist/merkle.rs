//! Merkle tree over the sale whitelist.
//!
//! Construction is fully deterministic so the root we compute off-chain matches the one committed
//! to the contract:
//!
//! 1. entries are deduplicated by address, a later occurrence replacing an earlier one;
//! 2. the survivors are sorted by address bytes, ascending;
//! 3. each entry becomes `keccak256(encode(entry))`;
//! 4. the leaf row is padded to the next power of two by repeating the last leaf hash, then
//!    reduced pairwise with [`hash_pair`] until one node remains.
//!
//! Proof generation walks the same padded rows, so a padded duplicate can appear as a sibling.

use crate::whitelist::address;
use crate::whitelist::proof::{MerkleProof, hash_pair};
use crate::whitelist::types::{LeafEncoding, WhitelistEntry, WhitelistError};

use alloy_primitives::{Address, B256};
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, info};

/// Immutable whitelist with membership tests and proof generation.
#[derive(Debug, Clone)]
pub struct MerkleWhitelist {
	encoding: LeafEncoding,
	/// Entries in sorted (leaf) order.
	entries: Vec<WhitelistEntry>,
	/// Address to leaf index.
	index: HashMap<Address, usize>,
	/// `levels[0]` is the padded leaf row, the last level holds only the root.
	levels: Vec<Vec<B256>>,
}

impl MerkleWhitelist {
	/// Build the tree from the configured entry list.
	pub fn new<I>(entries: I, encoding: LeafEncoding) -> Self
	where
		I: IntoIterator<Item = WhitelistEntry>,
	{
		// BTreeMap gives last-wins dedup and ascending address order in one pass.
		let deduped: BTreeMap<Address, WhitelistEntry> = entries
			.into_iter()
			.map(|entry| (entry.address, entry))
			.collect();
		let entries: Vec<WhitelistEntry> = deduped.into_values().collect();

		let index = entries
			.iter()
			.enumerate()
			.map(|(i, entry)| (entry.address, i))
			.collect();

		let leaves: Vec<B256> = entries.iter().map(|e| e.leaf_hash(encoding)).collect();
		let levels = Self::build_levels(leaves);

		let whitelist = Self {
			encoding,
			entries,
			index,
			levels,
		};

		info!(
			"Built whitelist tree: {} entries, {} leaves, root {}",
			whitelist.entries.len(),
			whitelist.levels.first().map_or(0, Vec::len),
			whitelist.root()
		);
		whitelist
	}

	/// Parse raw `(address, token id)` pairs and build the tree.
	pub fn from_raw<'a, I>(raw: I, encoding: LeafEncoding) -> Result<Self, WhitelistError>
	where
		I: IntoIterator<Item = (&'a str, Option<u64>)>,
	{
		let entries = raw
			.into_iter()
			.map(|(addr, token_id)| WhitelistEntry::parse(addr, token_id))
			.collect::<Result<Vec<_>, _>>()?;
		Ok(Self::new(entries, encoding))
	}

	fn build_levels(mut leaves: Vec<B256>) -> Vec<Vec<B256>> {
		if leaves.is_empty() {
			return Vec::new();
		}

		let width = leaves.len().next_power_of_two();
		if let Some(&last) = leaves.last() {
			leaves.resize(width, last);
		}

		let mut levels = vec![leaves];
		while let Some(row) = levels.last().filter(|row| row.len() > 1) {
			let parent = row
				.chunks_exact(2)
				.map(|pair| hash_pair(&pair[0], &pair[1]))
				.collect();
			levels.push(parent);
		}
		levels
	}

	pub fn encoding(&self) -> LeafEncoding {
		self.encoding
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// Entries in leaf order.
	pub fn entries(&self) -> &[WhitelistEntry] {
		&self.entries
	}

	/// Number of leaves after padding.
	pub fn leaf_count(&self) -> usize {
		self.levels.first().map_or(0, Vec::len)
	}

	/// Root committed to the contract. An empty whitelist has the zero root.
	pub fn root(&self) -> B256 {
		self.levels
			.last()
			.and_then(|row| row.first())
			.copied()
			.unwrap_or(B256::ZERO)
	}

	pub fn contains(&self, address: &Address) -> bool {
		self.index.contains_key(address)
	}

	/// Like [`MerkleWhitelist::contains`] for unparsed input; malformed input is simply absent.
	pub fn contains_raw(&self, raw: &str) -> bool {
		address::normalize(raw).is_ok_and(|addr| self.contains(&addr))
	}

	pub fn entry_for(&self, address: &Address) -> Option<&WhitelistEntry> {
		self.index.get(address).map(|&i| &self.entries[i])
	}

	/// Sibling hashes from the entry's leaf up to the root.
	pub fn proof_for(&self, address: &Address) -> Result<MerkleProof, WhitelistError> {
		let mut position = *self
			.index
			.get(address)
			.ok_or(WhitelistError::NotInWhitelist(*address))?;

		let depth = self.levels.len().saturating_sub(1);
		let mut siblings = Vec::with_capacity(depth);
		for row in &self.levels[..depth] {
			siblings.push(row[position ^ 1]);
			position >>= 1;
		}

		debug!(
			"Generated proof of {} siblings for {}",
			siblings.len(),
			address::canonical(address)
		);
		Ok(MerkleProof::new(siblings))
	}

	/// The proof as a flat byte string, for use outside a transaction.
	pub fn raw_proof_for(&self, address: &Address) -> Result<Vec<u8>, WhitelistError> {
		Ok(self.proof_for(address)?.to_bytes())
	}

	/// Verify a proof for `entry` against this tree's root.
	pub fn verify(&self, proof: &MerkleProof, entry: &WhitelistEntry) -> bool {
		!self.is_empty() && proof.verify(entry, self.encoding, self.root())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use alloy_primitives::keccak256;

	fn addr(last: u8) -> Address {
		let mut bytes = [0u8; 20];
		bytes[19] = last;
		Address::from(bytes)
	}

	fn entries(lasts: &[u8]) -> Vec<WhitelistEntry> {
		lasts.iter().map(|&l| WhitelistEntry::new(addr(l), 0)).collect()
	}

	#[test]
	fn test_root_ignores_input_order() {
		let forward = MerkleWhitelist::new(entries(&[1, 2, 3, 4, 5]), LeafEncoding::Address);
		let shuffled = MerkleWhitelist::new(entries(&[4, 1, 5, 3, 2]), LeafEncoding::Address);
		assert_eq!(forward.root(), shuffled.root());
		assert_eq!(forward.entries(), shuffled.entries());
	}

	#[test]
	fn test_every_member_verifies() {
		for n in 1..=9u8 {
			let lasts: Vec<u8> = (1..=n).collect();
			let tree = MerkleWhitelist::new(entries(&lasts), LeafEncoding::Address);
			for entry in tree.entries() {
				let proof = tree.proof_for(&entry.address).unwrap();
				assert!(tree.verify(&proof, entry), "n={n} entry={:?}", entry.address);
				assert_eq!(proof.len(), tree.leaf_count().trailing_zeros() as usize);
			}
		}
	}

	#[test]
	fn test_three_entries_pad_to_four() {
		let (a, b, c, d) = (addr(0xa), addr(0xb), addr(0xc), addr(0xd));
		let tree = MerkleWhitelist::new(entries(&[0xa, 0xb, 0xc]), LeafEncoding::Address);
		assert_eq!(tree.leaf_count(), 4);

		let leaf = |x: Address| keccak256(x.as_slice());
		let left = hash_pair(&leaf(a), &leaf(b));
		let right = hash_pair(&leaf(c), &leaf(c));
		assert_eq!(tree.root(), hash_pair(&left, &right));

		let proof_a = tree.proof_for(&a).unwrap();
		assert_eq!(proof_a.siblings(), &[leaf(b), right]);

		// C's sibling is its own padded duplicate.
		let proof_c = tree.proof_for(&c).unwrap();
		assert_eq!(proof_c.siblings(), &[leaf(c), left]);

		assert!(!tree.contains(&d));
		assert_eq!(tree.proof_for(&d), Err(WhitelistError::NotInWhitelist(d)));
		assert_eq!(tree.raw_proof_for(&d), Err(WhitelistError::NotInWhitelist(d)));
	}

	#[test]
	fn test_proofs_are_stable() {
		let tree = MerkleWhitelist::new(entries(&[7, 8, 9]), LeafEncoding::Address);
		let first = tree.raw_proof_for(&addr(8)).unwrap();
		let second = tree.raw_proof_for(&addr(8)).unwrap();
		assert_eq!(first, second);
		assert_eq!(first.len(), 64);
		assert_eq!(MerkleProof::from_bytes(&first).unwrap(), tree.proof_for(&addr(8)).unwrap());
	}

	#[test]
	fn test_duplicates_keep_last_occurrence() {
		let tree = MerkleWhitelist::new(
			vec![
				WhitelistEntry::new(addr(1), 10),
				WhitelistEntry::new(addr(2), 20),
				WhitelistEntry::new(addr(1), 11),
			],
			LeafEncoding::AddressAndTokenId,
		);
		assert_eq!(tree.len(), 2);
		assert_eq!(tree.entry_for(&addr(1)).map(|e| e.token_id), Some(11));

		let proof = tree.proof_for(&addr(1)).unwrap();
		assert!(tree.verify(&proof, &WhitelistEntry::new(addr(1), 11)));
		assert!(!tree.verify(&proof, &WhitelistEntry::new(addr(1), 10)));
	}

	#[test]
	fn test_single_and_empty() {
		let single = MerkleWhitelist::new(entries(&[1]), LeafEncoding::Address);
		assert_eq!(single.root(), keccak256(addr(1).as_slice()));
		assert!(single.proof_for(&addr(1)).unwrap().is_empty());

		let empty = MerkleWhitelist::new(Vec::new(), LeafEncoding::Address);
		assert_eq!(empty.root(), B256::ZERO);
		assert!(!empty.contains(&addr(1)));
		assert!(!empty.verify(&MerkleProof::default(), &WhitelistEntry::new(addr(1), 0)));
	}

	#[test]
	fn test_raw_lookup_is_case_insensitive() {
		let tree = MerkleWhitelist::from_raw(
			[("0xC039115A382B74715D479A692B34835501FDBEEC", None)],
			LeafEncoding::Address,
		)
		.unwrap();
		assert!(tree.contains_raw("c039115a382b74715d479a692b34835501fdbeec"));
		assert!(!tree.contains_raw("not an address"));

		let err = MerkleWhitelist::from_raw([("0x12", None)], LeafEncoding::Address).unwrap_err();
		assert!(matches!(err, WhitelistError::InvalidAddress(_)));
	}
}
