//! Whitelist membership and Merkle proofs
//!
//! The sale contract stores only a Merkle root; everything needed to prove membership is built
//! here, off-chain, from the configured entry list.
//!
//! - `address`: address parsing and canonical form.
//! - `types`: whitelist entries, leaf encodings and errors.
//! - `merkle`: the tree itself, membership tests and proof generation.
//! - `proof`: proof representation, verification and serialization.

pub mod address;
pub mod merkle;
pub mod proof;
pub mod types;

pub use address::AddressError;
pub use merkle::MerkleWhitelist;
pub use proof::MerkleProof;
pub use types::*;
