//! Chain integration module
//!
//! Everything that talks to the node or the deployed sale contract lives here: the seams the
//! controller depends on, a JSON-RPC implementation of them, ABI encoding for the contract's entry
//! points and the reader that turns a round of contract queries into a snapshot.

/// Calldata encoding and return value decoding
pub mod abi;
/// JSON-RPC implementation of the wallet and contract seams
pub mod client;
/// Wallet provider and sale contract traits
pub mod provider;
/// Snapshot reader
pub mod reader;
/// Shared chain types and errors
pub mod types;

pub use client::{JsonRpcClient, RpcSaleClient};
pub use provider::{SaleContract, WalletProvider};
pub use reader::ChainStateReader;
pub use types::*;
