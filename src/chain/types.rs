//! Types shared by the chain-facing side of the crate

use crate::whitelist::MerkleProof;

use alloy_primitives::U256;
use serde::{Deserialize, Serialize};

/// Network reported by the wallet provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkInfo {
	#[serde(rename = "chainId")]
	pub chain_id: u64,
	pub name: String,
}

impl NetworkInfo {
	pub fn new(chain_id: u64) -> Self {
		Self {
			chain_id,
			name: network_name(chain_id).to_string(),
		}
	}
}

/// Human name for well-known chain ids, `"unknown"` otherwise.
pub fn network_name(chain_id: u64) -> &'static str {
	match chain_id {
		1 => "homestead",
		3 => "ropsten",
		4 => "rinkeby",
		5 => "goerli",
		11155111 => "sepolia",
		137 => "matic",
		80001 => "maticmum",
		31337 => "hardhat",
		_ => "unknown",
	}
}

/// Sale state as read from the contract at one point in time.
///
/// A snapshot is only ever built complete; a refresh that fails halfway produces nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractSnapshot {
	pub total_supply: u64,
	pub max_supply: u64,
	/// Unit price in wei.
	pub price_per_token: U256,
	pub max_mint_per_transaction: u64,
	pub paused: bool,
	pub whitelist_mint_enabled: bool,
	pub premintlist_mint_enabled: bool,
	pub royalties_claim_open: bool,
	/// Claimable royalties for the session address, zero when there is none.
	pub claimable_royalty_balance: U256,
}

impl ContractSnapshot {
	pub fn is_sold_out(&self) -> bool {
		self.max_supply != 0 && self.total_supply >= self.max_supply
	}

	pub fn remaining_supply(&self) -> u64 {
		self.max_supply.saturating_sub(self.total_supply)
	}

	/// Public or whitelist sale currently accepting mints.
	pub fn is_sale_open(&self) -> bool {
		!self.paused || self.whitelist_mint_enabled
	}
}

/// State-changing contract entry points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContractCall {
	Mint {
		quantity: u64,
	},
	WhitelistMint {
		quantity: u64,
		token_id: u64,
		proof: MerkleProof,
	},
	PremintlistMint {
		quantity: u64,
		proof: MerkleProof,
	},
	ClaimUtility {
		amount: U256,
	},
}

impl ContractCall {
	pub fn name(&self) -> &'static str {
		match self {
			ContractCall::Mint { .. } => "mint",
			ContractCall::WhitelistMint { .. } => "whitelistMint",
			ContractCall::PremintlistMint { .. } => "premintlistMint",
			ContractCall::ClaimUtility { .. } => "claimUtility",
		}
	}
}

/// Error object returned by a JSON-RPC endpoint or injected wallet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RpcErrorObject {
	pub code: i64,
	pub message: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub data: Option<serde_json::Value>,
}

impl RpcErrorObject {
	/// Code wallets use when the user declines a request (EIP-1193).
	pub const USER_REJECTED: i64 = 4001;

	/// Most specific message carried by the error, looking into nested `data` first.
	pub fn best_message(&self) -> String {
		let nested = self.data.as_ref().and_then(|data| {
			data.get("message")
				.or_else(|| data.get("error").and_then(|e| e.get("message")))
				.and_then(|m| m.as_str())
		});
		nested.unwrap_or(&self.message).to_string()
	}
}

/// Errors raised while talking to the chain
#[derive(Debug, thiserror::Error)]
pub enum RpcError {
	#[error("HTTP error: {0}")]
	HttpError(#[from] reqwest::Error),

	#[error("JSON parse error: {0}")]
	JsonError(#[from] serde_json::Error),

	#[error("RPC error {}: {}", .0.code, .0.message)]
	Rpc(RpcErrorObject),

	#[error("No data returned")]
	NoData,

	#[error("Decode error: {0}")]
	DecodeError(String),

	#[error("Timed out: {0}")]
	Timeout(String),

	#[error("Transaction {0} reverted")]
	Reverted(String),

	#[error("{0}")]
	Other(String),
}

impl RpcError {
	/// Short text suitable for the user, without transport noise.
	pub fn user_message(&self) -> String {
		match self {
			RpcError::Rpc(obj) => obj.best_message(),
			other => other.to_string(),
		}
	}

	pub fn is_user_rejection(&self) -> bool {
		matches!(self, RpcError::Rpc(obj) if obj.code == RpcErrorObject::USER_REJECTED)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	fn snapshot() -> ContractSnapshot {
		ContractSnapshot {
			total_supply: 10,
			max_supply: 10,
			price_per_token: U256::ZERO,
			max_mint_per_transaction: 1,
			paused: true,
			whitelist_mint_enabled: false,
			premintlist_mint_enabled: false,
			royalties_claim_open: false,
			claimable_royalty_balance: U256::ZERO,
		}
	}

	#[test]
	fn test_snapshot_flags() {
		let mut s = snapshot();
		assert!(s.is_sold_out());
		assert!(!s.is_sale_open());
		assert_eq!(s.remaining_supply(), 0);

		s.whitelist_mint_enabled = true;
		s.total_supply = 4;
		assert!(s.is_sale_open());
		assert!(!s.is_sold_out());
		assert_eq!(s.remaining_supply(), 6);

		// (0 / 0) means the contract has not been read yet, not sold out.
		s.max_supply = 0;
		assert!(!s.is_sold_out());
	}

	#[test]
	fn test_best_message_prefers_nested() {
		let flat = RpcErrorObject {
			code: -32000,
			message: "execution reverted".into(),
			data: None,
		};
		assert_eq!(flat.best_message(), "execution reverted");

		let nested = RpcErrorObject {
			code: -32603,
			message: "Internal JSON-RPC error.".into(),
			data: Some(json!({ "message": "execution reverted: Insufficient funds!" })),
		};
		assert_eq!(nested.best_message(), "execution reverted: Insufficient funds!");

		let rejected = RpcError::Rpc(RpcErrorObject {
			code: RpcErrorObject::USER_REJECTED,
			message: "User denied transaction signature.".into(),
			data: None,
		});
		assert!(rejected.is_user_rejection());
		assert_eq!(rejected.user_message(), "User denied transaction signature.");
	}
}
