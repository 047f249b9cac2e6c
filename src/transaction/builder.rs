//! Mint and claim transaction builder
//!
//! Turns a user request into a [`PreparedTransaction`] (contract call plus payment) after checking
//! it against the current contract snapshot. Anything rejected here never reaches the chain.

use crate::chain::{ContractCall, ContractSnapshot};
use crate::whitelist::MerkleProof;

use alloy_primitives::U256;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransactionError {
	#[error("Mint quantity must be greater than zero")]
	ZeroQuantity,

	#[error("Cannot mint {requested} tokens in one transaction, the limit is {max}")]
	ExceedsMaxPerTransaction { requested: u64, max: u64 },

	#[error("Cannot mint {requested} tokens, only {remaining} left")]
	ExceedsSupply { requested: u64, remaining: u64 },

	#[error("The {0} sale is not open")]
	SaleClosed(SaleKind),

	#[error("A Merkle proof is required for the {0} sale")]
	MissingProof(SaleKind),

	#[error("Total price overflows")]
	ValueOverflow,

	#[error("The claim royalties process is paused")]
	ClaimClosed,

	#[error("Claim amount must be greater than zero")]
	ZeroClaim,

	#[error("Claim amount {requested} exceeds the claimable balance {available}")]
	ClaimExceedsBalance { requested: U256, available: U256 },
}

/// Which sale a mint goes through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaleKind {
	Public,
	Whitelist,
	Premintlist,
}

impl std::fmt::Display for SaleKind {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(match self {
			SaleKind::Public => "public",
			SaleKind::Whitelist => "whitelist",
			SaleKind::Premintlist => "premint list",
		})
	}
}

impl SaleKind {
	/// Sale a generic "mint" request should use: the public sale while it runs, otherwise the
	/// whitelist sale if that is enabled.
	pub fn route(snapshot: &ContractSnapshot) -> Option<Self> {
		if !snapshot.paused {
			Some(SaleKind::Public)
		} else if snapshot.whitelist_mint_enabled {
			Some(SaleKind::Whitelist)
		} else {
			None
		}
	}

	fn is_open(&self, snapshot: &ContractSnapshot) -> bool {
		match self {
			SaleKind::Public => !snapshot.paused,
			SaleKind::Whitelist => snapshot.whitelist_mint_enabled,
			SaleKind::Premintlist => snapshot.premintlist_mint_enabled,
		}
	}
}

/// A validated call ready for submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedTransaction {
	pub call: ContractCall,
	/// Payment attached to the call, in wei.
	pub value: U256,
}

/// Builder for mint transactions against one snapshot
pub struct MintTransactionBuilder<'a> {
	snapshot: &'a ContractSnapshot,
	quantity: u64,
	token_id: u64,
	proof: Option<MerkleProof>,
}

impl<'a> MintTransactionBuilder<'a> {
	pub fn new(snapshot: &'a ContractSnapshot) -> Self {
		Self {
			snapshot,
			quantity: 0,
			token_id: 0,
			proof: None,
		}
	}

	pub fn with_quantity(mut self, quantity: u64) -> Self {
		self.quantity = quantity;
		self
	}

	/// Token id passed to `whitelistMint`; ignored by the other sales.
	pub fn with_token_id(mut self, token_id: u64) -> Self {
		self.token_id = token_id;
		self
	}

	pub fn with_proof(mut self, proof: MerkleProof) -> Self {
		self.proof = Some(proof);
		self
	}

	/// Validate the request for `kind` and produce the call.
	pub fn build(self, kind: SaleKind) -> Result<PreparedTransaction, TransactionError> {
		let snapshot = self.snapshot;

		if !kind.is_open(snapshot) {
			return Err(TransactionError::SaleClosed(kind));
		}
		if self.quantity == 0 {
			return Err(TransactionError::ZeroQuantity);
		}
		if self.quantity > snapshot.max_mint_per_transaction {
			return Err(TransactionError::ExceedsMaxPerTransaction {
				requested: self.quantity,
				max: snapshot.max_mint_per_transaction,
			});
		}
		if self.quantity > snapshot.remaining_supply() {
			return Err(TransactionError::ExceedsSupply {
				requested: self.quantity,
				remaining: snapshot.remaining_supply(),
			});
		}

		let value = snapshot
			.price_per_token
			.checked_mul(U256::from(self.quantity))
			.ok_or(TransactionError::ValueOverflow)?;

		let quantity = self.quantity;
		let call = match kind {
			SaleKind::Public => ContractCall::Mint { quantity },
			SaleKind::Whitelist => ContractCall::WhitelistMint {
				quantity,
				token_id: self.token_id,
				proof: self.proof.ok_or(TransactionError::MissingProof(kind))?,
			},
			SaleKind::Premintlist => ContractCall::PremintlistMint {
				quantity,
				proof: self.proof.ok_or(TransactionError::MissingProof(kind))?,
			},
		};

		debug!("Prepared {} of {} for {} wei", call.name(), quantity, value);
		Ok(PreparedTransaction { call, value })
	}
}

/// Validate a royalty claim. Claims carry no payment.
pub fn build_claim(
	snapshot: &ContractSnapshot,
	amount: U256,
) -> Result<PreparedTransaction, TransactionError> {
	if !snapshot.royalties_claim_open {
		return Err(TransactionError::ClaimClosed);
	}
	if amount.is_zero() {
		return Err(TransactionError::ZeroClaim);
	}
	if amount > snapshot.claimable_royalty_balance {
		return Err(TransactionError::ClaimExceedsBalance {
			requested: amount,
			available: snapshot.claimable_royalty_balance,
		});
	}

	Ok(PreparedTransaction {
		call: ContractCall::ClaimUtility { amount },
		value: U256::ZERO,
	})
}
