use crate::chain::RpcError;
use crate::transaction::TransactionError;
use crate::utils::capitalize_first;
use crate::whitelist::{AddressError, WhitelistError, address};

use alloy_primitives::Address;

/// Errors surfaced at the controller boundary
///
/// `Display` keeps the diagnostic detail; [`SyncError::user_message`] is what the user sees.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SyncError {
	#[error("Invalid address format: {0}")]
	InvalidAddressFormat(String),

	#[error("Address {} is not in the whitelist", address::canonical(.0))]
	NotInWhitelist(Address),

	#[error("Unsupported network with chain id {chain_id}")]
	UnsupportedNetwork { chain_id: u64 },

	#[error("No contract deployed at {}", address::canonical(.address))]
	ContractNotFound { address: Address },

	#[error("Contract read failed: {cause}")]
	ReadError { cause: String },

	#[error("Transaction rejected: {reason}")]
	TransactionRejected { reason: String },

	#[error("Wallet session is not ready")]
	NotReady,

	#[error("Sale is closed")]
	SaleClosed,

	#[error("Invalid quantity: {0}")]
	InvalidQuantity(String),

	#[error("Royalty claims are closed")]
	ClaimClosed,

	#[error("Invalid claim: {0}")]
	InvalidClaim(String),

	#[error("Invalid proof: {0}")]
	InvalidProof(String),

	#[error("No wallet provider detected")]
	ProviderUnavailable,

	#[error("Controller has stopped")]
	ControllerStopped,
}

impl SyncError {
	pub fn read(err: &RpcError) -> Self {
		SyncError::ReadError {
			cause: err.user_message(),
		}
	}

	pub fn rejected(err: &RpcError) -> Self {
		SyncError::TransactionRejected {
			reason: err.user_message(),
		}
	}

	/// Short human-readable text for display.
	pub fn user_message(&self) -> String {
		match self {
			SyncError::InvalidAddressFormat(_) => {
				"The given address is not valid, please double-check.".to_string()
			}
			SyncError::NotInWhitelist(_) => {
				"The given address is not in the whitelist, please double-check.".to_string()
			}
			SyncError::UnsupportedNetwork { .. } => "Unsupported network!".to_string(),
			SyncError::ContractNotFound { .. } => {
				"Could not find the contract, are you connected to the right chain?".to_string()
			}
			SyncError::ReadError { cause } => capitalize_first(cause),
			SyncError::TransactionRejected { reason } => capitalize_first(reason),
			SyncError::NotReady => "Please connect your wallet first.".to_string(),
			SyncError::SaleClosed => "The contract is paused, please come back later.".to_string(),
			SyncError::InvalidQuantity(detail)
			| SyncError::InvalidClaim(detail)
			| SyncError::InvalidProof(detail) => {
				capitalize_first(detail)
			}
			SyncError::ClaimClosed => "The claim royalties process is paused.".to_string(),
			SyncError::ProviderUnavailable => {
				"We were not able to detect a wallet provider.".to_string()
			}
			SyncError::ControllerStopped => "The wallet controller has stopped.".to_string(),
		}
	}

	/// Errors that invalidate the current session until the wallet switches network or the
	/// configuration is fixed. Everything else is shown briefly and then cleared.
	pub fn is_session_fatal(&self) -> bool {
		matches!(
			self,
			SyncError::UnsupportedNetwork { .. }
				| SyncError::ContractNotFound { .. }
				| SyncError::ProviderUnavailable
		)
	}
}

impl From<AddressError> for SyncError {
	fn from(err: AddressError) -> Self {
		match err {
			AddressError::InvalidAddressFormat(raw) => SyncError::InvalidAddressFormat(raw),
		}
	}
}

impl From<WhitelistError> for SyncError {
	fn from(err: WhitelistError) -> Self {
		match err {
			WhitelistError::NotInWhitelist(address) => SyncError::NotInWhitelist(address),
			WhitelistError::InvalidAddress(err) => err.into(),
			WhitelistError::MalformedProof(_) => SyncError::InvalidProof(err.to_string()),
		}
	}
}

impl From<TransactionError> for SyncError {
	fn from(err: TransactionError) -> Self {
		match err {
			TransactionError::SaleClosed(_) => SyncError::SaleClosed,
			TransactionError::ClaimClosed => SyncError::ClaimClosed,
			TransactionError::ZeroClaim | TransactionError::ClaimExceedsBalance { .. } => {
				SyncError::InvalidClaim(err.to_string())
			}
			other => SyncError::InvalidQuantity(other.to_string()),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::chain::RpcErrorObject;
	use crate::transaction::SaleKind;
	use alloy_primitives::U256;

	#[test]
	fn test_user_messages() {
		assert_eq!(
			SyncError::UnsupportedNetwork { chain_id: 137 }.user_message(),
			"Unsupported network!"
		);
		assert_eq!(
			SyncError::ContractNotFound {
				address: Address::ZERO
			}
			.user_message(),
			"Could not find the contract, are you connected to the right chain?"
		);

		let rpc = RpcError::Rpc(RpcErrorObject {
			code: -32603,
			message: "Internal JSON-RPC error.".into(),
			data: Some(serde_json::json!({ "message": "execution reverted: max supply exceeded!" })),
		});
		assert_eq!(
			SyncError::rejected(&rpc).user_message(),
			"Execution reverted: max supply exceeded!"
		);
	}

	#[test]
	fn test_conversions() {
		let addr = Address::repeat_byte(0xa1);
		assert_eq!(
			SyncError::from(WhitelistError::NotInWhitelist(addr)),
			SyncError::NotInWhitelist(addr)
		);
		assert_eq!(
			SyncError::from(TransactionError::SaleClosed(SaleKind::Whitelist)),
			SyncError::SaleClosed
		);
		assert!(matches!(
			SyncError::from(TransactionError::ClaimExceedsBalance {
				requested: U256::from(2u64),
				available: U256::from(1u64),
			}),
			SyncError::InvalidClaim(_)
		));
		assert!(matches!(
			SyncError::from(TransactionError::ZeroQuantity),
			SyncError::InvalidQuantity(_)
		));
	}

	#[test]
	fn test_session_fatal_classification() {
		assert!(SyncError::ProviderUnavailable.is_session_fatal());
		assert!(SyncError::UnsupportedNetwork { chain_id: 5 }.is_session_fatal());
		assert!(!SyncError::NotInWhitelist(Address::ZERO).is_session_fatal());
		assert!(
			!SyncError::ReadError {
				cause: "timeout".into()
			}
			.is_session_fatal()
		);
	}
}
