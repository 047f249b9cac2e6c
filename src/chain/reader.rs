use crate::chain::provider::SaleContract;
use crate::chain::types::{ContractSnapshot, RpcError};
use crate::whitelist::address;

use alloy_primitives::{Address, U256};
use tracing::{debug, error};

/// Reads the full sale state from the contract in one pass.
///
/// All queries run concurrently on the calling task; if any one fails the whole refresh fails and
/// no snapshot is produced.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChainStateReader;

impl ChainStateReader {
	pub fn new() -> Self {
		Self
	}

	pub async fn refresh(
		&self,
		contract: &dyn SaleContract,
		account: Option<Address>,
	) -> Result<ContractSnapshot, RpcError> {
		debug!(
			"Refreshing contract state for {}",
			account
				.as_ref()
				.map(address::canonical)
				.unwrap_or_else(|| "no account".to_string())
		);

		let balance = async {
			match account {
				Some(account) => contract.balance_to_claim(account).await,
				None => Ok(U256::ZERO),
			}
		};

		let (
			max_supply,
			total_supply,
			max_mint_per_transaction,
			price_per_token,
			paused,
			whitelist_mint_enabled,
			premintlist_mint_enabled,
			royalties_claim_open,
			claimable_royalty_balance,
		) = futures::try_join!(
			contract.max_supply(),
			contract.total_supply(),
			contract.max_mint_amount_per_tx(),
			contract.cost(),
			contract.paused(),
			contract.whitelist_mint_enabled(),
			contract.premintlist_mint_enabled(),
			contract.claim_utility_open(),
			balance,
		)
		.map_err(|e| {
			error!("Contract state refresh failed: {}", e);
			e
		})?;

		Ok(ContractSnapshot {
			total_supply,
			max_supply,
			price_per_token,
			max_mint_per_transaction,
			paused,
			whitelist_mint_enabled,
			premintlist_mint_enabled,
			royalties_claim_open,
			claimable_royalty_balance,
		})
	}
}
