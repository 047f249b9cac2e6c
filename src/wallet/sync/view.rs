//! Read-only view of the controller for the presentation layer.

use crate::config::CollectionConfig;
use crate::utils::{NATIVE_TOKEN_DECIMALS, format_token_amount};
use crate::wallet::SyncError;
use crate::wallet::sync::epoch::PassStats;
use crate::wallet::sync::session::SessionState;

use alloy_primitives::{Address, U256};
use std::sync::Arc;

/// A short-lived error shown next to the current state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransientError {
    pub id: u64,
    pub error: SyncError,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaleStatus {
    /// Public sale running.
    Open,
    /// Contract paused but whitelisted addresses may mint.
    WhitelistOnly,
    Closed,
}

/// Everything the presentation layer can see, published as a whole after every change.
#[derive(Debug, Clone)]
pub struct ControllerView {
    pub state: SessionState,
    pub error: Option<TransientError>,
    /// Whether the session address is in the whitelist. Advisory only, the contract decides.
    pub is_user_in_whitelist: bool,
    pub pass_stats: PassStats,
    pub collection: Arc<CollectionConfig>,
    pub contract_address: Address,
}

impl ControllerView {
    pub fn new(collection: Arc<CollectionConfig>, contract_address: Address) -> Self {
        Self {
            state: SessionState::Disconnected,
            error: None,
            is_user_in_whitelist: false,
            pass_stats: PassStats::default(),
            collection,
            contract_address,
        }
    }

    pub fn is_wallet_connected(&self) -> bool {
        self.state.address().is_some()
    }

    /// Message to show: the transient error first, then the error state's message.
    pub fn error_message(&self) -> Option<&str> {
        self.error
            .as_ref()
            .map(|e| e.message.as_str())
            .or_else(|| self.state.error_message())
    }

    pub fn sale_status(&self) -> Option<SaleStatus> {
        let snapshot = self.state.snapshot()?;
        Some(if !snapshot.paused {
            SaleStatus::Open
        } else if snapshot.whitelist_mint_enabled {
            SaleStatus::WhitelistOnly
        } else {
            SaleStatus::Closed
        })
    }

    pub fn is_sold_out(&self) -> bool {
        self.state.snapshot().is_some_and(|s| s.is_sold_out())
    }

    pub fn is_not_mainnet(&self) -> bool {
        self.state
            .session()
            .is_some_and(|s| !self.collection.is_mainnet(s.network.chain_id))
    }

    pub fn network_name(&self) -> Option<&str> {
        self.state.session().map(|s| s.network.name.as_str())
    }

    /// Clamp a requested mint quantity into `1..=maxMintAmountPerTx`.
    pub fn clamp_mint_amount(&self, requested: u64) -> u64 {
        let max = self
            .state
            .snapshot()
            .map(|s| s.max_mint_per_transaction)
            .unwrap_or(1)
            .max(1);
        requested.clamp(1, max)
    }

    /// Price of `quantity` tokens with the network symbol, e.g. `"0.03 ETH"`.
    pub fn total_price(&self, quantity: u64) -> Option<String> {
        let session = self.state.session()?;
        let snapshot = self.state.snapshot()?;
        let total = snapshot
            .price_per_token
            .checked_mul(U256::from(quantity))?;
        Some(format!(
            "{} {}",
            format_token_amount(total, NATIVE_TOKEN_DECIMALS),
            session.profile.symbol
        ))
    }

    pub fn claimable_royalties(&self) -> Option<String> {
        let session = self.state.session()?;
        let snapshot = self.state.snapshot()?;
        Some(format!(
            "{} {}",
            format_token_amount(snapshot.claimable_royalty_balance, NATIVE_TOKEN_DECIMALS),
            session.profile.symbol
        ))
    }

    pub fn contract_url(&self) -> Option<String> {
        self.state.session().map(|s| {
            s.profile
                .block_explorer
                .generate_contract_url(&self.contract_address)
        })
    }

    pub fn marketplace_url(&self) -> Option<String> {
        self.state.session().map(|s| {
            self.collection.marketplace_config.generate_collection_url(
                &self.collection.marketplace_identifier,
                self.collection.is_mainnet(s.network.chain_id),
            )
        })
    }
}
