//! Seams between the controller and the outside world.
//!
//! `WalletProvider` stands in for the injected wallet (account access, network lookup, code
//! lookup); `SaleContract` for the deployed sale contract bound to one address. The JSON-RPC client
//! implements both, tests substitute in-memory fakes.

use crate::chain::types::{ContractCall, NetworkInfo, RpcError};

use alloy_primitives::{Address, B256, U256};

#[async_trait::async_trait]
pub trait WalletProvider: Send + Sync {
	/// Ask the wallet for account access (may prompt the user).
	async fn request_accounts(&self) -> Result<Vec<Address>, RpcError>;

	/// Accounts already authorised for this origin, without prompting.
	async fn list_accounts(&self) -> Result<Vec<Address>, RpcError>;

	async fn get_network(&self) -> Result<NetworkInfo, RpcError>;

	/// Deployed bytecode at `address`; empty when nothing is deployed there.
	async fn get_code(&self, address: Address) -> Result<Vec<u8>, RpcError>;
}

#[async_trait::async_trait]
pub trait SaleContract: Send + Sync {
	fn address(&self) -> Address;

	async fn max_supply(&self) -> Result<u64, RpcError>;
	async fn total_supply(&self) -> Result<u64, RpcError>;
	async fn max_mint_amount_per_tx(&self) -> Result<u64, RpcError>;
	async fn cost(&self) -> Result<U256, RpcError>;
	async fn paused(&self) -> Result<bool, RpcError>;
	async fn whitelist_mint_enabled(&self) -> Result<bool, RpcError>;
	async fn premintlist_mint_enabled(&self) -> Result<bool, RpcError>;
	async fn claim_utility_open(&self) -> Result<bool, RpcError>;
	async fn balance_to_claim(&self, address: Address) -> Result<U256, RpcError>;

	/// Submit a state-changing call from `from` paying `value` wei and wait until it is mined.
	async fn submit(&self, from: Address, call: ContractCall, value: U256)
	-> Result<B256, RpcError>;
}
