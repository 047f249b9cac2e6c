//! In-memory wallet and contract doubles for controller tests.

use crate::chain::{
    ContractCall, ContractSnapshot, NetworkInfo, RpcError, RpcErrorObject, SaleContract,
    WalletProvider,
};
use crate::config::{
    CollectionConfig, MarketplaceConfig, NetworkProfile, WhitelistEntryConfig,
};
use crate::whitelist::{LeafEncoding, address};

use alloy_primitives::{Address, B256, U256};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

pub fn contract_address() -> Address {
    address::normalize("0xc039115a382b74715d479a692b34835501fdbEeC").unwrap()
}

pub fn member() -> Address {
    Address::repeat_byte(0xa1)
}

pub fn outsider() -> Address {
    Address::repeat_byte(0xd4)
}

pub fn collection() -> CollectionConfig {
    let whitelist = [0xa1u8, 0xa2, 0xa3]
        .iter()
        .map(|b| WhitelistEntryConfig::Address(address::canonical(&Address::repeat_byte(*b))))
        .collect();

    CollectionConfig {
        testnet: NetworkProfile::ethereum_testnet(),
        mainnet: NetworkProfile::ethereum_mainnet(),
        contract_name: "UforArtist".to_string(),
        token_name: "U for Artist".to_string(),
        token_symbol: "U4ART".to_string(),
        max_supply: 1000,
        contract_address: "0xc039115a382b74715d479a692b34835501fdbEeC".to_string(),
        marketplace_identifier: "UforART".to_string(),
        marketplace_config: MarketplaceConfig::open_sea(),
        whitelist_addresses: whitelist,
        leaf_encoding: LeafEncoding::Address,
        premintlist_sale: true,
    }
}

/// Public sale open, 0.01 ETH per token, 5 per transaction.
pub fn snapshot() -> ContractSnapshot {
    ContractSnapshot {
        total_supply: 10,
        max_supply: 1000,
        price_per_token: U256::from(10_000_000_000_000_000u64),
        max_mint_per_transaction: 5,
        paused: false,
        whitelist_mint_enabled: false,
        premintlist_mint_enabled: false,
        royalties_claim_open: false,
        claimable_royalty_balance: U256::ZERO,
    }
}

pub struct MockWallet {
    pub accounts: Mutex<Vec<Address>>,
    pub chain_id: Mutex<u64>,
    pub code: Mutex<Vec<u8>>,
    pub fail_network: Mutex<bool>,
    pub calls: AtomicUsize,
}

impl MockWallet {
    pub fn new(accounts: Vec<Address>, chain_id: u64) -> Arc<Self> {
        Arc::new(Self {
            accounts: Mutex::new(accounts),
            chain_id: Mutex::new(chain_id),
            code: Mutex::new(vec![0x60, 0x80, 0x60, 0x40]),
            fail_network: Mutex::new(false),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn set_accounts(&self, accounts: Vec<Address>) {
        *self.accounts.lock().unwrap() = accounts;
    }

    pub fn set_chain(&self, chain_id: u64) {
        *self.chain_id.lock().unwrap() = chain_id;
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl WalletProvider for MockWallet {
    async fn request_accounts(&self) -> Result<Vec<Address>, RpcError> {
        self.list_accounts().await
    }

    async fn list_accounts(&self) -> Result<Vec<Address>, RpcError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.accounts.lock().unwrap().clone())
    }

    async fn get_network(&self) -> Result<NetworkInfo, RpcError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if *self.fail_network.lock().unwrap() {
            return Err(RpcError::Other("network lookup failed".to_string()));
        }
        Ok(NetworkInfo::new(*self.chain_id.lock().unwrap()))
    }

    async fn get_code(&self, _address: Address) -> Result<Vec<u8>, RpcError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.code.lock().unwrap().clone())
    }
}

/// Holds one `totalSupply` read open until released.
#[derive(Default)]
pub struct Gate {
    pub entered: Notify,
    pub release: Notify,
}

pub struct MockContract {
    pub state: Mutex<ContractSnapshot>,
    /// Name of the query that fails, e.g. `"paused"`.
    pub fail_query: Mutex<Option<&'static str>>,
    pub reject_submit: Mutex<Option<RpcErrorObject>>,
    pub gate: Mutex<Option<Arc<Gate>>>,
    pub reads: AtomicUsize,
    pub submits: Mutex<Vec<(Address, ContractCall, U256)>>,
}

impl MockContract {
    pub fn new(state: ContractSnapshot) -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(state),
            fail_query: Mutex::new(None),
            reject_submit: Mutex::new(None),
            gate: Mutex::new(None),
            reads: AtomicUsize::new(0),
            submits: Mutex::new(Vec::new()),
        })
    }

    pub fn update(&self, f: impl FnOnce(&mut ContractSnapshot)) {
        f(&mut *self.state.lock().unwrap());
    }

    pub fn fail(&self, query: Option<&'static str>) {
        *self.fail_query.lock().unwrap() = query;
    }

    pub fn arm_gate(&self) -> Arc<Gate> {
        let gate = Arc::new(Gate::default());
        *self.gate.lock().unwrap() = Some(gate.clone());
        gate
    }

    pub fn submitted(&self) -> Vec<(Address, ContractCall, U256)> {
        self.submits.lock().unwrap().clone()
    }

    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    fn read<T>(&self, query: &'static str, f: impl FnOnce(&ContractSnapshot) -> T) -> Result<T, RpcError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        if *self.fail_query.lock().unwrap() == Some(query) {
            return Err(RpcError::Timeout(format!("{} timed out", query)));
        }
        Ok(f(&*self.state.lock().unwrap()))
    }
}

#[async_trait::async_trait]
impl SaleContract for MockContract {
    fn address(&self) -> Address {
        contract_address()
    }

    async fn max_supply(&self) -> Result<u64, RpcError> {
        self.read("maxSupply", |s| s.max_supply)
    }

    async fn total_supply(&self) -> Result<u64, RpcError> {
        let gate = self.gate.lock().unwrap().take();
        if let Some(gate) = gate {
            gate.entered.notify_one();
            gate.release.notified().await;
        }
        self.read("totalSupply", |s| s.total_supply)
    }

    async fn max_mint_amount_per_tx(&self) -> Result<u64, RpcError> {
        self.read("maxMintAmountPerTx", |s| s.max_mint_per_transaction)
    }

    async fn cost(&self) -> Result<U256, RpcError> {
        self.read("cost", |s| s.price_per_token)
    }

    async fn paused(&self) -> Result<bool, RpcError> {
        self.read("paused", |s| s.paused)
    }

    async fn whitelist_mint_enabled(&self) -> Result<bool, RpcError> {
        self.read("whitelistMintEnabled", |s| s.whitelist_mint_enabled)
    }

    async fn premintlist_mint_enabled(&self) -> Result<bool, RpcError> {
        self.read("premintlistMintEnabled", |s| s.premintlist_mint_enabled)
    }

    async fn claim_utility_open(&self) -> Result<bool, RpcError> {
        self.read("claimUtilityOpen", |s| s.royalties_claim_open)
    }

    async fn balance_to_claim(&self, _address: Address) -> Result<U256, RpcError> {
        self.read("getBalanceToClaimForAddress", |s| s.claimable_royalty_balance)
    }

    async fn submit(
        &self,
        from: Address,
        call: ContractCall,
        value: U256,
    ) -> Result<B256, RpcError> {
        let rejection = self.reject_submit.lock().unwrap().clone();
        if let Some(obj) = rejection {
            return Err(RpcError::Rpc(obj));
        }

        {
            let mut state = self.state.lock().unwrap();
            match &call {
                ContractCall::Mint { quantity }
                | ContractCall::WhitelistMint { quantity, .. }
                | ContractCall::PremintlistMint { quantity, .. } => state.total_supply += quantity,
                ContractCall::ClaimUtility { amount } => {
                    state.claimable_royalty_balance =
                        state.claimable_royalty_balance.saturating_sub(*amount);
                }
            }
        }

        let mut submits = self.submits.lock().unwrap();
        submits.push((from, call, value));
        Ok(B256::with_last_byte(submits.len() as u8))
    }
}
