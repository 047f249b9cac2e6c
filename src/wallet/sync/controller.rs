//! Sync controller and its handle.
//!
//! The `SyncController` owns the session state and is the only writer of it. It runs as a single
//! task draining the command queue (see [`events`](super::events)), so synchronization passes,
//! mints and claims never interleave. Each pass goes through the full routine:
//!
//! 1. obtain the wallet accounts (explicit request on connect, silent listing otherwise)
//! 2. look up the network and match it against the configured profiles
//! 3. check that the contract has bytecode at the configured address
//! 4. read a complete contract snapshot
//!
//! and the resulting state is installed in one step, or dropped if a newer session-changing event
//! was queued while the pass was in flight. Observers get an immutable [`ControllerView`] through a
//! `watch` channel; user actions go through the cloneable [`ControllerHandle`].

use crate::chain::{ChainStateReader, ContractSnapshot, RpcError, SaleContract, WalletProvider};
use crate::config::{CollectionConfig, ControllerConfig};
use crate::transaction::{MintTransactionBuilder, PreparedTransaction, SaleKind, build_claim};
use crate::wallet::SyncError;
use crate::wallet::sync::epoch::SyncPassTracker;
use crate::wallet::sync::events::{
    self, ControllerCommand, EventReceiver, EventSender, MintRequest, MintRoute, TxReply,
    ViewReply, WalletEvent,
};
use crate::wallet::sync::session::{SessionState, WalletSession};
use crate::wallet::sync::view::{ControllerView, TransientError};
use crate::whitelist::{MerkleProof, MerkleWhitelist, address};

use alloy_primitives::{Address, B256, U256};
use std::sync::Arc;
use tokio::sync::{oneshot, watch};
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone, Copy)]
enum AccountAccess {
    /// `eth_requestAccounts`, may prompt the user
    Request,
    /// Already authorised accounts only
    List,
}

/// Result of a pass that found an account and got all the way through.
struct PassResult {
    session: WalletSession,
    snapshot: ContractSnapshot,
}

pub struct SyncController {
    provider: Option<Arc<dyn WalletProvider>>,
    contract: Arc<dyn SaleContract>,
    whitelist: Arc<MerkleWhitelist>,
    collection: Arc<CollectionConfig>,
    config: ControllerConfig,
    reader: ChainStateReader,
    tracker: SyncPassTracker,
    state: SessionState,
    /// Account reported by the wallet during the current pass.
    observed_account: Option<Address>,
    error: Option<TransientError>,
    next_error_id: u64,
    events: EventReceiver,
    view_tx: watch::Sender<Arc<ControllerView>>,
}

impl SyncController {
    /// Create a controller and the handle used to drive it.
    ///
    /// `provider` is `None` when no wallet was detected; every pass then ends in
    /// [`SyncError::ProviderUnavailable`].
    pub fn new(
        provider: Option<Arc<dyn WalletProvider>>,
        contract: Arc<dyn SaleContract>,
        whitelist: Arc<MerkleWhitelist>,
        collection: CollectionConfig,
        config: ControllerConfig,
    ) -> (Self, ControllerHandle) {
        let collection = Arc::new(collection);
        let (sender, events) = events::channel();
        let view = ControllerView::new(collection.clone(), contract.address());
        let (view_tx, view_rx) = watch::channel(Arc::new(view));

        let handle = ControllerHandle {
            events: sender,
            view: view_rx,
            whitelist: whitelist.clone(),
        };

        let controller = Self {
            provider,
            contract,
            whitelist,
            collection,
            config,
            reader: ChainStateReader::new(),
            tracker: SyncPassTracker::new(),
            state: SessionState::Disconnected,
            observed_account: None,
            error: None,
            next_error_id: 0,
            events,
            view_tx,
        };

        (controller, handle)
    }

    /// Process commands until shutdown or until every handle is dropped.
    pub async fn run(mut self) {
        info!(
            "Sync controller started for contract {}",
            address::canonical(&self.contract.address())
        );

        while let Some(command) = self.events.rx.recv().await {
            if let ControllerCommand::Shutdown = command {
                break;
            }
            self.handle_command(command).await;
        }

        info!(
            "Sync controller stopped ({})",
            self.tracker.get_stats().summary()
        );
    }

    async fn handle_command(&mut self, command: ControllerCommand) {
        match command {
            ControllerCommand::Connect { reply } => {
                self.connect().await;
                self.reply_view(reply);
            }
            ControllerCommand::Init { reply } => {
                self.init_wallet().await;
                self.reply_view(reply);
            }
            ControllerCommand::Resync { reply } => {
                self.resync().await;
                self.reply_view(reply);
            }
            ControllerCommand::Wallet(WalletEvent::AccountsChanged(accounts)) => {
                self.on_accounts_changed(accounts).await;
            }
            ControllerCommand::Wallet(WalletEvent::ChainChanged(chain_id)) => {
                self.on_chain_changed(chain_id).await;
            }
            ControllerCommand::Mint { request, reply } => {
                let result = self.mint(request).await;
                self.reply_tx(reply, result);
            }
            ControllerCommand::Claim { amount, reply } => {
                let result = self.claim_royalties(amount).await;
                self.reply_tx(reply, result);
            }
            ControllerCommand::DismissError => self.dismiss_error(),
            ControllerCommand::ClearError { id } => self.clear_error(id),
            ControllerCommand::Shutdown => {}
        }
    }

    async fn connect(&mut self) {
        info!("Connecting wallet");
        if !self.state.is_ready() {
            self.set_state(SessionState::Connecting);
        }
        self.synchronize(AccountAccess::Request).await;
    }

    async fn init_wallet(&mut self) {
        self.synchronize(AccountAccess::List).await;
    }

    async fn resync(&mut self) {
        self.synchronize(AccountAccess::List).await;
    }

    async fn on_accounts_changed(&mut self, accounts: Vec<Address>) {
        if accounts.is_empty() {
            info!("Wallet disconnected");
            self.error = None;
            self.set_state(SessionState::Disconnected);
            return;
        }

        info!(
            "Accounts changed, active account {}",
            address::canonical(&accounts[0])
        );
        self.synchronize(AccountAccess::List).await;
    }

    /// A chain switch invalidates the contract binding: drop the session and start over.
    async fn on_chain_changed(&mut self, chain_id: u64) {
        info!("Chain changed to {}, reloading session", chain_id);
        self.error = None;
        self.set_state(SessionState::Disconnected);
        self.synchronize(AccountAccess::List).await;
    }

    /// Run one pass and install its result unless it has been superseded.
    async fn synchronize(&mut self, access: AccountAccess) {
        let epoch = self.events.epoch.current();
        self.tracker.begin_pass(epoch);
        self.observed_account = None;

        let outcome = self.run_pass(access, epoch).await;

        let current = self.events.epoch.current();
        if current != epoch {
            self.tracker.record_stale(epoch, current);
            return;
        }

        match outcome {
            Ok(None) => {
                info!("No authorised account");
                self.set_state(SessionState::Disconnected);
            }
            Ok(Some(PassResult { session, snapshot })) => {
                self.tracker.record_installed(epoch);
                info!(
                    "Session ready on {} (chain {}): {}/{} minted",
                    session.network.name,
                    session.network.chain_id,
                    snapshot.total_supply,
                    snapshot.max_supply
                );
                self.set_state(SessionState::Ready {
                    session: Arc::new(session),
                    snapshot: Arc::new(snapshot),
                });
            }
            Err(e) => {
                self.tracker.record_failure();
                self.fail(e);
            }
        }
    }

    async fn run_pass(
        &mut self,
        access: AccountAccess,
        epoch: u64,
    ) -> Result<Option<PassResult>, SyncError> {
        let provider = self
            .provider
            .clone()
            .ok_or(SyncError::ProviderUnavailable)?;

        let accounts = match access {
            AccountAccess::Request => provider.request_accounts().await,
            AccountAccess::List => provider.list_accounts().await,
        }
        .map_err(|e| wallet_error(&e))?;

        let Some(address) = accounts.first().copied() else {
            return Ok(None);
        };
        self.observed_account = Some(address);

        // An existing snapshot stays visible until the new one is complete.
        if !self.state.is_ready() && self.events.epoch.current() == epoch {
            self.set_state(SessionState::Connected { address });
        }

        let network = provider
            .get_network()
            .await
            .map_err(|e| SyncError::read(&e))?;
        let profile = self
            .collection
            .network_profile(network.chain_id)
            .cloned()
            .ok_or(SyncError::UnsupportedNetwork {
                chain_id: network.chain_id,
            })?;

        let contract_address = self.contract.address();
        let code = provider
            .get_code(contract_address)
            .await
            .map_err(|e| SyncError::read(&e))?;
        if code.is_empty() {
            return Err(SyncError::ContractNotFound {
                address: contract_address,
            });
        }

        let snapshot = self
            .reader
            .refresh(self.contract.as_ref(), Some(address))
            .await
            .map_err(|e| SyncError::read(&e))?;

        Ok(Some(PassResult {
            session: WalletSession {
                address,
                network,
                profile,
            },
            snapshot,
        }))
    }

    /// Route a failed pass: a ready session keeps its snapshot unless the failure is fatal to it
    /// or the wallet has moved to another account.
    fn fail(&mut self, err: SyncError) {
        error!("Synchronization failed: {}", err);
        let switched = self
            .observed_account
            .filter(|observed| self.state.address().is_some_and(|bound| bound != *observed));

        if let Some(address) = switched {
            warn!(
                "Dropping session for {}, wallet now reports {}",
                self.state.address().map(|a| address::canonical(&a)).unwrap_or_default(),
                address::canonical(&address)
            );
            self.error = None;
            self.set_state(SessionState::Connected { address }.into_error(err));
        } else if self.state.is_ready() && !err.is_session_fatal() {
            self.show_error(err);
        } else {
            let state = std::mem::take(&mut self.state);
            self.set_state(state.into_error(err));
        }
    }

    async fn mint(&mut self, request: MintRequest) -> Result<B256, SyncError> {
        let result = self.try_mint(request).await;
        if let Err(e) = &result {
            self.show_error(e.clone());
        }
        result
    }

    async fn try_mint(&mut self, request: MintRequest) -> Result<B256, SyncError> {
        let (session, snapshot) = self.ready_session()?;

        let kind = match request.route {
            MintRoute::Auto => SaleKind::route(&snapshot).ok_or(SyncError::SaleClosed)?,
            MintRoute::Public => SaleKind::Public,
            MintRoute::Whitelist => SaleKind::Whitelist,
            MintRoute::Premintlist => SaleKind::Premintlist,
        };

        let mut builder = MintTransactionBuilder::new(&snapshot)
            .with_quantity(request.quantity)
            .with_token_id(request.token_id.unwrap_or(0));
        if kind != SaleKind::Public {
            builder = builder.with_proof(self.whitelist.proof_for(&session.address)?);
        }
        let prepared = builder.build(kind)?;

        self.submit(session.address, prepared).await
    }

    async fn claim_royalties(&mut self, amount: U256) -> Result<B256, SyncError> {
        let result = match self.ready_session() {
            Ok((session, snapshot)) => match build_claim(&snapshot, amount) {
                Ok(prepared) => self.submit(session.address, prepared).await,
                Err(e) => Err(e.into()),
            },
            Err(e) => Err(e),
        };
        if let Err(e) = &result {
            self.show_error(e.clone());
        }
        result
    }

    async fn submit(
        &mut self,
        from: Address,
        prepared: PreparedTransaction,
    ) -> Result<B256, SyncError> {
        let name = prepared.call.name();
        info!(
            "Submitting {} from {} with value {} wei",
            name,
            address::canonical(&from),
            prepared.value
        );

        let tx_hash = self
            .contract
            .submit(from, prepared.call, prepared.value)
            .await
            .map_err(|e| {
                warn!("{} failed: {}", name, e);
                SyncError::rejected(&e)
            })?;

        info!("{} confirmed in transaction {}", name, tx_hash);
        self.resync().await;
        Ok(tx_hash)
    }

    fn ready_session(&self) -> Result<(Arc<WalletSession>, Arc<ContractSnapshot>), SyncError> {
        match &self.state {
            SessionState::Ready { session, snapshot } => Ok((session.clone(), snapshot.clone())),
            _ => Err(SyncError::NotReady),
        }
    }

    /// Show `err` next to the current state and schedule it to clear itself.
    fn show_error(&mut self, err: SyncError) {
        self.next_error_id += 1;
        let id = self.next_error_id;
        debug!("Showing transient error {}: {}", id, err);

        self.error = Some(TransientError {
            id,
            message: err.user_message(),
            error: err,
        });
        self.publish();

        let ttl = self.config.transient_error_ttl;
        let loopback = self.events.loopback.clone();
        tokio::spawn(async move {
            tokio::time::sleep(ttl).await;
            if let Some(tx) = loopback.upgrade() {
                let _ = tx.send(ControllerCommand::ClearError { id });
            }
        });
    }

    fn clear_error(&mut self, id: u64) {
        if self.error.as_ref().is_some_and(|e| e.id == id) {
            debug!("Clearing transient error {}", id);
            self.error = None;
            self.publish();
        }
    }

    fn dismiss_error(&mut self) {
        match std::mem::take(&mut self.state) {
            SessionState::Error { previous, .. } => self.set_state(*previous),
            other => self.state = other,
        }
    }

    fn set_state(&mut self, state: SessionState) {
        debug!("Session state {} -> {}", self.state.name(), state.name());
        self.state = state;
        self.publish();
    }

    fn publish(&self) {
        let is_user_in_whitelist = self
            .state
            .address()
            .is_some_and(|a| self.whitelist.contains(&a));

        let view = ControllerView {
            state: self.state.clone(),
            error: self.error.clone(),
            is_user_in_whitelist,
            pass_stats: self.tracker.get_stats(),
            collection: self.collection.clone(),
            contract_address: self.contract.address(),
        };
        self.view_tx.send_replace(Arc::new(view));
    }

    fn reply_view(&self, reply: ViewReply) {
        let _ = reply.send(self.view_tx.borrow().clone());
    }

    fn reply_tx(&self, reply: TxReply, result: Result<B256, SyncError>) {
        let _ = reply.send(result);
    }
}

fn wallet_error(err: &RpcError) -> SyncError {
    if err.is_user_rejection() {
        SyncError::rejected(err)
    } else {
        SyncError::read(err)
    }
}

/// Proof for an address typed by the user, ready to copy and submit by hand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManualProof {
    pub address: Address,
    pub proof: MerkleProof,
    /// `[0x…,0x…]`
    pub hex: String,
    pub bytes: Vec<u8>,
}

pub fn proof_for_manual_address(
    whitelist: &MerkleWhitelist,
    raw: &str,
) -> Result<ManualProof, SyncError> {
    let address = address::normalize(raw)?;
    let proof = whitelist.proof_for(&address)?;
    Ok(ManualProof {
        address,
        hex: proof.to_hex_array(),
        bytes: proof.to_bytes(),
        proof,
    })
}

/// Cloneable handle for driving a running [`SyncController`].
#[derive(Clone)]
pub struct ControllerHandle {
    events: EventSender,
    view: watch::Receiver<Arc<ControllerView>>,
    whitelist: Arc<MerkleWhitelist>,
}

impl ControllerHandle {
    /// Ask the wallet for account access and synchronize.
    pub async fn connect(&self) -> Result<Arc<ControllerView>, SyncError> {
        self.request_view(true, |reply| ControllerCommand::Connect { reply })
            .await
    }

    /// Synchronize with already-authorised accounts, without prompting.
    pub async fn init_wallet(&self) -> Result<Arc<ControllerView>, SyncError> {
        self.request_view(true, |reply| ControllerCommand::Init { reply })
            .await
    }

    pub async fn resync(&self) -> Result<Arc<ControllerView>, SyncError> {
        self.request_view(false, |reply| ControllerCommand::Resync { reply })
            .await
    }

    /// Forward a wallet notification. Returns false once the controller has stopped.
    pub fn notify(&self, event: WalletEvent) -> bool {
        self.events.send_wallet_event(event)
    }

    pub fn event_sender(&self) -> EventSender {
        self.events.clone()
    }

    /// Mint through whichever sale is open: public, else whitelist.
    pub async fn mint(&self, quantity: u64, token_id: Option<u64>) -> Result<B256, SyncError> {
        self.request_tx(MintRequest {
            route: MintRoute::Auto,
            quantity,
            token_id,
        })
        .await
    }

    pub async fn public_mint(&self, quantity: u64) -> Result<B256, SyncError> {
        self.request_tx(MintRequest {
            route: MintRoute::Public,
            quantity,
            token_id: None,
        })
        .await
    }

    pub async fn whitelist_mint(
        &self,
        quantity: u64,
        token_id: Option<u64>,
    ) -> Result<B256, SyncError> {
        self.request_tx(MintRequest {
            route: MintRoute::Whitelist,
            quantity,
            token_id,
        })
        .await
    }

    pub async fn premintlist_mint(&self, quantity: u64) -> Result<B256, SyncError> {
        self.request_tx(MintRequest {
            route: MintRoute::Premintlist,
            quantity,
            token_id: None,
        })
        .await
    }

    pub async fn claim_royalties(&self, amount: U256) -> Result<B256, SyncError> {
        let (reply, rx) = oneshot::channel();
        self.events
            .send(ControllerCommand::Claim { amount, reply })?;
        rx.await.map_err(|_| SyncError::ControllerStopped)?
    }

    pub fn dismiss_error(&self) -> Result<(), SyncError> {
        self.events.send(ControllerCommand::DismissError)
    }

    pub fn shutdown(&self) {
        let _ = self.events.send(ControllerCommand::Shutdown);
    }

    /// Latest published view.
    pub fn view(&self) -> Arc<ControllerView> {
        self.view.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<ControllerView>> {
        self.view.clone()
    }

    pub fn proof_for_manual_address(&self, raw: &str) -> Result<ManualProof, SyncError> {
        proof_for_manual_address(&self.whitelist, raw)
    }

    async fn request_view(
        &self,
        superseding: bool,
        make: impl FnOnce(ViewReply) -> ControllerCommand,
    ) -> Result<Arc<ControllerView>, SyncError> {
        let (reply, rx) = oneshot::channel();
        let command = make(reply);
        if superseding {
            self.events.send_superseding(command)?;
        } else {
            self.events.send(command)?;
        }
        rx.await.map_err(|_| SyncError::ControllerStopped)
    }

    async fn request_tx(&self, request: MintRequest) -> Result<B256, SyncError> {
        let (reply, rx) = oneshot::channel();
        self.events
            .send(ControllerCommand::Mint { request, reply })?;
        rx.await.map_err(|_| SyncError::ControllerStopped)?
    }
}
