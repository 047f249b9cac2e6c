//! Event queue between the outside world and the sync controller.
//!
//! Wallet notifications and user actions are turned into [`ControllerCommand`]s and pushed onto a
//! single unbounded queue that the controller drains one command at a time. Every event that
//! changes which session is current (connect, account change, chain change) bumps a shared epoch
//! counter at the moment it is *sent*, before the controller gets to it. A synchronization pass
//! remembers the epoch it started under and discards its result if the counter has moved on by the
//! time it finishes.

use crate::wallet::SyncError;
use crate::wallet::sync::view::ControllerView;

use alloy_primitives::{Address, B256, U256};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::{mpsc, oneshot};

/// Notifications from the wallet provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalletEvent {
    /// The set of authorised accounts changed; an empty list means the wallet disconnected.
    AccountsChanged(Vec<Address>),
    /// The wallet switched to another chain.
    ChainChanged(u64),
}

/// Which mint entry point a request goes through
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MintRoute {
    /// Pick the sale from the current snapshot.
    Auto,
    Public,
    Whitelist,
    Premintlist,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MintRequest {
    pub route: MintRoute,
    pub quantity: u64,
    /// Token id for `whitelistMint`, 0 when not given.
    pub token_id: Option<u64>,
}

pub(crate) type ViewReply = oneshot::Sender<Arc<ControllerView>>;
pub(crate) type TxReply = oneshot::Sender<Result<B256, SyncError>>;

/// Commands consumed by the controller loop
pub(crate) enum ControllerCommand {
    /// Explicit connect request: asks the wallet for account access.
    Connect { reply: ViewReply },
    /// Start-up synchronization with already-authorised accounts.
    Init { reply: ViewReply },
    /// Re-run the synchronization pass for the current session.
    Resync { reply: ViewReply },
    Wallet(WalletEvent),
    Mint { request: MintRequest, reply: TxReply },
    Claim { amount: U256, reply: TxReply },
    /// Leave the error state and return to the state it interrupted.
    DismissError,
    /// Clear the transient error with this id, if it is still the one shown.
    ClearError { id: u64 },
    Shutdown,
}

/// Shared counter identifying the latest session-changing event.
#[derive(Debug, Clone, Default)]
pub struct Epoch(Arc<AtomicU64>);

impl Epoch {
    pub fn current(&self) -> u64 {
        self.0.load(Ordering::SeqCst)
    }

    fn advance(&self) -> u64 {
        self.0.fetch_add(1, Ordering::SeqCst) + 1
    }
}

/// Sending half of the controller queue.
///
/// Cheap to clone; the controller stops once every sender is gone.
#[derive(Clone)]
pub struct EventSender {
    tx: mpsc::UnboundedSender<ControllerCommand>,
    epoch: Epoch,
}

impl EventSender {
    /// Push a wallet notification, superseding any pass still in flight.
    ///
    /// Returns false when the controller is no longer running.
    pub fn send_wallet_event(&self, event: WalletEvent) -> bool {
        let epoch = self.epoch.advance();
        tracing::debug!("Wallet event {:?} queued at epoch {}", event, epoch);
        self.tx.send(ControllerCommand::Wallet(event)).is_ok()
    }

    pub fn current_epoch(&self) -> u64 {
        self.epoch.current()
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    /// Queue a command that starts a new session epoch.
    pub(crate) fn send_superseding(&self, command: ControllerCommand) -> Result<(), SyncError> {
        self.epoch.advance();
        self.send(command)
    }

    pub(crate) fn send(&self, command: ControllerCommand) -> Result<(), SyncError> {
        self.tx
            .send(command)
            .map_err(|_| SyncError::ControllerStopped)
    }
}

/// Receiving half, owned by the controller.
pub(crate) struct EventReceiver {
    pub(crate) rx: mpsc::UnboundedReceiver<ControllerCommand>,
    /// Used for self-scheduled commands without keeping the queue alive.
    pub(crate) loopback: mpsc::WeakUnboundedSender<ControllerCommand>,
    pub(crate) epoch: Epoch,
}

pub(crate) fn channel() -> (EventSender, EventReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    let epoch = Epoch::default();
    let receiver = EventReceiver {
        rx,
        loopback: tx.downgrade(),
        epoch: epoch.clone(),
    };
    (EventSender { tx, epoch }, receiver)
}
