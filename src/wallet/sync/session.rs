//! Session state machine types.
//!
//! A [`SessionState`] is a value, never mutated in place: each synchronization pass builds a new
//! one and the controller swaps it in whole. `Ready` holds its session and snapshot behind `Arc` so
//! published views can share them with the controller without copying.

use crate::chain::{ContractSnapshot, NetworkInfo};
use crate::config::NetworkProfile;
use crate::wallet::SyncError;

use alloy_primitives::Address;
use std::sync::Arc;

/// The wallet binding established by a successful pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalletSession {
    pub address: Address,
    pub network: NetworkInfo,
    /// Configured profile (symbol, explorer) for `network`.
    pub profile: NetworkProfile,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Disconnected,
    /// Waiting for the wallet to grant account access.
    Connecting,
    /// An account is known but the network and contract have not been checked yet.
    Connected { address: Address },
    Ready {
        session: Arc<WalletSession>,
        snapshot: Arc<ContractSnapshot>,
    },
    Error {
        message: String,
        error: SyncError,
        /// State to return to when the error is dismissed.
        previous: Box<SessionState>,
    },
}

impl SessionState {
    /// Enter the error state from `self`. An existing error is replaced, keeping the state it
    /// interrupted; an interrupted connect attempt returns to `Disconnected`.
    pub fn into_error(self, error: SyncError) -> SessionState {
        let previous = match self {
            SessionState::Error { previous, .. } => previous,
            SessionState::Connecting => Box::new(SessionState::Disconnected),
            other => Box::new(other),
        };
        SessionState::Error {
            message: error.user_message(),
            error,
            previous,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            SessionState::Disconnected => "disconnected",
            SessionState::Connecting => "connecting",
            SessionState::Connected { .. } => "connected",
            SessionState::Ready { .. } => "ready",
            SessionState::Error { .. } => "error",
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, SessionState::Ready { .. })
    }

    pub fn address(&self) -> Option<Address> {
        match self {
            SessionState::Connected { address } => Some(*address),
            SessionState::Ready { session, .. } => Some(session.address),
            _ => None,
        }
    }

    pub fn session(&self) -> Option<&Arc<WalletSession>> {
        match self {
            SessionState::Ready { session, .. } => Some(session),
            _ => None,
        }
    }

    pub fn snapshot(&self) -> Option<&Arc<ContractSnapshot>> {
        match self {
            SessionState::Ready { snapshot, .. } => Some(snapshot),
            _ => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            SessionState::Error { message, .. } => Some(message),
            _ => None,
        }
    }
}
