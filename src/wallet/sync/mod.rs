//! Wallet Synchronization Module
//!
//! Keeps a wallet session and the sale contract's state in step with what the wallet reports, and
//! drives mint and claim transactions against that state.
//!
//! - `controller`: the `SyncController` task and the `ControllerHandle` used to drive it.
//! - `events`: the command queue and the epoch counter that marks superseded passes.
//! - `session`: session state machine values.
//! - `epoch`: pass bookkeeping, including results discarded as stale.
//! - `view`: the read model published to the presentation layer.

/// Controller task and handle
pub mod controller;
/// Command queue and wallet events
pub mod events;
/// Synchronization pass statistics
pub mod epoch;
/// Session state types
pub mod session;
/// Presentation read model
pub mod view;

#[cfg(test)]
pub(crate) mod test_support;

pub use controller::{ControllerHandle, ManualProof, SyncController, proof_for_manual_address};
pub use epoch::PassStats;
pub use events::{EventSender, MintRequest, MintRoute, WalletEvent};
pub use session::{SessionState, WalletSession};
pub use view::{ControllerView, SaleStatus, TransientError};
