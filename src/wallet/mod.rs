pub mod sync;
pub mod types;
pub mod watcher;

pub use sync::{ControllerHandle, ControllerView, SessionState, SyncController, WalletEvent};
pub use types::*;
pub use watcher::WalletWatcher;
