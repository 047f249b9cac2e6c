//! Polling source of wallet notifications.
//!
//! A plain JSON-RPC endpoint cannot push `accountsChanged` / `chainChanged`, so the watcher polls
//! the provider and emits an event only when what it sees differs from the last observation. A
//! chain change is reported alone: the controller reloads the whole session on it, accounts
//! included.

use crate::chain::WalletProvider;
use crate::wallet::sync::events::{EventSender, WalletEvent};

use alloy_primitives::Address;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

pub struct WalletWatcher {
	provider: Arc<dyn WalletProvider>,
	events: EventSender,
	poll_interval: Duration,
	last_accounts: Option<Vec<Address>>,
	last_chain_id: Option<u64>,
}

impl WalletWatcher {
	pub fn new(provider: Arc<dyn WalletProvider>, events: EventSender, poll_interval: Duration) -> Self {
		Self {
			provider,
			events,
			poll_interval,
			last_accounts: None,
			last_chain_id: None,
		}
	}

	/// Record the current accounts and chain without emitting anything.
	pub async fn prime(&mut self) {
		if let Ok(accounts) = self.provider.list_accounts().await {
			self.last_accounts = Some(accounts);
		}
		if let Ok(network) = self.provider.get_network().await {
			self.last_chain_id = Some(network.chain_id);
		}
	}

	/// Poll once and return the event that was sent, if anything changed.
	pub async fn poll_once(&mut self) -> Option<WalletEvent> {
		let chain_id = match self.provider.get_network().await {
			Ok(network) => network.chain_id,
			Err(e) => {
				warn!("Network poll failed: {}", e);
				return None;
			}
		};
		let accounts = match self.provider.list_accounts().await {
			Ok(accounts) => accounts,
			Err(e) => {
				warn!("Account poll failed: {}", e);
				return None;
			}
		};

		let chain_changed = self.last_chain_id.is_some_and(|last| last != chain_id);
		let accounts_changed = self
			.last_accounts
			.as_ref()
			.is_some_and(|last| *last != accounts);

		self.last_chain_id = Some(chain_id);
		self.last_accounts = Some(accounts.clone());

		let event = if chain_changed {
			WalletEvent::ChainChanged(chain_id)
		} else if accounts_changed {
			WalletEvent::AccountsChanged(accounts)
		} else {
			return None;
		};

		debug!("Wallet watcher observed {:?}", event);
		self.events.send_wallet_event(event.clone());
		Some(event)
	}

	/// Poll until the controller goes away.
	pub async fn run(mut self) {
		info!("Watching wallet every {:?}", self.poll_interval);
		self.prime().await;

		let mut ticker = tokio::time::interval(self.poll_interval);
		ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
		ticker.tick().await;

		while !self.events.is_closed() {
			ticker.tick().await;
			self.poll_once().await;
		}
		debug!("Wallet watcher stopped");
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::wallet::sync::events::{self, EventReceiver};
	use crate::wallet::sync::test_support::{MockWallet, member, outsider};

	fn watcher(wallet: &Arc<MockWallet>) -> (WalletWatcher, EventSender, EventReceiver) {
		let (sender, receiver) = events::channel();
		let provider: Arc<dyn WalletProvider> = wallet.clone();
		let watcher = WalletWatcher::new(provider, sender.clone(), Duration::from_secs(2));
		(watcher, sender, receiver)
	}

	#[tokio::test]
	async fn test_fires_once_per_change() {
		let wallet = MockWallet::new(vec![member()], 4);
		let (mut watcher, sender, _receiver) = watcher(&wallet);
		watcher.prime().await;

		assert_eq!(watcher.poll_once().await, None);

		wallet.set_accounts(vec![outsider()]);
		assert_eq!(
			watcher.poll_once().await,
			Some(WalletEvent::AccountsChanged(vec![outsider()]))
		);
		assert_eq!(watcher.poll_once().await, None);
		assert_eq!(sender.current_epoch(), 1);
	}

	#[tokio::test]
	async fn test_chain_change_wins_over_accounts() {
		let wallet = MockWallet::new(vec![member()], 4);
		let (mut watcher, sender, _receiver) = watcher(&wallet);
		watcher.prime().await;

		wallet.set_chain(1);
		wallet.set_accounts(vec![]);
		assert_eq!(watcher.poll_once().await, Some(WalletEvent::ChainChanged(1)));
		assert_eq!(watcher.poll_once().await, None);
		assert_eq!(sender.current_epoch(), 1);
	}
}
