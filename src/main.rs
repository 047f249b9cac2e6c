use nft_mint_sync::chain::{JsonRpcClient, RpcSaleClient, WalletProvider};
use nft_mint_sync::config::{CollectionConfig, ControllerConfig, RpcConfig};
use nft_mint_sync::wallet::{ControllerView, SyncController, WalletWatcher};
use nft_mint_sync::whitelist::address;

use std::sync::Arc;
use tracing::{error, info, warn};

const DEFAULT_CONFIG_PATH: &str = "config/collection.json";

#[tokio::main(flavor = "current_thread")]
async fn main() {
	// Initialize tracing subscriber with debug logging for this crate
	tracing_subscriber::fmt()
		.with_env_filter(
			tracing_subscriber::EnvFilter::from_default_env()
				.add_directive("nft_mint_sync=debug".parse().unwrap())
				.add_directive(tracing::Level::INFO.into()),
		)
		.with_target(false)
		.with_thread_ids(false)
		.with_thread_names(false)
		.with_file(false)
		.with_line_number(false)
		.with_timer(tracing_subscriber::fmt::time::time())
		.init();

	if let Err(e) = run().await {
		error!("Mint sync failed: {}", e);
		std::process::exit(1);
	}
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
	info!("Starting mint sync service");

	let config_path =
		std::env::var("MINT_SYNC_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
	let collection = CollectionConfig::from_json_file(&config_path)?;
	info!("Loaded collection {} from {}", collection.contract_name, config_path);

	let mut rpc_config = RpcConfig::default();
	if let Ok(url) = std::env::var("MINT_SYNC_RPC_URL") {
		rpc_config.url = url;
	}

	let contract_address = collection.contract_address()?;
	let whitelist = Arc::new(collection.build_whitelist()?);
	info!(
		"Whitelist has {} entries, root {}",
		whitelist.len(),
		whitelist.root()
	);

	let rpc = JsonRpcClient::new(&rpc_config)?;
	info!("Created JSON-RPC client for {}", rpc_config.url);

	let client = Arc::new(RpcSaleClient::new(
		rpc,
		contract_address,
		rpc_config.clone(),
		collection.premintlist_sale,
	));
	let provider: Arc<dyn WalletProvider> = client.clone();

	let (controller, handle) = SyncController::new(
		Some(provider.clone()),
		client,
		whitelist,
		collection,
		ControllerConfig::default(),
	);
	tokio::spawn(controller.run());

	let watcher = WalletWatcher::new(provider, handle.event_sender(), rpc_config.poll_interval);
	tokio::spawn(watcher.run());

	let mut updates = handle.subscribe();
	let view = handle.init_wallet().await?;
	log_view(&view);
	updates.mark_unchanged();

	while updates.changed().await.is_ok() {
		let view = updates.borrow_and_update().clone();
		log_view(&view);
	}

	handle.shutdown();
	Ok(())
}

fn log_view(view: &ControllerView) {
	if let Some(message) = view.error_message() {
		warn!("{}", message);
	}

	let (Some(session), Some(snapshot)) = (view.state.session(), view.state.snapshot()) else {
		info!("Session {}", view.state.name());
		return;
	};

	info!(
		"Session ready for {} on {}: {}/{} minted, sale {:?}, price {}, whitelisted: {}",
		address::canonical(&session.address),
		session.network.name,
		snapshot.total_supply,
		snapshot.max_supply,
		view.sale_status(),
		view.total_price(1).unwrap_or_default(),
		view.is_user_in_whitelist
	);
	if view.is_not_mainnet() {
		info!("Not on mainnet, using test network {}", session.network.name);
	}
	if let Some(url) = view.contract_url() {
		info!("Contract: {}", url);
	}
	if let Some(url) = view.marketplace_url() {
		info!("Marketplace: {}", url);
	}
}
