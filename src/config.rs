//! Collection configuration and runtime tunables.
//!
//! `CollectionConfig` is the sale's static description (networks, contract, marketplace,
//! whitelist) and is normally read from a JSON file. `RpcConfig` and `ControllerConfig` carry the
//! timing knobs and default to values that work against a public node.

use crate::whitelist::{
	AddressError, LeafEncoding, MerkleWhitelist, WhitelistEntry, WhitelistError, address,
};

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
	#[error("IO error: {0}")]
	IoError(#[from] std::io::Error),

	#[error("JSON parse error: {0}")]
	JsonError(#[from] serde_json::Error),

	#[error("invalid contract address: {0}")]
	ContractAddress(#[from] AddressError),

	#[error("invalid whitelist: {0}")]
	Whitelist(#[from] WhitelistError),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockExplorer {
	pub name: String,
	/// Base URL, e.g. `https://etherscan.io`.
	pub url: String,
}

impl BlockExplorer {
	pub fn generate_contract_url(&self, contract: &Address) -> String {
		format!(
			"{}/address/{}",
			self.url.trim_end_matches('/'),
			address::canonical(contract)
		)
	}
}

/// One of the two networks the sale is deployed on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkProfile {
	pub chain_id: u64,
	/// Native currency symbol used when displaying prices.
	pub symbol: String,
	pub block_explorer: BlockExplorer,
}

impl NetworkProfile {
	pub fn ethereum_mainnet() -> Self {
		Self {
			chain_id: 1,
			symbol: "ETH".to_string(),
			block_explorer: BlockExplorer {
				name: "Etherscan".to_string(),
				url: "https://etherscan.io".to_string(),
			},
		}
	}

	pub fn ethereum_testnet() -> Self {
		Self {
			chain_id: 4,
			symbol: "ETH".to_string(),
			block_explorer: BlockExplorer {
				name: "Etherscan (Rinkeby)".to_string(),
				url: "https://rinkeby.etherscan.io".to_string(),
			},
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketplaceConfig {
	pub name: String,
	pub mainnet_url: String,
	pub testnet_url: String,
}

impl MarketplaceConfig {
	pub fn open_sea() -> Self {
		Self {
			name: "OpenSea".to_string(),
			mainnet_url: "https://opensea.io/collection".to_string(),
			testnet_url: "https://testnets.opensea.io/collection".to_string(),
		}
	}

	pub fn generate_collection_url(&self, identifier: &str, is_mainnet: bool) -> String {
		let base = if is_mainnet {
			&self.mainnet_url
		} else {
			&self.testnet_url
		};
		format!("{}/{}", base.trim_end_matches('/'), identifier)
	}
}

/// Whitelist entry as written in the configuration: a bare address or an address with a token id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WhitelistEntryConfig {
	Address(String),
	WithTokenId {
		address: String,
		#[serde(rename = "tokenId")]
		token_id: u64,
	},
}

impl WhitelistEntryConfig {
	pub fn to_entry(&self) -> Result<WhitelistEntry, AddressError> {
		match self {
			WhitelistEntryConfig::Address(raw) => WhitelistEntry::parse(raw, None),
			WhitelistEntryConfig::WithTokenId { address, token_id } => {
				WhitelistEntry::parse(address, Some(*token_id))
			}
		}
	}
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionConfig {
	pub testnet: NetworkProfile,
	pub mainnet: NetworkProfile,
	pub contract_name: String,
	pub token_name: String,
	pub token_symbol: String,
	pub max_supply: u64,
	pub contract_address: String,
	pub marketplace_identifier: String,
	pub marketplace_config: MarketplaceConfig,
	#[serde(default)]
	pub whitelist_addresses: Vec<WhitelistEntryConfig>,
	#[serde(default)]
	pub leaf_encoding: LeafEncoding,
	/// The deployed contract exposes `premintlistMintEnabled()`.
	#[serde(default)]
	pub premintlist_sale: bool,
}

impl CollectionConfig {
	pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
		Ok(serde_json::from_str(raw)?)
	}

	pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
		let raw = std::fs::read_to_string(path)?;
		Self::from_json_str(&raw)
	}

	pub fn contract_address(&self) -> Result<Address, ConfigError> {
		Ok(address::normalize(&self.contract_address)?)
	}

	/// Profile matching `chain_id`, if it is one of the two supported networks.
	pub fn network_profile(&self, chain_id: u64) -> Option<&NetworkProfile> {
		if chain_id == self.mainnet.chain_id {
			Some(&self.mainnet)
		} else if chain_id == self.testnet.chain_id {
			Some(&self.testnet)
		} else {
			None
		}
	}

	pub fn is_mainnet(&self, chain_id: u64) -> bool {
		chain_id == self.mainnet.chain_id
	}

	pub fn build_whitelist(&self) -> Result<MerkleWhitelist, ConfigError> {
		let entries = self
			.whitelist_addresses
			.iter()
			.map(WhitelistEntryConfig::to_entry)
			.collect::<Result<Vec<_>, _>>()
			.map_err(WhitelistError::from)?;
		Ok(MerkleWhitelist::new(entries, self.leaf_encoding))
	}
}

/// JSON-RPC endpoint settings.
#[derive(Debug, Clone)]
pub struct RpcConfig {
	pub url: String,
	pub request_timeout: Duration,
	/// How long idempotent reads keep retrying transport failures.
	pub read_retry_window: Duration,
	/// Interval between account/network polls by the wallet watcher.
	pub poll_interval: Duration,
	pub receipt_poll_interval: Duration,
	pub receipt_timeout: Duration,
}

impl Default for RpcConfig {
	fn default() -> Self {
		Self {
			url: "http://127.0.0.1:8545".to_string(),
			request_timeout: Duration::from_secs(30),
			read_retry_window: Duration::from_secs(10),
			poll_interval: Duration::from_secs(2),
			receipt_poll_interval: Duration::from_secs(2),
			receipt_timeout: Duration::from_secs(300),
		}
	}
}

/// Controller behaviour
#[derive(Debug, Clone)]
pub struct ControllerConfig {
	/// How long a transient error stays visible before it clears itself.
	pub transient_error_ttl: Duration,
}

impl Default for ControllerConfig {
	fn default() -> Self {
		Self {
			transient_error_ttl: Duration::from_secs(5),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	const SAMPLE: &str = r#"{
		"testnet": {
			"chainId": 4,
			"symbol": "ETH",
			"blockExplorer": { "name": "Etherscan (Rinkeby)", "url": "https://rinkeby.etherscan.io/" }
		},
		"mainnet": {
			"chainId": 1,
			"symbol": "ETH",
			"blockExplorer": { "name": "Etherscan", "url": "https://etherscan.io" }
		},
		"contractName": "UforArtist",
		"tokenName": "U for Artist",
		"tokenSymbol": "U4ART",
		"maxSupply": 1000,
		"contractAddress": "0xc039115a382b74715d479a692b34835501fdbEeC",
		"marketplaceIdentifier": "UforART",
		"marketplaceConfig": {
			"name": "OpenSea",
			"mainnetUrl": "https://opensea.io/collection",
			"testnetUrl": "https://testnets.opensea.io/collection"
		},
		"whitelistAddresses": [
			"0x00000000000000000000000000000000000000a1",
			{ "address": "0x00000000000000000000000000000000000000A2", "tokenId": 273 }
		]
	}"#;

	#[test]
	fn test_parse_collection_config() {
		let config = CollectionConfig::from_json_str(SAMPLE).unwrap();
		assert_eq!(config.max_supply, 1000);
		assert_eq!(config.leaf_encoding, LeafEncoding::Address);
		assert!(!config.premintlist_sale);
		assert_eq!(config.whitelist_addresses.len(), 2);

		let whitelist = config.build_whitelist().unwrap();
		assert_eq!(whitelist.len(), 2);
		assert!(whitelist.contains_raw("0x00000000000000000000000000000000000000a2"));
	}

	#[test]
	fn test_network_profiles_and_urls() {
		let config = CollectionConfig::from_json_str(SAMPLE).unwrap();
		assert_eq!(config.network_profile(1).map(|p| p.chain_id), Some(1));
		assert_eq!(config.network_profile(4).map(|p| p.chain_id), Some(4));
		assert!(config.network_profile(137).is_none());
		assert!(config.is_mainnet(1));

		let contract = config.contract_address().unwrap();
		assert_eq!(
			config.testnet.block_explorer.generate_contract_url(&contract),
			"https://rinkeby.etherscan.io/address/0xc039115a382b74715d479a692b34835501fdbeec"
		);
		assert_eq!(
			config
				.marketplace_config
				.generate_collection_url(&config.marketplace_identifier, false),
			"https://testnets.opensea.io/collection/UforART"
		);
	}

	#[test]
	fn test_bad_whitelist_entry_is_reported() {
		let raw = SAMPLE.replace("0x00000000000000000000000000000000000000a1", "0xnothex");
		let config = CollectionConfig::from_json_str(&raw).unwrap();
		assert!(matches!(
			config.build_whitelist(),
			Err(ConfigError::Whitelist(WhitelistError::InvalidAddress(_)))
		));
	}
}
