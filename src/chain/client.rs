//!
//! JSON-RPC client for an Ethereum node or wallet bridge.
//!
//! `JsonRpcClient` executes raw JSON-RPC requests over HTTP. `RpcSaleClient` layers the wallet and
//! contract seams on top of it: account and network lookups, `eth_call` reads against the sale
//! contract and `eth_sendTransaction` submissions followed by receipt polling. Accounts are
//! expected to be unlocked on the node side (dev nodes, signer proxies).

use crate::chain::abi;
use crate::chain::provider::{SaleContract, WalletProvider};
use crate::chain::types::{ContractCall, NetworkInfo, RpcError, RpcErrorObject};
use crate::config::RpcConfig;
use crate::whitelist::address;

use alloy_primitives::{Address, B256, U256};
use backoff::{ExponentialBackoff, future::retry};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, info, warn};

/// Plain JSON-RPC 2.0 over HTTP
#[derive(Clone)]
pub struct JsonRpcClient {
	/// The underlying HTTP client.
	http_client: Client,
	/// Node endpoint.
	url: String,
	next_id: Arc<AtomicU64>,
}

impl JsonRpcClient {
	/// Create a client for `url` with the request timeout from `config`.
	pub fn new(config: &RpcConfig) -> Result<Self, RpcError> {
		let http_client = Client::builder().timeout(config.request_timeout).build()?;

		Ok(Self {
			http_client,
			url: config.url.clone(),
			next_id: Arc::new(AtomicU64::new(1)),
		})
	}

	/// Execute one JSON-RPC request and deserialize its `result`.
	pub async fn request<T: DeserializeOwned>(
		&self,
		method: &str,
		params: Value,
	) -> Result<T, RpcError> {
		let id = self.next_id.fetch_add(1, Ordering::Relaxed);
		let request_body = json!({
			"jsonrpc": "2.0",
			"id": id,
			"method": method,
			"params": params,
		});

		debug!("RPC request {} #{}", method, id);
		let response = self
			.http_client
			.post(&self.url)
			.header("Content-Type", "application/json")
			.json(&request_body)
			.send()
			.await?;

		if !response.status().is_success() {
			return Err(RpcError::Other(format!("HTTP error: {}", response.status())));
		}

		let mut response_json: Value = response.json().await?;

		if let Some(error) = response_json.get("error") {
			let error: RpcErrorObject = serde_json::from_value(error.clone())?;
			return Err(RpcError::Rpc(error));
		}

		let result = response_json
			.get_mut("result")
			.map(Value::take)
			.ok_or(RpcError::NoData)?;
		Ok(serde_json::from_value(result)?)
	}

	/// Like [`JsonRpcClient::request`], retrying transport failures with exponential backoff.
	///
	/// Only for idempotent reads; node-side errors are returned immediately.
	pub async fn request_with_retry<T: DeserializeOwned>(
		&self,
		method: &str,
		params: Value,
		policy: ExponentialBackoff,
	) -> Result<T, RpcError> {
		retry(policy, || {
			let params = params.clone();
			async move {
				self.request(method, params).await.map_err(|e| match e {
					RpcError::HttpError(_) => {
						warn!("RPC {} transport error, retrying: {}", method, e);
						backoff::Error::transient(e)
					}
					other => backoff::Error::permanent(other),
				})
			}
		})
		.await
	}
}

fn decode_hex_data(raw: &str) -> Result<Vec<u8>, RpcError> {
	let digits = raw.strip_prefix("0x").unwrap_or(raw);
	hex::decode(digits).map_err(|e| RpcError::DecodeError(format!("invalid hex data: {}", e)))
}

fn decode_quantity(raw: &str) -> Result<u64, RpcError> {
	let digits = raw.strip_prefix("0x").unwrap_or(raw);
	u64::from_str_radix(digits, 16)
		.map_err(|e| RpcError::DecodeError(format!("invalid quantity {:?}: {}", raw, e)))
}

fn decode_accounts(raw: Vec<String>) -> Result<Vec<Address>, RpcError> {
	raw.iter()
		.map(|a| address::normalize(a).map_err(|e| RpcError::DecodeError(e.to_string())))
		.collect()
}

/// Wallet provider and sale contract backed by one JSON-RPC endpoint.
#[derive(Clone)]
pub struct RpcSaleClient {
	rpc: JsonRpcClient,
	contract: Address,
	config: RpcConfig,
	/// Whether the deployed contract exposes `premintlistMintEnabled()`.
	premintlist_supported: bool,
}

impl RpcSaleClient {
	pub fn new(
		rpc: JsonRpcClient,
		contract: Address,
		config: RpcConfig,
		premintlist_supported: bool,
	) -> Self {
		Self {
			rpc,
			contract,
			config,
			premintlist_supported,
		}
	}

	fn read_policy(&self) -> ExponentialBackoff {
		ExponentialBackoff {
			max_elapsed_time: Some(self.config.read_retry_window),
			..ExponentialBackoff::default()
		}
	}

	async fn eth_call(&self, data: Vec<u8>) -> Result<Vec<u8>, RpcError> {
		let params = json!([
			{
				"to": address::canonical(&self.contract),
				"data": format!("0x{}", hex::encode(data)),
			},
			"latest"
		]);
		let raw: String = self
			.rpc
			.request_with_retry("eth_call", params, self.read_policy())
			.await?;
		decode_hex_data(&raw)
	}

	async fn query(&self, signature: &str) -> Result<Vec<u8>, RpcError> {
		self.eth_call(abi::encode_query(signature)).await
	}

	async fn wait_for_receipt(&self, tx_hash: B256) -> Result<(), RpcError> {
		let hash = format!("0x{}", hex::encode(tx_hash));
		let deadline = tokio::time::Instant::now() + self.config.receipt_timeout;

		loop {
			let receipt: Option<Value> = self
				.rpc
				.request("eth_getTransactionReceipt", json!([hash]))
				.await?;

			if let Some(receipt) = receipt {
				let status = receipt.get("status").and_then(Value::as_str).unwrap_or("0x1");
				return if decode_quantity(status)? == 1 {
					info!("Transaction {} mined", hash);
					Ok(())
				} else {
					Err(RpcError::Reverted(hash))
				};
			}

			if tokio::time::Instant::now() >= deadline {
				return Err(RpcError::Timeout(format!("no receipt for {}", hash)));
			}
			tokio::time::sleep(self.config.receipt_poll_interval).await;
		}
	}
}

#[async_trait::async_trait]
impl WalletProvider for RpcSaleClient {
	async fn request_accounts(&self) -> Result<Vec<Address>, RpcError> {
		let raw: Vec<String> = self.rpc.request("eth_requestAccounts", json!([])).await?;
		decode_accounts(raw)
	}

	async fn list_accounts(&self) -> Result<Vec<Address>, RpcError> {
		let raw: Vec<String> = self
			.rpc
			.request_with_retry("eth_accounts", json!([]), self.read_policy())
			.await?;
		decode_accounts(raw)
	}

	async fn get_network(&self) -> Result<NetworkInfo, RpcError> {
		let raw: String = self
			.rpc
			.request_with_retry("eth_chainId", json!([]), self.read_policy())
			.await?;
		Ok(NetworkInfo::new(decode_quantity(&raw)?))
	}

	async fn get_code(&self, address: Address) -> Result<Vec<u8>, RpcError> {
		let raw: String = self
			.rpc
			.request_with_retry(
				"eth_getCode",
				json!([address::canonical(&address), "latest"]),
				self.read_policy(),
			)
			.await?;
		decode_hex_data(&raw)
	}
}

#[async_trait::async_trait]
impl SaleContract for RpcSaleClient {
	fn address(&self) -> Address {
		self.contract
	}

	async fn max_supply(&self) -> Result<u64, RpcError> {
		abi::decode_u64(&self.query(abi::MAX_SUPPLY).await?)
	}

	async fn total_supply(&self) -> Result<u64, RpcError> {
		abi::decode_u64(&self.query(abi::TOTAL_SUPPLY).await?)
	}

	async fn max_mint_amount_per_tx(&self) -> Result<u64, RpcError> {
		abi::decode_u64(&self.query(abi::MAX_MINT_AMOUNT_PER_TX).await?)
	}

	async fn cost(&self) -> Result<U256, RpcError> {
		abi::decode_u256(&self.query(abi::COST).await?)
	}

	async fn paused(&self) -> Result<bool, RpcError> {
		abi::decode_bool(&self.query(abi::PAUSED).await?)
	}

	async fn whitelist_mint_enabled(&self) -> Result<bool, RpcError> {
		abi::decode_bool(&self.query(abi::WHITELIST_MINT_ENABLED).await?)
	}

	async fn premintlist_mint_enabled(&self) -> Result<bool, RpcError> {
		if !self.premintlist_supported {
			return Ok(false);
		}
		abi::decode_bool(&self.query(abi::PREMINTLIST_MINT_ENABLED).await?)
	}

	async fn claim_utility_open(&self) -> Result<bool, RpcError> {
		abi::decode_bool(&self.query(abi::CLAIM_UTILITY_OPEN).await?)
	}

	async fn balance_to_claim(&self, address: Address) -> Result<U256, RpcError> {
		abi::decode_u256(&self.eth_call(abi::encode_balance_query(&address)).await?)
	}

	async fn submit(
		&self,
		from: Address,
		call: ContractCall,
		value: U256,
	) -> Result<B256, RpcError> {
		let params = json!([{
			"from": address::canonical(&from),
			"to": address::canonical(&self.contract),
			"value": format!("0x{:x}", value),
			"data": format!("0x{}", hex::encode(abi::encode_call(&call))),
		}]);

		info!("Sending {} from {}", call.name(), address::canonical(&from));
		let raw: String = self.rpc.request("eth_sendTransaction", params).await?;
		let tx_hash: B256 = raw
			.parse()
			.map_err(|e| RpcError::DecodeError(format!("invalid transaction hash {:?}: {}", raw, e)))?;
		info!("Sent {} as {}", call.name(), tx_hash);

		self.wait_for_receipt(tx_hash).await?;
		Ok(tx_hash)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_decode_helpers() {
		assert_eq!(decode_quantity("0x1").unwrap(), 1);
		assert_eq!(decode_quantity("0xaa36a7").unwrap(), 11155111);
		assert!(decode_quantity("0xzz").is_err());

		assert!(decode_hex_data("0x").unwrap().is_empty());
		assert_eq!(decode_hex_data("0x6080").unwrap(), vec![0x60, 0x80]);
	}

	#[test]
	fn test_decode_accounts_normalizes() {
		let accounts = decode_accounts(vec![
			"0xC039115A382B74715D479A692B34835501FDBEEC".to_string(),
		])
		.unwrap();
		assert_eq!(
			address::canonical(&accounts[0]),
			"0xc039115a382b74715d479a692b34835501fdbeec"
		);
		assert!(decode_accounts(vec!["0x12".to_string()]).is_err());
	}
}
