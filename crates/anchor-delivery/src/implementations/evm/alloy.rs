//! EVM delivery implementation using the Alloy provider stack.
//!
//! One `submit_anchor` call performs one complete submission attempt:
//! fetch nonce and fee data, assemble the transaction, sign it with the
//! local wallet, broadcast it and poll for the receipt. Fee and gas
//! estimation degrade instead of failing, matching how public RPC
//! endpoints actually behave.

use alloy_network::TransactionBuilder;
use alloy_primitives::B256;
use alloy_provider::Provider;
use alloy_rpc_types::{BlockNumberOrTag, TransactionRequest};
use anchor_account::AccountService;
use anchor_chain::{ChainConnection, ContractBinding};
use anchor_types::{short_hex, AnchorReceipt, BundleHash, FeeStrategy, PendingTransaction};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use super::fees;
use crate::{DeliveryError, DeliveryInterface};

/// Gas limit used when estimation is unavailable.
const FALLBACK_GAS_LIMIT: u64 = 200_000;
/// How long to wait for a broadcast transaction to be mined.
const INCLUSION_TIMEOUT: Duration = Duration::from_secs(180);
/// Poll interval while waiting for a receipt.
const RECEIPT_POLL_INTERVAL: Duration = Duration::from_secs(3);

/// Delivery implementation backed by an Alloy HTTP provider.
pub struct AlloyDelivery {
	/// Shared connection to the anchoring chain.
	connection: Arc<ChainConnection>,
	/// Signing account. Absent in read-only deployments.
	account: Option<AccountService>,
	/// Timeout applied to individual RPC calls.
	rpc_timeout: Duration,
}

impl AlloyDelivery {
	/// Creates a delivery implementation over the shared connection.
	pub fn new(connection: Arc<ChainConnection>, account: Option<AccountService>) -> Self {
		let rpc_timeout = Duration::from_secs(connection.settings().rpc_timeout_seconds);
		Self {
			connection,
			account,
			rpc_timeout,
		}
	}

	/// Runs an RPC call with the configured per-call timeout, mapping any
	/// failure into a retryable network error.
	async fn rpc<T, E, F>(&self, operation: &str, call: F) -> Result<T, DeliveryError>
	where
		E: std::fmt::Display,
		F: std::future::IntoFuture<Output = Result<T, E>>,
	{
		match tokio::time::timeout(self.rpc_timeout, call).await {
			Ok(result) => result
				.map_err(|e| DeliveryError::Network(format!("Failed to {}: {}", operation, e))),
			Err(_) => Err(DeliveryError::Network(format!(
				"Timed out waiting to {}",
				operation
			))),
		}
	}

	/// Like [`Self::rpc`] but degrades to None so the caller can fall back.
	async fn rpc_degraded<T, E, F>(&self, operation: &str, call: F) -> Option<T>
	where
		E: std::fmt::Display,
		F: std::future::IntoFuture<Output = Result<T, E>>,
	{
		match tokio::time::timeout(self.rpc_timeout, call).await {
			Ok(Ok(value)) => Some(value),
			Ok(Err(e)) => {
				tracing::warn!(error = %e, "RPC call to {} failed", operation);
				None
			},
			Err(_) => {
				tracing::warn!("RPC call to {} timed out", operation);
				None
			},
		}
	}

	/// Assembles a fully resolved anchoring transaction.
	async fn assemble(
		&self,
		binding: &ContractBinding,
		account: &AccountService,
		hash: &BundleHash,
	) -> Result<PendingTransaction, DeliveryError> {
		let from = account.address();
		let call_data = binding.abi.encode_anchor_call(hash);

		// Pending-inclusive nonce so queued submissions stack instead of
		// colliding
		let nonce = self
			.rpc(
				"fetch pending nonce",
				binding.provider.get_transaction_count(from).pending(),
			)
			.await?;

		let chain_id = self
			.rpc("fetch chain id", binding.provider.get_chain_id())
			.await?;

		let fee = match self
			.rpc_degraded(
				"sample fee history",
				binding.provider.get_fee_history(
					fees::FEE_HISTORY_BLOCKS,
					BlockNumberOrTag::Latest,
					&fees::REWARD_PERCENTILES,
				),
			)
			.await
			.and_then(|history| fees::market_strategy_from(&history))
		{
			Some(strategy) => strategy,
			None => {
				tracing::warn!("Market fee data unavailable, using legacy gas pricing");
				let gas_price = self
					.rpc("fetch gas price", binding.provider.get_gas_price())
					.await?;
				FeeStrategy::Legacy { gas_price }
			},
		};

		let estimate_request = TransactionRequest::default()
			.with_from(from)
			.with_to(binding.address)
			.with_input(call_data.clone());
		let gas_limit = gas_limit_from(
			self.rpc_degraded(
				"estimate gas",
				binding.provider.estimate_gas(&estimate_request),
			)
			.await,
		);

		Ok(PendingTransaction {
			from,
			to: binding.address,
			nonce,
			chain_id,
			fee,
			gas_limit,
			call_data,
		})
	}

	/// Waits for the receipt of a broadcast transaction.
	async fn wait_for_inclusion(
		&self,
		binding: &ContractBinding,
		tx_hash: B256,
	) -> Result<AnchorReceipt, DeliveryError> {
		poll_until_included(tx_hash.to_string(), move || async move {
			let lookup = self
				.rpc(
					"fetch transaction receipt",
					binding.provider.get_transaction_receipt(tx_hash),
				)
				.await?;
			Ok(lookup.map(|receipt| ReceiptView {
				status: receipt.status(),
				block_number: receipt.block_number.unwrap_or_default(),
			}))
		})
		.await
	}
}

/// Applies 20% headroom to a gas estimate, or substitutes the fixed
/// fallback limit when estimation failed.
fn gas_limit_from(estimate: Option<u64>) -> u64 {
	match estimate {
		Some(estimate) => estimate.saturating_mul(12) / 10,
		None => {
			tracing::warn!(
				fallback_gas = FALLBACK_GAS_LIMIT,
				"Gas estimation unavailable, using fixed limit"
			);
			FALLBACK_GAS_LIMIT
		},
	}
}

/// Outcome of a single receipt poll, reduced to the fields inclusion
/// cares about.
struct ReceiptView {
	status: bool,
	block_number: u64,
}

/// Polls a receipt source until it yields a receipt or the inclusion
/// window elapses.
///
/// Success requires both a receipt and a success status. A reverted
/// transaction is reported as [`DeliveryError::Reverted`], silence past
/// the inclusion window as [`DeliveryError::InclusionTimeout`], and a
/// failing poll ends the wait immediately.
async fn poll_until_included<F, Fut>(
	tx_id: String,
	mut fetch: F,
) -> Result<AnchorReceipt, DeliveryError>
where
	F: FnMut() -> Fut,
	Fut: std::future::Future<Output = Result<Option<ReceiptView>, DeliveryError>>,
{
	let started = tokio::time::Instant::now();

	loop {
		if started.elapsed() >= INCLUSION_TIMEOUT {
			return Err(DeliveryError::InclusionTimeout(INCLUSION_TIMEOUT.as_secs()));
		}

		match fetch().await? {
			Some(receipt) => {
				if !receipt.status {
					return Err(DeliveryError::Reverted { tx_id });
				}
				return Ok(AnchorReceipt {
					tx_id,
					block_number: receipt.block_number,
				});
			},
			None => {
				tokio::time::sleep(RECEIPT_POLL_INTERVAL).await;
			},
		}
	}
}

/// Converts an assembled transaction into the request shape the provider
/// signs and broadcasts.
fn to_request(tx: &PendingTransaction) -> TransactionRequest {
	let mut request = TransactionRequest::default()
		.with_from(tx.from)
		.with_to(tx.to)
		.with_nonce(tx.nonce)
		.with_chain_id(tx.chain_id)
		.with_gas_limit(tx.gas_limit)
		.with_input(tx.call_data.clone());

	match tx.fee {
		FeeStrategy::Market {
			max_fee_per_gas,
			max_priority_fee_per_gas,
		} => {
			request = request
				.with_max_fee_per_gas(max_fee_per_gas)
				.with_max_priority_fee_per_gas(max_priority_fee_per_gas);
		},
		FeeStrategy::Legacy { gas_price } => {
			request = request.with_gas_price(gas_price);
		},
	}

	request
}

#[async_trait]
impl DeliveryInterface for AlloyDelivery {
	async fn submit_anchor(&self, hash: &BundleHash) -> Result<AnchorReceipt, DeliveryError> {
		let account = self
			.account
			.as_ref()
			.ok_or_else(|| DeliveryError::ReadOnly("no signing key configured".to_string()))?;
		let binding = self.connection.binding().await?;

		let tx = self.assemble(binding, account, hash).await?;
		tracing::debug!(
			nonce = tx.nonce,
			gas_limit = tx.gas_limit,
			fee = ?tx.fee,
			"Assembled anchoring transaction"
		);

		let envelope = to_request(&tx)
			.build(account.wallet())
			.await
			.map_err(|e| DeliveryError::Network(format!("Failed to sign transaction: {}", e)))?;

		let pending = self
			.rpc(
				"broadcast transaction",
				binding.provider.send_tx_envelope(envelope),
			)
			.await?;
		let tx_hash = *pending.tx_hash();

		tracing::info!(
			tx_hash = %tx_hash,
			bundle_hash = %short_hex(&hash.to_string()),
			"Anchoring transaction broadcast"
		);

		self.wait_for_inclusion(binding, tx_hash).await
	}

	fn is_read_only(&self) -> bool {
		self.account.is_none()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use anchor_types::{NetworkConfig, Secret};
	use std::sync::atomic::{AtomicU32, Ordering};

	const DEV_KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

	fn connection() -> Arc<ChainConnection> {
		Arc::new(ChainConnection::new(NetworkConfig {
			rpc_url: "http://localhost:8545".to_string(),
			contract_address: "0x5fbdb2315678afecb367f032d93f642f64180aa3".to_string(),
			abi_path: None,
			lookback_blocks: 1000,
			rpc_timeout_seconds: 30,
		}))
	}

	fn sample_hash() -> BundleHash {
		"0x3333333333333333333333333333333333333333333333333333333333333333"
			.parse()
			.unwrap()
	}

	#[tokio::test]
	async fn test_read_only_without_account() {
		let delivery = AlloyDelivery::new(connection(), None);
		assert!(delivery.is_read_only());

		let err = delivery.submit_anchor(&sample_hash()).await.unwrap_err();
		assert!(matches!(err, DeliveryError::ReadOnly(_)));
	}

	#[test]
	fn test_signing_account_disables_read_only() {
		let account =
			AccountService::from_key(&Secret::new(DEV_KEY.to_string())).unwrap();
		let delivery = AlloyDelivery::new(connection(), Some(account));
		assert!(!delivery.is_read_only());
	}

	#[test]
	fn test_market_request_shape() {
		let hash = sample_hash();
		let abi = anchor_chain::AnchorAbi::builtin();
		let tx = PendingTransaction {
			from: "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266".parse().unwrap(),
			to: "0x5fbdb2315678afecb367f032d93f642f64180aa3".parse().unwrap(),
			nonce: 9,
			chain_id: 114,
			fee: FeeStrategy::Market {
				max_fee_per_gas: 5_000_000_000,
				max_priority_fee_per_gas: 2_000_000_000,
			},
			gas_limit: 120_000,
			call_data: abi.encode_anchor_call(&hash),
		};

		let request = to_request(&tx);
		assert_eq!(request.nonce, Some(9));
		assert_eq!(request.chain_id, Some(114));
		assert_eq!(request.gas, Some(120_000));
		assert_eq!(request.max_fee_per_gas, Some(5_000_000_000));
		assert_eq!(request.max_priority_fee_per_gas, Some(2_000_000_000));
		assert_eq!(request.gas_price, None);

		let data = request.input.into_input().unwrap();
		assert_eq!(&data[..4], abi.function_selector);
		assert_eq!(&data[4..], hash.as_bytes());
	}

	#[test]
	fn test_legacy_request_shape() {
		let hash = sample_hash();
		let tx = PendingTransaction {
			from: "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266".parse().unwrap(),
			to: "0x5fbdb2315678afecb367f032d93f642f64180aa3".parse().unwrap(),
			nonce: 0,
			chain_id: 114,
			fee: FeeStrategy::Legacy {
				gas_price: 30_000_000_000,
			},
			gas_limit: FALLBACK_GAS_LIMIT,
			call_data: anchor_chain::AnchorAbi::builtin().encode_anchor_call(&hash),
		};

		let request = to_request(&tx);
		assert_eq!(request.gas_price, Some(30_000_000_000));
		assert_eq!(request.max_fee_per_gas, None);
		assert_eq!(request.max_priority_fee_per_gas, None);
		assert_eq!(request.gas, Some(FALLBACK_GAS_LIMIT));
	}

	#[test]
	fn test_gas_limit_adds_headroom_to_estimate() {
		assert_eq!(gas_limit_from(Some(100_000)), 120_000);
		assert_eq!(gas_limit_from(Some(21_000)), 25_200);
	}

	#[test]
	fn test_gas_limit_falls_back_when_estimation_fails() {
		assert_eq!(gas_limit_from(None), 200_000);
		assert_eq!(gas_limit_from(None), FALLBACK_GAS_LIMIT);
	}

	#[test]
	fn test_gas_limit_saturates_on_extreme_estimate() {
		// The multiply saturates instead of overflowing
		assert_eq!(gas_limit_from(Some(u64::MAX)), u64::MAX / 10);
	}

	#[tokio::test(start_paused = true)]
	async fn test_inclusion_timeout_after_silent_polls() {
		let started = tokio::time::Instant::now();

		let err = poll_until_included("0xaaaa".to_string(), || async { Ok(None) })
			.await
			.unwrap_err();

		assert!(matches!(err, DeliveryError::InclusionTimeout(180)));
		assert_eq!(started.elapsed(), INCLUSION_TIMEOUT);
	}

	#[tokio::test]
	async fn test_reverted_receipt_fails_submission() {
		let err = poll_until_included("0xdead".to_string(), || async {
			Ok(Some(ReceiptView {
				status: false,
				block_number: 3,
			}))
		})
		.await
		.unwrap_err();

		match err {
			DeliveryError::Reverted { tx_id } => assert_eq!(tx_id, "0xdead"),
			other => panic!("expected a revert, got {:?}", other),
		}
	}

	#[tokio::test(start_paused = true)]
	async fn test_receipt_after_empty_polls_succeeds() {
		let polls = Arc::new(AtomicU32::new(0));
		let counter = Arc::clone(&polls);
		let started = tokio::time::Instant::now();

		let receipt = poll_until_included("0xfeed".to_string(), move || {
			let n = counter.fetch_add(1, Ordering::SeqCst);
			async move {
				if n < 2 {
					Ok(None)
				} else {
					Ok(Some(ReceiptView {
						status: true,
						block_number: 42,
					}))
				}
			}
		})
		.await
		.unwrap();

		assert_eq!(receipt.tx_id, "0xfeed");
		assert_eq!(receipt.block_number, 42);
		assert_eq!(polls.load(Ordering::SeqCst), 3);
		// Two empty polls cost two poll intervals
		assert_eq!(started.elapsed(), RECEIPT_POLL_INTERVAL * 2);
	}

	#[tokio::test]
	async fn test_receipt_poll_error_ends_waiting() {
		let err = poll_until_included("0xaaaa".to_string(), || async {
			Err(DeliveryError::Network("receipt lookup failed".to_string()))
		})
		.await
		.unwrap_err();

		assert!(matches!(err, DeliveryError::Network(_)));
	}
}
