//! EVM anchor lookup over Alloy `eth_getLogs`.
//!
//! Implements the window source against a live provider and resolves the
//! matched log into a verification outcome, including the UTC timestamp
//! of the anchoring block.

use alloy_provider::Provider;
use alloy_rpc_types::{BlockTransactionsKind, Filter, Log};
use anchor_chain::ChainConnection;
use anchor_types::{short_hex, BundleHash, ChainMatch};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;

use crate::matcher::newest_matching_log;
use crate::scanner::{scan_backward, LogWindowSource};
use crate::{DiscoveryError, DiscoveryInterface};

/// Anchor lookup backed by an Alloy HTTP provider.
pub struct AlloyDiscovery {
	/// Shared connection to the anchoring chain.
	connection: Arc<ChainConnection>,
	/// Timeout applied to individual RPC calls.
	rpc_timeout: Duration,
}

impl AlloyDiscovery {
	/// Creates a lookup implementation over the shared connection.
	pub fn new(connection: Arc<ChainConnection>) -> Self {
		let rpc_timeout = Duration::from_secs(connection.settings().rpc_timeout_seconds);
		Self {
			connection,
			rpc_timeout,
		}
	}

	/// Runs an RPC call with the configured per-call timeout.
	async fn rpc<T, E, F>(&self, operation: &str, call: F) -> Result<T, DiscoveryError>
	where
		E: std::fmt::Display,
		F: std::future::IntoFuture<Output = Result<T, E>>,
	{
		match tokio::time::timeout(self.rpc_timeout, call).await {
			Ok(result) => result
				.map_err(|e| DiscoveryError::Network(format!("Failed to {}: {}", operation, e))),
			Err(_) => Err(DiscoveryError::Network(format!(
				"Timed out waiting to {}",
				operation
			))),
		}
	}

	/// Resolves the UTC timestamp of the block containing a matched log.
	///
	/// Falls back to the current time when the block cannot be fetched,
	/// trading timestamp precision for a usable verification outcome.
	async fn block_timestamp(&self, block_number: Option<u64>) -> DateTime<Utc> {
		let Some(number) = block_number else {
			return Utc::now();
		};
		let binding = match self.connection.binding().await {
			Ok(binding) => binding,
			Err(_) => return Utc::now(),
		};

		let block = self
			.rpc(
				"fetch block header",
				binding
					.provider
					.get_block_by_number(number.into(), BlockTransactionsKind::Hashes),
			)
			.await;

		match block {
			Ok(Some(block)) => DateTime::from_timestamp(block.header.timestamp as i64, 0)
				.unwrap_or_else(Utc::now),
			_ => {
				tracing::debug!(
					block_number = number,
					"Block timestamp unavailable, using current time"
				);
				Utc::now()
			},
		}
	}
}

#[async_trait]
impl LogWindowSource for AlloyDiscovery {
	async fn latest_block(&self) -> Result<u64, DiscoveryError> {
		let binding = self.connection.binding().await?;
		self.rpc("fetch latest block", binding.provider.get_block_number())
			.await
	}

	async fn logs_in_window(&self, from: u64, to: u64) -> Result<Vec<Log>, DiscoveryError> {
		let binding = self.connection.binding().await?;
		let filter = Filter::new()
			.address(binding.address)
			.event_signature(binding.abi.event_topic)
			.from_block(from)
			.to_block(to);

		self.rpc(
			"fetch anchoring logs",
			binding.provider.get_logs(&filter),
		)
		.await
	}
}

#[async_trait]
impl DiscoveryInterface for AlloyDiscovery {
	async fn find_anchor(&self, hash: &BundleHash) -> Result<ChainMatch, DiscoveryError> {
		let lookback = self.connection.settings().lookback_blocks;
		let logs = scan_backward(self, lookback).await?;

		let Some(log) = newest_matching_log(&logs, hash) else {
			tracing::debug!(
				bundle_hash = %short_hex(&hash.to_string()),
				candidates = logs.len(),
				"No anchoring event found in lookback range"
			);
			return Ok(ChainMatch::no_match());
		};

		let Some(tx_hash) = log.transaction_hash else {
			tracing::warn!("Matching log lacks a transaction hash, treating as no match");
			return Ok(ChainMatch::no_match());
		};

		let anchored_at = self.block_timestamp(log.block_number).await;
		let tx_id = tx_hash.to_string();

		tracing::info!(
			bundle_hash = %short_hex(&hash.to_string()),
			tx_id = %tx_id,
			"Found existing anchor on chain"
		);

		Ok(ChainMatch::found(tx_id, anchored_at))
	}
}
