//! Backward windowed walk over the anchoring contract's event logs.
//!
//! Public RPC endpoints cap `eth_getLogs` block ranges, so the scanner
//! requests at most 25 blocks at a time, walking from the chain head
//! toward the lookback floor. The walk stops at the first window that
//! yields logs, which makes the newest anchor win when the same digest
//! was anchored more than once.

use alloy_rpc_types::Log;
use async_trait::async_trait;

use crate::DiscoveryError;

/// Widest block span requested per log query.
pub const SCAN_CHUNK_BLOCKS: u64 = 25;

/// Source of event logs for the scanner, one window at a time.
///
/// Separating the walk from the transport keeps the window arithmetic
/// testable without a chain.
#[async_trait]
pub trait LogWindowSource: Send + Sync {
	/// Current chain head.
	async fn latest_block(&self) -> Result<u64, DiscoveryError>;

	/// Anchoring event logs in the inclusive block range.
	async fn logs_in_window(&self, from: u64, to: u64) -> Result<Vec<Log>, DiscoveryError>;
}

/// Walks log windows backward from the chain head.
///
/// Returns the logs of the newest non-empty window, or an empty vector
/// once the lookback floor is reached. A failing window query ends the
/// walk early with whatever the newest windows yielded, so verification
/// degrades to "not found" instead of failing outright.
pub async fn scan_backward<S>(source: &S, lookback_blocks: u64) -> Result<Vec<Log>, DiscoveryError>
where
	S: LogWindowSource + ?Sized,
{
	let latest = source.latest_block().await?;
	let floor = latest.saturating_sub(lookback_blocks);

	let mut current_to = latest;

	loop {
		let current_from = current_to.saturating_sub(SCAN_CHUNK_BLOCKS).max(floor);

		match source.logs_in_window(current_from, current_to).await {
			Ok(logs) if !logs.is_empty() => {
				tracing::debug!(
					from = current_from,
					to = current_to,
					count = logs.len(),
					"Found candidate anchoring logs"
				);
				return Ok(logs);
			},
			Ok(_) => {
				tracing::debug!(
					from = current_from,
					to = current_to,
					"No anchoring logs in window"
				);
			},
			Err(e) => {
				tracing::warn!(
					from = current_from,
					to = current_to,
					error = %e,
					"Log window query failed, ending scan early"
				);
				return Ok(Vec::new());
			},
		}

		if current_from <= floor {
			return Ok(Vec::new());
		}
		current_to = current_from - 1;
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use alloy_primitives::{Address, Bytes, LogData, B256};
	use std::sync::Mutex;

	fn log_at(block: u64) -> Log {
		Log {
			inner: alloy_primitives::Log {
				address: Address::ZERO,
				data: LogData::new_unchecked(vec![], Bytes::new()),
			},
			block_hash: None,
			block_number: Some(block),
			block_timestamp: None,
			transaction_hash: Some(B256::ZERO),
			transaction_index: None,
			log_index: None,
			removed: false,
		}
	}

	/// Serves a single log at a fixed block, recording every window asked
	/// for. Can be told to fail a specific query.
	struct FakeWindowSource {
		latest: u64,
		log_block: Option<u64>,
		fail_on_query: Option<usize>,
		queries: Mutex<Vec<(u64, u64)>>,
	}

	impl FakeWindowSource {
		fn new(latest: u64, log_block: Option<u64>) -> Self {
			Self {
				latest,
				log_block,
				fail_on_query: None,
				queries: Mutex::new(Vec::new()),
			}
		}

		fn queries(&self) -> Vec<(u64, u64)> {
			self.queries.lock().unwrap().clone()
		}
	}

	#[async_trait]
	impl LogWindowSource for FakeWindowSource {
		async fn latest_block(&self) -> Result<u64, DiscoveryError> {
			Ok(self.latest)
		}

		async fn logs_in_window(&self, from: u64, to: u64) -> Result<Vec<Log>, DiscoveryError> {
			let mut queries = self.queries.lock().unwrap();
			queries.push((from, to));

			if self.fail_on_query == Some(queries.len()) {
				return Err(DiscoveryError::Network("window query failed".into()));
			}

			Ok(self
				.log_block
				.filter(|block| (from..=to).contains(block))
				.map(|block| vec![log_at(block)])
				.into_iter()
				.flatten()
				.collect())
		}
	}

	#[tokio::test]
	async fn test_deep_log_found_within_four_windows() {
		let source = FakeWindowSource::new(200, Some(110));

		let logs = scan_backward(&source, 100).await.unwrap();
		assert_eq!(logs.len(), 1);
		assert_eq!(logs[0].block_number, Some(110));

		// Non-overlapping windows walking head to floor
		assert_eq!(
			source.queries(),
			vec![(175, 200), (149, 174), (123, 148), (100, 122)]
		);
	}

	#[tokio::test]
	async fn test_stops_at_first_non_empty_window() {
		let source = FakeWindowSource::new(200, Some(124));

		let logs = scan_backward(&source, 100).await.unwrap();
		assert_eq!(logs.len(), 1);
		// The hit window ends the walk, older windows are never queried
		assert_eq!(source.queries(), vec![(175, 200), (149, 174), (123, 148)]);
	}

	#[tokio::test]
	async fn test_fresh_log_costs_one_query() {
		let source = FakeWindowSource::new(200, Some(190));

		let logs = scan_backward(&source, 100).await.unwrap();
		assert_eq!(logs.len(), 1);
		assert_eq!(source.queries(), vec![(175, 200)]);
	}

	#[tokio::test]
	async fn test_exhausts_lookback_without_logs() {
		let source = FakeWindowSource::new(200, None);

		let logs = scan_backward(&source, 100).await.unwrap();
		assert!(logs.is_empty());
		assert_eq!(
			source.queries(),
			vec![(175, 200), (149, 174), (123, 148), (100, 122)]
		);
	}

	#[tokio::test]
	async fn test_window_failure_ends_scan_with_no_logs() {
		let mut source = FakeWindowSource::new(200, Some(110));
		source.fail_on_query = Some(2);

		let logs = scan_backward(&source, 100).await.unwrap();
		assert!(logs.is_empty());
		// The failing query is the last one issued
		assert_eq!(source.queries(), vec![(175, 200), (149, 174)]);
	}

	#[tokio::test]
	async fn test_lookback_shorter_than_window() {
		let source = FakeWindowSource::new(50, None);

		let logs = scan_backward(&source, 10).await.unwrap();
		assert!(logs.is_empty());
		// Floor clamps the only window
		assert_eq!(source.queries(), vec![(40, 50)]);
	}

	#[tokio::test]
	async fn test_lookback_beyond_genesis_saturates() {
		let source = FakeWindowSource::new(30, None);

		let logs = scan_backward(&source, 1000).await.unwrap();
		assert!(logs.is_empty());
		assert_eq!(source.queries(), vec![(5, 30), (0, 4)]);
	}
}
