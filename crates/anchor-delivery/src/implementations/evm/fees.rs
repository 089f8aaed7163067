//! EIP-1559 fee derivation from recent fee history.
//!
//! The sampling parameters live here next to the derivation so the two
//! stay in sync: five recent blocks, rewards at the 10th, 50th and 90th
//! percentiles. Only the 50th percentile of the newest block feeds the
//! priority fee.

use alloy_rpc_types::FeeHistory;
use anchor_types::FeeStrategy;

/// Number of recent blocks sampled for fee history.
pub const FEE_HISTORY_BLOCKS: u64 = 5;
/// Reward percentiles requested per sampled block.
pub const REWARD_PERCENTILES: [f64; 3] = [10.0, 50.0, 90.0];
/// Floor for the priority fee, 2 gwei in wei.
const MIN_PRIORITY_FEE_WEI: u128 = 2_000_000_000;

/// Derives market fee caps from a fee history sample.
///
/// The priority fee is the median reward of the newest sampled block,
/// floored at 2 gwei. The fee cap leaves room for the base fee to double
/// on top of that priority fee. Returns None when the sample carries no
/// base fee at all, which callers treat as "use legacy gas pricing".
///
/// A sample with missing or short reward rows still produces a strategy,
/// it just falls back to the floor for the priority fee.
pub fn market_strategy_from(history: &FeeHistory) -> Option<FeeStrategy> {
	let base_fee = history.base_fee_per_gas.last().copied()?;

	let priority = history
		.reward
		.as_ref()
		.and_then(|rows| rows.last())
		.and_then(|row| row.get(1).copied())
		.map_or(MIN_PRIORITY_FEE_WEI, |median| {
			median.max(MIN_PRIORITY_FEE_WEI)
		});

	Some(FeeStrategy::Market {
		max_fee_per_gas: base_fee.saturating_mul(2).saturating_add(priority),
		max_priority_fee_per_gas: priority,
	})
}
