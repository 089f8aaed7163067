//! Transaction shapes produced while assembling an anchoring submission.

use alloy_primitives::{Address, Bytes};
use serde::{Deserialize, Serialize};

/// Fee parameters selected for a submission.
///
/// `Market` carries EIP-1559 fee caps derived from recent fee history.
/// `Legacy` is the degraded form used when fee history is unavailable,
/// pricing the transaction with a plain gas price instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeeStrategy {
	/// Dynamic-fee pricing with explicit caps, in wei.
	Market {
		max_fee_per_gas: u128,
		max_priority_fee_per_gas: u128,
	},
	/// Single gas price pricing, in wei.
	Legacy { gas_price: u128 },
}

/// A fully assembled anchoring transaction, ready for signing.
///
/// Every field is resolved before signing: the sender and nonce come from
/// the signer account, fees from the fee estimator, and the call data from
/// the anchoring contract binding.
#[derive(Debug, Clone)]
pub struct PendingTransaction {
	/// Sender address derived from the signing key.
	pub from: Address,
	/// The anchoring contract address.
	pub to: Address,
	/// Pending-inclusive account nonce.
	pub nonce: u64,
	/// Chain the transaction is bound to.
	pub chain_id: u64,
	/// Fee parameters chosen for this submission.
	pub fee: FeeStrategy,
	/// Gas limit, either estimated with headroom or a fixed fallback.
	pub gas_limit: u64,
	/// ABI-encoded call into the anchoring contract.
	pub call_data: Bytes,
}

/// Confirmation data for a mined anchoring transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnchorReceipt {
	/// Transaction hash as a 0x-prefixed hex string.
	pub tx_id: String,
	/// Block the transaction was included in.
	pub block_number: u64,
}
