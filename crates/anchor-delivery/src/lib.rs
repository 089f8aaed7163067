//! Transaction delivery module for the evidence anchoring system.
//!
//! This module handles the submission of anchoring transactions: assembling
//! them with live fee and nonce data, signing, broadcasting and waiting for
//! inclusion. The service layer adds bounded retry around the whole
//! submission so transient chain conditions do not surface as failures.

use anchor_chain::ChainError;
use anchor_types::{AnchorReceipt, BundleHash};
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Re-export implementations
pub mod implementations {
	pub mod evm {
		pub mod alloy;
		pub mod fees;
	}
}

/// Total submission attempts before giving up.
const MAX_SUBMIT_ATTEMPTS: u32 = 3;

/// Errors that can occur during transaction delivery operations.
#[derive(Debug, Error)]
pub enum DeliveryError {
	/// No signing key is configured, so submissions are impossible.
	#[error("Delivery is read-only: {0}")]
	ReadOnly(String),
	/// The chain connection could not be resolved. Configuration-class,
	/// never retried.
	#[error("Connection error: {0}")]
	Connection(#[from] ChainError),
	/// Error that occurs during network communication.
	#[error("Network error: {0}")]
	Network(String),
	/// The transaction was mined but reverted.
	#[error("Transaction {tx_id} reverted on chain")]
	Reverted { tx_id: String },
	/// No receipt arrived within the inclusion window.
	#[error("Transaction not included within {0} seconds")]
	InclusionTimeout(u64),
	/// Every submission attempt failed.
	#[error("Anchoring failed after {attempts} attempts: {source}")]
	ExhaustedRetries {
		attempts: u32,
		#[source]
		source: Box<DeliveryError>,
	},
}

impl DeliveryError {
	/// True for transient failures worth another attempt.
	///
	/// A reverted transaction counts as transient: the usual causes are
	/// nonce races and fee spikes, both of which a fresh assembly can fix.
	pub fn is_retryable(&self) -> bool {
		matches!(
			self,
			DeliveryError::Network(_)
				| DeliveryError::Reverted { .. }
				| DeliveryError::InclusionTimeout(_)
		)
	}
}

/// Trait defining the interface for anchoring transaction delivery.
///
/// An implementation performs exactly one submission attempt per call:
/// assemble, sign, broadcast and wait for the receipt. Retry policy lives
/// in the service, not the implementation.
#[async_trait]
pub trait DeliveryInterface: Send + Sync {
	/// Builds, signs, broadcasts and confirms one anchoring transaction.
	///
	/// Succeeds only when a receipt arrives with success status. A mined
	/// but reverted transaction is an error.
	async fn submit_anchor(&self, hash: &BundleHash) -> Result<AnchorReceipt, DeliveryError>;

	/// True when no signing key is attached.
	fn is_read_only(&self) -> bool;
}

/// Service that manages anchoring transaction delivery.
///
/// Wraps a delivery implementation with the retry policy: up to three
/// attempts with a linearly growing pause after each failure.
pub struct DeliveryService {
	implementation: Box<dyn DeliveryInterface>,
}

impl DeliveryService {
	/// Creates a new DeliveryService with the specified implementation.
	pub fn new(implementation: Box<dyn DeliveryInterface>) -> Self {
		Self { implementation }
	}

	/// True when the underlying implementation cannot sign.
	pub fn is_read_only(&self) -> bool {
		self.implementation.is_read_only()
	}

	/// Submits an anchoring transaction, retrying transient failures.
	///
	/// Makes up to three attempts. After every failed attempt the loop
	/// sleeps for one second more than the attempt index before moving on,
	/// and once attempts are exhausted the last failure is wrapped in
	/// [`DeliveryError::ExhaustedRetries`]. Non-retryable failures abort
	/// immediately.
	pub async fn submit_with_retry(
		&self,
		hash: &BundleHash,
	) -> Result<AnchorReceipt, DeliveryError> {
		let mut last_error = None;

		for attempt in 0..MAX_SUBMIT_ATTEMPTS {
			match self.implementation.submit_anchor(hash).await {
				Ok(receipt) => {
					tracing::info!(
						tx_id = %receipt.tx_id,
						block_number = receipt.block_number,
						attempt = attempt + 1,
						"Anchoring transaction confirmed"
					);
					return Ok(receipt);
				},
				Err(err) if err.is_retryable() => {
					tracing::warn!(
						attempt = attempt + 1,
						error = %err,
						"Anchor submission attempt failed"
					);
					last_error = Some(err);
					// Linear backoff, one second more after each attempt
					tokio::time::sleep(Duration::from_secs(u64::from(attempt) + 1)).await;
				},
				Err(err) => return Err(err),
			}
		}

		Err(DeliveryError::ExhaustedRetries {
			attempts: MAX_SUBMIT_ATTEMPTS,
			source: Box::new(
				last_error.unwrap_or_else(|| DeliveryError::Network("no attempts made".into())),
			),
		})
	}
}
