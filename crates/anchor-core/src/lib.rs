//! Core engine for the evidence anchoring system.
//!
//! This module orchestrates the anchoring lifecycle: validating incoming
//! bundle digests, checking chain history for an existing anchor,
//! submitting a new anchoring transaction when none exists, and
//! reconciling the two into a single verified outcome.

use anchor_delivery::DeliveryService;
use anchor_discovery::DiscoveryService;
use anchor_types::{short_hex, AnchorReceipt, BundleHash, BundleHashError, ChainMatch};
use chrono::Utc;
use std::sync::Arc;
use thiserror::Error;

/// Errors that can occur during anchoring operations.
#[derive(Debug, Error)]
pub enum EngineError {
	/// The supplied bundle hash string has the wrong shape.
	#[error("Invalid bundle hash: {0}")]
	InvalidHash(#[from] BundleHashError),
	/// Submitting the anchoring transaction failed.
	#[error("Submission error: {0}")]
	Submission(#[from] anchor_delivery::DeliveryError),
}

/// Main engine coordinating anchor verification and submission.
///
/// Every operation validates its digest before any network traffic.
/// Lookup failures degrade to "nothing found" so verification keeps
/// answering while the chain is unreachable; submission failures are
/// fatal for `anchor` but only diagnostic for `reconcile`.
pub struct AnchorEngine {
	delivery: Arc<DeliveryService>,
	discovery: Arc<DiscoveryService>,
}

impl AnchorEngine {
	/// Creates an engine over the delivery and discovery services.
	pub fn new(delivery: Arc<DeliveryService>, discovery: Arc<DiscoveryService>) -> Self {
		Self {
			delivery,
			discovery,
		}
	}

	/// Submits an anchoring transaction for the digest.
	pub async fn anchor(&self, bundle_hash: &str) -> Result<AnchorReceipt, EngineError> {
		let hash: BundleHash = bundle_hash.parse()?;
		let receipt = self.delivery.submit_with_retry(&hash).await?;
		Ok(receipt)
	}

	/// Checks chain history for an existing anchor of the digest.
	pub async fn verify(&self, bundle_hash: &str) -> Result<ChainMatch, EngineError> {
		let hash: BundleHash = bundle_hash.parse()?;
		Ok(self.lookup(&hash).await)
	}

	/// Verifies the digest, anchors it if absent, then verifies again.
	///
	/// Read-only deployments skip the submission leg and report whatever
	/// verification found. After a successful submission the re-check may
	/// still miss the fresh event because of log indexing lag; in that
	/// case the submission receipt itself backs the reported match. A
	/// failed submission degrades to "no match" with a warning instead of
	/// an error, so callers always get a structured outcome.
	pub async fn reconcile(&self, bundle_hash: &str) -> Result<ChainMatch, EngineError> {
		let hash: BundleHash = bundle_hash.parse()?;

		let existing = self.lookup(&hash).await;
		if existing.matched {
			return Ok(existing);
		}

		if self.delivery.is_read_only() {
			tracing::info!(
				bundle_hash = %short_hex(bundle_hash),
				"No anchor found and no signing key configured, skipping submission"
			);
			return Ok(ChainMatch::no_match());
		}

		let receipt = match self.delivery.submit_with_retry(&hash).await {
			Ok(receipt) => receipt,
			Err(e) => {
				tracing::warn!(
					bundle_hash = %short_hex(bundle_hash),
					error = %e,
					"Anchor submission during reconcile failed"
				);
				return Ok(ChainMatch::no_match());
			},
		};

		let confirmed = self.lookup(&hash).await;
		if confirmed.matched {
			return Ok(confirmed);
		}

		tracing::warn!(
			tx_id = %receipt.tx_id,
			"Anchor submitted but not yet visible in scan, reporting from receipt"
		);
		Ok(ChainMatch::found(receipt.tx_id, Utc::now()))
	}

	/// Runs discovery, degrading failures to the no-match outcome.
	async fn lookup(&self, hash: &BundleHash) -> ChainMatch {
		match self.discovery.find_anchor(hash).await {
			Ok(outcome) => outcome,
			Err(e) => {
				tracing::warn!(error = %e, "Anchor lookup failed, treating as not found");
				ChainMatch::no_match()
			},
		}
	}
}
