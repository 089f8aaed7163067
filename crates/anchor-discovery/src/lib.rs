//! Anchor discovery module for the evidence anchoring system.
//!
//! This module handles the search for existing anchors in chain history.
//! It scans the anchoring contract's event logs backward from the chain
//! head in bounded windows and matches candidate logs against the bundle
//! digest being verified.

use anchor_chain::ChainError;
use anchor_types::{BundleHash, ChainMatch};
use async_trait::async_trait;
use thiserror::Error;

/// Re-export implementations
pub mod implementations {
	pub mod evm {
		pub mod alloy;
	}
}

/// Matching candidate logs against a bundle digest.
pub mod matcher;
/// Backward windowed walk over event logs.
pub mod scanner;

/// Errors that can occur during anchor discovery operations.
#[derive(Debug, Error)]
pub enum DiscoveryError {
	/// The chain connection could not be resolved.
	#[error("Connection error: {0}")]
	Connection(#[from] ChainError),
	/// Error that occurs during network communication.
	#[error("Network error: {0}")]
	Network(String),
}

/// Trait defining the interface for anchor lookups.
///
/// An implementation owns the whole lookup: walking chain history,
/// matching candidate logs and shaping the outcome.
#[async_trait]
pub trait DiscoveryInterface: Send + Sync {
	/// Searches chain history for an anchoring event carrying the digest.
	///
	/// Returns the match from the newest window that contains one, or the
	/// no-match outcome when the lookback range is exhausted.
	async fn find_anchor(&self, hash: &BundleHash) -> Result<ChainMatch, DiscoveryError>;
}

/// Service that manages anchor discovery.
pub struct DiscoveryService {
	implementation: Box<dyn DiscoveryInterface>,
}

impl DiscoveryService {
	/// Creates a new DiscoveryService with the specified implementation.
	pub fn new(implementation: Box<dyn DiscoveryInterface>) -> Self {
		Self { implementation }
	}

	/// Searches chain history for an existing anchor of the digest.
	pub async fn find_anchor(&self, hash: &BundleHash) -> Result<ChainMatch, DiscoveryError> {
		self.implementation.find_anchor(hash).await
	}
}
