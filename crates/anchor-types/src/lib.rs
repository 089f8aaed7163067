//! Common types for the evidence anchoring system.
//!
//! This crate defines the data shapes passed between the anchoring
//! components: validated bundle hashes, assembled transactions, chain
//! verification outcomes and shared configuration blocks. Keeping them
//! in one place keeps the service crates decoupled from each other.

/// Validated 32-byte bundle digests and their string form.
pub mod hash;
/// Network and contract configuration shared by the chain services.
pub mod network;
/// Redacted wrapper for signing key material.
pub mod secret;
/// Transaction shapes produced while assembling a submission.
pub mod transaction;
/// Utility functions for hex string handling.
pub mod utils;
/// Verification outcomes reported after scanning chain history.
pub mod verification;

// Re-export all types for convenient access
pub use hash::{BundleHash, BundleHashError};
pub use network::NetworkConfig;
pub use secret::Secret;
pub use transaction::{AnchorReceipt, FeeStrategy, PendingTransaction};
pub use utils::{short_hex, with_0x_prefix, without_0x_prefix};
pub use verification::ChainMatch;
