//! Chain connection module for the evidence anchoring system.
//!
//! This crate owns everything needed to reach the anchoring contract: the
//! JSON-RPC provider, the parsed contract address and the selector surface
//! derived from the contract ABI. Resolution is lazy and failure is not
//! cached, so a connection that could not come up on one call can still
//! succeed on the next.

use thiserror::Error;

/// Lazily initialized connection to the anchoring chain.
pub mod connection;
/// Anchoring contract selectors and call data encoding.
pub mod contract;

pub use connection::{ChainConnection, ContractBinding, HttpProvider};
pub use contract::AnchorAbi;

/// Errors that can occur while resolving the chain connection.
///
/// All of these are configuration-class failures. Callers treat them as
/// permanent and never retry them.
#[derive(Debug, Error)]
pub enum ChainError {
	/// The configured RPC endpoint is not a parseable URL.
	#[error("Invalid RPC URL '{0}': {1}")]
	InvalidRpcUrl(String, String),
	/// The configured contract address is not a 20-byte hex address.
	#[error("Invalid contract address '{0}'")]
	InvalidContractAddress(String),
	/// A configured ABI file could not be read.
	#[error("Failed to read ABI file {path}: {reason}")]
	AbiFile { path: String, reason: String },
	/// A configured ABI file is not valid JSON ABI.
	#[error("Failed to parse ABI file {path}: {reason}")]
	AbiParse { path: String, reason: String },
	/// The ABI does not describe the anchoring surface.
	#[error("ABI is missing {kind} '{name}'")]
	AbiMissingMember { kind: &'static str, name: String },
}
