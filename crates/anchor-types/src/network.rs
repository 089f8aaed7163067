//! Network and contract configuration for the anchoring chain.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default JSON-RPC endpoint, pointing at the Flare Coston2 testnet.
fn default_rpc_url() -> String {
	"https://coston2-api.flare.network/ext/C/rpc".to_string()
}

/// Default number of historical blocks the scanner may cover.
fn default_lookback_blocks() -> u64 {
	1000
}

/// Default timeout applied to individual RPC calls, in seconds.
fn default_rpc_timeout_seconds() -> u64 {
	30
}

/// Connection settings for the chain hosting the anchoring contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
	/// JSON-RPC endpoint of the chain.
	#[serde(default = "default_rpc_url")]
	pub rpc_url: String,
	/// Address of the deployed anchoring contract.
	pub contract_address: String,
	/// Optional path to a JSON ABI file overriding the built-in surface.
	#[serde(default)]
	pub abi_path: Option<PathBuf>,
	/// How many blocks behind the head the event scanner may look.
	#[serde(default = "default_lookback_blocks")]
	pub lookback_blocks: u64,
	/// Timeout applied to individual RPC calls, in seconds.
	#[serde(default = "default_rpc_timeout_seconds")]
	pub rpc_timeout_seconds: u64,
}
