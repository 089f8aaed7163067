//! Anchoring contract selectors and call data encoding.
//!
//! The system talks to exactly one function and watches exactly one event.
//! Both are compiled in, and both can be overridden by a JSON ABI file when
//! the deployed contract was built from different sources.

use alloy_json_abi::JsonAbi;
use alloy_primitives::{Bytes, B256};
use alloy_sol_types::{sol, SolCall, SolEvent};
use anchor_types::BundleHash;
use std::path::Path;

use crate::ChainError;

sol! {
	/// Records a bundle digest on chain.
	function anchorEvidence(bytes32 bundleHash);

	/// Emitted once per anchoring call. The digest travels in the data
	/// section of the log, not in a topic.
	event EvidenceAnchored(bytes32 bundleHash, address indexed sender, uint256 ts);
}

/// Resolved selector surface of the anchoring contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnchorAbi {
	/// Four-byte selector of the anchoring function.
	pub function_selector: [u8; 4],
	/// keccak topic of the anchoring event.
	pub event_topic: B256,
}

impl AnchorAbi {
	/// Name of the function that records a digest.
	pub const FUNCTION_NAME: &'static str = "anchorEvidence";
	/// Name of the event emitted per anchoring call.
	pub const EVENT_NAME: &'static str = "EvidenceAnchored";

	/// The compiled-in contract surface.
	pub fn builtin() -> Self {
		Self {
			function_selector: anchorEvidenceCall::SELECTOR,
			event_topic: EvidenceAnchored::SIGNATURE_HASH,
		}
	}

	/// Loads the selector surface from a JSON ABI file.
	///
	/// The file must describe the anchoring function and event by name. A
	/// configured path that cannot be read or parsed is an error, never a
	/// silent fallback to the built-in surface.
	pub fn from_file(path: &Path) -> Result<Self, ChainError> {
		let raw = std::fs::read_to_string(path).map_err(|e| ChainError::AbiFile {
			path: path.display().to_string(),
			reason: e.to_string(),
		})?;
		let abi: JsonAbi = serde_json::from_str(&raw).map_err(|e| ChainError::AbiParse {
			path: path.display().to_string(),
			reason: e.to_string(),
		})?;

		let function = abi
			.function(Self::FUNCTION_NAME)
			.and_then(|overloads| overloads.first())
			.ok_or_else(|| ChainError::AbiMissingMember {
				kind: "function",
				name: Self::FUNCTION_NAME.to_string(),
			})?;
		let event = abi
			.event(Self::EVENT_NAME)
			.and_then(|overloads| overloads.first())
			.ok_or_else(|| ChainError::AbiMissingMember {
				kind: "event",
				name: Self::EVENT_NAME.to_string(),
			})?;

		Ok(Self {
			function_selector: function.selector().0,
			event_topic: event.selector(),
		})
	}

	/// ABI-encodes a call to the anchoring function for the given digest.
	///
	/// The sole argument is a 32-byte word, so the encoding is the selector
	/// followed by the digest itself.
	pub fn encode_anchor_call(&self, hash: &BundleHash) -> Bytes {
		let mut data = Vec::with_capacity(4 + 32);
		data.extend_from_slice(&self.function_selector);
		data.extend_from_slice(hash.as_bytes());
		Bytes::from(data)
	}
}
