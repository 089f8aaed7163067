//! Verification outcomes reported after scanning chain history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Result of checking the chain for an existing anchor of a bundle hash.
///
/// `matched == false` with empty fields is the universal "not found" shape.
/// It is also what degraded lookups report: a scan that failed over RPC is
/// treated as nothing found rather than surfaced as an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainMatch {
	/// Whether an anchoring event for the hash was found on chain.
	pub matched: bool,
	/// Transaction hash of the anchoring transaction, when matched.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub tx_id: Option<String>,
	/// UTC timestamp of the anchoring block, when matched.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub anchored_at: Option<DateTime<Utc>>,
}

impl ChainMatch {
	/// A successful match backed by a transaction.
	pub fn found(tx_id: String, anchored_at: DateTime<Utc>) -> Self {
		Self {
			matched: true,
			tx_id: Some(tx_id),
			anchored_at: Some(anchored_at),
		}
	}

	/// The canonical "nothing found" outcome.
	pub fn no_match() -> Self {
		Self {
			matched: false,
			tx_id: None,
			anchored_at: None,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_no_match_serializes_without_optionals() {
		let json = serde_json::to_string(&ChainMatch::no_match()).unwrap();
		assert_eq!(json, r#"{"matched":false}"#);
	}

	#[test]
	fn test_found_carries_details() {
		let at = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
		let m = ChainMatch::found("0xabc".to_string(), at);
		assert!(m.matched);

		let json = serde_json::to_string(&m).unwrap();
		assert!(json.contains(r#""tx_id":"0xabc""#));
		assert!(json.contains("anchored_at"));
	}

	#[test]
	fn test_deserialize_bare_no_match() {
		let m: ChainMatch = serde_json::from_str(r#"{"matched":false}"#).unwrap();
		assert_eq!(m, ChainMatch::no_match());
	}
}
