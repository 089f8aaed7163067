//! Bundle hash parsing and validation.
//!
//! An anchoring request identifies its evidence bundle by a 32-byte digest,
//! transported as a `0x`-prefixed 64-character hex string. Parsing is
//! strict: anything that is not exactly that shape is rejected before any
//! network traffic happens.

use alloy_primitives::B256;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors produced when parsing a bundle hash from its string form.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BundleHashError {
	/// The string does not start with `0x` or `0X`.
	#[error("bundle hash must start with 0x")]
	MissingPrefix,
	/// The payload after the prefix is not 64 characters long.
	#[error("bundle hash must contain 64 hex characters, got {0}")]
	InvalidLength(usize),
	/// The payload contains characters outside `[0-9a-fA-F]`.
	#[error("bundle hash contains non-hex characters")]
	InvalidHex,
}

/// A validated 32-byte evidence bundle digest.
///
/// Values are only constructed through strict parsing or from raw 32-byte
/// arrays, so holding a `BundleHash` means the shape check already passed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BundleHash([u8; 32]);

impl BundleHash {
	/// Wraps raw digest bytes.
	pub fn new(bytes: [u8; 32]) -> Self {
		Self(bytes)
	}

	/// Returns the digest bytes.
	pub fn as_bytes(&self) -> &[u8; 32] {
		&self.0
	}

	/// Converts into the fixed-size word used in call data and event data.
	pub fn to_b256(&self) -> B256 {
		B256::from(self.0)
	}
}

impl FromStr for BundleHash {
	type Err = BundleHashError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let payload = s
			.strip_prefix("0x")
			.or_else(|| s.strip_prefix("0X"))
			.ok_or(BundleHashError::MissingPrefix)?;
		if payload.len() != 64 {
			return Err(BundleHashError::InvalidLength(payload.len()));
		}
		let mut bytes = [0u8; 32];
		hex::decode_to_slice(payload, &mut bytes).map_err(|_| BundleHashError::InvalidHex)?;
		Ok(Self(bytes))
	}
}

impl fmt::Display for BundleHash {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "0x{}", hex::encode(self.0))
	}
}

impl From<B256> for BundleHash {
	fn from(word: B256) -> Self {
		Self(word.0)
	}
}

impl From<BundleHash> for B256 {
	fn from(hash: BundleHash) -> Self {
		hash.to_b256()
	}
}

// Serialized as the canonical lowercase 0x-prefixed string.
impl Serialize for BundleHash {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		serializer.serialize_str(&self.to_string())
	}
}

impl<'de> Deserialize<'de> for BundleHash {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: Deserializer<'de>,
	{
		let s = String::deserialize(deserializer)?;
		s.parse().map_err(serde::de::Error::custom)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	const SAMPLE: &str = "0x4aa2f6fa5e77b1cbbb1dcbb72115e6fa2aad68a7d4ais64c4f4c6c2fb4d7a1b2";
	const VALID: &str = "0x4aa2f6fa5e77b1cbbb1dcbb72115e6fa2aad68a7d4a564c4f4c6c2fb4d7a1b29";

	#[test]
	fn test_parse_valid_hash() {
		let hash: BundleHash = VALID.parse().unwrap();
		assert_eq!(hash.to_string(), VALID);
	}

	#[test]
	fn test_parse_uppercase_payload() {
		let upper = format!("0x{}", VALID[2..].to_uppercase());
		let hash: BundleHash = upper.parse().unwrap();
		// Display always renders lowercase
		assert_eq!(hash.to_string(), VALID);
	}

	#[test]
	fn test_parse_uppercase_prefix() {
		let prefixed = format!("0X{}", &VALID[2..]);
		assert!(prefixed.parse::<BundleHash>().is_ok());
	}

	#[test]
	fn test_reject_missing_prefix() {
		let bare = &VALID[2..];
		assert_eq!(
			bare.parse::<BundleHash>(),
			Err(BundleHashError::MissingPrefix)
		);
	}

	#[test]
	fn test_reject_wrong_length() {
		let short = &VALID[..VALID.len() - 1];
		assert_eq!(
			short.parse::<BundleHash>(),
			Err(BundleHashError::InvalidLength(63))
		);

		let long = format!("{}0", VALID);
		assert_eq!(
			long.parse::<BundleHash>(),
			Err(BundleHashError::InvalidLength(65))
		);

		assert_eq!(
			"0x".parse::<BundleHash>(),
			Err(BundleHashError::InvalidLength(0))
		);
	}

	#[test]
	fn test_reject_non_hex_characters() {
		assert_eq!(SAMPLE.parse::<BundleHash>(), Err(BundleHashError::InvalidHex));
	}

	#[test]
	fn test_reject_empty_string() {
		assert_eq!(
			"".parse::<BundleHash>(),
			Err(BundleHashError::MissingPrefix)
		);
	}

	#[test]
	fn test_b256_round_trip() {
		let hash: BundleHash = VALID.parse().unwrap();
		let word: B256 = hash.into();
		assert_eq!(BundleHash::from(word), hash);
	}

	#[test]
	fn test_serde_string_form() {
		let hash: BundleHash = VALID.parse().unwrap();
		let json = serde_json::to_string(&hash).unwrap();
		assert_eq!(json, format!("\"{}\"", VALID));

		let back: BundleHash = serde_json::from_str(&json).unwrap();
		assert_eq!(back, hash);
	}
}
