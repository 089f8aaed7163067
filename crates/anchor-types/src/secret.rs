//! Redacted wrapper for signing key material.
//!
//! Private keys reach this system through configuration. `Secret` keeps
//! them out of logs and serialized output, and zeroes the backing memory
//! on drop.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use zeroize::Zeroizing;

/// A string whose value must never appear in logs or output.
///
/// Debug, Display and Serialize all render a redaction marker. The only
/// way to read the value is `expose` or `with_exposed`, which keeps every
/// access easy to audit.
#[derive(Clone)]
pub struct Secret(Zeroizing<String>);

impl Secret {
	/// Wraps sensitive string data.
	pub fn new(value: String) -> Self {
		Self(Zeroizing::new(value))
	}

	/// Exposes the underlying value.
	///
	/// Callers must not log or persist the returned slice.
	pub fn expose(&self) -> &str {
		&self.0
	}

	/// Runs a closure over the underlying value, limiting its scope.
	pub fn with_exposed<F, R>(&self, f: F) -> R
	where
		F: FnOnce(&str) -> R,
	{
		f(&self.0)
	}

	/// Returns true if nothing was configured.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}

impl From<String> for Secret {
	fn from(value: String) -> Self {
		Self::new(value)
	}
}

impl fmt::Debug for Secret {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "Secret(***REDACTED***)")
	}
}

impl fmt::Display for Secret {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "***REDACTED***")
	}
}

impl PartialEq for Secret {
	fn eq(&self, other: &Self) -> bool {
		self.0.as_str() == other.0.as_str()
	}
}

impl Eq for Secret {}

// Serialization always redacts; values never round-trip back out.
impl Serialize for Secret {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		serializer.serialize_str("***REDACTED***")
	}
}

impl<'de> Deserialize<'de> for Secret {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: Deserializer<'de>,
	{
		let value = String::deserialize(deserializer)?;
		Ok(Secret::new(value))
	}
}
