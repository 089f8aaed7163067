//! Utility functions for hex string handling.
//!
//! Helpers for the 0x prefix convention and for shortening hashes in
//! log output.

/// Adds a "0x" prefix to a hex string if it doesn't already have one.
pub fn with_0x_prefix(hex_str: &str) -> String {
	if hex_str.starts_with("0x") || hex_str.starts_with("0X") {
		hex_str.to_string()
	} else {
		format!("0x{}", hex_str)
	}
}

/// Removes a "0x" or "0X" prefix from a hex string if present.
pub fn without_0x_prefix(hex_str: &str) -> &str {
	hex_str
		.strip_prefix("0x")
		.or_else(|| hex_str.strip_prefix("0X"))
		.unwrap_or(hex_str)
}

/// Shortens a hash for log output.
///
/// Shows the first ten characters followed by ".." for longer strings,
/// enough to recognize a hash without flooding the log line.
pub fn short_hex(value: &str) -> String {
	if value.len() <= 10 {
		value.to_string()
	} else {
		format!("{}..", &value[..10])
	}
}
