//! Configuration for the evidence anchoring system.
//!
//! Configuration is loaded from TOML files. Values may reference
//! environment variables with `${VAR_NAME}` or `${VAR_NAME:-default}`,
//! which keeps key material out of the file itself. Parsed configurations
//! are validated before use so misconfiguration fails at startup rather
//! than mid-submission.

use anchor_types::{without_0x_prefix, NetworkConfig, Secret};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

/// Errors that can occur during configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Error that occurs during file I/O operations.
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
	/// Error that occurs when parsing TOML configuration.
	#[error("Configuration error: {0}")]
	Parse(String),
	/// Error that occurs when configuration validation fails.
	#[error("Validation error: {0}")]
	Validation(String),
}

impl From<toml::de::Error> for ConfigError {
	fn from(err: toml::de::Error) -> Self {
		// Extract just the message without the input dump
		ConfigError::Parse(err.message().to_string())
	}
}

/// Top-level configuration for the anchoring system.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
	/// Chain and contract settings.
	pub network: NetworkConfig,
	/// Signing key settings. Absent means the system runs read-only
	/// and can verify but never anchor.
	#[serde(default)]
	pub signer: Option<SignerConfig>,
}

/// Settings for the transaction signing key.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SignerConfig {
	/// Hex-encoded private key, usually injected via `${...}` expansion.
	pub private_key: Secret,
}

/// Resolves environment variables in a string.
///
/// Replaces ${VAR_NAME} with the value of the environment variable VAR_NAME.
/// Supports default values with ${VAR_NAME:-default_value}.
///
/// Input strings are limited to 1MB to prevent ReDoS attacks.
pub(crate) fn resolve_env_vars(input: &str) -> Result<String, ConfigError> {
	const MAX_INPUT_SIZE: usize = 1024 * 1024; // 1MB
	if input.len() > MAX_INPUT_SIZE {
		return Err(ConfigError::Validation(format!(
			"Configuration file too large: {} bytes (max: {} bytes)",
			input.len(),
			MAX_INPUT_SIZE
		)));
	}

	let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]{0,127})(?::-([^}]{0,256}))?\}")
		.map_err(|e| ConfigError::Parse(format!("Regex error: {}", e)))?;

	let mut result = input.to_string();
	let mut replacements = Vec::new();

	for cap in re.captures_iter(input) {
		let full_match = match cap.get(0) {
			Some(m) => m,
			None => continue,
		};
		let var_name = match cap.get(1) {
			Some(m) => m.as_str(),
			None => continue,
		};
		let default_value = cap.get(2).map(|m| m.as_str());

		let value = match std::env::var(var_name) {
			Ok(v) => v,
			Err(_) => match default_value {
				Some(default) => default.to_string(),
				None => {
					return Err(ConfigError::Validation(format!(
						"Environment variable '{}' not found",
						var_name
					)))
				},
			},
		};

		replacements.push((full_match.start(), full_match.end(), value));
	}

	// Apply replacements in reverse order to maintain positions
	for (start, end, value) in replacements.iter().rev() {
		result.replace_range(start..end, value);
	}

	Ok(result)
}

/// Returns true if the value is a 0x-prefixed 20-byte hex address.
fn is_hex_address(value: &str) -> bool {
	if !value.starts_with("0x") && !value.starts_with("0X") {
		return false;
	}
	let payload = without_0x_prefix(value);
	payload.len() == 40 && payload.chars().all(|c| c.is_ascii_hexdigit())
}

impl Config {
	/// Loads configuration from a file, resolving environment variables.
	pub async fn from_file(path: &Path) -> Result<Self, ConfigError> {
		let raw = tokio::fs::read_to_string(path).await?;
		raw.parse()
	}

	/// Returns true when no signing key is configured.
	pub fn read_only(&self) -> bool {
		self.signer.is_none()
	}

	/// Validates the configuration to ensure all required fields are properly set.
	///
	/// Checks that the RPC endpoint is an HTTP URL, the contract address has
	/// the right shape, the scanner bounds are usable and, if a signer section
	/// is present, that it actually carries a key.
	fn validate(&self) -> Result<(), ConfigError> {
		if !self.network.rpc_url.starts_with("http://")
			&& !self.network.rpc_url.starts_with("https://")
		{
			return Err(ConfigError::Validation(format!(
				"rpc_url must be an http(s) URL, got '{}'",
				self.network.rpc_url
			)));
		}

		if self.network.contract_address.is_empty() {
			return Err(ConfigError::Validation(
				"contract_address cannot be empty".into(),
			));
		}
		if !is_hex_address(&self.network.contract_address) {
			return Err(ConfigError::Validation(format!(
				"contract_address '{}' is not a 0x-prefixed 20-byte hex address",
				self.network.contract_address
			)));
		}

		if self.network.lookback_blocks == 0 {
			return Err(ConfigError::Validation(
				"lookback_blocks must be greater than 0".into(),
			));
		}
		if self.network.rpc_timeout_seconds == 0 {
			return Err(ConfigError::Validation(
				"rpc_timeout_seconds must be greater than 0".into(),
			));
		}

		if let Some(signer) = &self.signer {
			if signer.private_key.is_empty() {
				return Err(ConfigError::Validation(
					"signer.private_key cannot be empty".into(),
				));
			}
		}

		Ok(())
	}
}

/// Implementation of FromStr for Config to enable parsing from string.
///
/// Environment variables are resolved and the configuration is validated
/// after parsing.
impl FromStr for Config {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let resolved = resolve_env_vars(s)?;
		let config: Config = toml::from_str(&resolved)?;
		config.validate()?;
		Ok(config)
	}
}
