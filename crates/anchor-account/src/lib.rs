//! Account management module for the evidence anchoring system.
//!
//! This module wraps the local signing key: parsing it from configuration,
//! deriving the sender address and holding the wallet handle used to sign
//! anchoring submissions. The key itself never leaves this crate in
//! readable form.

use alloy_network::EthereumWallet;
use alloy_primitives::Address;
use alloy_signer_local::PrivateKeySigner;
use anchor_types::{without_0x_prefix, Secret};
use thiserror::Error;

/// Errors that can occur during account operations.
#[derive(Debug, Error)]
pub enum AccountError {
	/// Error that occurs when a cryptographic key is invalid or malformed.
	#[error("Invalid key: {0}")]
	InvalidKey(String),
}

/// Local signing account derived from a configured private key.
///
/// Holds the derived sender address and the wallet used to build signed
/// transaction envelopes.
pub struct AccountService {
	address: Address,
	wallet: EthereumWallet,
}

impl AccountService {
	/// Parses a hex-encoded private key into a usable account.
	///
	/// Accepts the key with or without a 0x prefix. The error message never
	/// carries key material.
	pub fn from_key(key: &Secret) -> Result<Self, AccountError> {
		let signer = key
			.with_exposed(|raw| without_0x_prefix(raw).parse::<PrivateKeySigner>())
			.map_err(|_| AccountError::InvalidKey("not a valid secp256k1 private key".into()))?;

		let address = signer.address();
		let wallet = EthereumWallet::from(signer);
		Ok(Self { address, wallet })
	}

	/// The sender address derived from the key.
	pub fn address(&self) -> Address {
		self.address
	}

	/// The wallet used to sign transaction envelopes.
	pub fn wallet(&self) -> &EthereumWallet {
		&self.wallet
	}
}

impl std::fmt::Debug for AccountService {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("AccountService")
			.field("address", &self.address)
			.finish_non_exhaustive()
	}
}
