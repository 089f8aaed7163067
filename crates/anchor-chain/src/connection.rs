//! Lazily initialized chain connection.
//!
//! Construction is cheap and infallible. The RPC endpoint, contract
//! address and ABI are resolved on the first `binding()` call, and a
//! failed resolution is not cached, so later calls get a fresh attempt.

use alloy_primitives::Address;
use alloy_provider::RootProvider;
use alloy_transport_http::Http;
use anchor_types::NetworkConfig;
use reqwest::Client;
use std::str::FromStr;
use tokio::sync::OnceCell;

use crate::contract::AnchorAbi;
use crate::ChainError;

/// HTTP provider type shared by the chain services.
pub type HttpProvider = RootProvider<Http<Client>>;

/// Resolved handles for talking to the anchoring contract.
#[derive(Debug)]
pub struct ContractBinding {
	/// JSON-RPC provider over HTTP.
	pub provider: HttpProvider,
	/// Parsed contract address.
	pub address: Address,
	/// Selector surface of the contract.
	pub abi: AnchorAbi,
}

/// Shared connection to the anchoring chain.
pub struct ChainConnection {
	settings: NetworkConfig,
	cell: OnceCell<ContractBinding>,
}

impl ChainConnection {
	/// Creates a connection from network settings without touching the
	/// network.
	pub fn new(settings: NetworkConfig) -> Self {
		Self {
			settings,
			cell: OnceCell::new(),
		}
	}

	/// The settings this connection was built from.
	pub fn settings(&self) -> &NetworkConfig {
		&self.settings
	}

	/// Returns the resolved binding, initializing it on first use.
	///
	/// Only a successful resolution is cached. Concurrent callers share a
	/// single initialization attempt.
	pub async fn binding(&self) -> Result<&ContractBinding, ChainError> {
		self.cell.get_or_try_init(|| self.initialize()).await
	}

	async fn initialize(&self) -> Result<ContractBinding, ChainError> {
		let url: reqwest::Url = self.settings.rpc_url.parse().map_err(|e| {
			ChainError::InvalidRpcUrl(self.settings.rpc_url.clone(), format!("{}", e))
		})?;
		let provider = RootProvider::new_http(url);

		let address = Address::from_str(&self.settings.contract_address).map_err(|_| {
			ChainError::InvalidContractAddress(self.settings.contract_address.clone())
		})?;

		let abi = match &self.settings.abi_path {
			Some(path) => AnchorAbi::from_file(path)?,
			None => AnchorAbi::builtin(),
		};

		tracing::debug!(
			rpc_url = %self.settings.rpc_url,
			contract = %self.settings.contract_address,
			"Initialized chain connection"
		);

		Ok(ContractBinding {
			provider,
			address,
			abi,
		})
	}
}
