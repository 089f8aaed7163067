//! Command-line entry point for the evidence anchoring service.
//!
//! This binary wires the chain connection, signing account, and the
//! delivery and discovery services into the anchoring engine, then runs
//! one of the three operator commands: anchor, verify or reconcile.
//! Results are printed as JSON on stdout so the commands compose with
//! shell tooling.

use anchor_account::AccountService;
use anchor_chain::ChainConnection;
use anchor_config::Config;
use anchor_core::AnchorEngine;
use anchor_delivery::DeliveryService;
use anchor_discovery::DiscoveryService;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

// Import implementations from individual crates
use anchor_delivery::implementations::evm::alloy::AlloyDelivery;
use anchor_discovery::implementations::evm::alloy::AlloyDiscovery;

/// Command-line arguments for the anchoring service.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
	/// Path to configuration file
	#[arg(short, long, default_value = "config.toml")]
	config: PathBuf,

	/// Log level (trace, debug, info, warn, error)
	#[arg(short, long, default_value = "info")]
	log_level: String,

	#[command(subcommand)]
	command: Command,
}

/// Operator commands over evidence bundle hashes.
#[derive(Subcommand, Debug)]
enum Command {
	/// Submit an anchoring transaction for a bundle hash
	Anchor {
		/// 32-byte bundle hash, 0x-prefixed hex
		bundle_hash: String,
	},
	/// Search chain history for an existing anchor of a bundle hash
	Verify {
		/// 32-byte bundle hash, 0x-prefixed hex
		bundle_hash: String,
	},
	/// Verify a bundle hash, anchor it if absent, then verify again
	Reconcile {
		/// 32-byte bundle hash, 0x-prefixed hex
		bundle_hash: String,
	},
}

/// Main entry point for the anchoring service.
///
/// This function:
/// 1. Parses command-line arguments
/// 2. Initializes logging infrastructure
/// 3. Loads and validates configuration from file
/// 4. Builds the anchoring engine with the EVM implementations
/// 5. Runs the requested command and prints its result as JSON
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let args = Args::parse();

	// Initialize tracing with env filter
	use tracing_subscriber::{fmt, EnvFilter};

	// Create env filter with default from args
	let default_directive = args.log_level.to_string();
	let env_filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

	fmt()
		.with_env_filter(env_filter)
		.with_thread_ids(true)
		.with_target(true)
		.init();

	let config = Config::from_file(&args.config).await?;
	tracing::info!(
		config = %args.config.display(),
		read_only = config.read_only(),
		"Loaded configuration"
	);

	let engine = build_engine(&config)?;

	let output = match args.command {
		Command::Anchor { bundle_hash } => {
			serde_json::to_string_pretty(&engine.anchor(&bundle_hash).await?)?
		},
		Command::Verify { bundle_hash } => {
			serde_json::to_string_pretty(&engine.verify(&bundle_hash).await?)?
		},
		Command::Reconcile { bundle_hash } => {
			serde_json::to_string_pretty(&engine.reconcile(&bundle_hash).await?)?
		},
	};

	println!("{}", output);
	Ok(())
}

/// Builds the anchoring engine from a validated configuration.
///
/// This function wires up the concrete implementations:
/// - A lazily initialized chain connection shared by both services
/// - Delivery through Alloy transaction submission, when a signer is configured
/// - Discovery through Alloy event log scanning
fn build_engine(config: &Config) -> Result<AnchorEngine, Box<dyn std::error::Error>> {
	let connection = Arc::new(ChainConnection::new(config.network.clone()));

	let account = match &config.signer {
		Some(signer) => Some(AccountService::from_key(&signer.private_key)?),
		None => {
			tracing::info!("No signing key configured, submissions are disabled");
			None
		},
	};

	let delivery = DeliveryService::new(Box::new(AlloyDelivery::new(
		Arc::clone(&connection),
		account,
	)));
	let discovery = DiscoveryService::new(Box::new(AlloyDiscovery::new(connection)));

	Ok(AnchorEngine::new(Arc::new(delivery), Arc::new(discovery)))
}
