//! Command-line entry point for the cross-swap engine.
//!
//! Loads the configuration, builds the engine with every compiled-in
//! implementation, composes a quote for a JSON request and prints the
//! composed quote together with either the direct transaction or a
//! gasless-approval payload.

use alloy_primitives::U256;
use clap::Parser;
use serde::Serialize;
use std::path::PathBuf;
use swap_config::{Config, ConfigError};
use swap_core::{
	BuilderError, CrossSwapEngine, CrossSwapError, CrossSwapRequest, EngineBuilder,
	SignablePayload,
};
use swap_types::{CrossSwapQuotes, CrossSwapTx, CrossSwapType};
use thiserror::Error;

mod factory_registry;

/// Command-line arguments for the cross-swap service.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
	/// Path to configuration file
	#[arg(short, long, default_value = "config.toml")]
	config: PathBuf,

	/// Log level (trace, debug, info, warn, error)
	#[arg(short, long, default_value = "info")]
	log_level: String,

	/// Path to a JSON cross-swap request
	#[arg(short, long)]
	request: PathBuf,

	/// 2-byte hex integrator id appended to the transaction calldata
	#[arg(long)]
	integrator_id: Option<String>,

	/// Build a permit payload valid until this unix time instead of a
	/// direct transaction
	#[arg(long, conflicts_with = "authorization_valid_before")]
	permit_deadline: Option<u64>,

	/// Build a transfer-authorization payload valid until this unix time
	/// instead of a direct transaction
	#[arg(long)]
	authorization_valid_before: Option<u64>,
}

#[derive(Debug, Error)]
enum ServiceError {
	#[error("Configuration error: {0}")]
	Config(#[from] ConfigError),
	#[error("Engine error: {0}")]
	Builder(#[from] BuilderError),
	#[error(transparent)]
	CrossSwap(#[from] CrossSwapError),
	#[error("Request error: {0}")]
	Request(String),
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct QuoteResponse {
	cross_swap_type: CrossSwapType,
	quotes: CrossSwapQuotes,
	#[serde(skip_serializing_if = "Option::is_none")]
	transaction: Option<CrossSwapTx>,
	#[serde(skip_serializing_if = "Option::is_none")]
	signable: Option<SignablePayload>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let args = Args::parse();

	use tracing_subscriber::{fmt, EnvFilter};

	let env_filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
	// Logs go to stderr so stdout stays valid JSON.
	fmt()
		.with_env_filter(env_filter)
		.with_thread_ids(true)
		.with_target(true)
		.with_writer(std::io::stderr)
		.init();

	let response = run(&args).await?;
	println!("{}", serde_json::to_string_pretty(&response)?);
	Ok(())
}

async fn run(args: &Args) -> Result<QuoteResponse, ServiceError> {
	let config_path = args
		.config
		.to_str()
		.ok_or_else(|| ServiceError::Request(format!("Invalid config path: {:?}", args.config)))?;
	let config = Config::from_file(config_path).await?;
	tracing::info!("Loaded configuration [{}]", config.engine.id);

	let engine = EngineBuilder::new(config).build(factory_registry::engine_factories())?;
	let request = read_request(&args.request).await?;
	respond(&engine, &request, args).await
}

async fn read_request(path: &PathBuf) -> Result<CrossSwapRequest, ServiceError> {
	let raw = tokio::fs::read_to_string(path)
		.await
		.map_err(|e| ServiceError::Request(format!("Failed to read {:?}: {}", path, e)))?;
	serde_json::from_str(&raw)
		.map_err(|e| ServiceError::Request(format!("Invalid request {:?}: {}", path, e)))
}

async fn respond(
	engine: &CrossSwapEngine,
	request: &CrossSwapRequest,
	args: &Args,
) -> Result<QuoteResponse, ServiceError> {
	let cross_swap = engine.resolve_request(request)?;
	let quotes = engine.compose_quote(&cross_swap).await?;

	let (transaction, signable) = match (args.permit_deadline, args.authorization_valid_before) {
		(Some(deadline), _) => {
			let payload = engine
				.build_permit_payload(&quotes, U256::from(deadline))
				.await?;
			(None, Some(payload))
		},
		(None, Some(valid_before)) => {
			let payload = engine
				.build_authorization_payload(&quotes, U256::from(valid_before), None)
				.await?;
			(None, Some(payload))
		},
		(None, None) => {
			let tx = engine
				.build_transaction(&quotes, args.integrator_id.as_deref())
				.await?;
			(Some(tx), None)
		},
	};

	Ok(QuoteResponse {
		cross_swap_type: quotes.cross_swap_type(),
		quotes,
		transaction,
		signable,
	})
}
