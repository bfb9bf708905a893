//! The cross-swap engine.
//!
//! Entry points used by the outer service: classification, quote
//! composition, transaction encoding and gasless-approval payloads. The
//! engine holds no per-request state; every call builds its artifacts from
//! scratch.

use crate::classifier::classify;
use crate::composers::{a2a, a2b, b2a, b2b, ComposeContext};
use crate::routes::RouteRegistry;
use crate::selector::RouteSelector;
use crate::signing::{
	authorization_payload, permit_payload, verify_token_domain, AuthorizationFields,
	PermitFields, SignablePayload,
};
use crate::transaction::{CallTemplate, OriginSwap, SignatureWindow, TransactionBuilder};
use crate::CrossSwapError;
use alloy_primitives::{Address, U256};
use serde::Deserialize;
use std::sync::Arc;
use swap_bridge::BridgeQuoteInterface;
use swap_chain::ChainReaderInterface;
use swap_config::EngineConfig;
use swap_dex::DexStrategyInterface;
use swap_types::utils::u256_serde;
use swap_types::{
	truncate_id, AmountType, CrossSwap, CrossSwapQuotes, CrossSwapTx, CrossSwapType,
};
use tracing::{info, instrument};

/// A cross-swap request as received from the outer layer, with tokens given
/// by address.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrossSwapRequest {
	pub input_token: Address,
	pub origin_chain_id: u64,
	pub output_token: Address,
	pub destination_chain_id: u64,
	#[serde(with = "u256_serde")]
	pub amount: U256,
	pub amount_type: AmountType,
	pub depositor: Address,
	pub recipient: Address,
	#[serde(default)]
	pub refund_address: Option<Address>,
	#[serde(default)]
	pub refund_on_origin: bool,
	#[serde(default)]
	pub is_input_native: bool,
	#[serde(default)]
	pub is_output_native: bool,
	#[serde(default = "default_slippage_tolerance")]
	pub slippage_tolerance: f64,
}

fn default_slippage_tolerance() -> f64 {
	0.5
}

pub struct CrossSwapEngine {
	settings: EngineConfig,
	routes: Arc<RouteRegistry>,
	dex: Arc<dyn DexStrategyInterface>,
	bridge: Arc<dyn BridgeQuoteInterface>,
	chain: Arc<dyn ChainReaderInterface>,
}

impl CrossSwapEngine {
	pub fn new(
		settings: EngineConfig,
		routes: Arc<RouteRegistry>,
		dex: Arc<dyn DexStrategyInterface>,
		bridge: Arc<dyn BridgeQuoteInterface>,
		chain: Arc<dyn ChainReaderInterface>,
	) -> Self {
		Self {
			settings,
			routes,
			dex,
			bridge,
			chain,
		}
	}

	pub fn settings(&self) -> &EngineConfig {
		&self.settings
	}

	pub fn routes(&self) -> &RouteRegistry {
		&self.routes
	}

	pub fn classify(
		&self,
		input_token: Address,
		origin_chain_id: u64,
		output_token: Address,
		destination_chain_id: u64,
	) -> CrossSwapType {
		classify(
			&self.routes,
			input_token,
			origin_chain_id,
			output_token,
			destination_chain_id,
		)
	}

	/// Resolves the request's tokens and checks its parameters.
	pub fn resolve_request(&self, request: &CrossSwapRequest) -> Result<CrossSwap, CrossSwapError> {
		if request.origin_chain_id == request.destination_chain_id {
			return Err(CrossSwapError::InvalidRequest(
				"Origin and destination chains must differ".to_string(),
			));
		}
		if request.amount.is_zero() {
			return Err(CrossSwapError::InvalidRequest(
				"Amount must be greater than zero".to_string(),
			));
		}
		if !(0.0..=100.0).contains(&request.slippage_tolerance) {
			return Err(CrossSwapError::InvalidRequest(format!(
				"Slippage tolerance {} is not a percentage",
				request.slippage_tolerance
			)));
		}

		Ok(CrossSwap {
			input_token: self
				.routes
				.resolve_token(request.input_token, request.origin_chain_id)?,
			output_token: self
				.routes
				.resolve_token(request.output_token, request.destination_chain_id)?,
			amount: request.amount,
			amount_type: request.amount_type,
			depositor: request.depositor,
			recipient: request.recipient,
			refund_address: request.refund_address,
			refund_on_origin: request.refund_on_origin,
			is_input_native: request.is_input_native,
			is_output_native: request.is_output_native,
			slippage_tolerance: request.slippage_tolerance,
		})
	}

	/// Classifies `cross_swap` and runs the matching composer.
	#[instrument(skip_all, fields(
		origin = cross_swap.origin_chain_id(),
		destination = cross_swap.destination_chain_id(),
		amount_type = ?cross_swap.amount_type,
	))]
	pub async fn compose_quote(&self, cross_swap: &CrossSwap) -> Result<CrossSwapQuotes, CrossSwapError> {
		let cross_swap_type = self.classify(
			cross_swap.input_token.address,
			cross_swap.origin_chain_id(),
			cross_swap.output_token.address,
			cross_swap.destination_chain_id(),
		);
		let ctx = ComposeContext {
			routes: &self.routes,
			dex: self.dex.as_ref(),
			bridge: self.bridge.as_ref(),
			indicative_quote_buffer_bps: self.settings.indicative_quote_buffer_bps,
		};

		let quotes = match cross_swap_type {
			CrossSwapType::BridgeableToBridgeable => b2b::compose(&ctx, cross_swap).await?,
			CrossSwapType::BridgeableToAny => b2a::compose(&ctx, cross_swap).await?,
			CrossSwapType::AnyToBridgeable => a2b::compose(&ctx, cross_swap).await?,
			CrossSwapType::AnyToAny => {
				let selector = RouteSelector::new(
					&self.settings.preferred_bridge_tokens,
					self.settings.max_bridge_route_candidates,
				);
				a2a::compose(&ctx, cross_swap, &selector).await?
			},
		};

		if quotes.cross_swap_type() != cross_swap_type {
			return Err(CrossSwapError::InvalidCrossSwapType(format!(
				"classified as {} but composed as {}",
				cross_swap_type,
				quotes.cross_swap_type()
			)));
		}
		if cross_swap.amount_type.is_output_based() && quotes.effective_output() < cross_swap.amount
		{
			return Err(CrossSwapError::QuoteInvariantViolated {
				required: cross_swap.amount,
				min_output: quotes.effective_output(),
			});
		}

		info!(
			cross_swap_type = %cross_swap_type,
			via = %quotes.bridge_quote.input_token.symbol,
			required_input = %quotes.required_input(),
			effective_output = %quotes.effective_output(),
			"Quote composed"
		);
		Ok(quotes)
	}

	fn transactions(&self) -> TransactionBuilder<'_> {
		TransactionBuilder {
			routes: &self.routes,
			dex: self.dex.as_ref(),
			chain: self.chain.as_ref(),
		}
	}

	/// Encodes the direct origin-chain transaction for `quotes`, optionally
	/// tagged with a 2-byte integrator id.
	#[instrument(skip_all, fields(origin = quotes.cross_swap.origin_chain_id()))]
	pub async fn build_transaction(
		&self,
		quotes: &CrossSwapQuotes,
		integrator_id: Option<&str>,
	) -> Result<CrossSwapTx, CrossSwapError> {
		let tx = self.transactions().build(quotes, integrator_id).await?;
		info!(
			to = %tx.to,
			value = %tx.value,
			data = %truncate_id(&tx.data.to_string()),
			"Transaction built"
		);
		Ok(tx)
	}

	/// Permit payload authorising the periphery to pull the input token
	/// until `deadline`.
	#[instrument(skip_all, fields(origin = quotes.cross_swap.origin_chain_id()))]
	pub async fn build_permit_payload(
		&self,
		quotes: &CrossSwapQuotes,
		deadline: U256,
	) -> Result<SignablePayload, CrossSwapError> {
		let cross_swap = &quotes.cross_swap;
		let (chain_id, token, periphery) = self.signing_target(quotes).await?;
		let transactions = self.transactions();

		let (domain, deposit) = tokio::join!(
			verify_token_domain(
				self.chain.as_ref(),
				chain_id,
				token,
				Some(cross_swap.depositor),
				self.settings.default_eip712_version,
			),
			transactions.deposit(quotes),
		);
		let (domain, deposit) = (domain?, deposit?);

		let fields = PermitFields {
			owner: cross_swap.depositor,
			spender: periphery,
			value: quotes.required_input(),
			deadline,
		};
		let template = CallTemplate::new(
			chain_id,
			cross_swap.depositor,
			periphery,
			deposit,
			quotes.origin_swap_quote.as_ref().map(OriginSwap::from),
			SignatureWindow::Permit { deadline },
		);
		let payload = permit_payload(&domain, chain_id, token, &fields, template)?;
		info!(method = payload.call_template.method, digest = %payload.digest, "Permit payload built");
		Ok(payload)
	}

	/// Transfer-authorization payload valid between `valid_after` (default 0)
	/// and `valid_before`.
	#[instrument(skip_all, fields(origin = quotes.cross_swap.origin_chain_id()))]
	pub async fn build_authorization_payload(
		&self,
		quotes: &CrossSwapQuotes,
		valid_before: U256,
		valid_after: Option<U256>,
	) -> Result<SignablePayload, CrossSwapError> {
		let cross_swap = &quotes.cross_swap;
		let valid_after = valid_after.unwrap_or(U256::ZERO);
		if valid_before <= valid_after {
			return Err(CrossSwapError::InvalidRequest(format!(
				"validBefore {} must be after validAfter {}",
				valid_before, valid_after
			)));
		}
		let (chain_id, token, periphery) = self.signing_target(quotes).await?;
		let transactions = self.transactions();

		let (domain, deposit) = tokio::join!(
			verify_token_domain(
				self.chain.as_ref(),
				chain_id,
				token,
				None,
				self.settings.default_eip712_version,
			),
			transactions.deposit(quotes),
		);
		let (domain, deposit) = (domain?, deposit?);

		let fields = AuthorizationFields {
			from: cross_swap.depositor,
			to: periphery,
			value: quotes.required_input(),
			valid_after,
			valid_before,
			nonce: AuthorizationFields::random_nonce(),
		};
		let template = CallTemplate::new(
			chain_id,
			cross_swap.depositor,
			periphery,
			deposit,
			quotes.origin_swap_quote.as_ref().map(OriginSwap::from),
			SignatureWindow::Authorization {
				valid_after,
				valid_before,
				nonce: fields.nonce,
			},
		);
		let payload = authorization_payload(&domain, chain_id, token, &fields, template);
		info!(method = payload.call_template.method, digest = %payload.digest, "Authorization payload built");
		Ok(payload)
	}

	/// Origin chain, signed token and periphery for a gasless payload.
	async fn signing_target(
		&self,
		quotes: &CrossSwapQuotes,
	) -> Result<(u64, Address, Address), CrossSwapError> {
		let cross_swap = &quotes.cross_swap;
		if cross_swap.is_input_native {
			return Err(CrossSwapError::InvalidRequest(
				"Native input cannot be authorised by signature".to_string(),
			));
		}
		let chain_id = cross_swap.origin_chain_id();
		let periphery = self.dex.periphery_address(chain_id).await?;
		Ok((chain_id, cross_swap.input_token.address, periphery))
	}
}
