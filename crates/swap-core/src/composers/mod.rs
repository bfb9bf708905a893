//! Quote composers, one per cross-swap type.
//!
//! Each composer turns a `CrossSwap` into a `CrossSwapQuotes` by calling the
//! DEX strategy and the bridge quote provider. Legs whose amounts depend on
//! each other are quoted strictly in sequence.

use crate::message::MessageBuilder;
use crate::routes::RouteRegistry;
use crate::CrossSwapError;
use alloy_primitives::{Address, Bytes, U256};
use swap_bridge::BridgeQuoteInterface;
use swap_dex::{DexStrategyInterface, FetchOptions};
use swap_types::{
	AmountType, BridgeQuote, BridgeQuoteRequest, CrossSwap, SwapQuote, SwapSpec, Token, TradeType,
};

pub mod a2a;
pub mod a2b;
pub mod b2a;
pub mod b2b;

/// Collaborators and settings shared by all composers for one request.
pub struct ComposeContext<'a> {
	pub routes: &'a RouteRegistry,
	pub dex: &'a dyn DexStrategyInterface,
	pub bridge: &'a dyn BridgeQuoteInterface,
	/// Markup on the indicative origin swap input before the firm re-quote.
	pub indicative_quote_buffer_bps: u32,
}

impl ComposeContext<'_> {
	pub(crate) fn multicall_handler(&self, chain_id: u64) -> Result<Address, CrossSwapError> {
		Ok(self.routes.network(chain_id)?.multicall_handler_address)
	}

	pub(crate) fn swap_spec(
		&self,
		cross_swap: &CrossSwap,
		token_in: &Token,
		token_out: &Token,
		amount: U256,
		recipient: Address,
	) -> SwapSpec {
		SwapSpec {
			chain_id: token_in.chain_id,
			token_in: token_in.clone(),
			token_out: token_out.clone(),
			amount,
			recipient,
			slippage_tolerance: cross_swap.slippage_tolerance,
		}
	}

	/// Quotes the destination swap `bridged -> cross_swap.output_token`, paid
	/// out to the multicall handler.
	pub(crate) async fn destination_swap(
		&self,
		cross_swap: &CrossSwap,
		bridged: &Token,
		trade_type: TradeType,
		amount: U256,
	) -> Result<SwapQuote, CrossSwapError> {
		let handler = self.multicall_handler(cross_swap.destination_chain_id())?;
		let spec = self.swap_spec(cross_swap, bridged, &cross_swap.output_token, amount, handler);
		Ok(self
			.dex
			.fetch_quote(&spec, trade_type, FetchOptions::default())
			.await?)
	}

	/// Encodes the handler message that executes `swap_quote` on the
	/// destination chain.
	pub(crate) async fn destination_swap_message(
		&self,
		cross_swap: &CrossSwap,
		swap_quote: &SwapQuote,
	) -> Result<Bytes, CrossSwapError> {
		let chain_id = cross_swap.destination_chain_id();
		let handler = self.multicall_handler(chain_id)?;
		let router = self.dex.router_address(chain_id).await?;
		Ok(MessageBuilder::for_destination_swap(cross_swap, swap_quote, router, handler).build())
	}

	/// Quotes a bridge leg that ends in `cross_swap.output_token`.
	///
	/// For output-based amounts the bridge must deliver at least
	/// `cross_swap.amount`. For EXACT_INPUT, `exact_input` is bridged as is.
	/// A message is attached whenever the handler has to act on the funds,
	/// and re-encoded with the realised output once the bridge has quoted.
	pub(crate) async fn bridge_to_output(
		&self,
		cross_swap: &CrossSwap,
		input_token: &Token,
		exact_input: Option<U256>,
	) -> Result<BridgeQuote, CrossSwapError> {
		let output_token = &cross_swap.output_token;
		let handler = self.multicall_handler(cross_swap.destination_chain_id())?;
		let delivery_message = |amount: U256| {
			MessageBuilder::for_bridge_delivery(cross_swap, output_token.address, amount, handler)
				.build()
		};

		match (cross_swap.amount_type, exact_input) {
			(AmountType::ExactOutput, _) => {
				let request = BridgeQuoteRequest {
					input_token: input_token.clone(),
					output_token: output_token.clone(),
					amount: cross_swap.amount,
					recipient: handler,
					message: delivery_message(cross_swap.amount),
				};
				Ok(self.bridge.quote_for_min_output(&request).await?)
			},
			(AmountType::MinOutput, _) => {
				let request = BridgeQuoteRequest {
					input_token: input_token.clone(),
					output_token: output_token.clone(),
					amount: cross_swap.amount,
					recipient: handler,
					message: delivery_message(cross_swap.amount),
				};
				let mut quote = self.bridge.quote_for_min_output(&request).await?;
				quote.message = delivery_message(quote.output_amount);
				Ok(quote)
			},
			(AmountType::ExactInput, Some(amount)) => {
				// ERC-20 outputs need no handler: the bridge pays the recipient.
				let needs_handler = cross_swap.is_output_native;
				let request = BridgeQuoteRequest {
					input_token: input_token.clone(),
					output_token: output_token.clone(),
					amount,
					recipient: if needs_handler {
						handler
					} else {
						cross_swap.recipient
					},
					message: if needs_handler {
						delivery_message(amount)
					} else {
						Bytes::new()
					},
				};
				let mut quote = self.bridge.quote_for_exact_input(&request).await?;
				if needs_handler {
					quote.message = delivery_message(quote.output_amount);
				}
				Ok(quote)
			},
			(AmountType::ExactInput, None) => Err(CrossSwapError::InvalidRequest(
				"Exact-input bridge leg requires an input amount".to_string(),
			)),
		}
	}
}
