//! Any to any: origin swap, bridge and destination swap around one
//! bridgeable route, chosen among the candidates connecting the two chains.

use super::ComposeContext;
use crate::refinement::refine_origin_swap;
use crate::selector::RouteSelector;
use crate::CrossSwapError;
use alloy_primitives::Bytes;
use swap_dex::FetchOptions;
use swap_types::{
	AmountType, BridgeQuoteRequest, BridgeRouteConfig, CrossSwap, CrossSwapQuotes, TradeType,
};
use tracing::debug;

/// Picks the cheapest of the candidate routes between the two chains.
pub async fn compose(
	ctx: &ComposeContext<'_>,
	cross_swap: &CrossSwap,
	selector: &RouteSelector<'_>,
) -> Result<CrossSwapQuotes, CrossSwapError> {
	let routes = ctx
		.routes
		.routes_by_chain_pair(cross_swap.origin_chain_id(), cross_swap.destination_chain_id());
	selector
		.select(routes, |route| compose_with_route(ctx, cross_swap, route))
		.await
}

/// Composes the three legs around `route`.
pub async fn compose_with_route(
	ctx: &ComposeContext<'_>,
	cross_swap: &CrossSwap,
	route: &BridgeRouteConfig,
) -> Result<CrossSwapQuotes, CrossSwapError> {
	let origin_chain_id = cross_swap.origin_chain_id();
	let destination_chain_id = cross_swap.destination_chain_id();
	let bridged_in = ctx
		.routes
		.resolve_token(route.origin_token, origin_chain_id)?;
	let bridged_out = ctx
		.routes
		.resolve_token(route.destination_token, destination_chain_id)?;
	let handler = ctx.multicall_handler(destination_chain_id)?;
	let periphery = ctx.dex.periphery_address(origin_chain_id).await?;

	let (origin_swap_quote, bridge_quote, destination_swap_quote) = match cross_swap.amount_type {
		AmountType::ExactOutput | AmountType::MinOutput => {
			let destination_swap = ctx
				.destination_swap(
					cross_swap,
					&bridged_out,
					TradeType::ExactOutput,
					cross_swap.amount,
				)
				.await?;
			let message = ctx
				.destination_swap_message(cross_swap, &destination_swap)
				.await?;
			let request = BridgeQuoteRequest {
				input_token: bridged_in.clone(),
				output_token: bridged_out,
				amount: destination_swap.maximum_amount_in,
				recipient: handler,
				message,
			};
			let bridge_quote = ctx.bridge.quote_for_min_output(&request).await?;
			debug!(
				via = %route.origin_token_symbol,
				bridge_input = %bridge_quote.input_amount,
				"Bridge leg sized"
			);

			let spec = ctx.swap_spec(
				cross_swap,
				&cross_swap.input_token,
				&bridged_in,
				bridge_quote.input_amount,
				periphery,
			);
			let origin_swap =
				refine_origin_swap(ctx.dex, spec, ctx.indicative_quote_buffer_bps).await?;
			(origin_swap, bridge_quote, destination_swap)
		},
		AmountType::ExactInput => {
			let spec = ctx.swap_spec(
				cross_swap,
				&cross_swap.input_token,
				&bridged_in,
				cross_swap.amount,
				periphery,
			);
			let origin_swap = ctx
				.dex
				.fetch_quote(&spec, TradeType::ExactInput, FetchOptions::default())
				.await?;
			let request = BridgeQuoteRequest {
				input_token: bridged_in,
				output_token: bridged_out.clone(),
				amount: origin_swap.min_amount_out,
				recipient: handler,
				message: Bytes::new(),
			};
			let mut bridge_quote = ctx.bridge.quote_for_exact_input(&request).await?;
			let destination_swap = ctx
				.destination_swap(
					cross_swap,
					&bridged_out,
					TradeType::ExactInput,
					bridge_quote.output_amount,
				)
				.await?;
			bridge_quote.message = ctx
				.destination_swap_message(cross_swap, &destination_swap)
				.await?;
			(origin_swap, bridge_quote, destination_swap)
		},
	};

	Ok(CrossSwapQuotes {
		cross_swap: cross_swap.clone(),
		bridge_quote,
		origin_swap_quote: Some(origin_swap_quote),
		destination_swap_quote: Some(destination_swap_quote),
	})
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::composers::tests::{cross_swap, fixture};
	use crate::routes::tests::{DAI_1, OP_10, USDC_1, WETH_1};
	use swap_bridge::implementations::mock::MockBridgeQuotes;
	use swap_dex::implementations::mock::MockDexStrategy;
	use swap_types::CrossSwapType;

	#[tokio::test]
	async fn test_composes_three_legs() {
		let routes = fixture();
		let dex = MockDexStrategy::default();
		let bridge = MockBridgeQuotes::default().with_relay_fee_bps(4);
		let ctx = ComposeContext {
			routes: &routes,
			dex: &dex,
			bridge: &bridge,
			indicative_quote_buffer_bps: 50,
		};
		let preferred = vec!["USDC".to_string(), "WETH".to_string()];
		let selector = RouteSelector::new(&preferred, 2);
		let swap = cross_swap(
			&routes,
			DAI_1,
			OP_10,
			40_000_000_000_000_000_000,
			AmountType::ExactOutput,
		);

		let quotes = compose(&ctx, &swap, &selector).await.unwrap();
		assert_eq!(quotes.cross_swap_type(), CrossSwapType::AnyToAny);
		assert!(quotes.effective_output() >= swap.amount);

		let origin = quotes.origin_swap_quote.as_ref().unwrap();
		let destination = quotes.destination_swap_quote.as_ref().unwrap();
		assert!(origin.min_amount_out >= quotes.bridge_quote.input_amount);
		assert!(quotes.bridge_quote.output_amount >= destination.maximum_amount_in);
		assert_eq!(origin.token_out.address, quotes.bridge_quote.input_token.address);
	}

	#[tokio::test]
	async fn test_cheaper_route_wins() {
		let routes = fixture();
		// Make the USDC path expensive on the origin chain.
		let dex = MockDexStrategy::default().with_rate(1, DAI_1, USDC_1, 8_000);
		let bridge = MockBridgeQuotes::default();
		let ctx = ComposeContext {
			routes: &routes,
			dex: &dex,
			bridge: &bridge,
			indicative_quote_buffer_bps: 50,
		};
		let preferred = vec!["USDC".to_string(), "WETH".to_string()];
		let selector = RouteSelector::new(&preferred, 2);
		let swap = cross_swap(
			&routes,
			DAI_1,
			OP_10,
			1_000_000_000_000_000_000,
			AmountType::MinOutput,
		);

		let quotes = compose(&ctx, &swap, &selector).await.unwrap();
		assert_eq!(quotes.bridge_quote.input_token.address, WETH_1);
	}

	#[tokio::test]
	async fn test_single_candidate_limit_uses_first_preferred() {
		let routes = fixture();
		let dex = MockDexStrategy::default().with_rate(1, DAI_1, USDC_1, 8_000);
		let bridge = MockBridgeQuotes::default();
		let ctx = ComposeContext {
			routes: &routes,
			dex: &dex,
			bridge: &bridge,
			indicative_quote_buffer_bps: 50,
		};
		let preferred = vec!["USDC".to_string(), "WETH".to_string()];
		let selector = RouteSelector::new(&preferred, 1);
		let swap = cross_swap(
			&routes,
			DAI_1,
			OP_10,
			1_000_000_000_000_000_000,
			AmountType::MinOutput,
		);

		let quotes = compose(&ctx, &swap, &selector).await.unwrap();
		assert_eq!(quotes.bridge_quote.input_token.address, USDC_1);
	}

	#[tokio::test]
	async fn test_exact_input_chains_worst_case_outputs() {
		let routes = fixture();
		let dex = MockDexStrategy::default();
		let bridge = MockBridgeQuotes::default().with_relay_fee_bps(10);
		let ctx = ComposeContext {
			routes: &routes,
			dex: &dex,
			bridge: &bridge,
			indicative_quote_buffer_bps: 50,
		};
		let preferred = vec!["WETH".to_string()];
		let selector = RouteSelector::new(&preferred, 1);
		let swap = cross_swap(
			&routes,
			DAI_1,
			OP_10,
			5_000_000_000_000_000_000,
			AmountType::ExactInput,
		);

		let quotes = compose(&ctx, &swap, &selector).await.unwrap();
		let origin = quotes.origin_swap_quote.as_ref().unwrap();
		let destination = quotes.destination_swap_quote.as_ref().unwrap();
		assert_eq!(quotes.bridge_quote.input_amount, origin.min_amount_out);
		assert_eq!(destination.expected_amount_in, quotes.bridge_quote.output_amount);
		assert_eq!(origin.maximum_amount_in, swap.amount);
	}
}
