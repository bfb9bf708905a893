//! Bridgeable to any: the bridge feeds a destination-chain swap.

use super::ComposeContext;
use crate::CrossSwapError;
use alloy_primitives::Bytes;
use swap_types::{AmountType, BridgeQuoteRequest, CrossSwap, CrossSwapQuotes, TradeType};
use tracing::debug;

pub async fn compose(
	ctx: &ComposeContext<'_>,
	cross_swap: &CrossSwap,
) -> Result<CrossSwapQuotes, CrossSwapError> {
	let origin_chain_id = cross_swap.origin_chain_id();
	let destination_chain_id = cross_swap.destination_chain_id();

	let route = ctx
		.routes
		.route_by_input_token_and_destination_chain(
			cross_swap.input_token.address,
			origin_chain_id,
			destination_chain_id,
		)
		.ok_or_else(|| {
			CrossSwapError::RouteNotFound(format!(
				"no bridge route for {} to chain {}",
				cross_swap.input_token, destination_chain_id
			))
		})?;
	let bridged = ctx
		.routes
		.resolve_token(route.destination_token, destination_chain_id)?;
	let handler = ctx.multicall_handler(destination_chain_id)?;

	let (bridge_quote, destination_swap_quote) = match cross_swap.amount_type {
		AmountType::ExactOutput | AmountType::MinOutput => {
			// Size the destination swap first: the bridge must cover its
			// worst-case input.
			let swap_quote = ctx
				.destination_swap(cross_swap, &bridged, TradeType::ExactOutput, cross_swap.amount)
				.await?;
			let message = ctx.destination_swap_message(cross_swap, &swap_quote).await?;
			debug!(
				bridged = %bridged,
				bridge_min_output = %swap_quote.maximum_amount_in,
				"Destination swap sized"
			);
			let request = BridgeQuoteRequest {
				input_token: cross_swap.input_token.clone(),
				output_token: bridged,
				amount: swap_quote.maximum_amount_in,
				recipient: handler,
				message,
			};
			(ctx.bridge.quote_for_min_output(&request).await?, swap_quote)
		},
		AmountType::ExactInput => {
			let request = BridgeQuoteRequest {
				input_token: cross_swap.input_token.clone(),
				output_token: bridged.clone(),
				amount: cross_swap.amount,
				recipient: handler,
				message: Bytes::new(),
			};
			let mut bridge_quote = ctx.bridge.quote_for_exact_input(&request).await?;
			let swap_quote = ctx
				.destination_swap(
					cross_swap,
					&bridged,
					TradeType::ExactInput,
					bridge_quote.output_amount,
				)
				.await?;
			bridge_quote.message = ctx.destination_swap_message(cross_swap, &swap_quote).await?;
			(bridge_quote, swap_quote)
		},
	};

	Ok(CrossSwapQuotes {
		cross_swap: cross_swap.clone(),
		bridge_quote,
		origin_swap_quote: None,
		destination_swap_quote: Some(destination_swap_quote),
	})
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::composers::tests::{cross_swap, fixture};
	use crate::routes::tests::{DAI_1, OP_10, USDC_1, USDC_10};
	use swap_bridge::implementations::mock::MockBridgeQuotes;
	use swap_dex::implementations::mock::MockDexStrategy;

	#[tokio::test]
	async fn test_exact_output_bridges_swap_maximum_in() {
		let routes = fixture();
		let dex = MockDexStrategy::default().with_rate(10, USDC_10, OP_10, 5_000);
		let bridge = MockBridgeQuotes::default().with_relay_fee_bps(5);
		let ctx = ComposeContext {
			routes: &routes,
			dex: &dex,
			bridge: &bridge,
			indicative_quote_buffer_bps: 50,
		};
		let swap = cross_swap(
			&routes,
			USDC_1,
			OP_10,
			10_000_000_000_000_000_000,
			AmountType::ExactOutput,
		);

		let quotes = compose(&ctx, &swap).await.unwrap();
		let swap_quote = quotes.destination_swap_quote.as_ref().unwrap();
		assert_eq!(swap_quote.token_in.address, USDC_10);
		assert_eq!(bridge.quotes()[0].amount, swap_quote.maximum_amount_in);
		assert!(quotes.bridge_quote.output_amount >= swap_quote.maximum_amount_in);
		assert!(quotes.effective_output() >= swap.amount);
	}

	#[tokio::test]
	async fn test_exact_input_swaps_realised_bridge_output() {
		let routes = fixture();
		let dex = MockDexStrategy::default();
		let bridge = MockBridgeQuotes::default().with_relay_fee_bps(20);
		let ctx = ComposeContext {
			routes: &routes,
			dex: &dex,
			bridge: &bridge,
			indicative_quote_buffer_bps: 50,
		};
		let swap = cross_swap(&routes, USDC_1, OP_10, 3_000_000, AmountType::ExactInput);

		let quotes = compose(&ctx, &swap).await.unwrap();
		let fetches = dex.fetches();
		assert_eq!(fetches.len(), 1);
		assert_eq!(fetches[0].trade_type, TradeType::ExactInput);
		assert_eq!(fetches[0].amount, quotes.bridge_quote.output_amount);
		assert!(!quotes.bridge_quote.message.is_empty());
	}

	#[tokio::test]
	async fn test_missing_route_is_terminal() {
		let routes = fixture();
		let dex = MockDexStrategy::default();
		let bridge = MockBridgeQuotes::default();
		let ctx = ComposeContext {
			routes: &routes,
			dex: &dex,
			bridge: &bridge,
			indicative_quote_buffer_bps: 50,
		};
		let swap = cross_swap(&routes, DAI_1, OP_10, 1_000, AmountType::MinOutput);
		assert!(matches!(
			compose(&ctx, &swap).await,
			Err(CrossSwapError::RouteNotFound(_))
		));
		assert!(dex.fetches().is_empty());
	}
}
