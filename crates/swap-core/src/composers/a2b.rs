//! Any to bridgeable: an origin-chain swap feeds the bridge.

use super::ComposeContext;
use crate::refinement::refine_origin_swap;
use crate::CrossSwapError;
use swap_dex::FetchOptions;
use swap_types::{AmountType, CrossSwap, CrossSwapQuotes, TradeType};
use tracing::debug;

pub async fn compose(
	ctx: &ComposeContext<'_>,
	cross_swap: &CrossSwap,
) -> Result<CrossSwapQuotes, CrossSwapError> {
	let origin_chain_id = cross_swap.origin_chain_id();
	let destination_chain_id = cross_swap.destination_chain_id();

	let route = ctx
		.routes
		.route_by_output_token_and_origin_chain(
			cross_swap.output_token.address,
			destination_chain_id,
			origin_chain_id,
		)
		.ok_or_else(|| {
			CrossSwapError::RouteNotFound(format!(
				"no bridge route from chain {} for {}",
				origin_chain_id, cross_swap.output_token
			))
		})?;
	let bridgeable = ctx
		.routes
		.resolve_token(route.origin_token, origin_chain_id)?;
	// The periphery receives the swap output and deposits it.
	let periphery = ctx.dex.periphery_address(origin_chain_id).await?;

	let (bridge_quote, origin_swap_quote) = match cross_swap.amount_type {
		AmountType::ExactOutput | AmountType::MinOutput => {
			let bridge_quote = ctx.bridge_to_output(cross_swap, &bridgeable, None).await?;
			debug!(
				bridgeable = %bridgeable,
				bridge_input = %bridge_quote.input_amount,
				"Bridge leg sized"
			);
			let spec = ctx.swap_spec(
				cross_swap,
				&cross_swap.input_token,
				&bridgeable,
				bridge_quote.input_amount,
				periphery,
			);
			let swap_quote =
				refine_origin_swap(ctx.dex, spec, ctx.indicative_quote_buffer_bps).await?;
			(bridge_quote, swap_quote)
		},
		AmountType::ExactInput => {
			let spec = ctx.swap_spec(
				cross_swap,
				&cross_swap.input_token,
				&bridgeable,
				cross_swap.amount,
				periphery,
			);
			let swap_quote = ctx
				.dex
				.fetch_quote(&spec, TradeType::ExactInput, FetchOptions::default())
				.await?;
			let bridge_quote = ctx
				.bridge_to_output(cross_swap, &bridgeable, Some(swap_quote.min_amount_out))
				.await?;
			(bridge_quote, swap_quote)
		},
	};

	Ok(CrossSwapQuotes {
		cross_swap: cross_swap.clone(),
		bridge_quote,
		origin_swap_quote: Some(origin_swap_quote),
		destination_swap_quote: None,
	})
}
