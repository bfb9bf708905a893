//! Bridgeable to bridgeable: a single bridge leg.

use super::ComposeContext;
use crate::CrossSwapError;
use swap_types::{AmountType, CrossSwap, CrossSwapQuotes};

pub async fn compose(
	ctx: &ComposeContext<'_>,
	cross_swap: &CrossSwap,
) -> Result<CrossSwapQuotes, CrossSwapError> {
	let exact_input = match cross_swap.amount_type {
		AmountType::ExactInput => Some(cross_swap.amount),
		AmountType::ExactOutput | AmountType::MinOutput => None,
	};
	let bridge_quote = ctx
		.bridge_to_output(cross_swap, &cross_swap.input_token, exact_input)
		.await?;

	Ok(CrossSwapQuotes {
		cross_swap: cross_swap.clone(),
		bridge_quote,
		origin_swap_quote: None,
		destination_swap_quote: None,
	})
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::composers::tests::{cross_swap, fixture, RECIPIENT};
	use crate::message::decode_message;
	use crate::routes::tests::{USDC_1, USDC_10};
	use alloy_primitives::U256;
	use swap_bridge::implementations::mock::{BridgeQuoteKind, MockBridgeQuotes};
	use swap_dex::implementations::mock::MockDexStrategy;

	#[tokio::test]
	async fn test_min_output_message_uses_realised_output() {
		let routes = fixture();
		let dex = MockDexStrategy::default();
		let bridge = MockBridgeQuotes::default().with_relay_fee_bps(10);
		let ctx = ComposeContext {
			routes: &routes,
			dex: &dex,
			bridge: &bridge,
			indicative_quote_buffer_bps: 50,
		};
		let swap = cross_swap(&routes, USDC_1, USDC_10, 1_000_000_000, AmountType::MinOutput);

		let quotes = compose(&ctx, &swap).await.unwrap();
		assert!(quotes.bridge_quote.output_amount >= swap.amount);
		assert!(quotes.origin_swap_quote.is_none());
		assert!(quotes.destination_swap_quote.is_none());

		let recorded = bridge.quotes();
		assert_eq!(recorded.len(), 1);
		assert_eq!(recorded[0].kind, BridgeQuoteKind::MinOutput);
		assert_eq!(recorded[0].amount, swap.amount);

		// The first transfer pays out what the bridge actually delivers.
		let decoded = decode_message(&quotes.bridge_quote.message).unwrap();
		let first = decode_message(&recorded[0].message).unwrap();
		assert_ne!(decoded.actions[0], first.actions[0]);
		assert_eq!(decoded.actions.len(), 2);
	}

	#[tokio::test]
	async fn test_exact_input_erc20_has_no_message() {
		let routes = fixture();
		let dex = MockDexStrategy::default();
		let bridge = MockBridgeQuotes::default();
		let ctx = ComposeContext {
			routes: &routes,
			dex: &dex,
			bridge: &bridge,
			indicative_quote_buffer_bps: 50,
		};
		let swap = cross_swap(&routes, USDC_1, USDC_10, 2_500_000, AmountType::ExactInput);

		let quotes = compose(&ctx, &swap).await.unwrap();
		assert!(quotes.bridge_quote.message.is_empty());
		assert_eq!(quotes.bridge_quote.input_amount, U256::from(2_500_000u64));

		let recorded = bridge.quotes();
		assert_eq!(recorded[0].kind, BridgeQuoteKind::ExactInput);
		assert_eq!(recorded[0].recipient, RECIPIENT);
	}
}
