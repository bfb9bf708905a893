//! Best-route selection for any-to-any cross-swaps.
//!
//! Several bridge routes may connect two chains. Each surviving candidate is
//! composed concurrently and the one requiring the least input wins.

use crate::CrossSwapError;
use futures::future::join_all;
use std::future::Future;
use swap_types::{BridgeRouteConfig, CrossSwapQuotes};
use tracing::{debug, warn};

pub struct RouteSelector<'a> {
	preferred_symbols: &'a [String],
	max_candidates: usize,
}

impl<'a> RouteSelector<'a> {
	pub fn new(preferred_symbols: &'a [String], max_candidates: usize) -> Self {
		Self {
			preferred_symbols,
			max_candidates,
		}
	}

	/// Routes whose origin token is preferred, or all routes when none is,
	/// truncated to the candidate limit. Input order is preserved.
	pub fn candidates<'r>(&self, routes: Vec<&'r BridgeRouteConfig>) -> Vec<&'r BridgeRouteConfig> {
		let preferred: Vec<_> = routes
			.iter()
			.copied()
			.filter(|r| {
				self.preferred_symbols
					.iter()
					.any(|s| s.eq_ignore_ascii_case(&r.origin_token_symbol))
			})
			.collect();

		let mut candidates = if preferred.is_empty() {
			routes
		} else {
			preferred
		};
		candidates.truncate(self.max_candidates);
		candidates
	}

	/// Composes every candidate concurrently and returns the cheapest.
	///
	/// Cost is the worst-case input pulled from the user. A failed candidate
	/// is skipped; on equal cost the earlier candidate wins.
	pub async fn select<'r, F, Fut>(
		&self,
		routes: Vec<&'r BridgeRouteConfig>,
		compose: F,
	) -> Result<CrossSwapQuotes, CrossSwapError>
	where
		F: Fn(&'r BridgeRouteConfig) -> Fut,
		Fut: Future<Output = Result<CrossSwapQuotes, CrossSwapError>>,
	{
		let candidates = self.candidates(routes);
		if candidates.is_empty() {
			return Err(CrossSwapError::RouteNotFound(
				"no candidate bridge routes between the chains".to_string(),
			));
		}

		let results = join_all(candidates.iter().map(|route| compose(*route))).await;

		let mut best: Option<CrossSwapQuotes> = None;
		let mut last_error = None;
		for (route, result) in candidates.iter().zip(results) {
			match result {
				Ok(quotes) => {
					debug!(
						via = %route.origin_token_symbol,
						required_input = %quotes.required_input(),
						"Candidate route composed"
					);
					let cheaper = best
						.as_ref()
						.is_none_or(|b| quotes.required_input() < b.required_input());
					if cheaper {
						best = Some(quotes);
					}
				},
				Err(e) => {
					warn!(via = %route.origin_token_symbol, error = %e, "Candidate route failed");
					last_error = Some(e);
				},
			}
		}

		best.ok_or_else(|| {
			CrossSwapError::RouteNotFound(match last_error {
				Some(e) => format!("all candidate routes failed, last error: {}", e),
				None => "all candidate routes failed".to_string(),
			})
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use alloy_primitives::{Address, Bytes, U256};
	use swap_types::{
		AmountType, BridgeQuote, CrossSwap, SuggestedFees, SwapQuote, SwapTx, Token,
	};

	fn route(symbol: &str, tag: u8) -> BridgeRouteConfig {
		BridgeRouteConfig {
			origin_chain_id: 1,
			destination_chain_id: 10,
			origin_token: Address::repeat_byte(tag),
			destination_token: Address::repeat_byte(tag),
			origin_token_symbol: symbol.to_string(),
			destination_token_symbol: symbol.to_string(),
			is_native: false,
		}
	}

	fn quotes_for(route: &BridgeRouteConfig, maximum_amount_in: u64) -> CrossSwapQuotes {
		let input = Token::new(Address::repeat_byte(0xaa), 1, 18, "AAA");
		let output = Token::new(Address::repeat_byte(0xbb), 10, 18, "BBB");
		let bridged_in = Token::new(route.origin_token, 1, 18, route.origin_token_symbol.clone());
		let bridged_out = Token::new(route.destination_token, 10, 18, route.origin_token_symbol.clone());
		let swap = |token_in: &Token, token_out: &Token, max_in: u64| SwapQuote {
			token_in: token_in.clone(),
			token_out: token_out.clone(),
			maximum_amount_in: U256::from(max_in),
			min_amount_out: U256::from(100u64),
			expected_amount_in: U256::from(max_in),
			expected_amount_out: U256::from(100u64),
			slippage_tolerance: 0.5,
			swap_tx: SwapTx {
				to: Address::ZERO,
				data: Bytes::new(),
				value: U256::ZERO,
			},
		};
		CrossSwapQuotes {
			cross_swap: CrossSwap {
				input_token: input.clone(),
				output_token: output.clone(),
				amount: U256::from(100u64),
				amount_type: AmountType::ExactOutput,
				depositor: Address::ZERO,
				recipient: Address::ZERO,
				refund_address: None,
				refund_on_origin: false,
				is_input_native: false,
				is_output_native: false,
				slippage_tolerance: 0.5,
			},
			bridge_quote: BridgeQuote {
				input_token: bridged_in.clone(),
				output_token: bridged_out.clone(),
				input_amount: U256::from(100u64),
				output_amount: U256::from(100u64),
				message: Bytes::new(),
				suggested_fees: SuggestedFees {
					exclusive_relayer: Address::ZERO,
					timestamp: 0,
					exclusivity_deadline: 0,
					total_relay_fee: U256::ZERO,
				},
			},
			origin_swap_quote: Some(swap(&input, &bridged_in, maximum_amount_in)),
			destination_swap_quote: Some(swap(&bridged_out, &output, 100)),
		}
	}

	fn symbols(list: &[&str]) -> Vec<String> {
		list.iter().map(|s| s.to_string()).collect()
	}

	async fn select_with_costs(costs: [u64; 3]) -> CrossSwapQuotes {
		let routes = [route("USDC", 1), route("WETH", 2), route("DAI", 3)];
		let preferred = symbols(&["USDC", "WETH", "DAI"]);
		let selector = RouteSelector::new(&preferred, 3);
		selector
			.select(routes.iter().collect(), |r| {
				let index = routes.iter().position(|c| c == r).unwrap_or(0);
				let quotes = quotes_for(r, costs[index]);
				async move { Ok(quotes) }
			})
			.await
			.unwrap()
	}

	#[tokio::test]
	async fn test_selects_cheapest_route() {
		let best = select_with_costs([120, 90, 150]).await;
		assert_eq!(best.bridge_quote.input_token.symbol, "WETH");
		assert_eq!(best.required_input(), U256::from(90u64));
	}

	#[tokio::test]
	async fn test_tie_goes_to_first_candidate() {
		let best = select_with_costs([90, 90, 150]).await;
		assert_eq!(best.bridge_quote.input_token.symbol, "USDC");
	}

	#[tokio::test]
	async fn test_failed_candidate_is_excluded() {
		let routes = [route("USDC", 1), route("WETH", 2)];
		let preferred = symbols(&["USDC", "WETH"]);
		let selector = RouteSelector::new(&preferred, 2);
		let best = selector
			.select(routes.iter().collect(), |r| {
				let result = if r.origin_token_symbol == "USDC" {
					Err(CrossSwapError::RouteNotFound("no swap route".into()))
				} else {
					Ok(quotes_for(r, 500))
				};
				async move { result }
			})
			.await
			.unwrap();
		assert_eq!(best.bridge_quote.input_token.symbol, "WETH");
	}

	#[tokio::test]
	async fn test_all_failed_is_route_not_found() {
		let routes = [route("USDC", 1)];
		let preferred = symbols(&["USDC"]);
		let selector = RouteSelector::new(&preferred, 1);
		let result = selector
			.select(routes.iter().collect(), |_| async {
				Err(CrossSwapError::Config("handler missing".into()))
			})
			.await;
		assert!(matches!(result, Err(CrossSwapError::RouteNotFound(_))));
	}

	#[test]
	fn test_candidates_prefer_then_truncate() {
		let routes = [route("FRAX", 1), route("WETH", 2), route("USDC", 3)];
		let preferred = symbols(&["USDC", "WETH"]);

		let picked = RouteSelector::new(&preferred, 1).candidates(routes.iter().collect());
		assert_eq!(picked.len(), 1);
		assert_eq!(picked[0].origin_token_symbol, "WETH");

		let none_preferred = symbols(&["DAI"]);
		let picked = RouteSelector::new(&none_preferred, 2).candidates(routes.iter().collect());
		assert_eq!(
			picked
				.iter()
				.map(|r| r.origin_token_symbol.as_str())
				.collect::<Vec<_>>(),
			vec!["FRAX", "WETH"]
		);

		let picked = RouteSelector::new(&preferred, 0).candidates(routes.iter().collect());
		assert!(picked.is_empty());
	}
}
