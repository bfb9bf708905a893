//! Engine scenarios driven through the public API only.

use alloy_primitives::{address, Address, U256};
use alloy_sol_types::SolCall;
use std::sync::Arc;
use swap_bridge::implementations::mock::{BridgeQuoteKind, MockBridgeQuotes};
use swap_chain::implementations::mock::{MockChainReader, MockToken};
use swap_config::Config;
use swap_core::message::{IMulticallHandler, IERC20};
use swap_core::transaction::ISpokePool;
use swap_core::{
	decode_message, CrossSwapEngine, CrossSwapError, CrossSwapRequest, EngineBuilder,
	EngineFactories, RouteRegistry,
};
use swap_dex::implementations::mock::MockDexStrategy;
use swap_dex::DexStrategyInterface;
use swap_types::{AmountType, CallJournal, CrossSwapType, ReportedVersion, TradeType};

const USDC_1: Address = address!("a0b86991c6218b36c1d19d4a2e9eb0ce3606eb48");
const WETH_1: Address = address!("c02aaa39b223fe8d0a0e5c4f27ead9083c756cc2");
const DAI_1: Address = address!("6b175474e89094c44da98b954eedeac495271d0f");
const USDC_10: Address = address!("0b2c639c533813f4aa9d7837caf62653d097ff85");
const WETH_10: Address = address!("4200000000000000000000000000000000000006");
const OP_10: Address = address!("4200000000000000000000000000000000000042");
const HANDLER: Address = address!("924a9f036260ddd5808007e1aa95f08ed08aa569");
const DEPOSITOR: Address = address!("1111111111111111111111111111111111111111");
const RECIPIENT: Address = address!("2222222222222222222222222222222222222222");

const CONFIG: &str = r#"
[engine]
id = "e2e"

[networks.1]
rpc_url = "http://localhost:8545"
spoke_pool_address = "0x5c7bcd6e7de5423a257d81b442095a1a6ced35c5"
multicall_handler_address = "0x924a9f036260ddd5808007e1aa95f08ed08aa569"
tokens = [
	{ address = "0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48", symbol = "USDC", decimals = 6 },
	{ address = "0xc02aaa39b223fe8d0a0e5c4f27ead9083c756cc2", symbol = "WETH", decimals = 18 },
	{ address = "0x6b175474e89094c44da98b954eedeac495271d0f", symbol = "DAI", decimals = 18 },
]

[networks.10]
rpc_url = "http://localhost:9545"
spoke_pool_address = "0x6f26bf09b1c792e3228e5467807a900a503c0281"
multicall_handler_address = "0x924a9f036260ddd5808007e1aa95f08ed08aa569"
tokens = [
	{ address = "0x0b2c639c533813f4aa9d7837caf62653d097ff85", symbol = "USDC", decimals = 6 },
	{ address = "0x4200000000000000000000000000000000000006", symbol = "WETH", decimals = 18 },
	{ address = "0x4200000000000000000000000000000000000042", symbol = "OP", decimals = 18 },
]

[[routes]]
origin_chain_id = 1
destination_chain_id = 10
origin_token = "0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48"
destination_token = "0x0b2c639c533813f4aa9d7837caf62653d097ff85"
origin_token_symbol = "USDC"
destination_token_symbol = "USDC"

[[routes]]
origin_chain_id = 1
destination_chain_id = 10
origin_token = "0xc02aaa39b223fe8d0a0e5c4f27ead9083c756cc2"
destination_token = "0x4200000000000000000000000000000000000006"
origin_token_symbol = "WETH"
destination_token_symbol = "WETH"

[dex]
primary = "mock"
[dex.implementations.mock]

[bridge]
primary = "mock"
[bridge.implementations.mock]
relay_fee_bps = 4

[chain]
primary = "mock"
[chain.implementations.mock]
"#;

fn config() -> Config {
	CONFIG.parse().unwrap()
}

fn engine_with(
	dex: Arc<MockDexStrategy>,
	bridge: Arc<MockBridgeQuotes>,
) -> CrossSwapEngine {
	engine_with_chain(dex, bridge, MockChainReader::default())
}

fn engine_with_chain(
	dex: Arc<MockDexStrategy>,
	bridge: Arc<MockBridgeQuotes>,
	chain: MockChainReader,
) -> CrossSwapEngine {
	let config = config();
	CrossSwapEngine::new(
		config.engine.clone(),
		Arc::new(RouteRegistry::from_config(&config)),
		dex,
		bridge,
		Arc::new(chain),
	)
}

fn request(input: Address, output: Address, amount: u128, amount_type: AmountType) -> CrossSwapRequest {
	CrossSwapRequest {
		input_token: input,
		origin_chain_id: 1,
		output_token: output,
		destination_chain_id: 10,
		amount: U256::from(amount),
		amount_type,
		depositor: DEPOSITOR,
		recipient: RECIPIENT,
		refund_address: None,
		refund_on_origin: false,
		is_input_native: false,
		is_output_native: false,
		slippage_tolerance: 0.5,
	}
}

#[tokio::test]
async fn bridgeable_input_sizes_bridge_from_destination_swap() {
	let journal = CallJournal::new();
	let dex = Arc::new(MockDexStrategy::default().with_journal(journal.clone()));
	let bridge = Arc::new(MockBridgeQuotes::default().with_journal(journal.clone()));
	let engine = engine_with(dex.clone(), bridge.clone());

	// 1,000 USDC worth of intent, asking for at least 1e9 wei of OP.
	let cross_swap = engine
		.resolve_request(&request(USDC_1, OP_10, 1_000_000_000, AmountType::MinOutput))
		.unwrap();
	assert_eq!(
		engine.classify(USDC_1, 1, OP_10, 10),
		CrossSwapType::BridgeableToAny
	);

	let quotes = engine.compose_quote(&cross_swap).await.unwrap();
	assert_eq!(quotes.cross_swap_type(), CrossSwapType::BridgeableToAny);

	// The destination swap is priced before the bridge is asked for a quote.
	let entries = journal.entries();
	assert!(entries[0].starts_with("dex.fetch_quote"));
	assert!(entries[1].starts_with("bridge.quote_for_min_output"));

	let fetches = dex.fetches();
	assert_eq!(fetches.len(), 1);
	assert_eq!(fetches[0].trade_type, TradeType::ExactOutput);
	assert_eq!(fetches[0].token_in, USDC_10);
	assert_eq!(fetches[0].token_out, OP_10);
	assert_eq!(fetches[0].amount, U256::from(1_000_000_000u64));

	let destination = quotes.destination_swap_quote.as_ref().unwrap();
	let recorded = bridge.quotes();
	assert_eq!(recorded.len(), 1);
	assert_eq!(recorded[0].kind, BridgeQuoteKind::MinOutput);
	assert_eq!(recorded[0].amount, destination.maximum_amount_in);
	assert_ne!(recorded[0].amount, U256::from(1_000_000_000u64));
	assert_eq!(recorded[0].recipient, HANDLER);
}

#[tokio::test]
async fn destination_message_follows_execution_order() {
	let dex = Arc::new(MockDexStrategy::default());
	let engine = engine_with(dex.clone(), Arc::new(MockBridgeQuotes::default()));
	let router = dex.router_address(10).await.unwrap();

	let cross_swap = engine
		.resolve_request(&request(
			USDC_1,
			OP_10,
			5_000_000_000_000_000_000,
			AmountType::ExactOutput,
		))
		.unwrap();
	let quotes = engine.compose_quote(&cross_swap).await.unwrap();
	let message = decode_message(&quotes.bridge_quote.message).unwrap();

	let targets: Vec<Address> = message.actions.iter().map(|a| a.target).collect();
	assert_eq!(targets, vec![USDC_10, router, OP_10, HANDLER, HANDLER]);

	let selectors: Vec<[u8; 4]> = message
		.actions
		.iter()
		.filter(|a| a.target != router)
		.map(|a| {
			let mut selector = [0u8; 4];
			selector.copy_from_slice(&a.call_data[..4]);
			selector
		})
		.collect();
	assert_eq!(
		selectors,
		vec![
			IERC20::approveCall::SELECTOR,
			IERC20::transferCall::SELECTOR,
			IMulticallHandler::drainLeftoverTokensCall::SELECTOR,
			IMulticallHandler::drainLeftoverTokensCall::SELECTOR,
		]
	);

	let transfer = IERC20::transferCall::abi_decode(&message.actions[2].call_data, true).unwrap();
	assert_eq!(transfer.to, RECIPIENT);
	assert_eq!(transfer.amount, cross_swap.amount);

	let last = IMulticallHandler::drainLeftoverTokensCall::abi_decode(
		&message.actions[4].call_data,
		true,
	)
	.unwrap();
	assert_eq!(last.token, USDC_10);
	assert_eq!(last.destination, DEPOSITOR);
	assert_eq!(message.fallback_recipient, DEPOSITOR);
}

#[tokio::test]
async fn every_type_composes_and_encodes() {
	let engine = EngineBuilder::new(config())
		.build(EngineFactories {
			dex_factories: swap_dex::get_all_implementations()
				.into_iter()
				.map(|(name, f)| (name.to_string(), f))
				.collect(),
			bridge_factories: swap_bridge::get_all_implementations()
				.into_iter()
				.map(|(name, f)| (name.to_string(), f))
				.collect(),
			chain_factories: swap_chain::get_all_implementations()
				.into_iter()
				.map(|(name, f)| (name.to_string(), f))
				.collect(),
		})
		.unwrap();

	let cases = [
		(USDC_1, USDC_10, 750_000_000u128, CrossSwapType::BridgeableToBridgeable),
		(WETH_1, WETH_10, 2_000_000_000_000_000_000, CrossSwapType::BridgeableToBridgeable),
		(USDC_1, OP_10, 750_000_000_000_000_000_000, CrossSwapType::BridgeableToAny),
		(DAI_1, USDC_10, 750_000_000, CrossSwapType::AnyToBridgeable),
		(DAI_1, OP_10, 750_000_000_000_000_000_000, CrossSwapType::AnyToAny),
	];
	for (input, output, amount, expected) in cases {
		assert_eq!(engine.classify(input, 1, output, 10), expected);
		for amount_type in [
			AmountType::ExactInput,
			AmountType::ExactOutput,
			AmountType::MinOutput,
		] {
			let cross_swap = engine
				.resolve_request(&request(input, output, amount, amount_type))
				.unwrap();
			let quotes = engine.compose_quote(&cross_swap).await.unwrap();
			assert_eq!(quotes.cross_swap_type(), expected);
			if amount_type.is_output_based() {
				assert!(quotes.effective_output() >= cross_swap.amount);
			} else {
				assert_eq!(quotes.required_input(), cross_swap.amount);
			}

			let tx = engine.build_transaction(&quotes, None).await.unwrap();
			assert_eq!(tx.chain_id, 1);
			assert_eq!(tx.from, DEPOSITOR);
			assert!(!tx.data.is_empty());
		}
	}
}

#[tokio::test]
async fn missing_bridge_route_is_terminal() {
	let bridge = Arc::new(MockBridgeQuotes::default().without_route(1, USDC_1));
	let dex = Arc::new(MockDexStrategy::default());
	let engine = engine_with(dex.clone(), bridge);

	let cross_swap = engine
		.resolve_request(&request(USDC_1, OP_10, 1_000_000, AmountType::ExactOutput))
		.unwrap();
	let result = engine.compose_quote(&cross_swap).await;
	assert!(matches!(result, Err(CrossSwapError::RouteNotFound(_))));
}

#[tokio::test]
async fn missing_swap_route_is_terminal() {
	let dex = Arc::new(MockDexStrategy::default().without_route(10, USDC_10, OP_10));
	let bridge = Arc::new(MockBridgeQuotes::default());
	let engine = engine_with(dex, bridge.clone());

	let cross_swap = engine
		.resolve_request(&request(USDC_1, OP_10, 1_000_000, AmountType::MinOutput))
		.unwrap();
	let result = engine.compose_quote(&cross_swap).await;
	assert!(matches!(result, Err(CrossSwapError::RouteNotFound(_))));
	assert!(bridge.quotes().is_empty());
}

#[tokio::test]
async fn gasless_payloads_carry_the_deposit() {
	let dex = Arc::new(MockDexStrategy::default());
	let chain = MockChainReader::default()
		.with_token(MockToken::new(1, USDC_1, "USD Coin", ReportedVersion::Text("2".into())))
		.with_token(MockToken::new(1, DAI_1, "Dai Stablecoin", ReportedVersion::Text("1".into())));
	let engine = engine_with_chain(dex.clone(), Arc::new(MockBridgeQuotes::default()), chain);
	let periphery = dex.periphery_address(1).await.unwrap();

	// Bridgeable input: plain deposit signed by permit or authorization.
	let cross_swap = engine
		.resolve_request(&request(USDC_1, USDC_10, 250_000_000, AmountType::ExactOutput))
		.unwrap();
	let quotes = engine.compose_quote(&cross_swap).await.unwrap();
	let direct = engine.build_transaction(&quotes, None).await.unwrap();

	let permit = engine
		.build_permit_payload(&quotes, U256::from(1_900_000_000u64))
		.await
		.unwrap();
	assert_eq!(permit.eip712["primaryType"], "Permit");
	assert_eq!(permit.call_template.method, "depositWithPermit");
	assert_eq!(permit.call_template.to, periphery);
	let deposit = &permit.call_template.deposit;
	assert_eq!(deposit.input_amount, quotes.required_input());
	let direct = ISpokePool::depositV3Call::abi_decode(&direct.data, true).unwrap();
	assert_eq!(deposit.depositor, direct.depositor);
	assert_eq!(deposit.recipient, direct.recipient);
	assert_eq!(deposit.output_amount, direct.outputAmount);
	assert_eq!(deposit.fill_deadline, direct.fillDeadline);

	let authorization = engine
		.build_authorization_payload(&quotes, U256::from(1_900_000_000u64), None)
		.await
		.unwrap();
	assert_eq!(authorization.eip712["primaryType"], "TransferWithAuthorization");
	assert_eq!(authorization.call_template.method, "depositWithAuthorization");
	assert_eq!(
		authorization.eip712["message"]["value"],
		quotes.required_input().to_string()
	);

	// Non-bridgeable input: the periphery swaps before depositing.
	let cross_swap = engine
		.resolve_request(&request(DAI_1, OP_10, 40_000_000_000_000_000_000, AmountType::MinOutput))
		.unwrap();
	let quotes = engine.compose_quote(&cross_swap).await.unwrap();
	let permit = engine
		.build_permit_payload(&quotes, U256::from(1_900_000_000u64))
		.await
		.unwrap();
	assert_eq!(permit.call_template.method, "swapAndBridgeWithPermit");
	assert_eq!(permit.eip712["domain"]["name"], "Dai Stablecoin");
	assert!(permit.call_template.swap.is_some());
	let authorization = engine
		.build_authorization_payload(&quotes, U256::from(1_900_000_000u64), None)
		.await
		.unwrap();
	assert_eq!(authorization.call_template.method, "swapAndBridgeWithAuthorization");
}
