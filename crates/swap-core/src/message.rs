//! Destination-chain multicall messages.
//!
//! The bridge delivers funds to a multicall handler together with a message:
//! an ordered list of calls plus a fallback recipient. The handler executes the
//! calls in order and, if any of them reverts, sends everything it holds to
//! the fallback recipient instead.
//!
//! Every message ends by draining the tokens the handler may still hold, so
//! that no residual balance is left behind.

use crate::CrossSwapError;
use alloy_primitives::{Address, Bytes, U256};
use alloy_sol_types::{sol, SolCall, SolValue};
use swap_types::{AmountType, CrossSwap, MulticallAction, SwapQuote};

sol! {
	struct Call {
		address target;
		bytes callData;
		uint256 value;
	}

	struct Instructions {
		Call[] calls;
		address fallbackRecipient;
	}

	interface IERC20 {
		function approve(address spender, uint256 amount) external returns (bool);
		function transfer(address to, uint256 amount) external returns (bool);
	}

	interface IWETH {
		function withdraw(uint256 wad) external;
	}

	interface IMulticallHandler {
		function drainLeftoverTokens(address token, address payable destination) external;
	}
}

/// How the output token held by the handler reaches the recipient.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
	/// The handler holds a known amount. Exactly `amount` goes to the
	/// recipient and any surplus to the refund address.
	Exact(U256),
	/// The handler holds at least `min_amount`. Its whole balance goes to
	/// the recipient.
	Sweep { min_amount: U256 },
}

/// Accumulates handler actions in execution order.
#[derive(Debug, Clone)]
pub struct MessageBuilder {
	handler: Address,
	fallback_recipient: Address,
	actions: Vec<MulticallAction>,
}

impl MessageBuilder {
	pub fn new(handler: Address, fallback_recipient: Address) -> Self {
		Self {
			handler,
			fallback_recipient,
			actions: Vec::new(),
		}
	}

	/// Message that swaps the bridged token into the output token on the
	/// destination chain and delivers it:
	///
	/// 1. approve the router for the swap's worst-case input
	/// 2. the swap
	/// 3. delivery of the output token
	/// 4. drain of the bridged token to the refund address
	pub fn for_destination_swap(
		cross_swap: &CrossSwap,
		swap_quote: &SwapQuote,
		router: Address,
		handler: Address,
	) -> Self {
		let delivery = match cross_swap.amount_type {
			AmountType::ExactOutput => Delivery::Exact(cross_swap.amount),
			AmountType::MinOutput | AmountType::ExactInput => Delivery::Sweep {
				min_amount: swap_quote.min_amount_out,
			},
		};

		Self::new(handler, cross_swap.fallback_recipient())
			.approve(
				swap_quote.token_in.address,
				router,
				swap_quote.maximum_amount_in,
			)
			.call(
				swap_quote.swap_tx.to,
				swap_quote.swap_tx.data.clone(),
				swap_quote.swap_tx.value,
			)
			.deliver(cross_swap, swap_quote.token_out.address, delivery)
			.drain(swap_quote.token_in.address, cross_swap.refund_target())
	}

	/// Message for a bridge leg that delivers the output token directly.
	pub fn for_bridge_delivery(
		cross_swap: &CrossSwap,
		output_token: Address,
		amount: U256,
		handler: Address,
	) -> Self {
		Self::new(handler, cross_swap.fallback_recipient()).deliver(
			cross_swap,
			output_token,
			Delivery::Exact(amount),
		)
	}

	pub fn approve(self, token: Address, spender: Address, amount: U256) -> Self {
		self.push(MulticallAction::call(
			token,
			IERC20::approveCall { spender, amount }.abi_encode(),
		))
	}

	pub fn call(self, target: Address, call_data: Bytes, value: U256) -> Self {
		self.push(MulticallAction {
			target,
			call_data,
			value,
		})
	}

	pub fn transfer(self, token: Address, to: Address, amount: U256) -> Self {
		self.push(MulticallAction::call(
			token,
			IERC20::transferCall { to, amount }.abi_encode(),
		))
	}

	pub fn unwrap_native(self, wrapped: Address, amount: U256) -> Self {
		self.push(MulticallAction::call(
			wrapped,
			IWETH::withdrawCall { wad: amount }.abi_encode(),
		))
	}

	pub fn native_transfer(self, to: Address, amount: U256) -> Self {
		self.push(MulticallAction::native_transfer(to, amount))
	}

	/// Sends the handler's whole balance of `token` to `destination`. The
	/// handler only accepts this call from itself.
	pub fn drain(self, token: Address, destination: Address) -> Self {
		let handler = self.handler;
		self.push(MulticallAction::call(
			handler,
			IMulticallHandler::drainLeftoverTokensCall { token, destination }.abi_encode(),
		))
	}

	/// Delivery of `output_token` to the recipient. Native outputs are
	/// unwrapped first; wrapped leftovers follow the same surplus rule.
	pub fn deliver(self, cross_swap: &CrossSwap, output_token: Address, delivery: Delivery) -> Self {
		let recipient = cross_swap.recipient;
		let refund = cross_swap.refund_target();

		match (cross_swap.is_output_native, delivery) {
			(true, Delivery::Exact(amount)) => self
				.unwrap_native(output_token, amount)
				.native_transfer(recipient, amount)
				.drain(output_token, refund),
			(true, Delivery::Sweep { min_amount }) => self
				.unwrap_native(output_token, min_amount)
				.native_transfer(recipient, min_amount)
				.drain(output_token, recipient),
			(false, Delivery::Exact(amount)) => self
				.transfer(output_token, recipient, amount)
				.drain(output_token, refund),
			(false, Delivery::Sweep { .. }) => self.drain(output_token, recipient),
		}
	}

	pub fn actions(&self) -> &[MulticallAction] {
		&self.actions
	}

	pub fn fallback_recipient(&self) -> Address {
		self.fallback_recipient
	}

	/// ABI-encodes the message as `abi.encode(Instructions)`.
	pub fn build(self) -> Bytes {
		encode_instructions(&self.actions, self.fallback_recipient)
	}

	fn push(mut self, action: MulticallAction) -> Self {
		self.actions.push(action);
		self
	}
}

pub fn encode_instructions(actions: &[MulticallAction], fallback_recipient: Address) -> Bytes {
	let calls = actions
		.iter()
		.map(|a| Call {
			target: a.target,
			callData: a.call_data.clone(),
			value: a.value,
		})
		.collect();
	Instructions {
		calls,
		fallbackRecipient: fallback_recipient,
	}
	.abi_encode()
	.into()
}

/// A decoded handler message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedMessage {
	pub actions: Vec<MulticallAction>,
	pub fallback_recipient: Address,
}

pub fn decode_message(message: &[u8]) -> Result<DecodedMessage, CrossSwapError> {
	let instructions = Instructions::abi_decode(message, true)
		.map_err(|e| CrossSwapError::InvalidRequest(format!("Malformed message: {}", e)))?;
	Ok(DecodedMessage {
		actions: instructions
			.calls
			.into_iter()
			.map(|c| MulticallAction {
				target: c.target,
				call_data: c.callData,
				value: c.value,
			})
			.collect(),
		fallback_recipient: instructions.fallbackRecipient,
	})
}

#[cfg(test)]
mod tests {
	use super::*;
	use alloy_primitives::address;
	use swap_types::{SwapTx, Token};

	const HANDLER: Address = address!("924a9f036260ddd5808007e1aa95f08ed08aa569");
	const ROUTER: Address = address!("00000000000000000000000000000000000d3e01");
	const WETH: Address = address!("4200000000000000000000000000000000000006");
	const OP: Address = address!("4200000000000000000000000000000000000042");
	const DEPOSITOR: Address = address!("1111111111111111111111111111111111111111");
	const RECIPIENT: Address = address!("2222222222222222222222222222222222222222");
	const REFUND: Address = address!("3333333333333333333333333333333333333333");

	fn cross_swap(amount_type: AmountType) -> CrossSwap {
		CrossSwap {
			input_token: Token::new(Address::repeat_byte(0x0c), 1, 6, "USDC"),
			output_token: Token::new(OP, 10, 18, "OP"),
			amount: U256::from(5_000u64),
			amount_type,
			depositor: DEPOSITOR,
			recipient: RECIPIENT,
			refund_address: Some(REFUND),
			refund_on_origin: false,
			is_input_native: false,
			is_output_native: false,
			slippage_tolerance: 0.5,
		}
	}

	fn swap_quote() -> SwapQuote {
		SwapQuote {
			token_in: Token::new(WETH, 10, 18, "WETH"),
			token_out: Token::new(OP, 10, 18, "OP"),
			maximum_amount_in: U256::from(1_010u64),
			min_amount_out: U256::from(5_000u64),
			expected_amount_in: U256::from(1_000u64),
			expected_amount_out: U256::from(5_000u64),
			slippage_tolerance: 0.5,
			swap_tx: SwapTx {
				to: ROUTER,
				data: Bytes::from(vec![0xab, 0xcd]),
				value: U256::ZERO,
			},
		}
	}

	fn approve(token: Address, spender: Address, amount: u64) -> MulticallAction {
		MulticallAction::call(
			token,
			IERC20::approveCall {
				spender,
				amount: U256::from(amount),
			}
			.abi_encode(),
		)
	}

	fn swap() -> MulticallAction {
		MulticallAction::call(ROUTER, vec![0xab, 0xcd])
	}

	fn transfer(token: Address, to: Address, amount: u64) -> MulticallAction {
		MulticallAction::call(
			token,
			IERC20::transferCall {
				to,
				amount: U256::from(amount),
			}
			.abi_encode(),
		)
	}

	fn drain(token: Address, destination: Address) -> MulticallAction {
		MulticallAction::call(
			HANDLER,
			IMulticallHandler::drainLeftoverTokensCall { token, destination }.abi_encode(),
		)
	}

	#[test]
	fn test_exact_output_ordering() {
		let message = MessageBuilder::for_destination_swap(
			&cross_swap(AmountType::ExactOutput),
			&swap_quote(),
			ROUTER,
			HANDLER,
		)
		.build();

		let decoded = decode_message(&message).unwrap();
		assert_eq!(
			decoded.actions,
			vec![
				approve(WETH, ROUTER, 1_010),
				swap(),
				transfer(OP, RECIPIENT, 5_000),
				drain(OP, REFUND),
				drain(WETH, REFUND),
			]
		);
		assert_eq!(decoded.fallback_recipient, REFUND);
	}

	#[test]
	fn test_min_output_ordering() {
		let builder = MessageBuilder::for_destination_swap(
			&cross_swap(AmountType::MinOutput),
			&swap_quote(),
			ROUTER,
			HANDLER,
		);
		assert_eq!(
			builder.actions(),
			&[
				approve(WETH, ROUTER, 1_010),
				swap(),
				drain(OP, RECIPIENT),
				drain(WETH, REFUND),
			]
		);
	}

	#[test]
	fn test_min_output_sweeps_whole_balance_to_recipient() {
		// Favourable execution is not capped at the quoted minimum: the
		// recipient gets a full-balance drain, never a fixed-amount transfer.
		let builder = MessageBuilder::for_destination_swap(
			&cross_swap(AmountType::MinOutput),
			&swap_quote(),
			ROUTER,
			HANDLER,
		);
		let transfers_of_output = builder
			.actions()
			.iter()
			.filter(|a| a.target == OP)
			.count();
		assert_eq!(transfers_of_output, 0);
		assert!(builder.actions().contains(&drain(OP, RECIPIENT)));
	}

	#[test]
	fn test_native_output_unwraps_then_transfers_value() {
		let mut swap = cross_swap(AmountType::ExactOutput);
		swap.output_token = Token::new(WETH, 10, 18, "WETH");
		swap.is_output_native = true;

		let builder = MessageBuilder::for_bridge_delivery(&swap, WETH, swap.amount, HANDLER);
		let actions = builder.actions();
		assert_eq!(actions.len(), 3);
		assert_eq!(
			actions[0],
			MulticallAction::call(
				WETH,
				IWETH::withdrawCall {
					wad: U256::from(5_000u64)
				}
				.abi_encode()
			)
		);
		assert_eq!(
			actions[1],
			MulticallAction::native_transfer(RECIPIENT, U256::from(5_000u64))
		);
		assert_eq!(actions[2], drain(WETH, REFUND));
	}

	#[test]
	fn test_refund_on_origin_uses_zero_fallback() {
		let mut swap = cross_swap(AmountType::ExactOutput);
		swap.refund_on_origin = true;
		let message =
			MessageBuilder::for_bridge_delivery(&swap, OP, swap.amount, HANDLER).build();
		let decoded = decode_message(&message).unwrap();
		assert_eq!(decoded.fallback_recipient, Address::ZERO);
		// Leftovers on the destination still go to the refund address.
		assert_eq!(decoded.actions[1], drain(OP, REFUND));
	}

	#[test]
	fn test_decode_rejects_garbage() {
		assert!(matches!(
			decode_message(&[1, 2, 3]),
			Err(CrossSwapError::InvalidRequest(_))
		));
	}
}
