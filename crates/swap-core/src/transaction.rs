//! Origin-chain transaction encoding.
//!
//! A composed quote without an origin swap is a plain spoke pool deposit.
//! With an origin swap, the periphery contract pulls the input token, runs the
//! swap and deposits the proceeds in the same transaction.

use crate::routes::RouteRegistry;
use crate::CrossSwapError;
use alloy_primitives::{hex, Address, Bytes, B256, U256};
use alloy_sol_types::{sol, SolCall};
use serde::Serialize;
use swap_chain::ChainReaderInterface;
use swap_dex::DexStrategyInterface;
use swap_types::{CrossSwapQuotes, CrossSwapTx, DepositStruct, SwapQuote};
use tracing::debug;

sol! {
	interface ISpokePool {
		function depositV3(
			address depositor,
			address recipient,
			address inputToken,
			address outputToken,
			uint256 inputAmount,
			uint256 outputAmount,
			uint256 destinationChainId,
			address exclusiveRelayer,
			uint32 quoteTimestamp,
			uint32 fillDeadline,
			uint32 exclusivityDeadline,
			bytes message
		) external payable;
	}

	struct DepositData {
		address depositor;
		address recipient;
		address inputToken;
		address outputToken;
		uint256 inputAmount;
		uint256 outputAmount;
		uint256 destinationChainId;
		address exclusiveRelayer;
		uint32 quoteTimestamp;
		uint32 fillDeadline;
		uint32 exclusivityDeadline;
		bytes message;
	}

	struct SwapAndDepositData {
		address swapToken;
		address exchange;
		uint256 swapTokenAmount;
		uint256 minExpectedInputTokenAmount;
		bytes routerCalldata;
		DepositData depositData;
	}

	interface ISpokePoolPeriphery {
		function swapAndBridge(SwapAndDepositData calldata swapAndDepositData) external payable;
		function swapAndBridgeWithPermit(SwapAndDepositData calldata swapAndDepositData, uint256 deadline, bytes calldata permitSignature) external;
		function swapAndBridgeWithAuthorization(SwapAndDepositData calldata swapAndDepositData, uint256 validAfter, uint256 validBefore, bytes32 nonce, bytes calldata receiveWithAuthSignature) external;
		function depositWithPermit(DepositData calldata depositData, uint256 deadline, bytes calldata permitSignature) external;
		function depositWithAuthorization(DepositData calldata depositData, uint256 validAfter, uint256 validBefore, bytes32 nonce, bytes calldata receiveWithAuthSignature) external;
	}
}

/// Separates the calldata from the trailing integrator id.
pub const INTEGRATOR_DELIMITER: [u8; 3] = [0x1d, 0xc0, 0xde];

/// Origin swap parameters handed to the periphery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OriginSwap {
	pub swap_token: Address,
	pub exchange: Address,
	pub swap_token_amount: U256,
	pub min_expected_input_token_amount: U256,
	pub router_calldata: Bytes,
}

impl From<&SwapQuote> for OriginSwap {
	fn from(quote: &SwapQuote) -> Self {
		Self {
			swap_token: quote.token_in.address,
			exchange: quote.swap_tx.to,
			swap_token_amount: quote.maximum_amount_in,
			min_expected_input_token_amount: quote.min_amount_out,
			router_calldata: quote.swap_tx.data.clone(),
		}
	}
}

impl From<&DepositStruct> for DepositData {
	fn from(d: &DepositStruct) -> Self {
		Self {
			depositor: d.depositor,
			recipient: d.recipient,
			inputToken: d.input_token,
			outputToken: d.output_token,
			inputAmount: d.input_amount,
			outputAmount: d.output_amount,
			destinationChainId: U256::from(d.destination_chain_id),
			exclusiveRelayer: d.exclusive_relayer,
			quoteTimestamp: d.quote_timestamp,
			fillDeadline: d.fill_deadline,
			exclusivityDeadline: d.exclusivity_deadline,
			message: d.message.clone(),
		}
	}
}

pub(crate) fn swap_and_deposit_data(swap: &OriginSwap, deposit: &DepositStruct) -> SwapAndDepositData {
	SwapAndDepositData {
		swapToken: swap.swap_token,
		exchange: swap.exchange,
		swapTokenAmount: swap.swap_token_amount,
		minExpectedInputTokenAmount: swap.min_expected_input_token_amount,
		routerCalldata: swap.router_calldata.clone(),
		depositData: deposit.into(),
	}
}

/// Appends `0x1dc0de` and the 2-byte integrator id to `data`.
///
/// The id is given as 4 hex digits, optionally `0x`-prefixed.
pub fn tag_integrator(data: &Bytes, integrator_id: &str) -> Result<Bytes, CrossSwapError> {
	let digits = integrator_id.strip_prefix("0x").unwrap_or(integrator_id);
	let id = hex::decode(digits)
		.ok()
		.filter(|bytes| bytes.len() == 2)
		.ok_or_else(|| {
			CrossSwapError::InvalidRequest(format!(
				"Integrator id must be 2 bytes of hex, got '{}'",
				integrator_id
			))
		})?;

	let mut tagged = Vec::with_capacity(data.len() + INTEGRATOR_DELIMITER.len() + id.len());
	tagged.extend_from_slice(data);
	tagged.extend_from_slice(&INTEGRATOR_DELIMITER);
	tagged.extend_from_slice(&id);
	Ok(tagged.into())
}

pub struct TransactionBuilder<'a> {
	pub routes: &'a RouteRegistry,
	pub dex: &'a dyn DexStrategyInterface,
	pub chain: &'a dyn ChainReaderInterface,
}

impl TransactionBuilder<'_> {
	/// Fill deadline: the spoke pool's clock plus its fill deadline buffer.
	pub async fn fill_deadline(&self, chain_id: u64) -> Result<u32, CrossSwapError> {
		let (now, buffer) = tokio::join!(
			self.chain.spoke_pool_current_time(chain_id),
			self.chain.fill_deadline_buffer(chain_id),
		);
		Ok(now?.saturating_add(buffer?))
	}

	/// The deposit fields for `quotes`.
	///
	/// The handler receives the bridged funds whenever there is a message to
	/// act on them; otherwise they go straight to the recipient.
	pub async fn deposit(&self, quotes: &CrossSwapQuotes) -> Result<DepositStruct, CrossSwapError> {
		let cross_swap = &quotes.cross_swap;
		let bridge = &quotes.bridge_quote;
		let fill_deadline = self.fill_deadline(cross_swap.origin_chain_id()).await?;

		let recipient = if bridge.message.is_empty() {
			cross_swap.recipient
		} else {
			self.routes
				.network(cross_swap.destination_chain_id())?
				.multicall_handler_address
		};
		let depositor = if cross_swap.refund_on_origin {
			cross_swap.refund_target()
		} else {
			cross_swap.depositor
		};

		Ok(DepositStruct {
			depositor,
			recipient,
			input_token: bridge.input_token.address,
			output_token: bridge.output_token.address,
			input_amount: bridge.input_amount,
			output_amount: bridge.output_amount,
			destination_chain_id: cross_swap.destination_chain_id(),
			exclusive_relayer: bridge.suggested_fees.exclusive_relayer,
			quote_timestamp: bridge.suggested_fees.timestamp,
			fill_deadline,
			exclusivity_deadline: bridge.suggested_fees.exclusivity_deadline,
			message: bridge.message.clone(),
		})
	}

	/// Encodes the direct transaction for `quotes`.
	pub async fn build(
		&self,
		quotes: &CrossSwapQuotes,
		integrator_id: Option<&str>,
	) -> Result<CrossSwapTx, CrossSwapError> {
		let cross_swap = &quotes.cross_swap;
		let chain_id = cross_swap.origin_chain_id();
		let deposit = self.deposit(quotes).await?;

		let (to, data, value) = match &quotes.origin_swap_quote {
			None => {
				let to = self.routes.network(chain_id)?.spoke_pool_address;
				let data = deposit_v3_call(&deposit).abi_encode();
				let value = if cross_swap.is_input_native {
					deposit.input_amount
				} else {
					U256::ZERO
				};
				(to, data, value)
			},
			Some(origin_swap) => {
				let to = self.dex.periphery_address(chain_id).await?;
				let swap = OriginSwap::from(origin_swap);
				let data = ISpokePoolPeriphery::swapAndBridgeCall {
					swapAndDepositData: swap_and_deposit_data(&swap, &deposit),
				}
				.abi_encode();
				let value = if cross_swap.is_input_native {
					origin_swap.maximum_amount_in
				} else {
					U256::ZERO
				};
				(to, data, value)
			},
		};

		let data: Bytes = data.into();
		let data = match integrator_id {
			Some(id) => tag_integrator(&data, id)?,
			None => data,
		};
		debug!(chain_id, to = %to, value = %value, "Encoded cross-swap transaction");

		Ok(CrossSwapTx {
			chain_id,
			from: cross_swap.depositor,
			to,
			data,
			value,
		})
	}
}

fn deposit_v3_call(d: &DepositStruct) -> ISpokePool::depositV3Call {
	ISpokePool::depositV3Call {
		depositor: d.depositor,
		recipient: d.recipient,
		inputToken: d.input_token,
		outputToken: d.output_token,
		inputAmount: d.input_amount,
		outputAmount: d.output_amount,
		destinationChainId: U256::from(d.destination_chain_id),
		exclusiveRelayer: d.exclusive_relayer,
		quoteTimestamp: d.quote_timestamp,
		fillDeadline: d.fill_deadline,
		exclusivityDeadline: d.exclusivity_deadline,
		message: d.message.clone(),
	}
}

/// Signature window of a gasless call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum SignatureWindow {
	Permit {
		deadline: U256,
	},
	Authorization {
		valid_after: U256,
		valid_before: U256,
		nonce: B256,
	},
}

/// Periphery call that is completed once the user has signed.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CallTemplate {
	pub chain_id: u64,
	pub from: Address,
	pub to: Address,
	pub method: &'static str,
	pub deposit: DepositStruct,
	pub swap: Option<OriginSwap>,
	pub window: SignatureWindow,
}

impl CallTemplate {
	pub fn new(
		chain_id: u64,
		from: Address,
		periphery: Address,
		deposit: DepositStruct,
		swap: Option<OriginSwap>,
		window: SignatureWindow,
	) -> Self {
		let method = match (&swap, &window) {
			(None, SignatureWindow::Permit { .. }) => "depositWithPermit",
			(Some(_), SignatureWindow::Permit { .. }) => "swapAndBridgeWithPermit",
			(None, SignatureWindow::Authorization { .. }) => "depositWithAuthorization",
			(Some(_), SignatureWindow::Authorization { .. }) => "swapAndBridgeWithAuthorization",
		};
		Self {
			chain_id,
			from,
			to: periphery,
			method,
			deposit,
			swap,
			window,
		}
	}

	/// Encodes the final transaction with the user's signature.
	pub fn with_signature(&self, signature: Bytes) -> CrossSwapTx {
		let deposit_data = DepositData::from(&self.deposit);
		let data = match (&self.swap, &self.window) {
			(None, SignatureWindow::Permit { deadline }) => ISpokePoolPeriphery::depositWithPermitCall {
				depositData: deposit_data,
				deadline: *deadline,
				permitSignature: signature,
			}
			.abi_encode(),
			(Some(swap), SignatureWindow::Permit { deadline }) => {
				ISpokePoolPeriphery::swapAndBridgeWithPermitCall {
					swapAndDepositData: swap_and_deposit_data(swap, &self.deposit),
					deadline: *deadline,
					permitSignature: signature,
				}
				.abi_encode()
			},
			(
				None,
				SignatureWindow::Authorization {
					valid_after,
					valid_before,
					nonce,
				},
			) => ISpokePoolPeriphery::depositWithAuthorizationCall {
				depositData: deposit_data,
				validAfter: *valid_after,
				validBefore: *valid_before,
				nonce: *nonce,
				receiveWithAuthSignature: signature,
			}
			.abi_encode(),
			(
				Some(swap),
				SignatureWindow::Authorization {
					valid_after,
					valid_before,
					nonce,
				},
			) => ISpokePoolPeriphery::swapAndBridgeWithAuthorizationCall {
				swapAndDepositData: swap_and_deposit_data(swap, &self.deposit),
				validAfter: *valid_after,
				validBefore: *valid_before,
				nonce: *nonce,
				receiveWithAuthSignature: signature,
			}
			.abi_encode(),
		};

		CrossSwapTx {
			chain_id: self.chain_id,
			from: self.from,
			to: self.to,
			data: data.into(),
			value: U256::ZERO,
		}
	}
}
