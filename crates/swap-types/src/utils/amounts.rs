//! Integer amount arithmetic: basis-point markups, slippage bounds and
//! decimal conversion between tokens.

use alloy_primitives::U256;

/// 100% expressed in basis points.
pub const BPS_DENOMINATOR: u64 = 10_000;

/// Returns `amount + amount * bps / 10_000`.
pub fn apply_markup_bps(amount: U256, bps: u32) -> U256 {
	let markup = amount.saturating_mul(U256::from(bps)) / U256::from(BPS_DENOMINATOR);
	amount.saturating_add(markup)
}

/// Converts a slippage tolerance in percent into basis points, capped at 100%.
pub fn slippage_bps(slippage_percent: f64) -> u64 {
	if !slippage_percent.is_finite() || slippage_percent <= 0.0 {
		return 0;
	}
	((slippage_percent * 100.0).round() as u64).min(BPS_DENOMINATOR)
}

/// Worst-case input bound for an expected input: rounds up.
pub fn with_max_slippage(amount: U256, slippage_percent: f64) -> U256 {
	let factor = U256::from(BPS_DENOMINATOR + slippage_bps(slippage_percent));
	let denominator = U256::from(BPS_DENOMINATOR);
	amount
		.saturating_mul(factor)
		.saturating_add(denominator - U256::from(1))
		/ denominator
}

/// Worst-case output bound for an expected output: rounds down.
pub fn with_min_slippage(amount: U256, slippage_percent: f64) -> U256 {
	let factor = U256::from(BPS_DENOMINATOR - slippage_bps(slippage_percent));
	amount.saturating_mul(factor) / U256::from(BPS_DENOMINATOR)
}

/// Rescales `amount` from `from_decimals` to `to_decimals`.
///
/// Scaling down truncates.
pub fn convert_decimals(amount: U256, from_decimals: u8, to_decimals: u8) -> U256 {
	use std::cmp::Ordering;

	match from_decimals.cmp(&to_decimals) {
		Ordering::Equal => amount,
		Ordering::Less => {
			let scale = U256::from(10u64).pow(U256::from(to_decimals - from_decimals));
			amount.saturating_mul(scale)
		},
		Ordering::Greater => {
			let scale = U256::from(10u64).pow(U256::from(from_decimals - to_decimals));
			amount / scale
		},
	}
}

/// Like [`convert_decimals`] but rounds up when scaling down, so the result
/// is never worth less than `amount`.
pub fn convert_decimals_ceil(amount: U256, from_decimals: u8, to_decimals: u8) -> U256 {
	if from_decimals <= to_decimals {
		return convert_decimals(amount, from_decimals, to_decimals);
	}
	let scale = U256::from(10u64).pow(U256::from(from_decimals - to_decimals));
	if amount.is_zero() {
		return U256::ZERO;
	}
	(amount - U256::from(1)) / scale + U256::from(1)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_markup_half_percent() {
		assert_eq!(
			apply_markup_bps(U256::from(1_000_000u64), 50),
			U256::from(1_005_000u64)
		);
		assert_eq!(apply_markup_bps(U256::from(199u64), 50), U256::from(199u64));
		assert_eq!(apply_markup_bps(U256::ZERO, 50), U256::ZERO);
	}

	#[test]
	fn test_slippage_bounds() {
		assert_eq!(slippage_bps(0.5), 50);
		assert_eq!(slippage_bps(-1.0), 0);
		assert_eq!(slippage_bps(250.0), 10_000);

		assert_eq!(
			with_max_slippage(U256::from(1_000u64), 1.0),
			U256::from(1_010u64)
		);
		assert_eq!(with_max_slippage(U256::from(1u64), 0.5), U256::from(2u64));
		assert_eq!(
			with_min_slippage(U256::from(1_000u64), 1.0),
			U256::from(990u64)
		);
	}

	#[test]
	fn test_convert_decimals() {
		let one_usdc = U256::from(1_000_000u64);
		let one_dai = U256::from(10u64).pow(U256::from(18u64));
		assert_eq!(convert_decimals(one_usdc, 6, 18), one_dai);
		assert_eq!(convert_decimals(one_dai, 18, 6), one_usdc);
		assert_eq!(convert_decimals(U256::from(123u64), 6, 6), U256::from(123u64));
		assert_eq!(convert_decimals(U256::from(999u64), 6, 3), U256::from(0u64));
		assert_eq!(convert_decimals_ceil(U256::from(999u64), 6, 3), U256::from(1u64));
		assert_eq!(convert_decimals_ceil(U256::from(2_000u64), 6, 3), U256::from(2u64));
	}
}
