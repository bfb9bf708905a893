//! String formatting for logs and CLI output.

use alloy_primitives::U256;

/// Truncates an identifier or hex string to its first 8 characters.
pub fn truncate_id(id: &str) -> String {
	match id.char_indices().nth(8) {
		Some((idx, _)) => format!("{}..", &id[..idx]),
		None => id.to_string(),
	}
}

/// Adds a `0x` prefix unless one (of either case) is already present.
pub fn with_0x_prefix(hex_str: &str) -> String {
	if hex_str.starts_with("0x") || hex_str.starts_with("0X") {
		hex_str.to_string()
	} else {
		format!("0x{}", hex_str)
	}
}

pub fn without_0x_prefix(hex_str: &str) -> &str {
	hex_str
		.strip_prefix("0x")
		.or_else(|| hex_str.strip_prefix("0X"))
		.unwrap_or(hex_str)
}

/// Renders a raw on-chain amount with its decimal point, e.g. `1500000` at 6
/// decimals becomes `1.5`.
pub fn format_token_amount(amount: U256, decimals: u8) -> String {
	let raw = amount.to_string();
	if decimals == 0 {
		return raw;
	}

	let places = decimals as usize;
	let (integer_part, fraction) = if raw.len() <= places {
		("0".to_string(), format!("{:0>width$}", raw, width = places))
	} else {
		let split = raw.len() - places;
		(raw[..split].to_string(), raw[split..].to_string())
	};

	let fraction = fraction.trim_end_matches('0');
	if fraction.is_empty() {
		integer_part
	} else {
		format!("{}.{}", integer_part, fraction)
	}
}
