use alloy_primitives::U256;

/// Render a fixed-point token amount (wei for ETH) with `decimals` fractional digits, trimming
/// trailing zeros: `format_token_amount(1_500_000_000_000_000_000, 18) == "1.5"`.
pub fn format_token_amount(amount: U256, decimals: usize) -> String {
	let digits = amount.to_string();
	if decimals == 0 {
		return digits;
	}

	let padded = format!("{:0>width$}", digits, width = decimals + 1);
	let (whole, fraction) = padded.split_at(padded.len() - decimals);
	let fraction = fraction.trim_end_matches('0');

	if fraction.is_empty() {
		whole.to_string()
	} else {
		format!("{}.{}", whole, fraction)
	}
}

/// Upper-case the first character of a provider message ("execution reverted" → "Execution reverted").
pub fn capitalize_first(message: &str) -> String {
	let mut chars = message.chars();
	match chars.next() {
		Some(first) => first.to_uppercase().chain(chars).collect(),
		None => String::new(),
	}
}
