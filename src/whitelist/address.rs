//!
//! Address normalization for whitelist lookups and leaf hashing.
//!
//! Wallets and configuration files hand us addresses in whatever casing they like (checksummed,
//! upper, lower) and sometimes with stray whitespace. Everything that compares or hashes an
//! address goes through [`normalize`] first so that two spellings of the same account always
//! collapse to the same 20 bytes.

use alloy_primitives::Address;
use thiserror::Error;

/// Number of hex characters in a 20-byte address.
const ADDRESS_HEX_LEN: usize = 40;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AddressError {
	#[error("invalid address format: {0:?}")]
	InvalidAddressFormat(String),
}

/// Parse a raw address string into its canonical byte form.
///
/// Accepts 40 hex characters, optionally prefixed with `0x`/`0X`, surrounded by any amount of
/// whitespace. Casing is ignored and checksums are not enforced.
pub fn normalize(raw: &str) -> Result<Address, AddressError> {
	let trimmed = raw.trim();
	let digits = trimmed
		.strip_prefix("0x")
		.or_else(|| trimmed.strip_prefix("0X"))
		.unwrap_or(trimmed);

	if digits.len() != ADDRESS_HEX_LEN || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
		return Err(AddressError::InvalidAddressFormat(raw.to_string()));
	}

	let mut bytes = [0u8; 20];
	hex::decode_to_slice(digits, &mut bytes)
		.map_err(|_| AddressError::InvalidAddressFormat(raw.to_string()))?;

	Ok(Address::from(bytes))
}

/// Compare two raw address strings by their normalized bytes.
///
/// Unparseable input is never equal to anything, including itself.
pub fn equals(a: &str, b: &str) -> bool {
	match (normalize(a), normalize(b)) {
		(Ok(a), Ok(b)) => a == b,
		_ => false,
	}
}

/// Canonical textual form: `0x` followed by 40 lowercase hex characters.
pub fn canonical(address: &Address) -> String {
	format!("0x{}", hex::encode(address.as_slice()))
}

#[cfg(test)]
mod tests {
	use super::*;

	const MIXED: &str = "0xc039115a382b74715d479a692b34835501fdbEeC";

	#[test]
	fn test_normalize_ignores_case_and_prefix() {
		let upper = format!("0x{}", MIXED[2..].to_uppercase());
		let bare = MIXED[2..].to_lowercase();

		let a = normalize(MIXED).expect("mixed case parses");
		assert_eq!(normalize(&upper).unwrap(), a);
		assert_eq!(normalize(&bare).unwrap(), a);
		assert!(equals(&upper, &bare));
	}

	#[test]
	fn test_canonical_round_trip() {
		let address = normalize(&format!("  {}\n", MIXED)).unwrap();
		let text = canonical(&address);
		assert_eq!(text, MIXED.to_lowercase());
		assert_eq!(canonical(&normalize(&text).unwrap()), text);
	}

	#[test]
	fn test_rejects_malformed_input() {
		for raw in [
			"",
			"0x",
			"0x1234",
			"c039115a382b74715d479a692b34835501fdbEeC00",
			"0xz039115a382b74715d479a692b34835501fdbEeC",
			"0x c039115a382b74715d479a692b34835501fdbEe",
		] {
			assert_eq!(
				normalize(raw),
				Err(AddressError::InvalidAddressFormat(raw.to_string())),
				"{raw:?} should be rejected"
			);
		}
		assert!(!equals("nope", "nope"));
	}
}
