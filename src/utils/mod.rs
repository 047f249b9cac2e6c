//!
//! Utility module.
//!
//! Re-exports formatting helpers used by the view model and error surfacing.
/// Utility functions for formatting and display
pub mod index;

pub use index::{capitalize_first, format_token_amount};

/// Decimals of the native currency on both supported networks.
pub const NATIVE_TOKEN_DECIMALS: usize = 18;
