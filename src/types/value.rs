//! Fixed-point value utilities and settlement arithmetic.
//!
//! ## Overview
//!
//! All native values in the auction house use fixed-point representation to
//! avoid floating-point errors. Values are stored as u64 scaled by 10^8.
//!
//! ## Why Fixed-Point?
//!
//! Floating-point arithmetic can produce different results on different
//! hardware, breaking determinism. Fixed-point ensures identical settlement
//! amounts everywhere.
//!
//! ## Examples
//!
//! ```
//! use auction_house::types::value::{to_fixed, from_fixed, split_proceeds};
//!
//! let bid = to_fixed("150.0").unwrap();
//! assert_eq!(from_fixed(bid), "150.00000000");
//!
//! // 5% fee on a 200-unit winning bid: 10 to the operator, 190 to the seller
//! let (fee, seller) = split_proceeds(to_fixed("200").unwrap(), 5);
//! assert_eq!(fee, to_fixed("10").unwrap());
//! assert_eq!(seller, to_fixed("190").unwrap());
//! ```

use rust_decimal::prelude::*;
use rust_decimal::Decimal;

/// Scaling factor for fixed-point arithmetic: 10^8
///
/// This provides 8 decimal places of precision.
pub const SCALE: u64 = 100_000_000;

/// Maximum value that can be safely represented
///
/// u64::MAX / SCALE ≈ 184,467,440,737 (184 billion)
pub const MAX_VALUE: u64 = u64::MAX / SCALE;

// ============================================================================
// Conversion Functions
// ============================================================================

/// Convert a decimal string to fixed-point u64
///
/// # Returns
///
/// * `Some(u64)` - The fixed-point representation
/// * `None` - If parsing fails or value is negative/out of range
///
/// # Example
///
/// ```
/// use auction_house::types::value::to_fixed;
///
/// assert_eq!(to_fixed("1.0"), Some(100_000_000));
/// assert_eq!(to_fixed("0.00000001"), Some(1));
/// assert_eq!(to_fixed("-1"), None);
/// ```
pub fn to_fixed(s: &str) -> Option<u64> {
    let decimal = Decimal::from_str(s).ok()?;
    decimal_to_fixed(decimal)
}

/// Convert a Decimal to fixed-point u64
///
/// Returns `None` if the value is negative or out of range.
pub fn decimal_to_fixed(d: Decimal) -> Option<u64> {
    if d.is_sign_negative() {
        return None;
    }

    let scaled = d.checked_mul(Decimal::from(SCALE))?;
    let rounded = scaled.round_dp(0);
    rounded.to_u64()
}

/// Convert fixed-point u64 to a Decimal
pub fn fixed_to_decimal(value: u64) -> Decimal {
    Decimal::from(value) / Decimal::from(SCALE)
}

/// Convert fixed-point u64 to a string with 8 decimal places
///
/// # Example
///
/// ```
/// use auction_house::types::value::from_fixed;
///
/// assert_eq!(from_fixed(100_000_000), "1.00000000");
/// ```
pub fn from_fixed(value: u64) -> String {
    let decimal = fixed_to_decimal(value);
    format!("{:.8}", decimal)
}

/// Convert fixed-point u64 to a human-readable string (trimmed trailing zeros)
///
/// # Example
///
/// ```
/// use auction_house::types::value::from_fixed_trimmed;
///
/// assert_eq!(from_fixed_trimmed(150_000_000), "1.5");
/// ```
pub fn from_fixed_trimmed(value: u64) -> String {
    let decimal = fixed_to_decimal(value);
    format!("{}", decimal.normalize())
}

// ============================================================================
// Settlement Arithmetic
// ============================================================================

/// Split a winning bid into (operator fee, seller proceeds).
///
/// The fee is `floor(winning_bid * fee_percentage / 100)`; the seller receives
/// the remainder. The two parts always sum to the winning bid exactly, for all
/// fee rates in [0, 100] and all bid values.
///
/// The intermediate product is computed in u128 so the maximum bid value at
/// the maximum fee rate cannot overflow.
///
/// # Panics
///
/// Debug builds assert `fee_percentage <= 100`; the engine validates the rate
/// before it is ever stored.
pub fn split_proceeds(winning_bid: u64, fee_percentage: u8) -> (u64, u64) {
    debug_assert!(fee_percentage <= 100);

    let fee = ((winning_bid as u128 * fee_percentage as u128) / 100) as u64;
    (fee, winning_bid - fee)
}

// ============================================================================
// Unit Tests
// ============================================================================
