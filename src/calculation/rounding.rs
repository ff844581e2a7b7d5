//! Monetary rounding rules.
//!
//! Money is rounded half-up (away from zero at the midpoint) to two decimal
//! places; tax brackets round to whole currency units.

use rust_decimal::{Decimal, RoundingStrategy};

/// Decimal places kept on monetary amounts.
pub const MONEY_DECIMAL_PLACES: u32 = 2;

/// Rounds a monetary amount to two decimal places, half-up.
///
/// ```
/// use payroll_engine::calculation::round_money;
/// use rust_decimal::Decimal;
///
/// assert_eq!(round_money(Decimal::new(12345, 3)), Decimal::new(1235, 2));
/// ```
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(MONEY_DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

/// Rounds to the nearest whole currency unit, half-up.
pub fn round_whole(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}
