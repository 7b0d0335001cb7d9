//! Money calculation utilities using rust_decimal for precision
//!
//! Amounts travel as `f64`; every sum and product is done in `Decimal` and
//! rounded to cents when converted back.

use rust_decimal::prelude::*;

/// Rounding strategy for monetary values (2 decimal places, half away from zero)
const DECIMAL_PLACES: u32 = 2;

/// Tolerance for monetary comparisons (0.01)
pub const MONEY_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Service surcharge rate (10%)
pub const SURCHARGE_RATE: Decimal = Decimal::from_parts(10, 0, 0, false, 2);

/// Convert f64 to Decimal for calculation
#[inline]
pub fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_else(|| {
        tracing::error!(value = ?value, "Non-finite f64 in monetary calculation, defaulting to zero");
        Decimal::ZERO
    })
}

/// Convert Decimal back to f64, rounded to 2 decimal places
#[inline]
pub fn to_f64(value: Decimal) -> f64 {
    round_money(value).to_f64().unwrap_or_default()
}

/// Round to cents
#[inline]
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

/// Parse an operator-typed amount (`"12,50"`, `"7.25"`); invalid input is 0.
pub fn parse_money(text: &str) -> Decimal {
    shared::util::parse_number_text(text)
        .map(to_decimal)
        .unwrap_or(Decimal::ZERO)
}

/// `price × quantity`; an overflowing product (garbage from the server) is
/// logged and counts as 0.
pub fn times_quantity(price: Decimal, quantity: u32) -> Decimal {
    price
        .checked_mul(Decimal::from(quantity))
        .unwrap_or_else(|| {
            tracing::warn!(%price, quantity, "Line amount overflows, using zero");
            Decimal::ZERO
        })
}

/// Sum of amounts; on overflow the sum is logged and counts as 0.
pub fn checked_sum(amounts: impl IntoIterator<Item = Decimal>) -> Decimal {
    amounts
        .into_iter()
        .try_fold(Decimal::ZERO, Decimal::checked_add)
        .unwrap_or_else(|| {
            tracing::warn!("Amount sum overflows, using zero");
            Decimal::ZERO
        })
}

/// Format as Brazilian currency, e.g. `R$ 1234,50`
pub fn format_brl(value: f64) -> String {
    format!("R$ {:.2}", to_f64(to_decimal(value))).replace('.', ",")
}

/// Whether two amounts are equal within [`MONEY_TOLERANCE`]
pub fn money_eq(a: Decimal, b: Decimal) -> bool {
    (a - b).abs() < MONEY_TOLERANCE
}
