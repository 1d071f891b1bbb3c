use crate::constants::{DAYS_PER_YEAR, LOT_MULTIPLIER, PAR_PRICE, PRICE_DECIMALS};
use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};

#[cfg(test)]
mod tests;

/// Rounds half away from zero, the commercial rounding used for every monetary amount.
///
/// # Arguments
///
/// * `value` - The value to round.
/// * `decimals` - Number of decimal places to keep.
pub fn round_half_up(value: Decimal, decimals: u32) -> Decimal {
    value.round_dp_with_strategy(decimals, RoundingStrategy::MidpointAwayFromZero)
}

/// Computes the tenor in years between a settlement date and a sellback date, counting both
/// ends: `((sellback - settlement).days + 1) / 365`.
///
/// # Arguments
///
/// * `sellback_date` - The bond's sellback date.
/// * `settlement_date` - The settlement date of the trade.
///
/// # Returns
///
/// The tenor in years, negative if the settlement date is more than a day past the sellback
/// date.
pub fn tenor_years(sellback_date: NaiveDate, settlement_date: NaiveDate) -> Decimal {
    let days: i64 = sellback_date
        .signed_duration_since(settlement_date)
        .num_days();
    Decimal::from(days + 1) / Decimal::from(DAYS_PER_YEAR)
}

/// Same as [`tenor_years`] but floored at zero.
///
/// # Returns
///
/// The clamped tenor and whether clamping happened.
pub fn clamped_tenor_years(
    sellback_date: NaiveDate,
    settlement_date: NaiveDate,
) -> (Decimal, bool) {
    let tenor: Decimal = tenor_years(sellback_date, settlement_date);
    if tenor < Decimal::ZERO {
        (Decimal::ZERO, true)
    } else {
        (tenor, false)
    }
}

/// Computes the exercise price of a contract: the sellback price minus the interest accrued
/// over the remaining tenor, `round(sellback - 100 * tenor * rate / 100, 2)`.
///
/// # Arguments
///
/// * `sellback_price` - The bond's sellback price.
/// * `tenor` - Remaining tenor in years.
/// * `rate` - The contract's interest rate, in percent.
pub fn exercise_price(sellback_price: Decimal, tenor: Decimal, rate: Decimal) -> Decimal {
    let par: Decimal = Decimal::from(PAR_PRICE);
    round_half_up(sellback_price - par * tenor * rate / par, PRICE_DECIMALS)
}

/// Converts a per-100 price difference over a number of lots into a currency amount,
/// `quantity * price * 1000`.
pub fn lots_amount(quantity: u64, price: Decimal) -> Decimal {
    Decimal::from(quantity) * price * Decimal::from(LOT_MULTIPLIER)
}
