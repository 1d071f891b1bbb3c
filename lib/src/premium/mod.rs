//! Hundred-price and premium computation for new CBAS trades.

use crate::{
    calendar::{add_months, next_business_day, settlement_label},
    config::DeskConfig,
    constants::{FEE_DIVISOR, PAR_PRICE, PRICE_DECIMALS},
    error::{CbasError, CbasResult},
    exercise::Warning,
    rates::{RateFeeResolver, ResolvedRateFee},
    types::{
        overrides::RateFeeOverrides,
        quotes::{InstrumentQuote, Quotes},
        trades::TradeRow,
        HolidaySet,
    },
    utils::{lots_amount, round_half_up, tenor_years},
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, info, warn};

/// Everything the premium formula needs, already resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PremiumInputs {
    /// Interest rate, in percent.
    pub rate: Decimal,
    pub tenor_years: Decimal,
    pub sellback_price: Decimal,
    /// Fee per 1,000 of face value.
    pub fee: u32,
    /// Average traded price, unrounded.
    pub traded_price: Decimal,
    pub quantity: u64,
}

/// The premium of a trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PremiumQuote {
    /// Option price per 100 of face value, rounded to 2 decimals.
    pub hundred_price: Decimal,
    /// Premium per 100 of face value: `(traded - 100) + hundred_price`.
    pub unit_premium: Decimal,
    /// Premium in currency units, rounded to an integer.
    pub total_premium: Decimal,
    /// Bond trade amount: `quantity * traded * 1000`.
    pub trade_amount: Decimal,
}

/// A fully priced new trade.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewTradePricing {
    pub customer_id: String,
    pub instrument_code: String,
    pub instrument_name: String,
    pub trade_date: NaiveDate,
    pub settlement_date: NaiveDate,
    /// Business-day distance from trade to settlement, e.g. `T+2`.
    pub settlement_label: String,
    /// First date the option may be exercised early.
    pub early_exercise_date: NaiveDate,
    pub sellback_date: NaiveDate,
    pub sellback_price: Decimal,
    pub option_expiry_date: NaiveDate,
    pub tenor_years: Decimal,
    pub quantity: u64,
    pub traded_price: Decimal,
    pub rate_fee: ResolvedRateFee,
    pub premium: PremiumQuote,
    pub warnings: Vec<Warning>,
}

/// Computes the hundred-price and premium of a trade.
///
/// `hundred_price = round(rate * tenor - (sellback - 100) + fee / 1000, 2)`, half-up. The
/// unit premium adds the unrounded traded price to the rounded hundred-price.
///
/// # Arguments
///
/// * `inputs` - Rate, tenor, sellback price, fee, traded price and quantity of the trade.
///
/// # Returns
///
/// The hundred-price, the unit and total premium and the bond trade amount.
pub fn compute_premium(inputs: &PremiumInputs) -> PremiumQuote {
    let par: Decimal = Decimal::from(PAR_PRICE);
    let fee: Decimal = Decimal::from(inputs.fee) / Decimal::from(FEE_DIVISOR);

    let hundred_price: Decimal = round_half_up(
        inputs.rate * inputs.tenor_years - (inputs.sellback_price - par) + fee,
        PRICE_DECIMALS,
    );
    let unit_premium: Decimal = (inputs.traded_price - par) + hundred_price;
    let total_premium: Decimal = round_half_up(lots_amount(inputs.quantity, unit_premium), 0);

    PremiumQuote {
        hundred_price,
        unit_premium,
        total_premium,
        trade_amount: lots_amount(inputs.quantity, inputs.traded_price),
    }
}

/// Prices one new trade row: resolves its rate and fee, derives settlement and tenor, then
/// computes the premium.
///
/// The tenor is not floored. A sellback date before the settlement date prices on a negative
/// tenor and adds a [`Warning::NegativeTenor`].
///
/// # Arguments
///
/// * `row` - The trade row to price.
/// * `quote` - The quote of the row's instrument.
/// * `overrides` - Snapshot of the override tables.
/// * `config` - Desk configuration.
/// * `holidays` - Holiday set used for the settlement date.
/// * `today` - The trade date.
pub fn price_new_trade(
    row: &TradeRow,
    quote: &InstrumentQuote,
    overrides: &RateFeeOverrides,
    config: &DeskConfig,
    holidays: &HolidaySet,
    today: NaiveDate,
) -> CbasResult<NewTradePricing> {
    let resolver: RateFeeResolver = RateFeeResolver::new(overrides, config);
    price_with_resolver(&resolver, row, quote, config, holidays, today)
}

/// Prices a batch of new trade rows against the day's quote sheet. The override snapshot is
/// read once for the whole batch; the first failing row fails the batch.
///
/// # Arguments
///
/// * `rows` - The trade rows to price.
/// * `quotes` - The daily quote sheet.
/// * `overrides` - Snapshot of the override tables.
/// * `config` - Desk configuration.
/// * `holidays` - Holiday set used for the settlement date.
/// * `today` - The trade date.
pub fn price_new_trades(
    rows: &[TradeRow],
    quotes: &Quotes,
    overrides: &RateFeeOverrides,
    config: &DeskConfig,
    holidays: &HolidaySet,
    today: NaiveDate,
) -> CbasResult<Vec<NewTradePricing>> {
    let resolver: RateFeeResolver = RateFeeResolver::new(overrides, config);

    let priced: Vec<NewTradePricing> = rows
        .iter()
        .map(|row: &TradeRow| {
            let quote: &InstrumentQuote =
                quotes.get(row.instrument_code.trim()).ok_or_else(|| {
                    CbasError::invalid_input(
                        "instrument_code",
                        format!("no quote for instrument {}", row.instrument_code),
                    )
                })?;
            price_with_resolver(&resolver, row, quote, config, holidays, today)
        })
        .collect::<CbasResult<Vec<NewTradePricing>>>()?;

    info!(rows = priced.len(), %today, "priced new trades");
    Ok(priced)
}

fn price_with_resolver(
    resolver: &RateFeeResolver,
    row: &TradeRow,
    quote: &InstrumentQuote,
    config: &DeskConfig,
    holidays: &HolidaySet,
    today: NaiveDate,
) -> CbasResult<NewTradePricing> {
    if row.trade_quantity == 0 {
        return Err(CbasError::invalid_input(
            "trade_quantity",
            "trade quantity must be positive",
        ));
    }

    let rate_fee: ResolvedRateFee = resolver.resolve(row, quote)?;
    let settlement_date: NaiveDate =
        next_business_day(today, config.settlement_offset_days, holidays);
    let tenor: Decimal = tenor_years(quote.sellback_date, settlement_date);
    let mut warnings: Vec<Warning> = Vec::new();
    if tenor < Decimal::ZERO {
        warn!(
            customer_id = %row.customer_id,
            instrument_code = %row.instrument_code,
            sellback_date = %quote.sellback_date,
            %settlement_date,
            "sellback date before settlement, pricing on a negative tenor"
        );
        warnings.push(Warning::NegativeTenor {
            instrument_code: row.instrument_code.trim().to_string(),
            sellback_date: quote.sellback_date,
            settlement_date,
        });
    }

    let premium: PremiumQuote = compute_premium(&PremiumInputs {
        rate: rate_fee.rate,
        tenor_years: tenor,
        sellback_price: quote.sellback_price,
        fee: rate_fee.fee,
        traded_price: row.traded_price,
        quantity: row.trade_quantity,
    });

    debug!(
        customer_id = %row.customer_id,
        instrument_code = %row.instrument_code,
        hundred_price = %premium.hundred_price,
        total_premium = %premium.total_premium,
        "priced trade row"
    );

    Ok(NewTradePricing {
        customer_id: row.customer_id.trim().to_string(),
        instrument_code: row.instrument_code.trim().to_string(),
        instrument_name: quote.instrument_name.clone(),
        trade_date: today,
        settlement_date,
        settlement_label: settlement_label(today, settlement_date, holidays),
        early_exercise_date: add_months(today, config.early_exercise_lock_months),
        sellback_date: quote.sellback_date,
        sellback_price: quote.sellback_price,
        option_expiry_date: quote.option_expiry_date,
        tenor_years: tenor,
        quantity: row.trade_quantity,
        traded_price: row.traded_price,
        rate_fee,
        premium,
        warnings,
    })
}
