//! Settlement of options reaching their expiry date.

use crate::{
    calendar::next_business_day,
    config::DeskConfig,
    exercise::{ExerciseMethod, ExerciseTerms, TerminationKind, Warning},
    types::{
        contracts::{executed_quantity, Contract, ExecutedToday},
        HolidaySet,
    },
    utils::lots_amount,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{info, warn};

/// One expired contract settled at its exercise price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExpirySettlement {
    pub contract_id: String,
    pub customer_id: String,
    pub instrument_code: String,
    pub trade_date: NaiveDate,
    pub interest_rate: Decimal,
    pub executed_today: u64,
    /// Lots settled, the stored quantity minus what was executed today.
    pub quantity: u64,
    pub tenor_years: Decimal,
    pub exercise_price: Decimal,
    /// Expiries trade at the exercise price.
    pub traded_price: Decimal,
    /// `traded - exercise`, zero for an expiry.
    pub settlement_unit_price: Decimal,
    pub settlement_amount: Decimal,
    pub sale_amount: Decimal,
    pub termination: TerminationKind,
    pub method: ExerciseMethod,
}

/// All settlements of one expiry date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExpiryBatch {
    pub expiry_date: NaiveDate,
    pub settlement_date: NaiveDate,
    pub settlements: Vec<ExpirySettlement>,
    pub warnings: Vec<Warning>,
}

/// Settles every contract whose option expires on `expiry_date`.
///
/// Contracts fully executed earlier today are skipped. Settlement happens
/// `config.settlement_offset_days` business days after the expiry date.
///
/// # Arguments
///
/// * `expiry_date` - The expiry date being processed.
/// * `contracts` - Candidate contracts; those expiring on another date are ignored.
/// * `executed_today` - Lots already executed today per contract id.
/// * `holidays` - Holiday set used for the settlement date.
/// * `config` - Desk configuration.
pub fn settle_expired(
    expiry_date: NaiveDate,
    contracts: &[Contract],
    executed_today: &ExecutedToday,
    holidays: &HolidaySet,
    config: &DeskConfig,
) -> ExpiryBatch {
    let settlement_date: NaiveDate =
        next_business_day(expiry_date, config.settlement_offset_days, holidays);

    let mut expiring: Vec<&Contract> = contracts
        .iter()
        .filter(|contract: &&Contract| contract.option_expiry_date == expiry_date)
        .filter(|contract: &&Contract| contract.available_quantity(executed_today) > 0)
        .collect();
    expiring.sort_by(|a: &&Contract, b: &&Contract| {
        (&a.customer_id, &a.instrument_code, &a.id).cmp(&(
            &b.customer_id,
            &b.instrument_code,
            &b.id,
        ))
    });

    let mut warnings: Vec<Warning> = Vec::new();
    let settlements: Vec<ExpirySettlement> = expiring
        .into_iter()
        .map(|contract: &Contract| {
            let terms: ExerciseTerms = ExerciseTerms::of(contract, settlement_date);
            if terms.tenor_clamped {
                warn!(
                    contract_id = %contract.id,
                    sellback_date = %contract.sellback_date,
                    %settlement_date,
                    "expiry settles after sellback date, tenor floored at zero"
                );
                warnings.push(Warning::TenorClamped {
                    contract_id: contract.id.clone(),
                    sellback_date: contract.sellback_date,
                    settlement_date,
                });
            }

            let quantity: u64 = contract.available_quantity(executed_today);
            let traded_price: Decimal = terms.exercise_price;
            let settlement_unit_price: Decimal = traded_price - terms.exercise_price;
            ExpirySettlement {
                contract_id: contract.id.clone(),
                customer_id: contract.customer_id.clone(),
                instrument_code: contract.instrument_code.clone(),
                trade_date: contract.trade_date,
                interest_rate: contract.interest_rate,
                executed_today: executed_quantity(executed_today, &contract.id),
                quantity,
                tenor_years: terms.tenor_years,
                exercise_price: terms.exercise_price,
                traded_price,
                settlement_unit_price,
                settlement_amount: lots_amount(quantity, settlement_unit_price),
                sale_amount: lots_amount(quantity, terms.exercise_price).trunc(),
                termination: TerminationKind::Expiry,
                method: ExerciseMethod::AtExpiry,
            }
        })
        .collect();

    info!(
        %expiry_date,
        %settlement_date,
        contracts = settlements.len(),
        "settled expired contracts"
    );
    ExpiryBatch {
        expiry_date,
        settlement_date,
        settlements,
        warnings,
    }
}
