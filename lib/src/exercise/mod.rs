//! Early exercise allocation: a customer exercises a quantity of one instrument and the desk
//! decides which contracts are closed and at what price.

pub mod summary;

use crate::{
    allocation::{allocate_legs, AllocationLeg, Availability, ExercisePriority, LegPlan},
    error::{CbasError, CbasResult},
    types::contracts::{Contract, ExecutedToday},
    utils::{clamped_tenor_years, exercise_price, lots_amount},
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
pub use summary::ExerciseSummary;
use tracing::{info, warn};

/// How a contract ends up after an exercise or settlement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminationKind {
    /// The option expired and was settled at its exercise price.
    Expiry,
    /// Part of the contract was exercised.
    Partial,
    /// The contract was exercised down to zero.
    Full,
}

impl TerminationKind {
    /// The back-office code of the termination kind.
    pub fn code(&self) -> char {
        match self {
            TerminationKind::Expiry => '0',
            TerminationKind::Partial => '1',
            TerminationKind::Full => '2',
        }
    }
}

/// Whether an exercise happens before or at expiry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExerciseMethod {
    AtExpiry,
    #[default]
    Early,
}

impl ExerciseMethod {
    /// The back-office code of the exercise method.
    pub fn code(&self) -> char {
        match self {
            ExerciseMethod::AtExpiry => '1',
            ExerciseMethod::Early => '2',
        }
    }
}

/// A request to exercise `quantity` lots of one (customer, instrument) position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExerciseRequest {
    pub customer_id: String,
    pub instrument_code: String,
    pub quantity: u64,
    pub settlement_date: NaiveDate,
    /// Price of the underlying bond the exercise is settled against.
    pub reference_price: Decimal,
    #[serde(default)]
    pub method: ExerciseMethod,
}

/// Tenor and exercise price of a contract for a given settlement date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExerciseTerms {
    pub tenor_years: Decimal,
    pub exercise_price: Decimal,
    /// True if the settlement date fell past the sellback date and the tenor was floored at 0.
    pub tenor_clamped: bool,
}

impl ExerciseTerms {
    /// Computes the exercise terms of a contract settling on `settlement_date`.
    pub fn of(contract: &Contract, settlement_date: NaiveDate) -> Self {
        let (tenor_years, tenor_clamped) =
            clamped_tenor_years(contract.sellback_date, settlement_date);
        Self {
            tenor_years,
            exercise_price: exercise_price(
                contract.sellback_price,
                tenor_years,
                contract.interest_rate,
            ),
            tenor_clamped,
        }
    }
}

/// One contract's part in an exercise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Allocation {
    pub contract_id: String,
    pub trade_date: NaiveDate,
    pub interest_rate: Decimal,
    pub sellback_date: NaiveDate,
    pub sellback_price: Decimal,
    /// Lots executed on this contract earlier today.
    pub executed_today: u64,
    /// Lots exercised by this allocation.
    pub quantity: u64,
    pub remaining_after: u64,
    pub closed: bool,
    pub tenor_years: Decimal,
    pub tenor_clamped: bool,
    pub exercise_price: Decimal,
    pub reference_price: Decimal,
    /// `quantity * (reference - exercise) * 1000`.
    pub settlement_amount: Decimal,
    /// `trunc(exercise * quantity * 1000)`.
    pub sale_amount: Decimal,
    pub termination: TerminationKind,
    pub method: ExerciseMethod,
}

/// Non-fatal conditions found while allocating or pricing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Warning {
    /// The open contracts could not cover the whole request.
    Shortfall {
        requested: u64,
        allocated: u64,
        shortfall: u64,
    },
    /// The reference price is at or below the exercise price; the exercise needs approval.
    PriceInversion {
        contract_id: String,
        reference_price: Decimal,
        exercise_price: Decimal,
    },
    /// The settlement date is past the contract's sellback date; the tenor was floored at 0.
    TenorClamped {
        contract_id: String,
        sellback_date: NaiveDate,
        settlement_date: NaiveDate,
    },
    /// A new trade settles after its instrument's sellback date and was priced on a negative
    /// tenor.
    NegativeTenor {
        instrument_code: String,
        sellback_date: NaiveDate,
        settlement_date: NaiveDate,
    },
}

/// The outcome of an exercise request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExerciseResult {
    pub allocations: Vec<Allocation>,
    pub shortfall: u64,
    pub warnings: Vec<Warning>,
}

impl ExerciseResult {
    /// Returns true if any allocation is priced at or above the reference price.
    pub fn requires_approval(&self) -> bool {
        self.warnings
            .iter()
            .any(|warning: &Warning| matches!(warning, Warning::PriceInversion { .. }))
    }

    /// Total lots allocated across all contracts.
    pub fn allocated_quantity(&self) -> u64 {
        self.allocations
            .iter()
            .map(|allocation: &Allocation| allocation.quantity)
            .sum()
    }

    /// Folds the allocations into totals for reporting.
    pub fn summary(&self) -> ExerciseSummary {
        ExerciseSummary::from_result(self)
    }
}

/// Allocates an exercise request across the customer's open contracts.
///
/// Contracts are consumed by interest rate descending, trade date ascending, remaining quantity
/// ascending and contract id ascending. Each contract gives up to its remaining quantity; lots
/// executed on it earlier today are reported on the allocation but not deducted. What is left
/// unfilled is reported as a shortfall.
///
/// # Arguments
///
/// * `request` - The exercise request.
/// * `contracts` - The customer's open contracts in the requested instrument.
/// * `executed_today` - Lots already executed today per contract id.
///
/// # Returns
///
/// The allocations, the shortfall and the warnings, or `InvalidInput` if the quantity is zero
/// or a contract belongs to another position.
pub fn allocate_exercise(
    request: &ExerciseRequest,
    contracts: &[Contract],
    executed_today: &ExecutedToday,
) -> CbasResult<ExerciseResult> {
    validate_request(request, contracts)?;

    let plan: LegPlan = allocate_legs::<ExercisePriority>(
        request.quantity,
        contracts,
        executed_today,
        Availability::Remaining,
    );

    let mut warnings: Vec<Warning> = Vec::new();
    let allocations: Vec<Allocation> = plan
        .legs
        .iter()
        .map(|leg: &AllocationLeg| exercise_leg(request, leg, &mut warnings))
        .collect();

    if plan.shortfall > 0 {
        warn!(
            customer_id = %request.customer_id,
            instrument_code = %request.instrument_code,
            requested = request.quantity,
            shortfall = plan.shortfall,
            "exercise request not fully covered"
        );
        warnings.push(Warning::Shortfall {
            requested: request.quantity,
            allocated: request.quantity - plan.shortfall,
            shortfall: plan.shortfall,
        });
    }

    let result: ExerciseResult = ExerciseResult {
        allocations,
        shortfall: plan.shortfall,
        warnings,
    };
    info!(
        customer_id = %request.customer_id,
        instrument_code = %request.instrument_code,
        contracts = result.allocations.len(),
        allocated = result.allocated_quantity(),
        requires_approval = result.requires_approval(),
        "allocated exercise"
    );
    Ok(result)
}

fn validate_request(request: &ExerciseRequest, contracts: &[Contract]) -> CbasResult<()> {
    if request.quantity == 0 {
        return Err(CbasError::invalid_input(
            "quantity",
            "exercise quantity must be positive",
        ));
    }
    if request.customer_id.trim().is_empty() {
        return Err(CbasError::invalid_input(
            "customer_id",
            "exercise request has no customer",
        ));
    }
    if let Some(foreign) = contracts.iter().find(|contract: &&Contract| {
        !contract.belongs_to(&request.customer_id, &request.instrument_code)
    }) {
        return Err(CbasError::invalid_input(
            "contracts",
            format!(
                "contract {} does not belong to {}/{}",
                foreign.id, request.customer_id, request.instrument_code
            ),
        ));
    }
    Ok(())
}

fn exercise_leg(
    request: &ExerciseRequest,
    leg: &AllocationLeg,
    warnings: &mut Vec<Warning>,
) -> Allocation {
    let contract: &Contract = &leg.contract;
    let terms: ExerciseTerms = ExerciseTerms::of(contract, request.settlement_date);

    if terms.tenor_clamped {
        warn!(
            contract_id = %contract.id,
            sellback_date = %contract.sellback_date,
            settlement_date = %request.settlement_date,
            "settlement after sellback date, tenor floored at zero"
        );
        warnings.push(Warning::TenorClamped {
            contract_id: contract.id.clone(),
            sellback_date: contract.sellback_date,
            settlement_date: request.settlement_date,
        });
    }
    if request.reference_price <= terms.exercise_price {
        warn!(
            contract_id = %contract.id,
            reference_price = %request.reference_price,
            exercise_price = %terms.exercise_price,
            "reference price at or below exercise price"
        );
        warnings.push(Warning::PriceInversion {
            contract_id: contract.id.clone(),
            reference_price: request.reference_price,
            exercise_price: terms.exercise_price,
        });
    }

    let remaining_after: u64 = leg.remaining_after();
    Allocation {
        contract_id: contract.id.clone(),
        trade_date: contract.trade_date,
        interest_rate: contract.interest_rate,
        sellback_date: contract.sellback_date,
        sellback_price: contract.sellback_price,
        executed_today: leg.executed_today,
        quantity: leg.allocated,
        remaining_after,
        closed: remaining_after == 0,
        tenor_years: terms.tenor_years,
        tenor_clamped: terms.tenor_clamped,
        exercise_price: terms.exercise_price,
        reference_price: request.reference_price,
        settlement_amount: lots_amount(
            leg.allocated,
            request.reference_price - terms.exercise_price,
        ),
        sale_amount: lots_amount(leg.allocated, terms.exercise_price).trunc(),
        termination: if remaining_after == 0 {
            TerminationKind::Full
        } else {
            TerminationKind::Partial
        },
        method: request.method,
    }
}
