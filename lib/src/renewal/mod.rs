//! Renewal: rolling part of a position into a new contract at today's rate. The renewed lots
//! are taken from the oldest contracts first.

use crate::{
    allocation::{allocate_legs, AllocationLeg, Availability, LegPlan, RenewalPriority},
    error::{CbasError, CbasResult},
    exercise::Warning,
    types::{
        contracts::{Contract, ExecutedToday},
        trades::{SourceFlag, TradeRow},
    },
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// A request to renew `quantity` lots of one (customer, instrument) position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenewalRequest {
    pub customer_id: String,
    pub instrument_code: String,
    pub quantity: u64,
    /// Rate quoted for the replacement contract, used as both standard and discounted rate.
    pub todays_rate: Decimal,
    /// Traded price of the replacement contract.
    pub traded_price: Decimal,
}

/// One contract's part in a renewal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenewalLeg {
    pub contract_id: String,
    pub trade_date: NaiveDate,
    pub stored_quantity: u64,
    pub executed_today: u64,
    pub renewed_quantity: u64,
    pub remaining_after: u64,
}

impl From<&AllocationLeg> for RenewalLeg {
    fn from(leg: &AllocationLeg) -> Self {
        Self {
            contract_id: leg.contract.id.clone(),
            trade_date: leg.contract.trade_date,
            stored_quantity: leg.contract.remaining_quantity,
            executed_today: leg.executed_today,
            renewed_quantity: leg.allocated,
            remaining_after: leg.remaining_after(),
        }
    }
}

/// The outcome of a renewal request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenewalResult {
    pub legs: Vec<RenewalLeg>,
    pub shortfall: u64,
    pub warnings: Vec<Warning>,
}

impl RenewalResult {
    /// Total lots renewed across all contracts.
    pub fn renewed_quantity(&self) -> u64 {
        self.legs
            .iter()
            .map(|leg: &RenewalLeg| leg.renewed_quantity)
            .sum()
    }

    /// Builds the trade row of the replacement contract, `None` if nothing was renewed.
    ///
    /// # Arguments
    ///
    /// * `request` - The renewal request.
    /// * `inventory_quantity` - The customer's total inventory, used for tier selection.
    pub fn replacement_trade(
        &self,
        request: &RenewalRequest,
        inventory_quantity: u64,
    ) -> Option<TradeRow> {
        let renewed: u64 = self.renewed_quantity();
        (renewed > 0).then(|| TradeRow {
            customer_id: request.customer_id.trim().to_string(),
            instrument_code: request.instrument_code.trim().to_string(),
            inventory_quantity,
            trade_quantity: renewed,
            traded_price: request.traded_price,
            source: SourceFlag::Manual,
            todays_rate: Some(request.todays_rate),
        })
    }
}

/// Allocates a renewal across the customer's open contracts, oldest trade first.
///
/// # Arguments
///
/// * `request` - The renewal request.
/// * `contracts` - The customer's open contracts in the requested instrument.
/// * `executed_today` - Lots already executed today per contract id.
///
/// # Returns
///
/// The renewal legs and the shortfall, or `InvalidInput` if the quantity is zero or a contract
/// belongs to another position.
pub fn allocate_renewal(
    request: &RenewalRequest,
    contracts: &[Contract],
    executed_today: &ExecutedToday,
) -> CbasResult<RenewalResult> {
    if request.quantity == 0 {
        return Err(CbasError::invalid_input(
            "quantity",
            "renewal quantity must be positive",
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

    let plan: LegPlan = allocate_legs::<RenewalPriority>(
        request.quantity,
        contracts,
        executed_today,
        Availability::NetOfExecutedToday,
    );

    let mut warnings: Vec<Warning> = Vec::new();
    if plan.shortfall > 0 {
        warn!(
            customer_id = %request.customer_id,
            instrument_code = %request.instrument_code,
            requested = request.quantity,
            shortfall = plan.shortfall,
            "renewal request not fully covered"
        );
        warnings.push(Warning::Shortfall {
            requested: request.quantity,
            allocated: request.quantity - plan.shortfall,
            shortfall: plan.shortfall,
        });
    }

    let result: RenewalResult = RenewalResult {
        legs: plan.legs.iter().map(RenewalLeg::from).collect(),
        shortfall: plan.shortfall,
        warnings,
    };
    info!(
        customer_id = %request.customer_id,
        instrument_code = %request.instrument_code,
        contracts = result.legs.len(),
        renewed = result.renewed_quantity(),
        "allocated renewal"
    );
    Ok(result)
}
