use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{ContractId, CustomerId, InstrumentCode};

/// An outstanding CBAS option contract held by a customer.
#[derive(PartialEq, Eq, Debug, Clone, Serialize, Deserialize)]
pub struct Contract {
    /// Unique contract number.
    pub id: ContractId,
    /// The customer holding the contract.
    pub customer_id: CustomerId,
    /// Code of the underlying convertible bond.
    pub instrument_code: InstrumentCode,
    /// Date the contract was originally booked.
    pub trade_date: NaiveDate,
    /// Lots still outstanding. Only exercise and settlement events change this.
    pub remaining_quantity: u64,
    /// Contracted interest rate, in percent.
    pub interest_rate: Decimal,
    /// Date the underlying bond can be put back to its issuer.
    pub sellback_date: NaiveDate,
    /// Price at which the underlying bond can be put back to its issuer.
    pub sellback_price: Decimal,
    /// Expiry date of the option.
    pub option_expiry_date: NaiveDate,
}

impl Contract {
    /// Returns true if the contract belongs to the given (customer, instrument) pair.
    ///
    /// # Arguments
    ///
    /// * `customer_id` - The customer to match, surrounding whitespace is ignored.
    /// * `instrument_code` - The instrument to match, surrounding whitespace is ignored.
    pub fn belongs_to(&self, customer_id: &str, instrument_code: &str) -> bool {
        self.customer_id.trim() == customer_id.trim()
            && self.instrument_code.trim() == instrument_code.trim()
    }

    /// Lots left for renewal or expiry once the lots already executed today are taken out.
    /// Never negative.
    ///
    /// # Arguments
    ///
    /// * `executed_today` - The same-day execution feed snapshot.
    pub fn available_quantity(&self, executed_today: &ExecutedToday) -> u64 {
        self.remaining_quantity
            .saturating_sub(executed_quantity(executed_today, &self.id))
    }
}

/// A customer's open contracts.
pub type Contracts = Vec<Contract>;

/// Lots already executed today, keyed by contract id. Missing entries count as zero.
pub type ExecutedToday = BTreeMap<ContractId, u64>;

/// Looks up the quantity already executed today for a contract, defaulting to zero.
///
/// # Arguments
///
/// * `executed_today` - The same-day execution feed snapshot.
/// * `contract_id` - The contract to look up.
pub fn executed_quantity(executed_today: &ExecutedToday, contract_id: &str) -> u64 {
    executed_today.get(contract_id).copied().unwrap_or(0)
}
