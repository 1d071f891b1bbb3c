pub mod contracts;
pub mod overrides;
pub mod quotes;
pub mod trades;

use chrono::NaiveDate;
use std::collections::BTreeSet;

/// Customer identifier as stored by the back office (may carry trailing padding).
pub type CustomerId = String;

/// Convertible bond code.
pub type InstrumentCode = String;

/// Contract number.
pub type ContractId = String;

/// Unique key of a customer's position in one instrument.
pub type PositionKey = (CustomerId, InstrumentCode);

/// Calendar dates on which no settlement can happen, on top of weekends.
pub type HolidaySet = BTreeSet<NaiveDate>;

/// Generates the lookup key of a (customer, instrument) position, ignoring the padding that
/// fixed-width customer columns carry.
///
/// # Arguments
///
/// * `customer_id` - The customer identifier.
/// * `instrument_code` - The convertible bond code.
///
/// # Returns
///
/// A `PositionKey` with both parts trimmed.
pub fn get_key(customer_id: &str, instrument_code: &str) -> PositionKey {
    (
        customer_id.trim().to_string(),
        instrument_code.trim().to_string(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_key() {
        assert_eq!(
            get_key("A123456789  ", " 65331"),
            ("A123456789".to_string(), "65331".to_string())
        );
        assert_eq!(get_key("A1", "65331"), get_key("A1   ", "65331"));
        assert_ne!(get_key("A1", "65331"), get_key("A1", "65332"));
    }
}
