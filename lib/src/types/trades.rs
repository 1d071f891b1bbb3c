use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{CustomerId, InstrumentCode};

/// Where an order came from.
#[derive(PartialEq, Eq, Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub enum SourceFlag {
    /// Placed through the electronic channel (`E`).
    #[serde(rename = "E")]
    Electronic,
    /// Anything else, typically phoned in.
    #[default]
    #[serde(other)]
    Manual,
}

impl SourceFlag {
    /// Parses the single-letter source code used by the order feed.
    pub fn from_code(code: &str) -> Self {
        if code.trim() == "E" {
            SourceFlag::Electronic
        } else {
            SourceFlag::Manual
        }
    }
}

/// A new-trade row waiting for its rate, fee and premium.
#[derive(PartialEq, Eq, Debug, Clone, Serialize, Deserialize)]
pub struct TradeRow {
    /// The customer buying the option.
    pub customer_id: CustomerId,
    /// The convertible bond the option references.
    pub instrument_code: InstrumentCode,
    /// Lots the customer already holds across all instruments.
    #[serde(default)]
    pub inventory_quantity: u64,
    /// Lots traded in this row.
    pub trade_quantity: u64,
    /// Average traded price of the underlying, kept at full precision.
    pub traded_price: Decimal,
    #[serde(default)]
    pub source: SourceFlag,
    /// Rate quoted on the row itself, replacing both quote-sheet rates when present.
    #[serde(default)]
    pub todays_rate: Option<Decimal>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_source_flag_from_code() {
        assert_eq!(SourceFlag::from_code("E"), SourceFlag::Electronic);
        assert_eq!(SourceFlag::from_code(" E "), SourceFlag::Electronic);
        assert_eq!(SourceFlag::from_code("M"), SourceFlag::Manual);
        assert_eq!(SourceFlag::from_code(""), SourceFlag::Manual);
    }

    #[test]
    fn test_deserialize_trade_row() {
        let row: TradeRow = serde_json::from_str(
            r#"{
                "customer_id": "C001",
                "instrument_code": "65331",
                "trade_quantity": 3,
                "traded_price": "105.5",
                "source": "X"
            }"#,
        )
        .unwrap();
        assert_eq!(row.inventory_quantity, 0);
        assert_eq!(row.traded_price, dec!(105.5));
        assert_eq!(row.source, SourceFlag::Manual);
        assert_eq!(row.todays_rate, None);

        let row: TradeRow = serde_json::from_str(
            r#"{
                "customer_id": "C001",
                "instrument_code": "65331",
                "trade_quantity": 3,
                "traded_price": 99,
                "source": "E",
                "todays_rate": "1.8"
            }"#,
        )
        .unwrap();
        assert_eq!(row.source, SourceFlag::Electronic);
        assert_eq!(row.todays_rate, Some(dec!(1.8)));
    }
}
