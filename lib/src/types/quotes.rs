use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::InstrumentCode;

/// A `InstrumentQuote` represents one row of the daily quote sheet for a convertible bond
#[derive(Serialize, Deserialize, PartialEq, Eq, Debug, Clone)]
pub struct InstrumentQuote {
    /// The convertible bond code
    pub instrument_code: InstrumentCode,
    /// The convertible bond short name
    #[serde(default)]
    pub instrument_name: String,
    /// Interest rate quoted to regular customers, in percent
    pub standard_rate: Decimal,
    /// Interest rate quoted to large or preferred customers, in percent
    pub discounted_rate: Decimal,
    /// The date the bond can be put back to its issuer
    pub sellback_date: NaiveDate,
    /// The price the bond can be put back at
    pub sellback_price: Decimal,
    /// Expiry date of options written on this bond today
    pub option_expiry_date: NaiveDate,
}

impl InstrumentQuote {
    /// Returns the (standard, discounted) rate pair, both replaced by `todays_rate` when the
    /// trade carries one (renewals are repriced at a single rate for everybody).
    ///
    /// # Arguments
    ///
    /// * `todays_rate` - An optional rate set on the trade itself.
    pub fn rates(&self, todays_rate: Option<Decimal>) -> (Decimal, Decimal) {
        match todays_rate {
            Some(rate) => (rate, rate),
            None => (self.standard_rate, self.discounted_rate),
        }
    }
}

/// The daily quote sheet, keyed by instrument code.
pub type Quotes = BTreeMap<InstrumentCode, InstrumentQuote>;
