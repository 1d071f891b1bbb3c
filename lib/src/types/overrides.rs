use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{get_key, CustomerId, InstrumentCode, PositionKey};

/// A negotiated rate and/or fee for one (customer, instrument) pair. Either side may be
/// missing, in which case lower tiers fill it in.
#[derive(PartialEq, Eq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct RateFeeOverride {
    pub customer_id: CustomerId,
    pub instrument_code: InstrumentCode,
    #[serde(default)]
    pub rate: Option<Decimal>,
    #[serde(default)]
    pub fee: Option<u32>,
}

/// Customer-level discount flags, valid regardless of quantity.
#[derive(PartialEq, Eq, Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct VipFlags {
    /// The customer always gets the discounted rate.
    #[serde(default)]
    pub discount_rate: bool,
    /// The customer always gets the VIP fee.
    #[serde(default)]
    pub discount_fee: bool,
}

/// A `VipEntry` is one row of the VIP list as delivered by the override source.
#[derive(PartialEq, Eq, Debug, Clone, Serialize, Deserialize)]
pub struct VipEntry {
    pub customer_id: CustomerId,
    #[serde(flatten)]
    pub flags: VipFlags,
}

/// Snapshot of both override tables used by rate/fee resolution.
#[derive(PartialEq, Eq, Debug, Clone, Default)]
pub struct RateFeeOverrides {
    exact: BTreeMap<PositionKey, RateFeeOverride>,
    vip: BTreeMap<CustomerId, VipFlags>,
}

impl RateFeeOverrides {
    /// Builds the lookup tables from raw override rows. Later rows replace earlier rows for
    /// the same key.
    ///
    /// # Arguments
    ///
    /// * `exact` - The (customer, instrument) override rows.
    /// * `vip` - The customer-level VIP rows.
    pub fn new(exact: Vec<RateFeeOverride>, vip: Vec<VipEntry>) -> Self {
        let exact: BTreeMap<PositionKey, RateFeeOverride> = exact
            .into_iter()
            .map(|row: RateFeeOverride| (get_key(&row.customer_id, &row.instrument_code), row))
            .collect();
        let vip: BTreeMap<CustomerId, VipFlags> = vip
            .into_iter()
            .map(|entry: VipEntry| (entry.customer_id.trim().to_string(), entry.flags))
            .collect();
        Self { exact, vip }
    }

    /// Returns the exact override for a (customer, instrument) pair, if any.
    pub fn exact(&self, customer_id: &str, instrument_code: &str) -> Option<&RateFeeOverride> {
        self.exact.get(&get_key(customer_id, instrument_code))
    }

    /// Returns the VIP flags of a customer, if listed.
    pub fn vip(&self, customer_id: &str) -> Option<VipFlags> {
        self.vip.get(customer_id.trim()).copied()
    }
}
