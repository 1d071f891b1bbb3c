//! Desk-wide configuration: settlement conventions, rate/fee tier thresholds and the special
//! customer allowlist.

use crate::constants::{
    BULK_FEE, BULK_TRADE_QUANTITY, DISCOUNT_INVENTORY_THRESHOLD, EARLY_EXERCISE_LOCK_MONTHS,
    ELECTRONIC_FEE, SETTLEMENT_OFFSET_DAYS, SPECIAL_CUSTOMER_FEE, STANDARD_FEE, VIP_FEE,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Fee amounts charged per tier, quoted per 1,000 of face value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeeSchedule {
    pub vip: u32,
    pub special_customer: u32,
    pub bulk: u32,
    pub electronic: u32,
    pub standard: u32,
}

impl Default for FeeSchedule {
    fn default() -> Self {
        Self {
            vip: VIP_FEE,
            special_customer: SPECIAL_CUSTOMER_FEE,
            bulk: BULK_FEE,
            electronic: ELECTRONIC_FEE,
            standard: STANDARD_FEE,
        }
    }
}

/// Configuration shared by every desk operation.
///
/// Every field falls back to its default when missing from a deserialized document, so a
/// snapshot only needs to carry what it changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeskConfig {
    /// Business days between trade date and settlement date for new trades and expiries.
    pub settlement_offset_days: u32,
    /// Calendar months after the trade date before early exercise is allowed.
    pub early_exercise_lock_months: u32,
    /// Customer inventory at which the discounted rate and the bulk fee apply.
    pub discount_inventory_threshold: u64,
    /// Trade quantity at which the bulk fee applies.
    pub bulk_trade_quantity: u64,
    pub fees: FeeSchedule,
    /// Closed set of customers that always get the discounted rate and the special fee.
    pub special_customer_ids: BTreeSet<String>,
}

impl Default for DeskConfig {
    fn default() -> Self {
        Self {
            settlement_offset_days: SETTLEMENT_OFFSET_DAYS,
            early_exercise_lock_months: EARLY_EXERCISE_LOCK_MONTHS,
            discount_inventory_threshold: DISCOUNT_INVENTORY_THRESHOLD,
            bulk_trade_quantity: BULK_TRADE_QUANTITY,
            fees: FeeSchedule::default(),
            special_customer_ids: BTreeSet::new(),
        }
    }
}

impl DeskConfig {
    /// Returns true if the customer is on the special allowlist.
    pub fn is_special_customer(&self, customer_id: &str) -> bool {
        self.special_customer_ids.contains(customer_id.trim())
    }
}
