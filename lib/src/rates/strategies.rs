use super::{PartialRateFee, RateFeeStrategy, Tier};
use crate::{
    config::DeskConfig,
    types::{
        overrides::{RateFeeOverride, RateFeeOverrides, VipFlags},
        quotes::InstrumentQuote,
        trades::{SourceFlag, TradeRow},
    },
};
use rust_decimal::Decimal;

/// Tier 1: a rate and/or fee negotiated for this exact (customer, instrument) pair.
pub struct ExactOverrideTier<'a> {
    pub overrides: &'a RateFeeOverrides,
}

impl RateFeeStrategy for ExactOverrideTier<'_> {
    fn tier(&self) -> Tier {
        Tier::ExactOverride
    }

    fn try_resolve(&self, row: &TradeRow, _quote: &InstrumentQuote) -> Option<PartialRateFee> {
        self.overrides
            .exact(&row.customer_id, &row.instrument_code)
            .map(|found: &RateFeeOverride| PartialRateFee {
                rate: found.rate,
                fee: found.fee,
            })
    }
}

/// Tier 2: customer-wide VIP flags, independent of quantity.
pub struct VipFlagTier<'a> {
    pub overrides: &'a RateFeeOverrides,
    pub config: &'a DeskConfig,
}

impl RateFeeStrategy for VipFlagTier<'_> {
    fn tier(&self) -> Tier {
        Tier::VipFlag
    }

    fn try_resolve(&self, row: &TradeRow, quote: &InstrumentQuote) -> Option<PartialRateFee> {
        let flags: VipFlags = self.overrides.vip(&row.customer_id)?;
        let (_, discounted_rate) = quote.rates(row.todays_rate);
        Some(PartialRateFee {
            rate: flags.discount_rate.then_some(discounted_rate),
            fee: flags.discount_fee.then_some(self.config.fees.vip),
        })
    }
}

/// Tier 3: the fixed allowlist of special customers.
pub struct SpecialCustomerTier<'a> {
    pub config: &'a DeskConfig,
}

impl RateFeeStrategy for SpecialCustomerTier<'_> {
    fn tier(&self) -> Tier {
        Tier::SpecialCustomer
    }

    fn try_resolve(&self, row: &TradeRow, quote: &InstrumentQuote) -> Option<PartialRateFee> {
        if !self.config.is_special_customer(&row.customer_id) {
            return None;
        }
        let (_, discounted_rate) = quote.rates(row.todays_rate);
        Some(PartialRateFee {
            rate: Some(discounted_rate),
            fee: Some(self.config.fees.special_customer),
        })
    }
}

/// Tier 4: the quantity-based default schedule. Always resolves both fields.
pub struct DefaultTier<'a> {
    pub config: &'a DeskConfig,
}

impl DefaultTier<'_> {
    /// Computes the default (rate, fee) pair of a row.
    ///
    /// - rate: discounted if the customer's inventory reaches the discount threshold,
    ///   standard otherwise.
    /// - fee: bulk if inventory or trade quantity reaches its threshold, electronic for `E`
    ///   orders, standard for everything else.
    pub fn rate_and_fee(&self, row: &TradeRow, quote: &InstrumentQuote) -> (Decimal, u32) {
        let (standard_rate, discounted_rate) = quote.rates(row.todays_rate);
        let large_holder: bool =
            row.inventory_quantity >= self.config.discount_inventory_threshold;

        let rate: Decimal = if large_holder {
            discounted_rate
        } else {
            standard_rate
        };
        let fee: u32 = if large_holder || row.trade_quantity >= self.config.bulk_trade_quantity {
            self.config.fees.bulk
        } else if row.source == SourceFlag::Electronic {
            self.config.fees.electronic
        } else {
            self.config.fees.standard
        };
        (rate, fee)
    }
}

impl RateFeeStrategy for DefaultTier<'_> {
    fn tier(&self) -> Tier {
        Tier::Default
    }

    fn try_resolve(&self, row: &TradeRow, quote: &InstrumentQuote) -> Option<PartialRateFee> {
        let (rate, fee) = self.rate_and_fee(row, quote);
        Some(PartialRateFee {
            rate: Some(rate),
            fee: Some(fee),
        })
    }
}
