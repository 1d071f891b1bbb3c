//! Rate and fee resolution through an ordered hierarchy of tiers.
//!
//! Each tier may fill the rate, the fee, both or neither. Tiers are evaluated in a fixed order
//! and the first tier producing a value for a field wins that field; a tier filling one field
//! never blocks a lower tier from filling the other.

pub mod strategies;

use crate::{
    config::DeskConfig,
    error::{CbasError, CbasResult},
    types::{overrides::RateFeeOverrides, quotes::InstrumentQuote, trades::TradeRow},
};
use rust_decimal::Decimal;
use serde::Serialize;
use strategies::{DefaultTier, ExactOverrideTier, SpecialCustomerTier, VipFlagTier};
use tracing::debug;

/// The tier a resolved value came from, kept for audit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    ExactOverride,
    VipFlag,
    SpecialCustomer,
    Default,
}

/// What a single tier contributes to a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PartialRateFee {
    pub rate: Option<Decimal>,
    pub fee: Option<u32>,
}

/// The final rate (percent) and fee of a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResolvedRateFee {
    pub rate: Decimal,
    pub fee: u32,
    pub rate_tier: Tier,
    pub fee_tier: Tier,
}

/// Trait for a single tier of the rate/fee hierarchy.
pub trait RateFeeStrategy {
    /// The tier this strategy implements.
    fn tier(&self) -> Tier;

    /// Returns what this tier knows about the row, `None` if the tier does not apply.
    ///
    /// # Arguments
    ///
    /// * `row` - The trade row being resolved.
    /// * `quote` - The instrument quote of the row.
    fn try_resolve(&self, row: &TradeRow, quote: &InstrumentQuote) -> Option<PartialRateFee>;
}

/// The ordered tier list over one override snapshot.
pub struct RateFeeResolver<'a> {
    strategies: Vec<Box<dyn RateFeeStrategy + 'a>>,
    fallback: DefaultTier<'a>,
}

impl<'a> RateFeeResolver<'a> {
    /// Builds the standard hierarchy: exact override, VIP flags, special allowlist, default.
    ///
    /// # Arguments
    ///
    /// * `overrides` - Snapshot of the override tables.
    /// * `config` - Thresholds, fee tiers and the special allowlist.
    pub fn new(overrides: &'a RateFeeOverrides, config: &'a DeskConfig) -> Self {
        Self {
            strategies: vec![
                Box::new(ExactOverrideTier { overrides }),
                Box::new(VipFlagTier { overrides, config }),
                Box::new(SpecialCustomerTier { config }),
                Box::new(DefaultTier { config }),
            ],
            fallback: DefaultTier { config },
        }
    }

    /// Resolves the rate and fee of a row.
    ///
    /// # Arguments
    ///
    /// * `row` - The trade row being resolved.
    /// * `quote` - The quote of the row's instrument.
    ///
    /// # Returns
    ///
    /// The resolved pair, or `InvalidInput` if the row has no customer or the quote belongs to
    /// another instrument.
    pub fn resolve(&self, row: &TradeRow, quote: &InstrumentQuote) -> CbasResult<ResolvedRateFee> {
        validate_row(row, quote)?;

        let (rate, fee) = self.strategies.iter().fold(
            (None, None),
            |(rate, fee): (Option<(Decimal, Tier)>, Option<(u32, Tier)>),
             strategy: &Box<dyn RateFeeStrategy + 'a>| {
                if rate.is_some() && fee.is_some() {
                    return (rate, fee);
                }
                let partial: PartialRateFee = strategy.try_resolve(row, quote).unwrap_or_default();
                (
                    rate.or(partial.rate.map(|value: Decimal| (value, strategy.tier()))),
                    fee.or(partial.fee.map(|value: u32| (value, strategy.tier()))),
                )
            },
        );

        // Fields left open by a custom tier list fall back to the default schedule
        let (default_rate, default_fee) = self.fallback.rate_and_fee(row, quote);
        let (rate, rate_tier) = rate.unwrap_or((default_rate, Tier::Default));
        let (fee, fee_tier) = fee.unwrap_or((default_fee, Tier::Default));

        debug!(
            customer_id = %row.customer_id,
            instrument_code = %row.instrument_code,
            %rate,
            fee,
            ?rate_tier,
            ?fee_tier,
            "resolved rate and fee"
        );

        Ok(ResolvedRateFee {
            rate,
            fee,
            rate_tier,
            fee_tier,
        })
    }
}

/// Resolves the effective rate and fee for a trade row against an override snapshot.
///
/// Pure: the same row, quote, overrides and config always give the same result.
///
/// # Arguments
///
/// * `row` - The trade row being resolved.
/// * `quote` - The quote of the row's instrument.
/// * `overrides` - Snapshot of the override tables.
/// * `config` - Thresholds, fee tiers and the special allowlist.
pub fn resolve_rate_fee(
    row: &TradeRow,
    quote: &InstrumentQuote,
    overrides: &RateFeeOverrides,
    config: &DeskConfig,
) -> CbasResult<ResolvedRateFee> {
    RateFeeResolver::new(overrides, config).resolve(row, quote)
}

fn validate_row(row: &TradeRow, quote: &InstrumentQuote) -> CbasResult<()> {
    if row.customer_id.trim().is_empty() {
        return Err(CbasError::invalid_input(
            "customer_id",
            "trade row has no customer",
        ));
    }
    if row.instrument_code.trim() != quote.instrument_code.trim() {
        return Err(CbasError::invalid_input(
            "instrument_code",
            format!(
                "trade row is for {} but the quote is for {}",
                row.instrument_code, quote.instrument_code
            ),
        ));
    }
    Ok(())
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use crate::types::{
        overrides::{RateFeeOverride, VipEntry, VipFlags},
        quotes::tests::quote,
        trades::SourceFlag,
    };
    use rust_decimal_macros::dec;
    use std::collections::BTreeSet;

    #[test]
    fn test_special_customer_gets_discounted_rate_and_special_fee() {
        let config: DeskConfig = special_config("S0001");
        let overrides: RateFeeOverrides = RateFeeOverrides::default();
        let quote: InstrumentQuote = quote("65331");

        for inventory in [0, 50, 199, 200, 5_000] {
            let resolved: ResolvedRateFee =
                resolve_rate_fee(&trade_row("S0001", inventory, 1), &quote, &overrides, &config)
                    .unwrap();
            assert_eq!(resolved.rate, dec!(2.0));
            assert_eq!(resolved.fee, 60);
            assert_eq!(resolved.rate_tier, Tier::SpecialCustomer);
            assert_eq!(resolved.fee_tier, Tier::SpecialCustomer);
        }
    }

    #[test]
    fn test_tiers_fill_fields_independently() {
        let config: DeskConfig = special_config("C001");
        // Exact override sets only the rate, VIP flag sets only the fee
        let overrides: RateFeeOverrides = RateFeeOverrides::new(
            vec![RateFeeOverride {
                customer_id: "C001".to_string(),
                instrument_code: "65331".to_string(),
                rate: Some(dec!(1.1)),
                fee: None,
            }],
            vec![VipEntry {
                customer_id: "C001".to_string(),
                flags: VipFlags {
                    discount_rate: true,
                    discount_fee: true,
                },
            }],
        );

        let resolved: ResolvedRateFee =
            resolve_rate_fee(&trade_row("C001", 0, 1), &quote("65331"), &overrides, &config)
                .unwrap();
        assert_eq!(resolved.rate, dec!(1.1));
        assert_eq!(resolved.rate_tier, Tier::ExactOverride);
        assert_eq!(resolved.fee, 100);
        assert_eq!(resolved.fee_tier, Tier::VipFlag);
    }

    #[test]
    fn test_special_tier_fills_what_vip_left_open() {
        let config: DeskConfig = special_config("C001");
        let overrides: RateFeeOverrides = RateFeeOverrides::new(
            vec![],
            vec![VipEntry {
                customer_id: "C001".to_string(),
                flags: VipFlags {
                    discount_rate: false,
                    discount_fee: true,
                },
            }],
        );

        let resolved: ResolvedRateFee =
            resolve_rate_fee(&trade_row("C001", 0, 1), &quote("65331"), &overrides, &config)
                .unwrap();
        assert_eq!(resolved.fee, 100);
        assert_eq!(resolved.fee_tier, Tier::VipFlag);
        assert_eq!(resolved.rate, dec!(2.0));
        assert_eq!(resolved.rate_tier, Tier::SpecialCustomer);
    }

    #[test]
    fn test_exact_override_fee_wins_over_vip() {
        let config: DeskConfig = DeskConfig::default();
        let overrides: RateFeeOverrides = RateFeeOverrides::new(
            vec![RateFeeOverride {
                customer_id: "C001".to_string(),
                instrument_code: "65331".to_string(),
                rate: None,
                fee: Some(70),
            }],
            vec![VipEntry {
                customer_id: "C001".to_string(),
                flags: VipFlags {
                    discount_rate: false,
                    discount_fee: true,
                },
            }],
        );

        let resolved: ResolvedRateFee =
            resolve_rate_fee(&trade_row("C001", 0, 1), &quote("65331"), &overrides, &config)
                .unwrap();
        assert_eq!(resolved.fee, 70);
        assert_eq!(resolved.fee_tier, Tier::ExactOverride);
        // Nothing above the default filled the rate
        assert_eq!(resolved.rate, dec!(2.5));
        assert_eq!(resolved.rate_tier, Tier::Default);
    }

    #[test]
    fn test_default_tier_when_nothing_matches() {
        let config: DeskConfig = DeskConfig::default();
        let overrides: RateFeeOverrides = RateFeeOverrides::default();
        let mut row: TradeRow = trade_row("C001", 10, 2);
        row.source = SourceFlag::Electronic;

        let resolved: ResolvedRateFee =
            resolve_rate_fee(&row, &quote("65331"), &overrides, &config).unwrap();
        assert_eq!(
            resolved,
            ResolvedRateFee {
                rate: dec!(2.5),
                fee: 110,
                rate_tier: Tier::Default,
                fee_tier: Tier::Default,
            }
        );
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let config: DeskConfig = special_config("S0001");
        let overrides: RateFeeOverrides = RateFeeOverrides::new(
            vec![RateFeeOverride {
                customer_id: "C001".to_string(),
                instrument_code: "65331".to_string(),
                rate: Some(dec!(1.3)),
                fee: None,
            }],
            vec![],
        );
        let quote: InstrumentQuote = quote("65331");

        for _ in 0..50 {
            let customer: &str = ["C001", "S0001", "C777"][rand::random::<usize>() % 3];
            let row: TradeRow = trade_row(
                customer,
                rand::random::<u64>() % 400,
                1 + rand::random::<u64>() % 20,
            );
            let first: ResolvedRateFee =
                resolve_rate_fee(&row, &quote, &overrides, &config).unwrap();
            let second: ResolvedRateFee =
                resolve_rate_fee(&row, &quote, &overrides, &config).unwrap();
            assert_eq!(first, second);
        }
    }

    #[test]
    fn test_rejects_mismatched_quote_and_missing_customer() {
        let config: DeskConfig = DeskConfig::default();
        let overrides: RateFeeOverrides = RateFeeOverrides::default();

        let error: CbasError =
            resolve_rate_fee(&trade_row("C001", 0, 1), &quote("99999"), &overrides, &config)
                .unwrap_err();
        assert!(matches!(error, CbasError::InvalidInput { ref field, .. } if field == "instrument_code"));

        let error: CbasError =
            resolve_rate_fee(&trade_row("  ", 0, 1), &quote("65331"), &overrides, &config)
                .unwrap_err();
        assert!(matches!(error, CbasError::InvalidInput { ref field, .. } if field == "customer_id"));
    }

    #[test]
    fn test_custom_tier_list_falls_back_to_default() {
        let config: DeskConfig = DeskConfig::default();
        let overrides: RateFeeOverrides = RateFeeOverrides::default();
        let resolver: RateFeeResolver = RateFeeResolver {
            strategies: vec![Box::new(ExactOverrideTier {
                overrides: &overrides,
            })],
            fallback: DefaultTier { config: &config },
        };

        let resolved: ResolvedRateFee = resolver
            .resolve(&trade_row("C001", 250, 1), &quote("65331"))
            .unwrap();
        assert_eq!(resolved.rate, dec!(2.0));
        assert_eq!(resolved.fee, 100);
        assert_eq!(resolved.rate_tier, Tier::Default);
    }

    // HELPER FUNCTIONS
    /// Creates a manual trade row on instrument `65331` at price 100.
    pub fn trade_row(customer_id: &str, inventory: u64, quantity: u64) -> TradeRow {
        TradeRow {
            customer_id: customer_id.to_string(),
            instrument_code: "65331".to_string(),
            inventory_quantity: inventory,
            trade_quantity: quantity,
            traded_price: dec!(100),
            source: SourceFlag::Manual,
            todays_rate: None,
        }
    }

    /// Creates a default config with a single special customer.
    fn special_config(customer_id: &str) -> DeskConfig {
        DeskConfig {
            special_customer_ids: BTreeSet::from([customer_id.to_string()]),
            ..DeskConfig::default()
        }
    }
}
