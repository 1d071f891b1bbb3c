pub mod allocation;
pub mod calendar;
pub mod config;
pub mod constants;
pub mod desk;
pub mod error;
pub mod exercise;
pub mod expiry;
pub mod premium;
pub mod providers;
pub mod rates;
pub mod renewal;
pub mod types;
pub mod utils;

pub use config::{DeskConfig, FeeSchedule};
pub use desk::{CbasDesk, RenewalOutcome};
pub use error::{CbasError, CbasResult, Stage};
pub use exercise::{
    allocate_exercise, Allocation, ExerciseMethod, ExerciseRequest, ExerciseResult,
    ExerciseSummary, TerminationKind, Warning,
};
pub use expiry::{settle_expired, ExpiryBatch, ExpirySettlement};
pub use premium::{
    compute_premium, price_new_trade, price_new_trades, NewTradePricing, PremiumInputs,
    PremiumQuote,
};
pub use rates::{resolve_rate_fee, ResolvedRateFee, Tier};
pub use renewal::{allocate_renewal, RenewalLeg, RenewalRequest, RenewalResult};
pub use types::{
    contracts::{Contract, Contracts, ExecutedToday},
    overrides::{RateFeeOverride, RateFeeOverrides, VipEntry, VipFlags},
    quotes::{InstrumentQuote, Quotes},
    trades::{SourceFlag, TradeRow},
    HolidaySet,
};
