//! This module contains constants used throughout the project.

/// Number of business days between a new trade and its settlement (T+2)
pub const SETTLEMENT_OFFSET_DAYS: u32 = 2;

/// Calendar months after the trade date during which early exercise is locked
pub const EARLY_EXERCISE_LOCK_MONTHS: u32 = 3;

/// Day count basis used for every tenor computation
pub const DAYS_PER_YEAR: i64 = 365;

/// Face value per 100-price unit, a quantity of one is one lot of 1,000
pub const LOT_MULTIPLIER: i64 = 1_000;

/// Par value the sellback and traded prices are quoted against
pub const PAR_PRICE: i64 = 100;

/// Decimal places of every quoted price (hundred-price, exercise price)
pub const PRICE_DECIMALS: u32 = 2;

/// Customer-wide inventory at which the discounted rate and bulk fee apply
pub const DISCOUNT_INVENTORY_THRESHOLD: u64 = 200;

/// Single-trade quantity at which the bulk fee applies
pub const BULK_TRADE_QUANTITY: u64 = 10;

/// Fee for customers flagged with the unlimited-quantity discount fee
pub const VIP_FEE: u32 = 100;

/// Fee for customers on the special allowlist
pub const SPECIAL_CUSTOMER_FEE: u32 = 60;

/// Fee when inventory or trade quantity reaches the bulk thresholds
pub const BULK_FEE: u32 = 100;

/// Fee for electronically sourced orders below the bulk thresholds
pub const ELECTRONIC_FEE: u32 = 110;

/// Fee for every other order
pub const STANDARD_FEE: u32 = 150;

/// Fee amounts are quoted per 1,000 of face value
pub const FEE_DIVISOR: i64 = 1_000;
