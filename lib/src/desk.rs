//! The desk service: wires the collaborators to the pure computations. Every call reads a
//! fresh snapshot from its collaborators; nothing is carried between calls.

use crate::{
    calendar::next_business_day,
    config::DeskConfig,
    error::{CbasError, CbasResult},
    exercise::{allocate_exercise, ExerciseRequest, ExerciseResult},
    expiry::{settle_expired, ExpiryBatch},
    premium::{price_new_trade, price_new_trades, NewTradePricing},
    providers::{CalendarProvider, ContractStore, ExecutionFeed, OverrideSource, QuoteTable},
    renewal::{allocate_renewal, RenewalRequest, RenewalResult},
    types::{
        contracts::{Contracts, ExecutedToday},
        overrides::RateFeeOverrides,
        quotes::{InstrumentQuote, Quotes},
        trades::TradeRow,
        HolidaySet,
    },
};
use chrono::NaiveDate;
use serde::Serialize;
use tracing::info;

/// A renewal together with the pricing of its replacement contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenewalOutcome {
    pub renewal: RenewalResult,
    /// `None` when nothing could be renewed.
    pub replacement: Option<NewTradePricing>,
}

/// Back-office entry point for CBAS pricing and allocation.
pub struct CbasDesk {
    calendar: Box<dyn CalendarProvider>,
    contracts: Box<dyn ContractStore>,
    executions: Box<dyn ExecutionFeed>,
    quotes: Box<dyn QuoteTable>,
    overrides: Box<dyn OverrideSource>,
    config: DeskConfig,
}

impl CbasDesk {
    pub fn new(
        calendar: Box<dyn CalendarProvider>,
        contracts: Box<dyn ContractStore>,
        executions: Box<dyn ExecutionFeed>,
        quotes: Box<dyn QuoteTable>,
        overrides: Box<dyn OverrideSource>,
        config: DeskConfig,
    ) -> Self {
        Self {
            calendar,
            contracts,
            executions,
            quotes,
            overrides,
            config,
        }
    }

    pub fn config(&self) -> &DeskConfig {
        &self.config
    }

    /// Returns the date `offset` business days after `date`.
    ///
    /// # Arguments
    ///
    /// * `date` - The starting date, usually the trade date.
    /// * `offset` - Number of business days to move forward.
    pub fn compute_settlement_date(&self, date: NaiveDate, offset: u32) -> CbasResult<NaiveDate> {
        let holidays: HolidaySet = self.calendar.holidays()?;
        Ok(next_business_day(date, offset, &holidays))
    }

    /// Prices a batch of new trades booked today.
    ///
    /// # Arguments
    ///
    /// * `rows` - The trade rows to price.
    /// * `today` - The trade date.
    ///
    /// # Returns
    ///
    /// One pricing per row, or the first error met. Unknown customers and unquoted
    /// instruments are rejected as `InvalidInput`.
    pub fn price_new_trades(
        &self,
        rows: &[TradeRow],
        today: NaiveDate,
    ) -> CbasResult<Vec<NewTradePricing>> {
        let holidays: HolidaySet = self.calendar.holidays()?;
        let overrides: RateFeeOverrides = self.overrides.overrides()?;

        let mut quotes: Quotes = Quotes::new();
        for row in rows {
            self.ensure_customer(&row.customer_id, &row.instrument_code)?;
            if !quotes.contains_key(row.instrument_code.trim()) {
                let quote: InstrumentQuote =
                    self.require_quote(&row.customer_id, &row.instrument_code)?;
                quotes.insert(row.instrument_code.trim().to_string(), quote);
            }
        }

        price_new_trades(rows, &quotes, &overrides, &self.config, &holidays, today)
    }

    /// Allocates an early exercise across the customer's open contracts.
    ///
    /// An unknown customer or an instrument with no quote is rejected before any contract is
    /// read.
    ///
    /// # Arguments
    ///
    /// * `request` - The exercise request.
    pub fn exercise(&self, request: &ExerciseRequest) -> CbasResult<ExerciseResult> {
        self.ensure_customer(&request.customer_id, &request.instrument_code)?;
        self.require_quote(&request.customer_id, &request.instrument_code)?;
        let (contracts, executed_today) =
            self.load_position(&request.customer_id, &request.instrument_code)?;
        allocate_exercise(request, &contracts, &executed_today)
    }

    /// Settles every contract whose option expires on `expiry_date`.
    pub fn settle_expired(&self, expiry_date: NaiveDate) -> CbasResult<ExpiryBatch> {
        let holidays: HolidaySet = self.calendar.holidays()?;
        let contracts: Contracts = self.contracts.contracts_expiring_on(expiry_date)?;
        let executed_today: ExecutedToday = self.executions.executed_today_all()?;
        Ok(settle_expired(
            expiry_date,
            &contracts,
            &executed_today,
            &holidays,
            &self.config,
        ))
    }

    /// Renews part of a position and prices the replacement contract at today's rate.
    ///
    /// # Arguments
    ///
    /// * `request` - The renewal request.
    /// * `today` - The trade date of the replacement contract.
    pub fn renew(
        &self,
        request: &RenewalRequest,
        today: NaiveDate,
    ) -> CbasResult<RenewalOutcome> {
        self.ensure_customer(&request.customer_id, &request.instrument_code)?;
        let quote: InstrumentQuote =
            self.require_quote(&request.customer_id, &request.instrument_code)?;
        let (contracts, executed_today) =
            self.load_position(&request.customer_id, &request.instrument_code)?;

        let renewal: RenewalResult = allocate_renewal(request, &contracts, &executed_today)?;
        let inventory: u64 = self
            .contracts
            .customer_inventory(&request.customer_id)
            .map_err(|error: CbasError| {
                error.with_position(&request.customer_id, &request.instrument_code)
            })?;

        let replacement_row: Option<TradeRow> = renewal.replacement_trade(request, inventory);
        let replacement: Option<NewTradePricing> = match replacement_row {
            Some(row) => {
                let holidays: HolidaySet = self.calendar.holidays()?;
                let overrides: RateFeeOverrides = self.overrides.overrides()?;
                Some(price_new_trade(
                    &row,
                    &quote,
                    &overrides,
                    &self.config,
                    &holidays,
                    today,
                )?)
            }
            None => None,
        };

        info!(
            customer_id = %request.customer_id,
            instrument_code = %request.instrument_code,
            renewed = renewal.renewed_quantity(),
            "renewed position"
        );
        Ok(RenewalOutcome {
            renewal,
            replacement,
        })
    }

    fn ensure_customer(&self, customer_id: &str, instrument_code: &str) -> CbasResult<()> {
        let exists: bool = self
            .contracts
            .customer_exists(customer_id)
            .map_err(|error: CbasError| error.with_position(customer_id, instrument_code))?;
        if exists {
            Ok(())
        } else {
            Err(CbasError::invalid_input(
                "customer_id",
                format!("unknown customer {}", customer_id.trim()),
            ))
        }
    }

    fn require_quote(
        &self,
        customer_id: &str,
        instrument_code: &str,
    ) -> CbasResult<InstrumentQuote> {
        self.quotes
            .quote(instrument_code)
            .map_err(|error: CbasError| error.with_position(customer_id, instrument_code))?
            .ok_or_else(|| {
                CbasError::invalid_input(
                    "instrument_code",
                    format!("no quote for instrument {}", instrument_code.trim()),
                )
            })
    }

    fn load_position(
        &self,
        customer_id: &str,
        instrument_code: &str,
    ) -> CbasResult<(Contracts, ExecutedToday)> {
        let contracts: Contracts = self
            .contracts
            .open_contracts(customer_id, instrument_code)
            .map_err(|error: CbasError| error.with_position(customer_id, instrument_code))?;
        let executed_today: ExecutedToday = self
            .executions
            .executed_today(customer_id, instrument_code)
            .map_err(|error: CbasError| error.with_position(customer_id, instrument_code))?;
        Ok((contracts, executed_today))
    }
}
