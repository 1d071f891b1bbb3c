//! Collaborator seams: the holiday calendar, the contracts store, the same-day execution feed,
//! the quote sheet and the override tables. The core never talks to a database or a file
//! directly; everything it reads comes through these traits.

use crate::{
    error::CbasResult,
    types::{
        contracts::{Contract, Contracts, ExecutedToday},
        overrides::RateFeeOverrides,
        quotes::{InstrumentQuote, Quotes},
        HolidaySet,
    },
};
use chrono::NaiveDate;
use std::cell::RefCell;
use std::collections::BTreeSet;

/// Supplies the holiday set. Implementations are queried on every call.
pub trait CalendarProvider {
    /// Returns the current set of holidays.
    fn holidays(&self) -> CbasResult<HolidaySet>;
}

/// Read access to the contracts store, the authority on remaining quantities.
pub trait ContractStore {
    /// Returns the open contracts (remaining quantity > 0) of a customer in one instrument.
    ///
    /// # Arguments
    ///
    /// * `customer_id` - The customer holding the contracts.
    /// * `instrument_code` - The convertible bond code.
    fn open_contracts(&self, customer_id: &str, instrument_code: &str) -> CbasResult<Contracts>;

    /// Returns the open contracts whose option expires on `date`, across all customers.
    fn contracts_expiring_on(&self, date: NaiveDate) -> CbasResult<Contracts>;

    /// Returns true if the customer is known to the back office.
    fn customer_exists(&self, customer_id: &str) -> CbasResult<bool>;

    /// Returns the total remaining quantity the customer holds across all instruments.
    fn customer_inventory(&self, customer_id: &str) -> CbasResult<u64>;
}

/// The same-day execution feed, reloaded on every call.
pub trait ExecutionFeed {
    /// Returns the lots already executed today per contract of a (customer, instrument) pair.
    fn executed_today(&self, customer_id: &str, instrument_code: &str)
        -> CbasResult<ExecutedToday>;

    /// Returns the lots already executed today for every contract.
    fn executed_today_all(&self) -> CbasResult<ExecutedToday>;
}

/// The daily quote sheet.
pub trait QuoteTable {
    /// Returns the quote of an instrument, `None` if the instrument is not quoted today.
    fn quote(&self, instrument_code: &str) -> CbasResult<Option<InstrumentQuote>>;
}

/// Source of the rate/fee override tables.
pub trait OverrideSource {
    /// Returns a snapshot of the exact and VIP override tables.
    fn overrides(&self) -> CbasResult<RateFeeOverrides>;
}

/// A calendar wrapper that fetches the holiday set once and keeps it until
/// [`CachedCalendar::invalidate`] is called.
pub struct CachedCalendar<P: CalendarProvider> {
    inner: P,
    cached: RefCell<Option<HolidaySet>>,
}

impl<P: CalendarProvider> CachedCalendar<P> {
    pub fn new(inner: P) -> Self {
        Self {
            inner,
            cached: RefCell::new(None),
        }
    }

    /// Drops the cached holiday set; the next call fetches it again.
    pub fn invalidate(&self) {
        self.cached.replace(None);
    }
}

impl<P: CalendarProvider> CalendarProvider for CachedCalendar<P> {
    fn holidays(&self) -> CbasResult<HolidaySet> {
        if let Some(holidays) = self.cached.borrow().as_ref() {
            return Ok(holidays.clone());
        }
        let holidays: HolidaySet = self.inner.holidays()?;
        self.cached.replace(Some(holidays.clone()));
        Ok(holidays)
    }
}

/// In-memory calendar, used by tests and by the snapshot-driven CLI.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCalendar {
    pub holidays: HolidaySet,
}

impl CalendarProvider for InMemoryCalendar {
    fn holidays(&self) -> CbasResult<HolidaySet> {
        Ok(self.holidays.clone())
    }
}

/// In-memory contracts store.
#[derive(Debug, Clone, Default)]
pub struct InMemoryContractStore {
    pub contracts: Contracts,
    /// Customers known without any open contract.
    pub customers: BTreeSet<String>,
}

impl InMemoryContractStore {
    pub fn new(contracts: Contracts) -> Self {
        Self {
            contracts,
            customers: BTreeSet::new(),
        }
    }

    fn open(&self) -> impl Iterator<Item = &Contract> {
        self.contracts
            .iter()
            .filter(|contract: &&Contract| contract.remaining_quantity > 0)
    }
}

impl ContractStore for InMemoryContractStore {
    fn open_contracts(&self, customer_id: &str, instrument_code: &str) -> CbasResult<Contracts> {
        Ok(self
            .open()
            .filter(|contract: &&Contract| contract.belongs_to(customer_id, instrument_code))
            .cloned()
            .collect())
    }

    fn contracts_expiring_on(&self, date: NaiveDate) -> CbasResult<Contracts> {
        Ok(self
            .open()
            .filter(|contract: &&Contract| contract.option_expiry_date == date)
            .cloned()
            .collect())
    }

    fn customer_exists(&self, customer_id: &str) -> CbasResult<bool> {
        let customer_id: &str = customer_id.trim();
        Ok(self.customers.contains(customer_id)
            || self
                .contracts
                .iter()
                .any(|contract: &Contract| contract.customer_id.trim() == customer_id))
    }

    fn customer_inventory(&self, customer_id: &str) -> CbasResult<u64> {
        Ok(self
            .open()
            .filter(|contract: &&Contract| contract.customer_id.trim() == customer_id.trim())
            .map(|contract: &Contract| contract.remaining_quantity)
            .sum())
    }
}

/// In-memory execution feed keyed by contract id.
#[derive(Debug, Clone, Default)]
pub struct InMemoryExecutionFeed {
    pub executed: ExecutedToday,
    /// Contracts of the store, used to narrow the feed to one position.
    pub contracts: Contracts,
}

impl ExecutionFeed for InMemoryExecutionFeed {
    fn executed_today(
        &self,
        customer_id: &str,
        instrument_code: &str,
    ) -> CbasResult<ExecutedToday> {
        Ok(self
            .contracts
            .iter()
            .filter(|contract: &&Contract| contract.belongs_to(customer_id, instrument_code))
            .filter_map(|contract: &Contract| {
                self.executed
                    .get(&contract.id)
                    .map(|quantity: &u64| (contract.id.clone(), *quantity))
            })
            .collect())
    }

    fn executed_today_all(&self) -> CbasResult<ExecutedToday> {
        Ok(self.executed.clone())
    }
}

/// In-memory quote sheet.
#[derive(Debug, Clone, Default)]
pub struct InMemoryQuoteTable {
    pub quotes: Quotes,
}

impl QuoteTable for InMemoryQuoteTable {
    fn quote(&self, instrument_code: &str) -> CbasResult<Option<InstrumentQuote>> {
        Ok(self.quotes.get(instrument_code.trim()).cloned())
    }
}

/// In-memory override tables.
#[derive(Debug, Clone, Default)]
pub struct InMemoryOverrides {
    pub overrides: RateFeeOverrides,
}

impl OverrideSource for InMemoryOverrides {
    fn overrides(&self) -> CbasResult<RateFeeOverrides> {
        Ok(self.overrides.clone())
    }
}
