use anyhow::{Context, Result};
use cbas_lib::{
    providers::{
        InMemoryCalendar, InMemoryContractStore, InMemoryExecutionFeed, InMemoryOverrides,
        InMemoryQuoteTable,
    },
    CbasDesk, Contracts, DeskConfig, ExecutedToday, HolidaySet, InstrumentQuote, Quotes,
    RateFeeOverride, RateFeeOverrides, TradeRow, VipEntry,
};
use serde::Deserialize;
use std::{collections::BTreeSet, fs, path::Path};

/// A JSON snapshot of everything the desk reads: configuration, holidays, contracts, today's
/// executions, the quote sheet, the override tables and the trades waiting to be priced.
#[derive(Deserialize, Debug, Default)]
#[serde(default)]
pub struct Snapshot {
    pub config: DeskConfig,
    pub holidays: HolidaySet,
    pub contracts: Contracts,
    /// Customers known to the back office without any open contract.
    pub customers: BTreeSet<String>,
    pub executed_today: ExecutedToday,
    pub quotes: Vec<InstrumentQuote>,
    pub overrides: Vec<RateFeeOverride>,
    pub vip: Vec<VipEntry>,
    pub trades: Vec<TradeRow>,
}

impl Snapshot {
    /// Reads and parses a snapshot file.
    pub fn load(path: &Path) -> Result<Self> {
        let raw: String = fs::read_to_string(path)
            .with_context(|| format!("failed to read snapshot {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse snapshot {}", path.display()))
    }

    /// Builds a desk backed by the in-memory collaborators. Returns the trades to price
    /// alongside it.
    pub fn into_desk(self) -> (CbasDesk, Vec<TradeRow>) {
        let quotes: Quotes = self
            .quotes
            .into_iter()
            .map(|quote: InstrumentQuote| (quote.instrument_code.trim().to_string(), quote))
            .collect();
        let store: InMemoryContractStore = InMemoryContractStore {
            contracts: self.contracts.clone(),
            customers: self.customers,
        };

        let desk: CbasDesk = CbasDesk::new(
            Box::new(InMemoryCalendar {
                holidays: self.holidays,
            }),
            Box::new(store),
            Box::new(InMemoryExecutionFeed {
                executed: self.executed_today,
                contracts: self.contracts,
            }),
            Box::new(InMemoryQuoteTable { quotes }),
            Box::new(InMemoryOverrides {
                overrides: RateFeeOverrides::new(self.overrides, self.vip),
            }),
            self.config,
        );
        (desk, self.trades)
    }
}
