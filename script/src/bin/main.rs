//! Command-line driver for the CBAS desk. Reads a JSON snapshot of the back office and prints
//! the result of one operation as JSON on stdout.
//!
//! You can run this script using the following command:
//! ```shell
//! RUST_LOG=debug cargo run --release -- --snapshot desk.json --today 2024-06-27 price
//! ```

use anyhow::{Context, Result};
use cbas_lib::{CbasDesk, ExerciseMethod, ExerciseRequest, RenewalRequest, TradeRow};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::json;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[path = "../lib/input.rs"]
mod input;

/// The arguments for the command.
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// JSON snapshot of the back office
    #[clap(long, env = "CBAS_SNAPSHOT")]
    snapshot: PathBuf,

    /// Business date to run as, defaults to the local date
    #[clap(long, env = "CBAS_TODAY")]
    today: Option<NaiveDate>,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Shift a date by a number of business days
    SettlementDate {
        #[clap(long)]
        date: Option<NaiveDate>,
        /// Defaults to the configured settlement offset
        #[clap(long)]
        offset: Option<u32>,
    },
    /// Price the trades carried by the snapshot
    Price,
    /// Allocate an exercise across a customer's contracts
    Exercise {
        #[clap(long)]
        customer: String,
        #[clap(long)]
        instrument: String,
        #[clap(long)]
        quantity: u64,
        /// Price of the underlying bond the exercise settles against
        #[clap(long)]
        reference_price: Decimal,
        /// Defaults to the configured settlement offset after today
        #[clap(long)]
        settlement_date: Option<NaiveDate>,
        #[clap(long)]
        at_expiry: bool,
    },
    /// Settle contracts whose option expires on a date
    Expire {
        /// Defaults to today
        #[clap(long)]
        date: Option<NaiveDate>,
    },
    /// Roll part of a position into a new contract at today's rate
    Renew {
        #[clap(long)]
        customer: String,
        #[clap(long)]
        instrument: String,
        #[clap(long)]
        quantity: u64,
        #[clap(long)]
        rate: Decimal,
        #[clap(long)]
        traded_price: Decimal,
    },
}

fn main() -> Result<()> {
    // Logs go to stderr so stdout only carries the JSON result
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(std::env::var("RUST_LOG").ok().as_deref()))
        .with_writer(std::io::stderr)
        .init();

    let args: Args = Args::parse();
    let today: NaiveDate = args
        .today
        .unwrap_or_else(|| chrono::Local::now().date_naive());

    let snapshot: input::Snapshot = input::Snapshot::load(&args.snapshot)?;
    let (desk, trades): (CbasDesk, Vec<TradeRow>) = snapshot.into_desk();
    info!(%today, snapshot = %args.snapshot.display(), "loaded snapshot");

    match args.command {
        Command::SettlementDate { date, offset } => {
            let start: NaiveDate = date.unwrap_or(today);
            let offset: u32 = offset.unwrap_or(desk.config().settlement_offset_days);
            let settlement: NaiveDate = desk
                .compute_settlement_date(start, offset)
                .context("failed to compute settlement date")?;
            print_json(&json!({ "date": start, "offset": offset, "settlement_date": settlement }))
        }
        Command::Price => {
            let priced = desk
                .price_new_trades(&trades, today)
                .context("failed to price new trades")?;
            print_json(&priced)
        }
        Command::Exercise {
            customer,
            instrument,
            quantity,
            reference_price,
            settlement_date,
            at_expiry,
        } => {
            let settlement_date: NaiveDate = match settlement_date {
                Some(date) => date,
                None => desk
                    .compute_settlement_date(today, desk.config().settlement_offset_days)
                    .context("failed to compute settlement date")?,
            };
            let request: ExerciseRequest = ExerciseRequest {
                customer_id: customer,
                instrument_code: instrument,
                quantity,
                settlement_date,
                reference_price,
                method: if at_expiry {
                    ExerciseMethod::AtExpiry
                } else {
                    ExerciseMethod::Early
                },
            };
            let result = desk
                .exercise(&request)
                .with_context(|| {
                    format!(
                        "failed to exercise {}/{}",
                        request.customer_id, request.instrument_code
                    )
                })?;
            print_json(&json!({
                "requires_approval": result.requires_approval(),
                "summary": result.summary(),
                "result": result,
            }))
        }
        Command::Expire { date } => {
            let batch = desk
                .settle_expired(date.unwrap_or(today))
                .context("failed to settle expired contracts")?;
            print_json(&batch)
        }
        Command::Renew {
            customer,
            instrument,
            quantity,
            rate,
            traded_price,
        } => {
            let request: RenewalRequest = RenewalRequest {
                customer_id: customer,
                instrument_code: instrument,
                quantity,
                todays_rate: rate,
                traded_price,
            };
            let outcome = desk.renew(&request, today).with_context(|| {
                format!(
                    "failed to renew {}/{}",
                    request.customer_id, request.instrument_code
                )
            })?;
            print_json(&outcome)
        }
    }
}

/// Builds the log filter from `RUST_LOG`, falling back to `info` when it is unset or invalid.
fn log_filter(directives: Option<&str>) -> EnvFilter {
    directives
        .and_then(|directives: &str| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new("info"))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing::level_filters::LevelFilter;

    #[test]
    fn test_log_filter_honours_rust_log() {
        assert_eq!(log_filter(Some("debug")).max_level_hint(), Some(LevelFilter::DEBUG));
        assert_eq!(log_filter(Some("warn")).max_level_hint(), Some(LevelFilter::WARN));
    }

    #[test]
    fn test_log_filter_defaults_to_info() {
        assert_eq!(log_filter(None).max_level_hint(), Some(LevelFilter::INFO));
        assert_eq!(
            log_filter(Some("cbas_lib=verbose")).max_level_hint(),
            Some(LevelFilter::INFO)
        );
    }
}
