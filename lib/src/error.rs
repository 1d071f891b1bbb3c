use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// The step of a request that was being carried out when a collaborator failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    LoadHolidays,
    LoadContracts,
    LoadExecutions,
    LoadQuote,
    LoadOverrides,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stage: &str = match self {
            Stage::LoadHolidays => "loading holidays",
            Stage::LoadContracts => "loading contracts",
            Stage::LoadExecutions => "loading same-day executions",
            Stage::LoadQuote => "loading instrument quote",
            Stage::LoadOverrides => "loading rate/fee overrides",
        };
        f.write_str(stage)
    }
}

/// Errors that stop a single request. Shortfalls, price inversions and tenor clamps are not
/// errors: they travel inside the results as [`crate::exercise::Warning`]s.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CbasError {
    /// A collaborator (holiday calendar, contracts store, execution feed, quote table) failed.
    #[error("data unavailable while {stage} (customer: {}, instrument: {}): {reason}",
        .customer_id.as_deref().unwrap_or("-"),
        .instrument_code.as_deref().unwrap_or("-"))]
    DataUnavailable {
        stage: Stage,
        customer_id: Option<String>,
        instrument_code: Option<String>,
        reason: String,
    },
    /// The request was rejected before any computation started.
    #[error("invalid input `{field}`: {reason}")]
    InvalidInput { field: String, reason: String },
}

impl CbasError {
    /// Builds a `DataUnavailable` error without position context.
    pub fn data_unavailable(stage: Stage, reason: impl Into<String>) -> Self {
        CbasError::DataUnavailable {
            stage,
            customer_id: None,
            instrument_code: None,
            reason: reason.into(),
        }
    }

    /// Builds an `InvalidInput` error naming the offending field.
    pub fn invalid_input(field: impl Into<String>, reason: impl Into<String>) -> Self {
        CbasError::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Attaches the (customer, instrument) pair to a `DataUnavailable` error that does not
    /// carry one yet. Other variants are returned unchanged.
    pub fn with_position(self, customer: &str, instrument: &str) -> Self {
        match self {
            CbasError::DataUnavailable {
                stage,
                customer_id,
                instrument_code,
                reason,
            } => CbasError::DataUnavailable {
                stage,
                customer_id: customer_id.or_else(|| Some(customer.to_string())),
                instrument_code: instrument_code.or_else(|| Some(instrument.to_string())),
                reason,
            },
            other => other,
        }
    }
}

pub type CbasResult<T> = Result<T, CbasError>;
