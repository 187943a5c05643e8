//! Non-fatal inconsistencies found while validating upstream records.
//!
//! Warnings never change the outcome of a normalization. They are emitted as
//! `tracing` events and are also available on [`ValidationReport`] for callers
//! that want them as values.
//!
//!  [`ValidationReport`]: super::validation::ValidationReport
use std::fmt;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::EntityKind;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InconsistencyWarning {
    /// The per-status payment counts do not add up to the total.
    PaymentCountMismatch { total: u64, sum_of_parts: u64 },
    DisbursedExceedsTotal { disbursed: Decimal, total: Decimal },
    SuccessfulExceedsTotal { successful: u64, total: u64 },
    UnmatchedWallet { wallet_id: String },
    MissingContact,
    /// A received-amount entry with a zero or negative amount; it is dropped.
    NonPositiveReceivedAmount { asset_code: String, amount: Decimal },
    UnparseableReceivedAmount { asset_code: String, value: String },
    UnrecognizedStatus { value: String },
    /// A negative payment count; it is read as 0.
    InvalidCount { field: String, value: i64 },
    /// A negative or unparseable aggregate amount; it is read as absent.
    InvalidAmount { field: String, value: String },
    /// A malformed account address; it is read as absent.
    MalformedAddress {
        field: String,
        value: String,
        reason: String,
    },
    /// An asset code or issuer that could not be used to create the asset.
    NonStandardAsset { code: String, reason: String },
    UnparseableTimestamp { field: String, value: String },
    /// A status-history entry without a status or a parseable timestamp; it
    /// is dropped.
    IncompleteHistoryEntry { index: usize },
    /// Two consecutive history entries that the transition table does not
    /// connect.
    UnexpectedTransition { from: String, to: String },
}

impl fmt::Display for InconsistencyWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PaymentCountMismatch {
                total,
                sum_of_parts,
            } => write!(
                f,
                "payment counts sum to {sum_of_parts} but total is {total}"
            ),
            Self::DisbursedExceedsTotal { disbursed, total } => {
                write!(f, "disbursed amount {disbursed} exceeds total amount {total}")
            }
            Self::SuccessfulExceedsTotal { successful, total } => write!(
                f,
                "successful payments ({successful}) exceed total payments ({total})"
            ),
            Self::UnmatchedWallet { wallet_id } => {
                write!(f, "wallet {wallet_id} not found among receiver wallets")
            }
            Self::MissingContact => f.write_str("receiver has neither phone number nor email"),
            Self::NonPositiveReceivedAmount { asset_code, amount } => {
                write!(f, "dropping non-positive received amount {amount} {asset_code}")
            }
            Self::UnparseableReceivedAmount { asset_code, value } => {
                write!(f, "dropping unparseable received amount '{value}' {asset_code}")
            }
            Self::UnrecognizedStatus { value } => write!(f, "unrecognized status '{value}'"),
            Self::InvalidCount { field, value } => {
                write!(f, "{field} is {value}, reading it as 0")
            }
            Self::InvalidAmount { field, value } => {
                write!(f, "ignoring invalid amount '{value}' in {field}")
            }
            Self::MalformedAddress {
                field,
                value,
                reason,
            } => write!(f, "ignoring address '{value}' in {field}: {reason}"),
            Self::NonStandardAsset { code, reason } => {
                write!(f, "asset {code} is not a valid issued asset: {reason}")
            }
            Self::UnparseableTimestamp { field, value } => {
                write!(f, "unparseable timestamp '{value}' in {field}")
            }
            Self::IncompleteHistoryEntry { index } => {
                write!(f, "dropping status history entry #{index}: missing status or timestamp")
            }
            Self::UnexpectedTransition { from, to } => {
                write!(f, "status history moves from {from} to {to}")
            }
        }
    }
}

impl InconsistencyWarning {
    /// Emits the warning as a structured `tracing` event.
    pub fn emit(&self, entity: EntityKind, record_id: &str) {
        tracing::warn!(
            entity = entity.as_str(),
            record_id,
            warning = %self,
            "inconsistent upstream record"
        );
    }
}
