//! Internal helpers for record validation and conversion.
//!
//! These utilities are **not** part of the public API. The validator and the
//! normalizer both go through them, so a field is judged the same way whether
//! we are only checking a record or building the domain model from it.

use api_types::{LooseDecimal, common::UserRef};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use unicode_normalization::UnicodeNormalization;

use crate::{
    EngineError, ResultEngine, WalletAddress,
    amount::{DecimalParseError, parse_decimal},
    warnings::InconsistencyWarning,
};

/// Trimmed, non-empty text or `None`.
pub(crate) fn optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

pub(crate) fn required_text(field: &str, value: Option<&str>) -> ResultEngine<String> {
    optional_text(value).ok_or_else(|| EngineError::missing(field))
}

/// A payment count: absent means 0, a negative count is reported and read
/// as 0.
pub(crate) fn count(
    field: &str,
    value: Option<i64>,
    warnings: &mut Vec<InconsistencyWarning>,
) -> u64 {
    let Some(value) = value else {
        return 0;
    };
    u64::try_from(value).unwrap_or_else(|_| {
        warnings.push(InconsistencyWarning::InvalidCount {
            field: field.to_string(),
            value,
        });
        0
    })
}

/// A non-negative aggregate amount. Absent or blank means `None`; negative
/// or unparseable values are reported and also read as `None`.
pub(crate) fn optional_amount(
    field: &str,
    value: Option<&LooseDecimal>,
    warnings: &mut Vec<InconsistencyWarning>,
) -> Option<Decimal> {
    let text = value?.to_text();
    match parse_decimal(&text) {
        Ok(parsed) if parsed.value() >= Decimal::ZERO => Some(parsed.value()),
        Err(DecimalParseError::Empty) => None,
        _ => {
            warnings.push(InconsistencyWarning::InvalidAmount {
                field: field.to_string(),
                value: text,
            });
            None
        }
    }
}

/// An optional address. Blank means `None`; a malformed one is reported and
/// read as `None`.
pub(crate) fn optional_address(
    field: &str,
    value: Option<&str>,
    warnings: &mut Vec<InconsistencyWarning>,
) -> Option<WalletAddress> {
    let text = optional_text(value)?;
    match WalletAddress::parse_field(field, &text) {
        Ok(address) => Some(address),
        Err(err) => {
            warnings.push(InconsistencyWarning::MalformedAddress {
                field: field.to_string(),
                value: text,
                reason: err.reason(),
            });
            None
        }
    }
}

pub(crate) fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value.trim())
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

fn normalize_name_part(input: Option<&str>) -> Option<String> {
    let trimmed = input?.trim();
    if trimmed.is_empty() {
        return None;
    }
    let collapsed = trimmed.split_whitespace().collect::<Vec<_>>().join(" ");
    Some(collapsed.nfc().collect())
}

/// `"First Last"`, only when both parts are present.
pub(crate) fn display_name(user: Option<&UserRef>) -> Option<String> {
    let user = user?;
    let first = normalize_name_part(user.first_name.as_deref())?;
    let last = normalize_name_part(user.last_name.as_deref())?;
    Some(format!("{first} {last}"))
}

/// Runs a field check, stashing the error and returning the value if any.
pub(crate) fn collect<T>(errors: &mut Vec<EngineError>, result: ResultEngine<T>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(err) => {
            errors.push(err);
            None
        }
    }
}
