//! The module contains the errors the engine can throw.
//!
//! The errors are:
//!
//! - [`MissingRequiredField`] thrown when a field required by a domain model is
//!   absent or blank.
//! - [`InvalidFieldValue`] thrown when a field is present but semantically
//!   invalid (non-positive amount, malformed address, ...).
//! - [`PermissionDenied`] thrown when an access or role-change check fails.
//!
//! Non-fatal problems are not errors: see [`InconsistencyWarning`] and
//! [`RowIssue`].
//!
//!  [`MissingRequiredField`]: EngineError::MissingRequiredField
//!  [`InvalidFieldValue`]: EngineError::InvalidFieldValue
//!  [`PermissionDenied`]: EngineError::PermissionDenied
//!  [`InconsistencyWarning`]: super::warnings::InconsistencyWarning
//!  [`RowIssue`]: super::aggregator::RowIssue
use serde::Serialize;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum EngineError {
    #[error("missing required field \"{field}\"")]
    MissingRequiredField { field: String },
    #[error("invalid value for \"{field}\": {reason}")]
    InvalidFieldValue { field: String, reason: String },
    #[error("permission denied: {0}")]
    PermissionDenied(String),
}

impl EngineError {
    pub(crate) fn missing(field: &str) -> Self {
        Self::MissingRequiredField {
            field: field.to_string(),
        }
    }

    pub(crate) fn invalid(field: &str, reason: impl Into<String>) -> Self {
        Self::InvalidFieldValue {
            field: field.to_string(),
            reason: reason.into(),
        }
    }

    /// The offending field, for normalization errors.
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::MissingRequiredField { field } | Self::InvalidFieldValue { field, .. } => {
                Some(field)
            }
            Self::PermissionDenied(_) => None,
        }
    }

    /// Human-readable reason, suitable to be shown verbatim to a user.
    pub fn reason(&self) -> String {
        match self {
            Self::MissingRequiredField { .. } => "field is required".to_string(),
            Self::InvalidFieldValue { reason, .. } => reason.clone(),
            Self::PermissionDenied(reason) => reason.clone(),
        }
    }
}
