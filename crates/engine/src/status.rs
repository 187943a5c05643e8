//! Record kinds and their lifecycle statuses.
//!
//! Upstream sends statuses in upper case (`DRAFT`, `PENDING`, ...); parsing is
//! case-insensitive and the canonical form is `snake_case`.
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{EngineError, ResultEngine, transitions::StateMachine};

/// The kind of record handled by the engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Disbursement,
    Payment,
    Receiver,
}

impl EntityKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Disbursement => "disbursement",
            Self::Payment => "payment",
            Self::Receiver => "receiver",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for EntityKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "disbursement" => Ok(Self::Disbursement),
            "payment" => Ok(Self::Payment),
            "receiver" => Ok(Self::Receiver),
            other => Err(EngineError::invalid(
                "kind",
                format!("unknown record kind: {other}"),
            )),
        }
    }
}

/// Generates a status enum with its canonical strings and case-insensitive
/// parsing.
macro_rules! status_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$(Self::$variant),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $text),+
                }
            }

            /// Case-insensitive lookup; `None` for unknown values.
            pub fn parse(value: &str) -> Option<Self> {
                let value = value.trim();
                Self::ALL
                    .iter()
                    .copied()
                    .find(|status| status.as_str().eq_ignore_ascii_case(value))
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl TryFrom<&str> for $name {
            type Error = EngineError;

            fn try_from(value: &str) -> ResultEngine<Self> {
                Self::parse(value).ok_or_else(|| {
                    EngineError::invalid("status", format!("unknown status: {}", value.trim()))
                })
            }
        }
    };
}

status_enum!(
    /// Lifecycle of a disbursement.
    DisbursementStatus {
        Draft => "draft",
        Pending => "pending",
        Processing => "processing",
        Completed => "completed",
        Failed => "failed",
        Retry => "retry",
        Canceled => "canceled",
    }
);

status_enum!(
    /// Lifecycle of a single payment.
    PaymentStatus {
        Pending => "pending",
        Processing => "processing",
        Completed => "completed",
        Failed => "failed",
        Retry => "retry",
        Canceled => "canceled",
    }
);

/// A status as recorded upstream: one of ours, or the raw text of one we do
/// not know. Unknown statuses are kept so recorded history is not lost.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum Status<S> {
    Known(S),
    Unrecognized(String),
}

impl<S: StateMachine> Status<S> {
    /// `None` for blank input.
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        if value.is_empty() {
            return None;
        }
        Some(S::parse(value).map_or_else(|| Self::Unrecognized(value.to_string()), Self::Known))
    }

    pub fn known(&self) -> Option<S> {
        match self {
            Self::Known(status) => Some(*status),
            Self::Unrecognized(_) => None,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Known(status) => status.name(),
            Self::Unrecognized(value) => value,
        }
    }
}

impl<S: StateMachine> fmt::Display for Status<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!(
            DisbursementStatus::parse("DRAFT"),
            Some(DisbursementStatus::Draft)
        );
        assert_eq!(
            PaymentStatus::parse(" Processing "),
            Some(PaymentStatus::Processing)
        );
        assert_eq!(PaymentStatus::parse("draft"), None);
    }

    #[test]
    fn unknown_status_keeps_its_text() {
        assert_eq!(
            Status::<PaymentStatus>::parse(" success "),
            Some(Status::Unrecognized("success".to_string()))
        );
        assert_eq!(
            Status::<PaymentStatus>::parse("FAILED"),
            Some(Status::Known(PaymentStatus::Failed))
        );
        assert_eq!(Status::<PaymentStatus>::parse("  "), None);
        assert_eq!(
            Status::<DisbursementStatus>::parse("Ready").unwrap().to_string(),
            "Ready"
        );
    }

    #[test]
    fn try_from_reports_unknown_status() {
        let err = DisbursementStatus::try_from("paused").unwrap_err();
        assert_eq!(err.field(), Some("status"));
    }

    #[test]
    fn entity_kind_round_trips_through_text() {
        for kind in [
            EntityKind::Disbursement,
            EntityKind::Payment,
            EntityKind::Receiver,
        ] {
            assert_eq!(EntityKind::try_from(kind.as_str()).unwrap(), kind);
        }
    }
}
