//! Status history of disbursements and payments.
use api_types::{disbursement, payment};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{Status, transitions::StateMachine, util, warnings::InconsistencyWarning};

/// One recorded status change. Histories are always sorted newest first.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct StatusChange<S> {
    pub status: Status<S>,
    pub timestamp: DateTime<Utc>,
    /// User that made the change, when upstream records it.
    pub actor: Option<String>,
    pub message: Option<String>,
}

/// Read access to the upstream history entry shapes.
pub(crate) trait RawHistoryEntry {
    fn status(&self) -> Option<&str>;
    fn timestamp(&self) -> Option<&str>;
    fn actor(&self) -> Option<&str> {
        None
    }
    fn message(&self) -> Option<&str> {
        None
    }
}

impl RawHistoryEntry for disbursement::StatusHistoryEntry {
    fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    fn timestamp(&self) -> Option<&str> {
        self.timestamp.as_deref()
    }

    fn actor(&self) -> Option<&str> {
        self.user_id.as_deref()
    }
}

impl RawHistoryEntry for payment::StatusHistoryEntry {
    fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    fn timestamp(&self) -> Option<&str> {
        self.timestamp.as_deref()
    }

    fn message(&self) -> Option<&str> {
        self.status_message.as_deref()
    }
}

fn parse_entry<S, E>(entry: &E) -> Option<(Status<S>, DateTime<Utc>)>
where
    S: StateMachine,
    E: RawHistoryEntry,
{
    let status = Status::parse(entry.status()?)?;
    let timestamp = util::parse_timestamp(entry.timestamp()?)?;
    Some((status, timestamp))
}

/// Warnings for every entry that [`build`] would drop or could not read, and
/// for consecutive known statuses the transition table does not connect.
/// History records facts, so none of these are errors.
pub(crate) fn check<S, E>(entries: Option<&[E]>, warnings: &mut Vec<InconsistencyWarning>)
where
    S: StateMachine,
    E: RawHistoryEntry,
{
    let mut usable = Vec::new();
    for (index, entry) in entries.unwrap_or_default().iter().enumerate() {
        match parse_entry::<S, E>(entry) {
            Some(parsed) => {
                if let Status::Unrecognized(value) = &parsed.0 {
                    warnings.push(InconsistencyWarning::UnrecognizedStatus {
                        value: value.clone(),
                    });
                }
                usable.push(parsed);
            }
            None => warnings.push(InconsistencyWarning::IncompleteHistoryEntry { index }),
        }
    }

    usable.sort_by_key(|(_, timestamp)| *timestamp);
    for pair in usable.windows(2) {
        if let (Some(from), Some(to)) = (pair[0].0.known(), pair[1].0.known())
            && from != to
            && !from.can_transition_to(to)
        {
            warnings.push(InconsistencyWarning::UnexpectedTransition {
                from: from.name().to_string(),
                to: to.name().to_string(),
            });
        }
    }
}

/// Drops entries without a status or a parseable timestamp and sorts the
/// rest newest first. Unknown statuses are kept as recorded.
///
/// `default_message` fills entries without a message; `None` keeps them empty.
pub(crate) fn build<S, E>(
    entries: Option<&[E]>,
    default_message: Option<&str>,
) -> Vec<StatusChange<S>>
where
    S: StateMachine,
    E: RawHistoryEntry,
{
    let mut history: Vec<StatusChange<S>> = entries
        .unwrap_or_default()
        .iter()
        .filter_map(|entry| {
            let (status, timestamp) = parse_entry::<S, E>(entry)?;
            Some(StatusChange {
                status,
                timestamp,
                actor: util::optional_text(entry.actor()),
                message: util::optional_text(entry.message())
                    .or_else(|| default_message.map(ToString::to_string)),
            })
        })
        .collect();
    history.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    history
}
