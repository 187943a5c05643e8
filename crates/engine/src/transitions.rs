//! Status transition tables.
//!
//! The tables are advisory: callers that are about to change a record's status
//! check them first. Normalization never rejects a record because its history
//! contains a transition missing from the table, since history records facts.
use crate::{DisbursementStatus, EngineError, EntityKind, PaymentStatus, ResultEngine};

/// A status enum with an explicit transition table.
pub trait StateMachine: Copy + Eq + 'static {
    fn parse(value: &str) -> Option<Self>;

    /// Statuses reachable in one step. Empty for terminal statuses.
    fn next_states(self) -> &'static [Self];

    fn name(self) -> &'static str;

    fn is_terminal(self) -> bool {
        self.next_states().is_empty()
    }

    fn can_transition_to(self, next: Self) -> bool {
        self.next_states().contains(&next)
    }
}

impl StateMachine for DisbursementStatus {
    fn parse(value: &str) -> Option<Self> {
        DisbursementStatus::parse(value)
    }

    fn next_states(self) -> &'static [Self] {
        use DisbursementStatus::*;
        match self {
            Draft => &[Pending, Canceled],
            Pending => &[Processing, Canceled],
            Processing => &[Completed, Failed, Canceled],
            Failed => &[Retry, Canceled],
            Retry => &[Processing, Failed, Canceled],
            Completed | Canceled => &[],
        }
    }

    fn name(self) -> &'static str {
        self.as_str()
    }
}

impl StateMachine for PaymentStatus {
    fn parse(value: &str) -> Option<Self> {
        PaymentStatus::parse(value)
    }

    fn next_states(self) -> &'static [Self] {
        use PaymentStatus::*;
        match self {
            Pending => &[Processing, Failed, Canceled],
            Processing => &[Completed, Failed],
            Failed => &[Retry, Canceled],
            Retry => &[Processing, Failed, Canceled],
            Completed | Canceled => &[],
        }
    }

    fn name(self) -> &'static str {
        self.as_str()
    }
}

/// String-level check for machine `S`. An unknown current status allows no
/// transition at all.
pub fn is_allowed<S: StateMachine>(current: &str, next: &str) -> bool {
    match (S::parse(current), S::parse(next)) {
        (Some(current), Some(next)) => current.can_transition_to(next),
        _ => false,
    }
}

/// Checks a transition for the machine of `kind`. Receivers have no status
/// machine, so every transition is refused.
pub fn is_transition_allowed(kind: EntityKind, current: &str, next: &str) -> bool {
    match kind {
        EntityKind::Disbursement => is_allowed::<DisbursementStatus>(current, next),
        EntityKind::Payment => is_allowed::<PaymentStatus>(current, next),
        EntityKind::Receiver => false,
    }
}

/// Fails with `InvalidFieldValue` on `status` when `current -> next` is not in
/// the table.
pub fn ensure_transition<S: StateMachine>(current: S, next: S) -> ResultEngine<()> {
    if current.can_transition_to(next) {
        return Ok(());
    }
    let reason = if current.is_terminal() {
        format!("{} is a terminal status", current.name())
    } else {
        format!("cannot move from {} to {}", current.name(), next.name())
    };
    Err(EngineError::invalid("status", reason))
}
