use api_types::{disbursement as raw_disbursement, payment as raw_payment, receiver as raw_receiver};
use serde::Serialize;

use crate::{
    EngineError, EntityKind, ResultEngine,
    aggregator::{self, Aggregate, DEFAULT_AMOUNT_COLUMN, STELLAR_DECIMAL_PLACES},
    disbursement::Disbursement,
    payment::Payment,
    receiver::Receiver,
    validation::{self, ValidationReport},
    warnings::InconsistencyWarning,
};

pub const DEFAULT_DIRECT_PAYMENT_LABEL: &str = "Direct Payment";

/// One upstream record of any kind.
#[derive(Clone, Debug)]
pub enum RawRecord {
    Disbursement(raw_disbursement::Disbursement),
    Payment(raw_payment::Payment),
    /// A receiver, seen through one of its wallets.
    Receiver {
        receiver: raw_receiver::Receiver,
        wallet_id: Option<String>,
    },
}

impl RawRecord {
    pub fn kind(&self) -> EntityKind {
        match self {
            Self::Disbursement(_) => EntityKind::Disbursement,
            Self::Payment(_) => EntityKind::Payment,
            Self::Receiver { .. } => EntityKind::Receiver,
        }
    }

    /// The upstream id, if there is a usable one.
    pub fn id(&self) -> Option<&str> {
        let id = match self {
            Self::Disbursement(raw) => raw.id.as_deref(),
            Self::Payment(raw) => raw.id.as_deref(),
            Self::Receiver { receiver, .. } => receiver.id.as_deref(),
        };
        id.map(str::trim).filter(|id| !id.is_empty())
    }
}

/// A normalized domain record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Record {
    Disbursement(Disbursement),
    Payment(Payment),
    Receiver(Receiver),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct BatchItem {
    pub index: usize,
    pub record: Record,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct BatchFailure {
    pub index: usize,
    pub kind: EntityKind,
    pub record_id: Option<String>,
    pub error: EngineError,
}

/// Result of a batch: every input lands in exactly one of the two lists.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct BatchOutcome {
    pub records: Vec<BatchItem>,
    pub failures: Vec<BatchFailure>,
}

impl BatchOutcome {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Normalization and aggregation entry point.
///
/// The engine holds configuration only: every call is a pure function of its
/// arguments, so one engine can be shared across threads.
#[derive(Clone, Debug)]
pub struct Engine {
    max_decimal_places: u32,
    amount_column: String,
    direct_payment_label: String,
}

impl Default for Engine {
    fn default() -> Self {
        Self::builder().build()
    }
}

fn emit_warnings(kind: EntityKind, record_id: &str, warnings: &[InconsistencyWarning]) {
    for warning in warnings {
        warning.emit(kind, record_id);
    }
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    pub fn max_decimal_places(&self) -> u32 {
        self.max_decimal_places
    }

    pub fn amount_column(&self) -> &str {
        &self.amount_column
    }

    pub fn direct_payment_label(&self) -> &str {
        &self.direct_payment_label
    }

    pub fn normalize_disbursement(
        &self,
        raw: &raw_disbursement::Disbursement,
    ) -> ResultEngine<Disbursement> {
        let warnings = validation::validate_disbursement(raw).into_result()?;
        let disbursement = Disbursement::from_raw(raw)?;
        emit_warnings(EntityKind::Disbursement, &disbursement.id, &warnings);
        Ok(disbursement)
    }

    pub fn normalize_payment(&self, raw: &raw_payment::Payment) -> ResultEngine<Payment> {
        let warnings = validation::validate_payment(raw).into_result()?;
        let payment = Payment::from_raw(raw, &self.direct_payment_label)?;
        emit_warnings(EntityKind::Payment, &payment.id, &warnings);
        Ok(payment)
    }

    /// Normalizes a receiver; wallet-derived fields come from the wallet with
    /// `wallet_id` and stay empty when it is not found.
    pub fn normalize_receiver(
        &self,
        raw: &raw_receiver::Receiver,
        wallet_id: Option<&str>,
    ) -> ResultEngine<Receiver> {
        let warnings = validation::validate_receiver(raw, wallet_id).into_result()?;
        let receiver = Receiver::from_raw(raw, wallet_id)?;
        emit_warnings(EntityKind::Receiver, &receiver.id, &warnings);
        Ok(receiver)
    }

    pub fn normalize(&self, raw: &RawRecord) -> ResultEngine<Record> {
        match raw {
            RawRecord::Disbursement(raw) => self.normalize_disbursement(raw).map(Record::Disbursement),
            RawRecord::Payment(raw) => self.normalize_payment(raw).map(Record::Payment),
            RawRecord::Receiver {
                receiver,
                wallet_id,
            } => self
                .normalize_receiver(receiver, wallet_id.as_deref())
                .map(Record::Receiver),
        }
    }

    /// Normalizes every record. A fatal error on one record is collected in
    /// [`BatchOutcome::failures`] and does not stop the others.
    pub fn normalize_batch(&self, raws: &[RawRecord]) -> BatchOutcome {
        let mut outcome = BatchOutcome::default();
        for (index, raw) in raws.iter().enumerate() {
            match self.normalize(raw) {
                Ok(record) => outcome.records.push(BatchItem { index, record }),
                Err(error) => {
                    tracing::warn!(
                        index,
                        entity = raw.kind().as_str(),
                        record_id = raw.id().unwrap_or_default(),
                        "rejecting record: {error}"
                    );
                    outcome.failures.push(BatchFailure {
                        index,
                        kind: raw.kind(),
                        record_id: raw.id().map(ToString::to_string),
                        error,
                    });
                }
            }
        }
        tracing::debug!(
            normalized = outcome.records.len(),
            rejected = outcome.failures.len(),
            "batch normalized"
        );
        outcome
    }

    /// Runs only the consistency checks, without building the model.
    pub fn validate(&self, raw: &RawRecord) -> ValidationReport {
        match raw {
            RawRecord::Disbursement(raw) => validation::validate_disbursement(raw),
            RawRecord::Payment(raw) => validation::validate_payment(raw),
            RawRecord::Receiver {
                receiver,
                wallet_id,
            } => validation::validate_receiver(receiver, wallet_id.as_deref()),
        }
    }

    /// Aggregates the configured amount column of `input`.
    pub fn aggregate_csv(&self, input: &str) -> Aggregate {
        aggregator::aggregate(input, &self.amount_column, self.max_decimal_places)
    }

    /// Aggregates another column of `input`, with the configured precision.
    pub fn aggregate_column(&self, input: &str, column: &str) -> Aggregate {
        aggregator::aggregate(input, column, self.max_decimal_places)
    }
}

/// The builder for `Engine`
pub struct EngineBuilder {
    max_decimal_places: u32,
    amount_column: String,
    direct_payment_label: String,
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self {
            max_decimal_places: STELLAR_DECIMAL_PLACES,
            amount_column: DEFAULT_AMOUNT_COLUMN.to_string(),
            direct_payment_label: DEFAULT_DIRECT_PAYMENT_LABEL.to_string(),
        }
    }
}

impl EngineBuilder {
    /// Fraction digits above which aggregated values get a precision warning.
    pub fn max_decimal_places(mut self, places: u32) -> EngineBuilder {
        self.max_decimal_places = places;
        self
    }

    /// CSV column read by [`Engine::aggregate_csv`].
    pub fn amount_column(mut self, column: &str) -> EngineBuilder {
        self.amount_column = column.trim().to_string();
        self
    }

    /// Disbursement name given to payments without a disbursement.
    pub fn direct_payment_label(mut self, label: &str) -> EngineBuilder {
        self.direct_payment_label = label.to_string();
        self
    }

    /// Construct `Engine`
    pub fn build(self) -> Engine {
        Engine {
            max_decimal_places: self.max_decimal_places,
            amount_column: self.amount_column,
            direct_payment_label: self.direct_payment_label,
        }
    }
}
