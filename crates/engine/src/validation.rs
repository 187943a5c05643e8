//! Structural and cross-field checks of raw upstream records.
//!
//! Each `validate_*` function looks at one record and sorts what it finds into
//! fatal errors (the record cannot become a domain model) and warnings (the
//! record is usable but inconsistent).
use api_types::{disbursement, payment, receiver};
use serde::Serialize;

use crate::{
    DisbursementStatus, EngineError, PaymentStatus, ResultEngine,
    asset::{Asset, AssetCode},
    disbursement::DisbursementStats,
    history,
    payment::Payment,
    receiver::{ReceivedAmount, matched_wallet},
    transitions::StateMachine,
    util::{self, collect},
    warnings::InconsistencyWarning,
};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub errors: Vec<EngineError>,
    pub warnings: Vec<InconsistencyWarning>,
}

/// Serializable form of a [`ValidationReport`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ValidationSummary {
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// The first fatal error, if any.
    pub fn first_error(&self) -> Option<&EngineError> {
        self.errors.first()
    }

    /// Splits the report: `Err` with the first fatal error, or the warnings.
    pub fn into_result(self) -> ResultEngine<Vec<InconsistencyWarning>> {
        match self.errors.into_iter().next() {
            Some(err) => Err(err),
            None => Ok(self.warnings),
        }
    }

    pub fn summary(&self) -> ValidationSummary {
        ValidationSummary {
            is_valid: self.is_valid(),
            errors: self.errors.iter().map(ToString::to_string).collect(),
            warnings: self.warnings.iter().map(ToString::to_string).collect(),
        }
    }
}

fn check_status<S: StateMachine>(value: Option<&str>, warnings: &mut Vec<InconsistencyWarning>) {
    if let Some(value) = util::optional_text(value)
        && S::parse(&value).is_none()
    {
        warnings.push(InconsistencyWarning::UnrecognizedStatus { value });
    }
}

fn non_standard_asset(code: &str, err: &EngineError) -> InconsistencyWarning {
    InconsistencyWarning::NonStandardAsset {
        code: code.to_string(),
        reason: err.reason(),
    }
}

fn check_timestamp(field: &str, value: Option<&str>, warnings: &mut Vec<InconsistencyWarning>) {
    if let Some(value) = util::optional_text(value)
        && util::parse_timestamp(&value).is_none()
    {
        warnings.push(InconsistencyWarning::UnparseableTimestamp {
            field: field.to_string(),
            value,
        });
    }
}

pub fn validate_disbursement(raw: &disbursement::Disbursement) -> ValidationReport {
    let mut report = ValidationReport::default();
    let errors = &mut report.errors;
    let warnings = &mut report.warnings;

    collect(errors, util::required_text("id", raw.id.as_deref()));
    collect(errors, util::required_text("name", raw.name.as_deref()));
    let asset = raw.asset.as_ref();
    let asset_id = collect(
        errors,
        util::required_text("asset.id", asset.and_then(|a| a.id.as_deref())),
    );
    let asset_code = collect(
        errors,
        util::required_text("asset.code", asset.and_then(|a| a.code.as_deref())),
    );
    if let (Some(id), Some(code)) = (asset_id, asset_code)
        && let Err(err) = Asset::new(&id, &code, asset.and_then(|a| a.issuer.as_deref()))
    {
        warnings.push(non_standard_asset(&code, &err));
    }
    let wallet = raw.wallet.as_ref();
    collect(
        errors,
        util::required_text("wallet.id", wallet.and_then(|w| w.id.as_deref())),
    );
    collect(
        errors,
        util::required_text("wallet.name", wallet.and_then(|w| w.name.as_deref())),
    );

    let stats = DisbursementStats::from_raw(raw, warnings);
    warnings.extend(stats.consistency_warnings());

    check_status::<DisbursementStatus>(raw.status.as_deref(), warnings);
    check_timestamp("created_at", raw.created_at.as_deref(), warnings);
    history::check::<DisbursementStatus, _>(raw.status_history.as_deref(), warnings);
    report
}

pub fn validate_payment(raw: &payment::Payment) -> ValidationReport {
    let mut report = ValidationReport::default();
    let errors = &mut report.errors;
    let warnings = &mut report.warnings;

    collect(errors, util::required_text("id", raw.id.as_deref()));
    collect(errors, Payment::amount_from_raw(raw));
    let asset_code = collect(
        errors,
        util::required_text(
            "asset.code",
            raw.asset.as_ref().and_then(|a| a.code.as_deref()),
        ),
    );
    if let Some(code) = asset_code
        && let Err(err) = AssetCode::parse(&code)
    {
        warnings.push(non_standard_asset(&code, &err));
    }
    util::optional_address("stellar_address", raw.stellar_address.as_deref(), warnings);

    check_status::<PaymentStatus>(raw.status.as_deref(), warnings);
    check_timestamp("created_at", raw.created_at.as_deref(), warnings);
    history::check::<PaymentStatus, _>(raw.status_history.as_deref(), warnings);
    report
}

/// `true` when the receiver has a non-blank phone number or email.
pub fn has_contact(raw: &receiver::Receiver) -> bool {
    util::optional_text(raw.phone_number.as_deref()).is_some()
        || util::optional_text(raw.email.as_deref()).is_some()
}

/// Validates a receiver as seen through the wallet `wallet_id`.
pub fn validate_receiver(raw: &receiver::Receiver, wallet_id: Option<&str>) -> ValidationReport {
    let mut report = ValidationReport::default();
    let errors = &mut report.errors;
    let warnings = &mut report.warnings;

    collect(errors, util::required_text("id", raw.id.as_deref()));
    if !has_contact(raw) {
        warnings.push(InconsistencyWarning::MissingContact);
    }

    let total = util::count("total_payments", raw.total_payments, warnings);
    let successful = util::count("successful_payments", raw.successful_payments, warnings);
    if successful > total {
        warnings.push(InconsistencyWarning::SuccessfulExceedsTotal { successful, total });
    }

    match (util::optional_text(wallet_id), matched_wallet(raw, wallet_id)) {
        (Some(_), Some(wallet)) => {
            util::optional_address(
                "wallets.stellar_address",
                wallet.stellar_address.as_deref(),
                warnings,
            );
            check_timestamp("wallets.created_at", wallet.created_at.as_deref(), warnings);
        }
        (Some(wallet_id), None) => {
            warnings.push(InconsistencyWarning::UnmatchedWallet { wallet_id });
        }
        (None, _) => {}
    }

    for entry in raw.received_amounts.as_deref().unwrap_or_default() {
        ReceivedAmount::from_raw(entry, warnings);
    }
    report
}
