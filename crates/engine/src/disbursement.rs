//! The module contains the `Disbursement` domain model.
use api_types::disbursement as raw;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::{
    DisbursementStatus, ResultEngine, Status,
    asset::AssetSummary,
    history::{self, StatusChange},
    util,
    warnings::InconsistencyWarning,
};

/// The funding wallet of a disbursement (id and name only).
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct WalletSummary {
    pub id: String,
    pub name: String,
}

/// Payment counters and amounts of a disbursement.
///
/// Upstream is expected to keep
/// `payments_total_count == successful + failed + canceled + remaining` and
/// `disbursed_amount <= total_amount`, but it may be transiently inconsistent:
/// violations are reported by [`DisbursementStats::consistency_warnings`], never
/// rejected.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct DisbursementStats {
    pub payments_successful_count: u64,
    pub payments_failed_count: u64,
    pub payments_canceled_count: u64,
    pub payments_remaining_count: u64,
    pub payments_total_count: u64,
    pub total_amount: Decimal,
    pub disbursed_amount: Decimal,
    pub average_payment_amount: Decimal,
}

impl DisbursementStats {
    /// Reads the counters and amounts. Negative or unparseable values are
    /// reported in `warnings` and read as 0.
    pub(crate) fn from_raw(
        raw: &raw::Disbursement,
        warnings: &mut Vec<InconsistencyWarning>,
    ) -> Self {
        let payments_total_count = util::count("total_payments", raw.total_payments, warnings);
        let total_amount =
            util::optional_amount("total_amount", raw.total_amount.as_ref(), warnings)
                .unwrap_or_default();
        let average = util::optional_amount("average_amount", raw.average_amount.as_ref(), warnings);
        // Derive the average when upstream did not send a usable one.
        let average_payment_amount = match average {
            Some(average) => average,
            None if payments_total_count > 0 => total_amount
                .checked_div(Decimal::from(payments_total_count))
                .unwrap_or_default(),
            None => Decimal::ZERO,
        };

        Self {
            payments_successful_count: util::count(
                "total_payments_sent",
                raw.total_payments_sent,
                warnings,
            ),
            payments_failed_count: util::count(
                "total_payments_failed",
                raw.total_payments_failed,
                warnings,
            ),
            payments_canceled_count: util::count(
                "total_payments_canceled",
                raw.total_payments_canceled,
                warnings,
            ),
            payments_remaining_count: util::count(
                "total_payments_remaining",
                raw.total_payments_remaining,
                warnings,
            ),
            payments_total_count,
            total_amount,
            disbursed_amount: util::optional_amount(
                "amount_disbursed",
                raw.amount_disbursed.as_ref(),
                warnings,
            )
            .unwrap_or_default(),
            average_payment_amount,
        }
    }

    /// Sum of the per-status counters (saturating).
    pub fn sum_of_parts(&self) -> u64 {
        self.payments_successful_count
            .saturating_add(self.payments_failed_count)
            .saturating_add(self.payments_canceled_count)
            .saturating_add(self.payments_remaining_count)
    }

    pub fn consistency_warnings(&self) -> Vec<InconsistencyWarning> {
        let mut warnings = Vec::new();
        let sum_of_parts = self.sum_of_parts();
        if sum_of_parts != self.payments_total_count {
            warnings.push(InconsistencyWarning::PaymentCountMismatch {
                total: self.payments_total_count,
                sum_of_parts,
            });
        }
        if self.total_amount > Decimal::ZERO && self.disbursed_amount > self.total_amount {
            warnings.push(InconsistencyWarning::DisbursedExceedsTotal {
                disbursed: self.disbursed_amount,
                total: self.total_amount,
            });
        }
        warnings
    }
}

/// A batch payout campaign.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Disbursement {
    pub id: String,
    pub name: String,
    pub created_at: Option<DateTime<Utc>>,
    /// `"First Last"` of the creator, when both parts are known.
    pub created_by: Option<String>,
    pub started_by: Option<String>,
    pub stats: DisbursementStats,
    /// `None` when upstream sent no status.
    pub status: Option<Status<DisbursementStatus>>,
    pub asset: AssetSummary,
    pub wallet: WalletSummary,
    pub registration_contact_type: Option<String>,
    pub verification_field: Option<String>,
    pub file_name: Option<String>,
    pub receiver_registration_message_template: Option<String>,
    pub status_history: Vec<StatusChange<DisbursementStatus>>,
}

impl Disbursement {
    /// Maps a raw record. Fails on the first fatal problem; warnings are the
    /// validator's business.
    pub(crate) fn from_raw(raw: &raw::Disbursement) -> ResultEngine<Self> {
        let asset = raw.asset.as_ref();
        let wallet = raw.wallet.as_ref();
        Ok(Self {
            id: util::required_text("id", raw.id.as_deref())?,
            name: util::required_text("name", raw.name.as_deref())?,
            created_at: raw.created_at.as_deref().and_then(util::parse_timestamp),
            created_by: util::display_name(raw.created_by.as_ref()),
            started_by: util::display_name(raw.started_by.as_ref()),
            stats: DisbursementStats::from_raw(raw, &mut Vec::new()),
            status: raw.status.as_deref().and_then(Status::parse),
            asset: AssetSummary {
                id: util::required_text("asset.id", asset.and_then(|a| a.id.as_deref()))?,
                code: util::required_text("asset.code", asset.and_then(|a| a.code.as_deref()))?,
            },
            wallet: WalletSummary {
                id: util::required_text("wallet.id", wallet.and_then(|w| w.id.as_deref()))?,
                name: util::required_text("wallet.name", wallet.and_then(|w| w.name.as_deref()))?,
            },
            registration_contact_type: util::optional_text(
                raw.registration_contact_type.as_deref(),
            ),
            verification_field: util::optional_text(raw.verification_field.as_deref()),
            file_name: util::optional_text(raw.file_name.as_deref()),
            receiver_registration_message_template: util::optional_text(
                raw.receiver_registration_message_template.as_deref(),
            ),
            status_history: history::build(raw.status_history.as_deref(), None),
        })
    }
}
