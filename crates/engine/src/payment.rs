//! The module contains the `Payment` domain model.
use api_types::payment as raw;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::{
    EngineError, PaymentStatus, ResultEngine, Status, WalletAddress, amount,
    history::{self, StatusChange},
    util,
};

/// Message given to history entries that upstream left without one.
pub const DEFAULT_STATUS_MESSAGE: &str = "Status updated";

/// A single transfer, possibly part of a disbursement.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Payment {
    pub id: String,
    pub created_at: Option<DateTime<Utc>>,
    /// Name of the parent disbursement, or the direct-payment label.
    pub disbursement_name: String,
    /// Id of the parent disbursement, empty for direct payments.
    pub disbursement_id: String,
    pub receiver_id: Option<String>,
    pub receiver_wallet_id: Option<String>,
    pub transaction_id: Option<String>,
    pub sender_address: Option<WalletAddress>,
    /// Always > 0.
    pub amount: Decimal,
    pub asset_code: String,
    pub external_payment_id: Option<String>,
    pub circle_transfer_request_id: Option<String>,
    pub status: Option<Status<PaymentStatus>>,
    pub status_history: Vec<StatusChange<PaymentStatus>>,
}

impl Payment {
    /// Parses the amount, which must be present and strictly positive.
    pub(crate) fn amount_from_raw(raw: &raw::Payment) -> ResultEngine<Decimal> {
        let text = raw
            .amount
            .as_ref()
            .map(|a| a.to_text())
            .ok_or_else(|| EngineError::missing("amount"))?;
        amount::parse_positive("amount", &text)
    }

    pub(crate) fn from_raw(raw: &raw::Payment, direct_payment_label: &str) -> ResultEngine<Self> {
        let disbursement = raw.disbursement.as_ref();
        let receiver_wallet = raw.receiver_wallet.as_ref();
        Ok(Self {
            id: util::required_text("id", raw.id.as_deref())?,
            created_at: raw.created_at.as_deref().and_then(util::parse_timestamp),
            disbursement_name: util::optional_text(disbursement.and_then(|d| d.name.as_deref()))
                .unwrap_or_else(|| direct_payment_label.to_string()),
            disbursement_id: util::optional_text(disbursement.and_then(|d| d.id.as_deref()))
                .unwrap_or_default(),
            receiver_id: util::optional_text(
                receiver_wallet
                    .and_then(|w| w.receiver.as_ref())
                    .and_then(|r| r.id.as_deref()),
            ),
            receiver_wallet_id: util::optional_text(receiver_wallet.and_then(|w| w.id.as_deref())),
            transaction_id: util::optional_text(raw.stellar_transaction_id.as_deref()),
            sender_address: util::optional_address(
                "stellar_address",
                raw.stellar_address.as_deref(),
                &mut Vec::new(),
            ),
            amount: Self::amount_from_raw(raw)?,
            asset_code: util::required_text(
                "asset.code",
                raw.asset.as_ref().and_then(|a| a.code.as_deref()),
            )?,
            external_payment_id: util::optional_text(raw.external_payment_id.as_deref()),
            circle_transfer_request_id: util::optional_text(
                raw.circle_transfer_request_id.as_deref(),
            ),
            status: raw.status.as_deref().and_then(Status::parse),
            status_history: history::build(
                raw.status_history.as_deref(),
                Some(DEFAULT_STATUS_MESSAGE),
            ),
        })
    }

    /// `true` when the payment does not belong to a disbursement.
    pub fn is_direct(&self) -> bool {
        self.disbursement_id.is_empty()
    }
}
