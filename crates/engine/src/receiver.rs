//! The module contains the `Receiver` domain model.
use api_types::receiver as raw;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::{
    ResultEngine, WalletAddress,
    amount::{DecimalParseError, parse_decimal},
    util,
    warnings::InconsistencyWarning,
};

/// The receiver wallet selected by id, with its custodial provider.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ReceiverWallet {
    pub id: String,
    pub stellar_address: Option<WalletAddress>,
    pub provider_name: Option<String>,
    pub status: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

/// Total received by a receiver in one asset. `amount` is always > 0.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ReceivedAmount {
    pub amount: Decimal,
    pub asset_code: String,
    pub asset_issuer: Option<WalletAddress>,
}

impl ReceivedAmount {
    /// Keeps the entry when its amount is > 0. Dropped entries and a malformed
    /// issuer are reported in `warnings`.
    pub(crate) fn from_raw(
        raw: &raw::ReceivedAmount,
        warnings: &mut Vec<InconsistencyWarning>,
    ) -> Option<Self> {
        let asset_code = util::optional_text(raw.asset_code.as_deref()).unwrap_or_default();
        let text = raw
            .received_amount
            .as_ref()
            .map(|a| a.to_text())
            .unwrap_or_default();
        let amount = match parse_decimal(&text) {
            Ok(parsed) => parsed.value(),
            Err(DecimalParseError::Empty) => Decimal::ZERO,
            Err(_) => {
                warnings.push(InconsistencyWarning::UnparseableReceivedAmount {
                    asset_code,
                    value: text,
                });
                return None;
            }
        };
        if amount <= Decimal::ZERO {
            warnings.push(InconsistencyWarning::NonPositiveReceivedAmount { asset_code, amount });
            return None;
        }
        Some(Self {
            amount,
            asset_code,
            asset_issuer: util::optional_address(
                "received_amounts.asset_issuer",
                raw.asset_issuer.as_deref(),
                warnings,
            ),
        })
    }
}

/// End recipient of payments.
///
/// At least one of `phone_number` and `email` is expected; a receiver without
/// contact is still normalized (with a warning).
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Receiver {
    pub id: String,
    pub phone_number: Option<String>,
    pub email: Option<String>,
    /// The wallet requested by id, if the receiver has it.
    pub wallet: Option<ReceiverWallet>,
    pub total_payments_count: u64,
    pub successful_payments_count: u64,
    pub received_amounts: Vec<ReceivedAmount>,
    /// Status of the matched wallet.
    pub status: Option<String>,
}

/// Finds the wallet with `wallet_id` among the receiver's wallets. A blank id
/// selects nothing.
pub(crate) fn matched_wallet<'a>(
    raw: &'a raw::Receiver,
    wallet_id: Option<&str>,
) -> Option<&'a raw::ReceiverWallet> {
    let wallet_id = wallet_id.map(str::trim).filter(|id| !id.is_empty())?;
    raw.wallets
        .as_deref()
        .unwrap_or_default()
        .iter()
        .find(|w| w.id.as_deref().map(str::trim) == Some(wallet_id))
}

impl ReceiverWallet {
    pub(crate) fn from_raw(
        raw: &raw::ReceiverWallet,
        warnings: &mut Vec<InconsistencyWarning>,
    ) -> Self {
        Self {
            id: util::optional_text(raw.id.as_deref()).unwrap_or_default(),
            stellar_address: util::optional_address(
                "wallets.stellar_address",
                raw.stellar_address.as_deref(),
                warnings,
            ),
            provider_name: util::optional_text(raw.wallet.as_ref().and_then(|p| p.name.as_deref())),
            status: util::optional_text(raw.status.as_deref()),
            created_at: raw.created_at.as_deref().and_then(util::parse_timestamp),
        }
    }
}

impl Receiver {
    pub(crate) fn from_raw(raw: &raw::Receiver, wallet_id: Option<&str>) -> ResultEngine<Self> {
        // Warnings are reported by validation; here they are discarded.
        let scratch = &mut Vec::new();
        let wallet = matched_wallet(raw, wallet_id).map(|w| ReceiverWallet::from_raw(w, scratch));
        let received_amounts = raw
            .received_amounts
            .as_deref()
            .unwrap_or_default()
            .iter()
            .filter_map(|entry| ReceivedAmount::from_raw(entry, scratch))
            .collect();

        Ok(Self {
            id: util::required_text("id", raw.id.as_deref())?,
            phone_number: util::optional_text(raw.phone_number.as_deref()),
            email: util::optional_text(raw.email.as_deref()),
            status: wallet.as_ref().and_then(|w| w.status.clone()),
            wallet,
            total_payments_count: util::count("total_payments", raw.total_payments, scratch),
            successful_payments_count: util::count(
                "successful_payments",
                raw.successful_payments,
                scratch,
            ),
            received_amounts,
        })
    }

    pub fn has_contact(&self) -> bool {
        self.phone_number.is_some() || self.email.is_some()
    }
}
