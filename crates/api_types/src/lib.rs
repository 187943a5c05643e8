//! Wire shapes of the payloads returned by the disbursement API.
//!
//! Every field is optional: the upstream service is allowed to omit or null out
//! anything, and deciding what is required is the engine's job, not the
//! deserializer's. Field names follow the upstream `snake_case` JSON.
use serde::{Deserialize, Serialize};

/// A monetary value as sent upstream: usually a string (`"100.50"`), sometimes a
/// bare JSON number.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LooseDecimal {
    Text(String),
    Integer(i64),
    Float(f64),
}

impl LooseDecimal {
    /// Returns the textual form of the value, ready for exact decimal parsing.
    pub fn to_text(&self) -> String {
        match self {
            Self::Text(text) => text.trim().to_string(),
            Self::Integer(value) => value.to_string(),
            Self::Float(value) => value.to_string(),
        }
    }
}

impl From<&str> for LooseDecimal {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

pub mod common {
    use super::*;

    /// First/last name pair of the user that created or started a record.
    #[derive(Clone, Debug, Default, Serialize, Deserialize)]
    pub struct UserRef {
        pub first_name: Option<String>,
        pub last_name: Option<String>,
    }

    #[derive(Clone, Debug, Default, Serialize, Deserialize)]
    pub struct AssetRef {
        pub id: Option<String>,
        pub code: Option<String>,
        pub issuer: Option<String>,
    }

    #[derive(Clone, Debug, Default, Serialize, Deserialize)]
    pub struct WalletRef {
        pub id: Option<String>,
        pub name: Option<String>,
    }
}

pub mod disbursement {
    use super::*;
    use crate::common::{AssetRef, UserRef, WalletRef};

    #[derive(Clone, Debug, Default, Serialize, Deserialize)]
    pub struct StatusHistoryEntry {
        pub status: Option<String>,
        pub timestamp: Option<String>,
        pub user_id: Option<String>,
    }

    #[derive(Clone, Debug, Default, Serialize, Deserialize)]
    pub struct Disbursement {
        pub id: Option<String>,
        pub name: Option<String>,
        pub created_at: Option<String>,
        pub created_by: Option<UserRef>,
        pub started_by: Option<UserRef>,
        pub total_payments: Option<i64>,
        pub total_payments_sent: Option<i64>,
        pub total_payments_failed: Option<i64>,
        pub total_payments_canceled: Option<i64>,
        pub total_payments_remaining: Option<i64>,
        pub total_amount: Option<LooseDecimal>,
        pub amount_disbursed: Option<LooseDecimal>,
        pub average_amount: Option<LooseDecimal>,
        pub status: Option<String>,
        pub registration_contact_type: Option<String>,
        pub asset: Option<AssetRef>,
        pub wallet: Option<WalletRef>,
        pub verification_field: Option<String>,
        pub file_name: Option<String>,
        pub status_history: Option<Vec<StatusHistoryEntry>>,
        pub receiver_registration_message_template: Option<String>,
    }
}

pub mod payment {
    use super::*;
    use crate::common::AssetRef;

    #[derive(Clone, Debug, Default, Serialize, Deserialize)]
    pub struct DisbursementRef {
        pub id: Option<String>,
        pub name: Option<String>,
    }

    #[derive(Clone, Debug, Default, Serialize, Deserialize)]
    pub struct ReceiverRef {
        pub id: Option<String>,
    }

    #[derive(Clone, Debug, Default, Serialize, Deserialize)]
    pub struct ReceiverWalletRef {
        pub id: Option<String>,
        pub receiver: Option<ReceiverRef>,
    }

    #[derive(Clone, Debug, Default, Serialize, Deserialize)]
    pub struct StatusHistoryEntry {
        pub status: Option<String>,
        pub timestamp: Option<String>,
        pub status_message: Option<String>,
    }

    #[derive(Clone, Debug, Default, Serialize, Deserialize)]
    pub struct Payment {
        pub id: Option<String>,
        pub created_at: Option<String>,
        pub amount: Option<LooseDecimal>,
        pub asset: Option<AssetRef>,
        pub disbursement: Option<DisbursementRef>,
        pub receiver_wallet: Option<ReceiverWalletRef>,
        pub stellar_transaction_id: Option<String>,
        pub stellar_address: Option<String>,
        pub external_payment_id: Option<String>,
        pub circle_transfer_request_id: Option<String>,
        pub status: Option<String>,
        pub status_history: Option<Vec<StatusHistoryEntry>>,
    }
}

pub mod receiver {
    use super::*;

    /// Custodial provider of a receiver wallet.
    #[derive(Clone, Debug, Default, Serialize, Deserialize)]
    pub struct Provider {
        pub name: Option<String>,
    }

    #[derive(Clone, Debug, Default, Serialize, Deserialize)]
    pub struct ReceiverWallet {
        pub id: Option<String>,
        pub stellar_address: Option<String>,
        pub wallet: Option<Provider>,
        pub status: Option<String>,
        pub created_at: Option<String>,
    }

    #[derive(Clone, Debug, Default, Serialize, Deserialize)]
    pub struct ReceivedAmount {
        pub received_amount: Option<LooseDecimal>,
        pub asset_code: Option<String>,
        pub asset_issuer: Option<String>,
    }

    #[derive(Clone, Debug, Default, Serialize, Deserialize)]
    pub struct Receiver {
        pub id: Option<String>,
        pub phone_number: Option<String>,
        pub email: Option<String>,
        pub wallets: Option<Vec<ReceiverWallet>>,
        pub total_payments: Option<i64>,
        pub successful_payments: Option<i64>,
        pub received_amounts: Option<Vec<ReceivedAmount>>,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loose_decimal_accepts_strings_and_numbers() {
        let text: LooseDecimal = serde_json::from_str("\" 12.50 \"").unwrap();
        assert_eq!(text.to_text(), "12.50");
        let int: LooseDecimal = serde_json::from_str("12").unwrap();
        assert_eq!(int, LooseDecimal::Integer(12));
        let float: LooseDecimal = serde_json::from_str("0.1").unwrap();
        assert_eq!(float.to_text(), "0.1");
    }

    #[test]
    fn missing_and_null_fields_deserialize_to_none() {
        let raw: payment::Payment =
            serde_json::from_str(r#"{"id": "p-1", "status_history": null}"#).unwrap();
        assert_eq!(raw.id.as_deref(), Some("p-1"));
        assert!(raw.amount.is_none());
        assert!(raw.status_history.is_none());
    }
}
