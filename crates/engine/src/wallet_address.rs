//! Stellar account addresses (strkey `G...` public keys).
use std::{fmt, str::FromStr, sync::LazyLock};

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::{EngineError, ResultEngine};

pub const ADDRESS_LEN: usize = 56;

static ADDRESS_RE: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::unwrap_used)]
    Regex::new(r"^G[A-Z2-7]{55}$").unwrap()
});

/// A validated 56-character account address.
///
/// ```rust
/// use engine::WalletAddress;
///
/// let raw = format!("G{}", "A".repeat(55));
/// assert!(raw.parse::<WalletAddress>().is_ok());
/// assert!(format!("G{}0", "A".repeat(54)).parse::<WalletAddress>().is_err());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct WalletAddress(String);

impl WalletAddress {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parses `value` as the content of `field`, for normalization errors.
    pub(crate) fn parse_field(field: &str, value: &str) -> ResultEngine<Self> {
        validate(value)
            .map(|()| Self(value.to_string()))
            .map_err(|reason| EngineError::invalid(field, reason))
    }
}

/// Returns `true` when `value` is a well-formed account address.
pub fn is_valid_address(value: &str) -> bool {
    validate(value).is_ok()
}

fn validate(value: &str) -> Result<(), String> {
    let len = value.chars().count();
    if len != ADDRESS_LEN {
        return Err(format!(
            "address must be {ADDRESS_LEN} characters long, got {len}"
        ));
    }
    if !value.starts_with('G') {
        return Err("address must start with 'G'".to_string());
    }
    if let Some(bad) = value.chars().find(|c| matches!(c, '0' | '1' | '8' | '9' | 'O' | 'I')) {
        return Err(format!("address contains character '{bad}' which is never used"));
    }
    if !ADDRESS_RE.is_match(value) {
        return Err("address may only contain uppercase letters A-Z and digits 2-7".to_string());
    }
    Ok(())
}

impl FromStr for WalletAddress {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_field("address", s)
    }
}

impl TryFrom<String> for WalletAddress {
    type Error = EngineError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<WalletAddress> for String {
    fn from(value: WalletAddress) -> Self {
        value.0
    }
}

impl fmt::Display for WalletAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> String {
        format!("G{}", "A".repeat(55))
    }

    #[test]
    fn accepts_well_formed_address() {
        assert!(is_valid_address(&valid()));
        let mixed = format!("G{}", "ABCDEFGHJKLMNPQRSTUVWXYZ234567".repeat(2).get(..55).unwrap());
        assert!(is_valid_address(&mixed));
    }

    #[test]
    fn rejects_characters_outside_the_alphabet() {
        for bad in ['0', '1', '8', '9', 'O', 'I'] {
            let mut candidate = valid();
            candidate.replace_range(30..31, &bad.to_string());
            assert_eq!(candidate.len(), ADDRESS_LEN);
            assert!(!is_valid_address(&candidate), "{bad} accepted");
        }
    }

    #[test]
    fn rejects_wrong_length_prefix_and_case() {
        assert!(!is_valid_address(&format!("G{}", "A".repeat(54))));
        assert!(!is_valid_address(&format!("G{}", "A".repeat(56))));
        assert!(!is_valid_address(&format!("S{}", "A".repeat(55))));
        assert!(!is_valid_address(&format!("G{}a", "A".repeat(54))));
    }

    #[test]
    fn error_names_the_field() {
        let err = WalletAddress::parse_field("stellar_address", "GABC").unwrap_err();
        assert_eq!(err.field(), Some("stellar_address"));
        assert!(err.reason().contains("56"));
    }
}
