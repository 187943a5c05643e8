use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{EngineError, ResultEngine, WalletAddress};

pub const MAX_ASSET_CODE_LEN: usize = 12;
const RESERVED_CODES: [&str; 2] = ["XLM", "NATIVE"];

/// A validated asset code for issued assets.
///
/// Codes are at most 12 characters of `A-Z`, `0-9`, `-` and `_`; the native
/// asset names (`XLM`, `NATIVE`) are reserved.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AssetCode(String);

impl AssetCode {
    pub fn parse(value: &str) -> ResultEngine<Self> {
        let code = value.trim();
        if code.is_empty() {
            return Err(EngineError::missing("asset.code"));
        }
        if code.len() > MAX_ASSET_CODE_LEN {
            return Err(EngineError::invalid(
                "asset.code",
                format!("asset code must be at most {MAX_ASSET_CODE_LEN} characters"),
            ));
        }
        if !code
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '-' || c == '_')
        {
            return Err(EngineError::invalid(
                "asset.code",
                "asset code may only contain A-Z, 0-9, '-' and '_'",
            ));
        }
        if RESERVED_CODES.contains(&code) {
            return Err(EngineError::invalid(
                "asset.code",
                format!("asset code {code} is reserved"),
            ));
        }
        Ok(Self(code.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for AssetCode {
    type Error = EngineError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<AssetCode> for String {
    fn from(value: AssetCode) -> Self {
        value.0
    }
}

impl fmt::Display for AssetCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An issued asset.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
    pub id: String,
    pub code: AssetCode,
    pub issuer: Option<WalletAddress>,
}

impl Asset {
    pub fn new(id: &str, code: &str, issuer: Option<&str>) -> ResultEngine<Self> {
        let id = id.trim();
        if id.is_empty() {
            return Err(EngineError::missing("asset.id"));
        }
        let issuer = issuer
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| WalletAddress::parse_field("asset.issuer", s))
            .transpose()?;
        Ok(Self {
            id: id.to_string(),
            code: AssetCode::parse(code)?,
            issuer,
        })
    }
}

/// The asset reference carried by a disbursement (id and code only).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetSummary {
    pub id: String,
    pub code: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_issued_codes() {
        assert_eq!(AssetCode::parse("USDC").unwrap().as_str(), "USDC");
        assert!(AssetCode::parse("EURC_2-X").is_ok());
        assert!(AssetCode::parse("ABCDEFGHIJKL").is_ok());
    }

    #[test]
    fn rejects_reserved_long_and_lowercase_codes() {
        assert!(AssetCode::parse("XLM").is_err());
        assert!(AssetCode::parse("NATIVE").is_err());
        assert!(AssetCode::parse("ABCDEFGHIJKLM").is_err());
        assert!(AssetCode::parse("usdc").is_err());
        assert_eq!(
            AssetCode::parse(""),
            Err(EngineError::missing("asset.code"))
        );
    }

    #[test]
    fn asset_validates_issuer() {
        let issuer = format!("G{}", "B".repeat(55));
        let asset = Asset::new("a-1", "USDC", Some(&issuer)).unwrap();
        assert_eq!(asset.issuer.unwrap().as_str(), issuer);
        assert!(Asset::new("a-1", "USDC", Some("GBAD")).is_err());
        assert!(Asset::new("a-1", "USDC", Some(" ")).unwrap().issuer.is_none());
    }
}
