use std::fmt::{Display, Formatter};

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

use crate::ValidationError;

/// Tradable asset identified by its code and issuing account.
///
/// Two assets are equal only when both code and issuer match; an asset with
/// the same code from a different issuer is a different asset.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Asset {
    code: String,
    issuer: String,
}

#[derive(Deserialize)]
struct AssetParts {
    code: String,
    issuer: String,
}

impl Asset {
    /// Build an asset, trimming surrounding whitespace from both fields.
    pub fn new(code: impl AsRef<str>, issuer: impl AsRef<str>) -> Result<Self, ValidationError> {
        let code = code.as_ref().trim();
        if code.is_empty() {
            return Err(ValidationError::EmptyAssetCode);
        }

        let issuer = issuer.as_ref().trim();
        if issuer.is_empty() {
            return Err(ValidationError::EmptyAssetIssuer);
        }

        Ok(Self {
            code: code.to_owned(),
            issuer: issuer.to_owned(),
        })
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn issuer(&self) -> &str {
        &self.issuer
    }
}

impl Display for Asset {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.code, self.issuer)
    }
}

impl<'de> Deserialize<'de> for Asset {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let parts = AssetParts::deserialize(deserializer)?;
        Self::new(parts.code, parts.issuer).map_err(D::Error::custom)
    }
}
