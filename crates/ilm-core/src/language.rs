//! # Language Codes
//!
//! Every localized record is stored once per language variant. The set of
//! variants is closed: English, Russian and Tajik.
//!
//! Records carry the raw `language_code` string they were submitted with;
//! [`LanguageCode::from_str`] is the single gate that decides whether the
//! string may reach storage.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;

/// A supported language variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LanguageCode {
    En,
    Ru,
    Tg,
}

impl LanguageCode {
    /// All supported codes, in display order.
    pub const ALL: [LanguageCode; 3] = [LanguageCode::En, LanguageCode::Ru, LanguageCode::Tg];

    /// Returns the wire/storage form (`"en"`, `"ru"`, `"tg"`).
    pub const fn as_str(&self) -> &'static str {
        match self {
            LanguageCode::En => "en",
            LanguageCode::Ru => "ru",
            LanguageCode::Tg => "tg",
        }
    }

    fn allowed() -> Vec<String> {
        Self::ALL.iter().map(|code| code.as_str().to_string()).collect()
    }
}

impl fmt::Display for LanguageCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LanguageCode {
    type Err = ValidationError;

    /// Parses an exact, lowercase language code.
    ///
    /// ```rust
    /// use ilm_core::LanguageCode;
    ///
    /// assert_eq!("tg".parse::<LanguageCode>().unwrap(), LanguageCode::Tg);
    /// assert!("EN".parse::<LanguageCode>().is_err());
    /// assert!("de".parse::<LanguageCode>().is_err());
    /// ```
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "en" => Ok(LanguageCode::En),
            "ru" => Ok(LanguageCode::Ru),
            "tg" => Ok(LanguageCode::Tg),
            other => Err(ValidationError::NotAllowed {
                field: "language_code".to_string(),
                value: other.to_string(),
                allowed: Self::allowed(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_round_trip() {
        for code in LanguageCode::ALL {
            assert_eq!(code.as_str().parse::<LanguageCode>().unwrap(), code);
        }
    }

    #[test]
    fn test_rejects_unknown_and_case_variants() {
        for bad in ["", "EN", "Ru", "de", "en ", "tj"] {
            let err = bad.parse::<LanguageCode>().unwrap_err();
            assert!(matches!(err, ValidationError::NotAllowed { .. }), "{bad:?}");
        }
    }

    #[test]
    fn test_serde_uses_lowercase() {
        let json = serde_json::to_string(&LanguageCode::Ru).unwrap();
        assert_eq!(json, "\"ru\"");
    }
}
