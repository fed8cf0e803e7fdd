//! Supported catalog languages.

use crate::HelperError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Languages a catalog can be written in.
///
/// English is the fallback for every lookup, so an English catalog is always required.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Fr,
    Ar,
}

impl Language {
    pub const ALL: [Language; 3] = [Language::En, Language::Fr, Language::Ar];

    /// Two-letter code, also used as the catalog file stem (`en.yaml`).
    pub fn code(self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Fr => "fr",
            Language::Ar => "ar",
        }
    }

    pub fn native_name(self) -> &'static str {
        match self {
            Language::En => "English",
            Language::Fr => "Français",
            Language::Ar => "عربي",
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = HelperError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" => Ok(Language::En),
            "fr" => Ok(Language::Fr),
            "ar" => Ok(Language::Ar),
            other => Err(HelperError::UnsupportedLanguage(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_codes_case_insensitively() {
        assert_eq!(" FR ".parse::<Language>().expect("fr"), Language::Fr);
        assert_eq!("ar".parse::<Language>().expect("ar"), Language::Ar);
    }

    #[test]
    fn rejects_unknown_code() {
        let err = "de".parse::<Language>().expect_err("unsupported");
        assert!(matches!(err, HelperError::UnsupportedLanguage(code) if code == "de"));
    }

    #[test]
    fn codes_round_trip() {
        for lang in Language::ALL {
            assert_eq!(lang.code().parse::<Language>().expect("known code"), lang);
        }
    }
}
