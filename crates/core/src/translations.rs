//! UI string lookup with English fallback.
//!
//! Translation is purely catalog data: each language's catalog carries a `ui` map and lookups
//! fall back to English, then to the key itself. No logic branches on language.

use crate::catalog::CatalogSet;
use crate::language::Language;
use std::collections::BTreeMap;

/// UI string keys looked up by the binaries. Front ends fetch the rest through
/// [`CatalogSet::ui_strings`].
pub mod keys {
    pub const STEP_HELP: &str = "step_help";
    pub const NETWORK_CHECK: &str = "network_check";
    pub const NETWORK_HINT: &str = "network_hint";
    pub const START_OVER: &str = "start_over";
    pub const DIAGNOSIS_COMPLETE: &str = "diagnosis_complete";
    pub const SHOW_QUICKFIX: &str = "show_quickfix";
    pub const NO_MATCH: &str = "no_match";
    pub const PICK_OPTION: &str = "pick_option";
}

/// The `ui` section of one catalog.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UiStrings(BTreeMap<String, String>);

impl UiStrings {
    pub fn new(strings: BTreeMap<String, String>) -> Self {
        Self(strings)
    }

    /// Value for `key`, ignoring blank entries so an untranslated placeholder falls through.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .get(key)
            .map(String::as_str)
            .filter(|value| !value.trim().is_empty())
    }

    /// Non-blank entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0
            .iter()
            .filter(|(_, value)| !value.trim().is_empty())
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl CatalogSet {
    /// Translate `key` for `language`.
    ///
    /// Lookup order: the language's catalog, the English catalog, then `key` itself.
    pub fn t<'a>(&'a self, language: Language, key: &'a str) -> &'a str {
        self.get(language)
            .ui()
            .get(key)
            .or_else(|| self.english().ui().get(key))
            .unwrap_or(key)
    }

    /// Every UI string for `language`, English filling the keys it leaves out or blank.
    pub fn ui_strings(&self, language: Language) -> BTreeMap<String, String> {
        let mut strings: BTreeMap<String, String> = self
            .english()
            .ui()
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        for (key, value) in self.get(language).ui().iter() {
            strings.insert(key.to_string(), value.to_string());
        }
        strings
    }
}
