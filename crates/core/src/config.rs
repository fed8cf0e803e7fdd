//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and passed into the services. Core code
//! never reads process environment variables itself: binaries hand a lookup function to
//! [`CoreConfig::from_lookup`], which keeps request handling and tests independent of the
//! ambient environment.

use crate::catalog::CatalogSet;
use crate::constants::{
    DEFAULT_CASE_LOG_PATH, ENV_CASE_LOG, ENV_CATALOG_DIR, ENV_DEFAULT_LANG, ENV_MATCH_MODE,
    ENV_PACS_HOST,
};
use crate::language::Language;
use crate::matcher::MatchMode;
use crate::validation::validate_host_safe_for_commands;
use crate::{HelperError, HelperResult};
use std::path::{Path, PathBuf};

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    catalog_dir: Option<PathBuf>,
    case_log_path: PathBuf,
    match_mode: MatchMode,
    default_language: Language,
    pacs_host: Option<String>,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    pub fn new(
        catalog_dir: Option<PathBuf>,
        case_log_path: PathBuf,
        match_mode: MatchMode,
        default_language: Language,
        pacs_host: Option<String>,
    ) -> HelperResult<Self> {
        if case_log_path.as_os_str().is_empty() {
            return Err(HelperError::Configuration(
                "case log path cannot be empty".into(),
            ));
        }

        if let Some(host) = &pacs_host {
            validate_host_safe_for_commands(host)
                .map_err(|err| HelperError::Configuration(format!("{ENV_PACS_HOST}: {err}")))?;
        }

        Ok(Self {
            catalog_dir,
            case_log_path,
            match_mode,
            default_language,
            pacs_host,
        })
    }

    /// Build configuration from `PACS_HELPER_*` variables supplied by `lookup`.
    ///
    /// Blank values are treated as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> HelperResult<Self> {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let match_mode = get(ENV_MATCH_MODE)
            .map(|v| v.parse::<MatchMode>())
            .transpose()?
            .unwrap_or_default();

        let default_language = get(ENV_DEFAULT_LANG)
            .map(|v| {
                v.parse::<Language>().map_err(|_| {
                    HelperError::Configuration(format!("{ENV_DEFAULT_LANG}: unsupported language '{v}'"))
                })
            })
            .transpose()?
            .unwrap_or_default();

        Self::new(
            get(ENV_CATALOG_DIR).map(PathBuf::from),
            get(ENV_CASE_LOG)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_CASE_LOG_PATH)),
            match_mode,
            default_language,
            get(ENV_PACS_HOST),
        )
    }

    pub fn catalog_dir(&self) -> Option<&Path> {
        self.catalog_dir.as_deref()
    }

    pub fn case_log_path(&self) -> &Path {
        &self.case_log_path
    }

    pub fn match_mode(&self) -> MatchMode {
        self.match_mode
    }

    pub fn default_language(&self) -> Language {
        self.default_language
    }

    pub fn pacs_host(&self) -> Option<&str> {
        self.pacs_host.as_deref()
    }

    /// Load the configured catalogs: the override directory if set, otherwise the builtins.
    pub fn load_catalogs(&self) -> HelperResult<CatalogSet> {
        match &self.catalog_dir {
            Some(dir) => CatalogSet::load_dir(dir),
            None => {
                tracing::info!("using builtin catalogs");
                CatalogSet::builtin()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let cfg = CoreConfig::from_lookup(lookup(&[])).expect("config");
        assert_eq!(cfg.catalog_dir(), None);
        assert_eq!(cfg.case_log_path(), Path::new(DEFAULT_CASE_LOG_PATH));
        assert_eq!(cfg.match_mode(), MatchMode::SingleBest);
        assert_eq!(cfg.default_language(), Language::En);
        assert_eq!(cfg.pacs_host(), None);
    }

    #[test]
    fn reads_every_variable() {
        let cfg = CoreConfig::from_lookup(lookup(&[
            (ENV_CATALOG_DIR, "/etc/pacs-helper/catalogs"),
            (ENV_CASE_LOG, "/var/log/pacs-helper/cases.log"),
            (ENV_MATCH_MODE, "all-matches"),
            (ENV_DEFAULT_LANG, "fr"),
            (ENV_PACS_HOST, "10.20.30.40"),
        ]))
        .expect("config");

        assert_eq!(cfg.catalog_dir(), Some(Path::new("/etc/pacs-helper/catalogs")));
        assert_eq!(cfg.case_log_path(), Path::new("/var/log/pacs-helper/cases.log"));
        assert_eq!(cfg.match_mode(), MatchMode::AllMatches);
        assert_eq!(cfg.default_language(), Language::Fr);
        assert_eq!(cfg.pacs_host(), Some("10.20.30.40"));
    }

    #[test]
    fn blank_values_are_unset() {
        let cfg = CoreConfig::from_lookup(lookup(&[(ENV_PACS_HOST, "  "), (ENV_CASE_LOG, "")]))
            .expect("config");
        assert_eq!(cfg.pacs_host(), None);
        assert_eq!(cfg.case_log_path(), Path::new(DEFAULT_CASE_LOG_PATH));
    }

    #[test]
    fn rejects_unknown_language() {
        let err = CoreConfig::from_lookup(lookup(&[(ENV_DEFAULT_LANG, "klingon")]))
            .expect_err("bad language");
        assert!(matches!(err, HelperError::Configuration(msg) if msg.contains(ENV_DEFAULT_LANG)));
    }

    #[test]
    fn rejects_unsafe_pacs_host() {
        let err = CoreConfig::from_lookup(lookup(&[(ENV_PACS_HOST, "pacs;reboot")]))
            .expect_err("unsafe host");
        assert!(matches!(err, HelperError::Configuration(msg) if msg.contains(ENV_PACS_HOST)));
    }

    #[test]
    fn loads_builtin_catalogs_without_override() {
        let cfg = CoreConfig::from_lookup(lookup(&[])).expect("config");
        let catalogs = cfg.load_catalogs().expect("builtin catalogs");
        assert!(catalogs.contains(Language::Ar));
    }

    #[test]
    fn missing_catalog_dir_is_a_configuration_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let missing = dir.path().join("missing");
        let cfg = CoreConfig::new(
            Some(missing),
            PathBuf::from(DEFAULT_CASE_LOG_PATH),
            MatchMode::SingleBest,
            Language::En,
            None,
        )
        .expect("config");
        let err = cfg.load_catalogs().expect_err("missing dir");
        assert!(matches!(err, HelperError::Configuration(_)));
    }
}
