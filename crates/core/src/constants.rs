//! Constants used throughout the PACS helper core crate.

/// Default location of the append-only case log.
pub const DEFAULT_CASE_LOG_PATH: &str = "logs/cases.log";

/// Number of cases shown in the "recent cases" preview.
pub const DEFAULT_RECENT_CASES: usize = 5;

/// Placeholder substituted into network check commands when no PACS host is configured.
pub const PACS_HOST_PLACEHOLDER: &str = "YOUR_PACS_IP_HERE";

/// DICOM association port probed by the suggested telnet command.
pub const DICOM_PORT: u16 = 104;

/// HTTPS port used by the PACS web viewer.
pub const VIEWER_PORT: u16 = 443;

/// Environment variable naming a directory of `<lang>.yaml` catalogs.
pub const ENV_CATALOG_DIR: &str = "PACS_HELPER_CATALOG_DIR";

/// Environment variable for the case log path.
pub const ENV_CASE_LOG: &str = "PACS_HELPER_CASE_LOG";

/// Environment variable selecting `single-best` or `all-matches` trigger matching.
pub const ENV_MATCH_MODE: &str = "PACS_HELPER_MATCH_MODE";

/// Environment variable for the default UI language.
pub const ENV_DEFAULT_LANG: &str = "PACS_HELPER_DEFAULT_LANG";

/// Environment variable for the PACS host shown in network check commands.
pub const ENV_PACS_HOST: &str = "PACS_HELPER_PACS_IP";

/// Environment variable for the REST bind address.
pub const ENV_REST_ADDR: &str = "PACS_HELPER_REST_ADDR";

/// Default REST bind address.
pub const DEFAULT_REST_ADDR: &str = "0.0.0.0:3000";

/// Minutes a REST diagnosis session may sit idle before it is discarded.
pub const DEFAULT_SESSION_IDLE_MINUTES: i64 = 30;

/// Upper bound on diagnosis sessions held by the REST server at once.
pub const DEFAULT_MAX_SESSIONS: usize = 10_000;
