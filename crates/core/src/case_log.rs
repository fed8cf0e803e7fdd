//! Append-only case log.
//!
//! Every chat interaction is written as one JSON object per line:
//!
//! ```text
//! {"timestamp":"2025-03-01T08:30:00Z","prompt":"images slow","detected":"images"}
//! {"timestamp":"2025-03-01T08:31:12Z","prompt":"hello","detected":null}
//! ```
//!
//! Reading is tolerant: lines that do not parse are skipped with a warning so a single
//! corrupted write never hides the rest of the history.

use crate::{HelperError, HelperResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

/// One logged interaction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseLogEntry {
    #[serde(with = "utc_timestamp")]
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "prompt")]
    pub raw_input: String,
    #[serde(rename = "detected")]
    pub matched_issue_id: Option<String>,
}

/// RFC 3339 with a `Z` suffix, independent of chrono's default serde format.
mod utc_timestamp {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::AutoSi, true))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|parsed| parsed.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}

/// Destination for case log entries.
pub trait CaseLogSink: Send + Sync {
    fn record(&self, entry: &CaseLogEntry) -> HelperResult<()>;

    /// Up to `limit` most recent entries, newest first.
    fn recent(&self, limit: usize) -> HelperResult<Vec<CaseLogEntry>>;
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// JSON-lines file sink.
#[derive(Debug)]
pub struct FileCaseLog {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileCaseLog {
    /// The file and its parent directory are created on first write.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CaseLogSink for FileCaseLog {
    fn record(&self, entry: &CaseLogEntry) -> HelperResult<()> {
        let line = serde_json::to_string(entry).map_err(HelperError::Serialization)?;

        let _guard = lock(&self.write_lock);
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(HelperError::CaseLogWrite)?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(HelperError::CaseLogWrite)?;
        writeln!(file, "{line}").map_err(HelperError::CaseLogWrite)?;

        Ok(())
    }

    fn recent(&self, limit: usize) -> HelperResult<Vec<CaseLogEntry>> {
        let contents = {
            let _guard = lock(&self.write_lock);
            match fs::read_to_string(&self.path) {
                Ok(contents) => contents,
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
                Err(err) => return Err(HelperError::CaseLogRead(err)),
            }
        };

        let entries: Vec<CaseLogEntry> = contents
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .filter_map(|(index, line)| match serde_json::from_str(line) {
                Ok(entry) => Some(entry),
                Err(err) => {
                    tracing::warn!(
                        "skipping malformed case log line {} in {}: {}",
                        index + 1,
                        self.path.display(),
                        err
                    );
                    None
                }
            })
            .collect();

        Ok(entries.into_iter().rev().take(limit).collect())
    }
}

/// In-memory sink, used when no log file should be touched.
#[derive(Debug, Default)]
pub struct MemoryCaseLog {
    entries: Mutex<Vec<CaseLogEntry>>,
}

impl MemoryCaseLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<CaseLogEntry> {
        lock(&self.entries).clone()
    }
}

impl CaseLogSink for MemoryCaseLog {
    fn record(&self, entry: &CaseLogEntry) -> HelperResult<()> {
        lock(&self.entries).push(entry.clone());
        Ok(())
    }

    fn recent(&self, limit: usize) -> HelperResult<Vec<CaseLogEntry>> {
        Ok(lock(&self.entries).iter().rev().take(limit).cloned().collect())
    }
}
