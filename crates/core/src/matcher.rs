//! Trigger matching: free text to known issues.
//!
//! Matching is case-insensitive substring containment and nothing else. There is no
//! tokenisation, stemming or punctuation stripping: a trigger matches when it occurs anywhere
//! in the lower-cased input. Records are scanned in catalog order and, within a record,
//! triggers in list order, so the earliest matching record always wins.

use crate::case_log::CaseLogEntry;
use crate::catalog::IssueRecord;
use crate::HelperError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// How many records a match reports.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MatchMode {
    /// Stop at the first matching record.
    #[default]
    SingleBest,
    /// Report every matching record, in catalog order.
    AllMatches,
}

impl MatchMode {
    pub fn as_str(self) -> &'static str {
        match self {
            MatchMode::SingleBest => "single-best",
            MatchMode::AllMatches => "all-matches",
        }
    }
}

impl FromStr for MatchMode {
    type Err = HelperError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "single-best" | "single" => Ok(MatchMode::SingleBest),
            "all-matches" | "all" => Ok(MatchMode::AllMatches),
            other => Err(HelperError::Configuration(format!(
                "unknown match mode '{other}' (expected single-best or all-matches)"
            ))),
        }
    }
}

/// Outcome of matching one input. `NoMatch` is a normal result, not an error.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MatchResult<'c> {
    NoMatch,
    /// Non-empty, in catalog order. Exactly one record in single-best mode.
    Found(Vec<&'c IssueRecord>),
}

impl<'c> MatchResult<'c> {
    pub fn found(&self) -> bool {
        matches!(self, MatchResult::Found(_))
    }

    pub fn issues(&self) -> &[&'c IssueRecord] {
        match self {
            MatchResult::NoMatch => &[],
            MatchResult::Found(issues) => issues,
        }
    }

    /// The first-catalog-order match.
    pub fn primary(&self) -> Option<&'c IssueRecord> {
        self.issues().first().copied()
    }

    /// Log line for this interaction.
    pub fn to_case_log_entry(&self, raw_input: &str, timestamp: DateTime<Utc>) -> CaseLogEntry {
        CaseLogEntry {
            timestamp,
            raw_input: raw_input.to_string(),
            matched_issue_id: self.primary().map(|issue| issue.id.as_str().to_string()),
        }
    }
}

/// Stateless trigger matcher.
pub struct TriggerMatcher;

impl TriggerMatcher {
    /// Match `input` against `issues` in order.
    ///
    /// Pure function of its arguments: the same input, issues and mode always give the same
    /// result. Empty input never matches because catalogs cannot contain empty triggers.
    pub fn match_input<'c>(
        input: &str,
        issues: &'c [IssueRecord],
        mode: MatchMode,
    ) -> MatchResult<'c> {
        if input.is_empty() {
            return MatchResult::NoMatch;
        }

        let haystack = input.to_lowercase();
        let mut matched = Vec::new();

        for issue in issues {
            let hit = issue
                .triggers
                .iter()
                .any(|trigger| trigger.is_contained_in(&haystack));
            if !hit {
                continue;
            }
            matched.push(issue);
            if mode == MatchMode::SingleBest {
                break;
            }
        }

        if matched.is_empty() {
            MatchResult::NoMatch
        } else {
            MatchResult::Found(matched)
        }
    }
}
