//! # API Shared
//!
//! Request and response types for the PACS helper APIs.
//!
//! Contains:
//! - JSON DTOs with OpenAPI schemas (`utoipa::ToSchema`)
//! - Conversions from `pacs-core` domain types
//! - `HealthService`
//!
//! Used by `api-rest` and the main `pacs-run` binary.

pub mod health;

pub use health::HealthService;

use pacs_core::{
    CaseLogEntry, DiagnosisQuestion, HelpPanel, IssueRecord, Language, Recommendation,
};
use chrono::SecondsFormat;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct HealthRes {
    pub ok: bool,
    pub message: String,
}


#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct LanguageDto {
    /// ISO 639-1 code (`en`, `fr`, `ar`).
    pub code: String,
    pub name: String,
}

impl From<Language> for LanguageDto {
    fn from(language: Language) -> Self {
        Self {
            code: language.code().to_string(),
            name: language.native_name().to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct LanguagesRes {
    pub default: String,
    pub languages: Vec<LanguageDto>,
}

/// Page text for one language, keyed by UI string name.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct UiStringsRes {
    pub language: String,
    pub strings: BTreeMap<String, String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct IssueDto {
    pub id: String,
    pub display_name: String,
    /// `low`, `medium`, `high` or `critical`.
    pub severity: String,
    pub estimated_time: String,
    pub triggers: Vec<String>,
    pub solution_steps: Vec<String>,
}

impl From<&IssueRecord> for IssueDto {
    fn from(issue: &IssueRecord) -> Self {
        Self {
            id: issue.id.to_string(),
            display_name: issue.display_name.to_string(),
            severity: issue.severity.as_str().to_string(),
            estimated_time: issue.estimated_time.clone(),
            triggers: issue.triggers.iter().map(|t| t.as_str().to_string()).collect(),
            solution_steps: issue.solution_steps.iter().map(ToString::to_string).collect(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ListIssuesRes {
    pub language: String,
    pub issues: Vec<IssueDto>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ChatReq {
    pub input: String,
    /// Reply language; the server default when omitted.
    #[serde(default)]
    pub lang: Option<String>,
    /// `single-best` or `all-matches`; the server default when omitted.
    #[serde(default)]
    pub mode: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ChatRes {
    pub found: bool,
    /// Assistant reply text.
    pub reply: String,
    /// Matched issues in catalog order, empty when nothing matched.
    pub issues: Vec<IssueDto>,
    /// False when the case log could not be written.
    pub logged: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CaseDto {
    pub timestamp: String,
    pub prompt: String,
    pub detected: Option<String>,
}

impl From<&CaseLogEntry> for CaseDto {
    fn from(entry: &CaseLogEntry) -> Self {
        Self {
            timestamp: entry.timestamp.to_rfc3339_opts(SecondsFormat::AutoSi, true),
            prompt: entry.raw_input.clone(),
            detected: entry.matched_issue_id.clone(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RecentCasesRes {
    pub cases: Vec<CaseDto>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PanelRes {
    pub title: String,
    pub steps: Vec<String>,
}

impl From<&HelpPanel> for PanelRes {
    fn from(panel: &HelpPanel) -> Self {
        Self {
            title: panel.title.to_string(),
            steps: panel.steps.iter().map(ToString::to_string).collect(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct NetworkCheckRes {
    pub title: String,
    pub hint: String,
    /// Newline separated commands for the user to paste into a terminal.
    pub commands: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CreateSessionReq {
    #[serde(default)]
    pub lang: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct QuestionDto {
    pub step: usize,
    pub prompt: String,
    pub options: Vec<String>,
}

impl QuestionDto {
    pub fn new(step: usize, question: &DiagnosisQuestion) -> Self {
        Self {
            step,
            prompt: question.prompt.to_string(),
            options: question.options.iter().map(ToString::to_string).collect(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SessionStateDto {
    AwaitingAnswer,
    Complete,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SessionRes {
    pub session_id: String,
    pub language: String,
    pub state: SessionStateDto,
    pub current_step: usize,
    pub total_steps: usize,
    /// 0.0 to 1.0.
    pub progress: f32,
    /// Absent once the questionnaire is complete.
    pub question: Option<QuestionDto>,
    pub answers: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SubmitAnswerReq {
    /// Exact text of one of the current question's options.
    pub choice: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationKind {
    Issue,
    Default,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ResolutionRes {
    /// Localised "diagnosis complete" banner.
    pub message: String,
    pub kind: RecommendationKind,
    pub issue_id: Option<String>,
    pub severity: Option<String>,
    pub title: String,
    pub steps: Vec<String>,
}

impl ResolutionRes {
    pub fn new(message: impl Into<String>, recommendation: &Recommendation<'_>) -> Self {
        let (kind, issue_id, severity) = match recommendation {
            Recommendation::Issue(issue) => (
                RecommendationKind::Issue,
                Some(issue.id.to_string()),
                Some(issue.severity.as_str().to_string()),
            ),
            Recommendation::Default(_) => (RecommendationKind::Default, None, None),
        };

        Self {
            message: message.into(),
            kind,
            issue_id,
            severity,
            title: recommendation.title().to_string(),
            steps: recommendation.steps().iter().map(ToString::to_string).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pacs_core::{CatalogSet, MatchMode};

    #[test]
    fn issue_dto_flattens_record() {
        let catalogs = CatalogSet::builtin().expect("builtin");
        let result = catalogs
            .english()
            .match_input("forgot my password", MatchMode::SingleBest);
        let dto = IssueDto::from(result.primary().expect("login match"));
        assert_eq!(dto.id, "login");
        assert_eq!(dto.severity, "medium");
        assert!(dto.triggers.contains(&"password".to_string()));
        assert!(!dto.solution_steps.is_empty());
    }

    #[test]
    fn chat_request_defaults_optional_fields() {
        let req: ChatReq = serde_json::from_str(r#"{"input":"images slow"}"#).expect("parse");
        assert_eq!(req.input, "images slow");
        assert_eq!(req.lang, None);
        assert_eq!(req.mode, None);
    }

    #[test]
    fn case_dto_timestamp_matches_case_log_format() {
        let timestamp = chrono::DateTime::parse_from_rfc3339("2024-03-01T08:15:30+00:00")
            .expect("timestamp")
            .with_timezone(&chrono::Utc);
        let entry = CaseLogEntry {
            timestamp,
            raw_input: "images slow".into(),
            matched_issue_id: Some("images".into()),
        };
        let dto = CaseDto::from(&entry);
        assert_eq!(dto.timestamp, "2024-03-01T08:15:30Z");

        let logged = serde_json::to_value(&entry).expect("json");
        assert_eq!(logged["timestamp"], dto.timestamp.as_str());
    }

    #[test]
    fn session_state_serialises_snake_case() {
        let json = serde_json::to_string(&SessionStateDto::AwaitingAnswer).expect("json");
        assert_eq!(json, r#""awaiting_answer""#);
    }
}
