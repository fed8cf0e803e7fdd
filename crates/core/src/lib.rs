//! # PACS Helper Core
//!
//! Core troubleshooting logic for the PACS helper assistant.
//!
//! This crate contains:
//! - Catalog loading and validation (issues, questionnaire, UI strings per language)
//! - The trigger matcher (free text to known issues)
//! - The guided diagnosis state machine
//! - The append-only case log
//! - Static help panels (universal fix, clear cache, network check commands)
//!
//! **No API concerns**: HTTP servers, request DTOs and CLI parsing belong in `api-rest`,
//! `api-shared` and `pacs-cli`.

pub mod case_log;
pub mod catalog;
pub mod config;
pub mod constants;
pub mod diagnosis;
pub mod error;
pub mod language;
pub mod matcher;
pub mod panels;
pub mod translations;
pub mod validation;

pub use case_log::{CaseLogEntry, CaseLogSink, FileCaseLog, MemoryCaseLog};
pub use catalog::{Catalog, CatalogSet, HelpPanel, IssueRecord, Panels, Severity};
pub use config::CoreConfig;
pub use constants::*;
pub use diagnosis::{
    DefaultRecommendation, DiagnosisQuestion, DiagnosisSession, DiagnosisState, GuidedDiagnosis,
    Questionnaire, Recommendation, ResolutionRule,
};
pub use error::{HelperError, HelperResult, TransitionError};
pub use language::Language;
pub use matcher::{MatchMode, MatchResult, TriggerMatcher};
pub use panels::{network_check_commands, PanelKind};
pub use translations::{keys, UiStrings};
