//! Troubleshooting catalogs: issue records, the guided questionnaire and UI text for one language.
//!
//! Catalogs are hand-edited YAML files (one per language) that share a single schema. They are
//! parsed into a strict wire model, translated into domain types and validated once at startup.
//! A catalog that violates any invariant is a [`HelperError::Configuration`] and must stop the
//! process from serving.
//!
//! Invariants enforced by [`Catalog::new`]:
//! - at least one issue; issue ids are unique
//! - every issue has at least one trigger and one solution step
//! - no trigger is shared by two issues (or repeated within one)
//! - at least one question; every question offers two or more distinct options
//! - every resolution rule points at an existing step and an existing issue

use crate::diagnosis::{DefaultRecommendation, DiagnosisQuestion, Questionnaire, ResolutionRule};
use crate::language::Language;
use crate::matcher::{MatchMode, MatchResult, TriggerMatcher};
use crate::translations::UiStrings;
use crate::{HelperError, HelperResult};
use pacs_types::{Keyword, NonEmptyText};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;

const BUILTIN_CATALOGS: [(Language, &str); 3] = [
    (Language::En, include_str!("../catalogs/en.yaml")),
    (Language::Fr, include_str!("../catalogs/fr.yaml")),
    (Language::Ar, include_str!("../catalogs/ar.yaml")),
];

// ============================================================================
// Public domain-level types
// ============================================================================

/// Ordinal urgency of an issue. Declaration order is the ordering.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }
}

/// One recognised class of user-reported problem.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IssueRecord {
    /// Stable identifier, unique within a catalog and shared across languages.
    pub id: NonEmptyText,
    /// Lower-cased keywords, tested in list order.
    pub triggers: Vec<Keyword>,
    pub display_name: NonEmptyText,
    pub severity: Severity,
    /// Steps are meant to be followed in order.
    pub solution_steps: Vec<NonEmptyText>,
    /// Free-form display string, never parsed.
    pub estimated_time: String,
}

/// A static help panel such as the universal fix or the clear-cache how-to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HelpPanel {
    pub title: NonEmptyText,
    pub steps: Vec<NonEmptyText>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Panels {
    pub universal_fix: HelpPanel,
    pub clear_cache: HelpPanel,
}

/// A validated catalog for one language.
#[derive(Clone, Debug)]
pub struct Catalog {
    language: Language,
    issues: Vec<IssueRecord>,
    questionnaire: Questionnaire,
    panels: Panels,
    ui: UiStrings,
}

impl Catalog {
    /// Build a catalog from domain parts, enforcing every catalog invariant.
    ///
    /// # Errors
    ///
    /// Returns [`HelperError::Configuration`] describing the first violated invariant.
    pub fn new(
        language: Language,
        issues: Vec<IssueRecord>,
        questionnaire: Questionnaire,
        panels: Panels,
        ui: UiStrings,
    ) -> HelperResult<Self> {
        validate_issues(language, &issues)?;
        validate_questionnaire(language, &questionnaire, &issues)?;

        Ok(Self {
            language,
            issues,
            questionnaire,
            panels,
            ui,
        })
    }

    /// Parse and validate a catalog from YAML text.
    ///
    /// Schema mismatches are reported with the path of the failing field
    /// (for example `issues[2].severity`).
    pub fn parse(yaml_text: &str) -> HelperResult<Self> {
        let deserializer = serde_yaml::Deserializer::from_str(yaml_text);

        let wire = match serde_path_to_error::deserialize::<_, CatalogWire>(deserializer) {
            Ok(parsed) => parsed,
            Err(err) => {
                let path = err.path().to_string();
                let source = err.into_inner();
                let path = if path.is_empty() || path == "." {
                    "<root>"
                } else {
                    path.as_str()
                };
                return Err(HelperError::Configuration(format!(
                    "catalog schema mismatch at {path}: {source}"
                )));
            }
        };

        wire_to_domain(wire)
    }

    /// Read and parse a catalog file.
    pub fn load(path: &Path) -> HelperResult<Self> {
        let text = std::fs::read_to_string(path).map_err(HelperError::CatalogRead)?;
        Self::parse(&text).map_err(|err| match err {
            HelperError::Configuration(msg) => {
                HelperError::Configuration(format!("{}: {msg}", path.display()))
            }
            other => other,
        })
    }

    pub fn language(&self) -> Language {
        self.language
    }

    /// Issues in catalog order. Order is the tie-break for trigger matching.
    pub fn issues(&self) -> &[IssueRecord] {
        &self.issues
    }

    pub fn issue(&self, id: &str) -> Option<&IssueRecord> {
        self.issues.iter().find(|issue| issue.id.as_str() == id)
    }

    pub fn questionnaire(&self) -> &Questionnaire {
        &self.questionnaire
    }

    pub fn panels(&self) -> &Panels {
        &self.panels
    }

    pub fn ui(&self) -> &UiStrings {
        &self.ui
    }

    /// Match free text against this catalog's triggers.
    pub fn match_input(&self, input: &str, mode: MatchMode) -> MatchResult<'_> {
        TriggerMatcher::match_input(input, &self.issues, mode)
    }
}

/// Every loaded catalog, keyed by language, with English as the mandatory fallback.
#[derive(Clone, Debug)]
pub struct CatalogSet {
    english: Catalog,
    others: BTreeMap<Language, Catalog>,
}

impl CatalogSet {
    /// Group catalogs by language.
    ///
    /// # Errors
    ///
    /// Returns [`HelperError::Configuration`] if no English catalog is supplied or a language
    /// appears twice.
    pub fn new(catalogs: impl IntoIterator<Item = Catalog>) -> HelperResult<Self> {
        let mut english = None;
        let mut others = BTreeMap::new();

        for catalog in catalogs {
            let language = catalog.language();
            let duplicate = if language == Language::En {
                english.replace(catalog).is_some()
            } else {
                others.insert(language, catalog).is_some()
            };
            if duplicate {
                return Err(HelperError::Configuration(format!(
                    "more than one catalog for language '{language}'"
                )));
            }
        }

        let english = english.ok_or_else(|| {
            HelperError::Configuration("an English (en) catalog is required".into())
        })?;

        Ok(Self { english, others })
    }

    /// Catalogs compiled into the binary.
    pub fn builtin() -> HelperResult<Self> {
        let mut catalogs = Vec::with_capacity(BUILTIN_CATALOGS.len());
        for (language, text) in BUILTIN_CATALOGS {
            let catalog = Catalog::parse(text).map_err(|err| {
                HelperError::Configuration(format!("builtin {language} catalog: {err}"))
            })?;
            ensure_language(&catalog, language, "builtin catalog")?;
            catalogs.push(catalog);
        }
        Self::new(catalogs)
    }

    /// Load `<code>.yaml` for every supported language found in `dir`.
    ///
    /// Missing non-English files are skipped; lookups for those languages fall back to English.
    pub fn load_dir(dir: &Path) -> HelperResult<Self> {
        if !dir.is_dir() {
            return Err(HelperError::Configuration(format!(
                "catalog directory does not exist: {}",
                dir.display()
            )));
        }

        let mut catalogs = Vec::new();
        for language in Language::ALL {
            let path = dir.join(format!("{}.yaml", language.code()));
            if !path.is_file() {
                tracing::debug!("no {} catalog at {}", language, path.display());
                continue;
            }
            let catalog = Catalog::load(&path)?;
            ensure_language(&catalog, language, &path.display().to_string())?;
            tracing::info!(
                "loaded {} catalog from {} ({} issues, {} questions)",
                language,
                path.display(),
                catalog.issues().len(),
                catalog.questionnaire().questions.len()
            );
            catalogs.push(catalog);
        }

        Self::new(catalogs)
    }

    /// Catalog for `language`, or the English catalog when that language is not loaded.
    pub fn get(&self, language: Language) -> &Catalog {
        if language == Language::En {
            return &self.english;
        }
        self.others.get(&language).unwrap_or(&self.english)
    }

    pub fn english(&self) -> &Catalog {
        &self.english
    }

    pub fn contains(&self, language: Language) -> bool {
        language == Language::En || self.others.contains_key(&language)
    }

    /// Loaded languages, English first.
    pub fn languages(&self) -> Vec<Language> {
        std::iter::once(Language::En)
            .chain(self.others.keys().copied())
            .collect()
    }
}

fn ensure_language(catalog: &Catalog, expected: Language, source: &str) -> HelperResult<()> {
    if catalog.language() != expected {
        return Err(HelperError::Configuration(format!(
            "{source}: declares language '{}' but was loaded as '{expected}'",
            catalog.language()
        )));
    }
    Ok(())
}

// ============================================================================
// Validation
// ============================================================================

fn validate_issues(language: Language, issues: &[IssueRecord]) -> HelperResult<()> {
    if issues.is_empty() {
        return Err(HelperError::Configuration(format!(
            "{language} catalog has no issues"
        )));
    }

    let mut ids = HashSet::new();
    let mut trigger_owner: HashMap<&str, &str> = HashMap::new();

    for issue in issues {
        let id = issue.id.as_str();
        if !ids.insert(id) {
            return Err(HelperError::Configuration(format!(
                "duplicate issue id '{id}'"
            )));
        }
        if issue.triggers.is_empty() {
            return Err(HelperError::Configuration(format!(
                "issue '{id}' has no triggers"
            )));
        }
        if issue.solution_steps.is_empty() {
            return Err(HelperError::Configuration(format!(
                "issue '{id}' has no solution steps"
            )));
        }
        for trigger in &issue.triggers {
            if let Some(owner) = trigger_owner.insert(trigger.as_str(), id) {
                return Err(HelperError::Configuration(format!(
                    "trigger '{trigger}' is used by both '{owner}' and '{id}'"
                )));
            }
        }
    }

    Ok(())
}

fn validate_questionnaire(
    language: Language,
    questionnaire: &Questionnaire,
    issues: &[IssueRecord],
) -> HelperResult<()> {
    let questions = &questionnaire.questions;
    if questions.is_empty() {
        return Err(HelperError::Configuration(format!(
            "{language} questionnaire has no questions"
        )));
    }

    for (step, question) in questions.iter().enumerate() {
        if question.options.len() < 2 {
            return Err(HelperError::Configuration(format!(
                "question {step} ({}) needs at least 2 options",
                question.prompt
            )));
        }
        let mut seen = HashSet::new();
        for option in &question.options {
            if !seen.insert(option.as_str()) {
                return Err(HelperError::Configuration(format!(
                    "question {step} repeats option '{option}'"
                )));
            }
        }
    }

    for (index, rule) in questionnaire.rules.iter().enumerate() {
        let Some(question) = questions.get(rule.step) else {
            return Err(HelperError::Configuration(format!(
                "rule {index} refers to step {} but there are only {} questions",
                rule.step,
                questions.len()
            )));
        };
        if !issues.iter().any(|issue| issue.id == rule.issue_id) {
            return Err(HelperError::Configuration(format!(
                "rule {index} recommends unknown issue '{}'",
                rule.issue_id
            )));
        }
        let reachable = question
            .options
            .iter()
            .any(|option| rule.keyword.is_contained_in(&option.as_str().to_lowercase()));
        if !reachable {
            tracing::warn!(
                "{} rule {} keyword '{}' matches no option of step {}",
                language,
                index,
                rule.keyword,
                rule.step
            );
        }
    }

    Ok(())
}

// ============================================================================
// Wire types (internal)
// ============================================================================

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
struct CatalogWire {
    language: Language,
    #[serde(default)]
    ui: BTreeMap<String, String>,
    panels: PanelsWire,
    issues: Vec<IssueWire>,
    diagnosis: DiagnosisWire,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
struct PanelsWire {
    universal_fix: PanelWire,
    clear_cache: PanelWire,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
struct PanelWire {
    title: String,
    #[serde(default)]
    steps: Vec<String>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
struct IssueWire {
    id: String,
    display_name: String,
    severity: Severity,
    #[serde(default)]
    estimated_time: String,
    triggers: Vec<String>,
    solution_steps: Vec<String>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
struct DiagnosisWire {
    questions: Vec<QuestionWire>,
    #[serde(default)]
    rules: Vec<RuleWire>,
    default: PanelWire,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
struct QuestionWire {
    prompt: String,
    options: Vec<String>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
struct RuleWire {
    step: usize,
    keyword: String,
    issue: String,
}

// ============================================================================
// Helper functions (internal)
// ============================================================================

fn text(value: &str, what: impl FnOnce() -> String) -> HelperResult<NonEmptyText> {
    NonEmptyText::new(value)
        .map_err(|_| HelperError::Configuration(format!("{} cannot be empty", what())))
}

fn texts(values: &[String], what: impl Fn(usize) -> String) -> HelperResult<Vec<NonEmptyText>> {
    values
        .iter()
        .enumerate()
        .map(|(i, value)| text(value, || what(i)))
        .collect()
}

fn keyword(value: &str, what: impl FnOnce() -> String) -> HelperResult<Keyword> {
    Keyword::new(value)
        .map_err(|_| HelperError::Configuration(format!("{} cannot be empty", what())))
}

fn panel_to_domain(wire: PanelWire, name: &str) -> HelperResult<HelpPanel> {
    Ok(HelpPanel {
        title: text(&wire.title, || format!("{name}.title"))?,
        steps: texts(&wire.steps, |i| format!("{name}.steps[{i}]"))?,
    })
}

fn issue_to_domain(index: usize, wire: IssueWire) -> HelperResult<IssueRecord> {
    let id = text(&wire.id, || format!("issues[{index}].id"))?;
    let triggers = wire
        .triggers
        .iter()
        .enumerate()
        .map(|(i, t)| keyword(t, || format!("issues[{index}] ({id}) triggers[{i}]")))
        .collect::<HelperResult<Vec<_>>>()?;

    Ok(IssueRecord {
        display_name: text(&wire.display_name, || format!("issues[{index}] ({id}) display_name"))?,
        solution_steps: texts(&wire.solution_steps, |i| {
            format!("issues[{index}] ({id}) solution_steps[{i}]")
        })?,
        triggers,
        severity: wire.severity,
        estimated_time: wire.estimated_time.trim().to_string(),
        id,
    })
}

fn wire_to_domain(wire: CatalogWire) -> HelperResult<Catalog> {
    let issues = wire
        .issues
        .into_iter()
        .enumerate()
        .map(|(i, issue)| issue_to_domain(i, issue))
        .collect::<HelperResult<Vec<_>>>()?;

    let questions = wire
        .diagnosis
        .questions
        .into_iter()
        .enumerate()
        .map(|(step, q)| -> HelperResult<DiagnosisQuestion> {
            Ok(DiagnosisQuestion {
                prompt: text(&q.prompt, || format!("diagnosis.questions[{step}].prompt"))?,
                options: texts(&q.options, |i| {
                    format!("diagnosis.questions[{step}].options[{i}]")
                })?,
            })
        })
        .collect::<HelperResult<Vec<_>>>()?;

    let rules = wire
        .diagnosis
        .rules
        .into_iter()
        .enumerate()
        .map(|(index, rule)| -> HelperResult<ResolutionRule> {
            Ok(ResolutionRule {
                step: rule.step,
                keyword: keyword(&rule.keyword, || format!("diagnosis.rules[{index}].keyword"))?,
                issue_id: text(&rule.issue, || format!("diagnosis.rules[{index}].issue"))?,
            })
        })
        .collect::<HelperResult<Vec<_>>>()?;

    let default = panel_to_domain(wire.diagnosis.default, "diagnosis.default")?;

    let questionnaire = Questionnaire {
        questions,
        rules,
        default: DefaultRecommendation {
            title: default.title,
            steps: default.steps,
        },
    };

    let panels = Panels {
        universal_fix: panel_to_domain(wire.panels.universal_fix, "panels.universal_fix")?,
        clear_cache: panel_to_domain(wire.panels.clear_cache, "panels.clear_cache")?,
    };

    Catalog::new(
        wire.language,
        issues,
        questionnaire,
        panels,
        UiStrings::new(wire.ui),
    )
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Two-question catalog used across the core test modules.
    pub(crate) const SMALL_CATALOG: &str = r#"language: en
ui:
  no_match: "I didn't catch that"
panels:
  universal_fix:
    title: Universal fix
    steps: ["Restart"]
  clear_cache:
    title: Clear cache
    steps: ["Ctrl+Shift+Delete"]
issues:
  - id: outage
    display_name: PACS down for everyone
    severity: critical
    triggers: ["everyone", "outage"]
    solution_steps: ["Use the backup viewer"]
  - id: login
    display_name: Login problem
    severity: medium
    estimated_time: 5 minutes
    triggers: ["login", "password"]
    solution_steps: ["Reset your password"]
  - id: images
    display_name: Images not loading
    severity: medium
    triggers: ["image", "slow"]
    solution_steps: ["Press F5"]
diagnosis:
  questions:
    - prompt: main problem?
      options: ["Can't login", "Images slow"]
    - prompt: others affected?
      options: ["Yes, everyone", "No"]
  rules:
    - { step: 1, keyword: everyone, issue: outage }
    - { step: 0, keyword: login, issue: login }
    - { step: 0, keyword: image, issue: images }
  default:
    title: Try the universal fix
    steps: ["Restart"]
"#;

    pub(crate) fn small_catalog() -> Catalog {
        Catalog::parse(SMALL_CATALOG).expect("small catalog parses")
    }

    fn expect_config_error(yaml: &str, needle: &str) {
        let err = Catalog::parse(yaml).expect_err("catalog should be rejected");
        match err {
            HelperError::Configuration(msg) => {
                assert!(msg.contains(needle), "message {msg:?} should contain {needle:?}")
            }
            other => panic!("expected Configuration error, got {other:?}"),
        }
    }

    #[test]
    fn parses_small_catalog() {
        let catalog = small_catalog();
        assert_eq!(catalog.language(), Language::En);
        assert_eq!(catalog.issues().len(), 3);
        assert_eq!(catalog.questionnaire().questions.len(), 2);
        let login = catalog.issue("login").expect("login issue");
        assert_eq!(login.display_name.as_str(), "Login problem");
        assert_eq!(login.estimated_time, "5 minutes");
        assert_eq!(login.severity, Severity::Medium);
    }

    #[test]
    fn triggers_are_lower_cased_on_load() {
        let yaml = SMALL_CATALOG.replace(r#"["login", "password"]"#, r#"["LOGIN", "PassWord"]"#);
        let catalog = Catalog::parse(&yaml).expect("parses");
        let login = catalog.issue("login").expect("login issue");
        let triggers: Vec<&str> = login.triggers.iter().map(Keyword::as_str).collect();
        assert_eq!(triggers, ["login", "password"]);
    }

    #[test]
    fn rejects_unknown_keys_with_path() {
        let yaml = SMALL_CATALOG.replace("    severity: critical\n", "    severity: critical\n    colour: red\n");
        expect_config_error(&yaml, "colour");
    }

    #[test]
    fn rejects_unknown_severity_with_path() {
        let yaml = SMALL_CATALOG.replace("severity: critical", "severity: apocalyptic");
        expect_config_error(&yaml, "issues[0].severity");
    }

    #[test]
    fn rejects_empty_triggers() {
        let yaml = SMALL_CATALOG.replace(r#"["everyone", "outage"]"#, "[]");
        expect_config_error(&yaml, "has no triggers");
    }

    #[test]
    fn rejects_blank_trigger() {
        let yaml = SMALL_CATALOG.replace(r#"["everyone", "outage"]"#, r#"["everyone", "  "]"#);
        expect_config_error(&yaml, "triggers[1] cannot be empty");
    }

    #[test]
    fn rejects_shared_trigger() {
        let yaml = SMALL_CATALOG.replace(r#"["image", "slow"]"#, r#"["image", "password"]"#);
        expect_config_error(&yaml, "trigger 'password' is used by both 'login' and 'images'");
    }

    #[test]
    fn rejects_question_with_single_option() {
        let yaml = SMALL_CATALOG.replace(r#"["Yes, everyone", "No"]"#, r#"["Yes, everyone"]"#);
        expect_config_error(&yaml, "needs at least 2 options");
    }

    #[test]
    fn rejects_duplicate_options() {
        let yaml = SMALL_CATALOG.replace(r#"["Yes, everyone", "No"]"#, r#"["No", "No"]"#);
        expect_config_error(&yaml, "repeats option 'No'");
    }

    #[test]
    fn rejects_rule_for_unknown_issue() {
        let yaml = SMALL_CATALOG.replace("issue: images }", "issue: modality }");
        expect_config_error(&yaml, "unknown issue 'modality'");
    }

    #[test]
    fn rejects_rule_for_missing_step() {
        let yaml = SMALL_CATALOG.replace("{ step: 1, keyword", "{ step: 4, keyword");
        expect_config_error(&yaml, "refers to step 4");
    }

    #[test]
    fn rejects_duplicate_issue_ids() {
        let yaml = SMALL_CATALOG.replace("- id: images", "- id: login");
        expect_config_error(&yaml, "duplicate issue id 'login'");
    }

    #[test]
    fn builtin_catalogs_load_for_every_language() {
        let set = CatalogSet::builtin().expect("builtin catalogs are valid");
        assert_eq!(set.languages(), vec![Language::En, Language::Fr, Language::Ar]);
        for language in Language::ALL {
            let catalog = set.get(language);
            assert_eq!(catalog.language(), language);
            assert_eq!(catalog.questionnaire().questions.len(), 3);
        }
    }

    #[test]
    fn builtin_catalogs_share_issue_ids() {
        let set = CatalogSet::builtin().expect("builtin catalogs are valid");
        let english: Vec<&str> = set.english().issues().iter().map(|i| i.id.as_str()).collect();
        for language in [Language::Fr, Language::Ar] {
            let ids: Vec<&str> = set.get(language).issues().iter().map(|i| i.id.as_str()).collect();
            assert_eq!(ids, english, "{language} catalog should list the same issues");
        }
    }

    #[test]
    fn catalog_set_requires_english() {
        let french = Catalog::parse(&SMALL_CATALOG.replace("language: en", "language: fr"))
            .expect("french catalog parses");
        let err = CatalogSet::new(vec![french]).expect_err("english is mandatory");
        assert!(matches!(err, HelperError::Configuration(msg) if msg.contains("English")));
    }

    #[test]
    fn catalog_set_falls_back_to_english() {
        let set = CatalogSet::new(vec![small_catalog()]).expect("english only");
        assert!(!set.contains(Language::Ar));
        assert_eq!(set.get(Language::Ar).language(), Language::En);
    }

    #[test]
    fn load_dir_reads_language_files() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("en.yaml"), SMALL_CATALOG).expect("write en");
        std::fs::write(
            dir.path().join("fr.yaml"),
            SMALL_CATALOG.replace("language: en", "language: fr"),
        )
        .expect("write fr");

        let set = CatalogSet::load_dir(dir.path()).expect("load dir");
        assert_eq!(set.languages(), vec![Language::En, Language::Fr]);
    }

    #[test]
    fn load_dir_rejects_mislabelled_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("en.yaml"), SMALL_CATALOG).expect("write en");
        std::fs::write(dir.path().join("ar.yaml"), SMALL_CATALOG).expect("write ar");

        let err = CatalogSet::load_dir(dir.path()).expect_err("language mismatch");
        assert!(matches!(err, HelperError::Configuration(msg) if msg.contains("declares language 'en'")));
    }

    #[test]
    fn load_dir_requires_existing_directory() {
        let dir = tempfile::tempdir().expect("tempdir");
        let missing = dir.path().join("nope");
        let err = CatalogSet::load_dir(&missing).expect_err("missing dir");
        assert!(matches!(err, HelperError::Configuration(msg) if msg.contains("does not exist")));
    }
}
