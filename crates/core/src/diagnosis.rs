//! Guided diagnosis: a fixed multiple-choice questionnaire resolved by an ordered rule list.
//!
//! ```text
//! AwaitingAnswer(0) --submit--> AwaitingAnswer(1) --submit--> ... --submit--> Complete
//!        ^                                                                       |
//!        +------------------------------- reset ---------------------------------+
//! ```
//!
//! Sessions are plain owned values. The machine never stores them: every call takes the
//! caller's session explicitly, so each user interaction owns an independent session and the
//! catalog stays read-only and shareable.
//!
//! Resolution walks [`Questionnaire::rules`] top to bottom and the first rule whose keyword is
//! contained in its step's answer wins. Rule order is a priority list kept in catalog data:
//! "everyone is affected" sits above the category rules so an outage outranks a login issue.

use crate::catalog::{Catalog, IssueRecord};
use crate::error::TransitionError;
use crate::{HelperError, HelperResult};
use pacs_types::{Keyword, NonEmptyText};

/// One step of the questionnaire. Options are matched by text, not index.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DiagnosisQuestion {
    pub prompt: NonEmptyText,
    pub options: Vec<NonEmptyText>,
}

impl DiagnosisQuestion {
    pub fn offers(&self, choice: &str) -> bool {
        self.options.iter().any(|option| option.as_str() == choice)
    }
}

/// "If the answer at `step` contains `keyword`, recommend `issue_id`."
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolutionRule {
    pub step: usize,
    pub keyword: Keyword,
    pub issue_id: NonEmptyText,
}

impl ResolutionRule {
    pub fn matches(&self, answers: &[String]) -> bool {
        answers
            .get(self.step)
            .is_some_and(|answer| self.keyword.is_contained_in(&answer.to_lowercase()))
    }
}

/// Returned when no rule matches.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DefaultRecommendation {
    pub title: NonEmptyText,
    pub steps: Vec<NonEmptyText>,
}

/// Questions, ordered resolution rules and the fallback for one catalog.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Questionnaire {
    pub questions: Vec<DiagnosisQuestion>,
    pub rules: Vec<ResolutionRule>,
    pub default: DefaultRecommendation,
}

/// Per-interaction questionnaire state.
///
/// Fields are private and there is no deserializer, so `answers.len() == current_step` always
/// holds; only [`GuidedDiagnosis`] moves a session forward.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DiagnosisSession {
    current_step: usize,
    answers: Vec<String>,
}

impl DiagnosisSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_step(&self) -> usize {
        self.current_step
    }

    /// `answers()[i]` is the choice accepted at step `i`.
    pub fn answers(&self) -> &[String] {
        &self.answers
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DiagnosisState {
    AwaitingAnswer(usize),
    Complete,
}

/// Final outcome of a completed questionnaire.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Recommendation<'c> {
    Issue(&'c IssueRecord),
    Default(&'c DefaultRecommendation),
}

impl Recommendation<'_> {
    pub fn title(&self) -> &str {
        match self {
            Recommendation::Issue(issue) => issue.display_name.as_str(),
            Recommendation::Default(default) => default.title.as_str(),
        }
    }

    pub fn steps(&self) -> &[NonEmptyText] {
        match self {
            Recommendation::Issue(issue) => &issue.solution_steps,
            Recommendation::Default(default) => &default.steps,
        }
    }
}

/// The questionnaire state machine for one catalog.
#[derive(Clone, Copy, Debug)]
pub struct GuidedDiagnosis<'c> {
    catalog: &'c Catalog,
}

impl<'c> GuidedDiagnosis<'c> {
    pub fn new(catalog: &'c Catalog) -> Self {
        Self { catalog }
    }

    fn questions(&self) -> &'c [DiagnosisQuestion] {
        &self.catalog.questionnaire().questions
    }

    pub fn question_count(&self) -> usize {
        self.questions().len()
    }

    pub fn new_session(&self) -> DiagnosisSession {
        DiagnosisSession::new()
    }

    pub fn state(&self, session: &DiagnosisSession) -> DiagnosisState {
        if session.current_step < self.question_count() {
            DiagnosisState::AwaitingAnswer(session.current_step)
        } else {
            DiagnosisState::Complete
        }
    }

    /// The question awaiting an answer, or `None` once complete.
    pub fn current_question(&self, session: &DiagnosisSession) -> Option<&'c DiagnosisQuestion> {
        self.questions().get(session.current_step)
    }

    /// Progress bar fraction: `(step + 1) / N` while answering, `1.0` when complete.
    pub fn progress(&self, session: &DiagnosisSession) -> f32 {
        match self.state(session) {
            DiagnosisState::AwaitingAnswer(step) => (step + 1) as f32 / self.question_count() as f32,
            DiagnosisState::Complete => 1.0,
        }
    }

    /// A session belongs to this questionnaire when it has one answer per completed step and
    /// every answer is an option of the question at that step.
    fn check_session(&self, session: &DiagnosisSession) -> HelperResult<()> {
        let total = self.question_count();
        let mismatch = TransitionError::SessionMismatch {
            answered: session.answers.len(),
            total,
        };

        if session.current_step > total || session.answers.len() != session.current_step {
            return Err(mismatch.into());
        }
        let foreign = self
            .questions()
            .iter()
            .zip(&session.answers)
            .any(|(question, answer)| !question.offers(answer));
        if foreign {
            return Err(mismatch.into());
        }
        Ok(())
    }

    /// Record `choice` for the current step and advance.
    ///
    /// # Errors
    ///
    /// Returns [`HelperError::InvalidTransition`] when the questionnaire is already complete or
    /// `choice` is not exactly one of the current question's options. The session is not
    /// modified on error.
    pub fn submit_answer(
        &self,
        session: &mut DiagnosisSession,
        choice: &str,
    ) -> HelperResult<DiagnosisState> {
        self.check_session(session)?;

        let step = session.current_step;
        let question = self
            .current_question(session)
            .ok_or(TransitionError::AlreadyComplete)?;

        if !question.offers(choice) {
            return Err(TransitionError::ChoiceNotOffered {
                step,
                choice: choice.to_string(),
            }
            .into());
        }

        session.answers.push(choice.to_string());
        session.current_step += 1;
        tracing::debug!("diagnosis step {} answered", step);

        Ok(self.state(session))
    }

    /// Return to the first question, discarding every answer. Valid in any state.
    pub fn reset(&self, session: &mut DiagnosisSession) {
        session.current_step = 0;
        session.answers.clear();
    }

    /// Evaluate the rule list against a completed session.
    ///
    /// # Errors
    ///
    /// Returns [`HelperError::InvalidTransition`] unless the session is complete.
    pub fn resolve(&self, session: &DiagnosisSession) -> HelperResult<Recommendation<'c>> {
        self.check_session(session)?;

        let total = self.question_count();
        if session.current_step != total {
            return Err(TransitionError::NotComplete {
                answered: session.current_step,
                total,
            }
            .into());
        }

        let questionnaire = self.catalog.questionnaire();
        let Some(rule) = questionnaire
            .rules
            .iter()
            .find(|rule| rule.matches(&session.answers))
        else {
            return Ok(Recommendation::Default(&questionnaire.default));
        };

        self.catalog
            .issue(rule.issue_id.as_str())
            .map(Recommendation::Issue)
            .ok_or_else(|| {
                HelperError::Configuration(format!(
                    "rule recommends unknown issue '{}'",
                    rule.issue_id
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::tests::{small_catalog, SMALL_CATALOG};
    use crate::catalog::CatalogSet;
    use crate::language::Language;

    fn complete(machine: &GuidedDiagnosis<'_>, answers: &[&str]) -> DiagnosisSession {
        let mut session = machine.new_session();
        for answer in answers {
            machine
                .submit_answer(&mut session, answer)
                .expect("valid answer");
        }
        session
    }

    #[test]
    fn starts_awaiting_first_answer() {
        let catalog = small_catalog();
        let machine = GuidedDiagnosis::new(&catalog);
        let session = machine.new_session();
        assert_eq!(machine.state(&session), DiagnosisState::AwaitingAnswer(0));
        assert_eq!(
            machine.current_question(&session).map(|q| q.prompt.as_str()),
            Some("main problem?")
        );
        assert!(session.answers().is_empty());
    }

    #[test]
    fn n_valid_answers_reach_complete() {
        let catalog = small_catalog();
        let machine = GuidedDiagnosis::new(&catalog);
        let mut session = machine.new_session();

        let state = machine
            .submit_answer(&mut session, "Images slow")
            .expect("first answer");
        assert_eq!(state, DiagnosisState::AwaitingAnswer(1));

        let state = machine.submit_answer(&mut session, "No").expect("second answer");
        assert_eq!(state, DiagnosisState::Complete);
        assert_eq!(session.answers().len(), machine.question_count());
        assert_eq!(session.current_step(), 2);
        assert!(machine.current_question(&session).is_none());
    }

    #[test]
    fn invalid_choice_leaves_session_unchanged() {
        let catalog = small_catalog();
        let machine = GuidedDiagnosis::new(&catalog);
        let mut session = complete(&machine, &["Can't login"]);
        let before = session.clone();

        let err = machine
            .submit_answer(&mut session, "Maybe")
            .expect_err("not an option");
        assert!(matches!(
            err,
            HelperError::InvalidTransition(TransitionError::ChoiceNotOffered { step: 1, ref choice })
                if choice == "Maybe"
        ));
        assert_eq!(session, before);
    }

    #[test]
    fn choices_are_matched_exactly() {
        let catalog = small_catalog();
        let machine = GuidedDiagnosis::new(&catalog);
        let mut session = machine.new_session();
        let err = machine
            .submit_answer(&mut session, "can't login")
            .expect_err("case differs");
        assert!(matches!(err, HelperError::InvalidTransition(_)));
        assert_eq!(session.current_step(), 0);
    }

    #[test]
    fn submit_after_complete_is_rejected() {
        let catalog = small_catalog();
        let machine = GuidedDiagnosis::new(&catalog);
        let mut session = complete(&machine, &["Can't login", "No"]);
        let before = session.clone();

        let err = machine
            .submit_answer(&mut session, "No")
            .expect_err("already complete");
        assert!(matches!(
            err,
            HelperError::InvalidTransition(TransitionError::AlreadyComplete)
        ));
        assert_eq!(session, before);
    }

    #[test]
    fn reset_returns_to_first_step_from_any_state() {
        let catalog = small_catalog();
        let machine = GuidedDiagnosis::new(&catalog);

        for answers in [&[][..], &["Can't login"][..], &["Can't login", "No"][..]] {
            let mut session = complete(&machine, answers);
            machine.reset(&mut session);
            assert_eq!(machine.state(&session), DiagnosisState::AwaitingAnswer(0));
            assert!(session.answers().is_empty());
        }
    }

    #[test]
    fn resolve_before_complete_is_rejected() {
        let catalog = small_catalog();
        let machine = GuidedDiagnosis::new(&catalog);
        let session = complete(&machine, &["Can't login"]);
        let err = machine.resolve(&session).expect_err("incomplete");
        assert!(matches!(
            err,
            HelperError::InvalidTransition(TransitionError::NotComplete {
                answered: 1,
                total: 2
            })
        ));
    }

    #[test]
    fn earlier_rule_wins_when_both_match() {
        let catalog = small_catalog();
        let machine = GuidedDiagnosis::new(&catalog);
        let session = complete(&machine, &["Can't login", "Yes, everyone"]);

        let recommendation = machine.resolve(&session).expect("resolves");
        assert_eq!(recommendation.title(), "PACS down for everyone");
    }

    #[test]
    fn reordered_rules_change_the_winner() {
        let yaml = SMALL_CATALOG.replace(
            "    - { step: 1, keyword: everyone, issue: outage }\n    - { step: 0, keyword: login, issue: login }\n",
            "    - { step: 0, keyword: login, issue: login }\n    - { step: 1, keyword: everyone, issue: outage }\n",
        );
        let catalog = Catalog::parse(&yaml).expect("reordered catalog");
        let machine = GuidedDiagnosis::new(&catalog);
        let session = complete(&machine, &["Can't login", "Yes, everyone"]);

        let recommendation = machine.resolve(&session).expect("resolves");
        assert_eq!(recommendation.title(), "Login problem");
    }

    #[test]
    fn rule_keyword_is_case_insensitive() {
        let catalog = small_catalog();
        let machine = GuidedDiagnosis::new(&catalog);
        let session = complete(&machine, &["Images slow", "No"]);
        let recommendation = machine.resolve(&session).expect("resolves");
        assert!(matches!(recommendation, Recommendation::Issue(issue) if issue.id.as_str() == "images"));
    }

    #[test]
    fn falls_back_to_default_recommendation() {
        let yaml = SMALL_CATALOG.replace(r#"["Can't login", "Images slow"]"#, r#"["Can't login", "Other"]"#);
        let catalog = Catalog::parse(&yaml).expect("catalog");
        let machine = GuidedDiagnosis::new(&catalog);
        let session = complete(&machine, &["Other", "No"]);

        let recommendation = machine.resolve(&session).expect("resolves");
        assert!(matches!(recommendation, Recommendation::Default(_)));
        assert_eq!(recommendation.title(), "Try the universal fix");
        assert_eq!(recommendation.steps().len(), 1);
    }

    #[test]
    fn progress_tracks_steps() {
        let catalog = small_catalog();
        let machine = GuidedDiagnosis::new(&catalog);
        let mut session = machine.new_session();
        assert!((machine.progress(&session) - 0.5).abs() < f32::EPSILON);
        machine
            .submit_answer(&mut session, "Images slow")
            .expect("answer");
        assert!((machine.progress(&session) - 1.0).abs() < f32::EPSILON);
        machine.submit_answer(&mut session, "No").expect("answer");
        assert!((machine.progress(&session) - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn session_from_longer_questionnaire_is_rejected() {
        let set = CatalogSet::builtin().expect("builtin");
        let long = GuidedDiagnosis::new(set.get(Language::En));
        let mut session = long.new_session();
        for step in 0..long.question_count() {
            let question = long.current_question(&session).expect("question");
            let choice = question.options[0].as_str().to_string();
            long.submit_answer(&mut session, &choice)
                .unwrap_or_else(|e| panic!("step {step}: {e}"));
        }

        let catalog = small_catalog();
        let short = GuidedDiagnosis::new(&catalog);
        let err = short.resolve(&session).expect_err("mismatched session");
        assert!(matches!(
            err,
            HelperError::InvalidTransition(TransitionError::SessionMismatch { .. })
        ));
    }

    #[test]
    fn session_with_missing_answers_is_rejected() {
        let catalog = small_catalog();
        let machine = GuidedDiagnosis::new(&catalog);
        let session = DiagnosisSession {
            current_step: 2,
            answers: Vec::new(),
        };

        let err = machine.resolve(&session).expect_err("no answers recorded");
        assert!(matches!(
            err,
            HelperError::InvalidTransition(TransitionError::SessionMismatch {
                answered: 0,
                total: 2
            })
        ));

        let mut session = session;
        let before = session.clone();
        machine
            .submit_answer(&mut session, "No")
            .expect_err("inconsistent session");
        assert_eq!(session, before);
    }

    #[test]
    fn session_answered_against_another_catalog_is_rejected() {
        let set = CatalogSet::builtin().expect("builtin");
        let long = GuidedDiagnosis::new(set.get(Language::En));
        let mut session = long.new_session();
        for choice in ["Can't login", "No, everyone has the same problem"] {
            long.submit_answer(&mut session, choice).expect("builtin answer");
        }

        // Same length as the small questionnaire, but the second answer is not one of its options.
        let catalog = small_catalog();
        let short = GuidedDiagnosis::new(&catalog);
        assert_eq!(session.current_step(), short.question_count());
        let err = short.resolve(&session).expect_err("foreign answers");
        assert!(matches!(
            err,
            HelperError::InvalidTransition(TransitionError::SessionMismatch { .. })
        ));
    }

    #[test]
    fn builtin_priority_order_is_preserved() {
        let set = CatalogSet::builtin().expect("builtin");
        let catalog = set.get(Language::En);
        let machine = GuidedDiagnosis::new(catalog);

        let outage = complete(
            &machine,
            &["Can't login", "No, everyone has the same problem", "Yes"],
        );
        let rec = machine.resolve(&outage).expect("resolves");
        assert!(matches!(rec, Recommendation::Issue(issue) if issue.id.as_str() == "pacs_down"));

        // "Modality not sending images" contains "image", and the image rule sits above any
        // modality-specific rule, so it resolves to the images fix.
        let modality = complete(&machine, &["Modality not sending images", "Yes", "Yes"]);
        let rec = machine.resolve(&modality).expect("resolves");
        assert!(matches!(rec, Recommendation::Issue(issue) if issue.id.as_str() == "images"));

        let other = complete(&machine, &["Other problem", "Not sure", "Yes"]);
        let rec = machine.resolve(&other).expect("resolves");
        assert!(matches!(rec, Recommendation::Default(_)));
    }

    #[test]
    fn every_builtin_language_resolves_an_outage_first() {
        let set = CatalogSet::builtin().expect("builtin");
        for language in Language::ALL {
            let catalog = set.get(language);
            let machine = GuidedDiagnosis::new(catalog);
            let questions = &catalog.questionnaire().questions;
            let answers: Vec<String> = vec![
                questions[0].options[0].as_str().to_string(),
                questions[1].options[1].as_str().to_string(),
                questions[2].options[0].as_str().to_string(),
            ];
            let refs: Vec<&str> = answers.iter().map(String::as_str).collect();
            let session = complete(&machine, &refs);
            let rec = machine.resolve(&session).expect("resolves");
            assert!(
                matches!(rec, Recommendation::Issue(issue) if issue.id.as_str() == "pacs_down"),
                "{language}: option 2 of question 2 should mean everyone is affected"
            );
        }
    }
}
