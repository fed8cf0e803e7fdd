/// Reasons a guided diagnosis call was rejected.
///
/// These are usage errors: the caller should re-prompt, the session is left untouched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransitionError {
    #[error("choice {choice:?} is not an option for step {step}")]
    ChoiceNotOffered { step: usize, choice: String },
    #[error("questionnaire is already complete")]
    AlreadyComplete,
    #[error("questionnaire is not complete (answered {answered} of {total})")]
    NotComplete { answered: usize, total: usize },
    #[error("session does not belong to this questionnaire ({answered} answers, {total} questions)")]
    SessionMismatch { answered: usize, total: usize },
}

#[derive(Debug, thiserror::Error)]
pub enum HelperError {
    #[error("invalid transition: {0}")]
    InvalidTransition(#[from] TransitionError),
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("unsupported language: {0}")]
    UnsupportedLanguage(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("failed to read catalog file: {0}")]
    CatalogRead(std::io::Error),
    #[error("failed to write case log: {0}")]
    CaseLogWrite(std::io::Error),
    #[error("failed to read case log: {0}")]
    CaseLogRead(std::io::Error),
    #[error("failed to serialize case log entry: {0}")]
    Serialization(serde_json::Error),
}

pub type HelperResult<T> = std::result::Result<T, HelperError>;
