//! # API REST
//!
//! REST API implementation for the PACS helper.
//!
//! Handles:
//! - HTTP endpoints with axum
//! - OpenAPI/Swagger documentation
//! - REST-specific concerns (JSON serialization, CORS, per-user diagnosis sessions)
//!
//! Uses `api-shared` for DTOs and `pacs-core` for all troubleshooting logic.

#![warn(rust_2018_idioms)]

use axum::{
    extract::{Path as AxumPath, Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;
use uuid::Uuid;

use api_shared::{
    CaseDto, ChatReq, ChatRes, CreateSessionReq, HealthRes, HealthService, IssueDto,
    LanguageDto, LanguagesRes, ListIssuesRes, NetworkCheckRes, PanelRes, QuestionDto,
    RecentCasesRes, RecommendationKind, ResolutionRes, SessionRes, SessionStateDto,
    SubmitAnswerReq, UiStringsRes,
};
use pacs_core::{
    keys, network_check_commands, Catalog, CatalogSet, CaseLogSink, CoreConfig,
    DiagnosisSession, DiagnosisState, FileCaseLog, GuidedDiagnosis, HelperError, HelperResult,
    Language, MatchMode, PanelKind, TransitionError, DEFAULT_MAX_SESSIONS, DEFAULT_RECENT_CASES,
    DEFAULT_SESSION_IDLE_MINUTES,
};

type ApiError = (StatusCode, String);

/// A diagnosis session together with the language of the catalog it was started against.
#[derive(Clone, Debug)]
struct StoredSession {
    language: Language,
    session: DiagnosisSession,
    last_used: DateTime<Utc>,
}

/// Server-held diagnosis sessions, bounded by idle time and count.
#[derive(Debug)]
struct SessionStore {
    sessions: HashMap<Uuid, StoredSession>,
    idle_limit: Duration,
    max_sessions: usize,
}

impl SessionStore {
    fn new(idle_limit: Duration, max_sessions: usize) -> Self {
        Self {
            sessions: HashMap::new(),
            idle_limit,
            max_sessions,
        }
    }

    /// Drop idle sessions, then the least recently used ones while at capacity, and insert.
    fn insert(&mut self, id: Uuid, stored: StoredSession) {
        let now = stored.last_used;
        let idle_limit = self.idle_limit;
        let before = self.sessions.len();
        self.sessions
            .retain(|_, existing| now - existing.last_used < idle_limit);

        while !self.sessions.is_empty() && self.sessions.len() >= self.max_sessions {
            let oldest = self
                .sessions
                .iter()
                .min_by_key(|(_, existing)| existing.last_used)
                .map(|(id, _)| *id);
            match oldest {
                Some(oldest) => {
                    self.sessions.remove(&oldest);
                }
                None => break,
            }
        }

        let dropped = before - self.sessions.len();
        if dropped > 0 {
            tracing::info!("discarded {} stale diagnosis sessions", dropped);
        }
        self.sessions.insert(id, stored);
    }

    /// Live session by id, refreshing its idle timer.
    fn touch(&mut self, id: &Uuid) -> Option<&mut StoredSession> {
        let now = Utc::now();
        let idle_limit = self.idle_limit;
        let expired = self
            .sessions
            .get(id)
            .is_some_and(|stored| now - stored.last_used >= idle_limit);
        if expired {
            self.sessions.remove(id);
            return None;
        }
        let stored = self.sessions.get_mut(id)?;
        stored.last_used = now;
        Some(stored)
    }

    fn remove(&mut self, id: &Uuid) -> bool {
        self.sessions.remove(id).is_some()
    }
}

/// Application state for the REST API server
///
/// Catalogs and configuration are immutable after startup. Diagnosis sessions are owned by the
/// server and keyed by a random id, so every client drives an independent questionnaire.
#[derive(Clone)]
pub struct AppState {
    cfg: Arc<CoreConfig>,
    catalogs: Arc<CatalogSet>,
    case_log: Arc<dyn CaseLogSink>,
    sessions: Arc<Mutex<SessionStore>>,
}

impl AppState {
    pub fn new(
        cfg: Arc<CoreConfig>,
        catalogs: Arc<CatalogSet>,
        case_log: Arc<dyn CaseLogSink>,
    ) -> Self {
        Self {
            cfg,
            catalogs,
            case_log,
            sessions: Arc::new(Mutex::new(SessionStore::new(
                Duration::minutes(DEFAULT_SESSION_IDLE_MINUTES),
                DEFAULT_MAX_SESSIONS,
            ))),
        }
    }

    /// Replace the session idle limit and capacity. `max_sessions` is clamped to at least one.
    pub fn with_session_limits(self, idle_limit: Duration, max_sessions: usize) -> Self {
        Self {
            sessions: Arc::new(Mutex::new(SessionStore::new(
                idle_limit,
                max_sessions.max(1),
            ))),
            ..self
        }
    }

    /// Load catalogs and open the file case log described by `cfg`.
    pub fn from_config(cfg: CoreConfig) -> HelperResult<Self> {
        let catalogs = cfg.load_catalogs()?;
        let case_log = FileCaseLog::new(cfg.case_log_path());
        tracing::info!("case log at {}", case_log.path().display());
        Ok(Self::new(
            Arc::new(cfg),
            Arc::new(catalogs),
            Arc::new(case_log),
        ))
    }

    /// Requested language, or the configured default when absent.
    fn language(&self, requested: Option<&str>) -> Result<Language, ApiError> {
        match requested.map(str::trim).filter(|s| !s.is_empty()) {
            Some(code) => code
                .parse::<Language>()
                .map_err(|_| (StatusCode::BAD_REQUEST, format!("Unsupported language: {code}"))),
            None => Ok(self.cfg.default_language()),
        }
    }

    fn sessions(&self) -> MutexGuard<'_, SessionStore> {
        self.sessions
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health,
        list_languages,
        ui_strings,
        chat,
        list_issues,
        recent_cases,
        network_check_panel,
        universal_fix_panel,
        clear_cache_panel,
        create_session,
        get_session,
        delete_session,
        submit_answer,
        reset_session,
        resolve_session,
    ),
    components(schemas(
        HealthRes,
        LanguageDto,
        LanguagesRes,
        UiStringsRes,
        ChatReq,
        ChatRes,
        IssueDto,
        ListIssuesRes,
        CaseDto,
        RecentCasesRes,
        PanelRes,
        NetworkCheckRes,
        CreateSessionReq,
        QuestionDto,
        SessionStateDto,
        SessionRes,
        SubmitAnswerReq,
        RecommendationKind,
        ResolutionRes,
    ))
)]
struct ApiDoc;

/// Build the REST router with Swagger UI at `/swagger-ui`.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/languages", get(list_languages))
        .route("/ui", get(ui_strings))
        .route("/chat", post(chat))
        .route("/issues", get(list_issues))
        .route("/cases/recent", get(recent_cases))
        .route("/panels/network-check", get(network_check_panel))
        .route("/panels/universal-fix", get(universal_fix_panel))
        .route("/panels/clear-cache", get(clear_cache_panel))
        .route("/diagnosis/sessions", post(create_session))
        .route(
            "/diagnosis/sessions/:id",
            get(get_session).delete(delete_session),
        )
        .route("/diagnosis/sessions/:id/answers", post(submit_answer))
        .route("/diagnosis/sessions/:id/reset", post(reset_session))
        .route("/diagnosis/sessions/:id/resolution", get(resolve_session))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn internal_error(context: &str, err: &HelperError) -> ApiError {
    tracing::error!("{}: {:?}", context, err);
    (StatusCode::INTERNAL_SERVER_ERROR, "Internal error".into())
}

fn session_not_found() -> ApiError {
    (StatusCode::NOT_FOUND, "Diagnosis session not found".into())
}

fn parse_session_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| session_not_found())
}

fn session_view(id: Uuid, catalog: &Catalog, session: &DiagnosisSession) -> SessionRes {
    let machine = GuidedDiagnosis::new(catalog);
    let (state, question) = match machine.state(session) {
        DiagnosisState::AwaitingAnswer(step) => (
            SessionStateDto::AwaitingAnswer,
            machine
                .current_question(session)
                .map(|q| QuestionDto::new(step, q)),
        ),
        DiagnosisState::Complete => (SessionStateDto::Complete, None),
    };

    SessionRes {
        session_id: id.to_string(),
        language: catalog.language().code().to_string(),
        state,
        current_step: session.current_step(),
        total_steps: machine.question_count(),
        progress: machine.progress(session),
        question,
        answers: session.answers().to_vec(),
    }
}

#[derive(Debug, Default, Deserialize)]
struct LangQuery {
    lang: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RecentQuery {
    limit: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
struct NetworkCheckQuery {
    ip: Option<String>,
    lang: Option<String>,
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
/// Health check endpoint for monitoring and load balancers.
#[axum::debug_handler]
async fn health(State(_state): State<AppState>) -> Json<HealthRes> {
    Json(HealthService::check_health())
}

#[utoipa::path(
    get,
    path = "/languages",
    responses(
        (status = 200, description = "Loaded catalog languages", body = LanguagesRes)
    )
)]
#[axum::debug_handler]
async fn list_languages(State(state): State<AppState>) -> Json<LanguagesRes> {
    Json(LanguagesRes {
        default: state.cfg.default_language().code().to_string(),
        languages: state
            .catalogs
            .languages()
            .into_iter()
            .map(LanguageDto::from)
            .collect(),
    })
}

#[utoipa::path(
    get,
    path = "/ui",
    params(("lang" = Option<String>, Query, description = "Language code")),
    responses(
        (status = 200, description = "Page text for a front end", body = UiStringsRes),
        (status = 400, description = "Unsupported language")
    )
)]
/// Every UI string for a language, with English filling untranslated keys.
#[axum::debug_handler]
async fn ui_strings(
    State(state): State<AppState>,
    Query(query): Query<LangQuery>,
) -> Result<Json<UiStringsRes>, ApiError> {
    let language = state.language(query.lang.as_deref())?;
    Ok(Json(UiStringsRes {
        language: state.catalogs.get(language).language().code().to_string(),
        strings: state.catalogs.ui_strings(language),
    }))
}

#[utoipa::path(
    post,
    path = "/chat",
    request_body = ChatReq,
    responses(
        (status = 200, description = "Match result and assistant reply", body = ChatRes),
        (status = 400, description = "Unknown language or unknown match mode")
    )
)]
/// Match free text against the catalog and log the interaction
///
/// The reply is the localised "quick fix detected" label followed by the matched issue names,
/// or the localised fallback when nothing matched. Blank input gets the fallback and is not
/// logged. Every other input is written to the case log; a failed write is reported through
/// `logged` rather than failing the request.
///
/// # Errors
/// Returns `400 Bad Request` if `lang` is not a supported language code or `mode` is not
/// `single-best` or `all-matches`.
#[axum::debug_handler]
async fn chat(
    State(state): State<AppState>,
    Json(req): Json<ChatReq>,
) -> Result<Json<ChatRes>, ApiError> {
    let language = state.language(req.lang.as_deref())?;
    if req.input.trim().is_empty() {
        return Ok(Json(ChatRes {
            found: false,
            reply: state.catalogs.t(language, keys::NO_MATCH).to_string(),
            issues: Vec::new(),
            logged: false,
        }));
    }
    let mode = match req.mode.as_deref() {
        Some(raw) => raw
            .parse::<MatchMode>()
            .map_err(|_| (StatusCode::BAD_REQUEST, format!("Unknown match mode: {raw}")))?,
        None => state.cfg.match_mode(),
    };

    let catalog = state.catalogs.get(language);
    let result = catalog.match_input(&req.input, mode);

    let entry = result.to_case_log_entry(&req.input, Utc::now());
    let logged = match state.case_log.record(&entry) {
        Ok(()) => true,
        Err(e) => {
            tracing::error!("Case log write error: {:?}", e);
            false
        }
    };

    let reply = if result.found() {
        let names: Vec<&str> = result
            .issues()
            .iter()
            .map(|issue| issue.display_name.as_str())
            .collect();
        format!(
            "{} {}",
            state.catalogs.t(language, keys::SHOW_QUICKFIX),
            names.join(", ")
        )
    } else {
        state.catalogs.t(language, keys::NO_MATCH).to_string()
    };

    Ok(Json(ChatRes {
        found: result.found(),
        reply,
        issues: result.issues().iter().map(|issue| IssueDto::from(*issue)).collect(),
        logged,
    }))
}

#[utoipa::path(
    get,
    path = "/issues",
    params(("lang" = Option<String>, Query, description = "Catalog language code")),
    responses(
        (status = 200, description = "Catalog issues in priority order", body = ListIssuesRes),
        (status = 400, description = "Unsupported language")
    )
)]
#[axum::debug_handler]
async fn list_issues(
    State(state): State<AppState>,
    Query(query): Query<LangQuery>,
) -> Result<Json<ListIssuesRes>, ApiError> {
    let catalog = state.catalogs.get(state.language(query.lang.as_deref())?);
    Ok(Json(ListIssuesRes {
        language: catalog.language().code().to_string(),
        issues: catalog.issues().iter().map(IssueDto::from).collect(),
    }))
}

#[utoipa::path(
    get,
    path = "/cases/recent",
    params(("limit" = Option<usize>, Query, description = "Maximum number of cases (default 5)")),
    responses(
        (status = 200, description = "Most recent cases, newest first", body = RecentCasesRes),
        (status = 500, description = "Internal server error")
    )
)]
/// Most recent case log entries, newest first.
#[axum::debug_handler]
async fn recent_cases(
    State(state): State<AppState>,
    Query(query): Query<RecentQuery>,
) -> Result<Json<RecentCasesRes>, ApiError> {
    let limit = query.limit.unwrap_or(DEFAULT_RECENT_CASES);
    let entries = state
        .case_log
        .recent(limit)
        .map_err(|e| internal_error("Read case log error", &e))?;
    Ok(Json(RecentCasesRes {
        cases: entries.iter().map(CaseDto::from).collect(),
    }))
}

#[utoipa::path(
    get,
    path = "/panels/network-check",
    params(
        ("ip" = Option<String>, Query, description = "PACS host; the configured host or a placeholder when omitted"),
        ("lang" = Option<String>, Query, description = "Language for the panel title")
    ),
    responses(
        (status = 200, description = "Commands to paste into a terminal", body = NetworkCheckRes),
        (status = 400, description = "Host is not safe to embed in commands")
    )
)]
/// Network and port check commands
///
/// Nothing is executed server-side; the response is text for the user to run.
#[axum::debug_handler]
async fn network_check_panel(
    State(state): State<AppState>,
    Query(query): Query<NetworkCheckQuery>,
) -> Result<Json<NetworkCheckRes>, ApiError> {
    let language = state.language(query.lang.as_deref())?;
    let host = query.ip.as_deref().or(state.cfg.pacs_host());
    let commands = network_check_commands(host).map_err(|e| match e {
        HelperError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg),
        other => internal_error("Network check error", &other),
    })?;

    Ok(Json(NetworkCheckRes {
        title: state.catalogs.t(language, keys::NETWORK_CHECK).to_string(),
        hint: state.catalogs.t(language, keys::NETWORK_HINT).to_string(),
        commands,
    }))
}

#[utoipa::path(
    get,
    path = "/panels/universal-fix",
    params(("lang" = Option<String>, Query, description = "Catalog language code")),
    responses(
        (status = 200, description = "Universal fix steps", body = PanelRes),
        (status = 400, description = "Unsupported language")
    )
)]
#[axum::debug_handler]
async fn universal_fix_panel(
    State(state): State<AppState>,
    Query(query): Query<LangQuery>,
) -> Result<Json<PanelRes>, ApiError> {
    let catalog = state.catalogs.get(state.language(query.lang.as_deref())?);
    Ok(Json(PanelRes::from(PanelKind::UniversalFix.panel(catalog))))
}

#[utoipa::path(
    get,
    path = "/panels/clear-cache",
    params(("lang" = Option<String>, Query, description = "Catalog language code")),
    responses(
        (status = 200, description = "Clear cache how-to", body = PanelRes),
        (status = 400, description = "Unsupported language")
    )
)]
#[axum::debug_handler]
async fn clear_cache_panel(
    State(state): State<AppState>,
    Query(query): Query<LangQuery>,
) -> Result<Json<PanelRes>, ApiError> {
    let catalog = state.catalogs.get(state.language(query.lang.as_deref())?);
    Ok(Json(PanelRes::from(PanelKind::ClearCache.panel(catalog))))
}

#[utoipa::path(
    post,
    path = "/diagnosis/sessions",
    request_body = CreateSessionReq,
    responses(
        (status = 201, description = "Session started at the first question", body = SessionRes),
        (status = 400, description = "Unsupported language")
    )
)]
/// Start a guided diagnosis session
///
/// The session is bound to the catalog of the requested language (English when that language
/// is not loaded) for its whole life.
#[axum::debug_handler]
async fn create_session(
    State(state): State<AppState>,
    Json(req): Json<CreateSessionReq>,
) -> Result<(StatusCode, Json<SessionRes>), ApiError> {
    let catalog = state.catalogs.get(state.language(req.lang.as_deref())?);
    let session = GuidedDiagnosis::new(catalog).new_session();
    let id = Uuid::new_v4();
    let view = session_view(id, catalog, &session);

    state.sessions().insert(
        id,
        StoredSession {
            language: catalog.language(),
            session,
            last_used: Utc::now(),
        },
    );
    tracing::info!("started diagnosis session {} ({})", id, catalog.language());

    Ok((StatusCode::CREATED, Json(view)))
}

#[utoipa::path(
    get,
    path = "/diagnosis/sessions/{id}",
    params(("id" = String, Path, description = "Session id")),
    responses(
        (status = 200, description = "Current session state", body = SessionRes),
        (status = 404, description = "Unknown session")
    )
)]
#[axum::debug_handler]
async fn get_session(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<String>,
) -> Result<Json<SessionRes>, ApiError> {
    let id = parse_session_id(&id)?;
    let mut sessions = state.sessions();
    let stored = sessions.touch(&id).ok_or_else(session_not_found)?;
    let catalog = state.catalogs.get(stored.language);
    Ok(Json(session_view(id, catalog, &stored.session)))
}

#[utoipa::path(
    delete,
    path = "/diagnosis/sessions/{id}",
    params(("id" = String, Path, description = "Session id")),
    responses(
        (status = 204, description = "Session discarded"),
        (status = 404, description = "Unknown session")
    )
)]
/// Discard a diagnosis session once the client is done with it.
#[axum::debug_handler]
async fn delete_session(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_session_id(&id)?;
    if !state.sessions().remove(&id) {
        return Err(session_not_found());
    }
    tracing::info!("discarded diagnosis session {}", id);
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/diagnosis/sessions/{id}/answers",
    params(("id" = String, Path, description = "Session id")),
    request_body = SubmitAnswerReq,
    responses(
        (status = 200, description = "Answer accepted", body = SessionRes),
        (status = 404, description = "Unknown session"),
        (status = 409, description = "Questionnaire already complete"),
        (status = 422, description = "Choice is not one of the current options")
    )
)]
/// Submit the answer for the current step
///
/// # Errors
/// - `422 Unprocessable Entity` with a localised "pick one of the options" message when the
///   choice is not offered; the session is unchanged.
/// - `409 Conflict` when every question has already been answered.
#[axum::debug_handler]
async fn submit_answer(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<String>,
    Json(req): Json<SubmitAnswerReq>,
) -> Result<Json<SessionRes>, ApiError> {
    let id = parse_session_id(&id)?;
    let mut sessions = state.sessions();
    let stored = sessions.touch(&id).ok_or_else(session_not_found)?;
    let catalog = state.catalogs.get(stored.language);

    match GuidedDiagnosis::new(catalog).submit_answer(&mut stored.session, &req.choice) {
        Ok(_) => Ok(Json(session_view(id, catalog, &stored.session))),
        Err(HelperError::InvalidTransition(TransitionError::ChoiceNotOffered { .. })) => Err((
            StatusCode::UNPROCESSABLE_ENTITY,
            state.catalogs.t(stored.language, keys::PICK_OPTION).to_string(),
        )),
        Err(HelperError::InvalidTransition(TransitionError::AlreadyComplete)) => Err((
            StatusCode::CONFLICT,
            "Diagnosis is already complete; reset to start over".into(),
        )),
        Err(e) => Err(internal_error("Submit answer error", &e)),
    }
}

#[utoipa::path(
    post,
    path = "/diagnosis/sessions/{id}/reset",
    params(("id" = String, Path, description = "Session id")),
    responses(
        (status = 200, description = "Session back at the first question", body = SessionRes),
        (status = 404, description = "Unknown session")
    )
)]
#[axum::debug_handler]
async fn reset_session(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<String>,
) -> Result<Json<SessionRes>, ApiError> {
    let id = parse_session_id(&id)?;
    let mut sessions = state.sessions();
    let stored = sessions.touch(&id).ok_or_else(session_not_found)?;
    let catalog = state.catalogs.get(stored.language);
    GuidedDiagnosis::new(catalog).reset(&mut stored.session);
    Ok(Json(session_view(id, catalog, &stored.session)))
}

#[utoipa::path(
    get,
    path = "/diagnosis/sessions/{id}/resolution",
    params(("id" = String, Path, description = "Session id")),
    responses(
        (status = 200, description = "Recommended fix", body = ResolutionRes),
        (status = 404, description = "Unknown session"),
        (status = 409, description = "Questionnaire not complete yet")
    )
)]
#[axum::debug_handler]
async fn resolve_session(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<String>,
) -> Result<Json<ResolutionRes>, ApiError> {
    let id = parse_session_id(&id)?;
    let mut sessions = state.sessions();
    let stored = sessions.touch(&id).ok_or_else(session_not_found)?;
    let catalog = state.catalogs.get(stored.language);

    match GuidedDiagnosis::new(catalog).resolve(&stored.session) {
        Ok(recommendation) => Ok(Json(ResolutionRes::new(
            state.catalogs.t(stored.language, keys::DIAGNOSIS_COMPLETE),
            &recommendation,
        ))),
        Err(HelperError::InvalidTransition(TransitionError::NotComplete { answered, total })) => {
            Err((
                StatusCode::CONFLICT,
                format!("Diagnosis is not complete yet ({answered} of {total} answered)"),
            ))
        }
        Err(e) => Err(internal_error("Resolve diagnosis error", &e)),
    }
}
