use std::{net::SocketAddr, sync::Arc};

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Router,
};
use serde::Deserialize;
use server_api::{
    approve_request, check_answer, clear_log, clear_submissions, learner_view, open_session,
    request_solution, start_experiment, submit_log, teacher_view, ApiContext, SolutionCatalog,
    TeacherView,
};
use shared::{
    domain::{IndicatorKind, Outcome, Property, SessionId},
    error::ApiError,
    protocol::{Notice, StudentIdentity},
};
use storage::{ResultAssets, SubmissionStore};
use tower_http::{limit::RequestBodyLimitLayer, trace::TraceLayer};
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

mod config;
mod render;

use config::load_settings;

#[derive(Clone)]
struct AppState {
    api: ApiContext,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct StartForm {
    solution: String,
    indicator: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CheckForm {
    choice: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RequestForm {
    name: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SubmitForm {
    grade: String,
    class_num: String,
    student_num: String,
    name: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SecretForm {
    secret: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ApproveForm {
    secret: String,
    name: String,
    property: String,
}

const SESSION_COOKIE: &str = "lab_session";
const MAX_FORM_BYTES: usize = 64 * 1024;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let settings = load_settings();
    let store = SubmissionStore::new(&settings.submissions_path)
        .await
        .map_err(|error| {
            error!(
                path = %settings.submissions_path.display(),
                %error,
                "failed to prepare submission store; verify the directory is writable"
            );
            error
        })?;
    let assets = ResultAssets::new(&settings.assets_dir);
    if let Err(error) = assets.ensure_all() {
        // Swatches are generated again on first request.
        warn!(dir = %assets.dir().display(), error = ?error, "failed to prepare result swatches");
    }
    if settings.teacher_password.is_none() {
        warn!("no teacher password configured; teacher panel is disabled");
    }

    let api = ApiContext::new(
        SolutionCatalog::with_defaults(),
        store,
        assets,
        settings.teacher_password.clone(),
        settings.reset_delay(),
    )
    .with_session_idle(settings.session_idle());
    let app = build_router(Arc::new(AppState { api }));

    let addr: SocketAddr = settings.bind_addr.parse()?;
    info!(%addr, "lab listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/healthz", get(healthz))
        .route("/experiment/start", post(http_start_experiment))
        .route("/experiment/check", post(http_check_answer))
        .route("/requests", post(http_request_solution))
        .route("/log/clear", post(http_clear_log))
        .route("/log/submit", post(http_submit_log))
        .route("/teacher", get(teacher_gate).post(teacher_login))
        .route("/teacher/approve", post(http_approve_request))
        .route("/teacher/submissions/clear", post(http_clear_submissions))
        .route("/assets/:file", get(asset))
        .layer(RequestBodyLimitLayer::new(MAX_FORM_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn healthz(State(state): State<Arc<AppState>>) -> Response {
    let health = state.api.lab().await.store.health_check().await;
    match health {
        Ok(()) => "ok".into_response(),
        Err(error) => {
            error!(%error, "submission store health check failed");
            (StatusCode::SERVICE_UNAVAILABLE, "unavailable").into_response()
        }
    }
}

async fn index(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    let (session, cookie) = resolve_session(&state, &headers).await;
    let view = learner_view(&state.api, session).await;
    with_cookie(Html(render::learner_page(&view)).into_response(), cookie)
}

async fn http_start_experiment(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Form(form): Form<StartForm>,
) -> Response {
    let (session, cookie) = resolve_session(&state, &headers).await;
    let indicator = IndicatorKind::from_key(&form.indicator);
    let result = start_experiment(
        &state.api,
        session,
        Some(form.solution.as_str()),
        indicator,
    )
    .await;
    log_rejection("start experiment", session, result);
    back_home(cookie)
}

async fn http_check_answer(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Form(form): Form<CheckForm>,
) -> Response {
    let (session, cookie) = resolve_session(&state, &headers).await;
    let choice = Property::from_key(&form.choice);
    let result = check_answer(&state.api, session, choice).await;
    log_rejection("check answer", session, result);
    back_home(cookie)
}

async fn http_request_solution(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Form(form): Form<RequestForm>,
) -> Response {
    let (session, cookie) = resolve_session(&state, &headers).await;
    let result = request_solution(&state.api, session, &form.name).await;
    log_rejection("request solution", session, result);
    back_home(cookie)
}

async fn http_clear_log(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    let (session, cookie) = resolve_session(&state, &headers).await;
    clear_log(&state.api, session).await;
    back_home(cookie)
}

async fn http_submit_log(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Form(form): Form<SubmitForm>,
) -> Response {
    let (session, cookie) = resolve_session(&state, &headers).await;
    let identity = StudentIdentity {
        grade: form.grade,
        class_num: form.class_num,
        student_num: form.student_num,
        name: form.name,
    };
    let result = submit_log(&state.api, session, &identity).await;
    log_rejection("submit log", session, result);
    back_home(cookie)
}

async fn teacher_gate(State(state): State<Arc<AppState>>) -> Response {
    let view = teacher_view(&state.api, "", Vec::new()).await;
    teacher_response(&view)
}

async fn teacher_login(
    State(state): State<Arc<AppState>>,
    Form(form): Form<SecretForm>,
) -> Response {
    let view = teacher_view(&state.api, &form.secret, Vec::new()).await;
    teacher_response(&view)
}

async fn http_approve_request(
    State(state): State<Arc<AppState>>,
    Form(form): Form<ApproveForm>,
) -> Response {
    let property = Property::from_key(&form.property);
    let result = approve_request(&state.api, &form.secret, form.name.trim(), property).await;
    let view = teacher_view(&state.api, &form.secret, vec![outcome_notice(result)]).await;
    teacher_response(&view)
}

async fn http_clear_submissions(
    State(state): State<Arc<AppState>>,
    Form(form): Form<SecretForm>,
) -> Response {
    let result = clear_submissions(&state.api, &form.secret).await;
    let view = teacher_view(&state.api, &form.secret, vec![outcome_notice(result)]).await;
    teacher_response(&view)
}

async fn asset(State(state): State<Arc<AppState>>, Path(file): Path<String>) -> Response {
    let Some(outcome) = Outcome::from_asset_file(&file) else {
        return StatusCode::NOT_FOUND.into_response();
    };
    match state.api.assets.load(outcome).await {
        Ok(bytes) => (
            [(header::CONTENT_TYPE, HeaderValue::from_static("image/png"))],
            bytes,
        )
            .into_response(),
        Err(error) => {
            error!(file = %file, error = ?error, "failed to serve result swatch");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

fn teacher_response(view: &TeacherView) -> Response {
    let status = match view {
        TeacherView::Locked { notice: Some(_) } => StatusCode::UNAUTHORIZED,
        _ => StatusCode::OK,
    };
    (status, Html(render::teacher_page(view))).into_response()
}

fn outcome_notice(result: Result<Notice, ApiError>) -> Notice {
    match result {
        Ok(notice) => notice,
        Err(error) => error.into(),
    }
}

fn log_rejection<T>(action: &str, session: SessionId, result: Result<T, ApiError>) {
    if let Err(error) = result {
        debug!(
            %session,
            action,
            code = ?error.code,
            message = %error.message,
            "action rejected"
        );
    }
}

fn session_from_headers(headers: &HeaderMap) -> Option<SessionId> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|raw| raw.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .and_then(|(_, value)| SessionId::parse(value))
}

/// Resolves the caller's session, returning a `Set-Cookie` value when a new
/// one had to be opened.
async fn resolve_session(
    state: &AppState,
    headers: &HeaderMap,
) -> (SessionId, Option<HeaderValue>) {
    let requested = session_from_headers(headers);
    let session = open_session(&state.api, requested).await;
    let cookie = if requested == Some(session) {
        None
    } else {
        HeaderValue::from_str(&format!(
            "{SESSION_COOKIE}={session}; Path=/; HttpOnly; SameSite=Lax"
        ))
        .ok()
    };
    (session, cookie)
}

fn with_cookie(mut response: Response, cookie: Option<HeaderValue>) -> Response {
    if let Some(cookie) = cookie {
        response.headers_mut().insert(header::SET_COOKIE, cookie);
    }
    response
}

fn back_home(cookie: Option<HeaderValue>) -> Response {
    with_cookie(Redirect::to("/").into_response(), cookie)
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
