use std::{
    collections::HashMap,
    sync::Arc,
    time::{Duration, Instant},
};

use chrono::Local;
use shared::{
    domain::{IndicatorKind, Property, SessionId},
    error::{ApiError, ErrorCode},
    protocol::{Notice, StudentIdentity, Submission},
};
use storage::{ResultAssets, SubmissionStore};
use tokio::sync::Mutex;
use tracing::{debug, info};

pub mod catalog;
pub mod lab;
pub mod requests;
pub mod session;
pub mod teacher;
pub mod view;

pub use catalog::SolutionCatalog;
pub use lab::Lab;
pub use requests::RequestQueue;
pub use session::ExperimentSession;
pub use teacher::{approve_request, authorize, clear_submissions, teacher_view, TeacherAccess};
pub use view::{LearnerView, TeacherPanel, TeacherView};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
pub const DEFAULT_SESSION_IDLE: Duration = Duration::from_secs(30 * 60);

#[derive(Clone)]
pub struct ApiContext {
    lab: Arc<Mutex<Lab>>,
    sessions: Arc<Mutex<HashMap<SessionId, ExperimentSession>>>,
    pub assets: ResultAssets,
    pub teacher_secret: Option<String>,
    pub reset_delay: Duration,
    /// Sessions untouched for this long are dropped on the next
    /// [`open_session`].
    pub session_idle: Duration,
}

impl ApiContext {
    pub fn new(
        catalog: SolutionCatalog,
        store: SubmissionStore,
        assets: ResultAssets,
        teacher_secret: Option<String>,
        reset_delay: Duration,
    ) -> Self {
        Self {
            lab: Arc::new(Mutex::new(Lab::new(catalog, store))),
            sessions: Arc::new(Mutex::new(HashMap::new())),
            assets,
            teacher_secret: teacher_secret.filter(|secret| !secret.is_empty()),
            reset_delay,
            session_idle: DEFAULT_SESSION_IDLE,
        }
    }

    pub fn with_session_idle(mut self, session_idle: Duration) -> Self {
        self.session_idle = session_idle;
        self
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.lock().await.len()
    }

    /// Exclusive access to the shared lab state. Never acquire this while a
    /// session guard is held.
    pub async fn lab(&self) -> tokio::sync::MutexGuard<'_, Lab> {
        self.lab.lock().await
    }

    async fn with_session<T>(
        &self,
        session_id: SessionId,
        f: impl FnOnce(&mut ExperimentSession) -> T,
    ) -> T {
        let mut sessions = self.sessions.lock().await;
        let session = sessions.entry(session_id).or_default();
        session.touch(Instant::now());
        f(session)
    }

    /// Queues notices for the session's next render and passes the result on.
    async fn record(
        &self,
        session_id: SessionId,
        result: Result<Vec<Notice>, ApiError>,
    ) -> Result<(), ApiError> {
        let (notices, outcome) = match result {
            Ok(notices) => (notices, Ok(())),
            Err(error) => (vec![Notice::from(error.clone())], Err(error)),
        };
        self.with_session(session_id, |session| {
            for notice in notices {
                session.push_notice(notice);
            }
        })
        .await;
        outcome
    }
}

/// Returns `requested` when that session is live, otherwise starts a new one.
pub async fn open_session(ctx: &ApiContext, requested: Option<SessionId>) -> SessionId {
    open_session_at(ctx, requested, Instant::now()).await
}

/// [`open_session`] with an explicit clock. Idle sessions are swept first, so
/// a stale `requested` id also yields a fresh session.
pub async fn open_session_at(
    ctx: &ApiContext,
    requested: Option<SessionId>,
    now: Instant,
) -> SessionId {
    let mut sessions = ctx.sessions.lock().await;
    let before = sessions.len();
    sessions.retain(|_, session| session.idle_for(now) < ctx.session_idle);
    if sessions.len() < before {
        debug!(
            evicted = before - sessions.len(),
            active = sessions.len(),
            "idle sessions dropped"
        );
    }

    if let Some(id) = requested {
        if let Some(session) = sessions.get_mut(&id) {
            session.touch(now);
            return id;
        }
    }
    let id = SessionId::new();
    let mut session = ExperimentSession::new();
    session.touch(now);
    sessions.insert(id, session);
    info!(session = %id, active = sessions.len(), "session opened");
    id
}

pub async fn learner_view(ctx: &ApiContext, session_id: SessionId) -> LearnerView {
    let solutions = ctx.lab().await.catalog.names();
    let now = Instant::now();
    ctx.with_session(session_id, |session| {
        if session.advance(now) {
            debug!(session = %session_id, "pause elapsed; back to ready");
        }
        LearnerView {
            step: session.step(),
            solutions,
            indicators: IndicatorKind::ALL.to_vec(),
            selection: session.selection().cloned(),
            log: session.log().iter().rev().cloned().collect(),
            notices: session.take_notices(),
            resume_in: session.remaining_pause(now),
        }
    })
    .await
}

pub async fn start_experiment(
    ctx: &ApiContext,
    session_id: SessionId,
    solution: Option<&str>,
    indicator: Option<IndicatorKind>,
) -> Result<bool, ApiError> {
    let lab = ctx.lab().await;
    let started = ctx
        .with_session(session_id, |session| {
            session.start(&lab.catalog, solution, indicator)
        })
        .await;
    drop(lab);

    match started {
        Ok(started) => {
            if started {
                debug!(session = %session_id, ?solution, ?indicator, "experiment started");
            }
            Ok(started)
        }
        Err(error) => ctx.record(session_id, Err(error)).await.map(|_| false),
    }
}

pub async fn check_answer(
    ctx: &ApiContext,
    session_id: SessionId,
    choice: Option<Property>,
) -> Result<Option<bool>, ApiError> {
    let now = Instant::now();
    let pause = ctx.reset_delay;
    let checked = ctx
        .with_session(session_id, |session| session.check(choice, now, pause))
        .await;

    let entry = match checked {
        Ok(Some(entry)) => entry,
        Ok(None) => return Ok(None),
        Err(error) => return ctx.record(session_id, Err(error)).await.map(|_| None),
    };

    let verdict = if entry.correct {
        Notice::success(format!(
            "🎉 정답입니다! '{}'은(는) '{}'이 맞습니다.",
            entry.solution_name,
            entry.actual.label()
        ))
    } else {
        Notice::error(format!(
            "아쉬워요. 정답은 '{}'입니다. 왜 그런지 다시 생각해볼까요?",
            entry.actual.label()
        ))
    };
    let reset = Notice::info(format!(
        "{}초 후에 새로운 실험을 준비합니다.",
        pause.as_secs()
    ));
    info!(
        session = %session_id,
        solution = %entry.solution_name,
        correct = entry.correct,
        "answer graded"
    );
    ctx.record(session_id, Ok(vec![verdict, reset])).await?;
    Ok(Some(entry.correct))
}

pub async fn request_solution(
    ctx: &ApiContext,
    session_id: SessionId,
    name: &str,
) -> Result<(), ApiError> {
    let result = ctx.lab().await.request_solution(name);
    ctx.record(session_id, result.map(|notice| vec![notice])).await
}

pub async fn clear_log(ctx: &ApiContext, session_id: SessionId) {
    ctx.with_session(session_id, |session| {
        session.clear_log();
        session.push_notice(Notice::success("탐구 일지를 모두 지웠습니다!"));
    })
    .await;
}

/// Sends the session's log to the shared store. Returns the stored count.
pub async fn submit_log(
    ctx: &ApiContext,
    session_id: SessionId,
    identity: &StudentIdentity,
) -> Result<usize, ApiError> {
    let log = ctx
        .with_session(session_id, |session| session.log().to_vec())
        .await;

    let result: Result<usize, ApiError> = async {
        if !identity.is_complete() {
            return Err(ApiError::new(
                ErrorCode::Validation,
                "학년, 반, 번호, 이름을 모두 입력해주세요.",
            ));
        }
        if log.is_empty() {
            return Err(ApiError::new(
                ErrorCode::Validation,
                "전송할 탐구일지 내용이 없습니다. 먼저 실험을 진행해주세요.",
            ));
        }

        let submission = Submission {
            info: identity.info_line(),
            log,
            timestamp: Local::now().format(TIMESTAMP_FORMAT).to_string(),
        };
        let lab = ctx.lab().await;
        let stored = lab.store.append(submission).await.map_err(internal)?;
        info!(session = %session_id, stored, "log submitted");
        Ok(stored)
    }
    .await;

    match result {
        Ok(stored) => {
            ctx.record(
                session_id,
                Ok(vec![Notice::success(
                    "탐구일지를 선생님께 성공적으로 전송했습니다!",
                )]),
            )
            .await?;
            Ok(stored)
        }
        Err(error) => ctx.record(session_id, Err(error)).await.map(|_| 0),
    }
}

fn internal(err: anyhow::Error) -> ApiError {
    ApiError::new(ErrorCode::Internal, format!("{err:#}"))
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
