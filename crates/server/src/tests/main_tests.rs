use super::*;
use axum::{body, body::Body, http::Request};
use std::time::Duration;
use tower::ServiceExt;

async fn test_app(reset_delay: Duration) -> (Router, ApiContext, tempfile::TempDir) {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = SubmissionStore::new(dir.path().join("submitted_logs.json"))
        .await
        .expect("store");
    let api = ApiContext::new(
        SolutionCatalog::from_entries([("vinegar", Property::Acidic), ("soap", Property::Basic)]),
        store,
        ResultAssets::new(dir.path().join("images")),
        Some("abc123".to_string()),
        reset_delay,
    );
    let app = build_router(Arc::new(AppState { api: api.clone() }));
    (app, api, dir)
}

async fn body_text(response: Response) -> String {
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    String::from_utf8(bytes.to_vec()).expect("utf8")
}

fn session_cookie(response: &Response) -> String {
    let raw = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("set-cookie")
        .to_str()
        .expect("ascii");
    raw.split(';').next().expect("cookie pair").to_string()
}

fn form_post(uri: &str, cookie: &str, body: &str) -> Request<Body> {
    Request::post(uri)
        .header(header::COOKIE, cookie)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .expect("request")
}

async fn open_page(app: &Router) -> String {
    let response = app
        .clone()
        .oneshot(Request::get("/").body(Body::empty()).expect("request"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    session_cookie(&response)
}

async fn get_page(app: &Router, cookie: &str) -> String {
    let response = app
        .clone()
        .oneshot(
            Request::get("/")
                .header(header::COOKIE, cookie)
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    assert!(response.headers().get(header::SET_COOKIE).is_none());
    body_text(response).await
}

#[tokio::test]
async fn healthz_reports_ok_when_storage_is_ready() {
    let (app, _api, _dir) = test_app(Duration::ZERO).await;
    let response = app
        .oneshot(Request::get("/healthz").body(Body::empty()).expect("request"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "ok");
}

#[tokio::test]
async fn first_visit_opens_a_session() {
    let (app, _api, _dir) = test_app(Duration::ZERO).await;
    let cookie = open_page(&app).await;
    assert!(cookie.starts_with("lab_session="));

    let html = get_page(&app, &cookie).await;
    assert!(html.contains("실험 준비하기"));
    assert!(html.contains("<option value=\"vinegar\">vinegar</option>"));
}

#[tokio::test]
async fn experiment_flow_grades_and_returns_to_ready() {
    let (app, _api, _dir) = test_app(Duration::ZERO).await;
    let cookie = open_page(&app).await;

    let response = app
        .clone()
        .oneshot(form_post(
            "/experiment/start",
            &cookie,
            "solution=vinegar&indicator=litmus_paper",
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/");

    let html = get_page(&app, &cookie).await;
    assert!(html.contains("/assets/litmus_red.png"));
    assert!(html.contains("푸른색 리트머스 종이가 붉게 변했습니다."));

    app.clone()
        .oneshot(form_post("/experiment/check", &cookie, "choice=basic"))
        .await
        .expect("response");

    let html = get_page(&app, &cookie).await;
    assert!(html.contains("아쉬워요. 정답은 &#39;산성&#39;입니다."));
    assert!(html.contains("<td>❌ 오답</td>"));
    assert!(html.contains("실험 준비하기"));
}

#[tokio::test]
async fn done_step_asks_the_browser_to_refresh() {
    let (app, _api, _dir) = test_app(Duration::from_secs(3)).await;
    let cookie = open_page(&app).await;
    app.clone()
        .oneshot(form_post(
            "/experiment/start",
            &cookie,
            "solution=soap&indicator=phenolphthalein",
        ))
        .await
        .expect("response");
    app.clone()
        .oneshot(form_post("/experiment/check", &cookie, "choice=basic"))
        .await
        .expect("response");

    let html = get_page(&app, &cookie).await;
    assert!(html.contains("http-equiv=\"refresh\""));
    assert!(html.contains("실험을 초기화하는 중입니다..."));
    assert!(!html.contains("/experiment/start"));
}

#[tokio::test]
async fn missing_indicator_shows_warning() {
    let (app, _api, _dir) = test_app(Duration::ZERO).await;
    let cookie = open_page(&app).await;
    app.clone()
        .oneshot(form_post("/experiment/start", &cookie, "solution=vinegar&indicator="))
        .await
        .expect("response");

    let html = get_page(&app, &cookie).await;
    assert!(html.contains("notice warning"));
    assert!(html.contains("용액과 지시약을 모두 선택해주세요!"));
}

#[tokio::test]
async fn duplicate_request_is_informational() {
    let (app, api, _dir) = test_app(Duration::ZERO).await;
    let cookie = open_page(&app).await;
    for _ in 0..2 {
        app.clone()
            .oneshot(form_post("/requests", &cookie, "name=lemonade"))
            .await
            .expect("response");
    }

    let html = get_page(&app, &cookie).await;
    assert!(html.contains("notice success"));
    assert!(html.contains("notice info"));
    assert_eq!(api.lab().await.requests.len(), 1);
}

#[tokio::test]
async fn submitted_log_reaches_the_store() {
    let (app, api, _dir) = test_app(Duration::ZERO).await;
    let cookie = open_page(&app).await;
    app.clone()
        .oneshot(form_post(
            "/experiment/start",
            &cookie,
            "solution=soap&indicator=litmus_paper",
        ))
        .await
        .expect("response");
    app.clone()
        .oneshot(form_post("/experiment/check", &cookie, "choice=basic"))
        .await
        .expect("response");

    app.clone()
        .oneshot(form_post(
            "/log/submit",
            &cookie,
            "grade=6&class_num=2&student_num=7&name=Mina",
        ))
        .await
        .expect("response");

    let submissions = api.lab().await.store.load_all().await;
    assert_eq!(submissions.len(), 1);
    assert_eq!(submissions[0].info, "6학년 2반 7번 Mina");
    assert!(submissions[0].log[0].correct);
}

#[tokio::test]
async fn teacher_panel_requires_matching_secret() {
    let (app, _api, _dir) = test_app(Duration::ZERO).await;

    let response = app
        .clone()
        .oneshot(Request::get("/teacher").body(Body::empty()).expect("request"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(!html.contains("notice error"));

    let response = app
        .clone()
        .oneshot(form_post("/teacher", "", "secret=wrong"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let html = body_text(response).await;
    assert!(html.contains("비밀번호가 올바르지 않습니다."));
    assert!(!html.contains("학생들이 요청한 용액 목록"));

    let response = app
        .oneshot(form_post("/teacher", "", "secret=abc123"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("학생들이 요청한 용액 목록"));
    assert!(html.contains("학생들이 제출한 탐구일지"));
}

#[tokio::test]
async fn teacher_approval_adds_solution_for_learners() {
    let (app, api, _dir) = test_app(Duration::ZERO).await;
    let cookie = open_page(&app).await;
    app.clone()
        .oneshot(form_post("/requests", &cookie, "name=lemonade"))
        .await
        .expect("response");

    let response = app
        .clone()
        .oneshot(form_post(
            "/teacher/approve",
            "",
            "secret=abc123&name=lemonade&property=acidic",
        ))
        .await
        .expect("response");
    let html = body_text(response).await;
    assert!(html.contains("실험 목록에 추가했습니다."));

    assert!(api.lab().await.requests.is_empty());
    let page = get_page(&app, &cookie).await;
    assert!(page.contains("<option value=\"lemonade\">lemonade</option>"));
}

#[tokio::test]
async fn teacher_can_clear_submissions() {
    let (app, api, _dir) = test_app(Duration::ZERO).await;
    api.lab()
        .await
        .store
        .append(shared::protocol::Submission {
            info: "6학년 1반 1번 Test".into(),
            log: Vec::new(),
            timestamp: "2026-05-02 10:00:00".into(),
        })
        .await
        .expect("append");

    let response = app
        .oneshot(form_post("/teacher/submissions/clear", "", "secret=abc123"))
        .await
        .expect("response");
    let html = body_text(response).await;
    assert!(html.contains("제출된 모든 탐구일지를 삭제했습니다."));
    assert!(api.lab().await.store.load_all().await.is_empty());
}

#[tokio::test]
async fn assets_route_serves_png_and_rejects_unknown_names() {
    let (app, _api, _dir) = test_app(Duration::ZERO).await;
    let response = app
        .clone()
        .oneshot(
            Request::get("/assets/phenol_colorless.png")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "image/png");

    let response = app
        .oneshot(
            Request::get("/assets/other.png")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
