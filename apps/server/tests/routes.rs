use axum::Router;
use axum::body::Body;
use axum::http::header::{CONTENT_TYPE, COOKIE, SET_COOKIE};
use axum::http::{Request, StatusCode};
use doorstep::domain::config::AppConfig;
use doorstep::kernel::server::state::AppState;
use doorstep::kernel::server::templates::Templates;
use doorstep_database::Database;
use doorstep_mailer::Mailer;
use doorstep_server::router;
use std::path::PathBuf;
use tower::ServiceExt;

fn repo_path(relative: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../..").join(relative)
}

/// The full application router, wired against the checked-in templates and an
/// in-memory database. Delivery is suppressed, so no SMTP relay is contacted.
async fn app() -> Router {
    let mut config = AppConfig::default();
    config.mail.suppress_send = true;
    config.storage.static_dir = repo_path("static");
    config.storage.uploads_dir = repo_path("static/uploads");
    config.storage.templates_dir = repo_path("templates");

    let database = Database::builder()
        .url("mem://")
        .session("doorstep-server-test", "core")
        .init()
        .await
        .expect("database");

    let mailer = Mailer::builder()
        .config(config.mail.clone())
        .templates_dir(&config.storage.templates_dir)
        .build()
        .expect("mailer");

    let templates = Templates::load(&config.storage.templates_dir);

    let state = AppState::builder()
        .config(config)
        .db(database)
        .mailer(mailer)
        .templates(templates)
        .build()
        .expect("state");

    router::init(state)
}

async fn body_text(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn get(app: &Router, uri: &str) -> axum::response::Response {
    app.clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

#[tokio::test]
async fn index_lists_the_known_names() {
    let app = app().await;

    let response = get(&app, "/").await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_text(response).await;
    for name in ["john", "jane", "tomas"] {
        assert!(body.contains(name), "index lists '{name}': {body}");
    }
}

#[tokio::test]
async fn health_reports_up() {
    let app = app().await;

    let response = get(&app, "/health").await;
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), 64 * 1024).await.unwrap();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(json["status"], "up");
    assert!(json["version"].is_string());
}

#[tokio::test]
async fn unknown_routes_render_the_404_page() {
    let app = app().await;

    let response = get(&app, "/nowhere").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body = body_text(response).await;
    assert!(body.contains("404"), "rendered 404 page: {body}");
}

#[tokio::test]
async fn static_assets_are_served() {
    let app = app().await;

    let response = get(&app, "/static/style.css").await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn thanks_page_renders_without_a_session() {
    let app = app().await;

    let response = get(&app, "/thanks").await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_text(response).await;
    assert!(body.contains("Thank you"));
}

#[tokio::test]
async fn register_form_offers_all_gender_choices() {
    let app = app().await;

    let response = get(&app, "/register").await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_text(response).await;
    for option in ["--Choose--", "Male", "Female"] {
        assert!(body.contains(option), "gender select offers '{option}': {body}");
    }
    assert!(body.contains("value=\"0\""), "the unspecified choice is selectable: {body}");
}

#[tokio::test]
async fn registration_works_end_to_end() {
    let app = app().await;

    // Fetch the form for the session cookie and its CSRF token.
    let response = get(&app, "/register").await;
    assert_eq!(response.status(), StatusCode::OK);

    let cookie = response
        .headers()
        .get(SET_COOKIE)
        .expect("session cookie issued")
        .to_str()
        .unwrap()
        .split(';')
        .next()
        .unwrap()
        .to_owned();

    let body = body_text(response).await;
    let token = body
        .split("name=\"csrf_token\" value=\"")
        .nth(1)
        .and_then(|rest| rest.split('"').next())
        .expect("csrf token embedded in the form")
        .to_owned();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/register")
                .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
                .header(COOKIE, &cookie)
                .body(Body::from(format!(
                    "name=Jane&username=janedoe&password=secret&gender=2&csrf_token={token}"
                )))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("janedoe"), "thanks view greets the visitor: {body}");
    assert!(!body.contains("secret"), "the password never reaches a response");
}

#[tokio::test]
async fn posting_without_a_csrf_token_is_rejected() {
    let app = app().await;

    let response = get(&app, "/register").await;
    let cookie = response
        .headers()
        .get(SET_COOKIE)
        .expect("session cookie issued")
        .to_str()
        .unwrap()
        .split(';')
        .next()
        .unwrap()
        .to_owned();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/register")
                .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
                .header(COOKIE, &cookie)
                .body(Body::from("name=Jane&username=janedoe&password=secret"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
