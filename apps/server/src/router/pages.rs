use axum::extract::State;
use axum::response::Html;
use chrono::Utc;
use doorstep::kernel::server::error::{PageError, PageFailure};
use doorstep::kernel::server::flash;
use doorstep::kernel::server::state::AppState;
use minijinja::context;
use tower_sessions::Session;

/// `GET /`: the landing page with the known-names list and the current time.
pub(super) async fn index(State(state): State<AppState>) -> Result<Html<String>, PageFailure> {
    state.render(
        "index.html",
        context! {
            known_names => state.config.pages.known_names,
            now => Utc::now().format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        },
    )
}

/// `GET /thanks`: the post-action page; drains any pending flash notices.
pub(super) async fn thanks(
    State(state): State<AppState>,
    session: Session,
) -> Result<Html<String>, PageFailure> {
    let notices = flash::take(&session).await.map_err(|e| state.page(e))?;

    state.render("thanks.html", context! { notices => notices })
}

/// Fallback for unmatched routes.
pub(super) async fn not_found(State(state): State<AppState>) -> PageFailure {
    state.page(PageError::not_found("The requested page does not exist."))
}
