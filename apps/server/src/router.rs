use axum::Router;
use axum::routing::get;
use doorstep::kernel::server::state::AppState;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tower_sessions::{MemoryStore, SessionManagerLayer};

mod pages;

/// Assembles the full application router: the rendered pages, the feature
/// slices, the system routes, and static file serving.
#[allow(unreachable_pub)]
pub fn init(state: AppState) -> Router {
    let static_dir = state.config.storage.static_dir.clone();

    // Cookies carry only the session id; secure flag stays off so the demo
    // works over plain HTTP.
    let session_layer = SessionManagerLayer::new(MemoryStore::default()).with_secure(false);

    Router::new()
        .route("/", get(pages::index))
        .route("/thanks", get(pages::thanks))
        .merge(doorstep::init())
        .merge(doorstep::server::router::system_router())
        .nest_service("/static", ServeDir::new(static_dir))
        .fallback(pages::not_found)
        .layer(TraceLayer::new_for_http())
        .layer(session_layer)
        .with_state(state)
}
