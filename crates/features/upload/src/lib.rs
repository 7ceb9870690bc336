//! Photo upload feature slice: a multipart form that sanitizes the client
//! filename and stores the file under the configured uploads directory.

mod handlers;

use axum::Router;
use axum::routing::get;
use doorstep_kernel::server::state::AppState;

/// File extensions accepted as images, lowercase.
pub const IMAGES: &[&str] = &["jpg", "jpe", "jpeg", "png", "gif", "svg", "bmp", "webp"];

/// The routes this slice contributes.
#[must_use]
pub fn router() -> Router<AppState> {
    Router::new().route("/upload", get(handlers::show_form).post(handlers::submit))
}
