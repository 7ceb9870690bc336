//! Registration feature slice: the declarative form rules and the
//! `GET`/`POST /register` flow (validate, update the session, queue the
//! confirmation email, render the response).

mod form;
mod handlers;

pub use form::{ALLOWED_PASSWORDS, FieldErrors, RegisterForm, USERNAME_MIN_LENGTH};

use axum::Router;
use axum::routing::get;
use doorstep_kernel::server::state::AppState;

/// Session key carrying the registered username across requests.
pub const SESSION_USERNAME: &str = "username";

/// The routes this slice contributes.
#[must_use]
pub fn router() -> Router<AppState> {
    Router::new().route("/register", get(handlers::show_form).post(handlers::submit))
}
