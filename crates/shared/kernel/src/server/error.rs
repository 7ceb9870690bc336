use crate::server::templates::Templates;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use minijinja::context;
use tracing::error;

/// The page-level error taxonomy. Every variant maps to a distinct rendered view
/// carrying a `reason` string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PageError {
    /// 404: the requested page does not exist.
    #[error("Not found: {reason}")]
    NotFound { reason: String },

    /// 400: the request failed CSRF validation.
    #[error("CSRF validation failed: {reason}")]
    Csrf { reason: String },

    /// 500: anything unexpected. The reason shown to the client is always
    /// generic; the detail only ever reaches the log.
    #[error("Internal server error")]
    Internal,
}

impl PageError {
    pub fn not_found(reason: impl Into<String>) -> Self {
        Self::NotFound { reason: reason.into() }
    }

    pub fn csrf(reason: impl Into<String>) -> Self {
        Self::Csrf { reason: reason.into() }
    }

    /// Logs the underlying failure and collapses it into a generic 500.
    pub fn internal(source: impl std::fmt::Display) -> Self {
        error!(%source, "Unhandled server error");
        Self::Internal
    }

    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Csrf { .. } => StatusCode::BAD_REQUEST,
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    #[must_use]
    pub const fn template(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "404.html",
            Self::Csrf { .. } => "csrf_error.html",
            Self::Internal => "500.html",
        }
    }

    #[must_use]
    pub fn reason(&self) -> &str {
        match self {
            Self::NotFound { reason } | Self::Csrf { reason } => reason,
            Self::Internal => "The server encountered an internal error.",
        }
    }
}

/// A [`PageError`] paired with the template collaborator that renders its view.
///
/// Handlers produce this through [`AppState::page`](crate::server::state::AppState::page)
/// so that `?` keeps working while error pages still go through templates.
#[derive(Debug)]
pub struct PageFailure {
    error: PageError,
    templates: Templates,
}

impl PageFailure {
    #[must_use]
    pub const fn new(error: PageError, templates: Templates) -> Self {
        Self { error, templates }
    }

    #[must_use]
    pub const fn error(&self) -> &PageError {
        &self.error
    }
}

impl IntoResponse for PageFailure {
    fn into_response(self) -> Response {
        let status = self.error.status();
        let body = self
            .templates
            .render(self.error.template(), context! { reason => self.error.reason() });

        match body {
            Ok(body) => (status, Html(body)).into_response(),
            // The error page itself failed to render; fall back to bare text.
            Err(render_err) => {
                error!(%render_err, template = self.error.template(), "Error page render failed");
                (status, self.error.reason().to_owned()).into_response()
            },
        }
    }
}
