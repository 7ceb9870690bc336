use crate::server::error::{PageError, PageFailure};
use crate::server::templates::Templates;
use axum::extract::FromRef;
use axum::response::Html;
use doorstep_database::Database;
use doorstep_domain::config::AppConfig;
use doorstep_mailer::Mailer;
use serde::Serialize;
use std::ops::Deref;
use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
pub enum AppStateError {
    #[error("State validation error: {message}")]
    Validation { message: String },
}

#[derive(Debug)]
pub struct AppStateInner {
    pub config: AppConfig,
    pub database: Database,
    pub mailer: Mailer,
    pub templates: Templates,
}

/// Shared application state handed to every handler. Cheap to clone.
#[derive(Debug, Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

impl AppState {
    #[must_use]
    pub fn builder() -> AppStateBuilder {
        AppStateBuilder::default()
    }

    /// Wraps a page error with the template collaborator so it renders as the
    /// matching error view.
    #[must_use]
    pub fn page(&self, error: PageError) -> PageFailure {
        PageFailure::new(error, self.inner.templates.clone())
    }

    /// Renders a page template; render failures become a generic 500 page.
    ///
    /// # Errors
    /// Returns a [`PageFailure`] carrying [`PageError::Internal`].
    pub fn render(&self, name: &str, ctx: impl Serialize) -> Result<Html<String>, PageFailure> {
        self.inner.templates.html(name, ctx).map_err(|e| self.page(PageError::internal(e)))
    }
}

impl Deref for AppState {
    type Target = AppStateInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(state: &AppState) -> Self {
        state.inner.config.clone()
    }
}

impl FromRef<AppState> for Database {
    fn from_ref(state: &AppState) -> Self {
        state.inner.database.clone()
    }
}

impl FromRef<AppState> for Mailer {
    fn from_ref(state: &AppState) -> Self {
        state.inner.mailer.clone()
    }
}

impl FromRef<AppState> for Templates {
    fn from_ref(state: &AppState) -> Self {
        state.inner.templates.clone()
    }
}

#[derive(Debug, Default)]
pub struct AppStateBuilder {
    config: Option<AppConfig>,
    database: Option<Database>,
    mailer: Option<Mailer>,
    templates: Option<Templates>,
}

impl AppStateBuilder {
    pub fn config(mut self, config: AppConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn db(mut self, database: Database) -> Self {
        self.database = Some(database);
        self
    }

    pub fn mailer(mut self, mailer: Mailer) -> Self {
        self.mailer = Some(mailer);
        self
    }

    pub fn templates(mut self, templates: Templates) -> Self {
        self.templates = Some(templates);
        self
    }

    /// Finalizes the state.
    ///
    /// # Errors
    /// Returns [`AppStateError::Validation`] when a collaborator is missing.
    pub fn build(self) -> Result<AppState, AppStateError> {
        let config = self.config.ok_or_else(|| AppStateError::Validation {
            message: "AppConfig not provided".to_owned(),
        })?;
        let database = self.database.ok_or_else(|| AppStateError::Validation {
            message: "Database not provided".to_owned(),
        })?;
        let mailer = self.mailer.ok_or_else(|| AppStateError::Validation {
            message: "Mailer not provided".to_owned(),
        })?;
        let templates = self.templates.ok_or_else(|| AppStateError::Validation {
            message: "Templates not provided".to_owned(),
        })?;

        Ok(AppState { inner: Arc::new(AppStateInner { config, database, mailer, templates }) })
    }
}
