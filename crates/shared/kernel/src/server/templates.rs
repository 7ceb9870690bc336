use axum::response::Html;
use minijinja::{Environment, path_loader};
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;

/// The page-template collaborator.
///
/// Templates are resolved by filename (`register.html`, `404.html`, ...) from the
/// configured directory. Cheap to clone and share across handlers.
#[derive(Debug, Clone)]
pub struct Templates {
    env: Arc<Environment<'static>>,
}

impl Templates {
    /// Builds an environment resolving templates from `dir` on demand.
    pub fn load(dir: impl AsRef<Path>) -> Self {
        let mut env = Environment::new();
        env.set_loader(path_loader(dir.as_ref()));
        Self { env: Arc::new(env) }
    }

    /// Renders `name` with the given context.
    ///
    /// # Errors
    /// Returns the `minijinja` error for missing templates or render failures.
    pub fn render(&self, name: &str, ctx: impl Serialize) -> Result<String, minijinja::Error> {
        self.env.get_template(name)?.render(&ctx)
    }

    /// Renders `name` into an HTML response body.
    ///
    /// # Errors
    /// Returns the `minijinja` error for missing templates or render failures.
    pub fn html(&self, name: &str, ctx: impl Serialize) -> Result<Html<String>, minijinja::Error> {
        self.render(name, ctx).map(Html)
    }
}
