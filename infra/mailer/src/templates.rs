use crate::error::MailerError;
use minijinja::{Environment, path_loader};
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;

/// The template collaborator for message bodies.
///
/// A logical name resolves to the artifact pair `{name}.txt` / `{name}.html`
/// inside the configured directory.
#[derive(Debug, Clone)]
pub struct MessageTemplates {
    env: Arc<Environment<'static>>,
}

impl MessageTemplates {
    /// Builds an environment that resolves templates from `dir` on demand.
    pub fn load(dir: impl AsRef<Path>) -> Self {
        let mut env = Environment::new();
        env.set_loader(path_loader(dir.as_ref()));
        Self { env: Arc::new(env) }
    }

    /// Renders the text and HTML bodies for `name` with a shared context.
    ///
    /// # Errors
    /// Returns [`MailerError::Template`] if either artifact is missing or fails
    /// to render.
    pub fn render_pair(
        &self,
        name: &str,
        ctx: impl Serialize,
    ) -> Result<(String, String), MailerError> {
        let body_text = self.env.get_template(&format!("{name}.txt"))?.render(&ctx)?;
        let body_html = self.env.get_template(&format!("{name}.html"))?.render(&ctx)?;
        Ok((body_text, body_html))
    }
}
