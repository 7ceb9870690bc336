//! # Mailer
//!
//! The notification pipeline: renders a text/HTML body pair from a named
//! template, builds a [`Notification`] value object, and hands it to a bounded
//! background dispatcher so the request path never waits on SMTP.
//!
//! The transport is an injected capability ([`MailTransport`]); production uses
//! [`SmtpTransport`], tests inject doubles.
//!
//! ## Example
//!
//! ```rust,no_run
//! use doorstep_domain::config::MailConfig;
//! use doorstep_mailer::Mailer;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), doorstep_mailer::MailerError> {
//!     let mailer = Mailer::builder()
//!         .config(MailConfig::default())
//!         .templates_dir("templates")
//!         .build()?;
//!
//!     let handle = mailer.send("Hello, Jane", vec!["jane@example.com".into()], "confirm")?;
//!     // Optional: observe the outcome. Dropping the handle is fire-and-forget.
//!     handle.join().await?;
//!     Ok(())
//! }
//! ```

mod dispatch;
mod error;
mod templates;
mod transport;

pub use dispatch::{DispatchHandle, Dispatcher, FailureCallback};
pub use error::MailerError;
pub use templates::MessageTemplates;
pub use transport::{MailTransport, SmtpTransport};

use doorstep_domain::config::MailConfig;
use doorstep_domain::notify::Notification;
use minijinja::context;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// The notification entry point shared across request handlers.
///
/// Cheap to clone; all state lives behind an `Arc`.
#[derive(Debug, Clone)]
pub struct Mailer {
    inner: Arc<MailerInner>,
}

#[derive(Debug)]
struct MailerInner {
    templates: MessageTemplates,
    dispatcher: Dispatcher,
}

impl Mailer {
    /// Returns a new [`MailerBuilder`].
    pub fn builder() -> MailerBuilder {
        MailerBuilder::default()
    }

    /// Renders the `{template_name}.txt`/`.html` pair, builds a [`Notification`],
    /// and enqueues it. Returns immediately with a joinable handle; the caller is
    /// never blocked on delivery.
    ///
    /// # Errors
    /// Returns [`MailerError::Template`] if rendering fails and
    /// [`MailerError::QueueFull`] under back-pressure. Transport failures are not
    /// surfaced here; they reach the log, the failure callback, and the handle.
    pub fn send(
        &self,
        subject: impl Into<String>,
        recipients: Vec<String>,
        template_name: &str,
    ) -> Result<DispatchHandle, MailerError> {
        let subject = subject.into();

        let (body_text, body_html) = self.inner.templates.render_pair(
            template_name,
            context! { subject => subject.clone(), recipients => recipients.clone() },
        )?;

        let notification = Notification::new(subject, recipients, body_text, body_html);
        self.inner.dispatcher.enqueue(notification)
    }
}

/// A fluent builder for the [`Mailer`].
///
/// Must be built on a tokio runtime: it spawns the dispatcher worker.
#[must_use = "builders do nothing unless you call .build()"]
#[derive(Default)]
pub struct MailerBuilder {
    config: MailConfig,
    templates_dir: Option<PathBuf>,
    transport: Option<Arc<dyn MailTransport>>,
    on_failure: Option<FailureCallback>,
}

impl std::fmt::Debug for MailerBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MailerBuilder")
            .field("config", &self.config)
            .field("templates_dir", &self.templates_dir)
            .field("transport", &self.transport)
            .finish_non_exhaustive()
    }
}

impl MailerBuilder {
    /// Sets the mail configuration.
    pub fn config(mut self, config: MailConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the directory holding the message template pairs.
    pub fn templates_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.templates_dir = Some(dir.into());
        self
    }

    /// Injects a transport, replacing the SMTP client built from the config.
    pub fn transport(mut self, transport: Arc<dyn MailTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Registers an observer for failed deliveries.
    pub fn on_failure(mut self, callback: FailureCallback) -> Self {
        self.on_failure = Some(callback);
        self
    }

    /// Builds the mailer and spawns its dispatcher worker.
    ///
    /// # Errors
    /// Returns [`MailerError::InvalidConfiguration`] or [`MailerError::Address`]
    /// when the SMTP transport cannot be constructed from the config.
    pub fn build(self) -> Result<Mailer, MailerError> {
        let templates_dir = self.templates_dir.unwrap_or_else(|| PathBuf::from("templates"));
        let templates = MessageTemplates::load(&templates_dir);

        let transport: Arc<dyn MailTransport> = match self.transport {
            Some(transport) => transport,
            None => Arc::new(SmtpTransport::from_config(&self.config)?),
        };

        let dispatcher = Dispatcher::spawn(
            transport,
            self.config.queue_capacity,
            self.config.suppress_send,
            self.on_failure,
        );

        info!(
            host = %self.config.host,
            port = self.config.port,
            suppress = self.config.suppress_send,
            capacity = self.config.queue_capacity,
            "Mailer initialized"
        );

        Ok(Mailer { inner: Arc::new(MailerInner { templates, dispatcher }) })
    }
}
