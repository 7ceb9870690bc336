use crate::error::MailerError;
use doorstep_domain::config::{MailConfig, MailEncryption};
use doorstep_domain::notify::Notification;
use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport as SmtpClient, Transport};
use std::fmt;

/// An injected mail-delivery capability.
///
/// `deliver` may block; the dispatcher always calls it from a blocking-safe
/// context, never from a request handler.
pub trait MailTransport: fmt::Debug + Send + Sync + 'static {
    /// Performs the actual delivery of one notification.
    ///
    /// # Errors
    /// Returns [`MailerError::Transport`] (or [`MailerError::Address`]) when the
    /// message cannot be built or handed to the server.
    fn deliver(&self, notification: &Notification) -> Result<(), MailerError>;
}

/// SMTP delivery via `lettre`, configured from [`MailConfig`].
pub struct SmtpTransport {
    client: SmtpClient,
    sender: Mailbox,
}

impl fmt::Debug for SmtpTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmtpTransport").field("sender", &self.sender).finish_non_exhaustive()
    }
}

impl SmtpTransport {
    /// Builds the SMTP client for the configured host, port, and wire security.
    ///
    /// # Errors
    /// Returns [`MailerError::InvalidConfiguration`] for an unusable relay host
    /// and [`MailerError::Address`] for an unparseable sender identity.
    pub fn from_config(cfg: &MailConfig) -> Result<Self, MailerError> {
        let builder = match cfg.encryption {
            MailEncryption::Tls => SmtpClient::relay(&cfg.host),
            MailEncryption::Starttls => SmtpClient::starttls_relay(&cfg.host),
            MailEncryption::None => Ok(SmtpClient::builder_dangerous(&cfg.host)),
        }
        .map_err(|e| MailerError::InvalidConfiguration {
            message: format!("SMTP relay '{}': {e}", cfg.host),
        })?;

        let mut builder = builder.port(cfg.port);
        if let Some(creds) = &cfg.credentials {
            builder =
                builder.credentials(Credentials::new(creds.username.clone(), creds.password.clone()));
        }

        let sender = parse_mailbox(&cfg.sender_name, &cfg.sender_address)?;

        Ok(Self { client: builder.build(), sender })
    }
}

impl MailTransport for SmtpTransport {
    fn deliver(&self, notification: &Notification) -> Result<(), MailerError> {
        let mut builder =
            Message::builder().from(self.sender.clone()).subject(&notification.subject);

        for recipient in &notification.recipients {
            builder = builder.to(parse_address(recipient)?);
        }

        let message = builder
            .multipart(MultiPart::alternative_plain_html(
                notification.body_text.clone(),
                notification.body_html.clone(),
            ))
            .map_err(|e| MailerError::Transport { message: format!("Message build: {e}") })?;

        self.client
            .send(&message)
            .map_err(|e| MailerError::Transport { message: e.to_string() })?;

        Ok(())
    }
}

/// Parses a display-name + address pair into a mailbox.
pub(crate) fn parse_mailbox(name: &str, address: &str) -> Result<Mailbox, MailerError> {
    format!("{name} <{address}>").parse().map_err(|e| MailerError::Address {
        address: address.to_owned(),
        message: format!("{e}"),
    })
}

/// Parses a bare recipient address.
pub(crate) fn parse_address(address: &str) -> Result<Mailbox, MailerError> {
    address.parse().map_err(|e| MailerError::Address {
        address: address.to_owned(),
        message: format!("{e}"),
    })
}
