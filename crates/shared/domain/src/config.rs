use serde::Deserialize;
use std::net::{IpAddr, Ipv4Addr};
use std::ops::{Deref, DerefMut};
use std::path::PathBuf;
use std::sync::Arc;

/// Top-level application configuration shared across services.
#[derive(Default, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfigInner {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub mail: MailConfig,
    pub storage: StorageConfig,
    pub pages: PagesConfig,
}

/// Thin Arc-wrapped config for inexpensive cloning into subsystems.
///
/// Built once at startup, then passed by reference; no component mutates it after that.
#[derive(Default, Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(flatten, default)]
    inner: Arc<AppConfigInner>,
}

impl Deref for AppConfig {
    type Target = AppConfigInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl DerefMut for AppConfig {
    fn deref_mut(&mut self) -> &mut AppConfigInner {
        Arc::make_mut(&mut self.inner)
    }
}

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub address: IpAddr,
    pub port: u16,
    pub ssl: Option<SslConfig>,
}

/// TLS certificate/key paths.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SslConfig {
    pub cert: PathBuf,
    pub key: PathBuf,
}

/// `SurrealDB` connection configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: String,
    pub namespace: String,
    pub database: String,
    pub credentials: Option<DatabaseCredentials>,
}

/// `SurrealDB` root credentials (optional when using unauthenticated engines like mem://).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseCredentials {
    pub username: String,
    pub password: String,
}

/// Outbound mail (SMTP) configuration.
///
/// Credentials come from environment overrides (`DOORSTEP__MAIL__CREDENTIALS__*`),
/// never from the checked-in config file.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MailConfig {
    pub host: String,
    pub port: u16,
    pub encryption: MailEncryption,
    pub credentials: Option<MailCredentials>,
    pub sender_name: String,
    pub sender_address: String,
    /// Build notifications but skip actual delivery (test/dev environments).
    pub suppress_send: bool,
    /// Bound for the dispatcher queue; enqueueing past it is an error, not a stall.
    pub queue_capacity: usize,
}

/// Wire security for the SMTP connection.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MailEncryption {
    None,
    #[default]
    Starttls,
    Tls,
}

/// SMTP credentials.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MailCredentials {
    pub username: String,
    pub password: String,
}

/// Filesystem roots (static assets, uploads, page templates).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub static_dir: PathBuf,
    pub uploads_dir: PathBuf,
    pub templates_dir: PathBuf,
}

/// Content knobs for the rendered pages.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PagesConfig {
    /// Names shown on the index page.
    pub known_names: Vec<String>,
}

// --- Default ---

impl Default for ServerConfig {
    fn default() -> Self {
        Self { address: IpAddr::V4(Ipv4Addr::UNSPECIFIED), port: 8807, ssl: None }
    }
}

impl Default for SslConfig {
    fn default() -> Self {
        Self { cert: PathBuf::from("cert.pem"), key: PathBuf::from("key.pem") }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "mem://".to_owned(),
            namespace: "doorstep".to_owned(),
            database: "core".to_owned(),
            credentials: None,
        }
    }
}

impl Default for DatabaseCredentials {
    fn default() -> Self {
        Self { username: "root".to_owned(), password: "root".to_owned() }
    }
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            host: "smtp.googlemail.com".to_owned(),
            port: 587,
            encryption: MailEncryption::Starttls,
            credentials: None,
            sender_name: "Doorstep".to_owned(),
            sender_address: "no-reply@doorstep.local".to_owned(),
            suppress_send: false,
            queue_capacity: 64,
        }
    }
}

impl Default for MailCredentials {
    fn default() -> Self {
        Self { username: String::new(), password: String::new() }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            static_dir: PathBuf::from("static"),
            uploads_dir: PathBuf::from("static/uploads"),
            templates_dir: PathBuf::from("templates"),
        }
    }
}

impl Default for PagesConfig {
    fn default() -> Self {
        Self {
            known_names: vec!["john".to_owned(), "jane".to_owned(), "tomas".to_owned()],
        }
    }
}
