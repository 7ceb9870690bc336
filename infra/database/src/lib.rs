//! # Database Infrastructure
//!
//! This crate provides a unified interface for initializing and managing [SurrealDB](https://surrealdb.com)
//! connections, the `roles`/`users` schema, and its versioned migrations.
//!
//! ## Key Features
//! - **Engine Agnostic**: Supports `mem://`, `ws://`, and `http://` via the `any` engine.
//! - **Resilient Connectivity**: Built-in retry logic for health checks during engine startup.
//! - **Reversible Migrations**: Checksummed upgrade/downgrade pairs, applied transactionally.
//!
//! ## Example
//!
//! ```rust
//! use doorstep_database::{Database, DatabaseError};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), DatabaseError> {
//!     let db = Database::builder()
//!         .url("mem://")
//!         .session("doorstep", "core")
//!         .init()
//!         .await?;
//!
//!     let role = db.create_role("admin").await?;
//!     let user = db.create_user("janedoe", Some(&role.id)).await?;
//!     assert_eq!(user.role_id, Some(role.id));
//!
//!     Ok(())
//! }
//! ```

mod error;
mod migrations;
mod records;

pub use error::DatabaseError;
pub use records::{RoleRecord, UserRecord};

use migrations::MigrationRunner;
use records::{NewRole, NewUser};
use std::ops::Deref;
use std::sync::Arc;
use std::time::Duration;
use surrealdb::engine::any::{Any, connect};
use surrealdb::opt::auth::Root;
use surrealdb::{RecordId, Surreal};
use tracing::{info, warn};

/// How many times the builder probes engine health before giving up.
const HEALTH_RETRIES: usize = 5;
const HEALTH_RETRY_DELAY: Duration = Duration::from_millis(300);

/// Inner state of the [`Database`] wrapper.
#[derive(Debug)]
pub struct DatabaseInner {
    instance: Surreal<Any>,
    ns: String,
    db: String,
}

impl Drop for DatabaseInner {
    fn drop(&mut self) {
        info!(ns = %self.ns, db = %self.db, "SurrealDB session handle dropped");
    }
}

/// `SurrealDB` client wrapper that provides thread-safety and contextual error handling.
#[derive(Debug, Clone)]
pub struct Database {
    inner: Arc<DatabaseInner>,
}

impl Deref for Database {
    type Target = Surreal<Any>;

    fn deref(&self) -> &Self::Target {
        &self.inner.instance
    }
}

impl Database {
    /// Creates a new [`DatabaseBuilder`].
    pub fn builder() -> DatabaseBuilder {
        DatabaseBuilder::new()
    }

    /// Inserts a role. The `roles_name` unique index rejects duplicates.
    ///
    /// # Errors
    /// Returns [`DatabaseError::Driver`] on index violations or connection loss.
    pub async fn create_role(&self, name: &str) -> Result<RoleRecord, DatabaseError> {
        let created: Option<RoleRecord> = self
            .inner
            .instance
            .create("roles")
            .content(NewRole { name: name.to_owned() })
            .await?;

        created.ok_or_else(|| DatabaseError::Migration {
            message: format!("Role '{name}' was not returned after insert"),
        })
    }

    /// Inserts a user with an optional foreign-key reference to a role.
    ///
    /// # Errors
    /// Returns [`DatabaseError::Driver`] if the unique `username` index rejects the row.
    pub async fn create_user(
        &self,
        username: &str,
        role_id: Option<&RecordId>,
    ) -> Result<UserRecord, DatabaseError> {
        let created: Option<UserRecord> = self
            .inner
            .instance
            .create("users")
            .content(NewUser { username: username.to_owned(), role_id: role_id.cloned() })
            .await?;

        created.ok_or_else(|| DatabaseError::Migration {
            message: format!("User '{username}' was not returned after insert"),
        })
    }

    /// Looks a user up through the unique `username` index.
    ///
    /// # Errors
    /// Returns [`DatabaseError::Driver`] on query failure.
    pub async fn find_user_by_username(
        &self,
        username: &str,
    ) -> Result<Option<UserRecord>, DatabaseError> {
        let mut response = self
            .inner
            .instance
            .query("SELECT * FROM users WHERE username = $username")
            .bind(("username", username.to_owned()))
            .await?;

        let mut rows: Vec<UserRecord> = response.take(0)?;
        Ok(rows.pop())
    }

    /// All users whose `role_id` points at the given role. Membership is a value
    /// join, the role row itself carries no user list.
    ///
    /// # Errors
    /// Returns [`DatabaseError::Driver`] on query failure.
    pub async fn users_in_role(&self, role_id: &RecordId) -> Result<Vec<UserRecord>, DatabaseError> {
        let mut response = self
            .inner
            .instance
            .query("SELECT * FROM users WHERE role_id = $role_id ORDER BY username")
            .bind(("role_id", role_id.clone()))
            .await?;

        let rows: Vec<UserRecord> = response.take(0)?;
        Ok(rows)
    }

    /// Re-checks the applied migration ledger against the built-in scripts and
    /// applies anything still pending.
    ///
    /// `init` already does this once; call it again to detect a ledger that was
    /// modified behind the runner's back.
    ///
    /// # Errors
    /// Returns [`DatabaseError::ChecksumMismatch`] when a recorded checksum no
    /// longer matches its script.
    pub async fn verify_migrations(&self) -> Result<(), DatabaseError> {
        let runner = MigrationRunner::new(self.inner.instance.clone());
        runner.run().await?;
        Ok(())
    }

    /// Rolls back the newest applied migration (schema downgrade).
    ///
    /// # Errors
    /// Returns [`DatabaseError::Migration`] when nothing is applied.
    pub async fn revert_last_migration(&self) -> Result<(), DatabaseError> {
        let runner = MigrationRunner::new(self.inner.instance.clone());
        runner.revert().await?;
        Ok(())
    }
}

/// A fluent builder for configuring and establishing a `SurrealDB` connection.
///
/// This builder ensures that fundamental parameters like the connection URL,
/// namespace, and database name are provided upfront.
#[must_use = "builders do nothing unless you call .init()"]
#[derive(Debug, Default)]
pub struct DatabaseBuilder {
    url: Option<String>,
    ns: Option<String>,
    db: Option<String>,
    auth: Option<(String, String)>,
}

impl DatabaseBuilder {
    /// Creates a new [`DatabaseBuilder`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the connection URL.
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Sets the namespace and database name.
    pub fn session(mut self, namespace: impl Into<String>, database: impl Into<String>) -> Self {
        self.ns = Some(namespace.into());
        self.db = Some(database.into());
        self
    }

    /// Sets root credentials (optional for unauthenticated engines like `mem://`).
    pub fn auth(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.auth = Some((username.into(), password.into()));
        self
    }

    /// Connects, authenticates, selects the session, and applies pending migrations.
    ///
    /// # Errors
    /// Returns [`DatabaseError::Unavailable`] if required parameters are missing or
    /// the engine never reports healthy, and [`DatabaseError::Driver`] for any
    /// connection or migration failure.
    pub async fn init(self) -> Result<Database, DatabaseError> {
        let url = self.url.ok_or_else(|| DatabaseError::Unavailable {
            message: "Connection URL not provided".to_owned(),
        })?;
        let ns = self.ns.ok_or_else(|| DatabaseError::Unavailable {
            message: "Namespace not provided".to_owned(),
        })?;
        let db = self.db.ok_or_else(|| DatabaseError::Unavailable {
            message: "Database name not provided".to_owned(),
        })?;

        let instance = connect(&url).await?;

        wait_for_health(&instance, &url).await?;

        if let Some((username, password)) = &self.auth {
            instance
                .signin(Root { username: username.as_str(), password: password.as_str() })
                .await?;
        }

        instance.use_ns(&ns).use_db(&db).await?;

        let report = MigrationRunner::new(instance.clone()).run().await?;
        info!(
            applied = report.applied.len(),
            skipped = report.skipped.len(),
            "Database migrations up to date"
        );

        info!(%url, %ns, %db, "Database connection established");

        Ok(Database { inner: Arc::new(DatabaseInner { instance, ns, db }) })
    }
}

async fn wait_for_health(instance: &Surreal<Any>, url: &str) -> Result<(), DatabaseError> {
    for attempt in 1..=HEALTH_RETRIES {
        match instance.health().await {
            Ok(()) => return Ok(()),
            Err(e) if attempt < HEALTH_RETRIES => {
                warn!(attempt, error = %e, "Database not healthy yet, retrying");
                tokio::time::sleep(HEALTH_RETRY_DELAY).await;
            },
            Err(e) => {
                return Err(DatabaseError::Unavailable {
                    message: format!("{url} failed health check after {HEALTH_RETRIES} attempts: {e}"),
                });
            },
        }
    }

    Ok(())
}
