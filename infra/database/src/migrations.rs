use crate::error::DatabaseError;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use surrealdb::Surreal;
use surrealdb::engine::any::Any;
use tracing::{info, warn};

/// A versioned schema change with an upgrade/downgrade script pair.
#[derive(Debug)]
pub(crate) struct Migration {
    pub version: &'static str,
    pub name: &'static str,
    pub up: &'static str,
    pub down: &'static str,
}

/// Built-in migrations, applied in order. Versions are lexicographically sortable.
pub(crate) const MIGRATIONS: &[Migration] = &[Migration {
    version: "0001",
    name: "roles-and-users",
    up: "
        DEFINE TABLE roles SCHEMAFULL;
        DEFINE FIELD name ON roles TYPE string;
        DEFINE INDEX roles_name ON roles FIELDS name UNIQUE;

        DEFINE TABLE users SCHEMAFULL;
        DEFINE FIELD username ON users TYPE string;
        DEFINE FIELD role_id ON users TYPE option<record<roles>>;
        DEFINE INDEX users_username ON users FIELDS username UNIQUE;
    ",
    down: "
        REMOVE TABLE users;
        REMOVE TABLE roles;
    ",
}];

#[derive(Debug, Default)]
pub(crate) struct MigrationReport {
    pub applied: Vec<String>,
    pub skipped: Vec<String>,
    pub reverted: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct AppliedMigration {
    version: String,
    checksum: String,
}

/// Computes the checksum recorded alongside an applied migration.
pub(crate) fn checksum(script: &str) -> String {
    let digest = Sha256::digest(script.as_bytes());
    format!("{digest:x}")
}

#[derive(Debug)]
pub(crate) struct MigrationRunner {
    db: Surreal<Any>,
}

impl MigrationRunner {
    pub(crate) const fn new(db: Surreal<Any>) -> Self {
        Self { db }
    }

    /// Applies all pending migrations, verifying checksums of already-applied ones.
    pub(crate) async fn run(&self) -> Result<MigrationReport, DatabaseError> {
        let mut report = MigrationReport::default();
        let applied = self.applied_map().await?;

        for migration in MIGRATIONS {
            let computed = checksum(migration.up);
            if let Some(recorded) = applied.get(migration.version) {
                if *recorded != computed {
                    return Err(DatabaseError::ChecksumMismatch {
                        version: migration.version.to_owned(),
                        recorded: recorded.clone(),
                        computed,
                    });
                }
                report.skipped.push(migration.version.to_owned());
                continue;
            }

            self.apply(migration, &computed).await?;
            info!(version = migration.version, name = migration.name, "Migration applied");
            report.applied.push(migration.version.to_owned());
        }

        Ok(report)
    }

    /// Rolls back the newest applied migration using its `down` script.
    pub(crate) async fn revert(&self) -> Result<MigrationReport, DatabaseError> {
        let applied = self.applied_map().await?;

        let Some(migration) =
            MIGRATIONS.iter().rev().find(|m| applied.contains_key(m.version))
        else {
            return Err(DatabaseError::Migration {
                message: "No applied migrations to revert".to_owned(),
            });
        };

        let query = format!(
            "BEGIN TRANSACTION;
            {}
            DELETE migration WHERE version = $version;
            COMMIT TRANSACTION;",
            migration.down,
        );

        self.db.query(&query).bind(("version", migration.version)).await?.check()?;

        warn!(version = migration.version, name = migration.name, "Migration reverted");

        let mut report = MigrationReport::default();
        report.reverted.push(migration.version.to_owned());
        Ok(report)
    }

    async fn apply(&self, migration: &Migration, checksum: &str) -> Result<(), DatabaseError> {
        let query = format!(
            "BEGIN TRANSACTION;
            {}
            CREATE migration CONTENT {{
                version: $version,
                name: $name,
                checksum: $checksum,
                applied_at: time::now()
            }};
            COMMIT TRANSACTION;",
            migration.up,
        );

        self.db
            .query(&query)
            .bind(("version", migration.version))
            .bind(("name", migration.name))
            .bind(("checksum", checksum.to_owned()))
            .await?
            .check()?;

        Ok(())
    }

    async fn applied_map(&self) -> Result<HashMap<String, String>, DatabaseError> {
        let mut response = self
            .db
            .query("SELECT version, checksum FROM migration ORDER BY version")
            .await?;

        let rows: Vec<AppliedMigration> = response.take(0)?;
        Ok(rows.into_iter().map(|row| (row.version, row.checksum)).collect())
    }
}
