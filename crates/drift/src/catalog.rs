//! The control catalog persisted in the `drift_ctl` schema.
//!
//! Two tables: `migrations` records every applied migration file with its
//! hash, `statements` holds the canonical text of every declaration a written
//! migration has covered. All operations run on the invocation-wide
//! transaction, so a failed run leaves the catalog untouched.

use tokio_postgres::Transaction;

use crate::statement::{ParsedStmt, StmtKind};
use crate::{Error, Result};

/// DDL for the control schema, applied idempotently at startup.
pub const CONTROL_SCHEMA_SQL: &str = r#"
create schema if not exists drift_ctl;

create table if not exists drift_ctl.migrations (
    file_name text primary key not null,
    file_hash text not null,
    created timestamp default now()
);

create table if not exists drift_ctl.statements (
    id serial primary key,
    stmt text not null,
    stmt_hash text unique not null,
    stmt_type integer not null,
    stmt_name text default null,
    created timestamp default now(),
    updated timestamp default now()
);

create index if not exists statements_stmt_hash on drift_ctl.statements (stmt_hash);
"#;

/// One row of `drift_ctl.migrations`.
#[derive(Debug, Clone)]
pub struct AppliedMigration {
    pub file_name: String,
    pub file_hash: String,
}

/// One row of `drift_ctl.statements`.
#[derive(Debug, Clone)]
pub struct CatalogStatement {
    pub text: String,
    pub hash: String,
    pub name: Option<String>,
}

/// Handle to the control catalog, scoped to one transaction.
pub struct Catalog<'a> {
    tx: &'a Transaction<'a>,
}

impl<'a> Catalog<'a> {
    pub fn new(tx: &'a Transaction<'a>) -> Self {
        Catalog { tx }
    }

    /// Create the control schema if it does not exist yet.
    pub async fn init(&self) -> Result<()> {
        self.tx.batch_execute(CONTROL_SCHEMA_SQL).await?;
        Ok(())
    }

    pub async fn is_hash_present(&self, hash: &str) -> Result<bool> {
        let rows = self
            .tx
            .query(
                "select 1 from drift_ctl.statements where stmt_hash = $1",
                &[&hash],
            )
            .await?;
        Ok(!rows.is_empty())
    }

    pub async fn is_name_present(&self, kind: StmtKind, name: &str) -> Result<bool> {
        let stmt_type = kind.as_i32();
        let rows = self
            .tx
            .query(
                "select 1 from drift_ctl.statements where stmt_name = $1 and stmt_type = $2",
                &[&name, &stmt_type],
            )
            .await?;
        Ok(!rows.is_empty())
    }

    /// The previously recorded text of a named declaration.
    pub async fn stmt_text(&self, kind: StmtKind, name: &str) -> Result<String> {
        let stmt_type = kind.as_i32();
        let rows = self
            .tx
            .query(
                "select stmt from drift_ctl.statements where stmt_name = $1 and stmt_type = $2",
                &[&name, &stmt_type],
            )
            .await?;
        rows.first()
            .map(|row| row.get(0))
            .ok_or_else(|| Error::Catalog(format!("no recorded statement for {kind:?} {name}")))
    }

    /// Register a statement; a hash already present is left as is.
    pub async fn insert_stmt(&self, stmt: &ParsedStmt) -> Result<()> {
        let stmt_type = stmt.kind.as_i32();
        let name = stmt.has_name().then_some(stmt.name.as_str());
        self.tx
            .execute(
                "insert into drift_ctl.statements (stmt, stmt_hash, stmt_type, stmt_name) \
                 values ($1, $2, $3, $4) on conflict (stmt_hash) do nothing",
                &[&stmt.canonical, &stmt.hash, &stmt_type, &name],
            )
            .await?;
        Ok(())
    }

    /// Replace the recorded text and hash of a named declaration.
    pub async fn update_stmt(&self, stmt: &ParsedStmt) -> Result<()> {
        let stmt_type = stmt.kind.as_i32();
        self.tx
            .execute(
                "update drift_ctl.statements set stmt = $1, stmt_hash = $2, updated = now() \
                 where stmt_name = $3 and stmt_type = $4",
                &[&stmt.canonical, &stmt.hash, &stmt.name, &stmt_type],
            )
            .await?;
        Ok(())
    }

    pub async fn delete_stmt_by_hash(&self, hash: &str) -> Result<()> {
        self.tx
            .execute(
                "delete from drift_ctl.statements where stmt_hash = $1",
                &[&hash],
            )
            .await?;
        Ok(())
    }

    pub async fn statements(&self) -> Result<Vec<CatalogStatement>> {
        let rows = self
            .tx
            .query(
                "select stmt, stmt_hash, stmt_name from drift_ctl.statements",
                &[],
            )
            .await?;
        Ok(rows
            .iter()
            .map(|row| CatalogStatement {
                text: row.get(0),
                hash: row.get(1),
                name: row.get(2),
            })
            .collect())
    }

    pub async fn applied_migrations(&self) -> Result<Vec<AppliedMigration>> {
        let rows = self
            .tx
            .query(
                "select file_name, file_hash from drift_ctl.migrations",
                &[],
            )
            .await?;
        Ok(rows
            .iter()
            .map(|row| AppliedMigration {
                file_name: row.get(0),
                file_hash: row.get(1),
            })
            .collect())
    }

    pub async fn record_applied_migration(&self, file_name: &str, file_hash: &str) -> Result<()> {
        self.tx
            .execute(
                "insert into drift_ctl.migrations (file_name, file_hash) values ($1, $2)",
                &[&file_name, &file_hash],
            )
            .await?;
        Ok(())
    }

    /// Execute a migration file's contents as a single statement batch.
    pub async fn execute_batch(&self, sql: &str) -> Result<()> {
        self.tx.batch_execute(sql).await?;
        Ok(())
    }
}
