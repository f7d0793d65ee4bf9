//! The two top-level operations: compute the next migration file (`make`)
//! and apply the pending ones (`migrate`).

use std::fs;
use std::path::PathBuf;

use tokio_postgres::Transaction;
use tracing::info;

use crate::catalog::Catalog;
use crate::statement::ParsedStmt;
use crate::{apply, ast, diff, emit, extract, graph, source, Error, Result};

/// One invocation of the tool, scoped to a single transaction.
///
/// Every catalog write performed through this handle commits or rolls back
/// with the transaction passed to [`Migrator::new`].
pub struct Migrator<'a> {
    catalog: Catalog<'a>,
    sql_path: PathBuf,
    migrations_path: PathBuf,
}

impl<'a> Migrator<'a> {
    pub fn new(
        tx: &'a Transaction<'a>,
        sql_path: impl Into<PathBuf>,
        migrations_path: impl Into<PathBuf>,
    ) -> Self {
        Migrator {
            catalog: Catalog::new(tx),
            sql_path: sql_path.into(),
            migrations_path: migrations_path.into(),
        }
    }

    /// Create the migrations directory and the control schema if needed.
    pub async fn init(&self) -> Result<()> {
        fs::create_dir_all(&self.migrations_path)?;
        self.catalog.init().await
    }

    /// Parse and classify every statement under the SQL path, hydrated and
    /// ready for sorting.
    async fn load_statements(&self) -> Result<Vec<ParsedStmt>> {
        let mut stmts = Vec::new();

        for file in source::sql_files(&self.sql_path)? {
            info!("processing file {}", file.display());
            let text = fs::read_to_string(&file)?;
            let parsed = ast::parse_sql(&text).map_err(|source| Error::Syntax {
                path: file.clone(),
                source,
            })?;
            stmts.extend(extract::extract_statements(parsed)?);
        }

        info!("building dependency graph");
        graph::hydrate_dependencies(&mut stmts);

        Ok(stmts)
    }

    /// Diff the source tree against the catalog and write the next migration
    /// file. Returns the file name, or `None` when there is nothing to do.
    pub async fn make(&self) -> Result<Option<String>> {
        apply::verify_catalog_invariants(&self.catalog, &self.migrations_path).await?;

        let mut stmts = self.load_statements().await?;
        diff::resolve_statuses(&self.catalog, &mut stmts).await?;
        let removed = diff::removed_statements(&self.catalog, &stmts).await?;

        if !diff::migration_required(&stmts, &removed)? {
            info!("no migrations required");
            return Ok(None);
        }

        let order = graph::emission_order(&stmts)?;
        let (file_name, count) = emit::write_migration(
            &self.catalog,
            &stmts,
            &order,
            &removed,
            &self.migrations_path,
        )
        .await?;

        info!("{count} migrations written to {file_name}");
        Ok(Some(file_name))
    }

    /// Execute every pending migration file. Returns the applied file names.
    pub async fn migrate(&self) -> Result<Vec<String>> {
        apply::verify_catalog_invariants(&self.catalog, &self.migrations_path).await?;

        let pending = apply::pending_migrations(&self.catalog, &self.migrations_path).await?;
        if pending.is_empty() {
            info!("all migrations have already been executed");
            return Ok(Vec::new());
        }

        apply::apply_pending(&self.catalog, &self.migrations_path).await
    }
}
