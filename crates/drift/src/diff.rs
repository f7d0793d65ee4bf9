//! The change engine: what is new, what changed, what disappeared.
//!
//! Each extracted statement is compared against the catalog by hash and by
//! `(kind, name)`. Matching text anywhere in the catalog means unchanged,
//! a known name with different text means changed, everything else is new.
//! Catalog entries that match no current statement by either hash or name
//! have been removed from the source tree.

use crate::ast;
use crate::catalog::{Catalog, CatalogStatement};
use crate::statement::{ParsedStmt, StmtStatus};
use crate::{Error, Result};

/// The status table.
///
/// A hash hit is always unchanged, even under a different name: a rename
/// without a text change is not a migration. A name hit without a hash hit
/// is a changed declaration.
pub fn classify_status(name_found: bool, hash_found: bool) -> StmtStatus {
    match (name_found, hash_found) {
        (_, true) => StmtStatus::Unchanged,
        (true, false) => StmtStatus::Changed,
        (false, false) => StmtStatus::New,
    }
}

/// Assign a status to every statement, fetching the previous version of
/// changed declarations for the diff block.
pub async fn resolve_statuses(catalog: &Catalog<'_>, stmts: &mut [ParsedStmt]) -> Result<()> {
    for stmt in stmts.iter_mut() {
        let hash_found = catalog.is_hash_present(&stmt.hash).await?;
        let name_found = if stmt.has_name() {
            catalog.is_name_present(stmt.kind, &stmt.name).await?
        } else {
            false
        };

        stmt.status = classify_status(name_found, hash_found);

        if stmt.status == StmtStatus::Changed {
            let prev = catalog.stmt_text(stmt.kind, &stmt.name).await?;
            stmt.prev_raw = Some(ast::parse_single(&prev)?);
        }
    }
    Ok(())
}

/// Catalog entries whose hash and name both fail to match any current
/// statement. The caller deletes them as it emits the removal blocks.
pub async fn removed_statements(
    catalog: &Catalog<'_>,
    stmts: &[ParsedStmt],
) -> Result<Vec<CatalogStatement>> {
    let mut removed = Vec::new();

    for row in catalog.statements().await? {
        let hash_found = stmts.iter().any(|s| s.hash == row.hash);
        let name_found = match row.name.as_deref() {
            Some(name) => stmts.iter().any(|s| s.has_name() && s.name == name),
            None => false,
        };

        if !hash_found && !name_found {
            removed.push(row);
        }
    }

    Ok(removed)
}

/// Whether anything at all needs to go into a migration file.
///
/// A statement still carrying [`StmtStatus::Unknown`] after extraction is a
/// classifier bug and aborts the run.
pub fn migration_required(stmts: &[ParsedStmt], removed: &[CatalogStatement]) -> Result<bool> {
    for stmt in stmts {
        if stmt.status == StmtStatus::Unknown {
            return Err(Error::UnknownStatus(stmt.describe()));
        }
    }
    Ok(!removed.is_empty() || stmts.iter().any(|s| s.status != StmtStatus::Unchanged))
}
