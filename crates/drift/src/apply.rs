//! Applying pending migration files.
//!
//! Before any work happens the catalog invariants are checked: no migration
//! file may still carry the resolve sentinel, and every already-applied file
//! must hash to the value recorded when it was applied. Pending files then
//! run in lexical order inside the invocation transaction; each successful
//! file is recorded before the next one starts, and the whole batch commits
//! or rolls back together.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::catalog::Catalog;
use crate::emit::RESOLVE_SENTINEL;
use crate::{fingerprint, source, Error, Result};

/// Whether a migration file still carries the resolve sentinel on a line of
/// its own.
pub fn has_unresolved_marker(contents: &str) -> bool {
    contents.lines().any(|line| line == RESOLVE_SENTINEL)
}

/// Migration files that still contain the sentinel.
pub fn unresolved_migrations(dir: &Path) -> Result<Vec<String>> {
    let mut unresolved = Vec::new();
    for file in source::sql_files(dir)? {
        if has_unresolved_marker(&fs::read_to_string(&file)?) {
            unresolved.push(file.display().to_string());
        }
    }
    Ok(unresolved)
}

/// Applied migration files whose current hash no longer matches the hash
/// recorded at apply time.
pub async fn tampered_migrations(catalog: &Catalog<'_>, dir: &Path) -> Result<Vec<String>> {
    let mut tampered = Vec::new();
    for applied in catalog.applied_migrations().await? {
        let path = dir.join(&applied.file_name);
        if fingerprint::hash_file(&path)? != applied.file_hash {
            tampered.push(path.display().to_string());
        }
    }
    Ok(tampered)
}

/// Gate shared by `make` and `migrate`: refuse to do anything while
/// unresolved or tampered migrations exist.
pub async fn verify_catalog_invariants(catalog: &Catalog<'_>, dir: &Path) -> Result<()> {
    let unresolved = unresolved_migrations(dir)?;
    if !unresolved.is_empty() {
        return Err(Error::UnresolvedMigrations(unresolved));
    }

    let tampered = tampered_migrations(catalog, dir).await?;
    if !tampered.is_empty() {
        return Err(Error::TamperedMigrations(tampered));
    }

    Ok(())
}

/// Migration files not yet recorded as applied, in lexical order.
pub async fn pending_migrations(catalog: &Catalog<'_>, dir: &Path) -> Result<Vec<PathBuf>> {
    let applied = catalog.applied_migrations().await?;

    let mut pending = Vec::new();
    for file in source::sql_files(dir)? {
        let name = file_name(&file);
        if !applied.iter().any(|a| a.file_name == name) {
            pending.push(file);
        }
    }
    Ok(pending)
}

/// Execute every pending file and record it. Returns the applied file names.
pub async fn apply_pending(catalog: &Catalog<'_>, dir: &Path) -> Result<Vec<String>> {
    let pending = pending_migrations(catalog, dir).await?;

    let mut applied = Vec::new();
    for file in pending {
        info!("executing {}", file.display());
        let code = fs::read_to_string(&file)?;
        catalog.execute_batch(&code).await?;

        let name = file_name(&file);
        catalog
            .record_applied_migration(&name, &fingerprint::hash_file(&file)?)
            .await?;
        applied.push(name);
    }

    Ok(applied)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}
