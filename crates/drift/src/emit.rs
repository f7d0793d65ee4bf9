//! Rendering of migration files.
//!
//! New declarations land in the file as directly runnable SQL. Changed and
//! removed declarations land as commented blocks carrying the resolve
//! sentinel; the operator edits the block into real SQL and deletes the
//! sentinel line to mark the migration as resolved.

use std::fs;
use std::path::Path;

use similar::{ChangeTag, TextDiff};

use crate::catalog::{Catalog, CatalogStatement};
use crate::source;
use crate::statement::{ParsedStmt, StmtStatus};
use crate::{Error, Result};

/// The resolve marker. Its literal presence anywhere in a migration file
/// blocks `migrate` until a human removes it.
pub const RESOLVE_SENTINEL: &str = "--- REMOVE WHEN MIGRATION RESOLVED ---";

/// Character-level diff between two statement versions, one run per line,
/// prefixed `+++` (inserted), `---` (deleted) or `@@@` (equal).
pub fn char_diff(prev: &str, new: &str) -> String {
    let diff = TextDiff::from_chars(prev, new);

    let mut runs: Vec<(ChangeTag, String)> = Vec::new();
    for change in diff.iter_all_changes() {
        match runs.last_mut() {
            Some((tag, text)) if *tag == change.tag() => text.push_str(change.value()),
            _ => runs.push((change.tag(), change.value().to_string())),
        }
    }

    let mut out = String::new();
    for (tag, text) in runs {
        let prefix = match tag {
            ChangeTag::Insert => "+++",
            ChangeTag::Delete => "---",
            ChangeTag::Equal => "@@@",
        };
        out.push_str(prefix);
        out.push(' ');
        out.push_str(&text);
        out.push('\n');
    }
    out
}

/// The annotated block for a changed declaration.
pub fn changed_block(prev: &str, new: &str) -> String {
    format!(
        "/*\n{RESOLVE_SENTINEL}\n\
         ---------- CURRENT VERSION ----------\n\
         {prev}\n\
         ----------   CHANGED TO    ----------\n\
         {new}\n\
         ----------   CHANGE DIFF   ----------\n\
         {}*/",
        char_diff(prev, new)
    )
}

/// The block for a declaration that disappeared from the source tree.
pub fn removed_block(removed: &str) -> String {
    format!(
        "/*\n{RESOLVE_SENTINEL}\n\
         -----------     REMOVED    ----------\n\
         {removed}\n\
         */"
    )
}

/// Next file name in the migrations directory: the zero-padded count of
/// migration files already present.
pub fn next_migration_file_name(dir: &Path) -> Result<String> {
    let existing = source::sql_files(dir)?;
    Ok(format!("{:04}.sql", existing.len()))
}

/// Write the next migration file and bring the catalog in line with it.
///
/// Statements are visited in emission order; unchanged ones are skipped. The
/// removal blocks for vanished catalog entries go last. Returns the file name
/// and the number of blocks written.
pub async fn write_migration(
    catalog: &Catalog<'_>,
    stmts: &[ParsedStmt],
    order: &[usize],
    removed: &[CatalogStatement],
    dir: &Path,
) -> Result<(String, usize)> {
    let mut blocks: Vec<String> = Vec::new();

    for &i in order {
        let stmt = &stmts[i];
        match stmt.status {
            StmtStatus::Unchanged => {}
            StmtStatus::New => {
                blocks.push(stmt.canonical.clone());
                catalog.insert_stmt(stmt).await?;
            }
            StmtStatus::Changed => {
                let prev = stmt
                    .prev_raw
                    .as_ref()
                    .ok_or_else(|| {
                        Error::Catalog(format!("missing previous version of {}", stmt.describe()))
                    })?
                    .canonical()?;
                blocks.push(changed_block(&prev, &stmt.canonical));
                catalog.update_stmt(stmt).await?;
            }
            StmtStatus::Unknown => return Err(Error::UnknownStatus(stmt.describe())),
        }
    }

    for row in removed {
        blocks.push(removed_block(&row.text));
        catalog.delete_stmt_by_hash(&row.hash).await?;
    }

    let file_name = next_migration_file_name(dir)?;
    fs::write(dir.join(&file_name), blocks.join("\n"))?;

    Ok((file_name, blocks.len()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn char_diff_runs() {
        assert_eq!(char_diff("abc", "abd"), "@@@ ab\n--- c\n+++ d\n");
        assert_eq!(char_diff("same", "same"), "@@@ same\n");
    }

    #[test]
    fn changed_block_layout() {
        let block = changed_block(
            "CREATE TABLE t (id uuid DEFAULT a());",
            "CREATE TABLE t (id uuid DEFAULT b());",
        );
        assert!(block.starts_with("/*\n"));
        assert!(block.ends_with("*/"));
        assert!(block.lines().any(|l| l == RESOLVE_SENTINEL));
        assert!(block.contains("---------- CURRENT VERSION ----------"));
        assert!(block.contains("----------   CHANGED TO    ----------"));
        assert!(block.contains("----------   CHANGE DIFF   ----------"));
        assert!(block.contains("--- a"));
        assert!(block.contains("+++ b"));
    }

    #[test]
    fn removed_block_layout() {
        let block = removed_block("CREATE TABLE gone (id integer);");
        assert!(block.lines().any(|l| l == RESOLVE_SENTINEL));
        assert!(block.contains("-----------     REMOVED    ----------"));
        assert!(block.contains("CREATE TABLE gone (id integer);"));
    }

    #[test]
    fn migration_file_names_are_zero_padded_counts() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(next_migration_file_name(dir.path()).unwrap(), "0000.sql");

        std::fs::write(dir.path().join("0000.sql"), "select 1;").unwrap();
        assert_eq!(next_migration_file_name(dir.path()).unwrap(), "0001.sql");

        std::fs::write(dir.path().join("0001.sql"), "select 2;").unwrap();
        assert_eq!(next_migration_file_name(dir.path()).unwrap(), "0002.sql");
    }
}
