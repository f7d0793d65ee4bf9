//! Discovery of `.sql` files on disk.

use std::fs;
use std::path::{Path, PathBuf};

use crate::Result;

/// All `.sql` files under `root`, recursively, in lexical order.
pub fn sql_files(root: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    collect(root, &mut files)?;
    files.sort();
    Ok(files)
}

fn collect(dir: &Path, out: &mut Vec<PathBuf>) -> Result<()> {
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            collect(&path, out)?;
        } else if path.extension().and_then(|e| e.to_str()) == Some("sql") {
            out.push(path);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_sql_files_recursively_and_sorted() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("b.sql"), "select 1;").unwrap();
        fs::write(dir.path().join("a.sql"), "select 2;").unwrap();
        fs::write(dir.path().join("nested/c.sql"), "select 3;").unwrap();
        fs::write(dir.path().join("readme.txt"), "not sql").unwrap();

        let files = sql_files(dir.path()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.strip_prefix(dir.path()).unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.sql", "b.sql", "nested/c.sql"]);
    }

    #[test]
    fn empty_directory_yields_no_files() {
        let dir = tempfile::tempdir().unwrap();
        assert!(sql_files(dir.path()).unwrap().is_empty());
    }
}
