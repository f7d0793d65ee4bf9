//! Content hashing for statements and migration files.
//!
//! Fingerprints are plain SHA-1 hex digests, no salt. A statement is hashed
//! over its canonical text, a migration file over its raw bytes, so two
//! statements compare equal iff their canonical texts do.

use std::fs;
use std::path::Path;

use sha1::{Digest, Sha1};

use crate::Result;

/// SHA-1 hex digest of a string.
pub fn hash_text(text: &str) -> String {
    hex::encode(Sha1::digest(text.as_bytes()))
}

/// SHA-1 hex digest of a file's contents.
pub fn hash_file(path: &Path) -> Result<String> {
    let data = fs::read(path)?;
    Ok(hex::encode(Sha1::digest(&data)))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn known_sha1_vector() {
        assert_eq!(hash_text("hello"), "aaf4c61ddcc5e8a2dabede0f3b482cd9aea9434d");
    }

    #[test]
    fn equal_text_equal_hash() {
        assert_eq!(hash_text("create table t (id integer);"), hash_text("create table t (id integer);"));
        assert_ne!(hash_text("create table t (id integer);"), hash_text("create table t (id bigint);"));
    }

    #[test]
    fn file_hash_matches_text_hash() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"select 1;").unwrap();
        assert_eq!(hash_file(file.path()).unwrap(), hash_text("select 1;"));
    }
}
