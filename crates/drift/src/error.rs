use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("postgres error: {0}")]
    Postgres(#[from] tokio_postgres::Error),

    #[error("sql parse error: {0}")]
    Parse(#[from] pg_query::Error),

    #[error("syntax error in {}: {source}", .path.display())]
    Syntax {
        path: PathBuf,
        source: pg_query::Error,
    },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("the following files have unresolved migrations: {}", .0.join(", "))]
    UnresolvedMigrations(Vec<String>),

    #[error("the following executed migrations have been tampered with: {}", .0.join(", "))]
    TamperedMigrations(Vec<String>),

    #[error("dependency cycle involving {0}")]
    DependencyCycle(String),

    #[error("status of statement {0} is unknown after extraction")]
    UnknownStatus(String),

    #[error("catalog inconsistency: {0}")]
    Catalog(String),
}
