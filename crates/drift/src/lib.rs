//! Declarative schema migrations for PostgreSQL.
//!
//! Point drift at a directory of SQL files describing the schema you want.
//! On every `make` it parses each declaration, fingerprints it, walks its
//! parse tree to find every other schema object it references, and compares
//! the result against the control catalog kept in the `drift_ctl` schema.
//! The difference becomes the next numbered migration file: new declarations
//! as runnable SQL in dependency order, changed and removed declarations as
//! annotated blocks for a human to resolve. `migrate` verifies that nothing
//! already applied has been tampered with, refuses files still carrying the
//! resolve sentinel, and executes the rest inside one transaction.
//!
//! ```ignore
//! let tx = client.transaction().await?;
//! let migrator = Migrator::new(&tx, "./schema", "./drift_migrations");
//! migrator.init().await?;
//! migrator.make().await?;
//! tx.commit().await?;
//! ```

pub mod apply;
pub mod ast;
pub mod catalog;
pub mod diff;
pub mod emit;
pub mod extract;
pub mod fingerprint;
pub mod graph;
pub mod migrate;
pub mod source;
pub mod statement;

mod error;

pub use ast::SqlStatement;
pub use catalog::{AppliedMigration, Catalog, CatalogStatement};
pub use emit::RESOLVE_SENTINEL;
pub use error::Error;
pub use migrate::Migrator;
pub use statement::{Dependency, ParsedStmt, StmtKind, StmtStatus};

/// Result type for drift operations.
pub type Result<T> = std::result::Result<T, Error>;
