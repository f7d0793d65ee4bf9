//! Thin facade over the embedded PostgreSQL parser/deparser.
//!
//! Everything downstream works with [`SqlStatement`], a single raw statement
//! bundled with the parser version it came from. The canonical text of a
//! statement is its deparsed form with a trailing `;`; it is the only string
//! ever used for content comparison.

use pg_query::protobuf;
use pg_query::NodeEnum;

use crate::{Error, Result};

/// One raw statement as produced by the parser.
#[derive(Debug, Clone)]
pub struct SqlStatement {
    version: i32,
    raw: protobuf::RawStmt,
}

impl SqlStatement {
    /// The root AST node, if the parser produced one.
    pub fn node(&self) -> Option<&NodeEnum> {
        self.raw.stmt.as_ref().and_then(|stmt| stmt.node.as_ref())
    }

    /// Deparse this statement back into SQL, without a trailing `;`.
    pub fn deparse(&self) -> Result<String> {
        let result = protobuf::ParseResult {
            version: self.version,
            stmts: vec![self.raw.clone()],
        };
        Ok(pg_query::deparse(&result)?)
    }

    /// The canonical text of this statement: deparsed SQL plus `;`.
    pub fn canonical(&self) -> Result<String> {
        Ok(format!("{};", self.deparse()?))
    }
}

/// Parse a chunk of SQL into its component statements.
pub fn parse_sql(text: &str) -> std::result::Result<Vec<SqlStatement>, pg_query::Error> {
    let result = pg_query::parse(text)?;
    let version = result.protobuf.version;
    Ok(result
        .protobuf
        .stmts
        .into_iter()
        .map(|raw| SqlStatement { version, raw })
        .collect())
}

/// Parse text expected to hold exactly one statement (catalog round-trips).
pub fn parse_single(text: &str) -> Result<SqlStatement> {
    let mut stmts = parse_sql(text)?;
    if stmts.is_empty() {
        return Err(Error::Catalog(format!("empty statement text: {text:?}")));
    }
    Ok(stmts.remove(0))
}
