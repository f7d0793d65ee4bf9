//! The statement model: object kinds, change status, and the parsed record
//! that the extractor, sorter and emitter all share.

use pg_query::protobuf::ObjectType;

use crate::ast::SqlStatement;

/// Schema-object categories.
///
/// The declaration order is the sort bucket priority: lower discriminants are
/// emitted earlier when the dependency graph leaves the order open, and the
/// discriminant is what gets persisted in the catalog's `stmt_type` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StmtKind {
    Database,
    Server,
    Schema,
    Extension,
    User,
    Role,
    Variable,
    Cast,
    AccessMethod,
    ForeignServer,
    Operator,
    OperatorClass,
    OperatorFamily,
    Statistics,
    TextSearchConfiguration,
    TextSearchDictionary,
    TextSearchParser,
    TextSearchTemplate,
    Function,
    Domain,
    DomainConstraint,
    Type,
    /// Ambiguous user-defined type reference: could be a domain, a composite
    /// type or an enum. Resolved against the actual declaration during graph
    /// hydration.
    GenericType,
    Aggregate,
    Collation,
    Language,
    Enum,
    ForeignDataWrapper,
    ForeignTable,
    Table,
    View,
    MaterializedView,
    Index,
    Column,
    Case,
    Conversion,
    Sequence,
    LargeObject,
    Routine,
    Transform,
    Select,
    Procedure,
    Comment,
    Grant,
    GrantRole,
    Update,
    AlterDefaultPrivileges,
    AlterPolicy,
    AlterTable,
    EventTrigger,
    Trigger,
    Rule,
    Constraint,
    TableConstraint,
    Tablespace,
    Group,
    Policy,
    Publication,
    Subscription,
    Insert,
    DropOwned,
    Drop,
    Do,
    Unknown,
}

impl StmtKind {
    /// Map the parser's object-type tag (DROP, COMMENT, ...) onto a kind.
    pub fn from_object_type(ot: ObjectType) -> StmtKind {
        match ot {
            ObjectType::ObjectAccessMethod => StmtKind::AccessMethod,
            ObjectType::ObjectAggregate => StmtKind::Aggregate,
            ObjectType::ObjectCast => StmtKind::Cast,
            ObjectType::ObjectCollation => StmtKind::Collation,
            ObjectType::ObjectColumn => StmtKind::Column,
            ObjectType::ObjectConversion => StmtKind::Conversion,
            ObjectType::ObjectTabconstraint => StmtKind::TableConstraint,
            ObjectType::ObjectDomconstraint => StmtKind::DomainConstraint,
            ObjectType::ObjectDatabase => StmtKind::Database,
            ObjectType::ObjectDomain => StmtKind::Domain,
            ObjectType::ObjectEventTrigger => StmtKind::EventTrigger,
            ObjectType::ObjectExtension => StmtKind::Extension,
            ObjectType::ObjectFdw => StmtKind::ForeignDataWrapper,
            ObjectType::ObjectForeignTable => StmtKind::ForeignTable,
            ObjectType::ObjectFunction => StmtKind::Function,
            ObjectType::ObjectIndex => StmtKind::Index,
            ObjectType::ObjectLanguage => StmtKind::Language,
            ObjectType::ObjectLargeobject => StmtKind::LargeObject,
            ObjectType::ObjectMatview => StmtKind::MaterializedView,
            ObjectType::ObjectOperator => StmtKind::Operator,
            ObjectType::ObjectOpclass => StmtKind::OperatorClass,
            ObjectType::ObjectOpfamily => StmtKind::OperatorFamily,
            ObjectType::ObjectPolicy => StmtKind::Policy,
            ObjectType::ObjectProcedure => StmtKind::Procedure,
            ObjectType::ObjectPublication => StmtKind::Publication,
            ObjectType::ObjectRole => StmtKind::Role,
            ObjectType::ObjectRoutine => StmtKind::Routine,
            ObjectType::ObjectRule => StmtKind::Rule,
            ObjectType::ObjectSchema => StmtKind::Schema,
            ObjectType::ObjectSequence => StmtKind::Sequence,
            ObjectType::ObjectForeignServer => StmtKind::ForeignServer,
            ObjectType::ObjectStatisticExt => StmtKind::Statistics,
            ObjectType::ObjectSubscription => StmtKind::Subscription,
            ObjectType::ObjectTable => StmtKind::Table,
            ObjectType::ObjectTablespace => StmtKind::Tablespace,
            ObjectType::ObjectTsconfiguration => StmtKind::TextSearchConfiguration,
            ObjectType::ObjectTsdictionary => StmtKind::TextSearchDictionary,
            ObjectType::ObjectTsparser => StmtKind::TextSearchParser,
            ObjectType::ObjectTstemplate => StmtKind::TextSearchTemplate,
            ObjectType::ObjectTransform => StmtKind::Transform,
            ObjectType::ObjectTrigger => StmtKind::Trigger,
            ObjectType::ObjectType => StmtKind::Type,
            ObjectType::ObjectView => StmtKind::View,
            _ => StmtKind::Unknown,
        }
    }

    /// The persisted `stmt_type` value.
    pub fn as_i32(self) -> i32 {
        self as i32
    }
}

/// Change status of a statement relative to the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StmtStatus {
    Unknown,
    New,
    Changed,
    Unchanged,
}

/// A reference from one statement to another schema object.
///
/// `target` is an index into the statement arena once hydration has run;
/// until then it is `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dependency {
    pub kind: StmtKind,
    pub name: String,
    pub target: Option<usize>,
}

impl Dependency {
    pub fn new(kind: StmtKind, name: impl Into<String>) -> Self {
        Dependency {
            kind,
            name: name.into(),
            target: None,
        }
    }
}

/// One fully extracted declaration.
#[derive(Debug, Clone)]
pub struct ParsedStmt {
    /// The raw statement handle.
    pub raw: SqlStatement,
    /// Previous version from the catalog; populated only when `status` is
    /// [`StmtStatus::Changed`].
    pub prev_raw: Option<SqlStatement>,
    /// Deparsed form terminated with `;`.
    pub canonical: String,
    /// SHA-1 hex of `canonical`.
    pub hash: String,
    pub kind: StmtKind,
    /// Object identity; empty when the statement kind has no usable name.
    pub name: String,
    /// Insertion-ordered, `(kind, name)`-deduplicated references.
    pub dependencies: Vec<Dependency>,
    pub status: StmtStatus,
}

impl ParsedStmt {
    pub fn has_name(&self) -> bool {
        !self.name.is_empty()
    }

    /// Something short to call this statement in logs and errors.
    pub fn describe(&self) -> String {
        if self.has_name() {
            format!("{:?} {}", self.kind, self.name)
        } else {
            format!("{:?} ({})", self.kind, &self.hash[..8.min(self.hash.len())])
        }
    }
}
