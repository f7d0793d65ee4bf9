//! Statement classification and dependency extraction.
//!
//! A single recursive walk over the parse tree fills in the statement's kind,
//! its identity, and the list of schema objects it references. The walk is a
//! flat match over node kinds; each arm decides what to record and which
//! children to descend into.
//!
//! Identity strings are deliberately uneven: `CREATE TABLE` registers the bare
//! `relname` (and so do foreign-key targets and trigger relations), while
//! relation references reached through query recursion (FROM clauses, INSERT
//! and UPDATE targets, rule targets) use `schema.relname` when a schema is
//! spelled out. Dependency matching relies on both forms staying as they are.

use pg_query::protobuf::{self, a_const, RangeVar, TypeName};
use pg_query::NodeEnum;
use tracing::warn;

use crate::ast::SqlStatement;
use crate::statement::{Dependency, ParsedStmt, StmtKind, StmtStatus};
use crate::{fingerprint, Result};

/// Deparse, fingerprint and classify a batch of raw statements.
pub fn extract_statements(stmts: Vec<SqlStatement>) -> Result<Vec<ParsedStmt>> {
    let mut out = Vec::with_capacity(stmts.len());

    for raw in stmts {
        let canonical = raw.canonical()?;
        let hash = fingerprint::hash_text(&canonical);

        let mut acc = Accumulator::new();
        if let Some(node) = raw.node() {
            acc.walk(node);
        }

        out.push(ParsedStmt {
            raw,
            prev_raw: None,
            canonical,
            hash,
            kind: acc.kind,
            name: acc.name,
            dependencies: acc.deps,
            status: StmtStatus::Unknown,
        });
    }

    Ok(out)
}

/// Join non-empty name parts with `.`.
fn build_name(parts: &[&str]) -> String {
    parts
        .iter()
        .filter(|p| !p.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(".")
}

/// The last element of a name node list, e.g. `a.b.c` yields `c`.
fn last_name(nodes: &[protobuf::Node]) -> String {
    match nodes.last().map(|n| n.node.as_ref()) {
        Some(Some(NodeEnum::String(s))) => s.sval.clone(),
        _ => String::new(),
    }
}

/// All elements of a type name joined with `.`, e.g. `pg_catalog.int4`.
fn dotted_type_name(tn: &TypeName) -> String {
    let parts: Vec<&str> = tn
        .names
        .iter()
        .filter_map(|n| match n.node.as_ref() {
            Some(NodeEnum::String(s)) if !s.sval.is_empty() => Some(s.sval.as_str()),
            _ => None,
        })
        .collect();
    parts.join(".")
}

/// `schema.relname` when a schema is present, bare `relname` otherwise.
fn range_var_name(rv: &RangeVar) -> String {
    build_name(&[&rv.schemaname, &rv.relname])
}

/// The partially built statement the walk accumulates into.
struct Accumulator {
    kind: StmtKind,
    name: String,
    deps: Vec<Dependency>,
}

impl Accumulator {
    fn new() -> Self {
        Accumulator {
            kind: StmtKind::Unknown,
            name: String::new(),
            deps: Vec::new(),
        }
    }

    /// Record the statement kind. The root node of a statement is always
    /// walked first, so nested nodes (a view's SELECT, a column's CASE) never
    /// reclassify the declaration they belong to.
    fn note_kind(&mut self, kind: StmtKind) {
        if self.kind == StmtKind::Unknown {
            self.kind = kind;
        }
    }

    fn note_name(&mut self, name: impl Into<String>) {
        if self.name.is_empty() {
            self.name = name.into();
        }
    }

    /// Append a dependency unless the name is empty or `(kind, name)` is
    /// already present.
    fn push_dep(&mut self, kind: StmtKind, name: impl Into<String>) {
        let name = name.into();
        if name.is_empty() {
            return;
        }
        if self.deps.iter().any(|d| d.kind == kind && d.name == name) {
            return;
        }
        self.deps.push(Dependency::new(kind, name));
    }

    /// Schema and relation dependencies for a referenced range var.
    fn push_range_var(&mut self, rv: &RangeVar) {
        self.push_dep(StmtKind::Schema, rv.schemaname.clone());
        self.push_dep(StmtKind::Table, range_var_name(rv));
    }

    fn visit(&mut self, node: &protobuf::Node) {
        if let Some(inner) = &node.node {
            self.walk(inner);
        }
    }

    fn walk(&mut self, node: &NodeEnum) {
        match node {
            NodeEnum::CreateStmt(n) => {
                self.note_kind(StmtKind::Table);
                if let Some(relation) = &n.relation {
                    self.note_name(relation.relname.clone());
                    self.push_dep(StmtKind::Schema, relation.schemaname.clone());
                }
                self.push_dep(StmtKind::Tablespace, n.tablespacename.clone());
                for elt in &n.table_elts {
                    self.visit(elt);
                }
                for constraint in &n.constraints {
                    self.visit(constraint);
                }
                for parent in &n.inh_relations {
                    self.visit(parent);
                }
            }

            NodeEnum::CreateTableAsStmt(n) => {
                self.note_kind(StmtKind::MaterializedView);
                if let Some(rel) = n.into.as_ref().and_then(|into| into.rel.as_ref()) {
                    self.note_name(rel.relname.clone());
                    self.push_dep(StmtKind::Schema, rel.schemaname.clone());
                }
                if let Some(query) = &n.query {
                    self.visit(query);
                }
            }

            NodeEnum::ViewStmt(n) => {
                self.note_kind(StmtKind::View);
                if let Some(view) = &n.view {
                    self.note_name(range_var_name(view));
                    self.push_dep(StmtKind::Schema, view.schemaname.clone());
                }
                if let Some(query) = &n.query {
                    self.visit(query);
                }
            }

            NodeEnum::CreateSchemaStmt(n) => {
                self.note_kind(StmtKind::Schema);
                self.note_name(n.schemaname.clone());
            }

            NodeEnum::CreateExtensionStmt(n) => {
                self.note_kind(StmtKind::Extension);
                self.note_name(n.extname.clone());
            }

            NodeEnum::CreateFunctionStmt(n) => {
                self.note_kind(StmtKind::Function);
                self.note_name(last_name(&n.funcname));
                if let Some(return_type) = &n.return_type {
                    self.push_dep(StmtKind::GenericType, last_name(&return_type.names));
                }
                for option in &n.options {
                    self.visit(option);
                }
                for parameter in &n.parameters {
                    self.visit(parameter);
                }
            }

            NodeEnum::FunctionParameter(n) => {
                if let Some(arg_type) = &n.arg_type {
                    for name in &arg_type.names {
                        self.visit(name);
                    }
                }
            }

            NodeEnum::CreateEnumStmt(n) => {
                self.note_kind(StmtKind::Enum);
                self.note_name(last_name(&n.type_name));
            }

            NodeEnum::CreateDomainStmt(n) => {
                self.note_kind(StmtKind::Domain);
                self.note_name(last_name(&n.domainname));
                if let Some(type_name) = &n.type_name {
                    self.push_dep(StmtKind::GenericType, dotted_type_name(type_name));
                }
                for constraint in &n.constraints {
                    self.visit(constraint);
                }
            }

            NodeEnum::CompositeTypeStmt(n) => {
                self.note_kind(StmtKind::Type);
                if let Some(typevar) = &n.typevar {
                    self.note_name(typevar.relname.clone());
                    self.push_dep(StmtKind::Schema, typevar.schemaname.clone());
                }
                for coldef in &n.coldeflist {
                    self.visit(coldef);
                }
            }

            NodeEnum::CreateTrigStmt(n) => {
                self.note_kind(StmtKind::Trigger);
                self.note_name(n.trigname.clone());
                if let Some(rel) = &n.relation {
                    self.push_dep(StmtKind::Schema, rel.schemaname.clone());
                    self.push_dep(StmtKind::Table, rel.relname.clone());
                }
                self.push_dep(StmtKind::Function, last_name(&n.funcname));
            }

            NodeEnum::CreatePolicyStmt(n) => {
                self.note_kind(StmtKind::Policy);
                self.note_name(n.policy_name.clone());
                if let Some(qual) = &n.qual {
                    self.visit(qual);
                }
                if let Some(table) = &n.table {
                    self.push_dep(StmtKind::Schema, table.schemaname.clone());
                    self.push_dep(StmtKind::Table, table.relname.clone());
                }
                for role in &n.roles {
                    self.visit(role);
                }
            }

            NodeEnum::CreateRoleStmt(n) => {
                self.note_kind(StmtKind::Role);
                self.note_name(n.role.clone());
                for option in &n.options {
                    self.visit(option);
                }
            }

            NodeEnum::RuleStmt(n) => {
                self.note_kind(StmtKind::Rule);
                self.note_name(n.rulename.clone());
                if let Some(relation) = &n.relation {
                    self.push_range_var(relation);
                }
                if let Some(where_clause) = &n.where_clause {
                    self.visit(where_clause);
                }
                for action in &n.actions {
                    self.visit(action);
                }
            }

            NodeEnum::IndexStmt(n) => {
                self.note_kind(StmtKind::Index);
                self.note_name(n.idxname.clone());
                if let Some(relation) = &n.relation {
                    self.push_dep(StmtKind::Schema, relation.schemaname.clone());
                }
                for param in &n.index_params {
                    self.visit(param);
                }
            }

            NodeEnum::AlterTableStmt(n) => {
                self.note_kind(StmtKind::AlterTable);
                for cmd in &n.cmds {
                    self.visit(cmd);
                }
                if let Some(relation) = &n.relation {
                    self.push_dep(StmtKind::Schema, relation.schemaname.clone());
                    self.push_dep(StmtKind::Table, relation.relname.clone());
                }
            }

            NodeEnum::AlterDefaultPrivilegesStmt(n) => {
                self.note_kind(StmtKind::AlterDefaultPrivileges);
                if let Some(action) = &n.action {
                    for grantee in &action.grantees {
                        self.visit(grantee);
                    }
                    for privilege in &action.privileges {
                        self.visit(privilege);
                    }
                }
            }

            NodeEnum::GrantStmt(n) => {
                self.note_kind(StmtKind::Grant);
                for object in &n.objects {
                    self.visit(object);
                }
                for privilege in &n.privileges {
                    self.visit(privilege);
                }
                for grantee in &n.grantees {
                    self.visit(grantee);
                }
            }

            NodeEnum::GrantRoleStmt(n) => {
                self.note_kind(StmtKind::Grant);
                for role in &n.granted_roles {
                    self.visit(role);
                }
                for role in &n.grantee_roles {
                    self.visit(role);
                }
            }

            NodeEnum::DropStmt(n) => {
                self.note_kind(StmtKind::Drop);
                let kind = StmtKind::from_object_type(n.remove_type());
                for object in &n.objects {
                    if let Some(NodeEnum::List(list)) = object.node.as_ref() {
                        self.push_dep(kind, last_name(&list.items));
                    }
                }
            }

            NodeEnum::DoStmt(n) => {
                self.note_kind(StmtKind::Do);
                for arg in &n.args {
                    self.visit(arg);
                }
            }

            NodeEnum::CommentStmt(n) => {
                self.note_kind(StmtKind::Comment);
                self.note_name(n.comment.clone());
                if let Some(object) = &n.object {
                    if let Some(NodeEnum::List(list)) = object.node.as_ref() {
                        self.push_dep(
                            StmtKind::from_object_type(n.objtype()),
                            last_name(&list.items),
                        );
                    }
                    self.visit(object);
                }
            }

            NodeEnum::VariableSetStmt(n) => {
                self.note_kind(StmtKind::Variable);
                self.note_name(n.name.clone());
                for arg in &n.args {
                    self.visit(arg);
                }
            }

            NodeEnum::InsertStmt(n) => {
                self.note_kind(StmtKind::Insert);
                if let Some(relation) = &n.relation {
                    self.push_range_var(relation);
                }
                for col in &n.cols {
                    self.visit(col);
                }
                if let Some(select) = &n.select_stmt {
                    self.visit(select);
                }
            }

            NodeEnum::UpdateStmt(n) => {
                self.note_kind(StmtKind::Update);
                if let Some(relation) = &n.relation {
                    self.push_range_var(relation);
                }
                for from in &n.from_clause {
                    self.visit(from);
                }
                for target in &n.target_list {
                    self.visit(target);
                }
                if let Some(where_clause) = &n.where_clause {
                    self.visit(where_clause);
                }
            }

            NodeEnum::SelectStmt(n) => {
                self.note_kind(StmtKind::Select);
                if let Some(where_clause) = &n.where_clause {
                    self.visit(where_clause);
                }
                for target in &n.target_list {
                    self.visit(target);
                }
                for from in &n.from_clause {
                    self.visit(from);
                }
                if let Some(with) = &n.with_clause {
                    for cte in &with.ctes {
                        self.visit(cte);
                    }
                }
                if let Some(having) = &n.having_clause {
                    self.visit(having);
                }
            }

            NodeEnum::CommonTableExpr(n) => {
                if let Some(query) = &n.ctequery {
                    self.visit(query);
                }
            }

            NodeEnum::RangeSubselect(n) => {
                if let Some(subquery) = &n.subquery {
                    self.visit(subquery);
                }
            }

            NodeEnum::RangeFunction(n) => {
                for coldef in &n.coldeflist {
                    self.visit(coldef);
                }
                for function in &n.functions {
                    self.visit(function);
                }
            }

            NodeEnum::JoinExpr(n) => {
                if let Some(larg) = &n.larg {
                    self.visit(larg);
                }
                if let Some(rarg) = &n.rarg {
                    self.visit(rarg);
                }
            }

            NodeEnum::SubLink(n) => {
                if let Some(testexpr) = &n.testexpr {
                    self.visit(testexpr);
                }
                if let Some(xpr) = &n.xpr {
                    self.visit(xpr);
                }
                if let Some(subselect) = &n.subselect {
                    self.visit(subselect);
                }
                for oper in &n.oper_name {
                    self.visit(oper);
                }
            }

            NodeEnum::ResTarget(n) => {
                if let Some(val) = &n.val {
                    self.visit(val);
                }
            }

            NodeEnum::BoolExpr(n) => {
                for arg in &n.args {
                    self.visit(arg);
                }
            }

            NodeEnum::AExpr(n) => {
                if let Some(lexpr) = &n.lexpr {
                    self.visit(lexpr);
                }
                if let Some(rexpr) = &n.rexpr {
                    self.visit(rexpr);
                }
            }

            NodeEnum::CaseExpr(n) => {
                self.note_kind(StmtKind::Case);
                if let Some(defresult) = &n.defresult {
                    self.visit(defresult);
                }
                for arg in &n.args {
                    self.visit(arg);
                }
            }

            NodeEnum::CaseWhen(n) => {
                if let Some(expr) = &n.expr {
                    self.visit(expr);
                }
                if let Some(result) = &n.result {
                    self.visit(result);
                }
            }

            NodeEnum::NullTest(n) => {
                if let Some(arg) = &n.arg {
                    self.visit(arg);
                }
            }

            NodeEnum::CoalesceExpr(n) => {
                if let Some(xpr) = &n.xpr {
                    self.visit(xpr);
                }
                for arg in &n.args {
                    self.visit(arg);
                }
            }

            NodeEnum::MinMaxExpr(n) => {
                for arg in &n.args {
                    self.visit(arg);
                }
                if let Some(xpr) = &n.xpr {
                    self.visit(xpr);
                }
            }

            NodeEnum::TypeCast(n) => {
                if let Some(type_name) = &n.type_name {
                    let name = last_name(&type_name.names);
                    if !name.starts_with("pg_catalog") {
                        self.push_dep(StmtKind::GenericType, name);
                    }
                }
            }

            NodeEnum::ColumnDef(n) => {
                if let Some(coll) = &n.coll_clause {
                    self.push_dep(StmtKind::Collation, last_name(&coll.collname));
                }
                if let Some(type_name) = &n.type_name {
                    let name = last_name(&type_name.names);
                    if !name.starts_with("pg_catalog") {
                        self.push_dep(StmtKind::GenericType, name);
                    }
                }
                for constraint in &n.constraints {
                    self.visit(constraint);
                }
            }

            NodeEnum::Constraint(n) => {
                if let Some(pktable) = &n.pktable {
                    self.push_dep(StmtKind::Table, pktable.relname.clone());
                }
                if let Some(raw_expr) = &n.raw_expr {
                    self.visit(raw_expr);
                }
            }

            NodeEnum::RangeVar(n) => {
                self.push_range_var(n);
            }

            NodeEnum::FuncCall(n) => {
                let name = last_name(&n.funcname);
                if name == "nextval" {
                    if n.args.len() == 1 {
                        if let Some(NodeEnum::AConst(ac)) = n.args[0].node.as_ref() {
                            if let Some(a_const::Val::Sval(s)) = &ac.val {
                                self.push_dep(StmtKind::Sequence, s.sval.clone());
                            }
                        }
                    }
                } else {
                    self.push_dep(StmtKind::Function, name);
                    for arg in &n.args {
                        self.visit(arg);
                    }
                }
            }

            NodeEnum::ObjectWithArgs(n) => {
                self.push_dep(StmtKind::Function, last_name(&n.objname));
            }

            NodeEnum::RoleSpec(n) => {
                self.push_dep(StmtKind::Role, n.rolename.clone());
            }

            NodeEnum::List(n) => {
                for item in &n.items {
                    self.visit(item);
                }
            }

            // Leaves that carry no schema references of their own.
            NodeEnum::String(_)
            | NodeEnum::AConst(_)
            | NodeEnum::ColumnRef(_)
            | NodeEnum::TypeName(_)
            | NodeEnum::DefElem(_)
            | NodeEnum::IndexElem(_)
            | NodeEnum::AccessPriv(_)
            | NodeEnum::AlterTableCmd(_)
            | NodeEnum::SqlvalueFunction(_) => {}

            other => {
                warn!(
                    "unknown node kind {}; statement left unclassified",
                    node_label(other)
                );
                self.note_kind(StmtKind::Unknown);
            }
        }
    }
}

/// A short, stable label for warning messages about unhandled nodes.
fn node_label(node: &NodeEnum) -> String {
    let debug = format!("{node:?}");
    debug
        .split(|c: char| c == '(' || c == ' ' || c == '{')
        .next()
        .unwrap_or("?")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast;

    fn extract_one(sql: &str) -> ParsedStmt {
        let stmts = ast::parse_sql(sql).expect("parse failed");
        let mut parsed = extract_statements(stmts).expect("extract failed");
        assert!(!parsed.is_empty());
        parsed.remove(0)
    }

    fn deps_of(sql: &str) -> Vec<(StmtKind, String)> {
        extract_one(sql)
            .dependencies
            .into_iter()
            .map(|d| (d.kind, d.name))
            .collect()
    }

    fn dep(kind: StmtKind, name: &str) -> (StmtKind, String) {
        (kind, name.to_string())
    }

    #[test]
    fn view_dependencies() {
        let sql = "create or replace view abc.some_view as \
                   select *, x::my_domain \
                   from a_cool_table, b_cool_table \
                   join c_cool_table k on k.id=25 \
                   left join lateral (select * from d_cool_table) x on true \
                   having some_other_function(d);";
        let stmt = extract_one(sql);
        assert_eq!(stmt.kind, StmtKind::View);
        assert_eq!(stmt.name, "abc.some_view");
        assert_eq!(
            deps_of(sql),
            vec![
                dep(StmtKind::Schema, "abc"),
                dep(StmtKind::GenericType, "my_domain"),
                dep(StmtKind::Table, "a_cool_table"),
                dep(StmtKind::Table, "b_cool_table"),
                dep(StmtKind::Table, "c_cool_table"),
                dep(StmtKind::Table, "d_cool_table"),
                dep(StmtKind::Function, "some_other_function"),
            ]
        );
    }

    #[test]
    fn table_foreign_key_dependency() {
        assert_eq!(
            deps_of("CREATE TABLE child_table (parent_id INTEGER REFERENCES parent_table(id));"),
            vec![
                dep(StmtKind::GenericType, "int4"),
                dep(StmtKind::Table, "parent_table"),
            ]
        );
    }

    #[test]
    fn table_inherited_dependency() {
        assert_eq!(
            deps_of("CREATE TABLE child_table (age INTEGER) INHERITS (parent_table);"),
            vec![
                dep(StmtKind::GenericType, "int4"),
                dep(StmtKind::Table, "parent_table"),
            ]
        );
    }

    #[test]
    fn table_partition_dependency() {
        assert_eq!(
            deps_of(
                "CREATE TABLE partition_table_2023 PARTITION OF parent_table \
                 FOR VALUES FROM ('2023-01-01') TO ('2023-12-31');"
            ),
            vec![dep(StmtKind::Table, "parent_table")]
        );
    }

    #[test]
    fn table_default_function_dependency() {
        assert_eq!(
            deps_of("CREATE TABLE example_table (id UUID PRIMARY KEY DEFAULT uuid_generate_v4());"),
            vec![
                dep(StmtKind::GenericType, "uuid"),
                dep(StmtKind::Function, "uuid_generate_v4"),
            ]
        );
    }

    #[test]
    fn table_sequence_dependency() {
        assert_eq!(
            deps_of(
                "CREATE TABLE example_table \
                 (id INTEGER PRIMARY KEY DEFAULT nextval('example_sequence'));"
            ),
            vec![
                dep(StmtKind::GenericType, "int4"),
                dep(StmtKind::Sequence, "example_sequence"),
            ]
        );
    }

    #[test]
    fn table_custom_type_dependency() {
        assert_eq!(
            deps_of("CREATE TABLE example_table (age positive_integer);"),
            vec![dep(StmtKind::GenericType, "positive_integer")]
        );
    }

    #[test]
    fn table_collate_dependency() {
        assert_eq!(
            deps_of("CREATE TABLE example_table (name text COLLATE romanian_phonebook);"),
            vec![
                dep(StmtKind::Collation, "romanian_phonebook"),
                dep(StmtKind::GenericType, "text"),
            ]
        );
    }

    #[test]
    fn table_schema_dependency() {
        let stmt = extract_one("CREATE TABLE my_schema.example_table (name integer);");
        assert_eq!(stmt.kind, StmtKind::Table);
        // Table identity stays bare even when the declaration is qualified.
        assert_eq!(stmt.name, "example_table");
        assert_eq!(
            stmt.dependencies
                .into_iter()
                .map(|d| (d.kind, d.name))
                .collect::<Vec<_>>(),
            vec![
                dep(StmtKind::Schema, "my_schema"),
                dep(StmtKind::GenericType, "int4"),
            ]
        );
    }

    #[test]
    fn table_tablespace_dependency() {
        assert_eq!(
            deps_of("CREATE TABLE example_table (id integer) TABLESPACE example_tablespace;"),
            vec![
                dep(StmtKind::Tablespace, "example_tablespace"),
                dep(StmtKind::GenericType, "int4"),
            ]
        );
    }

    #[test]
    fn insert_dependencies() {
        let sql = "insert into cc.abc (a, b, c) \
                   select x.a, x.b, x.c from some_other_table \
                   where omg=123 and \
                   xyz=call_this_func(with_this_nested_call(123::MY_CUSTOM_NUMBER_TYPE));";
        let stmt = extract_one(sql);
        assert_eq!(stmt.kind, StmtKind::Insert);
        assert_eq!(
            deps_of(sql),
            vec![
                dep(StmtKind::Schema, "cc"),
                dep(StmtKind::Table, "cc.abc"),
                dep(StmtKind::Function, "call_this_func"),
                dep(StmtKind::Function, "with_this_nested_call"),
                dep(StmtKind::GenericType, "my_custom_number_type"),
                dep(StmtKind::Table, "some_other_table"),
            ]
        );
    }

    #[test]
    fn with_clause_dependencies() {
        let sql = "with first as (select * from qvc), second as (select a::CT from abc) \
                   select my_func(25), * from first, second;";
        let stmt = extract_one(sql);
        assert_eq!(stmt.kind, StmtKind::Select);
        assert_eq!(
            deps_of(sql),
            vec![
                dep(StmtKind::Function, "my_func"),
                dep(StmtKind::Table, "first"),
                dep(StmtKind::Table, "second"),
                dep(StmtKind::Table, "qvc"),
                dep(StmtKind::GenericType, "ct"),
                dep(StmtKind::Table, "abc"),
            ]
        );
    }

    #[test]
    fn comment_dependency_and_identity() {
        let sql = "comment on table some_other_table is 'This is a comment';";
        let stmt = extract_one(sql);
        assert_eq!(stmt.kind, StmtKind::Comment);
        // Comments are fingerprinted on the comment text itself.
        assert_eq!(stmt.name, "This is a comment");
        assert_eq!(
            deps_of(sql),
            vec![dep(StmtKind::Table, "some_other_table")]
        );
    }

    #[test]
    fn rule_dependencies() {
        let sql = "create rule test_rule as on delete to test.test_table do instead nothing;";
        let stmt = extract_one(sql);
        assert_eq!(stmt.kind, StmtKind::Rule);
        assert_eq!(stmt.name, "test_rule");
        assert_eq!(
            deps_of(sql),
            vec![
                dep(StmtKind::Schema, "test"),
                dep(StmtKind::Table, "test.test_table"),
            ]
        );
    }

    #[test]
    fn rule_with_where_dependencies() {
        let sql = "create rule test_rule as on delete to foo.test_table \
                   where exists (select 1 from bar.dep_tab where x=1) do instead nothing;";
        assert_eq!(
            deps_of(sql),
            vec![
                dep(StmtKind::Schema, "foo"),
                dep(StmtKind::Table, "foo.test_table"),
                dep(StmtKind::Schema, "bar"),
                dep(StmtKind::Table, "bar.dep_tab"),
            ]
        );
    }

    #[test]
    fn trigger_dependencies_use_bare_relation_name() {
        let sql = "create trigger trg after insert on acc.events \
                   for each row execute function touch_updated();";
        let stmt = extract_one(sql);
        assert_eq!(stmt.kind, StmtKind::Trigger);
        assert_eq!(stmt.name, "trg");
        assert_eq!(
            stmt.dependencies
                .into_iter()
                .map(|d| (d.kind, d.name))
                .collect::<Vec<_>>(),
            vec![
                dep(StmtKind::Schema, "acc"),
                dep(StmtKind::Table, "events"),
                dep(StmtKind::Function, "touch_updated"),
            ]
        );
    }

    #[test]
    fn function_return_type_dependency() {
        let sql = "create function get_total() returns money_amount as 'select 1' language sql;";
        let stmt = extract_one(sql);
        assert_eq!(stmt.kind, StmtKind::Function);
        assert_eq!(stmt.name, "get_total");
        assert!(stmt
            .dependencies
            .iter()
            .any(|d| d.kind == StmtKind::GenericType && d.name == "money_amount"));
    }

    #[test]
    fn domain_base_type_dependency() {
        let sql = "create domain positive_integer as integer check (value > 0);";
        let stmt = extract_one(sql);
        assert_eq!(stmt.kind, StmtKind::Domain);
        assert_eq!(stmt.name, "positive_integer");
        assert_eq!(
            stmt.dependencies
                .into_iter()
                .map(|d| (d.kind, d.name))
                .collect::<Vec<_>>(),
            vec![dep(StmtKind::GenericType, "pg_catalog.int4")]
        );
    }

    #[test]
    fn enum_identity() {
        let stmt = extract_one("create type mood as enum ('sad', 'ok', 'happy');");
        assert_eq!(stmt.kind, StmtKind::Enum);
        assert_eq!(stmt.name, "mood");
        assert!(stmt.dependencies.is_empty());
    }

    #[test]
    fn index_depends_on_schema_only() {
        let stmt = extract_one("create index idx_name on cc.some_table (name);");
        assert_eq!(stmt.kind, StmtKind::Index);
        assert_eq!(stmt.name, "idx_name");
        assert_eq!(
            stmt.dependencies
                .into_iter()
                .map(|d| (d.kind, d.name))
                .collect::<Vec<_>>(),
            vec![dep(StmtKind::Schema, "cc")]
        );
    }

    #[test]
    fn dependencies_are_deduplicated() {
        let deps = deps_of("select a.x, b.y from t a, t b;");
        assert_eq!(deps, vec![dep(StmtKind::Table, "t")]);
    }

    #[test]
    fn no_dependency_has_an_empty_name() {
        let sqls = [
            "create table plain (id integer);",
            "select * from t;",
            "create schema s;",
        ];
        for sql in sqls {
            for (_, name) in deps_of(sql) {
                assert!(!name.is_empty());
            }
        }
    }

    #[test]
    fn unknown_statement_degrades_to_unknown_kind() {
        let stmt = extract_one("checkpoint;");
        assert_eq!(stmt.kind, StmtKind::Unknown);
    }

    #[test]
    fn hash_tracks_canonical_text() {
        let a = extract_one("create table t (id integer);");
        let b = extract_one("CREATE TABLE t ( id INTEGER );");
        assert_eq!(a.canonical, b.canonical);
        assert_eq!(a.hash, b.hash);
        let c = extract_one("create table t (id bigint);");
        assert_ne!(a.hash, c.hash);
    }
}
