//! Dependency hydration and emission ordering.
//!
//! The statement list is the arena; a resolved dependency is an index into
//! it, never a pointer. Hydration links every extracted `(kind, name)` tuple
//! to the declaration it refers to and silently drops the rest (built-ins and
//! objects outside the managed set). The sorter then linearizes the graph:
//! schemas first, extensions second, everything else in input order with each
//! statement's dependencies unrolled ahead of it.

use crate::statement::{Dependency, ParsedStmt, StmtKind};
use crate::{Error, Result};

/// Resolve every dependency to a statement index, dropping the unresolved.
pub fn hydrate_dependencies(stmts: &mut [ParsedStmt]) {
    for i in 0..stmts.len() {
        let deps = std::mem::take(&mut stmts[i].dependencies);
        let mut resolved = Vec::with_capacity(deps.len());
        for mut dep in deps {
            dep.target = find_target(stmts, i, &dep);
            if dep.target.is_some() {
                resolved.push(dep);
            }
        }
        stmts[i].dependencies = resolved;
    }
}

/// First statement that the dependency can refer to.
///
/// A match is an exact kind match, or a `GenericType` on either side paired
/// with a domain, composite type or enum declaration. A statement never
/// matches itself; that keeps an ambiguous type reference from forming a
/// self-cycle.
fn find_target(stmts: &[ParsedStmt], from: usize, dep: &Dependency) -> Option<usize> {
    stmts.iter().enumerate().find_map(|(i, candidate)| {
        if i == from || !candidate.has_name() || candidate.name != dep.name {
            return None;
        }
        kinds_compatible(dep.kind, candidate.kind).then_some(i)
    })
}

fn kinds_compatible(dep: StmtKind, candidate: StmtKind) -> bool {
    if dep == candidate {
        return true;
    }
    let type_like = |kind| matches!(kind, StmtKind::Domain | StmtKind::Type | StmtKind::Enum);
    if candidate == StmtKind::GenericType {
        return type_like(dep);
    }
    if dep == StmtKind::GenericType {
        return type_like(candidate);
    }
    false
}

#[derive(Clone, Copy, PartialEq)]
enum Visit {
    Pending,
    Active,
    Done,
}

/// Produce the emission order for a hydrated statement list.
///
/// Every index appears exactly once, and every statement appears after all of
/// its resolved dependencies. A genuine cycle in the user's schema is
/// reported instead of looping.
pub fn emission_order(stmts: &[ParsedStmt]) -> Result<Vec<usize>> {
    let mut order = Vec::with_capacity(stmts.len());
    let mut state = vec![Visit::Pending; stmts.len()];

    for (i, stmt) in stmts.iter().enumerate() {
        if stmt.kind == StmtKind::Schema {
            state[i] = Visit::Done;
            order.push(i);
        }
    }

    for (i, stmt) in stmts.iter().enumerate() {
        if stmt.kind == StmtKind::Extension {
            state[i] = Visit::Done;
            order.push(i);
        }
    }

    for i in 0..stmts.len() {
        unroll(i, stmts, &mut state, &mut order)?;
    }

    Ok(order)
}

fn unroll(
    i: usize,
    stmts: &[ParsedStmt],
    state: &mut [Visit],
    order: &mut Vec<usize>,
) -> Result<()> {
    match state[i] {
        Visit::Done => Ok(()),
        Visit::Active => Err(Error::DependencyCycle(stmts[i].describe())),
        Visit::Pending => {
            state[i] = Visit::Active;
            for dep in &stmts[i].dependencies {
                if let Some(target) = dep.target {
                    unroll(target, stmts, state, order)?;
                }
            }
            state[i] = Visit::Done;
            order.push(i);
            Ok(())
        }
    }
}
