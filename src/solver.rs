//! Phase 2: the escape solver.
//!
//! Depth-first over the identifier graph starting at each returned
//! identifier. Cycle-safe via the "temporarily false" trick: a node is
//! marked `seen` before recursing into its dependencies, so a cycle's second
//! visit sees whatever has been decided so far rather than looping forever.

use crate::diagnostics::pruner_trace;
use crate::errors::PrunerError;
use crate::graph::State;
use crate::hir::{IdentifierId, ScopeId};
use crate::lattice::MemoizationLevel;
use std::collections::HashSet;

/// Runs the solver over an already-collected `State`, returning the
/// memoized set. Also leaves `seen`/`memoized` populated on every
/// identifier node reached, per the data model's phase-2 outputs.
pub fn solve(state: &mut State) -> Result<HashSet<IdentifierId>, PrunerError> {
    let returned: Vec<IdentifierId> = state.returned().to_vec();
    let mut memoized_set = HashSet::new();
    for id in returned {
        visit(state, id, false, &mut memoized_set)?;
    }
    pruner_trace!("memoized set has {} identifier(s)", memoized_set.len());
    Ok(memoized_set)
}

fn visit(
    state: &mut State,
    id: IdentifierId,
    force_memoize: bool,
    memoized_set: &mut HashSet<IdentifierId>,
) -> Result<bool, PrunerError> {
    let (already_seen, prior_memoized) = {
        let node = state
            .identifier(id)
            .ok_or_else(|| PrunerError::missing_identifier(id))?;
        (node.seen, node.memoized)
    };
    if already_seen {
        return Ok(prior_memoized);
    }

    let (level, dependencies, scopes) = {
        let node = state
            .identifier_mut_existing(id)
            .expect("presence checked above");
        node.seen = true;
        node.memoized = false;
        (
            node.level,
            node.dependencies.iter().copied().collect::<Vec<_>>(),
            node.scopes.iter().copied().collect::<Vec<_>>(),
        )
    };

    let mut has_memoized_dependency = false;
    for dep in dependencies {
        if visit(state, dep, false, memoized_set)? {
            has_memoized_dependency = true;
        }
    }

    let memoized = match level {
        MemoizationLevel::Memoized => true,
        MemoizationLevel::Conditional => has_memoized_dependency || force_memoize,
        MemoizationLevel::Unmemoized => force_memoize,
        MemoizationLevel::Never => false,
    };

    state
        .identifier_mut_existing(id)
        .expect("presence checked above")
        .memoized = memoized;

    if memoized {
        memoized_set.insert(id);
        for scope_id in scopes {
            force_memoize_scope_dependencies(state, scope_id, memoized_set)?;
        }
    }

    Ok(memoized)
}

fn force_memoize_scope_dependencies(
    state: &mut State,
    scope_id: ScopeId,
    memoized_set: &mut HashSet<IdentifierId>,
) -> Result<(), PrunerError> {
    let (already_seen, dependencies) = {
        let node = state
            .scope(scope_id)
            .ok_or_else(|| PrunerError::missing_scope(scope_id))?;
        (node.seen, node.dependencies.clone())
    };
    if already_seen {
        return Ok(());
    }
    state
        .scope_mut(scope_id)
        .expect("presence checked above")
        .seen = true;
    for dep in dependencies {
        visit(state, dep, true, memoized_set)?;
    }
    Ok(())
}
