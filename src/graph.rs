//! The identifier/scope dependency graph and pass-scoped `State` container.

use crate::hir::{IdentifierId, ReactiveScope, ScopeId};
use crate::lattice::MemoizationLevel;
use std::collections::{BTreeSet, HashMap, HashSet};

/// Graph vertex per `IdentifierId`.
#[derive(Debug, Clone, Default)]
pub struct IdentifierNode {
    pub level: MemoizationLevel,
    pub dependencies: BTreeSet<IdentifierId>,
    pub scopes: BTreeSet<ScopeId>,
    /// Solver output (phase 2).
    pub memoized: bool,
    /// Traversal mark (phase 2).
    pub seen: bool,
}

/// Graph vertex per `ScopeId`.
#[derive(Debug, Clone)]
pub struct ScopeNode {
    /// Fixed at creation; re-adding the same scope is a no-op.
    pub dependencies: Vec<IdentifierId>,
    pub seen: bool,
}

/// Pass-scoped container populated by the collector (phase 1), read by the
/// solver (phase 2, except `seen`/`memoized`), and discarded after the
/// transform (phase 3).
#[derive(Debug, Default)]
pub struct State {
    /// Collapses `LoadLocal` indirections: `lvalue -> source`. Lookups that
    /// miss return the input unchanged.
    definitions: HashMap<IdentifierId, IdentifierId>,
    identifiers: HashMap<IdentifierId, IdentifierNode>,
    scopes: HashMap<ScopeId, ScopeNode>,
    /// Identifiers reached by a `return`, in insertion order. `returned_set`
    /// exists only to dedupe insertion; solver iteration goes over `returned`.
    returned: Vec<IdentifierId>,
    returned_set: HashSet<IdentifierId>,
}

impl State {
    pub fn new() -> Self {
        State::default()
    }

    /// Lazily creates the node on first mention, per the data-model invariant.
    pub fn identifier_mut(&mut self, id: IdentifierId) -> &mut IdentifierNode {
        self.identifiers.entry(id).or_default()
    }

    pub fn identifier(&self, id: IdentifierId) -> Option<&IdentifierNode> {
        self.identifiers.get(&id)
    }

    pub fn identifier_mut_existing(&mut self, id: IdentifierId) -> Option<&mut IdentifierNode> {
        self.identifiers.get_mut(&id)
    }

    /// Pre-declares an identifier (function id, parameters) at a fixed level
    /// without otherwise touching an already-present node's dependencies.
    pub fn declare(&mut self, id: IdentifierId, level: MemoizationLevel) {
        let node = self.identifier_mut(id);
        node.level = node.level.join(level);
    }

    /// Joins `level` into `id`'s current level.
    pub fn join_level(&mut self, id: IdentifierId, level: MemoizationLevel) {
        let node = self.identifier_mut(id);
        node.level = node.level.join(level);
    }

    /// Adds `from` as a dependency of `to`, excluding self-loops.
    pub fn add_dependency(&mut self, to: IdentifierId, from: IdentifierId) {
        if to == from {
            return;
        }
        self.identifier_mut(to).dependencies.insert(from);
    }

    /// Lazily creates the scope node using the scope's declared dependencies;
    /// a second call for the same scope id is a no-op.
    pub fn get_or_create_scope(&mut self, scope: &ReactiveScope) -> &mut ScopeNode {
        self.scopes.entry(scope.id).or_insert_with(|| ScopeNode {
            dependencies: scope.dependencies.clone(),
            seen: false,
        })
    }

    pub fn scope(&self, id: ScopeId) -> Option<&ScopeNode> {
        self.scopes.get(&id)
    }

    pub fn scope_mut(&mut self, id: ScopeId) -> Option<&mut ScopeNode> {
        self.scopes.get_mut(&id)
    }

    /// Adds `scope_id` to `id`'s scope membership.
    pub fn add_to_scope(&mut self, id: IdentifierId, scope_id: ScopeId) {
        self.identifier_mut(id).scopes.insert(scope_id);
    }

    /// Records the `LoadLocal` indirection `lvalue -> source`. Asserts
    /// single-step rather than iterating to a fixed point (see DESIGN.md):
    /// `source` must not itself already be a key in `definitions`, since that
    /// would mean an upstream pass produced a chain this collector does not
    /// collapse transitively.
    pub fn record_definition(&mut self, lvalue: IdentifierId, source: IdentifierId) {
        debug_assert!(
            !self.definitions.contains_key(&source),
            "LoadLocal indirection chain deeper than one step for {:?} -> {:?}; \
             upstream HIR must normalize chains before this pass runs",
            lvalue,
            source
        );
        self.definitions.insert(lvalue, source);
    }

    /// Collapses a single-step `LoadLocal` indirection. Misses return the
    /// input unchanged.
    pub fn resolve(&self, id: IdentifierId) -> IdentifierId {
        self.definitions.get(&id).copied().unwrap_or(id)
    }

    pub fn add_returned(&mut self, id: IdentifierId) {
        if self.returned_set.insert(id) {
            self.returned.push(id);
        }
    }

    /// Returned identifiers in insertion order; the solver iterates these in
    /// insertion order for deterministic output.
    pub fn returned(&self) -> &[IdentifierId] {
        &self.returned
    }

    pub fn identifiers(&self) -> impl Iterator<Item = (&IdentifierId, &IdentifierNode)> {
        self.identifiers.iter()
    }

    pub fn scopes(&self) -> impl Iterator<Item = (&ScopeId, &ScopeNode)> {
        self.scopes.iter()
    }
}
