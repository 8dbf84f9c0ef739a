//! Phase 3: the scope-pruning transform.

use crate::diagnostics::pruner_trace;
use crate::hir::{IdentifierId, ReactiveFunction, ReactiveScopeBlock};
use crate::visitor::{transform_function, ReactiveFunctionTransform, ScopeTransformResult};
use std::collections::HashSet;

/// Keeps a scope iff one of its declared or reassigned identifiers is in the
/// memoized set; otherwise replaces it with its own instruction sequence
/// inlined in place. Recurses into nested scopes regardless of the outer
/// decision (handled by `transform_statements`, not here).
pub struct ScopePruner<'a> {
    memoized: &'a HashSet<IdentifierId>,
}

impl<'a> ScopePruner<'a> {
    pub fn new(memoized: &'a HashSet<IdentifierId>) -> Self {
        ScopePruner { memoized }
    }

    pub fn prune(&mut self, func: &mut ReactiveFunction) {
        transform_function(self, func);
    }
}

impl<'a> ReactiveFunctionTransform for ScopePruner<'a> {
    fn transform_scope(&mut self, scope_block: &mut ReactiveScopeBlock) -> ScopeTransformResult {
        let keep = scope_block
            .scope
            .written_identifiers()
            .any(|id| self.memoized.contains(&id));

        if keep {
            ScopeTransformResult::Keep
        } else {
            pruner_trace!("pruning scope {}", scope_block.scope.id.0);
            ScopeTransformResult::ReplaceMany(std::mem::take(&mut scope_block.instructions))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hir::*;

    fn primitive_instruction(id: InstructionId, lvalue: IdentifierId) -> ReactiveStatement {
        ReactiveStatement::Instruction(Instruction {
            id,
            lvalue: Some(Place::new(lvalue, Effect::Store)),
            value: InstructionValue::Primitive { raw: "1".into() },
            loc: SourceLocation::default(),
        })
    }

    #[test]
    fn unmemoized_scope_is_inlined() {
        let scope_block = ReactiveScopeBlock {
            scope: ReactiveScope {
                id: ScopeId(1),
                dependencies: vec![],
                declarations: vec![IdentifierId(1)],
                reassignments: vec![],
            },
            instructions: vec![primitive_instruction(0, IdentifierId(1))],
        };
        let mut func = ReactiveFunction {
            id: None,
            params: vec![],
            body: ReactiveBlock(vec![ReactiveStatement::Scope(scope_block)]),
        };

        let memoized = HashSet::new();
        ScopePruner::new(&memoized).prune(&mut func);

        assert_eq!(func.body.0.len(), 1);
        assert!(matches!(func.body.0[0], ReactiveStatement::Instruction(_)));
    }

    #[test]
    fn memoized_scope_is_kept() {
        let scope_block = ReactiveScopeBlock {
            scope: ReactiveScope {
                id: ScopeId(1),
                dependencies: vec![],
                declarations: vec![IdentifierId(1)],
                reassignments: vec![],
            },
            instructions: vec![primitive_instruction(0, IdentifierId(1))],
        };
        let mut func = ReactiveFunction {
            id: None,
            params: vec![],
            body: ReactiveBlock(vec![ReactiveStatement::Scope(scope_block)]),
        };

        let mut memoized = HashSet::new();
        memoized.insert(IdentifierId(1));
        ScopePruner::new(&memoized).prune(&mut func);

        assert_eq!(func.body.0.len(), 1);
        assert!(matches!(func.body.0[0], ReactiveStatement::Scope(_)));
    }

    #[test]
    fn reassignment_alone_can_keep_a_scope() {
        let scope_block = ReactiveScopeBlock {
            scope: ReactiveScope {
                id: ScopeId(1),
                dependencies: vec![],
                declarations: vec![IdentifierId(1)],
                reassignments: vec![IdentifierId(2)],
            },
            instructions: vec![],
        };
        let mut func = ReactiveFunction {
            id: None,
            params: vec![],
            body: ReactiveBlock(vec![ReactiveStatement::Scope(scope_block)]),
        };

        let mut memoized = HashSet::new();
        memoized.insert(IdentifierId(2));
        ScopePruner::new(&memoized).prune(&mut func);

        assert!(matches!(func.body.0[0], ReactiveStatement::Scope(_)));
    }
}
