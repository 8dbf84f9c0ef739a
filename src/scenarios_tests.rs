//! End-to-end scope-pruning scenarios, each built from hand-assembled HIR
//! fixtures and run through the full `prune_non_escaping_scopes` pass.

#[cfg(test)]
mod tests {
    use crate::hir::*;
    use crate::prune_non_escaping_scopes;
    use crate::test_support::*;

    fn is_scope(stmt: &ReactiveStatement) -> bool {
        matches!(stmt, ReactiveStatement::Scope(_))
    }

    #[test]
    fn unused_local_is_pruned_kept_scope_survives() {
        // const a = {}; const b = {}; return b;
        let scope_a = scope(1, vec![], vec![1], vec![store_instruction(
            0,
            1,
            InstructionValue::ObjectExpression { properties: vec![] },
        )]);
        let scope_b = scope(2, vec![], vec![2], vec![store_instruction(
            1,
            2,
            InstructionValue::ObjectExpression { properties: vec![] },
        )]);
        let mut func = function(vec![], vec![scope_a, scope_b, return_terminal(2, 2)]);

        prune_non_escaping_scopes(&mut func, &MemoizationOptions::default()).unwrap();

        assert!(!is_scope(&func.body.0[0]), "a's scope should be inlined");
        assert!(is_scope(&func.body.0[1]), "b's scope should survive");
    }

    #[test]
    fn transitive_alias_keeps_both_scopes() {
        // const b = {}; const c = [b]; return c;
        let scope_b = scope(1, vec![], vec![1], vec![store_instruction(
            0,
            1,
            InstructionValue::ObjectExpression { properties: vec![] },
        )]);
        let scope_c = scope(2, vec![], vec![2], vec![store_instruction(
            1,
            2,
            InstructionValue::ArrayExpression {
                elements: vec![ArrayElement::Item(read(1))],
            },
        )]);
        let mut func = function(vec![], vec![scope_b, scope_c, return_terminal(2, 2)]);

        prune_non_escaping_scopes(&mut func, &MemoizationOptions::default()).unwrap();

        assert!(is_scope(&func.body.0[0]), "b's scope should survive");
        assert!(is_scope(&func.body.0[1]), "c's scope should survive");
    }

    #[test]
    fn interleaved_group_forces_merged_scope_dependency() {
        // const a = [...]; { const b = []; const c = {}; b.push(...) } // b, c merged, depends on a
        // return b;
        let scope_a = scope(1, vec![], vec![1], vec![store_instruction(
            0,
            1,
            InstructionValue::ArrayExpression { elements: vec![] },
        )]);

        let merged_scope = ReactiveStatement::Scope(ReactiveScopeBlock {
            scope: ReactiveScope {
                id: ScopeId(2),
                dependencies: vec![IdentifierId(1)],
                declarations: vec![IdentifierId(2), IdentifierId(3)],
                reassignments: vec![],
            },
            instructions: vec![
                store_instruction(1, 2, InstructionValue::ArrayExpression { elements: vec![] }),
                store_instruction(2, 3, InstructionValue::ObjectExpression { properties: vec![] }),
                bare_instruction(
                    3,
                    InstructionValue::MethodCall {
                        receiver: place(2, Effect::Capture),
                        property: "push".into(),
                        args: vec![],
                    },
                ),
            ],
        });

        let mut func = function(vec![], vec![scope_a, merged_scope, return_terminal(3, 2)]);

        prune_non_escaping_scopes(&mut func, &MemoizationOptions::default()).unwrap();

        assert!(is_scope(&func.body.0[0]), "a's scope should be forced via the merged scope");
        assert!(is_scope(&func.body.0[1]), "the merged scope should be kept");
    }

    #[test]
    fn jsx_default_policy_prunes_unless_the_flag_is_set() {
        // function C(p) { return <div>{p.x}</div>; }
        let jsx_scope = scope(1, vec![], vec![1], vec![store_instruction(
            0,
            1,
            InstructionValue::JsxExpression {
                tag: None,
                attributes: vec![],
                children: vec![read(100)],
            },
        )]);
        let mut func_off = function(
            vec![100],
            vec![jsx_scope.clone(), return_terminal(1, 1)],
        );
        prune_non_escaping_scopes(
            &mut func_off,
            &MemoizationOptions {
                memoize_jsx_elements: false,
            },
        )
        .unwrap();
        assert!(!is_scope(&func_off.body.0[0]), "JSX scope should be pruned by default");

        let mut func_on = function(vec![100], vec![jsx_scope, return_terminal(1, 1)]);
        prune_non_escaping_scopes(
            &mut func_on,
            &MemoizationOptions {
                memoize_jsx_elements: true,
            },
        )
        .unwrap();
        assert!(is_scope(&func_on.body.0[0]), "JSX scope should be kept when the flag is on");
    }

    #[test]
    fn primitive_only_return_memoizes_nothing() {
        // function f(x, y) { return x + y; }
        let sum_scope = scope(1, vec![], vec![3], vec![store_instruction(
            0,
            3,
            InstructionValue::BinaryExpression {
                operator: "+".into(),
                left: read(1),
                right: read(2),
            },
        )]);
        let mut func = function(vec![1, 2], vec![sum_scope, return_terminal(1, 3)]);

        prune_non_escaping_scopes(&mut func, &MemoizationOptions::default()).unwrap();

        assert!(!is_scope(&func.body.0[0]), "a primitive-only scope is never worth memoizing");
    }

    #[test]
    fn destructure_rest_slot_forces_its_scope_but_a_alone_would_not() {
        // function f(o) { const { a, ...rest } = o; return rest; }
        let destructure_scope = scope(1, vec![], vec![1, 2], vec![ReactiveStatement::Instruction(
            Instruction {
                id: 0,
                lvalue: None,
                value: InstructionValue::Destructure {
                    pattern: DestructurePattern::Object(vec![
                        ObjectPatternProperty::Property(place(1, Effect::Store)),
                        ObjectPatternProperty::Rest(place(2, Effect::Store)),
                    ]),
                    value: read(100),
                },
                loc: SourceLocation::default(),
            },
        )]);
        let mut func = function(vec![100], vec![destructure_scope, return_terminal(1, 2)]);

        prune_non_escaping_scopes(&mut func, &MemoizationOptions::default()).unwrap();

        assert!(is_scope(&func.body.0[0]), "the rest slot should force its scope to survive");
    }
}
