//! Phase 1: the dependency collector.
//!
//! Walks every instruction, classifies its value via the authoritative
//! value-kind table, and records lvalue/rvalue aliasing into the identifier
//! and scope graphs carried by `State`.

use crate::diagnostics::pruner_trace;
use crate::errors::PrunerError;
use crate::graph::State;
use crate::hir::{
    ArrayElement, DestructurePattern, IdentifierId, Instruction, InstructionValue,
    MemoizationOptions, ObjectProperty, ObjectPropertyKey, Place, ReactiveFunction,
    ReactiveScopeBlock, ScopeId, SourceLocation, Terminal,
};
use crate::lattice::MemoizationLevel;
use crate::visitor::{walk_scope, walk_terminal, ReactiveFunctionVisitor};

/// One instruction's classification: which places become lvalues (and at
/// what level) and which places are rvalues.
struct ClassificationResult {
    lvalues: Vec<(Place, MemoizationLevel)>,
    rvalues: Vec<Place>,
}

impl ClassificationResult {
    fn new() -> Self {
        ClassificationResult {
            lvalues: Vec::new(),
            rvalues: Vec::new(),
        }
    }

    fn with_lvalue_level(mut self, place: Option<Place>, level: MemoizationLevel) -> Self {
        if let Some(place) = place {
            self.lvalues.push((place, level));
        }
        self
    }
}

/// Every operand place of a value, regardless of effect.
fn each_operand(value: &InstructionValue) -> Vec<Place> {
    match value {
        InstructionValue::ConditionalExpression {
            test,
            consequent,
            alternate,
        } => vec![*test, *consequent, *alternate],
        InstructionValue::LogicalExpression { left, right } => vec![*left, *right],
        InstructionValue::SequenceExpression { discarded, value } => {
            let mut ops = discarded.clone();
            ops.push(*value);
            ops
        }
        InstructionValue::JsxExpression {
            tag,
            attributes,
            children,
        } => {
            let mut ops: Vec<Place> = tag.into_iter().copied().collect();
            for attr in attributes {
                match attr {
                    crate::hir::JsxAttribute::Named { value, .. } => ops.push(*value),
                    crate::hir::JsxAttribute::Spread(p) => ops.push(*p),
                }
            }
            ops.extend(children.iter().copied());
            ops
        }
        InstructionValue::JsxFragment { children } => children.clone(),
        InstructionValue::Primitive { .. }
        | InstructionValue::TemplateLiteral { .. }
        | InstructionValue::JsxText { .. }
        | InstructionValue::LoadGlobal { .. }
        | InstructionValue::RegExpLiteral { .. }
        | InstructionValue::UnsupportedNode { .. } => vec![],
        InstructionValue::BinaryExpression { left, right, .. } => vec![*left, *right],
        InstructionValue::UnaryExpression { operand, .. } => vec![*operand],
        InstructionValue::PropertyDelete { object, .. } => vec![*object],
        InstructionValue::ComputedDelete { object, property } => vec![*object, *property],
        InstructionValue::TypeCastExpression { value } => vec![*value],
        InstructionValue::LoadLocal { place } => vec![*place],
        InstructionValue::DeclareLocal { place } => vec![*place],
        InstructionValue::StoreLocal { lvalue, value } => vec![*lvalue, *value],
        InstructionValue::Destructure { value, .. } => vec![*value],
        InstructionValue::PropertyLoad { object, .. } => vec![*object],
        InstructionValue::ComputedLoad { object, property } => vec![*object, *property],
        InstructionValue::ComputedStore {
            object,
            property,
            value,
        } => vec![*object, *property, *value],
        InstructionValue::ArrayExpression { elements } => elements
            .iter()
            .filter_map(|e| match e {
                ArrayElement::Item(p) | ArrayElement::Spread(p) => Some(*p),
                ArrayElement::Hole => None,
            })
            .collect(),
        InstructionValue::ObjectExpression { properties } => {
            let mut ops = Vec::new();
            for prop in properties {
                match prop {
                    ObjectProperty::KeyValue { key, value } => {
                        if let ObjectPropertyKey::Computed(p) = key {
                            ops.push(*p);
                        }
                        ops.push(*value);
                    }
                    ObjectProperty::Spread(p) => ops.push(*p),
                }
            }
            ops
        }
        InstructionValue::NewExpression { callee, args }
        | InstructionValue::CallExpression { callee, args }
        | InstructionValue::OptionalCall { callee, args, .. } => {
            let mut ops = vec![*callee];
            ops.extend(args.iter().map(|a| a.place()));
            ops
        }
        InstructionValue::MethodCall { receiver, args, .. } => {
            let mut ops = vec![*receiver];
            ops.extend(args.iter().map(|a| a.place()));
            ops
        }
        InstructionValue::PropertyStore { object, value, .. } => vec![*object, *value],
        InstructionValue::FunctionExpression { captures } => captures.clone(),
        InstructionValue::TaggedTemplateExpression {
            tag,
            quasi_expressions,
        } => {
            let mut ops = vec![*tag];
            ops.extend(quasi_expressions.iter().copied());
            ops
        }
    }
}

/// Implements the authoritative classification table: for each value kind,
/// which places become lvalues (and at what memoization level) and which
/// places are rvalues.
fn compute_memoization_inputs(
    value: &InstructionValue,
    lvalue: Option<Place>,
    loc: SourceLocation,
    options: &MemoizationOptions,
) -> Result<ClassificationResult, PrunerError> {
    use MemoizationLevel::*;

    let mut result = ClassificationResult::new();

    match value {
        InstructionValue::ConditionalExpression {
            consequent,
            alternate,
            ..
        } => {
            result = result.with_lvalue_level(lvalue, Conditional);
            result.rvalues.push(*consequent);
            result.rvalues.push(*alternate);
        }
        InstructionValue::LogicalExpression { left, right } => {
            result = result.with_lvalue_level(lvalue, Conditional);
            result.rvalues.push(*left);
            result.rvalues.push(*right);
        }
        InstructionValue::SequenceExpression { value: final_value, .. } => {
            result = result.with_lvalue_level(lvalue, Conditional);
            result.rvalues.push(*final_value);
        }
        InstructionValue::JsxExpression { .. } | InstructionValue::JsxFragment { .. } => {
            let level = if options.memoize_jsx_elements {
                Memoized
            } else {
                Unmemoized
            };
            result = result.with_lvalue_level(lvalue, level);
            result.rvalues = each_operand(value);
        }
        InstructionValue::Primitive { .. }
        | InstructionValue::TemplateLiteral { .. }
        | InstructionValue::JsxText { .. }
        | InstructionValue::BinaryExpression { .. }
        | InstructionValue::UnaryExpression { .. }
        | InstructionValue::LoadGlobal { .. }
        | InstructionValue::PropertyDelete { .. }
        | InstructionValue::ComputedDelete { .. } => {
            result = result.with_lvalue_level(lvalue, Never);
        }
        InstructionValue::TypeCastExpression { value: inner } => {
            result = result.with_lvalue_level(lvalue, Conditional);
            result.rvalues.push(*inner);
        }
        InstructionValue::LoadLocal { place } => {
            result = result.with_lvalue_level(lvalue, Conditional);
            result.rvalues.push(*place);
        }
        InstructionValue::DeclareLocal { place } => {
            result.lvalues.push((*place, Unmemoized));
            result = result.with_lvalue_level(lvalue, Unmemoized);
        }
        InstructionValue::StoreLocal {
            lvalue: stored_place,
            value: stored_value,
        } => {
            result.lvalues.push((*stored_place, Conditional));
            result = result.with_lvalue_level(lvalue, Conditional);
            result.rvalues.push(*stored_value);
        }
        InstructionValue::Destructure { pattern, value: source } => {
            result = result.with_lvalue_level(lvalue, Conditional);
            result.rvalues.push(*source);
            match pattern {
                DestructurePattern::Array(elements) => {
                    for el in elements {
                        match el {
                            crate::hir::ArrayPatternElement::Item(p) => {
                                result.lvalues.push((*p, Conditional))
                            }
                            crate::hir::ArrayPatternElement::Rest(p) => {
                                result.lvalues.push((*p, Memoized))
                            }
                            crate::hir::ArrayPatternElement::Hole => {}
                        }
                    }
                }
                DestructurePattern::Object(properties) => {
                    for prop in properties {
                        match prop {
                            crate::hir::ObjectPatternProperty::Property(p) => {
                                result.lvalues.push((*p, Conditional))
                            }
                            crate::hir::ObjectPatternProperty::Rest(p) => {
                                result.lvalues.push((*p, Memoized))
                            }
                        }
                    }
                }
            }
        }
        InstructionValue::PropertyLoad { object, .. } => {
            result = result.with_lvalue_level(lvalue, Conditional);
            result.rvalues.push(*object);
        }
        InstructionValue::ComputedLoad { object, .. } => {
            result = result.with_lvalue_level(lvalue, Conditional);
            result.rvalues.push(*object);
        }
        InstructionValue::ComputedStore { object, value: stored, .. } => {
            result.lvalues.push((*object, Conditional));
            result = result.with_lvalue_level(lvalue, Conditional);
            result.rvalues.push(*stored);
        }
        InstructionValue::ArrayExpression { .. }
        | InstructionValue::ObjectExpression { .. }
        | InstructionValue::NewExpression { .. }
        | InstructionValue::CallExpression { .. }
        | InstructionValue::MethodCall { .. }
        | InstructionValue::OptionalCall { .. }
        | InstructionValue::PropertyStore { .. }
        | InstructionValue::FunctionExpression { .. }
        | InstructionValue::RegExpLiteral { .. }
        | InstructionValue::TaggedTemplateExpression { .. } => {
            let operands = each_operand(value);
            for op in &operands {
                if op.effect.is_mutable() {
                    result.lvalues.push((*op, Memoized));
                }
            }
            result = result.with_lvalue_level(lvalue, Memoized);
            result.rvalues = operands;
        }
        InstructionValue::UnsupportedNode { .. } => {
            return Err(PrunerError::UnsupportedValueKind {
                kind: value.kind_name().into_owned(),
                location: loc,
            });
        }
    }

    Ok(result)
}

/// Walks a reactive function and populates `State` with the identifier and
/// scope graphs.
pub struct DependencyCollector<'a> {
    state: State,
    options: &'a MemoizationOptions,
    scope_stack: Vec<ScopeId>,
}

impl<'a> DependencyCollector<'a> {
    pub fn new(options: &'a MemoizationOptions) -> Self {
        DependencyCollector {
            state: State::new(),
            options,
            scope_stack: Vec::new(),
        }
    }

    /// Runs the collector over `func`, pre-declaring its id and parameters
    /// at `Never`, and returns the populated `State`.
    pub fn collect(mut self, func: &ReactiveFunction) -> Result<State, PrunerError> {
        if let Some(id) = func.id {
            self.state.declare(id, MemoizationLevel::Never);
        }
        for param in &func.params {
            self.state.declare(param.identifier, MemoizationLevel::Never);
        }
        self.visit_function(func)?;
        trace_collected_state(&self.state);
        Ok(self.state)
    }

    fn active_scope(&self) -> Option<ScopeId> {
        self.scope_stack.last().copied()
    }

    /// Resolves the indirection, then associates the identifier with the
    /// scope active at this instruction, if any.
    fn visit_operand(&mut self, place: Place) -> IdentifierId {
        let resolved = self.state.resolve(place.identifier);
        if let Some(scope_id) = self.active_scope() {
            self.state.add_to_scope(resolved, scope_id);
        }
        resolved
    }
}

impl<'a> ReactiveFunctionVisitor for DependencyCollector<'a> {
    fn visit_scope(&mut self, scope_block: &ReactiveScopeBlock) -> Result<(), PrunerError> {
        self.state.get_or_create_scope(&scope_block.scope);
        self.scope_stack.push(scope_block.scope.id);
        let result = walk_scope(self, scope_block);
        self.scope_stack.pop();
        result
    }

    fn visit_instruction(&mut self, instr: &Instruction) -> Result<(), PrunerError> {
        let classification =
            compute_memoization_inputs(&instr.value, instr.lvalue, instr.loc, self.options)?;

        let resolved_lvalues: Vec<(IdentifierId, MemoizationLevel)> = classification
            .lvalues
            .iter()
            .map(|(place, level)| (self.visit_operand(*place), *level))
            .collect();
        for &(id, level) in &resolved_lvalues {
            self.state.join_level(id, level);
        }

        let resolved_rvalues: Vec<IdentifierId> = classification
            .rvalues
            .iter()
            .map(|place| self.visit_operand(*place))
            .collect();
        for &rvalue_id in &resolved_rvalues {
            for &(lvalue_id, _) in &resolved_lvalues {
                self.state.add_dependency(lvalue_id, rvalue_id);
            }
        }

        if let InstructionValue::LoadLocal { .. } = &instr.value {
            if let (Some(lvalue), Some(&source_id)) = (instr.lvalue, resolved_rvalues.first()) {
                self.state.record_definition(lvalue.identifier, source_id);
            }
        }

        Ok(())
    }

    fn visit_terminal(&mut self, term: &Terminal) -> Result<(), PrunerError> {
        if let Terminal::Return {
            value: Some(place), ..
        } = term
        {
            let resolved = self.state.resolve(place.identifier);
            self.state.add_returned(resolved);
        }
        walk_terminal(self, term)
    }
}

fn trace_collected_state(state: &State) {
    let mut ids: Vec<_> = state.identifiers().map(|(id, _)| id.0).collect();
    ids.sort_unstable();
    pruner_trace!("collected {} identifier node(s)", ids.len());
    for (id, node) in state.identifiers() {
        pruner_trace!(
            "  id={} level={:?} deps={} scopes={}",
            id.0,
            node.level,
            node.dependencies.len(),
            node.scopes.len()
        );
    }
    let scope_count = state.scopes().count();
    pruner_trace!("collected {} scope node(s)", scope_count);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hir::*;

    fn p(id: u32) -> Place {
        Place::new(IdentifierId(id), Effect::Read)
    }

    #[test]
    fn binary_expression_has_no_rvalues() {
        let options = MemoizationOptions::default();
        let value = InstructionValue::BinaryExpression {
            operator: "+".into(),
            left: p(1),
            right: p(2),
        };
        let result =
            compute_memoization_inputs(&value, Some(p(3)), SourceLocation::default(), &options)
                .unwrap();
        assert!(result.rvalues.is_empty());
        assert_eq!(result.lvalues, vec![(p(3), MemoizationLevel::Never)]);
    }

    #[test]
    fn array_expression_promotes_mutable_operands() {
        let options = MemoizationOptions::default();
        let mutated = Place::new(IdentifierId(1), Effect::Capture);
        let value = InstructionValue::ArrayExpression {
            elements: vec![ArrayElement::Item(mutated)],
        };
        let result =
            compute_memoization_inputs(&value, Some(p(9)), SourceLocation::default(), &options)
                .unwrap();
        assert!(result
            .lvalues
            .iter()
            .any(|(place, level)| *place == mutated && *level == MemoizationLevel::Memoized));
        assert!(result
            .lvalues
            .iter()
            .any(|(place, level)| *place == p(9) && *level == MemoizationLevel::Memoized));
        assert_eq!(result.rvalues, vec![mutated]);
    }

    #[test]
    fn jsx_respects_memoize_flag() {
        let value = InstructionValue::JsxExpression {
            tag: None,
            attributes: vec![],
            children: vec![p(1)],
        };
        let off = compute_memoization_inputs(
            &value,
            Some(p(2)),
            SourceLocation::default(),
            &MemoizationOptions {
                memoize_jsx_elements: false,
            },
        )
        .unwrap();
        assert_eq!(off.lvalues[0].1, MemoizationLevel::Unmemoized);

        let on = compute_memoization_inputs(
            &value,
            Some(p(2)),
            SourceLocation::default(),
            &MemoizationOptions {
                memoize_jsx_elements: true,
            },
        )
        .unwrap();
        assert_eq!(on.lvalues[0].1, MemoizationLevel::Memoized);
    }

    #[test]
    fn unsupported_node_is_fatal() {
        let value = InstructionValue::UnsupportedNode {
            kind: "MysteryNode".into(),
        };
        let err =
            compute_memoization_inputs(&value, None, SourceLocation::default(), &MemoizationOptions::default())
                .unwrap_err();
        assert!(matches!(err, PrunerError::UnsupportedValueKind { .. }));
    }

    #[test]
    fn destructure_rest_slot_is_memoized_ordinary_slot_is_conditional() {
        let options = MemoizationOptions::default();
        let a = p(1);
        let rest = p(2);
        let value = InstructionValue::Destructure {
            pattern: DestructurePattern::Object(vec![
                ObjectPatternProperty::Property(a),
                ObjectPatternProperty::Rest(rest),
            ]),
            value: p(3),
        };
        let result =
            compute_memoization_inputs(&value, Some(p(4)), SourceLocation::default(), &options)
                .unwrap();
        assert!(result
            .lvalues
            .iter()
            .any(|(place, level)| *place == a && *level == MemoizationLevel::Conditional));
        assert!(result
            .lvalues
            .iter()
            .any(|(place, level)| *place == rest && *level == MemoizationLevel::Memoized));
    }

    #[test]
    fn computed_load_key_is_not_aliased() {
        let options = MemoizationOptions::default();
        let object = p(1);
        let key = p(2);
        let value = InstructionValue::ComputedLoad {
            object,
            property: key,
        };
        let result =
            compute_memoization_inputs(&value, Some(p(3)), SourceLocation::default(), &options)
                .unwrap();
        assert_eq!(result.rvalues, vec![object]);
        assert!(!result.rvalues.contains(&key));
    }
}
