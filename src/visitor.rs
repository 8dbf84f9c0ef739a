//! The reactive function's traversal mechanism.
//!
//! `visit_*` methods have default `walk_*` bodies; implementers override a
//! `visit_*` method to add behavior and call the matching `walk_*` helper to
//! continue traversal. The transform variant adds `transform_scope`, which
//! may return `Keep` or `ReplaceMany` — the parent statement list splices in
//! whatever the returned enum says.
//!
//! Rules:
//! 1. Traversal order is necessary and fixed: source order, blocks before
//!    nested blocks, `if`/`try`/`switch` branches in declaration order.
//! 2. Implementers override `visit_*`/`transform_*` methods to add behavior.
//! 3. Implementers MUST call `walk_*`/the statement-list helpers to continue
//!    traversal unless pruning is intended.

use crate::errors::PrunerError;
use crate::hir::{
    Instruction, ReactiveBlock, ReactiveFunction, ReactiveScopeBlock, ReactiveStatement, Terminal,
};

/// Read-only traversal of a reactive function. Fallible because the
/// collector (the sole implementer) can hit `PrunerError::UnsupportedValueKind`
/// mid-walk and the pass is all-or-nothing: the first error aborts the whole
/// traversal rather than collecting partial state.
pub trait ReactiveFunctionVisitor {
    fn visit_function(&mut self, func: &ReactiveFunction) -> Result<(), PrunerError> {
        walk_function(self, func)
    }

    fn visit_block(&mut self, block: &ReactiveBlock) -> Result<(), PrunerError> {
        walk_block(self, block)
    }

    fn visit_statement(&mut self, stmt: &ReactiveStatement) -> Result<(), PrunerError> {
        walk_statement(self, stmt)
    }

    fn visit_scope(&mut self, scope_block: &ReactiveScopeBlock) -> Result<(), PrunerError> {
        walk_scope(self, scope_block)
    }

    fn visit_instruction(&mut self, _instr: &Instruction) -> Result<(), PrunerError> {
        // Leaf node by default; overridden by the collector.
        Ok(())
    }

    fn visit_terminal(&mut self, term: &Terminal) -> Result<(), PrunerError> {
        walk_terminal(self, term)
    }
}

pub fn walk_function<V: ReactiveFunctionVisitor + ?Sized>(
    visitor: &mut V,
    func: &ReactiveFunction,
) -> Result<(), PrunerError> {
    visitor.visit_block(&func.body)
}

pub fn walk_block<V: ReactiveFunctionVisitor + ?Sized>(
    visitor: &mut V,
    block: &ReactiveBlock,
) -> Result<(), PrunerError> {
    for stmt in &block.0 {
        visitor.visit_statement(stmt)?;
    }
    Ok(())
}

pub fn walk_statement<V: ReactiveFunctionVisitor + ?Sized>(
    visitor: &mut V,
    stmt: &ReactiveStatement,
) -> Result<(), PrunerError> {
    match stmt {
        ReactiveStatement::Block(block) => visitor.visit_block(block),
        ReactiveStatement::Scope(scope_block) => visitor.visit_scope(scope_block),
        ReactiveStatement::Instruction(instr) => visitor.visit_instruction(instr),
        ReactiveStatement::Terminal(term) => visitor.visit_terminal(term),
    }
}

pub fn walk_scope<V: ReactiveFunctionVisitor + ?Sized>(
    visitor: &mut V,
    scope_block: &ReactiveScopeBlock,
) -> Result<(), PrunerError> {
    for stmt in &scope_block.instructions {
        visitor.visit_statement(stmt)?;
    }
    Ok(())
}

pub fn walk_terminal<V: ReactiveFunctionVisitor + ?Sized>(
    visitor: &mut V,
    term: &Terminal,
) -> Result<(), PrunerError> {
    match term {
        Terminal::Return { .. } => {}
        Terminal::If {
            consequent,
            alternate,
            ..
        } => {
            visitor.visit_block(consequent)?;
            if let Some(alt) = alternate {
                visitor.visit_block(alt)?;
            }
        }
        Terminal::Loop { body, .. } => visitor.visit_block(body)?,
        Terminal::Switch { cases, .. } => {
            for case in cases {
                visitor.visit_block(case)?;
            }
        }
        Terminal::Label { block, .. } => visitor.visit_block(block)?,
        Terminal::Try { block, handler, .. } => {
            visitor.visit_block(block)?;
            if let Some(h) = handler {
                visitor.visit_block(h)?;
            }
        }
    }
    Ok(())
}

/// Outcome of transforming one scope statement.
pub enum ScopeTransformResult {
    Keep,
    ReplaceMany(Vec<ReactiveStatement>),
}

/// Mutating traversal that can inline (prune) reactive scopes.
pub trait ReactiveFunctionTransform {
    fn transform_scope(&mut self, scope_block: &mut ReactiveScopeBlock) -> ScopeTransformResult;
}

pub fn transform_function<T: ReactiveFunctionTransform + ?Sized>(
    transform: &mut T,
    func: &mut ReactiveFunction,
) {
    transform_statements(transform, &mut func.body.0);
}

/// Transforms a statement list in place, splicing `ReplaceMany` results and
/// recursing into nested blocks/scopes/terminal branches regardless of the
/// outer scope's keep/prune decision: inner scopes must still get a chance
/// to prune even when the scope containing them does not.
pub fn transform_statements<T: ReactiveFunctionTransform + ?Sized>(
    transform: &mut T,
    statements: &mut Vec<ReactiveStatement>,
) {
    let old = std::mem::take(statements);
    let mut rewritten = Vec::with_capacity(old.len());
    for stmt in old {
        match stmt {
            ReactiveStatement::Scope(mut scope_block) => {
                // Nested scopes are decided independently before the outer
                // scope is, so a pruned outer scope can still inline a kept
                // inner one.
                transform_statements(transform, &mut scope_block.instructions);
                match transform.transform_scope(&mut scope_block) {
                    ScopeTransformResult::Keep => {
                        rewritten.push(ReactiveStatement::Scope(scope_block))
                    }
                    ScopeTransformResult::ReplaceMany(replacement) => {
                        rewritten.extend(replacement)
                    }
                }
            }
            ReactiveStatement::Block(mut block) => {
                transform_statements(transform, &mut block.0);
                rewritten.push(ReactiveStatement::Block(block));
            }
            ReactiveStatement::Terminal(mut term) => {
                transform_terminal(transform, &mut term);
                rewritten.push(ReactiveStatement::Terminal(term));
            }
            instr @ ReactiveStatement::Instruction(_) => rewritten.push(instr),
        }
    }
    *statements = rewritten;
}

fn transform_terminal<T: ReactiveFunctionTransform + ?Sized>(transform: &mut T, term: &mut Terminal) {
    match term {
        Terminal::Return { .. } => {}
        Terminal::If {
            consequent,
            alternate,
            ..
        } => {
            transform_statements(transform, &mut consequent.0);
            if let Some(alt) = alternate {
                transform_statements(transform, &mut alt.0);
            }
        }
        Terminal::Loop { body, .. } => transform_statements(transform, &mut body.0),
        Terminal::Switch { cases, .. } => {
            for case in cases.iter_mut() {
                transform_statements(transform, &mut case.0);
            }
        }
        Terminal::Label { block, .. } => transform_statements(transform, &mut block.0),
        Terminal::Try { block, handler, .. } => {
            transform_statements(transform, &mut block.0);
            if let Some(h) = handler {
                transform_statements(transform, &mut h.0);
            }
        }
    }
}
