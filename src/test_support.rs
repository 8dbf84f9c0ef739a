//! Hand-built HIR fixtures for tests. No parser lives in this crate, so
//! every fixture here is assembled directly from `hir` struct literals —
//! small helpers only, no DSL.

#![cfg(test)]

use crate::hir::*;

pub fn place(id: u32, effect: Effect) -> Place {
    Place::new(IdentifierId(id), effect)
}

pub fn read(id: u32) -> Place {
    place(id, Effect::Read)
}

pub fn store_instruction(instr_id: InstructionId, lvalue: u32, value: InstructionValue) -> ReactiveStatement {
    ReactiveStatement::Instruction(Instruction {
        id: instr_id,
        lvalue: Some(place(lvalue, Effect::Store)),
        value,
        loc: SourceLocation::default(),
    })
}

pub fn bare_instruction(instr_id: InstructionId, value: InstructionValue) -> ReactiveStatement {
    ReactiveStatement::Instruction(Instruction {
        id: instr_id,
        lvalue: None,
        value,
        loc: SourceLocation::default(),
    })
}

pub fn scope(
    id: u32,
    dependencies: Vec<u32>,
    declarations: Vec<u32>,
    instructions: Vec<ReactiveStatement>,
) -> ReactiveStatement {
    ReactiveStatement::Scope(ReactiveScopeBlock {
        scope: ReactiveScope {
            id: ScopeId(id),
            dependencies: dependencies.into_iter().map(IdentifierId).collect(),
            declarations: declarations.into_iter().map(IdentifierId).collect(),
            reassignments: vec![],
        },
        instructions,
    })
}

pub fn return_terminal(instr_id: InstructionId, value: u32) -> ReactiveStatement {
    ReactiveStatement::Terminal(Terminal::Return {
        id: instr_id,
        value: Some(read(value)),
    })
}

pub fn function(params: Vec<u32>, body: Vec<ReactiveStatement>) -> ReactiveFunction {
    ReactiveFunction {
        id: None,
        params: params.into_iter().map(|id| place(id, Effect::Read)).collect(),
        body: ReactiveBlock(body),
    }
}
