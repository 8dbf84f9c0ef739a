//! Non-escaping reactive scope pruner.
//!
//! A three-phase pass over one reactive function:
//!
//! 1. [`collector`] walks every instruction, classifies its value, and
//!    populates the identifier/scope dependency graph in [`graph::State`].
//! 2. [`solver`] traverses that graph from the function's returned
//!    identifiers to compute the memoized set.
//! 3. [`pruner`] walks reactive scopes, inlining any whose declarations and
//!    reassignments don't intersect the memoized set.
//!
//! HIR construction, reactive-scope formation, printing and code generation
//! are all external collaborators; this crate only consumes and mutates a
//! `ReactiveFunction` in place.

#[cfg(feature = "napi")]
use napi_derive::napi;

pub mod collector;
pub mod diagnostics;
pub mod errors;
pub mod graph;
pub mod hir;
pub mod lattice;
pub mod pruner;
pub mod solver;
pub mod visitor;

#[cfg(test)]
mod test_support;

#[cfg(test)]
mod scenarios_tests;

use collector::DependencyCollector;
use diagnostics::pruner_trace;
use errors::PrunerError;
use hir::{MemoizationOptions, ReactiveFunction};
use pruner::ScopePruner;

/// Runs the full pass: collect, solve, prune. All-or-nothing — on error the
/// function is left exactly as the collector left it when it aborted (the
/// transform never runs if collection or solving fails).
pub fn prune_non_escaping_scopes(
    func: &mut ReactiveFunction,
    options: &MemoizationOptions,
) -> Result<(), PrunerError> {
    pruner_trace!("starting collection");
    let mut state = DependencyCollector::new(options).collect(func)?;

    pruner_trace!("starting solve over {} returned id(s)", state.returned().len());
    let memoized = solver::solve(&mut state)?;

    pruner_trace!("starting prune");
    ScopePruner::new(&memoized).prune(func);

    Ok(())
}

#[cfg(feature = "napi")]
#[napi]
pub fn prune_non_escaping_scopes_native(
    function_json: String,
    options_json: String,
) -> napi::Result<String> {
    let mut func: ReactiveFunction = serde_json::from_str(&function_json)
        .map_err(|e| napi::Error::from_reason(format!("function parse error: {}", e)))?;
    let options: MemoizationOptions = serde_json::from_str(&options_json)
        .map_err(|e| napi::Error::from_reason(format!("options parse error: {}", e)))?;

    prune_non_escaping_scopes(&mut func, &options)
        .map_err(|e| napi::Error::from_reason(e.to_string()))?;

    serde_json::to_string(&func)
        .map_err(|e| napi::Error::from_reason(format!("serialize error: {}", e)))
}
