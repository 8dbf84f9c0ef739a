//! Ambient diagnostic logging.
//!
//! Follows this codebase's existing convention of bracket-tagged
//! `eprintln!` lines instead of a logging framework — no sibling module in
//! this crate pulls in `log`/`tracing` either. Verbose tracing only fires
//! when `ZENITH_PRUNER_TRACE` is set, checked once and cached.

use std::sync::OnceLock;

fn trace_enabled() -> bool {
    static ENABLED: OnceLock<bool> = OnceLock::new();
    *ENABLED.get_or_init(|| std::env::var_os("ZENITH_PRUNER_TRACE").is_some())
}

#[doc(hidden)]
pub fn trace_is_enabled() -> bool {
    trace_enabled()
}

/// `eprintln!` tagged `[Pruner]`, gated on `ZENITH_PRUNER_TRACE`.
macro_rules! pruner_trace {
    ($($arg:tt)*) => {
        if $crate::diagnostics::trace_is_enabled() {
            eprintln!("[Pruner] {}", format!($($arg)*));
        }
    };
}

pub(crate) use pruner_trace;
