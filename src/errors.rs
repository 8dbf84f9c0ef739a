//! The pruner's fatal error surface.
//!
//! Three kinds, all fatal, none retried. Kept as a plain enum rather than a
//! wire DTO: this error never needs to cross the NAPI boundary structurally
//! by itself, only as a rendered string (see `lib.rs`'s `#[napi]` wrapper).

use crate::hir::{IdentifierId, ScopeId, SourceLocation};
use std::fmt;

/// Which graph node kind an `InvariantMissingNode` refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Identifier,
    Scope,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKind::Identifier => write!(f, "identifier"),
            NodeKind::Scope => write!(f, "scope"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrunerError {
    /// The collector encountered a value the classification table does not
    /// recognize.
    UnsupportedValueKind {
        kind: String,
        location: SourceLocation,
    },
    /// The solver reached an identifier or scope id with no graph node —
    /// indicates a collector bug, since every referenced place is supposed
    /// to get a node lazily during phase 1.
    InvariantMissingNode { node_kind: NodeKind, id: u32 },
    /// A destructure pattern kind or memoization-level kind fell outside
    /// the enumerated set the collector or solver matches on.
    ExhaustivenessViolation { context: String, tag: String },
}

impl PrunerError {
    pub fn missing_identifier(id: IdentifierId) -> Self {
        PrunerError::InvariantMissingNode {
            node_kind: NodeKind::Identifier,
            id: id.0,
        }
    }

    pub fn missing_scope(id: ScopeId) -> Self {
        PrunerError::InvariantMissingNode {
            node_kind: NodeKind::Scope,
            id: id.0,
        }
    }

    /// Stable error code for the NAPI boundary and diagnostic output.
    pub fn code(&self) -> &'static str {
        match self {
            PrunerError::UnsupportedValueKind { .. } => "Z-ERR-PRUNE-001",
            PrunerError::InvariantMissingNode { .. } => "Z-ERR-PRUNE-002",
            PrunerError::ExhaustivenessViolation { .. } => "Z-ERR-PRUNE-003",
        }
    }
}

impl fmt::Display for PrunerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrunerError::UnsupportedValueKind { kind, location } => write!(
                f,
                "[{}] unexpected unsupported node: value kind '{}' at {}:{}",
                self.code(),
                kind,
                location.line,
                location.column,
            ),
            PrunerError::InvariantMissingNode { node_kind, id } => write!(
                f,
                "[{}] invariant violated: no {} node for id {}",
                self.code(),
                node_kind,
                id,
            ),
            PrunerError::ExhaustivenessViolation { context, tag } => write!(
                f,
                "[{}] exhaustiveness violation in {}: unrecognized tag '{}'",
                self.code(),
                context,
                tag,
            ),
        }
    }
}

impl std::error::Error for PrunerError {}
