// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Errors raised by the optional desugaring pass.
//!
//! Every error is fatal for the compilation unit being rewritten: the pass
//! never hands on a partially rewritten tree.

use optless_ast::Span;
use thiserror::Error;

/// A desugaring error.
#[derive(Debug, Clone, PartialEq)]
pub struct DesugarError {
    pub kind: DesugarErrorKind,
    pub span: Span,
}

impl DesugarError {
    pub fn new(kind: DesugarErrorKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// Error without a source position (registry setup, session state).
    pub fn unlocated(kind: DesugarErrorKind) -> Self {
        Self {
            kind,
            span: Span::default(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        self.kind.category()
    }
}

impl std::fmt::Display for DesugarError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.kind)
    }
}

impl std::error::Error for DesugarError {}

/// Broad class of a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// The transformer set itself is wrong.
    Configuration,
    /// A wrapper type argument could not be inferred.
    Inference,
    /// The tree or symbol table is not in the shape the pass relies on.
    HostInterop,
}

/// The kind of desugaring error.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DesugarErrorKind {
    /// A wrapper member with no rewrite rule.
    #[error("no transformer handles `Optional.{name}`")]
    UnsupportedOperation { name: String },

    /// Two transformers claim the same operation.
    #[error("operation `{operation}` is claimed by both `{first}` and `{second}`")]
    DuplicateClaim {
        operation: String,
        first: String,
        second: String,
    },

    /// No transformer claims an operation.
    #[error("operation `{operation}` is not claimed by any transformer")]
    UnclaimedOperation { operation: String },

    /// A raw wrapper variable with nothing to infer its element type from.
    #[error("cannot infer the element type of `{variable}`")]
    UninferableWrapper { variable: String },

    /// A library member the rewrite calls into is not declared.
    #[error("`{owner}.{member}` is not declared")]
    MissingHostSymbol { owner: String, member: String },

    /// A node of a shape the rewrite cannot handle.
    #[error("unexpected {context}")]
    UnexpectedNode { context: String },

    /// A wrapper call missing an argument its operation requires.
    #[error("`{operation}` expects an argument at position {index}")]
    MissingArgument { operation: String, index: usize },

    /// Synthesized methods left over from a previous unit or class.
    #[error("{count} synthesized method(s) were never committed to a class")]
    PendingNotFlushed { count: usize },
}

impl DesugarErrorKind {
    pub fn category(&self) -> ErrorCategory {
        match self {
            DesugarErrorKind::UnsupportedOperation { .. }
            | DesugarErrorKind::DuplicateClaim { .. }
            | DesugarErrorKind::UnclaimedOperation { .. } => ErrorCategory::Configuration,
            DesugarErrorKind::UninferableWrapper { .. } => ErrorCategory::Inference,
            DesugarErrorKind::MissingHostSymbol { .. }
            | DesugarErrorKind::UnexpectedNode { .. }
            | DesugarErrorKind::MissingArgument { .. }
            | DesugarErrorKind::PendingNotFlushed { .. } => ErrorCategory::HostInterop,
        }
    }
}

pub type Result<T> = std::result::Result<T, DesugarError>;
