// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Wrapper operations and the transformers that rewrite them.

use std::collections::HashMap;
use std::fmt;

use optless_ast::expr::Expr;
use optless_ast::{Span, SymbolId, SymbolTable, Type};

use crate::error::{DesugarError, DesugarErrorKind, Result};
use crate::session::Session;

mod alternative;
mod branch;
mod constructor;
mod fallback;
mod filter;
mod map;
mod presence;
mod stream;
pub mod template;
mod unwrap;

pub use alternative::AlternativeTransformer;
pub use branch::BranchTransformer;
pub use constructor::ConstructorTransformer;
pub use fallback::FallbackTransformer;
pub use filter::FilterTransformer;
pub use map::MapTransformer;
pub use presence::PresenceTransformer;
pub use stream::StreamTransformer;
pub use unwrap::UnwrapTransformer;

// ── Operations ──────────────────────────────────────────────────────────

/// A member of the wrapper type subject to rewrite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    IsPresent,
    IsEmpty,
    Get,
    GetAsInt,
    GetAsLong,
    GetAsDouble,
    OrElseThrow,
    OrElse,
    OrElseGet,
    Map,
    FlatMap,
    Filter,
    Or,
    IfPresent,
    IfPresentOrElse,
    Stream,
    Of,
    OfNullable,
    Empty,
}

impl Operation {
    pub const ALL: [Operation; 19] = [
        Operation::IsPresent,
        Operation::IsEmpty,
        Operation::Get,
        Operation::GetAsInt,
        Operation::GetAsLong,
        Operation::GetAsDouble,
        Operation::OrElseThrow,
        Operation::OrElse,
        Operation::OrElseGet,
        Operation::Map,
        Operation::FlatMap,
        Operation::Filter,
        Operation::Or,
        Operation::IfPresent,
        Operation::IfPresentOrElse,
        Operation::Stream,
        Operation::Of,
        Operation::OfNullable,
        Operation::Empty,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Operation::IsPresent => "isPresent",
            Operation::IsEmpty => "isEmpty",
            Operation::Get => "get",
            Operation::GetAsInt => "getAsInt",
            Operation::GetAsLong => "getAsLong",
            Operation::GetAsDouble => "getAsDouble",
            Operation::OrElseThrow => "orElseThrow",
            Operation::OrElse => "orElse",
            Operation::OrElseGet => "orElseGet",
            Operation::Map => "map",
            Operation::FlatMap => "flatMap",
            Operation::Filter => "filter",
            Operation::Or => "or",
            Operation::IfPresent => "ifPresent",
            Operation::IfPresentOrElse => "ifPresentOrElse",
            Operation::Stream => "stream",
            Operation::Of => "of",
            Operation::OfNullable => "ofNullable",
            Operation::Empty => "empty",
        }
    }

    pub fn from_name(name: &str) -> Option<Operation> {
        Operation::ALL.iter().copied().find(|op| op.name() == name)
    }

    /// Static factories of the wrapper type.
    pub fn is_constructor(self) -> bool {
        matches!(self, Operation::Of | Operation::OfNullable | Operation::Empty)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ── Transformer contract ────────────────────────────────────────────────

/// The class a traversal is currently inside.
#[derive(Debug, Clone)]
pub struct EnclosingScope {
    pub class: SymbolId,
    pub class_ty: Type,
    /// Whether code here runs without a `this`.
    pub is_static: bool,
}

/// Everything a transformer may touch while rewriting one call.
pub struct TransformCx<'a> {
    pub symbols: &'a mut SymbolTable,
    pub session: &'a mut Session,
    pub scope: &'a EnclosingScope,
}

/// A call on the wrapper type, with receiver and arguments already
/// rewritten.
#[derive(Debug, Clone)]
pub struct WrapperCall {
    pub op: Operation,
    /// `None` for the static factories.
    pub receiver: Option<Expr>,
    /// Boxed element type of the receiver, or of the result for factories.
    pub element: Type,
    pub args: Vec<Expr>,
    /// Type the replacement must have.
    pub result: Type,
    pub span: Span,
}

impl WrapperCall {
    pub fn take_receiver(&mut self) -> Result<Expr> {
        self.receiver.take().ok_or_else(|| {
            DesugarError::new(
                DesugarErrorKind::UnexpectedNode {
                    context: format!("`{}` without a receiver", self.op),
                },
                self.span,
            )
        })
    }

    /// Move out the argument at `index`.
    pub fn take_arg(&mut self, index: usize) -> Result<Expr> {
        match self.args.get_mut(index) {
            Some(arg) => Ok(arg.take()),
            None => Err(DesugarError::new(
                DesugarErrorKind::MissingArgument {
                    operation: self.op.name().to_string(),
                    index,
                },
                self.span,
            )),
        }
    }
}

/// A stateless rewrite strategy for one or more operations.
pub trait Transformer {
    /// Name used in registry diagnostics.
    fn name(&self) -> &'static str;

    fn operations(&self) -> &'static [Operation];

    fn transform(&self, call: WrapperCall, cx: &mut TransformCx<'_>) -> Result<Expr>;
}

// ── Registry ────────────────────────────────────────────────────────────

/// Dispatch from operation to its single transformer.
pub struct TransformerRegistry {
    transformers: Vec<Box<dyn Transformer>>,
    dispatch: HashMap<Operation, usize>,
}

impl TransformerRegistry {
    /// Build a registry, checking that every operation is claimed by
    /// exactly one transformer.
    pub fn new(transformers: Vec<Box<dyn Transformer>>) -> Result<Self> {
        let mut dispatch = HashMap::new();
        for (index, transformer) in transformers.iter().enumerate() {
            for &op in transformer.operations() {
                if let Some(&first) = dispatch.get(&op) {
                    let first: &Box<dyn Transformer> = &transformers[first];
                    return Err(DesugarError::unlocated(DesugarErrorKind::DuplicateClaim {
                        operation: op.name().to_string(),
                        first: first.name().to_string(),
                        second: transformer.name().to_string(),
                    }));
                }
                dispatch.insert(op, index);
            }
        }
        if let Some(op) = Operation::ALL.iter().find(|op| !dispatch.contains_key(op)) {
            return Err(DesugarError::unlocated(DesugarErrorKind::UnclaimedOperation {
                operation: op.name().to_string(),
            }));
        }
        Ok(Self {
            transformers,
            dispatch,
        })
    }

    /// The nine built-in transformers.
    pub fn standard() -> Result<Self> {
        Self::new(vec![
            Box::new(PresenceTransformer),
            Box::new(UnwrapTransformer),
            Box::new(FallbackTransformer),
            Box::new(MapTransformer),
            Box::new(FilterTransformer),
            Box::new(AlternativeTransformer),
            Box::new(BranchTransformer),
            Box::new(StreamTransformer),
            Box::new(ConstructorTransformer),
        ])
    }

    pub fn get(&self, op: Operation) -> Result<&dyn Transformer> {
        self.dispatch
            .get(&op)
            .map(|&index| self.transformers[index].as_ref())
            .ok_or_else(|| {
                DesugarError::unlocated(DesugarErrorKind::UnclaimedOperation {
                    operation: op.name().to_string(),
                })
            })
    }

    pub fn transform(&self, call: WrapperCall, cx: &mut TransformCx<'_>) -> Result<Expr> {
        let transformer = self.get(call.op)?;
        tracing::debug!(
            operation = %call.op,
            transformer = transformer.name(),
            start = call.span.start,
            "rewriting wrapper call"
        );
        transformer.transform(call, cx)
    }

    pub fn len(&self) -> usize {
        self.transformers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transformers.is_empty()
    }
}
