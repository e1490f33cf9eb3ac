// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Attributed syntax tree consumed and produced by the optless pass.
//!
//! The host front end hands over a fully type-checked tree: every
//! expression carries its resolved type, every identifier, call and
//! method reference carries the symbol it resolved to. This crate defines
//! that tree, the symbol table it points into, and a maker for new nodes
//! that are valid without another attribution pass.

pub mod span;
pub mod ty;
pub mod symbol;
pub mod expr;
pub mod stmt;
pub mod decl;
pub mod make;
pub mod prelude;
pub mod printer;
pub mod visit;

pub use span::{LineMap, Span};
pub use symbol::{
    ClassInfo, Modifiers, SamSignature, Symbol, SymbolId, SymbolKind, SymbolTable, Visibility,
};
pub use ty::{PrimKind, Type};

/// Unique identifier for tree nodes.
///
/// Front ends number their nodes from zero; nodes built by the pass
/// come from `make::SYNTHETIC_ID_BASE` upward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct NodeId(pub u32);

impl NodeId {
    pub const DUMMY: NodeId = NodeId(u32::MAX);
}
