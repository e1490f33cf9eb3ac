// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Statement nodes.

use crate::decl::VarDecl;
use crate::expr::Expr;
use crate::{NodeId, Span};

#[derive(Debug, Clone)]
pub struct Stmt {
    pub id: NodeId,
    pub kind: StmtKind,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum StmtKind {
    /// Expression evaluated for its effect
    Expr(Expr),
    /// Local variable declaration
    VarDef(VarDecl),
    Return(Option<Expr>),
    If {
        cond: Expr,
        then: Vec<Stmt>,
        otherwise: Option<Vec<Stmt>>,
    },
    While { cond: Expr, body: Vec<Stmt> },
    Throw(Expr),
    Block(Vec<Stmt>),
}

impl Stmt {
    pub fn new(kind: StmtKind, span: Span) -> Self {
        Self {
            id: NodeId::DUMMY,
            kind,
            span,
        }
    }
}
