// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Expression nodes.

use crate::decl::VarDecl;
use crate::stmt::Stmt;
use crate::{NodeId, SamSignature, Span, SymbolId, Type};

/// An attributed expression.
#[derive(Debug, Clone)]
pub struct Expr {
    pub id: NodeId,
    pub kind: ExprKind,
    /// Static type as resolved by the front end.
    pub ty: Type,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Null,
    Bool(bool),
    Int(i32),
    Long(i64),
    Double(f64),
    Char(char),
    String(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    And,
    Or,
}

impl BinOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinOp::Eq => "==",
            BinOp::Ne => "!=",
            BinOp::Lt => "<",
            BinOp::Gt => ">",
            BinOp::Le => "<=",
            BinOp::Ge => ">=",
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Rem => "%",
            BinOp::And => "&&",
            BinOp::Or => "||",
        }
    }

    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            BinOp::Eq | BinOp::Ne | BinOp::Lt | BinOp::Gt | BinOp::Le | BinOp::Ge
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Not,
    Neg,
}

/// How a method reference binds its receiver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefKind {
    /// `Type::staticMethod`
    Static,
    /// `expr::method`, receiver evaluated where the reference is written
    Bound,
    /// `Type::instanceMethod`, receiver is the first descriptor parameter
    Unbound,
    /// `Type::new`
    Constructor,
}

#[derive(Debug, Clone)]
pub enum LambdaBody {
    Expr(Box<Expr>),
    Block(Vec<Stmt>),
}

#[derive(Debug, Clone)]
pub struct Lambda {
    pub params: Vec<VarDecl>,
    pub body: LambdaBody,
    /// Functional descriptor the lambda was attributed against.
    pub descriptor: SamSignature,
}

#[derive(Debug, Clone)]
pub struct MethodRef {
    /// Type name for static, unbound and constructor references, the
    /// receiver expression for bound ones.
    pub qualifier: Box<Expr>,
    pub name: String,
    /// Referenced method or constructor.
    pub sym: SymbolId,
    pub kind: RefKind,
    pub descriptor: SamSignature,
}

/// The kind of expression.
#[derive(Debug, Clone)]
pub enum ExprKind {
    Literal(Literal),
    /// Reference to a local, parameter or field
    Ident { name: String, sym: SymbolId },
    This,
    /// Class used as a qualifier (`Objects.isNull`, `String::trim`)
    TypeName(String),
    /// Field access
    Select {
        target: Box<Expr>,
        name: String,
        sym: SymbolId,
    },
    /// Method call; `target` is `None` for unqualified calls
    Call {
        target: Option<Box<Expr>>,
        name: String,
        method: SymbolId,
        args: Vec<Expr>,
    },
    /// Instance creation through a constructor
    New { ctor: SymbolId, args: Vec<Expr> },
    Unary { op: UnaryOp, operand: Box<Expr> },
    Binary {
        op: BinOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    /// `cond ? then : otherwise`
    Conditional {
        cond: Box<Expr>,
        then: Box<Expr>,
        otherwise: Box<Expr>,
    },
    Lambda(Lambda),
    MethodRef(MethodRef),
    Assign { target: Box<Expr>, value: Box<Expr> },
    Parens(Box<Expr>),
}

impl Expr {
    pub fn new(kind: ExprKind, ty: Type, span: Span) -> Self {
        Self {
            id: NodeId::DUMMY,
            kind,
            ty,
            span,
        }
    }

    /// Innermost expression under any parentheses.
    pub fn skip_parens(&self) -> &Expr {
        match &self.kind {
            ExprKind::Parens(inner) => inner.skip_parens(),
            _ => self,
        }
    }

    /// Lambda or method reference.
    pub fn is_functional(&self) -> bool {
        matches!(
            self.skip_parens().kind,
            ExprKind::Lambda(_) | ExprKind::MethodRef(_)
        )
    }

    pub fn is_null_literal(&self) -> bool {
        matches!(self.skip_parens().kind, ExprKind::Literal(Literal::Null))
    }

    /// Symbol this expression directly refers to, if any.
    pub fn symbol(&self) -> Option<SymbolId> {
        match &self.kind {
            ExprKind::Ident { sym, .. } | ExprKind::Select { sym, .. } => Some(*sym),
            ExprKind::Call { method, .. } => Some(*method),
            ExprKind::New { ctor, .. } => Some(*ctor),
            ExprKind::MethodRef(r) => Some(r.sym),
            ExprKind::Parens(inner) => inner.symbol(),
            _ => None,
        }
    }

    /// Move this expression out, leaving a `null` literal in its place.
    pub fn take(&mut self) -> Expr {
        let placeholder = Expr {
            id: self.id,
            kind: ExprKind::Literal(Literal::Null),
            ty: Type::Null,
            span: self.span,
        };
        std::mem::replace(self, placeholder)
    }
}
