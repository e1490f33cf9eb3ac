// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Construction of attributed nodes.
//!
//! Every node built here carries its resolved type and symbol, so the
//! output of a rewrite is valid input for later phases without another
//! attribution pass.

use crate::decl::{MethodDecl, VarDecl};
use crate::expr::{BinOp, Expr, ExprKind, Literal, UnaryOp};
use crate::stmt::{Stmt, StmtKind};
use crate::{NodeId, Span, SymbolId, SymbolTable, Type};

/// First id handed out by a maker. Front ends number from zero.
pub const SYNTHETIC_ID_BASE: u32 = 1_000_000;

#[derive(Debug, Clone)]
pub struct TreeMaker {
    next_id: u32,
    span: Span,
}

impl Default for TreeMaker {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeMaker {
    pub fn new() -> Self {
        Self {
            next_id: SYNTHETIC_ID_BASE,
            span: Span::default(),
        }
    }

    /// Position subsequently built nodes at `span`.
    pub fn at(&mut self, span: Span) -> &mut Self {
        self.span = span;
        self
    }

    pub fn span(&self) -> Span {
        self.span
    }

    pub fn fresh_id(&mut self) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        id
    }

    pub fn expr(&mut self, kind: ExprKind, ty: Type) -> Expr {
        Expr {
            id: self.fresh_id(),
            kind,
            ty,
            span: self.span,
        }
    }

    pub fn stmt(&mut self, kind: StmtKind) -> Stmt {
        Stmt {
            id: self.fresh_id(),
            kind,
            span: self.span,
        }
    }

    // ── Expressions ──────────────────────────────────────────────

    /// `null` typed as `ty`, so it stands in for an absent value of that type.
    pub fn null(&mut self, ty: Type) -> Expr {
        self.expr(ExprKind::Literal(Literal::Null), ty)
    }

    pub fn literal(&mut self, lit: Literal) -> Expr {
        let ty = match &lit {
            Literal::Null => Type::Null,
            Literal::Bool(_) => Type::boolean(),
            Literal::Int(_) => Type::int(),
            Literal::Long(_) => Type::Prim(crate::PrimKind::Long),
            Literal::Double(_) => Type::Prim(crate::PrimKind::Double),
            Literal::Char(_) => Type::Prim(crate::PrimKind::Char),
            Literal::String(_) => Type::string(),
        };
        self.expr(ExprKind::Literal(lit), ty)
    }

    pub fn string(&mut self, value: &str) -> Expr {
        self.literal(Literal::String(value.to_string()))
    }

    pub fn int(&mut self, value: i32) -> Expr {
        self.literal(Literal::Int(value))
    }

    pub fn boolean(&mut self, value: bool) -> Expr {
        self.literal(Literal::Bool(value))
    }

    /// Reference to a variable or field, typed from its symbol.
    pub fn ident(&mut self, symbols: &SymbolTable, sym: SymbolId) -> Expr {
        let symbol = symbols.get(sym);
        self.expr(
            ExprKind::Ident {
                name: symbol.name.clone(),
                sym,
            },
            symbol.ty.clone(),
        )
    }

    pub fn this(&mut self, ty: Type) -> Expr {
        self.expr(ExprKind::This, ty)
    }

    pub fn type_name(&mut self, qualified: &str) -> Expr {
        self.expr(
            ExprKind::TypeName(qualified.to_string()),
            Type::class(qualified),
        )
    }

    /// Call typed with the declared return type of `method`.
    pub fn call(
        &mut self,
        symbols: &SymbolTable,
        target: Option<Expr>,
        method: SymbolId,
        args: Vec<Expr>,
    ) -> Expr {
        let ret = symbols.ty(method).return_type().clone();
        self.call_typed(symbols, target, method, args, ret)
    }

    /// Call with an explicit result type, for generic methods whose
    /// declared return type mentions type variables.
    pub fn call_typed(
        &mut self,
        symbols: &SymbolTable,
        target: Option<Expr>,
        method: SymbolId,
        args: Vec<Expr>,
        ty: Type,
    ) -> Expr {
        self.expr(
            ExprKind::Call {
                target: target.map(Box::new),
                name: symbols.name(method).to_string(),
                method,
                args,
            },
            ty,
        )
    }

    pub fn new_instance(&mut self, symbols: &SymbolTable, ctor: SymbolId, args: Vec<Expr>) -> Expr {
        let ty = symbols.ty(ctor).return_type().clone();
        self.expr(ExprKind::New { ctor, args }, ty)
    }

    pub fn binary(&mut self, op: BinOp, lhs: Expr, rhs: Expr) -> Expr {
        let ty = if op.is_comparison() || matches!(op, BinOp::And | BinOp::Or) {
            Type::boolean()
        } else {
            lhs.ty.clone()
        };
        self.expr(
            ExprKind::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            },
            ty,
        )
    }

    /// `value != null` when `non_null`, else `value == null`.
    pub fn null_check(&mut self, value: Expr, non_null: bool) -> Expr {
        let null = self.null(Type::Null);
        let op = if non_null { BinOp::Ne } else { BinOp::Eq };
        self.binary(op, value, null)
    }

    pub fn not(&mut self, operand: Expr) -> Expr {
        self.expr(
            ExprKind::Unary {
                op: UnaryOp::Not,
                operand: Box::new(operand),
            },
            Type::boolean(),
        )
    }

    pub fn conditional(&mut self, cond: Expr, then: Expr, otherwise: Expr, ty: Type) -> Expr {
        self.expr(
            ExprKind::Conditional {
                cond: Box::new(cond),
                then: Box::new(then),
                otherwise: Box::new(otherwise),
            },
            ty,
        )
    }

    pub fn parens(&mut self, inner: Expr) -> Expr {
        let ty = inner.ty.clone();
        self.expr(ExprKind::Parens(Box::new(inner)), ty)
    }

    // ── Statements ───────────────────────────────────────────────

    pub fn exec(&mut self, expr: Expr) -> Stmt {
        self.stmt(StmtKind::Expr(expr))
    }

    pub fn ret(&mut self, value: Option<Expr>) -> Stmt {
        self.stmt(StmtKind::Return(value))
    }

    pub fn throw(&mut self, value: Expr) -> Stmt {
        self.stmt(StmtKind::Throw(value))
    }

    pub fn if_(&mut self, cond: Expr, then: Vec<Stmt>, otherwise: Option<Vec<Stmt>>) -> Stmt {
        self.stmt(StmtKind::If {
            cond,
            then,
            otherwise,
        })
    }

    pub fn block(&mut self, stmts: Vec<Stmt>) -> Stmt {
        self.stmt(StmtKind::Block(stmts))
    }

    pub fn var_def(&mut self, decl: VarDecl) -> Stmt {
        self.stmt(StmtKind::VarDef(decl))
    }

    // ── Declarations ─────────────────────────────────────────────

    /// Declare a parameter of `method` and build its declaration.
    pub fn param(&mut self, symbols: &mut SymbolTable, method: SymbolId, name: &str, ty: Type) -> VarDecl {
        let sym = symbols.declare_param(method, name, ty.clone());
        VarDecl {
            sym,
            name: name.to_string(),
            ty,
            init: None,
            span: self.span,
        }
    }

    /// Method declaration whose name, return type and modifiers come from
    /// its symbol.
    pub fn method(
        &mut self,
        symbols: &SymbolTable,
        sym: SymbolId,
        params: Vec<VarDecl>,
        body: Vec<Stmt>,
    ) -> MethodDecl {
        let symbol = symbols.get(sym);
        MethodDecl {
            sym,
            name: symbol.name.clone(),
            params,
            ret: symbol.ty.return_type().clone(),
            body: Some(body),
            modifiers: symbol.modifiers,
            span: self.span,
        }
    }
}
