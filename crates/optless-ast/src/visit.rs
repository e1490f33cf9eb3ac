// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Tree walkers. Override a `visit_*` method and call the matching
//! `walk_*` function to keep descending.

use crate::decl::VarDecl;
use crate::expr::{Expr, ExprKind, LambdaBody};
use crate::stmt::{Stmt, StmtKind};

pub trait Visitor {
    fn visit_expr(&mut self, expr: &Expr) {
        walk_expr(self, expr);
    }

    fn visit_stmt(&mut self, stmt: &Stmt) {
        walk_stmt(self, stmt);
    }

    fn visit_var_decl(&mut self, decl: &VarDecl) {
        walk_var_decl(self, decl);
    }
}

pub fn walk_var_decl<V: Visitor + ?Sized>(v: &mut V, decl: &VarDecl) {
    if let Some(init) = &decl.init {
        v.visit_expr(init);
    }
}

pub fn walk_stmts<V: Visitor + ?Sized>(v: &mut V, stmts: &[Stmt]) {
    for stmt in stmts {
        v.visit_stmt(stmt);
    }
}

pub fn walk_stmt<V: Visitor + ?Sized>(v: &mut V, stmt: &Stmt) {
    match &stmt.kind {
        StmtKind::Expr(e) | StmtKind::Throw(e) => v.visit_expr(e),
        StmtKind::VarDef(decl) => v.visit_var_decl(decl),
        StmtKind::Return(value) => {
            if let Some(e) = value {
                v.visit_expr(e);
            }
        }
        StmtKind::If {
            cond,
            then,
            otherwise,
        } => {
            v.visit_expr(cond);
            walk_stmts(v, then);
            if let Some(otherwise) = otherwise {
                walk_stmts(v, otherwise);
            }
        }
        StmtKind::While { cond, body } => {
            v.visit_expr(cond);
            walk_stmts(v, body);
        }
        StmtKind::Block(stmts) => walk_stmts(v, stmts),
    }
}

pub fn walk_expr<V: Visitor + ?Sized>(v: &mut V, expr: &Expr) {
    match &expr.kind {
        ExprKind::Literal(_) | ExprKind::Ident { .. } | ExprKind::This | ExprKind::TypeName(_) => {}
        ExprKind::Select { target, .. } => v.visit_expr(target),
        ExprKind::Call { target, args, .. } => {
            if let Some(target) = target {
                v.visit_expr(target);
            }
            for arg in args {
                v.visit_expr(arg);
            }
        }
        ExprKind::New { args, .. } => {
            for arg in args {
                v.visit_expr(arg);
            }
        }
        ExprKind::Unary { operand, .. } => v.visit_expr(operand),
        ExprKind::Binary { lhs, rhs, .. } => {
            v.visit_expr(lhs);
            v.visit_expr(rhs);
        }
        ExprKind::Conditional {
            cond,
            then,
            otherwise,
        } => {
            v.visit_expr(cond);
            v.visit_expr(then);
            v.visit_expr(otherwise);
        }
        ExprKind::Lambda(lambda) => {
            for param in &lambda.params {
                v.visit_var_decl(param);
            }
            match &lambda.body {
                LambdaBody::Expr(body) => v.visit_expr(body),
                LambdaBody::Block(stmts) => walk_stmts(v, stmts),
            }
        }
        ExprKind::MethodRef(r) => v.visit_expr(&r.qualifier),
        ExprKind::Assign { target, value } => {
            v.visit_expr(target);
            v.visit_expr(value);
        }
        ExprKind::Parens(inner) => v.visit_expr(inner),
    }
}

pub trait VisitorMut {
    fn visit_expr_mut(&mut self, expr: &mut Expr) {
        walk_expr_mut(self, expr);
    }

    fn visit_stmt_mut(&mut self, stmt: &mut Stmt) {
        walk_stmt_mut(self, stmt);
    }

    fn visit_var_decl_mut(&mut self, decl: &mut VarDecl) {
        walk_var_decl_mut(self, decl);
    }
}

pub fn walk_var_decl_mut<V: VisitorMut + ?Sized>(v: &mut V, decl: &mut VarDecl) {
    if let Some(init) = &mut decl.init {
        v.visit_expr_mut(init);
    }
}

pub fn walk_stmts_mut<V: VisitorMut + ?Sized>(v: &mut V, stmts: &mut [Stmt]) {
    for stmt in stmts {
        v.visit_stmt_mut(stmt);
    }
}

pub fn walk_stmt_mut<V: VisitorMut + ?Sized>(v: &mut V, stmt: &mut Stmt) {
    match &mut stmt.kind {
        StmtKind::Expr(e) | StmtKind::Throw(e) => v.visit_expr_mut(e),
        StmtKind::VarDef(decl) => v.visit_var_decl_mut(decl),
        StmtKind::Return(value) => {
            if let Some(e) = value {
                v.visit_expr_mut(e);
            }
        }
        StmtKind::If {
            cond,
            then,
            otherwise,
        } => {
            v.visit_expr_mut(cond);
            walk_stmts_mut(v, then);
            if let Some(otherwise) = otherwise {
                walk_stmts_mut(v, otherwise);
            }
        }
        StmtKind::While { cond, body } => {
            v.visit_expr_mut(cond);
            walk_stmts_mut(v, body);
        }
        StmtKind::Block(stmts) => walk_stmts_mut(v, stmts),
    }
}

pub fn walk_expr_mut<V: VisitorMut + ?Sized>(v: &mut V, expr: &mut Expr) {
    match &mut expr.kind {
        ExprKind::Literal(_) | ExprKind::Ident { .. } | ExprKind::This | ExprKind::TypeName(_) => {}
        ExprKind::Select { target, .. } => v.visit_expr_mut(target),
        ExprKind::Call { target, args, .. } => {
            if let Some(target) = target {
                v.visit_expr_mut(target);
            }
            for arg in args {
                v.visit_expr_mut(arg);
            }
        }
        ExprKind::New { args, .. } => {
            for arg in args {
                v.visit_expr_mut(arg);
            }
        }
        ExprKind::Unary { operand, .. } => v.visit_expr_mut(operand),
        ExprKind::Binary { lhs, rhs, .. } => {
            v.visit_expr_mut(lhs);
            v.visit_expr_mut(rhs);
        }
        ExprKind::Conditional {
            cond,
            then,
            otherwise,
        } => {
            v.visit_expr_mut(cond);
            v.visit_expr_mut(then);
            v.visit_expr_mut(otherwise);
        }
        ExprKind::Lambda(lambda) => {
            for param in &mut lambda.params {
                v.visit_var_decl_mut(param);
            }
            match &mut lambda.body {
                LambdaBody::Expr(body) => v.visit_expr_mut(body),
                LambdaBody::Block(stmts) => walk_stmts_mut(v, stmts),
            }
        }
        ExprKind::MethodRef(r) => v.visit_expr_mut(&mut r.qualifier),
        ExprKind::Assign { target, value } => {
            v.visit_expr_mut(target);
            v.visit_expr_mut(value);
        }
        ExprKind::Parens(inner) => v.visit_expr_mut(inner),
    }
}
