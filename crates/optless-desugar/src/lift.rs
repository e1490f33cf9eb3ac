// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Functional expression synthesizer: lifts lambdas and method references
//! out of wrapper calls into standalone synthetic methods.
//!
//! Free variables become trailing parameters of the lifted method, and
//! every identifier in the moved body is rebound to the new parameters.

use std::collections::{HashMap, HashSet};

use indexmap::IndexSet;
use optless_ast::decl::VarDecl;
use optless_ast::expr::{Expr, ExprKind, Lambda, LambdaBody, MethodRef, RefKind};
use optless_ast::stmt::Stmt;
use optless_ast::visit::{self, Visitor, VisitorMut};
use optless_ast::{Modifiers, Span, SymbolId, SymbolTable, Type};

use crate::error::{DesugarError, DesugarErrorKind, Result};
use crate::transform::TransformCx;
use crate::unbox::{erase_unboxed, unwrap};

/// A value the lifted method needs from its call site beyond the
/// functional descriptor's own parameters.
#[derive(Debug, Clone)]
pub enum Capture {
    /// A local or parameter of the enclosing method.
    Variable(SymbolId),
    /// The receiver of a bound method reference, evaluated once by the
    /// caller.
    Receiver(Expr),
}

/// Summary of a lifted function, for the code that calls it.
#[derive(Debug, Clone)]
pub struct Lifted {
    pub sym: SymbolId,
    pub name: String,
    pub ret: Type,
    /// Number of descriptor parameters, which come first.
    pub arity: usize,
    pub captures: Vec<Capture>,
}

/// Lift a lambda or method reference.
pub fn lift(expr: Expr, cx: &mut TransformCx<'_>) -> Result<Lifted> {
    let span = expr.span;
    match expr.kind {
        ExprKind::Lambda(lambda) => lift_lambda(lambda, span, cx),
        ExprKind::MethodRef(r) => lift_method_ref(r, span, cx),
        ExprKind::Parens(inner) => lift(*inner, cx),
        _ => Err(DesugarError::new(
            DesugarErrorKind::UnexpectedNode {
                context: "functional argument that is neither a lambda nor a method reference"
                    .to_string(),
            },
            span,
        )),
    }
}

/// Return type of a lifted function: wrapper layers removed, so `flatMap`
/// functions return the element directly.
fn lifted_return(symbols: &SymbolTable, descriptor_ret: &Type) -> Type {
    erase_unboxed(symbols, &unwrap(symbols, descriptor_ret))
}

fn new_synthetic(cx: &mut TransformCx<'_>, base: &str) -> (SymbolId, String) {
    let name = cx.session.names.fresh(base);
    let sym = cx.symbols.new_method(
        cx.scope.class,
        &name,
        Type::method(vec![], Type::Void),
        Modifiers::synthetic(cx.scope.is_static),
    );
    (sym, name)
}

fn finish_signature(symbols: &mut SymbolTable, sym: SymbolId, params: &[VarDecl], ret: &Type) {
    let tys = params.iter().map(|p| p.ty.clone()).collect();
    symbols.set_type(sym, Type::method(tys, ret.clone()));
}

fn body_of(cx: &mut TransformCx<'_>, value: Expr, ret: &Type) -> Vec<Stmt> {
    if ret.is_void() {
        vec![cx.session.make.exec(value)]
    } else {
        vec![cx.session.make.ret(Some(value))]
    }
}

// ── Lambdas ─────────────────────────────────────────────────────────────

fn lift_lambda(lambda: Lambda, span: Span, cx: &mut TransformCx<'_>) -> Result<Lifted> {
    let Lambda {
        params,
        body,
        descriptor,
    } = lambda;
    let ret = lifted_return(cx.symbols, &descriptor.ret);
    let (sym, name) = new_synthetic(cx, "lambda");
    cx.session.make.at(span);

    let mut rebind: HashMap<SymbolId, (SymbolId, String, Type)> = HashMap::new();
    let mut new_params = Vec::with_capacity(params.len());
    for param in &params {
        let ty = erase_unboxed(cx.symbols, &param.ty);
        let decl = cx.session.make.param(cx.symbols, sym, &param.name, ty.clone());
        rebind.insert(param.sym, (decl.sym, decl.name.clone(), ty));
        new_params.push(decl);
    }

    let mut stmts = match body {
        LambdaBody::Expr(value) => body_of(cx, *value, &ret),
        LambdaBody::Block(stmts) => stmts,
    };

    let captured = free_variables(cx.symbols, &params, &stmts);
    let mut captures = Vec::with_capacity(captured.len());
    for outer in captured {
        let outer_name = cx.symbols.name(outer).to_string();
        let ty = erase_unboxed(cx.symbols, cx.symbols.ty(outer));
        let decl = cx.session.make.param(cx.symbols, sym, &outer_name, ty.clone());
        tracing::trace!(lambda = %name, captured = %outer_name, "captured free variable");
        rebind.insert(outer, (decl.sym, decl.name.clone(), ty));
        new_params.push(decl);
        captures.push(Capture::Variable(outer));
    }

    let mut rebinder = Rebinder {
        symbols: cx.symbols,
        owner: sym,
        map: &rebind,
    };
    visit::walk_stmts_mut(&mut rebinder, &mut stmts);

    finish_signature(cx.symbols, sym, &new_params, &ret);
    let arity = params.len();
    let method = cx.session.make.method(cx.symbols, sym, new_params, stmts);
    cx.session.methods.register(method)?;
    tracing::trace!(lambda = %name, arity, captures = captures.len(), "lifted lambda");

    Ok(Lifted {
        sym,
        name,
        ret,
        arity,
        captures,
    })
}

/// Parameters and locals used in `body` but declared outside of it, in
/// first-occurrence order. Owners are not checked, since a lambda nested
/// in a field initializer closes over parameters of the lambda around it.
fn free_variables(symbols: &SymbolTable, params: &[VarDecl], body: &[Stmt]) -> Vec<SymbolId> {
    let mut scan = FreeVariables {
        symbols,
        declared: params.iter().map(|p| p.sym).collect(),
        used: IndexSet::new(),
    };
    visit::walk_stmts(&mut scan, body);
    let FreeVariables { declared, used, .. } = scan;
    used.into_iter().filter(|sym| !declared.contains(sym)).collect()
}

struct FreeVariables<'a> {
    symbols: &'a SymbolTable,
    declared: HashSet<SymbolId>,
    used: IndexSet<SymbolId>,
}

impl Visitor for FreeVariables<'_> {
    fn visit_expr(&mut self, expr: &Expr) {
        if let ExprKind::Ident { sym, .. } = &expr.kind {
            if self.symbols.get(*sym).is_variable() {
                self.used.insert(*sym);
            }
        }
        visit::walk_expr(self, expr);
    }

    fn visit_var_decl(&mut self, decl: &VarDecl) {
        self.declared.insert(decl.sym);
        visit::walk_var_decl(self, decl);
    }
}

/// Points identifiers at the lifted method's parameters and moves
/// variables declared in the body to the lifted method.
struct Rebinder<'a> {
    symbols: &'a mut SymbolTable,
    owner: SymbolId,
    map: &'a HashMap<SymbolId, (SymbolId, String, Type)>,
}

impl VisitorMut for Rebinder<'_> {
    fn visit_expr_mut(&mut self, expr: &mut Expr) {
        if let ExprKind::Ident { name, sym } = &mut expr.kind {
            if let Some((new_sym, new_name, ty)) = self.map.get(sym) {
                *sym = *new_sym;
                *name = new_name.clone();
                expr.ty = ty.clone();
            }
        }
        visit::walk_expr_mut(self, expr);
    }

    fn visit_var_decl_mut(&mut self, decl: &mut VarDecl) {
        self.symbols.set_owner(decl.sym, self.owner);
        visit::walk_var_decl_mut(self, decl);
    }
}

// ── Method references ───────────────────────────────────────────────────

fn lift_method_ref(r: MethodRef, span: Span, cx: &mut TransformCx<'_>) -> Result<Lifted> {
    let MethodRef {
        qualifier,
        name: member,
        sym: target,
        kind,
        descriptor,
    } = r;
    let ret = lifted_return(cx.symbols, &descriptor.ret);
    let (sym, name) = new_synthetic(cx, "reference");
    cx.session.make.at(span);

    let mut params = Vec::with_capacity(descriptor.params.len() + 1);
    for ty in &descriptor.params {
        let ty = erase_unboxed(cx.symbols, ty);
        let param_name = cx.session.names.fresh("inferred");
        params.push(cx.session.make.param(cx.symbols, sym, &param_name, ty));
    }
    let arity = params.len();
    let mut captures = Vec::new();

    let mut args: Vec<Expr> = params
        .iter()
        .map(|p| cx.session.make.ident(cx.symbols, p.sym))
        .collect();
    let target_expr = match kind {
        RefKind::Static => Some(cx.session.make.type_name(qualified_owner(cx.symbols, target, span)?)),
        RefKind::Unbound => {
            if args.is_empty() {
                return Err(DesugarError::new(
                    DesugarErrorKind::UnexpectedNode {
                        context: format!("unbound reference to `{}` with no receiver parameter", member),
                    },
                    span,
                ));
            }
            Some(args.remove(0))
        }
        RefKind::Bound => match qualifier.kind {
            ExprKind::This => Some(*qualifier),
            _ => {
                let ty = erase_unboxed(cx.symbols, &qualifier.ty);
                let receiver_name = cx.session.names.fresh("receiver");
                let decl = cx.session.make.param(cx.symbols, sym, &receiver_name, ty);
                let receiver = cx.session.make.ident(cx.symbols, decl.sym);
                params.push(decl);
                captures.push(Capture::Receiver(*qualifier));
                Some(receiver)
            }
        },
        RefKind::Constructor => None,
    };

    let value = match kind {
        RefKind::Constructor => cx.session.make.new_instance(cx.symbols, target, args),
        _ => {
            let call_ty = if ret.is_void() {
                erase_unboxed(cx.symbols, cx.symbols.ty(target).return_type())
            } else {
                ret.clone()
            };
            cx.session
                .make
                .call_typed(cx.symbols, target_expr, target, args, call_ty)
        }
    };
    let body = body_of(cx, value, &ret);

    finish_signature(cx.symbols, sym, &params, &ret);
    let method = cx.session.make.method(cx.symbols, sym, params, body);
    cx.session.methods.register(method)?;
    tracing::trace!(reference = %name, member = %member, "lifted method reference");

    Ok(Lifted {
        sym,
        name,
        ret,
        arity,
        captures,
    })
}

fn qualified_owner(symbols: &SymbolTable, member: SymbolId, span: Span) -> Result<&str> {
    symbols.owner_class_name(member).ok_or_else(|| {
        DesugarError::new(
            DesugarErrorKind::UnexpectedNode {
                context: format!("member `{}` without an owning class", symbols.name(member)),
            },
            span,
        )
    })
}
