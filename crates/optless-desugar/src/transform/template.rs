// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Shared shape of transformers that need statements or evaluate their
//! receiver more than once.
//!
//! The rewrite goes into a root synthetic method taking the receiver, the
//! plain arguments and whatever the lifted functions captured. The call
//! site becomes a single call of that method, so the receiver and each
//! argument are evaluated exactly once, in source order.

use indexmap::IndexMap;
use optless_ast::decl::VarDecl;
use optless_ast::expr::Expr;
use optless_ast::stmt::Stmt;
use optless_ast::{Modifiers, Span, SymbolId, Type};

use super::TransformCx;
use crate::error::{DesugarError, DesugarErrorKind, Result};
use crate::lift::{self, Capture, Lifted};
use crate::unbox::{erase_unboxed, retype, unwrap};

/// A functional argument as seen from inside the root method.
pub enum Function {
    /// Lifted into a synthetic method; captured values are forwarded from
    /// root parameters.
    Lifted { lifted: Lifted, forwarded: Vec<SymbolId> },
    /// An expression of functional interface type, passed in as a root
    /// parameter and invoked through its single abstract method.
    Value { param: SymbolId, sam: SymbolId, name: String, ret: Type },
}

pub struct RootBuilder {
    sym: SymbolId,
    name: String,
    span: Span,
    params: Vec<VarDecl>,
    call_args: Vec<Expr>,
    /// Outer variable to the root parameter forwarding it.
    captured: IndexMap<SymbolId, SymbolId>,
}

impl RootBuilder {
    /// Start a root method named after `base`.
    pub fn new(cx: &mut TransformCx<'_>, base: &str, span: Span) -> Self {
        let name = cx.session.names.fresh(base);
        let sym = cx.symbols.new_method(
            cx.scope.class,
            &name,
            Type::method(vec![], Type::Void),
            Modifiers::synthetic(cx.scope.is_static),
        );
        Self {
            sym,
            name,
            span,
            params: Vec::new(),
            call_args: Vec::new(),
            captured: IndexMap::new(),
        }
    }

    fn push_param(&mut self, cx: &mut TransformCx<'_>, base: &str, ty: Type, arg: Expr) -> SymbolId {
        let name = cx.session.names.fresh(base);
        let decl = cx.session.make.at(self.span).param(cx.symbols, self.sym, &name, ty);
        let sym = decl.sym;
        self.params.push(decl);
        self.call_args.push(arg);
        sym
    }

    /// The receiver, passed once and referenced through the returned
    /// parameter.
    pub fn receiver(&mut self, cx: &mut TransformCx<'_>, receiver: Expr, element: &Type) -> SymbolId {
        let ty = erase_unboxed(cx.symbols, element);
        self.push_param(cx, "value", ty, receiver)
    }

    /// A plain argument of type `ty`.
    pub fn value(&mut self, cx: &mut TransformCx<'_>, arg: Expr, ty: &Type) -> SymbolId {
        let ty = erase_unboxed(cx.symbols, ty);
        self.push_param(cx, "arg", ty, arg)
    }

    /// A functional argument: lambdas and method references are lifted,
    /// anything else is passed through as a value.
    pub fn function(&mut self, cx: &mut TransformCx<'_>, arg: Expr) -> Result<Function> {
        if arg.is_functional() {
            let lifted = lift::lift(arg, cx)?;
            let forwarded = self.forward_captures(cx, &lifted);
            return Ok(Function::Lifted { lifted, forwarded });
        }
        let ty = retype(cx.symbols, &arg.ty);
        let sam = cx.symbols.sam(&ty).ok_or_else(|| {
            DesugarError::new(
                DesugarErrorKind::UnexpectedNode {
                    context: format!("functional argument of non-functional type `{}`", ty),
                },
                arg.span,
            )
        })?;
        let ret = erase_unboxed(cx.symbols, &unwrap(cx.symbols, &sam.ret));
        let param = self.push_param(cx, "fn", ty, arg);
        Ok(Function::Value {
            param,
            sam: sam.method,
            name: sam.name,
            ret,
        })
    }

    fn forward_captures(&mut self, cx: &mut TransformCx<'_>, lifted: &Lifted) -> Vec<SymbolId> {
        let mut forwarded = Vec::with_capacity(lifted.captures.len());
        for capture in &lifted.captures {
            let param = match capture {
                Capture::Variable(outer) => match self.captured.get(outer) {
                    Some(&param) => param,
                    None => {
                        let outer = *outer;
                        let name = cx.symbols.name(outer).to_string();
                        let ty = erase_unboxed(cx.symbols, cx.symbols.ty(outer));
                        let decl = cx.session.make.at(self.span).param(cx.symbols, self.sym, &name, ty);
                        let param = decl.sym;
                        let arg = cx.session.make.ident(cx.symbols, outer);
                        self.params.push(decl);
                        self.call_args.push(arg);
                        self.captured.insert(outer, param);
                        param
                    }
                },
                Capture::Receiver(expr) => {
                    let ty = erase_unboxed(cx.symbols, &expr.ty);
                    self.push_param(cx, "receiver", ty, expr.clone())
                }
            };
            forwarded.push(param);
        }
        forwarded
    }

    /// Reference to a root parameter.
    pub fn ident(&self, cx: &mut TransformCx<'_>, param: SymbolId) -> Expr {
        cx.session.make.at(self.span).ident(cx.symbols, param)
    }

    /// Call `function` with `args`, followed by whatever it captured.
    pub fn invoke(&self, cx: &mut TransformCx<'_>, function: &Function, mut args: Vec<Expr>) -> Expr {
        cx.session.make.at(self.span);
        match function {
            Function::Lifted { lifted, forwarded } => {
                for &param in forwarded {
                    args.push(cx.session.make.ident(cx.symbols, param));
                }
                cx.session
                    .make
                    .call_typed(cx.symbols, None, lifted.sym, args, lifted.ret.clone())
            }
            Function::Value {
                param, sam, ret, ..
            } => {
                let target = cx.session.make.ident(cx.symbols, *param);
                cx.session
                    .make
                    .call_typed(cx.symbols, Some(target), *sam, args, ret.clone())
            }
        }
    }

    /// Give the root method its signature and body, queue it on the
    /// current class and return the call that replaces the wrapper call.
    pub fn finish(self, cx: &mut TransformCx<'_>, ret: Type, body: Vec<Stmt>) -> Result<Expr> {
        let tys = self.params.iter().map(|p| p.ty.clone()).collect();
        cx.symbols.set_type(self.sym, Type::method(tys, ret.clone()));
        let method = cx
            .session
            .make
            .at(self.span)
            .method(cx.symbols, self.sym, self.params, body);
        cx.session.methods.register(method)?;
        tracing::trace!(method = %self.name, "synthesized root method");
        Ok(cx
            .session
            .make
            .at(self.span)
            .call_typed(cx.symbols, None, self.sym, self.call_args, ret))
    }
}
