// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Tree rewriter: the single traversal that retypes wrapper declarations
//! and replaces wrapper calls with transformer output.
//!
//! Expressions are rewritten post-order, so a transformer always sees a
//! receiver and arguments that are already free of wrapper operations.

use optless_ast::decl::{ClassDecl, CompilationUnit, Member, MethodDecl, VarDecl};
use optless_ast::expr::{Expr, ExprKind, Lambda, LambdaBody, MethodRef, RefKind};
use optless_ast::prelude::OPTIONAL;
use optless_ast::stmt::{Stmt, StmtKind};
use optless_ast::{Modifiers, SamSignature, Span, SymbolId, SymbolTable, Type};

use crate::error::{DesugarError, DesugarErrorKind, Result};
use crate::session::Session;
use crate::transform::{EnclosingScope, Operation, TransformCx, TransformerRegistry, WrapperCall};
use crate::unbox::{is_raw_wrapper, is_wrapper, mentions_wrapper, retype, unwrap};

pub(crate) struct Rewriter<'a> {
    symbols: &'a mut SymbolTable,
    session: &'a mut Session,
    registry: &'a TransformerRegistry,
    scopes: Vec<EnclosingScope>,
    rewrites: usize,
}

impl<'a> Rewriter<'a> {
    pub(crate) fn new(
        symbols: &'a mut SymbolTable,
        session: &'a mut Session,
        registry: &'a TransformerRegistry,
    ) -> Self {
        Self {
            symbols,
            session,
            registry,
            scopes: Vec::new(),
            rewrites: 0,
        }
    }

    /// Rewrite every class of `unit`. Returns the number of wrapper calls
    /// and references replaced.
    pub(crate) fn rewrite_unit(mut self, unit: &mut CompilationUnit) -> Result<usize> {
        for class in &mut unit.classes {
            self.rewrite_class(class)?;
        }
        Ok(self.rewrites)
    }

    // ── Types ───────────────────────────────────────────────────────────

    /// What a wrapper-mentioning type becomes after the pass. A raw
    /// wrapper with nothing else to go on becomes `Object`.
    fn unwrapped(&self, ty: &Type) -> Type {
        if is_wrapper(ty) {
            let element = unwrap(self.symbols, ty);
            if is_wrapper(&element) {
                Type::object()
            } else {
                retype(self.symbols, &element).boxed()
            }
        } else if mentions_wrapper(ty) {
            retype(self.symbols, ty)
        } else {
            ty.clone()
        }
    }

    fn retype_expr(&self, expr: &mut Expr) {
        if !mentions_wrapper(&expr.ty) {
            return;
        }
        if let ExprKind::Ident { sym, .. } = &expr.kind {
            let declared = self.symbols.ty(*sym);
            if !mentions_wrapper(declared) {
                expr.ty = declared.clone();
                return;
            }
        }
        expr.ty = self.unwrapped(&expr.ty);
    }

    fn retype_descriptor(&self, descriptor: &mut SamSignature) {
        for param in &mut descriptor.params {
            *param = self.unwrapped(param);
        }
        descriptor.ret = self.unwrapped(&descriptor.ret);
    }

    fn is_wrapper_member(&self, member: SymbolId) -> bool {
        self.symbols
            .owner_class_name(member)
            .is_some_and(|owner| owner.starts_with(OPTIONAL))
    }

    fn scope(&self, span: Span) -> Result<&EnclosingScope> {
        self.scopes.last().ok_or_else(|| {
            DesugarError::new(
                DesugarErrorKind::UnexpectedNode {
                    context: "expression outside of any class".to_string(),
                },
                span,
            )
        })
    }

    fn scope_mut(&mut self) -> Option<&mut EnclosingScope> {
        self.scopes.last_mut()
    }

    // ── Declarations ────────────────────────────────────────────────────

    fn rewrite_class(&mut self, class: &mut ClassDecl) -> Result<()> {
        self.session.methods.enter_class(class.sym);
        self.scopes.push(EnclosingScope {
            class: class.sym,
            class_ty: self.symbols.ty(class.sym).clone(),
            is_static: false,
        });

        // field types first, so method bodies see them unwrapped
        for member in &class.members {
            if let Member::Field(field, _) = member {
                if mentions_wrapper(&field.ty) && !is_raw_wrapper(&field.ty) {
                    let ty = self.unwrapped(&field.ty);
                    self.symbols.set_type(field.sym, ty);
                }
            }
        }

        let result = self.rewrite_members(&mut class.members);
        self.scopes.pop();
        result?;

        let committed = self.session.methods.commit(class, self.symbols)?;
        tracing::debug!(class = %class.name, committed, "flushed synthetic methods");
        Ok(())
    }

    fn rewrite_members(&mut self, members: &mut [Member]) -> Result<()> {
        for member in members {
            match member {
                Member::Field(field, modifiers) => {
                    if let Some(scope) = self.scope_mut() {
                        scope.is_static = modifiers.is_static;
                    }
                    self.rewrite_var(field)?;
                }
                Member::Method(method) => self.rewrite_method(method)?,
                Member::Class(nested) => self.rewrite_class(nested)?,
            }
        }
        Ok(())
    }

    fn rewrite_method(&mut self, method: &mut MethodDecl) -> Result<()> {
        if let Some(scope) = self.scope_mut() {
            scope.is_static = method.modifiers.is_static;
        }
        for param in &mut method.params {
            self.rewrite_var(param)?;
        }
        if let Some(body) = &mut method.body {
            self.rewrite_stmts(body)?;
        }
        if mentions_wrapper(&method.ret) {
            method.ret = self.unwrapped(&method.ret);
        }
        let params = method.params.iter().map(|p| p.ty.clone()).collect();
        self.symbols
            .set_type(method.sym, Type::method(params, method.ret.clone()));
        Ok(())
    }

    fn rewrite_var(&mut self, decl: &mut VarDecl) -> Result<()> {
        if let Some(init) = &mut decl.init {
            self.rewrite_expr(init)?;
        }
        if is_raw_wrapper(&decl.ty) {
            decl.ty = match &decl.init {
                Some(init) if init.ty == Type::Null => Type::object(),
                Some(init) if !mentions_wrapper(&init.ty) => init.ty.clone(),
                _ => {
                    return Err(DesugarError::new(
                        DesugarErrorKind::UninferableWrapper {
                            variable: decl.name.clone(),
                        },
                        decl.span,
                    ))
                }
            };
        } else if mentions_wrapper(&decl.ty) {
            decl.ty = self.unwrapped(&decl.ty);
        } else {
            return Ok(());
        }
        self.symbols.set_type(decl.sym, decl.ty.clone());
        Ok(())
    }

    // ── Statements ──────────────────────────────────────────────────────

    fn rewrite_stmts(&mut self, stmts: &mut [Stmt]) -> Result<()> {
        for stmt in stmts {
            self.rewrite_stmt(stmt)?;
        }
        Ok(())
    }

    fn rewrite_stmt(&mut self, stmt: &mut Stmt) -> Result<()> {
        match &mut stmt.kind {
            StmtKind::Expr(e) | StmtKind::Throw(e) => self.rewrite_expr(e),
            StmtKind::VarDef(decl) => self.rewrite_var(decl),
            StmtKind::Return(value) => match value {
                Some(e) => self.rewrite_expr(e),
                None => Ok(()),
            },
            StmtKind::If {
                cond,
                then,
                otherwise,
            } => {
                self.rewrite_expr(cond)?;
                self.rewrite_stmts(then)?;
                match otherwise {
                    Some(otherwise) => self.rewrite_stmts(otherwise),
                    None => Ok(()),
                }
            }
            StmtKind::While { cond, body } => {
                self.rewrite_expr(cond)?;
                self.rewrite_stmts(body)
            }
            StmtKind::Block(stmts) => self.rewrite_stmts(stmts),
        }
    }

    // ── Expressions ─────────────────────────────────────────────────────

    fn rewrite_expr(&mut self, expr: &mut Expr) -> Result<()> {
        match &mut expr.kind {
            ExprKind::Literal(_) | ExprKind::Ident { .. } | ExprKind::This | ExprKind::TypeName(_) => {}
            ExprKind::Select { target, .. } => self.rewrite_expr(target)?,
            ExprKind::Call {
                target,
                method,
                args,
                ..
            } => {
                let method = *method;
                let receiver_ty = target.as_ref().map(|t| t.ty.clone());
                if let Some(target) = target {
                    self.rewrite_expr(target)?;
                }
                for arg in args.iter_mut() {
                    self.rewrite_expr(arg)?;
                }
                if self.is_wrapper_member(method) {
                    return self.rewrite_wrapper_call(expr, receiver_ty);
                }
            }
            ExprKind::New { args, .. } => {
                for arg in args.iter_mut() {
                    self.rewrite_expr(arg)?;
                }
            }
            ExprKind::Unary { operand, .. } => self.rewrite_expr(operand)?,
            ExprKind::Binary { lhs, rhs, .. } => {
                self.rewrite_expr(lhs)?;
                self.rewrite_expr(rhs)?;
            }
            ExprKind::Conditional {
                cond,
                then,
                otherwise,
            } => {
                self.rewrite_expr(cond)?;
                self.rewrite_expr(then)?;
                self.rewrite_expr(otherwise)?;
            }
            ExprKind::Lambda(lambda) => {
                for param in &mut lambda.params {
                    self.rewrite_var(param)?;
                }
                match &mut lambda.body {
                    LambdaBody::Expr(body) => self.rewrite_expr(body)?,
                    LambdaBody::Block(stmts) => self.rewrite_stmts(stmts)?,
                }
                self.retype_descriptor(&mut lambda.descriptor);
            }
            ExprKind::MethodRef(r) => {
                self.rewrite_expr(&mut r.qualifier)?;
                if self.is_wrapper_member(r.sym) {
                    return self.rewrite_wrapper_ref(expr);
                }
                self.retype_descriptor(&mut r.descriptor);
            }
            ExprKind::Assign { target, value } => {
                self.rewrite_expr(target)?;
                self.rewrite_expr(value)?;
            }
            ExprKind::Parens(inner) => self.rewrite_expr(inner)?,
        }
        self.retype_expr(expr);
        Ok(())
    }

    fn operation(name: &str, span: Span) -> Result<Operation> {
        Operation::from_name(name).ok_or_else(|| {
            DesugarError::new(
                DesugarErrorKind::UnsupportedOperation {
                    name: name.to_string(),
                },
                span,
            )
        })
    }

    /// Replace a call on the wrapper type with its transformer's output.
    fn rewrite_wrapper_call(&mut self, expr: &mut Expr, receiver_ty: Option<Type>) -> Result<()> {
        let original = expr.take();
        let span = original.span;
        let ExprKind::Call {
            target,
            name,
            method,
            args,
        } = original.kind
        else {
            return Err(DesugarError::new(
                DesugarErrorKind::UnexpectedNode {
                    context: "wrapper rewrite of a non-call".to_string(),
                },
                span,
            ));
        };
        let op = Self::operation(&name, span)?;
        tracing::debug!(operation = %op, start = span.start, end = span.end, "rewriting wrapper call");

        let receiver = if self.symbols.get(method).is_static() {
            None
        } else {
            match target {
                Some(target) => Some(*target),
                None => {
                    return Err(DesugarError::new(
                        DesugarErrorKind::UnexpectedNode {
                            context: format!("unqualified call to `Optional.{}`", name),
                        },
                        span,
                    ))
                }
            }
        };
        let element = match (&receiver, receiver_ty) {
            (Some(rewritten), Some(ty)) if is_raw_wrapper(&ty) => rewritten.ty.boxed(),
            (Some(_), Some(ty)) => self.unwrapped(&ty),
            _ => self.unwrapped(&original.ty),
        };
        let call = WrapperCall {
            op,
            receiver,
            element,
            args,
            result: self.unwrapped(&original.ty),
            span,
        };

        let registry = self.registry;
        let scope = self.scope(span)?.clone();
        let mut cx = TransformCx {
            symbols: &mut *self.symbols,
            session: &mut *self.session,
            scope: &scope,
        };
        *expr = registry.transform(call, &mut cx)?;
        self.rewrites += 1;
        Ok(())
    }

    /// Replace a method reference to a wrapper member (`Optional::isPresent`)
    /// with a reference to a synthetic method doing the same on the
    /// element.
    fn rewrite_wrapper_ref(&mut self, expr: &mut Expr) -> Result<()> {
        let original = expr.take();
        let span = original.span;
        let original_ty = original.ty;
        let ExprKind::MethodRef(MethodRef {
            qualifier,
            name,
            kind,
            mut descriptor,
            ..
        }) = original.kind
        else {
            return Err(DesugarError::new(
                DesugarErrorKind::UnexpectedNode {
                    context: "wrapper rewrite of a non-reference".to_string(),
                },
                span,
            ));
        };
        let op = Self::operation(&name, span)?;
        tracing::debug!(operation = %op, start = span.start, end = span.end, "rewriting wrapper reference");
        let scope = self.scope(span)?.clone();
        let registry = self.registry;

        let ref_name = self.session.names.fresh("ref");
        let sym = self.symbols.new_method(
            scope.class,
            &ref_name,
            Type::method(vec![], Type::Void),
            Modifiers::synthetic(scope.is_static),
        );
        self.session.make.at(span);

        let mut params: Vec<VarDecl> = Vec::new();
        let mut arg_tys: Vec<Type> = descriptor.params.clone();
        let element = match kind {
            RefKind::Unbound => {
                if arg_tys.is_empty() {
                    return Err(DesugarError::new(
                        DesugarErrorKind::UnexpectedNode {
                            context: format!("reference to `Optional::{}` without a receiver", name),
                        },
                        span,
                    ));
                }
                self.unwrapped(&arg_tys.remove(0))
            }
            RefKind::Bound => self.unwrapped(&qualifier.ty),
            RefKind::Static => self.unwrapped(&descriptor.ret),
            RefKind::Constructor => {
                return Err(DesugarError::new(
                    DesugarErrorKind::UnexpectedNode {
                        context: "constructor reference to the wrapper type".to_string(),
                    },
                    span,
                ))
            }
        };
        let receiver = if kind == RefKind::Static {
            None
        } else {
            let param_name = self.session.names.fresh("value");
            let decl = self
                .session
                .make
                .param(self.symbols, sym, &param_name, element.clone());
            let ident = self.session.make.ident(self.symbols, decl.sym);
            params.push(decl);
            Some(ident)
        };
        let mut args = Vec::with_capacity(arg_tys.len());
        for ty in &arg_tys {
            let ty = self.unwrapped(ty);
            let param_name = self.session.names.fresh("arg");
            let decl = self.session.make.param(self.symbols, sym, &param_name, ty);
            args.push(self.session.make.ident(self.symbols, decl.sym));
            params.push(decl);
        }
        let result = self.unwrapped(&descriptor.ret);

        let call = WrapperCall {
            op,
            receiver,
            element,
            args,
            result: result.clone(),
            span,
        };
        let value = {
            let mut cx = TransformCx {
                symbols: &mut *self.symbols,
                session: &mut *self.session,
                scope: &scope,
            };
            registry.transform(call, &mut cx)?
        };
        let body = if result.is_void() {
            vec![self.session.make.at(span).exec(value)]
        } else {
            vec![self.session.make.at(span).ret(Some(value))]
        };
        let tys = params.iter().map(|p| p.ty.clone()).collect();
        self.symbols.set_type(sym, Type::method(tys, result.clone()));
        let method = self.session.make.method(self.symbols, sym, params, body);
        self.session.methods.register(method)?;

        self.retype_descriptor(&mut descriptor);
        let ty = self.unwrapped(&original_ty);
        *expr = match kind {
            RefKind::Bound => self.bind_bound_ref(&scope, sym, *qualifier, descriptor, ty, span)?,
            _ => {
                let (qualifier, ref_kind) = if scope.is_static {
                    let qualified = self
                        .symbols
                        .class_info(scope.class)
                        .map(|info| info.qualified.clone())
                        .unwrap_or_default();
                    (self.session.make.type_name(&qualified), RefKind::Static)
                } else {
                    (self.session.make.this(scope.class_ty.clone()), RefKind::Bound)
                };
                self.session.make.expr(
                    ExprKind::MethodRef(MethodRef {
                        qualifier: Box::new(qualifier),
                        name: ref_name,
                        sym,
                        kind: ref_kind,
                        descriptor,
                    }),
                    ty,
                )
            }
        };
        self.rewrites += 1;
        Ok(())
    }

    /// `bind$M(qualifier)` for a bound wrapper reference, where
    /// `bind$M(q)` returns `(a, b) -> ref$N(q, a, b)`. The qualifier is
    /// evaluated once, when the reference is created.
    fn bind_bound_ref(
        &mut self,
        scope: &EnclosingScope,
        target: SymbolId,
        qualifier: Expr,
        descriptor: SamSignature,
        ty: Type,
        span: Span,
    ) -> Result<Expr> {
        let bind_name = self.session.names.fresh("bind");
        let bind = self.symbols.new_method(
            scope.class,
            &bind_name,
            Type::method(vec![], Type::Void),
            Modifiers::synthetic(scope.is_static),
        );
        let receiver_ty = self.unwrapped(&qualifier.ty);
        let receiver_name = self.session.names.fresh("receiver");
        let make = self.session.make.at(span);
        let receiver = make.param(self.symbols, bind, &receiver_name, receiver_ty);

        let mut params = Vec::with_capacity(descriptor.params.len());
        let mut args = vec![make.ident(self.symbols, receiver.sym)];
        for param_ty in &descriptor.params {
            let name = self.session.names.fresh("inferred");
            let decl = make.param(self.symbols, bind, &name, param_ty.clone());
            args.push(make.ident(self.symbols, decl.sym));
            params.push(decl);
        }
        let ret = self.symbols.ty(target).return_type().clone();
        let call = make.call_typed(self.symbols, None, target, args, ret);
        let lambda = make.expr(
            ExprKind::Lambda(Lambda {
                params,
                body: LambdaBody::Expr(Box::new(call)),
                descriptor,
            }),
            ty.clone(),
        );
        let body = vec![make.ret(Some(lambda))];

        self.symbols
            .set_type(bind, Type::method(vec![receiver.ty.clone()], ty.clone()));
        let method = make.method(self.symbols, bind, vec![receiver], body);
        self.session.methods.register(method)?;
        tracing::trace!(method = %bind_name, "bound wrapper reference");
        Ok(make.call_typed(self.symbols, None, bind, vec![qualifier], ty))
    }
}
