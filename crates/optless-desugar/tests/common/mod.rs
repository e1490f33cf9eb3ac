// SPDX-License-Identifier: (MIT OR Apache-2.0)

//! Shared fixtures: build attributed trees the way a front end would
//! hand them over, run the pass, and evaluate the result.

#![allow(dead_code)]

use optless_ast::decl::{ClassDecl, CompilationUnit, Member, VarDecl};
use optless_ast::expr::{Expr, ExprKind, Lambda, LambdaBody, MethodRef, RefKind};
use optless_ast::make::TreeMaker;
use optless_ast::stmt::Stmt;
use optless_ast::ty::simple_name;
use optless_ast::visit::{self, Visitor};
use optless_ast::{prelude, Modifiers, Span, SymbolId, SymbolTable, Type};
use optless_desugar::unbox::mentions_wrapper;
use optless_interp::{Interpreter, Outcome, Value};

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn optional(element: Type) -> Type {
    Type::generic(prelude::OPTIONAL, vec![element])
}

pub fn function(from: Type, to: Type) -> Type {
    Type::generic(prelude::FUNCTION, vec![from, to])
}

pub fn supplier(of: Type) -> Type {
    Type::generic(prelude::SUPPLIER, vec![of])
}

pub fn predicate(of: Type) -> Type {
    Type::generic(prelude::PREDICATE, vec![of])
}

pub fn consumer(of: Type) -> Type {
    Type::generic(prelude::CONSUMER, vec![of])
}

/// A method whose signature is declared but whose body is not built yet.
pub struct MethodShell {
    pub sym: SymbolId,
    pub params: Vec<VarDecl>,
}

impl MethodShell {
    pub fn param(&self, index: usize) -> SymbolId {
        self.params[index].sym
    }
}

struct OpenClass {
    sym: SymbolId,
    qualified: String,
    members: Vec<Member>,
}

/// Builder for a one-file compilation unit.
pub struct Fixture {
    pub symbols: SymbolTable,
    pub make: TreeMaker,
    open: Vec<OpenClass>,
    unit_name: String,
}

impl Fixture {
    pub fn new(qualified: &str) -> Self {
        let mut symbols = SymbolTable::new();
        prelude::install(&mut symbols);
        let sym = symbols.declare_class(qualified, &[], None);
        Self {
            symbols,
            make: TreeMaker::new(),
            open: vec![OpenClass {
                sym,
                qualified: qualified.to_string(),
                members: Vec::new(),
            }],
            unit_name: format!("{}.java", simple_name(qualified)),
        }
    }

    fn current(&mut self) -> &mut OpenClass {
        self.open.last_mut().expect("no open class")
    }

    pub fn class_sym(&self) -> SymbolId {
        self.open.last().expect("no open class").sym
    }

    pub fn class_ty(&self) -> Type {
        self.symbols.ty(self.class_sym()).clone()
    }

    /// Open a nested class; members go there until `unnest`.
    pub fn nest(&mut self, simple: &str) -> SymbolId {
        let outer = self.class_sym();
        let qualified = format!("{}.{}", self.current().qualified, simple);
        let sym = self.symbols.declare_class(&qualified, &[], Some(outer));
        self.open.push(OpenClass {
            sym,
            qualified,
            members: Vec::new(),
        });
        sym
    }

    pub fn unnest(&mut self) {
        let class = self.open.pop().expect("no nested class");
        let decl = self.class_decl(class);
        self.current().members.push(Member::Class(decl));
    }

    fn class_decl(&self, class: OpenClass) -> ClassDecl {
        ClassDecl {
            sym: class.sym,
            name: simple_name(&class.qualified).to_string(),
            members: class.members,
            modifiers: Modifiers::public(),
            span: Span::default(),
        }
    }

    pub fn finish(mut self) -> (CompilationUnit, SymbolTable) {
        while self.open.len() > 1 {
            self.unnest();
        }
        let top = self.open.pop().expect("no open class");
        let decl = self.class_decl(top);
        (CompilationUnit::new(&self.unit_name, vec![decl]), self.symbols)
    }

    // ── Members ─────────────────────────────────────────────────────────

    pub fn declare(
        &mut self,
        name: &str,
        params: &[(&str, Type)],
        ret: Type,
        modifiers: Modifiers,
    ) -> MethodShell {
        let class = self.class_sym();
        let tys = params.iter().map(|(_, ty)| ty.clone()).collect();
        let sym = self.symbols.declare_method(class, name, tys, ret, modifiers);
        let params = params
            .iter()
            .map(|(pname, ty)| self.make.param(&mut self.symbols, sym, pname, ty.clone()))
            .collect();
        MethodShell { sym, params }
    }

    pub fn define(&mut self, shell: MethodShell, body: Vec<Stmt>) {
        let method = self.make.method(&self.symbols, shell.sym, shell.params, body);
        self.current().members.push(Member::Method(method));
    }

    /// `static ret name(params) { return value; }` in one step.
    pub fn static_returning(
        &mut self,
        name: &str,
        params: &[(&str, Type)],
        ret: Type,
        value: impl FnOnce(&mut Self, &MethodShell) -> Expr,
    ) {
        let shell = self.declare(name, params, ret, Modifiers::public_static());
        let value = value(self, &shell);
        let body = vec![self.make.ret(Some(value))];
        self.define(shell, body);
    }

    pub fn field(&mut self, name: &str, ty: Type, init: Option<Expr>, modifiers: Modifiers) -> SymbolId {
        let class = self.class_sym();
        let sym = self.symbols.declare_field(class, name, ty.clone(), modifiers);
        let decl = VarDecl {
            sym,
            name: name.to_string(),
            ty,
            init,
            span: Span::default(),
        };
        self.current().members.push(Member::Field(decl, modifiers));
        sym
    }

    pub fn local(&mut self, method: SymbolId, name: &str, ty: Type, init: Option<Expr>) -> (SymbolId, Stmt) {
        let sym = self.symbols.declare_local(method, name, ty.clone());
        let decl = VarDecl {
            sym,
            name: name.to_string(),
            ty,
            init,
            span: Span::default(),
        };
        (sym, self.make.var_def(decl))
    }

    // ── Expressions ─────────────────────────────────────────────────────

    pub fn ident(&mut self, sym: SymbolId) -> Expr {
        self.make.ident(&self.symbols, sym)
    }

    pub fn string(&mut self, value: &str) -> Expr {
        self.make.string(value)
    }

    pub fn int(&mut self, value: i32) -> Expr {
        self.make.int(value)
    }

    pub fn null(&mut self) -> Expr {
        self.make.null(Type::Null)
    }

    fn method_of(&self, owner: &str, name: &str, arity: usize) -> SymbolId {
        self.symbols
            .lookup_method(owner, name, arity)
            .unwrap_or_else(|| panic!("{}.{}/{} is not declared", owner, name, arity))
    }

    /// `receiver.name(args)` resolved against `owner`, with the attributed
    /// result type `ty`.
    pub fn call(&mut self, receiver: Expr, owner: &str, name: &str, args: Vec<Expr>, ty: Type) -> Expr {
        let method = self.method_of(owner, name, args.len());
        self.make
            .call_typed(&self.symbols, Some(receiver), method, args, ty)
    }

    /// `Owner.name(args)`.
    pub fn static_call(&mut self, owner: &str, name: &str, args: Vec<Expr>, ty: Type) -> Expr {
        let method = self.method_of(owner, name, args.len());
        let target = self.make.type_name(owner);
        self.make
            .call_typed(&self.symbols, Some(target), method, args, ty)
    }

    /// Unqualified call of a method of the class being built.
    pub fn call_own(&mut self, method: SymbolId, args: Vec<Expr>) -> Expr {
        self.make.call(&self.symbols, None, method, args)
    }

    pub fn assign(&mut self, target: Expr, value: Expr) -> Expr {
        let ty = target.ty.clone();
        self.make.expr(
            ExprKind::Assign {
                target: Box::new(target),
                value: Box::new(value),
            },
            ty,
        )
    }

    /// A lambda written inside `method`, attributed against `fn_ty`.
    /// Parameter types come from the functional descriptor.
    pub fn lambda(
        &mut self,
        method: SymbolId,
        names: &[&str],
        fn_ty: Type,
        body: impl FnOnce(&mut Self, &[SymbolId]) -> Expr,
    ) -> Expr {
        let descriptor = self
            .symbols
            .sam(&fn_ty)
            .unwrap_or_else(|| panic!("{} is not functional", fn_ty));
        let params: Vec<VarDecl> = names
            .iter()
            .zip(&descriptor.params)
            .map(|(name, ty)| self.make.param(&mut self.symbols, method, name, ty.clone()))
            .collect();
        let syms: Vec<SymbolId> = params.iter().map(|p| p.sym).collect();
        let body = body(self, &syms);
        self.make.expr(
            ExprKind::Lambda(Lambda {
                params,
                body: LambdaBody::Expr(Box::new(body)),
                descriptor,
            }),
            fn_ty,
        )
    }

    /// Like `lambda`, with a statement body.
    pub fn block_lambda(
        &mut self,
        method: SymbolId,
        names: &[&str],
        fn_ty: Type,
        body: impl FnOnce(&mut Self, &[SymbolId]) -> Vec<Stmt>,
    ) -> Expr {
        let descriptor = self
            .symbols
            .sam(&fn_ty)
            .unwrap_or_else(|| panic!("{} is not functional", fn_ty));
        let params: Vec<VarDecl> = names
            .iter()
            .zip(&descriptor.params)
            .map(|(name, ty)| self.make.param(&mut self.symbols, method, name, ty.clone()))
            .collect();
        let syms: Vec<SymbolId> = params.iter().map(|p| p.sym).collect();
        let body = body(self, &syms);
        self.make.expr(
            ExprKind::Lambda(Lambda {
                params,
                body: LambdaBody::Block(body),
                descriptor,
            }),
            fn_ty,
        )
    }

    /// `Owner::new`, attributed against `fn_ty`.
    pub fn constructor_ref(&mut self, owner: &str, arity: usize, fn_ty: Type) -> Expr {
        let sym = self
            .symbols
            .lookup_constructor(owner, arity)
            .unwrap_or_else(|| panic!("{}/{} has no such constructor", owner, arity));
        let descriptor = self
            .symbols
            .sam(&fn_ty)
            .unwrap_or_else(|| panic!("{} is not functional", fn_ty));
        let qualifier = self.make.type_name(owner);
        self.make.expr(
            ExprKind::MethodRef(MethodRef {
                qualifier: Box::new(qualifier),
                name: "new".to_string(),
                sym,
                kind: RefKind::Constructor,
                descriptor,
            }),
            fn_ty,
        )
    }

    /// `Owner::name` or `receiver::name`, attributed against `fn_ty`.
    pub fn method_ref(
        &mut self,
        qualifier: Expr,
        owner: &str,
        name: &str,
        arity: usize,
        kind: RefKind,
        fn_ty: Type,
    ) -> Expr {
        let sym = self.method_of(owner, name, arity);
        let descriptor = self
            .symbols
            .sam(&fn_ty)
            .unwrap_or_else(|| panic!("{} is not functional", fn_ty));
        self.make.expr(
            ExprKind::MethodRef(MethodRef {
                qualifier: Box::new(qualifier),
                name: name.to_string(),
                sym,
                kind,
                descriptor,
            }),
            fn_ty,
        )
    }
}

// ── Running ─────────────────────────────────────────────────────────────

/// Run the pass over a finished fixture.
pub fn desugared(fixture: Fixture) -> (CompilationUnit, SymbolTable) {
    init_tracing();
    let (mut unit, mut symbols) = fixture.finish();
    optless_desugar::desugar(&mut unit, &mut symbols).expect("pass failed");
    (unit, symbols)
}

pub fn eval(unit: &CompilationUnit, symbols: &SymbolTable, class: &str, method: &str, args: Vec<Value>) -> Outcome {
    Interpreter::new(unit, symbols)
        .invoke(class, method, args)
        .expect("runtime error")
}

pub fn returned(unit: &CompilationUnit, symbols: &SymbolTable, class: &str, method: &str, args: Vec<Value>) -> Value {
    match eval(unit, symbols, class, method, args) {
        Outcome::Returned(value) => value,
        Outcome::Threw(value) => panic!("{}.{} threw {}", class, method, value),
    }
}

// ── Inspection ──────────────────────────────────────────────────────────

/// Every place in `unit` where a type still mentions the wrapper.
pub fn wrapper_mentions(unit: &CompilationUnit) -> Vec<String> {
    let mut scan = WrapperScan::default();
    for class in &unit.classes {
        scan.class(class);
    }
    scan.found
}

#[derive(Default)]
struct WrapperScan {
    found: Vec<String>,
}

impl WrapperScan {
    fn check(&mut self, what: &str, ty: &Type) {
        if mentions_wrapper(ty) {
            self.found.push(format!("{}: {}", what, ty));
        }
    }

    fn class(&mut self, class: &ClassDecl) {
        for member in &class.members {
            match member {
                Member::Field(decl, _) => self.visit_var_decl(decl),
                Member::Method(method) => {
                    self.check(&format!("return of {}", method.name), &method.ret);
                    for param in &method.params {
                        self.visit_var_decl(param);
                    }
                    if let Some(body) = &method.body {
                        visit::walk_stmts(self, body);
                    }
                }
                Member::Class(nested) => self.class(nested),
            }
        }
    }
}

impl Visitor for WrapperScan {
    fn visit_expr(&mut self, expr: &Expr) {
        self.check("expression", &expr.ty);
        match &expr.kind {
            ExprKind::Lambda(lambda) => {
                for ty in lambda.descriptor.params.iter().chain([&lambda.descriptor.ret]) {
                    self.check("lambda descriptor", ty);
                }
            }
            ExprKind::MethodRef(r) => {
                for ty in r.descriptor.params.iter().chain([&r.descriptor.ret]) {
                    self.check("reference descriptor", ty);
                }
            }
            _ => {}
        }
        visit::walk_expr(self, expr);
    }

    fn visit_var_decl(&mut self, decl: &VarDecl) {
        self.check(&decl.name, &decl.ty);
        visit::walk_var_decl(self, decl);
    }
}

/// Names of the synthetic methods of a class, in member order.
pub fn synthetic_methods(class: &ClassDecl) -> Vec<&str> {
    class
        .methods()
        .filter(|m| m.modifiers.is_synthetic)
        .map(|m| m.name.as_str())
        .collect()
}
