// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Java-like rendering of a tree, used for the debug dump and in tests.

use std::fmt::Write;

use crate::decl::{ClassDecl, CompilationUnit, Member, MethodDecl, VarDecl};
use crate::expr::{Expr, ExprKind, LambdaBody, Literal, RefKind, UnaryOp};
use crate::stmt::{Stmt, StmtKind};
use crate::ty::simple_name;
use crate::Modifiers;

const INDENT: &str = "    ";

pub fn print_unit(unit: &CompilationUnit) -> String {
    let mut p = Printer::default();
    for (i, class) in unit.classes.iter().enumerate() {
        if i > 0 {
            p.out.push('\n');
        }
        p.class(class);
    }
    p.out
}

pub fn print_method(method: &MethodDecl) -> String {
    let mut p = Printer::default();
    p.method(method);
    p.out
}

pub fn print_expr(expr: &Expr) -> String {
    let mut out = String::new();
    expr_into(&mut out, expr, 0);
    out
}

#[derive(Default)]
struct Printer {
    out: String,
    indent: usize,
}

impl Printer {
    fn line(&mut self, text: &str) {
        for _ in 0..self.indent {
            self.out.push_str(INDENT);
        }
        self.out.push_str(text);
        self.out.push('\n');
    }

    fn class(&mut self, class: &ClassDecl) {
        self.line(&format!("{}class {} {{", modifiers(&class.modifiers), class.name));
        self.indent += 1;
        for member in &class.members {
            match member {
                Member::Field(field, mods) => {
                    let text = format!("{}{};", modifiers(mods), var_decl(field, self.indent));
                    self.line(&text);
                }
                Member::Method(method) => self.method(method),
                Member::Class(nested) => self.class(nested),
            }
        }
        self.indent -= 1;
        self.line("}");
    }

    fn method(&mut self, method: &MethodDecl) {
        let params: Vec<String> = method
            .params
            .iter()
            .map(|p| format!("{} {}", p.ty, p.name))
            .collect();
        let head = format!(
            "{}{} {}({})",
            modifiers(&method.modifiers),
            method.ret,
            method.name,
            params.join(", ")
        );
        match &method.body {
            None => self.line(&format!("{};", head)),
            Some(body) => {
                self.line(&format!("{} {{", head));
                self.block_body(body);
                self.line("}");
            }
        }
    }

    fn block_body(&mut self, stmts: &[Stmt]) {
        self.indent += 1;
        for stmt in stmts {
            self.stmt(stmt);
        }
        self.indent -= 1;
    }

    fn expr(&self, expr: &Expr) -> String {
        let mut out = String::new();
        expr_into(&mut out, expr, self.indent);
        out
    }

    fn stmt(&mut self, stmt: &Stmt) {
        match &stmt.kind {
            StmtKind::Expr(e) => {
                let text = format!("{};", self.expr(e));
                self.line(&text);
            }
            StmtKind::VarDef(decl) => {
                let text = format!("{};", var_decl(decl, self.indent));
                self.line(&text);
            }
            StmtKind::Return(None) => self.line("return;"),
            StmtKind::Return(Some(e)) => {
                let text = format!("return {};", self.expr(e));
                self.line(&text);
            }
            StmtKind::Throw(e) => {
                let text = format!("throw {};", self.expr(e));
                self.line(&text);
            }
            StmtKind::If {
                cond,
                then,
                otherwise,
            } => {
                let text = format!("if ({}) {{", self.expr(cond));
                self.line(&text);
                self.block_body(then);
                if let Some(otherwise) = otherwise {
                    self.line("} else {");
                    self.block_body(otherwise);
                }
                self.line("}");
            }
            StmtKind::While { cond, body } => {
                let text = format!("while ({}) {{", self.expr(cond));
                self.line(&text);
                self.block_body(body);
                self.line("}");
            }
            StmtKind::Block(stmts) => {
                self.line("{");
                self.block_body(stmts);
                self.line("}");
            }
        }
    }
}

fn modifiers(mods: &Modifiers) -> String {
    let mut out = String::new();
    if let Some(kw) = mods.visibility.keyword() {
        out.push_str(kw);
        out.push(' ');
    }
    if mods.is_static {
        out.push_str("static ");
    }
    if mods.is_abstract {
        out.push_str("abstract ");
    }
    out
}

fn var_decl(decl: &VarDecl, indent: usize) -> String {
    let mut out = format!("{} {}", decl.ty, decl.name);
    if let Some(init) = &decl.init {
        out.push_str(" = ");
        expr_into(&mut out, init, indent);
    }
    out
}

fn literal(out: &mut String, lit: &Literal) {
    let _ = match lit {
        Literal::Null => write!(out, "null"),
        Literal::Bool(b) => write!(out, "{}", b),
        Literal::Int(i) => write!(out, "{}", i),
        Literal::Long(l) => write!(out, "{}L", l),
        Literal::Double(d) => write!(out, "{:?}", d),
        Literal::Char(c) => write!(out, "'{}'", c.escape_default()),
        Literal::String(s) => write!(out, "\"{}\"", s.escape_default()),
    };
}

/// Operands that need parentheses to keep their grouping.
fn operand(out: &mut String, expr: &Expr, indent: usize) {
    match expr.kind {
        ExprKind::Binary { .. }
        | ExprKind::Conditional { .. }
        | ExprKind::Assign { .. }
        | ExprKind::Lambda(_) => {
            out.push('(');
            expr_into(out, expr, indent);
            out.push(')');
        }
        _ => expr_into(out, expr, indent),
    }
}

fn args(out: &mut String, args: &[Expr], indent: usize) {
    out.push('(');
    for (i, arg) in args.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        expr_into(out, arg, indent);
    }
    out.push(')');
}

fn expr_into(out: &mut String, expr: &Expr, indent: usize) {
    match &expr.kind {
        ExprKind::Literal(lit) => literal(out, lit),
        ExprKind::Ident { name, .. } => out.push_str(name),
        ExprKind::This => out.push_str("this"),
        ExprKind::TypeName(name) => out.push_str(simple_name(name)),
        ExprKind::Select { target, name, .. } => {
            operand(out, target, indent);
            out.push('.');
            out.push_str(name);
        }
        ExprKind::Call {
            target, name, args: call_args, ..
        } => {
            if let Some(target) = target {
                operand(out, target, indent);
                out.push('.');
            }
            out.push_str(name);
            args(out, call_args, indent);
        }
        ExprKind::New { args: ctor_args, .. } => {
            let _ = write!(out, "new {}", expr.ty);
            args(out, ctor_args, indent);
        }
        ExprKind::Unary { op, operand: inner } => {
            out.push(match op {
                UnaryOp::Not => '!',
                UnaryOp::Neg => '-',
            });
            operand(out, inner, indent);
        }
        ExprKind::Binary { op, lhs, rhs } => {
            operand(out, lhs, indent);
            let _ = write!(out, " {} ", op.symbol());
            operand(out, rhs, indent);
        }
        ExprKind::Conditional {
            cond,
            then,
            otherwise,
        } => {
            operand(out, cond, indent);
            out.push_str(" ? ");
            operand(out, then, indent);
            out.push_str(" : ");
            operand(out, otherwise, indent);
        }
        ExprKind::Lambda(lambda) => {
            let names: Vec<&str> = lambda.params.iter().map(|p| p.name.as_str()).collect();
            let _ = write!(out, "({}) -> ", names.join(", "));
            match &lambda.body {
                LambdaBody::Expr(body) => expr_into(out, body, indent),
                LambdaBody::Block(stmts) => {
                    let mut p = Printer {
                        out: String::new(),
                        indent: indent + 1,
                    };
                    for stmt in stmts {
                        p.stmt(stmt);
                    }
                    out.push_str("{\n");
                    out.push_str(&p.out);
                    for _ in 0..indent {
                        out.push_str(INDENT);
                    }
                    out.push('}');
                }
            }
        }
        ExprKind::MethodRef(r) => {
            operand(out, &r.qualifier, indent);
            out.push_str("::");
            match r.kind {
                RefKind::Constructor => out.push_str("new"),
                _ => out.push_str(&r.name),
            }
        }
        ExprKind::Assign { target, value } => {
            expr_into(out, target, indent);
            out.push_str(" = ");
            expr_into(out, value, indent);
        }
        ExprKind::Parens(inner) => {
            out.push('(');
            expr_into(out, inner, indent);
            out.push(')');
        }
    }
}
