// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Declarations: classes, their members, and compilation units.

use crate::expr::Expr;
use crate::stmt::Stmt;
use crate::{Modifiers, Span, SymbolId, Type};

/// A field, parameter or local variable.
#[derive(Debug, Clone)]
pub struct VarDecl {
    pub sym: SymbolId,
    pub name: String,
    /// Declared type. For `var` declarations, the type inferred by the
    /// front end.
    pub ty: Type,
    pub init: Option<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct MethodDecl {
    pub sym: SymbolId,
    pub name: String,
    pub params: Vec<VarDecl>,
    pub ret: Type,
    /// `None` for abstract methods.
    pub body: Option<Vec<Stmt>>,
    pub modifiers: Modifiers,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum Member {
    Field(VarDecl, Modifiers),
    Method(MethodDecl),
    Class(ClassDecl),
}

#[derive(Debug, Clone)]
pub struct ClassDecl {
    pub sym: SymbolId,
    pub name: String,
    pub members: Vec<Member>,
    pub modifiers: Modifiers,
    pub span: Span,
}

impl ClassDecl {
    pub fn methods(&self) -> impl Iterator<Item = &MethodDecl> {
        self.members.iter().filter_map(|m| match m {
            Member::Method(method) => Some(method),
            _ => None,
        })
    }

    pub fn method(&self, name: &str) -> Option<&MethodDecl> {
        self.methods().find(|m| m.name == name)
    }

    pub fn nested(&self) -> impl Iterator<Item = &ClassDecl> {
        self.members.iter().filter_map(|m| match m {
            Member::Class(class) => Some(class),
            _ => None,
        })
    }
}

/// One source file's worth of top-level classes.
#[derive(Debug, Clone)]
pub struct CompilationUnit {
    pub name: String,
    pub classes: Vec<ClassDecl>,
}

impl CompilationUnit {
    pub fn new(name: &str, classes: Vec<ClassDecl>) -> Self {
        Self {
            name: name.to_string(),
            classes,
        }
    }

    /// Top-level or nested class by simple name, depth first.
    pub fn class(&self, name: &str) -> Option<&ClassDecl> {
        fn find<'a>(classes: impl Iterator<Item = &'a ClassDecl>, name: &str) -> Option<&'a ClassDecl> {
            for class in classes {
                if class.name == name {
                    return Some(class);
                }
                if let Some(found) = find(class.nested(), name) {
                    return Some(found);
                }
            }
            None
        }
        find(self.classes.iter(), name)
    }
}
