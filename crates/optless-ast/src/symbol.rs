// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Symbol definitions and symbol table.

use std::collections::HashMap;

use crate::ty::{simple_name, Type};

/// Unique identifier for a symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SymbolId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
    #[default]
    Public,
    Protected,
    Package,
    Private,
}

impl Visibility {
    pub fn keyword(self) -> Option<&'static str> {
        match self {
            Visibility::Public => Some("public"),
            Visibility::Protected => Some("protected"),
            Visibility::Package => None,
            Visibility::Private => Some("private"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub visibility: Visibility,
    pub is_static: bool,
    pub is_abstract: bool,
    pub is_synthetic: bool,
}

impl Modifiers {
    pub fn public() -> Self {
        Self::default()
    }

    pub fn public_static() -> Self {
        Self {
            is_static: true,
            ..Self::default()
        }
    }

    pub fn private() -> Self {
        Self {
            visibility: Visibility::Private,
            ..Self::default()
        }
    }

    pub fn abstract_() -> Self {
        Self {
            is_abstract: true,
            ..Self::default()
        }
    }

    /// Modifiers of a method generated by the pass: always private,
    /// static exactly when the code it was generated from is static.
    pub fn synthetic(is_static: bool) -> Self {
        Self {
            visibility: Visibility::Private,
            is_static,
            is_abstract: false,
            is_synthetic: true,
        }
    }
}

/// Class-level data of a class symbol.
#[derive(Debug, Clone)]
pub struct ClassInfo {
    pub qualified: String,
    pub type_params: Vec<String>,
    /// Members in scope order.
    pub members: Vec<SymbolId>,
    /// Whether this is a functional interface (exactly one abstract method).
    pub functional: bool,
}

/// The kind of symbol.
#[derive(Debug, Clone)]
pub enum SymbolKind {
    Class(ClassInfo),
    Method,
    Constructor,
    Field,
    /// A method or lambda parameter.
    Param,
    /// A local variable.
    Local,
}

/// A declared symbol.
///
/// Parameters and locals of a lambda are owned by the method the lambda
/// is written in, not by the lambda.
#[derive(Debug, Clone)]
pub struct Symbol {
    pub id: SymbolId,
    pub name: String,
    pub kind: SymbolKind,
    /// Variables: their type. Methods and constructors: a `Type::Method`.
    /// Classes: the class type over its own type parameters.
    pub ty: Type,
    pub owner: Option<SymbolId>,
    pub modifiers: Modifiers,
}

impl Symbol {
    pub fn is_variable(&self) -> bool {
        matches!(self.kind, SymbolKind::Param | SymbolKind::Local)
    }

    pub fn is_static(&self) -> bool {
        self.modifiers.is_static
    }
}

/// Single abstract method of a functional interface, instantiated for a
/// concrete interface type.
#[derive(Debug, Clone, PartialEq)]
pub struct SamSignature {
    pub method: SymbolId,
    pub name: String,
    pub params: Vec<Type>,
    pub ret: Type,
}

/// Table of all symbols in a program.
#[derive(Debug, Default)]
pub struct SymbolTable {
    symbols: Vec<Symbol>,
    classes: HashMap<String, SymbolId>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    fn insert(
        &mut self,
        name: &str,
        kind: SymbolKind,
        ty: Type,
        owner: Option<SymbolId>,
        modifiers: Modifiers,
    ) -> SymbolId {
        let id = SymbolId(self.symbols.len() as u32);
        self.symbols.push(Symbol {
            id,
            name: name.to_string(),
            kind,
            ty,
            owner,
            modifiers,
        });
        id
    }

    /// Declare a class by qualified name. Redeclaring returns the
    /// existing symbol.
    pub fn declare_class(
        &mut self,
        qualified: &str,
        type_params: &[&str],
        owner: Option<SymbolId>,
    ) -> SymbolId {
        if let Some(&id) = self.classes.get(qualified) {
            return id;
        }
        let params: Vec<String> = type_params.iter().map(|p| p.to_string()).collect();
        let ty = Type::generic(qualified, params.iter().map(|p| Type::Var(p.clone())).collect());
        let info = ClassInfo {
            qualified: qualified.to_string(),
            type_params: params,
            members: Vec::new(),
            functional: false,
        };
        let id = self.insert(
            simple_name(qualified),
            SymbolKind::Class(info),
            ty,
            owner,
            Modifiers::public(),
        );
        self.classes.insert(qualified.to_string(), id);
        if let Some(outer) = owner {
            self.enter(outer, id);
        }
        id
    }

    /// Mark a class as a functional interface.
    pub fn set_functional(&mut self, class: SymbolId) {
        if let SymbolKind::Class(info) = &mut self.get_mut(class).kind {
            info.functional = true;
        }
    }

    /// Declare a method and enter it into its class scope.
    pub fn declare_method(
        &mut self,
        class: SymbolId,
        name: &str,
        params: Vec<Type>,
        ret: Type,
        modifiers: Modifiers,
    ) -> SymbolId {
        let id = self.new_method(class, name, Type::method(params, ret), modifiers);
        self.enter(class, id);
        id
    }

    /// Create a method symbol owned by `class` without entering it into
    /// the class scope.
    pub fn new_method(
        &mut self,
        class: SymbolId,
        name: &str,
        ty: Type,
        modifiers: Modifiers,
    ) -> SymbolId {
        self.insert(name, SymbolKind::Method, ty, Some(class), modifiers)
    }

    pub fn declare_constructor(&mut self, class: SymbolId, params: Vec<Type>) -> SymbolId {
        let ret = self.get(class).ty.clone();
        let id = self.insert(
            "<init>",
            SymbolKind::Constructor,
            Type::method(params, ret),
            Some(class),
            Modifiers::public(),
        );
        self.enter(class, id);
        id
    }

    pub fn declare_field(
        &mut self,
        class: SymbolId,
        name: &str,
        ty: Type,
        modifiers: Modifiers,
    ) -> SymbolId {
        let id = self.insert(name, SymbolKind::Field, ty, Some(class), modifiers);
        self.enter(class, id);
        id
    }

    pub fn declare_param(&mut self, method: SymbolId, name: &str, ty: Type) -> SymbolId {
        self.insert(name, SymbolKind::Param, ty, Some(method), Modifiers::default())
    }

    pub fn declare_local(&mut self, method: SymbolId, name: &str, ty: Type) -> SymbolId {
        self.insert(name, SymbolKind::Local, ty, Some(method), Modifiers::default())
    }

    /// Enter `member` into the scope of `class`, after every member already
    /// there. Entering twice is a no-op.
    pub fn enter(&mut self, class: SymbolId, member: SymbolId) {
        if let SymbolKind::Class(info) = &mut self.get_mut(class).kind {
            if !info.members.contains(&member) {
                info.members.push(member);
            }
        }
        self.get_mut(member).owner = Some(class);
    }

    pub fn get(&self, id: SymbolId) -> &Symbol {
        &self.symbols[id.0 as usize]
    }

    pub fn get_mut(&mut self, id: SymbolId) -> &mut Symbol {
        &mut self.symbols[id.0 as usize]
    }

    pub fn name(&self, id: SymbolId) -> &str {
        &self.get(id).name
    }

    pub fn ty(&self, id: SymbolId) -> &Type {
        &self.get(id).ty
    }

    pub fn set_type(&mut self, id: SymbolId, ty: Type) {
        self.get_mut(id).ty = ty;
    }

    pub fn owner(&self, id: SymbolId) -> Option<SymbolId> {
        self.get(id).owner
    }

    pub fn set_owner(&mut self, id: SymbolId, owner: SymbolId) {
        self.get_mut(id).owner = Some(owner);
    }

    pub fn class_info(&self, id: SymbolId) -> Option<&ClassInfo> {
        match &self.get(id).kind {
            SymbolKind::Class(info) => Some(info),
            _ => None,
        }
    }

    pub fn class_by_name(&self, qualified: &str) -> Option<SymbolId> {
        self.classes.get(qualified).copied()
    }

    /// Members of a class, in scope order. Empty for non-classes.
    pub fn members(&self, class: SymbolId) -> &[SymbolId] {
        self.class_info(class)
            .map(|info| info.members.as_slice())
            .unwrap_or(&[])
    }

    /// First member of `class` called `name`.
    pub fn member(&self, class: SymbolId, name: &str) -> Option<SymbolId> {
        self.members(class)
            .iter()
            .copied()
            .find(|&m| self.name(m) == name)
    }

    /// Method of the class named `qualified` with the given name and arity.
    pub fn lookup_method(&self, qualified: &str, name: &str, arity: usize) -> Option<SymbolId> {
        let class = self.class_by_name(qualified)?;
        self.members(class).iter().copied().find(|&m| {
            let sym = self.get(m);
            sym.name == name
                && match &sym.ty {
                    Type::Method { params, .. } => params.len() == arity,
                    _ => false,
                }
        })
    }

    /// Constructor of the class named `qualified` with the given arity.
    pub fn lookup_constructor(&self, qualified: &str, arity: usize) -> Option<SymbolId> {
        self.lookup_method(qualified, "<init>", arity)
    }

    /// Qualified name of the class a member symbol belongs to.
    pub fn owner_class_name(&self, member: SymbolId) -> Option<&str> {
        let owner = self.owner(member)?;
        self.class_info(owner).map(|info| info.qualified.as_str())
    }

    /// Single abstract method of a functional interface type, with the
    /// interface's type parameters replaced by the type's arguments.
    pub fn sam(&self, ty: &Type) -> Option<SamSignature> {
        let class = self.class_by_name(ty.class_name()?)?;
        let info = self.class_info(class)?;
        if !info.functional {
            return None;
        }
        let method = info
            .members
            .iter()
            .copied()
            .find(|&m| self.get(m).modifiers.is_abstract)?;
        let args: Vec<Type> = ty.type_args().iter().map(Type::strip_wildcards).collect();
        let sig = if args.len() == info.type_params.len() {
            self.ty(method).subst(&info.type_params, &args)
        } else {
            // raw use of a generic interface
            self.ty(method).erasure()
        };
        match sig {
            Type::Method { params, ret } => Some(SamSignature {
                method,
                name: self.name(method).to_string(),
                params,
                ret: *ret,
            }),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Symbol> {
        self.symbols.iter()
    }
}
