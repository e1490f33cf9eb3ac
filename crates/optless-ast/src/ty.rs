// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Resolved types as the front end attributes them.

use std::fmt;

pub const OBJECT: &str = "java.lang.Object";
pub const STRING: &str = "java.lang.String";

/// Primitive value types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimKind {
    Boolean,
    Int,
    Long,
    Double,
    Char,
}

impl PrimKind {
    pub fn name(self) -> &'static str {
        match self {
            PrimKind::Boolean => "boolean",
            PrimKind::Int => "int",
            PrimKind::Long => "long",
            PrimKind::Double => "double",
            PrimKind::Char => "char",
        }
    }

    /// Qualified name of the reference type a value of this kind boxes to.
    pub fn boxed_name(self) -> &'static str {
        match self {
            PrimKind::Boolean => "java.lang.Boolean",
            PrimKind::Int => "java.lang.Integer",
            PrimKind::Long => "java.lang.Long",
            PrimKind::Double => "java.lang.Double",
            PrimKind::Char => "java.lang.Character",
        }
    }
}

/// A resolved type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type {
    /// Return type of methods that produce nothing
    Void,
    /// Primitive value type
    Prim(PrimKind),
    /// Type of the `null` literal
    Null,
    /// Class or interface type with its type arguments
    Class { name: String, args: Vec<Type> },
    /// Wildcard type argument (`?` or `? extends Bound`)
    Wildcard(Option<Box<Type>>),
    /// Type variable
    Var(String),
    /// Method type
    Method { params: Vec<Type>, ret: Box<Type> },
}

impl Type {
    pub fn class(name: &str) -> Type {
        Type::Class {
            name: name.to_string(),
            args: Vec::new(),
        }
    }

    pub fn generic(name: &str, args: Vec<Type>) -> Type {
        Type::Class {
            name: name.to_string(),
            args,
        }
    }

    pub fn object() -> Type {
        Type::class(OBJECT)
    }

    pub fn string() -> Type {
        Type::class(STRING)
    }

    pub fn boolean() -> Type {
        Type::Prim(PrimKind::Boolean)
    }

    pub fn int() -> Type {
        Type::Prim(PrimKind::Int)
    }

    pub fn var(name: &str) -> Type {
        Type::Var(name.to_string())
    }

    pub fn method(params: Vec<Type>, ret: Type) -> Type {
        Type::Method {
            params,
            ret: Box::new(ret),
        }
    }

    pub fn wildcard_extends(bound: Type) -> Type {
        Type::Wildcard(Some(Box::new(bound)))
    }

    /// Qualified class name, if this is a class type.
    pub fn class_name(&self) -> Option<&str> {
        match self {
            Type::Class { name, .. } => Some(name),
            _ => None,
        }
    }

    pub fn type_args(&self) -> &[Type] {
        match self {
            Type::Class { args, .. } => args,
            _ => &[],
        }
    }

    pub fn is_void(&self) -> bool {
        matches!(self, Type::Void)
    }

    pub fn is_primitive(&self) -> bool {
        matches!(self, Type::Prim(_))
    }

    /// The return type of a method type; any other type is its own result.
    pub fn return_type(&self) -> &Type {
        match self {
            Type::Method { ret, .. } => ret,
            other => other,
        }
    }

    /// Replace wildcards by their bound (or `Object` when unbounded), at
    /// every depth.
    pub fn strip_wildcards(&self) -> Type {
        match self {
            Type::Wildcard(Some(bound)) => bound.strip_wildcards(),
            Type::Wildcard(None) => Type::object(),
            Type::Class { name, args } => Type::Class {
                name: name.clone(),
                args: args.iter().map(Type::strip_wildcards).collect(),
            },
            Type::Method { params, ret } => Type::Method {
                params: params.iter().map(Type::strip_wildcards).collect(),
                ret: Box::new(ret.strip_wildcards()),
            },
            other => other.clone(),
        }
    }

    /// Type erasure: drop type arguments, replace variables by `Object`.
    pub fn erasure(&self) -> Type {
        match self {
            Type::Class { name, .. } => Type::class(name),
            Type::Var(_) | Type::Wildcard(None) => Type::object(),
            Type::Wildcard(Some(bound)) => bound.erasure(),
            Type::Method { params, ret } => Type::Method {
                params: params.iter().map(Type::erasure).collect(),
                ret: Box::new(ret.erasure()),
            },
            other => other.clone(),
        }
    }

    /// Reference form of a primitive; reference types are returned as is.
    pub fn boxed(&self) -> Type {
        match self {
            Type::Prim(kind) => Type::class(kind.boxed_name()),
            other => other.clone(),
        }
    }

    /// Substitute type variables named in `params` with the matching `args`.
    pub fn subst(&self, params: &[String], args: &[Type]) -> Type {
        match self {
            Type::Var(name) => params
                .iter()
                .position(|p| p == name)
                .and_then(|i| args.get(i))
                .cloned()
                .unwrap_or_else(|| self.clone()),
            Type::Class { name, args: inner } => Type::Class {
                name: name.clone(),
                args: inner.iter().map(|t| t.subst(params, args)).collect(),
            },
            Type::Wildcard(bound) => {
                Type::Wildcard(bound.as_ref().map(|b| Box::new(b.subst(params, args))))
            }
            Type::Method { params: ps, ret } => Type::Method {
                params: ps.iter().map(|t| t.subst(params, args)).collect(),
                ret: Box::new(ret.subst(params, args)),
            },
            other => other.clone(),
        }
    }

    /// True if `pred` holds for this type or any type nested in it.
    pub fn any(&self, pred: &dyn Fn(&Type) -> bool) -> bool {
        if pred(self) {
            return true;
        }
        match self {
            Type::Class { args, .. } => args.iter().any(|t| t.any(pred)),
            Type::Wildcard(Some(bound)) => bound.any(pred),
            Type::Method { params, ret } => params.iter().any(|t| t.any(pred)) || ret.any(pred),
            _ => false,
        }
    }
}

/// Last segment of a qualified name.
pub fn simple_name(qualified: &str) -> &str {
    qualified.rsplit('.').next().unwrap_or(qualified)
}

fn write_list(f: &mut fmt::Formatter<'_>, types: &[Type]) -> fmt::Result {
    for (i, ty) in types.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", ty)?;
    }
    Ok(())
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Void => write!(f, "void"),
            Type::Prim(kind) => write!(f, "{}", kind.name()),
            Type::Null => write!(f, "null"),
            Type::Class { name, args } => {
                write!(f, "{}", simple_name(name))?;
                if !args.is_empty() {
                    write!(f, "<")?;
                    write_list(f, args)?;
                    write!(f, ">")?;
                }
                Ok(())
            }
            Type::Wildcard(None) => write!(f, "?"),
            Type::Wildcard(Some(bound)) => write!(f, "? extends {}", bound),
            Type::Var(name) => write!(f, "{}", name),
            Type::Method { params, ret } => {
                write!(f, "(")?;
                write_list(f, params)?;
                write!(f, ") -> {}", ret)
            }
        }
    }
}
