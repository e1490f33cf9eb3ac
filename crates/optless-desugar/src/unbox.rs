// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Type unboxer: the element type behind wrapper types.

use optless_ast::prelude::{DOUBLE, INTEGER, LONG, OPTIONAL};
use optless_ast::{SymbolTable, Type};

/// Members of the wrapper family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WrapperKind {
    /// `Optional<T>`
    Generic,
    Int,
    Long,
    Double,
}

impl WrapperKind {
    /// Recognition is by qualified-name prefix, so `OptionalInt` and
    /// friends belong to the family.
    pub fn of(ty: &Type) -> Option<WrapperKind> {
        let name = ty.class_name()?;
        let suffix = name.strip_prefix(OPTIONAL)?;
        Some(match suffix {
            "Int" => WrapperKind::Int,
            "Long" => WrapperKind::Long,
            "Double" => WrapperKind::Double,
            _ => WrapperKind::Generic,
        })
    }

    /// Element type of the primitive specializations, boxed so an absent
    /// value can still be `null`.
    pub fn intrinsic(self) -> Option<Type> {
        match self {
            WrapperKind::Generic => None,
            WrapperKind::Int => Some(Type::class(INTEGER)),
            WrapperKind::Long => Some(Type::class(LONG)),
            WrapperKind::Double => Some(Type::class(DOUBLE)),
        }
    }
}

pub fn is_wrapper(ty: &Type) -> bool {
    WrapperKind::of(ty).is_some()
}

/// True if a wrapper type occurs anywhere in `ty`.
pub fn mentions_wrapper(ty: &Type) -> bool {
    ty.any(&|t| is_wrapper(t))
}

/// True for `Optional` used without a type argument.
pub fn is_raw_wrapper(ty: &Type) -> bool {
    matches!(WrapperKind::of(ty), Some(WrapperKind::Generic)) && ty.type_args().is_empty()
}

/// Element type hidden behind `ty`.
///
/// Wildcards are stripped first. Layers of the wrapper are removed until a
/// non-wrapper type is reached; a functional interface whose single
/// abstract method returns a wrapper is unwrapped through that return
/// type. A raw `Optional` is returned erased, for the caller to infer.
pub fn unwrap(symbols: &SymbolTable, ty: &Type) -> Type {
    let ty = ty.strip_wildcards();
    match WrapperKind::of(&ty) {
        Some(kind) => {
            if let Some(intrinsic) = kind.intrinsic() {
                return intrinsic;
            }
            match ty.type_args().first() {
                Some(arg) => unwrap(symbols, arg),
                None => ty.erasure(),
            }
        }
        None => match symbols.sam(&ty) {
            Some(sam) if is_wrapper(&sam.ret) => unwrap(symbols, &sam.ret),
            _ => ty,
        },
    }
}

/// Replace every wrapper nested in `ty` by its boxed element type, leaving
/// the surrounding type intact (`Function<String, Optional<Integer>>`
/// becomes `Function<String, Integer>`).
pub fn retype(symbols: &SymbolTable, ty: &Type) -> Type {
    if is_wrapper(ty) {
        return retype(symbols, &unwrap(symbols, ty)).boxed();
    }
    match ty {
        Type::Class { name, args } => Type::Class {
            name: name.clone(),
            args: args.iter().map(|a| retype(symbols, a)).collect(),
        },
        Type::Wildcard(Some(bound)) => Type::wildcard_extends(retype(symbols, bound)),
        Type::Method { params, ret } => Type::method(
            params.iter().map(|p| retype(symbols, p)).collect(),
            retype(symbols, ret),
        ),
        other => other.clone(),
    }
}

/// Type of a parameter of a generated method: wrappers removed, type
/// variables erased to `Object`.
pub fn erase_unboxed(symbols: &SymbolTable, ty: &Type) -> Type {
    erase_vars(&retype(symbols, &ty.strip_wildcards()))
}

fn erase_vars(ty: &Type) -> Type {
    match ty {
        Type::Var(_) => Type::object(),
        Type::Class { name, args } => Type::Class {
            name: name.clone(),
            args: args.iter().map(erase_vars).collect(),
        },
        Type::Method { params, ret } => {
            Type::method(params.iter().map(erase_vars).collect(), erase_vars(ret))
        }
        other => other.clone(),
    }
}
