// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Library classes the front end resolves against.
//!
//! Only the members the pass generates calls to, or that commonly appear
//! on wrapper receivers, are declared.

use crate::{Modifiers, SymbolId, SymbolTable, Type};

pub use crate::ty::{OBJECT, STRING};
pub const INTEGER: &str = "java.lang.Integer";
pub const LONG: &str = "java.lang.Long";
pub const DOUBLE: &str = "java.lang.Double";
pub const BOOLEAN: &str = "java.lang.Boolean";
pub const RUNTIME_EXCEPTION: &str = "java.lang.RuntimeException";
pub const ILLEGAL_STATE_EXCEPTION: &str = "java.lang.IllegalStateException";
pub const NO_SUCH_ELEMENT_EXCEPTION: &str = "java.util.NoSuchElementException";
pub const OBJECTS: &str = "java.util.Objects";
pub const STREAM: &str = "java.util.stream.Stream";
pub const INT_STREAM: &str = "java.util.stream.IntStream";
pub const LONG_STREAM: &str = "java.util.stream.LongStream";
pub const DOUBLE_STREAM: &str = "java.util.stream.DoubleStream";
pub const OPTIONAL: &str = "java.util.Optional";
pub const OPTIONAL_INT: &str = "java.util.OptionalInt";
pub const OPTIONAL_LONG: &str = "java.util.OptionalLong";
pub const OPTIONAL_DOUBLE: &str = "java.util.OptionalDouble";
pub const FUNCTION: &str = "java.util.function.Function";
pub const SUPPLIER: &str = "java.util.function.Supplier";
pub const PREDICATE: &str = "java.util.function.Predicate";
pub const CONSUMER: &str = "java.util.function.Consumer";
pub const INT_FUNCTION: &str = "java.util.function.IntFunction";
pub const RUNNABLE: &str = "java.lang.Runnable";

/// Message of the fault raised when an absent value is unwrapped.
pub const NO_VALUE_PRESENT: &str = "No value present";

fn t() -> Type {
    Type::var("T")
}

fn extends(ty: Type) -> Type {
    Type::wildcard_extends(ty)
}

fn optional(arg: Type) -> Type {
    Type::generic(OPTIONAL, vec![arg])
}

fn method(symbols: &mut SymbolTable, class: SymbolId, name: &str, params: Vec<Type>, ret: Type) -> SymbolId {
    symbols.declare_method(class, name, params, ret, Modifiers::public())
}

fn static_method(symbols: &mut SymbolTable, class: SymbolId, name: &str, params: Vec<Type>, ret: Type) -> SymbolId {
    symbols.declare_method(class, name, params, ret, Modifiers::public_static())
}

fn functional(symbols: &mut SymbolTable, qualified: &str, type_params: &[&str], sam: &str, params: Vec<Type>, ret: Type) {
    let class = symbols.declare_class(qualified, type_params, None);
    symbols.declare_method(class, sam, params, ret, Modifiers::abstract_());
    symbols.set_functional(class);
}

fn exception(symbols: &mut SymbolTable, qualified: &str) {
    let class = symbols.declare_class(qualified, &[], None);
    symbols.declare_constructor(class, vec![]);
    symbols.declare_constructor(class, vec![Type::string()]);
    method(symbols, class, "getMessage", vec![], Type::string());
}

/// Declare the library surface into `symbols`.
pub fn install(symbols: &mut SymbolTable) {
    let object = symbols.declare_class(OBJECT, &[], None);
    method(symbols, object, "equals", vec![Type::object()], Type::boolean());
    method(symbols, object, "hashCode", vec![], Type::int());
    method(symbols, object, "toString", vec![], Type::string());

    let string = symbols.declare_class(STRING, &[], None);
    method(symbols, string, "trim", vec![], Type::string());
    method(symbols, string, "length", vec![], Type::int());
    method(symbols, string, "isEmpty", vec![], Type::boolean());
    method(symbols, string, "toUpperCase", vec![], Type::string());
    method(symbols, string, "concat", vec![Type::string()], Type::string());
    static_method(symbols, string, "valueOf", vec![Type::object()], Type::string());

    let integer = symbols.declare_class(INTEGER, &[], None);
    static_method(symbols, integer, "valueOf", vec![Type::int()], Type::class(INTEGER));
    method(symbols, integer, "intValue", vec![], Type::int());
    for boxed in [LONG, DOUBLE, BOOLEAN] {
        symbols.declare_class(boxed, &[], None);
    }

    for qualified in [RUNTIME_EXCEPTION, ILLEGAL_STATE_EXCEPTION, NO_SUCH_ELEMENT_EXCEPTION] {
        exception(symbols, qualified);
    }

    let objects = symbols.declare_class(OBJECTS, &[], None);
    static_method(symbols, objects, "requireNonNull", vec![t()], t());
    static_method(symbols, objects, "isNull", vec![Type::object()], Type::boolean());
    static_method(symbols, objects, "nonNull", vec![Type::object()], Type::boolean());

    let stream = symbols.declare_class(STREAM, &["T"], None);
    static_method(symbols, stream, "ofNullable", vec![t()], Type::generic(STREAM, vec![t()]));
    method(symbols, stream, "count", vec![], Type::Prim(crate::PrimKind::Long));
    for (qualified, prim) in [
        (INT_STREAM, Type::int()),
        (LONG_STREAM, Type::Prim(crate::PrimKind::Long)),
        (DOUBLE_STREAM, Type::Prim(crate::PrimKind::Double)),
    ] {
        let class = symbols.declare_class(qualified, &[], None);
        static_method(symbols, class, "of", vec![prim], Type::class(qualified));
        static_method(symbols, class, "empty", vec![], Type::class(qualified));
        method(symbols, class, "count", vec![], Type::Prim(crate::PrimKind::Long));
    }

    functional(symbols, FUNCTION, &["T", "R"], "apply", vec![t()], Type::var("R"));
    functional(symbols, SUPPLIER, &["T"], "get", vec![], t());
    functional(symbols, PREDICATE, &["T"], "test", vec![t()], Type::boolean());
    functional(symbols, CONSUMER, &["T"], "accept", vec![t()], Type::Void);
    functional(symbols, INT_FUNCTION, &["R"], "apply", vec![Type::int()], Type::var("R"));
    functional(symbols, RUNNABLE, &[], "run", vec![], Type::Void);

    install_optional(symbols);
    install_primitive_optional(symbols, OPTIONAL_INT, Type::int(), "getAsInt", INT_STREAM);
    install_primitive_optional(
        symbols,
        OPTIONAL_LONG,
        Type::Prim(crate::PrimKind::Long),
        "getAsLong",
        LONG_STREAM,
    );
    install_primitive_optional(
        symbols,
        OPTIONAL_DOUBLE,
        Type::Prim(crate::PrimKind::Double),
        "getAsDouble",
        DOUBLE_STREAM,
    );
}

fn install_optional(symbols: &mut SymbolTable) {
    let u = Type::var("U");
    let opt = symbols.declare_class(OPTIONAL, &["T"], None);
    let self_ty = optional(t());

    static_method(symbols, opt, "of", vec![t()], self_ty.clone());
    static_method(symbols, opt, "ofNullable", vec![t()], self_ty.clone());
    static_method(symbols, opt, "empty", vec![], self_ty.clone());

    method(symbols, opt, "isPresent", vec![], Type::boolean());
    method(symbols, opt, "isEmpty", vec![], Type::boolean());
    method(symbols, opt, "get", vec![], t());
    method(symbols, opt, "orElseThrow", vec![], t());
    method(
        symbols,
        opt,
        "orElseThrow",
        vec![Type::generic(SUPPLIER, vec![extends(Type::var("X"))])],
        t(),
    );
    method(symbols, opt, "orElse", vec![t()], t());
    method(symbols, opt, "orElseGet", vec![Type::generic(SUPPLIER, vec![extends(t())])], t());
    method(
        symbols,
        opt,
        "map",
        vec![Type::generic(FUNCTION, vec![t(), extends(u.clone())])],
        optional(u.clone()),
    );
    method(
        symbols,
        opt,
        "flatMap",
        vec![Type::generic(FUNCTION, vec![t(), extends(optional(extends(u.clone())))])],
        optional(u),
    );
    method(symbols, opt, "filter", vec![Type::generic(PREDICATE, vec![t()])], self_ty.clone());
    method(
        symbols,
        opt,
        "or",
        vec![Type::generic(SUPPLIER, vec![extends(optional(extends(t())))])],
        self_ty,
    );
    method(symbols, opt, "ifPresent", vec![Type::generic(CONSUMER, vec![t()])], Type::Void);
    method(
        symbols,
        opt,
        "ifPresentOrElse",
        vec![Type::generic(CONSUMER, vec![t()]), Type::class(RUNNABLE)],
        Type::Void,
    );
    method(symbols, opt, "stream", vec![], Type::generic(STREAM, vec![t()]));
    method(symbols, opt, "equals", vec![Type::object()], Type::boolean());
    method(symbols, opt, "hashCode", vec![], Type::int());
    method(symbols, opt, "toString", vec![], Type::string());
}

fn install_primitive_optional(symbols: &mut SymbolTable, qualified: &str, prim: Type, getter: &str, stream: &str) {
    let class = symbols.declare_class(qualified, &[], None);
    let self_ty = Type::class(qualified);
    static_method(symbols, class, "of", vec![prim.clone()], self_ty.clone());
    static_method(symbols, class, "empty", vec![], self_ty);
    method(symbols, class, "isPresent", vec![], Type::boolean());
    method(symbols, class, "isEmpty", vec![], Type::boolean());
    method(symbols, class, getter, vec![], prim.clone());
    method(symbols, class, "orElseThrow", vec![], prim.clone());
    method(symbols, class, "orElse", vec![prim.clone()], prim);
    method(symbols, class, "stream", vec![], Type::class(stream));
}
