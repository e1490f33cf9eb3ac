// SPDX-License-Identifier: (MIT OR Apache-2.0)

//! Behavior of rewritten code: each fixture is written against the wrapper
//! API, desugared, and evaluated. Expected values are what the wrapper
//! version returns or throws for the same inputs.

mod common;

use common::*;
use optless_ast::decl::CompilationUnit;
use optless_ast::expr::{BinOp, RefKind};
use optless_ast::prelude::{
    BOOLEAN, FUNCTION, ILLEGAL_STATE_EXCEPTION, INTEGER, INT_STREAM, NO_SUCH_ELEMENT_EXCEPTION,
    NO_VALUE_PRESENT, OPTIONAL, OPTIONAL_INT, RUNNABLE, STREAM, STRING, SUPPLIER,
};
use optless_ast::printer::print_unit;
use optless_ast::stmt::StmtKind;
use optless_ast::{Modifiers, PrimKind, SymbolId, SymbolTable, Type};
use optless_interp::{Outcome, Value};
use pretty_assertions::assert_eq;

fn string() -> Type {
    Type::string()
}

fn assert_unwrapped(unit: &CompilationUnit) {
    let left = wrapper_mentions(unit);
    assert!(left.is_empty(), "wrapper types left behind: {:?}", left);
}

// ── Presence and unwrapping ─────────────────────────────────────────────

#[test]
fn is_present_becomes_an_inline_null_check() {
    let mut f = Fixture::new("demo.Names");
    f.static_returning("has", &[("opt", optional(string()))], Type::boolean(), |f, m| {
        let opt = f.ident(m.param(0));
        f.call(opt, OPTIONAL, "isPresent", vec![], Type::boolean())
    });
    let (unit, symbols) = desugared(f);

    assert_eq!(
        print_unit(&unit),
        "public class Names {\n    public static boolean has(String opt) {\n        return opt != null;\n    }\n}\n"
    );
    assert_eq!(returned(&unit, &symbols, "Names", "has", vec![Value::Null]), Value::Bool(false));
    assert_eq!(
        returned(&unit, &symbols, "Names", "has", vec![Value::str("x")]),
        Value::Bool(true)
    );
}

#[test]
fn is_empty_is_the_negated_check() {
    let mut f = Fixture::new("demo.Names");
    f.static_returning("blank", &[("opt", optional(string()))], Type::boolean(), |f, m| {
        let opt = f.ident(m.param(0));
        f.call(opt, OPTIONAL, "isEmpty", vec![], Type::boolean())
    });
    let (unit, symbols) = desugared(f);
    assert_eq!(returned(&unit, &symbols, "Names", "blank", vec![Value::Null]), Value::Bool(true));
    assert_eq!(
        returned(&unit, &symbols, "Names", "blank", vec![Value::str("x")]),
        Value::Bool(false)
    );
}

fn first_unit() -> (CompilationUnit, SymbolTable) {
    let mut f = Fixture::new("demo.Names");
    f.static_returning("first", &[("opt", optional(string()))], string(), |f, m| {
        let opt = f.ident(m.param(0));
        f.call(opt, OPTIONAL, "get", vec![], string())
    });
    desugared(f)
}

#[test]
fn get_moves_into_a_guarded_root_method() {
    let (unit, _) = first_unit();
    let expected = [
        "public class Names {",
        "    public static String first(String opt) {",
        "        return get$0(opt);",
        "    }",
        "    private static String get$0(String value$1) {",
        "        if (value$1 == null) {",
        "            throw new NoSuchElementException(\"No value present\");",
        "        }",
        "        return value$1;",
        "    }",
        "}",
    ]
    .join("\n")
        + "\n";
    assert_eq!(print_unit(&unit), expected);
}

#[test]
fn get_on_absent_value_throws_no_such_element() {
    let (unit, symbols) = first_unit();

    let outcome = eval(&unit, &symbols, "Names", "first", vec![Value::Null]);
    assert_eq!(outcome.thrown_class().as_deref(), Some(NO_SUCH_ELEMENT_EXCEPTION));
    match outcome {
        Outcome::Threw(fault) => assert_eq!(fault.message().as_deref(), Some(NO_VALUE_PRESENT)),
        Outcome::Returned(value) => panic!("expected a throw, got {}", value),
    }
    assert_eq!(
        returned(&unit, &symbols, "Names", "first", vec![Value::str("x")]),
        Value::str("x")
    );
}

#[test]
fn or_else_throw_uses_the_supplied_exception() {
    let mut f = Fixture::new("demo.Names");
    f.static_returning("require", &[("opt", optional(string()))], string(), |f, m| {
        let opt = f.ident(m.param(0));
        let fault_ty = Type::class(ILLEGAL_STATE_EXCEPTION);
        let supplier_fn = f.lambda(m.sym, &[], supplier(fault_ty), |f, _| {
            let ctor = f
                .symbols
                .lookup_constructor(ILLEGAL_STATE_EXCEPTION, 1)
                .unwrap();
            let message = f.string("missing");
            f.make.new_instance(&f.symbols, ctor, vec![message])
        });
        f.call(opt, OPTIONAL, "orElseThrow", vec![supplier_fn], string())
    });
    let (unit, symbols) = desugared(f);
    assert_unwrapped(&unit);

    match eval(&unit, &symbols, "Names", "require", vec![Value::Null]) {
        Outcome::Threw(fault) => {
            assert_eq!(fault.class_name().as_deref(), Some(ILLEGAL_STATE_EXCEPTION));
            assert_eq!(fault.message().as_deref(), Some("missing"));
        }
        Outcome::Returned(value) => panic!("expected a throw, got {}", value),
    }
    assert_eq!(
        returned(&unit, &symbols, "Names", "require", vec![Value::str("ok")]),
        Value::str("ok")
    );
}

#[test]
fn or_else_throw_without_supplier_throws_no_such_element() {
    let mut f = Fixture::new("demo.Names");
    f.static_returning("require", &[("opt", optional(string()))], string(), |f, m| {
        let opt = f.ident(m.param(0));
        f.call(opt, OPTIONAL, "orElseThrow", vec![], string())
    });
    let (unit, symbols) = desugared(f);
    assert_unwrapped(&unit);

    match eval(&unit, &symbols, "Names", "require", vec![Value::Null]) {
        Outcome::Threw(fault) => {
            assert_eq!(fault.class_name().as_deref(), Some(NO_SUCH_ELEMENT_EXCEPTION));
            assert_eq!(fault.message().as_deref(), Some(NO_VALUE_PRESENT));
        }
        Outcome::Returned(value) => panic!("expected a throw, got {}", value),
    }
    assert_eq!(
        returned(&unit, &symbols, "Names", "require", vec![Value::str("ok")]),
        Value::str("ok")
    );
}

#[test]
fn or_else_get_calls_the_supplier_only_when_absent() {
    let mut f = Fixture::new("demo.Names");
    f.static_returning(
        "pick",
        &[("opt", optional(string())), ("fallback", string())],
        string(),
        |f, m| {
            let opt = f.ident(m.param(0));
            let fallback = m.param(1);
            let supply = f.lambda(m.sym, &[], supplier(string()), |f, _| {
                let fallback = f.ident(fallback);
                let tail = f.string("!");
                f.call(fallback, STRING, "concat", vec![tail], string())
            });
            f.call(opt, OPTIONAL, "orElseGet", vec![supply], string())
        },
    );
    let (unit, symbols) = desugared(f);
    assert_unwrapped(&unit);

    let pick = |opt: Value, fallback: Value| returned(&unit, &symbols, "Names", "pick", vec![opt, fallback]);
    assert_eq!(pick(Value::Null, Value::str("f")), Value::str("f!"));
    // the supplier is not called for a present value
    assert_eq!(pick(Value::str("x"), Value::Null), Value::str("x"));
}

// ── Mapping and filtering ───────────────────────────────────────────────

#[test]
fn map_with_method_reference_then_or_else() {
    let mut f = Fixture::new("demo.Names");
    f.static_returning("label", &[("raw", string())], string(), |f, m| {
        let raw = f.ident(m.param(0));
        let wrapped = f.static_call(OPTIONAL, "ofNullable", vec![raw], optional(string()));
        let qualifier = f.make.type_name(STRING);
        let trim = f.method_ref(qualifier, STRING, "trim", 0, RefKind::Unbound, function(string(), string()));
        let mapped = f.call(wrapped, OPTIONAL, "map", vec![trim], optional(string()));
        let blank = f.string("");
        f.call(mapped, OPTIONAL, "orElse", vec![blank], string())
    });
    let (unit, symbols) = desugared(f);
    assert_unwrapped(&unit);

    assert_eq!(returned(&unit, &symbols, "Names", "label", vec![Value::Null]), Value::str(""));
    assert_eq!(
        returned(&unit, &symbols, "Names", "label", vec![Value::str("  a ")]),
        Value::str("a")
    );
}

#[test]
fn filter_keeps_only_matching_values() {
    let mut f = Fixture::new("demo.Names");
    f.static_returning("nonBlank", &[("opt", optional(string()))], string(), |f, m| {
        let opt = f.ident(m.param(0));
        let test = f.lambda(m.sym, &["s"], predicate(string()), |f, p| {
            let s = f.ident(p[0]);
            let empty = f.call(s, STRING, "isEmpty", vec![], Type::boolean());
            f.make.not(empty)
        });
        let kept = f.call(opt, OPTIONAL, "filter", vec![test], optional(string()));
        let blank = f.string("blank");
        f.call(kept, OPTIONAL, "orElse", vec![blank], string())
    });
    let (unit, symbols) = desugared(f);
    assert_unwrapped(&unit);

    let run = |arg: Value| returned(&unit, &symbols, "Names", "nonBlank", vec![arg]);
    assert_eq!(run(Value::Null), Value::str("blank"));
    assert_eq!(run(Value::str("")), Value::str("blank"));
    assert_eq!(run(Value::str("x")), Value::str("x"));
}

#[test]
fn flat_map_flattens_the_returned_wrapper() {
    let mut f = Fixture::new("demo.Names");
    f.static_returning("shout", &[("opt", optional(string()))], string(), |f, m| {
        let opt = f.ident(m.param(0));
        let step = f.lambda(m.sym, &["s"], function(string(), optional(string())), |f, p| {
            let s = f.ident(p[0]);
            let empty = f.call(s, STRING, "isEmpty", vec![], Type::boolean());
            let none = f.static_call(OPTIONAL, "empty", vec![], optional(string()));
            let s = f.ident(p[0]);
            let upper = f.call(s, STRING, "toUpperCase", vec![], string());
            let some = f.static_call(OPTIONAL, "of", vec![upper], optional(string()));
            f.make.conditional(empty, none, some, optional(string()))
        });
        let flat = f.call(opt, OPTIONAL, "flatMap", vec![step], optional(string()));
        let none = f.string("none");
        f.call(flat, OPTIONAL, "orElse", vec![none], string())
    });
    let (unit, symbols) = desugared(f);
    assert_unwrapped(&unit);

    let run = |arg: Value| returned(&unit, &symbols, "Names", "shout", vec![arg]);
    assert_eq!(run(Value::Null), Value::str("none"));
    assert_eq!(run(Value::str("")), Value::str("none"));
    assert_eq!(run(Value::str("ab")), Value::str("AB"));
}

#[test]
fn functional_values_are_invoked_through_their_interface() {
    let integer = Type::class(INTEGER);
    let mut f = Fixture::new("demo.Names");
    let shell = f.declare("measure", &[("opt", optional(string()))], integer.clone(), Modifiers::public_static());
    let length = f.lambda(shell.sym, &["s"], function(string(), integer.clone()), |f, p| {
        let s = f.ident(p[0]);
        f.call(s, STRING, "length", vec![], Type::int())
    });
    let (len, def) = f.local(shell.sym, "len", function(string(), integer.clone()), Some(length));
    let opt = f.ident(shell.param(0));
    let len_ref = f.ident(len);
    let mapped = f.call(opt, OPTIONAL, "map", vec![len_ref], optional(integer.clone()));
    let missing = f.int(-1);
    let value = f.call(mapped, OPTIONAL, "orElse", vec![missing], integer);
    let ret = f.make.ret(Some(value));
    f.define(shell, vec![def, ret]);
    let (unit, symbols) = desugared(f);
    assert_unwrapped(&unit);

    assert_eq!(returned(&unit, &symbols, "Names", "measure", vec![Value::Null]), Value::Int(-1));
    assert_eq!(
        returned(&unit, &symbols, "Names", "measure", vec![Value::str("abc")]),
        Value::Int(3)
    );
}

#[test]
fn constructor_references_and_block_lambdas_are_lifted() {
    let fault = Type::class(ILLEGAL_STATE_EXCEPTION);
    let mut f = Fixture::new("demo.Names");
    let shell = f.declare(
        "wrap",
        &[("opt", optional(string())), ("suffix", string())],
        string(),
        Modifiers::public_static(),
    );
    let suffix = shell.param(1);
    let make_fault = f.constructor_ref(ILLEGAL_STATE_EXCEPTION, 1, function(string(), fault.clone()));
    let opt = f.ident(shell.param(0));
    let faults = f.call(opt, OPTIONAL, "map", vec![make_fault], optional(fault.clone()));
    let method = shell.sym;
    let describe = f.block_lambda(method, &["e"], function(fault, string()), |f, p| {
        let e = f.ident(p[0]);
        let message = f.call(e, ILLEGAL_STATE_EXCEPTION, "getMessage", vec![], string());
        let (t, def) = f.local(method, "t", string(), Some(message));
        let t = f.ident(t);
        let suffix = f.ident(suffix);
        let joined = f.call(t, STRING, "concat", vec![suffix], string());
        vec![def, f.make.ret(Some(joined))]
    });
    let described = f.call(faults, OPTIONAL, "map", vec![describe], optional(string()));
    let none = f.string("none");
    let value = f.call(described, OPTIONAL, "orElse", vec![none], string());
    let ret = f.make.ret(Some(value));
    f.define(shell, vec![ret]);
    let (unit, symbols) = desugared(f);
    assert_unwrapped(&unit);

    let class = unit.class("Names").unwrap();
    assert!(synthetic_methods(class).iter().any(|name| name.starts_with("reference$")));
    let lifted = class
        .methods()
        .find(|m| m.name.starts_with("lambda$"))
        .expect("lifted block lambda");
    let params: Vec<&str> = lifted.params.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(params, vec!["e", "suffix"]);
    let body = lifted.body.as_ref().unwrap();
    let StmtKind::VarDef(local) = &body[0].kind else {
        panic!("expected the local declaration first");
    };
    assert_eq!(symbols.owner(local.sym), Some(lifted.sym));

    let wrap = |opt: Value| returned(&unit, &symbols, "Names", "wrap", vec![opt, Value::str("!")]);
    assert_eq!(wrap(Value::Null), Value::str("none"));
    assert_eq!(wrap(Value::str("a")), Value::str("a!"));
}

#[test]
fn bound_and_static_references_are_lifted() {
    let mut f = Fixture::new("demo.Names");
    f.static_returning(
        "greet",
        &[("opt", optional(string())), ("prefix", string())],
        string(),
        |f, m| {
            let prefix = f.ident(m.param(1));
            let join = f.method_ref(prefix, STRING, "concat", 1, RefKind::Bound, function(string(), string()));
            let opt = f.ident(m.param(0));
            let joined = f.call(opt, OPTIONAL, "map", vec![join], optional(string()));
            let qualifier = f.make.type_name(STRING);
            let render = f.method_ref(qualifier, STRING, "valueOf", 1, RefKind::Static, function(string(), string()));
            let rendered = f.call(joined, OPTIONAL, "map", vec![render], optional(string()));
            let none = f.string("none");
            f.call(rendered, OPTIONAL, "orElse", vec![none], string())
        },
    );
    let (unit, symbols) = desugared(f);
    assert_unwrapped(&unit);

    let class = unit.class("Names").unwrap();
    let bound = class
        .methods()
        .filter(|m| m.name.starts_with("reference$"))
        .find(|m| m.params.len() == 2)
        .expect("bound reference takes its receiver as a parameter");
    assert!(bound.params[1].name.starts_with("receiver$"));

    let greet = |opt: Value| returned(&unit, &symbols, "Names", "greet", vec![opt, Value::str("hi ")]);
    assert_eq!(greet(Value::Null), Value::str("none"));
    assert_eq!(greet(Value::str("bo")), Value::str("hi bo"));
}

#[test]
fn lambdas_nested_in_field_initializers_capture_outer_parameters() {
    let mut f = Fixture::new("demo.Fields");
    let class = f.class_sym();
    // static Function<String, String> PAD = p -> Optional.ofNullable(p).map(x -> x.concat(p)).orElse("");
    let pad = f.lambda(class, &["p"], function(string(), string()), |f, outer| {
        let p = outer[0];
        let subject = f.ident(p);
        let wrapped = f.static_call(OPTIONAL, "ofNullable", vec![subject], optional(string()));
        let double = f.lambda(class, &["x"], function(string(), string()), |f, inner| {
            let x = f.ident(inner[0]);
            let p = f.ident(p);
            f.call(x, STRING, "concat", vec![p], string())
        });
        let mapped = f.call(wrapped, OPTIONAL, "map", vec![double], optional(string()));
        let blank = f.string("");
        f.call(mapped, OPTIONAL, "orElse", vec![blank], string())
    });
    let field = f.field("PAD", function(string(), string()), Some(pad), Modifiers::public_static());
    f.static_returning("run", &[("a", string())], string(), |f, m| {
        let target = f.ident(field);
        let a = f.ident(m.param(0));
        f.call(target, FUNCTION, "apply", vec![a], string())
    });
    let (unit, symbols) = desugared(f);
    assert_unwrapped(&unit);

    let lifted = unit
        .class("Fields")
        .unwrap()
        .methods()
        .find(|m| m.name.starts_with("lambda$"))
        .expect("lifted inner lambda");
    let params: Vec<&str> = lifted.params.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(params, vec!["x", "p"]);

    let run = |a: Value| returned(&unit, &symbols, "Fields", "run", vec![a]);
    assert_eq!(run(Value::Null), Value::str(""));
    assert_eq!(run(Value::str("ab")), Value::str("abab"));
}

// ── Alternatives, branches and streams ──────────────────────────────────

#[test]
fn or_falls_back_to_the_supplied_wrapper() {
    let mut f = Fixture::new("demo.Names");
    f.static_returning(
        "either",
        &[("a", optional(string())), ("b", string())],
        string(),
        |f, m| {
            let a = f.ident(m.param(0));
            let b_sym = m.param(1);
            let other = f.lambda(m.sym, &[], supplier(optional(string())), |f, _| {
                let b = f.ident(b_sym);
                f.static_call(OPTIONAL, "ofNullable", vec![b], optional(string()))
            });
            let alt = f.call(a, OPTIONAL, "or", vec![other], optional(string()));
            let neither = f.string("neither");
            f.call(alt, OPTIONAL, "orElse", vec![neither], string())
        },
    );
    let (unit, symbols) = desugared(f);
    assert_unwrapped(&unit);

    let run = |a: Value, b: Value| returned(&unit, &symbols, "Names", "either", vec![a, b]);
    assert_eq!(run(Value::Null, Value::Null), Value::str("neither"));
    assert_eq!(run(Value::Null, Value::str("b")), Value::str("b"));
    assert_eq!(run(Value::str("a"), Value::str("b")), Value::str("a"));
}

#[test]
fn if_present_or_else_runs_in_the_instance_context() {
    let mut f = Fixture::new("demo.Log");
    let init = f.string("");
    let last = f.field("last", string(), Some(init), Modifiers::private());
    let shell = f.declare(
        "describe",
        &[("opt", optional(string())), ("prefix", string())],
        string(),
        Modifiers::public(),
    );
    let prefix = shell.param(1);
    let on_present = f.lambda(shell.sym, &["v"], consumer(string()), |f, p| {
        let target = f.ident(last);
        let prefix = f.ident(prefix);
        let v = f.ident(p[0]);
        let joined = f.call(prefix, STRING, "concat", vec![v], string());
        f.assign(target, joined)
    });
    let on_absent = f.lambda(shell.sym, &[], Type::class(RUNNABLE), |f, _| {
        let target = f.ident(last);
        let none = f.string("none");
        f.assign(target, none)
    });
    let opt = f.ident(shell.param(0));
    let branch = f.call(opt, OPTIONAL, "ifPresentOrElse", vec![on_present, on_absent], Type::Void);
    let run = f.make.exec(branch);
    let result = f.ident(last);
    let ret = f.make.ret(Some(result));
    f.define(shell, vec![run, ret]);
    let (unit, symbols) = desugared(f);
    assert_unwrapped(&unit);

    let describe = |opt: Value| returned(&unit, &symbols, "Log", "describe", vec![opt, Value::str("p:")]);
    assert_eq!(describe(Value::Null), Value::str("none"));
    assert_eq!(describe(Value::str("x")), Value::str("p:x"));
}

#[test]
fn stream_has_zero_or_one_element() {
    let mut f = Fixture::new("demo.Names");
    let long = Type::Prim(PrimKind::Long);
    f.static_returning("count", &[("opt", optional(string()))], long.clone(), |f, m| {
        let opt = f.ident(m.param(0));
        let stream = f.call(opt, OPTIONAL, "stream", vec![], Type::generic(STREAM, vec![string()]));
        f.call(stream, STREAM, "count", vec![], long)
    });
    let (unit, symbols) = desugared(f);
    assert_unwrapped(&unit);

    assert_eq!(returned(&unit, &symbols, "Names", "count", vec![Value::Null]), Value::Long(0));
    assert_eq!(
        returned(&unit, &symbols, "Names", "count", vec![Value::str("x")]),
        Value::Long(1)
    );
}

#[test]
fn primitive_wrappers_stream_through_their_primitive_stream() {
    let optional_int = Type::class(OPTIONAL_INT);
    let int_stream = Type::class(INT_STREAM);
    let long = Type::Prim(PrimKind::Long);
    let mut f = Fixture::new("demo.Numbers");
    f.static_returning("none", &[], long.clone(), |f, _| {
        let empty = f.static_call(OPTIONAL_INT, "empty", vec![], optional_int.clone());
        let stream = f.call(empty, OPTIONAL_INT, "stream", vec![], int_stream.clone());
        f.call(stream, INT_STREAM, "count", vec![], long.clone())
    });
    f.static_returning("one", &[("n", Type::int())], long.clone(), |f, m| {
        let n = f.ident(m.param(0));
        let wrapped = f.static_call(OPTIONAL_INT, "of", vec![n], optional_int.clone());
        let stream = f.call(wrapped, OPTIONAL_INT, "stream", vec![], int_stream.clone());
        f.call(stream, INT_STREAM, "count", vec![], long.clone())
    });
    let (unit, symbols) = desugared(f);
    assert_unwrapped(&unit);

    let printed = print_unit(&unit);
    assert!(printed.contains("IntStream.of("), "{}", printed);
    assert!(!printed.contains("Stream.ofNullable"), "{}", printed);
    assert_eq!(returned(&unit, &symbols, "Numbers", "none", vec![]), Value::Long(0));
    assert_eq!(returned(&unit, &symbols, "Numbers", "one", vec![Value::Int(3)]), Value::Long(1));
}

// ── Primitive specializations and references ────────────────────────────

#[test]
fn primitive_wrappers_unwrap_to_their_primitive() {
    let optional_int = Type::class(OPTIONAL_INT);
    let mut f = Fixture::new("demo.Numbers");
    f.static_returning("seven", &[], Type::int(), |f, _| {
        let empty = f.static_call(OPTIONAL_INT, "empty", vec![], optional_int.clone());
        let seven = f.int(7);
        f.call(empty, OPTIONAL_INT, "orElse", vec![seven], Type::int())
    });
    f.static_returning("echo", &[("n", Type::int())], Type::int(), |f, m| {
        let n = f.ident(m.param(0));
        let wrapped = f.static_call(OPTIONAL_INT, "of", vec![n], optional_int.clone());
        f.call(wrapped, OPTIONAL_INT, "getAsInt", vec![], Type::int())
    });
    let (unit, symbols) = desugared(f);
    assert_unwrapped(&unit);

    assert_eq!(returned(&unit, &symbols, "Numbers", "seven", vec![]), Value::Int(7));
    assert_eq!(
        returned(&unit, &symbols, "Numbers", "echo", vec![Value::Int(5)]),
        Value::Int(5)
    );
}

#[test]
fn references_to_wrapper_members_become_synthetic_references() {
    let boolean = Type::class(BOOLEAN);
    let probe_ty = function(optional(string()), boolean.clone());
    let mut f = Fixture::new("demo.Names");
    let shell = f.declare("probe", &[("opt", optional(string()))], boolean.clone(), Modifiers::public_static());
    let qualifier = f.make.type_name(OPTIONAL);
    let present = f.method_ref(qualifier, OPTIONAL, "isPresent", 0, RefKind::Unbound, probe_ty.clone());
    let (local, def) = f.local(shell.sym, "present", probe_ty, Some(present));
    let target = f.ident(local);
    let opt = f.ident(shell.param(0));
    let applied = f.call(target, FUNCTION, "apply", vec![opt], boolean);
    let ret = f.make.ret(Some(applied));
    f.define(shell, vec![def, ret]);
    let (unit, symbols) = desugared(f);
    assert_unwrapped(&unit);

    let class = unit.class("Names").unwrap();
    assert!(synthetic_methods(class).iter().any(|name| name.starts_with("ref$")));
    assert_eq!(returned(&unit, &symbols, "Names", "probe", vec![Value::Null]), Value::Bool(false));
    assert_eq!(
        returned(&unit, &symbols, "Names", "probe", vec![Value::str("x")]),
        Value::Bool(true)
    );
}

// ── Evaluation order and placement ──────────────────────────────────────

/// `static int ticks = 0;` and `static Optional<String> tick(String s)`,
/// which bumps `ticks` and wraps `s`.
fn counter_fixture() -> (Fixture, SymbolId, SymbolId) {
    let mut f = Fixture::new("demo.Counter");
    let zero = f.int(0);
    let ticks = f.field("ticks", Type::int(), Some(zero), Modifiers::public_static());

    let tick = f.declare("tick", &[("s", string())], optional(string()), Modifiers::public_static());
    let target = f.ident(ticks);
    let current = f.ident(ticks);
    let one = f.int(1);
    let bumped = f.make.binary(BinOp::Add, current, one);
    let bump = f.assign(target, bumped);
    let bump = f.make.exec(bump);
    let s = f.ident(tick.param(0));
    let wrapped = f.static_call(OPTIONAL, "ofNullable", vec![s], optional(string()));
    let ret = f.make.ret(Some(wrapped));
    let tick_sym = tick.sym;
    f.define(tick, vec![bump, ret]);
    (f, ticks, tick_sym)
}

#[test]
fn receiver_is_evaluated_once() {
    let (mut f, ticks, tick_sym) = counter_fixture();

    let once = f.declare("once", &[("s", string())], Type::int(), Modifiers::public_static());
    let s = f.ident(once.param(0));
    let produced = f.call_own(tick_sym, vec![s]);
    let test = f.lambda(once.sym, &["v"], predicate(string()), |f, p| {
        let v = f.ident(p[0]);
        let empty = f.call(v, STRING, "isEmpty", vec![], Type::boolean());
        f.make.not(empty)
    });
    let kept = f.call(produced, OPTIONAL, "filter", vec![test], optional(string()));
    let blank = f.string("");
    let value = f.call(kept, OPTIONAL, "orElse", vec![blank], string());
    let discard = f.make.exec(value);
    let count = f.ident(ticks);
    let ret = f.make.ret(Some(count));
    f.define(once, vec![discard, ret]);
    let (unit, symbols) = desugared(f);
    assert_unwrapped(&unit);

    assert_eq!(returned(&unit, &symbols, "Counter", "once", vec![Value::Null]), Value::Int(1));
    assert_eq!(
        returned(&unit, &symbols, "Counter", "once", vec![Value::str("a")]),
        Value::Int(1)
    );
}

/// `Supplier<Boolean> check = tick(s)::isPresent;` then `check.get()`
/// twice. Returns `ticks` when `count` is set, the second result otherwise.
fn sampler(f: &mut Fixture, ticks: SymbolId, tick: SymbolId, name: &str, count: bool) {
    let boolean = Type::class(BOOLEAN);
    let check_ty = supplier(boolean.clone());
    let ret_ty = if count { Type::int() } else { boolean.clone() };
    let shell = f.declare(name, &[("s", string())], ret_ty, Modifiers::public_static());
    let s = f.ident(shell.param(0));
    let produced = f.call_own(tick, vec![s]);
    let reference = f.method_ref(produced, OPTIONAL, "isPresent", 0, RefKind::Bound, check_ty.clone());
    let (check, def) = f.local(shell.sym, "check", check_ty, Some(reference));
    let target = f.ident(check);
    let first = f.call(target, SUPPLIER, "get", vec![], boolean.clone());
    let first = f.make.exec(first);
    let target = f.ident(check);
    let second = f.call(target, SUPPLIER, "get", vec![], boolean);
    let body = if count {
        let second = f.make.exec(second);
        let ticks = f.ident(ticks);
        vec![def, first, second, f.make.ret(Some(ticks))]
    } else {
        vec![def, first, f.make.ret(Some(second))]
    };
    f.define(shell, body);
}

#[test]
fn bound_wrapper_references_evaluate_their_qualifier_once() {
    let (mut f, ticks, tick_sym) = counter_fixture();
    sampler(&mut f, ticks, tick_sym, "twice", true);
    sampler(&mut f, ticks, tick_sym, "present", false);
    let (unit, symbols) = desugared(f);
    assert_unwrapped(&unit);

    let class = unit.class("Counter").unwrap();
    assert!(synthetic_methods(class).iter().any(|name| name.starts_with("bind$")));
    assert_eq!(returned(&unit, &symbols, "Counter", "twice", vec![Value::str("a")]), Value::Int(1));
    assert_eq!(
        returned(&unit, &symbols, "Counter", "present", vec![Value::Null]),
        Value::Bool(false)
    );
    assert_eq!(
        returned(&unit, &symbols, "Counter", "present", vec![Value::str("a")]),
        Value::Bool(true)
    );
}

#[test]
fn static_field_initializers_are_rewritten() {
    let mut f = Fixture::new("demo.Defaults");
    let empty = f.static_call(OPTIONAL, "empty", vec![], optional(string()));
    let d = f.string("d");
    let init = f.call(empty, OPTIONAL, "orElse", vec![d], string());
    let fallback = f.field("fallback", string(), Some(init), Modifiers::public_static());
    f.static_returning("read", &[], string(), |f, _| f.ident(fallback));
    let (unit, symbols) = desugared(f);
    assert_unwrapped(&unit);

    let class = unit.class("Defaults").unwrap();
    let root = class
        .methods()
        .find(|m| m.name.starts_with("orElse$"))
        .expect("root method for the field initializer");
    assert!(root.modifiers.is_static);
    assert_eq!(returned(&unit, &symbols, "Defaults", "read", vec![]), Value::str("d"));
}

#[test]
fn nested_classes_receive_their_own_synthetic_methods() {
    let mut f = Fixture::new("demo.Outer");
    f.static_returning("has", &[("opt", optional(string()))], string(), |f, m| {
        let opt = f.ident(m.param(0));
        let fallback = f.string("-");
        f.call(opt, OPTIONAL, "orElse", vec![fallback], string())
    });
    f.nest("Inner");
    f.static_returning("first", &[("opt", optional(string()))], string(), |f, m| {
        let opt = f.ident(m.param(0));
        f.call(opt, OPTIONAL, "get", vec![], string())
    });
    f.unnest();
    let (unit, symbols) = desugared(f);
    assert_unwrapped(&unit);

    let outer = unit.class("Outer").unwrap();
    let inner = unit.class("Inner").unwrap();
    let outer_synthetic = synthetic_methods(outer);
    let inner_synthetic = synthetic_methods(inner);
    assert_eq!(outer_synthetic.len(), 1);
    assert!(outer_synthetic[0].starts_with("orElse$"));
    assert_eq!(inner_synthetic.len(), 1);
    assert!(inner_synthetic[0].starts_with("get$"));

    assert_eq!(returned(&unit, &symbols, "Outer", "has", vec![Value::Null]), Value::str("-"));
    assert_eq!(
        returned(&unit, &symbols, "Inner", "first", vec![Value::str("z")]),
        Value::str("z")
    );
}
