// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Runtime values.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;
use optless_ast::expr::{Lambda, RefKind};
use optless_ast::SymbolId;

use crate::env::Bindings;

/// An object on the heap: an instance of a user class or an exception.
#[derive(Debug)]
pub struct Object {
    /// Qualified class name.
    pub class: String,
    pub fields: IndexMap<String, Value>,
    /// Exception message, if constructed with one.
    pub message: Option<String>,
}

/// A lambda or method reference evaluated to a value.
#[derive(Debug)]
pub enum Closure {
    Lambda {
        lambda: Lambda,
        captured: Bindings,
        this: Option<Value>,
    },
    Reference {
        target: SymbolId,
        kind: RefKind,
        /// Receiver of a bound reference, or `this` for references to
        /// instance members of the enclosing class.
        receiver: Option<Value>,
    },
}

/// A runtime value in the interpreter.
#[derive(Debug, Clone)]
pub enum Value {
    /// Result of a void method
    Void,
    Null,
    Bool(bool),
    Int(i32),
    Long(i64),
    Double(f64),
    Char(char),
    Str(Rc<str>),
    Object(Rc<RefCell<Object>>),
    /// Zero or more values produced by a stream factory
    Stream(Rc<Vec<Value>>),
    Closure(Rc<Closure>),
}

impl Value {
    pub fn str(s: &str) -> Value {
        Value::Str(Rc::from(s))
    }

    pub fn object(class: &str, message: Option<String>) -> Value {
        Value::Object(Rc::new(RefCell::new(Object {
            class: class.to_string(),
            fields: IndexMap::new(),
            message,
        })))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Qualified class name of an object value.
    pub fn class_name(&self) -> Option<String> {
        match self {
            Value::Object(obj) => Some(obj.borrow().class.clone()),
            _ => None,
        }
    }

    /// Message of an exception value.
    pub fn message(&self) -> Option<String> {
        match self {
            Value::Object(obj) => obj.borrow().message.clone(),
            _ => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Void => "void",
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Int(_) => "int",
            Value::Long(_) => "long",
            Value::Double(_) => "double",
            Value::Char(_) => "char",
            Value::Str(_) => "String",
            Value::Object(_) => "object",
            Value::Stream(_) => "Stream",
            Value::Closure(_) => "function",
        }
    }

    /// `==` as the evaluated language defines it: primitives and strings
    /// by value, everything else by identity.
    pub fn same(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) | (Value::Void, Value::Void) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Long(a), Value::Long(b)) => a == b,
            (Value::Double(a), Value::Double(b)) => a == b,
            (Value::Int(a), Value::Long(b)) | (Value::Long(b), Value::Int(a)) => i64::from(*a) == *b,
            (Value::Char(a), Value::Char(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => Rc::ptr_eq(a, b),
            (Value::Stream(a), Value::Stream(b)) => Rc::ptr_eq(a, b),
            (Value::Closure(a), Value::Closure(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.same(other)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Void => write!(f, "()"),
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Long(l) => write!(f, "{}", l),
            Value::Double(d) => write!(f, "{:?}", d),
            Value::Char(c) => write!(f, "{}", c),
            Value::Str(s) => write!(f, "{}", s),
            Value::Object(obj) => {
                let obj = obj.borrow();
                match &obj.message {
                    Some(msg) => write!(f, "{}: {}", obj.class, msg),
                    None => write!(f, "{}", obj.class),
                }
            }
            Value::Stream(items) => write!(f, "Stream[{}]", items.len()),
            Value::Closure(_) => write!(f, "<function>"),
        }
    }
}
