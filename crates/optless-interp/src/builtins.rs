// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Host library methods the evaluated code may call.

use std::rc::Rc;

use optless_ast::prelude::{DOUBLE_STREAM, INTEGER, INT_STREAM, LONG_STREAM, OBJECTS, STREAM, STRING};

use crate::interp::{Exec, RuntimeError, Unwind};
use crate::value::Value;

pub(crate) const NULL_POINTER_EXCEPTION: &str = "java.lang.NullPointerException";
pub(crate) const ARITHMETIC_EXCEPTION: &str = "java.lang.ArithmeticException";

pub(crate) fn throw(class: &str, message: Option<&str>) -> Unwind {
    Unwind::Throw(Value::object(class, message.map(str::to_string)))
}

fn arg(args: &[Value], index: usize) -> Exec<Value> {
    args.get(index).cloned().ok_or_else(|| {
        Unwind::Error(RuntimeError::ArityMismatch {
            expected: index + 1,
            got: args.len(),
        })
    })
}

fn no_such_method(owner: &str, name: &str) -> Unwind {
    Unwind::Error(RuntimeError::NoSuchMethod {
        class: owner.to_string(),
        method: name.to_string(),
    })
}

/// Call a library method. `receiver` is `None` for static methods.
pub(crate) fn call(owner: &str, name: &str, receiver: Option<&Value>, args: &[Value]) -> Exec<Value> {
    match (owner, receiver) {
        (OBJECTS, None) => objects(name, args),
        (STREAM, None) if name == "ofNullable" => {
            let value = arg(args, 0)?;
            let items = if value.is_null() { vec![] } else { vec![value] };
            Ok(Value::Stream(Rc::new(items)))
        }
        (INT_STREAM | LONG_STREAM | DOUBLE_STREAM, None) => match name {
            "of" => Ok(Value::Stream(Rc::new(vec![arg(args, 0)?]))),
            "empty" => Ok(Value::Stream(Rc::new(Vec::new()))),
            _ => Err(no_such_method(owner, name)),
        },
        (INTEGER, None) if name == "valueOf" => match arg(args, 0)? {
            Value::Int(i) => Ok(Value::Int(i)),
            other => Err(Unwind::Error(RuntimeError::TypeError(format!(
                "Integer.valueOf of {}",
                other.type_name()
            )))),
        },
        (STRING, None) if name == "valueOf" => Ok(Value::str(&arg(args, 0)?.to_string())),
        (_, Some(Value::Null)) => Err(throw(
            NULL_POINTER_EXCEPTION,
            Some(&format!("cannot invoke `{}` on null", name)),
        )),
        (_, Some(receiver)) => instance(owner, name, receiver, args),
        (_, None) => Err(no_such_method(owner, name)),
    }
}

fn objects(name: &str, args: &[Value]) -> Exec<Value> {
    let value = arg(args, 0)?;
    match name {
        "requireNonNull" => {
            if value.is_null() {
                Err(throw(NULL_POINTER_EXCEPTION, None))
            } else {
                Ok(value)
            }
        }
        "isNull" => Ok(Value::Bool(value.is_null())),
        "nonNull" => Ok(Value::Bool(!value.is_null())),
        _ => Err(no_such_method(OBJECTS, name)),
    }
}

fn instance(owner: &str, name: &str, receiver: &Value, args: &[Value]) -> Exec<Value> {
    match (receiver, name) {
        (Value::Str(s), _) => string(s, name, args),
        (Value::Stream(items), "count") => Ok(Value::Long(items.len() as i64)),
        (Value::Int(i), "intValue") => Ok(Value::Int(*i)),
        (Value::Object(_), "getMessage") => Ok(receiver
            .message()
            .map(|m| Value::str(&m))
            .unwrap_or(Value::Null)),
        (_, "equals") => Ok(Value::Bool(receiver.same(&arg(args, 0)?))),
        (_, "toString") => Ok(Value::str(&receiver.to_string())),
        (_, "hashCode") => Ok(Value::Int(0)),
        _ => Err(no_such_method(owner, name)),
    }
}

fn string(s: &str, name: &str, args: &[Value]) -> Exec<Value> {
    match name {
        "trim" => Ok(Value::str(s.trim())),
        "length" => Ok(Value::Int(s.chars().count() as i32)),
        "isEmpty" => Ok(Value::Bool(s.is_empty())),
        "toUpperCase" => Ok(Value::str(&s.to_uppercase())),
        "concat" => match arg(args, 0)? {
            Value::Str(other) => Ok(Value::str(&format!("{}{}", s, other))),
            Value::Null => Err(throw(NULL_POINTER_EXCEPTION, None)),
            other => Err(Unwind::Error(RuntimeError::TypeError(format!(
                "String.concat of {}",
                other.type_name()
            )))),
        },
        "equals" => Ok(Value::Bool(arg(args, 0)?.as_str() == Some(s))),
        "toString" => Ok(Value::str(s)),
        "hashCode" => Ok(Value::Int(s.len() as i32)),
        _ => Err(no_such_method(STRING, name)),
    }
}
