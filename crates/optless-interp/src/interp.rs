// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Tree-walking evaluator.

use std::collections::HashMap;
use std::rc::Rc;

use optless_ast::decl::{ClassDecl, CompilationUnit, Member, MethodDecl, VarDecl};
use optless_ast::expr::{BinOp, Expr, ExprKind, LambdaBody, Literal, RefKind, UnaryOp};
use optless_ast::stmt::{Stmt, StmtKind};
use optless_ast::{PrimKind, SymbolId, SymbolKind, SymbolTable, Type};

use crate::builtins::{self, throw, ARITHMETIC_EXCEPTION, NULL_POINTER_EXCEPTION};
use crate::env::Frame;
use crate::value::{Closure, Value};

/// Errors in the evaluated program that the language itself would have
/// rejected, or that the evaluator does not model.
#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    #[error("undefined variable: {0}")]
    UndefinedVariable(String),

    #[error("unknown class: {0}")]
    UnknownClass(String),

    #[error("no such method '{method}' on {class}")]
    NoSuchMethod { class: String, method: String },

    #[error("method '{0}' has no body")]
    MissingBody(String),

    #[error("type error: {0}")]
    TypeError(String),

    #[error("arity mismatch: expected {expected}, got {got}")]
    ArityMismatch { expected: usize, got: usize },
}

/// How a top-level invocation completed.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Returned(Value),
    /// An exception escaped the invoked method.
    Threw(Value),
}

impl Outcome {
    pub fn returned(&self) -> Option<&Value> {
        match self {
            Outcome::Returned(value) => Some(value),
            Outcome::Threw(_) => None,
        }
    }

    /// Qualified class name of the escaped exception.
    pub fn thrown_class(&self) -> Option<String> {
        match self {
            Outcome::Threw(value) => value.class_name(),
            Outcome::Returned(_) => None,
        }
    }
}

/// Non-local exits while evaluating.
#[derive(Debug)]
pub(crate) enum Unwind {
    Throw(Value),
    Error(RuntimeError),
}

impl From<RuntimeError> for Unwind {
    fn from(err: RuntimeError) -> Self {
        Unwind::Error(err)
    }
}

pub(crate) type Exec<T> = Result<T, Unwind>;

enum Flow {
    Normal,
    Return(Value),
}

impl Flow {
    fn into_value(self) -> Value {
        match self {
            Flow::Normal => Value::Void,
            Flow::Return(value) => value,
        }
    }
}

fn default_value(ty: &Type) -> Value {
    match ty {
        Type::Prim(PrimKind::Boolean) => Value::Bool(false),
        Type::Prim(PrimKind::Int) => Value::Int(0),
        Type::Prim(PrimKind::Long) => Value::Long(0),
        Type::Prim(PrimKind::Double) => Value::Double(0.0),
        Type::Prim(PrimKind::Char) => Value::Char('\0'),
        _ => Value::Null,
    }
}

pub struct Interpreter<'a> {
    symbols: &'a SymbolTable,
    classes: HashMap<SymbolId, &'a ClassDecl>,
    by_name: HashMap<String, SymbolId>,
    methods: HashMap<SymbolId, &'a MethodDecl>,
    fields: HashMap<SymbolId, &'a VarDecl>,
    statics: HashMap<SymbolId, Value>,
    frames: Vec<Frame>,
}

impl<'a> Interpreter<'a> {
    pub fn new(unit: &'a CompilationUnit, symbols: &'a SymbolTable) -> Self {
        let mut interp = Self {
            symbols,
            classes: HashMap::new(),
            by_name: HashMap::new(),
            methods: HashMap::new(),
            fields: HashMap::new(),
            statics: HashMap::new(),
            frames: Vec::new(),
        };
        interp.load(unit);
        interp
    }

    /// Make the classes of another unit available.
    pub fn load(&mut self, unit: &'a CompilationUnit) {
        for class in &unit.classes {
            self.index_class(class);
        }
    }

    fn index_class(&mut self, class: &'a ClassDecl) {
        self.classes.insert(class.sym, class);
        self.by_name.insert(class.name.clone(), class.sym);
        for member in &class.members {
            match member {
                Member::Field(decl, _) => {
                    self.fields.insert(decl.sym, decl);
                }
                Member::Method(method) => {
                    self.methods.insert(method.sym, method);
                }
                Member::Class(nested) => self.index_class(nested),
            }
        }
    }

    /// Call `method` of the class with simple name `class`. Instance
    /// methods run on a freshly created instance.
    pub fn invoke(
        &mut self,
        class: &str,
        method: &str,
        args: Vec<Value>,
    ) -> Result<Outcome, RuntimeError> {
        let decl = self
            .by_name
            .get(class)
            .and_then(|sym| self.classes.get(sym).copied())
            .ok_or_else(|| RuntimeError::UnknownClass(class.to_string()))?;
        let target = decl
            .methods()
            .find(|m| m.name == method && m.params.len() == args.len())
            .ok_or_else(|| RuntimeError::NoSuchMethod {
                class: class.to_string(),
                method: method.to_string(),
            })?;

        let result = if target.modifiers.is_static {
            self.call_method(target, None, args)
        } else {
            self.instantiate(decl)
                .and_then(|this| self.call_method(target, Some(this), args))
        };
        self.frames.clear();
        match result {
            Ok(value) => Ok(Outcome::Returned(value)),
            Err(Unwind::Throw(value)) => Ok(Outcome::Threw(value)),
            Err(Unwind::Error(err)) => Err(err),
        }
    }

    // ── Frames ──────────────────────────────────────────────────────────

    fn frame(&mut self) -> Exec<&mut Frame> {
        self.frames
            .last_mut()
            .ok_or_else(|| RuntimeError::TypeError("evaluation outside of a method".to_string()).into())
    }

    fn this(&mut self) -> Exec<Value> {
        self.frame()?
            .this
            .clone()
            .ok_or_else(|| RuntimeError::UndefinedVariable("this".to_string()).into())
    }

    fn with_frame<T>(&mut self, frame: Frame, run: impl FnOnce(&mut Self) -> Exec<T>) -> Exec<T> {
        self.frames.push(frame);
        let result = run(self);
        self.frames.pop();
        result
    }

    // ── Methods and objects ─────────────────────────────────────────────

    fn call_method(&mut self, decl: &MethodDecl, this: Option<Value>, args: Vec<Value>) -> Exec<Value> {
        let body = decl
            .body
            .as_ref()
            .ok_or_else(|| RuntimeError::MissingBody(decl.name.clone()))?;
        if decl.params.len() != args.len() {
            return Err(RuntimeError::ArityMismatch {
                expected: decl.params.len(),
                got: args.len(),
            }
            .into());
        }
        let mut frame = Frame::new(this);
        for (param, arg) in decl.params.iter().zip(args) {
            frame.define(param.sym, arg);
        }
        self.with_frame(frame, |interp| interp.exec_stmts(body).map(Flow::into_value))
    }

    /// Call a resolved method symbol. Instance methods without a receiver
    /// run on the current `this`.
    fn call(&mut self, method: SymbolId, receiver: Option<Value>, args: Vec<Value>) -> Exec<Value> {
        if let Some(decl) = self.methods.get(&method).copied() {
            let this = if decl.modifiers.is_static {
                None
            } else {
                let this = match receiver {
                    Some(receiver) => receiver,
                    None => self.this()?,
                };
                if this.is_null() {
                    return Err(throw(NULL_POINTER_EXCEPTION, Some(&decl.name)));
                }
                Some(this)
            };
            return self.call_method(decl, this, args);
        }
        if let Some(Value::Closure(closure)) = &receiver {
            return self.apply(Rc::clone(closure), args);
        }
        let symbols = self.symbols;
        let owner = symbols.owner_class_name(method).unwrap_or_default();
        builtins::call(owner, symbols.name(method), receiver.as_ref(), &args)
    }

    fn apply(&mut self, closure: Rc<Closure>, mut args: Vec<Value>) -> Exec<Value> {
        match &*closure {
            Closure::Lambda {
                lambda,
                captured,
                this,
            } => {
                if lambda.params.len() != args.len() {
                    return Err(RuntimeError::ArityMismatch {
                        expected: lambda.params.len(),
                        got: args.len(),
                    }
                    .into());
                }
                let mut frame = Frame::with_captured(this.clone(), captured.clone());
                for (param, arg) in lambda.params.iter().zip(args) {
                    frame.define(param.sym, arg);
                }
                self.with_frame(frame, |interp| match &lambda.body {
                    LambdaBody::Expr(value) => interp.eval(value),
                    LambdaBody::Block(stmts) => interp.exec_stmts(stmts).map(Flow::into_value),
                })
            }
            Closure::Reference {
                target,
                kind,
                receiver,
            } => match kind {
                RefKind::Static => self.call(*target, None, args),
                RefKind::Bound => self.call(*target, receiver.clone(), args),
                RefKind::Unbound => {
                    if args.is_empty() {
                        return Err(RuntimeError::ArityMismatch {
                            expected: 1,
                            got: 0,
                        }
                        .into());
                    }
                    let receiver = args.remove(0);
                    self.call(*target, Some(receiver), args)
                }
                RefKind::Constructor => self.construct(*target, args),
            },
        }
    }

    fn instantiate(&mut self, class: &ClassDecl) -> Exec<Value> {
        let qualified = self
            .symbols
            .class_info(class.sym)
            .map(|info| info.qualified.clone())
            .unwrap_or_else(|| class.name.clone());
        let object = Value::object(&qualified, None);
        self.with_frame(Frame::new(Some(object.clone())), |interp| {
            for member in &class.members {
                if let Member::Field(decl, modifiers) = member {
                    if modifiers.is_static {
                        continue;
                    }
                    let value = match &decl.init {
                        Some(init) => interp.eval(init)?,
                        None => default_value(&decl.ty),
                    };
                    set_field(&object, &decl.name, value)?;
                }
            }
            Ok(())
        })?;
        Ok(object)
    }

    /// `new` on a user class runs field initializers and the constructor
    /// body if there is one. Library classes are exceptions carrying an
    /// optional message.
    fn construct(&mut self, ctor: SymbolId, args: Vec<Value>) -> Exec<Value> {
        let class = self
            .symbols
            .owner(ctor)
            .and_then(|class| self.classes.get(&class).copied());
        if let Some(class) = class {
            let object = self.instantiate(class)?;
            if let Some(body) = self.methods.get(&ctor).copied() {
                self.call_method(body, Some(object.clone()), args)?;
            }
            return Ok(object);
        }
        let symbols = self.symbols;
        let owner = symbols
            .owner_class_name(ctor)
            .ok_or_else(|| RuntimeError::UnknownClass(symbols.name(ctor).to_string()))?;
        let message = match args.first() {
            None | Some(Value::Null) => None,
            Some(value) => Some(value.to_string()),
        };
        Ok(Value::object(owner, message))
    }

    fn static_field(&mut self, sym: SymbolId) -> Exec<Value> {
        if let Some(value) = self.statics.get(&sym) {
            return Ok(value.clone());
        }
        let decl = self
            .fields
            .get(&sym)
            .copied()
            .ok_or_else(|| RuntimeError::UndefinedVariable(self.symbols.name(sym).to_string()))?;
        let value = match &decl.init {
            Some(init) => self.with_frame(Frame::new(None), |interp| interp.eval(init))?,
            None => default_value(&decl.ty),
        };
        self.statics.insert(sym, value.clone());
        Ok(value)
    }

    // ── Statements ──────────────────────────────────────────────────────

    fn exec_stmts(&mut self, stmts: &[Stmt]) -> Exec<Flow> {
        self.frame()?.push_scope();
        let result = self.exec_each(stmts);
        if let Some(frame) = self.frames.last_mut() {
            frame.pop_scope();
        }
        result
    }

    fn exec_each(&mut self, stmts: &[Stmt]) -> Exec<Flow> {
        for stmt in stmts {
            if let Flow::Return(value) = self.exec(stmt)? {
                return Ok(Flow::Return(value));
            }
        }
        Ok(Flow::Normal)
    }

    fn exec(&mut self, stmt: &Stmt) -> Exec<Flow> {
        match &stmt.kind {
            StmtKind::Expr(expr) => {
                self.eval(expr)?;
            }
            StmtKind::VarDef(decl) => {
                let value = match &decl.init {
                    Some(init) => self.eval(init)?,
                    None => default_value(&decl.ty),
                };
                self.frame()?.define(decl.sym, value);
            }
            StmtKind::Return(value) => {
                let value = match value {
                    Some(expr) => self.eval(expr)?,
                    None => Value::Void,
                };
                return Ok(Flow::Return(value));
            }
            StmtKind::If {
                cond,
                then,
                otherwise,
            } => {
                if self.condition(cond)? {
                    return self.exec_stmts(then);
                }
                if let Some(otherwise) = otherwise {
                    return self.exec_stmts(otherwise);
                }
            }
            StmtKind::While { cond, body } => {
                while self.condition(cond)? {
                    if let Flow::Return(value) = self.exec_stmts(body)? {
                        return Ok(Flow::Return(value));
                    }
                }
            }
            StmtKind::Throw(expr) => {
                let value = self.eval(expr)?;
                if value.is_null() {
                    return Err(throw(NULL_POINTER_EXCEPTION, None));
                }
                return Err(Unwind::Throw(value));
            }
            StmtKind::Block(stmts) => return self.exec_stmts(stmts),
        }
        Ok(Flow::Normal)
    }

    // ── Expressions ─────────────────────────────────────────────────────

    fn condition(&mut self, expr: &Expr) -> Exec<bool> {
        let value = self.eval(expr)?;
        value.as_bool().ok_or_else(|| {
            RuntimeError::TypeError(format!("expected boolean, found {}", value.type_name())).into()
        })
    }

    fn eval_args(&mut self, args: &[Expr]) -> Exec<Vec<Value>> {
        args.iter().map(|arg| self.eval(arg)).collect()
    }

    fn eval(&mut self, expr: &Expr) -> Exec<Value> {
        match &expr.kind {
            ExprKind::Literal(lit) => Ok(match lit {
                Literal::Null => Value::Null,
                Literal::Bool(b) => Value::Bool(*b),
                Literal::Int(i) => Value::Int(*i),
                Literal::Long(l) => Value::Long(*l),
                Literal::Double(d) => Value::Double(*d),
                Literal::Char(c) => Value::Char(*c),
                Literal::String(s) => Value::str(s),
            }),
            ExprKind::Ident { name, sym } => {
                if let Some(value) = self.frame()?.get(*sym) {
                    return Ok(value.clone());
                }
                let symbol = self.symbols.get(*sym);
                if !matches!(symbol.kind, SymbolKind::Field) {
                    return Err(RuntimeError::UndefinedVariable(name.clone()).into());
                }
                if symbol.is_static() {
                    return self.static_field(*sym);
                }
                let this = self.this()?;
                get_field(&this, name)
            }
            ExprKind::This => self.this(),
            ExprKind::TypeName(name) => Err(RuntimeError::TypeError(format!(
                "class `{}` used as a value",
                name
            ))
            .into()),
            ExprKind::Select { target, name, sym } => {
                if let ExprKind::TypeName(_) = target.skip_parens().kind {
                    return self.static_field(*sym);
                }
                let object = self.eval(target)?;
                get_field(&object, name)
            }
            ExprKind::Call {
                target,
                method,
                args,
                ..
            } => {
                let receiver = match target.as_deref().map(Expr::skip_parens) {
                    None => None,
                    Some(Expr {
                        kind: ExprKind::TypeName(_),
                        ..
                    }) => None,
                    Some(target) => Some(self.eval(target)?),
                };
                let args = self.eval_args(args)?;
                self.call(*method, receiver, args)
            }
            ExprKind::New { ctor, args } => {
                let args = self.eval_args(args)?;
                self.construct(*ctor, args)
            }
            ExprKind::Unary { op, operand } => match op {
                UnaryOp::Not => Ok(Value::Bool(!self.condition(operand)?)),
                UnaryOp::Neg => match self.eval(operand)? {
                    Value::Int(i) => Ok(Value::Int(i.wrapping_neg())),
                    Value::Long(l) => Ok(Value::Long(l.wrapping_neg())),
                    Value::Double(d) => Ok(Value::Double(-d)),
                    other => Err(RuntimeError::TypeError(format!(
                        "cannot negate {}",
                        other.type_name()
                    ))
                    .into()),
                },
            },
            ExprKind::Binary { op, lhs, rhs } => match op {
                BinOp::And => Ok(Value::Bool(self.condition(lhs)? && self.condition(rhs)?)),
                BinOp::Or => Ok(Value::Bool(self.condition(lhs)? || self.condition(rhs)?)),
                _ => {
                    let lhs = self.eval(lhs)?;
                    let rhs = self.eval(rhs)?;
                    binary(*op, lhs, rhs)
                }
            },
            ExprKind::Conditional {
                cond,
                then,
                otherwise,
            } => {
                if self.condition(cond)? {
                    self.eval(then)
                } else {
                    self.eval(otherwise)
                }
            }
            ExprKind::Lambda(lambda) => {
                let frame = self.frame()?;
                Ok(Value::Closure(Rc::new(Closure::Lambda {
                    lambda: lambda.clone(),
                    captured: frame.snapshot(),
                    this: frame.this.clone(),
                })))
            }
            ExprKind::MethodRef(r) => {
                let receiver = match r.kind {
                    RefKind::Bound => {
                        let receiver = self.eval(&r.qualifier)?;
                        if receiver.is_null() {
                            return Err(throw(NULL_POINTER_EXCEPTION, None));
                        }
                        Some(receiver)
                    }
                    _ => None,
                };
                Ok(Value::Closure(Rc::new(Closure::Reference {
                    target: r.sym,
                    kind: r.kind,
                    receiver,
                })))
            }
            ExprKind::Assign { target, value } => {
                let value = self.eval(value)?;
                self.assign(target, value.clone())?;
                Ok(value)
            }
            ExprKind::Parens(inner) => self.eval(inner),
        }
    }

    fn assign(&mut self, target: &Expr, value: Value) -> Exec<()> {
        match &target.skip_parens().kind {
            ExprKind::Ident { name, sym } => {
                let frame = self.frame()?;
                if frame.get(*sym).is_some() {
                    frame.assign(*sym, value);
                    return Ok(());
                }
                let symbol = self.symbols.get(*sym);
                if !matches!(symbol.kind, SymbolKind::Field) {
                    return Err(RuntimeError::UndefinedVariable(name.clone()).into());
                }
                if symbol.is_static() {
                    self.statics.insert(*sym, value);
                    return Ok(());
                }
                let this = self.this()?;
                set_field(&this, name, value)
            }
            ExprKind::Select { target, name, sym } => {
                if let ExprKind::TypeName(_) = target.skip_parens().kind {
                    self.statics.insert(*sym, value);
                    return Ok(());
                }
                let object = self.eval(target)?;
                set_field(&object, name, value)
            }
            _ => Err(RuntimeError::TypeError("invalid assignment target".to_string()).into()),
        }
    }
}

fn get_field(object: &Value, name: &str) -> Exec<Value> {
    match object {
        Value::Object(obj) => Ok(obj.borrow().fields.get(name).cloned().unwrap_or(Value::Null)),
        Value::Null => Err(throw(NULL_POINTER_EXCEPTION, Some(name))),
        other => Err(RuntimeError::TypeError(format!("{} has no field `{}`", other.type_name(), name)).into()),
    }
}

fn set_field(object: &Value, name: &str, value: Value) -> Exec<()> {
    match object {
        Value::Object(obj) => {
            obj.borrow_mut().fields.insert(name.to_string(), value);
            Ok(())
        }
        Value::Null => Err(throw(NULL_POINTER_EXCEPTION, Some(name))),
        other => Err(RuntimeError::TypeError(format!("{} has no field `{}`", other.type_name(), name)).into()),
    }
}

// ── Arithmetic ──────────────────────────────────────────────────────────

fn binary(op: BinOp, lhs: Value, rhs: Value) -> Exec<Value> {
    match op {
        BinOp::Eq => return Ok(Value::Bool(lhs.same(&rhs))),
        BinOp::Ne => return Ok(Value::Bool(!lhs.same(&rhs))),
        BinOp::Add if matches!(lhs, Value::Str(_)) || matches!(rhs, Value::Str(_)) => {
            return Ok(Value::str(&format!("{}{}", lhs, rhs)));
        }
        _ => {}
    }
    match (&lhs, &rhs) {
        (Value::Int(a), Value::Int(b)) => int_op(op, *a, *b),
        (Value::Int(_) | Value::Long(_), Value::Int(_) | Value::Long(_)) => {
            long_op(op, as_long(&lhs), as_long(&rhs))
        }
        _ => match (as_double(&lhs), as_double(&rhs)) {
            (Some(a), Some(b)) => double_op(op, a, b),
            _ => Err(RuntimeError::TypeError(format!(
                "cannot apply `{}` to {} and {}",
                op.symbol(),
                lhs.type_name(),
                rhs.type_name()
            ))
            .into()),
        },
    }
}

fn as_long(value: &Value) -> i64 {
    match value {
        Value::Int(i) => i64::from(*i),
        Value::Long(l) => *l,
        _ => 0,
    }
}

fn as_double(value: &Value) -> Option<f64> {
    match value {
        Value::Int(i) => Some(f64::from(*i)),
        Value::Long(l) => Some(*l as f64),
        Value::Double(d) => Some(*d),
        _ => None,
    }
}

fn divide_by_zero() -> Unwind {
    throw(ARITHMETIC_EXCEPTION, Some("/ by zero"))
}

fn int_op(op: BinOp, a: i32, b: i32) -> Exec<Value> {
    Ok(match op {
        BinOp::Add => Value::Int(a.wrapping_add(b)),
        BinOp::Sub => Value::Int(a.wrapping_sub(b)),
        BinOp::Mul => Value::Int(a.wrapping_mul(b)),
        BinOp::Div if b == 0 => return Err(divide_by_zero()),
        BinOp::Div => Value::Int(a.wrapping_div(b)),
        BinOp::Rem if b == 0 => return Err(divide_by_zero()),
        BinOp::Rem => Value::Int(a.wrapping_rem(b)),
        _ => return compare(op, a.cmp(&b)),
    })
}

fn long_op(op: BinOp, a: i64, b: i64) -> Exec<Value> {
    Ok(match op {
        BinOp::Add => Value::Long(a.wrapping_add(b)),
        BinOp::Sub => Value::Long(a.wrapping_sub(b)),
        BinOp::Mul => Value::Long(a.wrapping_mul(b)),
        BinOp::Div if b == 0 => return Err(divide_by_zero()),
        BinOp::Div => Value::Long(a.wrapping_div(b)),
        BinOp::Rem if b == 0 => return Err(divide_by_zero()),
        BinOp::Rem => Value::Long(a.wrapping_rem(b)),
        _ => return compare(op, a.cmp(&b)),
    })
}

fn double_op(op: BinOp, a: f64, b: f64) -> Exec<Value> {
    Ok(match op {
        BinOp::Add => Value::Double(a + b),
        BinOp::Sub => Value::Double(a - b),
        BinOp::Mul => Value::Double(a * b),
        BinOp::Div => Value::Double(a / b),
        BinOp::Rem => Value::Double(a % b),
        BinOp::Lt => Value::Bool(a < b),
        BinOp::Gt => Value::Bool(a > b),
        BinOp::Le => Value::Bool(a <= b),
        BinOp::Ge => Value::Bool(a >= b),
        _ => return Err(RuntimeError::TypeError(format!("`{}` on doubles", op.symbol())).into()),
    })
}

fn compare(op: BinOp, ord: std::cmp::Ordering) -> Exec<Value> {
    use std::cmp::Ordering::*;
    Ok(Value::Bool(match op {
        BinOp::Lt => ord == Less,
        BinOp::Gt => ord == Greater,
        BinOp::Le => ord != Greater,
        BinOp::Ge => ord != Less,
        _ => return Err(RuntimeError::TypeError(format!("`{}` on integers", op.symbol())).into()),
    }))
}
