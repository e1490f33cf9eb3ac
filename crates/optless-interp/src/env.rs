// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Environment for variable bindings, keyed by symbol.

use std::collections::HashMap;

use optless_ast::SymbolId;

use crate::value::Value;

/// Flat snapshot of the variables visible at a point, captured by lambdas.
pub type Bindings = HashMap<SymbolId, Value>;

/// One activation: `this` plus a stack of block scopes.
#[derive(Debug, Default)]
pub struct Frame {
    pub this: Option<Value>,
    scopes: Vec<Bindings>,
}

impl Frame {
    pub fn new(this: Option<Value>) -> Self {
        Self {
            this,
            scopes: vec![Bindings::new()],
        }
    }

    /// A frame whose outermost scope is a captured snapshot.
    pub fn with_captured(this: Option<Value>, captured: Bindings) -> Self {
        Self {
            this,
            scopes: vec![captured, Bindings::new()],
        }
    }

    pub fn push_scope(&mut self) {
        self.scopes.push(Bindings::new());
    }

    pub fn pop_scope(&mut self) {
        self.scopes.pop();
    }

    pub fn define(&mut self, sym: SymbolId, value: Value) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(sym, value);
        }
    }

    pub fn get(&self, sym: SymbolId) -> Option<&Value> {
        self.scopes.iter().rev().find_map(|scope| scope.get(&sym))
    }

    /// Assign to an existing binding. Returns false if it is not bound.
    pub fn assign(&mut self, sym: SymbolId, value: Value) -> bool {
        for scope in self.scopes.iter_mut().rev() {
            if let Some(slot) = scope.get_mut(&sym) {
                *slot = value;
                return true;
            }
        }
        false
    }

    /// Everything visible from here, inner bindings winning.
    pub fn snapshot(&self) -> Bindings {
        let mut all = Bindings::new();
        for scope in &self.scopes {
            for (sym, value) in scope {
                all.insert(*sym, value.clone());
            }
        }
        all
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inner_scopes_shadow_and_pop() {
        let mut frame = Frame::new(None);
        frame.define(SymbolId(1), Value::Int(1));
        frame.push_scope();
        frame.define(SymbolId(1), Value::Int(2));
        assert_eq!(frame.get(SymbolId(1)), Some(&Value::Int(2)));
        frame.pop_scope();
        assert_eq!(frame.get(SymbolId(1)), Some(&Value::Int(1)));
    }

    #[test]
    fn assign_updates_nearest_binding() {
        let mut frame = Frame::new(None);
        frame.define(SymbolId(7), Value::Null);
        frame.push_scope();
        assert!(frame.assign(SymbolId(7), Value::Bool(true)));
        frame.pop_scope();
        assert_eq!(frame.get(SymbolId(7)), Some(&Value::Bool(true)));
        assert!(!frame.assign(SymbolId(8), Value::Null));
    }

    #[test]
    fn snapshot_flattens_scopes() {
        let mut frame = Frame::new(None);
        frame.define(SymbolId(1), Value::Int(1));
        frame.push_scope();
        frame.define(SymbolId(2), Value::Int(2));
        let snap = frame.snapshot();
        assert_eq!(snap.len(), 2);
    }
}
