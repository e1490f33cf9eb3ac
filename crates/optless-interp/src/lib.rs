// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Reference evaluator for attributed trees.
//!
//! Runs a method of a compilation unit and reports its result or the
//! exception that escaped it. Used to check that desugared programs
//! behave like the programs they came from.

mod builtins;
pub mod env;
mod interp;
pub mod value;

pub use interp::{Interpreter, Outcome, RuntimeError};
pub use value::Value;
