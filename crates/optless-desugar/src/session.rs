// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Per-compilation-run state: the unique name counter and the synthetic
//! method manager.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use optless_ast::decl::{ClassDecl, Member, MethodDecl};
use optless_ast::make::TreeMaker;
use optless_ast::{SymbolId, SymbolTable};

use crate::error::{DesugarError, DesugarErrorKind, Result};

/// Monotonic counter behind every synthesized name.
///
/// Clones share the count, so forked sessions keep names unique across
/// the whole run.
#[derive(Debug, Clone, Default)]
pub struct NameCounter {
    next: Arc<AtomicU32>,
}

impl NameCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// `base$N` with the next counter value.
    pub fn fresh(&self, base: &str) -> String {
        let n = self.next.fetch_add(1, Ordering::Relaxed);
        format!("{}${}", base, n)
    }

    /// Number of names handed out so far.
    pub fn issued(&self) -> u32 {
        self.next.load(Ordering::Relaxed)
    }
}

#[derive(Debug)]
struct Frame {
    class: SymbolId,
    methods: Vec<MethodDecl>,
}

/// Methods generated while visiting a class, waiting to be added to it.
///
/// One frame per class being visited; nested classes push their own frame
/// so they only receive what was generated inside them.
#[derive(Debug, Default)]
pub struct SyntheticMethods {
    frames: Vec<Frame>,
}

impl SyntheticMethods {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enter_class(&mut self, class: SymbolId) {
        self.frames.push(Frame {
            class,
            methods: Vec::new(),
        });
    }

    /// Queue `method` for the innermost class being visited.
    pub fn register(&mut self, method: MethodDecl) -> Result<()> {
        match self.frames.last_mut() {
            Some(frame) => {
                frame.methods.push(method);
                Ok(())
            }
            None => Err(DesugarError::new(
                DesugarErrorKind::UnexpectedNode {
                    context: format!("synthetic method `{}` outside of any class", method.name),
                },
                method.span,
            )),
        }
    }

    /// Pending methods of the innermost class, in generation order.
    pub fn pending(&self) -> &[MethodDecl] {
        self.frames
            .last()
            .map(|frame| frame.methods.as_slice())
            .unwrap_or(&[])
    }

    /// Take the innermost class's pending methods. A no-op when nothing
    /// is pending.
    pub fn flush(&mut self) -> Vec<MethodDecl> {
        self.frames
            .last_mut()
            .map(|frame| std::mem::take(&mut frame.methods))
            .unwrap_or_default()
    }

    /// Close the frame of `class`: append its pending methods to the class
    /// declaration and enter their symbols into the class scope, in
    /// generation order. Returns how many methods were added.
    pub fn commit(&mut self, class: &mut ClassDecl, symbols: &mut SymbolTable) -> Result<usize> {
        let frame = match self.frames.pop() {
            Some(frame) if frame.class == class.sym => frame,
            Some(frame) => {
                let expected = symbols.name(frame.class).to_string();
                self.frames.push(frame);
                return Err(DesugarError::new(
                    DesugarErrorKind::UnexpectedNode {
                        context: format!(
                            "commit of class `{}` while `{}` is open",
                            class.name, expected
                        ),
                    },
                    class.span,
                ));
            }
            None => {
                return Err(DesugarError::new(
                    DesugarErrorKind::UnexpectedNode {
                        context: format!("commit of class `{}` that was never entered", class.name),
                    },
                    class.span,
                ))
            }
        };
        let count = frame.methods.len();
        for method in frame.methods {
            symbols.enter(class.sym, method.sym);
            class.members.push(Member::Method(method));
        }
        Ok(count)
    }

    /// Methods pending across all open frames.
    pub fn pending_count(&self) -> usize {
        self.frames.iter().map(|f| f.methods.len()).sum()
    }

    /// True when no class is open and nothing is pending.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Drop all frames, e.g. after a unit failed.
    pub fn clear(&mut self) {
        self.frames.clear();
    }
}

/// Explicit context for one compilation run.
#[derive(Debug, Default)]
pub struct Session {
    pub names: NameCounter,
    pub methods: SyntheticMethods,
    pub make: TreeMaker,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// A session for a parallel worker: its own synthetic method manager
    /// and node maker, sharing this run's name counter.
    pub fn fork(&self) -> Session {
        Session {
            names: self.names.clone(),
            methods: SyntheticMethods::new(),
            make: TreeMaker::new(),
        }
    }
}
