// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Optional desugaring pass.
//!
//! Runs after type checking. Every expression whose static type is
//! `java.util.Optional` (or one of its primitive specializations) is
//! rewritten so that an absent value is a `null` of the element type:
//!
//! 1. Declarations of wrapper type are retyped to the element type
//! 2. Calls on the wrapper are replaced by transformer output, lifting
//!    lambda and method reference arguments into synthetic methods
//! 3. Synthetic methods are appended to the class that needed them
//!
//! The tree is mutated in place. Any error aborts the unit.

pub mod error;
pub mod lift;
pub mod options;
mod rewrite;
pub mod session;
pub mod transform;
pub mod unbox;

use optless_ast::decl::CompilationUnit;
use optless_ast::printer;
use optless_ast::SymbolTable;

pub use error::{DesugarError, DesugarErrorKind, ErrorCategory};
pub use options::PassOptions;
pub use session::{NameCounter, Session, SyntheticMethods};
pub use transform::{Operation, Transformer, TransformerRegistry};

use error::Result;
use rewrite::Rewriter;

/// The pass, reusable across the compilation units of one run.
pub struct Desugarer {
    registry: TransformerRegistry,
    session: Session,
    options: PassOptions,
    rewrites: usize,
}

impl Desugarer {
    pub fn new(options: PassOptions) -> Result<Self> {
        Self::with_session(Session::new(), options)
    }

    pub fn with_session(session: Session, options: PassOptions) -> Result<Self> {
        Ok(Self {
            registry: TransformerRegistry::standard()?,
            session,
            options,
            rewrites: 0,
        })
    }

    /// A desugarer for a parallel worker, sharing this run's name counter.
    pub fn fork(&self) -> Result<Self> {
        Self::with_session(self.session.fork(), self.options)
    }

    /// Rewrite one compilation unit in place.
    pub fn run(&mut self, unit: &mut CompilationUnit, symbols: &mut SymbolTable) -> Result<()> {
        self.rewrites = 0;
        self.ensure_flushed()?;

        let rewriter = Rewriter::new(symbols, &mut self.session, &self.registry);
        let outcome = rewriter.rewrite_unit(unit);
        let rewrites = match outcome {
            Ok(count) => count,
            Err(err) => {
                self.session.methods.clear();
                return Err(err);
            }
        };
        self.ensure_flushed()?;
        self.rewrites = rewrites;

        tracing::info!(unit = %unit.name, rewrites, "desugared optionals");
        if self.options.debug {
            eprintln!("{}", printer::print_unit(unit));
        }
        Ok(())
    }

    fn ensure_flushed(&mut self) -> Result<()> {
        if self.session.methods.is_empty() {
            return Ok(());
        }
        let count = self.session.methods.pending_count();
        self.session.methods.clear();
        Err(DesugarError::unlocated(DesugarErrorKind::PendingNotFlushed {
            count,
        }))
    }

    /// Wrapper calls and references replaced in the last unit.
    pub fn rewrites(&self) -> usize {
        self.rewrites
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    pub fn options(&self) -> PassOptions {
        self.options
    }
}

/// Desugar a single unit with a fresh session and default options.
pub fn desugar(unit: &mut CompilationUnit, symbols: &mut SymbolTable) -> Result<usize> {
    let mut pass = Desugarer::new(PassOptions::default())?;
    pass.run(unit, symbols)?;
    Ok(pass.rewrites())
}
