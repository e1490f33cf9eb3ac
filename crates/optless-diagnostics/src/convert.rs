// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Conversions from pass errors to `Diagnostic`.

use optless_ast::Span;
use optless_desugar::{DesugarError, DesugarErrorKind};

use crate::{Diagnostic, ToDiagnostic};

/// Error code for a pass error kind.
pub fn code_for(kind: &DesugarErrorKind) -> &'static str {
    use DesugarErrorKind::*;

    match kind {
        UnsupportedOperation { .. } => "E0900",
        DuplicateClaim { .. } => "E0901",
        UnclaimedOperation { .. } => "E0902",
        UninferableWrapper { .. } => "E0910",
        MissingHostSymbol { .. } => "E0920",
        UnexpectedNode { .. } => "E0921",
        MissingArgument { .. } => "E0922",
        PendingNotFlushed { .. } => "E0923",
    }
}

impl ToDiagnostic for DesugarError {
    fn to_diagnostic(&self) -> Diagnostic {
        use DesugarErrorKind::*;

        let diag = Diagnostic::error(self.kind.to_string()).with_code(code_for(&self.kind));
        // Errors raised outside any tree position carry the default span.
        let located = self.span != Span::default();
        let label = |diag: Diagnostic, msg: &str| {
            if located {
                diag.with_primary(self.span, msg)
            } else {
                diag
            }
        };

        match &self.kind {
            UnsupportedOperation { name } => label(diag, "wrapper call with no rewrite")
                .with_note(format!("`{}` is not part of the supported wrapper surface", name))
                .with_help("compare the wrapped values instead, or call the member before wrapping"),

            DuplicateClaim { first, second, .. } => diag
                .with_note(format!("claimed by `{}` and by `{}`", first, second))
                .with_help("each operation must have exactly one transformer"),

            UnclaimedOperation { .. } => {
                diag.with_help("register a transformer that lists this operation")
            }

            UninferableWrapper { variable } => label(diag, "declared with a raw wrapper type")
                .with_help(format!(
                    "give `{}` a type argument or an initializer with a known type",
                    variable
                )),

            MissingHostSymbol { owner, .. } => label(diag, "rewrite needs this member")
                .with_note(format!("the symbol table has no matching member in `{}`", owner)),

            UnexpectedNode { .. } => label(diag, "here"),

            MissingArgument { index, .. } => {
                label(diag, format!("argument {} missing", index).as_str())
            }

            PendingNotFlushed { .. } => diag
                .with_note("synthesized methods must be committed to their class before the unit ends"),
        }
    }
}
