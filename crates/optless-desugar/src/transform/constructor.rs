// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Static factories: `of(x)` is `Objects.requireNonNull(x)`,
//! `ofNullable(x)` is `x`, `empty()` is a `null` of the element type.

use optless_ast::expr::Expr;
use optless_ast::prelude::OBJECTS;

use super::{Operation, TransformCx, Transformer, WrapperCall};
use crate::error::{DesugarError, DesugarErrorKind, Result};

pub struct ConstructorTransformer;

impl Transformer for ConstructorTransformer {
    fn name(&self) -> &'static str {
        "constructor"
    }

    fn operations(&self) -> &'static [Operation] {
        &[Operation::Of, Operation::OfNullable, Operation::Empty]
    }

    fn transform(&self, mut call: WrapperCall, cx: &mut TransformCx<'_>) -> Result<Expr> {
        match call.op {
            Operation::Of => {
                let arg = call.take_arg(0)?;
                let require = cx
                    .symbols
                    .lookup_method(OBJECTS, "requireNonNull", 1)
                    .ok_or_else(|| {
                        DesugarError::new(
                            DesugarErrorKind::MissingHostSymbol {
                                owner: OBJECTS.to_string(),
                                member: "requireNonNull".to_string(),
                            },
                            call.span,
                        )
                    })?;
                let make = cx.session.make.at(call.span);
                let target = make.type_name(OBJECTS);
                Ok(make.call_typed(cx.symbols, Some(target), require, vec![arg], call.result))
            }
            Operation::OfNullable => {
                let mut arg = call.take_arg(0)?;
                if arg.is_null_literal() {
                    arg.ty = call.result;
                }
                Ok(arg)
            }
            _ => Ok(cx.session.make.at(call.span).null(call.result)),
        }
    }
}
