// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! `get`, `getAsInt`/`getAsLong`/`getAsDouble` and `orElseThrow`.
//!
//! ```text
//! T get$N(T value) {
//!     if (value == null) throw new NoSuchElementException("No value present");
//!     return value;
//! }
//! ```
//!
//! With a supplier argument, the thrown value is whatever it supplies.

use optless_ast::expr::Expr;
use optless_ast::prelude::{NO_SUCH_ELEMENT_EXCEPTION, NO_VALUE_PRESENT};

use super::template::RootBuilder;
use super::{Operation, TransformCx, Transformer, WrapperCall};
use crate::error::{DesugarError, DesugarErrorKind, Result};

pub struct UnwrapTransformer;

impl Transformer for UnwrapTransformer {
    fn name(&self) -> &'static str {
        "unwrap"
    }

    fn operations(&self) -> &'static [Operation] {
        &[
            Operation::Get,
            Operation::GetAsInt,
            Operation::GetAsLong,
            Operation::GetAsDouble,
            Operation::OrElseThrow,
        ]
    }

    fn transform(&self, mut call: WrapperCall, cx: &mut TransformCx<'_>) -> Result<Expr> {
        let receiver = call.take_receiver()?;
        let mut root = RootBuilder::new(cx, call.op.name(), call.span);
        let value = root.receiver(cx, receiver, &call.element);
        let thrower = if call.op == Operation::OrElseThrow && !call.args.is_empty() {
            let supplier = call.take_arg(0)?;
            Some(root.function(cx, supplier)?)
        } else {
            None
        };

        let fault = match &thrower {
            Some(supplier) => root.invoke(cx, supplier, vec![]),
            None => {
                let ctor = cx
                    .symbols
                    .lookup_constructor(NO_SUCH_ELEMENT_EXCEPTION, 1)
                    .ok_or_else(|| {
                        DesugarError::new(
                            DesugarErrorKind::MissingHostSymbol {
                                owner: NO_SUCH_ELEMENT_EXCEPTION.to_string(),
                                member: "<init>(String)".to_string(),
                            },
                            call.span,
                        )
                    })?;
                let make = &mut cx.session.make;
                let message = make.at(call.span).string(NO_VALUE_PRESENT);
                make.new_instance(cx.symbols, ctor, vec![message])
            }
        };

        let subject = root.ident(cx, value);
        let make = &mut cx.session.make;
        let absent = make.null_check(subject, false);
        let throw = make.throw(fault);
        let guard = make.if_(absent, vec![throw], None);
        let result = root.ident(cx, value);
        let ret = cx.session.make.ret(Some(result));
        root.finish(cx, call.result, vec![guard, ret])
    }
}
