// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! `orElse` / `orElseGet`: the receiver, or a fallback when it is null.

use optless_ast::expr::Expr;

use super::template::RootBuilder;
use super::{Operation, TransformCx, Transformer, WrapperCall};
use crate::error::Result;

pub struct FallbackTransformer;

impl Transformer for FallbackTransformer {
    fn name(&self) -> &'static str {
        "fallback"
    }

    fn operations(&self) -> &'static [Operation] {
        &[Operation::OrElse, Operation::OrElseGet]
    }

    fn transform(&self, mut call: WrapperCall, cx: &mut TransformCx<'_>) -> Result<Expr> {
        let receiver = call.take_receiver()?;
        let arg = call.take_arg(0)?;
        let mut root = RootBuilder::new(cx, call.op.name(), call.span);
        let value = root.receiver(cx, receiver, &call.element);

        let fallback = if call.op == Operation::OrElse {
            // evaluated eagerly, as the argument of a call always is
            let other = root.value(cx, arg, &call.element);
            root.ident(cx, other)
        } else {
            let supplier = root.function(cx, arg)?;
            root.invoke(cx, &supplier, vec![])
        };

        let subject = root.ident(cx, value);
        let present = cx.session.make.null_check(subject, true);
        let result = root.ident(cx, value);
        let pick = cx
            .session
            .make
            .conditional(present, result, fallback, call.result.clone());
        let ret = cx.session.make.ret(Some(pick));
        root.finish(cx, call.result, vec![ret])
    }
}
