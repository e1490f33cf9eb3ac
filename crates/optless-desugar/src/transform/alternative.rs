// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! `or`: the receiver, or what the supplier returns when it is null.
//!
//! The supplier returns a wrapper in source; lifted, it returns the
//! element (or null), so the result stays the element type.

use optless_ast::expr::Expr;

use super::template::RootBuilder;
use super::{Operation, TransformCx, Transformer, WrapperCall};
use crate::error::Result;

pub struct AlternativeTransformer;

impl Transformer for AlternativeTransformer {
    fn name(&self) -> &'static str {
        "alternative"
    }

    fn operations(&self) -> &'static [Operation] {
        &[Operation::Or]
    }

    fn transform(&self, mut call: WrapperCall, cx: &mut TransformCx<'_>) -> Result<Expr> {
        let receiver = call.take_receiver()?;
        let arg = call.take_arg(0)?;
        let mut root = RootBuilder::new(cx, call.op.name(), call.span);
        let value = root.receiver(cx, receiver, &call.element);
        let supplier = root.function(cx, arg)?;

        let subject = root.ident(cx, value);
        let present = cx.session.make.null_check(subject, true);
        let result = root.ident(cx, value);
        let supplied = root.invoke(cx, &supplier, vec![]);
        let pick = cx
            .session
            .make
            .conditional(present, result, supplied, call.result.clone());
        let ret = cx.session.make.ret(Some(pick));
        root.finish(cx, call.result, vec![ret])
    }
}
