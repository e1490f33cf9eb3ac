// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! `filter`: `value != null && p(value) ? value : null`.

use optless_ast::expr::{BinOp, Expr};

use super::template::RootBuilder;
use super::{Operation, TransformCx, Transformer, WrapperCall};
use crate::error::Result;

pub struct FilterTransformer;

impl Transformer for FilterTransformer {
    fn name(&self) -> &'static str {
        "filter"
    }

    fn operations(&self) -> &'static [Operation] {
        &[Operation::Filter]
    }

    fn transform(&self, mut call: WrapperCall, cx: &mut TransformCx<'_>) -> Result<Expr> {
        let receiver = call.take_receiver()?;
        let arg = call.take_arg(0)?;
        let mut root = RootBuilder::new(cx, call.op.name(), call.span);
        let value = root.receiver(cx, receiver, &call.element);
        let predicate = root.function(cx, arg)?;

        let subject = root.ident(cx, value);
        let present = cx.session.make.null_check(subject, true);
        let input = root.ident(cx, value);
        let test = root.invoke(cx, &predicate, vec![input]);
        let keep = cx.session.make.binary(BinOp::And, present, test);
        let result = root.ident(cx, value);
        let none = cx.session.make.null(call.result.clone());
        let pick = cx
            .session
            .make
            .conditional(keep, result, none, call.result.clone());
        let ret = cx.session.make.ret(Some(pick));
        root.finish(cx, call.result, vec![ret])
    }
}
