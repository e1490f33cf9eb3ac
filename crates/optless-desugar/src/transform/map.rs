// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! `map` / `flatMap`: `value == null ? null : f(value)`.
//!
//! Both share one rewrite; the lifted function of a `flatMap` already
//! returns the unwrapped element, since lifting strips every wrapper layer
//! from the descriptor's return type.

use optless_ast::expr::Expr;

use super::template::RootBuilder;
use super::{Operation, TransformCx, Transformer, WrapperCall};
use crate::error::Result;

pub struct MapTransformer;

impl Transformer for MapTransformer {
    fn name(&self) -> &'static str {
        "map"
    }

    fn operations(&self) -> &'static [Operation] {
        &[Operation::Map, Operation::FlatMap]
    }

    fn transform(&self, mut call: WrapperCall, cx: &mut TransformCx<'_>) -> Result<Expr> {
        let receiver = call.take_receiver()?;
        let arg = call.take_arg(0)?;
        let mut root = RootBuilder::new(cx, call.op.name(), call.span);
        let value = root.receiver(cx, receiver, &call.element);
        let function = root.function(cx, arg)?;

        let subject = root.ident(cx, value);
        let absent = cx.session.make.null_check(subject, false);
        let none = cx.session.make.null(call.result.clone());
        let input = root.ident(cx, value);
        let mapped = root.invoke(cx, &function, vec![input]);
        let pick = cx
            .session
            .make
            .conditional(absent, none, mapped, call.result.clone());
        let ret = cx.session.make.ret(Some(pick));
        root.finish(cx, call.result, vec![ret])
    }
}
