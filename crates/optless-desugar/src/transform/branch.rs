// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! `ifPresent` / `ifPresentOrElse`.
//!
//! ```text
//! void ifPresentOrElse$N(T value) {
//!     if (value != null) { onPresent(value); } else { onAbsent(); }
//! }
//! ```

use optless_ast::expr::Expr;
use optless_ast::Type;

use super::template::RootBuilder;
use super::{Operation, TransformCx, Transformer, WrapperCall};
use crate::error::Result;

pub struct BranchTransformer;

impl Transformer for BranchTransformer {
    fn name(&self) -> &'static str {
        "branch"
    }

    fn operations(&self) -> &'static [Operation] {
        &[Operation::IfPresent, Operation::IfPresentOrElse]
    }

    fn transform(&self, mut call: WrapperCall, cx: &mut TransformCx<'_>) -> Result<Expr> {
        let receiver = call.take_receiver()?;
        let on_present = call.take_arg(0)?;
        let on_absent = if call.op == Operation::IfPresentOrElse {
            Some(call.take_arg(1)?)
        } else {
            None
        };

        let mut root = RootBuilder::new(cx, call.op.name(), call.span);
        let value = root.receiver(cx, receiver, &call.element);
        let on_present = root.function(cx, on_present)?;
        let on_absent = match on_absent {
            Some(arg) => Some(root.function(cx, arg)?),
            None => None,
        };

        let input = root.ident(cx, value);
        let consume = root.invoke(cx, &on_present, vec![input]);
        let then = vec![cx.session.make.exec(consume)];
        let otherwise = match &on_absent {
            Some(function) => {
                let run = root.invoke(cx, function, vec![]);
                Some(vec![cx.session.make.exec(run)])
            }
            None => None,
        };
        let subject = root.ident(cx, value);
        let present = cx.session.make.null_check(subject, true);
        let branch = cx.session.make.if_(present, then, otherwise);
        root.finish(cx, Type::Void, vec![branch])
    }
}
