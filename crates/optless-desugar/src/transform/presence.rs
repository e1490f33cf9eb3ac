// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! `isPresent` / `isEmpty`: a null comparison on the receiver.

use optless_ast::expr::Expr;

use super::{Operation, TransformCx, Transformer, WrapperCall};
use crate::error::Result;

pub struct PresenceTransformer;

impl Transformer for PresenceTransformer {
    fn name(&self) -> &'static str {
        "presence"
    }

    fn operations(&self) -> &'static [Operation] {
        &[Operation::IsPresent, Operation::IsEmpty]
    }

    fn transform(&self, mut call: WrapperCall, cx: &mut TransformCx<'_>) -> Result<Expr> {
        let receiver = call.take_receiver()?;
        let non_null = call.op == Operation::IsPresent;
        Ok(cx.session.make.at(call.span).null_check(receiver, non_null))
    }
}
