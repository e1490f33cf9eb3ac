// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! `stream`: `Stream.ofNullable(value)` for `Optional`, and
//! `value != null ? IntStream.of(value) : IntStream.empty()` (likewise
//! `LongStream`, `DoubleStream`) for the primitive specializations.

use optless_ast::expr::Expr;
use optless_ast::prelude::{DOUBLE_STREAM, INT_STREAM, LONG_STREAM, STREAM};
use optless_ast::{Span, SymbolId, SymbolTable};

use super::template::RootBuilder;
use super::{Operation, TransformCx, Transformer, WrapperCall};
use crate::error::{DesugarError, DesugarErrorKind, Result};

const PRIMITIVE_STREAMS: [&str; 3] = [INT_STREAM, LONG_STREAM, DOUBLE_STREAM];

pub struct StreamTransformer;

fn host_method(symbols: &SymbolTable, owner: &str, name: &str, arity: usize, span: Span) -> Result<SymbolId> {
    symbols.lookup_method(owner, name, arity).ok_or_else(|| {
        DesugarError::new(
            DesugarErrorKind::MissingHostSymbol {
                owner: owner.to_string(),
                member: name.to_string(),
            },
            span,
        )
    })
}

impl StreamTransformer {
    fn primitive(
        call: WrapperCall,
        receiver: Expr,
        stream: &'static str,
        cx: &mut TransformCx<'_>,
    ) -> Result<Expr> {
        let of = host_method(cx.symbols, stream, "of", 1, call.span)?;
        let empty = host_method(cx.symbols, stream, "empty", 0, call.span)?;
        let mut root = RootBuilder::new(cx, call.op.name(), call.span);
        let value = root.receiver(cx, receiver, &call.element);

        let subject = root.ident(cx, value);
        let item = root.ident(cx, value);
        let make = cx.session.make.at(call.span);
        let present = make.null_check(subject, true);
        let qualifier = make.type_name(stream);
        let single = make.call_typed(cx.symbols, Some(qualifier), of, vec![item], call.result.clone());
        let qualifier = make.type_name(stream);
        let none = make.call_typed(cx.symbols, Some(qualifier), empty, vec![], call.result.clone());
        let pick = make.conditional(present, single, none, call.result.clone());
        let ret = make.ret(Some(pick));
        root.finish(cx, call.result, vec![ret])
    }
}

impl Transformer for StreamTransformer {
    fn name(&self) -> &'static str {
        "stream"
    }

    fn operations(&self) -> &'static [Operation] {
        &[Operation::Stream]
    }

    fn transform(&self, mut call: WrapperCall, cx: &mut TransformCx<'_>) -> Result<Expr> {
        let receiver = call.take_receiver()?;
        let primitive = PRIMITIVE_STREAMS
            .into_iter()
            .find(|stream| call.result.class_name() == Some(*stream));
        if let Some(stream) = primitive {
            return Self::primitive(call, receiver, stream, cx);
        }

        let of_nullable = host_method(cx.symbols, STREAM, "ofNullable", 1, call.span)?;
        let make = cx.session.make.at(call.span);
        let target = make.type_name(STREAM);
        Ok(make.call_typed(cx.symbols, Some(target), of_nullable, vec![receiver], call.result))
    }
}
