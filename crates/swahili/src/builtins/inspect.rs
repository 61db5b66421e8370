//! Value-inspection builtins.

use crate::{
    context::ContextId,
    error::{ErrorKind, RunResult, RuntimeError},
    lexer::Span,
    value::{Value, ValueKind},
};

pub(super) fn idadi(value: &Value, span: Span, context: ContextId) -> RunResult<Value> {
    match value.length() {
        Some(len) => Ok(Value::new(ValueKind::Number(len as f64), Some(span), context)),
        None => Err(RuntimeError::new(
            ErrorKind::TypeError,
            "Cannot find length of non-iterable value",
            span,
            context,
        )),
    }
}
