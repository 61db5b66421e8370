//! Builtins that talk to the host console.

use crate::{
    context::ContextId,
    error::RunResult,
    io::Console,
    lexer::Span,
    value::{Value, ValueKind},
};

/// Shown by `somaNambari` when the input does not parse as a number.
const NOT_A_NUMBER: &str = "Jibu yako si nambari. Jaribu tena.";

pub(super) fn andika<C: Console>(value: &Value, span: Span, context: ContextId, console: &mut C) -> RunResult<Value> {
    console.write_line(&value.to_display_string());
    Ok(Value::new(ValueKind::Null, Some(span), context))
}

pub(super) fn soma<C: Console>(prompt: &Value, span: Span, context: ContextId, console: &mut C) -> RunResult<Value> {
    let line = console.read_line(&prompt.to_display_string()).unwrap_or_default();
    Ok(Value::new(ValueKind::Str(line.into()), Some(span), context))
}

pub(super) fn soma_nambari<C: Console>(
    prompt: &Value,
    span: Span,
    context: ContextId,
    console: &mut C,
) -> RunResult<Value> {
    let prompt = prompt.to_display_string();
    loop {
        let Some(line) = console.read_line(&prompt) else {
            // end of input: stop re-prompting
            return Ok(Value::new(ValueKind::Number(0.0), Some(span), context));
        };
        match line.trim().parse::<f64>() {
            Ok(number) => return Ok(Value::new(ValueKind::Number(number), Some(span), context)),
            Err(_) => console.write_line(NOT_A_NUMBER),
        }
    }
}

pub(super) fn futa<C: Console>(span: Span, context: ContextId, console: &mut C) -> RunResult<Value> {
    console.clear_screen();
    Ok(Value::new(ValueKind::Null, Some(span), context))
}
