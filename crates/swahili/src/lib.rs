#![doc = include_str!("../../../README.md")]
#![expect(clippy::float_cmp, reason = "IEEE-754 comparison is the language semantics")]
#![expect(clippy::cast_possible_truncation, reason = "numeric narrowing is checked before casts")]
#![expect(clippy::cast_sign_loss, reason = "sign is checked before casts")]

mod builtins;
mod context;
mod error;
mod interp;
mod io;
mod lexer;
mod limits;
mod object;
mod parse;
mod repl;
mod run;
mod scope;
mod tracer;
mod value;

pub use crate::{
    error::{ErrorKind, Exception, ExceptionKind, StackFrame},
    io::{CollectConsole, Console, NoConsole, StdConsole},
    lexer::{Pos, Span},
    limits::{DEFAULT_MAX_CALL_DEPTH, DEFAULT_MAX_LOOP_ITERATIONS, Limits},
    object::Object,
    repl::ReplSession,
    run::{Runner, eval},
    tracer::{EvalTracer, NoopTracer, RecordingTracer, TraceEvent},
};
