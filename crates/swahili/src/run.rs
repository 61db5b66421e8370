//! One-shot program execution.

use crate::{
    error::Exception,
    interp::Interpreter,
    io::Console,
    lexer,
    limits::Limits,
    object::Object,
    parse::{self, Node},
    tracer::{EvalTracer, NoopTracer},
};

/// A parsed program, ready to run.
///
/// Parsing happens once in `new`; each `run` evaluates against a fresh
/// interpreter, so runs are independent.
#[derive(Debug)]
pub struct Runner {
    file_name: String,
    program: Node,
}

impl Runner {
    /// Lexes and parses `source`. `file_name` only labels diagnostics.
    pub fn new(source: &str, file_name: &str) -> Result<Self, Exception> {
        let tokens = lexer::lex(source).map_err(|error| error.render(file_name))?;
        let program = parse::parse(&tokens).map_err(|error| error.render(file_name))?;
        Ok(Self {
            file_name: file_name.to_owned(),
            program,
        })
    }

    #[must_use]
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Runs the program and returns its final value.
    pub fn run(&self, limits: Limits, console: &mut impl Console) -> Result<Object, Exception> {
        self.run_traced(limits, console, &mut NoopTracer)
    }

    /// Like `run`, reporting call and loop events to `tracer`.
    pub fn run_traced(
        &self,
        limits: Limits,
        console: &mut impl Console,
        tracer: &mut dyn EvalTracer,
    ) -> Result<Object, Exception> {
        let mut interpreter = Interpreter::new(limits);
        match interpreter.eval_program(&self.program, console, tracer) {
            Ok(value) => Ok(Object::from_value(&value)),
            Err(error) => Err(error.render(&self.file_name, interpreter.contexts())),
        }
    }
}

/// Parses and runs `source` with default limits in one call.
pub fn eval(source: &str, console: &mut impl Console) -> Result<Object, Exception> {
    Runner::new(source, "<eval>")?.run(Limits::default(), console)
}
