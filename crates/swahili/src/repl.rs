//! Persistent REPL session support.
//!
//! `ReplSession` keeps interpreter state across `execute()` calls so
//! interactive snippets share variables and functions. Errors render into
//! an `Exception` without poisoning the session: the next line still sees
//! everything bound before the failure.

use std::str::FromStr as _;

use crate::{
    builtins::Builtin,
    error::Exception,
    interp::Interpreter,
    io::Console,
    lexer,
    limits::Limits,
    object::Object,
    parse,
    scope::GLOBAL_SCOPE,
    tracer::NoopTracer,
};

#[derive(Debug)]
pub struct ReplSession {
    file_name: String,
    interpreter: Interpreter,
}

impl ReplSession {
    /// Creates a session with default limits. `file_name` labels
    /// diagnostics; `"<stdin>"` is the conventional choice.
    #[must_use]
    pub fn new(file_name: &str) -> Self {
        Self::with_limits(file_name, Limits::default())
    }

    #[must_use]
    pub fn with_limits(file_name: &str, limits: Limits) -> Self {
        Self {
            file_name: file_name.to_owned(),
            interpreter: Interpreter::new(limits),
        }
    }

    #[must_use]
    pub fn script_name(&self) -> &str {
        &self.file_name
    }

    /// Lexes, parses and evaluates one input against the persistent state.
    pub fn execute(&mut self, source: &str, console: &mut impl Console) -> Result<Object, Exception> {
        let tokens = lexer::lex(source).map_err(|error| error.render(&self.file_name))?;
        let program = parse::parse(&tokens).map_err(|error| error.render(&self.file_name))?;
        match self.interpreter.eval_program(&program, console, &mut NoopTracer) {
            Ok(value) => Ok(Object::from_value(&value)),
            Err(error) => Err(error.render(&self.file_name, self.interpreter.contexts())),
        }
    }

    /// Names the user has bound at the top level, sorted. Builtins and the
    /// sentinel constants are not listed.
    #[must_use]
    pub fn list_variables(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .interpreter
            .scopes()
            .names(GLOBAL_SCOPE)
            .filter(|name| !is_predefined(name))
            .map(|name| name.to_string())
            .collect();
        names.sort_unstable();
        names
    }

    /// Drops a top-level binding. Returns whether it existed.
    pub fn forget(&mut self, name: &str) -> bool {
        if is_predefined(name) {
            return false;
        }
        self.interpreter.scopes_mut().remove(GLOBAL_SCOPE, name).is_some()
    }
}

fn is_predefined(name: &str) -> bool {
    Builtin::from_str(name).is_ok() || matches!(name, "kweli" | "uwongo" | "tupu")
}
