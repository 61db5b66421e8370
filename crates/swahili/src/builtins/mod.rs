//! Builtin functions, registered into the root symbol table before any
//! user code runs, together with the sentinel constants `kweli`, `uwongo`
//! and `tupu`.

mod inspect;
mod io;

use strum::{Display, EnumIter, EnumString, IntoEnumIterator as _, IntoStaticStr};

use crate::{
    context::{ContextId, GLOBAL_CONTEXT},
    error::RunResult,
    io::Console,
    lexer::Span,
    scope::{GLOBAL_SCOPE, Scopes},
    value::{Value, ValueKind},
};

/// Every builtin the interpreter ships. The strum serializations are the
/// language-visible names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, EnumString, IntoStaticStr)]
pub(crate) enum Builtin {
    /// Prints a value followed by a newline.
    #[strum(serialize = "andika")]
    Andika,
    /// Prompts and reads one line as a string.
    #[strum(serialize = "soma")]
    Soma,
    /// Prompts and reads a number, re-prompting until one parses.
    #[strum(serialize = "somaNambari")]
    SomaNambari,
    /// Clears the terminal screen.
    #[strum(serialize = "futa")]
    Futa,
    #[strum(serialize = "niNambari")]
    NiNambari,
    #[strum(serialize = "niJina")]
    NiJina,
    #[strum(serialize = "niOrodha")]
    NiOrodha,
    #[strum(serialize = "niShughuli")]
    NiShughuli,
    /// Length of a string or list.
    #[strum(serialize = "idadi")]
    Idadi,
}

impl Builtin {
    pub fn name(self) -> &'static str {
        self.into()
    }

    /// Declared parameter names, used for arity checking and for binding
    /// into the execution context.
    pub fn params(self) -> &'static [&'static str] {
        match self {
            Self::Andika => &["value"],
            Self::Soma => &["swali"],
            Self::SomaNambari => &["message"],
            Self::Futa => &[],
            Self::NiNambari | Self::NiJina | Self::NiOrodha | Self::NiShughuli | Self::Idadi => &["value"],
        }
    }

    /// Runs the host handler. Arity has already been checked by the call
    /// protocol; `span` and `context` locate the call for errors.
    pub fn call<C: Console>(
        self,
        args: &[Value],
        span: Span,
        context: ContextId,
        console: &mut C,
    ) -> RunResult<Value> {
        match self {
            Self::Andika => io::andika(&args[0], span, context, console),
            Self::Soma => io::soma(&args[0], span, context, console),
            Self::SomaNambari => io::soma_nambari(&args[0], span, context, console),
            Self::Futa => io::futa(span, context, console),
            Self::NiNambari => Ok(type_test(matches!(args[0].kind, ValueKind::Number(_)), span, context)),
            Self::NiJina => Ok(type_test(matches!(args[0].kind, ValueKind::Str(_)), span, context)),
            Self::NiOrodha => Ok(type_test(matches!(args[0].kind, ValueKind::List(_)), span, context)),
            Self::NiShughuli => Ok(type_test(
                matches!(args[0].kind, ValueKind::Function(_) | ValueKind::Builtin(_)),
                span,
                context,
            )),
            Self::Idadi => inspect::idadi(&args[0], span, context),
        }
    }
}

fn type_test(outcome: bool, span: Span, context: ContextId) -> Value {
    Value::new(ValueKind::Bool(outcome), Some(span), context)
}

/// Populates the root symbol table: every builtin plus the sentinel
/// constants. Must run before any user code.
pub(crate) fn register(scopes: &mut Scopes) {
    for builtin in Builtin::iter() {
        scopes.set(
            GLOBAL_SCOPE,
            builtin.name().into(),
            Value::new(ValueKind::Builtin(builtin), None, GLOBAL_CONTEXT),
        );
    }
    scopes.set(
        GLOBAL_SCOPE,
        "kweli".into(),
        Value::new(ValueKind::Bool(true), None, GLOBAL_CONTEXT),
    );
    scopes.set(
        GLOBAL_SCOPE,
        "uwongo".into(),
        Value::new(ValueKind::Bool(false), None, GLOBAL_CONTEXT),
    );
    scopes.set(
        GLOBAL_SCOPE,
        "tupu".into(),
        Value::new(ValueKind::Null, None, GLOBAL_CONTEXT),
    );
}
