//! The public interchange type for runtime values.
//!
//! `Object` is a deep, arena-free copy of a runtime value: it owns all its
//! data and can be freely cloned and stored by the host. This is what
//! `Runner::run` and `ReplSession::execute` return; the internal `Value`
//! never crosses the crate boundary.

use std::fmt;

use crate::{
    context::ANONYMOUS_NAME,
    value::{Value, ValueKind, push_number, push_quoted},
};

#[derive(Debug, Clone, PartialEq)]
pub enum Object {
    Number(f64),
    Bool(bool),
    Str(String),
    List(Vec<Object>),
    Null,
    /// A user-defined function; only the name survives the copy.
    Function { name: Option<String> },
    /// A builtin function, by language-visible name.
    Builtin { name: String },
}

impl Object {
    pub(crate) fn from_value(value: &Value) -> Self {
        match &value.kind {
            ValueKind::Number(n) => Self::Number(*n),
            ValueKind::Bool(b) => Self::Bool(*b),
            ValueKind::Str(s) => Self::Str(s.to_string()),
            ValueKind::List(elements) => Self::List(elements.iter().map(Self::from_value).collect()),
            ValueKind::Null => Self::Null,
            ValueKind::Function(function) => Self::Function {
                name: function.name.as_ref().map(|n| n.to_string()),
            },
            ValueKind::Builtin(builtin) => Self::Builtin {
                name: builtin.name().to_owned(),
            },
        }
    }

    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Object {
    /// Formatted (REPL) rendering: strings appear quoted.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        self.write(&mut out);
        f.write_str(&out)
    }
}

impl Object {
    fn write(&self, out: &mut String) {
        match self {
            Self::Number(n) => push_number(out, *n),
            Self::Bool(true) => out.push_str("kweli"),
            Self::Bool(false) => out.push_str("uwongo"),
            Self::Str(s) => push_quoted(out, s),
            Self::List(elements) => {
                out.push('[');
                for (i, element) in elements.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    element.write(out);
                }
                out.push(']');
            }
            Self::Null => out.push_str("tupu"),
            Self::Function { name } => {
                out.push_str("<shughuli ");
                out.push_str(name.as_deref().unwrap_or(ANONYMOUS_NAME));
                out.push('>');
            }
            Self::Builtin { name } => {
                out.push_str("<shughuli asili ");
                out.push_str(name);
                out.push('>');
            }
        }
    }
}
