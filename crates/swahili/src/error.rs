//! Error model: runtime errors threaded through evaluation as values, and the
//! public `Exception` type that renders a message plus traceback.
//!
//! There is no catch construct in the language, so an error set during
//! evaluation propagates unchanged to the top where it is rendered once.

use std::fmt;

use strum::{Display, IntoStaticStr};

use crate::{
    context::{ContextId, Contexts},
    lexer::Span,
};

/// Result alias for evaluation steps. Errors are boxed to keep the `Ok`
/// path small through the recursive visitors.
pub(crate) type RunResult<T> = Result<T, Box<RuntimeError>>;

/// The runtime error kinds of the language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, IntoStaticStr)]
pub enum ErrorKind {
    /// An operation applied to operands that do not support it.
    IllegalOperation,
    /// A name looked up in the scope chain without a binding.
    UnboundName,
    /// A call with the wrong number of arguments.
    ArityMismatch,
    /// Numeric overflow, notably division by zero.
    Overflow,
    /// Runaway loop or call recursion.
    CallStackExceeded,
    /// A value of the wrong type where a specific one is required.
    TypeError,
}

/// A runtime error carrying its source span and the activation it was
/// raised in. The context chain is only walked when the error is rendered.
#[derive(Debug, Clone)]
pub(crate) struct RuntimeError {
    pub kind: ErrorKind,
    pub message: String,
    pub span: Span,
    pub context: ContextId,
}

impl RuntimeError {
    pub fn new(kind: ErrorKind, message: impl Into<String>, span: Span, context: ContextId) -> Box<Self> {
        Box::new(Self {
            kind,
            message: message.into(),
            span,
            context,
        })
    }

    /// Renders this error into a public `Exception`, walking the context
    /// chain to build the traceback (oldest frame first).
    pub fn render(&self, file_name: &str, contexts: &Contexts) -> Exception {
        let mut frames = Vec::new();
        let mut pos = self.span.start;
        let mut current = Some(self.context);
        while let Some(id) = current {
            let context = contexts.get(id);
            frames.push(StackFrame {
                file: file_name.to_owned(),
                line: pos.line,
                display_name: context.display_name.to_string(),
            });
            pos = context.entry.unwrap_or(pos);
            current = context.parent;
        }
        frames.reverse();
        Exception {
            kind: ExceptionKind::Runtime(self.kind),
            message: self.message.clone(),
            file: file_name.to_owned(),
            line: self.span.start.line,
            column: self.span.start.column,
            frames,
        }
    }
}

/// A lexer or parser failure, before any evaluation happens.
#[derive(Debug, Clone)]
pub(crate) struct SyntaxError {
    message: String,
    span: Span,
}

impl SyntaxError {
    pub fn new(message: impl Into<String>, span: Span) -> Self {
        Self {
            message: message.into(),
            span,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn render(&self, file_name: &str) -> Exception {
        Exception {
            kind: ExceptionKind::Syntax,
            message: self.message.clone(),
            file: file_name.to_owned(),
            line: self.span.start.line,
            column: self.span.start.column,
            frames: Vec::new(),
        }
    }
}

/// Distinguishes pre-run syntax failures from runtime errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExceptionKind {
    Syntax,
    Runtime(ErrorKind),
}

impl fmt::Display for ExceptionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Syntax => f.write_str("InvalidSyntax"),
            Self::Runtime(kind) => write!(f, "{kind}"),
        }
    }
}

/// One traceback entry: the file/line a frame was executing and the display
/// name of its activation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackFrame {
    pub file: String,
    pub line: u32,
    pub display_name: String,
}

/// A fully rendered error: what the host sees and what the CLI prints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exception {
    kind: ExceptionKind,
    message: String,
    file: String,
    line: u32,
    column: u32,
    frames: Vec<StackFrame>,
}

impl Exception {
    pub fn kind(&self) -> ExceptionKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn line(&self) -> u32 {
        self.line
    }

    pub fn column(&self) -> u32 {
        self.column
    }

    pub fn frames(&self) -> &[StackFrame] {
        &self.frames
    }
}

impl fmt::Display for Exception {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.frames.is_empty() {
            writeln!(f, "File \"{}\", line {}, column {}", self.file, self.line, self.column)?;
        } else {
            writeln!(f, "Traceback (most recent call last):")?;
            for frame in &self.frames {
                writeln!(f, "  File \"{}\", line {}, in {}", frame.file, frame.line, frame.display_name)?;
            }
        }
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for Exception {}
