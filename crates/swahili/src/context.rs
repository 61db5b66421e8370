//! Activation records forming the dynamic call chain.
//!
//! A `Context` chains to its *caller* for tracebacks, while its symbol table
//! chains to the function's *defining scope* for lookup. The two chains are
//! independent: call stack ≠ scope chain.

use std::rc::Rc;

use crate::{lexer::Pos, scope::ScopeId};

/// Display name of the top-level program activation.
pub(crate) const PROGRAM_NAME: &str = "<programu>";

/// Display name used for functions defined without a name.
pub(crate) const ANONYMOUS_NAME: &str = "<isiyotambuliwa>";

/// Index of a context in the `Contexts` arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct ContextId(u32);

impl ContextId {
    fn new(index: usize) -> Self {
        Self(u32::try_from(index).expect("context arena overflow"))
    }

    fn index(self) -> usize {
        self.0 as usize
    }
}

/// The program-level context, created before any user code runs.
pub(crate) const GLOBAL_CONTEXT: ContextId = ContextId(0);

#[derive(Debug)]
pub(crate) struct Context {
    pub display_name: Rc<str>,
    /// The caller's context; `None` only for the global context.
    pub parent: Option<ContextId>,
    /// Where this activation was entered, for traceback lines.
    pub entry: Option<Pos>,
    /// The symbol table of this activation.
    pub scope: ScopeId,
}

/// Arena of every activation record created during a run.
#[derive(Debug)]
pub(crate) struct Contexts {
    arena: Vec<Context>,
}

impl Contexts {
    /// Creates the arena with the global context at index 0, bound to the
    /// given (global) scope.
    pub fn new(global_scope: ScopeId) -> Self {
        Self {
            arena: vec![Context {
                display_name: PROGRAM_NAME.into(),
                parent: None,
                entry: None,
                scope: global_scope,
            }],
        }
    }

    pub fn push(&mut self, display_name: Rc<str>, parent: ContextId, entry: Pos, scope: ScopeId) -> ContextId {
        let id = ContextId::new(self.arena.len());
        self.arena.push(Context {
            display_name,
            parent: Some(parent),
            entry: Some(entry),
            scope,
        });
        id
    }

    pub fn get(&self, id: ContextId) -> &Context {
        &self.arena[id.index()]
    }
}
