//! Lexical scopes: parent-chained symbol tables held in a central arena.
//!
//! Scopes are addressed by `ScopeId` indices instead of owning references.
//! Function values keep the id of their defining scope, and scopes hold
//! those function values by name; with arena ownership that mutual reference
//! is just two indices, so closures stay usable for the whole run.

use std::rc::Rc;

use ahash::AHashMap;

use crate::value::Value;

/// Index of a symbol table in the `Scopes` arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct ScopeId(u32);

impl ScopeId {
    fn new(index: usize) -> Self {
        Self(u32::try_from(index).expect("scope arena overflow"))
    }

    fn index(self) -> usize {
        self.0 as usize
    }
}

/// The root scope, pre-populated with builtins and the sentinel constants
/// before any user code runs.
pub(crate) const GLOBAL_SCOPE: ScopeId = ScopeId(0);

/// One lexical level: name → value bindings plus an optional enclosing scope.
#[derive(Debug, Default)]
pub(crate) struct SymbolTable {
    bindings: AHashMap<Rc<str>, Value>,
    parent: Option<ScopeId>,
}

/// Arena of every symbol table created during a run.
///
/// Frames are retained for the life of the run: any of them may have been
/// captured by a `shughuli` defined inside it, and the arena is dropped
/// wholesale when the interpreter goes away.
#[derive(Debug)]
pub(crate) struct Scopes {
    arena: Vec<SymbolTable>,
}

impl Scopes {
    /// Creates the arena with the (empty) global scope at index 0.
    pub fn new() -> Self {
        Self {
            arena: vec![SymbolTable::default()],
        }
    }

    /// Adds a fresh child scope chained to `parent`.
    pub fn push(&mut self, parent: ScopeId) -> ScopeId {
        let id = ScopeId::new(self.arena.len());
        self.arena.push(SymbolTable {
            bindings: AHashMap::new(),
            parent: Some(parent),
        });
        id
    }

    /// Looks `name` up in `scope`, then recursively through the parent chain.
    pub fn get(&self, scope: ScopeId, name: &str) -> Option<&Value> {
        let mut current = Some(scope);
        while let Some(id) = current {
            let table = &self.arena[id.index()];
            if let Some(value) = table.bindings.get(name) {
                return Some(value);
            }
            current = table.parent;
        }
        None
    }

    /// Binds `name` in `scope` itself, never in a parent. A binding here
    /// shadows, but does not modify, one of the same name further up.
    pub fn set(&mut self, scope: ScopeId, name: Rc<str>, value: Value) {
        self.arena[scope.index()].bindings.insert(name, value);
    }

    /// Removes `name` from `scope` itself; parent bindings are untouched.
    pub fn remove(&mut self, scope: ScopeId, name: &str) -> Option<Value> {
        self.arena[scope.index()].bindings.remove(name)
    }

    /// Names bound directly in `scope`, unsorted.
    pub fn names(&self, scope: ScopeId) -> impl Iterator<Item = &Rc<str>> {
        self.arena[scope.index()].bindings.keys()
    }
}
