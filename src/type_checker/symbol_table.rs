use rustc_hash::FxHashMap;

use crate::{builtins::Builtin, errors::errors::InvariantViolation};

use super::types::Type;

#[derive(Debug, Clone, PartialEq)]
pub struct Symbol {
    pub name: String,
    pub type_: Type,
    pub is_constant: bool,
    pub is_function: bool,
    pub scope_level: usize,
}

/// One scope record. Scopes live in the table's arena and point at their parent by index.
#[derive(Debug)]
struct Scope {
    symbols: FxHashMap<String, Symbol>,
    parent: Option<usize>,
    level: usize,
}

/// Hierarchical symbol environment.
///
/// The global scope (level 0) is created with the table and already holds
/// the built-in functions. Entering a scope pushes a child of the current
/// one; exiting drops it together with its symbols.
#[derive(Debug)]
pub struct SymbolTable {
    scopes: Vec<Scope>,
    current: usize,
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

impl SymbolTable {
    pub fn new() -> Self {
        let mut table = SymbolTable {
            scopes: vec![Scope {
                symbols: FxHashMap::default(),
                parent: None,
                level: 0,
            }],
            current: 0,
        };

        for builtin in Builtin::ALL {
            table.declare_symbol(builtin.name(), builtin.signature(), false, true);
        }

        table
    }

    pub fn enter_scope(&mut self) {
        let level = self.scopes[self.current].level + 1;

        self.scopes.push(Scope {
            symbols: FxHashMap::default(),
            parent: Some(self.current),
            level,
        });
        self.current = self.scopes.len() - 1;
    }

    /// Leaves the current scope. Leaving the global scope is an invariant violation.
    pub fn exit_scope(&mut self) -> Result<(), InvariantViolation> {
        let Some(parent) = self.scopes[self.current].parent else {
            return Err(InvariantViolation::ExitGlobalScope);
        };

        // Scopes are strictly nested, so the current one is always the last record
        self.scopes.truncate(self.current);
        self.current = parent;
        Ok(())
    }

    /// Declares `name` in the current scope.
    ///
    /// Returns `false` when the current scope already holds the name.
    /// Shadowing a symbol of an enclosing scope is allowed.
    pub fn declare_symbol(&mut self, name: &str, type_: Type, is_constant: bool, is_function: bool) -> bool {
        let scope = &mut self.scopes[self.current];

        if scope.symbols.contains_key(name) {
            return false;
        }

        scope.symbols.insert(
            name.to_string(),
            Symbol {
                name: name.to_string(),
                type_,
                is_constant,
                is_function,
                scope_level: scope.level,
            },
        );
        true
    }

    /// Searches the current scope outward to the global scope.
    pub fn lookup_symbol(&self, name: &str) -> Option<&Symbol> {
        let mut scope = Some(self.current);

        while let Some(index) = scope {
            if let Some(symbol) = self.scopes[index].symbols.get(name) {
                return Some(symbol);
            }
            scope = self.scopes[index].parent;
        }

        None
    }

    pub fn exists_in_current_scope(&self, name: &str) -> bool {
        self.scopes[self.current].symbols.contains_key(name)
    }

    pub fn current_level(&self) -> usize {
        self.scopes[self.current].level
    }
}
