//! Resolved types, keyed by expression node.
//!
//! The type checker fills a [`TypeTable`] while it walks the program and
//! the code generator reads it back, so instruction selection never
//! re-derives a type on its own.

use rustc_hash::FxHashMap;

use crate::{
    ast::ast::{Expr, NodeId},
    errors::errors::GenerationError,
};

use super::types::Type;

#[derive(Debug, Default, Clone)]
pub struct TypeTable {
    types: FxHashMap<NodeId, Type>,
}

impl TypeTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, id: NodeId, type_: Type) {
        self.types.insert(id, type_);
    }

    pub fn get(&self, id: NodeId) -> Option<&Type> {
        self.types.get(&id)
    }

    /// Type of an expression, or a generation error if the checker never visited it.
    pub fn type_of(&self, expr: &Expr) -> Result<&Type, GenerationError> {
        self.types
            .get(&expr.get_id())
            .ok_or(GenerationError::MissingType { node: expr.get_id() })
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}
