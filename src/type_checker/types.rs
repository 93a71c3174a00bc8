//! The Monkey type system.
//!
//! A closed set of constructors compared structurally. There is no
//! subtyping and no implicit numeric promotion: two types are compatible
//! exactly when their constructors match all the way down.

use std::fmt::Display;

use crate::ast::types::TypeExpr;

#[derive(Debug, Clone, PartialEq)]
pub enum Type {
    Int,
    String,
    Bool,
    Char,
    Void,
    Array(Box<Type>),
    Hash(Box<Type>, Box<Type>),
    Function(FunctionType),
}

/// Signature of a callable: fixed arity, parameter types and a return type.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionType {
    pub parameters: Vec<Type>,
    pub return_type: Box<Type>,
}

impl FunctionType {
    pub fn new(parameters: Vec<Type>, return_type: Type) -> Self {
        FunctionType {
            parameters,
            return_type: Box::new(return_type),
        }
    }

    pub fn arity(&self) -> usize {
        self.parameters.len()
    }
}

impl Type {
    pub fn array_of(element: Type) -> Type {
        Type::Array(Box::new(element))
    }

    pub fn hash_of(key: Type, value: Type) -> Type {
        Type::Hash(Box::new(key), Box::new(value))
    }

    pub fn function(parameters: Vec<Type>, return_type: Type) -> Type {
        Type::Function(FunctionType::new(parameters, return_type))
    }

    /// Structural compatibility.
    ///
    /// Functions need equal arity and pairwise compatible parameter and
    /// return types; arrays and hashes recurse into their element types;
    /// everything else compares by constructor.
    pub fn is_compatible_with(&self, other: &Type) -> bool {
        match (self, other) {
            (Type::Int, Type::Int)
            | (Type::String, Type::String)
            | (Type::Bool, Type::Bool)
            | (Type::Char, Type::Char)
            | (Type::Void, Type::Void) => true,
            (Type::Array(left), Type::Array(right)) => left.is_compatible_with(right),
            (Type::Hash(left_key, left_value), Type::Hash(right_key, right_value)) => {
                left_key.is_compatible_with(right_key) && left_value.is_compatible_with(right_value)
            }
            (Type::Function(left), Type::Function(right)) => {
                left.arity() == right.arity()
                    && left
                        .parameters
                        .iter()
                        .zip(right.parameters.iter())
                        .all(|(left, right)| left.is_compatible_with(right))
                    && left.return_type.is_compatible_with(&right.return_type)
            }
            _ => false,
        }
    }

    pub fn is_void(&self) -> bool {
        matches!(self, Type::Void)
    }

    /// Only ints and strings may key a hash.
    pub fn is_hash_key(&self) -> bool {
        matches!(self, Type::Int | Type::String)
    }

    /// Types with a total order usable by `<`, `>`, `<=` and `>=`.
    pub fn is_ordered(&self) -> bool {
        matches!(self, Type::Int | Type::Char | Type::String | Type::Bool)
    }
}

impl From<&TypeExpr> for Type {
    fn from(type_expr: &TypeExpr) -> Self {
        match type_expr {
            TypeExpr::Int => Type::Int,
            TypeExpr::String => Type::String,
            TypeExpr::Bool => Type::Bool,
            TypeExpr::Char => Type::Char,
            TypeExpr::Void => Type::Void,
            TypeExpr::Array(element) => Type::array_of(Type::from(element.as_ref())),
            TypeExpr::Hash(key, value) => {
                Type::hash_of(Type::from(key.as_ref()), Type::from(value.as_ref()))
            }
            TypeExpr::Function(parameters, return_type) => Type::function(
                parameters.iter().map(Type::from).collect(),
                Type::from(return_type.as_ref()),
            ),
        }
    }
}

impl Display for Type {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Type::Int => write!(f, "int"),
            Type::String => write!(f, "string"),
            Type::Bool => write!(f, "bool"),
            Type::Char => write!(f, "char"),
            Type::Void => write!(f, "void"),
            Type::Array(element) => write!(f, "array<{}>", element),
            Type::Hash(key, value) => write!(f, "hash<{}, {}>", key, value),
            Type::Function(function) => write!(f, "{}", function),
        }
    }
}

impl Display for FunctionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parameters = self
            .parameters
            .iter()
            .map(|parameter| parameter.to_string())
            .collect::<Vec<_>>()
            .join(", ");

        write!(f, "fn({}): {}", parameters, self.return_type)
    }
}
