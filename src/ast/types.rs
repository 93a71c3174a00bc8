//! Type annotations as written in the source.
//!
//! The parser only checks that a type name is one of the known ones; the
//! type checker turns a [`TypeExpr`] into a [`crate::type_checker::types::Type`]
//! and validates anything structural, such as hash key types.

use std::fmt::Display;

#[derive(Debug, Clone, PartialEq)]
pub enum TypeExpr {
    Int,
    String,
    Bool,
    Char,
    Void,
    Array(Box<TypeExpr>),
    Hash(Box<TypeExpr>, Box<TypeExpr>),
    Function(Vec<TypeExpr>, Box<TypeExpr>),
}

impl Display for TypeExpr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TypeExpr::Int => write!(f, "int"),
            TypeExpr::String => write!(f, "string"),
            TypeExpr::Bool => write!(f, "bool"),
            TypeExpr::Char => write!(f, "char"),
            TypeExpr::Void => write!(f, "void"),
            TypeExpr::Array(element) => write!(f, "array<{}>", element),
            TypeExpr::Hash(key, value) => write!(f, "hash<{}, {}>", key, value),
            TypeExpr::Function(parameters, return_type) => {
                let parameters = parameters
                    .iter()
                    .map(|parameter| parameter.to_string())
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "fn({}): {}", parameters, return_type)
            }
        }
    }
}
