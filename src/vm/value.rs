use std::{fmt::Display, rc::Rc};

use indexmap::IndexMap;

use crate::{builtins::Builtin, compiler::bytecode::UnitId, type_checker::types::Type};

/// A runtime value.
///
/// `bool` has no variant of its own: it travels as `Int` 0/1 and only the
/// static type at a `Print` tells the two apart. Arrays and hashes are
/// shared and copied on write.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Char(char),
    Str(Rc<str>),
    Array(Rc<Vec<Value>>),
    Hash(Rc<IndexMap<HashKey, Value>>),
    Callable(Callable),
    /// Placeholder for unwritten array slots and locals
    Void,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum HashKey {
    Int(i64),
    Str(Rc<str>),
}

/// Reference to something invokable with the uniform calling convention.
#[derive(Debug, Clone, PartialEq)]
pub enum Callable {
    Unit { id: UnitId, name: Rc<str> },
    Builtin(Builtin),
}

impl Value {
    pub fn from_bool(value: bool) -> Value {
        Value::Int(value as i64)
    }

    pub fn string(value: &str) -> Value {
        Value::Str(Rc::from(value))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Value::Int(_) => "int",
            Value::Char(_) => "char",
            Value::Str(_) => "string",
            Value::Array(_) => "array",
            Value::Hash(_) => "hash",
            Value::Callable(_) => "function",
            Value::Void => "void",
        }
    }

    pub fn as_hash_key(&self) -> Option<HashKey> {
        match self {
            Value::Int(value) => Some(HashKey::Int(*value)),
            Value::Str(value) => Some(HashKey::Str(Rc::clone(value))),
            _ => None,
        }
    }

    /// Renders the value for `print`, using the static type to tell bools from ints.
    pub fn format(&self, type_: &Type) -> String {
        self.format_inner(type_, false)
    }

    fn format_inner(&self, type_: &Type, nested: bool) -> String {
        match (self, type_) {
            (Value::Int(value), Type::Bool) => (*value != 0).to_string(),
            (Value::Str(value), _) if nested => format!("{:?}", value.as_ref()),
            (Value::Char(value), _) if nested => format!("{:?}", value),
            (Value::Array(elements), Type::Array(element_type)) => {
                let elements = elements
                    .iter()
                    .map(|element| element.format_inner(element_type, true))
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("[{}]", elements)
            }
            (Value::Hash(entries), Type::Hash(key_type, value_type)) => {
                let entries = entries
                    .iter()
                    .map(|(key, value)| {
                        format!(
                            "{}: {}",
                            key.to_value().format_inner(key_type, true),
                            value.format_inner(value_type, true)
                        )
                    })
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("{{{}}}", entries)
            }
            _ => self.to_string(),
        }
    }
}

impl HashKey {
    pub fn to_value(&self) -> Value {
        match self {
            HashKey::Int(value) => Value::Int(*value),
            HashKey::Str(value) => Value::Str(Rc::clone(value)),
        }
    }
}

impl Display for HashKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HashKey::Int(value) => write!(f, "{}", value),
            HashKey::Str(value) => write!(f, "{:?}", value.as_ref()),
        }
    }
}

impl Display for Callable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Callable::Unit { name, .. } => write!(f, "<fn {}>", name),
            Callable::Builtin(builtin) => write!(f, "<fn {}>", builtin.name()),
        }
    }
}

/// Untyped rendering, used where no static type is at hand.
impl Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Int(value) => write!(f, "{}", value),
            Value::Char(value) => write!(f, "{}", value),
            Value::Str(value) => write!(f, "{}", value),
            Value::Array(elements) => {
                let elements = elements
                    .iter()
                    .map(|element| element.to_string())
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "[{}]", elements)
            }
            Value::Hash(entries) => {
                let entries = entries
                    .iter()
                    .map(|(key, value)| format!("{}: {}", key, value))
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "{{{}}}", entries)
            }
            Value::Callable(callable) => write!(f, "{}", callable),
            Value::Void => write!(f, "void"),
        }
    }
}
