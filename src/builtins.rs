//! Built-in functions: `len`, `first`, `last`, `rest` and `push`.
//!
//! Each built-in has two typings. Registered in the global scope it carries
//! a monomorphic `array<int>` signature, which is its type as a first-class
//! value. A direct call is checked parametrically by [`Builtin::check_call`],
//! so `first` works on any array and `len` also accepts strings.

use std::rc::Rc;

use crate::{
    errors::errors::RuntimeFault,
    type_checker::types::Type,
    vm::value::Value,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Builtin {
    Len,
    First,
    Last,
    Rest,
    Push,
}

impl Builtin {
    pub const ALL: [Builtin; 5] = [
        Builtin::Len,
        Builtin::First,
        Builtin::Last,
        Builtin::Rest,
        Builtin::Push,
    ];

    pub fn from_name(name: &str) -> Option<Builtin> {
        Builtin::ALL.into_iter().find(|builtin| builtin.name() == name)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Builtin::Len => "len",
            Builtin::First => "first",
            Builtin::Last => "last",
            Builtin::Rest => "rest",
            Builtin::Push => "push",
        }
    }

    pub fn arity(&self) -> usize {
        match self {
            Builtin::Push => 2,
            _ => 1,
        }
    }

    /// Monomorphic signature over `array<int>`.
    pub fn signature(&self) -> Type {
        let int_array = Type::array_of(Type::Int);

        match self {
            Builtin::Len => Type::function(vec![int_array], Type::Int),
            Builtin::First | Builtin::Last => Type::function(vec![int_array], Type::Int),
            Builtin::Rest => Type::function(vec![int_array.clone()], int_array),
            Builtin::Push => Type::function(vec![int_array.clone(), Type::Int], int_array),
        }
    }

    /// Result type of a direct call with the given argument types.
    ///
    /// The error is the diagnostic message, without the line prefix.
    pub fn check_call(&self, arguments: &[Type]) -> Result<Type, String> {
        if arguments.len() != self.arity() {
            return Err(format!(
                "Function expects {} arguments, got {}",
                self.arity(),
                arguments.len()
            ));
        }

        match (self, &arguments[0]) {
            (Builtin::Len, Type::Array(_) | Type::String) => Ok(Type::Int),
            (Builtin::Len, other) => Err(format!(
                "Argument 1 type mismatch. Expected array or string, got {}",
                other
            )),
            (Builtin::First | Builtin::Last, Type::Array(element)) => Ok(element.as_ref().clone()),
            (Builtin::Rest, Type::Array(_)) => Ok(arguments[0].clone()),
            (Builtin::Push, Type::Array(element)) => {
                if element.is_compatible_with(&arguments[1]) {
                    Ok(arguments[0].clone())
                } else {
                    Err(format!(
                        "Argument 2 type mismatch. Expected {}, got {}",
                        element, arguments[1]
                    ))
                }
            }
            (_, other) => Err(format!(
                "Argument 1 type mismatch. Expected array, got {}",
                other
            )),
        }
    }

    /// Runs the built-in. `push` and `rest` build new arrays and leave the argument untouched.
    pub fn apply(&self, mut arguments: Vec<Value>) -> Result<Value, RuntimeFault> {
        if arguments.len() != self.arity() {
            return Err(RuntimeFault::ArityMismatch {
                expected: self.arity(),
                received: arguments.len(),
            });
        }

        let pushed = if *self == Builtin::Push { arguments.pop() } else { None };
        let target = arguments.swap_remove(0);

        match (self, target) {
            (Builtin::Len, Value::Array(elements)) => Ok(Value::Int(elements.len() as i64)),
            (Builtin::Len, Value::Str(string)) => Ok(Value::Int(string.chars().count() as i64)),
            (Builtin::First, Value::Array(elements)) => elements
                .first()
                .cloned()
                .ok_or_else(|| self.empty_array()),
            (Builtin::Last, Value::Array(elements)) => elements
                .last()
                .cloned()
                .ok_or_else(|| self.empty_array()),
            (Builtin::Rest, Value::Array(elements)) => {
                let rest = elements.iter().skip(1).cloned().collect::<Vec<_>>();
                Ok(Value::Array(Rc::new(rest)))
            }
            (Builtin::Push, Value::Array(elements)) => {
                let mut extended = elements.as_ref().clone();
                extended.extend(pushed);
                Ok(Value::Array(Rc::new(extended)))
            }
            (_, other) => Err(RuntimeFault::OperandMismatch {
                expected: String::from("array"),
                found: other.kind().to_string(),
            }),
        }
    }

    fn empty_array(&self) -> RuntimeFault {
        RuntimeFault::EmptyArray {
            builtin: self.name().to_string(),
        }
    }
}
