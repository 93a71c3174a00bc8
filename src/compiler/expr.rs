use std::rc::Rc;

use crate::{
    ast::{
        ast::Expr,
        expressions::{ArrayLiteralExpr, BinaryExpr, CallExpr, HashLiteralExpr, IndexExpr},
    },
    errors::errors::GenerationError,
    lexer::tokens::TokenKind,
    type_checker::types::Type,
};

use super::{
    bytecode::{Comparison, Op, OperandKind},
    compiler::{Compiler, Resolved, Slot},
};

/// Generates an expression and returns its type.
///
/// The code leaves exactly one value on the operand stack, or none when
/// the type is `void`.
pub fn gen_expression<'a>(compiler: &mut Compiler<'a>, expr: &Expr) -> Result<Type, GenerationError> {
    let type_ = compiler.type_of(expr)?;
    let depth = compiler.current.depth();

    match expr {
        Expr::Number(number) => compiler.emit(Op::PushInt(number.value))?,
        Expr::String(string) => compiler.emit(Op::PushStr(Rc::from(string.value.as_str())))?,
        Expr::Char(character) => compiler.emit(Op::PushChar(character.value))?,
        Expr::Bool(boolean) => compiler.emit(Op::PushInt(boolean.value as i64))?,
        Expr::Symbol(symbol) => gen_load(compiler, &symbol.value)?,
        Expr::Binary(binary) => gen_binary(compiler, binary)?,
        Expr::Array(array) => gen_array(compiler, array, &type_)?,
        Expr::Hash(hash) => gen_hash(compiler, hash, &type_)?,
        Expr::Function(function) => {
            let unit = compiler.gen_function_literal(function)?;
            compiler.emit(Op::PushUnit(unit))?;
        }
        Expr::Index(index) => gen_index(compiler, index)?,
        Expr::Call(call) => gen_call(compiler, call, &type_)?,
    }

    let expected = depth + !type_.is_void() as usize;
    if compiler.current.depth() != expected {
        return Err(GenerationError::StackImbalance {
            unit: compiler.current.name.to_string(),
            expected,
            found: compiler.current.depth(),
        });
    }

    Ok(type_)
}

fn gen_load<'a>(compiler: &mut Compiler<'a>, name: &str) -> Result<(), GenerationError> {
    let op = match compiler.resolve(name) {
        Some(Resolved::Slot(Slot::Argument(index))) => Op::LoadArg(index),
        Some(Resolved::Slot(Slot::Local(slot))) => Op::LoadLocal(slot),
        Some(Resolved::Global(cell)) => Op::LoadGlobal(cell),
        Some(Resolved::Function(unit)) => Op::PushUnit(unit),
        Some(Resolved::Builtin(builtin)) => Op::PushBuiltin(builtin),
        None => {
            return Err(GenerationError::UnresolvedVariable {
                name: name.to_string(),
            })
        }
    };

    compiler.emit(op)
}

fn comparison_for(kind: TokenKind) -> Option<Comparison> {
    match kind {
        TokenKind::Equals => Some(Comparison::Equal),
        TokenKind::NotEquals => Some(Comparison::NotEqual),
        TokenKind::Less => Some(Comparison::Less),
        TokenKind::LessEquals => Some(Comparison::LessEqual),
        TokenKind::Greater => Some(Comparison::Greater),
        TokenKind::GreaterEquals => Some(Comparison::GreaterEqual),
        _ => None,
    }
}

fn gen_binary<'a>(compiler: &mut Compiler<'a>, binary: &BinaryExpr) -> Result<(), GenerationError> {
    let operand = gen_expression(compiler, &binary.left)?;
    gen_expression(compiler, &binary.right)?;

    let unsupported = || GenerationError::UnsupportedOperator {
        operator: binary.operator.value.clone(),
        operand: operand.clone(),
    };

    if let Some(comparison) = comparison_for(binary.operator.kind) {
        let kind = match operand {
            Type::Int | Type::Bool => OperandKind::Int,
            Type::Char => OperandKind::Char,
            Type::String => OperandKind::Str,
            Type::Array(_) | Type::Hash(..) | Type::Function(_) if !comparison.is_ordering() => {
                OperandKind::Structural
            }
            _ => return Err(unsupported()),
        };

        return compiler.emit(Op::Compare(comparison, kind));
    }

    let op = match (binary.operator.kind, &operand) {
        (TokenKind::Plus, Type::Int) => Op::AddInt,
        (TokenKind::Plus, Type::String) => Op::Concat,
        (TokenKind::Dash, Type::Int) => Op::SubInt,
        (TokenKind::Star, Type::Int) => Op::MulInt,
        (TokenKind::Slash, Type::Int) => Op::DivInt,
        _ => return Err(unsupported()),
    };

    compiler.emit(op)
}

/// Allocates the array, then stores each element at its index.
fn gen_array<'a>(compiler: &mut Compiler<'a>, array: &ArrayLiteralExpr, type_: &Type) -> Result<(), GenerationError> {
    let Type::Array(element_type) = type_ else {
        return Err(GenerationError::UnsupportedConversion {
            from: type_.clone(),
            to: Type::array_of(Type::Void),
        });
    };

    compiler.emit(Op::NewArray(array.elements.len()))?;

    for (index, element) in array.elements.iter().enumerate() {
        let found = gen_expression(compiler, element)?;
        compiler.convert(&found, element_type)?;
        compiler.emit(Op::SetElement(index))?;
    }

    Ok(())
}

/// Allocates an empty map, then inserts the entries in source order.
fn gen_hash<'a>(compiler: &mut Compiler<'a>, hash: &HashLiteralExpr, type_: &Type) -> Result<(), GenerationError> {
    let Type::Hash(key_type, value_type) = type_ else {
        return Err(GenerationError::UnsupportedConversion {
            from: type_.clone(),
            to: Type::hash_of(Type::Void, Type::Void),
        });
    };

    compiler.emit(Op::NewHash)?;

    for (key, value) in &hash.entries {
        let found_key = gen_expression(compiler, key)?;
        compiler.convert(&found_key, key_type)?;

        let found_value = gen_expression(compiler, value)?;
        compiler.convert(&found_value, value_type)?;

        compiler.emit(Op::InsertEntry)?;
    }

    Ok(())
}

fn gen_index<'a>(compiler: &mut Compiler<'a>, index: &IndexExpr) -> Result<(), GenerationError> {
    let target = gen_expression(compiler, &index.target)?;
    let key = gen_expression(compiler, &index.index)?;

    match &target {
        Type::Array(_) => {
            compiler.convert(&key, &Type::Int)?;
            compiler.emit(Op::IndexArray)
        }
        Type::Hash(key_type, _) => {
            compiler.convert(&key, key_type)?;
            compiler.emit(Op::IndexHash)
        }
        _ => Err(GenerationError::InvalidIndexTarget { target }),
    }
}

fn gen_arguments<'a>(compiler: &mut Compiler<'a>, arguments: &[Expr], parameters: &[Type]) -> Result<(), GenerationError> {
    for (argument, parameter) in arguments.iter().zip(parameters) {
        let found = gen_expression(compiler, argument)?;
        compiler.convert(&found, parameter)?;
    }

    Ok(())
}

/// Direct call for top-level functions and built-ins named at the call site,
/// indirect invocation through a callable reference for everything else.
fn gen_call<'a>(compiler: &mut Compiler<'a>, call: &CallExpr, type_: &Type) -> Result<(), GenerationError> {
    let returns = !type_.is_void();
    let arity = call.arguments.len();

    let direct = match call.callee.as_ref() {
        Expr::Symbol(symbol) => match compiler.resolve(&symbol.value) {
            Some(resolved @ (Resolved::Function(_) | Resolved::Builtin(_))) => {
                Some((symbol.value.as_str(), resolved))
            }
            _ => None,
        },
        _ => None,
    };

    match direct {
        Some((name, Resolved::Function(unit))) => {
            let parameters = compiler
                .function_signature(unit)
                .map(|signature| signature.parameters.clone())
                .ok_or_else(|| GenerationError::UnresolvedVariable { name: name.to_string() })?;

            if parameters.len() != arity {
                return Err(GenerationError::ArityMismatch {
                    function: name.to_string(),
                    expected: parameters.len(),
                    received: arity,
                });
            }

            gen_arguments(compiler, &call.arguments, &parameters)?;
            compiler.emit(Op::Call { unit, arity, returns })
        }
        Some((name, Resolved::Builtin(builtin))) => {
            if builtin.arity() != arity {
                return Err(GenerationError::ArityMismatch {
                    function: name.to_string(),
                    expected: builtin.arity(),
                    received: arity,
                });
            }

            // Built-ins are typed per call, so arguments keep their own types
            for argument in &call.arguments {
                gen_expression(compiler, argument)?;
            }
            compiler.emit(Op::CallBuiltin(builtin))
        }
        _ => {
            let callee = gen_expression(compiler, &call.callee)?;
            let Type::Function(signature) = callee else {
                return Err(GenerationError::InvalidCallee { callee });
            };

            if signature.arity() != arity {
                return Err(GenerationError::ArityMismatch {
                    function: signature.to_string(),
                    expected: signature.arity(),
                    received: arity,
                });
            }

            gen_arguments(compiler, &call.arguments, &signature.parameters)?;
            compiler.emit(Op::CallIndirect { arity, returns })
        }
    }
}
