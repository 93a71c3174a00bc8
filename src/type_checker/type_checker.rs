use tracing::debug;

use crate::{
    ast::{
        ast::{Expr, Program, Stmt},
        expressions::{
            ArrayLiteralExpr, BinaryExpr, CallExpr, FunctionLiteralExpr, HashLiteralExpr,
            IndexExpr, SymbolExpr,
        },
        statements::{BlockStmt, IfStmt, Parameter, ReturnStmt, VarDeclStmt},
        types::TypeExpr,
    },
    builtins::Builtin,
    errors::errors::InvariantViolation,
    lexer::tokens::TokenKind,
};

use super::{
    symbol_table::SymbolTable,
    typed_ast::TypeTable,
    types::{FunctionType, Type},
};

/// Semantic analyzer state.
///
/// Diagnostics accumulate in `errors`; analysis never stops at the first
/// one. The only hard failure is misuse of the scope table, which a
/// well-formed walk cannot trigger.
#[derive(Debug)]
pub struct TypeChecker {
    symbols: SymbolTable,
    errors: Vec<String>,
    types: TypeTable,
    current_return_type: Option<Type>,
    is_in_function: bool,
    /// Scope level of the innermost function literal's parameters
    capture_floor: Option<usize>,
}

impl Default for TypeChecker {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeChecker {
    pub fn new() -> Self {
        TypeChecker {
            symbols: SymbolTable::new(),
            errors: vec![],
            types: TypeTable::new(),
            current_return_type: None,
            is_in_function: false,
            capture_floor: None,
        }
    }

    pub fn get_errors(&self) -> &[String] {
        &self.errors
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn get_types(&self) -> &TypeTable {
        &self.types
    }

    pub fn into_types(self) -> TypeTable {
        self.types
    }

    pub fn get_symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    fn report(&mut self, line: u32, message: String) {
        self.errors.push(format!("Line {}: {}", line, message));
    }

    /// Converts an annotation, reporting nested types no value can have:
    /// hash keys other than `int`/`string`, and `void` elements, values or parameters.
    fn resolve_annotation(&mut self, annotation: &TypeExpr, line: u32) -> Type {
        let mut problems = vec![];
        collect_annotation_problems(annotation, &mut problems);

        for problem in problems {
            self.report(line, String::from(problem));
        }

        Type::from(annotation)
    }

    fn resolve_parameter(&mut self, parameter: &Parameter) -> Type {
        let line = parameter.span.line();

        if parameter.type_ == TypeExpr::Void {
            self.report(line, format!("Parameter '{}' cannot be of type void", parameter.name));
        }
        self.resolve_annotation(&parameter.type_, line)
    }

    /// Runs `body` with the function context swapped in, restoring the outer one afterwards.
    fn with_function_context<T>(
        &mut self,
        return_type: Type,
        capture_floor: Option<usize>,
        body: impl FnOnce(&mut TypeChecker) -> Result<T, InvariantViolation>,
    ) -> Result<T, InvariantViolation> {
        let previous_return_type = self.current_return_type.replace(return_type);
        let previous_in_function = std::mem::replace(&mut self.is_in_function, true);
        let previous_floor = std::mem::replace(&mut self.capture_floor, capture_floor);

        let result = body(self);

        self.current_return_type = previous_return_type;
        self.is_in_function = previous_in_function;
        self.capture_floor = previous_floor;

        result
    }

    fn declare_parameters(&mut self, parameters: &[Parameter], types: &[Type]) {
        for (parameter, type_) in parameters.iter().zip(types) {
            if !self.symbols.declare_symbol(&parameter.name, type_.clone(), false, false) {
                self.report(
                    parameter.span.line(),
                    format!("Parameter '{}' is already declared", parameter.name),
                );
            }
        }
    }
}

fn collect_annotation_problems(annotation: &TypeExpr, problems: &mut Vec<&'static str>) {
    match annotation {
        TypeExpr::Array(element) => {
            if **element == TypeExpr::Void {
                problems.push("Array element type cannot be void");
            }
            collect_annotation_problems(element, problems);
        }
        TypeExpr::Hash(key, value) => {
            if !matches!(key.as_ref(), TypeExpr::Int | TypeExpr::String) {
                problems.push("Hash key type must be int or string");
            }
            if **value == TypeExpr::Void {
                problems.push("Hash value type cannot be void");
            }
            collect_annotation_problems(key, problems);
            collect_annotation_problems(value, problems);
        }
        TypeExpr::Function(parameters, return_type) => {
            for parameter in parameters {
                if *parameter == TypeExpr::Void {
                    problems.push("Parameter type cannot be void");
                }
                collect_annotation_problems(parameter, problems);
            }
            collect_annotation_problems(return_type, problems);
        }
        _ => {}
    }
}

/// Whether every path through the block ends in a `return`.
pub fn block_always_returns(block: &BlockStmt) -> bool {
    block.iter().any(|stmt| match stmt {
        Stmt::Return(_) => true,
        Stmt::Block(inner) => block_always_returns(inner),
        Stmt::If(if_stmt) => match &if_stmt.alternate {
            Some(alternate) => {
                block_always_returns(&if_stmt.consequent) && block_always_returns(alternate)
            }
            None => false,
        },
        _ => false,
    })
}

/// Type checks an expression and records its type in the table.
///
/// `expected` is the type the surrounding context wants, if any. Empty
/// array and hash literals adopt it, and operators that fail to type check
/// fall back to it so that one mistake yields one diagnostic.
pub fn type_check_expr(
    type_checker: &mut TypeChecker,
    expr: &Expr,
    expected: Option<&Type>,
) -> Result<Type, InvariantViolation> {
    let type_ = match expr {
        Expr::Number(_) => Type::Int,
        Expr::String(_) => Type::String,
        Expr::Char(_) => Type::Char,
        Expr::Bool(_) => Type::Bool,
        Expr::Symbol(symbol) => type_check_symbol(type_checker, symbol),
        Expr::Binary(binary) => type_check_binary(type_checker, binary, expected)?,
        Expr::Array(array) => type_check_array(type_checker, array, expected)?,
        Expr::Hash(hash) => type_check_hash(type_checker, hash, expected)?,
        Expr::Function(function) => type_check_function_literal(type_checker, function)?,
        Expr::Index(index) => type_check_index(type_checker, index)?,
        Expr::Call(call) => type_check_call(type_checker, call)?,
    };

    type_checker.types.record(expr.get_id(), type_.clone());
    Ok(type_)
}

fn type_check_symbol(type_checker: &mut TypeChecker, symbol: &SymbolExpr) -> Type {
    let line = symbol.span.line();

    let Some(found) = type_checker.symbols.lookup_symbol(&symbol.value) else {
        type_checker.report(line, format!("Undeclared identifier '{}'", symbol.value));
        return Type::Void;
    };

    let found_type = found.type_.clone();
    let found_level = found.scope_level;

    if let Some(floor) = type_checker.capture_floor {
        if found_level > 0 && found_level < floor {
            type_checker.report(
                line,
                format!("Function literal cannot capture local '{}'", symbol.value),
            );
        }
    }

    found_type
}

fn type_check_binary(
    type_checker: &mut TypeChecker,
    binary: &BinaryExpr,
    expected: Option<&Type>,
) -> Result<Type, InvariantViolation> {
    let left = type_check_expr(type_checker, &binary.left, None)?;
    let right = type_check_expr(type_checker, &binary.right, None)?;
    let line = binary.span.line();
    let operator = binary.operator.value.as_str();
    let fallback = |default: Type| expected.cloned().unwrap_or(default);

    let type_ = match binary.operator.kind {
        TokenKind::Plus => match (&left, &right) {
            (Type::Int, Type::Int) => Type::Int,
            (Type::String, Type::String) => Type::String,
            _ => {
                type_checker.report(line, format!(
                    "Operator '+' requires both operands to be int or both to be string. Got {} and {}",
                    left, right
                ));
                fallback(Type::Int)
            }
        },
        TokenKind::Dash => {
            if left == Type::Int && right == Type::Int {
                Type::Int
            } else {
                type_checker.report(line, format!(
                    "Operator '-' requires both operands to be int. Got {} and {}",
                    left, right
                ));
                fallback(Type::Int)
            }
        }
        TokenKind::Star | TokenKind::Slash => {
            if left == Type::Int && right == Type::Int {
                Type::Int
            } else {
                type_checker.report(line, format!(
                    "Multiplication/division requires both operands to be int. Got {} and {}",
                    left, right
                ));
                fallback(Type::Int)
            }
        }
        TokenKind::Equals
        | TokenKind::NotEquals
        | TokenKind::Less
        | TokenKind::LessEquals
        | TokenKind::Greater
        | TokenKind::GreaterEquals
            if left.is_void() || right.is_void() =>
        {
            type_checker.report(line, format!(
                "Operator '{}' cannot compare values of type void",
                operator
            ));
            Type::Bool
        }
        TokenKind::Equals | TokenKind::NotEquals => {
            if !left.is_compatible_with(&right) {
                type_checker.report(line, format!(
                    "Type mismatch in relational operation '{}'. Cannot compare {} with {}",
                    operator, left, right
                ));
            }
            Type::Bool
        }
        TokenKind::Less | TokenKind::LessEquals | TokenKind::Greater | TokenKind::GreaterEquals => {
            if !left.is_compatible_with(&right) {
                type_checker.report(line, format!(
                    "Type mismatch in relational operation '{}'. Cannot compare {} with {}",
                    operator, left, right
                ));
            } else if !left.is_ordered() {
                type_checker.report(line, format!(
                    "Operator '{}' cannot order values of type {}",
                    operator, left
                ));
            }
            Type::Bool
        }
        _ => {
            type_checker.report(line, format!("Unknown binary operator '{}'", operator));
            fallback(Type::Void)
        }
    };

    Ok(type_)
}

fn type_check_array(
    type_checker: &mut TypeChecker,
    array: &ArrayLiteralExpr,
    expected: Option<&Type>,
) -> Result<Type, InvariantViolation> {
    let expected_element = match expected {
        Some(Type::Array(element)) => Some(element.as_ref().clone()),
        _ => None,
    };

    let Some((first, rest)) = array.elements.split_first() else {
        return Ok(Type::array_of(expected_element.unwrap_or(Type::Int)));
    };

    let element_type = type_check_expr(type_checker, first, expected_element.as_ref())?;

    // A `void` element annotation has been reported already
    if element_type.is_void() && expected_element != Some(Type::Void) {
        type_checker.report(array.span.line(), String::from("Array elements cannot be of type void"));
    }

    for element in rest {
        let found = type_check_expr(type_checker, element, Some(&element_type))?;

        if !element_type.is_void() && !element_type.is_compatible_with(&found) {
            type_checker.report(array.span.line(), format!(
                "Array elements must have the same type. Expected {}, got {}",
                element_type, found
            ));
        }
    }

    Ok(Type::array_of(element_type))
}

fn type_check_hash(
    type_checker: &mut TypeChecker,
    hash: &HashLiteralExpr,
    expected: Option<&Type>,
) -> Result<Type, InvariantViolation> {
    let (expected_key, expected_value) = match expected {
        Some(Type::Hash(key, value)) => (Some(key.as_ref().clone()), Some(value.as_ref().clone())),
        _ => (None, None),
    };
    let line = hash.span.line();

    let Some(((first_key, first_value), rest)) = hash.entries.split_first() else {
        return Ok(Type::hash_of(
            expected_key.unwrap_or(Type::Int),
            expected_value.unwrap_or(Type::Int),
        ));
    };

    let key_type = type_check_expr(type_checker, first_key, expected_key.as_ref())?;
    let value_type = type_check_expr(type_checker, first_value, expected_value.as_ref())?;

    if !key_type.is_hash_key() {
        type_checker.report(line, String::from("Hash keys must be int or string"));
    }
    if value_type.is_void() && expected_value != Some(Type::Void) {
        type_checker.report(line, String::from("Hash values cannot be of type void"));
    }

    for (key, value) in rest {
        let found_key = type_check_expr(type_checker, key, Some(&key_type))?;
        let found_value = type_check_expr(type_checker, value, Some(&value_type))?;

        if !key_type.is_compatible_with(&found_key) {
            type_checker.report(line, format!(
                "Hash key type mismatch. Expected {}, got {}",
                key_type, found_key
            ));
        }

        if !value_type.is_void() && !value_type.is_compatible_with(&found_value) {
            type_checker.report(line, format!(
                "Hash value type mismatch. Expected {}, got {}",
                value_type, found_value
            ));
        }
    }

    Ok(Type::hash_of(key_type, value_type))
}

fn type_check_function_literal(
    type_checker: &mut TypeChecker,
    function: &FunctionLiteralExpr,
) -> Result<Type, InvariantViolation> {
    let line = function.span.line();
    let return_type = type_checker.resolve_annotation(&function.return_type, line);
    let parameter_types: Vec<Type> = function
        .parameters
        .iter()
        .map(|parameter| type_checker.resolve_parameter(parameter))
        .collect();

    type_checker.symbols.enter_scope();
    let floor = type_checker.symbols.current_level();

    type_checker.with_function_context(return_type.clone(), Some(floor), |type_checker| {
        type_checker.declare_parameters(&function.parameters, &parameter_types);
        type_check_block(type_checker, &function.body)
    })?;

    type_checker.symbols.exit_scope()?;

    if !return_type.is_void() && !block_always_returns(&function.body) {
        type_checker.report(
            line,
            format!("Function literal must return a value of type {}", return_type),
        );
    }

    Ok(Type::Function(FunctionType::new(parameter_types, return_type)))
}

fn type_check_index(type_checker: &mut TypeChecker, index: &IndexExpr) -> Result<Type, InvariantViolation> {
    let target = type_check_expr(type_checker, &index.target, None)?;
    let line = index.span.line();

    match target {
        Type::Array(element) => {
            let index_type = type_check_expr(type_checker, &index.index, Some(&Type::Int))?;

            if index_type != Type::Int {
                type_checker.report(line, format!("Array index must be int, got {}", index_type));
            }
            Ok(*element)
        }
        Type::Hash(key, value) => {
            let index_type = type_check_expr(type_checker, &index.index, Some(&key))?;

            if !key.is_compatible_with(&index_type) {
                type_checker.report(line, format!(
                    "Hash key type mismatch. Expected {}, got {}",
                    key, index_type
                ));
            }
            Ok(*value)
        }
        other => {
            type_check_expr(type_checker, &index.index, None)?;
            type_checker.report(line, format!("Cannot index type {}", other));
            Ok(Type::Void)
        }
    }
}

/// The built-in a call goes to, if its callee is an unshadowed built-in name.
pub fn builtin_callee(symbols: &SymbolTable, callee: &Expr) -> Option<Builtin> {
    let Expr::Symbol(symbol) = callee else {
        return None;
    };

    let builtin = Builtin::from_name(&symbol.value)?;
    let found = symbols.lookup_symbol(&symbol.value)?;

    (found.is_function && found.scope_level == 0 && found.type_ == builtin.signature()).then_some(builtin)
}

fn type_check_call(type_checker: &mut TypeChecker, call: &CallExpr) -> Result<Type, InvariantViolation> {
    let line = call.span.line();

    if let Some(builtin) = builtin_callee(&type_checker.symbols, &call.callee) {
        type_check_expr(type_checker, &call.callee, None)?;

        let mut arguments: Vec<Type> = vec![];
        for argument in &call.arguments {
            let expected = match (builtin, arguments.first()) {
                (Builtin::Push, Some(Type::Array(element))) => Some(element.as_ref().clone()),
                _ => None,
            };
            arguments.push(type_check_expr(type_checker, argument, expected.as_ref())?);
        }

        return match builtin.check_call(&arguments) {
            Ok(result) => Ok(result),
            Err(message) => {
                type_checker.report(line, message);
                Ok(match (builtin, arguments.first()) {
                    (Builtin::First | Builtin::Last, Some(Type::Array(element))) => *element.clone(),
                    (Builtin::Len, _) => Type::Int,
                    (Builtin::First | Builtin::Last, _) => Type::Int,
                    _ => Type::array_of(Type::Int),
                })
            }
        };
    }

    let callee = type_check_expr(type_checker, &call.callee, None)?;

    let Type::Function(function) = callee else {
        for argument in &call.arguments {
            type_check_expr(type_checker, argument, None)?;
        }
        type_checker.report(line, format!("Cannot call non-function type {}", callee));
        return Ok(Type::Void);
    };

    let mut arguments = vec![];
    for (position, argument) in call.arguments.iter().enumerate() {
        arguments.push(type_check_expr(type_checker, argument, function.parameters.get(position))?);
    }

    if arguments.len() != function.arity() {
        type_checker.report(line, format!(
            "Function expects {} arguments, got {}",
            function.arity(),
            arguments.len()
        ));
    } else {
        for (position, (parameter, argument)) in function.parameters.iter().zip(&arguments).enumerate() {
            if !parameter.is_compatible_with(argument) {
                type_checker.report(line, format!(
                    "Argument {} type mismatch. Expected {}, got {}",
                    position + 1,
                    parameter,
                    argument
                ));
            }
        }
    }

    Ok(*function.return_type)
}

fn type_check_var_decl(type_checker: &mut TypeChecker, decl: &VarDeclStmt) -> Result<(), InvariantViolation> {
    let line = decl.span.line();
    let declared = type_checker.resolve_annotation(&decl.explicit_type, line);
    let found = type_check_expr(type_checker, &decl.assigned_value, Some(&declared))?;

    if declared.is_void() {
        type_checker.report(line, format!("Cannot declare '{}' of type void", decl.identifier));
    } else if !declared.is_compatible_with(&found) {
        let kind = if decl.constant { "const declaration" } else { "declaration" };
        type_checker.report(line, format!(
            "Type mismatch in {} of '{}'. Expected {}, got {}",
            kind, decl.identifier, declared, found
        ));
    }

    if !type_checker.symbols.declare_symbol(&decl.identifier, declared, decl.constant, false) {
        let kind = if decl.constant { "Constant" } else { "Variable" };
        type_checker.report(line, format!(
            "{} '{}' is already declared in this scope",
            kind, decl.identifier
        ));
    }

    Ok(())
}

fn type_check_return(type_checker: &mut TypeChecker, stmt: &ReturnStmt) -> Result<(), InvariantViolation> {
    let line = stmt.span.line();

    if !type_checker.is_in_function {
        type_checker.report(line, String::from("Return statement outside of function"));
        return Ok(());
    }

    let return_type = type_checker.current_return_type.clone().unwrap_or(Type::Void);

    match &stmt.value {
        Some(value) => {
            let found = type_check_expr(type_checker, value, Some(&return_type))?;

            if !return_type.is_compatible_with(&found) {
                type_checker.report(line, format!(
                    "Return type mismatch. Expected {}, got {}",
                    return_type, found
                ));
            }
        }
        None => {
            if !return_type.is_void() {
                type_checker.report(line, format!(
                    "Function must return a value of type {}",
                    return_type
                ));
            }
        }
    }

    Ok(())
}

fn type_check_if(type_checker: &mut TypeChecker, stmt: &IfStmt) -> Result<(), InvariantViolation> {
    let condition = type_check_expr(type_checker, &stmt.condition, Some(&Type::Bool))?;

    if condition != Type::Bool {
        type_checker.report(
            stmt.span.line(),
            format!("If condition must be of type bool, got {}", condition),
        );
    }

    type_checker.symbols.enter_scope();
    type_check_block(type_checker, &stmt.consequent)?;
    type_checker.symbols.exit_scope()?;

    if let Some(alternate) = &stmt.alternate {
        type_checker.symbols.enter_scope();
        type_check_block(type_checker, alternate)?;
        type_checker.symbols.exit_scope()?;
    }

    Ok(())
}

pub fn type_check_stmt(type_checker: &mut TypeChecker, stmt: &Stmt) -> Result<(), InvariantViolation> {
    match stmt {
        Stmt::VarDecl(decl) => type_check_var_decl(type_checker, decl),
        Stmt::Return(ret) => type_check_return(type_checker, ret),
        Stmt::Expression(expression) => {
            type_check_expr(type_checker, &expression.expression, None)?;
            Ok(())
        }
        Stmt::If(if_stmt) => type_check_if(type_checker, if_stmt),
        Stmt::Print(print) => {
            let printed = type_check_expr(type_checker, &print.value, None)?;

            if printed.is_void() {
                type_checker.report(print.span.line(), String::from("Cannot print a value of type void"));
            }
            Ok(())
        }
        // Plain blocks share the enclosing scope
        Stmt::Block(block) => type_check_block(type_checker, block),
    }
}

pub fn type_check_block(type_checker: &mut TypeChecker, block: &BlockStmt) -> Result<(), InvariantViolation> {
    for stmt in block.iter() {
        type_check_stmt(type_checker, stmt)?;
    }

    Ok(())
}

/// Analyzes a whole program.
///
/// Function signatures are declared first, so bodies may call any function
/// regardless of declaration order. Then come the global statements, the
/// function bodies in declaration order, and finally `main`.
pub fn type_check(program: &Program) -> Result<TypeChecker, InvariantViolation> {
    let mut type_checker = TypeChecker::new();

    // Signature phase
    let mut signatures = vec![];
    for function in &program.functions {
        let line = function.span.line();
        let return_type = type_checker.resolve_annotation(&function.return_type, line);
        let parameters: Vec<Type> = function
            .parameters
            .iter()
            .map(|parameter| type_checker.resolve_parameter(parameter))
            .collect();
        let signature = FunctionType::new(parameters, return_type);

        if !type_checker.symbols.declare_symbol(&function.name, Type::Function(signature.clone()), false, true) {
            type_checker.report(line, format!(
                "Function '{}' is already declared in this scope",
                function.name
            ));
        }

        signatures.push(signature);
    }
    debug!(functions = signatures.len(), "declared function signatures");

    // Body phase
    for stmt in &program.global_statements {
        type_check_stmt(&mut type_checker, stmt)?;
    }

    for (function, signature) in program.functions.iter().zip(signatures) {
        type_checker.symbols.enter_scope();

        let FunctionType { parameters, return_type } = signature;
        type_checker.with_function_context(*return_type.clone(), None, |type_checker| {
            type_checker.declare_parameters(&function.parameters, &parameters);
            type_check_block(type_checker, &function.body)
        })?;

        type_checker.symbols.exit_scope()?;

        if !return_type.is_void() && !block_always_returns(&function.body) {
            type_checker.report(function.span.line(), format!(
                "Function '{}' must return a value of type {}",
                function.name, return_type
            ));
        }
    }

    type_checker.symbols.enter_scope();
    type_checker.with_function_context(Type::Void, None, |type_checker| {
        type_check_block(type_checker, &program.main)
    })?;
    type_checker.symbols.exit_scope()?;

    debug!(
        errors = type_checker.errors.len(),
        typed_nodes = type_checker.types.len(),
        "semantic analysis finished"
    );

    Ok(type_checker)
}
