//! Main code generator module.
//!
//! This module holds the [`Compiler`] state and drives generation of a
//! whole program: one unit per declared function, the global initializer,
//! `main`, one unit per function literal and the entry sequence that ties
//! them together.

use std::rc::Rc;

use rustc_hash::FxHashMap;
use tracing::debug;

use crate::{
    ast::{
        ast::{Expr, Program},
        expressions::FunctionLiteralExpr,
        statements::{BlockStmt, Parameter},
    },
    builtins::Builtin,
    errors::errors::GenerationError,
    type_checker::{
        typed_ast::TypeTable,
        types::{FunctionType, Type},
    },
};

use super::{
    bytecode::{GeneratedProgram, Label, Op, Unit, UnitId},
    stmt::gen_block,
};

/// Storage of a name local to the unit being generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    Argument(usize),
    Local(usize),
}

/// What an identifier refers to at the point of generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolved {
    Slot(Slot),
    Global(usize),
    Function(UnitId),
    Builtin(Builtin),
}

/// Instruction buffer and bookkeeping for the unit currently being generated.
#[derive(Debug)]
pub struct UnitBuilder {
    pub id: UnitId,
    pub name: Rc<str>,
    pub arity: usize,
    pub return_type: Type,
    pub ops: Vec<Op>,
    labels: Vec<Option<usize>>,
    scopes: Vec<FxHashMap<String, Slot>>,
    locals: usize,
    depth: usize,
    /// Top-level declarations of the global initializer become global cells
    is_global_initializer: bool,
}

impl UnitBuilder {
    pub fn new(id: UnitId, name: &str, arity: usize, return_type: Type) -> Self {
        UnitBuilder {
            id,
            name: Rc::from(name),
            arity,
            return_type,
            ops: vec![],
            labels: vec![],
            scopes: vec![],
            locals: 0,
            depth: 0,
            is_global_initializer: false,
        }
    }

    pub fn global_initializer(id: UnitId) -> Self {
        UnitBuilder {
            is_global_initializer: true,
            ..UnitBuilder::new(id, "<globals>", 0, Type::Void)
        }
    }

    /// Appends an instruction, tracking the operand stack depth.
    pub fn emit(&mut self, op: Op) -> Result<(), GenerationError> {
        let (pops, pushes) = op.stack_effect();

        if pops > self.depth {
            return Err(GenerationError::StackImbalance {
                unit: self.name.to_string(),
                expected: pops,
                found: self.depth,
            });
        }

        self.depth = self.depth - pops + pushes;
        self.ops.push(op);
        Ok(())
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn make_label(&mut self) -> Label {
        self.labels.push(None);
        Label(self.labels.len() - 1)
    }

    /// Binds the label to the next instruction emitted.
    pub fn place_label(&mut self, label: Label) {
        if let Some(offset) = self.labels.get_mut(label.0) {
            *offset = Some(self.ops.len());
        }
    }

    pub fn enter_scope(&mut self) {
        self.scopes.push(FxHashMap::default());
    }

    pub fn exit_scope(&mut self) {
        self.scopes.pop();
    }

    pub fn declare_argument(&mut self, name: &str, index: usize) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.to_string(), Slot::Argument(index));
        }
    }

    /// Allocates a fresh local slot for `name` in the innermost scope.
    pub fn declare_local(&mut self, name: &str) -> usize {
        let slot = self.locals;
        self.locals += 1;

        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.to_string(), Slot::Local(slot));
        }
        slot
    }

    /// Whether a declaration here creates a global cell instead of a local.
    pub fn declares_globals(&self) -> bool {
        self.is_global_initializer && self.scopes.is_empty()
    }

    pub fn resolve(&self, name: &str) -> Option<Slot> {
        self.scopes.iter().rev().find_map(|scope| scope.get(name).copied())
    }

    /// Terminates the unit and resolves its labels.
    pub fn finish(mut self) -> Result<Unit, GenerationError> {
        let terminator = if self.return_type.is_void() {
            Op::ReturnVoid
        } else {
            Op::MissingReturn
        };
        self.emit(terminator)?;

        if self.depth != 0 {
            return Err(GenerationError::StackImbalance {
                unit: self.name.to_string(),
                expected: 0,
                found: self.depth,
            });
        }

        let labels = self
            .labels
            .iter()
            .enumerate()
            .map(|(label, offset)| {
                offset.ok_or_else(|| GenerationError::UnplacedLabel {
                    unit: self.name.to_string(),
                    label,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Unit {
            id: self.id,
            name: self.name,
            arity: self.arity,
            locals: self.locals,
            returns_value: !self.return_type.is_void(),
            ops: self.ops,
            labels,
        })
    }
}

/// The code generator.
///
/// One instance generates one program: [`Compiler::compile`] consumes it,
/// so global cells and unit names never leak into a second compilation.
pub struct Compiler<'a> {
    /// Expression types resolved by the type checker
    pub types: &'a TypeTable,
    /// The unit being generated
    pub current: UnitBuilder,

    units: Vec<Option<Unit>>,
    functions: FxHashMap<String, (UnitId, FunctionType)>,
    globals: FxHashMap<String, usize>,
    global_names: Vec<Rc<str>>,
    lambda_count: usize,
}

impl<'a> Compiler<'a> {
    pub fn new(types: &'a TypeTable) -> Self {
        Compiler {
            types,
            current: UnitBuilder::new(0, "<detached>", 0, Type::Void),
            units: vec![],
            functions: FxHashMap::default(),
            globals: FxHashMap::default(),
            global_names: vec![],
            lambda_count: 0,
        }
    }

    pub fn emit(&mut self, op: Op) -> Result<(), GenerationError> {
        self.current.emit(op)
    }

    pub fn type_of(&self, expr: &Expr) -> Result<Type, GenerationError> {
        self.types.type_of(expr).cloned()
    }

    fn reserve_unit(&mut self) -> UnitId {
        self.units.push(None);
        self.units.len() - 1
    }

    /// Generates a unit with `builder` swapped in, restoring the enclosing unit afterwards.
    fn generate_unit(
        &mut self,
        builder: UnitBuilder,
        body: impl FnOnce(&mut Compiler<'a>) -> Result<(), GenerationError>,
    ) -> Result<(), GenerationError> {
        let enclosing = std::mem::replace(&mut self.current, builder);
        let result = body(self);
        let builder = std::mem::replace(&mut self.current, enclosing);
        result?;

        let unit = builder.finish()?;
        debug!(unit = %unit.name, ops = unit.ops.len(), locals = unit.locals, "generated unit");

        let id = unit.id;
        match self.units.get_mut(id) {
            Some(slot) => *slot = Some(unit),
            None => return Err(GenerationError::UnfinishedUnit { unit: id }),
        }
        Ok(())
    }

    /// Generates a callable body: parameters become argument slots of one scope the body shares.
    fn generate_callable(
        &mut self,
        builder: UnitBuilder,
        parameters: &[Parameter],
        body: &BlockStmt,
    ) -> Result<(), GenerationError> {
        self.generate_unit(builder, |compiler| {
            compiler.current.enter_scope();
            for (index, parameter) in parameters.iter().enumerate() {
                compiler.current.declare_argument(&parameter.name, index);
            }
            gen_block(compiler, body)
        })
    }

    /// Compiles a function literal into its own unit and returns the unit's id.
    pub fn gen_function_literal(&mut self, literal: &FunctionLiteralExpr) -> Result<UnitId, GenerationError> {
        let id = self.reserve_unit();
        self.lambda_count += 1;

        let name = format!("<lambda#{}>", self.lambda_count);
        let builder = UnitBuilder::new(
            id,
            &name,
            literal.parameters.len(),
            Type::from(&literal.return_type),
        );

        self.generate_callable(builder, &literal.parameters, &literal.body)?;
        Ok(id)
    }

    /// Resolves a name: locals and arguments of the current unit, then global cells,
    /// then top-level functions, then built-ins.
    pub fn resolve(&self, name: &str) -> Option<Resolved> {
        if let Some(slot) = self.current.resolve(name) {
            return Some(Resolved::Slot(slot));
        }
        if let Some(cell) = self.globals.get(name) {
            return Some(Resolved::Global(*cell));
        }
        if let Some((id, _)) = self.functions.get(name) {
            return Some(Resolved::Function(*id));
        }
        Builtin::from_name(name).map(Resolved::Builtin)
    }

    pub fn function_signature(&self, id: UnitId) -> Option<&FunctionType> {
        self.functions
            .values()
            .find(|(function_id, _)| *function_id == id)
            .map(|(_, signature)| signature)
    }

    pub fn declare_global(&mut self, name: &str) -> usize {
        let cell = self.global_names.len();
        self.global_names.push(Rc::from(name));
        self.globals.insert(name.to_string(), cell);
        cell
    }

    /// Emits the conversion of the value on top of the stack from `from` to `to`.
    ///
    /// Identity needs nothing and a bool is already an int. An int becomes
    /// a bool through `IntToBool`. Anything else is a generation error.
    pub fn convert(&mut self, from: &Type, to: &Type) -> Result<(), GenerationError> {
        match (from, to) {
            _ if from.is_compatible_with(to) => Ok(()),
            (Type::Bool, Type::Int) => Ok(()),
            (Type::Int, Type::Bool) => self.emit(Op::IntToBool),
            _ => Err(GenerationError::UnsupportedConversion {
                from: from.clone(),
                to: to.clone(),
            }),
        }
    }

    /// Generates the whole program.
    ///
    /// The program must have passed semantic analysis with the table this
    /// compiler was built on.
    pub fn compile(mut self, program: &Program) -> Result<GeneratedProgram, GenerationError> {
        for function in &program.functions {
            let id = self.reserve_unit();
            let signature = FunctionType::new(
                function.parameters.iter().map(|parameter| Type::from(&parameter.type_)).collect(),
                Type::from(&function.return_type),
            );

            self.functions.entry(function.name.clone()).or_insert((id, signature));
        }
        let globals_id = self.reserve_unit();
        let main_id = self.reserve_unit();

        // Global cells must exist before any function body refers to them
        self.generate_unit(UnitBuilder::global_initializer(globals_id), |compiler| {
            for stmt in &program.global_statements {
                super::stmt::gen_statement(compiler, stmt)?;
            }
            Ok(())
        })?;

        for (index, function) in program.functions.iter().enumerate() {
            let builder = UnitBuilder::new(
                index,
                &function.name,
                function.parameters.len(),
                Type::from(&function.return_type),
            );
            self.generate_callable(builder, &function.parameters, &function.body)?;
        }

        self.generate_callable(UnitBuilder::new(main_id, "main", 0, Type::Void), &[], &program.main)?;

        let entry_id = self.reserve_unit();
        self.generate_unit(UnitBuilder::new(entry_id, "<entry>", 0, Type::Void), |compiler| {
            compiler.emit(Op::Call { unit: globals_id, arity: 0, returns: false })?;
            compiler.emit(Op::Call { unit: main_id, arity: 0, returns: false })
        })?;

        let units = self
            .units
            .into_iter()
            .enumerate()
            .map(|(id, unit)| unit.ok_or(GenerationError::UnfinishedUnit { unit: id }))
            .collect::<Result<Vec<_>, _>>()?;

        debug!(
            units = units.len(),
            globals = self.global_names.len(),
            "code generation finished"
        );

        Ok(GeneratedProgram {
            units,
            globals: self.global_names,
            entry: entry_id,
        })
    }
}

/// Generates code for a program that passed semantic analysis.
pub fn generate(program: &Program, types: &TypeTable) -> Result<GeneratedProgram, GenerationError> {
    Compiler::new(types).compile(program)
}
