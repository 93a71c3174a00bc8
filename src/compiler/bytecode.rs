//! Instruction set and program layout of the Monkey stack machine.

use std::{fmt::Display, rc::Rc};

use crate::{builtins::Builtin, type_checker::types::Type};

/// Index of a callable unit inside a [`GeneratedProgram`].
pub type UnitId = usize;

/// A jump target, resolved through the owning unit's label table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Label(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Equal,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
}

impl Comparison {
    pub fn is_ordering(&self) -> bool {
        !matches!(self, Comparison::Equal | Comparison::NotEqual)
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Comparison::Equal => "==",
            Comparison::NotEqual => "!=",
            Comparison::Less => "<",
            Comparison::LessEqual => "<=",
            Comparison::Greater => ">",
            Comparison::GreaterEqual => ">=",
        }
    }
}

/// How a comparison reads its operands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperandKind {
    /// Ints and bools
    Int,
    Char,
    Str,
    /// Arrays, hashes and callables, equality only
    Structural,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Op {
    PushInt(i64),
    PushChar(char),
    PushStr(Rc<str>),
    /// Pushes a reference to a unit
    PushUnit(UnitId),
    PushBuiltin(Builtin),

    LoadArg(usize),
    LoadLocal(usize),
    StoreLocal(usize),
    LoadGlobal(usize),
    StoreGlobal(usize),
    Pop,

    AddInt,
    SubInt,
    MulInt,
    DivInt,
    Concat,
    Compare(Comparison, OperandKind),
    IntToBool,
    Not,

    Jump(Label),
    /// Pops a bool and jumps when it is true
    JumpIf(Label),

    /// Allocates an array of the given length, every slot `Void`
    NewArray(usize),
    /// `[array, value] -> [array]` with `value` stored at the index
    SetElement(usize),
    NewHash,
    /// `[hash, key, value] -> [hash]`
    InsertEntry,
    IndexArray,
    IndexHash,

    Call { unit: UnitId, arity: usize, returns: bool },
    /// `[callee, args..] -> [result?]`
    CallIndirect { arity: usize, returns: bool },
    CallBuiltin(Builtin),
    Return,
    ReturnVoid,

    /// Writes the popped value, formatted for its static type, as one line
    Print(Type),
    /// Placed at the end of non-void units, faults if reached
    MissingReturn,
}

impl Op {
    /// `(pops, pushes)` of the instruction.
    pub fn stack_effect(&self) -> (usize, usize) {
        match self {
            Op::PushInt(_)
            | Op::PushChar(_)
            | Op::PushStr(_)
            | Op::PushUnit(_)
            | Op::PushBuiltin(_)
            | Op::LoadArg(_)
            | Op::LoadLocal(_)
            | Op::LoadGlobal(_)
            | Op::NewArray(_)
            | Op::NewHash => (0, 1),
            Op::StoreLocal(_) | Op::StoreGlobal(_) | Op::Pop | Op::JumpIf(_) | Op::Print(_) | Op::Return => (1, 0),
            Op::AddInt
            | Op::SubInt
            | Op::MulInt
            | Op::DivInt
            | Op::Concat
            | Op::Compare(..)
            | Op::SetElement(_)
            | Op::IndexArray
            | Op::IndexHash => (2, 1),
            Op::IntToBool | Op::Not => (1, 1),
            Op::InsertEntry => (3, 1),
            Op::Jump(_) | Op::ReturnVoid | Op::MissingReturn => (0, 0),
            Op::Call { arity, returns, .. } => (*arity, *returns as usize),
            Op::CallIndirect { arity, returns } => (arity + 1, *returns as usize),
            Op::CallBuiltin(builtin) => (builtin.arity(), 1),
        }
    }
}

/// One independently invokable piece of code.
#[derive(Debug, Clone)]
pub struct Unit {
    pub id: UnitId,
    pub name: Rc<str>,
    pub arity: usize,
    /// Number of local slots a frame of this unit needs
    pub locals: usize,
    pub returns_value: bool,
    pub ops: Vec<Op>,
    /// Instruction offset of each label
    pub labels: Vec<usize>,
}

impl Unit {
    pub fn label_offset(&self, label: Label) -> Option<usize> {
        self.labels.get(label.0).copied()
    }
}

/// Output of code generation, ready to hand to the VM.
#[derive(Debug, Clone)]
pub struct GeneratedProgram {
    /// Indexed by [`UnitId`]
    pub units: Vec<Unit>,
    /// Global cell names, indexed by cell
    pub globals: Vec<Rc<str>>,
    pub entry: UnitId,
}

impl GeneratedProgram {
    pub fn unit(&self, id: UnitId) -> Option<&Unit> {
        self.units.get(id)
    }

    pub fn find_unit(&self, name: &str) -> Option<&Unit> {
        self.units.iter().find(|unit| unit.name.as_ref() == name)
    }

    fn unit_name(&self, id: UnitId) -> &str {
        self.units.get(id).map(|unit| unit.name.as_ref()).unwrap_or("?")
    }

    fn global_name(&self, cell: usize) -> &str {
        self.globals.get(cell).map(|name| name.as_ref()).unwrap_or("?")
    }

    fn write_op(&self, f: &mut std::fmt::Formatter<'_>, unit: &Unit, op: &Op) -> std::fmt::Result {
        let label = |label: &Label| match unit.label_offset(*label) {
            Some(offset) => format!("L{} (@{})", label.0, offset),
            None => format!("L{}", label.0),
        };

        match op {
            Op::PushInt(value) => write!(f, "push.int {}", value),
            Op::PushChar(value) => write!(f, "push.char {:?}", value),
            Op::PushStr(value) => write!(f, "push.str {:?}", value.as_ref()),
            Op::PushUnit(id) => write!(f, "push.fn {}", self.unit_name(*id)),
            Op::PushBuiltin(builtin) => write!(f, "push.builtin {}", builtin.name()),
            Op::LoadArg(slot) => write!(f, "load.arg {}", slot),
            Op::LoadLocal(slot) => write!(f, "load.local {}", slot),
            Op::StoreLocal(slot) => write!(f, "store.local {}", slot),
            Op::LoadGlobal(cell) => write!(f, "load.global {} ({})", cell, self.global_name(*cell)),
            Op::StoreGlobal(cell) => write!(f, "store.global {} ({})", cell, self.global_name(*cell)),
            Op::Pop => write!(f, "pop"),
            Op::AddInt => write!(f, "add.int"),
            Op::SubInt => write!(f, "sub.int"),
            Op::MulInt => write!(f, "mul.int"),
            Op::DivInt => write!(f, "div.int"),
            Op::Concat => write!(f, "concat"),
            Op::Compare(comparison, kind) => {
                write!(f, "cmp {} {:?}", comparison.symbol(), kind)
            }
            Op::IntToBool => write!(f, "int.to.bool"),
            Op::Not => write!(f, "not"),
            Op::Jump(target) => write!(f, "jump {}", label(target)),
            Op::JumpIf(target) => write!(f, "jump.if {}", label(target)),
            Op::NewArray(length) => write!(f, "new.array {}", length),
            Op::SetElement(index) => write!(f, "set.element {}", index),
            Op::NewHash => write!(f, "new.hash"),
            Op::InsertEntry => write!(f, "insert.entry"),
            Op::IndexArray => write!(f, "index.array"),
            Op::IndexHash => write!(f, "index.hash"),
            Op::Call { unit, arity, .. } => write!(f, "call {}/{}", self.unit_name(*unit), arity),
            Op::CallIndirect { arity, .. } => write!(f, "call.indirect /{}", arity),
            Op::CallBuiltin(builtin) => write!(f, "call.builtin {}", builtin.name()),
            Op::Return => write!(f, "return"),
            Op::ReturnVoid => write!(f, "return.void"),
            Op::Print(type_) => write!(f, "print {}", type_),
            Op::MissingReturn => write!(f, "missing.return"),
        }
    }
}

impl Display for GeneratedProgram {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if !self.globals.is_empty() {
            let globals = self.globals.iter().map(|name| name.as_ref()).collect::<Vec<_>>();
            writeln!(f, "globals: {}", globals.join(", "))?;
        }
        writeln!(f, "entry: {}", self.unit_name(self.entry))?;

        for unit in &self.units {
            writeln!(
                f,
                "\n{} #{} (arity {}, locals {}{})",
                unit.name,
                unit.id,
                unit.arity,
                unit.locals,
                if unit.returns_value { ", returns" } else { "" }
            )?;

            for (offset, op) in unit.ops.iter().enumerate() {
                write!(f, "  {:04}  ", offset)?;
                self.write_op(f, unit, op)?;
                writeln!(f)?;
            }
        }

        Ok(())
    }
}
