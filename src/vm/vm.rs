//! Stack machine that executes a [`GeneratedProgram`].

use std::{io::Write, rc::Rc};

use indexmap::IndexMap;
use tracing::{debug, trace};

use crate::{
    compiler::bytecode::{Comparison, GeneratedProgram, Label, Op, OperandKind, Unit, UnitId},
    errors::errors::RuntimeFault,
};

use super::value::{Callable, Value};

/// Frames allowed on the call stack unless configured otherwise.
pub const DEFAULT_MAX_CALL_DEPTH: usize = 10_000;

struct Frame {
    unit: UnitId,
    ip: usize,
    arguments: Vec<Value>,
    locals: Vec<Value>,
    /// Operand stack height when the frame was entered
    stack_base: usize,
}

/// Executes one program against one output sink.
///
/// Every run starts from fresh global cells, so nothing carries over from
/// a previous execution.
pub struct Vm<'a, W: Write> {
    program: &'a GeneratedProgram,
    output: &'a mut W,
    stack: Vec<Value>,
    frames: Vec<Frame>,
    globals: Vec<Option<Value>>,
    max_call_depth: usize,
}

impl<'a, W: Write> Vm<'a, W> {
    pub fn new(program: &'a GeneratedProgram, output: &'a mut W) -> Self {
        Vm {
            program,
            output,
            stack: vec![],
            frames: vec![],
            globals: vec![None; program.globals.len()],
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
        }
    }

    pub fn with_max_call_depth(mut self, max_call_depth: usize) -> Self {
        self.max_call_depth = max_call_depth;
        self
    }

    fn unit(&self, id: UnitId) -> Result<&'a Unit, RuntimeFault> {
        self.program.unit(id).ok_or(RuntimeFault::UnresolvedCallable)
    }

    fn current_unit_name(&self) -> String {
        self.frames
            .last()
            .and_then(|frame| self.program.unit(frame.unit))
            .map(|unit| unit.name.to_string())
            .unwrap_or_default()
    }

    fn pop(&mut self) -> Result<Value, RuntimeFault> {
        match self.stack.pop() {
            Some(value) => Ok(value),
            None => Err(RuntimeFault::StackUnderflow {
                unit: self.current_unit_name(),
            }),
        }
    }

    fn pop_many(&mut self, count: usize) -> Result<Vec<Value>, RuntimeFault> {
        if self.stack.len() < count {
            return Err(RuntimeFault::StackUnderflow {
                unit: self.current_unit_name(),
            });
        }

        Ok(self.stack.split_off(self.stack.len() - count))
    }

    fn pop_int(&mut self) -> Result<i64, RuntimeFault> {
        match self.pop()? {
            Value::Int(value) => Ok(value),
            other => Err(mismatch("int", &other)),
        }
    }

    fn push_frame(&mut self, unit: UnitId, arguments: Vec<Value>) -> Result<(), RuntimeFault> {
        if self.frames.len() >= self.max_call_depth {
            return Err(RuntimeFault::StackOverflow {
                limit: self.max_call_depth,
            });
        }

        let target = self.unit(unit)?;
        if target.arity != arguments.len() {
            return Err(RuntimeFault::ArityMismatch {
                expected: target.arity,
                received: arguments.len(),
            });
        }

        trace!(unit = %target.name, depth = self.frames.len() + 1, "enter");
        self.frames.push(Frame {
            unit,
            ip: 0,
            arguments,
            locals: vec![Value::Void; target.locals],
            stack_base: self.stack.len(),
        });
        Ok(())
    }

    /// Leaves the current frame, pushing its result for the caller.
    fn return_from_frame(&mut self, result: Option<Value>) {
        if let Some(frame) = self.frames.pop() {
            self.stack.truncate(frame.stack_base);
        }
        if let Some(result) = result {
            self.stack.push(result);
        }
    }

    fn jump(&mut self, unit: &Unit, label: Label) -> Result<(), RuntimeFault> {
        let offset = unit.label_offset(label).ok_or_else(|| RuntimeFault::InvalidJump {
            unit: unit.name.to_string(),
            label: label.0,
        })?;

        if let Some(frame) = self.frames.last_mut() {
            frame.ip = offset;
        }
        Ok(())
    }

    /// Runs the program's entry sequence to completion.
    pub fn run(mut self) -> Result<(), RuntimeFault> {
        let program = self.program;
        debug!(units = program.units.len(), "execution started");

        self.push_frame(program.entry, vec![])?;

        while let Some(frame) = self.frames.last_mut() {
            let unit = program.unit(frame.unit).ok_or(RuntimeFault::UnresolvedCallable)?;

            let Some(op) = unit.ops.get(frame.ip) else {
                // Units always end in a return, so only a malformed one runs off its end
                return Err(RuntimeFault::MissingReturn {
                    function: unit.name.to_string(),
                });
            };
            let ip = frame.ip;
            frame.ip += 1;

            trace!(unit = %unit.name, ip, ?op, depth = self.stack.len(), "step");
            self.step(unit, op)?;
        }

        debug!("execution finished");
        Ok(())
    }

    fn step(&mut self, unit: &'a Unit, op: &'a Op) -> Result<(), RuntimeFault> {
        match op {
            Op::PushInt(value) => self.stack.push(Value::Int(*value)),
            Op::PushChar(value) => self.stack.push(Value::Char(*value)),
            Op::PushStr(value) => self.stack.push(Value::Str(Rc::clone(value))),
            Op::PushUnit(id) => {
                let name = Rc::clone(&self.unit(*id)?.name);
                self.stack.push(Value::Callable(Callable::Unit { id: *id, name }));
            }
            Op::PushBuiltin(builtin) => self.stack.push(Value::Callable(Callable::Builtin(*builtin))),

            Op::LoadArg(index) => {
                let value = self
                    .frames
                    .last()
                    .and_then(|frame| frame.arguments.get(*index))
                    .cloned()
                    .ok_or_else(|| RuntimeFault::MissingArgument {
                        unit: unit.name.to_string(),
                        index: *index,
                    })?;
                self.stack.push(value);
            }
            Op::LoadLocal(slot) => {
                let value = self
                    .frames
                    .last()
                    .and_then(|frame| frame.locals.get(*slot))
                    .cloned()
                    .unwrap_or(Value::Void);
                self.stack.push(value);
            }
            Op::StoreLocal(slot) => {
                let value = self.pop()?;
                if let Some(local) = self.frames.last_mut().and_then(|frame| frame.locals.get_mut(*slot)) {
                    *local = value;
                }
            }
            Op::LoadGlobal(cell) => {
                let value = self.globals.get(*cell).cloned().flatten().ok_or_else(|| {
                    RuntimeFault::UninitializedGlobal {
                        name: self
                            .program
                            .globals
                            .get(*cell)
                            .map(|name| name.to_string())
                            .unwrap_or_default(),
                    }
                })?;
                self.stack.push(value);
            }
            Op::StoreGlobal(cell) => {
                let value = self.pop()?;
                if let Some(global) = self.globals.get_mut(*cell) {
                    *global = Some(value);
                }
            }
            Op::Pop => {
                self.pop()?;
            }

            Op::AddInt | Op::SubInt | Op::MulInt | Op::DivInt => {
                let right = self.pop_int()?;
                let left = self.pop_int()?;

                let result = match op {
                    Op::AddInt => left.wrapping_add(right),
                    Op::SubInt => left.wrapping_sub(right),
                    Op::MulInt => left.wrapping_mul(right),
                    _ => {
                        if right == 0 {
                            return Err(RuntimeFault::DivisionByZero);
                        }
                        left.wrapping_div(right)
                    }
                };
                self.stack.push(Value::Int(result));
            }
            Op::Concat => {
                let right = self.pop()?;
                let left = self.pop()?;

                match (left, right) {
                    (Value::Str(left), Value::Str(right)) => {
                        self.stack.push(Value::string(&format!("{}{}", left, right)));
                    }
                    (Value::Str(_), other) | (other, _) => return Err(mismatch("string", &other)),
                }
            }
            Op::Compare(comparison, kind) => {
                let right = self.pop()?;
                let left = self.pop()?;
                let result = compare(*comparison, *kind, &left, &right)?;
                self.stack.push(Value::from_bool(result));
            }
            Op::IntToBool => {
                let value = self.pop_int()?;
                self.stack.push(Value::from_bool(value != 0));
            }
            Op::Not => {
                let value = self.pop_int()?;
                self.stack.push(Value::from_bool(value == 0));
            }

            Op::Jump(label) => self.jump(unit, *label)?,
            Op::JumpIf(label) => {
                if self.pop_int()? != 0 {
                    self.jump(unit, *label)?;
                }
            }

            Op::NewArray(length) => self.stack.push(Value::Array(Rc::new(vec![Value::Void; *length]))),
            Op::SetElement(index) => {
                let value = self.pop()?;
                match self.pop()? {
                    Value::Array(mut elements) => {
                        let length = elements.len();
                        let slot = Rc::make_mut(&mut elements).get_mut(*index).ok_or(
                            RuntimeFault::IndexOutOfRange {
                                index: *index as i64,
                                length,
                            },
                        )?;
                        *slot = value;
                        self.stack.push(Value::Array(elements));
                    }
                    other => return Err(mismatch("array", &other)),
                }
            }
            Op::NewHash => self.stack.push(Value::Hash(Rc::new(IndexMap::new()))),
            Op::InsertEntry => {
                let value = self.pop()?;
                let key = self.pop()?;
                let key = key.as_hash_key().ok_or_else(|| mismatch("int or string", &key))?;

                match self.pop()? {
                    Value::Hash(mut entries) => {
                        Rc::make_mut(&mut entries).insert(key, value);
                        self.stack.push(Value::Hash(entries));
                    }
                    other => return Err(mismatch("hash", &other)),
                }
            }
            Op::IndexArray => {
                let index = self.pop_int()?;
                match self.pop()? {
                    Value::Array(elements) => {
                        let element = usize::try_from(index)
                            .ok()
                            .and_then(|position| elements.get(position))
                            .cloned()
                            .ok_or(RuntimeFault::IndexOutOfRange {
                                index,
                                length: elements.len(),
                            })?;
                        self.stack.push(element);
                    }
                    other => return Err(mismatch("array", &other)),
                }
            }
            Op::IndexHash => {
                let key = self.pop()?;
                let key = key.as_hash_key().ok_or_else(|| mismatch("int or string", &key))?;

                match self.pop()? {
                    Value::Hash(entries) => {
                        let value = entries
                            .get(&key)
                            .cloned()
                            .ok_or_else(|| RuntimeFault::KeyNotFound { key: key.to_string() })?;
                        self.stack.push(value);
                    }
                    other => return Err(mismatch("hash", &other)),
                }
            }

            Op::Call { unit: target, arity, .. } => {
                let arguments = self.pop_many(*arity)?;
                self.push_frame(*target, arguments)?;
            }
            Op::CallIndirect { arity, .. } => {
                let arguments = self.pop_many(*arity)?;

                match self.pop()? {
                    Value::Callable(Callable::Unit { id, .. }) => self.push_frame(id, arguments)?,
                    Value::Callable(Callable::Builtin(builtin)) => {
                        self.stack.push(builtin.apply(arguments)?);
                    }
                    _ => return Err(RuntimeFault::UnresolvedCallable),
                }
            }
            Op::CallBuiltin(builtin) => {
                let arguments = self.pop_many(builtin.arity())?;
                self.stack.push(builtin.apply(arguments)?);
            }
            Op::Return => {
                let result = self.pop()?;
                self.return_from_frame(Some(result));
            }
            Op::ReturnVoid => self.return_from_frame(None),

            Op::Print(type_) => {
                let value = self.pop()?;
                writeln!(self.output, "{}", value.format(type_)).map_err(|error| RuntimeFault::Output {
                    message: error.to_string(),
                })?;
            }
            Op::MissingReturn => {
                return Err(RuntimeFault::MissingReturn {
                    function: unit.name.to_string(),
                })
            }
        }

        Ok(())
    }
}

fn mismatch(expected: &str, found: &Value) -> RuntimeFault {
    RuntimeFault::OperandMismatch {
        expected: expected.to_string(),
        found: found.kind().to_string(),
    }
}

fn compare(comparison: Comparison, kind: OperandKind, left: &Value, right: &Value) -> Result<bool, RuntimeFault> {
    use std::cmp::Ordering;

    let ordering = match (kind, left, right) {
        (OperandKind::Int, Value::Int(left), Value::Int(right)) => left.cmp(right),
        (OperandKind::Char, Value::Char(left), Value::Char(right)) => left.cmp(right),
        (OperandKind::Str, Value::Str(left), Value::Str(right)) => left.cmp(right),
        (OperandKind::Structural, left, right) => {
            return match comparison {
                Comparison::Equal => Ok(left == right),
                Comparison::NotEqual => Ok(left != right),
                _ => Err(mismatch("ordered value", left)),
            };
        }
        (_, left, _) => return Err(mismatch("comparable value", left)),
    };

    Ok(match comparison {
        Comparison::Equal => ordering == Ordering::Equal,
        Comparison::NotEqual => ordering != Ordering::Equal,
        Comparison::Less => ordering == Ordering::Less,
        Comparison::LessEqual => ordering != Ordering::Greater,
        Comparison::Greater => ordering == Ordering::Greater,
        Comparison::GreaterEqual => ordering != Ordering::Less,
    })
}

/// Executes `program`, writing `print` output to `output`.
pub fn execute<W: Write>(
    program: &GeneratedProgram,
    output: &mut W,
    max_call_depth: usize,
) -> Result<(), RuntimeFault> {
    Vm::new(program, output).with_max_call_depth(max_call_depth).run()
}
