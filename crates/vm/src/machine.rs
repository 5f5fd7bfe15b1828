//! Interpreter state: frames, labels, stacks, instruction pointer, and the
//! argument resolver.

use ippcode_common::{
    Instruction, Operand, OperandKind, Program, StructureError, Value, ValueType, VarRef,
};

use crate::error::RuntimeError;
use crate::frame::FrameSet;
use crate::io::Channels;
use crate::labels::LabelTable;
use crate::stack::{CallStack, DataStack};

/// Whether the engine can take another step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Running,
    /// Stopped with this exit code, by falling off the end (0) or by EXIT.
    Halted(u8),
}

/// What the instruction pointer does after an opcode finishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Flow {
    Next,
    Jump(usize),
    Halt(u8),
}

/// The IPPcode24 interpreter.
///
/// One `VM` owns all state of one run. Nothing is shared between
/// instances, so independent runs can coexist.
pub struct VM<'a> {
    /// The program being executed.
    pub(crate) program: &'a Program,
    /// Label name → instruction index.
    pub(crate) labels: LabelTable,
    /// Global, local and temporary frames.
    pub(crate) frames: FrameSet,
    /// Return positions for CALL/RETURN.
    pub(crate) call_stack: CallStack,
    /// Values for PUSHS/POPS.
    pub(crate) data_stack: DataStack,
    /// Index of the next instruction to execute.
    pub(crate) pc: usize,
    /// Instructions executed so far.
    pub(crate) executed: u64,
    pub(crate) state: State,
    pub(crate) io: Channels<'a>,
}

impl<'a> VM<'a> {
    /// Create a VM for `program`, building the label table.
    ///
    /// Fails if a label is defined twice.
    pub fn new(program: &'a Program, io: Channels<'a>) -> Result<Self, RuntimeError> {
        Ok(Self {
            program,
            labels: LabelTable::build(program)?,
            frames: FrameSet::new(),
            call_stack: CallStack::default(),
            data_stack: DataStack::default(),
            pc: 0,
            executed: 0,
            state: State::Running,
            io,
        })
    }

    pub fn pc(&self) -> usize {
        self.pc
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn executed(&self) -> u64 {
        self.executed
    }

    pub fn frames(&self) -> &FrameSet {
        &self.frames
    }

    pub fn call_stack(&self) -> &CallStack {
        &self.call_stack
    }

    pub fn data_stack(&self) -> &DataStack {
        &self.data_stack
    }

    // ---- Argument resolution ----

    /// Resolve a symbol operand to its value.
    ///
    /// Variables must live in an existing frame, be declared and be
    /// initialised. Label operands never resolve to a value.
    pub fn resolve(&self, operand: &Operand) -> Result<Value, RuntimeError> {
        self.resolve_at(operand, 0)
    }

    /// [`resolve`](Self::resolve) for the operand at position `index`.
    fn resolve_at(&self, operand: &Operand, index: usize) -> Result<Value, RuntimeError> {
        match operand {
            Operand::Literal(value) => Ok(value.clone()),
            Operand::Type(ty) => Ok(Value::Type(*ty)),
            Operand::Var(var) => self.frames.read(var).cloned().map_err(|e| e.at(self.pc)),
            Operand::Label(_) => Err(self.malformed(index, OperandKind::Symb)),
        }
    }

    /// Operand `index` of `instr`.
    pub(crate) fn operand<'i>(
        &self,
        instr: &'i Instruction,
        index: usize,
    ) -> Result<&'i Operand, RuntimeError> {
        instr.operand(index).ok_or_else(|| RuntimeError::Structure {
            at: self.pc,
            source: StructureError::OperandCount {
                opcode: instr.opcode().mnemonic(),
                expected: instr.opcode().signature().len(),
                found: instr.operands().len(),
            },
        })
    }

    /// Resolved value of symbol operand `index`.
    pub(crate) fn symb(&self, instr: &Instruction, index: usize) -> Result<Value, RuntimeError> {
        self.resolve_at(self.operand(instr, index)?, index)
    }

    /// Resolved values of operands 1 and 2, the usual source pair.
    pub(crate) fn symb_pair(&self, instr: &Instruction) -> Result<(Value, Value), RuntimeError> {
        Ok((self.symb(instr, 1)?, self.symb(instr, 2)?))
    }

    /// Variable operand `index`, not yet checked against the frames.
    pub(crate) fn var<'i>(
        &self,
        instr: &'i Instruction,
        index: usize,
    ) -> Result<&'i VarRef, RuntimeError> {
        match self.operand(instr, index)? {
            Operand::Var(var) => Ok(var),
            _ => Err(self.malformed(index, OperandKind::Var)),
        }
    }

    /// Variable operand `index` that an opcode is about to write.
    ///
    /// The variable must already be declared, so the check happens before
    /// any state changes.
    pub(crate) fn target<'i>(
        &self,
        instr: &'i Instruction,
        index: usize,
    ) -> Result<&'i VarRef, RuntimeError> {
        let var = self.var(instr, index)?;
        self.frames
            .require_declared(var)
            .map_err(|e| e.at(self.pc))?;
        Ok(var)
    }

    /// Instruction index of label operand `index`.
    pub(crate) fn label(&self, instr: &Instruction, index: usize) -> Result<usize, RuntimeError> {
        match self.operand(instr, index)? {
            Operand::Label(name) => {
                self.labels
                    .lookup(name)
                    .ok_or_else(|| RuntimeError::UndefinedLabel {
                        at: self.pc,
                        label: name.clone(),
                    })
            }
            _ => Err(self.malformed(index, OperandKind::Label)),
        }
    }

    /// Type operand `index`.
    pub(crate) fn type_name(
        &self,
        instr: &Instruction,
        index: usize,
    ) -> Result<ValueType, RuntimeError> {
        match self.operand(instr, index)? {
            Operand::Type(ty) => Ok(*ty),
            _ => Err(self.malformed(index, OperandKind::Type)),
        }
    }

    /// Store `value` into an already-checked target and continue.
    pub(crate) fn store(&mut self, var: &VarRef, value: Value) -> Result<Flow, RuntimeError> {
        self.frames
            .assign(var, value)
            .map_err(|e| e.at(self.pc))?;
        Ok(Flow::Next)
    }

    /// A wrong-operand-type error for the current instruction.
    pub(crate) fn type_error(&self, instr: &Instruction, values: &[&Value]) -> RuntimeError {
        let types: Vec<ValueType> = values.iter().map(|v| v.value_type()).collect();
        RuntimeError::wrong_types(self.pc, instr.opcode().mnemonic(), &types)
    }

    fn malformed(&self, index: usize, expected: OperandKind) -> RuntimeError {
        let opcode = self
            .program
            .get(self.pc)
            .map_or("?", |instr| instr.opcode().mnemonic());
        RuntimeError::Structure {
            at: self.pc,
            source: StructureError::OperandKind {
                opcode,
                position: index + 1,
                expected: expected.name(),
            },
        }
    }
}
