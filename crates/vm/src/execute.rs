//! Main execution loop and opcode dispatch for the IPPcode24 VM.
//!
//! Every opcode follows the same order of checks: the target variable
//! must be declared, then operands are resolved, then their types are
//! checked, and only then is any state changed. An instruction that fails
//! leaves frames and stacks exactly as they were.

use std::cmp::Ordering;
use std::fmt::{self, Write as _};

use ippcode_common::{FrameKind, Instruction, Opcode, Operand, Value, ValueType};
use tracing::{debug, instrument, trace};

use crate::error::RuntimeError;
use crate::frame::{Frame, Slot};
use crate::io::OutputWriter;
use crate::machine::{Flow, State, VM};

impl<'a> VM<'a> {
    /// Execute until the program halts or fails.
    ///
    /// Returns the exit code: 0 after the last instruction, or the code
    /// given to EXIT.
    #[instrument(skip_all, fields(instructions = self.program.len()))]
    pub fn execute(&mut self) -> Result<u8, RuntimeError> {
        debug!("run started");
        loop {
            if let State::Halted(code) = self.step()? {
                debug!(code, executed = self.executed, "halted");
                return Ok(code);
            }
        }
    }

    /// Execute one instruction.
    ///
    /// Stepping past the last instruction halts with code 0. Stepping a
    /// halted VM does nothing.
    pub fn step(&mut self) -> Result<State, RuntimeError> {
        if self.state != State::Running {
            return Ok(self.state);
        }
        let program = self.program;
        let Some(instr) = program.get(self.pc) else {
            self.state = State::Halted(0);
            return Ok(self.state);
        };

        trace!(pc = self.pc, order = instr.order(), %instr, "dispatch");
        let flow = self.dispatch(instr)?;
        self.executed += 1;

        match flow {
            Flow::Next => self.pc += 1,
            Flow::Jump(target) => self.pc = target,
            Flow::Halt(code) => self.state = State::Halted(code),
        }
        Ok(self.state)
    }

    fn dispatch(&mut self, instr: &Instruction) -> Result<Flow, RuntimeError> {
        match instr.opcode() {
            // Frames and calls
            Opcode::Move => self.exec_move(instr),
            Opcode::CreateFrame => {
                self.frames.create_temporary();
                Ok(Flow::Next)
            }
            Opcode::PushFrame => {
                self.frames.push_temporary().map_err(|e| e.at(self.pc))?;
                Ok(Flow::Next)
            }
            Opcode::PopFrame => {
                self.frames.pop_local().map_err(|e| e.at(self.pc))?;
                Ok(Flow::Next)
            }
            Opcode::DefVar => self.exec_defvar(instr),
            Opcode::Call => self.exec_call(instr),
            Opcode::Return => Ok(Flow::Jump(self.call_stack.pop(self.pc)?)),

            // Data stack
            Opcode::Pushs => {
                let value = self.symb(instr, 0)?;
                self.data_stack.push(value);
                Ok(Flow::Next)
            }
            Opcode::Pops => self.exec_pops(instr),

            // Arithmetic
            Opcode::Add => self.exec_arith(instr, i64::wrapping_add),
            Opcode::Sub => self.exec_arith(instr, i64::wrapping_sub),
            Opcode::Mul => self.exec_arith(instr, i64::wrapping_mul),
            Opcode::IDiv => self.exec_idiv(instr),

            // Relational
            Opcode::Lt => self.exec_relational(instr, Ordering::is_lt),
            Opcode::Gt => self.exec_relational(instr, Ordering::is_gt),
            Opcode::Eq => self.exec_eq(instr),

            // Boolean
            Opcode::And => self.exec_logic(instr, |a, b| a && b),
            Opcode::Or => self.exec_logic(instr, |a, b| a || b),
            Opcode::Not => self.exec_not(instr),

            // Conversions
            Opcode::Int2Char => self.exec_int2char(instr),
            Opcode::Stri2Int => self.exec_stri2int(instr),

            // Input and output
            Opcode::Read => self.exec_read(instr),
            Opcode::Write => {
                let value = self.symb(instr, 0)?;
                self.emit(Channel::Stdout, &value)?;
                Ok(Flow::Next)
            }

            // Strings
            Opcode::Concat => self.exec_concat(instr),
            Opcode::Strlen => self.exec_strlen(instr),
            Opcode::GetChar => self.exec_getchar(instr),
            Opcode::SetChar => self.exec_setchar(instr),

            // Types
            Opcode::Type => self.exec_type(instr),

            // Control flow
            Opcode::Label => Ok(Flow::Next),
            Opcode::Jump => Ok(Flow::Jump(self.label(instr, 0)?)),
            Opcode::JumpIfEq => self.exec_conditional_jump(instr, true),
            Opcode::JumpIfNeq => self.exec_conditional_jump(instr, false),
            Opcode::Exit => self.exec_exit(instr),

            // Debugging
            Opcode::Dprint => {
                let value = self.symb(instr, 0)?;
                self.emit(Channel::Stderr, &value)?;
                Ok(Flow::Next)
            }
            Opcode::Break => self.exec_break(),
        }
    }

    // ---- Frames and calls ----

    fn exec_move(&mut self, instr: &Instruction) -> Result<Flow, RuntimeError> {
        let dst = self.target(instr, 0)?;
        let value = self.symb(instr, 1)?;
        self.store(dst, value)
    }

    fn exec_defvar(&mut self, instr: &Instruction) -> Result<Flow, RuntimeError> {
        let var = self.var(instr, 0)?;
        self.frames.declare(var).map_err(|e| e.at(self.pc))?;
        Ok(Flow::Next)
    }

    fn exec_call(&mut self, instr: &Instruction) -> Result<Flow, RuntimeError> {
        let target = self.label(instr, 0)?;
        self.call_stack.push(self.pc + 1);
        Ok(Flow::Jump(target))
    }

    fn exec_pops(&mut self, instr: &Instruction) -> Result<Flow, RuntimeError> {
        let dst = self.target(instr, 0)?;
        let value = self.data_stack.pop(self.pc)?;
        self.store(dst, value)
    }

    // ---- Arithmetic ----

    fn exec_arith(
        &mut self,
        instr: &Instruction,
        op: fn(i64, i64) -> i64,
    ) -> Result<Flow, RuntimeError> {
        let dst = self.target(instr, 0)?;
        let (a, b) = self.symb_pair(instr)?;
        let result = match (&a, &b) {
            (Value::Int(x), Value::Int(y)) => op(*x, *y),
            _ => return Err(self.type_error(instr, &[&a, &b])),
        };
        self.store(dst, Value::Int(result))
    }

    /// Integer division truncating toward zero.
    fn exec_idiv(&mut self, instr: &Instruction) -> Result<Flow, RuntimeError> {
        let dst = self.target(instr, 0)?;
        let (a, b) = self.symb_pair(instr)?;
        let result = match (&a, &b) {
            (Value::Int(_), Value::Int(0)) => {
                return Err(RuntimeError::DivisionByZero { at: self.pc })
            }
            (Value::Int(x), Value::Int(y)) => x.wrapping_div(*y),
            _ => return Err(self.type_error(instr, &[&a, &b])),
        };
        self.store(dst, Value::Int(result))
    }

    // ---- Relational ----

    fn exec_relational(
        &mut self,
        instr: &Instruction,
        accept: fn(Ordering) -> bool,
    ) -> Result<Flow, RuntimeError> {
        let dst = self.target(instr, 0)?;
        let (a, b) = self.symb_pair(instr)?;
        let ordering = match (&a, &b) {
            (Value::Int(x), Value::Int(y)) => x.cmp(y),
            (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
            (Value::String(x), Value::String(y)) => x.cmp(y),
            _ => return Err(self.type_error(instr, &[&a, &b])),
        };
        self.store(dst, Value::Bool(accept(ordering)))
    }

    fn exec_eq(&mut self, instr: &Instruction) -> Result<Flow, RuntimeError> {
        let dst = self.target(instr, 0)?;
        let (a, b) = self.symb_pair(instr)?;
        let equal = self.equals(instr, &a, &b)?;
        self.store(dst, Value::Bool(equal))
    }

    /// Equality shared by EQ, JUMPIFEQ and JUMPIFNEQ.
    ///
    /// Values of the same type compare by value. Nil compares with
    /// anything and is only equal to nil. Any other mix is a type error.
    fn equals(&self, instr: &Instruction, a: &Value, b: &Value) -> Result<bool, RuntimeError> {
        match (a, b) {
            (Value::Nil, _) | (_, Value::Nil) => Ok(a == b),
            _ if a.value_type() == b.value_type() => Ok(a == b),
            _ => Err(self.type_error(instr, &[a, b])),
        }
    }

    // ---- Boolean ----

    fn exec_logic(
        &mut self,
        instr: &Instruction,
        op: fn(bool, bool) -> bool,
    ) -> Result<Flow, RuntimeError> {
        let dst = self.target(instr, 0)?;
        let (a, b) = self.symb_pair(instr)?;
        let result = match (&a, &b) {
            (Value::Bool(x), Value::Bool(y)) => op(*x, *y),
            _ => return Err(self.type_error(instr, &[&a, &b])),
        };
        self.store(dst, Value::Bool(result))
    }

    fn exec_not(&mut self, instr: &Instruction) -> Result<Flow, RuntimeError> {
        let dst = self.target(instr, 0)?;
        match self.symb(instr, 1)? {
            Value::Bool(b) => self.store(dst, Value::Bool(!b)),
            other => Err(self.type_error(instr, &[&other])),
        }
    }

    // ---- Conversions ----

    fn exec_int2char(&mut self, instr: &Instruction) -> Result<Flow, RuntimeError> {
        let dst = self.target(instr, 0)?;
        let code = match self.symb(instr, 1)? {
            Value::Int(n) => n,
            other => return Err(self.type_error(instr, &[&other])),
        };
        let c = u32::try_from(code)
            .ok()
            .and_then(char::from_u32)
            .ok_or(RuntimeError::InvalidCodepoint {
                at: self.pc,
                value: code,
            })?;
        self.store(dst, Value::String(c.to_string()))
    }

    fn exec_stri2int(&mut self, instr: &Instruction) -> Result<Flow, RuntimeError> {
        let dst = self.target(instr, 0)?;
        let (a, b) = self.symb_pair(instr)?;
        let c = match (&a, &b) {
            (Value::String(s), Value::Int(index)) => self.char_at(s, *index)?,
            _ => return Err(self.type_error(instr, &[&a, &b])),
        };
        self.store(dst, Value::Int(i64::from(u32::from(c))))
    }

    // ---- Input and output ----

    /// READ never fails on bad input: missing or unparsable values
    /// become nil.
    fn exec_read(&mut self, instr: &Instruction) -> Result<Flow, RuntimeError> {
        let dst = self.target(instr, 0)?;
        let ty = self.type_name(instr, 1)?;
        let value = match ty {
            ValueType::Int => self.io.input.read_int().map(Value::Int),
            ValueType::Bool => self.io.input.read_bool().map(Value::Bool),
            ValueType::String => self.io.input.read_string().map(Value::String),
            ValueType::Nil | ValueType::Type => None,
        };
        self.store(dst, value.unwrap_or(Value::Nil))
    }

    fn emit(&mut self, channel: Channel, value: &Value) -> Result<(), RuntimeError> {
        let writer: &mut dyn OutputWriter = match channel {
            Channel::Stdout => &mut *self.io.stdout,
            Channel::Stderr => &mut *self.io.stderr,
        };
        render(writer, value).map_err(|e| RuntimeError::Output {
            at: self.pc,
            message: e.to_string(),
        })
    }

    // ---- Strings ----

    fn exec_concat(&mut self, instr: &Instruction) -> Result<Flow, RuntimeError> {
        let dst = self.target(instr, 0)?;
        let (a, b) = self.symb_pair(instr)?;
        match (a, b) {
            (Value::String(mut x), Value::String(y)) => {
                x.push_str(&y);
                self.store(dst, Value::String(x))
            }
            (a, b) => Err(self.type_error(instr, &[&a, &b])),
        }
    }

    fn exec_strlen(&mut self, instr: &Instruction) -> Result<Flow, RuntimeError> {
        let dst = self.target(instr, 0)?;
        match self.symb(instr, 1)? {
            Value::String(s) => self.store(dst, Value::Int(s.chars().count() as i64)),
            other => Err(self.type_error(instr, &[&other])),
        }
    }

    fn exec_getchar(&mut self, instr: &Instruction) -> Result<Flow, RuntimeError> {
        let dst = self.target(instr, 0)?;
        let (a, b) = self.symb_pair(instr)?;
        let c = match (&a, &b) {
            (Value::String(s), Value::Int(index)) => self.char_at(s, *index)?,
            _ => return Err(self.type_error(instr, &[&a, &b])),
        };
        self.store(dst, Value::String(c.to_string()))
    }

    /// Replace the character at an index of the string held in the target
    /// with the first character of the replacement.
    fn exec_setchar(&mut self, instr: &Instruction) -> Result<Flow, RuntimeError> {
        let dst = self.target(instr, 0)?;
        let current = self.frames.read(dst).map_err(|e| e.at(self.pc))?.clone();
        let (index, replacement) = self.symb_pair(instr)?;

        let (s, index, replacement) = match (&current, &index, &replacement) {
            (Value::String(s), Value::Int(i), Value::String(r)) => (s, *i, r),
            _ => return Err(self.type_error(instr, &[&current, &index, &replacement])),
        };
        let mut chars: Vec<char> = s.chars().collect();
        let position = self.index_in(index, chars.len())?;
        let c = replacement
            .chars()
            .next()
            .ok_or(RuntimeError::EmptyReplacement { at: self.pc })?;
        chars[position] = c;
        self.store(dst, Value::String(chars.into_iter().collect()))
    }

    fn char_at(&self, s: &str, index: i64) -> Result<char, RuntimeError> {
        let length = s.chars().count();
        let position = self.index_in(index, length)?;
        s.chars()
            .nth(position)
            .ok_or(RuntimeError::IndexOutOfRange {
                at: self.pc,
                index,
                length,
            })
    }

    /// Check a character index against a string length.
    fn index_in(&self, index: i64, length: usize) -> Result<usize, RuntimeError> {
        usize::try_from(index)
            .ok()
            .filter(|&i| i < length)
            .ok_or(RuntimeError::IndexOutOfRange {
                at: self.pc,
                index,
                length,
            })
    }

    // ---- Types ----

    /// TYPE of a declared but uninitialised variable is the empty string.
    fn exec_type(&mut self, instr: &Instruction) -> Result<Flow, RuntimeError> {
        let dst = self.target(instr, 0)?;
        let name = match self.operand(instr, 1)? {
            Operand::Var(var) => {
                match self.frames.slot(var).map_err(|e| e.at(self.pc))? {
                    Slot::Uninitialized => "",
                    Slot::Initialized(value) => value.value_type().name(),
                }
            }
            operand => self.resolve(operand)?.value_type().name(),
        };
        self.store(dst, Value::String(name.to_string()))
    }

    // ---- Control flow ----

    /// The label is resolved before the comparison, so a missing label is
    /// reported even when the jump would not be taken.
    fn exec_conditional_jump(
        &mut self,
        instr: &Instruction,
        jump_if_equal: bool,
    ) -> Result<Flow, RuntimeError> {
        let target = self.label(instr, 0)?;
        let (a, b) = self.symb_pair(instr)?;
        if self.equals(instr, &a, &b)? == jump_if_equal {
            Ok(Flow::Jump(target))
        } else {
            Ok(Flow::Next)
        }
    }

    fn exec_exit(&mut self, instr: &Instruction) -> Result<Flow, RuntimeError> {
        match self.symb(instr, 0)? {
            Value::Int(code @ 0..=9) => Ok(Flow::Halt(code as u8)),
            Value::Int(code) => Err(RuntimeError::InvalidExitCode { at: self.pc, code }),
            other => Err(self.type_error(instr, &[&other])),
        }
    }

    // ---- Debugging ----

    /// Dump the interpreter state to the diagnostic channel.
    fn exec_break(&mut self) -> Result<Flow, RuntimeError> {
        let report = self.describe_state().map_err(|e| RuntimeError::Output {
            at: self.pc,
            message: e.to_string(),
        })?;
        self.io
            .stderr
            .write_string(&report)
            .map_err(|e| RuntimeError::Output {
                at: self.pc,
                message: e.to_string(),
            })?;
        Ok(Flow::Next)
    }

    /// Position, frames and stacks, one line each.
    fn describe_state(&self) -> Result<String, fmt::Error> {
        let mut report = String::new();
        let order = self.program.get(self.pc).map_or(0, Instruction::order);
        writeln!(
            report,
            "BREAK at instruction {} (order {order}), {} executed",
            self.pc, self.executed
        )?;
        writeln!(report, "GF: {}", describe_frame(self.frames.global()))?;
        match self.frames.get(FrameKind::Local) {
            Ok(frame) => writeln!(
                report,
                "LF: {} (depth {})",
                describe_frame(frame),
                self.frames.local_depth()
            )?,
            Err(_) => writeln!(report, "LF: <none>")?,
        }
        match self.frames.get(FrameKind::Temporary) {
            Ok(frame) => writeln!(report, "TF: {}", describe_frame(frame))?,
            Err(_) => writeln!(report, "TF: <none>")?,
        }
        write!(report, "data stack: {}", self.data_stack.len())?;
        if let Some(top) = self.data_stack.peek() {
            write!(report, " (top {})", describe_value(top))?;
        }
        writeln!(report, ", call stack: {}", self.call_stack.len())?;
        Ok(report)
    }
}

#[derive(Debug, Clone, Copy)]
enum Channel {
    Stdout,
    Stderr,
}

/// Write a value the way WRITE prints it.
fn render(writer: &mut dyn OutputWriter, value: &Value) -> std::io::Result<()> {
    match value {
        Value::Int(n) => writer.write_int(*n),
        Value::Bool(b) => writer.write_bool(*b),
        Value::String(s) => writer.write_string(s),
        Value::Nil => writer.write_string(""),
        Value::Type(ty) => writer.write_string(ty.name()),
    }
}

/// `a=int@1, b=<uninitialized>` with variables sorted by name.
fn describe_frame(frame: &Frame) -> String {
    if frame.is_empty() {
        return "<empty>".to_string();
    }
    frame
        .sorted()
        .into_iter()
        .map(|(name, slot)| match slot {
            Slot::Uninitialized => format!("{name}=<uninitialized>"),
            Slot::Initialized(value) => format!("{name}={}", describe_value(value)),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// `type@value` in source notation.
fn describe_value(value: &Value) -> String {
    match value {
        Value::Nil => "nil@nil".to_string(),
        value => format!("{}@{value}", value.value_type()),
    }
}
