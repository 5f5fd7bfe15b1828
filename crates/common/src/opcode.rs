//! Opcode definitions for the IPPcode24 instruction set.

use std::str::FromStr;

use crate::error::StructureError;

/// Kind of operand an opcode expects in a given position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperandKind {
    /// A variable reference (`GF@x`).
    Var,
    /// A variable reference or a literal.
    Symb,
    /// A label name.
    Label,
    /// A type name (`int`, `bool`, `string`).
    Type,
}

impl OperandKind {
    /// Human-readable name used in error messages.
    pub fn name(&self) -> &'static str {
        match self {
            OperandKind::Var => "variable",
            OperandKind::Symb => "symbol",
            OperandKind::Label => "label",
            OperandKind::Type => "type",
        }
    }
}

/// Identifies the operation to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opcode {
    // Frames and calls
    /// Copy a symbol into a variable.
    Move,
    /// Replace the temporary frame with a fresh empty one.
    CreateFrame,
    /// Move the temporary frame onto the local frame stack.
    PushFrame,
    /// Move the top local frame back to the temporary frame.
    PopFrame,
    /// Declare an uninitialised variable.
    DefVar,
    /// Push the return position and jump to a label.
    Call,
    /// Pop the call stack and jump there.
    Return,

    // Data stack
    /// Push a symbol onto the data stack.
    Pushs,
    /// Pop the data stack into a variable.
    Pops,

    // Arithmetic, relational, boolean, conversion
    Add,
    Sub,
    Mul,
    /// Integer division truncating toward zero.
    IDiv,
    Lt,
    Gt,
    Eq,
    And,
    Or,
    Not,
    /// Unicode scalar value to a one-character string.
    Int2Char,
    /// Ordinal of the character at an index.
    Stri2Int,

    // I/O
    /// Read a value of the given type from input.
    Read,
    /// Write a symbol to standard output.
    Write,

    // Strings
    Concat,
    Strlen,
    GetChar,
    SetChar,

    // Types
    /// Store the type name of a symbol as a string.
    Type,

    // Control flow
    /// Jump target; no effect when executed.
    Label,
    Jump,
    JumpIfEq,
    JumpIfNeq,
    /// Halt with an exit code in 0..=9.
    Exit,

    // Debug
    /// Write a symbol to the diagnostic channel.
    Dprint,
    /// Write interpreter state to the diagnostic channel.
    Break,
}

/// All valid opcodes, in definition order.
pub const ALL_OPCODES: [Opcode; 35] = [
    Opcode::Move,
    Opcode::CreateFrame,
    Opcode::PushFrame,
    Opcode::PopFrame,
    Opcode::DefVar,
    Opcode::Call,
    Opcode::Return,
    Opcode::Pushs,
    Opcode::Pops,
    Opcode::Add,
    Opcode::Sub,
    Opcode::Mul,
    Opcode::IDiv,
    Opcode::Lt,
    Opcode::Gt,
    Opcode::Eq,
    Opcode::And,
    Opcode::Or,
    Opcode::Not,
    Opcode::Int2Char,
    Opcode::Stri2Int,
    Opcode::Read,
    Opcode::Write,
    Opcode::Concat,
    Opcode::Strlen,
    Opcode::GetChar,
    Opcode::SetChar,
    Opcode::Type,
    Opcode::Label,
    Opcode::Jump,
    Opcode::JumpIfEq,
    Opcode::JumpIfNeq,
    Opcode::Exit,
    Opcode::Dprint,
    Opcode::Break,
];

use OperandKind::{Label as L, Symb as S, Type as T, Var as V};

impl Opcode {
    /// Returns the source mnemonic for this opcode.
    pub fn mnemonic(&self) -> &'static str {
        match self {
            Opcode::Move => "MOVE",
            Opcode::CreateFrame => "CREATEFRAME",
            Opcode::PushFrame => "PUSHFRAME",
            Opcode::PopFrame => "POPFRAME",
            Opcode::DefVar => "DEFVAR",
            Opcode::Call => "CALL",
            Opcode::Return => "RETURN",
            Opcode::Pushs => "PUSHS",
            Opcode::Pops => "POPS",
            Opcode::Add => "ADD",
            Opcode::Sub => "SUB",
            Opcode::Mul => "MUL",
            Opcode::IDiv => "IDIV",
            Opcode::Lt => "LT",
            Opcode::Gt => "GT",
            Opcode::Eq => "EQ",
            Opcode::And => "AND",
            Opcode::Or => "OR",
            Opcode::Not => "NOT",
            Opcode::Int2Char => "INT2CHAR",
            Opcode::Stri2Int => "STRI2INT",
            Opcode::Read => "READ",
            Opcode::Write => "WRITE",
            Opcode::Concat => "CONCAT",
            Opcode::Strlen => "STRLEN",
            Opcode::GetChar => "GETCHAR",
            Opcode::SetChar => "SETCHAR",
            Opcode::Type => "TYPE",
            Opcode::Label => "LABEL",
            Opcode::Jump => "JUMP",
            Opcode::JumpIfEq => "JUMPIFEQ",
            Opcode::JumpIfNeq => "JUMPIFNEQ",
            Opcode::Exit => "EXIT",
            Opcode::Dprint => "DPRINT",
            Opcode::Break => "BREAK",
        }
    }

    /// Operand kinds this opcode takes, in order.
    pub fn signature(&self) -> &'static [OperandKind] {
        match self {
            Opcode::CreateFrame
            | Opcode::PushFrame
            | Opcode::PopFrame
            | Opcode::Return
            | Opcode::Break => &[],

            Opcode::DefVar | Opcode::Pops => &[V],
            Opcode::Call | Opcode::Label | Opcode::Jump => &[L],
            Opcode::Pushs | Opcode::Write | Opcode::Exit | Opcode::Dprint => &[S],

            Opcode::Move
            | Opcode::Not
            | Opcode::Int2Char
            | Opcode::Strlen
            | Opcode::Type => &[V, S],

            Opcode::Read => &[V, T],

            Opcode::Add
            | Opcode::Sub
            | Opcode::Mul
            | Opcode::IDiv
            | Opcode::Lt
            | Opcode::Gt
            | Opcode::Eq
            | Opcode::And
            | Opcode::Or
            | Opcode::Stri2Int
            | Opcode::Concat
            | Opcode::GetChar
            | Opcode::SetChar => &[V, S, S],

            Opcode::JumpIfEq | Opcode::JumpIfNeq => &[L, S, S],
        }
    }
}

impl FromStr for Opcode {
    type Err = StructureError;

    /// Opcode names are case-insensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.to_ascii_uppercase();
        ALL_OPCODES
            .iter()
            .find(|op| op.mnemonic() == upper)
            .copied()
            .ok_or_else(|| StructureError::UnknownOpcode(s.to_string()))
    }
}
