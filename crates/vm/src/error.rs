//! Runtime errors for the IPPcode24 interpreter.
//!
//! Every error raised while executing carries the index of the failing
//! instruction (`at`). [`RuntimeError::kind`] maps each variant onto its
//! exit-code category.

use ippcode_common::{ErrorKind, FrameKind, StructureError, ValueType};
use thiserror::Error;

/// Errors that occur while loading labels or executing a program.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuntimeError {
    /// Instruction record does not have the shape its opcode needs.
    #[error("malformed instruction at {at}: {source}")]
    Structure {
        at: usize,
        #[source]
        source: StructureError,
    },

    /// The same label is defined twice.
    #[error("label '{label}' redefined at instruction {at}")]
    DuplicateLabel { at: usize, label: String },

    /// JUMP, CALL or a conditional jump names a label that does not exist.
    #[error("undefined label '{label}' at instruction {at}")]
    UndefinedLabel { at: usize, label: String },

    /// DEFVAR of a name that already exists in the frame.
    #[error("variable {frame}@{name} redefined at instruction {at}")]
    Redefinition {
        at: usize,
        frame: FrameKind,
        name: String,
    },

    /// Variable was never declared in the addressed frame.
    #[error("undeclared variable {frame}@{name} at instruction {at}")]
    UndeclaredVariable {
        at: usize,
        frame: FrameKind,
        name: String,
    },

    /// Variable is declared but has no value yet.
    #[error("uninitialized variable {frame}@{name} at instruction {at}")]
    UninitializedVariable {
        at: usize,
        frame: FrameKind,
        name: String,
    },

    /// LF with an empty local stack, or TF with nothing staged.
    #[error("frame {frame} does not exist at instruction {at}")]
    MissingFrame { at: usize, frame: FrameKind },

    /// Operand types do not match what the opcode accepts.
    #[error("{opcode} cannot take {found} operand(s) at instruction {at}")]
    WrongOperandType {
        at: usize,
        opcode: &'static str,
        found: String,
    },

    /// IDIV with a zero divisor.
    #[error("division by zero at instruction {at}")]
    DivisionByZero { at: usize },

    /// EXIT with a code outside 0..=9.
    #[error("exit code {code} out of range 0..=9 at instruction {at}")]
    InvalidExitCode { at: usize, code: i64 },

    /// INT2CHAR of a value that is not a Unicode scalar value.
    #[error("{value} is not a valid character code at instruction {at}")]
    InvalidCodepoint { at: usize, value: i64 },

    /// String index outside the string.
    #[error("string index {index} out of range (length {length}) at instruction {at}")]
    IndexOutOfRange { at: usize, index: i64, length: usize },

    /// SETCHAR with an empty replacement string.
    #[error("empty replacement string at instruction {at}")]
    EmptyReplacement { at: usize },

    /// RETURN with an empty call stack.
    #[error("RETURN with empty call stack at instruction {at}")]
    CallStackEmpty { at: usize },

    /// POPS with an empty data stack.
    #[error("POPS with empty data stack at instruction {at}")]
    DataStackEmpty { at: usize },

    /// An output channel could not be written.
    #[error("output error at instruction {at}: {message}")]
    Output { at: usize, message: String },
}

impl RuntimeError {
    /// Exit-code category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            RuntimeError::Structure { .. } => ErrorKind::Structural,
            RuntimeError::DuplicateLabel { .. }
            | RuntimeError::UndefinedLabel { .. }
            | RuntimeError::Redefinition { .. } => ErrorKind::Semantic,
            RuntimeError::UndeclaredVariable { .. }
            | RuntimeError::UninitializedVariable { .. } => ErrorKind::UndefinedVariable,
            RuntimeError::MissingFrame { .. } => ErrorKind::FrameAccess,
            RuntimeError::WrongOperandType { .. } => ErrorKind::WrongOperandType,
            RuntimeError::DivisionByZero { .. } | RuntimeError::InvalidExitCode { .. } => {
                ErrorKind::OperandValue
            }
            RuntimeError::InvalidCodepoint { .. }
            | RuntimeError::IndexOutOfRange { .. }
            | RuntimeError::EmptyReplacement { .. } => ErrorKind::StringOperation,
            RuntimeError::CallStackEmpty { .. } | RuntimeError::DataStackEmpty { .. } => {
                ErrorKind::Value
            }
            RuntimeError::Output { .. } => ErrorKind::Internal,
        }
    }

    /// Build a [`RuntimeError::WrongOperandType`] listing the offending types.
    pub(crate) fn wrong_types(at: usize, opcode: &'static str, types: &[ValueType]) -> Self {
        let found = types
            .iter()
            .map(ValueType::name)
            .collect::<Vec<_>>()
            .join(", ");
        RuntimeError::WrongOperandType { at, opcode, found }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formats() {
        assert_eq!(
            RuntimeError::DivisionByZero { at: 5 }.to_string(),
            "division by zero at instruction 5"
        );
        assert_eq!(
            RuntimeError::UndeclaredVariable {
                at: 2,
                frame: FrameKind::Global,
                name: "x".into()
            }
            .to_string(),
            "undeclared variable GF@x at instruction 2"
        );
        assert_eq!(
            RuntimeError::wrong_types(0, "ADD", &[ValueType::Int, ValueType::Bool]).to_string(),
            "ADD cannot take int, bool operand(s) at instruction 0"
        );
    }

    #[test]
    fn categories() {
        assert_eq!(
            RuntimeError::UninitializedVariable {
                at: 0,
                frame: FrameKind::Local,
                name: "a".into()
            }
            .kind(),
            ErrorKind::UndefinedVariable
        );
        assert_eq!(
            RuntimeError::MissingFrame {
                at: 0,
                frame: FrameKind::Temporary
            }
            .kind(),
            ErrorKind::FrameAccess
        );
        assert_eq!(RuntimeError::CallStackEmpty { at: 0 }.kind(), ErrorKind::Value);
        assert_eq!(
            RuntimeError::InvalidExitCode { at: 0, code: 10 }.kind(),
            ErrorKind::OperandValue
        );
        assert_eq!(RuntimeError::EmptyReplacement { at: 0 }.kind(), ErrorKind::StringOperation);
        assert_eq!(
            RuntimeError::DuplicateLabel {
                at: 3,
                label: "l".into()
            }
            .kind(),
            ErrorKind::Semantic
        );
    }
}
