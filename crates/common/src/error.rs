//! Structural errors and the exit-code table for IPPcode24.

use thiserror::Error;

/// Error category of a failed load or run.
///
/// Every error type in the workspace maps onto one of these, and each
/// category has a fixed process exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The source or input file could not be opened.
    InputFile,
    /// Malformed instruction or operand shape.
    Structural,
    /// Redeclared variable, undefined or duplicate label.
    Semantic,
    /// Operand has the wrong type for the opcode.
    WrongOperandType,
    /// Read of an undeclared or uninitialised variable.
    UndefinedVariable,
    /// Local or temporary frame does not exist.
    FrameAccess,
    /// Pop from an empty call or data stack.
    Value,
    /// Operand has the right type but an illegal value.
    OperandValue,
    /// Invalid string index or ordinal.
    StringOperation,
    /// Failure outside the program's control, such as a broken output pipe.
    Internal,
}

impl ErrorKind {
    /// Process exit code reported for this category.
    pub fn exit_code(&self) -> i32 {
        match self {
            ErrorKind::InputFile => 11,
            ErrorKind::Structural => 32,
            ErrorKind::Semantic => 52,
            ErrorKind::WrongOperandType => 53,
            ErrorKind::UndefinedVariable => 54,
            ErrorKind::FrameAccess => 55,
            ErrorKind::Value => 56,
            ErrorKind::OperandValue => 57,
            ErrorKind::StringOperation => 58,
            ErrorKind::Internal => 99,
        }
    }
}

/// Errors raised while building instruction records, before execution.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StructureError {
    /// Opcode name is not part of the instruction set.
    #[error("unknown opcode '{0}'")]
    UnknownOpcode(String),

    /// Opcode received the wrong number of operands.
    #[error("{opcode} expects {expected} operand(s), found {found}")]
    OperandCount {
        opcode: &'static str,
        expected: usize,
        found: usize,
    },

    /// Operand at `position` (1-based) has the wrong kind.
    #[error("{opcode} operand {position} must be a {expected}")]
    OperandKind {
        opcode: &'static str,
        position: usize,
        expected: &'static str,
    },

    /// Frame prefix other than GF, LF or TF.
    #[error("invalid frame '{0}'")]
    InvalidFrame(String),

    /// Variable or label name with illegal characters.
    #[error("invalid identifier '{0}'")]
    InvalidIdentifier(String),

    /// Literal type prefix is not int, bool, string or nil.
    #[error("unknown literal type '{0}'")]
    UnknownLiteralType(String),

    /// Type operand is not int, bool or string.
    #[error("invalid type name '{0}'")]
    InvalidTypeName(String),

    /// Literal text does not parse for its declared type.
    #[error("invalid {ty} literal '{text}'")]
    InvalidLiteral { ty: &'static str, text: String },

    /// String literal contains a backslash not followed by three digits.
    #[error("invalid escape sequence in '{0}'")]
    InvalidEscape(String),

    /// Two instructions share the same order number.
    #[error("duplicate instruction order {0}")]
    DuplicateOrder(u64),
}

impl StructureError {
    /// Every structure error is in the structural category.
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::Structural
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes() {
        assert_eq!(ErrorKind::Structural.exit_code(), 32);
        assert_eq!(ErrorKind::Semantic.exit_code(), 52);
        assert_eq!(ErrorKind::WrongOperandType.exit_code(), 53);
        assert_eq!(ErrorKind::UndefinedVariable.exit_code(), 54);
        assert_eq!(ErrorKind::FrameAccess.exit_code(), 55);
        assert_eq!(ErrorKind::Value.exit_code(), 56);
        assert_eq!(ErrorKind::OperandValue.exit_code(), 57);
        assert_eq!(ErrorKind::StringOperation.exit_code(), 58);
    }

    #[test]
    fn display_unknown_opcode() {
        assert_eq!(
            StructureError::UnknownOpcode("FROB".to_string()).to_string(),
            "unknown opcode 'FROB'"
        );
    }

    #[test]
    fn display_operand_count() {
        let e = StructureError::OperandCount {
            opcode: "ADD",
            expected: 3,
            found: 2,
        };
        assert_eq!(e.to_string(), "ADD expects 3 operand(s), found 2");
    }

    #[test]
    fn display_invalid_literal() {
        let e = StructureError::InvalidLiteral {
            ty: "int",
            text: "12a".to_string(),
        };
        assert_eq!(e.to_string(), "invalid int literal '12a'");
        assert_eq!(e.kind(), ErrorKind::Structural);
    }
}
