//! Error types for the IPPcode24 assembler.

use ippcode_common::{ErrorKind, StructureError};
use thiserror::Error;

/// Errors produced while assembling source text into a program.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AsmError {
    /// The source has no significant line at all.
    #[error("missing .IPPcode24 header")]
    MissingHeader,

    /// The first significant line is not the `.IPPcode24` header.
    #[error("line {line}: expected .IPPcode24 header, found '{token}'")]
    InvalidHeader { line: usize, token: String },

    /// An unrecognized opcode mnemonic was encountered.
    #[error("line {line}: unknown opcode '{token}'")]
    UnknownOpcode { line: usize, token: String },

    /// An instruction line is structurally invalid.
    #[error("line {line}: {source}")]
    Structure {
        line: usize,
        #[source]
        source: StructureError,
    },

    /// The assembled instructions do not form a valid program.
    #[error("invalid program: {0}")]
    Program(#[from] StructureError),
}

impl AsmError {
    /// Exit-code category. Every assembler error is structural.
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::Structural
    }
}
