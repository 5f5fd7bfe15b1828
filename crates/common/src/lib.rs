//! IPPcode24 common types.
//!
//! This crate provides the instruction records shared by the loader and
//! the interpreter:
//!
//! - [`Opcode`]: the 35 IPPcode24 opcodes and their operand signatures
//! - [`Value`] / [`ValueType`]: runtime values and their type names
//! - [`Operand`]: variable references, labels, literals and types
//! - [`Instruction`]: a validated instruction record
//! - [`Program`]: instructions in execution order
//! - [`StructureError`] / [`ErrorKind`]: load errors and exit codes

pub mod error;
pub mod instruction;
pub mod opcode;
pub mod operand;
pub mod program;
pub mod value;

// Re-export commonly used types at the crate root.
pub use error::{ErrorKind, StructureError};
pub use instruction::Instruction;
pub use opcode::{OperandKind, Opcode};
pub use operand::{FrameKind, Operand, VarRef};
pub use program::Program;
pub use value::{Value, ValueType};
