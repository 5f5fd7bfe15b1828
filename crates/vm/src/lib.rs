//! IPPcode24 virtual machine: executes validated instruction records.
//!
//! The VM is a frame-based machine with:
//! - A global frame, a stack of local frames and an optional temporary frame
//! - A label table built once before execution
//! - A call stack of return positions and a data stack of values
//! - Line-based input and two output channels
//!
//! # Usage
//!
//! ```
//! use std::io::Cursor;
//! use ippcode_common::{Instruction, Opcode, Operand, Program};
//! use ippcode_vm::{run, Channels, LineReader, StreamWriter};
//!
//! let hello = Operand::literal("string", "hi").unwrap();
//! let write = Instruction::new(1, Opcode::Write, vec![hello]).unwrap();
//! let program = Program::new(vec![write]).unwrap();
//!
//! let mut input = LineReader::new(Cursor::new(Vec::new()));
//! let mut stdout = StreamWriter::new(Vec::new());
//! let mut stderr = StreamWriter::new(Vec::new());
//! let io = Channels { input: &mut input, stdout: &mut stdout, stderr: &mut stderr };
//!
//! assert_eq!(run(&program, io).unwrap(), 0);
//! assert_eq!(stdout.get_ref().as_slice(), b"hi");
//! ```

pub mod error;
pub mod execute;
pub mod frame;
pub mod io;
pub mod labels;
pub mod machine;
pub mod stack;

pub use error::RuntimeError;
pub use frame::{Frame, FrameError, FrameSet, Slot};
pub use io::{Channels, InputReader, LineReader, OutputWriter, StreamWriter};
pub use labels::LabelTable;
pub use machine::{State, VM};
pub use stack::{CallStack, DataStack};

use ippcode_common::Program;

/// Execute a program and return its exit code.
///
/// This is the primary entry point for the VM. It:
/// 1. Builds the label table, rejecting duplicate labels
/// 2. Executes from the first instruction in order
/// 3. Stops after the last instruction (code 0) or at EXIT
///
/// Output already written when an error occurs stays written.
///
/// # Errors
///
/// Returns [`RuntimeError`] if loading or execution fails. Its
/// [`kind`](RuntimeError::kind) gives the exit-code category.
pub fn run<'a>(program: &'a Program, io: Channels<'a>) -> Result<u8, RuntimeError> {
    let mut vm = VM::new(program, io)?;
    vm.execute()
}
