//! Program representation: instructions in execution order.

use crate::error::StructureError;
use crate::instruction::Instruction;

/// An IPPcode24 program: instructions sorted by their order number.
///
/// The position of an instruction in [`Program::instructions`] is the
/// index the instruction pointer uses.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Program {
    instructions: Vec<Instruction>,
}

impl Program {
    /// Build a program, sorting by order number.
    ///
    /// Order numbers must be unique; gaps are allowed.
    pub fn new(mut instructions: Vec<Instruction>) -> Result<Self, StructureError> {
        instructions.sort_by_key(Instruction::order);
        if let Some(pair) = instructions
            .windows(2)
            .find(|pair| pair[0].order() == pair[1].order())
        {
            return Err(StructureError::DuplicateOrder(pair[0].order()));
        }
        Ok(Self { instructions })
    }

    /// The instruction stream.
    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    /// Instruction at `index`.
    pub fn get(&self, index: usize) -> Option<&Instruction> {
        self.instructions.get(index)
    }

    /// Number of instructions in the program.
    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    /// Returns true if the program has no instructions.
    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }
}
