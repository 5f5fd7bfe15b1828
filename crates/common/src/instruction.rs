//! Instruction records.
//!
//! An instruction is an opcode, its source order number and up to three
//! operands. Records are only built through [`Instruction::new`], which
//! checks the operands against [`Opcode::signature`], so the engine never
//! sees a malformed record.

use std::fmt;

use crate::error::StructureError;
use crate::opcode::Opcode;
use crate::operand::Operand;
use crate::value::Value;

/// A single validated IPPcode24 instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    order: u64,
    opcode: Opcode,
    operands: Vec<Operand>,
}

impl Instruction {
    /// Create a new instruction, checking operand count and kinds.
    pub fn new(order: u64, opcode: Opcode, operands: Vec<Operand>) -> Result<Self, StructureError> {
        let signature = opcode.signature();
        if operands.len() != signature.len() {
            return Err(StructureError::OperandCount {
                opcode: opcode.mnemonic(),
                expected: signature.len(),
                found: operands.len(),
            });
        }

        for (position, (operand, &kind)) in operands.iter().zip(signature).enumerate() {
            if !operand.fits(kind) {
                return Err(StructureError::OperandKind {
                    opcode: opcode.mnemonic(),
                    position: position + 1,
                    expected: kind.name(),
                });
            }
        }

        Ok(Self {
            order,
            opcode,
            operands,
        })
    }

    /// Source order number.
    pub fn order(&self) -> u64 {
        self.order
    }

    /// The operation to perform.
    pub fn opcode(&self) -> Opcode {
        self.opcode
    }

    /// Operands in signature order.
    pub fn operands(&self) -> &[Operand] {
        &self.operands
    }

    /// Operand at `index`, if present.
    pub fn operand(&self, index: usize) -> Option<&Operand> {
        self.operands.get(index)
    }

    /// Name defined by a `LABEL` instruction.
    pub fn label_name(&self) -> Option<&str> {
        match (self.opcode, self.operands.first()) {
            (Opcode::Label, Some(Operand::Label(name))) => Some(name),
            _ => None,
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.opcode.mnemonic())?;
        for operand in &self.operands {
            match operand {
                Operand::Var(v) => write!(f, " {v}")?,
                Operand::Label(name) => write!(f, " {name}")?,
                Operand::Type(t) => write!(f, " {t}")?,
                Operand::Literal(Value::Type(t)) => write!(f, " type@{t}")?,
                Operand::Literal(Value::Nil) => f.write_str(" nil@nil")?,
                Operand::Literal(v) => write!(f, " {}@{v}", v.value_type())?,
            }
        }
        Ok(())
    }
}
