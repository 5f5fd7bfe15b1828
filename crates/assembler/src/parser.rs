//! Parser for IPPcode24 instruction lines.
//!
//! The opcode's signature decides how each operand token is read, so
//! `LABEL end` and `WRITE GF@end` parse their operands differently.

use ippcode_common::{Instruction, Opcode, Operand, StructureError};

use crate::error::AsmError;

/// Parse the tokens of one instruction line.
///
/// Returns `Ok(None)` for blank lines (empty token list).
pub(crate) fn parse_line(
    tokens: &[&str],
    line_num: usize,
    order: u64,
) -> Result<Option<Instruction>, AsmError> {
    let Some((&mnemonic, args)) = tokens.split_first() else {
        return Ok(None);
    };

    let opcode: Opcode = mnemonic.parse().map_err(|_| AsmError::UnknownOpcode {
        line: line_num,
        token: mnemonic.to_string(),
    })?;

    let structure = |source: StructureError| AsmError::Structure {
        line: line_num,
        source,
    };

    let signature = opcode.signature();
    if args.len() != signature.len() {
        return Err(structure(StructureError::OperandCount {
            opcode: opcode.mnemonic(),
            expected: signature.len(),
            found: args.len(),
        }));
    }

    let operands = signature
        .iter()
        .zip(args)
        .map(|(&kind, text)| Operand::parse_as(kind, text))
        .collect::<Result<Vec<_>, _>>()
        .map_err(structure)?;

    Instruction::new(order, opcode, operands)
        .map(Some)
        .map_err(structure)
}
