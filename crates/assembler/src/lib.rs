//! IPPcode24 assembler: source text to validated instruction records.
//!
//! The translation is line by line. Each instruction line becomes one
//! [`Instruction`](ippcode_common::Instruction) whose order number is its
//! position among instruction lines, starting at 1.
//!
//! # Usage
//!
//! ```
//! use ippcode_assembler::assemble;
//! use ippcode_common::Opcode;
//!
//! let text = ".IPPcode24\nDEFVAR GF@x # counter\nMOVE GF@x int@42\n";
//! let program = assemble(text).unwrap();
//! assert_eq!(program.len(), 2);
//! assert_eq!(program.instructions()[1].opcode(), Opcode::Move);
//! ```

pub mod error;

mod lexer;
mod parser;

pub use error::AsmError;

use ippcode_common::Program;
use lexer::{is_header, tokenize_line};
use parser::parse_line;
use tracing::debug;

/// Assemble source text into a program.
///
/// The first significant line must be the `.IPPcode24` header. Returns
/// the first error encountered.
pub fn assemble(text: &str) -> Result<Program, AsmError> {
    let mut lines = text
        .lines()
        .enumerate()
        .map(|(idx, line)| (idx + 1, tokenize_line(line)))
        .filter(|(_, tokens)| !tokens.is_empty());

    match lines.next() {
        None => return Err(AsmError::MissingHeader),
        Some((_, tokens)) if is_header(&tokens) => {}
        Some((line, tokens)) => {
            return Err(AsmError::InvalidHeader {
                line,
                token: tokens.join(" "),
            })
        }
    }

    let mut instructions = Vec::new();
    for (line_num, tokens) in lines {
        let order = instructions.len() as u64 + 1;
        if let Some(instr) = parse_line(&tokens, line_num, order)? {
            instructions.push(instr);
        }
    }

    debug!(instructions = instructions.len(), "assembled");
    Ok(Program::new(instructions)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ippcode_common::Opcode;

    #[test]
    fn assemble_minimal() {
        let program = assemble(".IPPcode24\nWRITE string@hi\n").unwrap();
        assert_eq!(program.len(), 1);
        assert_eq!(program.instructions()[0].opcode(), Opcode::Write);
        assert_eq!(program.instructions()[0].order(), 1);
    }

    #[test]
    fn header_only() {
        assert!(assemble(".IPPcode24").unwrap().is_empty());
    }

    #[test]
    fn leading_comments_and_blank_lines() {
        let program = assemble("# prologue\n\n   \n.IPPCODE24\n\nBREAK\n").unwrap();
        assert_eq!(program.len(), 1);
    }

    #[test]
    fn empty_text() {
        assert_eq!(assemble(""), Err(AsmError::MissingHeader));
        assert_eq!(assemble("# only a comment\n"), Err(AsmError::MissingHeader));
    }

    #[test]
    fn instruction_before_header() {
        assert_eq!(
            assemble("\nCREATEFRAME\n.IPPcode24\n"),
            Err(AsmError::InvalidHeader {
                line: 2,
                token: "CREATEFRAME".to_string()
            })
        );
    }

    #[test]
    fn second_header_is_an_unknown_opcode() {
        assert!(matches!(
            assemble(".IPPcode24\n.IPPcode24\n"),
            Err(AsmError::UnknownOpcode { line: 2, .. })
        ));
    }

    #[test]
    fn orders_skip_comment_lines() {
        let program = assemble(".IPPcode24\n# a\nCREATEFRAME\n# b\nPUSHFRAME\n").unwrap();
        let orders: Vec<u64> = program.instructions().iter().map(|i| i.order()).collect();
        assert_eq!(orders, [1, 2]);
    }
}
