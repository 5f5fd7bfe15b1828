//! Integration tests for the IPPcode24 assembler.
//!
//! Tests cover:
//! - Complete programs (assemble, then execute on the VM)
//! - Source-format details (header, comments, case, escapes)
//! - Error cases with their line numbers and exit-code category

use std::io::Cursor;

use ippcode_assembler::{assemble, AsmError};
use ippcode_common::{ErrorKind, Opcode, StructureError};
use ippcode_vm::{run, Channels, LineReader, RuntimeError, StreamWriter};
use proptest::prelude::*;

// ---- Test helpers ----

/// Assemble and run `source`, returning the run result and stdout.
fn run_source(source: &str, input: &str) -> (Result<u8, RuntimeError>, String) {
    let program = assemble(source).unwrap();
    let mut reader = LineReader::new(Cursor::new(input.as_bytes().to_vec()));
    let mut stdout = StreamWriter::new(Vec::new());
    let mut stderr = StreamWriter::new(Vec::new());
    let io = Channels {
        input: &mut reader,
        stdout: &mut stdout,
        stderr: &mut stderr,
    };
    let result = run(&program, io);
    (result, String::from_utf8(stdout.into_inner()).unwrap())
}

const ITERATIVE_FACTORIAL: &str = "\
.IPPcode24
# iterative factorial of the number read from input
DEFVAR GF@n
DEFVAR GF@acc
READ GF@n int
MOVE GF@acc int@1
LABEL loop
JUMPIFEQ done GF@n int@0
MUL GF@acc GF@acc GF@n
SUB GF@n GF@n int@1
JUMP loop
LABEL done
WRITE GF@acc
";

const RECURSIVE_FACTORIAL: &str = "\
.IPPcode24
DEFVAR GF@result
CREATEFRAME
DEFVAR TF@n
MOVE TF@n int@4
CALL fact
WRITE GF@result
EXIT int@0

LABEL fact          # argument in LF@n, result in GF@result
PUSHFRAME
DEFVAR LF@m
JUMPIFEQ base LF@n int@0
SUB LF@m LF@n int@1
CREATEFRAME
DEFVAR TF@n
MOVE TF@n LF@m
CALL fact
MUL GF@result GF@result LF@n
POPFRAME
RETURN
LABEL base
MOVE GF@result int@1
POPFRAME
RETURN
";

// ---- Complete programs ----

#[test]
fn iterative_factorial() {
    let (result, out) = run_source(ITERATIVE_FACTORIAL, "5\n");
    assert_eq!(result, Ok(0));
    assert_eq!(out, "120");
}

#[test]
fn recursive_factorial_with_frames() {
    let (result, out) = run_source(RECURSIVE_FACTORIAL, "");
    assert_eq!(result, Ok(0));
    assert_eq!(out, "24");
}

#[test]
fn hello_world_with_escapes() {
    let (result, out) = run_source(".IPPcode24\nWRITE string@Hello\\032world\\010\n", "");
    assert_eq!(result, Ok(0));
    assert_eq!(out, "Hello world\n");
}

#[test]
fn string_builtins() {
    let source = "\
.IPPcode24
DEFVAR GF@s
DEFVAR GF@n
MOVE GF@s string@kočka
STRLEN GF@n GF@s
WRITE GF@n
SETCHAR GF@s int@0 string@m
WRITE GF@s
GETCHAR GF@s GF@s int@2
WRITE GF@s
";
    let (result, out) = run_source(source, "");
    assert_eq!(result, Ok(0));
    assert_eq!(out, "5močkač");
}

#[test]
fn exit_code_from_program() {
    let (result, _) = run_source(".IPPcode24\nexit int@3\n", "");
    assert_eq!(result, Ok(3));
}

#[test]
fn runtime_error_category_from_source() {
    let (result, _) = run_source(".IPPcode24\nDEFVAR GF@x\nWRITE GF@x\n", "");
    assert_eq!(result.unwrap_err().kind(), ErrorKind::UndefinedVariable);
}

// ---- Source format ----

#[test]
fn mnemonics_are_case_insensitive() {
    let program = assemble(".ippcode24\ncreateFrame\nPushFrame\npopframe\n").unwrap();
    let opcodes: Vec<Opcode> = program.instructions().iter().map(|i| i.opcode()).collect();
    assert_eq!(
        opcodes,
        [Opcode::CreateFrame, Opcode::PushFrame, Opcode::PopFrame]
    );
}

#[test]
fn windows_line_endings() {
    let program = assemble(".IPPcode24\r\nDEFVAR GF@a\r\nBREAK\r\n").unwrap();
    assert_eq!(program.len(), 2);
}

#[test]
fn instruction_display_is_source_notation() {
    let program = assemble(".IPPcode24\nJUMPIFEQ end GF@a nil@nil\nREAD GF@a int\n").unwrap();
    assert_eq!(
        program.instructions()[0].to_string(),
        "JUMPIFEQ end GF@a nil@nil"
    );
    assert_eq!(program.instructions()[1].to_string(), "READ GF@a int");
}

// ---- Error cases ----

#[test]
fn error_unknown_opcode() {
    let err = assemble(".IPPcode24\nMOVE GF@a int@1\nPRINT GF@a\n").unwrap_err();
    assert_eq!(
        err,
        AsmError::UnknownOpcode {
            line: 3,
            token: "PRINT".to_string()
        }
    );
    assert_eq!(err.kind().exit_code(), 32);
}

#[test]
fn error_missing_header() {
    assert_eq!(assemble("").unwrap_err(), AsmError::MissingHeader);
    assert!(matches!(
        assemble("DEFVAR GF@a\n"),
        Err(AsmError::InvalidHeader { line: 1, .. })
    ));
}

#[test]
fn error_operand_count() {
    let err = assemble(".IPPcode24\n\nADD GF@a int@1\n").unwrap_err();
    assert!(matches!(
        err,
        AsmError::Structure {
            line: 3,
            source: StructureError::OperandCount { .. }
        }
    ));
}

#[test]
fn error_bad_frame() {
    assert!(matches!(
        assemble(".IPPcode24\nDEFVAR XF@a\n"),
        Err(AsmError::Structure {
            source: StructureError::InvalidFrame(_),
            ..
        })
    ));
}

#[test]
fn error_bad_identifier() {
    assert!(matches!(
        assemble(".IPPcode24\nLABEL 1st\n"),
        Err(AsmError::Structure {
            source: StructureError::InvalidIdentifier(_),
            ..
        })
    ));
}

#[test]
fn error_bad_escape() {
    assert!(assemble(".IPPcode24\nWRITE string@a\\1\n").is_err());
}

#[test]
fn semantic_errors_are_left_to_the_vm() {
    // Duplicate labels and undefined jumps assemble fine.
    let program = assemble(".IPPcode24\nLABEL a\nLABEL a\nJUMP b\n").unwrap();
    assert_eq!(program.len(), 3);
}

// ---- Properties ----

proptest! {
    #[test]
    fn orders_follow_instruction_lines(values in prop::collection::vec(any::<i64>(), 0..20)) {
        let mut source = String::from(".IPPcode24\n");
        for v in &values {
            source.push_str(&format!("# push {v}\nPUSHS int@{v}\n\n"));
        }
        let program = assemble(&source).unwrap();
        prop_assert_eq!(program.len(), values.len());
        for (i, instr) in program.instructions().iter().enumerate() {
            prop_assert_eq!(instr.order(), i as u64 + 1);
        }
    }

    #[test]
    fn written_ints_come_back(values in prop::collection::vec(any::<i64>(), 1..10)) {
        let mut source = String::from(".IPPcode24\n");
        for v in &values {
            source.push_str(&format!("WRITE int@{v}\nWRITE string@\\010\n"));
        }
        let (result, out) = run_source(&source, "");
        prop_assert_eq!(result, Ok(0));
        let expected: String = values.iter().map(|v| format!("{v}\n")).collect();
        prop_assert_eq!(out, expected);
    }
}
