//! Subcommand implementations.
//!
//! Each command reports its own errors on stderr and returns the process
//! exit code in `Err`.

use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter};
use std::path::Path;

use ippcode_assembler::assemble;
use ippcode_common::{ErrorKind, Program};
use ippcode_vm::{Channels, InputReader, LabelTable, LineReader, StreamWriter};
use tracing::{debug, info};

/// Assemble and execute `source`.
///
/// Returns the program's exit code. Output written before a runtime
/// error is flushed before the error is reported.
pub fn run(source: &Path, input: Option<&Path>) -> Result<u8, i32> {
    let program = load(source)?;

    let mut reader: Box<dyn InputReader> = match input {
        Some(path) => {
            let file = File::open(path).map_err(|e| {
                eprintln!("error: cannot open input {}: {e}", path.display());
                ErrorKind::InputFile.exit_code()
            })?;
            Box::new(LineReader::new(BufReader::new(file)))
        }
        None => Box::new(LineReader::new(io::stdin().lock())),
    };
    let mut stdout = StreamWriter::new(BufWriter::new(io::stdout()));
    let mut stderr = StreamWriter::new(io::stderr());

    let channels = Channels {
        input: reader.as_mut(),
        stdout: &mut stdout,
        stderr: &mut stderr,
    };
    let result = ippcode_vm::run(&program, channels);
    let flushed = stdout.flush();

    let code = result.map_err(|e| {
        eprintln!("runtime error: {e}");
        e.kind().exit_code()
    })?;
    flushed.map_err(|e| {
        eprintln!("error: cannot write output: {e}");
        ErrorKind::Internal.exit_code()
    })?;

    info!(code, "program finished");
    Ok(code)
}

/// Assemble `source` and build its label table without executing it.
pub fn check(source: &Path) -> Result<(), i32> {
    let program = load(source)?;
    let labels = LabelTable::build(&program).map_err(|e| {
        eprintln!("error: {e}");
        e.kind().exit_code()
    })?;

    println!(
        "{}: {} instructions, {} labels",
        source.display(),
        program.len(),
        labels.len()
    );
    Ok(())
}

fn load(path: &Path) -> Result<Program, i32> {
    let text = fs::read_to_string(path).map_err(|e| {
        eprintln!("error: cannot read {}: {e}", path.display());
        ErrorKind::InputFile.exit_code()
    })?;
    debug!(path = %path.display(), bytes = text.len(), "loaded source");

    assemble(&text).map_err(|e| {
        eprintln!("error: {}: {e}", path.display());
        e.kind().exit_code()
    })
}
