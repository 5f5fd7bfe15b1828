//! Input and output channels used by READ, WRITE, DPRINT and BREAK.
//!
//! The engine only sees the [`InputReader`] and [`OutputWriter`] traits.
//! [`LineReader`] and [`StreamWriter`] adapt any `BufRead` / `Write`, which
//! is what the CLI wires to stdin, stdout and stderr and what tests wire
//! to in-memory buffers.

use std::io::{self, BufRead, Write};

/// Typed line-oriented input. `None` means the value is missing or does
/// not parse; READ turns that into nil.
pub trait InputReader {
    fn read_int(&mut self) -> Option<i64>;
    fn read_bool(&mut self) -> Option<bool>;
    fn read_string(&mut self) -> Option<String>;
}

/// Typed output.
pub trait OutputWriter {
    fn write_int(&mut self, value: i64) -> io::Result<()>;
    fn write_bool(&mut self, value: bool) -> io::Result<()>;
    fn write_string(&mut self, value: &str) -> io::Result<()>;
}

/// The three channels a run talks to.
pub struct Channels<'a> {
    /// Source for READ.
    pub input: &'a mut dyn InputReader,
    /// Target for WRITE.
    pub stdout: &'a mut dyn OutputWriter,
    /// Diagnostic target for DPRINT and BREAK.
    pub stderr: &'a mut dyn OutputWriter,
}

/// Reads one value per line from a buffered reader.
#[derive(Debug)]
pub struct LineReader<R> {
    inner: R,
}

impl<R: BufRead> LineReader<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }

    /// Next line without its terminator, or `None` at end of input.
    ///
    /// A read error is treated like end of input.
    fn next_line(&mut self) -> Option<String> {
        let mut line = String::new();
        match self.inner.read_line(&mut line) {
            Ok(0) | Err(_) => None,
            Ok(_) => {
                if line.ends_with('\n') {
                    line.pop();
                    if line.ends_with('\r') {
                        line.pop();
                    }
                }
                Some(line)
            }
        }
    }
}

impl<R: BufRead> InputReader for LineReader<R> {
    fn read_int(&mut self) -> Option<i64> {
        self.next_line()?.trim().parse().ok()
    }

    /// `true` in any letter case is true; any other line is false.
    fn read_bool(&mut self) -> Option<bool> {
        self.next_line()
            .map(|line| line.trim().eq_ignore_ascii_case("true"))
    }

    fn read_string(&mut self) -> Option<String> {
        self.next_line()
    }
}

/// Writes rendered values to any `Write`.
#[derive(Debug)]
pub struct StreamWriter<W> {
    inner: W,
}

impl<W: Write> StreamWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }

    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> OutputWriter for StreamWriter<W> {
    fn write_int(&mut self, value: i64) -> io::Result<()> {
        write!(self.inner, "{value}")
    }

    fn write_bool(&mut self, value: bool) -> io::Result<()> {
        self.inner
            .write_all(if value { b"true" } else { b"false" })
    }

    fn write_string(&mut self, value: &str) -> io::Result<()> {
        self.inner.write_all(value.as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn reader(text: &str) -> LineReader<Cursor<Vec<u8>>> {
        LineReader::new(Cursor::new(text.as_bytes().to_vec()))
    }

    #[test]
    fn reads_typed_lines() {
        let mut input = reader("42\nTrUe\nhello world\n");
        assert_eq!(input.read_int(), Some(42));
        assert_eq!(input.read_bool(), Some(true));
        assert_eq!(input.read_string(), Some("hello world".to_string()));
        assert_eq!(input.read_string(), None);
    }

    #[test]
    fn unparsable_int_is_missing() {
        let mut input = reader("forty\n 7 \n");
        assert_eq!(input.read_int(), None);
        assert_eq!(input.read_int(), Some(7));
        assert_eq!(input.read_int(), None);
    }

    #[test]
    fn any_other_bool_is_false() {
        let mut input = reader("yes\n");
        assert_eq!(input.read_bool(), Some(false));
        assert_eq!(input.read_bool(), None);
    }

    #[test]
    fn crlf_and_missing_final_newline() {
        let mut input = reader("a\r\nb");
        assert_eq!(input.read_string(), Some("a".to_string()));
        assert_eq!(input.read_string(), Some("b".to_string()));
    }

    #[test]
    fn empty_line_is_an_empty_string() {
        let mut input = reader("\n");
        assert_eq!(input.read_string(), Some(String::new()));
    }

    #[test]
    fn writes_rendered_values() {
        let mut out = StreamWriter::new(Vec::new());
        out.write_int(-3).unwrap();
        out.write_bool(true).unwrap();
        out.write_string(" ok").unwrap();
        assert_eq!(out.into_inner(), b"-3true ok");
    }
}
