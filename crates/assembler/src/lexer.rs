//! Tokenizer for IPPcode24 source text.

/// Tokenize a single line of source text.
///
/// Returns an empty Vec for blank lines and comment-only lines.
/// Comments start with `#` and extend to end of line. Literals cannot
/// contain a raw `#` or whitespace; both must be written as `\DDD`.
pub(crate) fn tokenize_line(line: &str) -> Vec<&str> {
    let line = match line.find('#') {
        Some(pos) => &line[..pos],
        None => line,
    };
    line.split_whitespace().collect()
}

/// Returns true if `tokens` form the `.IPPcode24` header line.
pub(crate) fn is_header(tokens: &[&str]) -> bool {
    matches!(tokens, [word] if word.eq_ignore_ascii_case(".IPPcode24"))
}
