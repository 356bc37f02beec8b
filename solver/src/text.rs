/// Splits a line into whitespace separated tokens together with their
/// 1-based column.
pub(crate) fn tokens(line: &str) -> impl Iterator<Item = (usize, &str)> + '_ {
    let base = line.as_ptr() as usize;
    line.split_whitespace()
        .map(move |token| (token.as_ptr() as usize - base + 1, token))
}

/// Column of the first non-blank character of a line
pub(crate) fn indent(line: &str) -> usize {
    line.len() - line.trim_start().len() + 1
}
