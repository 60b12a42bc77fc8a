//! Tokenization of a raw input line into whitespace-delimited words.
//!
//! The interpreter treats the tokenizer as a black box producing an ordered
//! sequence of strings; there is no quoting, escaping or expansion. The three
//! operator tokens the interpreter recognizes are defined here so the rest of
//! the crate never spells them inline.

/// Pipe separator between pipeline stages.
pub const PIPE: &str = "|";

/// Input redirection operator.
pub const REDIRECT_INPUT: &str = "<";

/// Output redirection operator.
pub const REDIRECT_OUTPUT: &str = ">";

/// Split a raw line into tokens. Order is significant and preserved; index 0
/// is the command name. A blank line yields an empty sequence.
pub fn split(line: &str) -> Vec<String> {
    line.split_whitespace().map(str::to_owned).collect()
}
