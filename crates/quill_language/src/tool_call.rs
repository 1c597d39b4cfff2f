//! Sub-parser for the tool-call mini-grammar.
//!
//! A tool call is written `<function>` or `<function; arg, arg, ...>`. The
//! lexer and the string interpolation parser only find where a call starts
//! and ends; this module turns the text between the angle brackets into a
//! [`ToolCall`]. Arguments are split on top-level `,` or `;` and a separator
//! inside a quoted argument never splits it.

use thiserror::Error;

use crate::ast::{Expr, ToolCall};
use crate::interpolation::unescape;
use crate::lexer::{is_ident_char, is_ident_start, is_identifier};
use crate::span::Span;
use crate::token::TokenKind;

/// Errors in the body of a tool call.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ToolCallError {
    /// Nothing before the first `;`.
    #[error("Tool call must have a function name")]
    MissingName,
    /// The function name is not an identifier.
    #[error("Invalid tool call function name: {0}")]
    InvalidName(String),
    /// An argument is neither a literal nor an identifier.
    #[error("Invalid tool call argument: {0}")]
    InvalidArgument(String),
    /// An integer argument does not fit in 64 bits.
    #[error("integer literal out of range: {0}")]
    IntegerOutOfRange(String),
}

/// Parses the text between `<` and `>` into a tool call.
///
/// # Errors
/// Returns an error if the function name is missing or malformed, or if an
/// argument cannot be classified.
pub fn parse_tool_call(inner: &str, span: Span) -> Result<ToolCall, ToolCallError> {
    let (name, rest) = match find_top_level(inner, &[';']) {
        Some(at) => (&inner[..at], Some(&inner[at + 1..])),
        None => (inner, None),
    };

    let function = name.trim();
    if function.is_empty() {
        return Err(ToolCallError::MissingName);
    }
    if !is_identifier(function) {
        return Err(ToolCallError::InvalidName(function.to_string()));
    }

    let mut args = Vec::new();
    if let Some(rest) = rest {
        for raw in split_top_level(rest, &[',', ';']) {
            let arg = raw.trim();
            if arg.is_empty() {
                continue;
            }
            args.push(classify_argument(arg, span)?);
        }
    }

    Ok(ToolCall {
        function: function.to_string(),
        args,
        span,
    })
}

/// Turns one trimmed argument into a literal or identifier expression.
fn classify_argument(arg: &str, span: Span) -> Result<Expr, ToolCallError> {
    if arg.len() >= 2 && arg.starts_with('"') && arg.ends_with('"') {
        return Ok(Expr::String(unescape(&arg[1..arg.len() - 1]), span));
    }
    match arg {
        "true" | "TRUE" => return Ok(Expr::Bool(true, span)),
        "false" | "FALSE" => return Ok(Expr::Bool(false, span)),
        _ => {}
    }
    if arg.bytes().all(|b| b.is_ascii_digit()) {
        return arg
            .parse::<i64>()
            .map(|n| Expr::Int(n, span))
            .map_err(|_| ToolCallError::IntegerOutOfRange(arg.to_string()));
    }
    if is_identifier(arg) && TokenKind::keyword(arg).is_none() {
        return Ok(Expr::Identifier(arg.to_string(), span));
    }
    Err(ToolCallError::InvalidArgument(arg.to_string()))
}

/// Returns true if `text`, which starts at a `<`, looks like the start of a
/// tool call: an identifier followed by `>` or `;`.
pub(crate) fn opens_tool_call(text: &str) -> bool {
    let Some(after) = text.strip_prefix('<') else {
        return false;
    };
    let after = after.trim_start_matches([' ', '\t']);
    if !after.chars().next().is_some_and(is_ident_start) {
        return false;
    }
    let name_end = after.find(|c: char| !is_ident_char(c)).unwrap_or(after.len());
    let tail = after[name_end..].trim_start_matches([' ', '\t']);
    tail.starts_with('>') || tail.starts_with(';')
}

/// Finds the byte index of the `>` closing the tool call that starts at
/// `text[0]`.
///
/// Nested `<`/`>` pairs are counted and quoted arguments are skipped.
pub(crate) fn span_end(text: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_quote = false;
    let mut escaped = false;
    for (i, c) in text.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '"' => in_quote = !in_quote,
            '<' if !in_quote => depth += 1,
            '>' if !in_quote => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

/// Finds the first separator outside quotes.
fn find_top_level(text: &str, separators: &[char]) -> Option<usize> {
    let mut in_quote = false;
    let mut escaped = false;
    for (i, c) in text.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '"' => in_quote = !in_quote,
            c if !in_quote && separators.contains(&c) => return Some(i),
            _ => {}
        }
    }
    None
}

/// Splits on every separator outside quotes.
fn split_top_level<'a>(text: &'a str, separators: &[char]) -> Vec<&'a str> {
    let mut parts = Vec::new();
    let mut rest = text;
    while let Some(at) = find_top_level(rest, separators) {
        parts.push(&rest[..at]);
        rest = &rest[at + 1..];
    }
    parts.push(rest);
    parts
}
