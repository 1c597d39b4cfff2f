//! String literal decoding and interpolation.
//!
//! The lexer hands the parser the raw text between the quotes. This module
//! decodes escapes and splits the text into literal parts, `{name}` variable
//! references, and `<function; args>` tool calls.

use crate::ast::{Expr, StringPart};
use crate::lexer::is_identifier;
use crate::span::Span;
use crate::tool_call::{ToolCallError, opens_tool_call, parse_tool_call, span_end};

/// Parses the raw contents of a string literal.
///
/// Returns [`Expr::String`] when the text holds no variable or tool call,
/// and [`Expr::Interpolated`] otherwise. A `{...}` whose contents are not an
/// identifier stays literal text.
///
/// # Errors
/// Returns an error if an embedded tool call is malformed.
pub fn parse_string(raw: &str, span: Span) -> Result<Expr, ToolCallError> {
    let mut parts = Vec::new();
    let mut text = String::new();
    let mut interpolated = false;
    let mut i = 0;

    while let Some(c) = raw[i..].chars().next() {
        match c {
            '\\' => match raw[i + 1..].chars().next() {
                Some(next) => {
                    push_escape(&mut text, next);
                    i += 1 + next.len_utf8();
                }
                None => {
                    text.push('\\');
                    i += 1;
                }
            },
            '{' => {
                if let Some((name, consumed)) = variable_at(&raw[i..]) {
                    flush(&mut parts, &mut text);
                    parts.push(StringPart::Variable(name.to_string()));
                    interpolated = true;
                    i += consumed;
                } else {
                    text.push('{');
                    i += 1;
                }
            }
            '<' if opens_tool_call(&raw[i..]) => {
                let rest = &raw[i..];
                let line = rest.find('\n').map_or(rest, |end| &rest[..end]);
                if let Some(end) = span_end(line) {
                    flush(&mut parts, &mut text);
                    let call = parse_tool_call(&rest[1..end], span)?;
                    parts.push(StringPart::ToolCall(call));
                    interpolated = true;
                    i += end + 1;
                } else {
                    text.push('<');
                    i += 1;
                }
            }
            _ => {
                text.push(c);
                i += c.len_utf8();
            }
        }
    }

    if !interpolated {
        return Ok(Expr::String(text, span));
    }
    flush(&mut parts, &mut text);
    Ok(Expr::Interpolated(parts, span))
}

/// Decodes escapes without looking for interpolation.
#[must_use]
pub fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some(next) => push_escape(&mut out, next),
                None => out.push('\\'),
            }
        } else {
            out.push(c);
        }
    }
    out
}

/// Encodes text so that [`parse_string`] reads it back as plain text.
#[must_use]
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            '"' | '\\' | '{' | '}' | '<' | '>' => {
                out.push('\\');
                out.push(c);
            }
            _ => out.push(c),
        }
    }
    out
}

fn push_escape(out: &mut String, c: char) {
    match c {
        'n' => out.push('\n'),
        't' => out.push('\t'),
        'r' => out.push('\r'),
        '"' | '\\' | '{' | '}' | '<' | '>' => out.push(c),
        _ => {
            out.push('\\');
            out.push(c);
        }
    }
}

/// Matches `{name}` at the start of `text`; returns the name and the bytes
/// consumed.
fn variable_at(text: &str) -> Option<(&str, usize)> {
    let close = text.find('}')?;
    let name = text[1..close].trim();
    is_identifier(name).then_some((name, close + 1))
}

fn flush(parts: &mut Vec<StringPart>, text: &mut String) {
    if !text.is_empty() {
        parts.push(StringPart::Text(std::mem::take(text)));
    }
}
