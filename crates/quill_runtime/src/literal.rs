//! Reading values typed by a player.

use quill_foundation::Value;
use quill_language::interpolation::unescape;

/// Parses a value typed at a prompt.
///
/// Integers, `TRUE`/`FALSE` (either case), `nil`, and double-quoted strings
/// with escapes are recognized; anything else is taken as a bare string.
#[must_use]
pub fn parse_literal(input: &str) -> Value {
    let text = input.trim();
    match text {
        "TRUE" | "true" => return Value::Bool(true),
        "FALSE" | "false" => return Value::Bool(false),
        "nil" => return Value::Nil,
        _ => {}
    }
    if let Ok(n) = text.parse::<i64>() {
        return Value::Int(n);
    }
    if let Some(inner) = text
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
    {
        return Value::from(unescape(inner));
    }
    Value::from(text)
}
