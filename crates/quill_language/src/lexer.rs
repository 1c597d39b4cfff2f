//! Lexer for the Quill language.
//!
//! The lexer converts source text into a flat stream of tokens. Strings and
//! tool calls are scanned as opaque spans; their insides are parsed later by
//! [`crate::interpolation`] and [`crate::tool_call`].
//!
//! Problems never stop the scan: the lexer emits an [`TokenKind::Illegal`]
//! token, records a [`Diagnostic`], and keeps going.

use quill_foundation::Diagnostic;

use crate::span::Span;
use crate::token::{Token, TokenKind};
use crate::tool_call::{opens_tool_call, span_end};

/// Lexer for Quill source code.
pub struct Lexer<'src> {
    /// Source text being tokenized.
    source: &'src str,
    /// Remaining source text.
    rest: &'src str,
    /// Current byte offset in source.
    position: usize,
    /// Current line number (1-based).
    line: u32,
    /// Whether the last significant token can end an operand.
    operand_ended: bool,
    /// Problems found so far.
    diagnostics: Vec<Diagnostic>,
}

impl<'src> Lexer<'src> {
    /// Creates a new lexer for the given source.
    #[must_use]
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            rest: source,
            position: 0,
            line: 1,
            operand_ended: false,
            diagnostics: Vec::new(),
        }
    }

    /// Returns the next token from the source.
    ///
    /// Once the input is exhausted every call returns [`TokenKind::Eof`].
    pub fn next_token(&mut self) -> Token {
        self.skip_whitespace();

        let start = self.position;
        let start_line = self.line;

        let Some(c) = self.peek_char() else {
            return Token::new(TokenKind::Eof, "", Span::new(start, start, start_line));
        };

        let kind = match c {
            '\n' => {
                self.advance();
                TokenKind::Newline
            }
            ':' => self.single(TokenKind::Colon),
            ',' => self.single(TokenKind::Comma),
            ';' => self.single(TokenKind::Semicolon),
            '(' => self.single(TokenKind::LParen),
            ')' => self.single(TokenKind::RParen),
            '{' => self.single(TokenKind::LBrace),
            '}' => self.single(TokenKind::RBrace),
            '[' => self.single(TokenKind::LBracket),
            ']' => self.single(TokenKind::RBracket),
            '*' => self.single(TokenKind::Star),
            '=' => self.either('=', TokenKind::Eq, TokenKind::Assign),
            '!' => self.either('=', TokenKind::NotEq, TokenKind::Not),
            '>' => self.either('=', TokenKind::GtEq, TokenKind::Gt),
            '+' => self.either('=', TokenKind::PlusAssign, TokenKind::Plus),
            '?' => self.either('?', TokenKind::NullCoalesce, TokenKind::Question),
            '<' if !self.operand_ended && opens_tool_call(self.rest) => self.scan_tool_call(),
            '<' => self.either('=', TokenKind::LtEq, TokenKind::Lt),
            '-' => {
                self.advance();
                match self.peek_char() {
                    Some('=') => {
                        self.advance();
                        TokenKind::MinusAssign
                    }
                    Some('>') => {
                        self.advance();
                        TokenKind::Arrow
                    }
                    _ => TokenKind::Minus,
                }
            }
            '&' => self.pair('&', TokenKind::And),
            '|' => self.pair('|', TokenKind::Or),
            '#' => self.scan_comment(),
            '"' => self.scan_string(),
            c if c.is_ascii_digit() => self.scan_number(start_line),
            c if is_ident_start(c) => self.scan_identifier(),
            c => {
                self.advance();
                self.illegal(start_line, format!("Unexpected character: {c}"))
            }
        };

        if !matches!(kind, TokenKind::Comment(_)) {
            self.operand_ended = kind.ends_operand();
        }

        Token::new(
            kind,
            &self.source[start..self.position],
            Span::new(start, self.position, start_line),
        )
    }

    /// Tokenizes all source and returns the tokens, ending with EOF.
    ///
    /// Comments are included in the output; diagnostics are dropped. Use
    /// [`scan`] to keep them.
    #[must_use]
    pub fn tokenize_all(source: &str) -> Vec<Token> {
        scan(source).0
    }

    /// Returns the problems found so far.
    #[must_use]
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Consumes the lexer, returning its diagnostics.
    #[must_use]
    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    fn peek_char(&self) -> Option<char> {
        self.rest.chars().next()
    }

    fn advance(&mut self) {
        if let Some(c) = self.peek_char() {
            let len = c.len_utf8();
            self.rest = &self.rest[len..];
            self.position += len;
            if c == '\n' {
                self.line += 1;
            }
        }
    }

    /// Advances over `bytes` bytes of input.
    fn advance_by(&mut self, bytes: usize) {
        let target = self.position + bytes;
        while self.position < target && !self.rest.is_empty() {
            self.advance();
        }
    }

    fn skip_whitespace(&mut self) {
        while let Some(' ' | '\t' | '\r') = self.peek_char() {
            self.advance();
        }
    }

    fn single(&mut self, kind: TokenKind) -> TokenKind {
        self.advance();
        kind
    }

    /// Matches a one- or two-character operator greedily.
    fn either(&mut self, second: char, double: TokenKind, single: TokenKind) -> TokenKind {
        self.advance();
        if self.peek_char() == Some(second) {
            self.advance();
            double
        } else {
            single
        }
    }

    /// Matches an operator that only exists doubled, like `&&`.
    fn pair(&mut self, c: char, kind: TokenKind) -> TokenKind {
        let line = self.line;
        self.advance();
        if self.peek_char() == Some(c) {
            self.advance();
            kind
        } else {
            self.illegal(line, format!("Unexpected character: {c}"))
        }
    }

    fn illegal(&mut self, line: u32, message: impl Into<String>) -> TokenKind {
        let message = message.into();
        self.diagnostics.push(Diagnostic::new(line, message.clone()));
        TokenKind::Illegal(message)
    }

    /// Scans a comment starting with `#` up to the end of the line.
    fn scan_comment(&mut self) -> TokenKind {
        let start = self.position;
        while self.peek_char().is_some_and(|c| c != '\n') {
            self.advance();
        }
        TokenKind::Comment(self.source[start..self.position].to_string())
    }

    /// Scans a string literal.
    ///
    /// A tool call inside the string may contain quotes of its own, so
    /// termination is suspended while inside one.
    fn scan_string(&mut self) -> TokenKind {
        self.advance();
        let content_start = self.position;
        loop {
            match self.peek_char() {
                None => return self.illegal(self.line, "Unterminated string."),
                Some('"') => {
                    let raw = self.source[content_start..self.position].to_string();
                    self.advance();
                    return TokenKind::String(raw);
                }
                Some('\\') => {
                    self.advance();
                    self.advance();
                }
                Some('<') if opens_tool_call(self.rest) => match span_end(current_line(self.rest)) {
                    Some(end) => self.advance_by(end + 1),
                    None => {
                        let line = self.line;
                        self.advance_by(current_line(self.rest).len());
                        return self.illegal(line, "Unterminated tool call.");
                    }
                },
                Some(_) => self.advance(),
            }
        }
    }

    /// Scans a `<function; args>` span outside a string.
    fn scan_tool_call(&mut self) -> TokenKind {
        let line = self.line;
        let text = current_line(self.rest);
        if let Some(end) = span_end(text) {
            let inner = text[1..end].to_string();
            self.advance_by(end + 1);
            TokenKind::ToolCall(inner)
        } else {
            self.advance_by(text.len());
            self.illegal(line, "Unterminated tool call.")
        }
    }

    /// Scans a decimal integer literal.
    fn scan_number(&mut self, line: u32) -> TokenKind {
        let start = self.position;
        while self.peek_char().is_some_and(|c| c.is_ascii_digit()) {
            self.advance();
        }
        match self.source[start..self.position].parse::<i64>() {
            Ok(n) => TokenKind::Int(n),
            Err(_) => self.illegal(line, "integer literal out of range"),
        }
    }

    /// Scans an identifier or keyword.
    fn scan_identifier(&mut self) -> TokenKind {
        let start = self.position;
        while self.peek_char().is_some_and(is_ident_char) {
            self.advance();
        }
        let text = &self.source[start..self.position];
        TokenKind::keyword(text).unwrap_or_else(|| TokenKind::Ident(text.to_string()))
    }
}

/// Scans source text into tokens, collecting every lexical problem.
///
/// The returned tokens always end with a single [`TokenKind::Eof`].
#[must_use]
pub fn scan(source: &str) -> (Vec<Token>, Vec<Diagnostic>) {
    let mut lexer = Lexer::new(source);
    let mut tokens = Vec::new();
    loop {
        let token = lexer.next_token();
        let is_eof = token.kind == TokenKind::Eof;
        tokens.push(token);
        if is_eof {
            break;
        }
    }
    let diagnostics = lexer.into_diagnostics();
    tracing::debug!(
        tokens = tokens.len(),
        diagnostics = diagnostics.len(),
        "scanned source"
    );
    (tokens, diagnostics)
}

/// Returns true if `c` can start an identifier.
#[must_use]
pub fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

/// Returns true if `c` can continue an identifier.
#[must_use]
pub fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Returns true if `text` is a complete identifier.
#[must_use]
pub fn is_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    chars.next().is_some_and(is_ident_start) && chars.all(is_ident_char)
}

fn current_line(text: &str) -> &str {
    text.find('\n').map_or(text, |end| &text[..end])
}
