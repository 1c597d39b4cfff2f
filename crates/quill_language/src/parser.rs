//! Parser for the Quill language.
//!
//! Statements are parsed by recursive descent and expressions by precedence
//! climbing. A statement that fails to parse is recorded as a [`Diagnostic`]
//! and the parser skips ahead to the next statement boundary, so one pass
//! reports every independent error.

use quill_foundation::Diagnostic;

use crate::ast::{
    AssignOp, Block, BlockId, ChoiceOption, Expr, InfixOp, PrefixOp, Program, RandomOption, Stmt,
    TagList,
};
use crate::interpolation::parse_string;
use crate::span::Span;
use crate::token::{Token, TokenKind};
use crate::tool_call::parse_tool_call;

type ParseResult<T> = std::result::Result<T, Diagnostic>;

/// Binding power of infix operators, lowest first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
enum Precedence {
    None,
    NullCoalesce,
    Or,
    And,
    Equality,
    Comparison,
    Sum,
    Prefix,
}

fn infix_operator(kind: &TokenKind) -> Option<(InfixOp, Precedence)> {
    let op = match kind {
        TokenKind::NullCoalesce => (InfixOp::NullCoalesce, Precedence::NullCoalesce),
        TokenKind::Or => (InfixOp::Or, Precedence::Or),
        TokenKind::And => (InfixOp::And, Precedence::And),
        TokenKind::Eq => (InfixOp::Eq, Precedence::Equality),
        TokenKind::NotEq => (InfixOp::NotEq, Precedence::Equality),
        TokenKind::Lt => (InfixOp::Lt, Precedence::Comparison),
        TokenKind::Gt => (InfixOp::Gt, Precedence::Comparison),
        TokenKind::LtEq => (InfixOp::LtEq, Precedence::Comparison),
        TokenKind::GtEq => (InfixOp::GtEq, Precedence::Comparison),
        TokenKind::Plus => (InfixOp::Add, Precedence::Sum),
        TokenKind::Minus => (InfixOp::Sub, Precedence::Sum),
        _ => return None,
    };
    Some(op)
}

/// Parser for a Quill token stream.
pub struct Parser {
    /// Tokens without comments, always ending in EOF.
    tokens: Vec<Token>,
    /// Index of the lookahead token.
    current: usize,
    /// Last block id handed out.
    last_block: u32,
    /// Errors recorded so far.
    diagnostics: Vec<Diagnostic>,
}

impl Parser {
    /// Creates a parser over the given tokens.
    #[must_use]
    pub fn new(mut tokens: Vec<Token>) -> Self {
        tokens.retain(|t| !matches!(t.kind, TokenKind::Comment(_)));
        if tokens.last().is_none_or(|t| t.kind != TokenKind::Eof) {
            let end = tokens.last().map_or(Span::line(1), |t| {
                Span::new(t.span.end, t.span.end, t.span.line)
            });
            tokens.push(Token::new(TokenKind::Eof, "", end));
        }
        Self {
            tokens,
            current: 0,
            last_block: 0,
            diagnostics: Vec::new(),
        }
    }

    /// Parses the whole token stream.
    ///
    /// Always returns a program; it is only meaningful when the diagnostic
    /// list is empty.
    #[must_use]
    pub fn parse(mut self) -> (Program, Vec<Diagnostic>) {
        let mut statements = Vec::new();
        loop {
            self.skip_newlines();
            if self.check(&TokenKind::Eof) {
                break;
            }
            if let Some(stmt) = self.statement_or_recover(false) {
                statements.push(stmt);
            }
        }
        tracing::debug!(
            statements = statements.len(),
            blocks = self.last_block,
            diagnostics = self.diagnostics.len(),
            "parsed program"
        );
        (Program::new(statements), self.diagnostics)
    }

    // =========================================================================
    // Token helpers
    // =========================================================================

    fn peek(&self) -> &Token {
        // `new` guarantees a trailing EOF and `advance` never moves past it.
        &self.tokens[self.current.min(self.tokens.len() - 1)]
    }

    fn peek_next_kind(&self) -> &TokenKind {
        let index = (self.current + 1).min(self.tokens.len() - 1);
        &self.tokens[index].kind
    }

    fn check(&self, kind: &TokenKind) -> bool {
        &self.peek().kind == kind
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if token.kind != TokenKind::Eof {
            self.current += 1;
        }
        token
    }

    fn previous_span(&self) -> Span {
        self.current
            .checked_sub(1)
            .map_or_else(|| self.peek().span, |i| self.tokens[i].span)
    }

    fn skip_newlines(&mut self) {
        while self.check(&TokenKind::Newline) {
            self.advance();
        }
    }

    fn expect(&mut self, kind: &TokenKind, message: &str) -> ParseResult<Token> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(self.error(message))
        }
    }

    fn expect_identifier(&mut self, message: &str) -> ParseResult<(String, Span)> {
        if let TokenKind::Ident(name) = &self.peek().kind {
            let name = name.clone();
            let span = self.advance().span;
            Ok((name, span))
        } else {
            Err(self.error(message))
        }
    }

    fn error(&self, message: &str) -> Diagnostic {
        Diagnostic::new(self.peek().line(), message)
    }

    fn fresh_block_id(&mut self) -> BlockId {
        self.last_block += 1;
        BlockId(self.last_block)
    }

    // =========================================================================
    // Error recovery
    // =========================================================================

    fn statement_or_recover(&mut self, nested: bool) -> Option<Stmt> {
        let start = self.current;
        match self.parse_statement() {
            Ok(stmt) => Some(stmt),
            Err(diagnostic) => {
                self.diagnostics.push(diagnostic);
                if self.current == start {
                    self.advance();
                }
                self.synchronize(nested);
                None
            }
        }
    }

    /// Skips to a safe place to start the next statement: just past a
    /// newline, before a statement keyword, before the `}` closing the
    /// enclosing block, or at the end of input.
    fn synchronize(&mut self, nested: bool) {
        loop {
            match &self.peek().kind {
                TokenKind::Eof => return,
                TokenKind::RBrace if nested => return,
                kind if kind.is_sync_keyword() => return,
                TokenKind::Newline => {
                    self.advance();
                    return;
                }
                _ => {
                    self.advance();
                }
            }
        }
    }

    // =========================================================================
    // Statements
    // =========================================================================

    fn parse_statement(&mut self) -> ParseResult<Stmt> {
        match &self.peek().kind {
            TokenKind::Let => self.parse_let(),
            TokenKind::If => self.parse_if(),
            TokenKind::Label => self.parse_label(),
            TokenKind::Goto => self.parse_goto(),
            TokenKind::Choice => self.parse_choice(),
            TokenKind::Random => self.parse_random(),
            TokenKind::End => {
                let span = self.advance().span;
                Ok(Stmt::End { span })
            }
            TokenKind::LBrace => Ok(Stmt::Block(self.parse_block()?)),
            TokenKind::Ident(_) => match self.peek_next_kind() {
                TokenKind::Colon => self.parse_dialog(),
                TokenKind::Assign | TokenKind::PlusAssign | TokenKind::MinusAssign => {
                    self.parse_assign()
                }
                _ => Err(self.unexpected()),
            },
            _ => Err(self.unexpected()),
        }
    }

    /// Consumes the current token and reports it as unexpected.
    fn unexpected(&mut self) -> Diagnostic {
        let token = self.advance();
        Diagnostic::new(token.line(), format!("Unexpected token: {}", token.lexeme))
    }

    fn parse_let(&mut self) -> ParseResult<Stmt> {
        let start = self.advance().span;
        let (name, _) = self.expect_identifier("Expected identifier after LET")?;
        self.expect(&TokenKind::Assign, "Expected '=' after variable name")?;
        let value = self.parse_expression()?;
        Ok(Stmt::Let {
            name,
            value,
            span: start.to(self.previous_span()),
        })
    }

    fn parse_assign(&mut self) -> ParseResult<Stmt> {
        let (name, start) = self.expect_identifier("Expected identifier")?;
        let op = match self.peek().kind {
            TokenKind::Assign => AssignOp::Set,
            TokenKind::PlusAssign => AssignOp::Add,
            TokenKind::MinusAssign => AssignOp::Sub,
            _ => return Err(self.error("Expected assignment operator")),
        };
        self.advance();
        let value = self.parse_expression()?;
        Ok(Stmt::Assign {
            name,
            op,
            value,
            span: start.to(self.previous_span()),
        })
    }

    fn parse_if(&mut self) -> ParseResult<Stmt> {
        let start = self.advance().span;
        let condition = self.parse_expression()?;
        if !self.check(&TokenKind::LBrace) {
            return Err(self.error("Expected '{' after IF condition"));
        }
        let consequence = self.parse_block()?;

        let alternative = if self.else_follows() {
            self.skip_newlines();
            self.advance();
            if self.check(&TokenKind::If) {
                let id = self.fresh_block_id();
                let nested = self.parse_if()?;
                Some(Block {
                    id,
                    span: nested.span(),
                    statements: vec![nested].into(),
                })
            } else if self.check(&TokenKind::LBrace) {
                Some(self.parse_block()?)
            } else {
                return Err(self.error("Expected '{' after ELSE"));
            }
        } else {
            None
        };

        Ok(Stmt::If {
            condition,
            consequence,
            alternative,
            span: start.to(self.previous_span()),
        })
    }

    /// Returns true if the next token, possibly on a later line, is `ELSE`.
    fn else_follows(&self) -> bool {
        self.tokens[self.current..]
            .iter()
            .find(|t| t.kind != TokenKind::Newline)
            .is_some_and(|t| t.kind == TokenKind::Else)
    }

    fn parse_label(&mut self) -> ParseResult<Stmt> {
        let start = self.advance().span;
        let (name, end) = self.expect_identifier("Expected identifier after LABEL")?;
        Ok(Stmt::Label {
            name,
            span: start.to(end),
        })
    }

    fn parse_goto(&mut self) -> ParseResult<Stmt> {
        let start = self.advance().span;
        let (label, end) = self.expect_identifier("Expected identifier after GOTO")?;
        Ok(Stmt::Goto {
            label,
            span: start.to(end),
        })
    }

    fn parse_dialog(&mut self) -> ParseResult<Stmt> {
        let (speaker, start) = self.expect_identifier("Expected character name")?;
        self.expect(&TokenKind::Colon, "Expected ':' after character name")?;
        let text = self.parse_expression()?;
        let tags = self.parse_tags()?;
        Ok(Stmt::Dialog {
            speaker,
            text,
            tags,
            span: start.to(self.previous_span()),
        })
    }

    /// Parses an optional `[a, b, c]` tag list.
    fn parse_tags(&mut self) -> ParseResult<TagList> {
        if !self.check(&TokenKind::LBracket) {
            return Ok(TagList::default());
        }
        self.advance();
        let mut tags = Vec::new();
        loop {
            match &self.peek().kind {
                TokenKind::RBracket => break,
                TokenKind::Eof | TokenKind::Newline => {
                    return Err(self.error("Expected ']' to close tag list"));
                }
                _ => {}
            }
            let (tag, _) = self.expect_identifier("Expected identifier in tag list")?;
            tags.push(tag);
            if self.check(&TokenKind::Comma) {
                self.advance();
            } else if !self.check(&TokenKind::RBracket) {
                return Err(self.error("Expected ',' or ']' in tag list"));
            }
        }
        self.advance();
        Ok(TagList(tags))
    }

    fn parse_choice(&mut self) -> ParseResult<Stmt> {
        let start = self.advance().span;
        self.expect(&TokenKind::LBrace, "Expected '{' after CHOICE")?;
        let mut options = Vec::new();
        loop {
            self.skip_newlines();
            match self.peek().kind {
                TokenKind::RBrace => break,
                TokenKind::Eof => return Err(self.error("Expected '}' to close CHOICE block")),
                _ => {}
            }
            options.push(self.parse_choice_option()?);
            if self.check(&TokenKind::Comma) {
                self.advance();
            }
        }
        self.advance();
        Ok(Stmt::Choice {
            options,
            span: start.to(self.previous_span()),
        })
    }

    fn parse_choice_option(&mut self) -> ParseResult<ChoiceOption> {
        let TokenKind::String(raw) = &self.peek().kind else {
            return Err(self.error("Expected string literal for choice option"));
        };
        let raw = raw.clone();
        let span = self.advance().span;
        let text = string_expr(&raw, span)?;
        if !self.check(&TokenKind::LBrace) {
            return Err(self.error("Expected '{' after choice option text"));
        }
        let body = self.parse_block()?;
        let tags = self.parse_tags()?;
        Ok(ChoiceOption { text, body, tags })
    }

    fn parse_random(&mut self) -> ParseResult<Stmt> {
        let start = self.advance().span;
        self.expect(&TokenKind::LBrace, "Expected '{' after RANDOM")?;
        let mut options = Vec::new();
        loop {
            self.skip_newlines();
            match self.peek().kind {
                TokenKind::RBrace => break,
                TokenKind::Eof => return Err(self.error("Expected '}' to close RANDOM block")),
                TokenKind::LBrace => {}
                _ => return Err(self.error("Expected '{' for random option")),
            }
            let body = self.parse_block()?;
            let tags = self.parse_tags()?;
            options.push(RandomOption { body, tags });
            if self.check(&TokenKind::Comma) {
                self.advance();
            }
        }
        self.advance();
        Ok(Stmt::Random {
            options,
            span: start.to(self.previous_span()),
        })
    }

    /// Parses a `{ ... }` statement list, recovering from errors inside it.
    fn parse_block(&mut self) -> ParseResult<Block> {
        let open = self.expect(&TokenKind::LBrace, "Expected '{'")?.span;
        let id = self.fresh_block_id();
        let mut statements = Vec::new();
        loop {
            self.skip_newlines();
            match self.peek().kind {
                TokenKind::RBrace => break,
                TokenKind::Eof => return Err(self.error("Expected '}' to close block")),
                _ => {}
            }
            if let Some(stmt) = self.statement_or_recover(true) {
                statements.push(stmt);
            }
        }
        let close = self.advance().span;
        Ok(Block {
            id,
            statements: statements.into(),
            span: open.to(close),
        })
    }

    // =========================================================================
    // Expressions
    // =========================================================================

    fn parse_expression(&mut self) -> ParseResult<Expr> {
        self.parse_precedence(Precedence::None)
    }

    /// Parses an expression whose operators all bind tighter than `min`.
    fn parse_precedence(&mut self, min: Precedence) -> ParseResult<Expr> {
        let mut left = self.parse_prefix()?;
        while let Some((op, precedence)) = infix_operator(&self.peek().kind) {
            if precedence <= min {
                break;
            }
            self.advance();
            let right = self.parse_precedence(precedence)?;
            let span = left.span().to(right.span());
            left = Expr::Infix {
                op,
                left: Box::new(left),
                right: Box::new(right),
                span,
            };
        }
        Ok(left)
    }

    fn parse_prefix(&mut self) -> ParseResult<Expr> {
        let token = self.peek().clone();
        let span = token.span;
        match token.kind {
            TokenKind::Ident(name) => {
                self.advance();
                Ok(Expr::Identifier(name, span))
            }
            TokenKind::Int(n) => {
                self.advance();
                Ok(Expr::Int(n, span))
            }
            TokenKind::String(raw) => {
                self.advance();
                string_expr(&raw, span)
            }
            TokenKind::True => {
                self.advance();
                Ok(Expr::Bool(true, span))
            }
            TokenKind::False => {
                self.advance();
                Ok(Expr::Bool(false, span))
            }
            TokenKind::Not => {
                self.advance();
                let operand = self.parse_precedence(Precedence::Prefix)?;
                let span = span.to(operand.span());
                Ok(Expr::Prefix {
                    op: PrefixOp::Not,
                    operand: Box::new(operand),
                    span,
                })
            }
            TokenKind::LParen => {
                self.advance();
                let expr = self.parse_expression()?;
                self.expect(&TokenKind::RParen, "Expected ')' after grouped expression")?;
                Ok(expr)
            }
            TokenKind::ToolCall(inner) => {
                self.advance();
                parse_tool_call(&inner, span)
                    .map(Expr::ToolCall)
                    .map_err(|e| Diagnostic::new(span.line, e.to_string()))
            }
            TokenKind::Newline => Err(self.error("Expected expression, found end of line")),
            TokenKind::Eof => Err(self.error("Expected expression, found end of input")),
            _ => Err(self.error(&format!(
                "Expected expression, found '{}'",
                token.lexeme
            ))),
        }
    }
}

fn string_expr(raw: &str, span: Span) -> ParseResult<Expr> {
    parse_string(raw, span).map_err(|e| Diagnostic::new(span.line, e.to_string()))
}
