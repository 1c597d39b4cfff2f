//! Token types for the Quill language.
//!
//! Tokens are the output of the lexer and input to the parser. Newlines are
//! real tokens because they separate statements.

use std::fmt;

use crate::span::Span;

/// A token from lexical analysis.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token {
    /// The type and payload of this token.
    pub kind: TokenKind,
    /// The raw source text of this token.
    pub lexeme: String,
    /// Source location of this token.
    pub span: Span,
}

impl Token {
    /// Creates a new token.
    #[must_use]
    pub fn new(kind: TokenKind, lexeme: impl Into<String>, span: Span) -> Self {
        Self {
            kind,
            lexeme: lexeme.into(),
            span,
        }
    }

    /// Returns the 1-based line this token starts on.
    #[must_use]
    pub const fn line(&self) -> u32 {
        self.span.line
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::Newline => write!(f, "\\n ({})", self.kind.name()),
            TokenKind::Eof => write!(f, "<eof> ({})", self.kind.name()),
            _ => write!(f, "{} ({})", self.lexeme, self.kind.name()),
        }
    }
}

/// Token types for the Quill language.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TokenKind {
    // Structure
    /// End of a line.
    Newline,
    /// `:`
    Colon,
    /// `,`
    Comma,
    /// `;`
    Semicolon,
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `{`
    LBrace,
    /// `}`
    RBrace,
    /// `[`
    LBracket,
    /// `]`
    RBracket,

    // Operators
    /// `=`
    Assign,
    /// `+=`
    PlusAssign,
    /// `-=`
    MinusAssign,
    /// `+`
    Plus,
    /// `-`
    Minus,
    /// `*`
    Star,
    /// `->`
    Arrow,
    /// `?`
    Question,
    /// `==`
    Eq,
    /// `!=`
    NotEq,
    /// `<`
    Lt,
    /// `<=`
    LtEq,
    /// `>`
    Gt,
    /// `>=`
    GtEq,
    /// `&&`
    And,
    /// `||`
    Or,
    /// `!`
    Not,
    /// `??`
    NullCoalesce,

    // Literals
    /// Identifier like `gold` or `Alice`
    Ident(String),
    /// Integer literal like `42`
    Int(i64),
    /// String literal; the payload is the raw text between the quotes,
    /// escapes and interpolation markers still intact.
    String(String),
    /// Tool call span like `<getData; "gold">`; the payload is the text
    /// between the angle brackets.
    ToolCall(String),

    // Keywords
    /// `LET`
    Let,
    /// `IF`
    If,
    /// `ELSE`
    Else,
    /// `TRUE`
    True,
    /// `FALSE`
    False,
    /// `LABEL`
    Label,
    /// `GOTO`
    Goto,
    /// `CHOICE`
    Choice,
    /// `RANDOM`
    Random,
    /// `END`
    End,

    // Meta
    /// Comment text (including `#`)
    Comment(String),
    /// End of input
    Eof,
    /// Text the lexer could not make sense of
    Illegal(String),
}

impl TokenKind {
    /// Looks up a reserved word.
    #[must_use]
    pub fn keyword(text: &str) -> Option<Self> {
        let kind = match text {
            "LET" => Self::Let,
            "IF" => Self::If,
            "ELSE" => Self::Else,
            "TRUE" => Self::True,
            "FALSE" => Self::False,
            "LABEL" => Self::Label,
            "GOTO" => Self::Goto,
            "CHOICE" => Self::Choice,
            "RANDOM" => Self::Random,
            "END" => Self::End,
            _ => return None,
        };
        Some(kind)
    }

    /// Returns true if this token kind should be ignored between statements.
    #[must_use]
    pub const fn is_trivia(&self) -> bool {
        matches!(self, Self::Comment(_) | Self::Newline)
    }

    /// Returns true if an operand can end with this token.
    ///
    /// A `<` after such a token is the less-than operator; anywhere else it
    /// opens a tool call.
    #[must_use]
    pub const fn ends_operand(&self) -> bool {
        matches!(
            self,
            Self::Ident(_)
                | Self::Int(_)
                | Self::String(_)
                | Self::ToolCall(_)
                | Self::True
                | Self::False
                | Self::RParen
                | Self::RBracket
        )
    }

    /// Returns true if this token starts a statement that ends error recovery.
    #[must_use]
    pub const fn is_sync_keyword(&self) -> bool {
        matches!(self, Self::Label | Self::Goto | Self::Choice | Self::End)
    }

    /// Returns a human-readable name for this token kind.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Newline => "NEWLINE",
            Self::Colon => "':'",
            Self::Comma => "','",
            Self::Semicolon => "';'",
            Self::LParen => "'('",
            Self::RParen => "')'",
            Self::LBrace => "'{'",
            Self::RBrace => "'}'",
            Self::LBracket => "'['",
            Self::RBracket => "']'",
            Self::Assign => "'='",
            Self::PlusAssign => "'+='",
            Self::MinusAssign => "'-='",
            Self::Plus => "'+'",
            Self::Minus => "'-'",
            Self::Star => "'*'",
            Self::Arrow => "'->'",
            Self::Question => "'?'",
            Self::Eq => "'=='",
            Self::NotEq => "'!='",
            Self::Lt => "'<'",
            Self::LtEq => "'<='",
            Self::Gt => "'>'",
            Self::GtEq => "'>='",
            Self::And => "'&&'",
            Self::Or => "'||'",
            Self::Not => "'!'",
            Self::NullCoalesce => "'??'",
            Self::Ident(_) => "IDENT",
            Self::Int(_) => "INT",
            Self::String(_) => "STRING",
            Self::ToolCall(_) => "TOOL_CALL",
            Self::Let => "LET",
            Self::If => "IF",
            Self::Else => "ELSE",
            Self::True => "TRUE",
            Self::False => "FALSE",
            Self::Label => "LABEL",
            Self::Goto => "GOTO",
            Self::Choice => "CHOICE",
            Self::Random => "RANDOM",
            Self::End => "END",
            Self::Comment(_) => "COMMENT",
            Self::Eof => "EOF",
            Self::Illegal(_) => "ILLEGAL",
        }
    }
}
