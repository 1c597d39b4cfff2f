//! Abstract Syntax Tree for the Quill language.
//!
//! The tree is immutable once parsed. Statement lists live behind `Arc` so
//! the interpreter can hold on to any block without borrowing the program,
//! and every block carries a [`BlockId`] so an execution position can be
//! written down as plain data.

use std::sync::Arc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::span::Span;

/// Identifies a statement list within one parsed program.
///
/// The top-level list is [`BlockId::ROOT`]; nested blocks are numbered from 1
/// in source order. Ids are only meaningful for the program that produced
/// them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BlockId(pub u32);

impl BlockId {
    /// The top-level statement list.
    pub const ROOT: Self = Self(0);

    /// Returns true for the top-level statement list.
    #[must_use]
    pub const fn is_root(self) -> bool {
        self.0 == 0
    }
}

/// A parsed program: the ordered top-level statements.
#[derive(Clone, Debug, PartialEq)]
pub struct Program {
    /// Top-level statements.
    pub statements: Arc<[Stmt]>,
}

impl Program {
    /// Creates a program from its top-level statements.
    #[must_use]
    pub fn new(statements: Vec<Stmt>) -> Self {
        Self {
            statements: statements.into(),
        }
    }

    /// Returns the number of top-level statements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.statements.len()
    }

    /// Returns true if the program has no statements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    /// Returns every nested block in the program, outermost first.
    #[must_use]
    pub fn blocks(&self) -> Vec<&Block> {
        let mut blocks = Vec::new();
        for stmt in self.statements.iter() {
            stmt.collect_blocks(&mut blocks);
        }
        blocks
    }
}

/// A braced statement list.
#[derive(Clone, Debug, PartialEq)]
pub struct Block {
    /// Identity of this list within the program.
    pub id: BlockId,
    /// The statements, in order.
    pub statements: Arc<[Stmt]>,
    /// Source location of the braces.
    pub span: Span,
}

impl Block {
    /// Returns true if the block holds no statements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    fn collect<'a>(&'a self, out: &mut Vec<&'a Block>) {
        out.push(self);
        for stmt in self.statements.iter() {
            stmt.collect_blocks(out);
        }
    }
}

/// Ordered metadata attached to dialog lines and options.
///
/// Duplicates are kept; the list is inert data for the caller.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TagList(pub Vec<String>);

impl TagList {
    /// Returns true if there are no tags.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the tag names in order.
    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.0
    }
}

/// One option of a `CHOICE` statement.
#[derive(Clone, Debug, PartialEq)]
pub struct ChoiceOption {
    /// The text shown to the player.
    pub text: Expr,
    /// Statements run when this option is picked.
    pub body: Block,
    /// Metadata for the caller.
    pub tags: TagList,
}

/// One option of a `RANDOM` statement.
#[derive(Clone, Debug, PartialEq)]
pub struct RandomOption {
    /// Statements run when this option is drawn.
    pub body: Block,
    /// Metadata for the caller.
    pub tags: TagList,
}

/// Operator of an assignment statement.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AssignOp {
    /// `=`
    Set,
    /// `+=`
    Add,
    /// `-=`
    Sub,
}

impl AssignOp {
    /// Returns the operator as written in source.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Set => "=",
            Self::Add => "+=",
            Self::Sub => "-=",
        }
    }
}

/// A statement.
#[derive(Clone, Debug, PartialEq)]
pub enum Stmt {
    /// `LABEL name`
    Label {
        /// Label name.
        name: String,
        /// Source location.
        span: Span,
    },
    /// `GOTO name`
    Goto {
        /// Target label name.
        label: String,
        /// Source location.
        span: Span,
    },
    /// `END`
    End {
        /// Source location.
        span: Span,
    },
    /// `Speaker: "text" [tags]`
    Dialog {
        /// Who is speaking.
        speaker: String,
        /// The line, usually a string or interpolated string.
        text: Expr,
        /// Metadata for the caller.
        tags: TagList,
        /// Source location.
        span: Span,
    },
    /// `CHOICE { "text" { ... } [tags] ... }`
    Choice {
        /// The options, in order.
        options: Vec<ChoiceOption>,
        /// Source location.
        span: Span,
    },
    /// `RANDOM { { ... } [tags] ... }`
    Random {
        /// The options, in order.
        options: Vec<RandomOption>,
        /// Source location.
        span: Span,
    },
    /// `LET name = value`
    Let {
        /// Variable name.
        name: String,
        /// Initial value; a bare tool call here suspends the interpreter.
        value: Expr,
        /// Source location.
        span: Span,
    },
    /// `name = value`, `name += value`, `name -= value`
    Assign {
        /// Variable name.
        name: String,
        /// Assignment operator.
        op: AssignOp,
        /// New value or operand.
        value: Expr,
        /// Source location.
        span: Span,
    },
    /// `IF cond { ... } ELSE { ... }`
    If {
        /// Must evaluate to a boolean.
        condition: Expr,
        /// Run when the condition holds.
        consequence: Block,
        /// Run otherwise; `ELSE IF` is a block holding one `IF`.
        alternative: Option<Block>,
        /// Source location.
        span: Span,
    },
    /// A bare `{ ... }` block.
    Block(Block),
}

impl Stmt {
    /// Returns the source span of this statement.
    #[must_use]
    pub const fn span(&self) -> Span {
        match self {
            Self::Label { span, .. }
            | Self::Goto { span, .. }
            | Self::End { span }
            | Self::Dialog { span, .. }
            | Self::Choice { span, .. }
            | Self::Random { span, .. }
            | Self::Let { span, .. }
            | Self::Assign { span, .. }
            | Self::If { span, .. } => *span,
            Self::Block(block) => block.span,
        }
    }

    /// Returns the 1-based line this statement starts on.
    #[must_use]
    pub const fn line(&self) -> u32 {
        self.span().line
    }

    /// Returns the label name if this is a `LABEL` statement.
    #[must_use]
    pub fn label_name(&self) -> Option<&str> {
        match self {
            Self::Label { name, .. } => Some(name),
            _ => None,
        }
    }

    /// Returns the blocks directly owned by this statement.
    #[must_use]
    pub fn child_blocks(&self) -> Vec<&Block> {
        match self {
            Self::Choice { options, .. } => options.iter().map(|o| &o.body).collect(),
            Self::Random { options, .. } => options.iter().map(|o| &o.body).collect(),
            Self::If {
                consequence,
                alternative,
                ..
            } => std::iter::once(consequence)
                .chain(alternative.as_ref())
                .collect(),
            Self::Block(block) => vec![block],
            _ => Vec::new(),
        }
    }

    fn collect_blocks<'a>(&'a self, out: &mut Vec<&'a Block>) {
        for block in self.child_blocks() {
            block.collect(out);
        }
    }
}

/// Infix operators.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InfixOp {
    /// `==`
    Eq,
    /// `!=`
    NotEq,
    /// `<`
    Lt,
    /// `>`
    Gt,
    /// `<=`
    LtEq,
    /// `>=`
    GtEq,
    /// `&&`
    And,
    /// `||`
    Or,
    /// `+`
    Add,
    /// `-`
    Sub,
    /// `??`
    NullCoalesce,
}

impl InfixOp {
    /// Returns the operator as written in source.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Eq => "==",
            Self::NotEq => "!=",
            Self::Lt => "<",
            Self::Gt => ">",
            Self::LtEq => "<=",
            Self::GtEq => ">=",
            Self::And => "&&",
            Self::Or => "||",
            Self::Add => "+",
            Self::Sub => "-",
            Self::NullCoalesce => "??",
        }
    }
}

/// Prefix operators.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PrefixOp {
    /// `!`
    Not,
}

impl PrefixOp {
    /// Returns the operator as written in source.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Not => "!",
        }
    }
}

/// A call to a host-provided function: `<function; arg, arg>`.
#[derive(Clone, Debug, PartialEq)]
pub struct ToolCall {
    /// Function name.
    pub function: String,
    /// Arguments, evaluated left to right.
    pub args: Vec<Expr>,
    /// Source location.
    pub span: Span,
}

/// A piece of an interpolated string.
#[derive(Clone, Debug, PartialEq)]
pub enum StringPart {
    /// Literal text, escapes already decoded.
    Text(String),
    /// `{name}`
    Variable(String),
    /// `<function; args>`, run immediately.
    ToolCall(ToolCall),
}

/// An expression.
#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    /// Variable reference.
    Identifier(String, Span),
    /// String without interpolation, escapes decoded.
    String(String, Span),
    /// String with `{name}` or `<call>` parts.
    Interpolated(Vec<StringPart>, Span),
    /// Integer literal.
    Int(i64, Span),
    /// `TRUE` or `FALSE`.
    Bool(bool, Span),
    /// Binary operation.
    Infix {
        /// Operator.
        op: InfixOp,
        /// Left operand.
        left: Box<Expr>,
        /// Right operand.
        right: Box<Expr>,
        /// Source location.
        span: Span,
    },
    /// Unary operation.
    Prefix {
        /// Operator.
        op: PrefixOp,
        /// Operand.
        operand: Box<Expr>,
        /// Source location.
        span: Span,
    },
    /// Tool call.
    ToolCall(ToolCall),
}

impl Expr {
    /// Returns the source span of this expression.
    #[must_use]
    pub const fn span(&self) -> Span {
        match self {
            Self::Identifier(_, s)
            | Self::String(_, s)
            | Self::Interpolated(_, s)
            | Self::Int(_, s)
            | Self::Bool(_, s)
            | Self::Infix { span: s, .. }
            | Self::Prefix { span: s, .. } => *s,
            Self::ToolCall(call) => call.span,
        }
    }

    /// Returns the 1-based line this expression starts on.
    #[must_use]
    pub const fn line(&self) -> u32 {
        self.span().line
    }

    /// Returns the call if this expression is nothing but a tool call.
    #[must_use]
    pub const fn as_tool_call(&self) -> Option<&ToolCall> {
        match self {
            Self::ToolCall(call) => Some(call),
            _ => None,
        }
    }
}
