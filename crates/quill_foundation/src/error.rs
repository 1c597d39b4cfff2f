//! Error types for the Quill system.
//!
//! Uses `thiserror` for ergonomic error definition. Runtime errors carry the
//! source line of the statement or expression that raised them.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::diagnostic::Diagnostic;
use crate::types::Type;

/// The main error type for Quill operations.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[error("{kind}")]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Source line the error is attributed to, if any.
    pub line: Option<u32>,
}

impl Error {
    /// Creates a new error with the given kind.
    #[must_use]
    pub fn new(kind: ErrorKind) -> Self {
        Self { kind, line: None }
    }

    /// Attributes this error to a source line.
    #[must_use]
    pub fn at_line(mut self, line: u32) -> Self {
        self.line = Some(line);
        self
    }

    /// Returns the rendered message without the line.
    #[must_use]
    pub fn message(&self) -> String {
        self.kind.to_string()
    }

    /// Creates an undefined variable error.
    #[must_use]
    pub fn undefined_variable(name: impl Into<String>) -> Self {
        Self::new(ErrorKind::UndefinedVariable(name.into()))
    }

    /// Creates an undefined label error.
    #[must_use]
    pub fn undefined_label(name: impl Into<String>) -> Self {
        Self::new(ErrorKind::UndefinedLabel(name.into()))
    }

    /// Creates an operator type mismatch error.
    #[must_use]
    pub fn type_mismatch(operator: impl Into<String>, expected: Type, left: Type, right: Type) -> Self {
        Self::new(ErrorKind::TypeMismatch {
            operator: operator.into(),
            expected,
            left,
            right,
        })
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal(message.into()))
    }

    /// Creates a semantic limit exceeded error.
    #[must_use]
    pub fn limit_exceeded(limit: SemanticLimit) -> Self {
        Self::new(ErrorKind::LimitExceeded(limit))
    }
}

/// Categorized error kinds for pattern matching.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ErrorKind {
    /// Read or assignment of a variable that was never bound with `LET`.
    #[error("Variable '{0}' not defined")]
    UndefinedVariable(String),

    /// `GOTO` to a label that does not exist.
    #[error("label '{0}' not found")]
    UndefinedLabel(String),

    /// `GOTO` to a label declared inside a nested block.
    #[error("label '{0}' is not declared at the top level")]
    LabelNotTopLevel(String),

    /// Operator applied to operands of the wrong types.
    #[error("Invalid operation: {left} {operator} {right} (expected {expected} operands)")]
    TypeMismatch {
        /// The operator lexeme.
        operator: String,
        /// The operand type the operator requires.
        expected: Type,
        /// Type of the left operand.
        left: Type,
        /// Type of the right operand.
        right: Type,
    },

    /// Prefix operator applied to an operand of the wrong type.
    #[error("Invalid prefix operation: {operator}{actual} (expected {expected} operand)")]
    PrefixTypeMismatch {
        /// The operator lexeme.
        operator: String,
        /// The operand type the operator requires.
        expected: Type,
        /// Type of the operand.
        actual: Type,
    },

    /// `IF` condition did not evaluate to a boolean.
    #[error("IF condition must be a boolean, got {0}")]
    NonBooleanCondition(Type),

    /// Integer arithmetic overflowed.
    #[error("integer overflow in {0}")]
    IntegerOverflow(String),

    /// Choice selection outside the offered options.
    #[error("Invalid choice index {index} (expected 0 to {max})", max = .count.saturating_sub(1))]
    InvalidChoice {
        /// The rejected index.
        index: usize,
        /// Number of options offered.
        count: usize,
    },

    /// `RANDOM` block without options.
    #[error("RANDOM block has no options")]
    EmptyRandom,

    /// `CHOICE` block without options.
    #[error("CHOICE block has no options")]
    EmptyChoice,

    /// Choice input supplied while no choice is pending.
    #[error("Not waiting for choice input")]
    NotWaitingForChoice,

    /// Tool call response supplied while no tool call is pending.
    #[error("Not waiting for a tool call response")]
    NotWaitingForToolCall,

    /// `Step` called while a choice is pending.
    #[error("Cannot step while waiting for choice input")]
    AwaitingChoice,

    /// `Step` called while a tool call is pending.
    #[error("Cannot step while waiting for a tool call response")]
    AwaitingToolCall,

    /// Immediate tool call to a function the host does not provide.
    #[error("Unknown tool function: {0}")]
    UnknownTool(String),

    /// Host function reported a failure.
    #[error("tool function '{function}' failed: {message}")]
    ToolFailed {
        /// The function name.
        function: String,
        /// The host's description of the failure.
        message: String,
    },

    /// Semantic limit exceeded (kill switch triggered).
    #[error("limit exceeded: {0}")]
    LimitExceeded(SemanticLimit),

    /// The scanner reported errors.
    #[error("{} scanner error(s)", .0.len())]
    Lexical(Vec<Diagnostic>),

    /// The parser reported errors.
    #[error("{} parse error(s)", .0.len())]
    Syntax(Vec<Diagnostic>),

    /// A snapshot does not fit the program it is restored against.
    #[error("snapshot does not match program: {0}")]
    SnapshotMismatch(String),

    /// Encoding or decoding a snapshot failed.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// File system error.
    #[error("I/O error: {0}")]
    Io(String),

    /// Internal error (should not happen).
    #[error("internal error: {0}")]
    Internal(String),
}

/// Semantic limits (kill switches) that can be exceeded.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SemanticLimit {
    /// Too many statements executed by one step without visible output.
    MaxSilentSteps {
        /// The configured limit.
        limit: usize,
    },
}

impl fmt::Display for SemanticLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MaxSilentSteps { limit } => {
                write!(f, "more than {limit} statements executed without output")
            }
        }
    }
}
