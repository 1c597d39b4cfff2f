//! Lexer, parser, and AST for the Quill dialogue language.
//!
//! This crate provides:
//! - [`Lexer`] / [`scan`] - Tokenization of Quill source
//! - [`Parser`] / [`parse`] - Parsing tokens into a [`Program`]
//! - [`tool_call`] - The `<function; args>` sub-grammar
//! - [`interpolation`] - Escapes and `{name}` parts of string literals
//! - [`pretty`] - Rendering a program back to source
//!
//! [`compile`] runs the whole front end and is what most callers want.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod ast;
pub mod interpolation;
pub mod lexer;
pub mod parser;
pub mod pretty;
pub mod span;
pub mod token;
pub mod tool_call;


pub use ast::{
    AssignOp, Block, BlockId, ChoiceOption, Expr, InfixOp, PrefixOp, Program, RandomOption, Stmt,
    StringPart, TagList, ToolCall,
};
pub use lexer::{Lexer, scan};
pub use parser::Parser;
pub use span::Span;
pub use token::{Token, TokenKind};

use quill_foundation::{Diagnostic, Error, ErrorKind, Result};

/// Parses a token stream into a program, collecting every syntax error.
#[must_use]
pub fn parse(tokens: Vec<Token>) -> (Program, Vec<Diagnostic>) {
    Parser::new(tokens).parse()
}

/// Scans and parses source text.
///
/// Lexical errors stop before parsing; syntax errors are all reported
/// together.
///
/// # Errors
/// Returns [`ErrorKind::Lexical`] or [`ErrorKind::Syntax`] with every
/// diagnostic found.
pub fn compile(source: &str) -> Result<Program> {
    let (tokens, lexical) = scan(source);
    if !lexical.is_empty() {
        return Err(Error::new(ErrorKind::Lexical(lexical)));
    }
    let (program, syntax) = parse(tokens);
    if !syntax.is_empty() {
        return Err(Error::new(ErrorKind::Syntax(syntax)));
    }
    Ok(program)
}
