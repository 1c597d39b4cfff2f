//! Pretty-printer for AST nodes.
//!
//! Renders programs back to source text that parses to the same tree.
//! Binary operations are fully parenthesized.
//!
//! # Example
//!
//! ```
//! use quill_language::{compile, pretty::pretty_print};
//!
//! let program = compile("LET gold = 1 + 2").unwrap();
//! assert_eq!(pretty_print(&program), "LET gold = (1 + 2)\n");
//! ```

use std::fmt::{self, Write};

use crate::ast::{Block, Expr, Program, Stmt, StringPart, TagList, ToolCall};
use crate::interpolation::escape;

/// Configuration for pretty-printing.
#[derive(Debug, Clone)]
pub struct PrettyConfig {
    /// Number of spaces for each indentation level.
    pub indent_width: usize,
}

impl Default for PrettyConfig {
    fn default() -> Self {
        Self { indent_width: 2 }
    }
}

/// Pretty-print a program.
#[must_use]
pub fn pretty_print(program: &Program) -> String {
    pretty_print_with_config(program, &PrettyConfig::default())
}

/// Pretty-print a program with custom configuration.
#[must_use]
pub fn pretty_print_with_config(program: &Program, config: &PrettyConfig) -> String {
    let mut printer = PrettyPrinter::new(config.clone());
    printer.statements(&program.statements);
    printer.output
}

/// Pretty-print a single statement, including any nested blocks.
#[must_use]
pub fn pretty_print_statement(stmt: &Stmt) -> String {
    let mut printer = PrettyPrinter::new(PrettyConfig::default());
    printer.statement(stmt);
    printer.output
}

struct PrettyPrinter {
    config: PrettyConfig,
    output: String,
    depth: usize,
}

impl PrettyPrinter {
    fn new(config: PrettyConfig) -> Self {
        Self {
            config,
            output: String::new(),
            depth: 0,
        }
    }

    fn indent(&mut self) {
        let width = self.depth * self.config.indent_width;
        self.output.extend(std::iter::repeat_n(' ', width));
    }

    fn statements(&mut self, statements: &[Stmt]) {
        for stmt in statements {
            self.statement(stmt);
        }
    }

    fn statement(&mut self, stmt: &Stmt) {
        self.indent();
        self.statement_inline(stmt);
        self.output.push('\n');
    }

    /// Writes a statement starting at the current column, without the
    /// trailing newline.
    fn statement_inline(&mut self, stmt: &Stmt) {
        // Writing to a String cannot fail.
        let out = &mut self.output;
        match stmt {
            Stmt::Label { name, .. } => {
                let _ = write!(out, "LABEL {name}");
            }
            Stmt::Goto { label, .. } => {
                let _ = write!(out, "GOTO {label}");
            }
            Stmt::End { .. } => out.push_str("END"),
            Stmt::Dialog {
                speaker,
                text,
                tags,
                ..
            } => {
                let _ = write!(out, "{speaker}: {text}{}", TagSuffix(tags));
            }
            Stmt::Let { name, value, .. } => {
                let _ = write!(out, "LET {name} = {value}");
            }
            Stmt::Assign {
                name, op, value, ..
            } => {
                let _ = write!(out, "{name} {} {value}", op.symbol());
            }
            Stmt::Choice { options, .. } => {
                out.push_str("CHOICE {\n");
                self.depth += 1;
                for option in options {
                    self.indent();
                    let _ = write!(self.output, "{} ", option.text);
                    self.block(&option.body);
                    let _ = write!(self.output, "{}", TagSuffix(&option.tags));
                    self.output.push('\n');
                }
                self.depth -= 1;
                self.indent();
                self.output.push('}');
            }
            Stmt::Random { options, .. } => {
                out.push_str("RANDOM {\n");
                self.depth += 1;
                for option in options {
                    self.indent();
                    self.block(&option.body);
                    let _ = write!(self.output, "{}", TagSuffix(&option.tags));
                    self.output.push('\n');
                }
                self.depth -= 1;
                self.indent();
                self.output.push('}');
            }
            Stmt::If { .. } => self.if_chain(stmt),
            Stmt::Block(block) => self.block(block),
        }
    }

    fn if_chain(&mut self, stmt: &Stmt) {
        let Stmt::If {
            condition,
            consequence,
            alternative,
            ..
        } = stmt
        else {
            return;
        };
        let _ = write!(self.output, "IF {condition} ");
        self.block(consequence);
        let Some(alternative) = alternative else {
            return;
        };
        self.output.push_str(" ELSE ");
        match &*alternative.statements {
            [nested @ Stmt::If { .. }] => self.if_chain(nested),
            _ => self.block(alternative),
        }
    }

    /// Writes `{`, the indented statements, and `}` without a trailing newline.
    fn block(&mut self, block: &Block) {
        self.output.push_str("{\n");
        self.depth += 1;
        self.statements(&block.statements);
        self.depth -= 1;
        self.indent();
        self.output.push('}');
    }
}

struct TagSuffix<'a>(&'a TagList);

impl fmt::Display for TagSuffix<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            Ok(())
        } else {
            write!(f, " [{}]", self.0.names().join(", "))
        }
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&pretty_print(self))
    }
}

impl fmt::Display for Stmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(pretty_print_statement(self).trim_end())
    }
}

impl fmt::Display for ToolCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}", self.function)?;
        for (i, arg) in self.args.iter().enumerate() {
            f.write_str(if i == 0 { "; " } else { ", " })?;
            write!(f, "{arg}")?;
        }
        f.write_char('>')
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Identifier(name, _) => f.write_str(name),
            Self::String(text, _) => write!(f, "\"{}\"", escape(text)),
            Self::Interpolated(parts, _) => {
                f.write_char('"')?;
                for part in parts {
                    match part {
                        StringPart::Text(text) => f.write_str(&escape(text))?,
                        StringPart::Variable(name) => write!(f, "{{{name}}}")?,
                        StringPart::ToolCall(call) => write!(f, "{call}")?,
                    }
                }
                f.write_char('"')
            }
            Self::Int(n, _) => write!(f, "{n}"),
            Self::Bool(true, _) => f.write_str("TRUE"),
            Self::Bool(false, _) => f.write_str("FALSE"),
            Self::Infix {
                op, left, right, ..
            } => write!(f, "({left} {} {right})", op.symbol()),
            Self::Prefix { op, operand, .. } => write!(f, "{}{operand}", op.symbol()),
            Self::ToolCall(call) => write!(f, "{call}"),
        }
    }
}
