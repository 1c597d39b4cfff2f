//! Resumable interpreter for Quill programs.
//!
//! This crate provides:
//! - [`Interpreter`] - Runs a [`Program`](quill_language::Program) one
//!   visible result at a time, pausing for choices and tool calls
//! - [`Evaluator`] - Expression evaluation over a variable environment
//! - [`ToolHost`] / [`FunctionTable`] - The host function boundary
//! - [`Snapshot`] - Interpreter state as plain data
//! - [`InterpreterConfig`] - Random seed and step limits

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod config;
pub mod eval;
pub mod host;
pub mod interpreter;
pub mod snapshot;
pub mod state;

pub use config::InterpreterConfig;
pub use eval::{Evaluator, Variables};
pub use host::{FunctionTable, NoTools, ToolHost};
pub use interpreter::{ChoiceOptionView, Interpreter, StepResult};
pub use snapshot::{RngState, Snapshot};
pub use state::{Frame, PendingToolCall, Phase, State};
