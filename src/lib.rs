//! Quill - Branching dialogue scripts with a resumable interpreter
//!
//! This crate re-exports all layers of the Quill system for convenient access.
//! For detailed documentation, see the individual layer crates.
//!
//! # Architecture
//!
//! ```text
//! Layer 3: quill_runtime    - Sessions, terminal player, save files, CLI
//! Layer 2: quill_engine     - Evaluator, interpreter, host functions, snapshots
//! Layer 1: quill_language   - Lexer, parser, AST, pretty printer
//! Layer 0: quill_foundation - Core types (Value, Type, Diagnostic, Error)
//! ```

pub use quill_engine as engine;
pub use quill_foundation as foundation;
pub use quill_language as language;
pub use quill_runtime as runtime;
