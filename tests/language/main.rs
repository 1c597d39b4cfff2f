//! Integration tests for Layer 1: Language
//!
//! Tests for the lexer, parser, and pretty-printer working together.

mod parser;
mod pretty;
