//! Session driver, terminal player, and snapshots for Quill.
//!
//! This crate provides:
//! - [`Session`] - A running script plus its host function table
//! - [`Player`] - Interactive terminal loop over a session
//! - [`serialize`] - Saving and loading sessions with `MessagePack`
//! - [`parse_literal`] - Reading values typed by the player
//! - The `quill` command-line binary

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod editor;
pub mod literal;
pub mod player;
pub mod serialize;
pub mod session;

pub use editor::{LineEditor, ReadResult, RustylineEditor, ScriptedEditor};
pub use literal::parse_literal;
pub use player::{Outcome, Player};
pub use session::Session;
