//! Execution positions and interpreter phases.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use quill_foundation::{Error, Value};
use quill_language::BlockId;

/// A position in one statement list: the next statement to run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Frame {
    /// The statement list.
    pub block: BlockId,
    /// Index of the next statement in that list.
    pub index: usize,
}

impl Frame {
    /// The first statement of the program.
    pub const START: Self = Self {
        block: BlockId::ROOT,
        index: 0,
    };

    /// Creates a frame.
    #[must_use]
    pub const fn new(block: BlockId, index: usize) -> Self {
        Self { block, index }
    }
}

/// The coarse execution mode of an interpreter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Free to step.
    Ready,
    /// A `CHOICE` is waiting for the player.
    WaitingForChoice,
    /// A `LET` is waiting for a tool call response.
    WaitingForToolCall,
    /// The program finished.
    Ended,
    /// A runtime error stopped the program.
    Failed,
}

impl Phase {
    /// Returns true if no further input can change this phase.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Ended | Self::Failed)
    }
}

/// A tool call the interpreter is suspended on.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PendingToolCall {
    /// Function name.
    pub function: String,
    /// Evaluated arguments.
    pub args: Vec<Value>,
    /// Variable the response is bound to.
    pub target: String,
    /// Line of the `LET` statement.
    pub line: u32,
}

/// The full execution state, including what the interpreter waits on.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum State {
    /// Free to step.
    Ready,
    /// Waiting on the `CHOICE` statement at `location`.
    WaitingForChoice {
        /// Where the `CHOICE` statement sits.
        location: Frame,
    },
    /// Waiting on a tool call response.
    WaitingForToolCall(PendingToolCall),
    /// Finished.
    Ended,
    /// Stopped by the stored error, which every later step repeats.
    Failed(Error),
}

impl State {
    /// Returns the phase of this state.
    #[must_use]
    pub const fn phase(&self) -> Phase {
        match self {
            Self::Ready => Phase::Ready,
            Self::WaitingForChoice { .. } => Phase::WaitingForChoice,
            Self::WaitingForToolCall(_) => Phase::WaitingForToolCall,
            Self::Ended => Phase::Ended,
            Self::Failed(_) => Phase::Failed,
        }
    }
}
