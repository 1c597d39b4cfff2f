//! Interpreter state as plain data.
//!
//! A [`Snapshot`] holds everything that changes while a program runs. The
//! program itself is not included; restoring needs the same parsed program
//! so that block ids line up.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use quill_foundation::{Error, ErrorKind, Result};
use quill_language::{Program, Stmt};

use crate::config::InterpreterConfig;
use crate::eval::Variables;
use crate::interpreter::Interpreter;
use crate::state::{Frame, State};

/// Position of the `RANDOM` generator.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RngState {
    /// The generator seed.
    pub seed: [u8; 32],
    /// High half of the stream position, in words.
    pub word_pos_high: u64,
    /// Low half of the stream position, in words.
    pub word_pos_low: u64,
}

impl RngState {
    #[allow(clippy::cast_possible_truncation)]
    fn capture(rng: &ChaCha8Rng) -> Self {
        let pos = rng.get_word_pos();
        Self {
            seed: rng.get_seed(),
            word_pos_high: (pos >> 64) as u64,
            word_pos_low: pos as u64,
        }
    }

    fn rebuild(&self) -> ChaCha8Rng {
        let mut rng = ChaCha8Rng::from_seed(self.seed);
        rng.set_word_pos((u128::from(self.word_pos_high) << 64) | u128::from(self.word_pos_low));
        rng
    }
}

/// The mutable state of an interpreter.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Snapshot {
    /// Bound variables.
    pub variables: Variables,
    /// Next statement to run.
    pub current: Frame,
    /// Suspended block contexts, innermost last.
    pub stack: Vec<Frame>,
    /// Phase, with whatever the interpreter waits on.
    pub state: State,
    /// Random generator position.
    pub rng: RngState,
}

impl Interpreter {
    /// Captures the current state.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            variables: self.variables.clone(),
            current: self.current,
            stack: self.stack.clone(),
            state: self.state.clone(),
            rng: RngState::capture(&self.rng),
        }
    }

    /// Rebuilds an interpreter for `program` from a snapshot.
    ///
    /// The generator continues from the snapshot; `config.seed` is ignored.
    ///
    /// # Errors
    /// Returns [`ErrorKind::SnapshotMismatch`] if any frame or pending choice
    /// does not exist in `program`.
    pub fn restore(program: Program, snapshot: Snapshot, config: InterpreterConfig) -> Result<Self> {
        let mut interpreter = Self::assemble(program, config, snapshot.rng.rebuild());

        for frame in std::iter::once(&snapshot.current).chain(&snapshot.stack) {
            interpreter.check_frame(*frame)?;
        }
        if let State::WaitingForChoice { location } = &snapshot.state {
            let statements = interpreter
                .statements(location.block)
                .map_err(|_| mismatch("pending choice block"))?;
            if !matches!(statements.get(location.index), Some(Stmt::Choice { .. })) {
                return Err(mismatch(format!(
                    "no CHOICE at block {} index {}",
                    location.block.0, location.index
                )));
            }
        }

        tracing::debug!(
            variables = snapshot.variables.len(),
            depth = snapshot.stack.len(),
            phase = ?snapshot.state.phase(),
            "interpreter restored"
        );

        interpreter.variables = snapshot.variables;
        interpreter.current = snapshot.current;
        interpreter.stack = snapshot.stack;
        interpreter.state = snapshot.state;
        Ok(interpreter)
    }

    fn check_frame(&self, frame: Frame) -> Result<()> {
        let statements = self
            .statements(frame.block)
            .map_err(|_| mismatch(format!("unknown block {}", frame.block.0)))?;
        if frame.index > statements.len() {
            return Err(mismatch(format!(
                "index {} past the end of block {}",
                frame.index, frame.block.0
            )));
        }
        Ok(())
    }
}

fn mismatch(message: impl Into<String>) -> Error {
    Error::new(ErrorKind::SnapshotMismatch(message.into()))
}
