//! Configuration for the interpreter.

/// Default number of statements one step may run without producing output.
pub const DEFAULT_MAX_SILENT_STEPS: usize = 100_000;

/// Configuration for an [`Interpreter`](crate::Interpreter).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InterpreterConfig {
    /// Seed for `RANDOM` selection; `None` draws one from the OS.
    pub seed: Option<u64>,

    /// Statements a single step may execute without a visible result before
    /// it fails with a limit error.
    pub max_silent_steps: usize,
}

impl Default for InterpreterConfig {
    fn default() -> Self {
        Self {
            seed: None,
            max_silent_steps: DEFAULT_MAX_SILENT_STEPS,
        }
    }
}

impl InterpreterConfig {
    /// Creates a configuration with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a configuration with a fixed seed, for reproducible runs.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self::default().with_seed(seed)
    }

    /// Builder method to set the random seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Builder method to set the silent step limit.
    #[must_use]
    pub fn with_max_silent_steps(mut self, limit: usize) -> Self {
        self.max_silent_steps = limit;
        self
    }
}
