//! A running script plus the host functions it can call.

use quill_engine::{
    FunctionTable, Interpreter, InterpreterConfig, Phase, Snapshot, StepResult, ToolHost,
};
use quill_foundation::{Result, Value};
use quill_language::{Program, compile};

/// One play-through of a script.
///
/// Tool calls to functions registered in the session's table are answered
/// without surfacing; calls to anything else come back as
/// [`StepResult::ToolCall`] for the caller to answer with
/// [`Session::respond`].
#[derive(Debug)]
pub struct Session {
    interpreter: Interpreter,
    tools: FunctionTable,
}

impl Session {
    /// Creates a session for a parsed program.
    #[must_use]
    pub fn new(program: Program, config: InterpreterConfig) -> Self {
        Self {
            interpreter: Interpreter::with_config(program, config),
            tools: FunctionTable::new(),
        }
    }

    /// Compiles `source` and creates a session for it.
    ///
    /// # Errors
    ///
    /// Returns the lexical or syntax errors of the script.
    pub fn from_source(source: &str, config: InterpreterConfig) -> Result<Self> {
        Ok(Self::new(compile(source)?, config))
    }

    /// Recreates a saved session.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot does not fit `program`.
    pub fn resume(program: Program, snapshot: Snapshot, config: InterpreterConfig) -> Result<Self> {
        Ok(Self {
            interpreter: Interpreter::restore(program, snapshot, config)?,
            tools: FunctionTable::new(),
        })
    }

    /// Replaces the host function table.
    #[must_use]
    pub fn with_tools(mut self, tools: FunctionTable) -> Self {
        self.tools = tools;
        self
    }

    /// Returns the host function table.
    pub fn tools_mut(&mut self) -> &mut FunctionTable {
        &mut self.tools
    }

    /// Returns the interpreter.
    #[must_use]
    pub const fn interpreter(&self) -> &Interpreter {
        &self.interpreter
    }

    /// Returns the interpreter's phase.
    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.interpreter.phase()
    }

    /// Captures the interpreter state.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        self.interpreter.snapshot()
    }

    /// Runs to the next event the caller has to see.
    pub fn next_event(&mut self) -> StepResult {
        let result = self.interpreter.step_with(&mut self.tools);
        self.settle(result)
    }

    /// Returns what the session is waiting on, or runs to the next event.
    ///
    /// After [`Session::resume`] the prompt that was pending when the
    /// session was saved has not been shown yet; this shows it again.
    pub fn current_event(&mut self) -> StepResult {
        match self.interpreter.phase() {
            Phase::WaitingForChoice => match self.interpreter.pending_choice_with(&mut self.tools) {
                Ok(Some(options)) => StepResult::Choice { options },
                Ok(None) => self.next_event(),
                Err(err) => StepResult::Error(err),
            },
            Phase::WaitingForToolCall => {
                let Some(pending) = self.interpreter.pending_tool_call() else {
                    return self.next_event();
                };
                let result = StepResult::ToolCall {
                    function: pending.function.clone(),
                    args: pending.args.clone(),
                };
                self.settle(result)
            }
            Phase::Ready | Phase::Ended | Phase::Failed => self.next_event(),
        }
    }

    /// Picks an option of the pending choice and runs to the next event.
    pub fn choose(&mut self, index: usize) -> StepResult {
        let result = self.interpreter.handle_choice_input_with(index, &mut self.tools);
        self.settle(result)
    }

    /// Answers the pending tool call.
    ///
    /// # Errors
    ///
    /// Returns an error if no tool call is pending.
    pub fn respond(&mut self, value: Value) -> Result<()> {
        self.interpreter.handle_tool_call_response(value)
    }

    /// Answers tool calls the table knows until something else comes up.
    ///
    /// A failing host function is reported as an error result and the
    /// interpreter keeps waiting, so the caller may still respond by hand.
    fn settle(&mut self, mut result: StepResult) -> StepResult {
        loop {
            let StepResult::ToolCall { function, args } = &result else {
                return result;
            };
            if !self.tools.contains(function) {
                return result;
            }
            let value = match self.tools.call(function, args) {
                Ok(value) => value,
                Err(err) => {
                    tracing::warn!(function = %function, error = %err, "host function failed");
                    return StepResult::Error(err);
                }
            };
            if let Err(err) = self.interpreter.handle_tool_call_response(value) {
                return StepResult::Error(err);
            }
            result = self.interpreter.step_with(&mut self.tools);
        }
    }
}
