//! The resumable interpreter.
//!
//! Execution is a loop over an explicit stack of [`Frame`]s rather than
//! native recursion, so the interpreter can stop at a `CHOICE` or a tool call
//! and pick up later from plain data.

use std::collections::HashMap;
use std::sync::Arc;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use quill_foundation::{Error, ErrorKind, Result, SemanticLimit, Value};
use quill_language::{Block, BlockId, ChoiceOption, Program, Stmt};

use crate::config::InterpreterConfig;
use crate::eval::{self, Evaluator, Variables};
use crate::host::{NoTools, ToolHost};
use crate::state::{Frame, PendingToolCall, Phase, State};

// =============================================================================
// Step results
// =============================================================================

/// One option of a choice prompt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChoiceOptionView {
    /// Zero-based index to pass back to
    /// [`Interpreter::handle_choice_input`].
    pub index: usize,
    /// Resolved option text.
    pub text: String,
    /// Option tags.
    pub tags: Vec<String>,
}

/// What a step produced.
#[derive(Clone, Debug, PartialEq)]
pub enum StepResult {
    /// A line of dialog.
    Dialog {
        /// Who is speaking.
        speaker: String,
        /// Resolved text.
        text: String,
        /// Line tags.
        tags: Vec<String>,
    },
    /// A choice prompt. The interpreter now waits for a selection.
    Choice {
        /// The options, in order.
        options: Vec<ChoiceOptionView>,
    },
    /// A tool call request. The interpreter now waits for a response.
    ToolCall {
        /// Function name.
        function: String,
        /// Evaluated arguments.
        args: Vec<Value>,
    },
    /// The program finished.
    End,
    /// A runtime error, or input the current phase does not accept.
    Error(Error),
}

impl StepResult {
    /// Returns true for [`StepResult::End`].
    #[must_use]
    pub const fn is_end(&self) -> bool {
        matches!(self, Self::End)
    }

    /// Returns true for [`StepResult::Error`].
    #[must_use]
    pub const fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }

    /// Returns the error, if this is one.
    #[must_use]
    pub const fn error(&self) -> Option<&Error> {
        match self {
            Self::Error(err) => Some(err),
            _ => None,
        }
    }
}

// =============================================================================
// Labels
// =============================================================================

/// Where a label was declared.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum LabelSite {
    /// Index in the top-level list.
    TopLevel(usize),
    /// Somewhere inside a nested block; not a valid jump target.
    Nested,
}

fn choice_views(
    options: &[ChoiceOption],
    variables: &Variables,
    host: &mut dyn ToolHost,
) -> Result<Vec<ChoiceOptionView>> {
    let mut evaluator = Evaluator::new(variables, host);
    options
        .iter()
        .enumerate()
        .map(|(index, option)| {
            Ok(ChoiceOptionView {
                index,
                text: evaluator.eval(&option.text)?.to_string(),
                tags: option.tags.names().to_vec(),
            })
        })
        .collect()
}

fn collect_labels(statements: &[Stmt], top_level: bool, labels: &mut HashMap<String, LabelSite>) {
    for (index, stmt) in statements.iter().enumerate() {
        if let Some(name) = stmt.label_name() {
            let site = if top_level {
                LabelSite::TopLevel(index)
            } else {
                LabelSite::Nested
            };
            labels.insert(name.to_string(), site);
        }
        for block in stmt.child_blocks() {
            collect_labels(&block.statements, false, labels);
        }
    }
}

// =============================================================================
// Interpreter
// =============================================================================

/// Runs a parsed program one visible result at a time.
///
/// # Example
///
/// ```
/// use quill_engine::{Interpreter, StepResult};
/// use quill_language::compile;
///
/// let program = compile("Alice: \"Hello\"\nEND").unwrap();
/// let mut interpreter = Interpreter::new(program);
/// assert!(matches!(interpreter.step(), StepResult::Dialog { .. }));
/// assert_eq!(interpreter.step(), StepResult::End);
/// assert_eq!(interpreter.step(), StepResult::End);
/// ```
#[derive(Clone, Debug)]
pub struct Interpreter {
    pub(crate) program: Program,
    pub(crate) blocks: HashMap<BlockId, Arc<[Stmt]>>,
    pub(crate) labels: HashMap<String, LabelSite>,
    pub(crate) variables: Variables,
    pub(crate) current: Frame,
    pub(crate) stack: Vec<Frame>,
    pub(crate) state: State,
    pub(crate) rng: ChaCha8Rng,
    pub(crate) config: InterpreterConfig,
}

impl Interpreter {
    /// Creates an interpreter with the default configuration.
    ///
    /// Construction never fails; a `GOTO` to a missing label fails when it
    /// runs.
    #[must_use]
    pub fn new(program: Program) -> Self {
        Self::with_config(program, InterpreterConfig::default())
    }

    /// Creates an interpreter with the given configuration.
    #[must_use]
    pub fn with_config(program: Program, config: InterpreterConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        Self::assemble(program, config, rng)
    }

    pub(crate) fn assemble(program: Program, config: InterpreterConfig, rng: ChaCha8Rng) -> Self {
        let mut blocks = HashMap::new();
        blocks.insert(BlockId::ROOT, Arc::clone(&program.statements));
        for block in program.blocks() {
            blocks.insert(block.id, Arc::clone(&block.statements));
        }

        let mut labels = HashMap::new();
        collect_labels(&program.statements, true, &mut labels);

        tracing::debug!(
            statements = program.len(),
            blocks = blocks.len(),
            labels = labels.len(),
            "interpreter ready"
        );

        Self {
            program,
            blocks,
            labels,
            variables: Variables::new(),
            current: Frame::START,
            stack: Vec::new(),
            state: State::Ready,
            rng,
            config,
        }
    }

    // -------------------------------------------------------------------------
    // Driving
    // -------------------------------------------------------------------------

    /// Runs until something visible happens.
    ///
    /// Interpolated tool calls fail with [`ErrorKind::UnknownTool`]; use
    /// [`Interpreter::step_with`] to answer them.
    pub fn step(&mut self) -> StepResult {
        self.step_with(&mut NoTools)
    }

    /// Runs until something visible happens, answering interpolated tool
    /// calls through `host`.
    ///
    /// When ended or failed this repeats the terminal result. While waiting
    /// it returns an error result and leaves the state alone.
    pub fn step_with(&mut self, host: &mut dyn ToolHost) -> StepResult {
        match &self.state {
            State::Ready => {}
            State::WaitingForChoice { .. } => {
                return StepResult::Error(Error::new(ErrorKind::AwaitingChoice));
            }
            State::WaitingForToolCall(_) => {
                return StepResult::Error(Error::new(ErrorKind::AwaitingToolCall));
            }
            State::Ended => return StepResult::End,
            State::Failed(err) => return StepResult::Error(err.clone()),
        }
        self.run(host)
    }

    /// Selects an option of the pending choice and runs its body.
    ///
    /// An out-of-range index, or a call while no choice is pending, returns
    /// an error result without changing anything.
    pub fn handle_choice_input(&mut self, index: usize) -> StepResult {
        self.handle_choice_input_with(index, &mut NoTools)
    }

    /// Like [`Interpreter::handle_choice_input`], answering interpolated tool
    /// calls through `host`.
    pub fn handle_choice_input_with(&mut self, index: usize, host: &mut dyn ToolHost) -> StepResult {
        let State::WaitingForChoice { location } = self.state else {
            return StepResult::Error(Error::new(ErrorKind::NotWaitingForChoice));
        };
        let statements = match self.statements(location.block) {
            Ok(statements) => statements,
            Err(err) => return self.fail(err),
        };
        let Some(Stmt::Choice { options, span }) = statements.get(location.index) else {
            return self.fail(Error::internal("pending choice does not point at a CHOICE"));
        };
        let Some(option) = options.get(index) else {
            let err = Error::new(ErrorKind::InvalidChoice {
                index,
                count: options.len(),
            });
            return StepResult::Error(err.at_line(span.line));
        };

        tracing::debug!(index, line = span.line, "choice made");
        self.state = State::Ready;
        self.enter(&option.body);
        self.run(host)
    }

    /// Binds the response of the pending tool call.
    ///
    /// The `LET` is complete afterwards; call [`Interpreter::step`] to carry
    /// on.
    ///
    /// # Errors
    /// Returns [`ErrorKind::NotWaitingForToolCall`] if no tool call is pending.
    pub fn handle_tool_call_response(&mut self, value: Value) -> Result<()> {
        let State::WaitingForToolCall(pending) = &self.state else {
            return Err(Error::new(ErrorKind::NotWaitingForToolCall));
        };
        tracing::debug!(function = %pending.function, target = %pending.target, "tool call answered");
        let target = pending.target.clone();
        self.variables.insert(target, value);
        self.state = State::Ready;
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    /// Returns the current phase.
    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.state.phase()
    }

    /// Returns the full execution state.
    #[must_use]
    pub const fn state(&self) -> &State {
        &self.state
    }

    /// Returns true once the program has finished.
    #[must_use]
    pub const fn is_ended(&self) -> bool {
        matches!(self.state, State::Ended)
    }

    /// Returns true if a runtime error stopped the program.
    #[must_use]
    pub const fn is_failed(&self) -> bool {
        matches!(self.state, State::Failed(_))
    }

    /// Returns true while a choice is pending.
    #[must_use]
    pub const fn is_waiting_for_choice(&self) -> bool {
        matches!(self.state, State::WaitingForChoice { .. })
    }

    /// Returns true while a tool call is pending.
    #[must_use]
    pub const fn is_waiting_for_tool_call(&self) -> bool {
        matches!(self.state, State::WaitingForToolCall(_))
    }

    /// Returns the pending tool call, if any.
    #[must_use]
    pub const fn pending_tool_call(&self) -> Option<&PendingToolCall> {
        match &self.state {
            State::WaitingForToolCall(pending) => Some(pending),
            _ => None,
        }
    }

    /// Renders the options of the pending choice again.
    ///
    /// Returns `Ok(None)` when no choice is pending. Useful after
    /// [`Interpreter::restore`], when the original prompt is gone.
    ///
    /// # Errors
    /// Returns an error if an option text fails to evaluate.
    pub fn pending_choice_with(&self, host: &mut dyn ToolHost) -> Result<Option<Vec<ChoiceOptionView>>> {
        let State::WaitingForChoice { location } = self.state else {
            return Ok(None);
        };
        let statements = self.statements(location.block)?;
        match statements.get(location.index) {
            Some(Stmt::Choice { options, .. }) => choice_views(options, &self.variables, host).map(Some),
            _ => Err(Error::internal("pending choice does not point at a CHOICE")),
        }
    }

    /// Returns the error that stopped the program, if any.
    #[must_use]
    pub const fn error(&self) -> Option<&Error> {
        match &self.state {
            State::Failed(err) => Some(err),
            _ => None,
        }
    }

    /// Looks up a variable.
    #[must_use]
    pub fn variable(&self, name: &str) -> Option<&Value> {
        self.variables.get(name)
    }

    /// Returns every variable, ordered by name.
    #[must_use]
    pub const fn variables(&self) -> &Variables {
        &self.variables
    }

    /// Binds a variable from outside the script.
    pub fn set_variable(&mut self, name: impl Into<String>, value: Value) {
        self.variables.insert(name.into(), value);
    }

    /// Returns the number of suspended block contexts.
    #[must_use]
    pub fn stack_depth(&self) -> usize {
        self.stack.len()
    }

    /// Returns the position of the next statement.
    #[must_use]
    pub const fn position(&self) -> Frame {
        self.current
    }

    /// Returns the program being run.
    #[must_use]
    pub const fn program(&self) -> &Program {
        &self.program
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &InterpreterConfig {
        &self.config
    }

    // -------------------------------------------------------------------------
    // Execution
    // -------------------------------------------------------------------------

    fn run(&mut self, host: &mut dyn ToolHost) -> StepResult {
        let mut silent = 0usize;
        loop {
            match self.advance(host) {
                Ok(Some(result)) => return result,
                Ok(None) => {
                    silent += 1;
                    if silent > self.config.max_silent_steps {
                        let limit = SemanticLimit::MaxSilentSteps {
                            limit: self.config.max_silent_steps,
                        };
                        return self.fail(Error::limit_exceeded(limit));
                    }
                }
                Err(err) => return self.fail(err),
            }
        }
    }

    /// Runs one statement, or leaves one exhausted block.
    fn advance(&mut self, host: &mut dyn ToolHost) -> Result<Option<StepResult>> {
        let statements = self.statements(self.current.block)?;
        let Some(stmt) = statements.get(self.current.index) else {
            return Ok(match self.stack.pop() {
                Some(frame) => {
                    self.current = frame;
                    None
                }
                None => {
                    tracing::debug!("program ended");
                    self.state = State::Ended;
                    Some(StepResult::End)
                }
            });
        };
        let location = self.current;
        self.current.index += 1;
        self.execute(stmt, location, host)
    }

    fn execute(
        &mut self,
        stmt: &Stmt,
        location: Frame,
        host: &mut dyn ToolHost,
    ) -> Result<Option<StepResult>> {
        match stmt {
            Stmt::Label { .. } => Ok(None),
            Stmt::Goto { label, span } => {
                self.goto(label).map_err(|e| e.at_line(span.line))?;
                Ok(None)
            }
            Stmt::End { .. } => {
                tracing::debug!(line = stmt.line(), "END reached");
                self.state = State::Ended;
                Ok(Some(StepResult::End))
            }
            Stmt::Dialog {
                speaker, text, tags, ..
            } => {
                let text = Evaluator::new(&self.variables, host).eval(text)?;
                Ok(Some(StepResult::Dialog {
                    speaker: speaker.clone(),
                    text: text.to_string(),
                    tags: tags.names().to_vec(),
                }))
            }
            Stmt::Choice { options, span } => {
                if options.is_empty() {
                    return Err(Error::new(ErrorKind::EmptyChoice).at_line(span.line));
                }
                let views = choice_views(options, &self.variables, host)?;
                tracing::debug!(options = views.len(), line = span.line, "waiting for choice");
                self.state = State::WaitingForChoice { location };
                Ok(Some(StepResult::Choice { options: views }))
            }
            Stmt::Random { options, span } => {
                if options.is_empty() {
                    return Err(Error::new(ErrorKind::EmptyRandom).at_line(span.line));
                }
                let pick = self.rng.gen_range(0..options.len());
                tracing::trace!(pick, options = options.len(), line = span.line, "random option");
                self.enter(&options[pick].body);
                Ok(None)
            }
            Stmt::If {
                condition,
                consequence,
                alternative,
                span,
            } => {
                let condition = Evaluator::new(&self.variables, host).eval(condition)?;
                match condition {
                    Value::Bool(true) => self.enter(consequence),
                    Value::Bool(false) => {
                        if let Some(alternative) = alternative {
                            self.enter(alternative);
                        }
                    }
                    other => {
                        let err = Error::new(ErrorKind::NonBooleanCondition(other.value_type()));
                        return Err(err.at_line(span.line));
                    }
                }
                Ok(None)
            }
            Stmt::Let { name, value, span } => {
                let mut evaluator = Evaluator::new(&self.variables, host);
                if let Some(call) = value.as_tool_call() {
                    let args = evaluator.args(call)?;
                    tracing::debug!(function = %call.function, target = %name, "waiting for tool call");
                    self.state = State::WaitingForToolCall(PendingToolCall {
                        function: call.function.clone(),
                        args: args.clone(),
                        target: name.clone(),
                        line: span.line,
                    });
                    return Ok(Some(StepResult::ToolCall {
                        function: call.function.clone(),
                        args,
                    }));
                }
                let value = evaluator.eval(value)?;
                self.variables.insert(name.clone(), value);
                Ok(None)
            }
            Stmt::Assign {
                name,
                op,
                value,
                span,
            } => {
                let Some(current) = self.variables.get(name).cloned() else {
                    return Err(Error::undefined_variable(name).at_line(span.line));
                };
                let operand = Evaluator::new(&self.variables, host).eval(value)?;
                let updated = eval::assign(*op, &current, operand).map_err(|e| e.at_line(span.line))?;
                self.variables.insert(name.clone(), updated);
                Ok(None)
            }
            Stmt::Block(block) => {
                self.enter(block);
                Ok(None)
            }
        }
    }

    /// Continues inside `block`, returning to the current position after it.
    fn enter(&mut self, block: &Block) {
        if block.is_empty() {
            return;
        }
        self.stack.push(self.current);
        self.current = Frame::new(block.id, 0);
    }

    fn goto(&mut self, label: &str) -> Result<()> {
        match self.labels.get(label) {
            Some(LabelSite::TopLevel(index)) => {
                tracing::debug!(label, abandoned = self.stack.len(), "goto");
                self.stack.clear();
                self.current = Frame::new(BlockId::ROOT, index + 1);
                Ok(())
            }
            Some(LabelSite::Nested) => Err(Error::new(ErrorKind::LabelNotTopLevel(label.to_string()))),
            None => Err(Error::undefined_label(label)),
        }
    }

    pub(crate) fn statements(&self, block: BlockId) -> Result<Arc<[Stmt]>> {
        self.blocks
            .get(&block)
            .cloned()
            .ok_or_else(|| Error::internal(format!("unknown block {}", block.0)))
    }

    fn fail(&mut self, err: Error) -> StepResult {
        tracing::warn!(line = ?err.line, error = %err, "runtime error");
        self.state = State::Failed(err.clone());
        StepResult::Error(err)
    }
}
