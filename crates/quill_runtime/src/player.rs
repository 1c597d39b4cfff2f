//! The interactive terminal player.

use std::io::{self, Write};
use std::path::Path;

use quill_engine::{ChoiceOptionView, StepResult};
use quill_foundation::{Error, ErrorKind, Result, Value};

use crate::editor::{LineEditor, ReadResult, RustylineEditor};
use crate::literal::parse_literal;
use crate::serialize::save_to_file;
use crate::session::Session;

/// How a play-through stopped.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// The script reached its end.
    Ended,
    /// The script stopped with a runtime error.
    Failed(Error),
    /// The player left before the end.
    Quit,
}

/// Plays a [`Session`] on a terminal.
///
/// Dialog and prompts go to `out`; input comes from the editor. At any
/// prompt the player may also type a `:` command.
pub struct Player<E: LineEditor = RustylineEditor, W: Write = io::Stdout> {
    editor: E,
    out: W,
    session: Session,
    show_banner: bool,
}

impl Player<RustylineEditor, io::Stdout> {
    /// Creates a player on stdin/stdout.
    ///
    /// # Errors
    ///
    /// Returns an error if the editor fails to initialize.
    pub fn new(session: Session) -> Result<Self> {
        Ok(Self::with_io(session, RustylineEditor::new()?, io::stdout()))
    }
}

impl<E: LineEditor, W: Write> Player<E, W> {
    /// Creates a player with the given editor and output.
    pub fn with_io(session: Session, editor: E, out: W) -> Self {
        Self {
            editor,
            out,
            session,
            show_banner: true,
        }
    }

    /// Disables the start and end banners.
    #[must_use]
    pub fn without_banner(mut self) -> Self {
        self.show_banner = false;
        self
    }

    /// Returns the session.
    #[must_use]
    pub const fn session(&self) -> &Session {
        &self.session
    }

    /// Returns the editor.
    #[must_use]
    pub const fn editor(&self) -> &E {
        &self.editor
    }

    /// Consumes the player, returning the output.
    pub fn into_output(self) -> W {
        self.out
    }

    /// Plays until the script ends, fails, or the player quits.
    ///
    /// # Errors
    ///
    /// Returns an error if reading input or writing output fails.
    pub fn run(&mut self) -> Result<Outcome> {
        if self.show_banner {
            self.line("--- Starting script execution ---")?;
        }

        let mut event = self.session.current_event();
        loop {
            event = match event {
                StepResult::Dialog {
                    speaker,
                    text,
                    tags,
                } => {
                    self.line(&format!("{speaker}: {text}{}", tag_suffix(&tags)))?;
                    self.session.next_event()
                }
                StepResult::Choice { options } => {
                    self.show_choices(&options)?;
                    let Some(index) = self.read_choice(options.len())? else {
                        return Ok(Outcome::Quit);
                    };
                    self.session.choose(index)
                }
                StepResult::ToolCall { function, args } => {
                    self.line(&format!("\n--- Tool Call: {function} ---"))?;
                    self.line(&format!("Arguments: {}", format_args_list(&args)))?;
                    let Some(value) = self.read_value(&function)? else {
                        return Ok(Outcome::Quit);
                    };
                    self.session.respond(value)?;
                    self.session.next_event()
                }
                StepResult::End => {
                    if self.show_banner {
                        self.line("\n--- End of script ---")?;
                    }
                    return Ok(Outcome::Ended);
                }
                StepResult::Error(err) => return Ok(Outcome::Failed(err)),
            };
        }
    }

    fn show_choices(&mut self, options: &[ChoiceOptionView]) -> Result<()> {
        self.line("\nChoices:")?;
        for option in options {
            let text = format!("{}. {}{}", option.index + 1, option.text, tag_suffix(&option.tags));
            self.line(&text)?;
        }
        Ok(())
    }

    /// Reads a 1-based choice, re-prompting until it is in range.
    fn read_choice(&mut self, count: usize) -> Result<Option<usize>> {
        let prompt = format!("\nEnter your choice (1-{count}): ");
        loop {
            let Some(input) = self.read_input(&prompt)? else {
                return Ok(None);
            };
            match input.trim().parse::<usize>() {
                Ok(n) if (1..=count).contains(&n) => return Ok(Some(n - 1)),
                _ => self.line("Invalid choice. Please try again.")?,
            }
        }
    }

    fn read_value(&mut self, function: &str) -> Result<Option<Value>> {
        let prompt = format!("Value for {function}: ");
        Ok(self.read_input(&prompt)?.map(|input| parse_literal(&input)))
    }

    /// Reads a line that is not a command. `None` means the player left.
    fn read_input(&mut self, prompt: &str) -> Result<Option<String>> {
        loop {
            self.out.flush().map_err(io_error)?;
            let line = match self.editor.read_line(prompt)? {
                ReadResult::Line(line) => line,
                ReadResult::Interrupted | ReadResult::Eof => return Ok(None),
            };
            self.editor.add_history(&line);
            let Some(command) = line.trim().strip_prefix(':') else {
                return Ok(Some(line));
            };
            if !self.command(command)? {
                return Ok(None);
            }
        }
    }

    /// Runs a `:` command. Returns false if the player asked to quit.
    fn command(&mut self, command: &str) -> Result<bool> {
        let (name, argument) = command
            .split_once(char::is_whitespace)
            .map_or((command, ""), |(name, rest)| (name, rest.trim()));
        match name {
            "quit" | "q" => return Ok(false),
            "save" if argument.is_empty() => self.line("Usage: :save PATH")?,
            "save" => match save_to_file(&self.session.snapshot(), Path::new(argument)) {
                Ok(()) => self.line(&format!("Saved to {argument}"))?,
                Err(err) => self.line(&format!("Save failed: {err}"))?,
            },
            "vars" => {
                let lines: Vec<String> = self
                    .session
                    .interpreter()
                    .variables()
                    .iter()
                    .map(|(name, value)| format!("  {name} = {}", format_value(value)))
                    .collect();
                if lines.is_empty() {
                    self.line("No variables.")?;
                }
                for line in lines {
                    self.line(&line)?;
                }
            }
            "help" => {
                self.line(":save PATH   Save the session")?;
                self.line(":vars        Show variables")?;
                self.line(":quit        Leave")?;
            }
            other => self.line(&format!("Unknown command: :{other}"))?,
        }
        Ok(true)
    }

    fn line(&mut self, text: &str) -> Result<()> {
        writeln!(self.out, "{text}").map_err(io_error)
    }
}

fn io_error(e: io::Error) -> Error {
    Error::new(ErrorKind::Io(e.to_string()))
}

fn tag_suffix(tags: &[String]) -> String {
    if tags.is_empty() {
        String::new()
    } else {
        format!(" [{}]", tags.join(", "))
    }
}

/// Shows a value the way a script would write it.
fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => format!("{:?}", &**s),
        other => other.to_string(),
    }
}

fn format_args_list(args: &[Value]) -> String {
    let parts: Vec<String> = args.iter().map(format_value).collect();
    format!("[{}]", parts.join(", "))
}
