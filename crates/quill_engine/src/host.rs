//! The boundary between scripts and the embedding program.
//!
//! Tool calls name a function and pass it evaluated arguments. Interpolated
//! calls are answered on the spot through a [`ToolHost`]; a `LET` whose whole
//! right-hand side is a call suspends the interpreter instead and leaves the
//! answer to the driver.

use std::collections::HashMap;
use std::fmt;

use quill_foundation::{Error, ErrorKind, Result, Value};

/// Something that can answer tool calls.
pub trait ToolHost {
    /// Runs `function` with `args`.
    ///
    /// # Errors
    /// Returns [`ErrorKind::UnknownTool`] for names the host does not provide,
    /// or any error the function itself reports.
    fn call(&mut self, function: &str, args: &[Value]) -> Result<Value>;
}

/// A host that provides no functions.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoTools;

impl ToolHost for NoTools {
    fn call(&mut self, function: &str, _args: &[Value]) -> Result<Value> {
        Err(Error::new(ErrorKind::UnknownTool(function.to_string())))
    }
}

type ToolFn = Box<dyn FnMut(&[Value]) -> Result<Value>>;

// =============================================================================
// FunctionTable
// =============================================================================

/// A name to closure registry.
///
/// # Example
///
/// ```
/// use quill_engine::{FunctionTable, ToolHost};
/// use quill_foundation::Value;
///
/// let mut table = FunctionTable::new();
/// table.register("getPlayerName", |_| Ok(Value::from("Ada")));
/// assert_eq!(table.call("getPlayerName", &[]).unwrap(), Value::from("Ada"));
/// ```
#[derive(Default)]
pub struct FunctionTable {
    functions: HashMap<String, ToolFn>,
}

impl FunctionTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a function, replacing any earlier one with the same name.
    pub fn register<F>(&mut self, name: impl Into<String>, function: F)
    where
        F: FnMut(&[Value]) -> Result<Value> + 'static,
    {
        self.functions.insert(name.into(), Box::new(function));
    }

    /// Registers a function that always returns `value`.
    pub fn register_constant(&mut self, name: impl Into<String>, value: Value) {
        self.register(name, move |_| Ok(value.clone()));
    }

    /// Removes a function. Returns true if it was registered.
    pub fn unregister(&mut self, name: &str) -> bool {
        self.functions.remove(name).is_some()
    }

    /// Returns true if `name` is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    /// Returns the registered names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.functions.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Returns the number of registered functions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.functions.len()
    }

    /// Returns true if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}

impl ToolHost for FunctionTable {
    fn call(&mut self, function: &str, args: &[Value]) -> Result<Value> {
        let Some(f) = self.functions.get_mut(function) else {
            return Err(Error::new(ErrorKind::UnknownTool(function.to_string())));
        };
        tracing::trace!(function, args = args.len(), "host call");
        f(args)
    }
}

impl fmt::Debug for FunctionTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionTable")
            .field("functions", &self.names())
            .finish()
    }
}

/// Builds a [`ErrorKind::ToolFailed`] error for a host function.
#[must_use]
pub fn tool_failed(function: impl Into<String>, message: impl Into<String>) -> Error {
    Error::new(ErrorKind::ToolFailed {
        function: function.into(),
        message: message.into(),
    })
}
