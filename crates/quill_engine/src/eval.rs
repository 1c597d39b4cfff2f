//! Expression evaluation.
//!
//! A structural recursive evaluator over [`Expr`]. Every error is tagged with
//! the line of the expression that raised it.

use im::OrdMap;
use quill_foundation::{Error, ErrorKind, Result, Type, Value};
use quill_language::{AssignOp, Expr, InfixOp, PrefixOp, StringPart, ToolCall};

use crate::host::ToolHost;

/// The variable environment: name to value, ordered by name.
pub type Variables = OrdMap<String, Value>;

/// Evaluates expressions against a variable environment.
///
/// Tool calls met during evaluation run immediately through the host.
pub struct Evaluator<'a> {
    variables: &'a Variables,
    host: &'a mut dyn ToolHost,
}

impl<'a> Evaluator<'a> {
    /// Creates an evaluator.
    pub fn new(variables: &'a Variables, host: &'a mut dyn ToolHost) -> Self {
        Self { variables, host }
    }

    /// Evaluates an expression.
    ///
    /// # Errors
    /// Returns an error for undefined variables, operand type mismatches,
    /// integer overflow, or a failed tool call.
    pub fn eval(&mut self, expr: &Expr) -> Result<Value> {
        match expr {
            Expr::Identifier(name, span) => self
                .variables
                .get(name)
                .cloned()
                .ok_or_else(|| Error::undefined_variable(name).at_line(span.line)),
            Expr::String(text, _) => Ok(Value::from(text.as_str())),
            Expr::Interpolated(parts, _) => self.interpolate(parts).map(Value::from),
            Expr::Int(n, _) => Ok(Value::Int(*n)),
            Expr::Bool(b, _) => Ok(Value::Bool(*b)),
            Expr::Infix {
                op,
                left,
                right,
                span,
            } => self.infix(*op, left, right, span.line),
            Expr::Prefix { op, operand, span } => {
                let value = self.eval(operand)?;
                prefix(*op, &value).map_err(|e| e.at_line(span.line))
            }
            Expr::ToolCall(call) => self.call(call),
        }
    }

    /// Evaluates the arguments of a tool call, left to right.
    ///
    /// # Errors
    /// Returns the first argument error.
    pub fn args(&mut self, call: &ToolCall) -> Result<Vec<Value>> {
        call.args.iter().map(|arg| self.eval(arg)).collect()
    }

    /// Evaluates the arguments and runs the call through the host.
    ///
    /// # Errors
    /// Returns argument errors or whatever the host reports.
    pub fn call(&mut self, call: &ToolCall) -> Result<Value> {
        let args = self.args(call)?;
        self.host.call(&call.function, &args).map_err(|e| {
            if e.line.is_some() {
                e
            } else {
                e.at_line(call.span.line)
            }
        })
    }

    fn interpolate(&mut self, parts: &[StringPart]) -> Result<String> {
        let mut out = String::new();
        for part in parts {
            match part {
                StringPart::Text(text) => out.push_str(text),
                StringPart::Variable(name) => match self.variables.get(name) {
                    Some(value) => out.push_str(&value.to_string()),
                    None => {
                        out.push('{');
                        out.push_str(name);
                        out.push('}');
                    }
                },
                StringPart::ToolCall(call) => {
                    let value = self.call(call)?;
                    out.push_str(&value.to_string());
                }
            }
        }
        Ok(out)
    }

    fn infix(&mut self, op: InfixOp, left: &Expr, right: &Expr, line: u32) -> Result<Value> {
        if op == InfixOp::NullCoalesce {
            return match self.eval(left) {
                Ok(value) if value.is_truthy() => Ok(value),
                _ => self.eval(right),
            };
        }
        let left = self.eval(left)?;
        let right = self.eval(right)?;
        binary(op, &left, &right).map_err(|e| e.at_line(line))
    }
}

/// Applies a binary operator to two evaluated operands.
///
/// `??` is not handled here since it needs the unevaluated right side.
///
/// # Errors
/// Returns a type mismatch or overflow error without a line.
pub fn binary(op: InfixOp, left: &Value, right: &Value) -> Result<Value> {
    match op {
        InfixOp::Eq => Ok(Value::Bool(left == right)),
        InfixOp::NotEq => Ok(Value::Bool(left != right)),
        InfixOp::And | InfixOp::Or => match (left, right) {
            (Value::Bool(a), Value::Bool(b)) => Ok(Value::Bool(if op == InfixOp::And {
                *a && *b
            } else {
                *a || *b
            })),
            _ => Err(mismatch(op.symbol(), Type::Bool, left, right)),
        },
        InfixOp::Lt | InfixOp::Gt | InfixOp::LtEq | InfixOp::GtEq => {
            let (a, b) = integers(op.symbol(), left, right)?;
            Ok(Value::Bool(match op {
                InfixOp::Lt => a < b,
                InfixOp::Gt => a > b,
                InfixOp::LtEq => a <= b,
                _ => a >= b,
            }))
        }
        InfixOp::Add => {
            let (a, b) = integers(op.symbol(), left, right)?;
            checked(a.checked_add(b), op.symbol())
        }
        InfixOp::Sub => {
            let (a, b) = integers(op.symbol(), left, right)?;
            checked(a.checked_sub(b), op.symbol())
        }
        InfixOp::NullCoalesce => Ok(if left.is_truthy() {
            left.clone()
        } else {
            right.clone()
        }),
    }
}

/// Applies a prefix operator.
///
/// # Errors
/// Returns a type mismatch error without a line.
pub fn prefix(op: PrefixOp, operand: &Value) -> Result<Value> {
    match (op, operand) {
        (PrefixOp::Not, Value::Bool(b)) => Ok(Value::Bool(!b)),
        (PrefixOp::Not, other) => Err(Error::new(ErrorKind::PrefixTypeMismatch {
            operator: op.symbol().to_string(),
            expected: Type::Bool,
            actual: other.value_type(),
        })),
    }
}

/// Computes the new value of an assignment target.
///
/// `=` replaces; `+=` and `-=` require integers on both sides.
///
/// # Errors
/// Returns a type mismatch or overflow error without a line.
pub fn assign(op: AssignOp, current: &Value, operand: Value) -> Result<Value> {
    match op {
        AssignOp::Set => Ok(operand),
        AssignOp::Add => {
            let (a, b) = integers(op.symbol(), current, &operand)?;
            checked(a.checked_add(b), op.symbol())
        }
        AssignOp::Sub => {
            let (a, b) = integers(op.symbol(), current, &operand)?;
            checked(a.checked_sub(b), op.symbol())
        }
    }
}

fn integers(operator: &str, left: &Value, right: &Value) -> Result<(i64, i64)> {
    match (left, right) {
        (Value::Int(a), Value::Int(b)) => Ok((*a, *b)),
        _ => Err(mismatch(operator, Type::Int, left, right)),
    }
}

fn mismatch(operator: &str, expected: Type, left: &Value, right: &Value) -> Error {
    Error::type_mismatch(operator, expected, left.value_type(), right.value_type())
}

fn checked(result: Option<i64>, operator: &str) -> Result<Value> {
    result
        .map(Value::Int)
        .ok_or_else(|| Error::new(ErrorKind::IntegerOverflow(operator.to_string())))
}
