//! Interfaces the engine needs from the embedding interpreter.

mod binding;

pub use binding::{DebuggerModule, FUNCTIONS};

use std::fmt;
use std::rc::Rc;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum HostError {
    #[error("compile error: {0}")]
    Compile(String),
    #[error("runtime error: {0}")]
    Runtime(String),
}

/// Something the host can call: a suspend callback or a compiled condition.
pub trait Callable {
    fn invoke(&self, args: &[Value]) -> Result<Vec<Value>, HostError>;
}

impl<F> Callable for F
where
    F: Fn(&[Value]) -> Result<Vec<Value>, HostError>,
{
    fn invoke(&self, args: &[Value]) -> Result<Vec<Value>, HostError> {
        self(args)
    }
}

#[derive(Clone)]
pub enum Value {
    Nil,
    Bool(bool),
    Int(i64),
    Str(String),
    Function(Rc<dyn Callable>),
}

impl Value {
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Nil => "nil",
            Value::Bool(_) => "boolean",
            Value::Int(_) => "number",
            Value::Str(_) => "string",
            Value::Function(_) => "function",
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => f.write_str("Nil"),
            Value::Bool(b) => f.debug_tuple("Bool").field(b).finish(),
            Value::Int(n) => f.debug_tuple("Int").field(n).finish(),
            Value::Str(s) => f.debug_tuple("Str").field(s).finish(),
            Value::Function(_) => f.write_str("Function(..)"),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Nil, Value::Nil) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Function(a), Value::Function(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

/// One activation record, identified by where its function was defined.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FrameInfo {
    pub line_defined: i64,
    pub source: String,
}

impl FrameInfo {
    pub fn new(line_defined: i64, source: impl Into<String>) -> Self {
        Self {
            line_defined,
            source: source.into(),
        }
    }
}

/// The interpreter being debugged.
///
/// Calls into a `Host` are made while the engine is deciding whether to
/// suspend, so `frame` must not run interpreted code.
pub trait Host {
    /// Frame at `level`, where 0 is the running function and higher levels
    /// are its callers. `None` once past the outermost frame.
    fn frame(&self, level: usize) -> Option<FrameInfo>;

    /// Compile condition text into a predicate without running it.
    fn compile_condition(&self, condition: &str) -> Result<Rc<dyn Callable>, HostError>;

    /// Enable or disable delivery of line events. Returns whether the host
    /// accepted the change.
    fn set_line_hook(&self, enabled: bool) -> bool;
}
