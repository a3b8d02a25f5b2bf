use super::trace::{TraceEvent, TraceValue};
use crate::host::{Callable, FrameInfo, Host, HostError, Value};
use std::cell::{Cell, RefCell};
use std::cmp::Ordering;
use std::rc::Rc;

type CurrentEvent = Rc<RefCell<Option<TraceEvent>>>;

/// Host backed by a recorded trace. The "running" frame is whatever event
/// was last passed to [`TraceHost::enter`].
#[derive(Default)]
pub struct TraceHost {
    current: CurrentEvent,
    hooked: Cell<bool>,
}

impl TraceHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enter(&self, event: &TraceEvent) {
        *self.current.borrow_mut() = Some(event.clone());
    }

    pub fn leave(&self) {
        *self.current.borrow_mut() = None;
    }

    pub fn is_hooked(&self) -> bool {
        self.hooked.get()
    }

    pub fn stack(&self) -> Vec<FrameInfo> {
        self.current
            .borrow()
            .as_ref()
            .map(|event| event.stack.clone())
            .unwrap_or_default()
    }
}

impl Host for TraceHost {
    fn frame(&self, level: usize) -> Option<FrameInfo> {
        self.current.borrow().as_ref()?.stack.get(level).cloned()
    }

    fn compile_condition(&self, condition: &str) -> Result<Rc<dyn Callable>, HostError> {
        let expr = Expr::parse(condition)?;
        Ok(Rc::new(CompiledCondition {
            expr,
            current: Rc::clone(&self.current),
        }))
    }

    fn set_line_hook(&self, enabled: bool) -> bool {
        self.hooked.set(enabled);
        true
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl CompareOp {
    fn parse(token: &str) -> Option<Self> {
        match token {
            "==" => Some(CompareOp::Eq),
            "~=" | "!=" => Some(CompareOp::Ne),
            "<" => Some(CompareOp::Lt),
            "<=" => Some(CompareOp::Le),
            ">" => Some(CompareOp::Gt),
            ">=" => Some(CompareOp::Ge),
            _ => None,
        }
    }

    fn holds(self, ordering: Ordering) -> bool {
        match self {
            CompareOp::Eq => ordering == Ordering::Equal,
            CompareOp::Ne => ordering != Ordering::Equal,
            CompareOp::Lt => ordering == Ordering::Less,
            CompareOp::Le => ordering != Ordering::Greater,
            CompareOp::Gt => ordering == Ordering::Greater,
            CompareOp::Ge => ordering != Ordering::Less,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Expr {
    Const(bool),
    Var(String),
    Compare {
        name: String,
        op: CompareOp,
        literal: TraceValue,
    },
}

fn is_identifier(token: &str) -> bool {
    let mut chars = token.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn parse_literal(token: &str) -> TraceValue {
    match token {
        "true" => TraceValue::Bool(true),
        "false" => TraceValue::Bool(false),
        _ => token
            .parse::<i64>()
            .map(TraceValue::Int)
            .unwrap_or_else(|_| TraceValue::Str(token.to_string())),
    }
}

impl Expr {
    fn parse(text: &str) -> Result<Self, HostError> {
        let tokens = shlex::split(text)
            .ok_or_else(|| HostError::Compile(format!("unbalanced quotes in `{text}`")))?;

        match tokens.as_slice() {
            [word] if word == "true" => Ok(Expr::Const(true)),
            [word] if word == "false" => Ok(Expr::Const(false)),
            [name] if is_identifier(name) => Ok(Expr::Var(name.clone())),
            [name, op, literal] if is_identifier(name) => {
                let op = CompareOp::parse(op)
                    .ok_or_else(|| HostError::Compile(format!("unknown operator `{op}`")))?;
                Ok(Expr::Compare {
                    name: name.clone(),
                    op,
                    literal: parse_literal(literal),
                })
            }
            _ => Err(HostError::Compile(format!("cannot parse condition `{text}`"))),
        }
    }
}

struct CompiledCondition {
    expr: Expr,
    current: CurrentEvent,
}

impl CompiledCondition {
    fn lookup(&self, name: &str) -> Option<TraceValue> {
        self.current.borrow().as_ref()?.vars.get(name).cloned()
    }
}

fn to_value(value: TraceValue) -> Value {
    match value {
        TraceValue::Bool(b) => Value::Bool(b),
        TraceValue::Int(n) => Value::Int(n),
        TraceValue::Str(s) => Value::Str(s),
    }
}

fn compare(
    name: &str,
    value: &TraceValue,
    op: CompareOp,
    literal: &TraceValue,
) -> Result<bool, HostError> {
    let ordering = match (value, literal) {
        (TraceValue::Int(a), TraceValue::Int(b)) => a.cmp(b),
        (TraceValue::Str(a), TraceValue::Str(b)) => a.cmp(b),
        (TraceValue::Bool(a), TraceValue::Bool(b))
            if matches!(op, CompareOp::Eq | CompareOp::Ne) =>
        {
            a.cmp(b)
        }
        _ => {
            return match op {
                CompareOp::Eq => Ok(false),
                CompareOp::Ne => Ok(true),
                _ => Err(HostError::Runtime(format!(
                    "attempt to compare `{name}` with an incompatible value"
                ))),
            };
        }
    };
    Ok(op.holds(ordering))
}

impl Callable for CompiledCondition {
    fn invoke(&self, _args: &[Value]) -> Result<Vec<Value>, HostError> {
        let result = match &self.expr {
            Expr::Const(b) => Value::Bool(*b),
            Expr::Var(name) => self.lookup(name).map_or(Value::Nil, to_value),
            Expr::Compare { name, op, literal } => {
                let value = self.lookup(name).ok_or_else(|| {
                    HostError::Runtime(format!("attempt to compare nil variable `{name}`"))
                })?;
                Value::Bool(compare(name, &value, *op, literal)?)
            }
        };
        Ok(vec![result])
    }
}
