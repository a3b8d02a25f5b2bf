#![allow(dead_code)]

use line_debugger::{
    Callable, DebugContext, DebuggerConfig, FrameInfo, Host, HostError, LineEvent, Value,
};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

/// In-memory interpreter stand-in: a call stack plus variables for conditions.
#[derive(Default)]
pub struct MockHost {
    stack: RefCell<Vec<FrameInfo>>,
    hooked: Cell<bool>,
    pub vars: Rc<RefCell<HashMap<String, Value>>>,
    pub refuse_hook: Cell<bool>,
}

impl MockHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the call stack, innermost frame first.
    pub fn enter(&self, frames: &[(i64, &str)]) {
        *self.stack.borrow_mut() = frames
            .iter()
            .map(|(line_defined, source)| FrameInfo::new(*line_defined, *source))
            .collect();
    }

    pub fn event(&self, line: i64) -> LineEvent {
        let stack = self.stack.borrow();
        let top = stack.first().expect("no frames entered");
        LineEvent::new(line, top.line_defined, top.source.clone())
    }

    pub fn set_var(&self, name: &str, value: Value) {
        self.vars.borrow_mut().insert(name.to_string(), value);
    }
}

impl Host for MockHost {
    fn frame(&self, level: usize) -> Option<FrameInfo> {
        self.stack.borrow().get(level).cloned()
    }

    fn compile_condition(&self, condition: &str) -> Result<Rc<dyn Callable>, HostError> {
        let result: Result<Vec<Value>, HostError> = match condition {
            "true" => Ok(vec![Value::Bool(true)]),
            "false" => Ok(vec![Value::Bool(false)]),
            "nothing" => Ok(vec![]),
            "number" => Ok(vec![Value::Int(1)]),
            "true, false" => Ok(vec![Value::Bool(true), Value::Bool(false)]),
            "error" => Err(HostError::Runtime("boom".to_string())),
            text if text.starts_with("var ") => {
                let name = text[4..].to_string();
                let vars = Rc::clone(&self.vars);
                return Ok(Rc::new(move |_: &[Value]| -> Result<Vec<Value>, HostError> {
                    Ok(vec![vars.borrow().get(&name).cloned().unwrap_or(Value::Nil)])
                }));
            }
            other => return Err(HostError::Compile(format!("unexpected symbol near '{other}'"))),
        };
        Ok(Rc::new(move |_: &[Value]| result.clone()))
    }

    fn set_line_hook(&self, enabled: bool) -> bool {
        if self.refuse_hook.get() {
            return false;
        }
        self.hooked.set(enabled);
        true
    }
}

/// Stops seen by a recording callback: (source, line, reason).
pub type Stops = Rc<RefCell<Vec<(String, i64, String)>>>;

pub fn recording_callback() -> (Rc<dyn Callable>, Stops) {
    let stops: Stops = Rc::default();
    let sink = Rc::clone(&stops);
    let callback: Rc<dyn Callable> = Rc::new(move |args: &[Value]| -> Result<Vec<Value>, HostError> {
        match args {
            [Value::Str(source), Value::Int(line), Value::Str(reason)] => {
                sink.borrow_mut().push((source.clone(), *line, reason.clone()));
                Ok(vec![])
            }
            _ => Err(HostError::Runtime(format!("bad args {args:?}"))),
        }
    });
    (callback, stops)
}

/// A started context with a recording callback.
pub fn started(config: DebuggerConfig, host: &MockHost) -> (DebugContext, Stops) {
    let ctx = DebugContext::new(config).expect("Failed to create debug context");
    let (callback, stops) = recording_callback();
    ctx.register_suspend_callback(callback);
    assert!(ctx.start(host));
    (ctx, stops)
}

/// Deliver a line event for the current stack.
pub fn hit(ctx: &DebugContext, host: &MockHost, line: i64) -> bool {
    ctx.on_line(host, &host.event(line))
}
