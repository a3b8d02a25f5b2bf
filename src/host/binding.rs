use super::{Host, Value};
use crate::config::DebuggerConfig;
use crate::debugger::DebugContext;
use crate::error::DebuggerError;
use std::rc::Rc;
use tracing::{debug, warn};

/// Function names exposed to scripts, in registration order.
pub const FUNCTIONS: &[&str] = &[
    "Start",
    "Stop",
    "RegisterBreakCallback",
    "SetBreakpoint",
    "ClearBreakpoint",
    "Finish",
    "Next",
    "Step",
];

/// The script-facing surface of a [`DebugContext`].
///
/// Arguments arrive as loosely typed host values; a call whose arguments do
/// not have the expected shape answers `false` instead of raising.
pub struct DebuggerModule {
    context: Rc<DebugContext>,
}

impl DebuggerModule {
    /// Create the engine for one interpreter instance. Fails when the engine
    /// cannot initialize, in which case no hook may be installed.
    pub fn open(config: DebuggerConfig) -> Result<Self, DebuggerError> {
        let context = DebugContext::new(config)?;
        debug!("debugger module opened");
        Ok(Self {
            context: Rc::new(context),
        })
    }

    pub fn context(&self) -> &Rc<DebugContext> {
        &self.context
    }

    pub fn call(&self, host: &dyn Host, name: &str, args: &[Value]) -> Result<Value, DebuggerError> {
        let ok = match name {
            "Start" => self.context.start(host),
            "Stop" => self.context.stop(host),
            "RegisterBreakCallback" => self.register_break_callback(args),
            "SetBreakpoint" => self.set_breakpoint(host, args),
            "ClearBreakpoint" => self.clear_breakpoint(args),
            "Finish" => self.finish(args),
            "Next" => self.next(args),
            "Step" => self.step(args),
            _ => return Err(DebuggerError::UnknownFunction(name.to_string())),
        };
        Ok(Value::Bool(ok))
    }

    fn register_break_callback(&self, args: &[Value]) -> bool {
        match args.last() {
            Some(Value::Function(callback)) => {
                self.context.register_suspend_callback(Rc::clone(callback))
            }
            other => {
                let got = other.map_or("nothing", Value::type_name);
                warn!(got, "break callback must be a function");
                false
            }
        }
    }

    fn set_breakpoint(&self, host: &dyn Host, args: &[Value]) -> bool {
        let (Some(line), Some(source)) = (arg_int(args, 0), arg_str(args, 1)) else {
            return false;
        };
        let condition = arg_str(args, 2);
        let one_shot = args.get(3).and_then(Value::as_bool).unwrap_or(false);
        self.context
            .set_breakpoint(host, line, source, condition, one_shot)
    }

    fn clear_breakpoint(&self, args: &[Value]) -> bool {
        match (arg_int(args, 0), arg_str(args, 1)) {
            (Some(line), Some(source)) => self.context.clear_breakpoint(line, source),
            _ => false,
        }
    }

    fn step(&self, args: &[Value]) -> bool {
        self.context.step(arg_int(args, 0).unwrap_or(1))
    }

    fn next(&self, args: &[Value]) -> bool {
        match (arg_int(args, 0), arg_int(args, 1), arg_str(args, 2)) {
            (Some(count), Some(line_defined), Some(source)) => {
                self.context.next(count, line_defined, source)
            }
            _ => false,
        }
    }

    fn finish(&self, args: &[Value]) -> bool {
        match (arg_int(args, 0), arg_str(args, 1)) {
            (Some(line_defined), Some(source)) => self.context.finish(line_defined, source),
            _ => false,
        }
    }
}

fn arg_int(args: &[Value], index: usize) -> Option<i64> {
    args.get(index).and_then(Value::as_int)
}

fn arg_str(args: &[Value], index: usize) -> Option<&str> {
    args.get(index).and_then(Value::as_str)
}
