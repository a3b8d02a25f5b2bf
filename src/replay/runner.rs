use super::commands::{parse_command, Command};
use super::host::TraceHost;
use super::trace::Trace;
use crate::config::DebuggerConfig;
use crate::debugger::DebugContext;
use crate::error::DebuggerError;
use crate::host::{Callable, DebuggerModule, Host, HostError, Value};
use serde::Serialize;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::io::{self, Write};
use std::rc::{Rc, Weak};
use tracing::{debug, info, warn};

/// Where prompt commands come from when execution suspends.
pub trait CommandSource {
    /// Next command line, or `None` to resume with `continue`.
    fn next_command(&mut self, stop: &Stop) -> Option<String>;

    /// Show prompt output to whoever is issuing commands.
    fn show(&mut self, text: &str);
}

/// Commands taken from a fixed queue; an exhausted queue continues.
pub struct ScriptedCommands {
    queue: VecDeque<String>,
}

impl ScriptedCommands {
    pub fn new<I, S>(commands: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            queue: commands.into_iter().map(Into::into).collect(),
        }
    }
}

impl CommandSource for ScriptedCommands {
    fn next_command(&mut self, _stop: &Stop) -> Option<String> {
        self.queue.pop_front()
    }

    fn show(&mut self, text: &str) {
        debug!("{text}");
    }
}

/// Commands read from stdin, prompt written to stderr.
pub struct InteractiveCommands;

impl CommandSource for InteractiveCommands {
    fn next_command(&mut self, stop: &Stop) -> Option<String> {
        eprintln!("\nStopped ({}) at {}:{}", stop.reason, stop.source, stop.line);
        eprintln!(
            "Commands: (c)ontinue, (s)tep [n], (n)ext [n], (f)inish, (b)reak <line> <file> [cond], (tb)reak, (d)elete <line> <file>, (w)here, (q)uit"
        );
        eprint!("> ");
        io::stderr().flush().ok()?;

        let mut input = String::new();
        match io::stdin().read_line(&mut input) {
            Ok(0) | Err(_) => None,
            Ok(_) => Some(input),
        }
    }

    fn show(&mut self, text: &str) {
        eprintln!("{text}");
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Stop {
    /// Index of the trace event that suspended.
    pub event: usize,
    pub source: String,
    pub line: i64,
    pub reason: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ReplayReport {
    pub stops: Vec<Stop>,
    pub events_delivered: usize,
    pub quit: bool,
}

#[derive(Default)]
struct ReplayState {
    event: usize,
    report: ReplayReport,
}

/// Suspend callback that answers each stop from a [`CommandSource`].
struct SuspendPrompt {
    context: Weak<DebugContext>,
    host: Rc<TraceHost>,
    commands: RefCell<Box<dyn CommandSource>>,
    state: Rc<RefCell<ReplayState>>,
}

impl SuspendPrompt {
    fn execute(&self, context: &DebugContext, command: Command) {
        let mut commands = self.commands.borrow_mut();
        match command {
            Command::Continue => {}
            Command::Step(count) => {
                context.step(count);
            }
            Command::Next(count) => match self.host.frame(0) {
                Some(frame) => {
                    context.next(count, frame.line_defined, &frame.source);
                }
                None => commands.show("no frame to step over"),
            },
            Command::Finish => match self.host.frame(0) {
                Some(frame) => {
                    context.finish(frame.line_defined, &frame.source);
                }
                None => commands.show("no frame to finish"),
            },
            Command::Break {
                line,
                source,
                condition,
                one_shot,
            } => {
                let ok = context.set_breakpoint(
                    self.host.as_ref(),
                    line,
                    &source,
                    condition.as_deref(),
                    one_shot,
                );
                commands.show(&format!(
                    "breakpoint {source}:{line} {}",
                    if ok { "set" } else { "rejected" }
                ));
            }
            Command::Delete { line, source } => {
                let ok = context.clear_breakpoint(line, &source);
                commands.show(&format!(
                    "breakpoint {source}:{line} {}",
                    if ok { "deleted" } else { "not found" }
                ));
            }
            Command::Where => {
                let stack = self.host.stack();
                let mut text = format!("=== Call Stack ({} frames) ===", stack.len());
                for (level, frame) in stack.iter().enumerate() {
                    text.push_str(&format!(
                        "\n  #{level}: {} (defined at line {})",
                        frame.source, frame.line_defined
                    ));
                }
                commands.show(&text);
            }
            Command::Quit => {
                self.state.borrow_mut().report.quit = true;
            }
        }
    }
}

impl Callable for SuspendPrompt {
    fn invoke(&self, args: &[Value]) -> Result<Vec<Value>, HostError> {
        let context = self
            .context
            .upgrade()
            .ok_or_else(|| HostError::Runtime("debugger context dropped".to_string()))?;

        let stop = match args {
            [Value::Str(source), Value::Int(line), Value::Str(reason), ..] => Stop {
                event: self.state.borrow().event,
                source: source.clone(),
                line: *line,
                reason: reason.clone(),
            },
            _ => {
                return Err(HostError::Runtime(format!(
                    "unexpected suspend arguments: {args:?}"
                )))
            }
        };
        info!(source = %stop.source, line = stop.line, reason = %stop.reason, "stopped");
        self.state.borrow_mut().report.stops.push(stop.clone());

        loop {
            let input = self.commands.borrow_mut().next_command(&stop);
            let command = match input {
                Some(text) => match parse_command(&text) {
                    Ok(command) => command,
                    Err(e) => {
                        self.commands.borrow_mut().show(&e);
                        continue;
                    }
                },
                None => Command::Continue,
            };
            let resumes = command.resumes();
            self.execute(&context, command);
            if resumes {
                return Ok(Vec::new());
            }
        }
    }
}

/// Play `trace` through a fresh debugger, answering stops from `commands`.
pub fn run_trace(
    config: DebuggerConfig,
    trace: &Trace,
    commands: Box<dyn CommandSource>,
) -> Result<ReplayReport, DebuggerError> {
    let module = DebuggerModule::open(config)?;
    let host = Rc::new(TraceHost::new());
    let state = Rc::new(RefCell::new(ReplayState::default()));

    let prompt: Rc<dyn Callable> = Rc::new(SuspendPrompt {
        context: Rc::downgrade(module.context()),
        host: Rc::clone(&host),
        commands: RefCell::new(commands),
        state: Rc::clone(&state),
    });
    module.call(host.as_ref(), "RegisterBreakCallback", &[Value::Function(prompt)])?;

    for bp in &trace.breakpoints {
        let mut args = vec![Value::Int(bp.line), Value::Str(bp.source.clone())];
        args.push(bp.condition.clone().map_or(Value::Nil, Value::Str));
        args.push(Value::Bool(bp.one_shot));
        if module.call(host.as_ref(), "SetBreakpoint", &args)? != Value::Bool(true) {
            warn!(line = bp.line, source = %bp.source, "could not set breakpoint");
        }
    }

    module.call(host.as_ref(), "Start", &[])?;
    for (index, event) in trace.events.iter().enumerate() {
        if state.borrow().report.quit {
            break;
        }
        if !host.is_hooked() {
            continue;
        }
        state.borrow_mut().event = index;
        host.enter(event);
        module.context().on_line(host.as_ref(), &event.line_event());
        host.leave();
        state.borrow_mut().report.events_delivered += 1;
    }
    module.call(host.as_ref(), "Stop", &[])?;

    let report = std::mem::take(&mut state.borrow_mut().report);
    debug!(stops = report.stops.len(), "replay finished");
    Ok(report)
}

