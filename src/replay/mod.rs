//! Drives the engine from a recorded trace instead of a live interpreter.

mod commands;
mod host;
mod runner;
mod trace;

pub use commands::{parse_command, Command};
pub use host::TraceHost;
pub use runner::{
    run_trace, CommandSource, InteractiveCommands, ReplayReport, ScriptedCommands, Stop,
};
pub use trace::{BreakpointSpec, Trace, TraceEvent, TraceValue};
