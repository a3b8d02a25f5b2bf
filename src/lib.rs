//! In-process line-level debugging engine for embedded script interpreters.
//!
//! The host interpreter reports every executed line to a [`DebugContext`],
//! which decides whether execution should suspend because of a breakpoint or
//! a pending step/next/finish request, and calls back into the host when it
//! does.

pub mod config;
pub mod debugger;
pub mod error;
pub mod host;
pub mod replay;

pub use config::{DebuggerConfig, OneShotPolicy};
pub use debugger::{DebugContext, LineEvent, StepRequest, SuspendReason};
pub use error::DebuggerError;
pub use host::{Callable, FrameInfo, Host, HostError, Value};
