mod breakpoints;
mod context;
mod notifier;
mod stepping;

pub use breakpoints::{file_name_of, BreakpointId, BreakpointKind, BreakpointRecord, BreakpointTable};
pub use context::DebugContext;
pub use notifier::SuspendNotifier;
pub use stepping::{StepController, StepRequest, SuspendAnchor};

/// A host notification that execution is about to run `current_line`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineEvent {
    pub current_line: i64,
    /// Line where the running function was defined.
    pub line_defined: i64,
    pub source: String,
}

impl LineEvent {
    pub fn new(current_line: i64, line_defined: i64, source: impl Into<String>) -> Self {
        Self {
            current_line,
            line_defined,
            source: source.into(),
        }
    }
}

/// Why execution was suspended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuspendReason {
    Step,
    /// Step over or step out.
    Next,
    Breakpoint,
}

impl SuspendReason {
    pub fn as_str(self) -> &'static str {
        match self {
            SuspendReason::Step => "step",
            SuspendReason::Next => "next",
            SuspendReason::Breakpoint => "breakpoint",
        }
    }
}
