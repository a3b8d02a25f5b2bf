use crate::debugger::LineEvent;
use crate::error::DebuggerError;
use crate::host::FrameInfo;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// A recorded run of a script: what to break on, which lines executed and
/// how to answer each suspension.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Trace {
    pub breakpoints: Vec<BreakpointSpec>,
    pub events: Vec<TraceEvent>,
    /// Debugger commands consumed one suspension at a time.
    pub commands: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BreakpointSpec {
    pub line: i64,
    pub source: String,
    #[serde(default)]
    pub condition: Option<String>,
    #[serde(default)]
    pub one_shot: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceEvent {
    pub line: i64,
    /// Call stack, innermost frame first.
    pub stack: Vec<FrameInfo>,
    #[serde(default)]
    pub vars: BTreeMap<String, TraceValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TraceValue {
    Bool(bool),
    Int(i64),
    Str(String),
}

impl TraceEvent {
    pub fn line_event(&self) -> LineEvent {
        match self.stack.first() {
            Some(frame) => LineEvent::new(self.line, frame.line_defined, frame.source.clone()),
            None => LineEvent::new(self.line, 0, "=?"),
        }
    }
}

impl Trace {
    pub fn load(path: &Path) -> Result<Self, DebuggerError> {
        let contents = fs::read_to_string(path).map_err(|source| DebuggerError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&contents).map_err(|source| DebuggerError::Json {
            path: path.to_path_buf(),
            source,
        })
    }
}
