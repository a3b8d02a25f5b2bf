use crate::host::HostError;
use std::collections::TryReserveError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DebuggerError {
    #[error("failed to initialize breakpoint table")]
    Init(#[source] TryReserveError),

    #[error("failed to allocate breakpoint storage for line {line}")]
    Allocation {
        line: i64,
        #[source]
        source: TryReserveError,
    },

    #[error("invalid breakpoint condition `{condition}`")]
    Condition {
        condition: String,
        #[source]
        source: HostError,
    },

    #[error("unknown debugger function `{0}`")]
    UnknownFunction(String),

    #[error("failed to read {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse {}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
