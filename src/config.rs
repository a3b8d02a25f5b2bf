use crate::error::DebuggerError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// When a one-shot breakpoint is removed from the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OneShotPolicy {
    /// Removed on the first matching line event, even if its condition is false.
    #[default]
    ConsumeOnMatch,
    /// Removed only when it actually suspends execution.
    ConsumeOnSuspend,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DebuggerConfig {
    pub one_shot: OneShotPolicy,
    /// Number of distinct breakpoint lines reserved up front.
    pub breakpoint_capacity: usize,
}

impl Default for DebuggerConfig {
    fn default() -> Self {
        Self {
            one_shot: OneShotPolicy::default(),
            breakpoint_capacity: 16,
        }
    }
}

impl DebuggerConfig {
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let config: DebuggerConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, DebuggerConfig::default());

        let config: DebuggerConfig =
            serde_json::from_str(r#"{"one_shot": "consume-on-suspend"}"#).unwrap();
        assert_eq!(config.one_shot, OneShotPolicy::ConsumeOnSuspend);
        assert_eq!(config.breakpoint_capacity, 16);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        assert!(serde_json::from_str::<DebuggerConfig>(r#"{"oneshot": 1}"#).is_err());
    }
}
