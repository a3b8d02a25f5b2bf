use super::{LineEvent, SuspendReason};
use crate::host::{Callable, Value};
use std::rc::Rc;
use tracing::{debug, error};

/// Single-slot holder for the suspend callback.
#[derive(Default)]
pub struct SuspendNotifier {
    callback: Option<Rc<dyn Callable>>,
}

impl SuspendNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the registered callback, releasing the previous one.
    pub fn register(&mut self, callback: Rc<dyn Callable>) {
        if self.callback.replace(callback).is_some() {
            debug!("replaced suspend callback");
        }
    }

    pub fn is_registered(&self) -> bool {
        self.callback.is_some()
    }

    pub fn callback(&self) -> Option<Rc<dyn Callable>> {
        self.callback.clone()
    }
}

/// Call `callback` for a suspension at `event`. Failures are logged, never
/// propagated.
pub fn notify(callback: Option<&dyn Callable>, event: &LineEvent, reason: SuspendReason) {
    debug!(
        source = %event.source,
        line = event.current_line,
        reason = reason.as_str(),
        "suspending"
    );
    let Some(callback) = callback else {
        return;
    };

    let args = [
        Value::Str(event.source.clone()),
        Value::Int(event.current_line),
        Value::Str(reason.as_str().to_string()),
    ];
    if let Err(e) = callback.invoke(&args) {
        error!(
            source = %event.source,
            line = event.current_line,
            "suspend callback failed: {e}"
        );
    }
}
