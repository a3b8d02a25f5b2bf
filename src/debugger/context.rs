use super::breakpoints::{file_name_of, BreakpointKind, BreakpointTable};
use super::notifier::{self, SuspendNotifier};
use super::stepping::{StepController, StepRequest, SuspendAnchor};
use super::{LineEvent, SuspendReason};
use crate::config::{DebuggerConfig, OneShotPolicy};
use crate::error::DebuggerError;
use crate::host::{Callable, Host, Value};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use tracing::{debug, warn};

/// Per-session debugger state: breakpoints, the pending step request and the
/// suspend callback.
///
/// Every method takes `&self` and no internal borrow is held while a
/// condition or the suspend callback runs, so both may call back into the
/// context, including a nested [`DebugContext::on_line`].
pub struct DebugContext {
    config: DebuggerConfig,
    running: Cell<bool>,
    breakpoints: RefCell<BreakpointTable>,
    stepping: RefCell<StepController>,
    notifier: RefCell<SuspendNotifier>,
}

impl DebugContext {
    pub fn new(config: DebuggerConfig) -> Result<Self, DebuggerError> {
        let breakpoints = BreakpointTable::with_capacity(config.breakpoint_capacity)?;
        Ok(Self {
            config,
            running: Cell::new(false),
            breakpoints: RefCell::new(breakpoints),
            stepping: RefCell::new(StepController::new()),
            notifier: RefCell::new(SuspendNotifier::new()),
        })
    }

    /// Ask the host to start delivering line events.
    pub fn start(&self, host: &dyn Host) -> bool {
        let ok = host.set_line_hook(true);
        if ok {
            self.running.set(true);
        }
        debug!(ok, "start");
        ok
    }

    pub fn stop(&self, host: &dyn Host) -> bool {
        let ok = host.set_line_hook(false);
        if ok {
            self.running.set(false);
        }
        debug!(ok, "stop");
        ok
    }

    pub fn is_running(&self) -> bool {
        self.running.get()
    }

    pub fn register_suspend_callback(&self, callback: Rc<dyn Callable>) -> bool {
        self.notifier.borrow_mut().register(callback);
        true
    }

    pub fn has_suspend_callback(&self) -> bool {
        self.notifier.borrow().is_registered()
    }

    pub fn set_breakpoint(
        &self,
        host: &dyn Host,
        line: i64,
        source: &str,
        condition: Option<&str>,
        one_shot: bool,
    ) -> bool {
        match self.try_set_breakpoint(host, line, source, condition, one_shot) {
            Ok(()) => true,
            Err(e) => {
                warn!(line, source, "breakpoint rejected: {e}");
                false
            }
        }
    }

    fn try_set_breakpoint(
        &self,
        host: &dyn Host,
        line: i64,
        source: &str,
        condition: Option<&str>,
        one_shot: bool,
    ) -> Result<(), DebuggerError> {
        let file_name = file_name_of(source);
        if self.breakpoints.borrow().contains(line, file_name) {
            debug!(line, file_name, "breakpoint already set");
            return Ok(());
        }

        let predicate = match condition {
            Some(text) => Some(host.compile_condition(text).map_err(|source| {
                DebuggerError::Condition {
                    condition: text.to_string(),
                    source,
                }
            })?),
            None => None,
        };

        let id = self
            .breakpoints
            .borrow_mut()
            .insert(line, file_name, predicate, one_shot)?;
        debug!(line, file_name, ?id, conditional = condition.is_some(), one_shot, "breakpoint set");
        Ok(())
    }

    pub fn clear_breakpoint(&self, line: i64, source: &str) -> bool {
        let file_name = file_name_of(source);
        let removed = self.breakpoints.borrow_mut().remove(line, file_name);
        match removed {
            Some(record) => {
                debug!(line, file_name, id = ?record.id, "breakpoint cleared");
                true
            }
            None => false,
        }
    }

    pub fn clear_all_breakpoints(&self) {
        self.breakpoints.borrow_mut().clear();
    }

    pub fn has_breakpoint(&self, line: i64, source: &str) -> bool {
        self.breakpoints.borrow().contains(line, file_name_of(source))
    }

    pub fn breakpoint_kind(&self, line: i64, source: &str) -> Option<BreakpointKind> {
        self.breakpoints
            .borrow()
            .lookup(line, file_name_of(source))
            .map(|record| record.kind)
    }

    pub fn breakpoint_count(&self) -> usize {
        self.breakpoints.borrow().len()
    }

    /// `(line, file name)` of every breakpoint, sorted.
    pub fn breakpoints(&self) -> Vec<(i64, String)> {
        let mut points: Vec<_> = self
            .breakpoints
            .borrow()
            .iter()
            .map(|record| (record.line, record.file_name.clone()))
            .collect();
        points.sort();
        points
    }

    pub fn step(&self, count: i64) -> bool {
        self.stepping.borrow_mut().set_request(StepRequest::step(count));
        true
    }

    /// Step over: suspend once execution is back at the level of the frame
    /// defined at `anchor_line_defined` in `anchor_source`.
    pub fn next(&self, count: i64, anchor_line_defined: i64, anchor_source: &str) -> bool {
        self.stepping.borrow_mut().set_request(StepRequest::next_or_finish(
            count,
            anchor_line_defined,
            anchor_source,
            1,
        ));
        true
    }

    /// Step out of the frame defined at `anchor_line_defined` in `anchor_source`.
    pub fn finish(&self, anchor_line_defined: i64, anchor_source: &str) -> bool {
        self.stepping.borrow_mut().set_request(StepRequest::next_or_finish(
            1,
            anchor_line_defined,
            anchor_source,
            0,
        ));
        true
    }

    pub fn step_request(&self) -> StepRequest {
        self.stepping.borrow().request().clone()
    }

    pub fn last_suspend(&self) -> Option<SuspendAnchor> {
        self.stepping.borrow().last_suspend().cloned()
    }

    /// Handle one line event from the host. Returns whether execution was
    /// suspended.
    pub fn on_line(&self, host: &dyn Host, event: &LineEvent) -> bool {
        if !self.running.get() || event.current_line <= 0 {
            return false;
        }

        let step_reason = self.stepping.borrow_mut().on_line(event, host);
        if let Some(reason) = step_reason {
            self.suspend(event, reason);
            return true;
        }

        let file_name = file_name_of(&event.source);
        let (id, kind, condition) = {
            let table = self.breakpoints.borrow();
            match table.lookup(event.current_line, file_name) {
                Some(record) => (record.id, record.kind, record.condition.clone()),
                None => return false,
            }
        };

        let hit = match &condition {
            Some(predicate) => evaluate_condition(predicate.as_ref()),
            None => true,
        };

        if kind.contains(BreakpointKind::ONE_SHOT) {
            let consume = match self.config.one_shot {
                OneShotPolicy::ConsumeOnMatch => true,
                OneShotPolicy::ConsumeOnSuspend => hit,
            };
            if consume {
                let removed =
                    self.breakpoints
                        .borrow_mut()
                        .remove_if(event.current_line, file_name, id);
                if removed {
                    debug!(line = event.current_line, file_name, ?id, "one-shot breakpoint consumed");
                }
            }
        }

        if hit {
            self.suspend(event, SuspendReason::Breakpoint);
        }
        hit
    }

    fn suspend(&self, event: &LineEvent, reason: SuspendReason) {
        self.stepping.borrow_mut().suspended_at(event);
        let callback = self.notifier.borrow().callback();
        notifier::notify(callback.as_deref(), event, reason);
    }
}

/// Only a first result of exactly `true` counts; errors count as false.
fn evaluate_condition(predicate: &dyn Callable) -> bool {
    match predicate.invoke(&[]) {
        Ok(values) => matches!(values.first(), Some(Value::Bool(true))),
        Err(e) => {
            debug!("breakpoint condition failed: {e}");
            false
        }
    }
}
