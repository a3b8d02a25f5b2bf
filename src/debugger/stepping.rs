use super::{LineEvent, SuspendReason};
use crate::host::Host;
use tracing::debug;

/// Pending step/next/finish request.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum StepRequest {
    #[default]
    Inactive,
    /// Suspend after `remaining` distinct-line events.
    Stepping { remaining: u32 },
    /// Step over (`start_frame == 1`) or step out (`start_frame == 0`) of the
    /// activation identified by `anchor_line_defined` and `anchor_source`.
    NextOrFinish {
        remaining: u32,
        anchor_line_defined: i64,
        anchor_source: String,
        start_frame: usize,
    },
}

impl StepRequest {
    pub fn step(count: i64) -> Self {
        match clamp_count(count) {
            Some(remaining) => StepRequest::Stepping { remaining },
            None => StepRequest::Inactive,
        }
    }

    pub fn next_or_finish(
        count: i64,
        anchor_line_defined: i64,
        anchor_source: &str,
        start_frame: usize,
    ) -> Self {
        match clamp_count(count) {
            Some(remaining) => StepRequest::NextOrFinish {
                remaining,
                anchor_line_defined,
                anchor_source: anchor_source.to_string(),
                start_frame,
            },
            None => StepRequest::Inactive,
        }
    }

    pub fn is_active(&self) -> bool {
        !matches!(self, StepRequest::Inactive)
    }
}

/// Positive counts saturate at `u32::MAX`; anything else means no request.
fn clamp_count(count: i64) -> Option<u32> {
    (count > 0).then(|| u32::try_from(count).unwrap_or(u32::MAX))
}

/// Location of the last suspension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuspendAnchor {
    pub source: String,
    pub line: i64,
}

impl SuspendAnchor {
    fn matches(&self, event: &LineEvent) -> bool {
        self.line == event.current_line && self.source == event.source
    }
}

#[derive(Debug, Default)]
pub struct StepController {
    request: StepRequest,
    last_suspend: Option<SuspendAnchor>,
}

impl StepController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request(&self) -> &StepRequest {
        &self.request
    }

    pub fn set_request(&mut self, request: StepRequest) {
        debug!(?request, "step request");
        self.request = request;
    }

    pub fn last_suspend(&self) -> Option<&SuspendAnchor> {
        self.last_suspend.as_ref()
    }

    /// Record a suspension at `event` and drop any pending request.
    pub fn suspended_at(&mut self, event: &LineEvent) {
        self.request = StepRequest::Inactive;
        self.last_suspend = Some(SuspendAnchor {
            source: event.source.clone(),
            line: event.current_line,
        });
    }

    /// Advance the pending request by one line event. Returns the reason to
    /// suspend when the request is satisfied.
    pub fn on_line(&mut self, event: &LineEvent, host: &dyn Host) -> Option<SuspendReason> {
        if !self.request.is_active() {
            return None;
        }
        if self.last_suspend.as_ref().is_some_and(|a| a.matches(event)) {
            return None;
        }

        match &mut self.request {
            StepRequest::Inactive => None,
            StepRequest::Stepping { remaining } => {
                *remaining -= 1;
                if *remaining == 0 {
                    self.request = StepRequest::Inactive;
                    return Some(SuspendReason::Step);
                }
                None
            }
            StepRequest::NextOrFinish {
                remaining,
                anchor_line_defined,
                anchor_source,
                start_frame,
            } => {
                let mut examined = false;
                let mut matched_anchor = false;
                let mut level = *start_frame;
                while let Some(frame) = host.frame(level) {
                    examined = true;
                    if frame.line_defined == *anchor_line_defined
                        && frame.source == *anchor_source
                    {
                        matched_anchor = true;
                        break;
                    }
                    level += 1;
                }

                if !examined {
                    debug!(
                        start_frame = *start_frame,
                        "anchor frame already returned, cancelling request"
                    );
                    self.request = StepRequest::Inactive;
                    return None;
                }
                if matched_anchor {
                    return None;
                }

                *remaining -= 1;
                *anchor_line_defined = event.line_defined;
                anchor_source.clone_from(&event.source);
                if *remaining == 0 {
                    self.request = StepRequest::Inactive;
                    return Some(SuspendReason::Next);
                }
                None
            }
        }
    }
}
