//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured dispatcher events through
//! the `log` facade.

use log::{debug, error, info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`].
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LogEventSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::StateChanged { from, to } => {
                debug!("STATE | {:?} -> {:?}", from, to);
            }
            AppEvent::Touched(set) => {
                debug!("TOUCH | active={:?}", set);
            }
            AppEvent::ActionStarted(action) => {
                info!("ACTION | {} started", action);
            }
            AppEvent::ActionCompleted(action) => {
                info!("ACTION | {} done", action);
            }
            AppEvent::ActionFailed { action, error } => {
                error!("ACTION | {} failed: {}", action, error);
            }
            AppEvent::Ignored(set) => {
                debug!("IGNORED | no rule for {:?}", set);
            }
            AppEvent::Malformed(e) => {
                warn!("IGNORED | malformed payload: {}", e);
            }
            AppEvent::SubscriptionFailed(e) => {
                warn!("SUBSCRIPTION | {}", e);
            }
        }
    }
}
