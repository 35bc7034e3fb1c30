//! Outbound application events.
//!
//! The [`TouchDispatcher`](super::dispatcher::TouchDispatcher) emits these
//! through the [`EventSink`](super::ports::EventSink) port.  Adapters on the
//! other side decide what to do with them.

use crate::error::{ActuatorError, MalformedEvent};
use crate::touch::TouchedSet;

use super::dispatcher::DispatcherState;
use super::rules::Action;

/// Structured events emitted by the dispatcher.
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// The dispatcher moved between states.
    StateChanged {
        from: DispatcherState,
        to: DispatcherState,
    },

    /// A touch snapshot arrived and was classified.
    Touched(TouchedSet),

    /// A rule matched and its action is about to run.
    ActionStarted(Action),

    /// The action finished without error.
    ActionCompleted(Action),

    /// The action failed part-way; no rollback is attempted.
    ActionFailed { action: Action, error: ActuatorError },

    /// No rule matched the touched set.
    Ignored(TouchedSet),

    /// The payload did not have the snapshot shape.
    Malformed(MalformedEvent),

    /// Subscription change failed (re-arm will be retried).
    SubscriptionFailed(ActuatorError),
}
