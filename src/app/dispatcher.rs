//! Touch event dispatcher: the hexagonal core.
//!
//! ```text
//!  EventSource ──▶ ┌──────────────────────────┐ ──▶ EventSink
//!                  │     TouchDispatcher      │
//! ActionExecutor ◀─│  RuleTable · Armed flag  │
//!                  └──────────────────────────┘
//! ```
//!
//! ## State machine
//!
//! ```text
//!            arm()                 event
//! Disarmed ─────────▶ Listening ─────────▶ Busy
//!    ▲  ▲               ▲                   │
//!    │  │               └──── resubscribe ok┤
//!    │  └──────────────────── resubscribe err┘
//!    │
//!    └── ensure_armed() retries the subscription on the next poll tick
//!
//! shutdown(): any state ──▶ Stopped
//! ```
//!
//! Every handled event produces exactly one unsubscribe/subscribe pair on
//! the [`EventSource`], whatever the action's outcome.  The unsubscribe
//! keeps the robot from delivering a second event while the action runs;
//! events that slip through anyway are dropped, not queued.

use log::{debug, error, info, warn};
use serde_json::Value;

use crate::error::{ActuatorError, MalformedEvent};
use crate::touch::TouchEvent;

use super::actions::ActionExecutor;
use super::events::AppEvent;
use super::ports::{EventSink, EventSource};
use super::rules::{Action, RuleTable};

/// Dispatcher lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DispatcherState {
    /// Not subscribed: before [`TouchDispatcher::arm`] or after a failed
    /// re-subscribe.
    Disarmed,
    /// Subscribed and waiting for touches (Armed).
    Listening,
    /// An event is being handled; subscription is off.
    Busy,
    /// Torn down by [`TouchDispatcher::shutdown`].
    Stopped,
}

/// What a single `handle` call did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// A rule matched and the action completed.
    Performed(Action),
    /// A rule matched but the action failed.
    Failed(Action, ActuatorError),
    /// No rule matched.
    Ignored,
    /// The payload was not a snapshot.
    Malformed(MalformedEvent),
    /// The event arrived while not armed and was discarded.
    Dropped,
}

/// Running counters, reported at shutdown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatcherStats {
    pub events: u64,
    pub performed: u64,
    pub failed: u64,
    pub ignored: u64,
    pub malformed: u64,
    pub dropped: u64,
}

/// Names the subscription the dispatcher manages.
#[derive(Debug, Clone)]
pub struct Subscription {
    pub event_name: String,
    pub module_name: String,
}

pub struct TouchDispatcher<E, X> {
    source: E,
    executor: X,
    rules: RuleTable,
    subscription: Subscription,
    state: DispatcherState,
    stats: DispatcherStats,
}

impl<E, X> TouchDispatcher<E, X>
where
    E: EventSource,
    X: ActionExecutor,
{
    /// Construct a dispatcher.  Does **not** subscribe; call [`arm`](Self::arm).
    pub fn new(source: E, executor: X, rules: RuleTable, subscription: Subscription) -> Self {
        Self {
            source,
            executor,
            rules,
            subscription,
            state: DispatcherState::Disarmed,
            stats: DispatcherStats::default(),
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Initial subscription.  Moves Disarmed → Listening.
    pub fn arm(&mut self, sink: &mut impl EventSink) -> Result<(), ActuatorError> {
        if self.state != DispatcherState::Disarmed {
            return Ok(());
        }
        self.source
            .subscribe(&self.subscription.event_name, &self.subscription.module_name)?;
        self.transition(DispatcherState::Listening, sink);
        info!(
            "Subscribed to {} as {}",
            self.subscription.event_name, self.subscription.module_name
        );
        Ok(())
    }

    /// Retry the subscription if a previous re-arm failed.
    ///
    /// Returns `true` if the dispatcher is Listening afterwards.
    pub fn ensure_armed(&mut self, sink: &mut impl EventSink) -> bool {
        match self.state {
            DispatcherState::Listening => true,
            DispatcherState::Disarmed => match self.arm(sink) {
                Ok(()) => true,
                Err(e) => {
                    debug!("Re-arm still failing: {}", e);
                    false
                }
            },
            DispatcherState::Busy | DispatcherState::Stopped => false,
        }
    }

    /// Unsubscribe (if armed) and stop.  Further events are dropped.
    pub fn shutdown(&mut self, sink: &mut impl EventSink) -> Result<(), ActuatorError> {
        let was_listening = self.state == DispatcherState::Listening;
        self.transition(DispatcherState::Stopped, sink);
        if was_listening {
            self.source
                .unsubscribe(&self.subscription.event_name, &self.subscription.module_name)?;
        }
        Ok(())
    }

    // ── Event handling ────────────────────────────────────────

    /// Handle one touch snapshot.
    pub fn handle(&mut self, event: &TouchEvent, sink: &mut impl EventSink) -> DispatchOutcome {
        if !self.begin(sink) {
            return DispatchOutcome::Dropped;
        }
        let outcome = self.run(event, sink);
        self.finish(sink);
        outcome
    }

    /// Handle a raw `TouchChanged` payload.
    ///
    /// Parsing happens inside the disarm/re-arm window, so a malformed
    /// payload still produces exactly one unsubscribe/subscribe pair.
    pub fn handle_payload(&mut self, payload: &Value, sink: &mut impl EventSink) -> DispatchOutcome {
        if !self.begin(sink) {
            return DispatchOutcome::Dropped;
        }
        let outcome = match TouchEvent::from_payload(payload) {
            Ok(event) => self.run(&event, sink),
            Err(e) => {
                warn!("Ignoring malformed touch payload: {}", e);
                self.stats.malformed += 1;
                sink.emit(&AppEvent::Malformed(e));
                DispatchOutcome::Malformed(e)
            }
        };
        self.finish(sink);
        outcome
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn state(&self) -> DispatcherState {
        self.state
    }

    /// `true` while subscribed and waiting for events.
    pub fn is_armed(&self) -> bool {
        self.state == DispatcherState::Listening
    }

    pub fn stats(&self) -> DispatcherStats {
        self.stats
    }

    pub fn rules(&self) -> &RuleTable {
        &self.rules
    }

    pub fn source(&self) -> &E {
        &self.source
    }

    pub fn executor(&self) -> &X {
        &self.executor
    }

    pub fn executor_mut(&mut self) -> &mut X {
        &mut self.executor
    }

    // ── Internal ──────────────────────────────────────────────

    /// Disarm on entry.  Returns `false` if the event must be dropped.
    fn begin(&mut self, sink: &mut impl EventSink) -> bool {
        self.stats.events += 1;
        if self.state != DispatcherState::Listening {
            debug!("Dropping touch event delivered while {:?}", self.state);
            self.stats.dropped += 1;
            return false;
        }

        self.transition(DispatcherState::Busy, sink);
        if let Err(e) = self
            .source
            .unsubscribe(&self.subscription.event_name, &self.subscription.module_name)
        {
            warn!("Unsubscribe before action failed: {}", e);
            sink.emit(&AppEvent::SubscriptionFailed(e));
        }
        true
    }

    /// Re-arm on exit, whatever happened in between.
    fn finish(&mut self, sink: &mut impl EventSink) {
        match self
            .source
            .subscribe(&self.subscription.event_name, &self.subscription.module_name)
        {
            Ok(()) => self.transition(DispatcherState::Listening, sink),
            Err(e) => {
                error!("Re-subscribe failed, will retry: {}", e);
                sink.emit(&AppEvent::SubscriptionFailed(e));
                self.transition(DispatcherState::Disarmed, sink);
            }
        }
    }

    fn run(&mut self, event: &TouchEvent, sink: &mut impl EventSink) -> DispatchOutcome {
        let touched = event.touched();
        sink.emit(&AppEvent::Touched(touched));

        let Some(action) = self.rules.resolve(&touched) else {
            debug!("No rule for touched set {:?}", touched);
            self.stats.ignored += 1;
            sink.emit(&AppEvent::Ignored(touched));
            return DispatchOutcome::Ignored;
        };

        sink.emit(&AppEvent::ActionStarted(action));
        match self.executor.execute(action) {
            Ok(()) => {
                self.stats.performed += 1;
                sink.emit(&AppEvent::ActionCompleted(action));
                DispatchOutcome::Performed(action)
            }
            Err(e) => {
                error!("Action {} failed: {}", action, e);
                self.stats.failed += 1;
                sink.emit(&AppEvent::ActionFailed {
                    action,
                    error: e.clone(),
                });
                DispatchOutcome::Failed(action, e)
            }
        }
    }

    fn transition(&mut self, to: DispatcherState, sink: &mut impl EventSink) {
        let from = self.state;
        if from != to {
            self.state = to;
            sink.emit(&AppEvent::StateChanged { from, to });
        }
    }
}
