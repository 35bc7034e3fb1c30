//! Touch-to-action precedence table.
//!
//! ```text
//! ┌───┬────────────────┬──────────────────────────────────────┬─────────┐
//! │ # │ name           │ predicate (on TouchedSet)            │ action  │
//! ├───┼────────────────┼──────────────────────────────────────┼─────────┤
//! │ 0 │ head           │ Head                                 │ Capture │
//! │ 1 │ arm            │ RArm | LArm                          │ Speak   │
//! │ 2 │ right-bumper   │ RFoot/Bumper/Right | RFoot/Bumper/Left│ Walk    │
//! │ 3 │ left-bumper    │ LFoot/Bumper/Left | LFoot/Bumper/Right│ Walk    │
//! └───┴────────────────┴──────────────────────────────────────┴─────────┘
//! ```
//!
//! Rules are evaluated top to bottom; the first predicate that matches
//! decides the action.  No match means the event is ignored.

use core::fmt;

use crate::touch::{TouchSensor, TouchedSet};

/// The mutually exclusive actions a touch can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// Grab one camera frame and save it.
    Capture,
    /// Say the configured utterance.
    Speak,
    /// Wake, stand, step forward, rest.
    Walk,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Capture => write!(f, "capture"),
            Self::Speak => write!(f, "speak"),
            Self::Walk => write!(f, "walk"),
        }
    }
}

/// Signature for a rule predicate.
pub type PredicateFn = fn(&TouchedSet) -> bool;

/// One row of the precedence table.
#[derive(Clone, Copy)]
pub struct Rule {
    pub name: &'static str,
    pub predicate: PredicateFn,
    pub action: Action,
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("name", &self.name)
            .field("action", &self.action)
            .finish_non_exhaustive()
    }
}

fn head_touched(t: &TouchedSet) -> bool {
    t.contains(TouchSensor::Head)
}

fn arm_touched(t: &TouchedSet) -> bool {
    t.contains_any(&[TouchSensor::RightArm, TouchSensor::LeftArm])
}

fn right_bumper_touched(t: &TouchedSet) -> bool {
    t.contains_any(&[TouchSensor::RightFootBumperRight, TouchSensor::RightFootBumperLeft])
}

fn left_bumper_touched(t: &TouchedSet) -> bool {
    t.contains_any(&[TouchSensor::LeftFootBumperLeft, TouchSensor::LeftFootBumperRight])
}

/// The standard precedence: head, arms, right foot, left foot.
pub const STANDARD_RULES: [Rule; 4] = [
    Rule {
        name: "head",
        predicate: head_touched,
        action: Action::Capture,
    },
    Rule {
        name: "arm",
        predicate: arm_touched,
        action: Action::Speak,
    },
    Rule {
        name: "right-bumper",
        predicate: right_bumper_touched,
        action: Action::Walk,
    },
    Rule {
        name: "left-bumper",
        predicate: left_bumper_touched,
        action: Action::Walk,
    },
];

/// Ordered list of rules; first match wins.
#[derive(Debug, Clone)]
pub struct RuleTable {
    rules: Vec<Rule>,
}

impl RuleTable {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    /// Table with [`STANDARD_RULES`].
    pub fn standard() -> Self {
        Self::new(STANDARD_RULES.to_vec())
    }

    /// First rule whose predicate accepts `touched`.
    pub fn matching_rule(&self, touched: &TouchedSet) -> Option<&Rule> {
        self.rules.iter().find(|r| (r.predicate)(touched))
    }

    pub fn resolve(&self, touched: &TouchedSet) -> Option<Action> {
        self.matching_rule(touched).map(|r| r.action)
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }
}

impl Default for RuleTable {
    fn default() -> Self {
        Self::standard()
    }
}
