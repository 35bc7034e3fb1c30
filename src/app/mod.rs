//! Application core: pure domain logic, zero I/O.
//!
//! This module contains the dispatch rules for the touch reactor: the
//! precedence table, the Armed state machine, and the action sequences.
//! All interaction with the robot happens through **port traits** defined
//! in [`ports`], keeping this layer fully testable without a robot.

pub mod actions;
pub mod dispatcher;
pub mod events;
pub mod ports;
pub mod rules;
