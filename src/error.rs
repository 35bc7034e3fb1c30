//! Error types for the touch dispatcher.
//!
//! Two categories reach the dispatcher boundary: actuator failures (a
//! capability call failed or never answered) and malformed events (the
//! touch payload did not have the snapshot shape).  Neither aborts the
//! process.  Session and configuration errors only surface during bootstrap
//! and teardown.

use core::fmt;

// ---------------------------------------------------------------------------
// Actuator errors
// ---------------------------------------------------------------------------

/// Which capability a failed call was addressed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    Events,
    Imaging,
    Speech,
    Locomotion,
    Storage,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Events => write!(f, "events"),
            Self::Imaging => write!(f, "imaging"),
            Self::Speech => write!(f, "speech"),
            Self::Locomotion => write!(f, "locomotion"),
            Self::Storage => write!(f, "storage"),
        }
    }
}

/// An actuator call failed or raised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActuatorError {
    pub capability: Capability,
    pub operation: &'static str,
    pub reason: String,
}

impl ActuatorError {
    pub fn new(capability: Capability, operation: &'static str, reason: impl Into<String>) -> Self {
        Self {
            capability,
            operation,
            reason: reason.into(),
        }
    }
}

impl fmt::Display for ActuatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{} failed: {}", self.capability, self.operation, self.reason)
    }
}

impl std::error::Error for ActuatorError {}

// ---------------------------------------------------------------------------
// Malformed events
// ---------------------------------------------------------------------------

/// The touch payload did not match the `[[name, active], ...]` shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MalformedEvent {
    /// Top-level value was not an array.
    NotAList,
    /// Entry at this index was not a two-element array.
    BadEntry(usize),
    /// Sensor name at this index was not a string.
    BadName(usize),
    /// Active flag at this index was neither a bool nor a number.
    BadFlag(usize),
}

impl fmt::Display for MalformedEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotAList => write!(f, "payload is not a list"),
            Self::BadEntry(i) => write!(f, "entry {i} is not a [name, active] pair"),
            Self::BadName(i) => write!(f, "entry {i} has a non-string sensor name"),
            Self::BadFlag(i) => write!(f, "entry {i} has a non-boolean active flag"),
        }
    }
}

impl std::error::Error for MalformedEvent {}

// ---------------------------------------------------------------------------
// Session errors
// ---------------------------------------------------------------------------

/// Errors from the robot session bridge.
#[derive(Debug)]
pub enum SessionError {
    /// Could not reach the robot.
    Connect(std::io::Error),
    /// Transport read or write failed.
    Io(std::io::Error),
    /// Peer closed the connection.
    Closed,
    /// No reply arrived within the call timeout.
    Timeout { service: String, method: String },
    /// The robot answered the call with an error.
    Remote(String),
    /// A frame could not be encoded or decoded.
    Protocol(String),
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connect(e) => write!(f, "connect failed: {e}"),
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::Closed => write!(f, "session closed by peer"),
            Self::Timeout { service, method } => {
                write!(f, "{service}.{method} timed out")
            }
            Self::Remote(msg) => write!(f, "remote error: {msg}"),
            Self::Protocol(msg) => write!(f, "protocol error: {msg}"),
        }
    }
}

impl std::error::Error for SessionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Connect(e) | Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for SessionError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<serde_json::Error> for SessionError {
    fn from(e: serde_json::Error) -> Self {
        Self::Protocol(e.to_string())
    }
}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

/// Errors from [`ConfigPort`](crate::app::ports::ConfigPort) operations.
#[derive(Debug)]
pub enum ConfigError {
    /// Stored config could not be parsed.
    Corrupted(String),
    /// A config field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
    /// Generic I/O error from the storage backend.
    Io(std::io::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Corrupted(msg) => write!(f, "config corrupted: {msg}"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {msg}"),
            Self::Io(e) => write!(f, "I/O error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}
