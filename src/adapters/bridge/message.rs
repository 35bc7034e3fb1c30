//! Session wire messages.
//!
//! Every frame carries one JSON object tagged by `"type"`:
//!
//! ```text
//! → {"type":"call","id":7,"service":"ALTextToSpeech","method":"say","args":["hi"]}
//! ← {"type":"reply","id":7,"value":null}
//! ← {"type":"failure","id":7,"message":"speech engine busy"}
//! ← {"type":"event","name":"TouchChanged","value":[["Head",true]]}
//! → {"type":"goodbye"}
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::SessionError;

/// Messages sent to the robot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Outbound {
    /// Invoke `service.method(args...)`.
    Call {
        id: u64,
        service: String,
        method: String,
        args: Vec<Value>,
    },
    /// Orderly end of the session.
    Goodbye,
}

/// Messages received from the robot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Inbound {
    /// Successful result of call `id`.
    Reply {
        id: u64,
        #[serde(default)]
        value: Value,
    },
    /// Call `id` raised on the robot side.
    Failure { id: u64, message: String },
    /// Subscribed event delivery.
    Event {
        name: String,
        #[serde(default)]
        value: Value,
    },
}

/// An event delivery handed to the poll loop.
#[derive(Debug, Clone, PartialEq)]
pub struct EventMessage {
    pub name: String,
    pub value: Value,
}

pub fn encode(msg: &Outbound) -> Result<Vec<u8>, SessionError> {
    Ok(serde_json::to_vec(msg)?)
}

pub fn decode(payload: &[u8]) -> Result<Inbound, SessionError> {
    Ok(serde_json::from_slice(payload)?)
}
