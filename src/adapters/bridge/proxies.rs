//! Service proxies: port implementations over a shared session.
//!
//! | Proxy          | Implements       | Robot services                       |
//! |----------------|------------------|--------------------------------------|
//! | `MemoryProxy`  | EventSource      | ALMemory                             |
//! | `VideoProxy`   | ImagingPort      | ALVideoDevice                        |
//! | `SpeechProxy`  | SpeechPort       | ALTextToSpeech                       |
//! | `MotionProxy`  | LocomotionPort   | ALMotion, ALRobotPosture             |
//!
//! Each proxy holds a clone of the [`SharedSession`] and borrows it only for
//! the duration of one call.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::app::ports::{CameraHandle, EventSource, Frame, ImagingPort, LocomotionPort, SpeechPort};
use crate::error::{ActuatorError, Capability};

use super::session::SharedSession;
use super::transport::Transport;

const MEMORY: &str = "ALMemory";
const VIDEO: &str = "ALVideoDevice";
const TTS: &str = "ALTextToSpeech";
const MOTION: &str = "ALMotion";
const POSTURE: &str = "ALRobotPosture";

/// Callback name the robot invokes on the registered module.
const TOUCH_CALLBACK: &str = "onTouched";

fn invoke<T: Transport>(
    session: &SharedSession<T>,
    capability: Capability,
    operation: &'static str,
    service: &str,
    method: &str,
    args: Vec<Value>,
) -> Result<Value, ActuatorError> {
    session
        .borrow_mut()
        .call(service, method, args)
        .map_err(|e| ActuatorError::new(capability, operation, e.to_string()))
}

// ───────────────────────────────────────────────────────────────
// ALMemory
// ───────────────────────────────────────────────────────────────

pub struct MemoryProxy<T> {
    session: SharedSession<T>,
}

impl<T: Transport> MemoryProxy<T> {
    pub fn new(session: SharedSession<T>) -> Self {
        Self { session }
    }
}

impl<T: Transport> EventSource for MemoryProxy<T> {
    fn subscribe(&mut self, event: &str, module: &str) -> Result<(), ActuatorError> {
        invoke(
            &self.session,
            Capability::Events,
            "subscribe",
            MEMORY,
            "subscribeToEvent",
            vec![json!(event), json!(module), json!(TOUCH_CALLBACK)],
        )
        .map(drop)
    }

    fn unsubscribe(&mut self, event: &str, module: &str) -> Result<(), ActuatorError> {
        invoke(
            &self.session,
            Capability::Events,
            "unsubscribe",
            MEMORY,
            "unsubscribeToEvent",
            vec![json!(event), json!(module)],
        )
        .map(drop)
    }
}

// ───────────────────────────────────────────────────────────────
// ALVideoDevice
// ───────────────────────────────────────────────────────────────

pub struct VideoProxy<T> {
    session: SharedSession<T>,
}

impl<T: Transport> VideoProxy<T> {
    pub fn new(session: SharedSession<T>) -> Self {
        Self { session }
    }
}

/// `getImageRemote` reply body.
#[derive(Deserialize)]
struct RemoteImage {
    width: u32,
    height: u32,
    layers: u8,
    data: String,
}

fn parse_image(value: Value) -> Result<Frame, ActuatorError> {
    let bad = |reason: String| ActuatorError::new(Capability::Imaging, "get_frame", reason);
    let img: RemoteImage = serde_json::from_value(value).map_err(|e| bad(e.to_string()))?;
    let pixels = BASE64
        .decode(img.data.as_bytes())
        .map_err(|e| bad(format!("pixel data: {e}")))?;
    Ok(Frame {
        width: img.width,
        height: img.height,
        layers: img.layers,
        pixels,
    })
}

impl<T: Transport> ImagingPort for VideoProxy<T> {
    fn subscribe(
        &mut self,
        client_tag: &str,
        resolution: u8,
        color_space: u8,
        fps: u8,
    ) -> Result<CameraHandle, ActuatorError> {
        let value = invoke(
            &self.session,
            Capability::Imaging,
            "subscribe",
            VIDEO,
            "subscribe",
            vec![json!(client_tag), json!(resolution), json!(color_space), json!(fps)],
        )?;
        match value {
            Value::String(name) => Ok(CameraHandle(name)),
            other => Err(ActuatorError::new(
                Capability::Imaging,
                "subscribe",
                format!("expected client name, got {other}"),
            )),
        }
    }

    fn get_frame(&mut self, handle: &CameraHandle) -> Result<Frame, ActuatorError> {
        let value = invoke(
            &self.session,
            Capability::Imaging,
            "get_frame",
            VIDEO,
            "getImageRemote",
            vec![json!(handle.0)],
        )?;
        parse_image(value)
    }

    fn unsubscribe(&mut self, handle: &CameraHandle) -> Result<(), ActuatorError> {
        invoke(
            &self.session,
            Capability::Imaging,
            "unsubscribe",
            VIDEO,
            "unsubscribe",
            vec![json!(handle.0)],
        )
        .map(drop)
    }
}

// ───────────────────────────────────────────────────────────────
// ALTextToSpeech
// ───────────────────────────────────────────────────────────────

pub struct SpeechProxy<T> {
    session: SharedSession<T>,
}

impl<T: Transport> SpeechProxy<T> {
    pub fn new(session: SharedSession<T>) -> Self {
        Self { session }
    }
}

impl<T: Transport> SpeechPort for SpeechProxy<T> {
    fn say(&mut self, utterance: &str) -> Result<(), ActuatorError> {
        invoke(&self.session, Capability::Speech, "say", TTS, "say", vec![json!(utterance)]).map(drop)
    }
}

// ───────────────────────────────────────────────────────────────
// ALMotion + ALRobotPosture
// ───────────────────────────────────────────────────────────────

pub struct MotionProxy<T> {
    session: SharedSession<T>,
}

impl<T: Transport> MotionProxy<T> {
    pub fn new(session: SharedSession<T>) -> Self {
        Self { session }
    }
}

impl<T: Transport> LocomotionPort for MotionProxy<T> {
    fn wake(&mut self) -> Result<(), ActuatorError> {
        invoke(&self.session, Capability::Locomotion, "wake", MOTION, "wakeUp", vec![]).map(drop)
    }

    fn go_to_posture(&mut self, name: &str, speed: f32) -> Result<(), ActuatorError> {
        let reached = invoke(
            &self.session,
            Capability::Locomotion,
            "go_to_posture",
            POSTURE,
            "goToPosture",
            vec![json!(name), json!(speed)],
        )?;
        // The posture service answers `false` when the posture was not reached.
        if reached == Value::Bool(false) {
            return Err(ActuatorError::new(
                Capability::Locomotion,
                "go_to_posture",
                format!("posture '{name}' not reached"),
            ));
        }
        Ok(())
    }

    fn move_to(&mut self, dx: f32, dy: f32, dtheta: f32) -> Result<(), ActuatorError> {
        invoke(
            &self.session,
            Capability::Locomotion,
            "move_to",
            MOTION,
            "moveTo",
            vec![json!(dx), json!(dy), json!(dtheta)],
        )
        .map(drop)
    }

    fn rest(&mut self) -> Result<(), ActuatorError> {
        invoke(&self.session, Capability::Locomotion, "rest", MOTION, "rest", vec![]).map(drop)
    }
}
