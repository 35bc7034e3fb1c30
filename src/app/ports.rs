//! Port traits: the hexagonal boundary between the dispatcher and the robot.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ TouchDispatcher (domain)
//! ```
//!
//! Driven adapters (session proxies, frame store, event sinks, config
//! storage) implement these traits.  The
//! [`TouchDispatcher`](super::dispatcher::TouchDispatcher) receives them at
//! construction, so the domain core never touches the network or the
//! filesystem directly.
//!
//! Every actuator operation returns `Result<_, ActuatorError>`; the
//! dispatcher catches these at its boundary.

use std::path::{Path, PathBuf};

use crate::config::DispatcherConfig;
use crate::error::{ActuatorError, ConfigError};

use super::events::AppEvent;

// ───────────────────────────────────────────────────────────────
// Event source (driven adapter: robot event bus)
// ───────────────────────────────────────────────────────────────

/// Subscription control for the touch event stream.
///
/// Deliveries themselves arrive through whatever loop owns the adapter;
/// this port only switches them on and off.
pub trait EventSource {
    /// Start delivering `event` to the handler registered as `module`.
    fn subscribe(&mut self, event: &str, module: &str) -> Result<(), ActuatorError>;

    /// Stop delivering `event` to `module`.
    fn unsubscribe(&mut self, event: &str, module: &str) -> Result<(), ActuatorError>;
}

// ───────────────────────────────────────────────────────────────
// Imaging actuator
// ───────────────────────────────────────────────────────────────

/// Opaque handle returned by [`ImagingPort::subscribe`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CameraHandle(pub String);

/// One raw camera frame, row-major, `layers` bytes per pixel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    pub layers: u8,
    pub pixels: Vec<u8>,
}

impl Frame {
    /// Byte count implied by the header fields.
    pub fn expected_len(&self) -> usize {
        self.width as usize * self.height as usize * self.layers as usize
    }

    /// `true` if the pixel buffer matches the header.
    pub fn is_consistent(&self) -> bool {
        self.width > 0 && self.height > 0 && self.pixels.len() == self.expected_len()
    }
}

pub trait ImagingPort {
    /// Register a video client.
    fn subscribe(
        &mut self,
        client_tag: &str,
        resolution: u8,
        color_space: u8,
        fps: u8,
    ) -> Result<CameraHandle, ActuatorError>;

    /// Grab the latest frame for `handle`.
    fn get_frame(&mut self, handle: &CameraHandle) -> Result<Frame, ActuatorError>;

    /// Release the video client.
    fn unsubscribe(&mut self, handle: &CameraHandle) -> Result<(), ActuatorError>;
}

// ───────────────────────────────────────────────────────────────
// Speech actuator
// ───────────────────────────────────────────────────────────────

pub trait SpeechPort {
    /// Speak `utterance`; returns when the robot has finished.
    fn say(&mut self, utterance: &str) -> Result<(), ActuatorError>;
}

// ───────────────────────────────────────────────────────────────
// Locomotion actuator
// ───────────────────────────────────────────────────────────────

pub trait LocomotionPort {
    /// Stiffen joints and leave the rest posture.
    fn wake(&mut self) -> Result<(), ActuatorError>;

    /// Move to a predefined posture at `speed` (fraction of max).
    fn go_to_posture(&mut self, name: &str, speed: f32) -> Result<(), ActuatorError>;

    /// Walk to a pose relative to the current one (metres, radians).
    fn move_to(&mut self, dx: f32, dy: f32, dtheta: f32) -> Result<(), ActuatorError>;

    /// Go to the rest posture and release stiffness.
    fn rest(&mut self) -> Result<(), ActuatorError>;
}

// ───────────────────────────────────────────────────────────────
// Frame store (driven adapter: domain → filesystem / operator)
// ───────────────────────────────────────────────────────────────

/// Persists captured frames and optionally shows them to the operator.
pub trait FrameStore {
    /// Encode and write `frame`, replacing any previous capture.
    /// Returns the path written.
    fn persist(&mut self, frame: &Frame) -> Result<PathBuf, ActuatorError>;

    /// Present a persisted frame.  Default: do nothing.
    fn present(&mut self, _path: &Path) -> Result<(), ActuatorError> {
        Ok(())
    }
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`]s through this port.
/// Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Configuration port
// ───────────────────────────────────────────────────────────────

/// Loads and persists dispatcher configuration.
///
/// Implementations MUST validate before persisting and reject invalid
/// values with [`ConfigError::ValidationFailed`], not clamp them.
pub trait ConfigPort {
    /// Load configuration.  Returns [`DispatcherConfig::default()`] if no
    /// stored config exists.
    fn load(&self) -> Result<DispatcherConfig, ConfigError>;

    /// Validate and persist configuration.
    fn save(&self, config: &DispatcherConfig) -> Result<(), ConfigError>;
}
