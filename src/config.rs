//! Dispatcher configuration parameters
//!
//! All tunable parameters for the touch dispatcher and its actions.
//! Values can be overridden from a JSON file loaded through
//! [`ConfigPort`](crate::app::ports::ConfigPort) and from CLI flags.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Largest resolution id the capture path accepts (2 = VGA 640x480).
pub const MAX_RESOLUTION: u8 = 2;

/// Bytes per pixel in the widest colour space a frame may carry.
pub const MAX_LAYERS: usize = 4;

/// Base64 length of `raw` bytes.
const fn base64_len(raw: usize) -> usize {
    raw.div_ceil(3) * 4
}

/// Encoded pixel bytes in the largest frame at [`MAX_RESOLUTION`].
/// The session frame limit is sized from this.
pub const CAPTURE_REPLY_LIMIT: usize = base64_len(640 * 480 * MAX_LAYERS);

/// Camera settings used by the capture action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Client tag registered with the video device.
    pub client_tag: String,
    /// Resolution id (0 = QQVGA 160x120, at most [`MAX_RESOLUTION`]).
    pub resolution: u8,
    /// Colour space id (11 = RGB).
    pub color_space: u8,
    /// Requested frame rate.
    pub fps: u8,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            client_tag: "touchreact_GVM".into(),
            resolution: 0,
            color_space: 11,
            fps: 5,
        }
    }
}

impl CameraConfig {
    /// Frame size for a video device resolution id.
    pub const fn dimensions(resolution: u8) -> Option<(u32, u32)> {
        match resolution {
            0 => Some((160, 120)),
            1 => Some((320, 240)),
            2 => Some((640, 480)),
            3 => Some((1280, 960)),
            _ => None,
        }
    }

    /// Encoded pixel bytes of the largest frame `resolution` can produce.
    pub const fn encoded_frame_len(resolution: u8) -> Option<usize> {
        match Self::dimensions(resolution) {
            Some((w, h)) => Some(base64_len(w as usize * h as usize * MAX_LAYERS)),
            None => None,
        }
    }
}

/// Walk sequence parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WalkConfig {
    /// Posture reached before moving.
    pub posture: String,
    /// Fraction of max speed for the posture change (0.0-1.0].
    pub posture_speed: f32,
    /// Forward displacement in metres.
    pub dx: f32,
    /// Lateral displacement in metres.
    pub dy: f32,
    /// Rotation in radians.
    pub dtheta: f32,
}

impl Default for WalkConfig {
    fn default() -> Self {
        Self {
            posture: "StandInit".into(),
            posture_speed: 0.5,
            dx: 0.25,
            dy: 0.0,
            dtheta: 0.0,
        }
    }
}

/// Core dispatcher configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatcherConfig {
    // --- Subscription ---
    /// Event the dispatcher subscribes to.
    pub event_name: String,
    /// Module name the subscription is registered under.
    pub module_name: String,

    // --- Actions ---
    /// Utterance for the speak action.
    pub utterance: String,
    /// Where captured frames are written (PNG, overwritten each capture).
    pub capture_path: PathBuf,
    /// Open the captured frame with `viewer_command` after saving.
    pub show_image: bool,
    /// Program used to present a captured frame; receives the file path.
    pub viewer_command: Option<String>,
    pub camera: CameraConfig,
    pub walk: WalkConfig,

    // --- Timing ---
    /// Upper bound on a single actuator call (milliseconds).
    pub call_timeout_ms: u32,
    /// Event poll interval; also bounds shutdown latency (milliseconds).
    pub poll_interval_ms: u32,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            event_name: "TouchChanged".into(),
            module_name: "ReactToTouch".into(),

            utterance: "My arm has been touched".into(),
            capture_path: PathBuf::from("camImage.png"),
            show_image: false,
            viewer_command: None,
            camera: CameraConfig::default(),
            walk: WalkConfig::default(),

            call_timeout_ms: 30_000, // walk steps can take several seconds
            poll_interval_ms: 200,
        }
    }
}

impl DispatcherConfig {
    /// Reject out-of-range values.  Never clamps.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.event_name.is_empty() {
            return Err(ConfigError::ValidationFailed("event_name must not be empty"));
        }
        if self.module_name.is_empty() {
            return Err(ConfigError::ValidationFailed("module_name must not be empty"));
        }
        if self.utterance.trim().is_empty() {
            return Err(ConfigError::ValidationFailed("utterance must not be blank"));
        }
        if self.capture_path.as_os_str().is_empty() {
            return Err(ConfigError::ValidationFailed("capture_path must not be empty"));
        }
        if !CameraConfig::encoded_frame_len(self.camera.resolution).is_some_and(|n| n <= CAPTURE_REPLY_LIMIT) {
            return Err(ConfigError::ValidationFailed("camera.resolution must be 0-2 (QQVGA to VGA)"));
        }
        if self.camera.fps == 0 || self.camera.fps > 30 {
            return Err(ConfigError::ValidationFailed("camera.fps must be 1-30"));
        }
        if !(self.walk.posture_speed > 0.0 && self.walk.posture_speed <= 1.0) {
            return Err(ConfigError::ValidationFailed("walk.posture_speed must be in (0, 1]"));
        }
        if ![self.walk.dx, self.walk.dy, self.walk.dtheta]
            .iter()
            .all(|v| v.is_finite())
        {
            return Err(ConfigError::ValidationFailed("walk displacement must be finite"));
        }
        if self.walk.dx.abs() > 1.0 || self.walk.dy.abs() > 1.0 {
            return Err(ConfigError::ValidationFailed("walk displacement limited to 1 m per axis"));
        }
        if self.call_timeout_ms == 0 {
            return Err(ConfigError::ValidationFailed("call_timeout_ms must be > 0"));
        }
        if self.poll_interval_ms == 0 || self.poll_interval_ms > self.call_timeout_ms {
            return Err(ConfigError::ValidationFailed(
                "poll_interval_ms must be > 0 and not exceed call_timeout_ms",
            ));
        }
        if self.show_image && self.viewer_command.as_deref().is_none_or(str::is_empty) {
            return Err(ConfigError::ValidationFailed("show_image requires viewer_command"));
        }
        Ok(())
    }
}
