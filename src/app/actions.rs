//! Action execution: thin call-throughs to the actuator ports.
//!
//! | Action  | Port calls                                                     |
//! |---------|----------------------------------------------------------------|
//! | Capture | imaging.subscribe → get_frame → unsubscribe; frames.persist    |
//! | Speak   | speech.say                                                     |
//! | Walk    | locomotion.wake → go_to_posture → move_to → rest               |
//!
//! Walk is not transactional: the first failing step aborts the sequence
//! and nothing is rolled back.

use log::{info, warn};

use crate::config::{CameraConfig, DispatcherConfig, WalkConfig};
use crate::error::{ActuatorError, Capability};

use super::ports::{FrameStore, ImagingPort, LocomotionPort, SpeechPort};
use super::rules::Action;

/// Something that can run an [`Action`] to completion.
pub trait ActionExecutor {
    fn execute(&mut self, action: Action) -> Result<(), ActuatorError>;
}

/// The parts of [`DispatcherConfig`] the actions read.
#[derive(Debug, Clone)]
pub struct ActionSettings {
    pub utterance: String,
    pub camera: CameraConfig,
    pub walk: WalkConfig,
    pub show_image: bool,
}

impl From<&DispatcherConfig> for ActionSettings {
    fn from(c: &DispatcherConfig) -> Self {
        Self {
            utterance: c.utterance.clone(),
            camera: c.camera.clone(),
            walk: c.walk.clone(),
            show_image: c.show_image,
        }
    }
}

impl Default for ActionSettings {
    fn default() -> Self {
        Self::from(&DispatcherConfig::default())
    }
}

/// Bundle of actuator ports that executes actions against them.
pub struct Actuators<I, S, L, F> {
    pub imaging: I,
    pub speech: S,
    pub locomotion: L,
    pub frames: F,
    settings: ActionSettings,
}

impl<I, S, L, F> Actuators<I, S, L, F>
where
    I: ImagingPort,
    S: SpeechPort,
    L: LocomotionPort,
    F: FrameStore,
{
    pub fn new(imaging: I, speech: S, locomotion: L, frames: F, settings: ActionSettings) -> Self {
        Self {
            imaging,
            speech,
            locomotion,
            frames,
            settings,
        }
    }

    pub fn settings(&self) -> &ActionSettings {
        &self.settings
    }

    fn capture(&mut self) -> Result<(), ActuatorError> {
        let cam = &self.settings.camera;
        let handle = self
            .imaging
            .subscribe(&cam.client_tag, cam.resolution, cam.color_space, cam.fps)?;

        let frame = self.imaging.get_frame(&handle);

        // The video client is released whether or not the grab worked.
        if let Err(e) = self.imaging.unsubscribe(&handle) {
            warn!("Camera release failed: {}", e);
        }

        let frame = frame?;
        if !frame.is_consistent() {
            return Err(ActuatorError::new(
                Capability::Imaging,
                "get_frame",
                format!(
                    "frame {}x{}x{} carries {} bytes",
                    frame.width,
                    frame.height,
                    frame.layers,
                    frame.pixels.len()
                ),
            ));
        }

        let path = self.frames.persist(&frame)?;
        info!("Captured {}x{} frame to {}", frame.width, frame.height, path.display());

        if self.settings.show_image {
            self.frames.present(&path)?;
        }
        Ok(())
    }

    fn speak(&mut self) -> Result<(), ActuatorError> {
        self.speech.say(&self.settings.utterance)
    }

    fn walk(&mut self) -> Result<(), ActuatorError> {
        let w = &self.settings.walk;
        self.locomotion.wake()?;
        self.locomotion.go_to_posture(&w.posture, w.posture_speed)?;
        self.locomotion.move_to(w.dx, w.dy, w.dtheta)?;
        self.locomotion.rest()
    }
}

impl<I, S, L, F> ActionExecutor for Actuators<I, S, L, F>
where
    I: ImagingPort,
    S: SpeechPort,
    L: LocomotionPort,
    F: FrameStore,
{
    fn execute(&mut self, action: Action) -> Result<(), ActuatorError> {
        match action {
            Action::Capture => self.capture(),
            Action::Speak => self.speak(),
            Action::Walk => self.walk(),
        }
    }
}
