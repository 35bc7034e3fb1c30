//! PNG frame store adapter.
//!
//! Implements [`FrameStore`] by encoding captured frames with the `image`
//! crate and writing them to a fixed path, overwriting the previous
//! capture.  Presentation spawns an external viewer with the file path as
//! its only argument and does not wait for it.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use image::{ExtendedColorType, ImageFormat};
use log::debug;

use crate::app::ports::{Frame, FrameStore};
use crate::error::{ActuatorError, Capability};

pub struct PngFrameStore {
    path: PathBuf,
    viewer: Option<String>,
}

impl PngFrameStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            viewer: None,
        }
    }

    /// Use `command` to present captures.
    pub fn with_viewer(mut self, command: Option<String>) -> Self {
        self.viewer = command.filter(|c| !c.is_empty());
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn color_type(layers: u8) -> Option<ExtendedColorType> {
    match layers {
        1 => Some(ExtendedColorType::L8),
        3 => Some(ExtendedColorType::Rgb8),
        4 => Some(ExtendedColorType::Rgba8),
        _ => None,
    }
}

impl FrameStore for PngFrameStore {
    fn persist(&mut self, frame: &Frame) -> Result<PathBuf, ActuatorError> {
        let color = color_type(frame.layers).ok_or_else(|| {
            ActuatorError::new(
                Capability::Storage,
                "persist",
                format!("unsupported layer count {}", frame.layers),
            )
        })?;

        image::save_buffer_with_format(
            &self.path,
            &frame.pixels,
            frame.width,
            frame.height,
            color,
            ImageFormat::Png,
        )
        .map_err(|e| ActuatorError::new(Capability::Storage, "persist", e.to_string()))?;

        Ok(self.path.clone())
    }

    fn present(&mut self, path: &Path) -> Result<(), ActuatorError> {
        let Some(viewer) = &self.viewer else {
            debug!("No viewer configured, skipping presentation");
            return Ok(());
        };
        Command::new(viewer)
            .arg(path)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| ActuatorError::new(Capability::Storage, "present", e.to_string()))?;
        Ok(())
    }
}
