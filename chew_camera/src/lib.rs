#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Camera backends.
//!
//! There is no live video here: [`StillCamera`] serves a JPEG from disk as
//! "the frame in front of the lens", which is enough to drive the capture
//! flow end to end. [`NoCamera`] models a device with no camera or a denied
//! permission and makes the session fall back to demo mode.
pub mod error;

use std::path::{Path, PathBuf};

use chew_traits::{BoxError, Camera, Facing};

pub use error::CameraError;

/// JPEG start-of-image marker.
const JPEG_SOI: [u8; 2] = [0xFF, 0xD8];

/// File-backed camera.
#[derive(Debug)]
pub struct StillCamera {
    frame_path: PathBuf,
    has_rear: bool,
    open: Option<Facing>,
}

impl StillCamera {
    /// A device with a rear camera pointed at `frame_path`.
    pub fn new(frame_path: impl Into<PathBuf>) -> Self {
        Self {
            frame_path: frame_path.into(),
            has_rear: true,
            open: None,
        }
    }

    /// A device with only a front/desktop camera, so `Facing::Rear` is refused.
    pub fn front_only(frame_path: impl Into<PathBuf>) -> Self {
        Self {
            has_rear: false,
            ..Self::new(frame_path)
        }
    }

    pub fn frame_path(&self) -> &Path {
        &self.frame_path
    }

    /// Facing of the currently open stream.
    pub fn open_facing(&self) -> Option<Facing> {
        self.open
    }

    fn try_open(&mut self, facing: Facing) -> error::Result<()> {
        if facing == Facing::Rear && !self.has_rear {
            return Err(CameraError::Unavailable("rear"));
        }
        if !self.frame_path.is_file() {
            return Err(CameraError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("frame source {} not found", self.frame_path.display()),
            )));
        }
        self.open = Some(facing);
        tracing::debug!(?facing, path = %self.frame_path.display(), "camera opened");
        Ok(())
    }

    fn try_capture(&self) -> error::Result<Vec<u8>> {
        if self.open.is_none() {
            return Err(CameraError::NotOpen);
        }
        let bytes = std::fs::read(&self.frame_path)?;
        if !bytes.starts_with(&JPEG_SOI) {
            return Err(CameraError::NotJpeg);
        }
        tracing::debug!(bytes = bytes.len(), "frame captured");
        Ok(bytes)
    }
}

impl Camera for StillCamera {
    fn open(&mut self, facing: Facing) -> Result<(), BoxError> {
        self.try_open(facing).map_err(Into::into)
    }

    fn capture_jpeg(&mut self) -> Result<Vec<u8>, BoxError> {
        self.try_capture().map_err(Into::into)
    }

    fn release(&mut self) {
        if self.open.take().is_some() {
            tracing::debug!("camera released");
        }
    }

    fn is_open(&self) -> bool {
        self.open.is_some()
    }
}

/// A device whose camera can never be opened.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoCamera;

impl Camera for NoCamera {
    fn open(&mut self, _facing: Facing) -> Result<(), BoxError> {
        Err(Box::new(CameraError::PermissionDenied))
    }

    fn capture_jpeg(&mut self) -> Result<Vec<u8>, BoxError> {
        Err(Box::new(CameraError::NotOpen))
    }

    fn release(&mut self) {}

    fn is_open(&self) -> bool {
        false
    }
}
