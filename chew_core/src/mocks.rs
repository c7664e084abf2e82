//! Test and helper doubles for chew_core

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use chew_traits::{BoxError, Camera, Estimator, Facing};

/// Always answers with the same reply text.
#[derive(Debug, Clone)]
pub struct ScriptedEstimator {
    reply: String,
    calls: Arc<AtomicUsize>,
}

impl ScriptedEstimator {
    pub fn new(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Number of estimation requests seen so far (shared across clones).
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }
}

impl Estimator for ScriptedEstimator {
    fn estimate(&self, _image_base64: &str) -> Result<String, BoxError> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        Ok(self.reply.clone())
    }
}

/// Always fails with an I/O error carrying `message`.
#[derive(Debug, Clone)]
pub struct FailingEstimator {
    message: String,
}

impl FailingEstimator {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl Estimator for FailingEstimator {
    fn estimate(&self, _image_base64: &str) -> Result<String, BoxError> {
        Err(Box::new(std::io::Error::other(self.message.clone())))
    }
}

/// Camera double that records how often it was opened and released.
///
/// Clones share counters, so a test can keep one and hand the other to the
/// controller.
#[derive(Debug, Clone, Default)]
pub struct TrackingCamera {
    frame: Vec<u8>,
    fail_open: bool,
    fail_capture: bool,
    open: bool,
    opens: Arc<AtomicUsize>,
    releases: Arc<AtomicUsize>,
    open_now: Arc<AtomicUsize>,
}

impl TrackingCamera {
    /// A working camera returning a tiny JPEG-looking frame.
    pub fn working() -> Self {
        Self {
            frame: vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, 0xFF, 0xD9],
            ..Self::default()
        }
    }

    /// A camera whose `open` always fails.
    pub fn unavailable() -> Self {
        Self {
            fail_open: true,
            ..Self::default()
        }
    }

    /// Opens fine, but every capture fails.
    pub fn broken_sensor() -> Self {
        Self {
            fail_capture: true,
            ..Self::working()
        }
    }

    pub fn opens(&self) -> usize {
        self.opens.load(Ordering::Relaxed)
    }
    pub fn releases(&self) -> usize {
        self.releases.load(Ordering::Relaxed)
    }
    /// Whether any clone currently holds the device.
    pub fn held(&self) -> bool {
        self.open_now.load(Ordering::Relaxed) > 0
    }
}

impl Camera for TrackingCamera {
    fn open(&mut self, _facing: Facing) -> Result<(), BoxError> {
        if self.fail_open {
            return Err(Box::new(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "camera permission denied",
            )));
        }
        if !self.open {
            self.open = true;
            self.open_now.fetch_add(1, Ordering::Relaxed);
        }
        self.opens.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    fn capture_jpeg(&mut self) -> Result<Vec<u8>, BoxError> {
        if !self.open {
            return Err(Box::new(std::io::Error::other("camera not open")));
        }
        if self.fail_capture {
            return Err(Box::new(std::io::Error::other("sensor read failed")));
        }
        Ok(self.frame.clone())
    }

    fn release(&mut self) {
        if self.open {
            self.open = false;
            self.open_now.fetch_sub(1, Ordering::Relaxed);
        }
        self.releases.fetch_add(1, Ordering::Relaxed);
    }

    fn is_open(&self) -> bool {
        self.open
    }
}
