//! Seams between the slow-eating engine and the outside world.
//!
//! The core never touches a device, the network or the wall clock directly:
//! it goes through [`Clock`], [`Camera`] and [`Estimator`]. Errors at these
//! boundaries are boxed so backends can use whatever error type they like;
//! `chew_core` maps them to typed values.
pub mod clock;

pub use clock::{Clock, MonotonicClock};

/// Error type used at every trait boundary.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Which camera to ask the device for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Facing {
    /// Rear ("environment") camera, pointed at the plate.
    Rear,
    /// Whatever camera the device offers.
    Any,
}

/// A camera that can be opened, asked for one still frame, and released.
///
/// Opening acquires the device; `release` must be safe to call any number
/// of times, including when nothing is open.
pub trait Camera {
    fn open(&mut self, facing: Facing) -> Result<(), BoxError>;
    /// Grab the current frame as JPEG bytes. Requires an open camera.
    fn capture_jpeg(&mut self) -> Result<Vec<u8>, BoxError>;
    fn release(&mut self);
    fn is_open(&self) -> bool;
}

/// External food-estimation service.
///
/// Takes a base64-encoded JPEG and returns the service's JSON text
/// describing one dish.
pub trait Estimator {
    fn estimate(&self, image_base64: &str) -> Result<String, BoxError>;
}

impl<E: Estimator + ?Sized> Estimator for Box<E> {
    fn estimate(&self, image_base64: &str) -> Result<String, BoxError> {
        (**self).estimate(image_base64)
    }
}

impl<E: Estimator + ?Sized> Estimator for std::sync::Arc<E> {
    fn estimate(&self, image_base64: &str) -> Result<String, BoxError> {
        (**self).estimate(image_base64)
    }
}

impl<C: Camera + ?Sized> Camera for Box<C> {
    fn open(&mut self, facing: Facing) -> Result<(), BoxError> {
        (**self).open(facing)
    }
    fn capture_jpeg(&mut self) -> Result<Vec<u8>, BoxError> {
        (**self).capture_jpeg()
    }
    fn release(&mut self) {
        (**self).release();
    }
    fn is_open(&self) -> bool {
        (**self).is_open()
    }
}
