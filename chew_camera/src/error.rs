use thiserror::Error;

#[derive(Debug, Error)]
pub enum CameraError {
    #[error("camera permission denied")]
    PermissionDenied,
    #[error("no {0} camera available")]
    Unavailable(&'static str),
    #[error("camera not open")]
    NotOpen,
    #[error("frame is not a JPEG image")]
    NotJpeg,
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CameraError>;
