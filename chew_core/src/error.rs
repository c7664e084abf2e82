use serde::Serialize;
use thiserror::Error;

/// Errors the session controller hands back to the presentation layer.
///
/// None of these change state: a rejected intent leaves the controller
/// exactly where it was.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ChewError {
    #[error("invalid transition: {intent} is not accepted in {view}")]
    InvalidTransition {
        intent: &'static str,
        view: &'static str,
    },
    #[error("busy: {0}")]
    Busy(&'static str),
    #[error("configuration error: {0}")]
    Config(String),
}

/// Why a session is running on a non-AI (fallback or demo) analysis.
///
/// Never raised as an error; it travels next to the fallback value so the
/// presentation layer can tell the user what happened.
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Degradation {
    #[error("estimation credentials missing (set {env})")]
    MissingCredentials { env: String },
    #[error("estimation service rate limited")]
    RateLimited,
    #[error("estimation service returned {status}: {message}")]
    Service { status: u16, message: String },
    #[error("estimation request failed: {message}")]
    Transport { message: String },
    #[error("malformed estimation reply: {message}")]
    Malformed { message: String },
    #[error("camera unavailable")]
    CameraUnavailable,
}

impl Degradation {
    /// Text shown to the user in place of the AI result.
    pub fn user_message(&self) -> String {
        match self {
            Self::MissingCredentials { env } => format!(
                "The food estimation service is not configured (set {env}). Chew 30 times per bite manually."
            ),
            Self::RateLimited => {
                "Too many AI requests. Wait a minute and try again; chew 30 times per bite for now."
                    .to_string()
            }
            Self::Service { .. } => {
                "The AI service is busy. Chew 30 times per bite manually.".to_string()
            }
            Self::Transport { .. } => {
                "Network unavailable, AI analysis could not start. Chew 30 times per bite manually."
                    .to_string()
            }
            Self::Malformed { .. } => {
                "The AI reply could not be read. Chew 30 times per bite manually.".to_string()
            }
            Self::CameraUnavailable => {
                "Camera unavailable. Using a demonstration analysis.".to_string()
            }
        }
    }
}

pub type Result<T> = eyre::Result<T>;
pub use eyre::Report;
