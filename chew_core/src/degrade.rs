//! Maps `Box<dyn Error>` from the estimator seam to a typed `Degradation`.
//!
//! The `Estimator` trait uses boxed errors so any backend fits; this module
//! turns them into the fallback reason shown to the user, with a precise
//! path for the built-in Gemini backend.

use crate::error::Degradation;

/// Classify an estimator failure.
///
/// Attempts to downcast known backend error types first, then falls back
/// to string-based heuristics.
pub fn classify_estimator_error(e: &(dyn std::error::Error + 'static)) -> Degradation {
    #[cfg(feature = "gemini")]
    {
        use crate::gemini::EstimatorError;
        if let Some(err) = e.downcast_ref::<EstimatorError>() {
            return match err {
                EstimatorError::MissingApiKey(env) => {
                    Degradation::MissingCredentials { env: env.clone() }
                }
                EstimatorError::RateLimited(_) => Degradation::RateLimited,
                EstimatorError::Status(status, message) => Degradation::Service {
                    status: *status,
                    message: message.clone(),
                },
                EstimatorError::Transport(message) => Degradation::Transport {
                    message: message.clone(),
                },
                EstimatorError::Malformed(message) => Degradation::Malformed {
                    message: message.clone(),
                },
            };
        }
    }

    let message = e.to_string();
    let lower = message.to_ascii_lowercase();
    if lower.contains("429") || lower.contains("rate limit") {
        Degradation::RateLimited
    } else if lower.contains("api key") || lower.contains("credential") {
        Degradation::MissingCredentials {
            env: "API_KEY".to_string(),
        }
    } else {
        Degradation::Transport { message }
    }
}
