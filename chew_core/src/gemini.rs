//! Hosted multimodal model backend for the [`Estimator`] seam.
//!
//! Sends one `generateContent` request with the photo inlined and a JSON
//! response schema, and hands back the model's text part untouched; parsing
//! and normalization happen in [`crate::analysis`].

use std::time::Duration;

use chew_config::EstimatorCfg;
use chew_traits::{BoxError, Estimator};
use serde_json::{Value, json};
use thiserror::Error;

use crate::error::ChewError;

const USER_AGENT: &str = concat!("chew/", env!("CARGO_PKG_VERSION"));

const PROMPT: &str = "\
Analyze this food image for a weight-loss application called 'SlimChew AI'.

Tasks:
1. Identify the main dish.
2. Estimate the approximate calories for a standard serving size.
3. Assess the 'Texture Density' (Soft, Medium, or Hard). Harder/Denser foods (like steak, nuts) require more chewing than Soft foods (like porridge).
4. Calculate 'Required Chews' based on this formula logic:
   - Base chews: 15
   - If High Calorie (>500kcal): Add 10
   - If Hard Texture: Add 10
   - If Medium Texture: Add 5
   - Max chews: 50
5. Generate a 'Fat Shield Tip': A 1-sentence psychological command linking chewing to blocking fat absorption (e.g., \"Chew 30 times to break down the fat matrix.\").

Respond in JSON format.
IMPORTANT: text fields (foodName, fatShieldTip) MUST be in Simplified Chinese.";

#[derive(Debug, Error)]
pub enum EstimatorError {
    #[error("api key missing: environment variable {0} is not set")]
    MissingApiKey(String),
    #[error("rate limited (429): {0}")]
    RateLimited(String),
    #[error("service error {0}: {1}")]
    Status(u16, String),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("malformed response: {0}")]
    Malformed(String),
}

pub struct GeminiEstimator {
    http: reqwest::blocking::Client,
    url: String,
    api_key_env: String,
}

impl std::fmt::Debug for GeminiEstimator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiEstimator")
            .field("url", &self.url)
            .field("api_key_env", &self.api_key_env)
            .finish_non_exhaustive()
    }
}

impl GeminiEstimator {
    pub fn from_config(cfg: &EstimatorCfg) -> Result<Self, ChewError> {
        let http = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_millis(cfg.timeout_ms))
            .build()
            .map_err(|e| ChewError::Config(format!("http client: {e}")))?;
        let url = format!(
            "{}/models/{}:generateContent",
            cfg.endpoint.trim_end_matches('/'),
            cfg.model
        );
        Ok(Self {
            http,
            url,
            api_key_env: cfg.api_key_env.clone(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Whether the credential variable is currently set (and non-empty).
    pub fn has_api_key(&self) -> bool {
        self.api_key().is_some()
    }

    fn api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty())
    }

    fn request(&self, image_base64: &str) -> Result<String, EstimatorError> {
        // Read at request time so a missing key surfaces exactly where the
        // estimate would otherwise have been made.
        let key = self
            .api_key()
            .ok_or_else(|| EstimatorError::MissingApiKey(self.api_key_env.clone()))?;

        tracing::debug!(url = %self.url, image_b64_len = image_base64.len(), "estimation request");

        let response = self
            .http
            .post(&self.url)
            .header("x-goog-api-key", key)
            .json(&request_body(image_base64))
            .send()
            .map_err(|e| EstimatorError::Transport(e.to_string()))?;

        let status = response.status();
        if status.as_u16() == 429 {
            let body = response.text().unwrap_or_default();
            return Err(EstimatorError::RateLimited(body));
        }
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(EstimatorError::Status(status.as_u16(), body));
        }

        let envelope: Value = response
            .json()
            .map_err(|e| EstimatorError::Malformed(e.to_string()))?;
        reply_text(&envelope)
    }
}

impl Estimator for GeminiEstimator {
    fn estimate(&self, image_base64: &str) -> Result<String, BoxError> {
        self.request(image_base64).map_err(Into::into)
    }
}

fn request_body(image_base64: &str) -> Value {
    json!({
        "contents": [{
            "parts": [
                { "inlineData": { "mimeType": "image/jpeg", "data": image_base64 } },
                { "text": PROMPT }
            ]
        }],
        "generationConfig": {
            "responseMimeType": "application/json",
            "responseSchema": {
                "type": "OBJECT",
                "properties": {
                    "foodName": { "type": "STRING" },
                    "calories": { "type": "INTEGER" },
                    "textureLevel": { "type": "STRING", "enum": ["Soft", "Medium", "Hard"] },
                    "recommendedChews": { "type": "INTEGER" },
                    "fatShieldTip": { "type": "STRING" }
                },
                "required": ["foodName", "calories", "textureLevel", "recommendedChews", "fatShieldTip"]
            }
        }
    })
}

/// Pull `candidates[0].content.parts[0].text` out of a response envelope.
fn reply_text(envelope: &Value) -> Result<String, EstimatorError> {
    envelope
        .pointer("/candidates/0/content/parts/0/text")
        .and_then(Value::as_str)
        .map(str::to_owned)
        .ok_or_else(|| EstimatorError::Malformed("no text part in first candidate".into()))
}
