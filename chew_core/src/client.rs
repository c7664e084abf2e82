//! Turns a photo into a [`FoodAnalysis`], never failing.
//!
//! Any estimator error or unreadable reply is logged and replaced by
//! [`FoodAnalysis::fallback`]; the reason rides along in
//! [`AnalysisOutcome::degradation`].

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use chew_traits::Estimator;
use serde::Serialize;

use crate::analysis::FoodAnalysis;
use crate::degrade::classify_estimator_error;
use crate::error::Degradation;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisOutcome {
    pub analysis: FoodAnalysis,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub degradation: Option<Degradation>,
}

impl AnalysisOutcome {
    pub fn estimated(analysis: FoodAnalysis) -> Self {
        Self {
            analysis,
            degradation: None,
        }
    }

    pub fn degraded(reason: Degradation) -> Self {
        Self {
            analysis: FoodAnalysis::fallback(),
            degradation: Some(reason),
        }
    }

    pub fn demo() -> Self {
        Self {
            analysis: FoodAnalysis::demo(),
            degradation: Some(Degradation::CameraUnavailable),
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.degradation.is_some()
    }
}

#[derive(Debug)]
pub struct FoodAnalysisClient<E> {
    estimator: E,
}

impl<E: Estimator> FoodAnalysisClient<E> {
    pub fn new(estimator: E) -> Self {
        Self { estimator }
    }

    pub fn estimator(&self) -> &E {
        &self.estimator
    }

    pub fn analyze_jpeg(&self, jpeg: &[u8]) -> AnalysisOutcome {
        self.analyze_base64(&STANDARD.encode(jpeg))
    }

    pub fn analyze_base64(&self, image_base64: &str) -> AnalysisOutcome {
        let reply = match self.estimator.estimate(image_base64) {
            Ok(text) => text,
            Err(e) => {
                let reason = classify_estimator_error(&*e);
                tracing::warn!(error = %e, ?reason, "food estimation failed; using fallback");
                return AnalysisOutcome::degraded(reason);
            }
        };
        match FoodAnalysis::from_reply(&reply) {
            Ok(analysis) => {
                tracing::info!(
                    food = %analysis.food_name,
                    calories = analysis.calories,
                    texture = %analysis.texture_level,
                    chews = analysis.recommended_chews,
                    "food estimated"
                );
                AnalysisOutcome::estimated(analysis)
            }
            Err(e) => {
                tracing::warn!(error = %e, reply_len = reply.len(), "unreadable estimation reply; using fallback");
                AnalysisOutcome::degraded(Degradation::Malformed {
                    message: e.to_string(),
                })
            }
        }
    }
}
