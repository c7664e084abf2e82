//! Read-only view of a session for the presentation layer.

use serde::Serialize;

use crate::analysis::FoodAnalysis;
use crate::meal::MealSession;
use crate::pacer::PacerPhase;
use crate::session::ViewState;

/// Everything a renderer needs, detached from the controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub view: ViewState,
    pub analysis: Option<FoodAnalysis>,
    pub meal: Option<MealSession>,
    /// `totalBites × averageChewsPerBite` once a meal is recorded.
    pub total_chews: Option<u64>,
    pub pacer_phase: PacerPhase,
    pub chew_count: u32,
    pub target_chews: u32,
    pub elapsed_secs: u64,
    /// `M:SS`
    pub elapsed_clock: String,
    pub bites_taken: u32,
    pub paused: bool,
    pub satiety_percent: u8,
    /// An estimation request is in flight.
    pub loading: bool,
    pub notice: Option<String>,
}
