#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Slow-eating engine (device- and network-agnostic).
//!
//! All device and service access goes through the `chew_traits::Camera`,
//! `chew_traits::Estimator` and `chew_traits::Clock` seams.
//!
//! ## Architecture
//!
//! - **Analysis**: normalized food assessment and its fallbacks (`analysis`, `client`)
//! - **Pacer**: bite / chew / swallow / rest rhythm as a pure state machine (`pacer`)
//! - **Session**: view-state machine, counters and meal summary (`session`, `meal`)
//! - **Estimation**: background request worker (`pending`) and the hosted
//!   model backend (`gemini`, behind the default `gemini` feature)
//!
//! ## Time
//!
//! Nothing here sleeps. The pacer and the session take the current time in
//! milliseconds since the controller's epoch and fire whatever is due, so a
//! virtual clock drives them deterministically.

pub mod analysis;
pub mod client;
pub mod degrade;
pub mod error;
#[cfg(feature = "gemini")]
pub mod gemini;
pub mod meal;
pub mod mocks;
pub mod pacer;
pub mod pending;
pub mod session;
pub mod snapshot;
pub mod util;

pub use analysis::{FoodAnalysis, TextureLevel};
pub use client::{AnalysisOutcome, FoodAnalysisClient};
pub use error::{ChewError, Degradation, Report, Result};
pub use meal::MealSession;
pub use pacer::{PacerEngine, PacerEvent, PacerPhase};
pub use session::{DispatchMode, SessionController, SessionEvent, UserIntent, ViewState};
pub use snapshot::SessionSnapshot;
