#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Plain-text rendering of a session snapshot.
//!
//! Stateless: everything comes from [`SessionSnapshot`]; nothing here talks
//! to the controller.

use std::fmt::Write as _;

use chew_core::pacer::PacerPhase;
use chew_core::session::ViewState;
use chew_core::snapshot::SessionSnapshot;

const BAR_WIDTH: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Light {
    Green,
    Red,
    Amber,
    Grey,
}

impl Light {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Green => "green",
            Self::Red => "red",
            Self::Amber => "amber",
            Self::Grey => "grey",
        }
    }
}

/// How one pacer phase is shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacerVisual {
    pub status: &'static str,
    pub instruction: &'static str,
    pub light: Light,
}

pub const fn pacer_visual(phase: PacerPhase) -> PacerVisual {
    match phase {
        PacerPhase::Bite => PacerVisual {
            status: "SAFE ZONE",
            instruction: "Take one bite",
            light: Light::Green,
        },
        PacerPhase::Chew => PacerVisual {
            status: "WARNING: CHEWING",
            instruction: "Red light: do not swallow, keep chewing",
            light: Light::Red,
        },
        PacerPhase::Swallow => PacerVisual {
            status: "CLEARED",
            instruction: "Green light: you may swallow",
            light: Light::Green,
        },
        PacerPhase::Rest => PacerVisual {
            status: "SIGNAL IN TRANSIT",
            instruction: "Put the cutlery down and notice how full you feel",
            light: Light::Amber,
        },
        PacerPhase::Prepare => PacerVisual {
            status: "READY",
            instruction: "Get ready",
            light: Light::Grey,
        },
    }
}

/// Render the current view.
pub fn render(snap: &SessionSnapshot) -> String {
    let mut out = String::new();
    match snap.view {
        ViewState::Dashboard => render_dashboard(&mut out),
        ViewState::CameraAnalysis => render_camera(snap, &mut out),
        ViewState::MealPrep => render_meal_prep(snap, &mut out),
        ViewState::EatingSession => render_eating(snap, &mut out),
        ViewState::Summary => render_summary(snap, &mut out),
    }
    out
}

fn render_dashboard(out: &mut String) {
    let _ = writeln!(out, "== SlimChew ==");
    let _ = writeln!(out, "More chewing, less eating. Photograph your meal to begin.");
    let _ = writeln!(out, "[start] activate the fat shield");
}

fn render_camera(snap: &SessionSnapshot, out: &mut String) {
    let _ = writeln!(out, "== Scan your meal ==");
    if snap.loading {
        let _ = writeln!(out, "AI is scanning calories and texture...");
    } else if let Some(notice) = &snap.notice {
        let _ = writeln!(out, "! {notice}");
    } else {
        let _ = writeln!(out, "[snap] capture the plate");
    }
}

fn render_meal_prep(snap: &SessionSnapshot, out: &mut String) {
    let _ = writeln!(out, "== Fat shield armed ==");
    if let Some(a) = &snap.analysis {
        let _ = writeln!(out, "Target:        {}", a.food_name);
        let _ = writeln!(out, "Calories:      {} kcal", a.calories);
        let _ = writeln!(out, "Texture:       {}", a.texture_level);
        let _ = writeln!(out, "Chews / bite:  {}", a.recommended_chews);
        let _ = writeln!(out, "Tip:           {}", a.fat_shield_tip);
    }
    if let Some(notice) = &snap.notice {
        let _ = writeln!(out, "! {notice}");
    }
    let _ = writeln!(out, "[go] start eating");
}

fn render_eating(snap: &SessionSnapshot, out: &mut String) {
    let visual = pacer_visual(snap.pacer_phase);
    let _ = writeln!(
        out,
        "Satiety signal {} {}%",
        bar(snap.satiety_percent),
        snap.satiety_percent
    );
    let _ = writeln!(out, "({}) {}", visual.light.as_str(), visual.status);
    let _ = writeln!(out, "{}", visual.instruction);
    if snap.pacer_phase == PacerPhase::Chew {
        let _ = writeln!(out, "{} / {}", snap.chew_count, snap.target_chews);
    }
    let _ = writeln!(
        out,
        "Time {}  Bites {}{}",
        snap.elapsed_clock,
        snap.bites_taken,
        if snap.paused { "  [paused]" } else { "" }
    );
}

fn render_summary(snap: &SessionSnapshot, out: &mut String) {
    let _ = writeln!(out, "== Shield held ==");
    if let Some(meal) = &snap.meal {
        let _ = writeln!(out, "Chews this meal: {}", snap.total_chews.unwrap_or_default());
        let _ = writeln!(
            out,
            "Meal duration:   {}",
            chew_core::util::format_clock(meal.duration_seconds)
        );
    }
    let _ = writeln!(out, "[home] back to dashboard");
}

fn bar(percent: u8) -> String {
    let filled = usize::from(percent.min(100)) * BAR_WIDTH / 100;
    format!("[{}{}]", "#".repeat(filled), ".".repeat(BAR_WIDTH - filled))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bar_is_fixed_width() {
        assert_eq!(bar(0), format!("[{}]", ".".repeat(BAR_WIDTH)));
        assert_eq!(bar(50).matches('#').count(), BAR_WIDTH / 2);
        assert_eq!(bar(100), format!("[{}]", "#".repeat(BAR_WIDTH)));
    }

    #[test]
    fn chewing_is_red_and_rest_is_amber() {
        assert_eq!(pacer_visual(PacerPhase::Chew).light, Light::Red);
        assert_eq!(pacer_visual(PacerPhase::Rest).light, Light::Amber);
        assert_eq!(pacer_visual(PacerPhase::Prepare).light, Light::Grey);
    }
}
