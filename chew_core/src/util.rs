//! Small time helpers shared by the session controller and the UI.

pub const SECOND_MS: u64 = 1_000;
/// Delay before the demonstration analysis replaces a failed camera.
pub const DEMO_DELAY_MS: u64 = 1_500;
/// Minutes-to-fullness reference the satiety bar fills towards.
pub const SATIETY_GOAL_SECS: u64 = 20 * 60;

/// `M:SS`, minutes unpadded and unbounded.
pub fn format_clock(secs: u64) -> String {
    format!("{}:{:02}", secs / 60, secs % 60)
}

/// Share of the satiety goal reached, floored and capped at 100.
pub fn satiety_percent(elapsed_secs: u64) -> u8 {
    let pct = (elapsed_secs.saturating_mul(100) / SATIETY_GOAL_SECS).min(100);
    u8::try_from(pct).unwrap_or(100)
}
