//! Bite / chew / swallow / rest rhythm generator.
//!
//! The engine is driven by [`PacerEngine::advance`]: callers hand it the
//! current time in milliseconds and get back whatever happened since the
//! last call. Deadlines are scheduled from the instant they were due rather
//! than from when they were observed, so a late poll never stretches the
//! rhythm.

use serde::Serialize;

/// Time given to lift a bite before chewing starts.
pub const BITE_WINDOW_MS: u64 = 3_000;
/// One chew prompt every this many ms.
pub const CHEW_TICK_MS: u64 = 600;
pub const SWALLOW_WINDOW_MS: u64 = 2_000;
pub const REST_WINDOW_MS: u64 = 4_000;
/// Used when a target of zero is supplied.
pub const DEFAULT_TARGET_CHEWS: u32 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum PacerPhase {
    #[default]
    Prepare,
    Bite,
    Chew,
    Swallow,
    Rest,
}

impl PacerPhase {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Prepare => "Prepare",
            Self::Bite => "Bite",
            Self::Chew => "Chew",
            Self::Swallow => "Swallow",
            Self::Rest => "Rest",
        }
    }
}

impl std::fmt::Display for PacerPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Something observable the pacer did. `at_ms` is the scheduled instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum PacerEvent {
    PhaseChanged { phase: PacerPhase, at_ms: u64 },
    ChewCounted { count: u32, at_ms: u64 },
    /// Emitted exactly once per completed bite, before the switch to Swallow.
    BiteCompleted { cycle: u32, at_ms: u64 },
}

#[derive(Debug, Clone)]
pub struct PacerEngine {
    target_chews: u32,
    active: bool,
    phase: PacerPhase,
    chews: u32,
    due_ms: Option<u64>,
    cycles: u32,
}

impl Default for PacerEngine {
    fn default() -> Self {
        Self::new(DEFAULT_TARGET_CHEWS)
    }
}

impl PacerEngine {
    pub fn new(target_chews: u32) -> Self {
        Self {
            target_chews: normalize_target(target_chews),
            active: false,
            phase: PacerPhase::Prepare,
            chews: 0,
            due_ms: None,
            cycles: 0,
        }
    }

    pub fn phase(&self) -> PacerPhase {
        self.phase
    }
    /// Chews counted in the current bite.
    pub fn chew_count(&self) -> u32 {
        self.chews
    }
    pub fn target_chews(&self) -> u32 {
        self.target_chews
    }
    pub fn is_active(&self) -> bool {
        self.active
    }
    /// Bites completed since construction.
    pub fn cycles(&self) -> u32 {
        self.cycles
    }
    /// Next scheduled transition, if any.
    pub fn next_due_ms(&self) -> Option<u64> {
        self.due_ms
    }

    /// Start a fresh cycle at Bite. No-op when already running.
    pub fn activate(&mut self, now_ms: u64) -> Vec<PacerEvent> {
        if self.active {
            return Vec::new();
        }
        self.active = true;
        let mut out = Vec::with_capacity(1);
        self.begin_cycle(now_ms, &mut out);
        out
    }

    /// Stop and reset to Prepare. Pending deadlines are dropped.
    pub fn deactivate(&mut self, now_ms: u64) -> Vec<PacerEvent> {
        let was_running = self.active || self.phase != PacerPhase::Prepare;
        self.active = false;
        self.chews = 0;
        self.due_ms = None;
        if !was_running {
            return Vec::new();
        }
        self.phase = PacerPhase::Prepare;
        vec![PacerEvent::PhaseChanged {
            phase: PacerPhase::Prepare,
            at_ms: now_ms,
        }]
    }

    pub fn set_active(&mut self, active: bool, now_ms: u64) -> Vec<PacerEvent> {
        if active {
            self.activate(now_ms)
        } else {
            self.deactivate(now_ms)
        }
    }

    /// Change the per-bite target. A running pacer restarts from Bite.
    pub fn set_target_chews(&mut self, target: u32, now_ms: u64) -> Vec<PacerEvent> {
        let target = normalize_target(target);
        if target == self.target_chews {
            return Vec::new();
        }
        self.target_chews = target;
        let mut out = Vec::new();
        if self.active {
            self.begin_cycle(now_ms, &mut out);
        }
        out
    }

    /// Fire every deadline at or before `now_ms`, in order.
    pub fn advance(&mut self, now_ms: u64) -> Vec<PacerEvent> {
        let mut out = Vec::new();
        if !self.active {
            return out;
        }
        loop {
            match self.due_ms {
                Some(due) if due <= now_ms => self.fire(due, &mut out),
                _ => break,
            }
        }
        out
    }

    fn begin_cycle(&mut self, at_ms: u64, out: &mut Vec<PacerEvent>) {
        self.chews = 0;
        self.enter(PacerPhase::Bite, at_ms, BITE_WINDOW_MS, out);
    }

    fn enter(&mut self, phase: PacerPhase, at_ms: u64, window_ms: u64, out: &mut Vec<PacerEvent>) {
        self.phase = phase;
        self.due_ms = Some(at_ms.saturating_add(window_ms));
        out.push(PacerEvent::PhaseChanged { phase, at_ms });
    }

    fn fire(&mut self, at_ms: u64, out: &mut Vec<PacerEvent>) {
        match self.phase {
            PacerPhase::Bite => {
                self.chews = 0;
                self.enter(PacerPhase::Chew, at_ms, CHEW_TICK_MS, out);
            }
            PacerPhase::Chew => {
                self.chews += 1;
                out.push(PacerEvent::ChewCounted {
                    count: self.chews,
                    at_ms,
                });
                if self.chews >= self.target_chews {
                    self.cycles += 1;
                    tracing::debug!(cycle = self.cycles, chews = self.chews, "bite completed");
                    out.push(PacerEvent::BiteCompleted {
                        cycle: self.cycles,
                        at_ms,
                    });
                    self.enter(PacerPhase::Swallow, at_ms, SWALLOW_WINDOW_MS, out);
                } else {
                    self.due_ms = Some(at_ms.saturating_add(CHEW_TICK_MS));
                }
            }
            PacerPhase::Swallow => self.enter(PacerPhase::Rest, at_ms, REST_WINDOW_MS, out),
            PacerPhase::Rest => self.begin_cycle(at_ms, out),
            // Never scheduled while preparing; clear any stray deadline.
            PacerPhase::Prepare => self.due_ms = None,
        }
    }
}

fn normalize_target(target: u32) -> u32 {
    if target == 0 {
        DEFAULT_TARGET_CHEWS
    } else {
        target
    }
}

/// Length of one full Bite..Rest cycle for a given target.
pub fn cycle_length_ms(target_chews: u32) -> u64 {
    BITE_WINDOW_MS
        + u64::from(normalize_target(target_chews)) * CHEW_TICK_MS
        + SWALLOW_WINDOW_MS
        + REST_WINDOW_MS
}
