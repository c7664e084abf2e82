//! View-state machine for one meal: capture, prepare, eat, summarize.
//!
//! The controller is single-threaded and cooperative. User intents arrive
//! through [`SessionController::handle`]; timers (demo fallback, the elapsed
//! ticker, the pacer) fire from [`SessionController::poll`], which reads the
//! injected [`Clock`]. The estimation request may run on a worker thread
//! (see [`DispatchMode`]); its result is only ever applied from `poll`.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chew_traits::{Camera, Clock, Estimator, Facing, MonotonicClock};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::analysis::FoodAnalysis;
use crate::client::{AnalysisOutcome, FoodAnalysisClient};
use crate::error::{ChewError, Degradation};
use crate::meal::MealSession;
use crate::pacer::{DEFAULT_TARGET_CHEWS, PacerEngine, PacerEvent};
use crate::pending::PendingAnalysis;
use crate::snapshot::SessionSnapshot;
use crate::util::{DEMO_DELAY_MS, SECOND_MS, format_clock, satiety_percent};

/// Used for the summary when no analysis is present.
const FALLBACK_AVERAGE_CHEWS: u32 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum ViewState {
    #[default]
    Dashboard,
    CameraAnalysis,
    MealPrep,
    EatingSession,
    Summary,
}

impl ViewState {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Dashboard => "Dashboard",
            Self::CameraAnalysis => "CameraAnalysis",
            Self::MealPrep => "MealPrep",
            Self::EatingSession => "EatingSession",
            Self::Summary => "Summary",
        }
    }
}

impl std::fmt::Display for ViewState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the presentation layer can ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserIntent {
    StartCapture,
    CapturePhoto,
    ConfirmMealPrep,
    TogglePause,
    EndSession,
    ReturnToDashboard,
}

impl UserIntent {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::StartCapture => "StartCapture",
            Self::CapturePhoto => "CapturePhoto",
            Self::ConfirmMealPrep => "ConfirmMealPrep",
            Self::TogglePause => "TogglePause",
            Self::EndSession => "EndSession",
            Self::ReturnToDashboard => "ReturnToDashboard",
        }
    }
}

/// Where the estimation request runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DispatchMode {
    /// On the caller's thread, inside `handle(CapturePhoto)`.
    Inline,
    /// On a worker thread; the result is picked up by `poll`.
    #[default]
    Background,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum SessionEvent {
    ViewChanged {
        view: ViewState,
    },
    /// User-facing message about a degraded path.
    Notice {
        message: String,
    },
    AnalysisReady {
        analysis: FoodAnalysis,
        #[serde(skip_serializing_if = "Option::is_none")]
        degradation: Option<Degradation>,
    },
    Tick {
        elapsed_secs: u64,
    },
    Pacer {
        pacer: PacerEvent,
    },
    BiteCounted {
        bites_taken: u32,
    },
    Paused {
        paused: bool,
    },
    SessionEnded {
        meal: MealSession,
    },
}

#[derive(Debug)]
enum Capture {
    Idle,
    Streaming,
    Analyzing(PendingAnalysis),
    DemoCountdown {
        due_ms: u64,
    },
}

pub struct SessionController<C: Camera, E: Estimator> {
    camera: C,
    client: Arc<FoodAnalysisClient<E>>,
    clock: Arc<dyn Clock + Send + Sync>,
    epoch: Instant,
    dispatch: DispatchMode,
    prefer_rear: bool,

    view: ViewState,
    analysis: Option<FoodAnalysis>,
    meal: Option<MealSession>,
    degradation: Option<Degradation>,
    capture: Capture,

    elapsed_secs: u64,
    bites_taken: u32,
    paused: bool,
    next_tick_ms: Option<u64>,
    pacer: PacerEngine,
}

impl<C, E> SessionController<C, E>
where
    C: Camera,
    E: Estimator + Send + Sync + 'static,
{
    /// Controller on the wall clock with background estimation.
    pub fn new(camera: C, estimator: E) -> Self {
        let clock: Arc<dyn Clock + Send + Sync> = Arc::new(MonotonicClock::new());
        let epoch = clock.now();
        Self {
            camera,
            client: Arc::new(FoodAnalysisClient::new(estimator)),
            clock,
            epoch,
            dispatch: DispatchMode::default(),
            prefer_rear: true,
            view: ViewState::Dashboard,
            analysis: None,
            meal: None,
            degradation: None,
            capture: Capture::Idle,
            elapsed_secs: 0,
            bites_taken: 0,
            paused: false,
            next_tick_ms: None,
            pacer: PacerEngine::default(),
        }
    }

    /// Replace the time source. Resets the controller's epoch.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock + Send + Sync>) -> Self {
        self.epoch = clock.now();
        self.clock = clock;
        self
    }

    #[must_use]
    pub fn with_dispatch(mut self, dispatch: DispatchMode) -> Self {
        self.dispatch = dispatch;
        self
    }

    #[must_use]
    pub fn with_prefer_rear(mut self, prefer_rear: bool) -> Self {
        self.prefer_rear = prefer_rear;
        self
    }

    pub fn view(&self) -> ViewState {
        self.view
    }
    pub fn analysis(&self) -> Option<&FoodAnalysis> {
        self.analysis.as_ref()
    }
    pub fn meal(&self) -> Option<&MealSession> {
        self.meal.as_ref()
    }
    pub fn degradation(&self) -> Option<&Degradation> {
        self.degradation.as_ref()
    }
    pub fn elapsed_secs(&self) -> u64 {
        self.elapsed_secs
    }
    pub fn bites_taken(&self) -> u32 {
        self.bites_taken
    }
    pub fn is_paused(&self) -> bool {
        self.paused
    }
    pub fn pacer(&self) -> &PacerEngine {
        &self.pacer
    }
    pub fn camera(&self) -> &C {
        &self.camera
    }

    /// An estimation is in flight or the demo fallback is counting down.
    pub fn is_busy(&self) -> bool {
        matches!(
            self.capture,
            Capture::Analyzing(_) | Capture::DemoCountdown { .. }
        )
    }

    fn now_ms(&self) -> u64 {
        self.clock.ms_since(self.epoch)
    }

    /// Apply one user intent.
    ///
    /// Rejected intents return an error and leave every piece of state as
    /// it was.
    pub fn handle(&mut self, intent: UserIntent) -> Result<Vec<SessionEvent>, ChewError> {
        use UserIntent as I;
        use ViewState as V;

        let now = self.now_ms();
        tracing::debug!(intent = intent.as_str(), view = self.view.as_str(), now_ms = now, "intent");

        match (self.view, intent) {
            (V::Dashboard, I::StartCapture) => Ok(self.start_capture(now)),
            (V::CameraAnalysis, I::CapturePhoto) => match self.capture {
                Capture::Analyzing(_) => Err(ChewError::Busy("analysis in progress")),
                Capture::DemoCountdown { .. } => Err(ChewError::Busy("demo fallback pending")),
                Capture::Idle | Capture::Streaming => Ok(self.capture_photo(now)),
            },
            (V::MealPrep, I::ConfirmMealPrep) => Ok(self.start_eating(now)),
            (V::EatingSession, I::TogglePause) => {
                let mut out = self.run_session_timers(now);
                out.extend(self.toggle_pause(now));
                Ok(out)
            }
            (V::EatingSession, I::EndSession) => {
                let mut out = self.run_session_timers(now);
                out.extend(self.end_session(now));
                Ok(out)
            }
            (V::CameraAnalysis | V::MealPrep | V::Summary, I::ReturnToDashboard) => {
                Ok(self.return_to_dashboard(now))
            }
            (view, intent) => {
                tracing::debug!(intent = intent.as_str(), view = view.as_str(), "rejected intent");
                Err(ChewError::InvalidTransition {
                    intent: intent.as_str(),
                    view: view.as_str(),
                })
            }
        }
    }

    /// Fire every timer due at the current clock reading.
    pub fn poll(&mut self) -> Vec<SessionEvent> {
        let now = self.now_ms();
        let mut out = self.poll_capture(now);
        out.extend(self.run_session_timers(now));
        out
    }

    /// Block up to `timeout` for an in-flight background estimation, then poll.
    pub fn wait_for_analysis(&mut self, timeout: Duration) -> Vec<SessionEvent> {
        let outcome = match &self.capture {
            Capture::Analyzing(pending) => pending.wait(timeout),
            _ => None,
        };
        let mut out = Vec::new();
        if let Some(outcome) = outcome {
            self.capture = Capture::Idle;
            out.extend(self.finish_analysis(outcome));
        }
        out.extend(self.poll());
        out
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            view: self.view,
            analysis: self.analysis.clone(),
            meal: self.meal.clone(),
            total_chews: self.meal.as_ref().map(MealSession::total_chews),
            pacer_phase: self.pacer.phase(),
            chew_count: self.pacer.chew_count(),
            target_chews: self.pacer.target_chews(),
            elapsed_secs: self.elapsed_secs,
            elapsed_clock: format_clock(self.elapsed_secs),
            bites_taken: self.bites_taken,
            paused: self.paused,
            satiety_percent: satiety_percent(self.elapsed_secs),
            loading: matches!(self.capture, Capture::Analyzing(_)),
            notice: self.degradation.as_ref().map(Degradation::user_message),
        }
    }

    fn set_view(&mut self, view: ViewState, out: &mut Vec<SessionEvent>) {
        if self.view != view {
            tracing::info!(from = self.view.as_str(), to = view.as_str(), "view changed");
            self.view = view;
            out.push(SessionEvent::ViewChanged { view });
        }
    }

    fn start_capture(&mut self, now: u64) -> Vec<SessionEvent> {
        let mut out = Vec::new();
        self.analysis = None;
        self.meal = None;
        self.degradation = None;
        self.set_view(ViewState::CameraAnalysis, &mut out);

        match self.open_camera() {
            Ok(()) => self.capture = Capture::Streaming,
            Err(e) => {
                tracing::warn!(error = %e, "camera unavailable; demo analysis scheduled");
                self.enter_demo_countdown(now, &mut out);
            }
        }
        out
    }

    fn open_camera(&mut self) -> Result<(), chew_traits::BoxError> {
        if self.prefer_rear {
            match self.camera.open(Facing::Rear) {
                Ok(()) => return Ok(()),
                Err(e) => tracing::debug!(error = %e, "rear camera unavailable, trying any"),
            }
        }
        self.camera.open(Facing::Any)
    }

    fn enter_demo_countdown(&mut self, now: u64, out: &mut Vec<SessionEvent>) {
        self.camera.release();
        let reason = Degradation::CameraUnavailable;
        out.push(SessionEvent::Notice {
            message: reason.user_message(),
        });
        self.degradation = Some(reason);
        self.capture = Capture::DemoCountdown {
            due_ms: now.saturating_add(DEMO_DELAY_MS),
        };
    }

    fn capture_photo(&mut self, now: u64) -> Vec<SessionEvent> {
        let mut out = Vec::new();
        let frame = self.camera.capture_jpeg();
        self.camera.release();
        let jpeg = match frame {
            Ok(jpeg) => jpeg,
            Err(e) => {
                tracing::warn!(error = %e, "capture failed; demo analysis scheduled");
                self.enter_demo_countdown(now, &mut out);
                return out;
            }
        };
        tracing::info!(bytes = jpeg.len(), dispatch = ?self.dispatch, "frame captured");

        match self.dispatch {
            DispatchMode::Inline => {
                self.capture = Capture::Idle;
                let outcome = self.client.analyze_jpeg(&jpeg);
                out.extend(self.finish_analysis(outcome));
            }
            DispatchMode::Background => {
                self.capture =
                    Capture::Analyzing(PendingAnalysis::spawn(Arc::clone(&self.client), jpeg, now));
            }
        }
        out
    }

    fn poll_capture(&mut self, now: u64) -> Vec<SessionEvent> {
        let ready = match &self.capture {
            Capture::Analyzing(pending) => pending.try_take(),
            Capture::DemoCountdown { due_ms } if *due_ms <= now => Some(AnalysisOutcome::demo()),
            _ => None,
        };
        match ready {
            Some(outcome) => {
                self.capture = Capture::Idle;
                self.finish_analysis(outcome)
            }
            None => Vec::new(),
        }
    }

    fn finish_analysis(&mut self, outcome: AnalysisOutcome) -> Vec<SessionEvent> {
        let mut out = Vec::new();
        if let Some(reason) = &outcome.degradation {
            // CameraUnavailable was already announced when the countdown began.
            if *reason != Degradation::CameraUnavailable {
                out.push(SessionEvent::Notice {
                    message: reason.user_message(),
                });
            }
        }
        self.degradation = outcome.degradation.clone();
        self.analysis = Some(outcome.analysis.clone());
        out.push(SessionEvent::AnalysisReady {
            analysis: outcome.analysis,
            degradation: outcome.degradation,
        });
        self.set_view(ViewState::MealPrep, &mut out);
        out
    }

    fn start_eating(&mut self, now: u64) -> Vec<SessionEvent> {
        let mut out = Vec::new();
        let target = self
            .analysis
            .as_ref()
            .map_or(DEFAULT_TARGET_CHEWS, FoodAnalysis::target_chews);
        self.meal = None;
        self.elapsed_secs = 0;
        self.bites_taken = 0;
        self.paused = false;
        self.next_tick_ms = Some(now.saturating_add(SECOND_MS));
        self.pacer = PacerEngine::new(target);
        self.set_view(ViewState::EatingSession, &mut out);
        tracing::info!(target_chews = target, "eating session started");
        out.extend(self.pacer.activate(now).into_iter().map(pacer_event));
        out
    }

    /// Elapsed-seconds ticker and pacer, only while eating and unpaused.
    fn run_session_timers(&mut self, now: u64) -> Vec<SessionEvent> {
        let mut out = Vec::new();
        if self.view != ViewState::EatingSession || self.paused {
            return out;
        }
        // Fire the two timers in deadline order; ticks go first on a tie.
        loop {
            let tick_due = self.next_tick_ms.filter(|&due| due <= now);
            let pacer_due = self
                .pacer
                .next_due_ms()
                .filter(|&due| due <= now && self.pacer.is_active());
            match (tick_due, pacer_due) {
                (None, None) => break,
                (Some(tick), Some(step)) if step < tick => self.fire_pacer(step, &mut out),
                (Some(tick), _) => self.fire_tick(tick, &mut out),
                (None, Some(step)) => self.fire_pacer(step, &mut out),
            }
        }
        out
    }

    fn fire_tick(&mut self, due: u64, out: &mut Vec<SessionEvent>) {
        self.elapsed_secs += 1;
        self.next_tick_ms = Some(due.saturating_add(SECOND_MS));
        out.push(SessionEvent::Tick {
            elapsed_secs: self.elapsed_secs,
        });
    }

    fn fire_pacer(&mut self, due: u64, out: &mut Vec<SessionEvent>) {
        for ev in self.pacer.advance(due) {
            out.push(pacer_event(ev));
            if matches!(ev, PacerEvent::BiteCompleted { .. }) {
                self.bites_taken += 1;
                out.push(SessionEvent::BiteCounted {
                    bites_taken: self.bites_taken,
                });
            }
        }
    }

    fn toggle_pause(&mut self, now: u64) -> Vec<SessionEvent> {
        self.paused = !self.paused;
        let mut out = vec![SessionEvent::Paused {
            paused: self.paused,
        }];
        if self.paused {
            self.next_tick_ms = None;
            out.extend(self.pacer.deactivate(now).into_iter().map(pacer_event));
        } else {
            self.next_tick_ms = Some(now.saturating_add(SECOND_MS));
            out.extend(self.pacer.activate(now).into_iter().map(pacer_event));
        }
        tracing::info!(paused = self.paused, elapsed_secs = self.elapsed_secs, "pause toggled");
        out
    }

    fn end_session(&mut self, now: u64) -> Vec<SessionEvent> {
        let average = if self.analysis.is_some() {
            self.pacer.target_chews()
        } else {
            FALLBACK_AVERAGE_CHEWS
        };
        let meal = MealSession {
            duration_seconds: self.elapsed_secs,
            total_bites: self.bites_taken,
            average_chews_per_bite: average,
            timestamp: wall_time(self.clock.unix_ms()),
        };
        tracing::info!(
            duration_secs = meal.duration_seconds,
            bites = meal.total_bites,
            total_chews = meal.total_chews(),
            "eating session ended"
        );
        self.meal = Some(meal.clone());
        self.next_tick_ms = None;
        self.paused = false;

        let mut out: Vec<SessionEvent> =
            self.pacer.deactivate(now).into_iter().map(pacer_event).collect();
        out.push(SessionEvent::SessionEnded { meal });
        self.set_view(ViewState::Summary, &mut out);
        out
    }

    fn return_to_dashboard(&mut self, now: u64) -> Vec<SessionEvent> {
        let mut out = Vec::new();
        if self.is_busy() {
            tracing::info!("pending capture abandoned");
        }
        // Dropping a pending analysis cancels it.
        self.capture = Capture::Idle;
        self.camera.release();
        self.analysis = None;
        self.meal = None;
        self.degradation = None;
        self.next_tick_ms = None;
        self.paused = false;
        out.extend(self.pacer.deactivate(now).into_iter().map(pacer_event));
        self.set_view(ViewState::Dashboard, &mut out);
        out
    }
}

fn wall_time(unix_ms: u64) -> DateTime<Utc> {
    i64::try_from(unix_ms)
        .ok()
        .and_then(DateTime::from_timestamp_millis)
        .unwrap_or_default()
}

fn pacer_event(pacer: PacerEvent) -> SessionEvent {
    SessionEvent::Pacer { pacer }
}

impl<C: Camera, E: Estimator> Drop for SessionController<C, E> {
    fn drop(&mut self) {
        if self.camera.is_open() {
            tracing::debug!("releasing camera on controller drop");
        }
        self.camera.release();
    }
}

