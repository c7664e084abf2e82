//! Background estimation task.
//!
//! One thread per capture runs the (blocking) estimation request and hands
//! the outcome back over a bounded channel. Dropping the handle cancels it:
//! the outcome is discarded and never reaches the session. The worker is
//! detached rather than joined because a request can block for the whole
//! HTTP timeout.
use crossbeam_channel as xch;
use chew_traits::Estimator;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crate::client::{AnalysisOutcome, FoodAnalysisClient};
use crate::error::Degradation;

pub struct PendingAnalysis {
    rx: xch::Receiver<AnalysisOutcome>,
    cancelled: Arc<AtomicBool>,
    join_handle: Option<std::thread::JoinHandle<()>>,
    started_ms: u64,
}

impl std::fmt::Debug for PendingAnalysis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingAnalysis")
            .field("started_ms", &self.started_ms)
            .field("cancelled", &self.cancelled.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

impl PendingAnalysis {
    pub fn spawn<E>(client: Arc<FoodAnalysisClient<E>>, jpeg: Vec<u8>, started_ms: u64) -> Self
    where
        E: Estimator + Send + Sync + 'static,
    {
        let (tx, rx) = xch::bounded(1);
        let cancelled = Arc::new(AtomicBool::new(false));
        let cancelled_clone = cancelled.clone();

        let join_handle = std::thread::spawn(move || {
            let outcome = client.analyze_jpeg(&jpeg);
            if cancelled_clone.load(Ordering::Relaxed) {
                tracing::debug!("estimation finished after cancel; discarding");
                return;
            }
            if tx.send(outcome).is_err() {
                tracing::debug!("estimation consumer gone, exiting thread");
            }
        });

        Self {
            rx,
            cancelled,
            join_handle: Some(join_handle),
            started_ms,
        }
    }

    /// When the capture was taken, in session-clock ms.
    pub fn started_ms(&self) -> u64 {
        self.started_ms
    }

    /// Non-blocking check for the outcome.
    ///
    /// A worker that died without reporting (panic) yields a transport
    /// fallback so the session is never stuck analyzing.
    pub fn try_take(&self) -> Option<AnalysisOutcome> {
        match self.rx.try_recv() {
            Ok(outcome) => Some(outcome),
            Err(xch::TryRecvError::Empty) => None,
            Err(xch::TryRecvError::Disconnected) => Some(worker_lost()),
        }
    }

    /// Block up to `timeout` for the outcome.
    pub fn wait(&self, timeout: Duration) -> Option<AnalysisOutcome> {
        match self.rx.recv_timeout(timeout) {
            Ok(outcome) => Some(outcome),
            Err(xch::RecvTimeoutError::Timeout) => None,
            Err(xch::RecvTimeoutError::Disconnected) => Some(worker_lost()),
        }
    }
}

fn worker_lost() -> AnalysisOutcome {
    tracing::warn!("estimation worker exited without a result");
    AnalysisOutcome::degraded(Degradation::Transport {
        message: "estimation worker exited".to_string(),
    })
}

impl Drop for PendingAnalysis {
    fn drop(&mut self) {
        self.cancelled.store(true, Ordering::Relaxed);
        if let Some(handle) = self.join_handle.take() {
            if handle.is_finished() && handle.join().is_err() {
                tracing::warn!("estimation thread panicked");
            }
        }
        // An unfinished worker is left detached; its send fails once `rx` is gone.
    }
}
