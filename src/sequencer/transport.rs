// Transport - Playback state shared with the scheduler thread

use super::scheduler::TickReport;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};

/// Transport state (play/stop)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransportState {
    #[default]
    Stopped,
    Playing,
}

impl TransportState {
    pub fn is_playing(&self) -> bool {
        matches!(self, TransportState::Playing)
    }
}

impl fmt::Display for TransportState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportState::Stopped => write!(f, "stopped"),
            TransportState::Playing => write!(f, "playing"),
        }
    }
}

/// Shared transport state
/// Thread-safe via atomics, written by the session and the scheduler thread
#[derive(Debug, Default)]
pub struct SharedTransportState {
    playing: AtomicBool,
    current_step: AtomicUsize,
    ticks: AtomicU64,
    steps_scheduled: AtomicU64,
    voices_scheduled: AtomicU64,
}

impl SharedTransportState {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Get current transport state
    pub fn state(&self) -> TransportState {
        if self.playing.load(Ordering::Acquire) {
            TransportState::Playing
        } else {
            TransportState::Stopped
        }
    }

    pub fn set_playing(&self, playing: bool) {
        self.playing.store(playing, Ordering::Release);
    }

    /// Next step the scheduler will emit
    pub fn current_step(&self) -> usize {
        self.current_step.load(Ordering::Relaxed)
    }

    pub fn set_current_step(&self, step: usize) {
        self.current_step.store(step, Ordering::Relaxed);
    }

    /// Publish the outcome of one tick
    pub fn record_tick(&self, current_step: usize, report: TickReport) {
        self.current_step.store(current_step, Ordering::Relaxed);
        self.ticks.fetch_add(1, Ordering::Relaxed);
        self.steps_scheduled
            .fetch_add(report.steps as u64, Ordering::Relaxed);
        self.voices_scheduled
            .fetch_add(report.voices as u64, Ordering::Relaxed);
    }

    /// Number of ticks run since creation
    pub fn ticks(&self) -> u64 {
        self.ticks.load(Ordering::Relaxed)
    }

    pub fn steps_scheduled(&self) -> u64 {
        self.steps_scheduled.load(Ordering::Relaxed)
    }

    pub fn voices_scheduled(&self) -> u64 {
        self.voices_scheduled.load(Ordering::Relaxed)
    }
}
