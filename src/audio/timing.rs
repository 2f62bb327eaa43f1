// Audio timing - Sample-counting clock shared with the render side

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Audio clock derived from the number of frames rendered so far
///
/// The render side advances it after each buffer; any thread reads it.
#[derive(Clone)]
pub struct SampleClock {
    /// Current sample position (incremented by the render callback)
    sample_position: Arc<AtomicU64>,
    sample_rate: f64,
}

impl SampleClock {
    pub fn new(sample_rate: f32) -> Self {
        Self {
            sample_position: Arc::new(AtomicU64::new(0)),
            sample_rate: sample_rate as f64,
        }
    }

    /// Get current sample position
    pub fn current_sample(&self) -> u64 {
        self.sample_position.load(Ordering::Acquire)
    }

    /// Advance sample position (called from the render side)
    pub fn advance(&self, frames: usize) {
        self.sample_position
            .fetch_add(frames as u64, Ordering::Release);
    }

    /// Current clock time in seconds
    pub fn seconds(&self) -> f64 {
        self.samples_to_seconds(self.current_sample())
    }

    pub fn samples_to_seconds(&self, samples: u64) -> f64 {
        samples as f64 / self.sample_rate
    }

    pub fn seconds_to_samples(&self, seconds: f64) -> u64 {
        (seconds.max(0.0) * self.sample_rate).round() as u64
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate as f32
    }
}
