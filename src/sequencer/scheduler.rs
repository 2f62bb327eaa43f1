// Lookahead scheduler - Turns the step pattern into timestamped voices
//
// Ticks arrive from a coarse, jittery timer. Each tick schedules every step
// whose time falls inside a short window ahead of the audio clock, so the
// actual timing comes from the audio clock and not from the timer.

use super::pattern::Pattern;
use super::timeline::Meter;
use crate::audio::backend::VoiceSink;
use crate::synth::DrumKit;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Timing constants of the scheduler
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Interval between two ticks, in milliseconds
    pub tick_interval_ms: u64,
    /// How far ahead of the clock steps are scheduled, in seconds
    pub schedule_ahead: f64,
    /// Delay between start and the first step, in seconds
    pub start_delay: f64,
    /// Capacity of the queue between the scheduler and the audio thread
    pub queue_capacity: usize,
}

impl SchedulerConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms.max(1))
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 25,
            schedule_ahead: 0.12,
            start_delay: 0.05,
            queue_capacity: 256,
        }
    }
}

/// What one tick did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TickReport {
    /// Steps the cursor moved over
    pub steps: usize,
    /// Voices handed to the sink
    pub voices: usize,
}

/// Playback cursor plus the voice factory
///
/// Owns `current_step` and `next_event_time` exclusively. Pattern and meter
/// are passed in on every tick, never cached.
pub struct LookaheadScheduler {
    kit: DrumKit,
    schedule_ahead: f64,
    start_delay: f64,
    current_step: usize,
    next_event_time: f64,
}

impl LookaheadScheduler {
    pub fn new(kit: DrumKit, config: &SchedulerConfig) -> Self {
        Self {
            kit,
            schedule_ahead: config.schedule_ahead.max(0.0),
            start_delay: config.start_delay.max(0.0),
            current_step: 0,
            next_event_time: 0.0,
        }
    }

    /// Rewind to step 0 with the first step `start_delay` after `now`
    pub fn reset(&mut self, now: f64) {
        self.start_at(now + self.start_delay);
    }

    /// Rewind to step 0 with the first step exactly at `time`
    pub fn start_at(&mut self, time: f64) {
        self.current_step = 0;
        self.next_event_time = time;
    }

    /// Next step to be scheduled
    pub fn current_step(&self) -> usize {
        self.current_step
    }

    /// Audio clock time of the next step
    pub fn next_event_time(&self) -> f64 {
        self.next_event_time
    }

    /// Schedule every step that starts before `now + schedule_ahead`
    ///
    /// Loops until the window is covered, so a late tick catches up on all
    /// the steps it missed instead of dropping them.
    pub fn tick<S: VoiceSink + ?Sized>(
        &mut self,
        now: f64,
        pattern: &Pattern,
        meter: &Meter,
        sink: &mut S,
    ) -> TickReport {
        let mut report = TickReport::default();
        let steps_per_bar = pattern.steps_per_bar().max(1);
        let step_duration = meter.seconds_per_step();

        // A rebuilt pattern may be shorter than the cursor
        if self.current_step >= steps_per_bar {
            self.current_step = 0;
        }

        while self.next_event_time < now + self.schedule_ahead {
            for instrument in pattern.active_at(self.current_step) {
                sink.schedule(self.kit.trigger(instrument, self.next_event_time));
                report.voices += 1;
            }

            self.current_step = (self.current_step + 1) % steps_per_bar;
            self.next_event_time += step_duration;
            report.steps += 1;
        }

        if report.steps > 1 {
            log::debug!(
                "Tick at {:.3}s flushed {} steps ({} voices)",
                now,
                report.steps,
                report.voices
            );
        }

        report
    }
}
