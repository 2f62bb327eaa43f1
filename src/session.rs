// Session - One drum machine: pattern, meter, mix, transport and output
//
// The editing surface owns a `DrumSession` and calls into it; the scheduler
// thread only sees shared handles (pattern mutex, atomics, event port).

use crate::audio::AudioError;
use crate::audio::backend::{AudioClock, OutputDevice};
use crate::audio::mixer::{Bus, MixBus};
use crate::config::DrumConfig;
use crate::sequencer::{
    Instrument, LookaheadScheduler, Meter, Pattern, PlaybackContext, PlaybackThread,
    SchedulerConfig, SharedMeter, SharedTransportState, Subdivision, Tempo, TimeSignature,
    TransportState,
};
use crate::synth::DrumKit;
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Audio device error: {0}")]
    Device(#[from] AudioError),

    #[error("Failed to spawn scheduler thread: {0}")]
    SchedulerThread(#[from] std::io::Error),
}

pub struct DrumSession<D: OutputDevice> {
    device: D,
    pattern: Arc<Mutex<Pattern>>,
    meter: SharedMeter,
    mix: MixBus,
    transport: Arc<SharedTransportState>,
    scheduler_config: SchedulerConfig,
    playback: Option<PlaybackThread>,
}

impl<D: OutputDevice> DrumSession<D> {
    /// Session at the default meter with the rock preset loaded
    pub fn new(device: D) -> Self {
        Self::with_config(device, &DrumConfig::default())
    }

    pub fn with_config(device: D, config: &DrumConfig) -> Self {
        let meter = config.meter.meter();
        let mut pattern = Pattern::new(meter.steps_per_bar());
        pattern.apply_preset(
            meter.steps_per_bar(),
            meter.time_signature.numerator(),
            meter.subdivision.steps_per_beat(),
        );

        Self {
            device,
            pattern: Arc::new(Mutex::new(pattern)),
            meter: SharedMeter::new(meter),
            mix: config.volumes.mix_bus(),
            transport: SharedTransportState::new(),
            scheduler_config: config.scheduler.clone(),
            playback: None,
        }
    }

    // ---- transport ----

    /// Resume the output and start ticking
    ///
    /// No-op while playing. On a device error the session stays stopped.
    pub fn start(&mut self) -> Result<(), SessionError> {
        if self.playback.is_some() {
            return Ok(());
        }

        let port = self.device.resume(&self.mix)?;

        let mut scheduler = LookaheadScheduler::new(
            DrumKit::new(port.sample_rate()),
            &self.scheduler_config,
        );
        scheduler.reset(port.current_time());
        self.transport.set_current_step(0);

        let context = PlaybackContext {
            pattern: Arc::clone(&self.pattern),
            meter: self.meter.clone(),
            transport: Arc::clone(&self.transport),
            interval: self.scheduler_config.tick_interval(),
        };
        let thread = PlaybackThread::spawn(scheduler, port, context)?;

        self.playback = Some(thread);
        self.transport.set_playing(true);
        log::info!("Transport playing ({})", self.meter.meter());
        Ok(())
    }

    /// Stop ticking; voices already handed to the device play out
    ///
    /// No-op while stopped.
    pub fn stop(&mut self) {
        if let Some(mut thread) = self.playback.take() {
            thread.stop();
            self.transport.set_playing(false);
            log::info!("Transport stopped");
        }
    }

    pub fn state(&self) -> TransportState {
        self.transport.state()
    }

    pub fn is_playing(&self) -> bool {
        self.state().is_playing()
    }

    /// Next step the scheduler will emit
    pub fn current_step(&self) -> usize {
        self.transport.current_step()
    }

    pub fn transport(&self) -> &Arc<SharedTransportState> {
        &self.transport
    }

    // ---- pattern ----

    fn pattern_guard(&self) -> MutexGuard<'_, Pattern> {
        match self.pattern.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Copy of the current pattern
    pub fn pattern(&self) -> Pattern {
        self.pattern_guard().clone()
    }

    /// Flip one step and return its new state
    ///
    /// # Panics
    /// If `index` is outside the current bar.
    pub fn toggle_step(&self, instrument: Instrument, index: usize) -> bool {
        self.pattern_guard().toggle(instrument, index)
    }

    pub fn set_step(&self, instrument: Instrument, index: usize, active: bool) {
        self.pattern_guard().set(instrument, index, active);
    }

    /// Resize the pattern to the current meter, every step off
    pub fn rebuild_for_meter(&self) {
        let steps = self.meter.meter().steps_per_bar();
        self.pattern_guard().rebuild(steps);
    }

    /// Every step off
    pub fn clear_pattern(&self) {
        self.rebuild_for_meter();
    }

    /// Back to 110 BPM and the rock backbeat for the current meter
    pub fn apply_preset(&self) {
        self.meter.set_tempo(Tempo::default());
        let meter = self.meter.meter();
        self.pattern_guard().apply_preset(
            meter.steps_per_bar(),
            meter.time_signature.numerator(),
            meter.subdivision.steps_per_beat(),
        );
    }

    // ---- meter ----

    pub fn meter(&self) -> Meter {
        self.meter.meter()
    }

    /// Takes effect from the next scheduled step
    pub fn set_tempo(&self, tempo: Tempo) {
        self.meter.set_tempo(tempo);
    }

    /// Change time signature and subdivision; the pattern is rebuilt empty
    pub fn set_meter(&self, time_signature: TimeSignature, subdivision: Subdivision) {
        self.meter.set_time_signature(time_signature);
        self.meter.set_subdivision(subdivision);
        self.rebuild_for_meter();
    }

    // ---- mix ----

    pub fn set_volume(&self, bus: Bus, volume: f32) {
        self.mix.set_volume(bus, volume);
    }

    pub fn volume(&self, bus: Bus) -> f32 {
        self.mix.volume(bus)
    }

    pub fn mix(&self) -> &MixBus {
        &self.mix
    }

    // ---- device ----

    pub fn device(&self) -> &D {
        &self.device
    }

    pub fn device_mut(&mut self) -> &mut D {
        &mut self.device
    }
}

impl<D: OutputDevice> Drop for DrumSession<D> {
    fn drop(&mut self) {
        self.stop();
    }
}
