// Audio facade - Clock, event submission and output sink
//
// The scheduler never talks to cpal directly: it reads the clock and submits
// voice events through these traits, so the same code drives a sound card or
// an offline render.

use super::AudioError;
use super::mixer::MixBus;
use super::timing::SampleClock;
use crate::messaging::channels::{CommandProducer, RecycleConsumer};
use crate::messaging::command::{Command, Recycled};
use crate::synth::VoiceEvent;
use ringbuf::traits::{Consumer, Producer};
use std::sync::{Arc, Mutex};

/// Monotonic audio clock, in seconds
pub trait AudioClock {
    fn current_time(&self) -> f64;
}

/// Receiver of scheduled voices
pub trait VoiceSink {
    fn schedule(&mut self, event: VoiceEvent);
}

/// Collects events instead of playing them
impl VoiceSink for Vec<VoiceEvent> {
    fn schedule(&mut self, event: VoiceEvent) {
        self.push(event);
    }
}

/// Output sink that can be created lazily and resumed
pub trait OutputDevice {
    /// First call builds the sink, later calls only resume it
    fn resume(&mut self, mix: &MixBus) -> Result<EventPort, AudioError>;
}

/// Scheduling-side handle on a running output
///
/// Cheap to clone and `Send`, so it can move to the ticker thread while the
/// device itself stays with its owner.
#[derive(Clone)]
pub struct EventPort {
    commands: Arc<Mutex<CommandProducer>>,
    recycled: Arc<Mutex<RecycleConsumer>>,
    clock: SampleClock,
}

impl EventPort {
    pub fn new(commands: CommandProducer, recycled: RecycleConsumer, clock: SampleClock) -> Self {
        Self {
            commands: Arc::new(Mutex::new(commands)),
            recycled: Arc::new(Mutex::new(recycled)),
            clock,
        }
    }

    pub fn sample_rate(&self) -> f32 {
        self.clock.sample_rate()
    }

    pub fn clock(&self) -> &SampleClock {
        &self.clock
    }

    /// Free the buffers the render side is done with
    fn collect_garbage(&self) {
        if let Ok(mut rx) = self.recycled.lock() {
            while let Some(item) = rx.try_pop() {
                match item {
                    Recycled::Noise(buffer) => drop(buffer),
                }
            }
        }
    }
}

impl AudioClock for EventPort {
    fn current_time(&self) -> f64 {
        self.clock.seconds()
    }
}

impl VoiceSink for EventPort {
    fn schedule(&mut self, event: VoiceEvent) {
        self.collect_garbage();

        let instrument = event.instrument;
        let start = event.start;
        match self.commands.lock() {
            Ok(mut tx) => {
                if tx.try_push(Command::Schedule(event)).is_err() {
                    log::warn!(
                        "Command queue full, dropped {} at {:.3}s",
                        instrument,
                        start
                    );
                }
            }
            Err(_) => log::error!("Command queue lock poisoned, dropped {}", instrument),
        }
    }
}
