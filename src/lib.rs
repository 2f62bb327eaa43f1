// drumloop - Library exports for tests and benchmarks

pub mod audio;
pub mod config;
pub mod connection;
pub mod messaging;
pub mod sequencer;
pub mod session;
pub mod synth;

// Re-export commonly used types for convenience
pub use audio::AudioError;
pub use audio::backend::{AudioClock, EventPort, OutputDevice, VoiceSink};
pub use audio::engine::CpalDevice;
pub use audio::mixer::{Bus, MixBus};
pub use audio::offline::OfflineDevice;
pub use config::{ConfigError, DrumConfig};
pub use sequencer::{
    Instrument, LookaheadScheduler, Meter, Pattern, SchedulerConfig, Subdivision, Tempo,
    TickReport, TimeSignature, TransportState,
};
pub use session::{DrumSession, SessionError};
pub use synth::{DrumKit, VoiceEvent};
