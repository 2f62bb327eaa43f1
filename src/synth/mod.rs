// Module synthèse - Drum voice generators and their renderers

pub mod drums;
pub mod envelope;
pub mod filter;
pub mod oscillator;
pub mod voice;
pub mod voice_manager;

pub use drums::{DrumKit, VoiceEvent, VoiceSource};
