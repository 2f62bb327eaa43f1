// Types de commandes - Communication scheduler → Audio

use crate::synth::VoiceEvent;
use crate::synth::oscillator::NoiseBuffer;

/// Message delivered to the render side
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Queue a voice at its absolute start time
    Schedule(VoiceEvent),
}

/// Allocation handed back by the render side to be freed elsewhere
#[derive(Debug)]
pub enum Recycled {
    Noise(NoiseBuffer),
}
