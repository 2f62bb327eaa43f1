// Drums - Procedural kick, snare and hi-hat generators
//
// A generator never touches the audio thread: it only describes a voice
// (source, filter, envelopes, lifetime) anchored on an absolute start time.
// The description is then shipped to the renderer, see `synth::voice`.

use super::envelope::ExponentialRamp;
use super::oscillator::NoiseBuffer;
use crate::sequencer::Instrument;
use rand::SeedableRng;
use rand::rngs::StdRng;

/// Length of every noise burst, in seconds
pub const NOISE_BURST_SECONDS: f32 = 0.25;

/// Sound source of a voice
#[derive(Debug, Clone, PartialEq)]
pub enum VoiceSource {
    /// Sine wave following a pitch ramp
    Sine { frequency: ExponentialRamp },
    /// Pre-generated white noise played from its first sample
    Noise(NoiseBuffer),
}

/// Complete description of one drum hit
#[derive(Debug, Clone, PartialEq)]
pub struct VoiceEvent {
    pub instrument: Instrument,
    /// Audio clock time the voice starts at
    pub start: f64,
    /// Audio clock time the voice is cut
    pub stop: f64,
    pub source: VoiceSource,
    /// High-pass cutoff in Hz, if any
    pub highpass: Option<f32>,
    pub gain: ExponentialRamp,
}

impl VoiceEvent {
    /// Time between start and stop
    pub fn lifetime(&self) -> f64 {
        self.stop - self.start
    }
}

/// Sine kick: 140Hz → 50Hz over 80ms, 120ms decay, cut at 140ms
pub fn kick(t: f64) -> VoiceEvent {
    VoiceEvent {
        instrument: Instrument::Kick,
        start: t,
        stop: t + 0.14,
        source: VoiceSource::Sine {
            frequency: ExponentialRamp::new(140.0, 50.0, t, 0.08),
        },
        highpass: None,
        gain: ExponentialRamp::decay(1.0, t, 0.12),
    }
}

/// Noise snare: high-passed at 900Hz, 140ms decay from 0.9, cut at 160ms
pub fn snare(t: f64, noise: NoiseBuffer) -> VoiceEvent {
    VoiceEvent {
        instrument: Instrument::Snare,
        start: t,
        stop: t + 0.16,
        source: VoiceSource::Noise(noise),
        highpass: Some(900.0),
        gain: ExponentialRamp::decay(0.9, t, 0.14),
    }
}

/// Noise hi-hat: high-passed at 7kHz, 60ms decay from 0.35, cut at 80ms
pub fn hihat(t: f64, noise: NoiseBuffer) -> VoiceEvent {
    VoiceEvent {
        instrument: Instrument::HiHat,
        start: t,
        stop: t + 0.08,
        source: VoiceSource::Noise(noise),
        highpass: Some(7000.0),
        gain: ExponentialRamp::decay(0.35, t, 0.06),
    }
}

/// Voice factory bound to the output sample rate
///
/// Owns the random source used for noise bursts. Every trigger draws a new
/// buffer; nothing is cached between hits.
pub struct DrumKit {
    sample_rate: f32,
    rng: StdRng,
}

impl DrumKit {
    pub fn new(sample_rate: f32) -> Self {
        Self {
            sample_rate,
            rng: StdRng::from_entropy(),
        }
    }

    /// Reproducible noise, for offline renders and tests
    pub fn with_seed(sample_rate: f32, seed: u64) -> Self {
        Self {
            sample_rate,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Describe one hit of `instrument` starting at `t`
    pub fn trigger(&mut self, instrument: Instrument, t: f64) -> VoiceEvent {
        match instrument {
            Instrument::Kick => kick(t),
            Instrument::Snare => snare(t, self.noise_burst()),
            Instrument::HiHat => hihat(t, self.noise_burst()),
        }
    }

    fn noise_burst(&mut self) -> NoiseBuffer {
        NoiseBuffer::generate(&mut self.rng, self.sample_rate, NOISE_BURST_SECONDS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synth::envelope::DECAY_FLOOR;

    #[test]
    fn test_kick_description() {
        let event = kick(1.0);
        assert_eq!(event.instrument, Instrument::Kick);
        assert_eq!(event.start, 1.0);
        assert!((event.lifetime() - 0.14).abs() < 1e-9);
        assert_eq!(event.highpass, None);
        assert_eq!(event.gain.from, 1.0);
        assert_eq!(event.gain.to, DECAY_FLOOR);
        assert!((event.gain.duration() - 0.12).abs() < 1e-9);

        match event.source {
            VoiceSource::Sine { frequency } => {
                assert_eq!(frequency.from, 140.0);
                assert_eq!(frequency.to, 50.0);
                assert!((frequency.duration() - 0.08).abs() < 1e-9);
            }
            VoiceSource::Noise(_) => panic!("kick must be a sine voice"),
        }
    }

    #[test]
    fn test_snare_and_hihat_descriptions() {
        let mut kit = DrumKit::with_seed(48000.0, 42);

        let snare = kit.trigger(Instrument::Snare, 0.5);
        assert_eq!(snare.highpass, Some(900.0));
        assert_eq!(snare.gain.from, 0.9);
        assert!((snare.gain.duration() - 0.14).abs() < 1e-9);
        assert!((snare.lifetime() - 0.16).abs() < 1e-9);

        let hat = kit.trigger(Instrument::HiHat, 0.5);
        assert_eq!(hat.highpass, Some(7000.0));
        assert_eq!(hat.gain.from, 0.35);
        assert!((hat.gain.duration() - 0.06).abs() < 1e-9);
        assert!((hat.lifetime() - 0.08).abs() < 1e-9);

        for event in [&snare, &hat] {
            match &event.source {
                VoiceSource::Noise(noise) => assert_eq!(noise.len(), 12000),
                VoiceSource::Sine { .. } => panic!("noise voices expected"),
            }
        }
    }

    #[test]
    fn test_every_trigger_gets_fresh_noise() {
        let mut kit = DrumKit::with_seed(8000.0, 5);
        let a = kit.trigger(Instrument::HiHat, 0.0);
        let b = kit.trigger(Instrument::HiHat, 0.0);
        assert_ne!(a.source, b.source);
    }

    #[test]
    fn test_seeded_kits_are_reproducible() {
        let mut a = DrumKit::with_seed(8000.0, 9);
        let mut b = DrumKit::with_seed(8000.0, 9);
        assert_eq!(
            a.trigger(Instrument::Snare, 1.0),
            b.trigger(Instrument::Snare, 1.0)
        );
    }
}
