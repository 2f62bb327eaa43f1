// Oscillateurs - Sine generator and white-noise bursts

use rand::Rng;
use std::f32::consts::PI;

pub trait Oscillator {
    fn next_sample(&mut self) -> f32;
    fn set_frequency(&mut self, freq: f32);
}

/// Phase-accumulating sine oscillator
///
/// The frequency may change every sample (pitch sweeps) without phase jumps.
#[derive(Debug, Clone)]
pub struct SineOscillator {
    phase: f32,
    phase_increment: f32,
    sample_rate: f32,
}

impl SineOscillator {
    pub fn new(sample_rate: f32) -> Self {
        Self {
            phase: 0.0,
            phase_increment: 0.0,
            sample_rate,
        }
    }
}

impl Oscillator for SineOscillator {
    #[inline]
    fn next_sample(&mut self) -> f32 {
        let sample = (self.phase * 2.0 * PI).sin();

        self.phase += self.phase_increment;
        if self.phase >= 1.0 {
            self.phase -= 1.0;
        }

        sample
    }

    #[inline]
    fn set_frequency(&mut self, freq: f32) {
        self.phase_increment = freq / self.sample_rate;
    }
}

/// A block of uniformly distributed white noise in [-1, 1]
///
/// Generated on the scheduling side so the audio thread never allocates.
#[derive(Debug, Clone, PartialEq)]
pub struct NoiseBuffer {
    samples: Vec<f32>,
}

impl NoiseBuffer {
    /// Fill `duration` seconds of fresh noise at `sample_rate`
    pub fn generate<R: Rng + ?Sized>(rng: &mut R, sample_rate: f32, duration: f32) -> Self {
        let length = (sample_rate * duration) as usize;
        let samples = (0..length).map(|_| rng.gen_range(-1.0f32..=1.0)).collect();
        Self { samples }
    }

    /// Sample at `index`, silence past the end
    #[inline]
    pub fn get(&self, index: usize) -> f32 {
        self.samples.get(index).copied().unwrap_or(0.0)
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }
}
