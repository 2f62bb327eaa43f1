// Filter - Biquad high-pass
//
// Second-order IIR high-pass used to carve white noise into snare and hi-hat
// timbres.
//
// References:
// - Robert Bristow-Johnson, "Cookbook formulae for audio EQ biquad filter coefficients"
// - https://www.w3.org/TR/webaudio/#filters-characteristics
//
// Characteristics:
// - 12dB/octave slope (2-pole)
// - Direct Form I, coefficients normalised by a0
// - Resonance expressed in dB, like browser biquads (Q = 10^(dB / 20))

use crate::audio::dsp_utils::flush_denormals_to_zero;
use std::f32::consts::PI;

/// Default resonance in dB (browser biquad default)
pub const DEFAULT_RESONANCE_DB: f32 = 1.0;

/// Filter parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterParams {
    /// Cutoff frequency in Hz
    pub cutoff: f32,
    /// Resonance in dB
    pub resonance_db: f32,
}

impl FilterParams {
    pub fn highpass(cutoff: f32) -> Self {
        Self {
            cutoff,
            resonance_db: DEFAULT_RESONANCE_DB,
        }
    }
}

/// Normalised biquad coefficients
#[derive(Debug, Clone, Copy, PartialEq)]
struct Coefficients {
    b0: f32,
    b1: f32,
    b2: f32,
    a1: f32,
    a2: f32,
}

/// Biquad high-pass filter
///
/// # Example
/// ```
/// use drumloop::synth::filter::{BiquadHighPass, FilterParams};
///
/// let mut filter = BiquadHighPass::new(FilterParams::highpass(900.0), 48000.0);
/// let output = filter.process(0.5);
/// assert!(output.is_finite());
/// ```
#[derive(Debug, Clone)]
pub struct BiquadHighPass {
    coefficients: Coefficients,

    // Delay lines
    x1: f32,
    x2: f32,
    y1: f32,
    y2: f32,
}

impl BiquadHighPass {
    pub fn new(params: FilterParams, sample_rate: f32) -> Self {
        Self {
            coefficients: Self::compute_coefficients(params, sample_rate),
            x1: 0.0,
            x2: 0.0,
            y1: 0.0,
            y2: 0.0,
        }
    }

    /// RBJ high-pass
    ///
    /// - `w0 = 2π fc / Fs`, `alpha = sin(w0) / (2Q)`
    /// - `b0 = b2 = (1 + cos w0) / 2`, `b1 = -(1 + cos w0)`
    /// - `a0 = 1 + alpha`, `a1 = -2 cos w0`, `a2 = 1 - alpha`
    ///
    /// Cutoff is kept strictly inside (0, Nyquist).
    fn compute_coefficients(params: FilterParams, sample_rate: f32) -> Coefficients {
        let nyquist = sample_rate * 0.5;
        let cutoff = params.cutoff.clamp(10.0, nyquist * 0.99);
        let q = 10.0f32.powf(params.resonance_db / 20.0);

        let w0 = 2.0 * PI * cutoff / sample_rate;
        let (sin_w0, cos_w0) = w0.sin_cos();
        let alpha = sin_w0 / (2.0 * q);

        let a0 = 1.0 + alpha;
        Coefficients {
            b0: (1.0 + cos_w0) / 2.0 / a0,
            b1: -(1.0 + cos_w0) / a0,
            b2: (1.0 + cos_w0) / 2.0 / a0,
            a1: -2.0 * cos_w0 / a0,
            a2: (1.0 - alpha) / a0,
        }
    }

    /// Process a single sample
    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        let c = &self.coefficients;
        let output = c.b0 * input + c.b1 * self.x1 + c.b2 * self.x2
            - c.a1 * self.y1
            - c.a2 * self.y2;
        let output = flush_denormals_to_zero(output);

        self.x2 = self.x1;
        self.x1 = input;
        self.y2 = self.y1;
        self.y1 = output;

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_RATE: f32 = 48000.0;

    fn sine_rms(filter: &mut BiquadHighPass, frequency: f32) -> f32 {
        let mut sum = 0.0;
        let total = 9600;
        let settle = 4800;
        for i in 0..total {
            let x = (2.0 * PI * frequency * i as f32 / SAMPLE_RATE).sin();
            let y = filter.process(x);
            if i >= settle {
                sum += y * y;
            }
        }
        (sum / (total - settle) as f32).sqrt()
    }

    #[test]
    fn test_highpass_blocks_dc() {
        let mut filter = BiquadHighPass::new(FilterParams::highpass(900.0), SAMPLE_RATE);
        let mut last_output = 1.0;
        for _ in 0..4800 {
            last_output = filter.process(1.0);
        }
        assert!(last_output.abs() < 0.01, "DC leaked: {}", last_output);
    }

    #[test]
    fn test_highpass_attenuates_below_cutoff() {
        let mut low = BiquadHighPass::new(FilterParams::highpass(7000.0), SAMPLE_RATE);
        let mut high = BiquadHighPass::new(FilterParams::highpass(7000.0), SAMPLE_RATE);

        let low_rms = sine_rms(&mut low, 500.0);
        let high_rms = sine_rms(&mut high, 14000.0);

        // Unfiltered sine RMS is ~0.707
        assert!(low_rms < 0.02, "500Hz passed with rms {}", low_rms);
        assert!(high_rms > 0.5, "14kHz attenuated to rms {}", high_rms);
    }

    #[test]
    fn test_cutoff_above_nyquist_stays_stable() {
        let mut filter = BiquadHighPass::new(FilterParams::highpass(40000.0), SAMPLE_RATE);
        for i in 0..10000 {
            let y = filter.process(if i % 2 == 0 { 1.0 } else { -1.0 });
            assert!(y.is_finite());
        }
    }
}
