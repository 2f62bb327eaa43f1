// Voice - One drum hit being rendered

use super::drums::{VoiceEvent, VoiceSource};
use super::envelope::ExponentialRamp;
use super::filter::{BiquadHighPass, FilterParams};
use super::oscillator::{NoiseBuffer, Oscillator, SineOscillator};
use crate::sequencer::Instrument;

enum RenderSource {
    Sine {
        oscillator: SineOscillator,
        frequency: ExponentialRamp,
    },
    Noise {
        buffer: NoiseBuffer,
        position: usize,
    },
}

/// Renderer for a [`VoiceEvent`]
///
/// Works on absolute sample indices of the output clock. Automation is
/// evaluated at the clock time of each sample, so a voice that arrives after
/// its start time begins immediately with its envelopes already under way.
pub struct Voice {
    instrument: Instrument,
    start_sample: u64,
    stop_sample: u64,
    source: RenderSource,
    highpass: Option<BiquadHighPass>,
    gain: ExponentialRamp,
    sample_rate: f64,
    /// Age counter for voice stealing priority (higher = younger)
    age: u64,
}

impl Voice {
    pub fn new(event: VoiceEvent, sample_rate: f32, age: u64) -> Self {
        let rate = sample_rate as f64;
        let source = match event.source {
            VoiceSource::Sine { frequency } => RenderSource::Sine {
                oscillator: SineOscillator::new(sample_rate),
                frequency,
            },
            VoiceSource::Noise(buffer) => RenderSource::Noise {
                buffer,
                position: 0,
            },
        };

        Self {
            instrument: event.instrument,
            start_sample: (event.start.max(0.0) * rate).round() as u64,
            stop_sample: (event.stop.max(0.0) * rate).round() as u64,
            source,
            highpass: event
                .highpass
                .map(|cutoff| BiquadHighPass::new(FilterParams::highpass(cutoff), sample_rate)),
            gain: event.gain,
            sample_rate: rate,
            age,
        }
    }

    pub fn instrument(&self) -> Instrument {
        self.instrument
    }

    pub fn start_sample(&self) -> u64 {
        self.start_sample
    }

    pub fn stop_sample(&self) -> u64 {
        self.stop_sample
    }

    pub fn get_age(&self) -> u64 {
        self.age
    }

    /// Still waiting for its start time
    pub fn is_pending(&self, sample_index: u64) -> bool {
        sample_index < self.start_sample
    }

    /// Reached its stop time
    pub fn is_finished(&self, sample_index: u64) -> bool {
        sample_index >= self.stop_sample
    }

    /// Output of the voice at `sample_index`; call once per index, in order
    #[inline]
    pub fn render(&mut self, sample_index: u64) -> f32 {
        if self.is_pending(sample_index) || self.is_finished(sample_index) {
            return 0.0;
        }

        let t = sample_index as f64 / self.sample_rate;

        let raw = match &mut self.source {
            RenderSource::Sine {
                oscillator,
                frequency,
            } => {
                oscillator.set_frequency(frequency.value_at(t));
                oscillator.next_sample()
            }
            RenderSource::Noise { buffer, position } => {
                let sample = buffer.get(*position);
                *position += 1;
                sample
            }
        };

        let filtered = match &mut self.highpass {
            Some(filter) => filter.process(raw),
            None => raw,
        };

        filtered * self.gain.value_at(t)
    }

    /// Hand back the noise allocation so it can be freed off the audio thread
    pub fn into_noise(self) -> Option<NoiseBuffer> {
        match self.source {
            RenderSource::Noise { buffer, .. } => Some(buffer),
            RenderSource::Sine { .. } => None,
        }
    }
}
