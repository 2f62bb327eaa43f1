// Mix bus - Per-instrument gain stages and master gain
//
// Volume targets are written lock-free from any thread; the audio thread
// glides towards them with one-pole smoothers.

use super::dsp_utils::{OnePoleSmoother, flush_denormals_to_zero, soft_clip};
use super::parameters::AtomicF32;
use crate::sequencer::Instrument;
use crate::synth::voice_manager::BusFrame;
use std::fmt;

/// Exponent of the perceptual volume curve
pub const VOLUME_CURVE: f32 = 2.2;

/// Smoothing time constant of gain changes, in seconds
pub const GAIN_SMOOTHING_SECONDS: f32 = 0.01;

/// One gain stage of the mix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bus {
    Master,
    HiHat,
    Snare,
    Kick,
}

impl Bus {
    pub const ALL: [Bus; 4] = [Bus::Master, Bus::HiHat, Bus::Snare, Bus::Kick];

    /// Gain reached at full volume
    pub fn voice_max(self) -> f32 {
        match self {
            Bus::Master => 1.6,
            Bus::HiHat => 2.2,
            Bus::Snare => 3.0,
            Bus::Kick => 3.6,
        }
    }

    fn index(self) -> usize {
        match self {
            Bus::Master => 0,
            Bus::HiHat => 1,
            Bus::Snare => 2,
            Bus::Kick => 3,
        }
    }
}

impl From<Instrument> for Bus {
    fn from(instrument: Instrument) -> Self {
        match instrument {
            Instrument::HiHat => Bus::HiHat,
            Instrument::Snare => Bus::Snare,
            Instrument::Kick => Bus::Kick,
        }
    }
}

impl fmt::Display for Bus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Bus::Master => write!(f, "master"),
            Bus::HiHat => write!(f, "hi-hat"),
            Bus::Snare => write!(f, "snare"),
            Bus::Kick => write!(f, "kick"),
        }
    }
}

/// Perceptual volume curve: `v^2.2 × max`, `v` clamped to [0, 1]
pub fn volume_to_gain(volume: f32, max: f32) -> f32 {
    let v = if volume.is_finite() {
        volume.clamp(0.0, 1.0)
    } else {
        0.0
    };
    v.powf(VOLUME_CURVE) * max
}

/// Control side of the mix: one volume per bus, shared between clones
#[derive(Clone)]
pub struct MixBus {
    volumes: [AtomicF32; 4],
}

impl MixBus {
    pub const DEFAULT_MASTER: f32 = 0.9;
    pub const DEFAULT_HIHAT: f32 = 0.5;
    pub const DEFAULT_SNARE: f32 = 0.6;
    pub const DEFAULT_KICK: f32 = 0.8;

    pub fn new(master: f32, hihat: f32, snare: f32, kick: f32) -> Self {
        let mix = Self {
            volumes: std::array::from_fn(|_| AtomicF32::new(0.0)),
        };
        mix.set_volume(Bus::Master, master);
        mix.set_volume(Bus::HiHat, hihat);
        mix.set_volume(Bus::Snare, snare);
        mix.set_volume(Bus::Kick, kick);
        mix
    }

    /// Store a volume in [0, 1]; out-of-range values are clamped
    pub fn set_volume(&self, bus: Bus, volume: f32) {
        let v = if volume.is_finite() {
            volume.clamp(0.0, 1.0)
        } else {
            0.0
        };
        self.volumes[bus.index()].set(v);
    }

    pub fn volume(&self, bus: Bus) -> f32 {
        self.volumes[bus.index()].get()
    }

    /// Gain the render side is gliding towards
    pub fn target_gain(&self, bus: Bus) -> f32 {
        volume_to_gain(self.volume(bus), bus.voice_max())
    }
}

impl Default for MixBus {
    fn default() -> Self {
        Self::new(
            Self::DEFAULT_MASTER,
            Self::DEFAULT_HIHAT,
            Self::DEFAULT_SNARE,
            Self::DEFAULT_KICK,
        )
    }
}

/// Render side of the mix
///
/// Lives on the audio thread. Smoothers start at the current targets so the
/// first buffer does not fade in.
pub struct MixBusProcessor {
    controls: MixBus,
    smoothers: [OnePoleSmoother; 4],
}

impl MixBusProcessor {
    pub fn new(controls: MixBus, sample_rate: f32) -> Self {
        let smoothers = std::array::from_fn(|i| {
            OnePoleSmoother::new(
                controls.target_gain(Bus::ALL[i]),
                GAIN_SMOOTHING_SECONDS,
                sample_rate,
            )
        });
        Self {
            controls,
            smoothers,
        }
    }

    /// Mix one frame of instrument buses into a single output sample
    #[inline]
    pub fn process(&mut self, frame: BusFrame) -> f32 {
        let mut sum = 0.0;
        for instrument in Instrument::ALL {
            let bus = Bus::from(instrument);
            let gain = self.smoothers[bus.index()].process(self.controls.target_gain(bus));
            sum += frame[instrument.index()] * gain;
        }

        let master_target = self.controls.target_gain(Bus::Master);
        let master = self.smoothers[Bus::Master.index()].process(master_target);
        soft_clip(flush_denormals_to_zero(sum * master))
    }

    /// Current smoothed gain of a bus
    pub fn current_gain(&self, bus: Bus) -> f32 {
        self.smoothers[bus.index()].get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_volume_curve_endpoints() {
        for bus in Bus::ALL {
            assert_eq!(volume_to_gain(0.0, bus.voice_max()), 0.0);
            assert_eq!(volume_to_gain(1.0, bus.voice_max()), bus.voice_max());
        }
    }

    #[test]
    fn test_volume_curve_shape() {
        let half = volume_to_gain(0.5, 1.0);
        assert!((half - 0.5f32.powf(2.2)).abs() < 1e-6);
        assert!(half < 0.25); // plus bas que linéaire au milieu

        assert_eq!(volume_to_gain(2.0, 3.0), 3.0);
        assert_eq!(volume_to_gain(-1.0, 3.0), 0.0);
        assert_eq!(volume_to_gain(f32::NAN, 3.0), 0.0);
    }

    #[test]
    fn test_default_volumes() {
        let mix = MixBus::default();
        assert_eq!(mix.volume(Bus::Master), 0.9);
        assert_eq!(mix.volume(Bus::HiHat), 0.5);
        assert_eq!(mix.volume(Bus::Snare), 0.6);
        assert_eq!(mix.volume(Bus::Kick), 0.8);
    }

    #[test]
    fn test_set_volume_shared_and_clamped() {
        let mix = MixBus::default();
        let handle = mix.clone();
        handle.set_volume(Bus::Kick, 1.5);
        assert_eq!(mix.volume(Bus::Kick), 1.0);
        assert_eq!(mix.target_gain(Bus::Kick), 3.6);
    }

    #[test]
    fn test_processor_starts_at_target() {
        let mix = MixBus::default();
        let processor = MixBusProcessor::new(mix.clone(), 48000.0);
        for bus in Bus::ALL {
            assert_eq!(processor.current_gain(bus), mix.target_gain(bus));
        }
    }

    #[test]
    fn test_processor_glides_to_new_gain() {
        let mix = MixBus::default();
        let mut processor = MixBusProcessor::new(mix.clone(), 48000.0);

        mix.set_volume(Bus::Snare, 0.0);
        processor.process([0.0, 0.0, 0.0]);
        let after_one = processor.current_gain(Bus::Snare);
        assert!(after_one > 0.0, "gain must not jump");

        // 10 constantes de temps
        for _ in 0..4800 {
            processor.process([0.0, 0.0, 0.0]);
        }
        assert!(processor.current_gain(Bus::Snare) < 0.001);
    }

    #[test]
    fn test_muted_master_silences_output() {
        let mix = MixBus::new(0.0, 1.0, 1.0, 1.0);
        let mut processor = MixBusProcessor::new(mix, 48000.0);
        assert_eq!(processor.process([0.5, 0.5, 0.5]), 0.0);
    }

    #[test]
    fn test_output_is_soft_clipped() {
        let mix = MixBus::new(1.0, 1.0, 1.0, 1.0);
        let mut processor = MixBusProcessor::new(mix, 48000.0);
        let out = processor.process([1.0, 1.0, 1.0]);
        assert!(out < 1.0 && out > 0.99);
    }
}
