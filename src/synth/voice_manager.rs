// Voice Manager - Pending and sounding drum hits

use super::drums::VoiceEvent;
use super::voice::Voice;

/// Enough for the densest meter (240 BPM, x/8, sixteenths) with a full lookahead
/// window of pending hits on top of the ones still ringing
pub const MAX_VOICES: usize = 32;

/// One sample per instrument bus, indexed by [`crate::sequencer::Instrument::index`]
pub type BusFrame = [f32; 3];

pub struct VoiceManager {
    voices: [Option<Voice>; MAX_VOICES],
    sample_rate: f32,
    /// Age counter incremented on each new voice for stealing priority
    age_counter: u64,
}

impl VoiceManager {
    pub fn new(sample_rate: f32) -> Self {
        Self {
            voices: std::array::from_fn(|_| None),
            sample_rate,
            age_counter: 0,
        }
    }

    /// Queue a voice; it stays silent until the clock reaches its start time
    ///
    /// When every slot is taken the oldest voice is stolen and returned so the
    /// caller can dispose of it outside the render loop.
    pub fn add(&mut self, event: VoiceEvent) -> Option<Voice> {
        self.age_counter = self.age_counter.wrapping_add(1);
        let voice = Voice::new(event, self.sample_rate, self.age_counter);

        if let Some(slot) = self.voices.iter_mut().find(|slot| slot.is_none()) {
            *slot = Some(voice);
            return None;
        }

        let victim = self.find_voice_to_steal();
        self.voices[victim].replace(voice)
    }

    /// Oldest voice first (lowest age number)
    fn find_voice_to_steal(&self) -> usize {
        let mut best_index = 0;
        let mut best_age = u64::MAX;

        for (i, voice) in self.voices.iter().enumerate() {
            if let Some(voice) = voice
                && voice.get_age() < best_age
            {
                best_age = voice.get_age();
                best_index = i;
            }
        }

        best_index
    }

    /// Render every voice at `sample_index`, summed per instrument bus
    ///
    /// Voices that reached their stop time are taken out and passed to `retire`.
    #[inline]
    pub fn render<F: FnMut(Voice)>(&mut self, sample_index: u64, mut retire: F) -> BusFrame {
        let mut frame = [0.0; 3];

        for slot in self.voices.iter_mut() {
            let finished = match slot {
                Some(voice) => {
                    frame[voice.instrument().index()] += voice.render(sample_index);
                    voice.is_finished(sample_index + 1)
                }
                None => false,
            };

            if finished && let Some(voice) = slot.take() {
                retire(voice);
            }
        }

        frame
    }

    /// Voices queued or sounding
    #[cfg(test)]
    pub fn voice_count(&self) -> usize {
        self.voices.iter().filter(|slot| slot.is_some()).count()
    }

    /// Voices currently producing sound
    #[cfg(test)]
    pub fn sounding_count(&self, sample_index: u64) -> usize {
        self.voices
            .iter()
            .flatten()
            .filter(|v| !v.is_pending(sample_index) && !v.is_finished(sample_index))
            .count()
    }

    /// Count of queued or sounding voices for one instrument
    #[cfg(test)]
    pub fn instrument_count(&self, instrument: crate::sequencer::Instrument) -> usize {
        self.voices
            .iter()
            .flatten()
            .filter(|v| v.instrument() == instrument)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequencer::Instrument;
    use crate::synth::drums::{self, DrumKit};

    const SAMPLE_RATE: f32 = 48000.0;

    #[test]
    fn test_voice_allocation() {
        let mut vm = VoiceManager::new(SAMPLE_RATE);
        assert_eq!(vm.voice_count(), 0);

        assert!(vm.add(drums::kick(0.0)).is_none());
        assert!(vm.add(drums::kick(0.5)).is_none());
        assert_eq!(vm.voice_count(), 2);
        assert_eq!(vm.instrument_count(Instrument::Kick), 2);
    }

    #[test]
    fn test_pending_voice_waits_for_start() {
        let mut vm = VoiceManager::new(SAMPLE_RATE);
        vm.add(drums::kick(0.01)); // starts at sample 480

        let mut retired = 0;
        for i in 0..480 {
            let frame = vm.render(i, |_| retired += 1);
            assert_eq!(frame, [0.0; 3]);
        }
        assert_eq!(vm.sounding_count(480), 1);
        assert_eq!(retired, 0);
    }

    #[test]
    fn test_routing_to_instrument_bus() {
        let mut kit = DrumKit::with_seed(SAMPLE_RATE, 4);
        let mut vm = VoiceManager::new(SAMPLE_RATE);
        vm.add(kit.trigger(Instrument::Kick, 0.0));

        let mut kick_energy = 0.0;
        for i in 0..2000 {
            let frame = vm.render(i, |_| {});
            assert_eq!(frame[Instrument::HiHat.index()], 0.0);
            assert_eq!(frame[Instrument::Snare.index()], 0.0);
            kick_energy += frame[Instrument::Kick.index()].abs();
        }
        assert!(kick_energy > 0.0);
    }

    #[test]
    fn test_finished_voices_are_retired() {
        let mut kit = DrumKit::with_seed(SAMPLE_RATE, 4);
        let mut vm = VoiceManager::new(SAMPLE_RATE);
        vm.add(kit.trigger(Instrument::HiHat, 0.0)); // 80ms = 3840 samples
        vm.add(drums::kick(0.0)); // 140ms = 6720 samples

        let mut retired = Vec::new();
        for i in 0..7000 {
            vm.render(i, |voice| retired.push((i, voice.instrument())));
        }

        assert_eq!(
            retired,
            vec![(3839, Instrument::HiHat), (6719, Instrument::Kick)]
        );
        assert_eq!(vm.voice_count(), 0);
    }

    #[test]
    fn test_voice_stealing_takes_oldest() {
        let mut vm = VoiceManager::new(SAMPLE_RATE);
        for i in 0..MAX_VOICES {
            assert!(vm.add(drums::kick(i as f64)).is_none());
        }
        assert_eq!(vm.voice_count(), MAX_VOICES);

        let stolen = vm.add(drums::kick(100.0));
        let stolen = stolen.expect("a voice must be stolen when the pool is full");
        assert_eq!(stolen.start_sample(), 0);
        assert_eq!(vm.voice_count(), MAX_VOICES);
    }
}
