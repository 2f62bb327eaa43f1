// Renderer - Audio-thread side of the engine
//
// Shared by the cpal callback and the offline device. Nothing in here
// allocates, locks or logs once constructed.

use super::mixer::{MixBus, MixBusProcessor};
use super::timing::SampleClock;
use crate::messaging::channels::{CommandConsumer, RecycleProducer};
use crate::messaging::command::{Command, Recycled};
use crate::synth::voice::Voice;
use crate::synth::voice_manager::VoiceManager;
use cpal::{FromSample, SizedSample};
use ringbuf::traits::{Consumer, Producer};

pub struct AudioRenderer {
    voices: VoiceManager,
    mix: MixBusProcessor,
    commands: CommandConsumer,
    recycle: RecycleProducer,
    clock: SampleClock,
}

impl AudioRenderer {
    pub fn new(
        mix: MixBus,
        commands: CommandConsumer,
        recycle: RecycleProducer,
        clock: SampleClock,
    ) -> Self {
        let sample_rate = clock.sample_rate();
        Self {
            voices: VoiceManager::new(sample_rate),
            mix: MixBusProcessor::new(mix, sample_rate),
            commands,
            recycle,
            clock,
        }
    }

    pub fn clock(&self) -> &SampleClock {
        &self.clock
    }

    /// Voices queued or sounding
    #[cfg(test)]
    pub fn voice_count(&self) -> usize {
        self.voices.voice_count()
    }

    /// Send a voice's noise back to the scheduling side
    ///
    /// If the recycle queue is full the buffer is dropped here.
    #[inline]
    fn retire(recycle: &mut RecycleProducer, voice: Voice) {
        if let Some(noise) = voice.into_noise() {
            let _ = recycle.try_push(Recycled::Noise(noise));
        }
    }

    fn drain_commands(&mut self) {
        while let Some(command) = self.commands.try_pop() {
            match command {
                Command::Schedule(event) => {
                    if let Some(stolen) = self.voices.add(event) {
                        Self::retire(&mut self.recycle, stolen);
                    }
                }
            }
        }
    }

    /// Render mono samples and advance the clock by `out.len()` frames
    pub fn render_mono(&mut self, out: &mut [f32]) {
        self.drain_commands();

        let start = self.clock.current_sample();
        for (i, sample) in out.iter_mut().enumerate() {
            let recycle = &mut self.recycle;
            let frame = self
                .voices
                .render(start + i as u64, |voice| Self::retire(recycle, voice));
            *sample = self.mix.process(frame);
        }

        self.clock.advance(out.len());
    }

    /// Render into an interleaved device buffer, same signal on every channel
    pub fn render_interleaved<T>(&mut self, data: &mut [T], channels: usize)
    where
        T: SizedSample + FromSample<f32>,
    {
        let channels = channels.max(1);
        self.drain_commands();

        let start = self.clock.current_sample();
        let mut frames = 0;
        for (i, frame) in data.chunks_mut(channels).enumerate() {
            let recycle = &mut self.recycle;
            let buses = self
                .voices
                .render(start + i as u64, |voice| Self::retire(recycle, voice));
            let value = T::from_sample(self.mix.process(buses));
            for channel_sample in frame.iter_mut() {
                *channel_sample = value;
            }
            frames += 1;
        }

        self.clock.advance(frames);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messaging::channels::{create_command_channel, create_recycle_channel};
    use crate::sequencer::Instrument;
    use crate::synth::drums::{self, DrumKit};

    const SAMPLE_RATE: f32 = 48000.0;

    fn renderer() -> (AudioRenderer, crate::messaging::channels::CommandProducer) {
        let (tx, rx) = create_command_channel(64);
        let (recycle_tx, _recycle_rx) = create_recycle_channel(64);
        let renderer = AudioRenderer::new(
            MixBus::default(),
            rx,
            recycle_tx,
            SampleClock::new(SAMPLE_RATE),
        );
        (renderer, tx)
    }

    #[test]
    fn test_silence_without_events() {
        let (mut renderer, _tx) = renderer();
        let mut out = vec![1.0f32; 512];
        renderer.render_mono(&mut out);
        assert!(out.iter().all(|&s| s == 0.0));
        assert_eq!(renderer.clock().current_sample(), 512);
    }

    #[test]
    fn test_event_lands_on_its_sample() {
        let (mut renderer, mut tx) = renderer();
        // 10ms = 480 samples
        assert!(tx.try_push(Command::Schedule(drums::kick(0.01))).is_ok());

        let mut out = vec![0.0f32; 1024];
        renderer.render_mono(&mut out);

        let first = out.iter().position(|s| *s != 0.0);
        // Sine starts at phase 0, first audible sample right after the start
        assert!(matches!(first, Some(480) | Some(481)), "first: {:?}", first);
    }

    #[test]
    fn test_interleaved_duplicates_channels() {
        let (mut renderer, mut tx) = renderer();
        assert!(tx.try_push(Command::Schedule(drums::kick(0.0))).is_ok());

        let mut data = vec![0.0f32; 256 * 2];
        renderer.render_interleaved(&mut data, 2);
        for frame in data.chunks(2) {
            assert_eq!(frame[0], frame[1]);
        }
        assert_eq!(renderer.clock().current_sample(), 256);
    }

    #[test]
    fn test_i16_output() {
        let (mut renderer, mut tx) = renderer();
        assert!(tx.try_push(Command::Schedule(drums::kick(0.0))).is_ok());

        let mut data = vec![0i16; 512];
        renderer.render_interleaved(&mut data, 1);
        assert!(data.iter().any(|&s| s != 0));
    }

    #[test]
    fn test_voices_retired_and_noise_recycled() {
        let (tx, rx) = create_command_channel(8);
        let (recycle_tx, mut recycle_rx) = create_recycle_channel(8);
        let mut renderer = AudioRenderer::new(
            MixBus::default(),
            rx,
            recycle_tx,
            SampleClock::new(SAMPLE_RATE),
        );
        let mut tx = tx;
        let mut kit = DrumKit::with_seed(SAMPLE_RATE, 3);
        assert!(
            tx.try_push(Command::Schedule(kit.trigger(Instrument::HiHat, 0.0)))
                .is_ok()
        );

        let mut out = vec![0.0f32; 4800]; // 100ms > 80ms lifetime
        renderer.render_mono(&mut out);

        assert_eq!(renderer.voice_count(), 0);
        assert!(matches!(recycle_rx.try_pop(), Some(Recycled::Noise(_))));
    }

    #[test]
    fn test_clock_continues_across_buffers() {
        let (mut renderer, mut tx) = renderer();
        let mut out = vec![0.0f32; 256];
        renderer.render_mono(&mut out);

        // Event in the second buffer, at sample 300
        assert!(tx.try_push(Command::Schedule(drums::kick(300.0 / 48000.0))).is_ok());
        renderer.render_mono(&mut out);
        let first = out.iter().position(|s| *s != 0.0);
        assert!(matches!(first, Some(44) | Some(45)), "first: {:?}", first);
    }
}
