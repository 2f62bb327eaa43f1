// Offline device - Renders on demand instead of following a sound card
//
// The clock only moves when `render` is called, which makes scheduling
// deterministic for bounces and tests.

use super::AudioError;
use super::backend::{EventPort, OutputDevice};
use super::mixer::MixBus;
use super::renderer::AudioRenderer;
use super::timing::SampleClock;
use crate::messaging::channels::{create_command_channel, create_recycle_channel};

pub struct OfflineDevice {
    clock: SampleClock,
    queue_capacity: usize,
    renderer: Option<AudioRenderer>,
    port: Option<EventPort>,
}

impl OfflineDevice {
    pub fn new(sample_rate: f32, queue_capacity: usize) -> Self {
        Self {
            clock: SampleClock::new(sample_rate),
            queue_capacity: queue_capacity.max(1),
            renderer: None,
            port: None,
        }
    }

    pub fn clock(&self) -> &SampleClock {
        &self.clock
    }

    pub fn sample_rate(&self) -> f32 {
        self.clock.sample_rate()
    }

    /// Render `frames` mono samples; silence until the first `resume`
    pub fn render(&mut self, frames: usize) -> Vec<f32> {
        let mut out = vec![0.0; frames];
        self.render_into(&mut out);
        out
    }

    pub fn render_into(&mut self, out: &mut [f32]) {
        match &mut self.renderer {
            Some(renderer) => renderer.render_mono(out),
            None => {
                out.fill(0.0);
                self.clock.advance(out.len());
            }
        }
    }
}

impl OutputDevice for OfflineDevice {
    fn resume(&mut self, mix: &MixBus) -> Result<EventPort, AudioError> {
        if let Some(port) = &self.port {
            return Ok(port.clone());
        }

        let (command_tx, command_rx) = create_command_channel(self.queue_capacity);
        let (recycle_tx, recycle_rx) = create_recycle_channel(self.queue_capacity);
        self.renderer = Some(AudioRenderer::new(
            mix.clone(),
            command_rx,
            recycle_tx,
            self.clock.clone(),
        ));

        let port = EventPort::new(command_tx, recycle_rx, self.clock.clone());
        self.port = Some(port.clone());
        Ok(port)
    }
}
