// Audio Export - Offline bounce to WAV
//
// Renders whole bars of the pattern through the same scheduler, voices and
// mix bus as live playback. The scheduler is driven by simulated ticks on an
// offline clock, so a bounce sounds like a perfectly punctual live take.

use super::AudioError;
use super::backend::{OutputDevice, VoiceSink};
use super::mixer::MixBus;
use super::offline::OfflineDevice;
use crate::sequencer::{LookaheadScheduler, Meter, Pattern, SchedulerConfig};
use crate::synth::{DrumKit, VoiceEvent};
use hound::{WavSpec, WavWriter};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),

    #[error("Audio device error: {0}")]
    Device(#[from] AudioError),

    #[error("Invalid export settings: {0}")]
    InvalidSettings(String),
}

/// Audio export settings
#[derive(Debug, Clone, PartialEq)]
pub struct ExportSettings {
    /// Sample rate (Hz)
    pub sample_rate: u32,
    /// Number of channels (1=mono, 2=stereo); every channel carries the same mix
    pub channels: u16,
    /// Number of bars rendered
    pub bars: u32,
    /// Silence kept after the last bar so the final hits ring out, in seconds
    pub tail_seconds: f64,
    /// Noise seed for a reproducible bounce
    pub seed: Option<u64>,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            sample_rate: 44100,
            channels: 2,
            bars: 4,
            tail_seconds: 0.25,
            seed: None,
        }
    }
}

/// Progress callback for export (reports 0.0 to 1.0)
pub type ProgressCallback<'a> = &'a mut dyn FnMut(f32);

/// What a bounce produced
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExportSummary {
    /// Frames written per channel
    pub frames: usize,
    pub duration_seconds: f64,
    /// Voices scheduled inside the rendered bars
    pub voices: usize,
}

/// Drops events that start at or after `end`
struct BoundedSink<'a, S: VoiceSink> {
    inner: &'a mut S,
    end: f64,
    accepted: usize,
}

impl<S: VoiceSink> VoiceSink for BoundedSink<'_, S> {
    fn schedule(&mut self, event: VoiceEvent) {
        if event.start < self.end {
            self.accepted += 1;
            self.inner.schedule(event);
        }
    }
}

/// Audio exporter - renders bars of a pattern to audio
pub struct AudioExporter {
    settings: ExportSettings,
    scheduler: SchedulerConfig,
}

impl AudioExporter {
    pub fn new(settings: ExportSettings, scheduler: SchedulerConfig) -> Self {
        Self {
            settings,
            scheduler,
        }
    }

    pub fn settings(&self) -> &ExportSettings {
        &self.settings
    }

    /// Render mono samples of `bars` bars plus the tail
    ///
    /// The first step sits on sample 0; the meter is fixed for the whole render.
    pub fn render(
        &self,
        pattern: &Pattern,
        meter: &Meter,
        mix: &MixBus,
        mut progress: Option<ProgressCallback<'_>>,
    ) -> Result<(Vec<f32>, usize), ExportError> {
        if self.settings.sample_rate == 0 {
            return Err(ExportError::InvalidSettings(
                "sample rate must be > 0".to_string(),
            ));
        }
        if self.settings.bars == 0 {
            return Err(ExportError::InvalidSettings(
                "at least one bar is required".to_string(),
            ));
        }

        let sample_rate = self.settings.sample_rate as f32;
        let mut device = OfflineDevice::new(sample_rate, self.scheduler.queue_capacity);
        let mut port = device.resume(mix)?;

        let kit = match self.settings.seed {
            Some(seed) => DrumKit::with_seed(sample_rate, seed),
            None => DrumKit::new(sample_rate),
        };
        let mut scheduler = LookaheadScheduler::new(kit, &self.scheduler);
        scheduler.start_at(0.0);

        let end = meter.bar_duration_seconds() * self.settings.bars as f64;
        // Half a step of slack so accumulated rounding never lets the next downbeat in
        let cutoff = end - 0.5 * meter.seconds_per_step();
        let total_frames = device
            .clock()
            .seconds_to_samples(end + self.settings.tail_seconds.max(0.0))
            as usize;
        let tick_frames = device
            .clock()
            .seconds_to_samples(self.scheduler.tick_interval().as_secs_f64())
            .max(1) as usize;

        log::info!(
            "Exporting {} bars of {}: {:.2}s ({} frames) at {} Hz",
            self.settings.bars,
            meter,
            total_frames as f64 / sample_rate as f64,
            total_frames,
            self.settings.sample_rate
        );

        let mut samples = vec![0.0f32; total_frames];
        let mut voices = 0;
        let mut position = 0;
        let mut last_reported = 0;

        while position < total_frames {
            if scheduler.next_event_time() < cutoff {
                let mut sink = BoundedSink {
                    inner: &mut port,
                    end: cutoff,
                    accepted: 0,
                };
                let now = device.clock().seconds();
                scheduler.tick(now, pattern, meter, &mut sink);
                voices += sink.accepted;
            }

            let chunk = tick_frames.min(total_frames - position);
            device.render_into(&mut samples[position..position + chunk]);
            position += chunk;

            // Update progress callback about once per second of audio
            if let Some(callback) = progress.as_mut()
                && position - last_reported >= self.settings.sample_rate as usize
            {
                last_reported = position;
                callback(position as f32 / total_frames as f32);
            }
        }

        if let Some(callback) = progress.as_mut() {
            callback(1.0);
        }

        Ok((samples, voices))
    }

    /// Render and write a 16-bit PCM WAV file
    pub fn export(
        &self,
        path: &Path,
        pattern: &Pattern,
        meter: &Meter,
        mix: &MixBus,
        progress: Option<ProgressCallback<'_>>,
    ) -> Result<ExportSummary, ExportError> {
        let (samples, voices) = self.render(pattern, meter, mix, progress)?;

        let channels = self.settings.channels.max(1);
        let spec = WavSpec {
            channels,
            sample_rate: self.settings.sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        let mut writer = WavWriter::create(path, spec)?;
        for sample in &samples {
            let value = (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
            for _ in 0..channels {
                writer.write_sample(value)?;
            }
        }
        writer.finalize()?;

        let summary = ExportSummary {
            frames: samples.len(),
            duration_seconds: samples.len() as f64 / self.settings.sample_rate as f64,
            voices,
        };
        log::info!(
            "Exported {} ({:.2}s, {} voices)",
            path.display(),
            summary.duration_seconds,
            summary.voices
        );
        Ok(summary)
    }
}
