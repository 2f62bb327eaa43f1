// Moteur audio - Sortie CPAL temps-réel
//
// # Format Support
//
// Le stream est créé dans le format préféré du device :
// - **F32**: Floating point 32-bit (natif, pas de conversion nécessaire)
// - **I16**: Signed 16-bit integer (commun sur Windows/WASAPI)
// - **U16**: Unsigned 16-bit integer (moins courant)
//
// En interne tout le rendu se fait en f32; la conversion vers le format du
// device se fait à l'écriture dans le buffer de sortie, via `FromSample<f32>`.
//
// # Stream Limitations
//
// Sur macOS (CoreAudio), le Stream n'est pas Send/Sync. Le device reste donc
// sur le thread qui l'a créé; seul l'`EventPort` part vers le scheduler.

use cpal::traits::{DeviceTrait, StreamTrait};
use cpal::{Device, FromSample, SampleFormat, SizedSample, Stream, StreamConfig};

use super::AudioError;
use super::backend::{EventPort, OutputDevice};
use super::device::AudioDeviceManager;
use super::mixer::MixBus;
use super::renderer::AudioRenderer;
use super::timing::SampleClock;
use crate::connection::status::{AtomicDeviceStatus, DeviceStatus};
use crate::messaging::channels::{create_command_channel, create_recycle_channel};

/// Output sink on a sound card
///
/// Nothing is opened until the first `resume`; the stream is then kept and
/// later calls only restart it.
pub struct CpalDevice {
    device_name: Option<String>,
    queue_capacity: usize,
    stream: Option<Stream>,
    port: Option<EventPort>,
    pub status: AtomicDeviceStatus,
}

impl CpalDevice {
    /// `device_name` picks a named output, `None` the host default
    pub fn new(device_name: Option<String>, queue_capacity: usize) -> Self {
        Self {
            device_name,
            queue_capacity: queue_capacity.max(1),
            stream: None,
            port: None,
            status: AtomicDeviceStatus::new(DeviceStatus::Disconnected),
        }
    }

    pub fn sample_rate(&self) -> Option<f32> {
        self.port.as_ref().map(|port| port.sample_rate())
    }

    fn open(&mut self, mix: &MixBus) -> Result<EventPort, AudioError> {
        self.status.set(DeviceStatus::Connecting);

        let device = AudioDeviceManager::new().open_output(self.device_name.as_deref())?;
        log::info!(
            "Audio device: {}",
            device.name().unwrap_or_else(|_| "Unknown".to_string())
        );

        let supported_config = device.default_output_config()?;
        let sample_format = supported_config.sample_format();
        log::debug!("Audio config: {:?}", supported_config);

        let sample_rate = supported_config.sample_rate().0 as f32;
        let channels = supported_config.channels() as usize;
        let config: StreamConfig = supported_config.into();

        // Channels are created per attempt; a failed build leaves nothing behind
        let (command_tx, command_rx) = create_command_channel(self.queue_capacity);
        let (recycle_tx, recycle_rx) = create_recycle_channel(self.queue_capacity);
        let clock = SampleClock::new(sample_rate);
        let renderer = AudioRenderer::new(mix.clone(), command_rx, recycle_tx, clock.clone());

        let stream = match sample_format {
            SampleFormat::F32 => {
                Self::build_stream::<f32>(&device, &config, channels, renderer, self.status.clone())
            }
            SampleFormat::I16 => {
                Self::build_stream::<i16>(&device, &config, channels, renderer, self.status.clone())
            }
            SampleFormat::U16 => {
                Self::build_stream::<u16>(&device, &config, channels, renderer, self.status.clone())
            }
            other => Err(AudioError::UnsupportedFormat(other)),
        }?;

        stream.play()?;
        log::info!("Audio engine started: {} Hz, {} channels", sample_rate, channels);

        let port = EventPort::new(command_tx, recycle_rx, clock);
        self.stream = Some(stream);
        self.port = Some(port.clone());
        Ok(port)
    }

    /// Build an output stream for any sample type (f32, i16, u16)
    ///
    /// The renderer moves into the callback and is owned by the audio thread.
    fn build_stream<T>(
        device: &Device,
        config: &StreamConfig,
        channels: usize,
        mut renderer: AudioRenderer,
        status: AtomicDeviceStatus,
    ) -> Result<Stream, AudioError>
    where
        T: SizedSample + FromSample<f32> + Send + 'static,
    {
        let stream = device.build_output_stream(
            config,
            move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                // ========== SACRED ZONE ==========
                // No allocations, No I/O, No blocking locks
                renderer.render_interleaved(data, channels);
                // ========== SACRED ZONE END ==========
            },
            move |err| {
                // ========== ERROR CALLBACK ==========
                // Runs outside the audio callback, logging is fine here
                log::error!("Audio stream error: {}", err);
                status.set(DeviceStatus::Error);
            },
            None,
        )?;

        Ok(stream)
    }
}

/// What `resume` does with the output it already has
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ResumeAction {
    /// Restart the kept stream and hand out the same port
    Replay,
    /// Build a new stream, dropping a failed one if any
    Open,
}

/// A stream that reported an error is never replayed
fn resume_action(has_stream: bool, status: DeviceStatus) -> ResumeAction {
    if has_stream && status != DeviceStatus::Error {
        ResumeAction::Replay
    } else {
        ResumeAction::Open
    }
}

impl CpalDevice {
    fn replay(&self) -> Result<EventPort, AudioError> {
        match (&self.stream, &self.port) {
            (Some(stream), Some(port)) => {
                stream.play()?;
                Ok(port.clone())
            }
            _ => Err(AudioError::NoOutputDevice),
        }
    }

    fn reopen(&mut self, mix: &MixBus) -> Result<EventPort, AudioError> {
        if self.stream.take().is_some() {
            log::warn!("Output stream failed earlier, opening a new one");
        }
        self.port = None;
        self.open(mix)
    }
}

impl OutputDevice for CpalDevice {
    fn resume(&mut self, mix: &MixBus) -> Result<EventPort, AudioError> {
        let has_stream = self.stream.is_some() && self.port.is_some();
        let result = match resume_action(has_stream, self.status.get()) {
            ResumeAction::Replay => self.replay(),
            ResumeAction::Open => self.reopen(mix),
        };

        match result {
            Ok(port) => {
                self.status.set(DeviceStatus::Connected);
                Ok(port)
            }
            Err(e) => {
                self.status.set(DeviceStatus::Error);
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_resume_opens() {
        assert_eq!(
            resume_action(false, DeviceStatus::Disconnected),
            ResumeAction::Open
        );
    }

    #[test]
    fn test_healthy_stream_is_replayed() {
        assert_eq!(
            resume_action(true, DeviceStatus::Connected),
            ResumeAction::Replay
        );
    }

    #[test]
    fn test_failed_stream_is_reopened() {
        assert_eq!(resume_action(true, DeviceStatus::Error), ResumeAction::Open);
        assert_eq!(resume_action(false, DeviceStatus::Error), ResumeAction::Open);
    }

    #[test]
    fn test_stream_error_blocks_replay() {
        // Status shared with the error callback
        let device = CpalDevice::new(None, 16);
        let callback_status = device.status.clone();
        assert_eq!(device.status.get(), DeviceStatus::Disconnected);

        callback_status.set(DeviceStatus::Error);
        assert_eq!(
            resume_action(true, device.status.get()),
            ResumeAction::Open
        );
    }
}
