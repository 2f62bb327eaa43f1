// Module audio - Gestion du backend CPAL et rendu temps-réel

pub mod backend;
pub mod device;
pub mod dsp_utils;
pub mod engine;
pub mod export;
pub mod mixer;
pub mod offline;
pub mod parameters;
pub mod renderer;
pub mod timing;

use thiserror::Error;

/// Failure to create or resume the output sink
#[derive(Debug, Error)]
pub enum AudioError {
    #[error("no audio output device found")]
    NoOutputDevice,

    #[error("audio output device not found: {0}")]
    DeviceNotFound(String),

    #[error("failed to query output configuration: {0}")]
    Config(#[from] cpal::DefaultStreamConfigError),

    #[error("unsupported sample format: {0:?}. Supported formats: F32, I16, U16")]
    UnsupportedFormat(cpal::SampleFormat),

    #[error("failed to build output stream: {0}")]
    BuildStream(#[from] cpal::BuildStreamError),

    #[error("failed to start output stream: {0}")]
    PlayStream(#[from] cpal::PlayStreamError),
}
