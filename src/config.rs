// Configuration - RON file with every field defaulted

use crate::audio::mixer::{Bus, MixBus};
use crate::sequencer::{Meter, SchedulerConfig, Subdivision, Tempo, TimeSignature};
use ron::ser::PrettyConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("RON parse error: {0}")]
    Parse(#[from] ron::error::SpannedError),

    #[error("RON write error: {0}")]
    Serialize(#[from] ron::Error),
}

/// Meter the session starts with
///
/// Stored raw; out-of-range values are coerced when turned into a [`Meter`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeterConfig {
    pub bpm: f64,
    pub numerator: u8,
    pub denominator: u8,
    /// Steps per beat: 2 (eighths) or 4 (sixteenths)
    pub subdivision: u8,
}

impl MeterConfig {
    pub fn meter(&self) -> Meter {
        Meter::new(
            Tempo::new(self.bpm),
            TimeSignature::new(self.numerator, self.denominator),
            Subdivision::from_steps(self.subdivision),
        )
    }
}

impl Default for MeterConfig {
    fn default() -> Self {
        Self {
            bpm: Tempo::DEFAULT_BPM,
            numerator: 4,
            denominator: 4,
            subdivision: 4,
        }
    }
}

/// Initial mix volumes, each in [0, 1]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VolumeConfig {
    pub master: f32,
    pub hihat: f32,
    pub snare: f32,
    pub kick: f32,
}

impl VolumeConfig {
    pub fn mix_bus(&self) -> MixBus {
        MixBus::new(self.master, self.hihat, self.snare, self.kick)
    }

    pub fn volume(&self, bus: Bus) -> f32 {
        match bus {
            Bus::Master => self.master,
            Bus::HiHat => self.hihat,
            Bus::Snare => self.snare,
            Bus::Kick => self.kick,
        }
    }
}

impl Default for VolumeConfig {
    fn default() -> Self {
        Self {
            master: MixBus::DEFAULT_MASTER,
            hihat: MixBus::DEFAULT_HIHAT,
            snare: MixBus::DEFAULT_SNARE,
            kick: MixBus::DEFAULT_KICK,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DrumConfig {
    pub scheduler: SchedulerConfig,
    pub meter: MeterConfig,
    pub volumes: VolumeConfig,
    /// Output device name, host default when absent
    pub device: Option<String>,
}

impl DrumConfig {
    /// `<config_dir>/drumloop/config.ron`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("drumloop").join("config.ron"))
    }

    pub fn from_ron(text: &str) -> Result<Self, ConfigError> {
        Ok(ron::from_str(text)?)
    }

    pub fn to_ron(&self) -> Result<String, ConfigError> {
        Ok(ron::ser::to_string_pretty(self, PrettyConfig::default())?)
    }

    /// Read a config file; a missing file gives the defaults
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match fs::read_to_string(path) {
            Ok(text) => {
                let config = Self::from_ron(&text)?;
                log::info!("Loaded config from {}", path.display());
                Ok(config)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("No config at {}, using defaults", path.display());
                Ok(Self::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Load from `path`, or from the default location when `None`
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None => match Self::default_path() {
                Some(path) => Self::load(&path),
                None => Ok(Self::default()),
            },
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.to_ron()?)?;
        Ok(())
    }
}
