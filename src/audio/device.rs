// Gestion des devices audio CPAL

use super::AudioError;
use cpal::traits::{DeviceTrait, HostTrait};
use cpal::{Device, Host};

#[derive(Clone, Debug)]
pub struct AudioDeviceInfo {
    pub id: String,
    pub name: String,
    pub is_default: bool,
}

pub struct AudioDeviceManager {
    host: Host,
}

impl AudioDeviceManager {
    pub fn new() -> Self {
        Self {
            host: cpal::default_host(),
        }
    }

    /// Liste tous les périphériques de sortie audio disponibles
    pub fn list_output_devices(&self) -> Vec<AudioDeviceInfo> {
        let mut devices = Vec::new();

        let default_name = self
            .host
            .default_output_device()
            .and_then(|d| d.name().ok())
            .unwrap_or_default();

        // Énumérer tous les périphériques de sortie
        match self.host.output_devices() {
            Ok(output_devices) => {
                for (index, device) in output_devices.enumerate() {
                    if let Ok(name) = device.name() {
                        devices.push(AudioDeviceInfo {
                            id: format!("audio_out_{}", index),
                            is_default: name == default_name,
                            name,
                        });
                    }
                }
            }
            Err(e) => log::warn!("Cannot enumerate output devices: {}", e),
        }

        devices
    }

    /// Périphérique demandé par nom, sinon celui par défaut
    pub fn open_output(&self, device_name: Option<&str>) -> Result<Device, AudioError> {
        match device_name {
            Some(name) => self
                .get_output_device_by_name(name)
                .ok_or_else(|| AudioError::DeviceNotFound(name.to_string())),
            None => self
                .host
                .default_output_device()
                .ok_or(AudioError::NoOutputDevice),
        }
    }

    /// Récupère un périphérique par son nom
    pub fn get_output_device_by_name(&self, device_name: &str) -> Option<Device> {
        if let Ok(devices) = self.host.output_devices() {
            for device in devices {
                if let Ok(name) = device.name()
                    && name == device_name
                {
                    return Some(device);
                }
            }
        }
        None
    }
}

impl Default for AudioDeviceManager {
    fn default() -> Self {
        Self::new()
    }
}
