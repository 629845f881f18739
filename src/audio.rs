// Copyright (C) 2025 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//
use std::{fmt, sync::Arc};

use crate::clips::Clip;
use crate::config;
use crate::error::SoundError;

pub mod mock;
#[cfg(feature = "rodio")]
pub mod output;

/// A single physical playback channel. Holds at most one clip at a time.
pub trait Channel: Send {
    /// Assigns the clip to play, or clears it.
    fn set_clip(&mut self, clip: Option<Clip>);

    fn set_volume(&mut self, volume: f32);

    fn set_loop(&mut self, looping: bool);

    /// Starts the assigned clip from the beginning, or continues it if paused.
    fn play(&mut self);

    fn pause(&mut self);

    /// Stops playback and rewinds.
    fn stop(&mut self);

    /// Returns true while audio is audibly playing. False when paused, stopped or
    /// when a one-shot clip has run out.
    fn is_playing(&self) -> bool;
}

/// An output that can open playback channels.
pub trait Device: fmt::Display + Send + Sync {
    /// Opens a new channel on this device.
    fn open_channel(&self) -> Result<Box<dyn Channel>, SoundError>;
}

/// Gets a device matching the given configuration.
pub fn get_device(config: &config::Audio) -> Result<Arc<dyn Device>, SoundError> {
    let device = config.device();
    if device.starts_with("mock") {
        return Ok(Arc::new(mock::Device::get(device)));
    };

    #[cfg(feature = "rodio")]
    {
        Ok(Arc::new(output::Device::get(device)?))
    }

    #[cfg(not(feature = "rodio"))]
    {
        Err(SoundError::Device(format!(
            "no audio backend available for device {}; enable the rodio feature",
            device
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_mock_device() {
        let device = get_device(&config::Audio::new("mock-speaker")).unwrap();
        assert_eq!(device.to_string(), "mock-speaker (Mock)");
        assert!(device.open_channel().is_ok());
    }

    #[cfg(not(feature = "rodio"))]
    #[test]
    fn test_hardware_device_requires_backend() {
        assert!(matches!(
            get_device(&config::Audio::new("default")),
            Err(SoundError::Device(_))
        ));
    }
}
