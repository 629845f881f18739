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

use parking_lot::Mutex;
use tracing::debug;

use crate::clips::Clip;
use crate::error::SoundError;

/// Everything a mock channel has been told to do.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ChannelState {
    /// Name of the assigned clip.
    pub clip: Option<String>,
    pub volume: f32,
    pub looping: bool,
    pub playing: bool,
    pub paused: bool,
    /// Number of times playback was started from the beginning.
    pub starts: usize,
}

/// A mock device. Doesn't actually play anything, but remembers every channel it opened.
#[derive(Clone)]
pub struct Device {
    name: String,
    channels: Arc<Mutex<Vec<Arc<Mutex<ChannelState>>>>>,
    /// Opening fails once this many channels exist.
    channel_limit: Option<usize>,
}

impl Device {
    /// Gets the given mock device.
    pub fn get(name: &str) -> Device {
        Device {
            name: name.to_string(),
            channels: Arc::new(Mutex::new(Vec::new())),
            channel_limit: None,
        }
    }

    /// A mock device that refuses to open more than `limit` channels.
    pub fn with_channel_limit(name: &str, limit: usize) -> Device {
        Device {
            channel_limit: Some(limit),
            ..Device::get(name)
        }
    }

    /// Number of channels opened so far.
    pub fn channel_count(&self) -> usize {
        self.channels.lock().len()
    }

    /// Snapshot of the channel opened at `index`.
    pub fn channel(&self, index: usize) -> Option<ChannelState> {
        self.channels
            .lock()
            .get(index)
            .map(|state| state.lock().clone())
    }

    /// Total number of playback starts across every channel ever opened.
    pub fn starts(&self) -> usize {
        self.channels
            .lock()
            .iter()
            .map(|state| state.lock().starts)
            .sum()
    }

    /// Simulates a one-shot clip running out on the channel at `index`. Looping channels
    /// never run out.
    pub fn finish(&self, index: usize) {
        if let Some(state) = self.channels.lock().get(index) {
            let mut state = state.lock();
            if !state.looping {
                state.playing = false;
            }
        }
    }
}

impl crate::audio::Device for Device {
    fn open_channel(&self) -> Result<Box<dyn crate::audio::Channel>, SoundError> {
        let mut channels = self.channels.lock();
        if self.channel_limit.is_some_and(|limit| channels.len() >= limit) {
            return Err(SoundError::Device(format!(
                "{} cannot open more than {} channels",
                self.name,
                channels.len()
            )));
        }

        let state = Arc::new(Mutex::new(ChannelState::default()));
        channels.push(state.clone());
        debug!(device = self.name, index = channels.len() - 1, "Opened mock channel");

        Ok(Box::new(Channel { state }))
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (Mock)", self.name,)
    }
}

/// A mock channel that records its state in the owning device.
struct Channel {
    state: Arc<Mutex<ChannelState>>,
}

impl crate::audio::Channel for Channel {
    fn set_clip(&mut self, clip: Option<Clip>) {
        let mut state = self.state.lock();
        state.clip = clip.map(|clip| clip.name().to_string());
        if state.clip.is_none() {
            state.playing = false;
            state.paused = false;
        }
    }

    fn set_volume(&mut self, volume: f32) {
        self.state.lock().volume = volume;
    }

    fn set_loop(&mut self, looping: bool) {
        self.state.lock().looping = looping;
    }

    fn play(&mut self) {
        let mut state = self.state.lock();
        if state.clip.is_none() {
            return;
        }
        if !state.paused {
            state.starts += 1;
        }
        state.paused = false;
        state.playing = true;
    }

    fn pause(&mut self) {
        let mut state = self.state.lock();
        if state.playing {
            state.playing = false;
            state.paused = true;
        }
    }

    fn stop(&mut self) {
        let mut state = self.state.lock();
        state.playing = false;
        state.paused = false;
    }

    fn is_playing(&self) -> bool {
        self.state.lock().playing
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::audio::Device as _;

    #[test]
    fn test_channel_lifecycle() {
        let device = Device::get("mock");
        let mut channel = device.open_channel().unwrap();

        // Nothing to play yet.
        channel.play();
        assert!(!channel.is_playing());

        channel.set_clip(Some(Clip::silence("coin", Duration::from_secs(1))));
        channel.set_volume(0.5);
        channel.play();
        assert!(channel.is_playing());

        channel.pause();
        assert!(!channel.is_playing());
        assert!(device.channel(0).unwrap().paused);

        // Resuming doesn't count as a new start.
        channel.play();
        assert!(channel.is_playing());
        assert_eq!(device.starts(), 1);

        channel.stop();
        assert!(!channel.is_playing());

        let state = device.channel(0).unwrap();
        assert_eq!(state.clip.as_deref(), Some("coin"));
        assert_eq!(state.volume, 0.5);
    }

    #[test]
    fn test_finish_ignores_looping_channels() {
        let device = Device::get("mock");
        let mut one_shot = device.open_channel().unwrap();
        let mut looping = device.open_channel().unwrap();

        for channel in [&mut one_shot, &mut looping] {
            channel.set_clip(Some(Clip::silence("hum", Duration::from_secs(1))));
        }
        looping.set_loop(true);
        one_shot.play();
        looping.play();

        device.finish(0);
        device.finish(1);
        assert!(!one_shot.is_playing());
        assert!(looping.is_playing());
    }

    #[test]
    fn test_channel_limit() {
        let device = Device::with_channel_limit("mock", 1);
        assert!(device.open_channel().is_ok());
        assert!(matches!(device.open_channel(), Err(SoundError::Device(_))));
        assert_eq!(device.channel_count(), 1);
    }
}
