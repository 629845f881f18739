// Copyright (C) 2026 Michael Wilson <mike@mdwn.dev>
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
use std::fmt;

use crate::audio::Channel;
use crate::clips::Clip;

use super::VoiceId;

/// The playback state of a voice.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VoiceState {
    /// No clip assigned; free for the next play request.
    Idle,
    Playing,
    Paused,
}

/// A single playback channel and what it's currently doing.
///
/// A voice is Playing or Paused only while it has a clip; releasing it always clears
/// the clip.
pub struct Voice {
    /// Position in the pool.
    id: VoiceId,
    /// The hardware channel this voice drives.
    channel: Box<dyn Channel>,
    /// The clip being played, if any.
    clip: Option<Clip>,
    looping: bool,
    volume: f32,
    state: VoiceState,
}

impl Voice {
    /// Creates an idle voice on the given channel.
    pub(super) fn new(id: VoiceId, mut channel: Box<dyn Channel>, volume: f32) -> Voice {
        channel.set_volume(volume);
        Voice {
            id,
            channel,
            clip: None,
            looping: false,
            volume,
            state: VoiceState::Idle,
        }
    }

    pub fn id(&self) -> VoiceId {
        self.id
    }

    pub fn state(&self) -> VoiceState {
        self.state
    }

    pub fn is_idle(&self) -> bool {
        self.state == VoiceState::Idle
    }

    /// The assigned clip, if any.
    pub fn clip(&self) -> Option<&Clip> {
        self.clip.as_ref()
    }

    pub fn is_looping(&self) -> bool {
        self.looping
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    /// Assigns a clip and starts it from the beginning.
    pub(super) fn start(&mut self, clip: Clip, volume: f32, looping: bool) {
        self.channel.set_clip(Some(clip.clone()));
        self.channel.set_volume(volume);
        self.channel.set_loop(looping);
        self.channel.play();

        self.clip = Some(clip);
        self.volume = volume;
        self.looping = looping;
        self.state = VoiceState::Playing;
    }

    /// Pauses a playing voice. Returns false if the voice wasn't playing, including a
    /// one-shot whose clip has already run out.
    pub fn pause(&mut self) -> bool {
        if self.state != VoiceState::Playing || self.is_finished() {
            return false;
        }
        self.channel.pause();
        self.state = VoiceState::Paused;
        true
    }

    /// Continues a paused voice. Returns false if the voice wasn't paused.
    pub fn resume(&mut self) -> bool {
        if self.state != VoiceState::Paused {
            return false;
        }
        self.channel.play();
        self.state = VoiceState::Playing;
        true
    }

    /// Stops the voice, clears its clip and loop flag and makes it Idle. Safe to call
    /// on an idle voice.
    pub fn release(&mut self) {
        if self.is_idle() {
            return;
        }
        self.channel.stop();
        self.channel.set_loop(false);
        self.channel.set_clip(None);

        self.clip = None;
        self.looping = false;
        self.state = VoiceState::Idle;
    }

    pub fn set_volume(&mut self, volume: f32) {
        self.volume = volume;
        self.channel.set_volume(volume);
    }

    /// A one-shot voice whose clip has run out on the channel. Looping and paused voices
    /// never count as finished.
    pub fn is_finished(&self) -> bool {
        self.state == VoiceState::Playing && !self.looping && !self.channel.is_playing()
    }
}

impl fmt::Debug for Voice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Voice")
            .field("id", &self.id)
            .field("clip", &self.clip.as_ref().map(Clip::name))
            .field("looping", &self.looping)
            .field("volume", &self.volume)
            .field("state", &self.state)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::audio::{mock, Device as _};

    fn voice(device: &mock::Device) -> Voice {
        Voice::new(VoiceId::new(0), device.open_channel().unwrap(), 1.0)
    }

    #[test]
    fn test_state_transitions() {
        let device = mock::Device::get("mock");
        let mut voice = voice(&device);
        assert!(voice.is_idle());

        // Nothing to pause or resume yet.
        assert!(!voice.pause());
        assert!(!voice.resume());

        voice.start(Clip::silence("door", Duration::from_secs(1)), 0.7, false);
        assert_eq!(voice.state(), VoiceState::Playing);
        assert_eq!(voice.clip().map(Clip::name), Some("door"));
        assert_eq!(device.channel(0).unwrap().volume, 0.7);

        assert!(voice.pause());
        assert_eq!(voice.state(), VoiceState::Paused);
        assert!(!voice.pause());

        assert!(voice.resume());
        assert_eq!(voice.state(), VoiceState::Playing);
        assert_eq!(device.starts(), 1);
    }

    #[test]
    fn test_release_clears_clip() {
        let device = mock::Device::get("mock");
        let mut voice = voice(&device);

        voice.start(Clip::silence("hum", Duration::from_secs(1)), 1.0, true);
        voice.pause();
        voice.release();

        assert!(voice.is_idle());
        assert!(voice.clip().is_none());
        assert!(!voice.is_looping());

        let channel = device.channel(0).unwrap();
        assert!(channel.clip.is_none());
        assert!(!channel.looping);
        assert!(!channel.playing);

        // Releasing again changes nothing.
        voice.release();
        assert!(voice.is_idle());
    }

    #[test]
    fn test_is_finished() {
        let device = mock::Device::get("mock");
        let mut one_shot = voice(&device);
        let mut looping = Voice::new(VoiceId::new(1), device.open_channel().unwrap(), 1.0);

        one_shot.start(Clip::silence("coin", Duration::from_secs(1)), 1.0, false);
        looping.start(Clip::silence("hum", Duration::from_secs(1)), 1.0, true);
        assert!(!one_shot.is_finished());

        device.finish(0);
        device.finish(1);
        assert!(one_shot.is_finished());
        assert!(!looping.is_finished());

        // A paused voice isn't playing on the channel, but it isn't finished either.
        let mut paused = Voice::new(VoiceId::new(2), device.open_channel().unwrap(), 1.0);
        paused.start(Clip::silence("coin", Duration::from_secs(1)), 1.0, false);
        paused.pause();
        assert!(!paused.is_finished());
    }

    #[test]
    fn test_finished_voice_cannot_be_paused() {
        let device = mock::Device::get("mock");
        let mut voice = voice(&device);

        voice.start(Clip::silence("coin", Duration::from_secs(1)), 1.0, false);
        device.finish(0);

        assert!(!voice.pause());
        assert_eq!(voice.state(), VoiceState::Playing);
        assert!(!device.channel(0).unwrap().paused);

        // Nothing to resume, so the clip isn't started over.
        assert!(!voice.resume());
        assert_eq!(device.starts(), 1);
    }
}
