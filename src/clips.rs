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

//! Clip resolution.
//!
//! A clip is an immutable, named audio buffer with a fixed nominal duration. The
//! session never loads audio itself; it asks a [`ClipStore`] to resolve a logical
//! name. Two stores are provided:
//! - [`MemoryClipStore`] for clips registered up front (tests, synthesized sounds)
//! - [`FileClipStore`] for clips decoded from disk under a resource root

mod decode;
mod error;
mod loader;
mod memory;

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

pub use error::ClipError;
pub use loader::FileClipStore;
pub use memory::MemoryClipStore;

/// Sample rate used for generated silent clips.
const SILENCE_SAMPLE_RATE: u32 = 1000;

/// Resolves a logical sound name to a loaded clip.
pub trait ClipStore: Send + Sync {
    /// Resolves the clip with the given name.
    fn resolve(&self, name: &str) -> Result<Clip, ClipError>;
}

/// A loaded clip. The sample data is stored in an Arc so voices holding the same
/// clip share one buffer.
#[derive(Clone)]
pub struct Clip {
    /// The logical name the clip was resolved from.
    name: Arc<str>,
    /// The sample data as f32 samples (interleaved if multi-channel).
    data: Arc<Vec<f32>>,
    /// Number of channels in the clip.
    channel_count: u16,
    /// Sample rate of the audio data.
    sample_rate: u32,
    /// Nominal playback length.
    duration: Duration,
}

impl Clip {
    /// Creates a clip from interleaved samples.
    pub fn new(name: &str, data: Vec<f32>, channel_count: u16, sample_rate: u32) -> Clip {
        let channel_count = channel_count.max(1);
        let frames = data.len() as f64 / channel_count as f64;
        let duration = if sample_rate == 0 {
            Duration::ZERO
        } else {
            Duration::from_secs_f64(frames / sample_rate as f64)
        };

        Clip {
            name: Arc::from(name),
            data: Arc::new(data),
            channel_count,
            sample_rate,
            duration,
        }
    }

    /// Creates a mono clip of silence lasting the given duration.
    pub fn silence(name: &str, duration: Duration) -> Clip {
        let frames = (duration.as_secs_f64() * SILENCE_SAMPLE_RATE as f64).round() as usize;
        Clip::new(name, vec![0.0; frames], 1, SILENCE_SAMPLE_RATE)
    }

    /// The logical name of the clip.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The interleaved sample data.
    pub fn samples(&self) -> &[f32] {
        &self.data
    }

    /// Returns the number of channels.
    pub fn channel_count(&self) -> u16 {
        self.channel_count
    }

    /// Returns the sample rate.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Returns the nominal duration of the clip.
    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Returns the memory size in bytes.
    pub fn memory_size(&self) -> usize {
        self.data.len() * std::mem::size_of::<f32>()
    }

    /// Returns true if both clips share the same sample buffer.
    pub fn same_buffer(&self, other: &Clip) -> bool {
        Arc::ptr_eq(&self.data, &other.data)
    }
}

impl fmt::Debug for Clip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Clip")
            .field("name", &self.name)
            .field("channels", &self.channel_count)
            .field("sample_rate", &self.sample_rate)
            .field("duration", &self.duration)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clip_duration_from_frames() {
        // One second of stereo at 48kHz.
        let clip = Clip::new("stereo", vec![0.0; 96_000], 2, 48_000);
        assert_eq!(clip.duration(), Duration::from_secs(1));
        assert_eq!(clip.memory_size(), 96_000 * 4);
    }

    #[test]
    fn test_silence() {
        let clip = Clip::silence("gap", Duration::from_secs(2));
        assert_eq!(clip.duration(), Duration::from_secs(2));
        assert_eq!(clip.channel_count(), 1);
        assert!(clip.samples().iter().all(|s| *s == 0.0));
    }

    #[test]
    fn test_clones_share_buffer() {
        let clip = Clip::silence("gap", Duration::from_millis(10));
        let other = Clip::silence("gap", Duration::from_millis(10));
        assert!(clip.same_buffer(&clip.clone()));
        assert!(!clip.same_buffer(&other));
    }
}
