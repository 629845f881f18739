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

//! Pooled effect-sound playback.
//!
//! A [`SoundSession`] plays short clips on a pool of voices that grows in batches when
//! every voice is busy, tracks which voices are playing or paused and applies a global
//! enabled flag and volume. Clips come from a [`ClipStore`], preferences from a
//! [`SettingsStore`] and voices from an [`audio::Device`].

pub mod audio;
pub mod clips;
pub mod config;
mod error;
mod playsync;
pub mod scheduler;
mod session;
pub mod settings;
pub mod voices;
#[cfg(test)]
mod testutil;

pub use clips::{Clip, ClipError, ClipStore, FileClipStore, MemoryClipStore};
pub use config::SoundConfig;
pub use error::SoundError;
pub use playsync::CancelHandle;
pub use scheduler::Sequence;
pub use session::SoundSession;
pub use settings::{FileSettings, MemorySettings, SettingsStore};
pub use voices::{VoiceId, VoiceState};
