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
use crate::clips::ClipError;
use crate::config::ConfigError;
use crate::settings::SettingsError;
use crate::voices::VoiceId;

/// Errors surfaced by the sound session and the voice pool.
///
/// None of these are fatal: every failure degrades to "the requested playback did
/// not happen".
#[derive(Debug, thiserror::Error)]
pub enum SoundError {
    #[error("clip {name} does not exist: {source}")]
    ClipNotFound {
        name: String,
        #[source]
        source: ClipError,
    },

    #[error("voice {id} is not in range (pool size {len})")]
    OutOfRange { id: VoiceId, len: usize },

    #[error("audio device error: {0}")]
    Device(String),

    #[error(transparent)]
    Settings(#[from] SettingsError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

#[cfg(test)]
mod tests {
    use std::error::Error;

    use super::*;

    #[test]
    fn test_error_display() {
        let err = SoundError::OutOfRange {
            id: VoiceId::new(9),
            len: 4,
        };
        assert_eq!(err.to_string(), "voice 9 is not in range (pool size 4)");
    }

    #[test]
    fn test_clip_not_found_source_chain() {
        let err = SoundError::ClipNotFound {
            name: "coin".to_string(),
            source: ClipError::NotFound("Sound/EffectSound/coin".to_string()),
        };
        assert!(err.source().is_some());
        assert!(err.to_string().starts_with("clip coin does not exist"));
    }
}
