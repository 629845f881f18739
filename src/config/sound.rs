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
use std::path::{Path, PathBuf};

use config::{Config, File};
use serde::Deserialize;

use super::audio::Audio;
use super::error::ConfigError;

/// Default number of voices added each time the pool saturates. Also the pool floor.
pub const DEFAULT_GROWTH_BATCH_SIZE: usize = 4;

/// Default directory effect clip names are resolved under.
pub const DEFAULT_CLIP_ROOT: &str = "Sound/EffectSound";

/// Volume used when no volume has been persisted yet.
pub const DEFAULT_VOLUME: f32 = 1.0;

/// The configuration for an effect sound session.
#[derive(Deserialize, Clone, Debug, Default)]
pub struct SoundConfig {
    /// Voices added per growth step, and the minimum standing pool size.
    growth_batch_size: Option<usize>,

    /// Root directory for clip files.
    clip_root: Option<PathBuf>,

    /// Where preferences are persisted. In memory only when unset.
    settings_file: Option<PathBuf>,

    /// Whether effect sounds are on before the user has ever toggled them.
    enabled_by_default: Option<bool>,

    /// Volume before the user has ever set one.
    default_volume: Option<f32>,

    /// The audio output configuration.
    #[serde(default)]
    audio: Audio,
}

impl SoundConfig {
    /// Creates a configuration with the given growth batch size and defaults otherwise.
    pub fn new(growth_batch_size: usize) -> SoundConfig {
        SoundConfig {
            growth_batch_size: Some(growth_batch_size),
            ..Default::default()
        }
    }

    /// Parse a sound configuration from a YAML file.
    pub fn deserialize(path: &Path) -> Result<SoundConfig, ConfigError> {
        let config = Config::builder()
            .add_source(File::from(path))
            .build()?
            .try_deserialize::<SoundConfig>()?;
        config.validate()?;
        Ok(config)
    }

    /// Checks values that deserialize fine but can't be used.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.growth_batch_size == Some(0) {
            return Err(ConfigError::Invalid(
                "growth_batch_size must be at least 1".to_string(),
            ));
        }
        if let Some(volume) = self.default_volume {
            if !volume.is_finite() || volume < 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "default_volume must be a non-negative number, got {}",
                    volume
                )));
            }
        }
        Ok(())
    }

    /// Returns the growth batch size (default: 4).
    pub fn growth_batch_size(&self) -> usize {
        self.growth_batch_size
            .unwrap_or(DEFAULT_GROWTH_BATCH_SIZE)
            .max(1)
    }

    /// Returns the clip root directory (default: Sound/EffectSound).
    pub fn clip_root(&self) -> PathBuf {
        self.clip_root
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CLIP_ROOT))
    }

    /// Returns the settings file, if preferences should be persisted to disk.
    pub fn settings_file(&self) -> Option<&Path> {
        self.settings_file.as_deref()
    }

    /// Returns whether effect sounds start enabled (default: true).
    pub fn enabled_by_default(&self) -> bool {
        self.enabled_by_default.unwrap_or(true)
    }

    /// Returns the initial volume (default: 1.0).
    pub fn default_volume(&self) -> f32 {
        self.default_volume.unwrap_or(DEFAULT_VOLUME)
    }

    /// Returns the audio output configuration.
    pub fn audio(&self) -> &Audio {
        &self.audio
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn test_defaults() {
        let config = SoundConfig::default();
        assert_eq!(config.growth_batch_size(), 4);
        assert_eq!(config.clip_root(), PathBuf::from("Sound/EffectSound"));
        assert!(config.settings_file().is_none());
        assert!(config.enabled_by_default());
        assert_eq!(config.default_volume(), 1.0);
        assert_eq!(config.audio().device(), "default");
    }

    #[test]
    fn test_deserialize_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sound.yaml");
        fs::write(
            &path,
            "growth_batch_size: 8\n\
             clip_root: assets/sfx\n\
             settings_file: prefs.yaml\n\
             enabled_by_default: false\n\
             default_volume: 0.5\n\
             audio:\n  device: mock-speaker\n",
        )
        .unwrap();

        let config = SoundConfig::deserialize(&path).unwrap();
        assert_eq!(config.growth_batch_size(), 8);
        assert_eq!(config.clip_root(), PathBuf::from("assets/sfx"));
        assert_eq!(config.settings_file(), Some(Path::new("prefs.yaml")));
        assert!(!config.enabled_by_default());
        assert_eq!(config.default_volume(), 0.5);
        assert_eq!(config.audio().device(), "mock-speaker");
    }

    #[test]
    fn test_zero_batch_size_is_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sound.yaml");
        fs::write(&path, "growth_batch_size: 0\n").unwrap();

        assert!(matches!(
            SoundConfig::deserialize(&path),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            SoundConfig::deserialize(&dir.path().join("nope.yaml")),
            Err(ConfigError::Load(_))
        ));
    }
}
