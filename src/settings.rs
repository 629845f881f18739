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

//! Persisted user preferences.
//!
//! The session reads its enabled flag and volume once at construction and writes them
//! back on every change.

mod file;
mod memory;

use serde::{Deserialize, Serialize};

pub use file::FileSettings;
pub use memory::MemorySettings;

/// Key holding the effect sound enabled flag (1 = on, 0 = off).
pub const EFFECT_SOUND_ENABLED_KEY: &str = "effect_sound_enabled";

/// Key holding the effect sound volume.
pub const EFFECT_SOUND_VOLUME_KEY: &str = "effect_sound_volume";

/// Error types for settings persistence.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("failed to load settings from {path}: {source}")]
    Load {
        path: String,
        #[source]
        source: config::ConfigError,
    },

    #[error("failed to serialize settings: {0}")]
    Serialize(#[from] serde_yml::Error),

    #[error("failed to write settings to {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// A stored preference value.
#[derive(Deserialize, Serialize, Clone, Copy, Debug, PartialEq)]
#[serde(untagged)]
pub enum SettingValue {
    Int(i64),
    Float(f64),
}

impl SettingValue {
    fn as_int(self) -> i64 {
        match self {
            SettingValue::Int(value) => value,
            SettingValue::Float(value) => value as i64,
        }
    }

    fn as_float(self) -> f32 {
        match self {
            SettingValue::Int(value) => value as f32,
            SettingValue::Float(value) => value as f32,
        }
    }
}

/// A key-value preference store.
pub trait SettingsStore: Send + Sync {
    /// Returns the raw value stored under `key`, if any.
    fn get(&self, key: &str) -> Option<SettingValue>;

    /// Stores `value` under `key`.
    fn set(&self, key: &str, value: SettingValue) -> Result<(), SettingsError>;

    /// Returns the integer stored under `key`, or `default`.
    fn get_int(&self, key: &str, default: i64) -> i64 {
        self.get(key).map(SettingValue::as_int).unwrap_or(default)
    }

    /// Returns the float stored under `key`, or `default`.
    fn get_float(&self, key: &str, default: f32) -> f32 {
        self.get(key).map(SettingValue::as_float).unwrap_or(default)
    }

    fn set_int(&self, key: &str, value: i64) -> Result<(), SettingsError> {
        self.set(key, SettingValue::Int(value))
    }

    fn set_float(&self, key: &str, value: f32) -> Result<(), SettingsError> {
        self.set(key, SettingValue::Float(value as f64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_missing() {
        let settings = MemorySettings::new();
        assert_eq!(settings.get_int(EFFECT_SOUND_ENABLED_KEY, 1), 1);
        assert_eq!(settings.get_float(EFFECT_SOUND_VOLUME_KEY, 0.5), 0.5);
    }

    #[test]
    fn test_numeric_coercion() {
        let settings = MemorySettings::new();
        settings.set_int("volume", 1).unwrap();
        settings.set_float("flag", 1.0).unwrap();

        assert_eq!(settings.get_float("volume", 0.0), 1.0);
        assert_eq!(settings.get_int("flag", 0), 1);
    }
}
