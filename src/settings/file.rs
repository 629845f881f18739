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
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use config::{Config, File, FileFormat};
use parking_lot::RwLock;
use tracing::{debug, info};

use super::{SettingValue, SettingsError, SettingsStore};

/// Settings persisted to a YAML file. The whole file is rewritten on every change.
#[derive(Debug)]
pub struct FileSettings {
    path: PathBuf,
    values: RwLock<BTreeMap<String, SettingValue>>,
}

impl FileSettings {
    /// Opens the settings file at `path`. A missing file starts out empty and is
    /// created on the first write.
    pub fn open(path: impl Into<PathBuf>) -> Result<FileSettings, SettingsError> {
        let path = path.into();
        let values = if path.exists() {
            let values = Config::builder()
                .add_source(File::from(path.as_path()).format(FileFormat::Yaml))
                .build()
                .and_then(|config| config.try_deserialize::<BTreeMap<String, SettingValue>>())
                .map_err(|source| SettingsError::Load {
                    path: path.display().to_string(),
                    source,
                })?;
            info!(path = ?path, count = values.len(), "Loaded settings");
            values
        } else {
            debug!(path = ?path, "No settings file yet, starting empty");
            BTreeMap::new()
        };

        Ok(FileSettings {
            path,
            values: RwLock::new(values),
        })
    }

    /// Returns the settings file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, values: &BTreeMap<String, SettingValue>) -> Result<(), SettingsError> {
        let io_error = |source| SettingsError::Io {
            path: self.path.display().to_string(),
            source,
        };

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(io_error)?;
            }
        }
        fs::write(&self.path, serde_yml::to_string(values)?).map_err(io_error)
    }
}

impl SettingsStore for FileSettings {
    fn get(&self, key: &str) -> Option<SettingValue> {
        self.values.read().get(key).copied()
    }

    fn set(&self, key: &str, value: SettingValue) -> Result<(), SettingsError> {
        let mut values = self.values.write();
        values.insert(key.to_string(), value);
        self.persist(&values)
    }
}
