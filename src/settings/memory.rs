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

use parking_lot::RwLock;

use super::{SettingValue, SettingsError, SettingsStore};

/// Settings kept in memory only. Nothing survives the process.
#[derive(Default, Debug)]
pub struct MemorySettings {
    values: RwLock<BTreeMap<String, SettingValue>>,
}

impl MemorySettings {
    pub fn new() -> MemorySettings {
        MemorySettings::default()
    }
}

impl SettingsStore for MemorySettings {
    fn get(&self, key: &str) -> Option<SettingValue> {
        self.values.read().get(key).copied()
    }

    fn set(&self, key: &str, value: SettingValue) -> Result<(), SettingsError> {
        self.values.write().insert(key.to_string(), value);
        Ok(())
    }
}
