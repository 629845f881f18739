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
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::RwLock;

use super::{Clip, ClipError, ClipStore};

/// A clip store backed by clips registered in memory.
#[derive(Default)]
pub struct MemoryClipStore {
    clips: RwLock<HashMap<String, Clip>>,
    /// Number of resolve calls served, hit or miss.
    resolutions: AtomicUsize,
}

impl MemoryClipStore {
    /// Creates an empty store.
    pub fn new() -> MemoryClipStore {
        MemoryClipStore::default()
    }

    /// Registers a clip under its own name, replacing any clip with that name.
    pub fn insert(&self, clip: Clip) {
        self.clips.write().insert(clip.name().to_string(), clip);
    }

    /// Builder-style variant of `insert`.
    pub fn with_clip(self, clip: Clip) -> MemoryClipStore {
        self.insert(clip);
        self
    }

    /// Returns how many times `resolve` has been called.
    pub fn resolutions(&self) -> usize {
        self.resolutions.load(Ordering::Relaxed)
    }
}

impl ClipStore for MemoryClipStore {
    fn resolve(&self, name: &str) -> Result<Clip, ClipError> {
        self.resolutions.fetch_add(1, Ordering::Relaxed);
        self.clips
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| ClipError::NotFound(name.to_string()))
    }
}

impl std::fmt::Debug for MemoryClipStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryClipStore")
            .field("clips", &self.clips.read().len())
            .finish()
    }
}
