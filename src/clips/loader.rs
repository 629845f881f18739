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

//! Clip loading and caching from disk.
//!
//! Clips are decoded entirely into memory on first request for zero-latency playback
//! and kept for the lifetime of the store.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use tracing::{debug, info};

use super::decode::decode_file;
use super::{Clip, ClipError, ClipStore};

/// Extensions tried, in order, for names given without one.
const KNOWN_EXTENSIONS: [&str; 5] = ["wav", "ogg", "mp3", "flac", "m4a"];

/// Resolves clip names to files under a resource root and caches the decoded audio.
pub struct FileClipStore {
    /// Root directory that clip names are relative to.
    root: PathBuf,
    /// Cache of loaded clips by file path.
    cache: Mutex<HashMap<PathBuf, Clip>>,
}

impl FileClipStore {
    /// Creates a new store rooted at the given directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the resource root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Maps a clip name onto an existing file under the root.
    fn resource_path(&self, name: &str) -> Option<PathBuf> {
        let base = self.root.join(name);
        if base.extension().is_some() && base.is_file() {
            return Some(base);
        }

        KNOWN_EXTENSIONS
            .iter()
            .map(|ext| {
                let mut candidate = base.clone().into_os_string();
                candidate.push(".");
                candidate.push(ext);
                PathBuf::from(candidate)
            })
            .find(|candidate| candidate.is_file())
    }

    /// Returns the number of cached clips.
    pub fn cached_count(&self) -> usize {
        self.cache.lock().len()
    }

    /// Returns the total memory used by cached clips.
    pub fn total_memory_usage(&self) -> usize {
        self.cache.lock().values().map(|c| c.memory_size()).sum()
    }
}

impl ClipStore for FileClipStore {
    fn resolve(&self, name: &str) -> Result<Clip, ClipError> {
        let path = self
            .resource_path(name)
            .ok_or_else(|| ClipError::NotFound(self.root.join(name).display().to_string()))?;

        // Check cache first
        if let Some(clip) = self.cache.lock().get(&path) {
            debug!(path = ?path, "Using cached clip");
            return Ok(clip.clone());
        }

        info!(path = ?path, "Loading clip into memory");
        let decoded = decode_file(&path)?;
        let clip = Clip::new(
            name,
            decoded.samples,
            decoded.channel_count,
            decoded.sample_rate,
        );

        info!(
            path = ?path,
            channels = clip.channel_count(),
            sample_rate = clip.sample_rate(),
            duration_ms = clip.duration().as_millis(),
            memory_kb = clip.memory_size() / 1024,
            "Clip loaded"
        );

        // Another caller may have loaded the same file meanwhile; keep the first copy.
        Ok(self.cache.lock().entry(path).or_insert(clip).clone())
    }
}

impl std::fmt::Debug for FileClipStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileClipStore")
            .field("root", &self.root)
            .field("cached_clips", &self.cached_count())
            .field("total_memory_kb", &(self.total_memory_usage() / 1024))
            .finish()
    }
}
