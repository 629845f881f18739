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
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::task::AbortHandle;
use tracing::{debug, error, info, warn};

use crate::audio::{self, Device};
use crate::clips::{Clip, ClipStore, FileClipStore};
use crate::config::SoundConfig;
use crate::error::SoundError;
use crate::playsync::CancelHandle;
use crate::scheduler::{self, Sequence};
use crate::settings::{
    FileSettings, MemorySettings, SettingsStore, EFFECT_SOUND_ENABLED_KEY,
    EFFECT_SOUND_VOLUME_KEY,
};
use crate::voices::{VoiceId, VoicePool, VoiceState};

/// The effect sound session. Plays clips on pooled voices and applies the global
/// enabled flag and volume.
///
/// Cloning is cheap; clones share the same pool.
#[derive(Clone)]
pub struct SoundSession {
    inner: Arc<Inner>,
}

struct Inner {
    /// Everything a play or stop request mutates, under one lock.
    state: Mutex<State>,
    clips: Arc<dyn ClipStore>,
    settings: Arc<dyn SettingsStore>,
    /// Clips resolved so far, by name.
    clip_cache: Mutex<HashMap<String, Clip>>,
    /// Repeat-play sequences that may still be running.
    sequences: Mutex<Vec<(CancelHandle, AbortHandle)>>,
}

struct State {
    pool: VoicePool,
    /// Voices paused by either `pause` or `pause_all`.
    paused: BTreeSet<VoiceId>,
    enabled: bool,
    volume: f32,
    /// Looping clips cut off by the last disable.
    pending_loops: Vec<Clip>,
}

impl SoundSession {
    /// Creates a session. The enabled flag and volume are read from `settings`, falling
    /// back to the configured defaults.
    pub fn new(
        config: &SoundConfig,
        device: Arc<dyn Device>,
        clips: Arc<dyn ClipStore>,
        settings: Arc<dyn SettingsStore>,
    ) -> Result<SoundSession, SoundError> {
        let default_enabled = i64::from(config.enabled_by_default());
        let enabled = settings.get_int(EFFECT_SOUND_ENABLED_KEY, default_enabled) != 0;
        let volume = settings.get_float(EFFECT_SOUND_VOLUME_KEY, config.default_volume());

        let initial_volume = if enabled { volume } else { 0.0 };
        let pool = VoicePool::new(device.clone(), config.growth_batch_size(), initial_volume)?;

        info!(
            device = %device,
            enabled,
            volume,
            floor = pool.floor_size(),
            "Effect sound session started"
        );

        Ok(SoundSession {
            inner: Arc::new(Inner {
                state: Mutex::new(State {
                    pool,
                    paused: BTreeSet::new(),
                    enabled,
                    volume,
                    pending_loops: Vec::new(),
                }),
                clips,
                settings,
                clip_cache: Mutex::new(HashMap::new()),
                sequences: Mutex::new(Vec::new()),
            }),
        })
    }

    /// Creates a session wired up entirely from configuration: the configured audio
    /// device, clips decoded from the clip root and preferences in the settings file
    /// (or in memory when no file is configured).
    pub fn from_config(config: &SoundConfig) -> Result<SoundSession, SoundError> {
        let device = audio::get_device(config.audio())?;
        let clips = Arc::new(FileClipStore::new(config.clip_root()));
        let settings: Arc<dyn SettingsStore> = match config.settings_file() {
            Some(path) => Arc::new(FileSettings::open(path)?),
            None => Arc::new(MemorySettings::new()),
        };
        SoundSession::new(config, device, clips, settings)
    }

    /// Resolves a clip, going to the clip store only the first time a name is seen.
    fn resolve(&self, name: &str) -> Result<Clip, SoundError> {
        if let Some(clip) = self.inner.clip_cache.lock().get(name) {
            return Ok(clip.clone());
        }

        let clip = self
            .inner
            .clips
            .resolve(name)
            .map_err(|source| SoundError::ClipNotFound {
                name: name.to_string(),
                source,
            })?;
        info!(clip = name, duration = ?clip.duration(), "Loaded effect clip");

        Ok(self
            .inner
            .clip_cache
            .lock()
            .entry(name.to_string())
            .or_insert(clip)
            .clone())
    }

    /// Plays a clip once. Returns None when effect sounds are disabled or the clip
    /// can't be played.
    pub fn play(&self, name: &str) -> Option<VoiceId> {
        log_play_error(name, self.try_play(name))
    }

    /// Plays a clip on a loop until it's stopped.
    pub fn play_loop(&self, name: &str) -> Option<VoiceId> {
        log_play_error(name, self.try_play_loop(name))
    }

    /// Like `play`, but reports why the clip couldn't be played.
    pub fn try_play(&self, name: &str) -> Result<Option<VoiceId>, SoundError> {
        self.start(name, false)
    }

    /// Like `play_loop`, but reports why the clip couldn't be played.
    pub fn try_play_loop(&self, name: &str) -> Result<Option<VoiceId>, SoundError> {
        self.start(name, true)
    }

    fn start(&self, name: &str, looping: bool) -> Result<Option<VoiceId>, SoundError> {
        if !self.is_enabled() {
            debug!(clip = name, "Effect sounds disabled, not playing");
            return Ok(None);
        }

        let clip = self.resolve(name)?;

        let mut state = self.inner.state.lock();
        // Disabled while the clip was resolving.
        if !state.enabled {
            return Ok(None);
        }
        let volume = state.volume;
        let id = state.pool.acquire(clip, volume, looping)?;
        debug!(clip = name, voice = %id, looping, "Playing effect sound");
        Ok(Some(id))
    }

    /// Pauses a playing voice.
    pub fn pause(&self, id: VoiceId) -> Result<(), SoundError> {
        let mut guard = self.inner.state.lock();
        let state = &mut *guard;
        state.pool.reclaim_finished();
        let voice = state.pool.get_mut(id).inspect_err(|e| {
            error!(voice = %id, err = %e, "Unable to pause voice");
        })?;
        if voice.pause() {
            state.paused.insert(id);
        }
        Ok(())
    }

    /// Continues a paused voice. Works even when effect sounds are disabled, since
    /// disabling leaves nothing paused.
    pub fn resume(&self, id: VoiceId) -> Result<(), SoundError> {
        let mut guard = self.inner.state.lock();
        let state = &mut *guard;
        let voice = state.pool.get_mut(id).inspect_err(|e| {
            error!(voice = %id, err = %e, "Unable to resume voice");
        })?;
        voice.resume();
        state.paused.remove(&id);
        Ok(())
    }

    /// Stops a voice and frees it. Stopping an idle voice does nothing.
    pub fn stop(&self, id: VoiceId) -> Result<(), SoundError> {
        let mut guard = self.inner.state.lock();
        let state = &mut *guard;
        state.pool.release(id).inspect_err(|e| {
            error!(voice = %id, err = %e, "Unable to stop voice");
        })?;
        state.paused.remove(&id);
        Ok(())
    }

    /// Pauses every playing voice.
    pub fn pause_all(&self) {
        let mut guard = self.inner.state.lock();
        let state = &mut *guard;
        // A one-shot that already ran out would otherwise be replayed by resume_all.
        state.pool.reclaim_finished();
        for voice in state.pool.iter_mut() {
            if voice.pause() {
                state.paused.insert(voice.id());
            }
        }
        debug!(paused = state.paused.len(), "Paused all effect sounds");
    }

    /// Resumes every paused voice.
    pub fn resume_all(&self) {
        let mut guard = self.inner.state.lock();
        let state = &mut *guard;
        for id in std::mem::take(&mut state.paused) {
            if let Ok(voice) = state.pool.get_mut(id) {
                voice.resume();
            }
        }
        debug!("Resumed all effect sounds");
    }

    /// Stops and frees every voice.
    pub fn stop_all(&self) {
        let mut guard = self.inner.state.lock();
        let state = &mut *guard;
        for voice in state.pool.iter_mut() {
            voice.release();
        }
        state.paused.clear();
        debug!("Stopped all effect sounds");
    }

    /// Plays a clip `count` times, one after another, each started one clip duration
    /// after the last. Returns None if effect sounds are disabled, the clip can't be
    /// resolved or there's no tokio runtime to run the sequence on.
    pub fn play_several_times(&self, name: &str, count: usize) -> Option<Sequence> {
        if !self.is_enabled() {
            debug!(clip = name, "Effect sounds disabled, skipping sequence");
            return None;
        }

        let clip = match self.resolve(name) {
            Ok(clip) => clip,
            Err(e) => {
                error!(clip = name, err = %e, "Unable to start repeat-play sequence");
                return None;
            }
        };

        let runtime = match tokio::runtime::Handle::try_current() {
            Ok(runtime) => runtime,
            Err(e) => {
                error!(clip = name, err = %e, "No runtime for repeat-play sequence");
                return None;
            }
        };

        let cancel = CancelHandle::new();
        let sequence = scheduler::spawn(&runtime, self.clone(), clip, count, cancel.clone());

        let mut sequences = self.inner.sequences.lock();
        sequences.retain(|(_, task)| !task.is_finished());
        sequences.push((cancel, sequence.abort_handle()));

        Some(sequence)
    }

    /// Cancels every repeat-play sequence still running. Voices they already started
    /// keep playing.
    pub fn cancel_sequences(&self) {
        let sequences = std::mem::take(&mut *self.inner.sequences.lock());
        for (cancel, _) in &sequences {
            cancel.cancel();
        }
        debug!(count = sequences.len(), "Cancelled repeat-play sequences");
    }

    /// Turns effect sounds on or off. Disabling stops every voice; looping clips that
    /// were cut off can be restarted on enable with `autoplay` when there's exactly
    /// one of them.
    pub fn enable(&self, flag: bool, autoplay: bool) {
        let relaunch = {
            let mut guard = self.inner.state.lock();
            let state = &mut *guard;
            if state.enabled == flag {
                return;
            }
            state.enabled = flag;

            if flag {
                state.pool.set_volume(state.volume);
                let pending = std::mem::take(&mut state.pending_loops);
                match (autoplay, <[Clip; 1]>::try_from(pending)) {
                    (true, Ok([clip])) => Some(clip),
                    _ => None,
                }
            } else {
                state.pending_loops = state
                    .pool
                    .iter()
                    .filter(|voice| voice.is_looping() && !voice.is_idle())
                    .filter_map(|voice| voice.clip().cloned())
                    .collect();
                for voice in state.pool.iter_mut() {
                    voice.set_volume(0.0);
                    voice.release();
                }
                state.paused.clear();
                None
            }
        };

        if let Err(e) = self
            .inner
            .settings
            .set_int(EFFECT_SOUND_ENABLED_KEY, i64::from(flag))
        {
            warn!(err = %e, "Unable to persist effect sound enabled flag");
        }
        info!(enabled = flag, "Effect sounds toggled");

        if let Some(clip) = relaunch {
            self.play_loop(clip.name());
        }
    }

    /// Sets the effect volume on every voice and on voices started later.
    pub fn set_volume(&self, volume: f32) {
        {
            let mut state = self.inner.state.lock();
            state.volume = volume;
            state.pool.set_volume(volume);
        }

        if let Err(e) = self
            .inner
            .settings
            .set_float(EFFECT_SOUND_VOLUME_KEY, volume)
        {
            warn!(err = %e, "Unable to persist effect sound volume");
        }
        info!(volume, "Effect sound volume changed");
    }

    pub fn is_enabled(&self) -> bool {
        self.inner.state.lock().enabled
    }

    pub fn volume(&self) -> f32 {
        self.inner.state.lock().volume
    }

    pub fn pool_len(&self) -> usize {
        self.inner.state.lock().pool.len()
    }

    pub fn voice_state(&self, id: VoiceId) -> Result<VoiceState, SoundError> {
        Ok(self.inner.state.lock().pool.get(id)?.state())
    }

    pub fn voice_volume(&self, id: VoiceId) -> Result<f32, SoundError> {
        Ok(self.inner.state.lock().pool.get(id)?.volume())
    }

    pub fn is_looping(&self, id: VoiceId) -> Result<bool, SoundError> {
        Ok(self.inner.state.lock().pool.get(id)?.is_looping())
    }

    /// The ids currently in the paused set, in ascending order.
    pub fn paused(&self) -> Vec<VoiceId> {
        self.inner.state.lock().paused.iter().copied().collect()
    }

    /// Drops idle voices above the pool floor. Returns how many were removed.
    pub fn shrink_pool(&self) -> usize {
        let mut guard = self.inner.state.lock();
        let state = &mut *guard;
        let removed = state.pool.shrink();
        let len = state.pool.len();
        state.paused.retain(|id| id.index() < len);
        removed
    }

    /// Stops everything and rebuilds the pool at its floor.
    pub fn clear(&self) -> Result<(), SoundError> {
        let mut state = self.inner.state.lock();
        state.paused.clear();
        state.pending_loops.clear();
        state.pool.clear()
    }
}

fn log_play_error(name: &str, result: Result<Option<VoiceId>, SoundError>) -> Option<VoiceId> {
    match result {
        Ok(id) => id,
        Err(e) => {
            error!(clip = name, err = %e, "Unable to play effect sound");
            None
        }
    }
}
