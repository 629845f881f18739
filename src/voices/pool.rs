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
use std::sync::Arc;

use tracing::debug;

use crate::audio::Device;
use crate::clips::Clip;
use crate::error::SoundError;

use super::{Voice, VoiceId};

/// An ordered, growable set of voices.
///
/// The pool never drops below its floor, which is one growth batch, and only ever grows
/// by whole batches. Callers must hold `&mut` to acquire, so two acquisitions can't
/// be handed the same voice.
pub struct VoicePool {
    /// Voices in insertion order. A voice's id is its index.
    voices: Vec<Voice>,
    /// Voices added per growth step. Also the floor.
    growth_batch_size: usize,
    /// Volume new voices are opened with.
    volume: f32,
    /// Where channels come from.
    device: Arc<dyn Device>,
}

impl VoicePool {
    /// Creates a pool with its floor of idle voices already opened.
    pub fn new(
        device: Arc<dyn Device>,
        growth_batch_size: usize,
        volume: f32,
    ) -> Result<VoicePool, SoundError> {
        let mut pool = VoicePool {
            voices: Vec::new(),
            growth_batch_size: growth_batch_size.max(1),
            volume,
            device,
        };
        pool.voices = pool.open_voices(0, pool.growth_batch_size)?;
        debug!(
            device = %pool.device,
            floor = pool.growth_batch_size,
            "Created voice pool"
        );
        Ok(pool)
    }

    /// Opens `count` idle voices with ids starting at `first`. Nothing is kept if any
    /// channel fails to open.
    fn open_voices(&self, first: usize, count: usize) -> Result<Vec<Voice>, SoundError> {
        (first..first + count)
            .map(|index| {
                let channel = self.device.open_channel()?;
                Ok(Voice::new(VoiceId::new(index), channel, self.volume))
            })
            .collect()
    }

    /// Assigns `clip` to the first idle voice and starts it. Finished one-shot voices
    /// are reclaimed first. If every voice is busy the pool grows by one batch and the
    /// first new voice is used.
    pub fn acquire(
        &mut self,
        clip: Clip,
        volume: f32,
        looping: bool,
    ) -> Result<VoiceId, SoundError> {
        self.reclaim_finished();

        let index = match self.voices.iter().position(Voice::is_idle) {
            Some(index) => index,
            None => self.grow()?,
        };

        let voice = &mut self.voices[index];
        voice.start(clip, volume, looping);
        Ok(voice.id())
    }

    /// Adds one batch of idle voices and returns the index of the first.
    fn grow(&mut self) -> Result<usize, SoundError> {
        let first = self.voices.len();
        let added = self.open_voices(first, self.growth_batch_size)?;
        self.voices.extend(added);
        debug!(
            from = first,
            to = self.voices.len(),
            "Voice pool saturated, grew"
        );
        Ok(first)
    }

    /// Returns every finished one-shot voice to idle. Returns how many were reclaimed.
    pub fn reclaim_finished(&mut self) -> usize {
        let mut reclaimed = 0;
        for voice in self.voices.iter_mut().filter(|voice| voice.is_finished()) {
            voice.release();
            reclaimed += 1;
        }
        if reclaimed > 0 {
            debug!(reclaimed, "Reclaimed finished voices");
        }
        reclaimed
    }

    /// Stops the voice and makes it idle.
    pub fn release(&mut self, id: VoiceId) -> Result<(), SoundError> {
        self.get_mut(id)?.release();
        Ok(())
    }

    /// Removes idle voices from the end of the pool, stopping at the first busy voice
    /// or at the floor. Returns the number of voices removed.
    pub fn shrink(&mut self) -> usize {
        self.reclaim_finished();

        let floor = self.floor_size();
        if self.voices.len() <= floor {
            return 0;
        }

        let removable = self.voices[floor..]
            .iter()
            .rev()
            .take_while(|voice| voice.is_idle())
            .count();
        if removable == 0 {
            return 0;
        }

        let len = self.voices.len() - removable;
        self.voices.truncate(len);
        debug!(removed = removable, len, "Shrank voice pool");
        removable
    }

    /// Stops every voice and rebuilds the pool at its floor with fresh channels.
    pub fn clear(&mut self) -> Result<(), SoundError> {
        for voice in self.voices.iter_mut() {
            voice.release();
        }
        self.voices = self.open_voices(0, self.growth_batch_size)?;
        debug!(len = self.voices.len(), "Cleared voice pool");
        Ok(())
    }

    /// Sets the volume on every voice and on voices opened later.
    pub fn set_volume(&mut self, volume: f32) {
        self.volume = volume;
        for voice in self.voices.iter_mut() {
            voice.set_volume(volume);
        }
    }

    pub fn len(&self) -> usize {
        self.voices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.voices.is_empty()
    }

    /// The minimum number of voices the pool keeps.
    pub fn floor_size(&self) -> usize {
        self.growth_batch_size
    }

    pub fn get(&self, id: VoiceId) -> Result<&Voice, SoundError> {
        let len = self.voices.len();
        self.voices
            .get(id.index())
            .ok_or(SoundError::OutOfRange { id, len })
    }

    pub fn get_mut(&mut self, id: VoiceId) -> Result<&mut Voice, SoundError> {
        let len = self.voices.len();
        self.voices
            .get_mut(id.index())
            .ok_or(SoundError::OutOfRange { id, len })
    }

    pub fn iter(&self) -> impl Iterator<Item = &Voice> {
        self.voices.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Voice> {
        self.voices.iter_mut()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::audio::mock;
    use crate::voices::VoiceState;

    fn pool(batch: usize) -> (VoicePool, mock::Device) {
        let device = mock::Device::get("mock");
        let pool = VoicePool::new(Arc::new(device.clone()), batch, 1.0).unwrap();
        (pool, device)
    }

    fn clip() -> Clip {
        Clip::silence("blip", Duration::from_millis(250))
    }

    fn acquire(pool: &mut VoicePool) -> VoiceId {
        pool.acquire(clip(), 1.0, false).unwrap()
    }

    #[test]
    fn test_floor_is_created_eagerly() {
        let (pool, device) = pool(4);
        assert!(!pool.is_empty());
        assert_eq!(pool.len(), 4);
        assert_eq!(pool.floor_size(), 4);
        assert_eq!(device.channel_count(), 4);
        assert!(pool.iter().all(Voice::is_idle));
    }

    #[test]
    fn test_acquire_is_first_fit_ascending() {
        let (mut pool, _) = pool(4);
        let ids: Vec<usize> = (0..4).map(|_| acquire(&mut pool).index()).collect();
        assert_eq!(ids, vec![0, 1, 2, 3]);
        assert_eq!(pool.len(), 4);
    }

    #[test]
    fn test_growth_in_batches() {
        let batch = 3;
        for n in [4, 6, 7, 10] {
            let (mut pool, _) = pool(batch);
            for expected in 0..n {
                assert_eq!(acquire(&mut pool).index(), expected);
            }
            let expected_len = batch + (n - batch).div_ceil(batch) * batch;
            assert_eq!(pool.len(), expected_len, "after {} acquisitions", n);
        }
    }

    #[test]
    fn test_release_then_acquire_reuses_id() {
        let (mut pool, _) = pool(4);
        for _ in 0..4 {
            acquire(&mut pool);
        }

        pool.release(VoiceId::new(1)).unwrap();
        assert_eq!(acquire(&mut pool), VoiceId::new(1));
        assert_eq!(pool.len(), 4);
    }

    #[test]
    fn test_release_is_idempotent() {
        let (mut pool, _) = pool(2);
        let id = acquire(&mut pool);
        pool.release(id).unwrap();
        pool.release(id).unwrap();
        assert_eq!(pool.get(id).unwrap().state(), VoiceState::Idle);
    }

    #[test]
    fn test_out_of_range() {
        let (mut pool, _) = pool(2);
        assert!(matches!(
            pool.release(VoiceId::new(2)),
            Err(SoundError::OutOfRange { len: 2, .. })
        ));
        assert!(pool.get(VoiceId::new(7)).is_err());
    }

    #[test]
    fn test_finished_voice_is_reused_before_growth() {
        let (mut pool, device) = pool(2);
        acquire(&mut pool);
        acquire(&mut pool);

        device.finish(0);
        assert_eq!(acquire(&mut pool), VoiceId::new(0));
        assert_eq!(pool.len(), 2);
    }

    #[test]
    fn test_paused_voice_is_not_reclaimed() {
        let (mut pool, device) = pool(2);
        acquire(&mut pool);
        acquire(&mut pool);

        pool.get_mut(VoiceId::new(0)).unwrap().pause();
        device.finish(0);

        assert_eq!(acquire(&mut pool), VoiceId::new(2));
        assert_eq!(pool.len(), 4);
        assert_eq!(
            pool.get(VoiceId::new(0)).unwrap().state(),
            VoiceState::Paused
        );
    }

    #[test]
    fn test_looping_voice_is_not_reclaimed() {
        let (mut pool, device) = pool(1);
        pool.acquire(clip(), 1.0, true).unwrap();
        device.finish(0);

        assert_eq!(pool.reclaim_finished(), 0);
        assert_eq!(acquire(&mut pool), VoiceId::new(1));
    }

    #[test]
    fn test_shrink_removes_trailing_idle() {
        let (mut pool, _) = pool(2);
        for _ in 0..6 {
            acquire(&mut pool);
        }
        assert_eq!(pool.len(), 6);

        pool.release(VoiceId::new(5)).unwrap();
        pool.release(VoiceId::new(4)).unwrap();
        pool.release(VoiceId::new(2)).unwrap();

        // Voice 3 is busy, so voice 2 has to stay.
        assert_eq!(pool.shrink(), 2);
        assert_eq!(pool.len(), 4);
        assert!(!pool.get(VoiceId::new(3)).unwrap().is_idle());
    }

    #[test]
    fn test_shrink_stops_at_floor() {
        let (mut pool, _) = pool(4);
        for _ in 0..8 {
            acquire(&mut pool);
        }
        for index in 0..8 {
            pool.release(VoiceId::new(index)).unwrap();
        }

        assert_eq!(pool.shrink(), 4);
        assert_eq!(pool.len(), 4);

        // Already at the floor.
        assert_eq!(pool.shrink(), 0);
        assert_eq!(pool.len(), 4);
    }

    #[test]
    fn test_shrink_blocked_by_busy_tail() {
        let (mut pool, _) = pool(2);
        for _ in 0..4 {
            acquire(&mut pool);
        }
        pool.release(VoiceId::new(2)).unwrap();

        assert_eq!(pool.shrink(), 0);
        assert_eq!(pool.len(), 4);
    }

    #[test]
    fn test_clear_rebuilds_floor() {
        let (mut pool, device) = pool(2);
        for _ in 0..5 {
            acquire(&mut pool);
        }
        assert_eq!(pool.len(), 6);

        pool.clear().unwrap();
        assert_eq!(pool.len(), 2);
        assert!(pool.iter().all(Voice::is_idle));

        // Old channels were stopped; two fresh ones were opened.
        assert!(!device.channel(0).unwrap().playing);
        assert_eq!(device.channel_count(), 8);
    }

    #[test]
    fn test_set_volume_applies_to_new_voices() {
        let (mut pool, device) = pool(1);
        acquire(&mut pool);
        pool.set_volume(0.25);
        assert_eq!(pool.get(VoiceId::new(0)).unwrap().volume(), 0.25);

        // Growth opens channels at the pool volume.
        pool.acquire(clip(), 0.25, false).unwrap();
        assert_eq!(device.channel(1).unwrap().volume, 0.25);
    }

    #[test]
    fn test_failed_growth_adds_nothing() {
        let device = mock::Device::with_channel_limit("mock", 3);
        let mut pool = VoicePool::new(Arc::new(device), 2, 1.0).unwrap();
        acquire(&mut pool);
        acquire(&mut pool);

        assert!(matches!(
            pool.acquire(clip(), 1.0, false),
            Err(SoundError::Device(_))
        ));
        assert_eq!(pool.len(), 2);
    }
}
