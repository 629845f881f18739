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

//! Voice management for pooled effect playback.
//!
//! A voice is one physical playback channel. The pool hands out free voices first-fit
//! in ascending order, grows in fixed batches when every voice is busy and shrinks back
//! toward its floor.

mod pool;
mod voice;

use std::fmt;

pub use pool::VoicePool;
pub use voice::{Voice, VoiceState};

/// Identifies a voice by its position in the pool.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VoiceId(usize);

impl VoiceId {
    pub fn new(index: usize) -> VoiceId {
        VoiceId(index)
    }

    /// The position of the voice in the pool.
    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for VoiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
