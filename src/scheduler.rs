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

//! Timed repeat-play sequences.
//!
//! A sequence plays a clip a fixed number of times, waiting the clip's nominal duration
//! after each play. Each play goes through the session like any other, so every
//! repetition gets its own voice. Cancelling a sequence stops future plays only; voices
//! it already started keep going.

use tokio::runtime::Handle;
use tokio::task::{AbortHandle, JoinHandle};
use tracing::{info, info_span, warn, Instrument};

use crate::clips::Clip;
use crate::playsync::CancelHandle;
use crate::session::SoundSession;

/// A running repeat-play sequence.
#[derive(Debug)]
pub struct Sequence {
    cancel: CancelHandle,
    join: JoinHandle<usize>,
}

impl Sequence {
    /// Stops the sequence before its next play.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Waits for the sequence to end and returns how many plays it issued.
    pub async fn finished(self) -> usize {
        match self.join.await {
            Ok(issued) => issued,
            Err(e) => {
                warn!(err = %e, "Repeat-play sequence did not complete");
                0
            }
        }
    }

    /// A handle that reports whether the task is still running.
    pub(crate) fn abort_handle(&self) -> AbortHandle {
        self.join.abort_handle()
    }
}

/// Spawns a sequence that plays `clip` `count` times on the given runtime.
pub(crate) fn spawn(
    runtime: &Handle,
    session: SoundSession,
    clip: Clip,
    count: usize,
    cancel: CancelHandle,
) -> Sequence {
    let span = info_span!("repeat_play", clip = clip.name(), count);
    let join = runtime.spawn(run(session, clip, count, cancel.clone()).instrument(span));
    Sequence { cancel, join }
}

async fn run(session: SoundSession, clip: Clip, count: usize, cancel: CancelHandle) -> usize {
    info!(duration = ?clip.duration(), "Starting repeat-play sequence");

    let mut issued = 0;
    for _ in 0..count {
        if cancel.is_cancelled() {
            break;
        }

        session.play(clip.name());
        issued += 1;

        // No drift correction: the next play is due one nominal duration after this one
        // was issued.
        tokio::select! {
            _ = tokio::time::sleep(clip.duration()) => {}
            _ = cancel.cancelled() => break,
        }
    }

    info!(
        issued,
        cancelled = cancel.is_cancelled(),
        "Repeat-play sequence finished"
    );
    issued
}
