// Copyright (C) 2024 Michael Wilson <mike@mdwn.dev>
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

use parking_lot::Mutex;
use tokio::sync::Notify;

/// Represents the current cancel state.
#[derive(Clone, Copy, PartialEq, Debug)]
enum CancelState {
    Untouched,
    Cancelled,
}

/// A cancel handle is handed to a repeat-play sequence. It's the sequence's responsibility
/// to respect a cancel request at each of its wait points.
#[derive(Clone, Debug)]
pub struct CancelHandle {
    /// Set to cancelled once the owner asks the sequence to stop.
    cancelled: Arc<Mutex<CancelState>>,
    /// Wakes anything waiting in `cancelled()`.
    notify: Arc<Notify>,
}

impl CancelHandle {
    /// Creates a new cancel handle.
    pub fn new() -> CancelHandle {
        CancelHandle {
            cancelled: Arc::new(Mutex::new(CancelState::Untouched)),
            notify: Arc::new(Notify::new()),
        }
    }

    /// Returns true if the sequence has been cancelled.
    pub fn is_cancelled(&self) -> bool {
        *self.cancelled.lock() == CancelState::Cancelled
    }

    /// Completes once the handle is cancelled. Returns immediately if it already was.
    pub async fn cancelled(&self) {
        loop {
            // Register interest before checking so a cancel in between isn't missed.
            let notified = self.notify.notified();
            if self.is_cancelled() {
                return;
            }
            notified.await;
        }
    }

    /// Cancel the sequence.
    pub fn cancel(&self) {
        let mut cancel_state = self.cancelled.lock();
        if *cancel_state == CancelState::Untouched {
            *cancel_state = CancelState::Cancelled;
            self.notify.notify_waiters();
        }
    }
}

impl Default for CancelHandle {
    fn default() -> Self {
        Self::new()
    }
}
