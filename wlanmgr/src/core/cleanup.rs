//! Deferred cleanup of unconfirmed networks.
//!
//! A device arms at most one timer at a time. When it expires the timer does
//! not touch device state itself: it posts a `CleanupDue` event carrying its
//! token back into the event loop, which retires the pending generation if
//! the token still matches the device's armed timer. Tearing a device down
//! drops its timer, which aborts the sleeping task.

use log::debug;
use std::time::Duration;
use tokio::task::JoinHandle;

use crate::api::events::{WifiEvent, WifiHandle};

/// Arms cleanup timers for every device.
#[derive(Debug)]
pub(crate) struct CleanupScheduler {
    grace: Duration,
    events: WifiHandle,
    next_token: u64,
}

impl CleanupScheduler {
    pub(crate) fn new(grace: Duration, events: WifiHandle) -> Self {
        Self {
            grace,
            events,
            next_token: 0,
        }
    }

    /// Starts a timer that reports back for `index` after the grace period.
    pub(crate) fn arm(&mut self, index: i32) -> CleanupTimer {
        self.next_token += 1;
        let token = self.next_token;
        let events = self.events.clone();
        let grace = self.grace;

        debug!("Arming cleanup for index {index} in {grace:?}");
        let task = tokio::spawn(async move {
            tokio::time::sleep(grace).await;
            // The loop may already be gone during shutdown.
            let _ = events.send(WifiEvent::CleanupDue { index, token });
        });

        CleanupTimer { token, task }
    }
}

/// Handle to an armed cleanup timer. Dropping it cancels the timer.
#[derive(Debug)]
pub(crate) struct CleanupTimer {
    token: u64,
    task: JoinHandle<()>,
}

impl CleanupTimer {
    pub(crate) fn token(&self) -> u64 {
        self.token
    }
}

impl Drop for CleanupTimer {
    fn drop(&mut self) {
        self.task.abort();
    }
}
