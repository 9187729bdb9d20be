// SPDX-License-Identifier: GPL-3.0-or-later

use crate::error::{Result, SpotifyError};
use std::sync::Arc;
use tokio::sync::{Mutex, Semaphore};
use tokio::time::{sleep_until, Duration, Instant};

/// Paces requests to the Spotify Web API.
///
/// Spotify enforces a rolling-window quota and answers 429 with a
/// `Retry-After` hint once it is exceeded. Requests are spaced by a minimum
/// interval, and a 429 pushes the next permitted request out by the hinted
/// delay so every caller sharing the client waits it out together.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    permits: Arc<Semaphore>,
    min_interval: Duration,
    schedule: Arc<Mutex<Schedule>>,
}

#[derive(Debug, Default)]
struct Schedule {
    last_request: Option<Instant>,
    blocked_until: Option<Instant>,
}

impl Schedule {
    fn next_slot(&self, min_interval: Duration) -> Option<Instant> {
        let spaced = self.last_request.map(|last| last + min_interval);
        match (spaced, self.blocked_until) {
            (Some(a), Some(b)) => Some(a.max(b)),
            (a, b) => a.or(b),
        }
    }
}

impl RateLimiter {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            permits: Arc::new(Semaphore::new(1)),
            min_interval,
            schedule: Arc::new(Mutex::new(Schedule::default())),
        }
    }

    /// Wait for the next request slot.
    pub async fn acquire(&self) -> Result<()> {
        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|_| SpotifyError::RateLimiterClosed)?;

        let mut schedule = self.schedule.lock().await;

        if let Some(slot) = schedule.next_slot(self.min_interval) {
            if slot > Instant::now() {
                tracing::trace!(
                    target: "spotify",
                    wait = ?slot.saturating_duration_since(Instant::now()),
                    "waiting for request slot"
                );
                sleep_until(slot).await;
            }
        }

        schedule.last_request = Some(Instant::now());
        schedule.blocked_until = None;
        Ok(())
    }

    /// Hold back every request until `delay` has passed.
    ///
    /// Called with the `Retry-After` value of a 429 response. A shorter
    /// delay never shortens an existing block.
    pub async fn back_off(&self, delay: Duration) {
        let until = Instant::now() + delay;
        let mut schedule = self.schedule.lock().await;
        schedule.blocked_until = Some(match schedule.blocked_until {
            Some(current) => current.max(until),
            None => until,
        });
        tracing::debug!(target: "spotify", ?delay, "backing off after rate limit response");
    }
}
