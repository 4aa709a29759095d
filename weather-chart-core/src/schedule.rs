//! Cancellable delayed task driving the fetch cycle.

use std::future;
use std::time::Duration;
use tokio::time::{Instant, sleep_until};

/// A one-shot timer that can be re-armed or cancelled before it fires.
///
/// Meant to be polled from a `tokio::select!` loop: `fired()` completes once
/// the armed deadline passes and pends forever while disarmed.
#[derive(Debug, Default)]
pub struct DelayedTask {
    deadline: Option<Instant>,
}

impl DelayedTask {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm the timer, replacing any pending deadline.
    pub fn arm(&mut self, delay: Duration) {
        self.deadline = Some(Instant::now() + delay);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    /// Wait for the armed deadline, disarming the timer when it fires.
    pub async fn fired(&mut self) {
        match self.deadline {
            Some(deadline) => {
                sleep_until(deadline).await;
                self.deadline = None;
            }
            None => future::pending::<()>().await,
        }
    }
}
