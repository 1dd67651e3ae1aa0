use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::debug;

const TICK: Duration = Duration::from_secs(1);

/// One-second countdown running on its own task.
///
/// The task stops by itself at zero. Dropping the handle or calling
/// [`ExpiryTimer::cancel`] aborts it; no tick is observed afterwards.
pub struct ExpiryTimer {
    remaining: watch::Receiver<u64>,
    task: Option<JoinHandle<()>>,
}

impl ExpiryTimer {
    /// Start counting down from `seconds`.
    ///
    /// Must be called from within a Tokio runtime. A zero start is already
    /// expired and spawns nothing.
    pub fn start(seconds: u64) -> Self {
        let (tx, rx) = watch::channel(seconds);
        let task = (seconds > 0).then(|| tokio::spawn(run_countdown(tx, seconds)));
        Self {
            remaining: rx,
            task,
        }
    }

    pub fn remaining(&self) -> u64 {
        *self.remaining.borrow()
    }

    pub fn is_expired(&self) -> bool {
        self.remaining() == 0
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// Receiver that sees every tick, for callers rendering the countdown.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.remaining.clone()
    }

    pub fn cancel(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            debug!(remaining = self.remaining(), "expiry countdown cancelled");
        }
    }

    /// Resolves once the countdown reaches zero.
    ///
    /// Returns `false` if the countdown was cancelled first.
    pub async fn expired(&self) -> bool {
        let mut rx = self.remaining.clone();
        rx.wait_for(|left| *left == 0).await.is_ok()
    }
}

impl Drop for ExpiryTimer {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

async fn run_countdown(tx: watch::Sender<u64>, seconds: u64) {
    let mut ticker = time::interval_at(Instant::now() + TICK, TICK);
    // a stalled runtime must not burn several seconds in one go
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut left = seconds;
    while left > 0 {
        ticker.tick().await;
        left -= 1;
        tx.send_replace(left);
    }
    debug!("expiry countdown reached zero");
}

/// Render seconds as `m:ss`, e.g. 900 → `15:00`.
pub fn format_countdown(seconds: u64) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}
