/// Position polling for one surface
///
/// The player has no position-change event, so each playing surface runs a
/// repeating timer that reads the playhead and seeks back to the window start
/// when it has left the window.
use crate::error::{Result, SyncError};
use crate::player::PlayerHandle;
use crate::segment::PlaybackWindow;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::debug;

/// What a single poll tick observed
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickOutcome {
    /// Position was inside the window
    Settled(f64),
    /// Position was outside and a seek to the window start was issued
    Corrected { from: f64, to: f64 },
}

impl TickOutcome {
    pub fn is_correction(&self) -> bool {
        matches!(self, Self::Corrected { .. })
    }
}

/// Read the playhead once and pull it back into the window if needed
pub fn poll_tick(player: &dyn PlayerHandle, window: PlaybackWindow) -> TickOutcome {
    let position = player.current_time();
    if window.contains(position) {
        TickOutcome::Settled(position)
    } else {
        let start = f64::from(window.start);
        player.seek_to(start, true);
        TickOutcome::Corrected { from: position, to: start }
    }
}

/// Guard shared by a surface and its poll task
///
/// Ticks run while holding the lock, so `close` returns only after any tick in
/// flight has finished. Once closed, no further tick touches the player.
#[derive(Debug, Default)]
pub struct ReleaseGate {
    released: Mutex<bool>,
}

impl ReleaseGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` unless the gate is closed
    pub fn run<R>(&self, f: impl FnOnce() -> R) -> Option<R> {
        let released = self.released.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if *released {
            None
        } else {
            Some(f())
        }
    }

    /// Close the gate, waiting for a running tick to complete
    pub fn close(&self) {
        *self.released.lock().unwrap_or_else(|poisoned| poisoned.into_inner()) = true;
    }

    pub fn is_closed(&self) -> bool {
        *self.released.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Cancellable repeating timer driving `poll_tick`
///
/// The first tick fires one interval after start. Ticks never overlap since
/// they run sequentially inside one task.
#[derive(Debug)]
pub struct PollTimer {
    handle: Option<JoinHandle<()>>,
}

impl PollTimer {
    pub fn start(
        index: usize,
        player: Arc<dyn PlayerHandle>,
        gate: Arc<ReleaseGate>,
        window: PlaybackWindow,
        interval: Duration,
    ) -> Result<Self> {
        let runtime = tokio::runtime::Handle::try_current().map_err(|_| SyncError::NoRuntime)?;
        let interval = interval.max(Duration::from_millis(1));

        let handle = runtime.spawn(async move {
            let mut ticker = time::interval_at(Instant::now() + interval, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                match gate.run(|| poll_tick(player.as_ref(), window)) {
                    Some(TickOutcome::Corrected { from, to }) => {
                        debug!("⏪ Surface {} left window {} at {:.2}s, seeking to {}s", index, window, from, to);
                    }
                    Some(TickOutcome::Settled(_)) => {}
                    None => break,
                }
            }
        });

        Ok(Self { handle: Some(handle) })
    }

    /// Stop the timer; cancelling twice is a no-op
    pub fn cancel(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }

    /// Stop the timer and wait until its task has finished
    pub async fn shutdown(mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            let _ = handle.await;
        }
    }

    pub fn is_active(&self) -> bool {
        self.handle.as_ref().map_or(false, |h| !h.is_finished())
    }
}

impl Drop for PollTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}
