/// A single playback surface and its explicit state record
use super::poll::{PollTimer, ReleaseGate};
use crate::player::{PlayerHandle, PlayerState};
use crate::segment::{PlaybackWindow, Segment};
use crate::video_id::VideoId;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Mutable state of one surface, touched only by that surface's handlers
#[derive(Debug, Default)]
pub struct SurfaceState {
    /// Initial seek-to-start done since creation or the last pause/end
    pub has_started: bool,
    /// Running position poll, if playing
    pub poll: Option<PollTimer>,
}

/// Embedded player bound to one segment's window
pub struct PlaybackSurface {
    index: usize,
    mount_id: String,
    segment: Segment,
    window: PlaybackWindow,
    video_id: VideoId,
    poll_interval: Duration,
    player: Option<Arc<dyn PlayerHandle>>,
    gate: Arc<ReleaseGate>,
    state: SurfaceState,
}

impl PlaybackSurface {
    pub fn new(
        index: usize,
        mount_id: String,
        segment: Segment,
        video_id: VideoId,
        player: Arc<dyn PlayerHandle>,
        poll_interval: Duration,
    ) -> Self {
        let window = segment.window();
        Self {
            index,
            mount_id,
            segment,
            window,
            video_id,
            poll_interval,
            player: Some(player),
            gate: Arc::new(ReleaseGate::new()),
            state: SurfaceState::default(),
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn mount_id(&self) -> &str {
        &self.mount_id
    }

    pub fn segment(&self) -> &Segment {
        &self.segment
    }

    pub fn window(&self) -> PlaybackWindow {
        self.window
    }

    pub fn has_started(&self) -> bool {
        self.state.has_started
    }

    pub fn is_polling(&self) -> bool {
        self.state.poll.as_ref().map_or(false, |p| p.is_active())
    }

    pub fn is_released(&self) -> bool {
        self.player.is_none()
    }

    /// Cue the video at the window start without playing
    pub fn on_ready(&mut self) {
        let Some(player) = &self.player else {
            return;
        };
        debug!("📍 Surface {} ready, cueing at {}s", self.index, self.window.start);
        player.cue_video_by_id(&self.video_id, f64::from(self.window.start));
    }

    pub fn on_state_change(&mut self, state: PlayerState) {
        if self.player.is_none() {
            return;
        }

        match state {
            PlayerState::Playing => self.on_playing(),
            PlayerState::Paused | PlayerState::Ended => {
                self.cancel_poll();
                self.state.has_started = false;
            }
            PlayerState::Buffering | PlayerState::Unstarted | PlayerState::Cued => {
                self.cancel_poll();
            }
        }
    }

    fn on_playing(&mut self) {
        let Some(player) = self.player.clone() else {
            return;
        };

        if !self.state.has_started {
            let position = player.current_time();
            if !self.window.contains(position) {
                debug!(
                    "▶️ Surface {} started at {:.2}s outside {}, seeking to {}s",
                    self.index, position, self.window, self.window.start
                );
                player.seek_to(f64::from(self.window.start), true);
            }
            self.state.has_started = true;
        }

        self.cancel_poll();
        match PollTimer::start(self.index, player, self.gate.clone(), self.window, self.poll_interval) {
            Ok(timer) => self.state.poll = Some(timer),
            Err(e) => warn!("⚠️ Surface {} cannot poll playback position: {}", self.index, e),
        }
    }

    /// Stop the position poll; safe to call when none is running
    pub fn cancel_poll(&mut self) {
        if let Some(mut timer) = self.state.poll.take() {
            timer.cancel();
        }
    }

    /// Stop the poll and wait for its task to finish
    pub(crate) async fn stop_poll(&mut self) {
        if let Some(timer) = self.state.poll.take() {
            timer.shutdown().await;
        }
    }

    /// Destroy the player handle
    ///
    /// Closes the release gate first, which blocks until a tick already
    /// running on another worker has returned.
    pub(crate) fn release(&mut self) {
        self.gate.close();
        if let Some(player) = self.player.take() {
            player.destroy();
        }
        self.state.has_started = false;
    }
}

impl Drop for PlaybackSurface {
    fn drop(&mut self) {
        self.cancel_poll();
        self.release();
    }
}
