/// Segment playback synchronizer
///
/// Creates one playback surface per segment, all bound to the same video, and
/// keeps each surface's playback inside its segment window. Surfaces are
/// created and torn down as one batch.

pub mod poll;
pub mod surface;

pub use poll::{poll_tick, PollTimer, ReleaseGate, TickOutcome};
pub use surface::{PlaybackSurface, SurfaceState};

use crate::config::Config;
use crate::player::{EventSink, PlatformProvider, PlayerEvent, PlayerOptions, SurfaceEvent};
use crate::segment::Segment;
use crate::video_id::VideoId;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Poll interval used when none is configured
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Outcome of the last mount
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MountState {
    /// Surfaces were created (some may have been skipped)
    Active,
    /// No video id could be extracted from the URL
    InvalidVideoUrl,
    /// Segment list was empty
    NoSegments,
    /// The player capability could not be loaded
    PlatformUnavailable,
    /// Torn down
    Unmounted,
}

/// Settings applied to every surface of a mount
#[derive(Debug, Clone)]
pub struct SyncSettings {
    pub poll_interval: Duration,
    pub mount_prefix: String,
    pub player_options: PlayerOptions,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            mount_prefix: "player".to_string(),
            player_options: PlayerOptions::default(),
        }
    }
}

impl From<&Config> for SyncSettings {
    fn from(config: &Config) -> Self {
        Self {
            poll_interval: Duration::from_millis(config.sync.poll_interval_ms),
            mount_prefix: config.player.mount_prefix.clone(),
            player_options: config.player.options(),
        }
    }
}

/// Owner of every playback surface for one (video, segments) input
pub struct SegmentSynchronizer {
    settings: SyncSettings,
    state: MountState,
    video_id: Option<VideoId>,
    surfaces: Vec<PlaybackSurface>,
    events_tx: mpsc::UnboundedSender<SurfaceEvent>,
    events_rx: mpsc::UnboundedReceiver<SurfaceEvent>,
}

impl SegmentSynchronizer {
    /// Synchronizer with nothing mounted
    pub fn new(settings: SyncSettings) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            settings,
            state: MountState::Unmounted,
            video_id: None,
            surfaces: Vec::new(),
            events_tx,
            events_rx,
        }
    }

    /// Create and mount surfaces for `segments` of the video at `video_url`
    pub async fn mount(
        provider: &PlatformProvider,
        video_url: &str,
        segments: &[Segment],
        settings: SyncSettings,
    ) -> Self {
        let mut synchronizer = Self::new(settings);
        synchronizer.mount_surfaces(provider, video_url, segments).await;
        synchronizer
    }

    /// Tear down the current batch and mount a new one
    pub async fn remount(&mut self, provider: &PlatformProvider, video_url: &str, segments: &[Segment]) {
        self.teardown().await;
        self.mount_surfaces(provider, video_url, segments).await;
    }

    async fn mount_surfaces(&mut self, provider: &PlatformProvider, video_url: &str, segments: &[Segment]) {
        // Fresh channel so events from a previous batch never reach new surfaces
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        self.events_tx = events_tx;
        self.events_rx = events_rx;

        let Some(video_id) = VideoId::from_url(video_url) else {
            warn!("❌ Cannot display segments, no video id in URL: {}", video_url);
            self.state = MountState::InvalidVideoUrl;
            self.video_id = None;
            return;
        };
        self.video_id = Some(video_id.clone());

        if segments.is_empty() {
            info!("📭 No segments to mount for video {}", video_id);
            self.state = MountState::NoSegments;
            return;
        }

        let Some(platform) = provider.ensure_loaded().await else {
            warn!("❌ Player platform unavailable, {} surfaces left uncreated", segments.len());
            self.state = MountState::PlatformUnavailable;
            return;
        };

        for (index, segment) in segments.iter().enumerate() {
            let window = segment.window();
            if window.is_degenerate() {
                warn!(
                    "⚠️ Segment {} '{}' has empty window {} from '{}', playback will stay pinned at {}s",
                    index, segment.name, window, segment.timestamp_range, window.start
                );
            }

            let mount_id = format!("{}-{}", self.settings.mount_prefix, index);
            let sink = EventSink::new(index, self.events_tx.clone());
            match platform.create(&mount_id, &video_id, &self.settings.player_options, sink) {
                Ok(player) => {
                    debug!("🧩 Created surface {} for '{}' at {}", index, segment.name, mount_id);
                    self.surfaces.push(PlaybackSurface::new(
                        index,
                        mount_id,
                        segment.clone(),
                        video_id.clone(),
                        player,
                        self.settings.poll_interval,
                    ));
                }
                Err(e) => warn!("⚠️ Skipping segment {} '{}': {}", index, segment.name, e),
            }
        }

        info!(
            "✅ Mounted {} of {} surfaces for video {}",
            self.surfaces.len(),
            segments.len(),
            video_id
        );
        self.state = MountState::Active;
    }

    /// Apply one player event to the surface it belongs to
    pub fn dispatch(&mut self, event: SurfaceEvent) {
        let Some(surface) = self.surfaces.iter_mut().find(|s| s.index() == event.index) else {
            debug!("Dropping event for unknown surface {}: {:?}", event.index, event.event);
            return;
        };

        match event.event {
            PlayerEvent::Ready => surface.on_ready(),
            PlayerEvent::StateChanged(state) => surface.on_state_change(state),
        }
    }

    /// Apply every event that has already been delivered
    pub fn process_pending(&mut self) -> usize {
        let mut processed = 0;
        while let Ok(event) = self.events_rx.try_recv() {
            self.dispatch(event);
            processed += 1;
        }
        processed
    }

    /// Stop every poll, then release every player handle
    ///
    /// Calling it again is a no-op.
    pub async fn teardown(&mut self) {
        if self.surfaces.is_empty() {
            self.state = MountState::Unmounted;
            return;
        }

        for surface in self.surfaces.iter_mut() {
            surface.stop_poll().await;
        }
        for surface in self.surfaces.iter_mut() {
            surface.release();
        }

        info!("🧹 Tore down {} surfaces", self.surfaces.len());
        self.surfaces.clear();
        self.state = MountState::Unmounted;
    }

    pub fn state(&self) -> MountState {
        self.state
    }

    pub fn video_id(&self) -> Option<&VideoId> {
        self.video_id.as_ref()
    }

    pub fn surfaces(&self) -> &[PlaybackSurface] {
        &self.surfaces
    }

    pub fn surface(&self, index: usize) -> Option<&PlaybackSurface> {
        self.surfaces.iter().find(|s| s.index() == index)
    }

    pub fn surface_count(&self) -> usize {
        self.surfaces.len()
    }

    /// Number of surfaces with a running position poll
    pub fn active_timer_count(&self) -> usize {
        self.surfaces.iter().filter(|s| s.is_polling()).count()
    }

    /// Number of surfaces still holding a player handle
    pub fn active_player_count(&self) -> usize {
        self.surfaces.iter().filter(|s| !s.is_released()).count()
    }
}

impl Drop for SegmentSynchronizer {
    fn drop(&mut self) {
        for surface in self.surfaces.iter_mut() {
            surface.cancel_poll();
        }
        for surface in self.surfaces.iter_mut() {
            surface.release();
        }
    }
}
