/// In-memory player platform used by tests and dry runs
use super::{EventSink, PlatformLoader, PlayerHandle, PlayerOptions, PlayerPlatform, PlayerState};
use crate::error::{Result, SyncError};
use crate::video_id::VideoId;
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Default)]
struct PlayerInner {
    position: f64,
    playing: bool,
    cued: Option<(String, f64)>,
    seeks: Vec<f64>,
    destroyed: bool,
}

/// Scriptable player: position only moves through `advance` or seeks
pub struct SimulatedPlayer {
    mount_id: String,
    video_id: VideoId,
    options: PlayerOptions,
    events: EventSink,
    inner: Mutex<PlayerInner>,
}

impl SimulatedPlayer {
    fn new(mount_id: &str, video_id: &VideoId, options: &PlayerOptions, events: EventSink) -> Self {
        Self {
            mount_id: mount_id.to_string(),
            video_id: video_id.clone(),
            options: options.clone(),
            events,
            inner: Mutex::new(PlayerInner::default()),
        }
    }

    fn inner(&self) -> MutexGuard<'_, PlayerInner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn mount_id(&self) -> &str {
        &self.mount_id
    }

    pub fn video_id(&self) -> &VideoId {
        &self.video_id
    }

    pub fn options(&self) -> &PlayerOptions {
        &self.options
    }

    pub fn position(&self) -> f64 {
        self.inner().position
    }

    /// Move the playhead without recording a seek
    pub fn set_position(&self, position: f64) {
        self.inner().position = position;
    }

    /// Advance the playhead by `seconds` if playing
    pub fn advance(&self, seconds: f64) {
        let mut inner = self.inner();
        if inner.playing && !inner.destroyed {
            inner.position += seconds;
        }
    }

    pub fn is_playing(&self) -> bool {
        self.inner().playing
    }

    pub fn last_cue(&self) -> Option<(String, f64)> {
        self.inner().cued.clone()
    }

    pub fn seeks(&self) -> Vec<f64> {
        self.inner().seeks.clone()
    }

    pub fn seek_count(&self) -> usize {
        self.inner().seeks.len()
    }

    pub fn is_destroyed(&self) -> bool {
        self.inner().destroyed
    }

    /// Report the player as ready
    pub fn emit_ready(&self) {
        self.events.ready();
    }

    /// Change playback state and notify the synchronizer
    pub fn emit_state(&self, state: PlayerState) {
        self.inner().playing = state == PlayerState::Playing;
        self.events.state_changed(state);
    }

    /// Jump to `position` and start playing, like a user scrubbing then pressing play
    pub fn play_from(&self, position: f64) {
        self.set_position(position);
        self.emit_state(PlayerState::Playing);
    }
}

impl PlayerHandle for SimulatedPlayer {
    fn cue_video_by_id(&self, video_id: &VideoId, start_seconds: f64) {
        let mut inner = self.inner();
        inner.cued = Some((video_id.to_string(), start_seconds));
        inner.position = start_seconds;
        inner.playing = false;
    }

    fn seek_to(&self, seconds: f64, _allow_seek_ahead: bool) {
        let mut inner = self.inner();
        inner.position = seconds;
        inner.seeks.push(seconds);
    }

    fn current_time(&self) -> f64 {
        self.inner().position
    }

    fn destroy(&self) {
        let mut inner = self.inner();
        inner.destroyed = true;
        inner.playing = false;
    }
}

/// Platform that creates `SimulatedPlayer`s and keeps them for inspection
#[derive(Default)]
pub struct SimulatedPlatform {
    players: Mutex<Vec<Arc<SimulatedPlayer>>>,
    reject_mounts: Mutex<Vec<String>>,
}

impl SimulatedPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make creation fail for one mount id
    pub fn reject_mount(&self, mount_id: &str) {
        self.reject_mounts
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(mount_id.to_string());
    }

    /// Every player created so far, in creation order
    pub fn players(&self) -> Vec<Arc<SimulatedPlayer>> {
        self.players
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn player(&self, mount_id: &str) -> Option<Arc<SimulatedPlayer>> {
        self.players().into_iter().find(|p| p.mount_id() == mount_id)
    }

    /// Players that were created and not yet destroyed
    pub fn live_count(&self) -> usize {
        self.players().iter().filter(|p| !p.is_destroyed()).count()
    }
}

impl PlayerPlatform for SimulatedPlatform {
    fn create(
        &self,
        mount_id: &str,
        video_id: &VideoId,
        options: &PlayerOptions,
        events: EventSink,
    ) -> Result<Arc<dyn PlayerHandle>> {
        let rejected = self
            .reject_mounts
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .iter()
            .any(|m| m == mount_id);
        if rejected {
            return Err(SyncError::SurfaceCreation {
                index: events.index(),
                reason: format!("mount point {} not found", mount_id),
            });
        }

        let player = Arc::new(SimulatedPlayer::new(mount_id, video_id, options, events));
        self.players
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(player.clone());
        let handle: Arc<dyn PlayerHandle> = player;
        Ok(handle)
    }

    fn name(&self) -> &str {
        "simulated"
    }
}

/// Loader for `SimulatedPlatform`, optionally failing
pub struct SimulatedLoader {
    platform: Arc<SimulatedPlatform>,
    fail: AtomicBool,
    loads: Arc<AtomicUsize>,
}

impl SimulatedLoader {
    pub fn new() -> Self {
        Self::with_platform(Arc::new(SimulatedPlatform::new()))
    }

    pub fn with_platform(platform: Arc<SimulatedPlatform>) -> Self {
        Self {
            platform,
            fail: AtomicBool::new(false),
            loads: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Loader whose capability never becomes available
    pub fn failing() -> Self {
        let loader = Self::new();
        loader.fail.store(true, Ordering::SeqCst);
        loader
    }

    /// Shared counter of load attempts
    pub fn load_counter(&self) -> Arc<AtomicUsize> {
        self.loads.clone()
    }
}

impl Default for SimulatedLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PlatformLoader for SimulatedLoader {
    async fn load(&self) -> anyhow::Result<Arc<dyn PlayerPlatform>> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;
        if self.fail.load(Ordering::SeqCst) {
            anyhow::bail!("simulated player script failed to load");
        }
        let platform: Arc<dyn PlayerPlatform> = self.platform.clone();
        Ok(platform)
    }
}
