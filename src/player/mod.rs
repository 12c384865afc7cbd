/// Embedded player platform abstraction
///
/// The synchronizer never talks to a concrete player. A `PlayerPlatform`
/// creates handles bound to a mount point, and delivers "ready" and
/// "state changed" notifications through an `EventSink`.

pub mod provider;
pub mod simulated;

pub use provider::{PlatformLoader, PlatformProvider};
pub use simulated::{SimulatedLoader, SimulatedPlatform, SimulatedPlayer};

use crate::error::Result;
use crate::video_id::VideoId;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Playback states reported by the embedded player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerState {
    Unstarted,
    Ended,
    Playing,
    Paused,
    Buffering,
    Cued,
}

impl PlayerState {
    /// Map the numeric state codes used by the iframe player API
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            -1 => Some(Self::Unstarted),
            0 => Some(Self::Ended),
            1 => Some(Self::Playing),
            2 => Some(Self::Paused),
            3 => Some(Self::Buffering),
            5 => Some(Self::Cued),
            _ => None,
        }
    }

    pub fn code(&self) -> i32 {
        match self {
            Self::Unstarted => -1,
            Self::Ended => 0,
            Self::Playing => 1,
            Self::Paused => 2,
            Self::Buffering => 3,
            Self::Cued => 5,
        }
    }
}

/// Options passed to the platform when a surface is created
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerOptions {
    pub width: u32,
    pub height: u32,
    pub autoplay: bool,
    pub controls: bool,
    pub modest_branding: bool,
}

impl Default for PlayerOptions {
    fn default() -> Self {
        Self {
            width: 560,
            height: 315,
            autoplay: false,
            controls: true,
            modest_branding: true,
        }
    }
}

/// Notification from a player instance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerEvent {
    Ready,
    StateChanged(PlayerState),
}

/// A player notification tagged with the surface index it belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceEvent {
    pub index: usize,
    pub event: PlayerEvent,
}

/// Per-surface sender handed to the platform at creation time
#[derive(Debug, Clone)]
pub struct EventSink {
    index: usize,
    tx: mpsc::UnboundedSender<SurfaceEvent>,
}

impl EventSink {
    pub fn new(index: usize, tx: mpsc::UnboundedSender<SurfaceEvent>) -> Self {
        Self { index, tx }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Deliver an event; silently dropped once the synchronizer is gone
    pub fn emit(&self, event: PlayerEvent) {
        let _ = self.tx.send(SurfaceEvent {
            index: self.index,
            event,
        });
    }

    pub fn ready(&self) {
        self.emit(PlayerEvent::Ready);
    }

    pub fn state_changed(&self, state: PlayerState) {
        self.emit(PlayerEvent::StateChanged(state));
    }
}

/// Native player instance owned by one surface
pub trait PlayerHandle: Send + Sync {
    /// Load the video paused at `start_seconds`
    fn cue_video_by_id(&self, video_id: &VideoId, start_seconds: f64);
    fn seek_to(&self, seconds: f64, allow_seek_ahead: bool);
    /// Current playback position in seconds
    fn current_time(&self) -> f64;
    fn destroy(&self);
}

/// Embeddable player capability
pub trait PlayerPlatform: Send + Sync {
    fn create(
        &self,
        mount_id: &str,
        video_id: &VideoId,
        options: &PlayerOptions,
        events: EventSink,
    ) -> Result<Arc<dyn PlayerHandle>>;

    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_codes_round_trip() {
        for state in [
            PlayerState::Unstarted,
            PlayerState::Ended,
            PlayerState::Playing,
            PlayerState::Paused,
            PlayerState::Buffering,
            PlayerState::Cued,
        ] {
            assert_eq!(PlayerState::from_code(state.code()), Some(state));
        }
        assert_eq!(PlayerState::from_code(4), None);
    }

    #[test]
    fn test_default_options_disable_autoplay() {
        let options = PlayerOptions::default();
        assert!(!options.autoplay);
        assert!(options.controls);
    }

    #[test]
    fn test_event_sink_tags_index() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let sink = EventSink::new(3, tx);
        sink.state_changed(PlayerState::Paused);
        let event = rx.try_recv().unwrap();
        assert_eq!(event.index, 3);
        assert_eq!(event.event, PlayerEvent::StateChanged(PlayerState::Paused));
    }
}
