/// Exercise Segment Sync
///
/// Plays detected exercise segments of a video, one embedded player per
/// segment, each locked to its own time window.

pub mod analysis;
pub mod config;
pub mod error;
pub mod logging;
pub mod player;
pub mod segment;
pub mod sync;
pub mod video_id;

// Re-export main types for easy access
pub use crate::analysis::{AnalysisClient, SegmentSource};
pub use crate::config::{Config, ConfigBuilder};
pub use crate::error::{Result, SyncError, UrlError};
pub use crate::player::{
    EventSink, PlatformLoader, PlatformProvider, PlayerEvent, PlayerHandle, PlayerOptions, PlayerPlatform,
    PlayerState, SurfaceEvent,
};
pub use crate::segment::{parse_timestamp_range, PlaybackWindow, Segment};
pub use crate::sync::{MountState, PlaybackSurface, SegmentSynchronizer, SyncSettings};
pub use crate::video_id::{extract_video_id, validate_submission, VideoId};
