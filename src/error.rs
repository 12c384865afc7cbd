/// Error types for the segment synchronizer

/// Result type for synchronizer operations
pub type Result<T> = std::result::Result<T, SyncError>;

/// Errors raised by the synchronizer and the player platform seam
#[derive(thiserror::Error, Debug)]
pub enum SyncError {
    #[error("Failed to create player surface {index}: {reason}")]
    SurfaceCreation { index: usize, reason: String },

    #[error("No async runtime available to drive the position poll")]
    NoRuntime,
}

/// Rejections for a submitted video URL
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum UrlError {
    #[error("Please enter a URL")]
    EmptyUrl,

    #[error("Please enter a valid YouTube URL")]
    UnsupportedUrl,
}
