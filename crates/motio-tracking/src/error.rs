use motio_image::{ImageError, ImageSize, Rect};

/// An error type for the tracking module.
#[derive(thiserror::Error, Debug)]
pub enum TrackingError {
    /// Error when the configuration values are not usable.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Error when a frame does not have the size of the tracked frames.
    #[error("Frame size {actual} does not match the tracked size {expected}")]
    FrameSizeMismatch {
        /// The size of the first frame.
        expected: ImageSize,
        /// The size of the rejected frame.
        actual: ImageSize,
    },

    /// Error when a timestamp is older than the start of the tracker.
    #[error("Timestamp is before the start time of the motion history")]
    TimestampBeforeStart,

    /// Error when a timestamp is older than the previous update.
    #[error("Timestamp {0:.6}s is older than the last update at {1:.6}s")]
    TimestampRegression(f64, f64),

    /// Error when querying motion before any frame was seen.
    #[error("The motion history has not received any frame yet")]
    NotInitialized,

    /// Error when a region does not overlap the frame.
    #[error("Region {0:?} does not overlap the frame {1}")]
    InvalidRegion(Rect, ImageSize),

    /// Error from an image operation.
    #[error(transparent)]
    Image(#[from] ImageError),

    /// Error when reading a configuration file.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Error when parsing a configuration file.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
