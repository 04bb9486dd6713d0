#![deny(missing_docs)]
//! Motion history tracking over a rolling window of grayscale frames.
//!
//! [`MotionHistory`] keeps a ring of the last frames, turns frame differences
//! into motion silhouettes and accumulates them into a motion history image.
//! From the history it derives a per-pixel motion orientation, a segmentation
//! of the scene into moving regions and summary statistics per region.

/// Configuration of the motion history.
pub mod config;

/// Error types for the tracking module.
pub mod error;

/// The stateful motion history tracker.
pub mod history;

pub use crate::config::MotionHistoryConfig;
pub use crate::error::TrackingError;
pub use crate::history::{MotionHistory, MotionInfo, MotionSegmentation};
pub use motio_imgproc::motion::MotionComponent;
