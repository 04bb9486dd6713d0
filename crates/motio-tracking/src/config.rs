use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::TrackingError;

/// Parameters of a [`crate::MotionHistory`].
///
/// All durations are in seconds. Fields missing from a serialized
/// configuration take their default value.
///
/// # Examples
///
/// ```
/// use motio_tracking::MotionHistoryConfig;
///
/// let config = MotionHistoryConfig::from_json_str(r#"{ "mhi_duration": 2.0 }"#).unwrap();
///
/// assert_eq!(config.mhi_duration, 2.0);
/// assert_eq!(config.buffer_count, MotionHistoryConfig::default().buffer_count);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionHistoryConfig {
    /// Number of frames kept in the ring buffer. The motion silhouette is the
    /// difference between the newest frame and the one `buffer_count - 1`
    /// updates earlier.
    pub buffer_count: usize,
    /// How long a motion stays in the history.
    pub mhi_duration: f64,
    /// Largest local time step accepted as a motion gradient, also used as
    /// the segmentation threshold.
    pub max_time_delta: f64,
    /// Smallest local time step accepted as a motion gradient.
    pub min_time_delta: f64,
    /// Absolute intensity difference above which a pixel is moving.
    pub diff_threshold: u8,
    /// Size of the Sobel kernel used for the gradient, 3 or 5.
    pub gradient_aperture: usize,
}

impl Default for MotionHistoryConfig {
    fn default() -> Self {
        Self {
            buffer_count: 2,
            mhi_duration: 1.0,
            max_time_delta: 0.5,
            min_time_delta: 0.05,
            diff_threshold: 30,
            gradient_aperture: 3,
        }
    }
}

impl MotionHistoryConfig {
    /// Check that the parameters can drive a motion history.
    pub fn validate(&self) -> Result<(), TrackingError> {
        if self.buffer_count < 2 {
            return Err(TrackingError::InvalidConfig(format!(
                "buffer_count must be at least 2, got {}",
                self.buffer_count
            )));
        }

        if !self.mhi_duration.is_finite() || self.mhi_duration <= 0.0 {
            return Err(TrackingError::InvalidConfig(format!(
                "mhi_duration must be a positive number of seconds, got {}",
                self.mhi_duration
            )));
        }

        if !(self.min_time_delta >= 0.0 && self.min_time_delta < self.max_time_delta) {
            return Err(TrackingError::InvalidConfig(format!(
                "time deltas must satisfy 0 <= min_time_delta < max_time_delta, got {} and {}",
                self.min_time_delta, self.max_time_delta
            )));
        }

        if !self.max_time_delta.is_finite() {
            return Err(TrackingError::InvalidConfig(
                "max_time_delta must be finite".to_string(),
            ));
        }

        if !matches!(self.gradient_aperture, 3 | 5) {
            return Err(TrackingError::InvalidConfig(format!(
                "gradient_aperture must be 3 or 5, got {}",
                self.gradient_aperture
            )));
        }

        Ok(())
    }

    /// Parse and validate a configuration from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self, TrackingError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and validate a configuration from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, TrackingError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }
}
