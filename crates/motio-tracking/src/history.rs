use std::time::Instant;

use log::{debug, warn};
use motio_image::{Image, ImageSize, Rect};
use motio_imgproc::{
    core::{abs_diff, count_non_zero},
    crop::crop_rect,
    motion::{
        calc_global_orientation, calc_motion_gradient, segment_motion, update_motion_history,
        MotionComponent,
    },
    parallel,
    threshold::threshold_binary,
};

use crate::{config::MotionHistoryConfig, error::TrackingError};

/// Summary of the motion inside a region.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MotionInfo {
    /// Dominant motion direction in degrees in `[0, 360)`, counter-clockwise
    /// with 0 pointing to the right and 90 pointing up in the image.
    pub angle: f64,
    /// Number of pixels of the region in the current motion silhouette.
    pub motion_pixel_count: usize,
}

/// The moving regions of the scene.
#[derive(Clone, Debug, PartialEq)]
pub struct MotionSegmentation {
    /// Per pixel component label, 0 for the background.
    pub labels: Image<u32, 1>,
    /// The components, ordered by label.
    pub components: Vec<MotionComponent>,
}

/// Buffers sized after the first frame.
#[derive(Clone, Debug)]
struct HistoryBuffers {
    /// Ring of the last frames, empty until the first frame arrives.
    frames: Vec<Image<u8, 1>>,
    /// Slot of the ring that receives the next frame.
    next_frame: usize,
    diff: Image<u8, 1>,
    silhouette: Image<u8, 1>,
    mhi: Image<f32, 1>,
    mask: Image<u8, 1>,
    orientation: Image<f32, 1>,
    orientation_mask: Image<u8, 1>,
}

impl HistoryBuffers {
    fn new(size: ImageSize) -> Result<Self, TrackingError> {
        Ok(Self {
            frames: Vec::new(),
            next_frame: 0,
            diff: Image::from_size_val(size, 0)?,
            silhouette: Image::from_size_val(size, 0)?,
            mhi: Image::from_size_val(size, 0.0)?,
            mask: Image::from_size_val(size, 0)?,
            orientation: Image::from_size_val(size, 0.0)?,
            orientation_mask: Image::from_size_val(size, 0)?,
        })
    }

    fn size(&self) -> ImageSize {
        self.mhi.size()
    }

    /// Store the frame in the ring and compute the silhouette against the
    /// oldest frame of the ring.
    fn push_frame(
        &mut self,
        frame: &Image<u8, 1>,
        buffer_count: usize,
        diff_threshold: u8,
    ) -> Result<(), TrackingError> {
        if self.frames.is_empty() {
            self.frames = vec![frame.clone(); buffer_count];
        }

        let current = self.next_frame;
        let oldest = (current + 1) % self.frames.len();
        self.frames[current]
            .as_slice_mut()
            .copy_from_slice(frame.as_slice());
        self.next_frame = oldest;

        abs_diff(&self.frames[current], &self.frames[oldest], &mut self.diff)?;
        threshold_binary(&self.diff, &mut self.silhouette, diff_threshold, 1)?;

        Ok(())
    }

    fn set_foreground(&mut self, foreground: &Image<u8, 1>) -> Result<(), TrackingError> {
        threshold_binary(foreground, &mut self.silhouette, 0, 1)?;
        Ok(())
    }

    /// Fold the current silhouette into the history and recompute the
    /// derived images.
    fn refresh(&mut self, timestamp: f64, config: &MotionHistoryConfig) -> Result<(), TrackingError> {
        let duration = config.mhi_duration;
        update_motion_history(
            &self.silhouette,
            &mut self.mhi,
            timestamp as f32,
            duration as f32,
        )?;

        let delbound = timestamp - duration;
        let scale = 255.0 / duration;
        parallel::par_iter_rows_val(&self.mhi, &mut self.mask, |&t, m| {
            *m = if t == 0.0 {
                0
            } else {
                ((t as f64 - delbound) * scale).round().clamp(0.0, 255.0) as u8
            };
        });

        calc_motion_gradient(
            &self.mhi,
            &mut self.orientation_mask,
            &mut self.orientation,
            config.max_time_delta,
            config.min_time_delta,
            config.gradient_aperture,
        )?;

        Ok(())
    }
}

/// Motion history over a rolling window of grayscale frames.
///
/// Every update turns the new frame into a motion silhouette, stamps the
/// moving pixels with the time of the update in the motion history image
/// and forgets motion older than the configured duration. The history
/// then yields the orientation of the motion and the moving regions.
///
/// Timestamps are measured in seconds from the start time of the tracker
/// and must not decrease between updates.
///
/// # Examples
///
/// ```
/// use std::time::{Duration, Instant};
///
/// use motio_image::{Image, ImageSize};
/// use motio_tracking::{MotionHistory, MotionHistoryConfig};
///
/// let start = Instant::now();
/// let mut history = MotionHistory::with_start_time(MotionHistoryConfig::default(), start).unwrap();
///
/// let size = ImageSize { width: 32, height: 32 };
/// let still = Image::<u8, 1>::from_size_val(size, 0).unwrap();
/// let mut moved = still.clone();
/// moved.as_slice_mut()[..64].fill(255);
///
/// history.update_at(&still, start + Duration::from_millis(100)).unwrap();
/// history.update_at(&moved, start + Duration::from_millis(200)).unwrap();
///
/// let info = history.global_motion_info().unwrap();
/// assert_eq!(info.motion_pixel_count, 64);
/// ```
#[derive(Clone, Debug)]
pub struct MotionHistory {
    config: MotionHistoryConfig,
    start_time: Instant,
    last_timestamp: Option<f64>,
    buffers: Option<HistoryBuffers>,
}

impl MotionHistory {
    /// Create a motion history whose clock starts now.
    pub fn new(config: MotionHistoryConfig) -> Result<Self, TrackingError> {
        Self::with_start_time(config, Instant::now())
    }

    /// Create a motion history whose clock starts at `start_time`.
    pub fn with_start_time(
        config: MotionHistoryConfig,
        start_time: Instant,
    ) -> Result<Self, TrackingError> {
        config.validate()?;
        Ok(Self {
            config,
            start_time,
            last_timestamp: None,
            buffers: None,
        })
    }

    /// The configuration of the motion history.
    pub fn config(&self) -> &MotionHistoryConfig {
        &self.config
    }

    /// The start of the clock of the motion history.
    pub fn start_time(&self) -> Instant {
        self.start_time
    }

    /// Seconds between the start time and the last update.
    pub fn last_timestamp(&self) -> Option<f64> {
        self.last_timestamp
    }

    /// The size of the tracked frames, once the first frame was seen.
    pub fn frame_size(&self) -> Option<ImageSize> {
        self.buffers.as_ref().map(HistoryBuffers::size)
    }

    /// Binary mask of the pixels that moved in the last update.
    pub fn foreground_mask(&self) -> Option<&Image<u8, 1>> {
        self.buffers.as_ref().map(|b| &b.silhouette)
    }

    /// The motion history image, in seconds since the start time.
    pub fn mhi(&self) -> Option<&Image<f32, 1>> {
        self.buffers.as_ref().map(|b| &b.mhi)
    }

    /// The motion history scaled to 8 bits: 255 for the last update fading
    /// to 0 for motion older than the history duration.
    pub fn mask(&self) -> Option<&Image<u8, 1>> {
        self.buffers.as_ref().map(|b| &b.mask)
    }

    /// Per pixel motion orientation in degrees, in image coordinates.
    pub fn orientation(&self) -> Option<&Image<f32, 1>> {
        self.buffers.as_ref().map(|b| &b.orientation)
    }

    /// Mask of the pixels with a valid orientation.
    pub fn orientation_mask(&self) -> Option<&Image<u8, 1>> {
        self.buffers.as_ref().map(|b| &b.orientation_mask)
    }

    /// Update the history with a frame captured now.
    pub fn update(&mut self, frame: &Image<u8, 1>) -> Result<(), TrackingError> {
        self.update_at(frame, Instant::now())
    }

    /// Update the history with a frame captured at `timestamp`.
    ///
    /// The motion silhouette is the thresholded difference between the frame
    /// and the frame `buffer_count - 1` updates earlier. The first frame
    /// fixes the size of the tracked frames and yields no motion.
    pub fn update_at(
        &mut self,
        frame: &Image<u8, 1>,
        timestamp: Instant,
    ) -> Result<(), TrackingError> {
        let ts = self.seconds_since_start(timestamp)?;
        let (buffer_count, diff_threshold) = (self.config.buffer_count, self.config.diff_threshold);
        let buffers = self.buffers_for(frame.size())?;
        buffers.push_frame(frame, buffer_count, diff_threshold)?;
        self.commit(ts)
    }

    /// Update the history with a foreground mask computed by the caller.
    ///
    /// Every non zero pixel of `foreground` is moving. The frame ring is not
    /// touched.
    pub fn update_with_foreground(
        &mut self,
        foreground: &Image<u8, 1>,
        timestamp: Instant,
    ) -> Result<(), TrackingError> {
        let ts = self.seconds_since_start(timestamp)?;
        let buffers = self.buffers_for(foreground.size())?;
        buffers.set_foreground(foreground)?;
        self.commit(ts)
    }

    /// Split the current history into moving regions.
    ///
    /// Regions are seeded by the pixels that moved in the last update and
    /// grow over neighbours whose history differs by at most `max_time_delta`.
    pub fn motion_components(&self) -> Result<MotionSegmentation, TrackingError> {
        let (buffers, ts) = self.current()?;
        let mut labels = Image::from_size_val(buffers.size(), 0)?;
        let components = segment_motion(
            &buffers.mhi,
            &mut labels,
            ts as f32,
            self.config.max_time_delta as f32,
        )?;
        debug!("segmented {} motion components", components.len());
        Ok(MotionSegmentation { labels, components })
    }

    /// Summarize the motion inside `rect`.
    ///
    /// The rectangle is clipped to the frame. Fails with
    /// [`TrackingError::InvalidRegion`] when nothing of it is left.
    pub fn motion_info(&self, rect: Rect) -> Result<MotionInfo, TrackingError> {
        let (buffers, ts) = self.current()?;
        let size = buffers.size();
        let roi = rect
            .clip(size)
            .ok_or(TrackingError::InvalidRegion(rect, size))?;

        if roi == Rect::from_size(size) {
            return self.region_info(
                &buffers.orientation,
                &buffers.orientation_mask,
                &buffers.mhi,
                &buffers.silhouette,
                ts,
            );
        }

        self.region_info(
            &crop_rect(&buffers.orientation, roi)?,
            &crop_rect(&buffers.orientation_mask, roi)?,
            &crop_rect(&buffers.mhi, roi)?,
            &crop_rect(&buffers.silhouette, roi)?,
            ts,
        )
    }

    /// Summarize the motion of the whole frame.
    pub fn global_motion_info(&self) -> Result<MotionInfo, TrackingError> {
        let (buffers, _) = self.current()?;
        self.motion_info(Rect::from_size(buffers.size()))
    }

    /// Forget every frame and restart the clock now.
    pub fn reset(&mut self) {
        self.reset_at(Instant::now());
    }

    /// Forget every frame and restart the clock at `start_time`.
    pub fn reset_at(&mut self, start_time: Instant) {
        self.start_time = start_time;
        self.last_timestamp = None;
        self.buffers = None;
    }

    fn seconds_since_start(&self, timestamp: Instant) -> Result<f64, TrackingError> {
        let ts = timestamp
            .checked_duration_since(self.start_time)
            .ok_or(TrackingError::TimestampBeforeStart)?
            .as_secs_f64();

        if let Some(last) = self.last_timestamp {
            if ts < last {
                warn!("rejecting timestamp {ts:.6}s older than the last update at {last:.6}s");
                return Err(TrackingError::TimestampRegression(ts, last));
            }
        }

        Ok(ts)
    }

    fn buffers_for(&mut self, size: ImageSize) -> Result<&mut HistoryBuffers, TrackingError> {
        if let Some(expected) = self.frame_size() {
            if expected != size {
                return Err(TrackingError::FrameSizeMismatch {
                    expected,
                    actual: size,
                });
            }
        } else {
            debug!("allocating motion history buffers for {size}");
            self.buffers = Some(HistoryBuffers::new(size)?);
        }

        self.buffers.as_mut().ok_or(TrackingError::NotInitialized)
    }

    fn commit(&mut self, ts: f64) -> Result<(), TrackingError> {
        let buffers = self.buffers.as_mut().ok_or(TrackingError::NotInitialized)?;
        buffers.refresh(ts, &self.config)?;
        self.last_timestamp = Some(ts);

        debug!(
            "motion history updated at {ts:.3}s: {} moving pixels",
            count_non_zero(&buffers.silhouette)
        );

        Ok(())
    }

    fn current(&self) -> Result<(&HistoryBuffers, f64), TrackingError> {
        match (&self.buffers, self.last_timestamp) {
            (Some(buffers), Some(ts)) => Ok((buffers, ts)),
            _ => Err(TrackingError::NotInitialized),
        }
    }

    fn region_info(
        &self,
        orientation: &Image<f32, 1>,
        orientation_mask: &Image<u8, 1>,
        mhi: &Image<f32, 1>,
        silhouette: &Image<u8, 1>,
        ts: f64,
    ) -> Result<MotionInfo, TrackingError> {
        let angle = calc_global_orientation(
            orientation,
            orientation_mask,
            mhi,
            ts,
            self.config.mhi_duration,
        )?;

        Ok(MotionInfo {
            // the y axis of the image points down
            angle: (360.0 - angle).rem_euclid(360.0),
            motion_pixel_count: count_non_zero(silhouette),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use motio_image::{Image, ImageSize, Rect};

    use super::MotionHistory;
    use crate::{MotionHistoryConfig, TrackingError};

    fn size() -> ImageSize {
        ImageSize {
            width: 16,
            height: 12,
        }
    }

    fn at(start: Instant, millis: u64) -> Instant {
        start + Duration::from_millis(millis)
    }

    #[test]
    fn rejects_invalid_config() {
        let config = MotionHistoryConfig {
            buffer_count: 0,
            ..Default::default()
        };
        assert!(matches!(
            MotionHistory::new(config),
            Err(TrackingError::InvalidConfig(_))
        ));
    }

    #[test]
    fn queries_before_first_update() -> Result<(), TrackingError> {
        let history = MotionHistory::new(MotionHistoryConfig::default())?;
        assert!(history.mhi().is_none());
        assert!(history.frame_size().is_none());
        assert!(matches!(
            history.motion_components(),
            Err(TrackingError::NotInitialized)
        ));
        assert!(matches!(
            history.global_motion_info(),
            Err(TrackingError::NotInitialized)
        ));
        Ok(())
    }

    #[test]
    fn first_frame_has_no_motion() -> Result<(), TrackingError> {
        let start = Instant::now();
        let mut history = MotionHistory::with_start_time(MotionHistoryConfig::default(), start)?;
        let frame = Image::<u8, 1>::from_size_val(size(), 200)?;

        history.update_at(&frame, at(start, 100))?;

        assert_eq!(history.frame_size(), Some(size()));
        assert_eq!(history.last_timestamp(), Some(0.1));
        assert!(history
            .mhi()
            .is_some_and(|mhi| mhi.as_slice().iter().all(|&t| t == 0.0)));
        assert_eq!(history.global_motion_info()?.motion_pixel_count, 0);
        assert!(history.motion_components()?.components.is_empty());
        Ok(())
    }

    #[test]
    fn rejects_frames_of_another_size() -> Result<(), TrackingError> {
        let start = Instant::now();
        let mut history = MotionHistory::with_start_time(MotionHistoryConfig::default(), start)?;
        history.update_at(&Image::from_size_val(size(), 0)?, at(start, 100))?;

        let other = Image::<u8, 1>::from_size_val([8, 8].into(), 0)?;
        let res = history.update_at(&other, at(start, 200));
        assert!(matches!(
            res,
            Err(TrackingError::FrameSizeMismatch { expected, actual })
                if expected == size() && actual == other.size()
        ));

        // the failed update leaves the clock untouched
        assert_eq!(history.last_timestamp(), Some(0.1));
        Ok(())
    }

    #[test]
    fn rejects_timestamps_going_back() -> Result<(), TrackingError> {
        let start = Instant::now();
        let mut history = MotionHistory::with_start_time(MotionHistoryConfig::default(), start)?;
        let frame = Image::<u8, 1>::from_size_val(size(), 0)?;

        history.update_at(&frame, at(start, 500))?;
        // equal timestamps are accepted
        history.update_at(&frame, at(start, 500))?;

        assert!(matches!(
            history.update_at(&frame, at(start, 400)),
            Err(TrackingError::TimestampRegression(..))
        ));

        let late_start = at(start, 1000);
        let mut history = MotionHistory::with_start_time(MotionHistoryConfig::default(), late_start)?;
        assert!(matches!(
            history.update_at(&frame, start),
            Err(TrackingError::TimestampBeforeStart)
        ));
        Ok(())
    }

    #[test]
    fn mask_fades_with_age() -> Result<(), TrackingError> {
        let start = Instant::now();
        let mut history = MotionHistory::with_start_time(MotionHistoryConfig::default(), start)?;

        let mut foreground = Image::<u8, 1>::from_size_val(size(), 0)?;
        if let Some(px) = foreground.get_mut([3, 4, 0]) {
            *px = 255;
        }
        history.update_with_foreground(&foreground, at(start, 1000))?;
        assert_eq!(history.mask().and_then(|m| m.get([3, 4, 0])), Some(&255));
        assert_eq!(history.mask().and_then(|m| m.get([0, 0, 0])), Some(&0));

        let empty = Image::<u8, 1>::from_size_val(size(), 0)?;
        history.update_with_foreground(&empty, at(start, 1250))?;
        assert_eq!(history.mask().and_then(|m| m.get([3, 4, 0])), Some(&191));

        // older than the one second duration
        history.update_with_foreground(&empty, at(start, 2500))?;
        assert_eq!(history.mask().and_then(|m| m.get([3, 4, 0])), Some(&0));
        assert_eq!(history.mhi().and_then(|m| m.get([3, 4, 0])), Some(&0.0));
        Ok(())
    }

    #[test]
    fn motion_expires_exactly_one_duration_later() -> Result<(), TrackingError> {
        let start = Instant::now();
        let mut history = MotionHistory::with_start_time(MotionHistoryConfig::default(), start)?;

        let foreground = Image::<u8, 1>::from_size_val(size(), 1)?;
        history.update_with_foreground(&foreground, at(start, 1000))?;

        let empty = Image::<u8, 1>::from_size_val(size(), 0)?;
        history.update_with_foreground(&empty, at(start, 2000))?;

        // history, mask and segmentation agree that nothing is left
        assert!(history
            .mhi()
            .is_some_and(|mhi| mhi.as_slice().iter().all(|&t| t == 0.0)));
        assert!(history
            .mask()
            .is_some_and(|m| m.as_slice().iter().all(|&v| v == 0)));
        assert!(history
            .orientation_mask()
            .is_some_and(|m| m.as_slice().iter().all(|&v| v == 0)));
        assert!(history.motion_components()?.components.is_empty());
        Ok(())
    }

    #[test]
    fn rejected_foreground_keeps_the_state() -> Result<(), TrackingError> {
        let start = Instant::now();
        let mut history = MotionHistory::with_start_time(MotionHistoryConfig::default(), start)?;

        let mut foreground = Image::<u8, 1>::from_size_val(size(), 0)?;
        if let Some(px) = foreground.get_mut([5, 6, 0]) {
            *px = 1;
        }
        history.update_with_foreground(&foreground, at(start, 300))?;
        let mhi_before = history.mhi().cloned();
        let mask_before = history.mask().cloned();

        let other = Image::<u8, 1>::from_size_val([8, 8].into(), 1)?;
        assert!(matches!(
            history.update_with_foreground(&other, at(start, 400)),
            Err(TrackingError::FrameSizeMismatch { .. })
        ));

        assert_eq!(history.mhi().cloned(), mhi_before);
        assert_eq!(history.mask().cloned(), mask_before);
        assert_eq!(history.last_timestamp(), Some(0.3));
        Ok(())
    }

    #[test]
    fn motion_info_clips_huge_regions() -> Result<(), TrackingError> {
        let start = Instant::now();
        let mut history = MotionHistory::with_start_time(MotionHistoryConfig::default(), start)?;

        let mut foreground = Image::<u8, 1>::from_size_val(size(), 0)?;
        for x in 0..4 {
            if let Some(px) = foreground.get_mut([2, x, 0]) {
                *px = 1;
            }
        }
        history.update_with_foreground(&foreground, at(start, 100))?;

        let wide = Rect {
            x: 1,
            y: 0,
            width: usize::MAX,
            height: 4,
        };
        // columns 1..16 of rows 0..4 see three of the four moving pixels
        assert_eq!(history.motion_info(wide)?.motion_pixel_count, 3);
        Ok(())
    }

    #[test]
    fn motion_info_rejects_regions_outside_the_frame() -> Result<(), TrackingError> {
        let start = Instant::now();
        let mut history = MotionHistory::with_start_time(MotionHistoryConfig::default(), start)?;
        history.update_at(&Image::from_size_val(size(), 0)?, at(start, 100))?;

        let outside = Rect {
            x: 16,
            y: 0,
            width: 4,
            height: 4,
        };
        assert!(matches!(
            history.motion_info(outside),
            Err(TrackingError::InvalidRegion(rect, frame)) if rect == outside && frame == size()
        ));
        Ok(())
    }

    #[test]
    fn reset_forgets_everything() -> Result<(), TrackingError> {
        let start = Instant::now();
        let mut history = MotionHistory::with_start_time(MotionHistoryConfig::default(), start)?;
        history.update_at(&Image::from_size_val(size(), 0)?, at(start, 100))?;

        let restart = at(start, 5000);
        history.reset_at(restart);
        assert_eq!(history.start_time(), restart);
        assert!(history.frame_size().is_none());
        assert!(history.last_timestamp().is_none());

        // a frame of another size is accepted after the reset
        history.update_at(&Image::from_size_val([4, 4].into(), 0)?, at(restart, 10))?;
        assert_eq!(history.frame_size(), Some([4, 4].into()));
        Ok(())
    }
}
