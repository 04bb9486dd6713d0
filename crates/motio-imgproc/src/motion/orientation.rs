use motio_image::{Image, ImageError};

/// Number of bins of the orientation histogram.
const HISTOGRAM_BINS: usize = 12;

/// Wrap an angle difference into `[-180, 180]`.
#[inline]
fn wrap_relative(angle: f64) -> f64 {
    if angle < -180.0 {
        angle + 360.0
    } else if angle > 180.0 {
        angle - 360.0
    } else {
        angle
    }
}

/// Compute the dominant motion orientation of a region.
///
/// The orientations of the masked pixels are binned into a 12 bin histogram
/// to find a base direction, then the mean deviation from that base is added,
/// with recent motion weighted more than old motion. Pixels older than
/// `timestamp - duration` are ignored.
///
/// # Arguments
///
/// * `orientation` - The orientation image, as computed by [`super::calc_motion_gradient`].
/// * `mask` - The mask of valid orientations.
/// * `mhi` - The motion history image.
/// * `timestamp` - The current time in seconds.
/// * `duration` - The maximal duration of the motion track in seconds, finite and positive.
///
/// # Returns
///
/// The orientation in degrees in `[0, 360)`, in image coordinates. Zero when
/// no pixel contributes.
///
/// # Examples
///
/// ```
/// use motio_image::{Image, ImageSize};
/// use motio_imgproc::motion::calc_global_orientation;
///
/// let size = ImageSize { width: 3, height: 1 };
/// let orientation = Image::<f32, 1>::new(size, vec![80.0, 90.0, 100.0]).unwrap();
/// let mask = Image::<u8, 1>::new(size, vec![1, 1, 1]).unwrap();
/// let mhi = Image::<f32, 1>::new(size, vec![2.0, 2.0, 2.0]).unwrap();
///
/// let angle = calc_global_orientation(&orientation, &mask, &mhi, 2.0, 1.0).unwrap();
/// assert!((angle - 90.0).abs() < 1e-6);
/// ```
pub fn calc_global_orientation(
    orientation: &Image<f32, 1>,
    mask: &Image<u8, 1>,
    mhi: &Image<f32, 1>,
    timestamp: f64,
    duration: f64,
) -> Result<f64, ImageError> {
    if !duration.is_finite() || duration <= 0.0 {
        return Err(ImageError::InvalidDuration(duration));
    }

    for other in [orientation.size(), mask.size()] {
        if other != mhi.size() {
            return Err(ImageError::InvalidImageSize(
                other.width,
                other.height,
                mhi.cols(),
                mhi.rows(),
            ));
        }
    }

    let pixels = || {
        orientation
            .as_slice()
            .iter()
            .zip(mask.as_slice())
            .zip(mhi.as_slice())
            .filter(|((_, m), _)| **m != 0)
            .map(|((&o, _), &t)| (o as f64, t as f64))
    };

    // find the dominant direction
    let bin_width = 360.0 / HISTOGRAM_BINS as f64;
    let mut histogram = [0usize; HISTOGRAM_BINS];
    for (o, _) in pixels() {
        let bin = ((o / bin_width) as usize).min(HISTOGRAM_BINS - 1);
        histogram[bin] += 1;
    }

    // the first fullest bin wins ties
    let mut base_bin = 0;
    for (i, &count) in histogram.iter().enumerate() {
        if count > histogram[base_bin] {
            base_bin = i;
        }
    }
    let base = base_bin as f64 * bin_width;

    // weighted mean deviation from the base direction
    let delbound = timestamp - duration;
    let mut shift_sum = 0.0;
    let mut weight_sum = 0.0;
    for (o, t) in pixels() {
        if t <= delbound {
            continue;
        }
        let weight = (t - delbound) / duration;
        shift_sum += wrap_relative(o - base) * weight;
        weight_sum += weight;
    }

    let mut angle = base;
    if weight_sum.abs() > f64::EPSILON {
        angle += shift_sum / weight_sum;
    }

    Ok(angle.rem_euclid(360.0))
}
