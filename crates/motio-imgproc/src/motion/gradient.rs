use motio_image::{Image, ImageError};
use rayon::prelude::*;

use crate::filter;

/// Convert a gradient vector to an angle in degrees in `[0, 360)`.
#[inline]
pub(crate) fn gradient_angle(dx: f32, dy: f32) -> f32 {
    let angle = dy.atan2(dx).to_degrees();
    let angle = if angle < 0.0 { angle + 360.0 } else { angle };
    // rounding of tiny negative angles can land exactly on 360
    if angle >= 360.0 {
        0.0
    } else {
        angle
    }
}

/// Compute the gradient orientation of a motion history image.
///
/// The orientation of every pixel is the direction of the MHI gradient, in
/// degrees in `[0, 360)`, measured in image coordinates (the y axis points
/// down). A pixel is valid when its history is not empty and the spread of
/// the MHI in its `aperture × aperture` neighbourhood lies inside
/// `[min(delta1, delta2), max(delta1, delta2)]`. Invalid pixels get a zero
/// mask and a zero orientation.
///
/// # Arguments
///
/// * `mhi` - The motion history image.
/// * `mask` - The output mask, 1 for valid orientations and 0 elsewhere.
/// * `orientation` - The output orientation in degrees.
/// * `delta1` - One bound of the accepted MHI spread, in seconds.
/// * `delta2` - The other bound of the accepted MHI spread, in seconds.
/// * `aperture` - The size of the Sobel kernel, 3 or 5.
///
/// # Examples
///
/// ```
/// use motio_image::{Image, ImageSize};
/// use motio_imgproc::motion::calc_motion_gradient;
///
/// let size = ImageSize { width: 5, height: 3 };
/// // motion towards the right: newer timestamps on the right
/// let row = [1.0, 1.1, 1.2, 1.3, 1.4];
/// let mhi = Image::<f32, 1>::new(size, row.repeat(3)).unwrap();
///
/// let mut mask = Image::<u8, 1>::from_size_val(size, 0).unwrap();
/// let mut orientation = Image::<f32, 1>::from_size_val(size, 0.0).unwrap();
/// calc_motion_gradient(&mhi, &mut mask, &mut orientation, 0.05, 0.5, 3).unwrap();
///
/// assert_eq!(mask.get([1, 2, 0]), Some(&1));
/// assert_eq!(orientation.get([1, 2, 0]), Some(&0.0));
/// ```
pub fn calc_motion_gradient(
    mhi: &Image<f32, 1>,
    mask: &mut Image<u8, 1>,
    orientation: &mut Image<f32, 1>,
    delta1: f64,
    delta2: f64,
    aperture: usize,
) -> Result<(), ImageError> {
    if mhi.size() != mask.size() {
        return Err(ImageError::InvalidImageSize(
            mask.cols(),
            mask.rows(),
            mhi.cols(),
            mhi.rows(),
        ));
    }

    if mhi.size() != orientation.size() {
        return Err(ImageError::InvalidImageSize(
            orientation.cols(),
            orientation.rows(),
            mhi.cols(),
            mhi.rows(),
        ));
    }

    let min_delta = delta1.min(delta2) as f32;
    let max_delta = delta1.max(delta2) as f32;

    let mut dx = Image::<f32, 1>::from_size_val(mhi.size(), 0.0)?;
    let mut dy = Image::<f32, 1>::from_size_val(mhi.size(), 0.0)?;
    filter::spatial_gradient(mhi, &mut dx, &mut dy, aperture)?;

    let mut local_min = Image::<f32, 1>::from_size_val(mhi.size(), 0.0)?;
    let mut local_max = Image::<f32, 1>::from_size_val(mhi.size(), 0.0)?;
    filter::min_max_filter(mhi, &mut local_min, &mut local_max, (aperture - 1) / 2)?;

    mask.as_slice_mut()
        .par_iter_mut()
        .zip(orientation.as_slice_mut().par_iter_mut())
        .enumerate()
        .for_each(|(i, (m, o))| {
            let spread = local_max.as_slice()[i] - local_min.as_slice()[i];
            let valid =
                mhi.as_slice()[i] != 0.0 && spread >= min_delta && spread <= max_delta;
            if valid {
                *m = 1;
                *o = gradient_angle(dx.as_slice()[i], dy.as_slice()[i]);
            } else {
                *m = 0;
                *o = 0.0;
            }
        });

    Ok(())
}
