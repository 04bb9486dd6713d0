use motio_image::{Image, ImageError};
use rayon::prelude::*;

use super::{kernels, separable_filter};

/// Compute the first order image derivative in both x and y using a Sobel operator.
///
/// Borders are handled by replicating the closest pixel.
///
/// # Arguments
///
/// * `src` - The source image with shape (H, W, C).
/// * `dx` - The destination image for the x derivative with shape (H, W, C).
/// * `dy` - The destination image for the y derivative with shape (H, W, C).
/// * `aperture` - The size of the Sobel kernel, 3 or 5.
///
/// # Examples
///
/// ```
/// use motio_image::{Image, ImageSize};
/// use motio_imgproc::filter::spatial_gradient;
///
/// let size = ImageSize { width: 3, height: 3 };
/// let ramp = Image::<f32, 1>::new(size, vec![0., 1., 2., 0., 1., 2., 0., 1., 2.]).unwrap();
///
/// let mut dx = Image::<f32, 1>::from_size_val(size, 0.0).unwrap();
/// let mut dy = Image::<f32, 1>::from_size_val(size, 0.0).unwrap();
/// spatial_gradient(&ramp, &mut dx, &mut dy, 3).unwrap();
///
/// assert_eq!(dx.get([1, 1, 0]), Some(&8.0));
/// assert_eq!(dy.get([1, 1, 0]), Some(&0.0));
/// ```
pub fn spatial_gradient<const C: usize>(
    src: &Image<f32, C>,
    dx: &mut Image<f32, C>,
    dy: &mut Image<f32, C>,
    aperture: usize,
) -> Result<(), ImageError> {
    if src.size() != dx.size() {
        return Err(ImageError::InvalidImageSize(
            src.cols(),
            src.rows(),
            dx.cols(),
            dx.rows(),
        ));
    }

    if src.size() != dy.size() {
        return Err(ImageError::InvalidImageSize(
            src.cols(),
            src.rows(),
            dy.cols(),
            dy.rows(),
        ));
    }

    let (derivative, smoothing) = kernels::sobel_kernel_1d(aperture)?;

    separable_filter(src, dx, &derivative, &smoothing)?;
    separable_filter(src, dy, &smoothing, &derivative)?;

    Ok(())
}

/// Compute the local minimum and maximum of an image over a square window.
///
/// This is the erosion and dilation of a floating point image with a
/// `(2 * radius + 1)` square structuring element. Borders are handled by
/// replicating the closest pixel.
///
/// # Arguments
///
/// * `src` - The source image with shape (H, W, C).
/// * `min_dst` - The destination of the local minimum with shape (H, W, C).
/// * `max_dst` - The destination of the local maximum with shape (H, W, C).
/// * `radius` - Half size of the window.
pub fn min_max_filter<const C: usize>(
    src: &Image<f32, C>,
    min_dst: &mut Image<f32, C>,
    max_dst: &mut Image<f32, C>,
    radius: usize,
) -> Result<(), ImageError> {
    for dst in [&*min_dst, &*max_dst] {
        if src.size() != dst.size() {
            return Err(ImageError::InvalidImageSize(
                src.cols(),
                src.rows(),
                dst.cols(),
                dst.rows(),
            ));
        }
    }

    let cols = src.cols();
    let rows = src.rows();
    if cols == 0 || rows == 0 {
        return Ok(());
    }

    let src_data = src.as_slice();

    // horizontal pass, keeping the min and max interleaved per element
    let mut tmp = vec![(0.0f32, 0.0f32); src_data.len()];
    tmp.par_chunks_exact_mut(cols * C)
        .zip(src_data.par_chunks_exact(cols * C))
        .for_each(|(tmp_row, src_row)| {
            for x in 0..cols {
                let x0 = x.saturating_sub(radius);
                let x1 = (x + radius).min(cols - 1);
                for ch in 0..C {
                    let mut lo = f32::INFINITY;
                    let mut hi = f32::NEG_INFINITY;
                    for xi in x0..=x1 {
                        let v = src_row[xi * C + ch];
                        lo = lo.min(v);
                        hi = hi.max(v);
                    }
                    tmp_row[x * C + ch] = (lo, hi);
                }
            }
        });

    // vertical pass
    min_dst
        .as_slice_mut()
        .par_chunks_exact_mut(cols * C)
        .zip(max_dst.as_slice_mut().par_chunks_exact_mut(cols * C))
        .enumerate()
        .for_each(|(y, (min_row, max_row))| {
            let y0 = y.saturating_sub(radius);
            let y1 = (y + radius).min(rows - 1);
            for i in 0..cols * C {
                let mut lo = f32::INFINITY;
                let mut hi = f32::NEG_INFINITY;
                for yi in y0..=y1 {
                    let (l, h) = tmp[yi * cols * C + i];
                    lo = lo.min(l);
                    hi = hi.max(h);
                }
                min_row[i] = lo;
                max_row[i] = hi;
            }
        });

    Ok(())
}

#[cfg(test)]
mod tests {
    use motio_image::{Image, ImageError, ImageSize};

    #[test]
    fn test_spatial_gradient_vertical_ramp() -> Result<(), ImageError> {
        let size = ImageSize {
            width: 3,
            height: 4,
        };
        #[rustfmt::skip]
        let src = Image::<f32, 1>::new(
            size,
            vec![
                0.0, 0.0, 0.0,
                1.0, 1.0, 1.0,
                2.0, 2.0, 2.0,
                3.0, 3.0, 3.0,
            ],
        )?;
        let mut dx = Image::<f32, 1>::from_size_val(size, 0.0)?;
        let mut dy = Image::<f32, 1>::from_size_val(size, 0.0)?;
        super::spatial_gradient(&src, &mut dx, &mut dy, 3)?;

        assert!(dx.as_slice().iter().all(|&v| v == 0.0));
        // interior rows see the full slope, border rows only half of it
        assert_eq!(dy.get([1, 1, 0]), Some(&8.0));
        assert_eq!(dy.get([2, 2, 0]), Some(&8.0));
        assert_eq!(dy.get([0, 1, 0]), Some(&4.0));
        assert_eq!(dy.get([3, 0, 0]), Some(&4.0));
        Ok(())
    }

    #[test]
    fn test_spatial_gradient_aperture_5() -> Result<(), ImageError> {
        let size = ImageSize {
            width: 7,
            height: 5,
        };
        let src = Image::<f32, 1>::new(
            size,
            (0..size.area()).map(|i| (i % size.width) as f32).collect(),
        )?;
        let mut dx = Image::<f32, 1>::from_size_val(size, 0.0)?;
        let mut dy = Image::<f32, 1>::from_size_val(size, 0.0)?;
        super::spatial_gradient(&src, &mut dx, &mut dy, 5)?;

        // (-1 * -2 + -2 * -1 + 2 * 1 + 1 * 2) * (1 + 4 + 6 + 4 + 1)
        assert_eq!(dx.get([2, 3, 0]), Some(&128.0));
        assert_eq!(dy.get([2, 3, 0]), Some(&0.0));
        Ok(())
    }

    #[test]
    fn test_spatial_gradient_invalid_aperture() -> Result<(), ImageError> {
        let src = Image::<f32, 1>::from_size_val([3, 3].into(), 0.0)?;
        let mut dx = src.clone();
        let mut dy = src.clone();
        assert_eq!(
            super::spatial_gradient(&src, &mut dx, &mut dy, 7),
            Err(ImageError::InvalidKernelSize(7))
        );
        Ok(())
    }

    #[test]
    fn test_min_max_filter() -> Result<(), ImageError> {
        let size = ImageSize {
            width: 4,
            height: 3,
        };
        #[rustfmt::skip]
        let src = Image::<f32, 1>::new(
            size,
            vec![
                0.0, 0.0, 0.0, 0.0,
                0.0, 5.0, 0.0, 0.0,
                0.0, 0.0, 0.0, -1.0,
            ],
        )?;
        let mut lo = Image::<f32, 1>::from_size_val(size, 0.0)?;
        let mut hi = Image::<f32, 1>::from_size_val(size, 0.0)?;
        super::min_max_filter(&src, &mut lo, &mut hi, 1)?;

        #[rustfmt::skip]
        assert_eq!(
            hi.as_slice(),
            &[
                5.0, 5.0, 5.0, 0.0,
                5.0, 5.0, 5.0, 0.0,
                5.0, 5.0, 5.0, 0.0,
            ]
        );
        #[rustfmt::skip]
        assert_eq!(
            lo.as_slice(),
            &[
                0.0, 0.0, 0.0, 0.0,
                0.0, 0.0, -1.0, -1.0,
                0.0, 0.0, -1.0, -1.0,
            ]
        );
        Ok(())
    }
}
