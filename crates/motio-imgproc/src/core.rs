use rayon::prelude::*;

use motio_image::{Image, ImageError};

use crate::parallel;

/// Compute the per-element absolute difference of two images.
///
/// # Arguments
///
/// * `src1` - The first input image.
/// * `src2` - The second input image.
/// * `dst` - The output image with `|src1 - src2|`.
///
/// # Example
///
/// ```
/// use motio_image::{Image, ImageSize};
/// use motio_imgproc::core::abs_diff;
///
/// let size = ImageSize { width: 2, height: 2 };
/// let a = Image::<u8, 1>::new(size, vec![0, 50, 200, 255]).unwrap();
/// let b = Image::<u8, 1>::new(size, vec![10, 50, 100, 0]).unwrap();
///
/// let mut diff = Image::<u8, 1>::from_size_val(size, 0).unwrap();
/// abs_diff(&a, &b, &mut diff).unwrap();
///
/// assert_eq!(diff.as_slice(), &[10, 0, 100, 255]);
/// ```
pub fn abs_diff<const C: usize>(
    src1: &Image<u8, C>,
    src2: &Image<u8, C>,
    dst: &mut Image<u8, C>,
) -> Result<(), ImageError> {
    if src1.size() != src2.size() {
        return Err(ImageError::InvalidImageSize(
            src2.cols(),
            src2.rows(),
            src1.cols(),
            src1.rows(),
        ));
    }

    if src1.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            dst.cols(),
            dst.rows(),
            src1.cols(),
            src1.rows(),
        ));
    }

    parallel::par_iter_rows_val_two(src1, src2, dst, |a, b, d| {
        *d = a.abs_diff(*b);
    });

    Ok(())
}

/// Count the elements of an image that are not zero.
///
/// # Example
///
/// ```
/// use motio_image::{Image, ImageSize};
/// use motio_imgproc::core::count_non_zero;
///
/// let image = Image::<u8, 1>::new(ImageSize { width: 3, height: 1 }, vec![0, 1, 255]).unwrap();
/// assert_eq!(count_non_zero(&image), 2);
/// ```
pub fn count_non_zero<T, const C: usize>(src: &Image<T, C>) -> usize
where
    T: num_traits::Zero + PartialEq + Sync,
{
    src.as_slice()
        .par_iter()
        .filter(|v| !v.is_zero())
        .count()
}

#[cfg(test)]
mod tests {
    use motio_image::{Image, ImageError, ImageSize};

    #[test]
    fn test_abs_diff_size_mismatch() -> Result<(), ImageError> {
        let a = Image::<u8, 1>::from_size_val([2, 2].into(), 0)?;
        let b = Image::<u8, 1>::from_size_val([3, 2].into(), 0)?;
        let mut dst = Image::<u8, 1>::from_size_val([2, 2].into(), 0)?;
        let res = super::abs_diff(&a, &b, &mut dst);
        assert_eq!(res, Err(ImageError::InvalidImageSize(3, 2, 2, 2)));
        Ok(())
    }

    #[test]
    fn test_abs_diff_symmetric() -> Result<(), ImageError> {
        let size = ImageSize {
            width: 3,
            height: 2,
        };
        let a = Image::<u8, 1>::new(size, vec![0, 10, 20, 30, 40, 50])?;
        let b = Image::<u8, 1>::new(size, vec![50, 40, 30, 20, 10, 0])?;
        let mut ab = Image::<u8, 1>::from_size_val(size, 0)?;
        let mut ba = Image::<u8, 1>::from_size_val(size, 0)?;
        super::abs_diff(&a, &b, &mut ab)?;
        super::abs_diff(&b, &a, &mut ba)?;
        assert_eq!(ab.as_slice(), ba.as_slice());
        assert_eq!(ab.as_slice(), &[50, 30, 10, 10, 30, 50]);
        Ok(())
    }

    #[test]
    fn test_count_non_zero_f32() -> Result<(), ImageError> {
        let image = Image::<f32, 1>::new([2, 2].into(), vec![0.0, 0.5, -1.0, 0.0])?;
        assert_eq!(super::count_non_zero(&image), 2);
        Ok(())
    }
}
