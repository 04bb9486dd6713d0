use motio_image::{Image, ImageError};
use rayon::prelude::*;

/// Replicate the border: map a possibly out of range index back into `0..len`.
#[inline]
fn clamp_index(i: isize, len: usize) -> usize {
    i.clamp(0, len as isize - 1) as usize
}

/// Apply a separable filter to an image.
///
/// The filter is applied as a correlation: first `kernel_x` along the rows,
/// then `kernel_y` along the columns. Pixels outside the image take the value
/// of the closest border pixel.
///
/// # Arguments
///
/// * `src` - The source image with shape (H, W, C).
/// * `dst` - The destination image with shape (H, W, C).
/// * `kernel_x` - The horizontal kernel, of odd length.
/// * `kernel_y` - The vertical kernel, of odd length.
///
/// # Examples
///
/// ```
/// use motio_image::{Image, ImageSize};
/// use motio_imgproc::filter::separable_filter;
///
/// let size = ImageSize { width: 3, height: 1 };
/// let src = Image::<f32, 1>::new(size, vec![0.0, 3.0, 6.0]).unwrap();
/// let mut dst = Image::<f32, 1>::from_size_val(size, 0.0).unwrap();
///
/// separable_filter(&src, &mut dst, &[1.0, 1.0, 1.0], &[1.0]).unwrap();
/// assert_eq!(dst.as_slice(), &[3.0, 9.0, 15.0]);
/// ```
pub fn separable_filter<const C: usize>(
    src: &Image<f32, C>,
    dst: &mut Image<f32, C>,
    kernel_x: &[f32],
    kernel_y: &[f32],
) -> Result<(), ImageError> {
    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src.cols(),
            src.rows(),
            dst.cols(),
            dst.rows(),
        ));
    }

    if kernel_x.len() % 2 == 0 {
        return Err(ImageError::InvalidKernelSize(kernel_x.len()));
    }

    if kernel_y.len() % 2 == 0 {
        return Err(ImageError::InvalidKernelSize(kernel_y.len()));
    }

    let cols = src.cols();
    let rows = src.rows();
    if cols == 0 || rows == 0 {
        return Ok(());
    }

    let half_x = (kernel_x.len() / 2) as isize;
    let half_y = (kernel_y.len() / 2) as isize;
    let src_data = src.as_slice();

    // horizontal pass
    let mut tmp = vec![0.0f32; src_data.len()];
    tmp.par_chunks_exact_mut(cols * C)
        .zip(src_data.par_chunks_exact(cols * C))
        .for_each(|(tmp_row, src_row)| {
            for x in 0..cols {
                for ch in 0..C {
                    let mut acc = 0.0;
                    for (k, &w) in kernel_x.iter().enumerate() {
                        let xi = clamp_index(x as isize + k as isize - half_x, cols);
                        acc += w * src_row[xi * C + ch];
                    }
                    tmp_row[x * C + ch] = acc;
                }
            }
        });

    // vertical pass
    dst.as_slice_mut()
        .par_chunks_exact_mut(cols * C)
        .enumerate()
        .for_each(|(y, dst_row)| {
            for (i, out) in dst_row.iter_mut().enumerate() {
                let mut acc = 0.0;
                for (k, &w) in kernel_y.iter().enumerate() {
                    let yi = clamp_index(y as isize + k as isize - half_y, rows);
                    acc += w * tmp[yi * cols * C + i];
                }
                *out = acc;
            }
        });

    Ok(())
}
