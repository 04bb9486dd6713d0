use motio_image::{Image, ImageError, Rect};
use rayon::{
    iter::{IndexedParallelIterator, ParallelIterator},
    slice::ParallelSliceMut,
};

/// Crop an image to a specified region.
///
/// # Arguments
///
/// * `src` - The source image to crop.
/// * `dst` - The destination image to store the cropped image.
/// * `x` - The x-coordinate of the top-left corner of the region to crop.
/// * `y` - The y-coordinate of the top-left corner of the region to crop.
///
/// # Errors
///
/// Returns [`ImageError::InvalidRect`] when the region of the size of `dst`
/// does not fit inside `src`.
///
/// # Examples
///
/// ```rust
/// use motio_image::{Image, ImageSize};
/// use motio_imgproc::crop::crop_image;
///
/// let image = Image::<_, 1>::new(ImageSize { width: 4, height: 4 }, vec![
///     0u8, 1, 2, 3,
///     4u8, 5, 6, 7,
///     8u8, 9, 10, 11,
///     12u8, 13, 14, 15
/// ]).unwrap();
///
/// let mut cropped = Image::<_, 1>::from_size_val(ImageSize { width: 2, height: 2 }, 0u8).unwrap();
///
/// crop_image(&image, &mut cropped, 1, 1).unwrap();
///
/// assert_eq!(cropped.as_slice(), &[5u8, 6, 9, 10]);
/// ```
pub fn crop_image<T, const C: usize>(
    src: &Image<T, C>,
    dst: &mut Image<T, C>,
    x: usize,
    y: usize,
) -> Result<(), ImageError>
where
    T: Copy + Send + Sync,
{
    let rect = Rect {
        x,
        y,
        width: dst.cols(),
        height: dst.rows(),
    };
    let fits = x.checked_add(rect.width).is_some_and(|x1| x1 <= src.cols())
        && y.checked_add(rect.height).is_some_and(|y1| y1 <= src.rows());
    if !fits {
        return Err(ImageError::InvalidRect(rect, src.size()));
    }

    let dst_cols = dst.cols();
    if dst_cols == 0 {
        return Ok(());
    }

    dst.as_slice_mut()
        .par_chunks_exact_mut(dst_cols * C)
        .enumerate()
        .for_each(|(i, dst_row)| {
            // get the slice at the top left corner
            let offset = (y + i) * src.cols() * C + x * C;
            let src_slice = &src.as_slice()[offset..offset + dst_cols * C];

            // copy the slice to the destination
            dst_row.copy_from_slice(src_slice);
        });

    Ok(())
}

/// Copy the region `rect` of an image into a new image.
pub fn crop_rect<T, const C: usize>(src: &Image<T, C>, rect: Rect) -> Result<Image<T, C>, ImageError>
where
    T: Copy + Default + Send + Sync,
{
    let mut dst = Image::from_size_val(rect.size(), T::default())?;
    crop_image(src, &mut dst, rect.x, rect.y)?;
    Ok(dst)
}
