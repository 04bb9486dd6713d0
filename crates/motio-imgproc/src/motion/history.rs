use motio_image::{Image, ImageError};

use crate::parallel;

/// Update the motion history image with a new silhouette.
///
/// Pixels where the silhouette is not zero take the value `timestamp`.
/// Pixels whose history is not newer than `timestamp - duration` are cleared
/// to zero, every other pixel keeps its previous value. After the update the
/// history is either zero or in `(timestamp - duration, timestamp]`.
///
/// # Arguments
///
/// * `silhouette` - The binary mask of the pixels that moved.
/// * `mhi` - The motion history image, updated in place.
/// * `timestamp` - The current time in seconds.
/// * `duration` - The maximal duration of the motion track in seconds.
///
/// # Examples
///
/// ```
/// use motio_image::{Image, ImageSize};
/// use motio_imgproc::motion::update_motion_history;
///
/// let size = ImageSize { width: 3, height: 1 };
/// let silhouette = Image::<u8, 1>::new(size, vec![1, 0, 0]).unwrap();
/// let mut mhi = Image::<f32, 1>::new(size, vec![0.0, 2.5, 1.0]).unwrap();
///
/// update_motion_history(&silhouette, &mut mhi, 3.0, 1.0).unwrap();
/// assert_eq!(mhi.as_slice(), &[3.0, 2.5, 0.0]);
/// ```
pub fn update_motion_history(
    silhouette: &Image<u8, 1>,
    mhi: &mut Image<f32, 1>,
    timestamp: f32,
    duration: f32,
) -> Result<(), ImageError> {
    if silhouette.size() != mhi.size() {
        return Err(ImageError::InvalidImageSize(
            silhouette.cols(),
            silhouette.rows(),
            mhi.cols(),
            mhi.rows(),
        ));
    }

    let delbound = timestamp - duration;

    parallel::par_iter_rows_val(silhouette, mhi, |&silh, value| {
        if silh != 0 {
            *value = timestamp;
        } else if *value <= delbound {
            *value = 0.0;
        }
    });

    Ok(())
}

#[cfg(test)]
mod tests {
    use motio_image::{Image, ImageError, ImageSize};

    #[test]
    fn test_update_motion_history_decay() -> Result<(), ImageError> {
        let size = ImageSize {
            width: 2,
            height: 1,
        };
        let moving = Image::<u8, 1>::new(size, vec![255, 0])?;
        let still = Image::<u8, 1>::from_size_val(size, 0)?;
        let mut mhi = Image::<f32, 1>::from_size_val(size, 0.0)?;

        super::update_motion_history(&moving, &mut mhi, 1.0, 0.5)?;
        assert_eq!(mhi.as_slice(), &[1.0, 0.0]);

        // still within the duration
        super::update_motion_history(&still, &mut mhi, 1.25, 0.5)?;
        assert_eq!(mhi.as_slice(), &[1.0, 0.0]);

        // older than the duration
        super::update_motion_history(&still, &mut mhi, 1.75, 0.5)?;
        assert_eq!(mhi.as_slice(), &[0.0, 0.0]);
        Ok(())
    }

    #[test]
    fn test_update_motion_history_exact_duration_expires() -> Result<(), ImageError> {
        let size = ImageSize {
            width: 2,
            height: 1,
        };
        let moving = Image::<u8, 1>::new(size, vec![1, 0])?;
        let still = Image::<u8, 1>::from_size_val(size, 0)?;
        let mut mhi = Image::<f32, 1>::from_size_val(size, 0.0)?;

        super::update_motion_history(&moving, &mut mhi, 1.0, 1.0)?;
        // stamped exactly one duration ago
        super::update_motion_history(&still, &mut mhi, 2.0, 1.0)?;
        assert_eq!(mhi.as_slice(), &[0.0, 0.0]);
        Ok(())
    }

    #[test]
    fn test_update_motion_history_size_mismatch() -> Result<(), ImageError> {
        let silhouette = Image::<u8, 1>::from_size_val([2, 2].into(), 0)?;
        let mut mhi = Image::<f32, 1>::from_size_val([2, 3].into(), 0.0)?;
        assert!(super::update_motion_history(&silhouette, &mut mhi, 1.0, 1.0).is_err());
        Ok(())
    }
}
