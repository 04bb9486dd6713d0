use std::collections::VecDeque;

use motio_image::{Image, ImageError, Rect};

/// A connected region of the motion history image.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MotionComponent {
    /// Label of the component in the segmentation mask, starting at 1.
    pub label: u32,
    /// Bounding box of the component.
    pub rect: Rect,
    /// Number of pixels in the component.
    pub area: usize,
}

/// Split the motion history image into independent motion components.
///
/// Every pixel updated at `timestamp` that does not belong to a component
/// yet starts a new one. A component grows over 4-connected pixels with a
/// non empty history whose value differs from the pixel they are reached
/// from by at most `seg_thresh` seconds.
///
/// # Arguments
///
/// * `mhi` - The motion history image.
/// * `seg_mask` - The output labels: 0 for the background and the
///   component label elsewhere.
/// * `timestamp` - The timestamp of the last history update, in seconds.
/// * `seg_thresh` - The maximal time step between neighbouring pixels of a component.
///
/// # Returns
///
/// The components in the order of their labels.
///
/// # Examples
///
/// ```
/// use motio_image::{Image, ImageSize};
/// use motio_imgproc::motion::segment_motion;
///
/// let size = ImageSize { width: 5, height: 1 };
/// let mhi = Image::<f32, 1>::new(size, vec![2.0, 1.9, 0.0, 2.0, 0.0]).unwrap();
/// let mut labels = Image::<u32, 1>::from_size_val(size, 0).unwrap();
///
/// let components = segment_motion(&mhi, &mut labels, 2.0, 0.5).unwrap();
///
/// assert_eq!(components.len(), 2);
/// assert_eq!(labels.as_slice(), &[1, 1, 0, 2, 0]);
/// ```
pub fn segment_motion(
    mhi: &Image<f32, 1>,
    seg_mask: &mut Image<u32, 1>,
    timestamp: f32,
    seg_thresh: f32,
) -> Result<Vec<MotionComponent>, ImageError> {
    if mhi.size() != seg_mask.size() {
        return Err(ImageError::InvalidImageSize(
            seg_mask.cols(),
            seg_mask.rows(),
            mhi.cols(),
            mhi.rows(),
        ));
    }

    let cols = mhi.cols();
    let rows = mhi.rows();
    let values = mhi.as_slice();
    let labels = seg_mask.as_slice_mut();
    labels.fill(0);

    let mut components = Vec::new();
    let mut queue = VecDeque::new();

    for seed in 0..values.len() {
        if values[seed] != timestamp || labels[seed] != 0 {
            continue;
        }

        let label = components.len() as u32 + 1;
        let (sx, sy) = (seed % cols, seed / cols);
        let (mut x0, mut y0, mut x1, mut y1) = (sx, sy, sx, sy);
        let mut area = 0;

        labels[seed] = label;
        queue.push_back(seed);

        while let Some(idx) = queue.pop_front() {
            let (x, y) = (idx % cols, idx / cols);
            area += 1;
            x0 = x0.min(x);
            y0 = y0.min(y);
            x1 = x1.max(x);
            y1 = y1.max(y);

            let value = values[idx];
            let neighbours = [
                (x > 0).then(|| idx - 1),
                (x + 1 < cols).then(|| idx + 1),
                (y > 0).then(|| idx - cols),
                (y + 1 < rows).then(|| idx + cols),
            ];

            for n in neighbours.into_iter().flatten() {
                let other = values[n];
                if labels[n] == 0 && other != 0.0 && (other - value).abs() <= seg_thresh {
                    labels[n] = label;
                    queue.push_back(n);
                }
            }
        }

        let component = MotionComponent {
            label,
            rect: Rect {
                x: x0,
                y: y0,
                width: x1 - x0 + 1,
                height: y1 - y0 + 1,
            },
            area,
        };
        log::trace!("motion component {component:?}");
        components.push(component);
    }

    Ok(components)
}
