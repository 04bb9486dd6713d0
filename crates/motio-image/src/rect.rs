use crate::ImageSize;

/// Axis aligned rectangle in pixel coordinates.
///
/// The rectangle covers the columns `x..x + width` and the rows `y..y + height`.
///
/// # Examples
///
/// ```
/// use motio_image::{ImageSize, Rect};
///
/// let rect = Rect { x: 6, y: 2, width: 8, height: 4 };
/// let clipped = rect.clip(ImageSize { width: 10, height: 10 }).unwrap();
///
/// assert_eq!(clipped, Rect { x: 6, y: 2, width: 4, height: 4 });
/// assert_eq!(clipped.area(), 16);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Rect {
    /// Left-most column.
    pub x: usize,
    /// Top-most row.
    pub y: usize,
    /// Width in pixels.
    pub width: usize,
    /// Height in pixels.
    pub height: usize,
}

impl Rect {
    /// Create a rectangle covering a whole image.
    pub fn from_size(size: ImageSize) -> Self {
        Self {
            x: 0,
            y: 0,
            width: size.width,
            height: size.height,
        }
    }

    /// Number of pixels inside the rectangle.
    pub fn area(&self) -> usize {
        self.width * self.height
    }

    /// Check whether the pixel `(x, y)` lies inside the rectangle.
    pub fn contains(&self, x: usize, y: usize) -> bool {
        x >= self.x
            && y >= self.y
            && x < self.x.saturating_add(self.width)
            && y < self.y.saturating_add(self.height)
    }

    /// The size of the rectangle.
    pub fn size(&self) -> ImageSize {
        ImageSize {
            width: self.width,
            height: self.height,
        }
    }

    /// Intersect the rectangle with the bounds of an image.
    ///
    /// Returns `None` when nothing of the rectangle is left.
    pub fn clip(&self, size: ImageSize) -> Option<Rect> {
        let x1 = self.x.saturating_add(self.width).min(size.width);
        let y1 = self.y.saturating_add(self.height).min(size.height);
        if self.x >= x1 || self.y >= y1 {
            return None;
        }
        Some(Rect {
            x: self.x,
            y: self.y,
            width: x1 - self.x,
            height: y1 - self.y,
        })
    }

    /// Smallest rectangle containing both rectangles.
    pub fn union(&self, other: &Rect) -> Rect {
        let x0 = self.x.min(other.x);
        let y0 = self.y.min(other.y);
        let x1 = self
            .x
            .saturating_add(self.width)
            .max(other.x.saturating_add(other.width));
        let y1 = self
            .y
            .saturating_add(self.height)
            .max(other.y.saturating_add(other.height));
        Rect {
            x: x0,
            y: y0,
            width: x1 - x0,
            height: y1 - y0,
        }
    }
}
