use crate::{ImageSize, Rect};

/// An error type for the image module.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ImageError {
    /// Error when channel and shape are not valid.
    #[error("Data length ({0}) does not match the image size ({1})")]
    InvalidChannelShape(usize, usize),

    /// Error when the image size is not valid.
    #[error("Invalid image size ({0}, {1}), expected ({2}, {3})")]
    InvalidImageSize(usize, usize, usize, usize),

    /// Error when the pixel coordinates are out of bounds.
    #[error("Pixel coordinates ({0}, {1}) are out of bounds ({2}, {3})")]
    PixelIndexOutOfBounds(usize, usize, usize, usize),

    /// Error when the channel index is out of bounds.
    #[error("Channel index ({0}) is out of bounds ({1})")]
    ChannelIndexOutOfBounds(usize, usize),

    /// Error when a region does not fit inside the image.
    #[error("Region {0:?} does not fit inside {1}")]
    InvalidRect(Rect, ImageSize),

    /// Error when a filter kernel size is not supported.
    #[error("Invalid kernel size ({0})")]
    InvalidKernelSize(usize),

    /// Error when a motion duration is not a positive number of seconds.
    #[error("Invalid motion duration ({0}), expected a positive number of seconds")]
    InvalidDuration(f64),
}
