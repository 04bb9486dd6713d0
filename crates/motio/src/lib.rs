#![doc = include_str!("../../../README.md")]

#[doc(inline)]
pub use motio_image as image;

#[doc(inline)]
pub use motio_imgproc as imgproc;

#[doc(inline)]
pub use motio_tracking as tracking;
