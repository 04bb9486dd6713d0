//! Motion templates
//!
//! A motion history image (MHI) stores per pixel the timestamp of the last
//! motion seen there. From it the direction of the motion is recovered with
//! image gradients and the moving regions are split into connected components.

mod gradient;
pub use gradient::*;

mod history;
pub use history::*;

mod orientation;
pub use orientation::*;

mod segment;
pub use segment::*;
