#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// image basic operations module.
pub mod core;

/// image cropping module.
pub mod crop;

/// image filtering module.
pub mod filter;

/// motion template operations: history, gradient, orientation and segmentation.
pub mod motion;

/// module containing parallization utilities.
pub mod parallel;

/// operations to threshold images.
pub mod threshold;
