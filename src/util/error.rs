//! Error types for platepost.

use thiserror::Error;

/// Result alias for platepost operations.
pub type PlatePostResult<T> = std::result::Result<T, PlatePostError>;

/// Errors that can occur when decoding or post-processing detections.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PlatePostError {
    /// A raw row does not have the `4 + 2K + 1` fields the layout expects.
    #[error("row width mismatch: expected {expected} fields, got {got}")]
    RowWidthMismatch { expected: usize, got: usize },
    /// A flat output buffer does not split into whole rows.
    #[error("raw output of length {len} is not a multiple of row width {row_width}")]
    TruncatedOutput { len: usize, row_width: usize },
    /// A resolution has a zero (or otherwise unusable) dimension.
    #[error("invalid {context} resolution {width}x{height}")]
    InvalidResolution {
        width: u32,
        height: u32,
        context: &'static str,
    },
    /// A threshold is NaN.
    #[error("invalid threshold {name}: {value}")]
    InvalidThreshold { name: &'static str, value: f32 },
    /// The number of keypoints does not match what the operation needs.
    #[error("expected {expected} keypoints, got {got}")]
    KeypointCountMismatch { expected: usize, got: usize },
    /// A pixel buffer is shorter than its declared dimensions.
    #[error("buffer too small: needed {needed}, got {got}")]
    BufferTooSmall { needed: usize, got: usize },
    /// The four plate corners do not span a usable quadrilateral.
    #[error("degenerate quadrilateral: {reason}")]
    DegenerateQuad { reason: &'static str },
    /// The inference backend failed.
    #[error("inference backend failed: {reason}")]
    Backend { reason: String },
    /// Image loading failed.
    #[error("image I/O failed: {reason}")]
    ImageIo { reason: String },
}
