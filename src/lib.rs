//! platepost turns raw license-plate detector output into image-space
//! detections.
//!
//! The crate implements the CPU side of a plate detector: decoding
//! positional output rows, greedy confidence-ordered non-maximum suppression
//! with pixel-inclusive IoU, keypoint resolution, and model-to-image scaling.
//! Model execution and image decoding stay with external runtimes behind
//! [`InferenceBackend`] and the optional `image-io` helpers. Batch
//! post-processing can run on rayon with the `rayon` feature, and the
//! suppression mask uses `wide` SIMD with the `simd` feature.

pub mod detection;
pub mod geometry;
pub mod input;
pub mod lowlevel;
pub mod overlay;
pub mod postprocess;
pub mod runtime;
pub mod suppress;
mod trace;
pub mod util;

#[cfg(feature = "image-io")]
pub use input::io;

pub use detection::{Detection, DetectionSet, RowLayout};
pub use geometry::{
    overlap, overlap_with, AreaConvention, BBox, Corner, CornerLayout, DegenerateOverlap,
    OverlapConfig, Point, Quad,
};
pub use input::InputTensor;
pub use overlay::PlateOverlay;
pub use postprocess::{
    postprocess, PostprocessConfig, Postprocessor, RawBatchItem, Resolution,
};
pub use runtime::{Detector, InferenceBackend, RawOutput};
pub use suppress::{suppress, SuppressParams};
pub use util::{PlatePostError, PlatePostResult};
