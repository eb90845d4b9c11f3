//! Low-level building blocks for custom post-processing pipelines.
//!
//! These expose the individual stages behind [`crate::Postprocessor`]:
//! index-level suppression, keypoint resolution, and scaling. Most users
//! should prefer `Postprocessor` or the [`crate::postprocess`] function.

pub use crate::detection::layout::BOX_FIELDS;
pub use crate::geometry::{project, CenterBox, CornerBox};
pub use crate::input::{CHANNELS, PIXEL_SCALE};
pub use crate::overlay::to_pixel;
pub use crate::postprocess::{resolve_keypoints, ScaleRatios};
pub use crate::suppress::select_indices;
