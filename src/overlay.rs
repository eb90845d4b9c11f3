//! Geometry handed to an external plate visualizer.
//!
//! Rendering is out of scope; [`PlateOverlay`] fixes what a renderer draws
//! for one detection: a center marker, four corner markers, the closed plate
//! outline, and the axis-aligned detection box.

use crate::detection::Detection;
use crate::geometry::{CornerBox, CornerLayout, Point, Quad};
use crate::util::PlatePostResult;

/// Drawable primitives for one post-processed plate.
#[derive(Clone, Debug, PartialEq)]
pub struct PlateOverlay {
    /// Box center.
    pub center: Point,
    /// Corner markers in keypoint order.
    pub markers: [Point; 4],
    /// Plate corners by role.
    pub quad: Quad,
    /// Axis-aligned detection box.
    pub bbox: CornerBox,
    /// Detector confidence, when the detection still carries it.
    pub confidence: Option<f32>,
}

impl PlateOverlay {
    /// Builds the overlay for an image-space detection with four keypoints.
    pub fn from_detection(det: &Detection, layout: CornerLayout) -> PlatePostResult<Self> {
        let quad = Quad::from_keypoints(&det.keypoints, layout)?;
        let markers = [
            det.keypoints[0],
            det.keypoints[1],
            det.keypoints[2],
            det.keypoints[3],
        ];
        Ok(Self {
            center: det.bbox.center_point(),
            markers,
            quad,
            bbox: det.bbox.corner_form(),
            confidence: det.confidence,
        })
    }

    /// Closed outline: left-top, right-top, right-bottom, left-bottom,
    /// left-top.
    pub fn outline(&self) -> [Point; 5] {
        self.quad.outline()
    }

    /// Outline as integer pixel coordinates (truncated toward zero).
    pub fn outline_pixels(&self) -> [(i32, i32); 5] {
        self.outline().map(to_pixel)
    }

    /// Detection box as integer pixel corners `(left, top, right, bottom)`,
    /// from the truncated center and half extents.
    pub fn box_pixels(&self) -> (i32, i32, i32, i32) {
        let c = self.bbox.to_center();
        let (cx, cy) = to_pixel(Point::new(c.cx, c.cy));
        let half_w = c.w as i32 / 2;
        let half_h = c.h as i32 / 2;
        (
            cx.saturating_sub(half_w),
            cy.saturating_sub(half_h),
            cx.saturating_add(half_w),
            cy.saturating_add(half_h),
        )
    }
}

/// Truncates a point to integer pixel coordinates.
pub fn to_pixel(p: Point) -> (i32, i32) {
    (p.x as i32, p.y as i32)
}
