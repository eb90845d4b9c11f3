//! Plate quadrilaterals built from the four corner keypoints.
//!
//! The detector emits four corner keypoints per plate in a fixed, model
//! specific order. [`CornerLayout`] names that order; [`Quad`] holds the
//! corners by role so that downstream code (overlays, rectification) never
//! depends on keypoint positions.

use crate::geometry::Point;
use crate::util::math::edge_length;
use crate::util::{PlatePostError, PlatePostResult};
use nalgebra::{Matrix3, SMatrix, SVector, Vector3};

/// Role of a plate corner.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Corner {
    LeftTop,
    RightTop,
    RightBottom,
    LeftBottom,
}

/// Order in which the four corner keypoints appear in a detection row.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CornerLayout {
    order: [Corner; 4],
}

impl CornerLayout {
    /// Left-top, left-bottom, right-top, right-bottom. The layout of the
    /// deployed plate detector.
    pub const LT_LB_RT_RB: Self = Self {
        order: [
            Corner::LeftTop,
            Corner::LeftBottom,
            Corner::RightTop,
            Corner::RightBottom,
        ],
    };

    /// Left-top, right-top, left-bottom, right-bottom (row-major).
    pub const LT_RT_LB_RB: Self = Self {
        order: [
            Corner::LeftTop,
            Corner::RightTop,
            Corner::LeftBottom,
            Corner::RightBottom,
        ],
    };

    /// Builds a layout from an explicit order; every corner must appear once.
    pub fn new(order: [Corner; 4]) -> PlatePostResult<Self> {
        for (i, corner) in order.iter().enumerate() {
            if order[i + 1..].contains(corner) {
                return Err(PlatePostError::DegenerateQuad {
                    reason: "corner layout repeats a corner",
                });
            }
        }
        Ok(Self { order })
    }

    /// Returns the corner roles in keypoint order.
    pub fn order(&self) -> [Corner; 4] {
        self.order
    }
}

impl Default for CornerLayout {
    fn default() -> Self {
        Self::LT_LB_RT_RB
    }
}

/// Four plate corners addressed by role.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Quad {
    pub left_top: Point,
    pub right_top: Point,
    pub right_bottom: Point,
    pub left_bottom: Point,
}

impl Quad {
    /// Assigns keypoints to corners according to `layout`.
    pub fn from_keypoints(keypoints: &[Point], layout: CornerLayout) -> PlatePostResult<Self> {
        if keypoints.len() != 4 {
            return Err(PlatePostError::KeypointCountMismatch {
                expected: 4,
                got: keypoints.len(),
            });
        }
        let mut quad = Quad {
            left_top: Point::default(),
            right_top: Point::default(),
            right_bottom: Point::default(),
            left_bottom: Point::default(),
        };
        for (corner, point) in layout.order.iter().zip(keypoints.iter().copied()) {
            match corner {
                Corner::LeftTop => quad.left_top = point,
                Corner::RightTop => quad.right_top = point,
                Corner::RightBottom => quad.right_bottom = point,
                Corner::LeftBottom => quad.left_bottom = point,
            }
        }
        Ok(quad)
    }

    /// Closed outline: left-top, right-top, right-bottom, left-bottom, and
    /// back to left-top.
    pub fn outline(&self) -> [Point; 5] {
        [
            self.left_top,
            self.right_top,
            self.right_bottom,
            self.left_bottom,
            self.left_top,
        ]
    }

    /// Size of the axis-aligned rectangle the plate is warped onto: the
    /// longer of the top/bottom edges by the longer of the left/right edges.
    pub fn rectified_size(&self) -> (f32, f32) {
        let top = edge_length(self.left_top.to_array(), self.right_top.to_array());
        let bottom = edge_length(self.left_bottom.to_array(), self.right_bottom.to_array());
        let left = edge_length(self.left_top.to_array(), self.left_bottom.to_array());
        let right = edge_length(self.right_top.to_array(), self.right_bottom.to_array());
        (top.max(bottom), left.max(right))
    }

    /// Perspective transform taking the corners onto
    /// `(0,0), (w,0), (w,h), (0,h)` with `(w, h) = rectified_size()`.
    pub fn rectifying_homography(&self) -> PlatePostResult<Matrix3<f64>> {
        let (w, h) = self.rectified_size();
        if !(w > 0.0 && h > 0.0) {
            return Err(PlatePostError::DegenerateQuad {
                reason: "zero rectified extent",
            });
        }
        let (w, h) = (f64::from(w), f64::from(h));
        let pairs = [
            (self.left_top, [0.0, 0.0]),
            (self.right_top, [w, 0.0]),
            (self.right_bottom, [w, h]),
            (self.left_bottom, [0.0, h]),
        ];

        // h33 fixed to 1; two equations per correspondence.
        let mut a = SMatrix::<f64, 8, 8>::zeros();
        let mut b = SVector::<f64, 8>::zeros();
        for (i, (src, dst)) in pairs.iter().enumerate() {
            let (x, y) = (f64::from(src.x), f64::from(src.y));
            let (u, v) = (dst[0], dst[1]);
            let r = 2 * i;
            a[(r, 0)] = x;
            a[(r, 1)] = y;
            a[(r, 2)] = 1.0;
            a[(r, 6)] = -u * x;
            a[(r, 7)] = -u * y;
            b[r] = u;
            a[(r + 1, 3)] = x;
            a[(r + 1, 4)] = y;
            a[(r + 1, 5)] = 1.0;
            a[(r + 1, 6)] = -v * x;
            a[(r + 1, 7)] = -v * y;
            b[r + 1] = v;
        }

        let sol = a.lu().solve(&b).ok_or(PlatePostError::DegenerateQuad {
            reason: "singular corner configuration",
        })?;
        if sol.iter().any(|v| !v.is_finite()) {
            return Err(PlatePostError::DegenerateQuad {
                reason: "non-finite homography",
            });
        }
        Ok(Matrix3::new(
            sol[0], sol[1], sol[2], sol[3], sol[4], sol[5], sol[6], sol[7], 1.0,
        ))
    }
}

/// Maps a point through a homography; `None` when it lands at infinity.
pub fn project(h: &Matrix3<f64>, p: Point) -> Option<Point> {
    let q = h * Vector3::new(f64::from(p.x), f64::from(p.y), 1.0);
    if q[2].abs() < 1e-12 {
        return None;
    }
    Some(Point::new((q[0] / q[2]) as f32, (q[1] / q[2]) as f32))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn skewed() -> Quad {
        Quad {
            left_top: Point::new(10.0, 12.0),
            right_top: Point::new(90.0, 4.0),
            right_bottom: Point::new(94.0, 30.0),
            left_bottom: Point::new(8.0, 40.0),
        }
    }

    #[test]
    fn from_keypoints_follows_layout() {
        let kps = [
            Point::new(0.0, 0.0),
            Point::new(0.0, 5.0),
            Point::new(9.0, 0.0),
            Point::new(9.0, 5.0),
        ];
        let q = Quad::from_keypoints(&kps, CornerLayout::LT_LB_RT_RB).unwrap();
        assert_eq!(q.left_bottom, Point::new(0.0, 5.0));
        assert_eq!(q.right_top, Point::new(9.0, 0.0));

        let q = Quad::from_keypoints(&kps, CornerLayout::LT_RT_LB_RB).unwrap();
        assert_eq!(q.right_top, Point::new(0.0, 5.0));
        assert_eq!(q.left_bottom, Point::new(9.0, 0.0));
    }

    #[test]
    fn from_keypoints_requires_four_points() {
        let err =
            Quad::from_keypoints(&[Point::default(); 3], CornerLayout::default()).unwrap_err();
        assert_eq!(
            err,
            PlatePostError::KeypointCountMismatch {
                expected: 4,
                got: 3
            }
        );
    }

    #[test]
    fn layout_rejects_repeated_corners() {
        let order = [
            Corner::LeftTop,
            Corner::LeftTop,
            Corner::RightTop,
            Corner::RightBottom,
        ];
        assert!(CornerLayout::new(order).is_err());
        assert_eq!(
            CornerLayout::new(CornerLayout::LT_RT_LB_RB.order()).unwrap(),
            CornerLayout::LT_RT_LB_RB
        );
    }

    #[test]
    fn outline_is_closed_clockwise_ring() {
        let q = skewed();
        let ring = q.outline();
        assert_eq!(ring[0], q.left_top);
        assert_eq!(ring[1], q.right_top);
        assert_eq!(ring[2], q.right_bottom);
        assert_eq!(ring[3], q.left_bottom);
        assert_eq!(ring[4], ring[0]);
    }

    #[test]
    fn rectified_size_takes_longer_edges() {
        let q = Quad {
            left_top: Point::new(0.0, 0.0),
            right_top: Point::new(30.0, 0.0),
            right_bottom: Point::new(30.0, 10.0),
            left_bottom: Point::new(0.0, 12.0),
        };
        let (w, h) = q.rectified_size();
        assert!((w - 30.0f32.hypot(2.0)).abs() < 1e-4);
        assert!((h - 12.0).abs() < 1e-6);
    }

    #[test]
    fn homography_maps_corners_to_rectangle() {
        let q = skewed();
        let (w, h) = q.rectified_size();
        let hm = q.rectifying_homography().unwrap();
        let expected = [
            (q.left_top, (0.0, 0.0)),
            (q.right_top, (w, 0.0)),
            (q.right_bottom, (w, h)),
            (q.left_bottom, (0.0, h)),
        ];
        for (src, (u, v)) in expected {
            let p = project(&hm, src).unwrap();
            assert!((p.x - u).abs() < 1e-3, "{p:?} vs ({u}, {v})");
            assert!((p.y - v).abs() < 1e-3, "{p:?} vs ({u}, {v})");
        }
    }

    #[test]
    fn collapsed_quad_is_rejected() {
        let p = Point::new(3.0, 3.0);
        let q = Quad {
            left_top: p,
            right_top: p,
            right_bottom: p,
            left_bottom: p,
        };
        assert!(matches!(
            q.rectifying_homography(),
            Err(PlatePostError::DegenerateQuad { .. })
        ));
    }
}
