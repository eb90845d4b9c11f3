//! Box geometry: representations, conversions, and pairwise overlap.
//!
//! A [`BBox`] keeps whichever representation it was built from, center form
//! `(cx, cy, w, h)` as emitted by the detector or corner form
//! `(x1, y1, x2, y2)`. Conversions happen on demand so that a box read from a
//! model row round-trips through the pipeline without accumulating rounding
//! from repeated center/corner flips.

pub mod iou;
pub mod quad;

pub use iou::{overlap, overlap_with, AreaConvention, DegenerateOverlap, OverlapConfig};
pub use quad::{project, Corner, CornerLayout, Quad};

/// A 2D point in model or image space.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    /// Horizontal coordinate.
    pub x: f32,
    /// Vertical coordinate.
    pub y: f32,
}

impl Point {
    /// Creates a point.
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Returns the point shifted by `(dx, dy)`.
    pub fn offset(self, dx: f32, dy: f32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    /// Returns the point with x scaled by `rx` and y scaled by `ry`.
    pub fn scaled(self, rx: f32, ry: f32) -> Self {
        Self::new(self.x * rx, self.y * ry)
    }

    pub(crate) fn to_array(self) -> [f32; 2] {
        [self.x, self.y]
    }
}

/// Box in center form.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CenterBox {
    pub cx: f32,
    pub cy: f32,
    pub w: f32,
    pub h: f32,
}

/// Box in corner form.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CornerBox {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

impl CenterBox {
    /// Converts to corner form; `x1 = cx - w/2`, `x2 = cx + w/2`, same for y.
    pub fn to_corners(self) -> CornerBox {
        let half_w = self.w / 2.0;
        let half_h = self.h / 2.0;
        CornerBox {
            x1: self.cx - half_w,
            y1: self.cy - half_h,
            x2: self.cx + half_w,
            y2: self.cy + half_h,
        }
    }
}

impl CornerBox {
    /// Converts to center form.
    pub fn to_center(self) -> CenterBox {
        CenterBox {
            cx: (self.x1 + self.x2) / 2.0,
            cy: (self.y1 + self.y2) / 2.0,
            w: self.x2 - self.x1,
            h: self.y2 - self.y1,
        }
    }
}

/// Axis-aligned bounding box in either representation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum BBox {
    /// `(cx, cy, w, h)`.
    Center(CenterBox),
    /// `(x1, y1, x2, y2)`.
    Corners(CornerBox),
}

impl BBox {
    /// Creates a center-form box.
    pub const fn center(cx: f32, cy: f32, w: f32, h: f32) -> Self {
        BBox::Center(CenterBox { cx, cy, w, h })
    }

    /// Creates a corner-form box.
    pub const fn corners(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        BBox::Corners(CornerBox { x1, y1, x2, y2 })
    }

    /// Returns the box in corner form.
    pub fn corner_form(&self) -> CornerBox {
        match *self {
            BBox::Center(c) => c.to_corners(),
            BBox::Corners(c) => c,
        }
    }

    /// Returns the box in center form.
    pub fn center_form(&self) -> CenterBox {
        match *self {
            BBox::Center(c) => c,
            BBox::Corners(c) => c.to_center(),
        }
    }

    /// Returns the box center.
    pub fn center_point(&self) -> Point {
        let c = self.center_form();
        Point::new(c.cx, c.cy)
    }

    /// True when the box has zero (or negative) extent along either axis.
    pub fn is_degenerate(&self) -> bool {
        let c = self.corner_form();
        !(c.x2 > c.x1 && c.y2 > c.y1)
    }

    /// Scales x-channels by `rx` and y-channels by `ry`, keeping the
    /// representation.
    pub fn scaled(&self, rx: f32, ry: f32) -> Self {
        match *self {
            BBox::Center(c) => BBox::center(c.cx * rx, c.cy * ry, c.w * rx, c.h * ry),
            BBox::Corners(c) => BBox::corners(c.x1 * rx, c.y1 * ry, c.x2 * rx, c.y2 * ry),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{BBox, Point};

    #[test]
    fn center_and_corner_forms_convert_exactly_for_even_sizes() {
        let b = BBox::center(100.0, 50.0, 20.0, 10.0);
        let c = b.corner_form();
        assert_eq!((c.x1, c.y1, c.x2, c.y2), (90.0, 45.0, 110.0, 55.0));
        assert_eq!(BBox::Corners(c).center_form(), b.center_form());
    }

    #[test]
    fn scaling_keeps_representation() {
        let b = BBox::center(10.0, 20.0, 4.0, 8.0).scaled(2.0, 0.5);
        assert_eq!(b, BBox::center(20.0, 10.0, 8.0, 4.0));
        let c = BBox::corners(1.0, 2.0, 3.0, 4.0).scaled(2.0, 3.0);
        assert_eq!(c, BBox::corners(2.0, 6.0, 6.0, 12.0));
    }

    #[test]
    fn zero_area_box_is_degenerate() {
        assert!(BBox::center(5.0, 5.0, 0.0, 3.0).is_degenerate());
        assert!(!BBox::center(5.0, 5.0, 1.0, 3.0).is_degenerate());
    }

    #[test]
    fn point_offset_then_scale() {
        let p = Point::new(-5.0, 5.0).offset(100.0, 100.0).scaled(2.0, 0.5);
        assert_eq!(p, Point::new(190.0, 52.5));
    }
}
