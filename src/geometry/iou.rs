//! Intersection-over-Union between axis-aligned boxes.
//!
//! Areas follow a pixel-inclusive convention by default: a box spanning
//! `x1..=x2` covers `x2 - x1 + 1` pixel columns. Detection thresholds in the
//! field were tuned against this convention, so it is the default rather than
//! the continuous `x2 - x1` area. The offset is applied to the intersection
//! and to both box areas alike.

use crate::geometry::{BBox, CornerBox};
use crate::util::math::ratio_or;

/// Area convention used when measuring boxes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AreaConvention {
    /// Extent along an axis is `hi - lo + 1`.
    #[default]
    PixelInclusive,
    /// Extent along an axis is `hi - lo`.
    Continuous,
}

impl AreaConvention {
    /// Offset added to every extent before multiplying.
    #[inline]
    pub fn offset(self) -> f32 {
        match self {
            AreaConvention::PixelInclusive => 1.0,
            AreaConvention::Continuous => 0.0,
        }
    }
}

/// Value reported when the union area is zero, negative, or not finite.
///
/// Under [`AreaConvention::PixelInclusive`] the union of two well-formed
/// boxes is at least one pixel, so this only triggers for continuous areas
/// of coincident zero-area boxes or for malformed input (negative extents,
/// NaN coordinates).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DegenerateOverlap {
    /// Report no overlap; such boxes never suppress each other.
    #[default]
    Zero,
    /// Report full overlap; such boxes suppress each other.
    One,
}

impl DegenerateOverlap {
    #[inline]
    pub fn value(self) -> f32 {
        match self {
            DegenerateOverlap::Zero => 0.0,
            DegenerateOverlap::One => 1.0,
        }
    }
}

/// Overlap measurement policy.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct OverlapConfig {
    pub area: AreaConvention,
    pub degenerate: DegenerateOverlap,
}

/// IoU of two boxes under the default [`OverlapConfig`].
pub fn overlap(a: &BBox, b: &BBox) -> f32 {
    overlap_with(a, b, &OverlapConfig::default())
}

/// IoU of two boxes under an explicit policy.
pub fn overlap_with(a: &BBox, b: &BBox, cfg: &OverlapConfig) -> f32 {
    overlap_corners(&a.corner_form(), &b.corner_form(), cfg)
}

#[inline]
pub(crate) fn area(c: &CornerBox, offset: f32) -> f32 {
    (c.x2 - c.x1 + offset) * (c.y2 - c.y1 + offset)
}

/// IoU of two corner-form boxes.
#[inline]
pub(crate) fn overlap_corners(a: &CornerBox, b: &CornerBox, cfg: &OverlapConfig) -> f32 {
    let offset = cfg.area.offset();
    let ix1 = a.x1.max(b.x1);
    let iy1 = a.y1.max(b.y1);
    let ix2 = a.x2.min(b.x2);
    let iy2 = a.y2.min(b.y2);

    let inter = (ix2 - ix1 + offset).max(0.0) * (iy2 - iy1 + offset).max(0.0);
    let union = area(a, offset) + area(b, offset) - inter;
    ratio_or(inter, union, cfg.degenerate.value())
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONTINUOUS: OverlapConfig = OverlapConfig {
        area: AreaConvention::Continuous,
        degenerate: DegenerateOverlap::Zero,
    };

    #[test]
    fn self_overlap_is_one() {
        let a = BBox::center(100.0, 100.0, 20.0, 20.0);
        assert_eq!(overlap(&a, &a), 1.0);
        let b = BBox::corners(3.5, 1.25, 9.0, 40.0);
        assert_eq!(overlap(&b, &b), 1.0);
    }

    #[test]
    fn pixel_inclusive_counts_edge_pixels() {
        // 0..=9 and 5..=14: 5 shared columns out of 15, one row tall.
        let a = BBox::corners(0.0, 0.0, 9.0, 0.0);
        let b = BBox::corners(5.0, 0.0, 14.0, 0.0);
        assert!((overlap(&a, &b) - 5.0 / 15.0).abs() < 1e-6);
    }

    #[test]
    fn touching_boxes_overlap_only_under_inclusive_convention() {
        let a = BBox::corners(0.0, 0.0, 10.0, 10.0);
        let b = BBox::corners(10.0, 0.0, 20.0, 10.0);
        assert!(overlap(&a, &b) > 0.0);
        assert_eq!(overlap_with(&a, &b, &CONTINUOUS), 0.0);
    }

    #[test]
    fn separated_boxes_do_not_overlap() {
        let a = BBox::corners(0.0, 0.0, 10.0, 10.0);
        let b = BBox::corners(11.0, 0.0, 20.0, 10.0);
        assert_eq!(overlap(&a, &b), 0.0);
    }

    #[test]
    fn mixed_representations_agree() {
        let a = BBox::center(100.0, 100.0, 20.0, 20.0);
        let b = BBox::corners(90.0, 90.0, 110.0, 110.0);
        assert_eq!(overlap(&a, &b), 1.0);
    }

    #[test]
    fn coincident_zero_area_boxes_use_sentinel() {
        let p = BBox::center(5.0, 5.0, 0.0, 0.0);
        assert_eq!(overlap_with(&p, &p, &CONTINUOUS), 0.0);
        let one = OverlapConfig {
            degenerate: DegenerateOverlap::One,
            ..CONTINUOUS
        };
        assert_eq!(overlap_with(&p, &p, &one), 1.0);
        // One inclusive pixel each, fully shared.
        assert_eq!(overlap(&p, &p), 1.0);
    }

    #[test]
    fn nan_coordinates_resolve_to_sentinel() {
        let a = BBox::center(f32::NAN, 0.0, 4.0, 4.0);
        let b = BBox::center(0.0, 0.0, 4.0, 4.0);
        assert_eq!(overlap(&a, &b), 0.0);
    }
}
