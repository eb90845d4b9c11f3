//! Scalar survival mask.

use crate::geometry::iou::overlap_corners;
use crate::geometry::{CornerBox, OverlapConfig};
use crate::suppress::{MaskKernel, PoolColumns};

/// Overlap strictly below the threshold survives. At threshold `0` a
/// disjoint candidate (overlap exactly `0`) survives too.
#[inline]
pub(crate) fn survives(iou: f32, iou_threshold: f32) -> bool {
    iou < iou_threshold || (iou_threshold == 0.0 && iou == 0.0)
}

/// Survival of pool member `i` against the selected box.
#[inline]
pub(crate) fn member_survives(
    selected: &CornerBox,
    pool: &PoolColumns,
    i: usize,
    iou_threshold: f32,
    cfg: &OverlapConfig,
) -> bool {
    let candidate = CornerBox {
        x1: pool.x1[i],
        y1: pool.y1[i],
        x2: pool.x2[i],
        y2: pool.y2[i],
    };
    survives(overlap_corners(selected, &candidate, cfg), iou_threshold)
}

/// One overlap evaluation per pool member.
#[cfg_attr(all(feature = "simd", not(test)), allow(dead_code))]
pub(crate) struct ScalarMask;

impl MaskKernel for ScalarMask {
    fn survival_mask(
        selected: &CornerBox,
        pool: &PoolColumns,
        iou_threshold: f32,
        cfg: &OverlapConfig,
        out: &mut Vec<bool>,
    ) {
        out.clear();
        out.extend(
            (0..pool.len()).map(|i| member_survives(selected, pool, i, iou_threshold, cfg)),
        );
    }
}
