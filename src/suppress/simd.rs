//! SIMD survival mask using the `wide` crate.
//!
//! Intersection and union areas are computed eight pool members at a time
//! with `f32x8`; the ratio and threshold test run per lane so that decisions
//! match the scalar kernel exactly for finite input.

use crate::geometry::{CornerBox, OverlapConfig};
use crate::suppress::scalar::{member_survives, survives};
use crate::suppress::{MaskKernel, PoolColumns};
use crate::util::math::ratio_or;
use wide::f32x8;

const LANES: usize = 8;

#[inline]
fn load_f32x8(slice: &[f32]) -> f32x8 {
    f32x8::from([
        slice[0], slice[1], slice[2], slice[3], slice[4], slice[5], slice[6], slice[7],
    ])
}

/// Eight-lane survival mask.
pub(crate) struct SimdMask;

impl MaskKernel for SimdMask {
    fn survival_mask(
        selected: &CornerBox,
        pool: &PoolColumns,
        iou_threshold: f32,
        cfg: &OverlapConfig,
        out: &mut Vec<bool>,
    ) {
        out.clear();
        let n = pool.len();
        let simd_end = n / LANES * LANES;
        let offset = cfg.area.offset();
        let sentinel = cfg.degenerate.value();

        let off = f32x8::splat(offset);
        let sx1 = f32x8::splat(selected.x1);
        let sy1 = f32x8::splat(selected.y1);
        let sx2 = f32x8::splat(selected.x2);
        let sy2 = f32x8::splat(selected.y2);
        let selected_area = f32x8::splat(
            (selected.x2 - selected.x1 + offset) * (selected.y2 - selected.y1 + offset),
        );

        let mut i = 0;
        while i < simd_end {
            let x1 = load_f32x8(&pool.x1[i..]);
            let y1 = load_f32x8(&pool.y1[i..]);
            let x2 = load_f32x8(&pool.x2[i..]);
            let y2 = load_f32x8(&pool.y2[i..]);

            let iw = (x2.min(sx2) - x1.max(sx1) + off).max(f32x8::ZERO);
            let ih = (y2.min(sy2) - y1.max(sy1) + off).max(f32x8::ZERO);
            let inter = iw * ih;
            let area = (x2 - x1 + off) * (y2 - y1 + off);
            let union = selected_area + area - inter;

            let inter = inter.to_array();
            let union = union.to_array();
            for lane in 0..LANES {
                let iou = ratio_or(inter[lane], union[lane], sentinel);
                out.push(survives(iou, iou_threshold));
            }
            i += LANES;
        }

        // Scalar remainder
        out.extend(
            (simd_end..n).map(|i| member_survives(selected, pool, i, iou_threshold, cfg)),
        );
    }
}
