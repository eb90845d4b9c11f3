//! Greedy confidence-ordered non-maximum suppression.
//!
//! Each round picks the most confident candidate still in the pool (earliest
//! position wins ties), emits it, and keeps only candidates whose overlap
//! with it is strictly below the IoU threshold. At a threshold of exactly `0`
//! disjoint candidates (overlap exactly zero) also survive, so that threshold
//! keeps one detection per overlapping cluster. The pool is an index list
//! over the confidence-filtered input; every round builds a fresh survival
//! mask over it instead of deleting from a shared buffer.

pub(crate) mod scalar;
#[cfg(feature = "simd")]
pub(crate) mod simd;

use crate::detection::{Detection, DetectionSet};
use crate::geometry::{CornerBox, OverlapConfig};
use crate::trace::{trace_debug, trace_event, trace_span};
use crate::util::{PlatePostError, PlatePostResult};

#[cfg(not(feature = "simd"))]
use scalar::ScalarMask as PoolMask;
#[cfg(feature = "simd")]
use simd::SimdMask as PoolMask;

/// Suppression thresholds and output options.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SuppressParams {
    /// Candidates below this confidence never enter the pool.
    pub confidence_threshold: f32,
    /// Candidates whose IoU with a selected box reaches this value are
    /// dropped.
    pub iou_threshold: f32,
    /// Attach the confidence to emitted detections.
    pub keep_confidence: bool,
    /// Overlap measurement policy.
    pub overlap: OverlapConfig,
}

impl Default for SuppressParams {
    fn default() -> Self {
        Self {
            confidence_threshold: 0.2,
            iou_threshold: 0.2,
            keep_confidence: true,
            overlap: OverlapConfig::default(),
        }
    }
}

impl SuppressParams {
    /// Rejects NaN thresholds. Any other value, including ones outside
    /// `[0, 1]`, is meaningful and accepted.
    pub fn validate(&self) -> PlatePostResult<()> {
        if self.confidence_threshold.is_nan() {
            return Err(PlatePostError::InvalidThreshold {
                name: "confidence_threshold",
                value: self.confidence_threshold,
            });
        }
        if self.iou_threshold.is_nan() {
            return Err(PlatePostError::InvalidThreshold {
                name: "iou_threshold",
                value: self.iou_threshold,
            });
        }
        Ok(())
    }
}

/// Corner coordinates of the active pool in struct-of-arrays layout.
#[derive(Debug, Default)]
pub(crate) struct PoolColumns {
    pub(crate) x1: Vec<f32>,
    pub(crate) y1: Vec<f32>,
    pub(crate) x2: Vec<f32>,
    pub(crate) y2: Vec<f32>,
}

impl PoolColumns {
    fn gather(&mut self, boxes: &[CornerBox], active: &[usize]) {
        self.x1.clear();
        self.y1.clear();
        self.x2.clear();
        self.y2.clear();
        for &idx in active {
            let b = &boxes[idx];
            self.x1.push(b.x1);
            self.y1.push(b.y1);
            self.x2.push(b.x2);
            self.y2.push(b.y2);
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.x1.len()
    }
}

/// Computes, for one round, which pool members survive the selected box.
pub(crate) trait MaskKernel {
    /// Writes whether `pool[i]` survives `selected` into `out[i]`: its IoU is
    /// below `iou_threshold`, or both are exactly zero.
    fn survival_mask(
        selected: &CornerBox,
        pool: &PoolColumns,
        iou_threshold: f32,
        cfg: &OverlapConfig,
        out: &mut Vec<bool>,
    );
}

/// Indices into `detections` of the emitted candidates, in selection order.
pub fn select_indices(detections: &[Detection], params: &SuppressParams) -> Vec<usize> {
    select_indices_with::<PoolMask>(detections, params)
}

pub(crate) fn select_indices_with<K: MaskKernel>(
    detections: &[Detection],
    params: &SuppressParams,
) -> Vec<usize> {
    let _span = trace_span!("suppress", candidates = detections.len()).entered();

    // `>=` also drops NaN confidences and detections without one.
    let eligible: Vec<usize> = detections
        .iter()
        .enumerate()
        .filter(|(_, d)| matches!(d.confidence, Some(c) if c >= params.confidence_threshold))
        .map(|(i, _)| i)
        .collect();
    trace_event!("suppress_filtered", eligible = eligible.len());
    if eligible.is_empty() {
        return Vec::new();
    }

    let boxes: Vec<CornerBox> = eligible
        .iter()
        .map(|&i| detections[i].bbox.corner_form())
        .collect();
    let scores: Vec<f32> = eligible
        .iter()
        .map(|&i| detections[i].confidence.unwrap_or(f32::NEG_INFINITY))
        .collect();

    let mut active: Vec<usize> = (0..eligible.len()).collect();
    let mut columns = PoolColumns::default();
    let mut mask = Vec::with_capacity(active.len());
    let mut kept = Vec::new();

    while !active.is_empty() {
        let mut best_pos = 0usize;
        for (pos, &idx) in active.iter().enumerate().skip(1) {
            if scores[idx] > scores[active[best_pos]] {
                best_pos = pos;
            }
        }
        let best = active[best_pos];
        kept.push(eligible[best]);

        columns.gather(&boxes, &active);
        K::survival_mask(
            &boxes[best],
            &columns,
            params.iou_threshold,
            &params.overlap,
            &mut mask,
        );
        mask[best_pos] = false;

        let before = active.len();
        active = active
            .iter()
            .zip(mask.iter())
            .filter(|(_, survives)| **survives)
            .map(|(&idx, _)| idx)
            .collect();
        trace_debug!(
            "suppress_round",
            selected = eligible[best],
            removed = before - active.len(),
            remaining = active.len()
        );
    }

    trace_event!("suppress_kept", kept = kept.len());
    kept
}

/// Runs greedy NMS and returns the emitted detections in selection order.
pub fn suppress(detections: &[Detection], params: &SuppressParams) -> DetectionSet {
    select_indices(detections, params)
        .into_iter()
        .map(|i| {
            let det = &detections[i];
            if params.keep_confidence {
                det.clone()
            } else {
                det.without_confidence()
            }
        })
        .collect()
}
