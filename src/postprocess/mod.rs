//! Raw detector rows to image-space detections.
//!
//! The pipeline runs suppression on the raw rows first (box fields only),
//! then resolves keypoints from center offsets to absolute model
//! coordinates, scales everything to the target resolution, and finally
//! applies the display cutoff.

pub mod scale;

pub use scale::{Resolution, ScaleRatios};

use crate::detection::{Detection, DetectionSet, RowLayout};
use crate::suppress::{suppress, SuppressParams};
use crate::trace::{trace_event, trace_span};
use crate::util::{PlatePostError, PlatePostResult};
#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// Post-processing configuration.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PostprocessConfig {
    /// Row layout of the detector output.
    pub layout: RowLayout,
    /// Resolution the detector ran at.
    pub model_resolution: Resolution,
    /// Suppression thresholds. `keep_confidence` controls whether final
    /// detections carry their confidence.
    pub suppression: SuppressParams,
    /// Detections must exceed this confidence to be returned.
    pub display_threshold: f32,
    /// Process batch items on the rayon pool (requires the `rayon` feature;
    /// ignored otherwise).
    pub parallel: bool,
}

impl Default for PostprocessConfig {
    fn default() -> Self {
        Self {
            layout: RowLayout::PLATE,
            model_resolution: Resolution::MODEL_DEFAULT,
            suppression: SuppressParams::default(),
            display_threshold: 0.8,
            parallel: false,
        }
    }
}

impl PostprocessConfig {
    /// Validates resolutions and thresholds.
    pub fn validate(&self) -> PlatePostResult<()> {
        self.model_resolution.validate("model")?;
        self.suppression.validate()?;
        if self.display_threshold.is_nan() {
            return Err(PlatePostError::InvalidThreshold {
                name: "display_threshold",
                value: self.display_threshold,
            });
        }
        Ok(())
    }
}

/// One image's worth of raw output for batch processing.
#[derive(Clone, Copy, Debug)]
pub struct RawBatchItem<'a> {
    /// Flat detector output, `rows * row_width` values.
    pub data: &'a [f32],
    /// Native resolution of the source image.
    pub target: Resolution,
}

/// Converts the keypoints of `det` from offsets relative to the box center
/// into absolute coordinates.
pub fn resolve_keypoints(det: &Detection) -> Detection {
    let center = det.bbox.center_point();
    Detection {
        bbox: det.bbox,
        keypoints: det
            .keypoints
            .iter()
            .map(|kp| kp.offset(center.x, center.y))
            .collect(),
        confidence: det.confidence,
    }
}

/// Stateless post-processor over a validated configuration.
#[derive(Clone, Debug)]
pub struct Postprocessor {
    cfg: PostprocessConfig,
}

impl Default for Postprocessor {
    fn default() -> Self {
        Self {
            cfg: PostprocessConfig::default(),
        }
    }
}

impl Postprocessor {
    /// Creates a post-processor after validating `cfg`.
    pub fn new(cfg: PostprocessConfig) -> PlatePostResult<Self> {
        cfg.validate()?;
        Ok(Self { cfg })
    }

    /// Returns the active configuration.
    pub fn config(&self) -> &PostprocessConfig {
        &self.cfg
    }

    /// Replaces the display threshold.
    pub fn with_display_threshold(mut self, threshold: f32) -> PlatePostResult<Self> {
        self.cfg.display_threshold = threshold;
        self.cfg.validate()?;
        Ok(self)
    }

    /// Replaces the suppression parameters.
    pub fn with_suppression(mut self, params: SuppressParams) -> PlatePostResult<Self> {
        self.cfg.suppression = params;
        self.cfg.validate()?;
        Ok(self)
    }

    /// Post-processes decoded detections whose keypoints are still center
    /// offsets in model space.
    pub fn run(
        &self,
        detections: &[Detection],
        target: Resolution,
    ) -> PlatePostResult<DetectionSet> {
        let _span = trace_span!("postprocess", rows = detections.len()).entered();
        let ratios = ScaleRatios::between(self.cfg.model_resolution, target)?;

        let params = SuppressParams {
            keep_confidence: true,
            ..self.cfg.suppression
        };
        let kept = suppress(detections, &params);
        let kept_count = kept.len();

        let out: DetectionSet = kept
            .iter()
            .map(|det| ratios.apply(&resolve_keypoints(det)))
            .filter(|det| matches!(det.confidence, Some(c) if c > self.cfg.display_threshold))
            .map(|det| {
                if self.cfg.suppression.keep_confidence {
                    det
                } else {
                    det.without_confidence()
                }
            })
            .collect();

        trace_event!("postprocess_done", suppressed = kept_count, displayed = out.len());
        Ok(out)
    }

    /// Post-processes a slice of positional rows.
    pub fn run_rows<R: AsRef<[f32]>>(
        &self,
        rows: &[R],
        target: Resolution,
    ) -> PlatePostResult<DetectionSet> {
        let detections = self.cfg.layout.parse_rows(rows)?;
        self.run(&detections, target)
    }

    /// Post-processes a flat output tensor.
    pub fn run_flat(&self, data: &[f32], target: Resolution) -> PlatePostResult<DetectionSet> {
        let detections = self.cfg.layout.parse_flat(data)?;
        self.run(&detections, target)
    }

    /// Post-processes independent images; results keep input order.
    pub fn postprocess_batch(
        &self,
        items: &[RawBatchItem<'_>],
    ) -> PlatePostResult<Vec<DetectionSet>> {
        #[cfg(feature = "rayon")]
        if self.cfg.parallel {
            return items
                .par_iter()
                .map(|item| self.run_flat(item.data, item.target))
                .collect();
        }

        items
            .iter()
            .map(|item| self.run_flat(item.data, item.target))
            .collect()
    }
}

/// One-shot post-processing of positional rows with the plate row layout.
///
/// Keeps rows passing suppression at `confidence_threshold` /
/// `iou_threshold`, maps them from `model_resolution` to
/// `target_resolution`, and returns those whose confidence exceeds
/// `display_threshold`.
pub fn postprocess<R: AsRef<[f32]>>(
    raw_rows: &[R],
    model_resolution: Resolution,
    target_resolution: Resolution,
    confidence_threshold: f32,
    iou_threshold: f32,
    display_threshold: f32,
) -> PlatePostResult<DetectionSet> {
    let cfg = PostprocessConfig {
        model_resolution,
        suppression: SuppressParams {
            confidence_threshold,
            iou_threshold,
            ..SuppressParams::default()
        },
        display_threshold,
        ..PostprocessConfig::default()
    };
    Postprocessor::new(cfg)?.run_rows(raw_rows, target_resolution)
}
