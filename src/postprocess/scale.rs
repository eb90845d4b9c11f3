//! Model-space to image-space scaling.

use crate::detection::Detection;
use crate::util::math::scale_ratio;
use crate::util::{PlatePostError, PlatePostResult};

/// Width and height in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    /// Input resolution of the plate detector.
    pub const MODEL_DEFAULT: Self = Self::new(512, 512);

    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Rejects zero dimensions; `context` names the resolution in the error.
    pub fn validate(&self, context: &'static str) -> PlatePostResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(PlatePostError::InvalidResolution {
                width: self.width,
                height: self.height,
                context,
            });
        }
        Ok(())
    }
}

/// Independent horizontal and vertical scale factors.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScaleRatios {
    pub rx: f32,
    pub ry: f32,
}

impl ScaleRatios {
    /// Ratios mapping `model` coordinates onto `target` coordinates.
    pub fn between(model: Resolution, target: Resolution) -> PlatePostResult<Self> {
        model.validate("model")?;
        target.validate("target")?;
        Ok(Self {
            rx: scale_ratio(target.width, model.width),
            ry: scale_ratio(target.height, model.height),
        })
    }

    /// True when both ratios are exactly one.
    pub fn is_identity(&self) -> bool {
        self.rx == 1.0 && self.ry == 1.0
    }

    /// Scales every x-channel by `rx` and every y-channel by `ry`. The
    /// confidence is left untouched.
    pub fn apply(&self, det: &Detection) -> Detection {
        Detection {
            bbox: det.bbox.scaled(self.rx, self.ry),
            keypoints: det
                .keypoints
                .iter()
                .map(|kp| kp.scaled(self.rx, self.ry))
                .collect(),
            confidence: det.confidence,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{BBox, Point};

    #[test]
    fn ratios_are_independent_per_axis() {
        let r =
            ScaleRatios::between(Resolution::new(512, 512), Resolution::new(1024, 256)).unwrap();
        assert_eq!(r, ScaleRatios { rx: 2.0, ry: 0.5 });
        assert!(!r.is_identity());
    }

    #[test]
    fn zero_resolution_is_rejected() {
        let err =
            ScaleRatios::between(Resolution::new(0, 512), Resolution::new(10, 10)).unwrap_err();
        assert_eq!(
            err,
            PlatePostError::InvalidResolution {
                width: 0,
                height: 512,
                context: "model"
            }
        );
    }

    #[test]
    fn apply_scales_box_and_keypoints_but_not_confidence() {
        let det = Detection::new(
            BBox::center(100.0, 100.0, 20.0, 10.0),
            vec![Point::new(95.0, 90.0)],
            0.75,
        );
        let out = ScaleRatios { rx: 3.0, ry: 0.5 }.apply(&det);
        assert_eq!(out.bbox, BBox::center(300.0, 50.0, 60.0, 5.0));
        assert_eq!(out.keypoints, vec![Point::new(285.0, 45.0)]);
        assert_eq!(out.confidence, Some(0.75));
    }
}
