//! Positional row layout of raw detector output.
//!
//! The detector emits one fixed-width `f32` record per candidate:
//! `[cx, cy, w, h, kx0, ky0, .., kx{K-1}, ky{K-1}, confidence]`. `K` is fixed
//! per deployment; the plate detector uses four corner keypoints (13 fields).

use crate::detection::{Detection, DetectionSet};
use crate::geometry::{BBox, Point};
use crate::util::{PlatePostError, PlatePostResult};

/// Number of leading box fields in a row.
pub const BOX_FIELDS: usize = 4;

/// Keypoint count of a detection row.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RowLayout {
    pub keypoints: usize,
}

impl RowLayout {
    /// Four corner keypoints; 13 fields per row.
    pub const PLATE: Self = Self { keypoints: 4 };

    /// Layout with `keypoints` landmark pairs.
    pub const fn new(keypoints: usize) -> Self {
        Self { keypoints }
    }

    /// Fields per row: `4 + 2K + 1`.
    pub const fn row_width(&self) -> usize {
        BOX_FIELDS + 2 * self.keypoints + 1
    }

    /// Decodes one row. Keypoints stay in their raw (center-offset) encoding.
    pub fn parse_row(&self, row: &[f32]) -> PlatePostResult<Detection> {
        let expected = self.row_width();
        if row.len() != expected {
            return Err(PlatePostError::RowWidthMismatch {
                expected,
                got: row.len(),
            });
        }
        let bbox = BBox::center(row[0], row[1], row[2], row[3]);
        let keypoints = row[BOX_FIELDS..expected - 1]
            .chunks_exact(2)
            .map(|kp| Point::new(kp[0], kp[1]))
            .collect();
        Ok(Detection::new(bbox, keypoints, row[expected - 1]))
    }

    /// Decodes a sequence of rows, failing on the first malformed one.
    pub fn parse_rows<R: AsRef<[f32]>>(&self, rows: &[R]) -> PlatePostResult<DetectionSet> {
        rows.iter().map(|row| self.parse_row(row.as_ref())).collect()
    }

    /// Splits a flat output tensor into rows and decodes them.
    pub fn parse_flat(&self, data: &[f32]) -> PlatePostResult<DetectionSet> {
        let row_width = self.row_width();
        if data.len() % row_width != 0 {
            return Err(PlatePostError::TruncatedOutput {
                len: data.len(),
                row_width,
            });
        }
        data.chunks_exact(row_width)
            .map(|row| self.parse_row(row))
            .collect()
    }

    /// Encodes a detection back into the positional layout. A missing
    /// confidence is written as NaN.
    pub fn to_row(&self, det: &Detection) -> PlatePostResult<Vec<f32>> {
        if det.keypoints.len() != self.keypoints {
            return Err(PlatePostError::KeypointCountMismatch {
                expected: self.keypoints,
                got: det.keypoints.len(),
            });
        }
        let c = det.bbox.center_form();
        let mut row = Vec::with_capacity(self.row_width());
        row.extend_from_slice(&[c.cx, c.cy, c.w, c.h]);
        for kp in &det.keypoints {
            row.push(kp.x);
            row.push(kp.y);
        }
        row.push(det.confidence.unwrap_or(f32::NAN));
        Ok(row)
    }
}

impl Default for RowLayout {
    fn default() -> Self {
        Self::PLATE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROW: [f32; 13] = [
        100.0, 100.0, 20.0, 20.0, -5.0, -5.0, 5.0, -5.0, -5.0, 5.0, 5.0, 5.0, 0.9,
    ];

    #[test]
    fn plate_layout_has_thirteen_fields() {
        assert_eq!(RowLayout::PLATE.row_width(), 13);
        assert_eq!(RowLayout::new(0).row_width(), 5);
    }

    #[test]
    fn parse_row_names_fields() {
        let det = RowLayout::PLATE.parse_row(&ROW).unwrap();
        assert_eq!(det.bbox, BBox::center(100.0, 100.0, 20.0, 20.0));
        assert_eq!(det.keypoints.len(), 4);
        assert_eq!(det.keypoints[1], Point::new(5.0, -5.0));
        assert_eq!(det.confidence, Some(0.9));
    }

    #[test]
    fn parse_row_rejects_wrong_width() {
        let err = RowLayout::PLATE.parse_row(&ROW[..12]).unwrap_err();
        assert_eq!(
            err,
            PlatePostError::RowWidthMismatch {
                expected: 13,
                got: 12
            }
        );
    }

    #[test]
    fn parse_flat_rejects_partial_rows() {
        let mut flat = ROW.to_vec();
        flat.extend_from_slice(&ROW[..5]);
        let err = RowLayout::PLATE.parse_flat(&flat).unwrap_err();
        assert_eq!(
            err,
            PlatePostError::TruncatedOutput {
                len: 18,
                row_width: 13
            }
        );
        assert!(RowLayout::PLATE.parse_flat(&[]).unwrap().is_empty());
    }

    #[test]
    fn to_row_restores_positional_layout() {
        let det = RowLayout::PLATE.parse_row(&ROW).unwrap();
        assert_eq!(RowLayout::PLATE.to_row(&det).unwrap(), ROW.to_vec());
        let stripped = RowLayout::PLATE.to_row(&det.without_confidence()).unwrap();
        assert!(stripped[12].is_nan());
        assert!(RowLayout::new(2).to_row(&det).is_err());
    }
}
