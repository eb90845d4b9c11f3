//! Numeric helpers shared by the geometry and post-processing code.

/// Divides `num` by `den`, returning `fallback` unless `den` is finite and
/// strictly positive.
#[inline]
pub(crate) fn ratio_or(num: f32, den: f32, fallback: f32) -> f32 {
    if den > 0.0 && den.is_finite() {
        num / den
    } else {
        fallback
    }
}

/// Euclidean distance between two points given as `[x, y]`.
#[inline]
pub(crate) fn edge_length(a: [f32; 2], b: [f32; 2]) -> f32 {
    (a[0] - b[0]).hypot(a[1] - b[1])
}

/// Ratio between a target and a source extent, as used for model-to-image
/// scaling.
#[inline]
pub(crate) fn scale_ratio(target: u32, source: u32) -> f32 {
    (f64::from(target) / f64::from(source)) as f32
}

#[cfg(test)]
mod tests {
    use super::{edge_length, ratio_or, scale_ratio};

    #[test]
    fn ratio_or_falls_back_on_non_positive_denominator() {
        assert_eq!(ratio_or(1.0, 0.0, 0.0), 0.0);
        assert_eq!(ratio_or(1.0, -2.0, 1.0), 1.0);
        assert_eq!(ratio_or(1.0, f32::NAN, 0.0), 0.0);
        assert_eq!(ratio_or(1.0, f32::INFINITY, 0.0), 0.0);
        assert!((ratio_or(1.0, 4.0, 0.0) - 0.25).abs() < 1e-7);
    }

    #[test]
    fn edge_length_is_euclidean() {
        assert!((edge_length([0.0, 0.0], [3.0, 4.0]) - 5.0).abs() < 1e-6);
        assert_eq!(edge_length([2.0, 2.0], [2.0, 2.0]), 0.0);
    }

    #[test]
    fn scale_ratio_matches_division() {
        assert_eq!(scale_ratio(512, 512), 1.0);
        assert!((scale_ratio(1920, 512) - 3.75).abs() < 1e-6);
        assert!((scale_ratio(256, 512) - 0.5).abs() < 1e-7);
    }
}
