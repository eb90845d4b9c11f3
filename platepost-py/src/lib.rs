//! Python bindings for platepost.
//!
//! Raw detector output is passed as a 2D `float32` numpy array with one row
//! per candidate (`cx, cy, w, h, keypoint pairs, confidence`); the keypoint
//! count is inferred from the column count.

use numpy::{PyReadonlyArray2, PyUntypedArrayMethods};
use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;

use platepost::lowlevel::{select_indices, BOX_FIELDS};
use platepost::{
    AreaConvention, BBox, Detection as RustDetection, DetectionSet, OverlapConfig,
    PlatePostError, PostprocessConfig, Postprocessor, Resolution, RowLayout, SuppressParams,
};

/// Convert a PlatePostError to a Python exception.
fn to_py_err(err: PlatePostError) -> PyErr {
    match err {
        PlatePostError::Backend { .. } | PlatePostError::ImageIo { .. } => {
            PyRuntimeError::new_err(err.to_string())
        }
        _ => PyValueError::new_err(err.to_string()),
    }
}

/// One detection: a center-form box, keypoints, and an optional confidence.
#[pyclass]
#[derive(Clone)]
pub struct Detection {
    inner: RustDetection,
}

#[pymethods]
impl Detection {
    /// Box as `(cx, cy, w, h)`.
    #[getter]
    fn bbox(&self) -> (f32, f32, f32, f32) {
        let c = self.inner.bbox.center_form();
        (c.cx, c.cy, c.w, c.h)
    }

    /// Keypoints as a list of `(x, y)` tuples.
    #[getter]
    fn keypoints(&self) -> Vec<(f32, f32)> {
        self.inner.keypoints.iter().map(|p| (p.x, p.y)).collect()
    }

    /// Confidence, or `None` when it was dropped.
    #[getter]
    fn confidence(&self) -> Option<f32> {
        self.inner.confidence
    }

    /// Encode back into the positional row layout (`nan` for a dropped
    /// confidence).
    fn to_row(&self) -> PyResult<Vec<f32>> {
        RowLayout::new(self.inner.keypoints.len())
            .to_row(&self.inner)
            .map_err(to_py_err)
    }

    fn __repr__(&self) -> String {
        let (cx, cy, w, h) = self.bbox();
        match self.inner.confidence {
            Some(conf) => format!(
                "Detection(cx={cx:.2}, cy={cy:.2}, w={w:.2}, h={h:.2}, keypoints={}, confidence={conf:.4})",
                self.inner.keypoints.len()
            ),
            None => format!(
                "Detection(cx={cx:.2}, cy={cy:.2}, w={w:.2}, h={h:.2}, keypoints={})",
                self.inner.keypoints.len()
            ),
        }
    }
}

fn wrap(set: DetectionSet) -> Vec<Detection> {
    set.into_iter().map(|inner| Detection { inner }).collect()
}

/// Row layout implied by the column count of a raw output array.
fn layout_for(columns: usize) -> PyResult<RowLayout> {
    if columns < BOX_FIELDS + 1 || (columns - BOX_FIELDS - 1) % 2 != 0 {
        return Err(PyValueError::new_err(format!(
            "rows must have 4 + 2K + 1 columns, got {columns}"
        )));
    }
    Ok(RowLayout::new((columns - BOX_FIELDS - 1) / 2))
}

fn parse_array(rows: &PyReadonlyArray2<'_, f32>) -> PyResult<(RowLayout, DetectionSet)> {
    let layout = layout_for(rows.shape()[1])?;
    let data = rows.as_slice()?;
    let dets = layout.parse_flat(data).map_err(to_py_err)?;
    Ok((layout, dets))
}

fn area_convention(name: &str) -> PyResult<AreaConvention> {
    match name.to_lowercase().as_str() {
        "pixel_inclusive" => Ok(AreaConvention::PixelInclusive),
        "continuous" => Ok(AreaConvention::Continuous),
        _ => Err(PyValueError::new_err(
            "area must be 'pixel_inclusive' or 'continuous'",
        )),
    }
}

fn suppress_params(
    confidence_threshold: f32,
    iou_threshold: f32,
    keep_confidence: bool,
) -> PyResult<SuppressParams> {
    let params = SuppressParams {
        confidence_threshold,
        iou_threshold,
        keep_confidence,
        ..SuppressParams::default()
    };
    params.validate().map_err(to_py_err)?;
    Ok(params)
}

/// Intersection-over-union of two boxes.
///
/// Args:
///     a, b: `(cx, cy, w, h)`, or `(x1, y1, x2, y2)` when `corners` is True
///     corners: Interpret both boxes as corner form (default: False)
///     area: "pixel_inclusive" or "continuous" (default: "pixel_inclusive")
#[pyfunction]
#[pyo3(signature = (a, b, corners = false, area = "pixel_inclusive"))]
fn overlap(
    a: (f32, f32, f32, f32),
    b: (f32, f32, f32, f32),
    corners: bool,
    area: &str,
) -> PyResult<f32> {
    let to_box = |(p, q, r, s): (f32, f32, f32, f32)| {
        if corners {
            BBox::corners(p, q, r, s)
        } else {
            BBox::center(p, q, r, s)
        }
    };
    let cfg = OverlapConfig {
        area: area_convention(area)?,
        ..OverlapConfig::default()
    };
    Ok(platepost::overlap_with(&to_box(a), &to_box(b), &cfg))
}

/// Greedy non-maximum suppression over raw rows.
///
/// Args:
///     rows: 2D float32 numpy array (N x (4 + 2K + 1))
///     confidence_threshold: Minimum confidence to enter the pool (default: 0.2)
///     iou_threshold: Overlap at which candidates are dropped (default: 0.2)
///     keep_confidence: Keep confidences on the output (default: True)
///
/// Returns:
///     List of Detection objects in selection order
#[pyfunction]
#[pyo3(signature = (rows, confidence_threshold = 0.2, iou_threshold = 0.2, keep_confidence = true))]
fn suppress(
    rows: PyReadonlyArray2<'_, f32>,
    confidence_threshold: f32,
    iou_threshold: f32,
    keep_confidence: bool,
) -> PyResult<Vec<Detection>> {
    let (_, dets) = parse_array(&rows)?;
    let params = suppress_params(confidence_threshold, iou_threshold, keep_confidence)?;
    Ok(wrap(platepost::suppress(&dets, &params)))
}

/// Row indices kept by suppression, in selection order.
#[pyfunction]
#[pyo3(signature = (rows, confidence_threshold = 0.2, iou_threshold = 0.2))]
fn suppress_indices(
    rows: PyReadonlyArray2<'_, f32>,
    confidence_threshold: f32,
    iou_threshold: f32,
) -> PyResult<Vec<usize>> {
    let (_, dets) = parse_array(&rows)?;
    let params = suppress_params(confidence_threshold, iou_threshold, true)?;
    Ok(select_indices(&dets, &params))
}

/// Full post-processing: suppression, keypoint resolution, scaling to the
/// target image, and the display cutoff.
///
/// Args:
///     rows: 2D float32 numpy array (N x (4 + 2K + 1))
///     target: Target image size `(width, height)`
///     model: Model input size `(width, height)` (default: (512, 512))
///     confidence_threshold: default 0.2
///     iou_threshold: default 0.2
///     display_threshold: Confidence that must be exceeded (default: 0.8)
///     keep_confidence: default True
#[pyfunction]
#[pyo3(signature = (
    rows,
    target,
    model = (512, 512),
    confidence_threshold = 0.2,
    iou_threshold = 0.2,
    display_threshold = 0.8,
    keep_confidence = true
))]
#[allow(clippy::too_many_arguments)]
fn postprocess(
    rows: PyReadonlyArray2<'_, f32>,
    target: (u32, u32),
    model: (u32, u32),
    confidence_threshold: f32,
    iou_threshold: f32,
    display_threshold: f32,
    keep_confidence: bool,
) -> PyResult<Vec<Detection>> {
    let (layout, dets) = parse_array(&rows)?;
    let post = Postprocessor::new(PostprocessConfig {
        layout,
        model_resolution: Resolution::new(model.0, model.1),
        suppression: suppress_params(confidence_threshold, iou_threshold, keep_confidence)?,
        display_threshold,
        parallel: false,
    })
    .map_err(to_py_err)?;
    let out = post
        .run(&dets, Resolution::new(target.0, target.1))
        .map_err(to_py_err)?;
    Ok(wrap(out))
}

/// Python module for platepost.
#[pymodule]
fn _platepost(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<Detection>()?;
    m.add_function(wrap_pyfunction!(overlap, m)?)?;
    m.add_function(wrap_pyfunction!(suppress, m)?)?;
    m.add_function(wrap_pyfunction!(suppress_indices, m)?)?;
    m.add_function(wrap_pyfunction!(postprocess, m)?)?;

    m.add("__version__", env!("CARGO_PKG_VERSION"))?;

    Ok(())
}
