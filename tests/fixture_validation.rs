//! Replays recorded detector outputs from `tests/data/scenarios.json` and
//! compares the post-processed detections with the expected image-space
//! results.

use platepost::{postprocess, BBox, Detection, Point, Resolution};
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;

/// Coordinate tolerance in pixels.
const POSITION_TOLERANCE_PX: f32 = 1e-3;

#[derive(Debug, Deserialize)]
struct Scenarios {
    cases: Vec<Case>,
}

#[derive(Debug, Deserialize)]
struct Case {
    case_id: String,
    rows: Vec<Vec<f32>>,
    model: [u32; 2],
    target: [u32; 2],
    confidence_threshold: f32,
    iou_threshold: f32,
    display_threshold: f32,
    #[serde(default)]
    expected: Vec<Expected>,
}

#[derive(Debug, Deserialize)]
struct Expected {
    bbox: [f32; 4],
    keypoints: Vec<[f32; 2]>,
    confidence: f32,
}

fn scenarios_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/data/scenarios.json")
}

fn load_scenarios() -> Scenarios {
    let text = fs::read_to_string(scenarios_path()).expect("read scenarios.json");
    serde_json::from_str(&text).expect("parse scenarios.json")
}

fn close(a: f32, b: f32) -> bool {
    (a - b).abs() <= POSITION_TOLERANCE_PX
}

fn check(case_id: &str, got: &Detection, want: &Expected) {
    let c = got.bbox.center_form();
    let [cx, cy, w, h] = want.bbox;
    assert!(
        close(c.cx, cx) && close(c.cy, cy) && close(c.w, w) && close(c.h, h),
        "{case_id}: bbox {c:?} != {:?}",
        want.bbox
    );
    assert_eq!(got.keypoints.len(), want.keypoints.len(), "{case_id}");
    for (kp, [x, y]) in got.keypoints.iter().zip(&want.keypoints) {
        assert!(
            close(kp.x, *x) && close(kp.y, *y),
            "{case_id}: keypoint {kp:?} != {:?}",
            Point::new(*x, *y)
        );
    }
    assert_eq!(got.confidence, Some(want.confidence), "{case_id}");
}

#[test]
fn recorded_scenarios_match_expected_detections() {
    let scenarios = load_scenarios();
    assert!(!scenarios.cases.is_empty());

    for case in &scenarios.cases {
        let out = postprocess(
            &case.rows,
            Resolution::new(case.model[0], case.model[1]),
            Resolution::new(case.target[0], case.target[1]),
            case.confidence_threshold,
            case.iou_threshold,
            case.display_threshold,
        )
        .unwrap_or_else(|err| panic!("{}: {err}", case.case_id));

        assert_eq!(out.len(), case.expected.len(), "{}", case.case_id);
        for (got, want) in out.iter().zip(&case.expected) {
            check(&case.case_id, got, want);
        }
    }
}

#[test]
fn scenario_boxes_stay_in_center_form() {
    let scenarios = load_scenarios();
    let case = &scenarios.cases[0];
    let out = postprocess(
        &case.rows,
        Resolution::MODEL_DEFAULT,
        Resolution::MODEL_DEFAULT,
        case.confidence_threshold,
        case.iou_threshold,
        case.display_threshold,
    )
    .unwrap();
    assert!(matches!(out[0].bbox, BBox::Center(_)));
}
