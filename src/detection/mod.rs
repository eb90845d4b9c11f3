//! Detection records and sets.
//!
//! A [`DetectionSet`] is built from one inference call's output and flows by
//! value through the pipeline: every stage reads a set and returns a new one.

pub mod layout;

pub use layout::RowLayout;

use crate::geometry::{BBox, Point};
use std::ops::Deref;

/// One detected object: a box, its auxiliary keypoints, and a confidence.
#[derive(Clone, Debug, PartialEq)]
pub struct Detection {
    /// Bounding box in the representation it was decoded in.
    pub bbox: BBox,
    /// Landmarks associated with the box, in model output order.
    pub keypoints: Vec<Point>,
    /// Detector confidence, compared literally (never clamped). `None` once
    /// suppression has been asked to drop it.
    pub confidence: Option<f32>,
}

impl Detection {
    /// Creates a detection carrying a confidence.
    pub fn new(bbox: BBox, keypoints: Vec<Point>, confidence: f32) -> Self {
        Self {
            bbox,
            keypoints,
            confidence: Some(confidence),
        }
    }

    /// Returns a copy without the confidence value.
    pub fn without_confidence(&self) -> Self {
        Self {
            confidence: None,
            ..self.clone()
        }
    }
}

/// Ordered collection of detections.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DetectionSet {
    items: Vec<Detection>,
}

impl DetectionSet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the detections as a vector.
    pub fn into_vec(self) -> Vec<Detection> {
        self.items
    }
}

impl Deref for DetectionSet {
    type Target = [Detection];

    fn deref(&self) -> &Self::Target {
        &self.items
    }
}

impl From<Vec<Detection>> for DetectionSet {
    fn from(items: Vec<Detection>) -> Self {
        Self { items }
    }
}

impl FromIterator<Detection> for DetectionSet {
    fn from_iter<I: IntoIterator<Item = Detection>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for DetectionSet {
    type Item = Detection;
    type IntoIter = std::vec::IntoIter<Detection>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a> IntoIterator for &'a DetectionSet {
    type Item = &'a Detection;
    type IntoIter = std::slice::Iter<'a, Detection>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
