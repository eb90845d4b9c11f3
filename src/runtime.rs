//! Seam to the external inference runtime.
//!
//! Model execution is not done here. A runtime integration implements
//! [`InferenceBackend`]; [`Detector`] wires the backend's raw output into the
//! post-processing pipeline.

use crate::detection::DetectionSet;
use crate::input::InputTensor;
use crate::postprocess::{Postprocessor, Resolution};
use crate::trace::{trace_event, trace_span};
use crate::util::{PlatePostError, PlatePostResult};

/// Flat output tensor of one inference call.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RawOutput {
    pub data: Vec<f32>,
}

/// A synchronous inference runtime.
pub trait InferenceBackend {
    /// Runs the model on one input tensor.
    fn infer(&mut self, input: &InputTensor) -> PlatePostResult<RawOutput>;
}

impl<F> InferenceBackend for F
where
    F: FnMut(&InputTensor) -> PlatePostResult<RawOutput>,
{
    fn infer(&mut self, input: &InputTensor) -> PlatePostResult<RawOutput> {
        self(input)
    }
}

/// Inference backend plus post-processing.
pub struct Detector<B> {
    backend: B,
    post: Postprocessor,
}

impl<B: InferenceBackend> Detector<B> {
    /// Creates a detector.
    pub fn new(backend: B, post: Postprocessor) -> Self {
        Self { backend, post }
    }

    /// Returns the post-processor.
    pub fn postprocessor(&self) -> &Postprocessor {
        &self.post
    }

    /// Replaces the post-processor.
    pub fn with_postprocessor(mut self, post: Postprocessor) -> Self {
        self.post = post;
        self
    }

    /// Returns the backend.
    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// Consumes the detector and returns the backend.
    pub fn into_backend(self) -> B {
        self.backend
    }

    /// Runs the backend on `input` and maps its detections onto an image of
    /// resolution `target`.
    pub fn detect(
        &mut self,
        input: &InputTensor,
        target: Resolution,
    ) -> PlatePostResult<DetectionSet> {
        let model = self.post.config().model_resolution;
        let _span = trace_span!("detect", width = target.width, height = target.height).entered();
        if input.resolution() != model {
            let got = input.resolution();
            return Err(PlatePostError::InvalidResolution {
                width: got.width,
                height: got.height,
                context: "input",
            });
        }

        let raw = self.backend.infer(input)?;
        trace_event!("detect_raw", values = raw.data.len());
        self.post.run_flat(&raw.data, target)
    }

    /// Resizes a decoded image to the model resolution, runs the backend, and
    /// maps detections back onto the image.
    #[cfg(feature = "image-io")]
    pub fn detect_image(&mut self, img: &image::DynamicImage) -> PlatePostResult<DetectionSet> {
        let model = self.post.config().model_resolution;
        let tensor = crate::input::io::tensor_from_image(img, model)?;
        self.detect(&tensor, crate::input::io::resolution_of(img))
    }
}
