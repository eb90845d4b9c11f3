//! Detector input tensors.
//!
//! The plate detector takes a single `[1, 3, H, W]` channel-first `f32`
//! tensor at its fixed input resolution. Pixel values are mapped linearly
//! from `[0, 255]` with [`PIXEL_SCALE`]. Channel order is whatever the caller
//! supplies; the deployed model expects BGR.

#[cfg(feature = "image-io")]
pub mod io;

use crate::postprocess::Resolution;
use crate::util::{PlatePostError, PlatePostResult};

/// Interleaved channels per pixel.
pub const CHANNELS: usize = 3;

/// Multiplier applied to every 8-bit pixel value.
pub const PIXEL_SCALE: f32 = 2.0 / 254.5;

/// Channel-first `f32` tensor with batch size one.
#[derive(Clone, Debug, PartialEq)]
pub struct InputTensor {
    data: Vec<f32>,
    resolution: Resolution,
}

impl InputTensor {
    /// Builds a tensor from an interleaved 3-channel buffer that is already
    /// at the model resolution.
    pub fn from_interleaved(pixels: &[u8], resolution: Resolution) -> PlatePostResult<Self> {
        resolution.validate("input")?;
        let plane = resolution.width as usize * resolution.height as usize;
        let needed = plane * CHANNELS;
        if pixels.len() < needed {
            return Err(PlatePostError::BufferTooSmall {
                needed,
                got: pixels.len(),
            });
        }

        let mut data = vec![0.0f32; needed];
        for (i, px) in pixels[..needed].chunks_exact(CHANNELS).enumerate() {
            for (c, &value) in px.iter().enumerate() {
                data[c * plane + i] = f32::from(value) * PIXEL_SCALE;
            }
        }
        Ok(Self { data, resolution })
    }

    /// Tensor shape `[1, 3, height, width]`.
    pub fn shape(&self) -> [usize; 4] {
        [
            1,
            CHANNELS,
            self.resolution.height as usize,
            self.resolution.width as usize,
        ]
    }

    /// Returns the tensor values in channel-first order.
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Returns the spatial resolution.
    pub fn resolution(&self) -> Resolution {
        self.resolution
    }
}
