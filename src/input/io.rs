//! Helpers bridging the `image` crate to detector inputs.
//!
//! Available when the `image-io` feature is enabled. Decoding stays with the
//! `image` crate; these helpers only resize and repack.

use crate::input::InputTensor;
use crate::postprocess::Resolution;
use crate::util::{PlatePostError, PlatePostResult};
use image::imageops::FilterType;
use std::path::Path;

/// Resolution of a decoded image.
pub fn resolution_of(img: &image::DynamicImage) -> Resolution {
    Resolution::new(img.width(), img.height())
}

/// Reads an image's native resolution from its header.
pub fn image_resolution<P: AsRef<Path>>(path: P) -> PlatePostResult<Resolution> {
    let (width, height) = image::image_dimensions(path).map_err(|err| PlatePostError::ImageIo {
        reason: err.to_string(),
    })?;
    Ok(Resolution::new(width, height))
}

/// Resizes `img` to `model` and packs it into a BGR channel-first tensor.
pub fn tensor_from_image(
    img: &image::DynamicImage,
    model: Resolution,
) -> PlatePostResult<InputTensor> {
    model.validate("model")?;
    let rgb = img.to_rgb8();
    let resized = image::imageops::resize(&rgb, model.width, model.height, FilterType::Triangle);

    let mut bgr = Vec::with_capacity(resized.as_raw().len());
    for px in resized.pixels() {
        bgr.extend_from_slice(&[px[2], px[1], px[0]]);
    }
    InputTensor::from_interleaved(&bgr, model)
}
