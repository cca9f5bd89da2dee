use image::{imageops::FilterType, DynamicImage};
use ndarray::prelude::*;

use crate::errors::{LeafError, Result};

/// Decodes an uploaded byte stream into a canonical in-memory image.
pub fn decode_image(bytes: &[u8]) -> Result<DynamicImage> {
    image::load_from_memory(bytes).map_err(|e| LeafError::InvalidImage {
        reason: format!("could not decode image: {e}"),
    })
}

/// Shapes a decoded image into the (1, height, width, 3) unit-interval
/// tensor a classifier expects.
///
/// `resize_exact` takes width before height; the tensor layout wants height
/// before width.
pub fn prepare(image: &DynamicImage, height: u32, width: u32) -> Result<Array4<f32>> {
    let resized = image.resize_exact(width, height, FilterType::CatmullRom);
    // to_rgb8 replicates single-channel sources across three channels and
    // drops alpha, matching the channel contract the classifiers were
    // trained with.
    let rgb = resized.to_rgb8();
    let data: Vec<f32> = rgb.into_raw().into_iter().map(|v| f32::from(v) / 255.0).collect();
    let tensor = Array3::from_shape_vec((height as usize, width as usize, 3), data)?;
    Ok(tensor.insert_axis(Axis(0)))
}
