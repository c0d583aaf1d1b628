//! Image preprocessing and output decoding
//!
//! Input: any PNG/JPEG bytes. Output: an NHWC `[1, size, size, 3]` f32
//! tensor with channels in [0, 1]. The image is stretched to the square
//! without preserving aspect ratio, using bicubic (Catmull-Rom) resampling.

use image::imageops::{self, FilterType};
use ndarray::Array4;

use crate::error::{DermaError, Result};
use crate::types::{Label, Prediction};

/// Decode, convert to RGB, resize and scale an uploaded image
pub fn preprocess(bytes: &[u8], size: u32) -> Result<Array4<f32>> {
    let decoded = image::load_from_memory(bytes)
        .map_err(|e| DermaError::Prediction(format!("cannot decode image: {}", e)))?;

    let rgb = decoded.to_rgb8();
    let resized = imageops::resize(&rgb, size, size, FilterType::CatmullRom);

    let side = size as usize;
    let tensor = Array4::<f32>::from_shape_fn((1, side, side, 3), |(_, y, x, c)| {
        let pixel = resized.get_pixel(x as u32, y as u32);
        pixel[c] as f32 / 255.0
    });

    Ok(tensor)
}

/// Pick the most probable label from the model's output vector
///
/// The first maximum wins on ties. Confidence is that maximum as a
/// percentage.
pub fn select_prediction(scores: &[f32]) -> Result<Prediction> {
    if scores.len() != Label::ALL.len() {
        return Err(DermaError::Prediction(format!(
            "unexpected model output: expected {} scores, got {}",
            Label::ALL.len(),
            scores.len()
        )));
    }

    if let Some(bad) = scores.iter().find(|s| !s.is_finite()) {
        return Err(DermaError::Prediction(format!(
            "unexpected model output: non-finite score {}",
            bad
        )));
    }

    let (index, max) = scores
        .iter()
        .copied()
        .enumerate()
        .fold((0, f32::MIN), |best, (i, score)| {
            if score > best.1 {
                (i, score)
            } else {
                best
            }
        });

    let label = Label::from_index(index)
        .ok_or_else(|| DermaError::Prediction(format!("class index {} out of range", index)))?;

    Ok(Prediction {
        label,
        confidence: f64::from(max) * 100.0,
    })
}
