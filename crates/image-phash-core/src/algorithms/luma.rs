use image::{ColorType, DynamicImage, GrayImage, Luma};
use std::path::Path;

use crate::error::Result;

/// Decode an image file and reduce it to a single luma channel.
///
/// Grey inputs keep their first channel. Colour inputs are converted with
/// the studio-swing YCbCr luma, `Y = ((66R + 129G + 25B + 128) >> 8) + 16`,
/// ignoring any alpha channel.
pub fn load_luma(path: &Path) -> Result<GrayImage> {
    let img = image::open(path)?;
    Ok(to_luma(&img))
}

pub fn to_luma(img: &DynamicImage) -> GrayImage {
    match img.color() {
        ColorType::L8 | ColorType::La8 | ColorType::L16 | ColorType::La16 => img.to_luma8(),
        _ => {
            let rgb = img.to_rgb8();
            GrayImage::from_fn(rgb.width(), rgb.height(), |x, y| {
                let [r, g, b] = rgb.get_pixel(x, y).0;
                let luma = (66 * r as u32 + 129 * g as u32 + 25 * b as u32 + 128) >> 8;
                Luma([(luma + 16) as u8])
            })
        }
    }
}
