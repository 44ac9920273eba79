//! Multi-resolution Marr-Hildreth hash.
//!
//! The luma plane is blurred, resized to 512x512, histogram-equalised and
//! correlated with a Marr-Hildreth (Mexican hat) kernel. The min-max
//! normalised response is summed over a 31x31 grid of 16x16 blocks. Each 3x3
//! window of blocks, stepped by 4 in both directions, contributes nine bits:
//! one per block, set when that block is above the window mean. Bits are
//! packed most significant first, giving 8 * 8 * 9 = 576 bits.

use image::imageops::{self, FilterType};
use image::GrayImage;
use ndarray::{s, Array2};
use rayon::prelude::*;
use std::path::Path;

use super::luma::load_luma;
use crate::config::MAX_MH_SIGMA;
use crate::error::{Error, Result};

/// Length in bytes of every hash produced here
pub const MH_HASH_LEN: usize = 72;

const RESIZED: u32 = 512;
const BLOCK: usize = 16;
const GRID: usize = 31;
const WINDOW: usize = 3;
const STEP: usize = 4;

/// Compute the multi-resolution hash of an image file
pub fn mh_hash(path: &Path, alpha: f32, level: f32) -> Result<Vec<u8>> {
    let luma = load_luma(path)?;
    mh_hash_from_luma(&luma, alpha, level)
}

/// Compute the multi-resolution hash of a decoded luma plane
pub fn mh_hash_from_luma(luma: &GrayImage, alpha: f32, level: f32) -> Result<Vec<u8>> {
    if luma.width() == 0 || luma.height() == 0 {
        return Err(Error::Algorithm("image has no pixels".to_string()));
    }

    let kernel = mh_kernel(alpha, level)?;

    let blurred = imageops::blur(luma, 1.0);
    let resized = imageops::resize(&blurred, RESIZED, RESIZED, FilterType::CatmullRom);
    let equalized = equalize(&resized);

    let response = normalize(correlate(&equalized, &kernel)?);
    let blocks = block_sums(&response);

    Ok(pack_bits(&blocks))
}

/// Marr-Hildreth kernel of radius `floor(4 * alpha^level)`, at most
/// [`MAX_MH_SIGMA`]
fn mh_kernel(alpha: f32, level: f32) -> Result<Array2<f32>> {
    let radius = (4.0 * alpha.powf(level)).floor();
    if !(1.0..=MAX_MH_SIGMA as f32).contains(&radius) {
        return Err(Error::Algorithm(format!(
            "wavelet alpha={} level={} gives a kernel radius of {}, expected 1..={}",
            alpha, level, radius, MAX_MH_SIGMA
        )));
    }
    let sigma = radius as usize;

    let side = 2 * sigma + 1;
    let scale = alpha.powf(-level);

    Ok(Array2::from_shape_fn((side, side), |(y, x)| {
        let xpos = scale * (x as f32 - sigma as f32);
        let ypos = scale * (y as f32 - sigma as f32);
        let a = xpos * xpos + ypos * ypos;
        (2.0 - a) * (-a / 2.0).exp()
    }))
}

/// Histogram equalisation over 256 levels spanning the image's own range
fn equalize(img: &GrayImage) -> Array2<f32> {
    let (width, height) = img.dimensions();
    let shape = (height as usize, width as usize);

    let (min, max) = img
        .pixels()
        .fold((u8::MAX, u8::MIN), |(lo, hi), p| (lo.min(p.0[0]), hi.max(p.0[0])));

    if min >= max {
        return Array2::from_shape_fn(shape, |(y, x)| img.get_pixel(x as u32, y as u32).0[0] as f32);
    }

    let range = (max - min) as u64;
    let bucket = |v: u8| ((v - min) as u64 * 255 / range) as usize;

    let mut cumulative = [0u64; 256];
    for p in img.pixels() {
        cumulative[bucket(p.0[0])] += 1;
    }
    for i in 1..cumulative.len() {
        cumulative[i] += cumulative[i - 1];
    }
    let total = cumulative[255];

    Array2::from_shape_fn(shape, |(y, x)| {
        let v = img.get_pixel(x as u32, y as u32).0[0];
        (min as u64 + range * cumulative[bucket(v)] / total) as f32
    })
}

/// Same-size correlation with edge clamping, one output row per rayon task
fn correlate(image: &Array2<f32>, kernel: &Array2<f32>) -> Result<Array2<f32>> {
    let (height, width) = image.dim();
    let side = kernel.nrows();
    let radius = side / 2;

    let padded_width = width + 2 * radius;
    let padded: Vec<f32> = (0..height + 2 * radius)
        .flat_map(|py| {
            let y = py.saturating_sub(radius).min(height - 1);
            (0..padded_width).map(move |px| {
                let x = px.saturating_sub(radius).min(width - 1);
                image[[y, x]]
            })
        })
        .collect();
    let taps: Vec<f32> = kernel.iter().copied().collect();

    let mut out = vec![0.0f32; width * height];
    out.par_chunks_mut(width).enumerate().for_each(|(y, row)| {
        for (x, cell) in row.iter_mut().enumerate() {
            let mut acc = 0.0f32;
            for ky in 0..side {
                let start = (y + ky) * padded_width + x;
                acc += padded[start..start + side]
                    .iter()
                    .zip(&taps[ky * side..(ky + 1) * side])
                    .map(|(a, b)| a * b)
                    .sum::<f32>();
            }
            *cell = acc;
        }
    });

    Array2::from_shape_vec((height, width), out).map_err(|e| Error::Algorithm(e.to_string()))
}

/// Min-max scale into [0, 1]; a flat response becomes all zeros
fn normalize(mut response: Array2<f32>) -> Array2<f32> {
    let (min, max) = response
        .iter()
        .fold((f32::MAX, f32::MIN), |(lo, hi), &v| (lo.min(v), hi.max(v)));

    if max > min {
        let range = max - min;
        response.mapv_inplace(|v| (v - min) / range);
    } else {
        response.fill(0.0);
    }
    response
}

fn block_sums(response: &Array2<f32>) -> Array2<f32> {
    Array2::from_shape_fn((GRID, GRID), |(by, bx)| {
        let (y0, x0) = (by * BLOCK, bx * BLOCK);
        response.slice(s![y0..y0 + BLOCK, x0..x0 + BLOCK]).sum()
    })
}

fn pack_bits(blocks: &Array2<f32>) -> Vec<u8> {
    let mut hash = Vec::with_capacity(MH_HASH_LEN);
    let mut byte = 0u8;
    let mut bits = 0usize;

    for wy in (0..GRID - 2).step_by(STEP) {
        for wx in (0..GRID - 2).step_by(STEP) {
            let window = blocks.slice(s![wy..wy + WINDOW, wx..wx + WINDOW]);
            let mean = window.mean().unwrap_or(0.0);

            for &value in window.iter() {
                byte <<= 1;
                if value > mean {
                    byte |= 0x01;
                }
                bits += 1;
                if bits % 8 == 0 {
                    hash.push(byte);
                    byte = 0;
                }
            }
        }
    }

    hash
}
