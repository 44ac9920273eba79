//! 64-bit discrete-cosine-transform hash.
//!
//! The luma plane is smoothed with a 7x7 mean filter, sampled down to 32x32
//! with nearest-neighbour lookup, and transformed with a 2-D DCT-II. The 8x8
//! block of lowest non-DC frequencies is compared against its own median:
//! bit `i` of the hash is set when coefficient `i` (row-major) is above it.

use image::GrayImage;
use ndarray::{s, Array2};
use rustdct::{Dct2, DctPlanner};
use std::path::Path;

use super::luma::load_luma;
use crate::error::{Error, Result};

/// Side of the sampled grid fed to the DCT
const DCT_SIZE: usize = 32;

/// Radius of the mean filter applied before sampling
const MEAN_RADIUS: i64 = 3;

/// Compute the DCT hash of an image file
pub fn dct_hash(path: &Path) -> Result<u64> {
    let luma = load_luma(path)?;
    dct_hash_from_luma(&luma)
}

/// Compute the DCT hash of a decoded luma plane
pub fn dct_hash_from_luma(luma: &GrayImage) -> Result<u64> {
    if luma.width() == 0 || luma.height() == 0 {
        return Err(Error::Algorithm("image has no pixels".to_string()));
    }

    let mut grid = sample_mean_filtered(luma);
    dct_2d(&mut grid);

    let coefficients: Vec<f32> = grid.slice(s![1..9, 1..9]).iter().copied().collect();
    let median = median(&coefficients);

    let hash = coefficients
        .iter()
        .enumerate()
        .filter(|(_, &c)| c > median)
        .fold(0u64, |hash, (bit, _)| hash | (1u64 << bit));

    Ok(hash)
}

/// Nearest-neighbour 32x32 sample of the mean-filtered plane.
///
/// Only the sampled pixels are ever read from the filtered image, so the
/// filter is evaluated at those points alone. Edges are clamped.
fn sample_mean_filtered(luma: &GrayImage) -> Array2<f32> {
    let (width, height) = luma.dimensions();
    let max_x = width as i64 - 1;
    let max_y = height as i64 - 1;
    let taps = ((2 * MEAN_RADIUS + 1) * (2 * MEAN_RADIUS + 1)) as f32;

    Array2::from_shape_fn((DCT_SIZE, DCT_SIZE), |(row, col)| {
        let cx = (col as u64 * width as u64 / DCT_SIZE as u64) as i64;
        let cy = (row as u64 * height as u64 / DCT_SIZE as u64) as i64;

        let mut sum = 0.0f32;
        for dy in -MEAN_RADIUS..=MEAN_RADIUS {
            let y = (cy + dy).clamp(0, max_y) as u32;
            for dx in -MEAN_RADIUS..=MEAN_RADIUS {
                let x = (cx + dx).clamp(0, max_x) as u32;
                sum += luma.get_pixel(x, y).0[0] as f32;
            }
        }
        sum / taps
    })
}

/// In-place separable 2-D DCT-II (unnormalised)
fn dct_2d(grid: &mut Array2<f32>) {
    let mut planner = DctPlanner::<f32>::new();
    let dct = planner.plan_dct2(DCT_SIZE);

    for mut lane in grid.rows_mut() {
        let mut buffer = lane.to_vec();
        dct.process_dct2(&mut buffer);
        lane.iter_mut().zip(buffer).for_each(|(dst, v)| *dst = v);
    }

    for mut lane in grid.columns_mut() {
        let mut buffer = lane.to_vec();
        dct.process_dct2(&mut buffer);
        lane.iter_mut().zip(buffer).for_each(|(dst, v)| *dst = v);
    }
}

/// Median of a non-empty slice, averaging the two middle values for even lengths
fn median(values: &[f32]) -> f32 {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}
