//! # Perceptual Hash Primitives
//!
//! The hashing algorithms proper sit behind the [`HashAlgorithms`] trait. Jobs
//! only ever see the trait, so the primitives can be swapped for another
//! implementation (or a test double) without touching the execution layer.
//!
//! [`DefaultAlgorithms`] provides:
//!
//! 1. A 64-bit DCT hash (see [`dct`])
//! 2. A 72-byte multi-resolution Marr-Hildreth hash (see [`mh`])
//!
//! Both decode the file exactly once.

pub mod dct;
mod luma;
pub mod mh;

use std::path::Path;

use crate::error::Result;

pub use dct::{dct_hash, dct_hash_from_luma};
pub use luma::{load_luma, to_luma};
pub use mh::{mh_hash, mh_hash_from_luma, MH_HASH_LEN};

/// Perceptual hash primitives invoked from worker threads
pub trait HashAlgorithms: Send + Sync {
    /// 64-bit discrete-cosine-transform hash of an image file
    fn dct_hash(&self, path: &Path) -> Result<u64>;

    /// Multi-resolution hash of an image file, one byte per element
    fn mh_hash(&self, path: &Path, alpha: f32, level: f32) -> Result<Vec<u8>>;
}

/// The built-in implementation on top of `image`, `rustdct` and `ndarray`
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultAlgorithms;

impl HashAlgorithms for DefaultAlgorithms {
    fn dct_hash(&self, path: &Path) -> Result<u64> {
        dct::dct_hash(path)
    }

    fn mh_hash(&self, path: &Path, alpha: f32, level: f32) -> Result<Vec<u8>> {
        mh::mh_hash(path, alpha, level)
    }
}
