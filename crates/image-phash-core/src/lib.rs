//! Asynchronous perceptual hashing of image files.
//!
//! This library computes perceptual hashes without blocking the caller:
//! - A DCT hash: one 64-bit value, delivered as an 8-byte buffer plus its
//!   decimal string
//! - A multi-resolution hash: a 72-byte buffer
//!
//! Work runs on a worker pool; results come back on the thread that owns
//! the [`Phasher`], through a handler that is invoked exactly once per job.
//!
//! ```no_run
//! use image_phash_core::{Config, Phasher};
//!
//! let phasher = Phasher::new(Config::default())?;
//! phasher.image_hash("photo.jpg", |error, buffer, decimal| match error {
//!     None => println!("{:02x?} = {}", buffer, decimal),
//!     Some(e) => eprintln!("{}", e),
//! });
//! phasher.run_until_idle();
//! # Ok::<(), image_phash_core::Error>(())
//! ```

// -- Internal Modules --
mod error;

// -- Public Re-exports --
pub use config::*;
pub use error::{Error, Result};
pub use executor::ExecutionContext;
pub use facade::{HashFormat, HashValue, Pending, Phasher};

// -- Public Modules --
pub mod algorithms;
pub mod config;
pub mod executor;
pub mod facade;
pub mod job;
pub mod logging;
pub mod marshal;
