//! Buffer analysis modules
//!
//! Pure, reentrant transforms applied to sample buffers:
//! - Spectral window functions
//! - Zero-crossing average frequency
//! - Magnitude spectrum

pub mod frequency;
pub mod spectrum;
pub mod window;
