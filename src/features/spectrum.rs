//! Magnitude spectrum of a (windowed) sample buffer
//!
//! Thin wrapper around rustfft producing the one-sided magnitude spectrum
//! that a spectrum graph plots against a (usually logarithmic) frequency axis.
//!
//! # Example
//!
//! ```
//! use wavegraph_dsp::features::spectrum::{bin_frequency, magnitude_spectrum};
//! use wavegraph_dsp::features::window::Window;
//!
//! let samples: Vec<f32> = (0..256)
//!     .map(|i| (2.0 * std::f32::consts::PI * 16.0 * i as f32 / 256.0).sin())
//!     .collect();
//! let spectrum = magnitude_spectrum(&samples, Some(Window::Hann))?;
//! assert_eq!(spectrum.len(), 129);
//! assert_eq!(bin_frequency(16, 256, 8000), 500.0);
//! # Ok::<(), wavegraph_dsp::GraphError>(())
//! ```

use super::window::Window;
use crate::error::GraphError;
use rustfft::num_complex::Complex;
use rustfft::FftPlanner;

/// Compute the one-sided magnitude spectrum of `samples`
///
/// The buffer is copied, optionally windowed, transformed, and the first
/// `N/2 + 1` bin magnitudes are returned scaled by `2/N` (DC and Nyquist by `1/N`).
///
/// # Errors
///
/// Returns `InvalidInput` if `samples` has fewer than 2 samples.
pub fn magnitude_spectrum(samples: &[f32], window: Option<Window>) -> Result<Vec<f32>, GraphError> {
    let n = samples.len();
    if n < 2 {
        return Err(GraphError::InvalidInput(format!(
            "Spectrum needs at least 2 samples, got {}",
            n
        )));
    }

    log::debug!(
        "Computing magnitude spectrum: {} samples, window={:?}",
        n,
        window
    );

    let mut buffer: Vec<Complex<f32>> = match window {
        Some(w) => w
            .applied(samples)
            .into_iter()
            .map(|s| Complex::new(s, 0.0))
            .collect(),
        None => samples.iter().map(|&s| Complex::new(s, 0.0)).collect(),
    };

    let mut planner = FftPlanner::<f32>::new();
    let fft = planner.plan_fft_forward(n);
    fft.process(&mut buffer);

    let bins = n / 2 + 1;
    let scale = 1.0 / n as f32;
    let magnitudes = buffer
        .iter()
        .take(bins)
        .enumerate()
        .map(|(k, c)| {
            let edge = k == 0 || (n % 2 == 0 && k == n / 2);
            let m = c.norm() * scale;
            if edge {
                m
            } else {
                2.0 * m
            }
        })
        .collect();

    Ok(magnitudes)
}

/// Centre frequency in Hz of spectrum bin `bin` for an `n`-point transform
pub fn bin_frequency(bin: usize, n: usize, sample_rate: u32) -> f32 {
    if n == 0 {
        return 0.0;
    }
    bin as f32 * sample_rate as f32 / n as f32
}

/// Index of the strongest non-DC bin, if any
pub fn peak_bin(spectrum: &[f32]) -> Option<usize> {
    spectrum
        .iter()
        .enumerate()
        .skip(1)
        .filter(|(_, m)| m.is_finite())
        .max_by(|a, b| a.1.total_cmp(b.1))
        .map(|(i, _)| i)
}
