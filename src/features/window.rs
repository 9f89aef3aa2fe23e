//! Spectral window functions
//!
//! Tapering multipliers applied in place to a sample buffer before spectral
//! or frequency analysis. Four variants are supported:
//! - Hann (index 0 left unscaled)
//! - Gauss (sigma = 0.4 of the half-width)
//! - Weedon-Gauss
//! - Blackman-Harris (4-term)
//!
//! # Example
//!
//! ```
//! use wavegraph_dsp::features::window::Window;
//!
//! let mut samples = vec![1.0f32; 8];
//! Window::BlackmanHarris.apply(&mut samples);
//! assert!(samples[0] < 0.001);
//! ```

use crate::error::GraphError;
use serde::{Deserialize, Serialize};
use std::f32::consts::PI;
use std::fmt;
use std::str::FromStr;

/// Blackman-Harris 4-term coefficients
const BH_A0: f32 = 0.35875;
const BH_A1: f32 = 0.48829;
const BH_A2: f32 = 0.14128;
const BH_A3: f32 = 0.01168;

/// Gauss window width relative to the half-length
const GAUSS_SIGMA: f32 = 0.4;

/// Weedon-Gauss exponent numerator (-250 * 0.4605)
const WEEDON_GAUSS_FACTOR: f32 = -250.0 * 0.4605;

/// Spectral window variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Window {
    /// Raised cosine
    Hann,
    /// Gaussian with sigma = 0.4 * (N-1)/2
    Gauss,
    /// Weedon's Gaussian variant, centred on N/2
    WeedonGauss,
    /// 4-term Blackman-Harris
    BlackmanHarris,
}

impl Window {
    /// All window variants
    pub const ALL: [Window; 4] = [
        Window::Hann,
        Window::Gauss,
        Window::WeedonGauss,
        Window::BlackmanHarris,
    ];

    /// Stable lowercase identifier, as accepted by `FromStr`
    pub fn name(&self) -> &'static str {
        match self {
            Window::Hann => "hann",
            Window::Gauss => "gauss",
            Window::WeedonGauss => "weedon-gauss",
            Window::BlackmanHarris => "blackman-harris",
        }
    }

    /// Weight for sample `i` of an `n`-sample buffer
    ///
    /// Only meaningful for `n >= 2`.
    pub fn weight(&self, i: usize, n: usize) -> f32 {
        let x = i as f32;
        let len = n as f32;
        match self {
            Window::Hann => {
                if i == 0 {
                    1.0
                } else {
                    0.5 * (1.0 - (2.0 * PI * x / (len - 1.0)).cos())
                }
            }
            Window::Gauss => {
                let k = (len - 1.0) / 2.0;
                let t = (x - k) / (GAUSS_SIGMA * k);
                (-0.5 * t * t).exp()
            }
            Window::WeedonGauss => {
                let k = WEEDON_GAUSS_FACTOR / (len * len);
                let d = len / 2.0;
                ((x - d) * (x - d) * k).exp()
            }
            Window::BlackmanHarris => {
                let f = PI * x / (len - 1.0);
                BH_A0 - BH_A1 * (2.0 * f).cos() + BH_A2 * (4.0 * f).cos()
                    - BH_A3 * (6.0 * f).cos()
            }
        }
    }

    /// Window coefficients for an `n`-sample buffer
    ///
    /// Buffers shorter than 2 samples get unit weights.
    pub fn coefficients(&self, n: usize) -> Vec<f32> {
        if n < 2 {
            return vec![1.0; n];
        }
        (0..n).map(|i| self.weight(i, n)).collect()
    }

    /// Multiply `samples` in place by this window
    ///
    /// Buffers shorter than 2 samples are left untouched: every variant
    /// divides by `N - 1` or `N`, which has no useful value there.
    pub fn apply(&self, samples: &mut [f32]) {
        let n = samples.len();
        if n < 2 {
            log::warn!(
                "{} window needs at least 2 samples, got {}; buffer left unchanged",
                self.name(),
                n
            );
            return;
        }

        for (i, sample) in samples.iter_mut().enumerate() {
            *sample *= self.weight(i, n);
        }
    }

    /// Return a windowed copy of `samples`
    pub fn applied(&self, samples: &[f32]) -> Vec<f32> {
        let mut out = samples.to_vec();
        self.apply(&mut out);
        out
    }
}

impl fmt::Display for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Window {
    type Err = GraphError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace(&['_', ' '][..], "-");
        match normalized.as_str() {
            "hann" | "hanning" => Ok(Window::Hann),
            "gauss" | "gaussian" => Ok(Window::Gauss),
            "weedon-gauss" | "weedongauss" => Ok(Window::WeedonGauss),
            "blackman-harris" | "blackmanharris" => Ok(Window::BlackmanHarris),
            _ => Err(GraphError::InvalidInput(format!(
                "Unknown window function: {}",
                s
            ))),
        }
    }
}
