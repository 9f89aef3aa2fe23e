//! Per-buffer analysis results

use crate::features::window::Window;
use serde::{Deserialize, Serialize};

/// What the analyzer measured on one buffer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BufferAnalysis {
    /// Buffer length in samples
    pub block_size: usize,

    /// Zero-crossing frequency estimate in Hz
    pub frequency_hz: u32,

    /// True when the buffer was degenerate and `frequency_hz` is the
    /// previous estimate carried forward
    pub frequency_is_fallback: bool,

    /// Centre frequency of the strongest spectrum bin above DC
    /// (`None` when spectra are disabled or the buffer is too short)
    pub peak_frequency_hz: Option<f32>,

    /// Window applied before the spectrum
    pub window: Option<Window>,

    /// Smallest sample in the buffer
    pub minimum: f32,

    /// Largest sample in the buffer
    pub maximum: f32,
}

impl BufferAnalysis {
    /// Peak-to-peak amplitude
    pub fn peak_to_peak(&self) -> f32 {
        self.maximum - self.minimum
    }
}
