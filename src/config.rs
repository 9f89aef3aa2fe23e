//! Configuration parameters for the buffer pipeline

use crate::error::GraphError;
use crate::features::frequency::DEFAULT_CROSSING_THRESHOLD;
use crate::features::window::Window;
use crate::graph::axis::AxisParameters;
use crate::graph::GraphParameters;
use serde::{Deserialize, Serialize};

/// Pipeline configuration parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    // Input
    /// Sample rate in Hz (default: 44100)
    pub sample_rate: u32,

    /// Samples per buffer (default: 1024)
    pub block_size: usize,

    // Analysis
    /// Window applied before spectral analysis (default: Hann)
    /// `None` analyses the raw buffer
    pub window: Option<Window>,

    /// Level the zero-crossing estimator counts crossings of (default: 0.5)
    pub crossing_threshold: f32,

    /// Compute a magnitude spectrum for every buffer (default: true)
    pub compute_spectrum: bool,

    // Graph
    /// Horizontal axis (default: 0..22050 Hz, linear)
    pub x_axis: AxisParameters,

    /// Vertical axis (default: 0..1, linear)
    pub y_axis: AxisParameters,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44100,
            block_size: 1024,
            window: Some(Window::Hann),
            crossing_threshold: DEFAULT_CROSSING_THRESHOLD,
            compute_spectrum: true,
            x_axis: DEFAULT_X_AXIS,
            y_axis: DEFAULT_Y_AXIS,
        }
    }
}

/// Default horizontal axis: 0..22050 Hz
const DEFAULT_X_AXIS: AxisParameters = AxisParameters::linear_unchecked(0.0, 22050.0);

/// Default vertical axis: 0..1
const DEFAULT_Y_AXIS: AxisParameters = AxisParameters::linear_unchecked(0.0, 1.0);

impl GraphConfig {
    /// Check every field
    ///
    /// Axes are validated when built, so only the scalar fields are checked.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for a zero sample rate or block size, or a
    /// non-finite crossing threshold.
    pub fn validate(&self) -> Result<(), GraphError> {
        if self.sample_rate == 0 {
            return Err(GraphError::InvalidInput(
                "Sample rate must be > 0".to_string(),
            ));
        }
        if self.block_size == 0 {
            return Err(GraphError::InvalidInput(
                "Block size must be > 0".to_string(),
            ));
        }
        if !self.crossing_threshold.is_finite() {
            return Err(GraphError::InvalidInput(format!(
                "Crossing threshold must be finite, got {}",
                self.crossing_threshold
            )));
        }
        Ok(())
    }

    /// Graph parameters built from the configured axes
    pub fn graph_parameters(&self) -> GraphParameters {
        GraphParameters::new(self.x_axis, self.y_axis)
    }
}
