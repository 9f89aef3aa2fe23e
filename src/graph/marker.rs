//! Marker readout: touch position to real-world values
//!
//! Touch coordinates are normalized graph space: `px` runs left to right
//! and `py` runs **bottom to top**, both in `[0, 1]`. Callers working in
//! screen space (Y growing downwards) flip once with `1 - y` before calling.
//!
//! Mapping:
//!
//! ```text
//! x  = x_axis.to_scaled_value(px)                     // no zoom/offset on X
//! y' = py * zoom_level_percentage + display_offset_percentage
//! y  = y_axis.to_scaled_value(y')                     // minimum + y' * span when linear
//! ```
//!
//! `y'` is not inverted: the bottom of the view reads the display offset.
//!
//! # Example
//!
//! ```
//! use wavegraph_dsp::graph::GraphParameters;
//! use wavegraph_dsp::graph::marker::MarkerPosition;
//! use wavegraph_dsp::signal::SignalBufferState;
//!
//! let graph = GraphParameters::waveform(1.0, -1.0, 1.0)?;
//! let mut state = SignalBufferState::new();
//! state.set_view(0.5, 0.5)?; // top half of the range
//!
//! let marker = MarkerPosition::new(0xFFFF0000).locate(0.25, 0.5, &state, &graph);
//! assert_eq!(marker.x_value, 0.25);
//! assert_eq!(marker.y_value, 0.5);
//! # Ok::<(), wavegraph_dsp::GraphError>(())
//! ```

use super::GraphParameters;
use crate::signal::SignalBufferState;

/// Display-only readout at a touch position
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Marker {
    /// Real-world X value
    pub x_value: f32,
    /// Real-world Y value
    pub y_value: f32,
    /// ARGB colour
    pub color: u32,
    /// Format X as an integer
    pub is_integer_x: bool,
    /// Format Y as an integer
    pub is_integer_y: bool,
}

/// Y position after zoom and offset: `py * zoom + offset`
pub fn zoomed_graph_y(py: f32, state: &SignalBufferState) -> f32 {
    py * state.zoom_level_percentage() + state.display_offset_percentage()
}

/// Marker placement and appearance
///
/// Holds the last touch position so the readout can be recomputed on every
/// buffer, zoom or axis change.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerPosition {
    color: u32,
    is_integer_x: bool,
    is_integer_y: bool,
    position: Option<(f32, f32)>,
}

impl MarkerPosition {
    /// Marker with the given ARGB colour and fractional readouts
    pub fn new(color: u32) -> Self {
        Self {
            color,
            is_integer_x: false,
            is_integer_y: false,
            position: None,
        }
    }

    /// Flag the X readout for integer formatting
    pub fn with_integer_x(mut self, is_integer: bool) -> Self {
        self.is_integer_x = is_integer;
        self
    }

    /// Flag the Y readout for integer formatting
    pub fn with_integer_y(mut self, is_integer: bool) -> Self {
        self.is_integer_y = is_integer;
        self
    }

    /// Marker colour
    pub fn color(&self) -> u32 {
        self.color
    }

    /// Move the marker; coordinates are clamped to `[0, 1]`
    ///
    /// Non-finite coordinates are ignored.
    pub fn set_position(&mut self, px: f32, py: f32) {
        if !px.is_finite() || !py.is_finite() {
            log::warn!("Ignoring non-finite marker position ({}, {})", px, py);
            return;
        }
        self.position = Some((px.clamp(0.0, 1.0), py.clamp(0.0, 1.0)));
    }

    /// Last position set, if any
    pub fn position(&self) -> Option<(f32, f32)> {
        self.position
    }

    /// Hide the marker
    pub fn clear(&mut self) {
        self.position = None;
    }

    /// Readout at the stored position, if one is set
    pub fn marker(&self, state: &SignalBufferState, graph: &GraphParameters) -> Option<Marker> {
        self.position
            .map(|(px, py)| self.locate(px, py, state, graph))
    }

    /// Readout at an explicit position, without storing it
    pub fn locate(
        &self,
        px: f32,
        py: f32,
        state: &SignalBufferState,
        graph: &GraphParameters,
    ) -> Marker {
        let y = zoomed_graph_y(py, state);
        Marker {
            x_value: graph.x.to_scaled_value(px),
            y_value: graph.y.to_scaled_value(y),
            color: self.color,
            is_integer_x: self.is_integer_x,
            is_integer_y: self.is_integer_y,
        }
    }
}
