//! Graph coordinate math
//!
//! - Axis range and scale transforms
//! - Graph parameters (X and Y axis pair)
//! - Marker readout from touch positions

pub mod axis;
pub mod marker;

use crate::error::GraphError;
use axis::AxisParameters;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::rc::Rc;

/// Graph parameters behind a shared handle
///
/// The data owner mutates through `borrow_mut()`; every other holder sees
/// the change on its next `borrow()`.
pub type SharedGraphParameters = Rc<RefCell<GraphParameters>>;

/// X and Y axis parameters of one graph
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GraphParameters {
    /// Horizontal axis
    pub x: AxisParameters,
    /// Vertical axis
    pub y: AxisParameters,
}

impl GraphParameters {
    /// Pair two axes
    pub fn new(x: AxisParameters, y: AxisParameters) -> Self {
        Self { x, y }
    }

    /// Waveform graph: X over `[0, duration]` linear, Y over `[y_min, y_max]` linear
    pub fn waveform(duration: f32, y_min: f32, y_max: f32) -> Result<Self, GraphError> {
        Ok(Self {
            x: AxisParameters::linear(0.0, duration)?,
            y: AxisParameters::linear(y_min, y_max)?,
        })
    }

    /// Wrap in a shared handle
    pub fn shared(self) -> SharedGraphParameters {
        Rc::new(RefCell::new(self))
    }

    /// Map a normalized `(x, y)` graph position to real-world values
    pub fn to_scaled_values(&self, px: f32, py: f32) -> (f32, f32) {
        (self.x.to_scaled_value(px), self.y.to_scaled_value(py))
    }
}
