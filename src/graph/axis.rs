//! Axis range and bidirectional scale transform
//!
//! Maps a normalized graph position in `[0, 1]` to a real-world value and
//! back, for linear and logarithmic (base 2) axes.
//!
//! # Example
//!
//! ```
//! use wavegraph_dsp::graph::axis::{AxisParameters, Scale};
//!
//! let axis = AxisParameters::new(20.0, 20480.0, Scale::Logarithmic)?;
//! let value = axis.to_scaled_value(0.5);
//! assert!((value - 640.0).abs() < 0.01);
//! assert!((axis.to_graph_position(value) - 0.5).abs() < 1e-5);
//! # Ok::<(), wavegraph_dsp::GraphError>(())
//! ```

use crate::error::GraphError;
use serde::{Deserialize, Serialize};

/// Scale kind of an axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scale {
    /// `value = minimum + position * span`
    #[default]
    Linear,
    /// `value = minimum * 2^(position * log2(maximum / minimum))`
    Logarithmic,
}

/// Range and scale of one graph axis
///
/// Invariant: `maximum > minimum`, both finite. A logarithmic axis with a
/// non-positive minimum uses an effective minimum of 1, and then also needs
/// `maximum > 1`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawAxis", into = "RawAxis")]
pub struct AxisParameters {
    minimum: f32,
    maximum: f32,
    scale: Scale,
}

impl AxisParameters {
    /// Create axis parameters, rejecting invalid ranges
    ///
    /// # Errors
    ///
    /// Returns `InvalidAxisConfiguration` if either bound is not finite, the
    /// span is not strictly positive, or a logarithmic axis has
    /// `maximum <= effective_minimum`.
    pub fn new(minimum: f32, maximum: f32, scale: Scale) -> Result<Self, GraphError> {
        validate(minimum, maximum, scale)?;
        Ok(Self {
            minimum,
            maximum,
            scale,
        })
    }

    /// Linear axis without validation, for built-in constant ranges
    pub(crate) const fn linear_unchecked(minimum: f32, maximum: f32) -> Self {
        Self {
            minimum,
            maximum,
            scale: Scale::Linear,
        }
    }

    /// Linear axis over `[minimum, maximum]`
    pub fn linear(minimum: f32, maximum: f32) -> Result<Self, GraphError> {
        Self::new(minimum, maximum, Scale::Linear)
    }

    /// Logarithmic axis over `[minimum, maximum]`
    pub fn logarithmic(minimum: f32, maximum: f32) -> Result<Self, GraphError> {
        Self::new(minimum, maximum, Scale::Logarithmic)
    }

    /// Lower bound as configured
    pub fn minimum(&self) -> f32 {
        self.minimum
    }

    /// Upper bound
    pub fn maximum(&self) -> f32 {
        self.maximum
    }

    /// Scale kind
    pub fn scale(&self) -> Scale {
        self.scale
    }

    /// `maximum - minimum`
    pub fn axis_span(&self) -> f32 {
        self.maximum - self.minimum
    }

    /// Lower bound used by the transforms
    ///
    /// Equal to `minimum`, except on a logarithmic axis whose minimum is
    /// `<= 0`, where it is 1.
    pub fn effective_minimum(&self) -> f32 {
        effective_minimum(self.minimum, self.scale)
    }

    /// Replace the range, keeping the scale
    pub fn set_range(&mut self, minimum: f32, maximum: f32) -> Result<(), GraphError> {
        validate(minimum, maximum, self.scale)?;
        log::debug!(
            "Axis range [{}, {}] -> [{}, {}]",
            self.minimum,
            self.maximum,
            minimum,
            maximum
        );
        self.minimum = minimum;
        self.maximum = maximum;
        Ok(())
    }

    /// Replace the scale, keeping the range
    pub fn set_scale(&mut self, scale: Scale) -> Result<(), GraphError> {
        validate(self.minimum, self.maximum, scale)?;
        log::debug!("Axis scale {:?} -> {:?}", self.scale, scale);
        self.scale = scale;
        Ok(())
    }

    /// Map a normalized graph position to a real-world value
    ///
    /// On a logarithmic axis a result of exactly 1 collapses to 0, so an axis
    /// whose effective minimum is 1 reads 0 at its origin. That single point
    /// does not round-trip.
    pub fn to_scaled_value(&self, graph_position: f32) -> f32 {
        match self.scale {
            Scale::Linear => self.minimum + graph_position * self.axis_span(),
            Scale::Logarithmic => {
                let eff_min = self.effective_minimum();
                let log_span = (self.maximum / eff_min).log2();
                let value = eff_min * (graph_position * log_span).exp2();
                if value == 1.0 {
                    0.0
                } else {
                    value
                }
            }
        }
    }

    /// Map a real-world value to a normalized graph position
    ///
    /// Values inside the axis range map into `[0, 1]`; values outside map
    /// proportionally outside it. On a logarithmic axis, non-positive values
    /// map to 0.
    pub fn to_graph_position(&self, value: f32) -> f32 {
        match self.scale {
            Scale::Linear => (value - self.minimum) / self.axis_span(),
            Scale::Logarithmic => {
                if value <= 0.0 {
                    return 0.0;
                }
                let eff_min = self.effective_minimum();
                let log_span = (self.maximum / eff_min).log2();
                (value / eff_min).log2() / log_span
            }
        }
    }
}

fn effective_minimum(minimum: f32, scale: Scale) -> f32 {
    match scale {
        Scale::Logarithmic if minimum <= 0.0 => 1.0,
        _ => minimum,
    }
}

fn validate(minimum: f32, maximum: f32, scale: Scale) -> Result<(), GraphError> {
    if !minimum.is_finite() || !maximum.is_finite() {
        return Err(GraphError::InvalidAxisConfiguration(format!(
            "Axis bounds must be finite, got [{}, {}]",
            minimum, maximum
        )));
    }

    if maximum <= minimum {
        return Err(GraphError::InvalidAxisConfiguration(format!(
            "Axis span must be > 0, got [{}, {}]",
            minimum, maximum
        )));
    }

    if !(maximum - minimum).is_finite() {
        return Err(GraphError::InvalidAxisConfiguration(format!(
            "Axis span overflows, got [{}, {}]",
            minimum, maximum
        )));
    }

    if scale == Scale::Logarithmic {
        let eff_min = effective_minimum(minimum, scale);
        if maximum <= eff_min {
            return Err(GraphError::InvalidAxisConfiguration(format!(
                "Logarithmic axis maximum {} must exceed effective minimum {}",
                maximum, eff_min
            )));
        }
    }

    Ok(())
}

/// Unchecked serde form, validated on the way in
#[derive(Serialize, Deserialize)]
struct RawAxis {
    minimum: f32,
    maximum: f32,
    #[serde(default)]
    scale: Scale,
}

impl TryFrom<RawAxis> for AxisParameters {
    type Error = GraphError;

    fn try_from(raw: RawAxis) -> Result<Self, Self::Error> {
        AxisParameters::new(raw.minimum, raw.maximum, raw.scale)
    }
}

impl From<AxisParameters> for RawAxis {
    fn from(axis: AxisParameters) -> Self {
        RawAxis {
            minimum: axis.minimum,
            maximum: axis.maximum,
            scale: axis.scale,
        }
    }
}
