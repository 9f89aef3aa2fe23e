//! Edge trigger detection
//!
//! Finds the sample at which a signal crosses a trigger level in a given
//! direction, so successive buffers start at the same phase and a periodic
//! waveform stands still on screen.

use crate::error::GraphError;
use serde::{Deserialize, Serialize};

/// Crossing direction that fires the trigger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Edge {
    /// Previous sample below the level, current at or above
    #[default]
    Rising,
    /// Previous sample above the level, current at or below
    Falling,
}

/// Trigger configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TriggerDetection {
    /// Trigger level
    pub level: f32,
    /// Crossing direction
    pub edge: Edge,
    /// Free-run when no trigger is found within two blocks
    pub auto: bool,
}

impl Default for TriggerDetection {
    fn default() -> Self {
        Self {
            level: 0.5,
            edge: Edge::Rising,
            auto: true,
        }
    }
}

impl TriggerDetection {
    /// Rising-edge trigger at `level` with free-running fallback
    pub fn rising(level: f32) -> Result<Self, GraphError> {
        Self::new(level, Edge::Rising, true)
    }

    /// Create a trigger
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if `level` is not finite.
    pub fn new(level: f32, edge: Edge, auto: bool) -> Result<Self, GraphError> {
        if !level.is_finite() {
            return Err(GraphError::InvalidInput(format!(
                "Trigger level must be finite, got {}",
                level
            )));
        }
        Ok(Self { level, edge, auto })
    }

    /// Whether the step `previous -> current` fires the trigger
    pub fn fires(&self, previous: f32, current: f32) -> bool {
        match self.edge {
            Edge::Rising => previous < self.level && current >= self.level,
            Edge::Falling => previous > self.level && current <= self.level,
        }
    }

    /// Index of the first sample that fires the trigger
    ///
    /// The returned index is always >= 1, since firing needs a predecessor.
    pub fn find(&self, samples: &[f32]) -> Option<usize> {
        samples
            .windows(2)
            .position(|pair| self.fires(pair[0], pair[1]))
            .map(|i| i + 1)
    }

    /// Like [`find`](Self::find), with `previous` as the sample before
    /// `samples[0]`, so an edge at index 0 can fire
    pub fn find_after(&self, previous: Option<f32>, samples: &[f32]) -> Option<usize> {
        match (previous, samples.first()) {
            (Some(previous), Some(&first)) if self.fires(previous, first) => Some(0),
            _ => self.find(samples),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rising_edge() {
        let trigger = TriggerDetection::rising(0.5).unwrap();
        let samples = [0.9, 0.6, 0.2, 0.4, 0.5, 0.8, 0.3, 0.7];
        assert_eq!(trigger.find(&samples), Some(4));
    }

    #[test]
    fn test_find_after_sees_edge_at_start() {
        let trigger = TriggerDetection::rising(0.5).unwrap();
        let samples = [0.8, 0.2, 0.9];
        assert_eq!(trigger.find(&samples), Some(2));
        assert_eq!(trigger.find_after(Some(0.1), &samples), Some(0));
        assert_eq!(trigger.find_after(Some(0.7), &samples), Some(2));
        assert_eq!(trigger.find_after(None, &samples), Some(2));
        assert_eq!(trigger.find_after(Some(0.1), &[]), None);
    }

    #[test]
    fn test_falling_edge() {
        let trigger = TriggerDetection::new(0.5, Edge::Falling, false).unwrap();
        let samples = [0.2, 0.4, 0.7, 0.9, 0.5, 0.1];
        assert_eq!(trigger.find(&samples), Some(4));
    }

    #[test]
    fn test_no_trigger() {
        let trigger = TriggerDetection::rising(0.5).unwrap();
        assert_eq!(trigger.find(&[0.6, 0.7, 0.9]), None);
        assert_eq!(trigger.find(&[0.1]), None);
        assert_eq!(trigger.find(&[]), None);
    }

    #[test]
    fn test_level_validated() {
        assert!(TriggerDetection::rising(f32::NAN).is_err());
        assert!(TriggerDetection::new(f32::INFINITY, Edge::Falling, true).is_err());
    }
}
