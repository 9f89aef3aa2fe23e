//! Zero-crossing average frequency estimation
//!
//! Estimates the dominant frequency of a buffer from the rate at which the
//! signal crosses a threshold. Signals are DC-biased: the default threshold
//! is 0.5, not 0.
//!
//! Algorithm:
//! 1. Find the first index where consecutive samples fall on opposite sides
//!    of the threshold (first crossing)
//! 2. Count every later crossing up to the end of the buffer, remembering the
//!    index of the last one
//! 3. `frequency = crossings * sample_rate / (last - first)`
//!
//! The estimate is the crossing rate over the measured span, so a threshold
//! flip every `p` samples reads as `sample_rate / p`.
//!
//! # Example
//!
//! ```
//! use wavegraph_dsp::features::frequency::AverageFrequency;
//!
//! // Flip across 0.5 every 100 samples
//! let samples: Vec<f32> = (0..1000)
//!     .map(|i| if (i / 100) % 2 == 0 { 1.0 } else { -1.0 })
//!     .collect();
//!
//! let mut estimator = AverageFrequency::new(8000);
//! assert_eq!(estimator.calculate(&samples)?, 80);
//! # Ok::<(), wavegraph_dsp::GraphError>(())
//! ```

use crate::error::GraphError;

/// Default crossing threshold for DC-biased signals
pub const DEFAULT_CROSSING_THRESHOLD: f32 = 0.5;

/// Result of a crossing scan over one buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrossingScan {
    /// Index of the first crossing (0 when none was found)
    pub first_index: usize,
    /// Index of the last crossing after the first (`sample_rate` when none was found)
    pub last_index: usize,
    /// Number of crossings after the first one
    pub crossings: usize,
}

/// Zero-crossing frequency estimator
///
/// Keeps the previous estimate so degenerate buffers (silence, DC, a single
/// crossing) can fall back to it.
#[derive(Debug, Clone)]
pub struct AverageFrequency {
    sample_rate: u32,
    threshold: f32,
    last_frequency: u32,
}

impl AverageFrequency {
    /// Create an estimator for the given sample rate with the default 0.5 threshold
    pub fn new(sample_rate: u32) -> Self {
        Self {
            sample_rate,
            threshold: DEFAULT_CROSSING_THRESHOLD,
            last_frequency: 0,
        }
    }

    /// Use a different crossing threshold
    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = threshold;
        self
    }

    /// Sample rate in Hz
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Change the sample rate; applies from the next calculation
    pub fn set_sample_rate(&mut self, sample_rate: u32) {
        log::debug!(
            "Average frequency sample rate {} -> {} Hz",
            self.sample_rate,
            sample_rate
        );
        self.sample_rate = sample_rate;
    }

    /// Crossing threshold
    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Most recent successful estimate in Hz (0 before the first one)
    pub fn last_frequency(&self) -> u32 {
        self.last_frequency
    }

    /// Scan `samples` for threshold crossings
    pub fn scan(&self, samples: &[f32]) -> CrossingScan {
        let threshold = self.threshold;
        let above = |s: f32| s > threshold;
        let flips_at = |i: usize| above(samples[i - 1]) != above(samples[i]);

        let mut scan = CrossingScan {
            first_index: 0,
            last_index: self.sample_rate as usize,
            crossings: 0,
        };

        let first = match (1..samples.len()).find(|&i| flips_at(i)) {
            Some(i) => i,
            None => return scan,
        };
        scan.first_index = first;

        for i in (first + 1)..samples.len() {
            if flips_at(i) {
                scan.crossings += 1;
                scan.last_index = i;
            }
        }

        scan
    }

    /// Estimate the frequency of `samples` in Hz
    ///
    /// # Errors
    ///
    /// - `InvalidInput` if the sample rate is 0
    /// - `DegenerateSignal` if fewer than two crossings were found or the
    ///   measured span is empty; the previous estimate is kept
    pub fn calculate(&mut self, samples: &[f32]) -> Result<u32, GraphError> {
        if self.sample_rate == 0 {
            return Err(GraphError::InvalidInput(
                "Sample rate must be > 0".to_string(),
            ));
        }

        let scan = self.scan(samples);
        log::debug!(
            "Zero-crossing scan over {} samples: first={}, last={}, crossings={}",
            samples.len(),
            scan.first_index,
            scan.last_index,
            scan.crossings
        );

        if scan.crossings == 0 {
            return Err(GraphError::DegenerateSignal(format!(
                "No crossings of {:.3} after the first in {} samples",
                self.threshold,
                samples.len()
            )));
        }

        let span = scan.last_index as i64 - scan.first_index as i64;
        if span <= 0 {
            return Err(GraphError::DegenerateSignal(format!(
                "Empty crossing span ({}..{})",
                scan.first_index, scan.last_index
            )));
        }

        let frequency = scan.crossings as f64 * self.sample_rate as f64 / span as f64;
        if !frequency.is_finite() {
            return Err(GraphError::DegenerateSignal(
                "Non-finite frequency estimate".to_string(),
            ));
        }

        let frequency = frequency.round() as u32;
        self.last_frequency = frequency;
        Ok(frequency)
    }

    /// Estimate the frequency, falling back to the previous estimate
    ///
    /// Never fails: degenerate buffers and a zero sample rate return
    /// `last_frequency()` unchanged.
    pub fn update(&mut self, samples: &[f32]) -> u32 {
        match self.calculate(samples) {
            Ok(frequency) => frequency,
            Err(e) => {
                log::warn!(
                    "{}; keeping previous estimate of {} Hz",
                    e,
                    self.last_frequency
                );
                self.last_frequency
            }
        }
    }
}
