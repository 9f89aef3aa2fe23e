//! Buffer consumer: view state, frequency estimate and spectrum
//!
//! [`SignalAnalyzer`] is the listener at the end of the pipeline. For every
//! buffer it:
//! - keeps a copy in its [`SignalBufferState`] for display
//! - estimates the frequency from the raw samples (zero crossings)
//! - optionally computes the magnitude spectrum of a windowed copy
//!
//! # Example
//!
//! ```
//! use std::cell::RefCell;
//! use std::rc::Rc;
//! use wavegraph_dsp::analysis::SignalAnalyzer;
//! use wavegraph_dsp::input::generator::{SignalGenerator, Waveform};
//! use wavegraph_dsp::input::Input;
//! use wavegraph_dsp::GraphConfig;
//!
//! let config = GraphConfig { sample_rate: 8000, block_size: 1000, ..GraphConfig::default() };
//! let analyzer = Rc::new(RefCell::new(SignalAnalyzer::new(&config)?));
//!
//! let mut generator = SignalGenerator::new(8000, 1000, Waveform::Square, 40.0)?;
//! generator.add_input_listener(analyzer.clone())?;
//! generator.initialise()?;
//! generator.start()?;
//! generator.generate()?;
//!
//! assert_eq!(analyzer.borrow().latest().map(|a| a.frequency_hz), Some(80));
//! # Ok::<(), wavegraph_dsp::GraphError>(())
//! ```

pub mod result;

use crate::config::GraphConfig;
use crate::error::GraphError;
use crate::features::frequency::AverageFrequency;
use crate::features::spectrum::{bin_frequency, magnitude_spectrum, peak_bin};
use crate::features::window::Window;
use crate::input::InputListener;
use crate::signal::SignalBufferState;
use result::BufferAnalysis;

/// Listener that analyses every buffer it receives
#[derive(Debug, Clone)]
pub struct SignalAnalyzer {
    state: SignalBufferState,
    window: Option<Window>,
    frequency: AverageFrequency,
    compute_spectrum: bool,
    spectrum: Vec<f32>,
    latest: Option<BufferAnalysis>,
    buffers_analyzed: u64,
}

impl SignalAnalyzer {
    /// Create an analyzer from a configuration
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if the configuration does not validate.
    pub fn new(config: &GraphConfig) -> Result<Self, GraphError> {
        config.validate()?;
        log::debug!(
            "Creating analyzer: {} Hz, window={:?}, threshold={}, spectrum={}",
            config.sample_rate,
            config.window,
            config.crossing_threshold,
            config.compute_spectrum
        );

        Ok(Self {
            state: SignalBufferState::new(),
            window: config.window,
            frequency: AverageFrequency::new(config.sample_rate)
                .with_threshold(config.crossing_threshold),
            compute_spectrum: config.compute_spectrum,
            spectrum: Vec::new(),
            latest: None,
            buffers_analyzed: 0,
        })
    }

    /// Buffer and view state
    pub fn state(&self) -> &SignalBufferState {
        &self.state
    }

    /// Mutable buffer and view state (zoom, offset)
    pub fn state_mut(&mut self) -> &mut SignalBufferState {
        &mut self.state
    }

    /// Window applied before the spectrum
    pub fn window(&self) -> Option<Window> {
        self.window
    }

    /// Change the spectrum window; applies from the next buffer
    pub fn set_window(&mut self, window: Option<Window>) {
        log::debug!("Analyzer window {:?} -> {:?}", self.window, window);
        self.window = window;
    }

    /// Sample rate used for frequency estimates
    pub fn sample_rate(&self) -> u32 {
        self.frequency.sample_rate()
    }

    /// Follow a sample-rate change of the input
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for a zero rate; the current rate is kept.
    pub fn set_sample_rate(&mut self, sample_rate: u32) -> Result<(), GraphError> {
        if sample_rate == 0 {
            return Err(GraphError::InvalidInput(
                "Sample rate must be > 0".to_string(),
            ));
        }
        self.frequency.set_sample_rate(sample_rate);
        Ok(())
    }

    /// Frequency estimator and its last estimate
    pub fn frequency(&self) -> &AverageFrequency {
        &self.frequency
    }

    /// Magnitude spectrum of the last analysed buffer (empty if disabled)
    pub fn spectrum(&self) -> &[f32] {
        &self.spectrum
    }

    /// Result for the last analysed buffer
    pub fn latest(&self) -> Option<&BufferAnalysis> {
        self.latest.as_ref()
    }

    /// Number of buffers analysed so far
    pub fn buffers_analyzed(&self) -> u64 {
        self.buffers_analyzed
    }

    /// Analyse one buffer
    ///
    /// Degenerate buffers do not fail: the previous frequency estimate is
    /// carried forward and flagged in the result.
    pub fn analyze(&mut self, buffer: &[f32]) -> BufferAnalysis {
        let (frequency_hz, frequency_is_fallback) = match self.frequency.calculate(buffer) {
            Ok(frequency) => (frequency, false),
            Err(e) => {
                log::warn!(
                    "{}; reporting previous estimate of {} Hz",
                    e,
                    self.frequency.last_frequency()
                );
                (self.frequency.last_frequency(), true)
            }
        };

        self.spectrum.clear();
        let mut peak_frequency_hz = None;
        if self.compute_spectrum {
            match magnitude_spectrum(buffer, self.window) {
                Ok(spectrum) => {
                    peak_frequency_hz = peak_bin(&spectrum)
                        .map(|bin| bin_frequency(bin, buffer.len(), self.sample_rate()));
                    self.spectrum = spectrum;
                }
                Err(e) => log::warn!("Skipping spectrum: {}", e),
            }
        }

        let (minimum, maximum) = buffer
            .iter()
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &s| {
                (lo.min(s), hi.max(s))
            });
        let (minimum, maximum) = if buffer.is_empty() {
            (0.0, 0.0)
        } else {
            (minimum, maximum)
        };

        let analysis = BufferAnalysis {
            block_size: buffer.len(),
            frequency_hz,
            frequency_is_fallback,
            peak_frequency_hz,
            window: self.window,
            minimum,
            maximum,
        };
        self.buffers_analyzed += 1;
        self.latest = Some(analysis.clone());
        analysis
    }
}

impl InputListener for SignalAnalyzer {
    fn on_block_size_changed(&mut self, block_size: usize) {
        log::debug!("Analyzer block size -> {}", block_size);
        self.state.on_block_size_changed(block_size);
        self.spectrum.clear();
        self.latest = None;
    }

    fn on_buffer_updated(&mut self, buffer: &[f32]) {
        self.state.on_buffer_updated(buffer);
        // The state rejects buffers that do not match the announced size
        if self.state.buffer().len() != buffer.len() {
            return;
        }
        self.analyze(buffer);
    }

    fn on_removed(&mut self) {
        self.state.on_removed();
        self.spectrum.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(sample_rate: u32) -> GraphConfig {
        GraphConfig {
            sample_rate,
            block_size: 800,
            ..GraphConfig::default()
        }
    }

    fn square(n: usize, half_period: usize) -> Vec<f32> {
        (0..n)
            .map(|i| if (i / half_period) % 2 == 0 { 1.0 } else { 0.0 })
            .collect()
    }

    #[test]
    fn test_rejects_invalid_config() {
        let bad = GraphConfig {
            block_size: 0,
            ..GraphConfig::default()
        };
        assert!(SignalAnalyzer::new(&bad).is_err());
    }

    #[test]
    fn test_analyze_square_wave() {
        let mut analyzer = SignalAnalyzer::new(&config(8000)).unwrap();
        let analysis = analyzer.analyze(&square(800, 100));

        assert_eq!(analysis.frequency_hz, 80);
        assert!(!analysis.frequency_is_fallback);
        assert_eq!(analysis.block_size, 800);
        assert_eq!(analysis.window, Some(Window::Hann));
        assert_eq!(analysis.peak_to_peak(), 1.0);
        // 40 Hz fundamental: 4 cycles in 800 samples, bin 4 at 10 Hz spacing
        assert_eq!(analysis.peak_frequency_hz, Some(40.0));
        assert_eq!(analyzer.spectrum().len(), 401);
    }

    #[test]
    fn test_degenerate_buffer_carries_estimate() {
        let mut analyzer = SignalAnalyzer::new(&config(8000)).unwrap();
        analyzer.analyze(&square(800, 100));

        let analysis = analyzer.analyze(&vec![0.2; 800]);
        assert_eq!(analysis.frequency_hz, 80);
        assert!(analysis.frequency_is_fallback);
        assert_eq!(analyzer.buffers_analyzed(), 2);
    }

    #[test]
    fn test_spectrum_disabled() {
        let mut analyzer = SignalAnalyzer::new(&GraphConfig {
            compute_spectrum: false,
            ..config(8000)
        })
        .unwrap();
        let analysis = analyzer.analyze(&square(800, 100));
        assert!(analysis.peak_frequency_hz.is_none());
        assert!(analyzer.spectrum().is_empty());
    }

    #[test]
    fn test_listener_callbacks() {
        let mut analyzer = SignalAnalyzer::new(&config(8000)).unwrap();
        analyzer.on_block_size_changed(800);
        analyzer.on_buffer_updated(&square(800, 100));
        assert_eq!(analyzer.state().buffer().len(), 800);
        assert_eq!(analyzer.latest().unwrap().frequency_hz, 80);

        // Wrong length: ignored, nothing analysed
        analyzer.on_buffer_updated(&square(400, 100));
        assert_eq!(analyzer.buffers_analyzed(), 1);

        analyzer.on_block_size_changed(400);
        assert!(analyzer.latest().is_none());
        assert!(analyzer.spectrum().is_empty());

        analyzer.on_removed();
        assert!(analyzer.state().buffer().is_empty());
    }

    #[test]
    fn test_sample_rate_change() {
        let mut analyzer = SignalAnalyzer::new(&config(8000)).unwrap();
        assert!(analyzer.set_sample_rate(0).is_err());
        assert_eq!(analyzer.sample_rate(), 8000);

        analyzer.set_sample_rate(16000).unwrap();
        assert_eq!(analyzer.analyze(&square(800, 100)).frequency_hz, 160);
    }
}
