//! # Wavegraph DSP
//!
//! Signal-buffer pipeline behind live waveform and spectrum graphs: inputs
//! produce fixed-size sample buffers, listeners consume them, and axis
//! transforms turn graph positions into real-world values.
//!
//! ## Features
//!
//! - **Inputs**: lifecycle-managed producers ([`SignalGenerator`], [`StreamInput`])
//!   with listener registration safe against removal during notification
//! - **Windows**: Hann, Gauss, Weedon-Gauss and Blackman-Harris tapering
//! - **Frequency**: zero-crossing average frequency estimate
//! - **Spectrum**: windowed magnitude spectrum via rustfft
//! - **Axes**: linear and logarithmic position ↔ value transforms
//! - **Markers**: touch position to (x, y) readout under zoom and offset
//!
//! ## Quick Start
//!
//! ```
//! use wavegraph_dsp::{analyze_signal, GraphConfig};
//!
//! // Two seconds of a 40 Hz square wave sampled at 8 kHz, 0/1 levels
//! let samples: Vec<f32> = (0..16000)
//!     .map(|i| if (i / 100) % 2 == 0 { 1.0 } else { 0.0 })
//!     .collect();
//!
//! let config = GraphConfig { sample_rate: 8000, block_size: 800, ..GraphConfig::default() };
//! let results = analyze_signal(&samples, &config)?;
//!
//! assert_eq!(results.len(), 20);
//! assert_eq!(results[0].frequency_hz, 80);
//! # Ok::<(), wavegraph_dsp::GraphError>(())
//! ```
//!
//! ## Architecture
//!
//! ```text
//! Input (generator / stream) → ListenerRegistry → SignalBufferState / SignalAnalyzer
//!                                                          ↓
//!                                   GraphParameters + MarkerPosition → readout
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod analysis;
pub mod config;
pub mod error;
pub mod features;
pub mod graph;
pub mod input;
pub mod preprocessing;
pub mod signal;

use std::cell::RefCell;
use std::rc::Rc;

// Re-export main types
pub use analysis::result::BufferAnalysis;
pub use analysis::SignalAnalyzer;
pub use config::GraphConfig;
pub use error::GraphError;
pub use features::frequency::AverageFrequency;
pub use features::window::Window;
pub use graph::axis::{AxisParameters, Scale};
pub use graph::marker::{Marker, MarkerPosition};
pub use graph::{GraphParameters, SharedGraphParameters};
pub use input::generator::{SignalGenerator, Waveform};
pub use input::stream::StreamInput;
pub use input::trigger::{Edge, TriggerDetection};
pub use input::{Input, InputListener, InputState, ListenerId, SharedListener};
pub use signal::SignalBufferState;

/// Analyse a recorded signal block by block
///
/// Feeds `samples` through a [`StreamInput`] into a [`SignalAnalyzer`], the
/// same path live samples take, and collects one result per complete block.
/// A trailing partial block is not analysed.
///
/// # Arguments
///
/// * `samples` - Mono samples
/// * `config` - Sample rate, block size and analysis settings
///
/// # Returns
///
/// One [`BufferAnalysis`] per published block, in order
///
/// # Errors
///
/// Returns `InvalidInput` for an invalid configuration or an empty signal.
pub fn analyze_signal(
    samples: &[f32],
    config: &GraphConfig,
) -> Result<Vec<BufferAnalysis>, GraphError> {
    config.validate()?;
    log::debug!(
        "Analysing {} samples at {} Hz in blocks of {}",
        samples.len(),
        config.sample_rate,
        config.block_size
    );

    if samples.is_empty() {
        return Err(GraphError::InvalidInput("Empty signal".to_string()));
    }

    let collector = Rc::new(RefCell::new(Collector {
        analyzer: SignalAnalyzer::new(config)?,
        results: Vec::new(),
    }));

    let mut input = StreamInput::new(config.sample_rate, config.block_size)?;
    input.add_input_listener(collector.clone())?;
    input.initialise()?;
    input.start()?;
    let published = input.push(samples)?;
    input.destroy();

    let results = std::mem::take(&mut collector.borrow_mut().results);
    log::debug!("Analysed {} blocks", published);
    Ok(results)
}

/// Analyzer wrapper keeping every result rather than the latest
struct Collector {
    analyzer: SignalAnalyzer,
    results: Vec<BufferAnalysis>,
}

impl InputListener for Collector {
    fn on_block_size_changed(&mut self, block_size: usize) {
        self.analyzer.on_block_size_changed(block_size);
    }

    fn on_buffer_updated(&mut self, buffer: &[f32]) {
        let before = self.analyzer.buffers_analyzed();
        self.analyzer.on_buffer_updated(buffer);
        if self.analyzer.buffers_analyzed() == before {
            return;
        }
        if let Some(analysis) = self.analyzer.latest() {
            self.results.push(analysis.clone());
        }
    }

    fn on_removed(&mut self) {
        self.analyzer.on_removed();
    }
}
