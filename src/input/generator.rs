//! Synthetic signal generator
//!
//! Produces a periodic waveform at a fixed sample rate, one block per
//! [`SignalGenerator::generate`] call. Output is DC-biased by default
//! (`0.5 + 0.5 * wave`), so it straddles the 0.5 crossing threshold used by
//! [`AverageFrequency`](crate::features::frequency::AverageFrequency).
//! Phase carries over between blocks.

use super::lifecycle::InputCore;
use super::Input;
use crate::error::GraphError;
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;

/// Periodic waveform shape, each in `[-1, 1]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Waveform {
    /// `sin(2π·phase)`
    #[default]
    Sine,
    /// +1 for the first half cycle, -1 for the second
    Square,
    /// Rises linearly from -1 to 1 over the cycle
    Sawtooth,
    /// -1 → 1 → -1 over the cycle
    Triangle,
}

impl Waveform {
    /// Sample value at `phase` in cycles, `[0, 1)`
    pub fn sample(&self, phase: f64) -> f32 {
        let value = match self {
            Waveform::Sine => (TAU * phase).sin(),
            Waveform::Square => {
                if phase < 0.5 {
                    1.0
                } else {
                    -1.0
                }
            }
            Waveform::Sawtooth => 2.0 * phase - 1.0,
            Waveform::Triangle => {
                if phase < 0.5 {
                    4.0 * phase - 1.0
                } else {
                    3.0 - 4.0 * phase
                }
            }
        };
        value as f32
    }
}

/// Fixed-rate synthetic producer
#[derive(Debug)]
pub struct SignalGenerator {
    core: InputCore,
    sample_rate: u32,
    waveform: Waveform,
    frequency: f32,
    amplitude: f32,
    offset: f32,
    /// Cycles, `[0, 1)`
    phase: f64,
}

impl SignalGenerator {
    /// Create a generator
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if `sample_rate` or `block_size` is 0, or the
    /// frequency is negative or not finite.
    pub fn new(
        sample_rate: u32,
        block_size: usize,
        waveform: Waveform,
        frequency: f32,
    ) -> Result<Self, GraphError> {
        if sample_rate == 0 {
            return Err(GraphError::InvalidInput(
                "Sample rate must be > 0".to_string(),
            ));
        }
        validate_frequency(frequency)?;

        Ok(Self {
            core: InputCore::new("signal generator", block_size)?,
            sample_rate,
            waveform,
            frequency,
            amplitude: 0.5,
            offset: 0.5,
            phase: 0.0,
        })
    }

    /// Waveform shape
    pub fn waveform(&self) -> Waveform {
        self.waveform
    }

    /// Change the waveform shape
    pub fn set_waveform(&mut self, waveform: Waveform) {
        self.waveform = waveform;
    }

    /// Frequency in Hz
    pub fn frequency(&self) -> f32 {
        self.frequency
    }

    /// Change the frequency; phase is preserved
    pub fn set_frequency(&mut self, frequency: f32) -> Result<(), GraphError> {
        validate_frequency(frequency)?;
        if frequency > self.sample_rate as f32 / 2.0 {
            log::warn!(
                "Generator frequency {} Hz above Nyquist ({} Hz), output will alias",
                frequency,
                self.sample_rate / 2
            );
        }
        self.frequency = frequency;
        Ok(())
    }

    /// Peak deviation from the offset
    pub fn amplitude(&self) -> f32 {
        self.amplitude
    }

    /// Set amplitude and DC offset: output is `offset + amplitude * wave`
    pub fn set_level(&mut self, amplitude: f32, offset: f32) -> Result<(), GraphError> {
        if !amplitude.is_finite() || !offset.is_finite() {
            return Err(GraphError::InvalidInput(format!(
                "Amplitude and offset must be finite, got {} and {}",
                amplitude, offset
            )));
        }
        self.amplitude = amplitude;
        self.offset = offset;
        Ok(())
    }

    /// DC offset
    pub fn offset(&self) -> f32 {
        self.offset
    }

    /// Fill the next block and deliver it to every listener
    ///
    /// # Errors
    ///
    /// Returns `UsageError` unless the generator is started.
    pub fn generate(&mut self) -> Result<(), GraphError> {
        if !self.core.state().is_running() {
            return Err(GraphError::UsageError(format!(
                "signal generator: generate() while {:?}",
                self.core.state()
            )));
        }

        let step = self.frequency as f64 / self.sample_rate as f64;
        let mut phase = self.phase;
        let (waveform, amplitude, offset) = (self.waveform, self.amplitude, self.offset);

        for sample in self.core.buffer_mut().iter_mut() {
            *sample = offset + amplitude * waveform.sample(phase);
            phase = (phase + step).fract();
        }
        self.phase = phase;

        self.core.publish()
    }
}

fn validate_frequency(frequency: f32) -> Result<(), GraphError> {
    if !frequency.is_finite() || frequency < 0.0 {
        return Err(GraphError::InvalidInput(format!(
            "Frequency must be finite and >= 0, got {}",
            frequency
        )));
    }
    Ok(())
}

impl Input for SignalGenerator {
    fn core(&self) -> &InputCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut InputCore {
        &mut self.core
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn set_sample_rate(&mut self, sample_rate: u32) -> Result<(), GraphError> {
        Err(GraphError::UnsupportedOperation(format!(
            "signal generator runs at a fixed {} Hz (requested {} Hz)",
            self.sample_rate, sample_rate
        )))
    }

    fn initialise(&mut self) -> Result<(), GraphError> {
        self.core.initialise()?;
        self.phase = 0.0;
        Ok(())
    }
}
