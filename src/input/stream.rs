//! Externally fed producer
//!
//! Wraps a device or sensor callback that delivers samples in chunks of
//! arbitrary size. Samples accumulate until a full block is available, then
//! the block is published. With trigger detection enabled, each block starts
//! at a trigger point.
//!
//! # Example
//!
//! ```
//! use std::cell::RefCell;
//! use std::rc::Rc;
//! use wavegraph_dsp::input::stream::StreamInput;
//! use wavegraph_dsp::input::Input;
//! use wavegraph_dsp::signal::SignalBufferState;
//!
//! let mut input = StreamInput::new(48000, 4)?;
//! let state = Rc::new(RefCell::new(SignalBufferState::new()));
//! input.add_input_listener(state.clone())?;
//! input.initialise()?;
//! input.start()?;
//!
//! // A callback delivers 6 samples: one full block goes out, 2 wait
//! assert_eq!(input.push(&[0.1, 0.2, 0.3, 0.4, 0.5, 0.6])?, 1);
//! assert_eq!(state.borrow().buffer(), &[0.1, 0.2, 0.3, 0.4]);
//! assert_eq!(input.pending(), 2);
//! # Ok::<(), wavegraph_dsp::GraphError>(())
//! ```

use super::lifecycle::InputCore;
use super::trigger::TriggerDetection;
use super::{Input, InputState};
use crate::error::GraphError;
use crate::preprocessing::channel_mixer::{downmix, ChannelMixMode};

/// Accumulates incoming samples and hands them out block by block
#[derive(Debug, Default)]
struct BlockAccumulator {
    data: Vec<f32>,
    position: usize,
    /// Last sample published or skipped, kept across pushes
    last_consumed: Option<f32>,
}

impl BlockAccumulator {
    fn push(&mut self, samples: &[f32]) {
        if self.position > 0 {
            self.data.drain(..self.position);
            self.position = 0;
        }
        self.data.extend_from_slice(samples);
    }

    fn available(&self) -> usize {
        self.data.len() - self.position
    }

    fn remaining(&self) -> &[f32] {
        &self.data[self.position..]
    }

    fn skip(&mut self, count: usize) {
        let next = (self.position + count).min(self.data.len());
        if next > self.position {
            self.last_consumed = Some(self.data[next - 1]);
        }
        self.position = next;
    }

    fn last_consumed(&self) -> Option<f32> {
        self.last_consumed
    }

    /// Next `size` samples, advancing past them
    fn next_block(&mut self, size: usize) -> Option<&[f32]> {
        if self.available() < size {
            return None;
        }
        let start = self.position;
        self.position += size;
        if size > 0 {
            self.last_consumed = Some(self.data[start + size - 1]);
        }
        Some(&self.data[start..start + size])
    }

    fn clear(&mut self) {
        self.data.clear();
        self.position = 0;
        self.last_consumed = None;
    }
}

/// Producer fed by an external callback
#[derive(Debug)]
pub struct StreamInput {
    core: InputCore,
    sample_rate: u32,
    trigger: Option<TriggerDetection>,
    pending: BlockAccumulator,
}

impl StreamInput {
    /// Create an input at `sample_rate` publishing `block_size`-sample buffers
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if `sample_rate` or `block_size` is 0.
    pub fn new(sample_rate: u32, block_size: usize) -> Result<Self, GraphError> {
        if sample_rate == 0 {
            return Err(GraphError::InvalidInput(
                "Sample rate must be > 0".to_string(),
            ));
        }

        Ok(Self {
            core: InputCore::new("stream input", block_size)?,
            sample_rate,
            trigger: None,
            pending: BlockAccumulator::default(),
        })
    }

    /// Align published blocks to `trigger`
    pub fn with_trigger_detection(mut self, trigger: TriggerDetection) -> Self {
        self.trigger = Some(trigger);
        self
    }

    /// Enable, change or disable trigger alignment
    pub fn set_trigger_detection(&mut self, trigger: Option<TriggerDetection>) {
        log::debug!("stream input: trigger {:?}", trigger);
        self.trigger = trigger;
    }

    /// Samples received but not yet published
    pub fn pending(&self) -> usize {
        self.pending.available()
    }

    /// Feed mono samples; returns the number of blocks published
    ///
    /// While initialised or stopped, samples are discarded.
    ///
    /// # Errors
    ///
    /// Returns `UsageError` before `initialise()` or after `destroy()`.
    pub fn push(&mut self, samples: &[f32]) -> Result<usize, GraphError> {
        match self.core.state() {
            InputState::Started => {}
            InputState::Initialised | InputState::Stopped => {
                log::debug!("stream input: not started, dropped {} samples", samples.len());
                return Ok(0);
            }
            state => {
                return Err(GraphError::UsageError(format!(
                    "stream input: push() while {:?}",
                    state
                )));
            }
        }

        self.pending.push(samples);

        let mut published = 0;
        while self.publish_next()? {
            published += 1;
        }
        Ok(published)
    }

    /// Feed interleaved multi-channel samples, downmixed to mono first
    pub fn push_interleaved(
        &mut self,
        interleaved: &[f32],
        channels: usize,
        mode: ChannelMixMode,
    ) -> Result<usize, GraphError> {
        let mono = downmix(interleaved, channels, mode)?;
        self.push(&mono)
    }

    /// Publish one block if enough samples are pending
    fn publish_next(&mut self) -> Result<bool, GraphError> {
        let block_size = self.core.block_size();
        let available = self.pending.available();
        if available < block_size {
            return Ok(false);
        }

        if let Some(trigger) = self.trigger {
            // Trigger index i must leave a whole block at i; the last consumed
            // sample is the predecessor of index 0
            let search = &self.pending.remaining()[..available - block_size + 1];
            match trigger.find_after(self.pending.last_consumed(), search) {
                Some(index) => self.pending.skip(index),
                None if available >= 2 * block_size => {
                    if !trigger.auto {
                        // Keep the tail: a trigger may straddle the next chunk
                        self.pending.skip(available - block_size);
                        log::debug!(
                            "stream input: no trigger, discarded {} samples",
                            available - block_size
                        );
                        return Ok(false);
                    }
                    log::debug!("stream input: no trigger within two blocks, free-running");
                }
                None => return Ok(false),
            }
        }

        let block = match self.pending.next_block(block_size) {
            Some(block) => block,
            None => return Ok(false),
        };
        self.core.buffer_mut().copy_from_slice(block);
        self.core.publish()?;
        Ok(true)
    }
}

impl Input for StreamInput {
    fn core(&self) -> &InputCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut InputCore {
        &mut self.core
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Change the sample rate; pending samples at the old rate are dropped
    fn set_sample_rate(&mut self, sample_rate: u32) -> Result<(), GraphError> {
        if sample_rate == 0 {
            return Err(GraphError::InvalidInput(
                "Sample rate must be > 0".to_string(),
            ));
        }
        if self.core.state() == InputState::Destroyed {
            return Err(GraphError::UsageError(
                "stream input: set_sample_rate() after destroy()".to_string(),
            ));
        }
        if sample_rate != self.sample_rate {
            log::debug!(
                "stream input: sample rate {} -> {} Hz, dropped {} pending samples",
                self.sample_rate,
                sample_rate,
                self.pending.available()
            );
            self.pending.clear();
            self.sample_rate = sample_rate;
        }
        Ok(())
    }

    fn trigger_detection(&self) -> Option<&TriggerDetection> {
        self.trigger.as_ref()
    }

    fn destroy(&mut self) {
        self.pending.clear();
        self.core.destroy();
    }
}
