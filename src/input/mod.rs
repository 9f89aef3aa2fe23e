//! Sample-buffer producers and the listener contract
//!
//! An [`Input`] owns a buffer of the current block size and pushes it to
//! every registered [`InputListener`] synchronously. Lifecycle:
//!
//! ```text
//! Uninitialised -> Initialised -> Started <-> Stopped -> Destroyed
//! ```
//!
//! Every listener hears `on_block_size_changed` before its first
//! `on_buffer_updated`, and again whenever the block size changes.
//!
//! Producers:
//! - [`generator::SignalGenerator`]: synthetic waveform at a fixed sample rate
//! - [`stream::StreamInput`]: fed by an external device or sensor callback
//!
//! # Example
//!
//! ```
//! use std::cell::RefCell;
//! use std::rc::Rc;
//! use wavegraph_dsp::input::generator::{SignalGenerator, Waveform};
//! use wavegraph_dsp::input::Input;
//! use wavegraph_dsp::signal::SignalBufferState;
//!
//! let mut generator = SignalGenerator::new(8000, 256, Waveform::Sine, 440.0)?;
//! let state = Rc::new(RefCell::new(SignalBufferState::new()));
//! generator.add_input_listener(state.clone())?;
//!
//! generator.initialise()?;
//! generator.start()?;
//! generator.generate()?;
//! assert_eq!(state.borrow().buffer().len(), 256);
//! # Ok::<(), wavegraph_dsp::GraphError>(())
//! ```

pub mod generator;
pub mod lifecycle;
pub mod registry;
pub mod stream;
pub mod trigger;

use crate::error::GraphError;
use lifecycle::InputCore;
use registry::ListenerRegistry;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use trigger::TriggerDetection;

/// Consumer of sample buffers
pub trait InputListener {
    /// The block size changed; any buffer of the previous length is stale
    fn on_block_size_changed(&mut self, block_size: usize);

    /// A new buffer of the last announced block size is available
    ///
    /// The slice is only valid for the duration of the call.
    fn on_buffer_updated(&mut self, buffer: &[f32]);

    /// This listener was removed from its input
    fn on_removed(&mut self) {}
}

/// Listener behind a shared handle, as stored by the registry
pub type SharedListener = Rc<RefCell<dyn InputListener>>;

/// Identity of a registered listener
///
/// Ids increase with registration order and are never reused by a registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ListenerId(pub(crate) u64);

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "listener#{}", self.0)
    }
}

/// Lifecycle state of an input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputState {
    /// Constructed, buffer not yet sized or announced
    Uninitialised,
    /// Buffer sized and block size announced
    Initialised,
    /// Producing buffers
    Started,
    /// Paused; may be restarted
    Stopped,
    /// Terminal; all listeners detached
    Destroyed,
}

impl InputState {
    /// Whether buffers may be produced
    pub fn is_running(&self) -> bool {
        matches!(self, InputState::Started)
    }

    /// Whether the block size has been announced at least once
    pub fn is_initialised(&self) -> bool {
        matches!(
            self,
            InputState::Initialised | InputState::Started | InputState::Stopped
        )
    }
}

/// Sample-buffer producer capability set
///
/// Implementors hold an [`InputCore`] for the lifecycle, buffer and listener
/// bookkeeping, and supply the sample-rate policy and buffer generation.
pub trait Input {
    /// Shared lifecycle/buffer/listener state
    fn core(&self) -> &InputCore;

    /// Mutable access to the shared state
    fn core_mut(&mut self) -> &mut InputCore;

    /// Sample rate in Hz
    fn sample_rate(&self) -> u32;

    /// Change the sample rate
    ///
    /// # Errors
    ///
    /// `UnsupportedOperation` for producers with a fixed rate; callers should
    /// ignore it.
    fn set_sample_rate(&mut self, sample_rate: u32) -> Result<(), GraphError>;

    /// Current lifecycle state
    fn state(&self) -> InputState {
        self.core().state()
    }

    /// Size the buffer and announce the block size to all listeners
    fn initialise(&mut self) -> Result<(), GraphError> {
        self.core_mut().initialise()
    }

    /// Begin producing buffers
    ///
    /// # Errors
    ///
    /// `UsageError` if the input was never initialised or is destroyed.
    fn start(&mut self) -> Result<(), GraphError> {
        self.core_mut().start()
    }

    /// Pause buffer production
    fn stop(&mut self) -> Result<(), GraphError> {
        self.core_mut().stop()
    }

    /// Tear down; detaches every listener
    fn destroy(&mut self) {
        self.core_mut().destroy()
    }

    /// Current block size
    fn buffer_size(&self) -> usize {
        self.core().block_size()
    }

    /// Change the block size; re-announced before the next buffer
    fn set_buffer_size(&mut self, block_size: usize) -> Result<(), GraphError> {
        self.core_mut().set_block_size(block_size)
    }

    /// Whether this input aligns buffers to a trigger
    fn has_trigger_detection(&self) -> bool {
        self.trigger_detection().is_some()
    }

    /// Trigger configuration, if this input has one
    fn trigger_detection(&self) -> Option<&TriggerDetection> {
        None
    }

    /// Register a listener
    ///
    /// If the input is already initialised, the listener hears the current
    /// block size straight away.
    fn add_input_listener(&mut self, listener: SharedListener) -> Result<ListenerId, GraphError> {
        self.core_mut().add_listener(listener)
    }

    /// Unregister a listener; fires `on_removed` on it alone
    ///
    /// Returns `false` if the id was not registered.
    fn remove_input_listener(&mut self, id: ListenerId) -> bool {
        self.core_mut().remove_listener(id)
    }

    /// Handle to the listener registry
    ///
    /// Lets a listener detach itself (or others) from inside a notification.
    fn listener_registry(&self) -> ListenerRegistry {
        self.core().registry().clone()
    }
}
