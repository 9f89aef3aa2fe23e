//! Lifecycle state machine, buffer ownership and block-size announcements
//!
//! [`InputCore`] is the bookkeeping every producer shares. It enforces:
//! - `start()` only after `initialise()`
//! - the block size is announced to every listener before the first buffer
//!   and again before the first buffer after a size change
//! - published buffers always have the announced length
//! - destroyed inputs deliver nothing further

use super::registry::ListenerRegistry;
use super::{InputState, ListenerId, SharedListener};
use crate::error::GraphError;

/// Shared producer state
#[derive(Debug)]
pub struct InputCore {
    label: &'static str,
    state: InputState,
    buffer: Vec<f32>,
    block_size: usize,
    /// Size changed since the last announcement
    size_pending: bool,
    registry: ListenerRegistry,
}

impl InputCore {
    /// Create a core for a producer named `label` (used in log output)
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if `block_size` is 0.
    pub fn new(label: &'static str, block_size: usize) -> Result<Self, GraphError> {
        if block_size == 0 {
            return Err(GraphError::InvalidInput(
                "Block size must be > 0".to_string(),
            ));
        }

        Ok(Self {
            label,
            state: InputState::Uninitialised,
            buffer: Vec::new(),
            block_size,
            size_pending: true,
            registry: ListenerRegistry::new(),
        })
    }

    /// Current lifecycle state
    pub fn state(&self) -> InputState {
        self.state
    }

    /// Current block size
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// The buffer as last published (or being filled)
    pub fn buffer(&self) -> &[f32] {
        &self.buffer
    }

    /// Fill access to the buffer; its length cannot change here
    pub fn buffer_mut(&mut self) -> &mut [f32] {
        &mut self.buffer
    }

    /// Listener registry
    pub fn registry(&self) -> &ListenerRegistry {
        &self.registry
    }

    /// Size the buffer and announce the block size
    ///
    /// Allowed from `Uninitialised`, `Initialised` and `Stopped`.
    pub fn initialise(&mut self) -> Result<(), GraphError> {
        match self.state {
            InputState::Started => {
                return Err(self.usage("initialise() while started; stop() first"));
            }
            InputState::Destroyed => {
                return Err(self.usage("initialise() after destroy()"));
            }
            _ => {}
        }

        log::debug!("{}: initialising with block size {}", self.label, self.block_size);
        self.buffer.clear();
        self.buffer.resize(self.block_size, 0.0);
        self.state = InputState::Initialised;
        self.announce();
        Ok(())
    }

    /// `Initialised | Stopped -> Started`
    pub fn start(&mut self) -> Result<(), GraphError> {
        match self.state {
            InputState::Initialised | InputState::Stopped => {
                log::debug!("{}: started", self.label);
                self.state = InputState::Started;
                Ok(())
            }
            InputState::Started => Ok(()),
            InputState::Uninitialised => Err(self.usage("start() before initialise()")),
            InputState::Destroyed => Err(self.usage("start() after destroy()")),
        }
    }

    /// `Started -> Stopped`; a no-op when not running
    pub fn stop(&mut self) -> Result<(), GraphError> {
        match self.state {
            InputState::Started => {
                log::debug!("{}: stopped", self.label);
                self.state = InputState::Stopped;
                Ok(())
            }
            InputState::Initialised | InputState::Stopped => Ok(()),
            InputState::Uninitialised => Err(self.usage("stop() before initialise()")),
            InputState::Destroyed => Err(self.usage("stop() after destroy()")),
        }
    }

    /// Enter the terminal state, detaching every listener
    pub fn destroy(&mut self) {
        if self.state == InputState::Destroyed {
            return;
        }
        let detached = self.registry.clear();
        log::debug!("{}: destroyed, detached {} listeners", self.label, detached);
        self.buffer = Vec::new();
        self.state = InputState::Destroyed;
    }

    /// Change the block size
    ///
    /// Once initialised, listeners hear the new size immediately, before any
    /// buffer of that size.
    pub fn set_block_size(&mut self, block_size: usize) -> Result<(), GraphError> {
        if block_size == 0 {
            return Err(GraphError::InvalidInput(
                "Block size must be > 0".to_string(),
            ));
        }
        if self.state == InputState::Destroyed {
            return Err(self.usage("set_buffer_size() after destroy()"));
        }
        if block_size == self.block_size {
            return Ok(());
        }

        log::debug!(
            "{}: block size {} -> {}",
            self.label,
            self.block_size,
            block_size
        );
        self.block_size = block_size;
        self.size_pending = true;

        if self.state.is_initialised() {
            self.buffer.resize(block_size, 0.0);
            self.announce();
        }
        Ok(())
    }

    /// Register a listener
    pub fn add_listener(&mut self, listener: SharedListener) -> Result<ListenerId, GraphError> {
        if self.state == InputState::Destroyed {
            return Err(self.usage("add_input_listener() after destroy()"));
        }

        if self.state.is_initialised() {
            match listener.try_borrow_mut() {
                Ok(mut l) => l.on_block_size_changed(self.block_size),
                Err(_) => log::warn!(
                    "{}: listener busy, block size {} not announced on registration",
                    self.label,
                    self.block_size
                ),
            }
        }

        Ok(self.registry.add(listener))
    }

    /// Unregister a listener
    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        self.registry.remove(id)
    }

    /// Deliver the current buffer to every listener
    ///
    /// # Errors
    ///
    /// Returns `UsageError` unless the input is started.
    pub fn publish(&mut self) -> Result<(), GraphError> {
        if !self.state.is_running() {
            return Err(self.usage("buffer published while not started"));
        }
        if self.size_pending {
            self.announce();
        }
        debug_assert_eq!(self.buffer.len(), self.block_size);

        self.registry.notify_buffer(&self.buffer);
        Ok(())
    }

    fn announce(&mut self) {
        self.registry.notify_block_size(self.block_size);
        self.size_pending = false;
    }

    fn usage(&self, what: &str) -> GraphError {
        GraphError::UsageError(format!("{}: {} (state {:?})", self.label, what, self.state))
    }
}
