//! Listener registry with snapshot-then-notify delivery
//!
//! Notification walks a snapshot of the registered listeners, re-checking
//! membership before each call. A listener removed mid-notification (by
//! itself or by another listener) is never called again, and no other
//! listener is skipped or called twice.

use super::{InputListener, ListenerId, SharedListener};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

#[derive(Default)]
struct RegistryInner {
    next_id: u64,
    listeners: BTreeMap<ListenerId, SharedListener>,
    /// Removed while busy inside their own callback; `on_removed` still owed
    deferred_removed: Vec<SharedListener>,
}

/// Shared set of listeners keyed by identity
///
/// Cloning yields another handle to the same set. Delivery order is
/// registration order.
///
/// Outside the crate a handle can only inspect and detach. Registration
/// goes through [`Input::add_input_listener`](super::Input::add_input_listener)
/// so the block size is announced first, and delivery through the input.
///
/// ```compile_fail
/// use wavegraph_dsp::input::generator::{SignalGenerator, Waveform};
/// use wavegraph_dsp::input::Input;
///
/// let generator = SignalGenerator::new(8000, 64, Waveform::Sine, 100.0).unwrap();
/// generator.listener_registry().notify_buffer(&[0.0; 3]);
/// ```
///
/// ```compile_fail
/// use std::cell::RefCell;
/// use std::rc::Rc;
/// use wavegraph_dsp::input::generator::{SignalGenerator, Waveform};
/// use wavegraph_dsp::input::Input;
/// use wavegraph_dsp::signal::SignalBufferState;
///
/// let generator = SignalGenerator::new(8000, 64, Waveform::Sine, 100.0).unwrap();
/// let state = Rc::new(RefCell::new(SignalBufferState::new()));
/// generator.listener_registry().add(state);
/// ```
#[derive(Clone, Default)]
pub struct ListenerRegistry {
    inner: Rc<RefCell<RegistryInner>>,
}

impl ListenerRegistry {
    /// Create an empty registry
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Register a listener and return its id
    pub(crate) fn add(&self, listener: SharedListener) -> ListenerId {
        let mut inner = self.inner.borrow_mut();
        let id = ListenerId(inner.next_id);
        inner.next_id += 1;
        inner.listeners.insert(id, listener);
        log::debug!("Registered {} ({} listeners)", id, inner.listeners.len());
        id
    }

    /// Unregister a listener, firing `on_removed` on it exactly once
    ///
    /// Returns `false` if `id` was not registered.
    pub fn remove(&self, id: ListenerId) -> bool {
        let removed = self.inner.borrow_mut().listeners.remove(&id);
        match removed {
            Some(listener) => {
                log::debug!("Removed {}", id);
                self.fire_removed(listener);
                true
            }
            None => false,
        }
    }

    /// Unregister every listener, firing `on_removed` on each
    ///
    /// Returns how many were removed.
    pub(crate) fn clear(&self) -> usize {
        let drained = std::mem::take(&mut self.inner.borrow_mut().listeners);
        let count = drained.len();
        for (_, listener) in drained {
            self.fire_removed(listener);
        }
        count
    }

    /// Whether `id` is currently registered
    pub fn contains(&self, id: ListenerId) -> bool {
        self.inner.borrow().listeners.contains_key(&id)
    }

    /// Number of registered listeners
    pub fn len(&self) -> usize {
        self.inner.borrow().listeners.len()
    }

    /// Whether no listener is registered
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Registered ids in delivery order
    pub fn ids(&self) -> Vec<ListenerId> {
        self.inner.borrow().listeners.keys().copied().collect()
    }

    /// Announce a block size to every listener
    pub(crate) fn notify_block_size(&self, block_size: usize) {
        self.notify_each(&mut |listener| listener.on_block_size_changed(block_size));
    }

    /// Deliver a buffer to every listener
    pub(crate) fn notify_buffer(&self, buffer: &[f32]) {
        self.notify_each(&mut |listener| listener.on_buffer_updated(buffer));
    }

    fn snapshot(&self) -> Vec<(ListenerId, SharedListener)> {
        self.inner
            .borrow()
            .listeners
            .iter()
            .map(|(id, listener)| (*id, Rc::clone(listener)))
            .collect()
    }

    fn notify_each(&self, deliver: &mut dyn FnMut(&mut dyn InputListener)) {
        for (id, listener) in self.snapshot() {
            if !self.contains(id) {
                continue;
            }

            match listener.try_borrow_mut() {
                Ok(mut guard) => deliver(&mut *guard),
                Err(_) => {
                    log::warn!("{} is busy (re-entrant notification), skipped", id);
                }
            }

            self.flush_deferred();
        }
    }

    fn fire_removed(&self, listener: SharedListener) {
        let busy = listener
            .try_borrow_mut()
            .map(|mut guard| guard.on_removed())
            .is_err();
        // Still inside its own callback; finish the call first
        if busy {
            self.inner.borrow_mut().deferred_removed.push(listener);
        }
    }

    fn flush_deferred(&self) {
        let pending = std::mem::take(&mut self.inner.borrow_mut().deferred_removed);
        for listener in pending {
            self.fire_removed(listener);
        }
    }
}

impl std::fmt::Debug for ListenerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListenerRegistry")
            .field("ids", &self.ids())
            .finish()
    }
}
