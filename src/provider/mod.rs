//! Transport providers for [`SerialIo`](crate::stream::SerialIo).
//!
//! A provider is any byte-oriented transport that pushes inbound chunks to a
//! single registered callback and accepts outbound writes. The stream adapter
//! only ever talks to a transport through [`SerialIoProvider`], so real
//! hardware, the notebook hub and the loopback test double are interchangeable.
//!
//! ```text
//! transport --do_recv--> RecvSlot --callback--> SerialIo queue
//! SerialIo --write_bytes--> transport
//! ```

pub mod loopback;

pub use loopback::LoopbackProvider;

use bytes::Bytes;
use std::cell::{Cell, RefCell};
use std::fmt;

/// Receive hook invoked once per inbound chunk.
pub type RecvCallback = Box<dyn FnMut(Bytes)>;

/// Capability interface for a transport feeding a [`SerialIo`](crate::stream::SerialIo).
///
/// All methods take `&self`: providers are shared between the adapter and
/// the transport glue, and keep their mutable state behind cells.
pub trait SerialIoProvider {
    /// Register the receive callback, replacing any previous one.
    /// `None` clears the registration.
    fn on_recv(&self, callback: Option<RecvCallback>);

    /// Announce that `buf` arrived from the transport.
    ///
    /// Without a registered callback the data is dropped.
    fn do_recv(&self, buf: Bytes);

    /// Current transport closed state.
    fn is_closed(&self) -> bool;

    /// Hand `buf` to the transport. Fire-and-forget: the caller assumes every
    /// byte was accepted.
    fn write_bytes(&self, buf: &[u8]);
}

// =============================================================================
// RecvSlot
// =============================================================================

/// Single-slot holder for a [`RecvCallback`].
///
/// Registration replaces; there is no subscriber list.
///
/// The callback is out of the slot while it runs, so a nested delivery made
/// from inside it (e.g. writing back through a loopback provider) finds no
/// callback and is dropped.
#[derive(Default)]
pub struct RecvSlot {
    callback: RefCell<Option<RecvCallback>>,
    /// Bumped on every `set`, so a delivery in flight can tell whether the
    /// callback it borrowed was replaced while it ran.
    generation: Cell<u64>,
}

impl RecvSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, callback: Option<RecvCallback>) {
        *self.callback.borrow_mut() = callback;
        self.generation.set(self.generation.get().wrapping_add(1));
    }

    pub fn clear(&self) {
        self.set(None);
    }

    pub fn is_set(&self) -> bool {
        self.callback.borrow().is_some()
    }

    /// Pass `buf` to the registered callback.
    /// Returns false when nothing is registered and the data was dropped.
    pub fn deliver(&self, buf: Bytes) -> bool {
        // The callback is taken out for the duration of the call so it may
        // re-register (or clear) the slot without a double borrow.
        let taken = self.callback.borrow_mut().take();
        let Some(mut callback) = taken else {
            tracing::debug!("No receive callback registered, dropping {} bytes", buf.len());
            return false;
        };

        let generation = self.generation.get();
        callback(buf);

        if self.generation.get() == generation {
            *self.callback.borrow_mut() = Some(callback);
        }
        true
    }
}

impl fmt::Debug for RecvSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecvSlot")
            .field("registered", &self.is_set())
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================
