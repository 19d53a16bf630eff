//! Loopback provider: every outbound write comes straight back as an inbound
//! chunk. Used to exercise the stream adapter without a transport.

use super::{RecvCallback, RecvSlot, SerialIoProvider};
use bytes::Bytes;
use std::cell::Cell;

/// Echoing test double with a settable closed flag.
#[derive(Debug, Default)]
pub struct LoopbackProvider {
    closed: Cell<bool>,
    slot: RecvSlot,
}

impl LoopbackProvider {
    /// An open provider with no callback registered.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_closed(&self, closed: bool) {
        self.closed.set(closed);
    }

    pub fn has_callback(&self) -> bool {
        self.slot.is_set()
    }
}

impl SerialIoProvider for LoopbackProvider {
    fn on_recv(&self, callback: Option<RecvCallback>) {
        self.slot.set(callback);
    }

    fn do_recv(&self, buf: Bytes) {
        self.slot.deliver(buf);
    }

    fn is_closed(&self) -> bool {
        self.closed.get()
    }

    fn write_bytes(&self, buf: &[u8]) {
        tracing::trace!("Loopback echoing {} bytes", buf.len());
        self.do_recv(Bytes::copy_from_slice(buf));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_write_echoes_to_callback() {
        let siop = LoopbackProvider::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        siop.on_recv(Some(Box::new(move |buf: Bytes| {
            sink.borrow_mut().extend_from_slice(&buf)
        })));

        siop.write_bytes(b"Howdy");
        assert_eq!(seen.borrow().as_slice(), b"Howdy");
    }

    #[test]
    fn test_closed_flag() {
        let siop = LoopbackProvider::new();
        assert!(!siop.is_closed());
        siop.set_closed(true);
        assert!(siop.is_closed());
        siop.set_closed(false);
        assert!(!siop.is_closed());
    }

    #[test]
    fn test_recv_without_callback() {
        let siop = LoopbackProvider::new();
        assert!(!siop.has_callback());
        siop.do_recv(Bytes::from_static(b"Some lost data"));
        siop.write_bytes(b"also lost");
        assert!(!siop.has_callback());
    }
}
