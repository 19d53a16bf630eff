//! Blocking-style byte stream over a [`SerialIoProvider`].
//!
//! Inbound data is pushed by the provider into a queue of chunks; reads pull
//! from the head of that queue and return immediately with whatever is
//! buffered. Writes go straight through to the provider.

use super::chunk::ChunkQueue;
use crate::error::{Error, Result};
use crate::provider::SerialIoProvider;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::fmt;
use std::io;
use std::rc::{Rc, Weak};

/// Default buffer size for `readall`
pub const DEFAULT_READ_SIZE: usize = 8 * 1024;

const NOT_SEEKABLE: &str = "Not seekable";

// =============================================================================
// Configuration
// =============================================================================

/// What a read reports when no data is buffered right now.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EndOfStream {
    /// Zero bytes (`Some(0)` / empty `Bytes`)
    #[default]
    Zero,
    /// No count at all (`None`)
    None,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamConfig {
    pub end_of_stream: EndOfStream,

    /// Buffer size used by `readall` per pass
    pub read_size: usize,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            end_of_stream: EndOfStream::Zero,
            read_size: DEFAULT_READ_SIZE,
        }
    }
}

impl StreamConfig {
    pub fn validate(&self) -> Result<()> {
        if self.read_size == 0 {
            return Err(Error::InvalidConfig("stream.read_size must be > 0".into()));
        }
        Ok(())
    }
}

bitflags::bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Capabilities: u8 {
        const READABLE = 1 << 0;
        const WRITABLE = 1 << 1;
        const SEEKABLE = 1 << 2;
        const TTY = 1 << 3;
    }
}

// =============================================================================
// SerialIo
// =============================================================================

/// Stream adapter bound to one provider for its whole lifetime.
///
/// Open/closed state belongs to the provider and is re-queried on every call.
pub struct SerialIo<P: SerialIoProvider + ?Sized> {
    provider: Rc<P>,
    queue: Rc<RefCell<ChunkQueue>>,
    config: StreamConfig,
}

impl<P: SerialIoProvider + ?Sized> SerialIo<P> {
    pub fn new(provider: Rc<P>) -> Self {
        Self::with_config(provider, StreamConfig::default())
    }

    /// Create the adapter and register its receive hook with `provider`,
    /// replacing whatever hook was registered before.
    pub fn with_config(provider: Rc<P>, config: StreamConfig) -> Self {
        let queue = Rc::new(RefCell::new(ChunkQueue::default()));
        let weak: Weak<RefCell<ChunkQueue>> = Rc::downgrade(&queue);

        provider.on_recv(Some(Box::new(move |buf: Bytes| match weak.upgrade() {
            Some(queue) => queue.borrow_mut().push(buf),
            None => tracing::debug!("Stream dropped, discarding {} bytes", buf.len()),
        })));

        Self {
            provider,
            queue,
            config,
        }
    }

    /// Queue a received buffer. Normally reached through the provider's
    /// `do_recv`.
    pub fn cb_recv(&self, buf: Bytes) {
        self.queue.borrow_mut().push(buf);
    }

    pub fn provider(&self) -> &Rc<P> {
        &self.provider
    }

    pub fn config(&self) -> &StreamConfig {
        &self.config
    }

    pub fn capabilities(&self) -> Capabilities {
        Capabilities::READABLE | Capabilities::WRITABLE
    }

    pub fn readable(&self) -> bool {
        self.capabilities().contains(Capabilities::READABLE)
    }

    pub fn writable(&self) -> bool {
        self.capabilities().contains(Capabilities::WRITABLE)
    }

    pub fn seekable(&self) -> bool {
        self.capabilities().contains(Capabilities::SEEKABLE)
    }

    pub fn isatty(&self) -> bool {
        self.capabilities().contains(Capabilities::TTY)
    }

    pub fn closed(&self) -> bool {
        self.provider.is_closed()
    }

    /// Fail with [`Error::Closed`] if the provider is closed right now.
    pub fn check_closed(&self) -> Result<()> {
        if self.closed() {
            return Err(Error::Closed);
        }
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Writing
    // -------------------------------------------------------------------------

    /// Send `data` through the provider.
    ///
    /// Empty input is a no-op returning `None`; otherwise the full length is
    /// reported since the transport is assumed to accept everything.
    pub fn write(&self, data: &[u8]) -> Result<Option<usize>> {
        self.check_closed()?;
        if data.is_empty() {
            return Ok(None);
        }
        self.provider.write_bytes(data);
        Ok(Some(data.len()))
    }

    /// Nothing is buffered on the way out; only checks the closed state.
    pub fn flush(&self) -> Result<()> {
        self.check_closed()
    }

    // -------------------------------------------------------------------------
    // Reading
    // -------------------------------------------------------------------------

    /// Copy buffered bytes into `buf`, from the head chunk only.
    ///
    /// A short read is normal: the call stops at the end of the current
    /// chunk even when more chunks are queued. `None` means `buf` had no
    /// room; an empty queue yields the configured end-of-stream value.
    pub fn read_into(&self, buf: &mut [u8]) -> Result<Option<usize>> {
        self.check_closed()?;
        if buf.is_empty() {
            return Ok(None);
        }
        let n = self.queue.borrow_mut().read_into(buf);
        if n == 0 {
            return Ok(self.eos_count());
        }
        Ok(Some(n))
    }

    /// Read up to `size` bytes with a single `read_into`, or everything
    /// buffered when `size` is `None`.
    pub fn read(&self, size: Option<usize>) -> Result<Option<Bytes>> {
        let Some(size) = size else {
            return self.readall();
        };
        self.check_closed()?;
        if size == 0 {
            return Ok(None);
        }
        // A single pass never returns more than is buffered.
        let mut buf = vec![0u8; size.min(self.in_waiting()).max(1)];
        match self.read_into(&mut buf)? {
            Some(n) => {
                buf.truncate(n);
                Ok(Some(Bytes::from(buf)))
            }
            None => Ok(None),
        }
    }

    /// Drain every buffered byte, one `read_into` pass at a time.
    pub fn readall(&self) -> Result<Option<Bytes>> {
        let mut out = Vec::new();
        let mut buf = vec![0u8; self.config.read_size.max(1)];
        loop {
            match self.read_into(&mut buf)? {
                Some(n) if n > 0 => out.extend_from_slice(&buf[..n]),
                _ => break,
            }
        }
        Ok(self.eos_bytes(out))
    }

    /// Read one line including its trailing `\n`, or whatever is buffered
    /// when no terminator has arrived yet. `limit` caps the line length;
    /// a zero limit yields an empty line rather than the end-of-stream value.
    pub fn readline(&self, limit: Option<usize>) -> Result<Option<Bytes>> {
        self.check_closed()?;
        if limit == Some(0) {
            return Ok(Some(Bytes::new()));
        }
        let mut out = Vec::new();
        self.queue.borrow_mut().read_until(b'\n', limit, &mut out);
        Ok(self.eos_bytes(out))
    }

    /// Bulk multi-line reads are not offered.
    pub fn readlines(&self) -> Result<Vec<Bytes>> {
        self.check_closed()?;
        Err(Error::Unsupported("readlines() not supported"))
    }

    // -------------------------------------------------------------------------
    // Buffer introspection
    // -------------------------------------------------------------------------

    /// Unread inbound bytes across all queued chunks.
    pub fn in_waiting(&self) -> usize {
        self.queue.borrow().in_waiting()
    }

    /// Always 0: writes are never queued here.
    pub fn out_waiting(&self) -> usize {
        0
    }

    /// Number of chunks currently queued, including empty ones not yet skipped.
    pub fn queued_chunks(&self) -> usize {
        self.queue.borrow().len()
    }

    /// Discard all buffered inbound data.
    pub fn reset_input_buffer(&self) {
        let mut queue = self.queue.borrow_mut();
        if queue.is_empty() {
            return;
        }
        let discarded = queue.clear();
        if discarded > 0 {
            tracing::debug!("Input buffer reset, discarded {} bytes", discarded);
        }
    }

    pub fn reset_output_buffer(&self) {}

    // -------------------------------------------------------------------------
    // Unsupported
    // -------------------------------------------------------------------------

    pub fn seek(&self, _pos: io::SeekFrom) -> Result<u64> {
        self.check_closed()?;
        Err(Error::Unsupported(NOT_SEEKABLE))
    }

    pub fn tell(&self) -> Result<u64> {
        self.check_closed()?;
        Err(Error::Unsupported(NOT_SEEKABLE))
    }

    pub fn truncate(&self, _size: Option<u64>) -> Result<u64> {
        self.check_closed()?;
        Err(Error::Unsupported(NOT_SEEKABLE))
    }

    /// There is no OS-level descriptor behind the stream.
    pub fn fileno(&self) -> Result<i32> {
        self.check_closed()?;
        Err(Error::Unsupported("No fileno"))
    }

    fn eos_count(&self) -> Option<usize> {
        match self.config.end_of_stream {
            EndOfStream::Zero => Some(0),
            EndOfStream::None => None,
        }
    }

    fn eos_bytes(&self, out: Vec<u8>) -> Option<Bytes> {
        if out.is_empty() && self.config.end_of_stream == EndOfStream::None {
            return None;
        }
        Some(Bytes::from(out))
    }
}

impl<P: SerialIoProvider + ?Sized> io::Read for SerialIo<P> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        Ok(self.read_into(buf)?.unwrap_or(0))
    }
}

impl<P: SerialIoProvider + ?Sized> io::Write for SerialIo<P> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        Ok(SerialIo::write(self, buf)?.unwrap_or(0))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(SerialIo::flush(self)?)
    }
}

impl<P: SerialIoProvider + ?Sized> fmt::Debug for SerialIo<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SerialIo")
            .field("closed", &self.closed())
            .field("in_waiting", &self.in_waiting())
            .field("queued_chunks", &self.queued_chunks())
            .field("config", &self.config)
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================
