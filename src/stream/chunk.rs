//! Inbound chunk queue.
//!
//! Each received buffer is kept as its own immutable [`Bytes`] with a read
//! cursor. Reads drain the head chunk only and never coalesce across chunk
//! boundaries in a single call.

use bytes::Bytes;
use std::collections::VecDeque;

/// One received buffer and how far into it we have read.
#[derive(Debug, Clone)]
pub(crate) struct Chunk {
    data: Bytes,
    pos: usize,
}

impl Chunk {
    pub(crate) fn new(data: Bytes) -> Self {
        Self { data, pos: 0 }
    }

    pub(crate) fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    pub(crate) fn is_exhausted(&self) -> bool {
        self.pos >= self.data.len()
    }

    pub(crate) fn unread(&self) -> &[u8] {
        &self.data[self.pos..]
    }

    pub(crate) fn advance(&mut self, n: usize) {
        debug_assert!(n <= self.remaining());
        self.pos += n;
    }

    /// Copy as much of the unread region as fits into `dst`.
    pub(crate) fn read_into(&mut self, dst: &mut [u8]) -> usize {
        let n = dst.len().min(self.remaining());
        dst[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
        self.pos += n;
        n
    }
}

/// FIFO of received chunks.
#[derive(Debug, Default)]
pub(crate) struct ChunkQueue {
    chunks: VecDeque<Chunk>,
}

impl ChunkQueue {
    pub(crate) fn push(&mut self, data: Bytes) {
        self.chunks.push_back(Chunk::new(data));
    }

    /// Number of queued chunks, including empty ones not yet skipped.
    pub(crate) fn len(&self) -> usize {
        self.chunks.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Unread bytes across every chunk, summed on each call.
    pub(crate) fn in_waiting(&self) -> usize {
        self.chunks.iter().map(Chunk::remaining).sum()
    }

    /// Fill `dst` from the head chunk only.
    ///
    /// Exhausted chunks at the head (including chunks that arrived empty) are
    /// discarded on the way. Returns 0 once the queue runs dry.
    pub(crate) fn read_into(&mut self, dst: &mut [u8]) -> usize {
        while let Some(head) = self.chunks.front_mut() {
            let n = head.read_into(dst);
            if n > 0 {
                if head.is_exhausted() {
                    self.chunks.pop_front();
                }
                return n;
            }
            self.discard_head();
        }
        0
    }

    /// Append bytes up to and including `delim` to `out`, stopping early once
    /// `out` holds `limit` bytes or the queue runs dry.
    ///
    /// Returns true if the delimiter was consumed.
    pub(crate) fn read_until(&mut self, delim: u8, limit: Option<usize>, out: &mut Vec<u8>) -> bool {
        while let Some(head) = self.chunks.front_mut() {
            if head.is_exhausted() {
                self.discard_head();
                continue;
            }

            let room = match limit {
                Some(limit) if out.len() >= limit => return false,
                Some(limit) => limit - out.len(),
                None => usize::MAX,
            };

            let unread = head.unread();
            let window = &unread[..unread.len().min(room)];
            let (take, found) = match window.iter().position(|&b| b == delim) {
                Some(i) => (i + 1, true),
                None => (window.len(), false),
            };

            out.extend_from_slice(&window[..take]);
            head.advance(take);
            if head.is_exhausted() {
                self.chunks.pop_front();
            }
            if found {
                return true;
            }
        }
        false
    }

    /// Drop every queued chunk. Returns how many unread bytes were discarded.
    pub(crate) fn clear(&mut self) -> usize {
        let discarded = std::mem::take(&mut self.chunks);
        discarded.iter().map(Chunk::remaining).sum()
    }

    fn discard_head(&mut self) {
        if let Some(chunk) = self.chunks.pop_front() {
            tracing::trace!("Discarding exhausted chunk of {} bytes", chunk.data.len());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn queue(chunks: &[&'static [u8]]) -> ChunkQueue {
        let mut q = ChunkQueue::default();
        for c in chunks {
            q.push(Bytes::from_static(c));
        }
        q
    }

    #[test]
    fn test_chunk_cursor() {
        let mut chunk = Chunk::new(Bytes::from_static(b"HELLO"));
        let mut buf = [0u8; 3];
        assert_eq!(chunk.read_into(&mut buf), 3);
        assert_eq!(&buf, b"HEL");
        assert_eq!(chunk.remaining(), 2);
        assert_eq!(chunk.unread(), b"LO");
        assert!(!chunk.is_exhausted());
        assert_eq!(chunk.read_into(&mut buf), 2);
        assert!(chunk.is_exhausted());
        assert_eq!(chunk.read_into(&mut buf), 0);
    }

    #[test]
    fn test_read_stops_at_chunk_boundary() {
        let mut q = queue(&[b"AB", b"CDEF"]);
        let mut buf = [0u8; 10];
        assert_eq!(q.read_into(&mut buf), 2);
        assert_eq!(&buf[..2], b"AB");
        assert_eq!(q.len(), 1);
        assert_eq!(q.in_waiting(), 4);
    }

    #[test]
    fn test_empty_chunks_skipped() {
        let mut q = queue(&[b"", b"", b"X", b""]);
        assert_eq!(q.len(), 4);
        assert_eq!(q.in_waiting(), 1);

        let mut buf = [0u8; 4];
        assert_eq!(q.read_into(&mut buf), 1);
        assert_eq!(buf[0], b'X');
        assert_eq!(q.len(), 1);
        assert_eq!(q.read_into(&mut buf), 0);
        assert!(q.is_empty());
    }

    #[test]
    fn test_read_until_across_chunks() {
        let mut q = queue(&[b"ab", b"", b"c\nde"]);
        let mut out = Vec::new();
        assert!(q.read_until(b'\n', None, &mut out));
        assert_eq!(out, b"abc\n");
        assert_eq!(q.in_waiting(), 2);

        out.clear();
        assert!(!q.read_until(b'\n', None, &mut out));
        assert_eq!(out, b"de");
        assert!(q.is_empty());
    }

    #[test]
    fn test_read_until_limit() {
        let mut q = queue(&[b"abcdef\n"]);
        let mut out = Vec::new();
        assert!(!q.read_until(b'\n', Some(4), &mut out));
        assert_eq!(out, b"abcd");
        assert_eq!(q.in_waiting(), 3);
    }

    #[test]
    fn test_clear() {
        let mut q = queue(&[b"DISCARDED1", b"Also Discarded"]);
        let mut buf = [0u8; 3];
        q.read_into(&mut buf);
        assert_eq!(q.clear(), 21);
        assert!(q.is_empty());
        assert_eq!(q.clear(), 0);
    }
}
