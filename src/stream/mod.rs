//! Chunked byte stream adapter.
//!
//! Turns the push-style chunk delivery of a [`SerialIoProvider`](crate::provider::SerialIoProvider)
//! into ordinary read/write/readline calls that never wait on the transport.

mod chunk;
pub mod serialio;

pub use serialio::{Capabilities, EndOfStream, SerialIo, StreamConfig, DEFAULT_READ_SIZE};
