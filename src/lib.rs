//! serialhub: a blocking-style byte stream over browser Web Serial ports.
//!
//! The browser pushes serial data in variably sized chunks. [`SerialIo`]
//! queues those chunks and serves ordinary read/write/readline calls over
//! them, while the transport itself sits behind the [`SerialIoProvider`]
//! trait.
//!
//! ```
//! use bytes::Bytes;
//! use serialhub::{LoopbackProvider, SerialIo, SerialIoProvider};
//! use std::rc::Rc;
//!
//! let siop = Rc::new(LoopbackProvider::new());
//! let sio = SerialIo::new(Rc::clone(&siop));
//!
//! siop.do_recv(Bytes::from_static(b"BUF1\n"));
//! sio.write(b"Howdy").unwrap();
//!
//! assert_eq!(sio.in_waiting(), 10);
//! assert_eq!(sio.readline(None).unwrap().unwrap(), &b"BUF1\n"[..]);
//! assert_eq!(sio.readall().unwrap().unwrap(), &b"Howdy"[..]);
//! ```

pub mod config;
pub mod error;
pub mod hub;
pub mod logging;
pub mod provider;
pub mod stream;

pub use config::Config;
pub use error::{Error, Result};
pub use hub::{HubMessage, SerialHub};
pub use provider::{LoopbackProvider, RecvCallback, SerialIoProvider};
pub use stream::{EndOfStream, SerialIo, StreamConfig};
