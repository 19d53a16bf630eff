//! Backend model of the SerialHub notebook widget.
//!
//! The browser owns the actual Web Serial port. It replicates a handful of
//! attributes to the backend (support flag, connection status, packet
//! counters) and forwards serial bytes as `RECV` messages. [`SerialHub`]
//! keeps that replicated state and acts as a [`SerialIoProvider`], so a
//! [`SerialIo`](crate::stream::SerialIo) can sit on top of it.
//!
//! Outbound messages are queued on an unbounded channel; whatever owns the
//! comm drains the receiver returned by [`SerialHub::new`].

pub mod message;
pub mod options;

pub use message::{HubMessage, MessageBody};
pub use options::{FlowControl, Parity, PortFilter, RequestOptions, SerialOptions};

use crate::error::{Error, Result};
use crate::provider::{RecvCallback, RecvSlot, SerialIoProvider};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use tokio::sync::mpsc;

pub const MODEL_NAME: &str = "SerialHubModel";
pub const VIEW_NAME: &str = "SerialHubView";
pub const MODULE_NAME: &str = "serialhub";
pub const MODULE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Status before the frontend has reported anything
pub const STATUS_CHECKING: &str = "Checking...";
/// Status while a port is open
pub const STATUS_CONNECTED: &str = "Connected";

/// Sender half of the outbound comm channel
pub type HubSender = mpsc::UnboundedSender<HubMessage>;

/// Receiver half of the outbound comm channel
pub type HubReceiver = mpsc::UnboundedReceiver<HubMessage>;

// =============================================================================
// Replicated state
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HubState {
    /// `None` until the frontend has checked for Web Serial support
    pub is_supported: Option<bool>,
    pub status: String,
    pub value: String,
    pub request_options: RequestOptions,
    pub serial_options: SerialOptions,
    pub pkt_recv_front: u64,
    pub pkt_recv_back: u64,
    pub pkt_send_front: u64,
    pub pkt_send_back: u64,
}

impl Default for HubState {
    fn default() -> Self {
        Self {
            is_supported: None,
            status: STATUS_CHECKING.to_string(),
            value: String::new(),
            request_options: RequestOptions::default(),
            serial_options: SerialOptions::default(),
            pkt_recv_front: 0,
            pkt_recv_back: 0,
            pkt_send_front: 0,
            pkt_send_back: 0,
        }
    }
}

impl HubState {
    /// Open only when the browser supports Web Serial and a port is connected.
    pub fn is_closed(&self) -> bool {
        self.is_supported != Some(true) || self.status != STATUS_CONNECTED
    }

    fn apply(&mut self, update: StateUpdate) {
        if let Some(v) = update.is_supported {
            self.is_supported = Some(v);
        }
        if let Some(v) = update.status {
            self.status = v;
        }
        if let Some(v) = update.value {
            self.value = v;
        }
        if let Some(v) = update.request_options {
            self.request_options = v;
        }
        if let Some(v) = update.serial_options {
            self.serial_options = v;
        }
        if let Some(v) = update.pkt_recv_front {
            self.pkt_recv_front = v;
        }
        if let Some(v) = update.pkt_send_front {
            self.pkt_send_front = v;
        }
    }
}

/// Attribute changes reported by the frontend.
///
/// Back-end counters are owned here and are not accepted from the frontend.
/// Unrecognised attributes (model/view names and the like) are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StateUpdate {
    pub is_supported: Option<bool>,
    pub status: Option<String>,
    pub value: Option<String>,
    pub request_options: Option<RequestOptions>,
    pub serial_options: Option<SerialOptions>,
    pub pkt_recv_front: Option<u64>,
    pub pkt_send_front: Option<u64>,
}

// =============================================================================
// SerialHub
// =============================================================================

#[derive(Debug)]
pub struct SerialHub {
    state: RefCell<HubState>,
    slot: RecvSlot,
    outbound: HubSender,
}

impl SerialHub {
    pub fn new() -> (Self, HubReceiver) {
        Self::with_options(RequestOptions::default(), SerialOptions::default())
    }

    /// Create a hub whose port options are replicated to the frontend.
    pub fn with_options(request: RequestOptions, serial: SerialOptions) -> (Self, HubReceiver) {
        let (tx, rx) = mpsc::unbounded_channel();
        let state = HubState {
            request_options: request,
            serial_options: serial,
            ..HubState::default()
        };
        let hub = Self {
            state: RefCell::new(state),
            slot: RecvSlot::new(),
            outbound: tx,
        };
        (hub, rx)
    }

    /// Snapshot of the replicated state.
    pub fn state(&self) -> HubState {
        self.state.borrow().clone()
    }

    /// Replicated state as JSON, for syncing to the frontend.
    pub fn state_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&*self.state.borrow())?)
    }

    pub fn status(&self) -> String {
        self.state.borrow().status.clone()
    }

    pub fn value(&self) -> String {
        self.state.borrow().value.clone()
    }

    pub fn apply_update(&self, update: StateUpdate) {
        let mut state = self.state.borrow_mut();
        let was_closed = state.is_closed();
        state.apply(update);
        let closed = state.is_closed();
        if was_closed != closed {
            tracing::info!(
                "Serial hub {} (status: {})",
                if closed { "closed" } else { "open" },
                state.status
            );
        }
    }

    pub fn apply_update_json(&self, json: &str) -> Result<()> {
        let update: StateUpdate = serde_json::from_str(json)?;
        self.apply_update(update);
        Ok(())
    }

    /// Handle a custom message from the frontend.
    pub fn handle_message(&self, msg: HubMessage) -> Result<()> {
        let kind = msg.kind();
        match msg.body {
            MessageBody::Recv => {
                self.state.borrow_mut().pkt_recv_back += 1;
                for buf in msg.buffers {
                    self.do_recv(buf);
                }
            }
            MessageBody::Text { text } => {
                self.state.borrow_mut().value.push_str(&text);
            }
            MessageBody::Binary => {
                let mut state = self.state.borrow_mut();
                for buf in &msg.buffers {
                    state.value.push_str(&hex::encode(buf));
                }
            }
            MessageBody::Send | MessageBody::SendText { .. } => {
                tracing::warn!("Ignoring outbound-only message {} from frontend", kind);
                return Err(Error::Message(format!(
                    "{} is not accepted from the frontend",
                    kind
                )));
            }
        }
        Ok(())
    }

    pub fn handle_message_json(&self, json: &str, buffers: Vec<Bytes>) -> Result<()> {
        let msg = HubMessage::decode(json, buffers).map_err(|e| {
            tracing::warn!("Dropping frontend message: {}", e);
            e
        })?;
        self.handle_message(msg)
    }

    /// Ask the frontend to encode `text` and write it to the port.
    pub fn send_text(&self, text: impl Into<String>) {
        self.send(HubMessage::send_text(text));
    }

    fn send(&self, msg: HubMessage) {
        let kind = msg.kind();
        if self.outbound.send(msg).is_err() {
            tracing::warn!("Frontend comm closed, dropping {} message", kind);
            return;
        }
        self.state.borrow_mut().pkt_send_back += 1;
    }
}

impl SerialIoProvider for SerialHub {
    fn on_recv(&self, callback: Option<RecvCallback>) {
        self.slot.set(callback);
    }

    fn do_recv(&self, buf: Bytes) {
        self.slot.deliver(buf);
    }

    fn is_closed(&self) -> bool {
        self.state.borrow().is_closed()
    }

    fn write_bytes(&self, buf: &[u8]) {
        self.send(HubMessage::send(Bytes::copy_from_slice(buf)));
    }
}

// =============================================================================
// Tests
// =============================================================================
