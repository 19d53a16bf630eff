//! Web Serial port options, as replicated to the browser.
//!
//! Field names follow the browser API (camelCase on the wire). Unset fields
//! are left to the browser's defaults.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Parity {
    #[default]
    None,
    Even,
    Odd,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlowControl {
    #[default]
    None,
    Hardware,
}

/// Options passed to `SerialPort.open()`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SerialOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub baud_rate: Option<u32>,

    /// 7 or 8
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_bits: Option<u8>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub parity: Option<Parity>,

    /// 1 or 2
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_bits: Option<u8>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub buffer_size: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub flow_control: Option<FlowControl>,
}

impl SerialOptions {
    pub fn with_baud_rate(baud_rate: u32) -> Self {
        Self {
            baud_rate: Some(baud_rate),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.baud_rate == Some(0) {
            return Err(Error::InvalidConfig("baudRate must be > 0".into()));
        }
        if let Some(bits) = self.data_bits {
            if bits != 7 && bits != 8 {
                return Err(Error::InvalidConfig(format!(
                    "dataBits must be 7 or 8, got {}",
                    bits
                )));
            }
        }
        if let Some(bits) = self.stop_bits {
            if bits != 1 && bits != 2 {
                return Err(Error::InvalidConfig(format!(
                    "stopBits must be 1 or 2, got {}",
                    bits
                )));
            }
        }
        if self.buffer_size == Some(0) {
            return Err(Error::InvalidConfig("bufferSize must be > 0".into()));
        }
        Ok(())
    }
}

/// One entry of the port picker filter list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PortFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usb_vendor_id: Option<u16>,

    /// Only meaningful together with `usb_vendor_id`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usb_product_id: Option<u16>,
}

/// Options passed to `navigator.serial.requestPort()`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RequestOptions {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub filters: Vec<PortFilter>,
}

impl RequestOptions {
    pub fn validate(&self) -> Result<()> {
        for (i, filter) in self.filters.iter().enumerate() {
            if filter.usb_product_id.is_some() && filter.usb_vendor_id.is_none() {
                return Err(Error::InvalidConfig(format!(
                    "filters[{}]: usbProductId requires usbVendorId",
                    i
                )));
            }
        }
        Ok(())
    }
}
