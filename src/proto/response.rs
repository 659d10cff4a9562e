use std::fmt;

use super::{ProtoError, Result};

/// Manufacturer token reported by a stock KD3005P.
pub const MANUFACTURER: &str = "KORAD";
/// Model token.
pub const MODEL: &str = "KD3005P";
/// Firmware revision this crate is written against.
pub const FIRMWARE: &str = "V6.6";
/// Prefix of the serial number token.
pub const SERIAL_PREFIX: &str = "SN:";

/// Everything the device sends back: a line for `*IDN?`, a single raw
/// byte for `STATUS?`, and a numeric text line for the readback queries.
#[derive(Debug, Clone)]
pub enum Response {
    Ident(Ident),
    Status(Status),
    Reading(String),
}

/// Device identification line, e.g. `KORAD KD3005P V6.6 SN:01206303`.
///
/// The line is kept verbatim; accessors tokenize on single spaces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ident {
    raw: String,
}

impl Ident {
    fn token(&self, idx: usize) -> Option<&str> {
        self.raw.split(' ').nth(idx)
    }

    pub fn manufacturer(&self) -> Option<&str> {
        self.token(0)
    }

    pub fn model(&self) -> Option<&str> {
        self.token(1)
    }

    pub fn firmware(&self) -> Option<&str> {
        self.token(2)
    }

    /// Serial number token, including the `SN:` prefix.
    pub fn serial(&self) -> Option<&str> {
        self.token(3)
    }

    /// Checks all four identity tokens against the stock KD3005P values.
    /// A line with fewer than four tokens fails like any other mismatch.
    pub fn is_supported(&self) -> bool {
        self.manufacturer() == Some(MANUFACTURER)
            && self.model() == Some(MODEL)
            && self.firmware() == Some(FIRMWARE)
            && self
                .serial()
                .is_some_and(|sn| sn.starts_with(SERIAL_PREFIX))
    }

    /// Accepts this identity or rejects the whole session.
    ///
    /// `accept_any` skips the check, for clones and firmware revisions
    /// that answer with a different line.
    pub fn validate(self, accept_any: bool) -> Result<Self> {
        if accept_any || self.is_supported() {
            Ok(self)
        } else {
            Err(ProtoError::UnrecognizedDevice(self.raw))
        }
    }
}

impl From<&str> for Ident {
    fn from(value: &str) -> Self {
        Self {
            raw: value.to_string(),
        }
    }
}

impl fmt::Display for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Regulation mode the output stage is currently in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    ConstantCurrent,
    ConstantVoltage,
}

/// Status bitmask answered to `STATUS?` as one raw byte.
///
/// Bit 0 selects the regulation mode, bit 6 reports the output relay.
/// Bit 5 reports over-current protection; it is absent from the vendor
/// documentation but stable on V6.6 units. All other bits are kept
/// verbatim and not interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Status {
    raw: u8,
}

impl Status {
    pub fn mode(&self) -> OutputMode {
        if self.raw & 0x01 != 0 {
            OutputMode::ConstantVoltage
        } else {
            OutputMode::ConstantCurrent
        }
    }

    /// Over-current protection switch. Undocumented bit.
    pub fn ocp_enabled(&self) -> bool {
        self.raw & 0x20 != 0
    }

    pub fn output_enabled(&self) -> bool {
        self.raw & 0x40 != 0
    }

    /// All eight bits as received.
    pub fn raw(&self) -> u8 {
        self.raw
    }
}

impl From<u8> for Status {
    fn from(value: u8) -> Self {
        Self { raw: value }
    }
}
