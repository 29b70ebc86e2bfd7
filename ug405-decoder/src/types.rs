//! Core types for the UG405 detector decoder library
//!
//! This module defines the values that flow between the resolver, the frame
//! decoder and the renderers. The decoder is stateless - it does not learn the
//! detector count or remember previous frames; that belongs to the caller.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Result type for protocol operations
pub type Result<T> = std::result::Result<T, ProtocolError>;

/// Errors raised while resolving and reading a status frame
///
/// Every transport-level problem (timeout, unreachable device, SNMP
/// error-status, unexpected value type) is collapsed into `NoResponse`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProtocolError {
    #[error("Invalid IP address: {0}")]
    InvalidTarget(String),

    #[error("No response from device: {0}")]
    NoResponse(String),
}

/// Reasons a raw frame yields no detector symbols
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum FrameError {
    #[error("frame is absent")]
    Absent,

    #[error("frame does not start with the 0x prefix")]
    MissingPrefix,

    #[error("frame is too short to hold a detector quarter")]
    EmptyQuarter,
}

/// One detector's raw state nibble, as the hex character taken from the frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct DetectorSymbol(char);

impl DetectorSymbol {
    pub fn new(c: char) -> Self {
        Self(c)
    }

    /// The character as received from the device
    pub fn as_char(&self) -> char {
        self.0
    }

    /// Idle only for the literal character `'0'`; any other character is active.
    pub fn is_active(&self) -> bool {
        self.0 != '0'
    }

    /// Bit-reversed 4-bit encoding of the nibble, index 0 first
    ///
    /// Hex `1` becomes `[true, false, false, false]` ("1000"), hex `8` becomes
    /// "0001". Lookup is case-insensitive; characters that are not hex digits
    /// encode as "0000".
    pub fn nibble_bits(&self) -> [bool; 4] {
        let value = self.0.to_digit(16).unwrap_or(0);
        [0, 1, 2, 3].map(|bit| (value >> bit) & 1 == 1)
    }
}

impl From<char> for DetectorSymbol {
    fn from(c: char) -> Self {
        Self(c)
    }
}

impl fmt::Display for DetectorSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One rendered detector: 1-based position, displayed symbol and its on/off state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DetectorReading {
    pub position: usize,
    pub symbol: DetectorSymbol,
    pub active: bool,
}

/// Console and log verbosity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanMode {
    /// One status line per frame
    #[default]
    Light,
    /// Four bit-plane lines per frame
    Full,
}

impl ScanMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScanMode::Light => "light",
            ScanMode::Full => "full",
        }
    }

    /// Capitalised name used in log headers
    pub fn title(&self) -> &'static str {
        match self {
            ScanMode::Light => "Light",
            ScanMode::Full => "Full",
        }
    }
}

impl fmt::Display for ScanMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScanMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "light" => Ok(ScanMode::Light),
            "full" => Ok(ScanMode::Full),
            other => Err(format!("unknown scan mode '{}' (expected light or full)", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbol_status_is_character_equality() {
        assert!(!DetectorSymbol::new('0').is_active());
        assert!(DetectorSymbol::new('1').is_active());
        assert!(DetectorSymbol::new('f').is_active());
        // Not a bitwise test: anything but '0' counts as active
        assert!(DetectorSymbol::new('x').is_active());
    }

    #[test]
    fn test_nibble_bits_are_bit_reversed() {
        assert_eq!(DetectorSymbol::new('1').nibble_bits(), [true, false, false, false]);
        assert_eq!(DetectorSymbol::new('8').nibble_bits(), [false, false, false, true]);
        assert_eq!(DetectorSymbol::new('c').nibble_bits(), [false, false, true, true]);
        assert_eq!(DetectorSymbol::new('C').nibble_bits(), [false, false, true, true]);
        assert_eq!(DetectorSymbol::new('z').nibble_bits(), [false; 4]);
    }

    #[test]
    fn test_scan_mode_parsing() {
        assert_eq!("light".parse::<ScanMode>(), Ok(ScanMode::Light));
        assert_eq!(" FULL ".parse::<ScanMode>(), Ok(ScanMode::Full));
        assert!("verbose".parse::<ScanMode>().is_err());
        assert_eq!(ScanMode::default(), ScanMode::Light);
    }

    #[test]
    fn test_protocol_error_display() {
        let err = ProtocolError::InvalidTarget("10.0.0".to_string());
        assert_eq!(err.to_string(), "Invalid IP address: 10.0.0");
    }
}
