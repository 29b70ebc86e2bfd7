//! SNMP transports
//!
//! The resolver only needs two read primitives. Every failure is reported as
//! `ProtocolError::NoResponse`; callers do not distinguish timeouts from
//! error-status replies.

use crate::types::Result;
use async_trait::async_trait;

pub mod udp;

pub use udp::UdpSnmpTransport;

/// Read-only SNMP operations against a single agent
///
/// Values are returned in their textual form: printable octet strings as
/// text, anything else as `0x`-prefixed hex (see [`render_octets`]).
#[async_trait]
pub trait SnmpTransport: Send + Sync {
    /// Scalar GET of `oid`
    async fn get(&self, host: &str, community: &str, oid: &str) -> Result<String>;

    /// Lexicographic GET-NEXT after `oid`, returning `(next_oid, value)`
    async fn get_next(&self, host: &str, community: &str, oid: &str) -> Result<(String, String)>;
}

/// Textual form of an OCTET STRING value
///
/// Printable ASCII (plus tab, CR, LF) is returned as text; anything else
/// becomes `0x` followed by lowercase hex. Status frames are binary, so they
/// always take the hex form.
pub fn render_octets(bytes: &[u8]) -> String {
    let printable = bytes
        .iter()
        .all(|&b| (0x20..=0x7e).contains(&b) || matches!(b, b'\t' | b'\n' | b'\r'));

    if printable {
        bytes.iter().map(|&b| b as char).collect()
    } else {
        let mut out = String::with_capacity(2 + bytes.len() * 2);
        out.push_str("0x");
        for b in bytes {
            out.push_str(&format!("{:02x}", b));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_printable_as_text() {
        assert_eq!(render_octets(b"CO1234"), "CO1234");
        assert_eq!(render_octets(b""), "");
    }

    #[test]
    fn test_render_binary_as_hex() {
        assert_eq!(render_octets(&[0x10, 0x32, 0x00, 0x00]), "0x10320000");
        assert_eq!(render_octets(&[0x41, 0xff]), "0x41ff");
    }
}
