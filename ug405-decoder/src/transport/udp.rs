//! SNMPv2c over UDP using the `async-snmp` client
//!
//! A fresh client is created per call; nothing is reused between round trips.

use super::{render_octets, SnmpTransport};
use crate::types::{ProtocolError, Result};
use async_snmp::{Auth, Client, FixedCardinalityResponse, Oid, Retry, Value, VarBind};
use async_trait::async_trait;
use std::fmt;
use std::time::Duration;

/// UDP transport for a single SNMP agent port
#[derive(Debug, Clone)]
pub struct UdpSnmpTransport {
    port: u16,
    timeout: Duration,
}

impl UdpSnmpTransport {
    pub fn new(port: u16, timeout: Duration) -> Self {
        Self { port, timeout }
    }

    async fn connect(&self, host: &str, community: &str) -> Result<async_snmp::UdpClient> {
        let target = format!("{}:{}", host, self.port);
        log::trace!("Opening SNMP session to {}", target);

        Client::builder(target, Auth::v2c(community))
            .request_timeout(self.timeout)
            .retry(Retry::none())
            .connect()
            .await
            .map_err(no_response)
    }
}

#[async_trait]
impl SnmpTransport for UdpSnmpTransport {
    async fn get(&self, host: &str, community: &str, oid: &str) -> Result<String> {
        let oid = parse_oid(oid)?;
        let client = self.connect(host, community).await?;

        let response = client.get(&oid).await.map_err(no_response)?;
        let varbind = single(response)?;
        log::trace!("GET {} -> {:?}", oid, varbind.value);
        render_value(&varbind.value)
    }

    async fn get_next(&self, host: &str, community: &str, oid: &str) -> Result<(String, String)> {
        let oid = parse_oid(oid)?;
        let client = self.connect(host, community).await?;

        let response = client.get_next(&oid).await.map_err(no_response)?;
        let varbind = single(response)?;
        log::trace!("GET-NEXT {} -> {} = {:?}", oid, varbind.oid, varbind.value);
        let value = render_value(&varbind.value)?;
        Ok((varbind.oid.to_string(), value))
    }
}

fn no_response(e: impl fmt::Display) -> ProtocolError {
    ProtocolError::NoResponse(e.to_string())
}

/// Parse a dotted identifier, tolerating the leading dot used in UG405 docs
fn parse_oid(oid: &str) -> Result<Oid> {
    Oid::parse(oid.trim_start_matches('.')).map_err(no_response)
}

/// The one binding of a single-OID request; any other shape is no response
fn single(response: FixedCardinalityResponse) -> Result<VarBind> {
    response.into_single().map_err(|r| {
        ProtocolError::NoResponse(format!(
            "unexpected response shape: {} bindings, {} anomalies",
            r.varbinds.len(),
            r.anomalies.len()
        ))
    })
}

fn render_value(value: &Value) -> Result<String> {
    match value {
        Value::OctetString(bytes) => Ok(render_octets(bytes)),
        Value::NoSuchObject | Value::NoSuchInstance | Value::EndOfMibView => {
            Err(ProtocolError::NoResponse(format!("agent returned {:?}", value)))
        }
        other => Ok(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unparseable_oid_is_no_response() {
        let transport = UdpSnmpTransport::new(161, Duration::from_millis(10));
        let result = transport.get("127.0.0.1", "UTMC", "not.an.oid").await;
        assert!(matches!(result, Err(ProtocolError::NoResponse(_))));
    }

    fn response(varbinds: Vec<VarBind>) -> FixedCardinalityResponse {
        FixedCardinalityResponse {
            operation: async_snmp::FixedCardinalityOperation::Get,
            varbinds,
            anomalies: Vec::new(),
            metadata: Default::default(),
        }
    }

    #[test]
    fn test_single_binding_required() {
        let oid = parse_oid(".1.3.6.1.4.1.13267.3.2.5.1.1.32.1.1.65").unwrap();
        let binding = VarBind::new(oid.clone(), Value::OctetString(vec![0x10u8, 0x32].into()));

        let varbind = single(response(vec![binding.clone()])).unwrap();
        assert_eq!(varbind.oid, oid);
        assert!(matches!(single(response(Vec::new())), Err(ProtocolError::NoResponse(_))));
        assert!(matches!(
            single(response(vec![binding.clone(), binding])),
            Err(ProtocolError::NoResponse(_))
        ));
    }

    #[test]
    fn test_value_rendering() {
        let frame = Value::OctetString(vec![0x10u8, 0x32, 0x00, 0x00].into());
        assert_eq!(render_value(&frame).unwrap(), "0x10320000");

        let token = Value::OctetString(b"CO1".to_vec().into());
        assert_eq!(render_value(&token).unwrap(), "CO1");

        assert!(matches!(render_value(&Value::NoSuchInstance), Err(ProtocolError::NoResponse(_))));
        assert!(matches!(render_value(&Value::EndOfMibView), Err(ProtocolError::NoResponse(_))));
    }
}
