//! Resolver configuration types
//!
//! The addressing constants are fixed by the controller firmware; they are
//! configurable only so that test benches and simulators can be targeted.

use serde::Deserialize;
use std::time::Duration;

/// SNMP community used by UG405 controllers
pub const DEFAULT_COMMUNITY: &str = "UTMC";

/// GET-NEXT target for phase 1 (SCN discovery)
pub const SCN_BASE_OID: &str = ".1.3.6.1.4.1.13267.3.2.4.2.1.15";

/// Base of the detector status OID read in phase 2
pub const STATUS_BASE_OID: &str = ".1.3.6.1.4.1.13267.3.2.5.1.1.32";

/// Configuration for the SCN resolver
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ResolverConfig {
    /// Community string passed to the transport
    #[serde(default = "default_community")]
    pub community: String,

    /// Phase 1 base identifier
    #[serde(default = "default_scn_oid")]
    pub scn_base_oid: String,

    /// Phase 2 base identifier, the derived suffix is appended to it
    #[serde(default = "default_status_oid")]
    pub status_base_oid: String,

    /// UDP port of the SNMP agent (default: 161)
    #[serde(default = "default_port")]
    pub port: u16,

    /// Deadline for a single round trip in milliseconds (default: 2000ms)
    #[serde(default = "default_timeout")]
    pub request_timeout_ms: u64,
}

fn default_community() -> String {
    DEFAULT_COMMUNITY.to_string()
}

fn default_scn_oid() -> String {
    SCN_BASE_OID.to_string()
}

fn default_status_oid() -> String {
    STATUS_BASE_OID.to_string()
}

fn default_port() -> u16 {
    161
}

fn default_timeout() -> u64 {
    2000
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            community: default_community(),
            scn_base_oid: default_scn_oid(),
            status_base_oid: default_status_oid(),
            port: default_port(),
            request_timeout_ms: default_timeout(),
        }
    }
}

impl ResolverConfig {
    /// Create a resolver configuration with the UG405 defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: set the community string
    pub fn with_community(mut self, community: impl Into<String>) -> Self {
        self.community = community.into();
        self
    }

    /// Builder method: set the agent port
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Builder method: set the per-request deadline
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout_ms = timeout.as_millis() as u64;
        self
    }

    /// Builder method: override both base identifiers
    pub fn with_base_oids(mut self, scn_base: impl Into<String>, status_base: impl Into<String>) -> Self {
        self.scn_base_oid = scn_base.into();
        self.status_base_oid = status_base.into();
        self
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolver_config_defaults() {
        let config = ResolverConfig::new();
        assert_eq!(config.community, "UTMC");
        assert_eq!(config.port, 161);
        assert_eq!(config.scn_base_oid, SCN_BASE_OID);
        assert_eq!(config.status_base_oid, STATUS_BASE_OID);
        assert_eq!(config.request_timeout(), Duration::from_secs(2));
    }

    #[test]
    fn test_resolver_config_builder() {
        let config = ResolverConfig::new()
            .with_community("public")
            .with_port(1161)
            .with_timeout(Duration::from_millis(250))
            .with_base_oids(".1.2", ".3.4");

        assert_eq!(config.community, "public");
        assert_eq!(config.port, 1161);
        assert_eq!(config.request_timeout_ms, 250);
        assert_eq!(config.scn_base_oid, ".1.2");
        assert_eq!(config.status_base_oid, ".3.4");
    }

    #[test]
    fn test_partial_deserialization_uses_defaults() {
        let config: ResolverConfig = serde_json::from_str(r#"{"port": 10161}"#).unwrap();
        assert_eq!(config.port, 10161);
        assert_eq!(config.community, "UTMC");
    }
}
