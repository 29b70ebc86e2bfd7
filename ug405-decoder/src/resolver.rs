//! Two-phase SCN resolution
//!
//! Phase 1: GET-NEXT on the SCN base OID returns the site's SCN token.
//! Phase 2: GET on `status_base + .1.<len>.<codes>` returns the status frame.
//!
//! The token is never cached; the controller may hand out a different one on
//! every cycle.

use crate::config::ResolverConfig;
use crate::oid;
use crate::transport::SnmpTransport;
use crate::types::{ProtocolError, Result};
use std::future::Future;
use std::net::Ipv4Addr;

/// Resolves and reads the detector status frame of one controller
pub struct ScnResolver<T> {
    transport: T,
    host: String,
    config: ResolverConfig,
}

impl<T: SnmpTransport> ScnResolver<T> {
    pub fn new(transport: T, host: impl Into<String>, config: ResolverConfig) -> Self {
        Self {
            transport,
            host: host.into(),
            config,
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Phase 1: discover the SCN token
    pub async fn resolve_token(&self) -> Result<String> {
        let (next_oid, token) = self
            .deadline(self.transport.get_next(&self.host, &self.config.community, &self.config.scn_base_oid))
            .await?;
        log::debug!("SCN token {:?} found at {}", token, next_oid);
        Ok(token)
    }

    /// Run both phases and return the raw status frame
    ///
    /// The target must be a literal IPv4 address; anything else fails with
    /// `InvalidTarget` before touching the network. An empty reply counts as
    /// no response.
    pub async fn fetch_frame(&self) -> Result<String> {
        if self.host.parse::<Ipv4Addr>().is_err() {
            return Err(ProtocolError::InvalidTarget(self.host.clone()));
        }

        let token = self.resolve_token().await?;
        let status_oid = oid::status_oid(&self.config.status_base_oid, &token);
        log::trace!("Reading status frame from {}", status_oid);

        let frame = self
            .deadline(self.transport.get(&self.host, &self.config.community, &status_oid))
            .await?;

        if frame.is_empty() {
            return Err(ProtocolError::NoResponse("empty status value".to_string()));
        }
        Ok(frame)
    }

    async fn deadline<F, R>(&self, request: F) -> Result<R>
    where
        F: Future<Output = Result<R>>,
    {
        let timeout = self.config.request_timeout();
        match tokio::time::timeout(timeout, request).await {
            Ok(result) => result,
            Err(_) => Err(ProtocolError::NoResponse(format!(
                "request timed out after {}ms",
                timeout.as_millis()
            ))),
        }
    }
}
