//! UG405 Detector Decoder Library
//!
//! A stateless, reusable library for reading vehicle detector states from
//! UG405 traffic controllers over SNMP.
//!
//! # Architecture
//!
//! This library is intentionally focused on the protocol and the frame format:
//! - Resolves the controller's SCN token and derives the status OID
//! - Reads the packed hex status frame through a pluggable transport
//! - Decodes the frame into per-detector symbols (pairs swapped)
//! - Derives the flat status view and the four bit-plane rows
//!
//! The library does NOT:
//! - Learn the detector count or suppress duplicate frames
//! - Write log files or print to the console
//! - Schedule polling
//!
//! All of that lives in the application layer (ug405-monitor).
//!
//! # Example Usage
//!
//! ```no_run
//! use ug405_decoder::{DecodedFrame, ResolverConfig, ScnResolver, UdpSnmpTransport};
//!
//! # async fn run() -> ug405_decoder::Result<()> {
//! let config = ResolverConfig::new();
//! let transport = UdpSnmpTransport::new(config.port, config.request_timeout());
//! let resolver = ScnResolver::new(transport, "10.45.154.11", config);
//!
//! let raw = resolver.fetch_frame().await?;
//! if let Ok(frame) = DecodedFrame::decode(Some(&raw)) {
//!     let line = ug405_decoder::render::render_light(&frame.light(frame.len()));
//!     println!("{}", line);
//! }
//! # Ok(())
//! # }
//! ```

// Public modules
pub mod config;
pub mod decoder;
pub mod frame;
pub mod oid;
pub mod render;
pub mod resolver;
pub mod transport;
pub mod types;

// Re-export main types for convenience
pub use config::ResolverConfig;
pub use decoder::DecodedFrame;
pub use resolver::ScnResolver;
pub use transport::{SnmpTransport, UdpSnmpTransport};
pub use types::{DetectorReading, DetectorSymbol, FrameError, ProtocolError, Result, ScanMode};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
