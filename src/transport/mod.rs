//! Transport abstraction over the single outbound collector connection.
//!
//! The shipper is the only caller, so connection state needs no
//! synchronization; the trait exists for dependency injection of scripted
//! transports in tests, mirroring how the production `TcpTransport` behaves.

pub mod tcp;

pub use tcp::TcpTransport;

use async_trait::async_trait;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConnectError {
    #[error("couldn't resolve collector address '{0}'")]
    Resolve(String),
    #[error("connection attempt failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("connection attempt timed out after {0:?}")]
    Timeout(std::time::Duration),
}

#[derive(Error, Debug)]
pub enum SendError {
    #[error("not connected to collector")]
    NotConnected,
    #[error("connection closed by collector")]
    ConnectionClosed,
    #[error("channel error: {0}")]
    Io(#[from] std::io::Error),
    #[error("send buffer full")]
    BufferFull,
}

/// What to do when the non-blocking channel reports a full send buffer.
///
/// `WaitWritable` holds the connection and waits for write readiness, which
/// avoids tearing down a healthy connection merely because the peer is
/// momentarily slow to drain. `ReconnectOnBlock` treats a full buffer as a
/// send failure and forces full reconnection; it is kept as an explicit,
/// documented fallback mode, not the default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SendPolicy {
    #[default]
    WaitWritable,
    ReconnectOnBlock,
}

/// One outbound connection to the collector: connect, send, and a stable
/// textual identity of the remote endpoint for framing.
#[async_trait]
pub trait Transport: Send {
    /// Establish (or re-establish) the outbound connection.
    async fn connect(&mut self) -> Result<(), ConnectError>;

    /// Write the full payload to the channel.
    ///
    /// A transient full-buffer condition is absorbed according to the
    /// configured [`SendPolicy`]; only a genuine channel error surfaces as
    /// `SendError`.
    async fn send(&mut self, payload: &[u8]) -> Result<(), SendError>;

    /// Hostname or address usable when framing a record for the collector.
    fn endpoint(&self) -> &str;
}
