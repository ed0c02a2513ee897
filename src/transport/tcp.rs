use super::{ConnectError, SendError, SendPolicy, Transport};
use async_trait::async_trait;
use std::time::Duration;
use tokio::net::{TcpSocket, TcpStream};
use tokio::time::timeout;
use tracing::{debug, info, warn};

#[derive(Debug, Clone)]
pub struct TcpTransportConfig {
    pub host: String,
    pub port: u16,
    pub policy: SendPolicy,
    /// Bound on a single connection attempt so the shipper task is never
    /// stalled indefinitely on DNS resolution or the TCP handshake.
    pub connect_timeout: Duration,
    /// Poll timeout for write readiness; re-armed on expiry while the peer
    /// drains its receive buffer.
    pub write_poll_timeout: Duration,
    /// Kernel send buffer size override; `None` keeps the system default.
    pub send_buffer_size: Option<u32>,
}

impl Default for TcpTransportConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 9600,
            policy: SendPolicy::WaitWritable,
            connect_timeout: Duration::from_secs(10),
            write_poll_timeout: Duration::from_millis(500),
            send_buffer_size: None,
        }
    }
}

/// TCP connection to the collector.
///
/// Writes go through `try_write` against the readiness model, so a full
/// kernel send buffer shows up as `WouldBlock` rather than a stalled task;
/// the configured [`SendPolicy`] decides whether to wait for writability or
/// to treat the condition as a failed send.
pub struct TcpTransport {
    config: TcpTransportConfig,
    addr: String,
    stream: Option<TcpStream>,
}

impl TcpTransport {
    pub fn new(config: TcpTransportConfig) -> Self {
        let addr = format!("{}:{}", config.host, config.port);
        Self {
            config,
            addr,
            stream: None,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.stream.is_some()
    }

    /// Wait until the stream accepts more data, re-arming the bounded poll
    /// timeout each time it expires. Only a genuine channel error breaks the
    /// wait; "still not writable" is not a failure.
    async fn wait_writable(&self, stream: &TcpStream) -> Result<(), SendError> {
        loop {
            match timeout(self.config.write_poll_timeout, stream.writable()).await {
                Ok(Ok(())) => return Ok(()),
                Ok(Err(e)) => return Err(SendError::Io(e)),
                Err(_elapsed) => {
                    debug!(addr = %self.addr, "send buffer still full, re-arming writability poll");
                }
            }
        }
    }
}

#[async_trait]
impl Transport for TcpTransport {
    async fn connect(&mut self) -> Result<(), ConnectError> {
        // Drop any half-dead stream before dialing again.
        self.stream = None;

        let deadline = self.config.connect_timeout;
        let dial = async {
            let mut addrs = tokio::net::lookup_host(&self.addr)
                .await
                .map_err(|_| ConnectError::Resolve(self.addr.clone()))?;
            let addr = addrs
                .next()
                .ok_or_else(|| ConnectError::Resolve(self.addr.clone()))?;
            let socket = match addr {
                std::net::SocketAddr::V4(_) => TcpSocket::new_v4()?,
                std::net::SocketAddr::V6(_) => TcpSocket::new_v6()?,
            };
            if let Some(size) = self.config.send_buffer_size {
                socket.set_send_buffer_size(size)?;
            }
            socket.connect(addr).await.map_err(ConnectError::Io)
        };

        let stream = match timeout(deadline, dial).await {
            Ok(Ok(stream)) => stream,
            Ok(Err(e)) => return Err(e),
            Err(_elapsed) => return Err(ConnectError::Timeout(deadline)),
        };

        stream.set_nodelay(true)?;
        info!(addr = %self.addr, "connected to collector");
        self.stream = Some(stream);
        Ok(())
    }

    async fn send(&mut self, payload: &[u8]) -> Result<(), SendError> {
        let stream = self.stream.take().ok_or(SendError::NotConnected)?;
        let policy = self.config.policy;

        let mut written = 0;
        while written < payload.len() {
            match stream.try_write(&payload[written..]) {
                Ok(0) => {
                    warn!(addr = %self.addr, "collector closed the connection mid-send");
                    return Err(SendError::ConnectionClosed);
                }
                Ok(n) => written += n,
                Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => match policy {
                    SendPolicy::WaitWritable => self.wait_writable(&stream).await?,
                    SendPolicy::ReconnectOnBlock => {
                        warn!(addr = %self.addr, "send buffer full, forcing reconnection");
                        return Err(SendError::BufferFull);
                    }
                },
                Err(e) => {
                    warn!(addr = %self.addr, error = %e, "channel error on send");
                    return Err(SendError::Io(e));
                }
            }
        }

        // Full payload written; keep the connection for the next record.
        self.stream = Some(stream);
        Ok(())
    }

    fn endpoint(&self) -> &str {
        &self.config.host
    }
}
