//! UDP client for AbletonOSC.
//!
//! Architecture: one socket, one listener task, many callers
//! - Socket bound once on the listen address; used to send to the peer and
//!   to receive its replies
//! - Listener task owns the receive side and routes replies by address
//!   through the [`Correlator`]
//! - Callers send directly on the shared socket (UDP sends don't need a lock)
//!
//! Usage:
//! ```ignore
//! let client = OscClient::open(ClientConfig::default()).await?;
//! client.command("/live/song/start_playing", &[]).await?;
//! let version = client.query("/live/application/get/version", &[]).await?;
//! client.close().await;
//! ```

use std::io;
use std::net::{SocketAddr, ToSocketAddrs};
use std::sync::Arc;
use std::time::Duration;

use tokio::net::UdpSocket;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use crate::correlator::Correlator;
use crate::error::ClientError;
use crate::packet::{self, OscArg, OscMessage};

/// Address AbletonOSC uses to report errors it hit handling our messages
pub const ERROR_ADDRESS: &str = "/live/error";

/// Default port AbletonOSC receives on
pub const DEFAULT_SEND_PORT: u16 = 11000;

/// Default port AbletonOSC replies to
pub const DEFAULT_LISTEN_PORT: u16 = 11001;

/// Largest UDP payload over IPv4
pub const DEFAULT_MAX_DATAGRAM: usize = 65_507;

/// Smallest receive buffer: room for a short address and one argument
pub const MIN_DATAGRAM: usize = 16;

/// Configuration for OscClient
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Name used as the log prefix
    pub name: String,
    /// Where AbletonOSC receives
    pub peer: SocketAddr,
    /// Local address we bind, and where AbletonOSC replies
    pub listen: SocketAddr,
    /// Query timeout used when the caller doesn't pass one
    pub timeout: Duration,
    /// Receive buffer size; larger datagrams are truncated by the OS
    pub max_datagram: usize,
}

impl ClientConfig {
    /// Library-wide default query timeout
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(2);

    pub fn new(name: &str, peer: SocketAddr) -> Self {
        Self {
            name: name.to_string(),
            peer,
            listen: SocketAddr::from(([0, 0, 0, 0], DEFAULT_LISTEN_PORT)),
            timeout: Self::DEFAULT_TIMEOUT,
            max_datagram: DEFAULT_MAX_DATAGRAM,
        }
    }

    pub fn with_listen(mut self, listen: SocketAddr) -> Self {
        self.listen = listen;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Values below [`MIN_DATAGRAM`] are raised to it.
    pub fn with_max_datagram(mut self, max_datagram: usize) -> Self {
        self.max_datagram = max_datagram.max(MIN_DATAGRAM);
        self
    }

    /// Build from loaded configuration, resolving host names.
    pub fn from_config(name: &str, config: &liveconf::LiveConfig) -> Result<Self, ClientError> {
        if config.client.max_datagram < MIN_DATAGRAM {
            return Err(ClientError::InvalidConfig {
                field: "max_datagram",
                reason: format!(
                    "{} bytes is below the minimum of {}",
                    config.client.max_datagram, MIN_DATAGRAM
                ),
            });
        }

        let peer = resolve(&config.peer.send_addr())?;
        let listen = resolve(&config.peer.listen_addr())?;

        Ok(Self::new(name, peer)
            .with_listen(listen)
            .with_timeout(Duration::from_millis(config.client.timeout_ms))
            .with_max_datagram(config.client.max_datagram))
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(
            "liveosc",
            SocketAddr::from(([127, 0, 0, 1], DEFAULT_SEND_PORT)),
        )
    }
}

/// Resolve `host:port` to the first address it yields.
fn resolve(endpoint: &str) -> Result<SocketAddr, ClientError> {
    endpoint
        .to_socket_addrs()
        .map_err(|e| ClientError::InvalidEndpoint {
            endpoint: endpoint.to_string(),
            reason: e.to_string(),
        })?
        .next()
        .ok_or_else(|| ClientError::InvalidEndpoint {
            endpoint: endpoint.to_string(),
            reason: "no addresses".to_string(),
        })
}

/// The listener task - owns the receive side of the socket.
///
/// Runs until `shutdown` fires. Malformed datagrams and receive errors are
/// logged and skipped. On exit every pending waiter is woken with a closed
/// signal.
async fn listener_task(
    socket: Arc<UdpSocket>,
    correlator: Arc<Correlator>,
    shutdown: CancellationToken,
    name: String,
    max_datagram: usize,
) {
    let mut buf = vec![0u8; max_datagram];

    debug!("{}: Listener started", name);

    loop {
        tokio::select! {
            // Shutdown first so close() never waits behind a busy socket
            biased;

            _ = shutdown.cancelled() => {
                debug!("{}: Listener shutting down", name);
                break;
            }

            result = socket.recv_from(&mut buf) => {
                match result {
                    Ok((len, from)) => route_datagram(&buf[..len], from, &correlator, &name),
                    Err(e) => {
                        // ICMP unreachable surfaces here on some platforms
                        warn!("{}: Receive error: {}", name, e);
                    }
                }
            }
        }
    }

    let cancelled = correlator.close();
    if cancelled > 0 {
        info!("{}: Listener stopped, cancelled {} pending queries", name, cancelled);
    }
    debug!("{}: Listener exited", name);
}

/// Decode one datagram and hand each message to its waiter.
fn route_datagram(datagram: &[u8], from: SocketAddr, correlator: &Correlator, name: &str) {
    let messages = match packet::decode(datagram) {
        Ok(messages) => messages,
        Err(e) => {
            warn!(
                "{}: Dropping malformed datagram from {} ({} bytes): {}",
                name,
                from,
                datagram.len(),
                e
            );
            return;
        }
    };

    for message in messages {
        if message.address == ERROR_ADDRESS {
            warn!("{}: Peer reported error: {}", name, message);
        }
        trace!("{}: Received {} from {}", name, message, from);

        if let Some(orphan) = correlator.deliver(message) {
            debug!("{}: Discarding unsolicited {}", name, orphan.address);
        }
    }
}

/// OSC client: fire-and-forget commands plus address-correlated queries.
///
/// Shared by any number of tasks through `Arc`. Closing is explicit; a
/// dropped client only signals its listener to stop.
pub struct OscClient {
    config: ClientConfig,
    socket: Arc<UdpSocket>,
    local_addr: SocketAddr,
    correlator: Arc<Correlator>,
    shutdown: CancellationToken,
    listener: Mutex<Option<JoinHandle<()>>>,
}

impl OscClient {
    /// Bind the socket and spawn the listener task.
    ///
    /// The peer doesn't need to be running; UDP has no handshake.
    pub async fn open(config: ClientConfig) -> Result<Arc<Self>, ClientError> {
        let socket = UdpSocket::bind(config.listen)
            .await
            .map_err(|source| ClientError::Transport {
                target: config.listen.to_string(),
                source,
            })?;
        let local_addr = socket.local_addr().map_err(|source| ClientError::Transport {
            target: config.listen.to_string(),
            source,
        })?;

        info!(
            "{}: Listening on {}, sending to {}",
            config.name, local_addr, config.peer
        );

        let socket = Arc::new(socket);
        let correlator = Correlator::new();
        let shutdown = CancellationToken::new();

        let listener = tokio::spawn(listener_task(
            Arc::clone(&socket),
            Arc::clone(&correlator),
            shutdown.clone(),
            config.name.clone(),
            // The field is public, so the builder's clamp may have been bypassed
            config.max_datagram.max(MIN_DATAGRAM),
        ));

        Ok(Arc::new(Self {
            config,
            socket,
            local_addr,
            correlator,
            shutdown,
            listener: Mutex::new(Some(listener)),
        }))
    }

    /// Send a one-way message. Never waits for a reply.
    pub async fn command(&self, address: &str, args: &[OscArg]) -> Result<(), ClientError> {
        if self.is_closed() {
            return Err(ClientError::Transport {
                target: self.config.peer.to_string(),
                source: io::Error::new(io::ErrorKind::NotConnected, "client closed"),
            });
        }

        self.send(address, args).await
    }

    /// Query with the configured default timeout.
    pub async fn query(&self, address: &str, args: &[OscArg]) -> Result<Vec<OscArg>, ClientError> {
        self.query_with_timeout(address, args, self.config.timeout)
            .await
    }

    /// Send `address` and wait up to `timeout` for the next message on it.
    ///
    /// Fails with `Busy` if another query on `address` is outstanding,
    /// `Timeout` if nothing arrives in time, and `ConnectionClosed` if the
    /// client is (or becomes) closed.
    pub async fn query_with_timeout(
        &self,
        address: &str,
        args: &[OscArg],
        timeout: Duration,
    ) -> Result<Vec<OscArg>, ClientError> {
        if self.is_closed() {
            return Err(ClientError::ConnectionClosed {
                address: address.to_string(),
            });
        }

        // Register before sending so a fast reply can't slip past us
        let waiter = self.correlator.register(address, timeout)?;
        self.send(address, args).await?;

        let result = waiter.wait().await;
        match &result {
            Ok(reply) => trace!("{}: {} answered with {} values", self.config.name, address, reply.len()),
            Err(e) => debug!("{}: Query failed: {}", self.config.name, e),
        }
        result
    }

    async fn send(&self, address: &str, args: &[OscArg]) -> Result<(), ClientError> {
        let message = OscMessage::new(address, args.to_vec());
        let bytes = message.encode().map_err(|source| ClientError::Encode {
            address: address.to_string(),
            source,
        })?;

        self.socket
            .send_to(&bytes, self.config.peer)
            .await
            .map_err(|source| {
                warn!("{}: Send of {} failed: {}", self.config.name, address, source);
                ClientError::Transport {
                    target: self.config.peer.to_string(),
                    source,
                }
            })?;

        trace!("{}: Sent {}", self.config.name, message);
        Ok(())
    }

    /// Stop the listener and release the socket's receive side.
    ///
    /// Outstanding queries fail with `ConnectionClosed`. Returns only after
    /// the listener task has exited. Safe to call more than once.
    pub async fn close(&self) {
        let mut listener = self.listener.lock().await;
        self.shutdown.cancel();

        if let Some(handle) = listener.take() {
            if let Err(e) = handle.await {
                warn!("{}: Listener task failed: {}", self.config.name, e);
            }
            info!("{}: Closed", self.config.name);
        }

        // Covers a listener that died without reaching its own cleanup
        self.correlator.close();
    }

    pub fn is_closed(&self) -> bool {
        self.shutdown.is_cancelled()
    }

    /// Number of queries currently waiting for a reply
    pub fn pending(&self) -> usize {
        self.correlator.pending()
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn peer(&self) -> SocketAddr {
        self.config.peer
    }

    /// Address actually bound (resolves port 0)
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn default_timeout(&self) -> Duration {
        self.config.timeout
    }
}

impl Drop for OscClient {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}
