//! TCP transport implementation using `tokio::net`.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::sync::Mutex;

use crate::{Connection, ConnectionId, LineFramer, Transport, TransportError};

/// Counter for generating unique connection IDs.
static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

/// Size of the scratch buffer used for each socket read.
const READ_CHUNK: usize = 1024;

/// A TCP-based [`Transport`] that listens for incoming connections.
pub struct TcpTransport {
    listener: TcpListener,
}

impl TcpTransport {
    /// Binds a new TCP transport to the given address.
    pub async fn bind(addr: &str) -> Result<Self, TransportError> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(TransportError::AcceptFailed)?;
        tracing::info!(addr, "TCP transport listening");
        Ok(Self { listener })
    }

    /// Returns the address the listener is bound to.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }
}

impl Transport for TcpTransport {
    type Connection = TcpConnection;
    type Error = TransportError;

    async fn accept(&mut self) -> Result<Self::Connection, Self::Error> {
        let (stream, addr) = self
            .listener
            .accept()
            .await
            .map_err(TransportError::AcceptFailed)?;

        // Guess replies are tiny; don't let Nagle hold them back.
        if let Err(e) = stream.set_nodelay(true) {
            tracing::debug!(%addr, error = %e, "failed to set TCP_NODELAY");
        }

        let id = ConnectionId::new(
            NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed),
        );
        tracing::debug!(%id, %addr, "accepted TCP connection");

        let (read_half, write_half) = stream.into_split();
        Ok(TcpConnection {
            id,
            peer_addr: addr,
            reader: Mutex::new(FramedReader {
                half: read_half,
                framer: LineFramer::new(),
            }),
            writer: Mutex::new(write_half),
        })
    }
}

/// The read side of a connection together with its accumulation buffer.
struct FramedReader {
    half: OwnedReadHalf,
    framer: LineFramer,
}

/// A single TCP connection speaking newline-delimited frames.
///
/// Reads and writes lock independent halves, so a task blocked in
/// [`recv`](Connection::recv) never delays a concurrent
/// [`send`](Connection::send).
pub struct TcpConnection {
    id: ConnectionId,
    peer_addr: SocketAddr,
    reader: Mutex<FramedReader>,
    writer: Mutex<OwnedWriteHalf>,
}

impl TcpConnection {
    /// Returns the remote peer's address.
    pub fn peer_addr(&self) -> SocketAddr {
        self.peer_addr
    }
}

impl Connection for TcpConnection {
    type Error = TransportError;

    async fn send(&self, data: &[u8]) -> Result<(), Self::Error> {
        let frame = LineFramer::encode(data)?;
        self.writer
            .lock()
            .await
            .write_all(&frame)
            .await
            .map_err(TransportError::SendFailed)
    }

    /// Cancel-safe: the framer lives behind the lock, and a single
    /// `read` either completes or leaves the socket untouched, so a
    /// caller may race this against other futures in `select!`.
    async fn recv(&self) -> Result<Option<Vec<u8>>, Self::Error> {
        let mut reader = self.reader.lock().await;
        let mut chunk = [0u8; READ_CHUNK];
        loop {
            if let Some(frame) = reader.framer.next_frame()? {
                return Ok(Some(frame));
            }
            let n = reader
                .half
                .read(&mut chunk)
                .await
                .map_err(TransportError::ReceiveFailed)?;
            if n == 0 {
                if reader.framer.buffered() > 0 {
                    tracing::debug!(
                        id = %self.id,
                        bytes = reader.framer.buffered(),
                        "peer closed with a partial frame buffered"
                    );
                }
                return Ok(None);
            }
            reader.framer.extend(&chunk[..n]);
        }
    }

    async fn close(&self) -> Result<(), Self::Error> {
        self.writer
            .lock()
            .await
            .shutdown()
            .await
            .map_err(TransportError::SendFailed)
    }

    fn id(&self) -> ConnectionId {
        self.id
    }
}
