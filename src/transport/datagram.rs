//! Connected UDP socket adapted to `AsyncRead`/`AsyncWrite`.
//!
//! Each `poll_write` sends its whole buffer as one datagram and each
//! `poll_read` receives one datagram. A datagram larger than the read buffer
//! is truncated by the kernel, so readers should size chunks to the largest
//! expected message.

use std::io;
use std::net::SocketAddr;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};
use tokio::net::{ToSocketAddrs, UdpSocket};

use super::Connection;

/// UDP socket with a fixed peer.
#[derive(Debug)]
pub struct DatagramStream {
    socket: UdpSocket,
}

impl DatagramStream {
    /// Bind an unconnected socket to `addr`.
    ///
    /// Call [`DatagramStream::connect`] before reading or writing.
    pub async fn bind(addr: impl ToSocketAddrs) -> io::Result<Self> {
        let socket = UdpSocket::bind(addr).await?;
        Ok(Self { socket })
    }

    /// Fix the peer address. Datagrams from any other address are dropped.
    pub async fn connect(&self, peer: impl ToSocketAddrs) -> io::Result<()> {
        self.socket.connect(peer).await
    }

    /// Wrap an existing socket. It must already be connected.
    pub fn from_socket(socket: UdpSocket) -> Self {
        Self { socket }
    }

    /// Get a reference to the underlying socket.
    pub fn inner(&self) -> &UdpSocket {
        &self.socket
    }

    /// Consume the wrapper, returning the socket.
    pub fn into_inner(self) -> UdpSocket {
        self.socket
    }
}

impl Connection for DatagramStream {
    fn local_addr(&self) -> io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    fn peer_addr(&self) -> io::Result<SocketAddr> {
        self.socket.peer_addr()
    }
}

impl AsyncRead for DatagramStream {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        self.socket.poll_recv(cx, buf)
    }
}

impl AsyncWrite for DatagramStream {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        self.socket.poll_send(cx, buf)
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }
}
