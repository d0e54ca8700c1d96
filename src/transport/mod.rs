//! Transport module - the raw connection handles a typed connection wraps.
//!
//! Provides:
//! - [`ConnectionKind`] - descriptive stream/datagram tag
//! - [`Connection`] - the capability set a handle must offer
//! - [`DatagramStream`] - a connected UDP socket exposed as a byte stream

mod datagram;

use std::fmt;
use std::io;
use std::net::SocketAddr;

use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;

pub use datagram::DatagramStream;

/// Kind of transport underneath a typed connection.
///
/// Purely descriptive: it never changes how bytes move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectionKind {
    /// Ordered, reliable byte stream (TCP).
    Stream,
    /// Message-oriented, unreliable datagrams (UDP).
    Datagram,
}

impl fmt::Display for ConnectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stream => f.write_str("tcp"),
            Self::Datagram => f.write_str("udp"),
        }
    }
}

/// An established, byte-oriented connection handle.
pub trait Connection: AsyncRead + AsyncWrite + Unpin + Send {
    /// Local address of the handle.
    fn local_addr(&self) -> io::Result<SocketAddr>;

    /// Address of the remote peer.
    fn peer_addr(&self) -> io::Result<SocketAddr>;

    /// Hand back the handle as a TCP stream if it is one.
    ///
    /// Only `TcpStream` returns `Ok`; every other handle returns itself.
    fn into_stream(self) -> Result<TcpStream, Self>
    where
        Self: Sized,
    {
        Err(self)
    }
}

impl Connection for TcpStream {
    fn local_addr(&self) -> io::Result<SocketAddr> {
        TcpStream::local_addr(self)
    }

    fn peer_addr(&self) -> io::Result<SocketAddr> {
        TcpStream::peer_addr(self)
    }

    fn into_stream(self) -> Result<TcpStream, Self> {
        Ok(self)
    }
}
