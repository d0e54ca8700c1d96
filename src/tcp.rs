//! TCP-specialized typed connection and listener.
//!
//! [`TcpTypedConnection`] can only ever hold a `TcpStream`, so the bulk
//! [`read_from`](TcpTypedConnection::read_from) never has to check what it
//! is reading from. Converting a generic [`TypedConnection`] performs that
//! check once, at construction.
//!
//! # Example
//!
//! ```ignore
//! use typed_sockets::codec::Text;
//! use typed_sockets::{dial_stream, TypedListener};
//!
//! let listener = TypedListener::<Text>::bind("127.0.0.1:0").await?;
//! let port = listener.local_addr()?.port();
//!
//! let mut client = dial_stream::<Text>("127.0.0.1", port).await?;
//! let mut server = listener.accept().await?;
//!
//! client.write(&Text::from("hello")).await?;
//! let mut greeting = Text::default();
//! server.read_from(&mut greeting).await?;
//! ```

use std::any::type_name;
use std::fmt;
use std::io;
use std::marker::PhantomData;
use std::net::SocketAddr;
use std::ops::{Deref, DerefMut};

use bytes::BytesMut;
use tokio::io::AsyncReadExt;
use tokio::net::{TcpListener, TcpStream, ToSocketAddrs};

use crate::codec::Convertible;
use crate::connection::{with_deadline, TypedConnection};
use crate::error::{Result, TypedSocketError};
use crate::options::ReadOptions;
use crate::transport::{Connection, ConnectionKind};

/// A [`TypedConnection`] over a TCP stream.
///
/// Derefs to the generic connection for `read`, `write`, deadlines and
/// addresses.
pub struct TcpTypedConnection<T> {
    inner: TypedConnection<T, TcpStream>,
}

impl<T> TcpTypedConnection<T> {
    /// Wrap an established TCP stream.
    pub fn new(stream: TcpStream) -> Self {
        Self {
            inner: TypedConnection::new(stream, ConnectionKind::Stream),
        }
    }

    /// Consume the wrapper, returning the generic connection.
    pub fn into_inner(self) -> TypedConnection<T, TcpStream> {
        self.inner
    }

    /// Shut down the write side and release the stream.
    pub async fn close(self) -> Result<()> {
        self.inner.close().await
    }
}

impl<T: Convertible> TcpTypedConnection<T> {
    /// Bulk-read a `T` using the default [`ReadOptions`].
    ///
    /// See [`read_from_with`](Self::read_from_with).
    pub async fn read_from(&mut self, data: &mut T) -> Result<u64> {
        self.read_from_with(data, ReadOptions::default()).await
    }

    /// Read a `T` with a single read into a `buffer_size` buffer.
    ///
    /// Unlike [`TypedConnection::read_with`] this makes one transfer and
    /// decodes whatever it delivered, so a payload larger than
    /// `buffer_size` (or split across segments) arrives truncated.
    ///
    /// The byte count is returned on every path that touched the socket,
    /// including decode failures. `data` is only written on success.
    pub async fn read_from_with(&mut self, data: &mut T, opts: ReadOptions) -> Result<u64> {
        opts.validate()?;

        let mut buffer = BytesMut::zeroed(opts.buffer_size);
        let conn = &mut self.inner.conn;
        let read = match with_deadline(self.inner.read_deadline, conn.read(&mut buffer)).await {
            Ok(read) => read,
            Err(source) => return Err(TypedSocketError::Receive { read: 0, source }),
        };

        buffer.truncate(read);
        let read = read as u64;
        tracing::trace!(read, capacity = opts.buffer_size, "bulk read");

        let value = T::unmarshal(&buffer).map_err(|e| TypedSocketError::Decode {
            type_name: type_name::<T>(),
            read,
            source: e.into(),
        })?;
        *data = value;

        Ok(read)
    }
}

impl<T> Deref for TcpTypedConnection<T> {
    type Target = TypedConnection<T, TcpStream>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl<T> DerefMut for TcpTypedConnection<T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.inner
    }
}

impl<T> From<TcpStream> for TcpTypedConnection<T> {
    fn from(stream: TcpStream) -> Self {
        Self::new(stream)
    }
}

/// Only a handle that is really a `TcpStream` converts; anything else fails
/// with [`TypedSocketError::UnsupportedOperation`] and is dropped unread.
impl<T, C: Connection> TryFrom<TypedConnection<T, C>> for TcpTypedConnection<T> {
    type Error = TypedSocketError;

    fn try_from(conn: TypedConnection<T, C>) -> Result<Self> {
        let TypedConnection {
            conn,
            kind,
            read_deadline,
            write_deadline,
            ..
        } = conn;

        match conn.into_stream() {
            Ok(stream) => {
                let mut inner = TypedConnection::new(stream, ConnectionKind::Stream);
                inner.read_deadline = read_deadline;
                inner.write_deadline = write_deadline;
                Ok(Self { inner })
            }
            Err(_) => Err(TypedSocketError::UnsupportedOperation { kind }),
        }
    }
}

impl<T> fmt::Debug for TcpTypedConnection<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TcpTypedConnection").field(&self.inner).finish()
    }
}

/// Connect to `host:port` over TCP and wrap the stream.
///
/// Connection failures are returned as [`TypedSocketError::Io`] unchanged.
pub async fn dial_stream<T>(host: &str, port: u16) -> Result<TcpTypedConnection<T>> {
    let stream = TcpStream::connect((host, port)).await?;
    tracing::debug!(host, port, "dialed stream connection");
    Ok(TcpTypedConnection::new(stream))
}

/// Type-safe wrapper over a listening TCP socket.
///
/// Every accepted connection comes back as a [`TcpTypedConnection<T>`].
/// Connections live independently of the listener that produced them.
///
/// `accept` borrows the listener and `close` needs it exclusively, so a
/// pending `accept` cannot be woken by `close` from another task. To stop
/// waiting, drop the `accept` future: race it with `tokio::select!` or
/// `tokio::time::timeout`. The listener stays usable afterwards.
pub struct TypedListener<T> {
    listener: Option<TcpListener>,
    _payload: PhantomData<fn() -> T>,
}

impl<T> TypedListener<T> {
    /// Wrap a bound, listening socket.
    pub fn new(listener: TcpListener) -> Self {
        Self {
            listener: Some(listener),
            _payload: PhantomData,
        }
    }

    /// Bind a new listener to `addr`.
    pub async fn bind(addr: impl ToSocketAddrs) -> Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        tracing::debug!(addr = ?listener.local_addr().ok(), "typed listener bound");
        Ok(Self::new(listener))
    }

    /// Wait for the next inbound connection.
    ///
    /// Fails immediately on a closed listener. Cancel-safe: dropping the
    /// future before it completes loses no connection.
    pub async fn accept(&self) -> Result<TcpTypedConnection<T>> {
        let (stream, peer) = self.listener()?.accept().await?;
        tracing::debug!(%peer, "accepted typed connection");
        Ok(TcpTypedConnection::new(stream))
    }

    /// Address the listener is bound to.
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener()?.local_addr()?)
    }

    /// Stop listening. Closing twice is an error.
    pub fn close(&mut self) -> Result<()> {
        match self.listener.take() {
            Some(listener) => {
                tracing::debug!(addr = ?listener.local_addr().ok(), "typed listener closed");
                Ok(())
            }
            None => Err(closed().into()),
        }
    }

    /// Whether [`close`](Self::close) has been called.
    pub fn is_closed(&self) -> bool {
        self.listener.is_none()
    }

    fn listener(&self) -> io::Result<&TcpListener> {
        self.listener.as_ref().ok_or_else(closed)
    }
}

impl<T> fmt::Debug for TypedListener<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypedListener")
            .field("listener", &self.listener)
            .field("payload", &type_name::<T>())
            .finish()
    }
}

fn closed() -> io::Error {
    io::Error::new(io::ErrorKind::NotConnected, "use of closed listener")
}
