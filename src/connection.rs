//! Generic typed connection.
//!
//! [`TypedConnection`] turns any [`Connection`] into a channel for exactly one
//! payload type. Bytes are converted at the boundary through
//! [`Convertible`]; the connection itself adds no framing.
//!
//! # Example
//!
//! ```ignore
//! use typed_sockets::codec::Text;
//! use typed_sockets::{ConnectionKind, TypedConnection};
//!
//! let mut conn = TypedConnection::<Text, _>::new(stream, ConnectionKind::Stream);
//! conn.write(&Text::from("hello")).await?;
//! ```

use std::any::type_name;
use std::fmt;
use std::future::Future;
use std::io;
use std::marker::PhantomData;
use std::net::SocketAddr;

use bytes::BytesMut;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::lookup_host;
use tokio::time::{timeout_at, Instant};

use crate::codec::Convertible;
use crate::error::{Result, TypedSocketError};
use crate::options::ReadOptions;
use crate::transport::{Connection, ConnectionKind, DatagramStream};

/// Type-safe wrapper over a stream or datagram connection.
///
/// Owns the handle exclusively: [`close`](Self::close) shuts it down and
/// dropping the wrapper drops it. Reads and writes take `&mut self`, so one
/// wrapper serves one logical reader/writer at a time.
///
/// Prefer [`TcpTypedConnection`](crate::TcpTypedConnection) for TCP; it adds
/// the bulk [`read_from`](crate::TcpTypedConnection::read_from).
pub struct TypedConnection<T, C> {
    pub(crate) conn: C,
    pub(crate) kind: ConnectionKind,
    pub(crate) read_deadline: Option<Instant>,
    pub(crate) write_deadline: Option<Instant>,
    pub(crate) _payload: PhantomData<fn() -> T>,
}

impl<T, C: Connection> TypedConnection<T, C> {
    /// Wrap an established connection.
    pub fn new(conn: C, kind: ConnectionKind) -> Self {
        Self {
            conn,
            kind,
            read_deadline: None,
            write_deadline: None,
            _payload: PhantomData,
        }
    }

    /// The transport kind this wrapper was built with.
    pub fn kind(&self) -> ConnectionKind {
        self.kind
    }

    /// Local address of the connection.
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.conn.local_addr()?)
    }

    /// Remote address of the connection.
    pub fn peer_addr(&self) -> Result<SocketAddr> {
        Ok(self.conn.peer_addr()?)
    }

    /// Set both the read and write deadlines.
    ///
    /// An I/O call still pending when the deadline passes fails with
    /// [`io::ErrorKind::TimedOut`]. `None` clears the deadline.
    pub fn set_deadline(&mut self, deadline: impl Into<Option<Instant>>) {
        let deadline = deadline.into();
        self.read_deadline = deadline;
        self.write_deadline = deadline;
    }

    /// Set the deadline for future reads.
    pub fn set_read_deadline(&mut self, deadline: impl Into<Option<Instant>>) {
        self.read_deadline = deadline.into();
    }

    /// Set the deadline for future writes.
    pub fn set_write_deadline(&mut self, deadline: impl Into<Option<Instant>>) {
        self.write_deadline = deadline.into();
    }

    /// Get a reference to the underlying connection.
    pub fn get_ref(&self) -> &C {
        &self.conn
    }

    /// Get a mutable reference to the underlying connection.
    ///
    /// Reading from it directly bypasses the payload conversion.
    pub fn get_mut(&mut self) -> &mut C {
        &mut self.conn
    }

    /// Consume the wrapper, returning the connection.
    pub fn into_inner(self) -> C {
        self.conn
    }

    /// Shut down the write side and release the handle.
    pub async fn close(mut self) -> Result<()> {
        tracing::debug!(kind = %self.kind, "closing typed connection");
        self.conn.shutdown().await?;
        Ok(())
    }
}

impl<T: Convertible, C: Connection> TypedConnection<T, C> {
    /// Read a `T` from the connection using the default [`ReadOptions`].
    ///
    /// See [`read_with`](Self::read_with).
    pub async fn read(&mut self, data: &mut T) -> Result<usize> {
        self.read_with(data, ReadOptions::default()).await
    }

    /// Read a `T` from the connection, pulling `chunk_size` bytes at a time.
    ///
    /// Chunks are accumulated until the connection either reports end of
    /// stream or fails:
    ///
    /// - End of stream returns [`TypedSocketError::EndOfStream`] carrying the
    ///   number of bytes consumed. Those bytes are not decoded. A zero-length
    ///   read is end of stream, so on a [`DatagramStream`] an empty datagram
    ///   ends the read this way too.
    /// - Any other read error (including an expired read deadline) ends the
    ///   accumulation, and whatever was buffered is decoded. The error itself
    ///   is logged and not returned.
    ///
    /// On success `data` is overwritten and the number of bytes decoded is
    /// returned. On a decode failure `data` is left untouched.
    pub async fn read_with(&mut self, data: &mut T, opts: ReadOptions) -> Result<usize> {
        opts.validate()?;

        let mut buffer = BytesMut::with_capacity(opts.buffer_size);
        let mut chunk = vec![0u8; opts.chunk_size];

        loop {
            match with_deadline(self.read_deadline, self.conn.read(&mut chunk)).await {
                Ok(0) => {
                    return Err(TypedSocketError::EndOfStream {
                        consumed: buffer.len(),
                    })
                }
                Ok(amount) => {
                    tracing::trace!(amount, buffered = buffer.len(), "read chunk");
                    buffer.extend_from_slice(&chunk[..amount]);
                }
                Err(e) => {
                    // TODO: decide with users of partial reads whether this should propagate instead
                    tracing::warn!(
                        error = %e,
                        buffered = buffer.len(),
                        "read stopped on transport error, converting buffered data"
                    );
                    break;
                }
            }
        }

        let value = T::unmarshal(&buffer).map_err(|e| TypedSocketError::Unmarshal {
            source: e.into(),
        })?;
        *data = value;

        Ok(buffer.len())
    }

    /// Marshal `data` and write it to the connection.
    ///
    /// Returns the number of bytes written. If marshalling fails nothing is
    /// sent.
    pub async fn write(&mut self, data: &T) -> Result<usize> {
        let buffer = data.marshal().map_err(|e| TypedSocketError::Marshal {
            source: e.into(),
        })?;

        let conn = &mut self.conn;
        with_deadline(self.write_deadline, async {
            conn.write_all(&buffer).await?;
            conn.flush().await
        })
        .await?;

        tracing::trace!(amount = buffer.len(), payload = type_name::<T>(), "wrote payload");
        Ok(buffer.len())
    }
}

impl<T, C: fmt::Debug> fmt::Debug for TypedConnection<T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypedConnection")
            .field("conn", &self.conn)
            .field("kind", &self.kind)
            .field("payload", &type_name::<T>())
            .field("read_deadline", &self.read_deadline)
            .field("write_deadline", &self.write_deadline)
            .finish()
    }
}

/// Connect a UDP socket to `host:port` and wrap it as a datagram connection.
///
/// The local socket is bound to an ephemeral port of the same address
/// family as the first resolved peer address.
pub async fn dial_datagram<T>(host: &str, port: u16) -> Result<TypedConnection<T, DatagramStream>> {
    let peer = lookup_host((host, port)).await?.next().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::AddrNotAvailable,
            format!("no address found for {}:{}", host, port),
        )
    })?;

    let local: SocketAddr = if peer.is_ipv4() {
        ([0, 0, 0, 0], 0).into()
    } else {
        ([0u16; 8], 0).into()
    };

    let socket = DatagramStream::bind(local).await?;
    socket.connect(peer).await?;
    tracing::debug!(%peer, "dialed datagram connection");

    Ok(TypedConnection::new(socket, ConnectionKind::Datagram))
}

/// Run an I/O future, failing with `TimedOut` once `deadline` passes.
pub(crate) async fn with_deadline<F, R>(deadline: Option<Instant>, io: F) -> io::Result<R>
where
    F: Future<Output = io::Result<R>>,
{
    match deadline {
        Some(deadline) => timeout_at(deadline, io)
            .await
            .map_err(|_| io::Error::new(io::ErrorKind::TimedOut, "i/o deadline exceeded"))?,
        None => io.await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{Json, Text};
    use serde::{Deserialize, Serialize};
    use std::time::Duration;
    use tokio::net::{TcpListener, TcpStream};

    async fn tcp_pair() -> (TcpStream, TcpStream) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (client, accepted) = tokio::join!(TcpStream::connect(addr), listener.accept());
        (client.unwrap(), accepted.unwrap().0)
    }

    async fn typed_pair<T>() -> (TypedConnection<T, TcpStream>, TypedConnection<T, TcpStream>) {
        let (a, b) = tcp_pair().await;
        (
            TypedConnection::new(a, ConnectionKind::Stream),
            TypedConnection::new(b, ConnectionKind::Stream),
        )
    }

    fn soon() -> Instant {
        Instant::now() + Duration::from_millis(200)
    }

    /// Payload whose marshal always fails.
    #[derive(Debug, PartialEq)]
    struct Refusing;

    impl fmt::Display for Refusing {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("refusing")
        }
    }

    impl Convertible for Refusing {
        type Error = io::Error;

        fn marshal(&self) -> std::result::Result<Vec<u8>, Self::Error> {
            Err(io::Error::new(io::ErrorKind::InvalidData, "refused"))
        }

        fn unmarshal(_: &[u8]) -> std::result::Result<Self, Self::Error> {
            Ok(Refusing)
        }
    }

    #[tokio::test]
    async fn test_read_until_deadline_decodes_buffer() {
        let (mut client, mut server) = typed_pair::<Text>().await;

        assert_eq!(client.write(&Text::from("hello")).await.unwrap(), 5);

        server.set_read_deadline(soon());
        let mut dest = Text::default();
        assert_eq!(server.read(&mut dest).await.unwrap(), 5);
        assert_eq!(dest, "hello");
    }

    #[tokio::test]
    async fn test_small_chunks_accumulate() {
        let (mut client, mut server) = typed_pair::<Text>().await;

        client.write(&Text::from("hello world")).await.unwrap();

        server.set_read_deadline(soon());
        let mut dest = Text::default();
        let read = server
            .read_with(&mut dest, ReadOptions::new(4, 2))
            .await
            .unwrap();
        assert_eq!(read, 11);
        assert_eq!(dest, "hello world");
    }

    #[tokio::test]
    async fn test_end_of_stream_reports_consumed_bytes() {
        let (mut client, mut server) = typed_pair::<Text>().await;

        client.write(&Text::from("hello")).await.unwrap();
        client.close().await.unwrap();

        let mut dest = Text::from("untouched");
        let err = server.read(&mut dest).await.unwrap_err();
        assert!(matches!(err, TypedSocketError::EndOfStream { consumed: 5 }));
        assert_eq!(err.bytes_read(), 5);
        assert_eq!(dest, "untouched");
    }

    #[tokio::test]
    async fn test_malformed_payload_leaves_destination() {
        let (mut client, mut server) = typed_pair::<Text>().await;

        client.get_mut().write_all(&[0xff, 0xfe, 0xfd]).await.unwrap();

        server.set_read_deadline(soon());
        let mut dest = Text::from("before");
        let err = server.read(&mut dest).await.unwrap_err();
        assert!(matches!(err, TypedSocketError::Unmarshal { .. }));
        assert_eq!(err.bytes_read(), 0);
        assert_eq!(dest, "before");
    }

    #[tokio::test]
    async fn test_invalid_options_touch_nothing() {
        let (mut client, mut server) = typed_pair::<Text>().await;

        client.write(&Text::from("kept")).await.unwrap();

        let mut dest = Text::from("before");
        let err = server
            .read_with(&mut dest, ReadOptions::new(16, 0))
            .await
            .unwrap_err();
        assert!(matches!(err, TypedSocketError::InvalidArgument(_)));
        assert_eq!(dest, "before");

        // The payload is still waiting on the socket
        server.set_read_deadline(soon());
        assert_eq!(server.read(&mut dest).await.unwrap(), 4);
        assert_eq!(dest, "kept");
    }

    #[tokio::test]
    async fn test_default_options_match_explicit_defaults() {
        let (mut client_a, mut server_a) = typed_pair::<Text>().await;
        let (mut client_b, mut server_b) = typed_pair::<Text>().await;

        let payload = Text::new("x".repeat(1000));
        client_a.write(&payload).await.unwrap();
        client_b.write(&payload).await.unwrap();

        server_a.set_read_deadline(soon());
        server_b.set_read_deadline(soon());

        let mut implicit = Text::default();
        let mut explicit = Text::default();
        let a = server_a.read(&mut implicit).await.unwrap();
        let b = server_b
            .read_with(&mut explicit, ReadOptions::new(4096, 256))
            .await
            .unwrap();

        assert_eq!(a, b);
        assert_eq!(implicit, explicit);
    }

    #[tokio::test]
    async fn test_marshal_failure_sends_nothing() {
        let (client, mut server) = tcp_pair().await;
        let mut client = TypedConnection::<Refusing, _>::new(client, ConnectionKind::Stream);

        let err = client.write(&Refusing).await.unwrap_err();
        assert!(matches!(err, TypedSocketError::Marshal { .. }));
        drop(client);

        let mut seen = Vec::new();
        server.read_to_end(&mut seen).await.unwrap();
        assert!(seen.is_empty());
    }

    #[tokio::test]
    async fn test_json_payload_over_tcp() {
        #[derive(Serialize, Deserialize, PartialEq, Debug, Default)]
        struct Job {
            id: u64,
            args: Vec<String>,
        }

        let (mut client, mut server) = typed_pair::<Json<Job>>().await;
        let job = Json(Job {
            id: 9,
            args: vec!["--fast".to_string()],
        });
        client.write(&job).await.unwrap();

        server.set_deadline(soon());
        let mut dest = Json::<Job>::default();
        server.read(&mut dest).await.unwrap();
        assert_eq!(dest, job);
    }

    #[tokio::test]
    async fn test_passthroughs() {
        let (client, server) = typed_pair::<Text>().await;

        assert_eq!(client.kind(), ConnectionKind::Stream);
        assert_eq!(client.peer_addr().unwrap(), server.local_addr().unwrap());
        assert_eq!(client.local_addr().unwrap(), server.peer_addr().unwrap());
    }

    #[tokio::test]
    async fn test_datagram_exchange() {
        let server_socket = DatagramStream::bind("127.0.0.1:0").await.unwrap();
        let port = server_socket.local_addr().unwrap().port();

        let mut client = dial_datagram::<Text>("127.0.0.1", port).await.unwrap();
        server_socket
            .connect(client.local_addr().unwrap())
            .await
            .unwrap();
        let mut server = TypedConnection::<Text, _>::new(server_socket, ConnectionKind::Datagram);

        assert_eq!(client.kind(), ConnectionKind::Datagram);
        client.write(&Text::from("ping")).await.unwrap();

        server.set_read_deadline(soon());
        let mut dest = Text::default();
        assert_eq!(server.read(&mut dest).await.unwrap(), 4);
        assert_eq!(dest, "ping");
    }

    #[tokio::test]
    async fn test_empty_datagram_is_end_of_stream() {
        let mut sender = DatagramStream::bind("127.0.0.1:0").await.unwrap();
        let receiver = DatagramStream::bind("127.0.0.1:0").await.unwrap();
        sender.connect(receiver.local_addr().unwrap()).await.unwrap();
        receiver.connect(sender.local_addr().unwrap()).await.unwrap();
        let mut receiver = TypedConnection::<Text, _>::new(receiver, ConnectionKind::Datagram);

        sender.write_all(b"abc").await.unwrap();
        sender.write(b"").await.unwrap();

        receiver.set_read_deadline(soon());
        let mut dest = Text::from("before");
        let err = receiver.read(&mut dest).await.unwrap_err();
        assert!(matches!(err, TypedSocketError::EndOfStream { consumed: 3 }));
        assert_eq!(dest, "before");
    }

    #[tokio::test]
    async fn test_with_deadline_times_out() {
        let err = with_deadline(Some(Instant::now()), std::future::pending::<io::Result<()>>())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::TimedOut);
    }
}
