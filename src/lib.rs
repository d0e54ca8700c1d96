//! # typed-sockets
//!
//! Type-safe wrappers over TCP and UDP connections.
//!
//! Callers exchange values of one payload type instead of byte buffers. How a
//! value becomes bytes is up to the payload, through the
//! [`Convertible`](codec::Convertible) trait; this crate adds no framing.
//!
//! ## Architecture
//!
//! - **codec**: the `Convertible` contract plus ready-made `Text`, `Raw`,
//!   `Json` and `MsgPack` payloads
//! - **transport**: the raw handles a typed connection can own
//! - [`TypedConnection`]: chunked typed reads and writes over any handle
//! - [`TcpTypedConnection`] / [`TypedListener`]: TCP-only bulk reads, dialing
//!   and accepting
//!
//! ## Example
//!
//! ```no_run
//! use typed_sockets::codec::Text;
//! use typed_sockets::{dial_stream, TypedListener};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let listener = TypedListener::<Text>::bind("127.0.0.1:0").await?;
//!     let port = listener.local_addr()?.port();
//!
//!     let mut client = dial_stream::<Text>("127.0.0.1", port).await?;
//!     let mut server = listener.accept().await?;
//!
//!     client.write(&Text::from("hello")).await?;
//!
//!     let mut greeting = Text::default();
//!     server.read_from(&mut greeting).await?;
//!     assert_eq!(greeting, "hello");
//!     Ok(())
//! }
//! ```

pub mod codec;
pub mod error;
pub mod options;
pub mod transport;

mod connection;
mod tcp;

pub use connection::{dial_datagram, TypedConnection};
pub use error::{Result, TypedSocketError};
pub use options::ReadOptions;
pub use tcp::{dial_stream, TcpTypedConnection, TypedListener};
pub use transport::{Connection, ConnectionKind, DatagramStream};
