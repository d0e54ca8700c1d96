//! Codec module - the marshal/unmarshal contract for typed payloads.
//!
//! A typed connection never looks at the byte layout of what it carries.
//! Everything that crosses the wire goes through [`Convertible`]:
//!
//! - [`Text`] - UTF-8 string payload
//! - [`Raw`] - Pass-through for raw bytes
//! - [`Json`] - Any serde type as a JSON document (`serde_json`)
//! - [`MsgPack`] - Any serde type as MessagePack (`rmp-serde`, struct-as-map)
//!
//! # Example
//!
//! ```
//! use typed_sockets::codec::{Convertible, Json, Text};
//!
//! let text = Text::from("hello");
//! let bytes = text.marshal().unwrap();
//! assert_eq!(Text::unmarshal(&bytes).unwrap(), text);
//!
//! let json = Json(vec![1, 2, 3]);
//! assert_eq!(json.marshal().unwrap(), b"[1,2,3]");
//! assert_eq!(json.to_string(), "[1,2,3]");
//! ```

mod json;
mod msgpack;
mod raw;
mod text;

use std::fmt;

pub use json::Json;
pub use msgpack::{MsgPack, MsgPackError};
pub use raw::Raw;
pub use text::Text;

/// A payload type that can be converted to and from bytes.
///
/// `unmarshal(marshal(v))` must rebuild a value equal to `v`. `unmarshal`
/// may fail on malformed input; it must never panic. The [`fmt::Display`]
/// supertrait is the human-readable rendering of a value.
pub trait Convertible: Sized + fmt::Display {
    /// Failure produced by either direction of the conversion.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Encode the current value in a format chosen by the implementer.
    fn marshal(&self) -> Result<Vec<u8>, Self::Error>;

    /// Decode a fresh value from `data`.
    fn unmarshal(data: &[u8]) -> Result<Self, Self::Error>;
}
