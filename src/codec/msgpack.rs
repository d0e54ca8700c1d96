//! MsgPack payload using `rmp-serde`.
//!
//! Always encodes with `to_vec_named`, so structs go out as maps keyed by
//! field name rather than positional arrays. Peers written against
//! `@msgpack/msgpack` or similar map-based decoders read them unchanged.

use std::fmt;
use std::ops::{Deref, DerefMut};

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

use super::Convertible;

/// Failure in either direction of a MessagePack conversion.
#[derive(Debug, Error)]
pub enum MsgPackError {
    /// The value could not be encoded.
    #[error("MsgPack encode error: {0}")]
    Encode(#[from] rmp_serde::encode::Error),

    /// The bytes did not decode into the target type.
    #[error("MsgPack decode error: {0}")]
    Decode(#[from] rmp_serde::decode::Error),
}

/// Wraps any serde type so it travels as MessagePack.
///
/// # Example
///
/// ```
/// use typed_sockets::codec::{Convertible, MsgPack};
/// use serde::{Serialize, Deserialize};
///
/// #[derive(Serialize, Deserialize, PartialEq, Debug)]
/// struct Message {
///     id: u32,
///     content: String,
/// }
///
/// let msg = MsgPack(Message { id: 42, content: "hello".to_string() });
/// let encoded = msg.marshal().unwrap();
/// let decoded = MsgPack::<Message>::unmarshal(&encoded).unwrap();
/// assert_eq!(decoded, msg);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MsgPack<T>(pub T);

impl<T> MsgPack<T> {
    /// Consume the wrapper, returning the inner value.
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> Convertible for MsgPack<T>
where
    T: Serialize + DeserializeOwned + fmt::Debug,
{
    type Error = MsgPackError;

    #[inline]
    fn marshal(&self) -> Result<Vec<u8>, Self::Error> {
        // to_vec_named, NOT to_vec: struct-as-map
        Ok(rmp_serde::to_vec_named(&self.0)?)
    }

    #[inline]
    fn unmarshal(data: &[u8]) -> Result<Self, Self::Error> {
        Ok(Self(rmp_serde::from_slice(data)?))
    }
}

impl<T: fmt::Debug> fmt::Display for MsgPack<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.0)
    }
}

impl<T> Deref for MsgPack<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.0
    }
}

impl<T> DerefMut for MsgPack<T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.0
    }
}

impl<T> From<T> for MsgPack<T> {
    fn from(value: T) -> Self {
        Self(value)
    }
}
