//! JSON payload using `serde_json`.

use std::fmt;
use std::ops::{Deref, DerefMut};

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::Convertible;

/// Wraps any serde type so it travels as a JSON document.
///
/// # Example
///
/// ```
/// use typed_sockets::codec::{Convertible, Json};
/// use serde::{Serialize, Deserialize};
///
/// #[derive(Serialize, Deserialize, PartialEq, Debug)]
/// struct Ping {
///     seq: u32,
/// }
///
/// let ping = Json(Ping { seq: 7 });
/// assert_eq!(ping.to_string(), r#"{"seq":7}"#);
/// let decoded = Json::<Ping>::unmarshal(br#"{"seq":7}"#).unwrap();
/// assert_eq!(decoded.0, Ping { seq: 7 });
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Json<T>(pub T);

impl<T> Json<T> {
    /// Consume the wrapper, returning the inner value.
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> Convertible for Json<T>
where
    T: Serialize + DeserializeOwned,
{
    type Error = serde_json::Error;

    fn marshal(&self) -> Result<Vec<u8>, Self::Error> {
        serde_json::to_vec(&self.0)
    }

    fn unmarshal(data: &[u8]) -> Result<Self, Self::Error> {
        serde_json::from_slice(data).map(Self)
    }
}

impl<T: Serialize> fmt::Display for Json<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match serde_json::to_string(&self.0) {
            Ok(rendered) => f.write_str(&rendered),
            Err(_) => f.write_str("<unserializable>"),
        }
    }
}

impl<T> Deref for Json<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.0
    }
}

impl<T> DerefMut for Json<T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.0
    }
}

impl<T> From<T> for Json<T> {
    fn from(value: T) -> Self {
        Self(value)
    }
}
