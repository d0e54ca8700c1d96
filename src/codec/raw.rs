//! Raw payload - pass-through for binary data.
//!
//! Used when the payload is already serialized or is opaque bytes.
//!
//! # Example
//!
//! ```
//! use typed_sockets::codec::{Convertible, Raw};
//! use bytes::Bytes;
//!
//! let raw = Raw::from(Bytes::from_static(b"binary payload"));
//! assert_eq!(raw.marshal().unwrap(), b"binary payload");
//! assert_eq!(raw.to_string(), "62696e617279207061796c6f6164");
//! ```

use std::convert::Infallible;
use std::fmt;

use bytes::Bytes;

use super::Convertible;

/// Payload that passes bytes through without transformation.
///
/// Renders as lowercase hex.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Raw(pub Bytes);

impl Raw {
    /// Copy `data` into a new raw payload.
    #[inline]
    pub fn copy_from_slice(data: &[u8]) -> Self {
        Self(Bytes::copy_from_slice(data))
    }

    /// Borrow the payload bytes.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Consume the payload, returning the inner `Bytes` (zero-copy).
    #[inline]
    pub fn into_bytes(self) -> Bytes {
        self.0
    }
}

impl Convertible for Raw {
    type Error = Infallible;

    #[inline]
    fn marshal(&self) -> Result<Vec<u8>, Self::Error> {
        Ok(self.0.to_vec())
    }

    #[inline]
    fn unmarshal(data: &[u8]) -> Result<Self, Self::Error> {
        Ok(Self::copy_from_slice(data))
    }
}

impl fmt::Display for Raw {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in self.0.iter() {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

impl From<Bytes> for Raw {
    fn from(value: Bytes) -> Self {
        Self(value)
    }
}

impl From<Vec<u8>> for Raw {
    fn from(value: Vec<u8>) -> Self {
        Self(Bytes::from(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marshal_empty() {
        let raw = Raw::default();
        assert!(raw.marshal().unwrap().is_empty());
        assert!(Raw::unmarshal(b"").unwrap().as_bytes().is_empty());
    }

    #[test]
    fn test_large_buffer() {
        let large = vec![0xAB; 1024 * 1024]; // 1MB
        let raw = Raw::from(large.clone());
        assert_eq!(raw.marshal().unwrap().len(), 1024 * 1024);
        assert_eq!(Raw::unmarshal(&large).unwrap(), raw);
    }

    #[test]
    fn test_into_bytes_zero_copy() {
        let original = Bytes::from_static(b"static data");
        let raw = Raw::from(original.clone());

        assert_eq!(raw.into_bytes().as_ptr(), original.as_ptr());
    }

    #[test]
    fn test_binary_data_preserved() {
        // Every byte value must survive
        let all_bytes: Vec<u8> = (0..=255).collect();
        let decoded = Raw::unmarshal(&all_bytes).unwrap();
        assert_eq!(decoded.as_bytes(), &all_bytes[..]);
    }

    #[test]
    fn test_display_hex() {
        assert_eq!(Raw::copy_from_slice(&[0x00, 0x0f, 0xff]).to_string(), "000fff");
    }
}
