//! UTF-8 text payload.

use std::fmt;
use std::ops::Deref;
use std::string::FromUtf8Error;

use super::Convertible;

/// A string payload sent as its raw UTF-8 bytes, without framing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Text(pub String);

impl Text {
    /// Create a new text payload.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Consume the payload, returning the inner string.
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl Convertible for Text {
    type Error = FromUtf8Error;

    fn marshal(&self) -> Result<Vec<u8>, Self::Error> {
        Ok(self.0.as_bytes().to_vec())
    }

    fn unmarshal(data: &[u8]) -> Result<Self, Self::Error> {
        String::from_utf8(data.to_vec()).map(Self)
    }
}

impl fmt::Display for Text {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Deref for Text {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Text {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for Text {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl PartialEq<str> for Text {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for Text {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}
