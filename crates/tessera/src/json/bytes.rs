// Copyright (c) 2025 Tessera and contributors

// SPDX-License-Identifier: MIT
// Third-party contributions licensed under DCO

// Permission is hereby granted, free of charge, to any person obtaining a copy
// of this software and associated documentation files (the "Software"), to
// deal in the Software without restriction, including without limitation the
// rights to use, copy, modify, merge, publish, distribute, sublicense, and/or
// sell copies of the Software, and to permit persons to whom the Software is
// furnished to do so, subject to the following conditions:

// The above copyright notice and this permission notice shall be included in
// all copies or substantial portions of the Software.

// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
// IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
// FITNESS FOR A PARTICULAR PURPOSE AND NON-INFRINGEMENT. IN NO EVENT SHALL THE
// AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
// LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING
// FROM, OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS
// IN THE SOFTWARE.

// ----------------------------------------------------------------------------

//! Byte strings.

use serde::ser::{Error, Serialize, Serializer};
use std::str;

// ----------------------------------------------------------------------------
// Structs
// ----------------------------------------------------------------------------

/// Byte string that serializes as JSON text.
///
/// Raw bytes have no JSON representation of their own. Wrapping them marks
/// them as text, which is decoded as strict UTF-8 during serialization, so
/// invalid sequences make encoding fail instead of being replaced.
///
/// # Examples
///
/// ```
/// # use std::error::Error;
/// # fn main() -> Result<(), Box<dyn Error>> {
/// use tessera::json::{Codecs, Utf8Bytes};
///
/// // Encode byte string as text
/// let codecs = Codecs::new();
/// let value = codecs.encode(&[Utf8Bytes(b"caf\xc3\xa9")])?;
/// assert_eq!(value, r#"["café"]"#);
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Utf8Bytes<'a>(pub &'a [u8]);

// ----------------------------------------------------------------------------
// Trait implementations
// ----------------------------------------------------------------------------

impl Serialize for Utf8Bytes<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let value = str::from_utf8(self.0).map_err(S::Error::custom)?;
        serializer.serialize_str(value)
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid() {
        let value = serde_json::to_string(&Utf8Bytes(b"a\"b")).unwrap();
        assert_eq!(value, r#""a\"b""#);
    }

    #[test]
    fn test_invalid() {
        let err = serde_json::to_string(&Utf8Bytes(b"\xff\xfe")).unwrap_err();
        assert!(err.to_string().contains("invalid utf-8"));
    }
}
