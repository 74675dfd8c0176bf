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

//! JSON codecs.

use serde::Serialize;
use serde_json::Value;
use serde_json::ser::Formatter;
use std::str::FromStr;
use std::sync::{Arc, LazyLock};
use std::{fmt, io};

use super::error::{Error, Result};

// ----------------------------------------------------------------------------
// Constants
// ----------------------------------------------------------------------------

/// Compact encoder, without any whitespace.
static COMPACT: LazyLock<Encoder> = LazyLock::new(|| {
    Encoder::new(|value| serde_json::to_string(value).map_err(Error::Encode))
});

/// Pretty encoder, indenting with two spaces.
static PRETTY: LazyLock<Encoder> = LazyLock::new(|| {
    Encoder::new(|value| {
        serde_json::to_string_pretty(value).map_err(Error::Encode)
    })
});

/// Spaced encoder, separating items with `, ` and keys with `: `, which is
/// the default, matching what Python's `json.dumps` emits.
static SPACED: LazyLock<Encoder> = LazyLock::new(|| {
    Encoder::new(|value| {
        let mut buffer = Vec::with_capacity(128);
        let mut ser =
            serde_json::Serializer::with_formatter(&mut buffer, Spaced);
        value.serialize(&mut ser).map_err(Error::Encode)?;
        String::from_utf8(buffer).map_err(|err| Error::from(err.utf8_error()))
    })
});

/// Default decoder.
static DEFAULT: LazyLock<Decoder> = LazyLock::new(|| {
    Decoder::new(|value| serde_json::from_str(value).map_err(Error::Decode))
});

// ----------------------------------------------------------------------------
// Structs
// ----------------------------------------------------------------------------

/// JSON encoder.
///
/// Encoders are cheap to clone, as they share the underlying function. Two
/// encoders are considered the same if they share that function, which is
/// how the registry tells whether the default encoder is in place.
///
/// Built-in encoders can be obtained by name: `spaced` (the default, also
/// available as `default`), `compact` and `pretty`.
///
/// # Examples
///
/// ```
/// # use std::error::Error;
/// # fn main() -> Result<(), Box<dyn Error>> {
/// use serde_json::json;
/// use tessera::json::Encoder;
///
/// // Obtain built-in encoder by name
/// let encoder: Encoder = "compact".parse()?;
/// assert_eq!(encoder.encode(&json!([1, 2]))?, "[1,2]");
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Encoder {
    /// Encoder function.
    function: Arc<dyn Fn(&Value) -> Result<String> + Send + Sync>,
}

/// JSON decoder.
///
/// The only built-in decoder is available as `default`.
#[derive(Clone)]
pub struct Decoder {
    /// Decoder function.
    function: Arc<dyn Fn(&str) -> Result<Value> + Send + Sync>,
}

/// Formatter for the spaced encoder.
struct Spaced;

// ----------------------------------------------------------------------------
// Implementations
// ----------------------------------------------------------------------------

impl Encoder {
    /// Creates an encoder from the given function.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&Value) -> Result<String> + Send + Sync + 'static,
    {
        Self { function: Arc::new(f) }
    }

    /// Encodes the given value.
    ///
    /// # Errors
    ///
    /// Returns whatever error the encoder function reports.
    #[inline]
    pub fn encode(&self, value: &Value) -> Result<String> {
        (self.function)(value)
    }

    /// Returns whether both encoders share the same function.
    #[inline]
    #[must_use]
    pub fn same(&self, other: &Encoder) -> bool {
        Arc::ptr_eq(&self.function, &other.function)
    }

    /// Returns whether this is the default encoder.
    #[inline]
    #[must_use]
    pub fn is_default(&self) -> bool {
        self.same(&SPACED)
    }
}

impl Decoder {
    /// Creates a decoder from the given function.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&str) -> Result<Value> + Send + Sync + 'static,
    {
        Self { function: Arc::new(f) }
    }

    /// Decodes the given text.
    ///
    /// # Errors
    ///
    /// Returns whatever error the decoder function reports.
    #[inline]
    pub fn decode(&self, value: &str) -> Result<Value> {
        (self.function)(value)
    }

    /// Returns whether both decoders share the same function.
    #[inline]
    #[must_use]
    pub fn same(&self, other: &Decoder) -> bool {
        Arc::ptr_eq(&self.function, &other.function)
    }

    /// Returns whether this is the default decoder.
    #[inline]
    #[must_use]
    pub fn is_default(&self) -> bool {
        self.same(&DEFAULT)
    }
}

// ----------------------------------------------------------------------------
// Trait implementations
// ----------------------------------------------------------------------------

impl Default for Encoder {
    /// Returns the default encoder.
    #[inline]
    fn default() -> Self {
        SPACED.clone()
    }
}

impl Default for Decoder {
    /// Returns the default decoder.
    #[inline]
    fn default() -> Self {
        DEFAULT.clone()
    }
}

// ----------------------------------------------------------------------------

impl FromStr for Encoder {
    type Err = Error;

    /// Returns the built-in encoder with the given name.
    ///
    /// # Errors
    ///
    /// This method returns [`Error::UnknownCodec`] for unknown names.
    fn from_str(name: &str) -> Result<Self> {
        match name {
            "spaced" | "default" => Ok(SPACED.clone()),
            "compact" => Ok(COMPACT.clone()),
            "pretty" => Ok(PRETTY.clone()),
            _ => Err(Error::UnknownCodec(name.to_string())),
        }
    }
}

impl FromStr for Decoder {
    type Err = Error;

    /// Returns the built-in decoder with the given name.
    ///
    /// # Errors
    ///
    /// This method returns [`Error::UnknownCodec`] for unknown names.
    fn from_str(name: &str) -> Result<Self> {
        match name {
            "default" => Ok(DEFAULT.clone()),
            _ => Err(Error::UnknownCodec(name.to_string())),
        }
    }
}

// ----------------------------------------------------------------------------

impl Formatter for Spaced {
    fn begin_array_value<W>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first { Ok(()) } else { writer.write_all(b", ") }
    }

    fn begin_object_key<W>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first { Ok(()) } else { writer.write_all(b", ") }
    }

    fn begin_object_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        writer.write_all(b": ")
    }
}

// ----------------------------------------------------------------------------

impl fmt::Debug for Encoder {
    /// Formats the encoder for debugging.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Encoder")
            .field("default", &self.is_default())
            .finish_non_exhaustive()
    }
}

impl fmt::Debug for Decoder {
    /// Formats the decoder for debugging.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Decoder")
            .field("default", &self.is_default())
            .finish_non_exhaustive()
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_named_encoders() {
        let value = json!({ "foo": "bar", "baz": [0, 1] });
        let test_cases = vec![
            ("compact", r#"{"baz":[0,1],"foo":"bar"}"#),
            ("default", r#"{"baz": [0, 1], "foo": "bar"}"#),
            ("spaced", r#"{"baz": [0, 1], "foo": "bar"}"#),
            (
                "pretty",
                "{\n  \"baz\": [\n    0,\n    1\n  ],\n  \"foo\": \"bar\"\n}",
            ),
        ];

        for (name, expected) in test_cases {
            let encoder = Encoder::from_str(name).unwrap();
            let encoded = encoder.encode(&value).unwrap();
            assert_eq!(encoded, expected, "Failed for: {name}");
        }
    }

    #[test]
    fn test_unknown_names() {
        let err = Encoder::from_str("yaml").unwrap_err();
        assert!(matches!(err, Error::UnknownCodec(name) if name == "yaml"));
        let err = Decoder::from_str("compact").unwrap_err();
        assert!(matches!(err, Error::UnknownCodec(_)));
    }

    #[test]
    fn test_identity() {
        assert!(Encoder::default().is_default());
        assert!(Encoder::from_str("default").unwrap().is_default());
        assert!(Encoder::from_str("spaced").unwrap().is_default());
        assert!(!Encoder::from_str("compact").unwrap().is_default());
        assert!(Decoder::default().is_default());

        // Equivalent functions are still different encoders
        let custom = Encoder::new(|value| Ok(value.to_string()));
        assert!(!custom.is_default());
        assert!(custom.same(&custom.clone()));
    }
}
