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

//! JSON codec registry.
//!
//! All JSON produced and consumed by this crate goes through a [`Codecs`]
//! registry, which holds one encoder and one decoder. Both can be swapped
//! at runtime, e.g. for pretty-printed output while debugging, and reset
//! to their defaults afterwards. Most code uses the process-wide registry
//! through the free functions in this module.

use serde::Serialize;
use serde_json::Value;
use std::borrow::Cow;
use std::str;
use std::sync::{
    Arc, LazyLock, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard,
};

mod bytes;
mod codec;
mod error;

pub use bytes::Utf8Bytes;
pub use codec::{Decoder, Encoder};
pub use error::{Error, Result};

// ----------------------------------------------------------------------------
// Constants
// ----------------------------------------------------------------------------

/// Process-wide registry.
static GLOBAL: LazyLock<Arc<Codecs>> = LazyLock::new(Arc::default);

// ----------------------------------------------------------------------------
// Structs
// ----------------------------------------------------------------------------

/// JSON codec registry.
///
/// Codecs are replaced atomically. Readers clone the current codec and call
/// it outside of the lock, so a slow or panicking codec never blocks or
/// poisons the registry for other threads.
///
/// # Examples
///
/// ```
/// # use std::error::Error;
/// # fn main() -> Result<(), Box<dyn Error>> {
/// use serde_json::json;
/// use tessera::json::Codecs;
///
/// // Create registry and switch encoder
/// let codecs = Codecs::new();
/// codecs.change_encoder("compact".parse()?);
///
/// // Encode value
/// let value = codecs.encode(&json!({ "a": [1, 2] }))?;
/// assert_eq!(value, r#"{"a":[1,2]}"#);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct Codecs {
    /// Current encoder.
    encoder: RwLock<Encoder>,
    /// Current decoder.
    decoder: RwLock<Decoder>,
}

// ----------------------------------------------------------------------------
// Implementations
// ----------------------------------------------------------------------------

impl Codecs {
    /// Creates a registry with the default encoder and decoder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the process-wide registry.
    #[must_use]
    pub fn global() -> Arc<Self> {
        Arc::clone(&GLOBAL)
    }

    /// Encodes the given value with the current encoder.
    ///
    /// Every occurrence of `</` in the output is replaced with `<\/`, which
    /// is equivalent JSON, so the result can be embedded in a `<script>` tag.
    ///
    /// # Errors
    ///
    /// This method returns [`Error::Encode`] if the value cannot be turned
    /// into JSON, e.g. for maps with non-string keys or byte strings which
    /// are not valid UTF-8, or any error the current encoder reports.
    pub fn encode<T>(&self, value: &T) -> Result<String>
    where
        T: Serialize + ?Sized,
    {
        let value = serde_json::to_value(value).map_err(Error::Encode)?;
        let encoded = self.encoder().encode(&value)?;
        if let Cow::Owned(escaped) = escape_script_close(&encoded) {
            return Ok(escaped);
        }
        Ok(encoded)
    }

    /// Decodes the given bytes with the current decoder.
    ///
    /// # Errors
    ///
    /// This method returns [`Error::Utf8`] if the input is not valid UTF-8,
    /// and [`Error::Decode`] if it is not valid JSON.
    pub fn decode<B>(&self, value: &B) -> Result<Value>
    where
        B: AsRef<[u8]> + ?Sized,
    {
        let value = str::from_utf8(value.as_ref())?;
        self.decoder().decode(value)
    }

    /// Returns the current encoder.
    #[must_use]
    pub fn encoder(&self) -> Encoder {
        read(&self.encoder).clone()
    }

    /// Returns the current decoder.
    #[must_use]
    pub fn decoder(&self) -> Decoder {
        read(&self.decoder).clone()
    }

    /// Installs the given encoder.
    pub fn change_encoder(&self, encoder: Encoder) {
        *write(&self.encoder) = encoder;

        #[cfg(feature = "tracing")]
        tracing::debug!("JSON encoder changed");
    }

    /// Installs the given decoder.
    pub fn change_decoder(&self, decoder: Decoder) {
        *write(&self.decoder) = decoder;

        #[cfg(feature = "tracing")]
        tracing::debug!("JSON decoder changed");
    }

    /// Returns whether the default encoder is installed.
    #[must_use]
    pub fn encoder_is_default(&self) -> bool {
        read(&self.encoder).is_default()
    }

    /// Returns whether the default decoder is installed.
    #[must_use]
    pub fn decoder_is_default(&self) -> bool {
        read(&self.decoder).is_default()
    }

    /// Restores the default encoder, returning whether anything changed.
    pub fn reset_encoder(&self) -> bool {
        let mut encoder = write(&self.encoder);
        if encoder.is_default() {
            return false;
        }

        // Only log actual changes
        *encoder = Encoder::default();
        #[cfg(feature = "tracing")]
        tracing::debug!("JSON encoder reset");
        true
    }

    /// Restores the default decoder, returning whether anything changed.
    pub fn reset_decoder(&self) -> bool {
        let mut decoder = write(&self.decoder);
        if decoder.is_default() {
            return false;
        }

        // Only log actual changes
        *decoder = Decoder::default();
        #[cfg(feature = "tracing")]
        tracing::debug!("JSON decoder reset");
        true
    }
}

// ----------------------------------------------------------------------------
// Functions
// ----------------------------------------------------------------------------

/// Encodes the given value with the process-wide encoder.
///
/// # Errors
///
/// See [`Codecs::encode`].
///
/// # Examples
///
/// ```
/// # use std::error::Error;
/// # fn main() -> Result<(), Box<dyn Error>> {
/// use serde_json::json;
/// use tessera::json::json_encode;
///
/// // Encode value for embedding in a script tag
/// let value = json_encode(&json!(["</script>"]))?;
/// assert_eq!(value, r#"["<\/script>"]"#);
/// # Ok(())
/// # }
/// ```
pub fn json_encode<T>(value: &T) -> Result<String>
where
    T: Serialize + ?Sized,
{
    GLOBAL.encode(value)
}

/// Decodes the given bytes with the process-wide decoder.
///
/// # Errors
///
/// See [`Codecs::decode`].
pub fn json_decode<B>(value: &B) -> Result<Value>
where
    B: AsRef<[u8]> + ?Sized,
{
    GLOBAL.decode(value)
}

/// Installs the given encoder in the process-wide registry.
pub fn change_json_encoder(encoder: Encoder) {
    GLOBAL.change_encoder(encoder);
}

/// Installs the given decoder in the process-wide registry.
pub fn change_json_decoder(decoder: Decoder) {
    GLOBAL.change_decoder(decoder);
}

/// Returns whether the process-wide registry uses the default encoder.
#[must_use]
pub fn json_encoder_is_default() -> bool {
    GLOBAL.encoder_is_default()
}

/// Returns whether the process-wide registry uses the default decoder.
#[must_use]
pub fn json_decoder_is_default() -> bool {
    GLOBAL.decoder_is_default()
}

/// Restores the default encoder in the process-wide registry.
pub fn reset_json_encoder() -> bool {
    GLOBAL.reset_encoder()
}

/// Restores the default decoder in the process-wide registry.
pub fn reset_json_decoder() -> bool {
    GLOBAL.reset_decoder()
}

// ----------------------------------------------------------------------------

/// Returns the given text with every `</` replaced by `<\/`.
#[must_use]
pub fn escape_script_close(value: &str) -> Cow<'_, str> {
    if value.contains("</") {
        Cow::Owned(value.replace("</", "<\\/"))
    } else {
        Cow::Borrowed(value)
    }
}

/// Acquires a read lock, ignoring poisoning.
fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

/// Acquires a write lock, ignoring poisoning.
fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use serde_json::json;
    use std::collections::BTreeMap;
    use std::{panic, thread};

    use super::*;

    #[test]
    fn test_encode_decode() {
        let codecs = Codecs::new();
        let value = json!({
            "web-app": {
                "servlet": [
                    { "servlet-name": "cofaxCDS", "load-on-startup": 1 }
                ],
                "taglib": { "taglib-uri": "cofax.tld", "enabled": true },
                "ratio": 0.5,
                "missing": null
            }
        });
        let encoded = codecs.encode(&value).unwrap();
        assert_eq!(codecs.decode(&encoded).unwrap(), value);
    }

    #[test]
    fn test_encode_script_close() {
        let codecs = Codecs::new();
        let test_cases = vec![
            (json!("</script>"), r#""<\/script>""#),
            (json!({ "a": "x</y</z" }), r#"{"a": "x<\/y<\/z"}"#),
            (json!("<script>"), r#""<script>""#),
        ];

        for (value, expected) in test_cases {
            let encoded = codecs.encode(&value).unwrap();
            assert_eq!(encoded, expected, "Failed for: {value}");
        }
    }

    #[test]
    fn test_encode_escapes_custom_output() {
        let codecs = Codecs::new();
        codecs.change_encoder(Encoder::new(|_| Ok("</b>".to_string())));
        assert_eq!(codecs.encode(&1).unwrap(), "<\\/b>");
    }

    #[test]
    fn test_encode_bytes() {
        let codecs = Codecs::new();
        let value = codecs.encode(&(Utf8Bytes(b"abc"), 1)).unwrap();
        assert_eq!(value, r#"["abc", 1]"#);

        let err = codecs.encode(&[Utf8Bytes(b"\xc3")]).unwrap_err();
        assert!(matches!(err, Error::Encode(_)));
    }

    #[test]
    fn test_encode_unsupported() {
        let codecs = Codecs::new();
        let value = BTreeMap::from([((1, 2), 3)]);
        assert!(matches!(codecs.encode(&value), Err(Error::Encode(_))));
    }

    #[test]
    fn test_decode_errors() {
        let codecs = Codecs::new();
        assert!(matches!(codecs.decode(""), Err(Error::Decode(_))));
        assert!(matches!(codecs.decode("{\"a\":"), Err(Error::Decode(_))));
        assert!(matches!(codecs.decode(b"\"\xff\""), Err(Error::Utf8(_))));
    }

    #[test]
    fn test_change_and_reset_encoder() {
        let codecs = Codecs::new();
        assert!(codecs.encoder_is_default());
        assert!(!codecs.reset_encoder());

        codecs.change_encoder(Encoder::new(|_| Ok("foo".to_string())));
        assert!(!codecs.encoder_is_default());
        assert_eq!(codecs.encode(&json!({ "a": 1 })).unwrap(), "foo");

        assert!(codecs.reset_encoder());
        assert!(codecs.encoder_is_default());
        assert!(!codecs.reset_encoder());
        assert_eq!(codecs.encode(&json!({ "a": 1 })).unwrap(), r#"{"a": 1}"#);
    }

    #[test]
    fn test_change_and_reset_decoder() {
        let codecs = Codecs::new();
        codecs.change_decoder(Decoder::new(|_| Ok(json!("bar"))));
        assert!(!codecs.decoder_is_default());
        assert_eq!(codecs.decode("[1]").unwrap(), json!("bar"));

        assert!(codecs.reset_decoder());
        assert!(codecs.decoder_is_default());
        assert_eq!(codecs.decode("[1]").unwrap(), json!([1]));
    }

    #[test]
    fn test_named_default_counts_as_default() {
        let codecs = Codecs::new();
        codecs.change_encoder("default".parse().unwrap());
        assert!(codecs.encoder_is_default());
        codecs.change_encoder("pretty".parse().unwrap());
        assert!(!codecs.encoder_is_default());
    }

    #[test]
    fn test_custom_codec_error() {
        let codecs = Codecs::new();
        codecs.change_encoder(Encoder::new(|_| Err(Error::custom("nope"))));
        let err = codecs.encode(&1).unwrap_err();
        assert_eq!(err.to_string(), "nope");
    }

    #[test]
    fn test_panicking_encoder() {
        let codecs = Codecs::new();
        codecs.change_encoder(Encoder::new(|_| panic!("encoder exploded")));
        let res =
            panic::catch_unwind(panic::AssertUnwindSafe(|| codecs.encode(&1)));
        assert!(res.is_err());

        // Registry must still be usable after the panic
        assert!(codecs.reset_encoder());
        assert_eq!(codecs.encode(&[1, 2]).unwrap(), "[1, 2]");
    }

    #[test]
    fn test_concurrent_swaps() {
        let codecs = Arc::new(Codecs::new());
        let custom = Encoder::new(|_| Ok("custom".to_string()));
        let value = json!({ "a": [1, 2] });
        let expected = [r#"{"a": [1, 2]}"#, "custom"];

        thread::scope(|scope| {
            for _ in 0..4 {
                let codecs = Arc::clone(&codecs);
                let value = &value;
                scope.spawn(move || {
                    for _ in 0..200 {
                        let encoded = codecs.encode(value).unwrap();
                        assert!(expected.contains(&encoded.as_str()));
                    }
                });
            }
            let codecs = Arc::clone(&codecs);
            scope.spawn(move || {
                for _ in 0..200 {
                    codecs.change_encoder(custom.clone());
                    codecs.reset_encoder();
                }
            });
        });
        assert!(codecs.encoder_is_default());
    }

    #[test]
    fn test_escape_script_close() {
        assert!(matches!(escape_script_close("abc"), Cow::Borrowed("abc")));
        assert_eq!(escape_script_close("a</b"), "a<\\/b");
    }
}
