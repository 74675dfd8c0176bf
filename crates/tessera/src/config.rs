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

//! Configuration.

use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::escape;
use crate::json::{Codecs, Decoder, Encoder};

mod error;
pub mod json;
pub mod linkify;

pub use error::{Error, Result};

// ----------------------------------------------------------------------------
// Structs
// ----------------------------------------------------------------------------

/// Configuration.
///
/// All sections and settings are optional, and fall back to the defaults
/// used throughout this crate. Unknown keys are rejected, so that typos are
/// caught early instead of being silently ignored.
///
/// # Examples
///
/// ```
/// # use std::error::Error;
/// # fn main() -> Result<(), Box<dyn Error>> {
/// use tessera::config::Config;
///
/// // Load configuration
/// let config = Config::from_json(r#"{
///     "json": { "encoder": "compact" },
///     "linkify": { "shorten": true }
/// }"#)?;
///
/// // Create isolated codec registry
/// let codecs = config.codecs()?;
/// assert_eq!(codecs.encode(&[1, 2])?, "[1,2]");
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// JSON settings.
    pub json: json::Json,
    /// Linkify settings.
    pub linkify: linkify::Linkify,
}

// ----------------------------------------------------------------------------
// Implementations
// ----------------------------------------------------------------------------

impl Config {
    /// Creates a configuration from JSON text.
    ///
    /// # Errors
    ///
    /// This method returns [`Error::Json`] if the text is not valid JSON, or
    /// contains unknown or mistyped settings.
    pub fn from_json(value: &str) -> Result<Self> {
        serde_json::from_str(value).map_err(Into::into)
    }

    /// Creates a configuration by loading the JSON file at the given path.
    ///
    /// # Errors
    ///
    /// This method returns [`Error::Io`] if the file cannot be read, and
    /// [`Error::Json`] if its contents are invalid.
    pub fn from_path<P>(path: P) -> Result<Self>
    where
        P: AsRef<Path>,
    {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Creates a codec registry with the configured codecs.
    ///
    /// # Errors
    ///
    /// This method returns [`Error::Codec`] if a codec name is unknown.
    pub fn codecs(&self) -> Result<Codecs> {
        let (encoder, decoder) = self.resolve()?;
        let codecs = Codecs::new();
        codecs.change_encoder(encoder);
        codecs.change_decoder(decoder);
        Ok(codecs)
    }

    /// Applies the configured codecs to the process-wide registry.
    ///
    /// Both names are resolved before anything is changed, so an invalid
    /// configuration leaves the registry untouched.
    ///
    /// # Errors
    ///
    /// This method returns [`Error::Codec`] if a codec name is unknown.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all))]
    pub fn install(&self) -> Result {
        let (encoder, decoder) = self.resolve()?;
        let codecs = Codecs::global();
        codecs.change_encoder(encoder);
        codecs.change_decoder(decoder);
        Ok(())
    }

    /// Creates linkification options from the configured settings.
    #[must_use]
    pub fn linkify(&self) -> escape::Linkify {
        let settings = &self.linkify;
        escape::Linkify::new()
            .shorten(settings.shorten)
            .extra_params(settings.extra_params.as_str())
            .require_protocol(settings.require_protocol)
            .permitted_protocols(settings.permitted_protocols.iter().cloned())
    }

    /// Resolves the configured codec names.
    fn resolve(&self) -> Result<(Encoder, Decoder)> {
        let encoder = self.json.encoder.parse::<Encoder>()?;
        let decoder = self.json.decoder.parse::<Decoder>()?;
        Ok((encoder, decoder))
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::json::Error as JsonError;

    #[test]
    fn test_defaults() {
        let config = Config::from_json("{}").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.json.encoder, "spaced");
        assert_eq!(config.linkify.permitted_protocols, ["http", "https"]);

        let codecs = config.codecs().unwrap();
        assert!(codecs.encoder_is_default());
        assert!(codecs.decoder_is_default());
    }

    #[test]
    fn test_codecs() {
        let test_cases = vec![
            ("compact", r#"{"a":[1,2]}"#),
            ("spaced", r#"{"a": [1, 2]}"#),
            ("pretty", "{\n  \"a\": [\n    1,\n    2\n  ]\n}"),
        ];

        for (name, expected) in test_cases {
            let text = json!({ "json": { "encoder": name } }).to_string();
            let codecs = Config::from_json(&text).unwrap().codecs().unwrap();
            let value = codecs.encode(&json!({ "a": [1, 2] })).unwrap();
            assert_eq!(value, expected, "Failed for: {name}");
        }
    }

    #[test]
    fn test_unknown_codec() {
        let test_cases = vec![
            r#"{"json":{"encoder":"yaml"}}"#,
            r#"{"json":{"decoder":"lenient"}}"#,
        ];

        for text in test_cases {
            let config = Config::from_json(text).unwrap();
            let err = config.codecs().unwrap_err();
            assert!(
                matches!(err, Error::Codec(JsonError::UnknownCodec(_))),
                "Failed for: {text}"
            );
        }
    }

    #[test]
    fn test_unknown_fields() {
        let test_cases = vec![
            r#"{"jsn":{}}"#,
            r#"{"json":{"encodr":"compact"}}"#,
            r#"{"linkify":{"shorten":true,"protocols":["ftp"]}}"#,
            r#"{"linkify":{"shorten":"yes"}}"#,
            "not json",
        ];

        for text in test_cases {
            let err = Config::from_json(text).unwrap_err();
            assert!(matches!(err, Error::Json(_)), "Failed for: {text}");
        }
    }

    #[test]
    fn test_linkify() {
        let config = Config::from_json(
            r#"{"linkify":{
                "extra_params":"rel=\"nofollow\"",
                "require_protocol":true,
                "permitted_protocols":["ftp"]
            }}"#,
        )
        .unwrap();

        let linkify = config.linkify();
        let test_cases = vec![
            (
                "get ftp://host/file",
                concat!(
                    r#"get <a href="ftp://host/file" rel="nofollow">"#,
                    "ftp://host/file</a>",
                ),
            ),
            ("see www.example.com", "see www.example.com"),
            ("see http://example.com", "see http://example.com"),
        ];

        for (text, expected) in test_cases {
            assert_eq!(linkify.apply(text), expected, "Failed for: {text}");
        }
    }

    #[test]
    fn test_from_path_missing() {
        let err = Config::from_path("/nonexistent/tessera.json").unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
