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

//! URL escaping.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str};
use percent_encoding::{percent_decode, utf8_percent_encode};
use std::borrow::Cow;

// ----------------------------------------------------------------------------
// Constants
// ----------------------------------------------------------------------------

/// Character set to be percent-encoded in form values.
const SET: &AsciiSet = &NON_ALPHANUMERIC.remove(b'_').remove(b'.').remove(b'-');

// ----------------------------------------------------------------------------
// Functions
// ----------------------------------------------------------------------------

/// Returns a URL-encoded version of the given value.
///
/// This uses form encoding, i.e. spaces become `+`, and everything except
/// ASCII alphanumerics and `_.-` is percent-encoded as UTF-8.
///
/// # Examples
///
/// ```
/// use tessera::escape::url_escape;
///
/// // Escape value
/// assert_eq!(url_escape("a b&c=d/é"), "a+b%26c%3Dd%2F%C3%A9");
/// ```
#[must_use]
pub fn url_escape(value: &str) -> Cow<'_, str> {
    let encoded: Cow<'_, str> = utf8_percent_encode(value, SET).into();
    if encoded.contains("%20") {
        Cow::Owned(encoded.replace("%20", "+"))
    } else {
        encoded
    }
}

/// Decodes the given value from a URL.
///
/// Pluses are decoded to spaces before percent-decoding. Invalid UTF-8 is
/// replaced with the replacement character.
///
/// # Examples
///
/// ```
/// use tessera::escape::url_unescape;
///
/// // Unescape value
/// assert_eq!(url_unescape("a+b%26c%3Dd%2F%C3%A9"), "a b&c=d/é");
/// ```
#[must_use]
pub fn url_unescape(value: &str) -> Cow<'_, str> {
    if value.contains('+') {
        percent_decode_str(&value.replace('+', " "))
            .decode_utf8_lossy()
            .into_owned()
            .into()
    } else {
        percent_decode_str(value).decode_utf8_lossy()
    }
}

/// Decodes the given value from a URL into raw bytes.
///
/// # Examples
///
/// ```
/// use tessera::escape::url_unescape_bytes;
///
/// // Unescape value, keeping invalid UTF-8
/// assert_eq!(url_unescape_bytes("%FF+x"), b"\xff x");
/// ```
#[must_use]
pub fn url_unescape_bytes(value: &str) -> Vec<u8> {
    let value = value.replace('+', " ");
    percent_decode(value.as_bytes()).collect()
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_escape() {
        let test_cases = vec![
            ("", ""),
            ("safe_chars.are-kept", "safe_chars.are-kept"),
            ("a b", "a+b"),
            ("100%", "100%25"),
            ("%20", "%2520"),
            ("a+b", "a%2Bb"),
            ("~", "%7E"),
        ];

        for (value, expected) in test_cases {
            assert_eq!(url_escape(value), expected, "Failed for: {value}");
        }
    }

    #[test]
    fn test_url_unescape() {
        let test_cases = vec![
            ("", ""),
            ("a+b", "a b"),
            ("a%2Bb", "a+b"),
            ("%2520", "%20"),
            ("%E2%98%83", "☃"),
            ("%FF", "\u{fffd}"),
            ("100%", "100%"),
        ];

        for (value, expected) in test_cases {
            assert_eq!(url_unescape(value), expected, "Failed for: {value}");
        }
    }
}
