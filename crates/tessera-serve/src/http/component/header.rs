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
//! HTTP header.

use std::fmt;
use std::str::FromStr;

use super::error::{Error, Result};

// ----------------------------------------------------------------------------
// Enums
// ----------------------------------------------------------------------------

/// HTTP header.
///
/// Only the headers that handlers in this workspace read or write are known.
/// Unknown headers are skipped when parsing a [`Request`][].
///
/// [`Request`]: crate::http::Request
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Header {
    /// Allow
    Allow,
    /// Content-Length
    ContentLength,
    /// Content-Type
    ContentType,
}

// ----------------------------------------------------------------------------
// Implementations
// ----------------------------------------------------------------------------

impl Header {
    /// Known headers, in canonical order.
    const ALL: [Header; 3] =
        [Header::Allow, Header::ContentLength, Header::ContentType];

    /// Returns the header name.
    ///
    /// # Examples
    ///
    /// ```
    /// use tessera_serve::http::Header;
    ///
    /// // Obtain header name
    /// assert_eq!(Header::ContentType.name(), "Content-Type");
    /// ```
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Header::Allow => "Allow",
            Header::ContentLength => "Content-Length",
            Header::ContentType => "Content-Type",
        }
    }
}

// ----------------------------------------------------------------------------
// Trait implementations
// ----------------------------------------------------------------------------

impl AsRef<str> for Header {
    /// Returns the string representation.
    #[inline]
    fn as_ref(&self) -> &str {
        self.name()
    }
}

// ----------------------------------------------------------------------------

impl FromStr for Header {
    type Err = Error;

    /// Attempts to create a header from a string, ignoring case.
    ///
    /// # Errors
    ///
    /// This method returns [`Error::Header`] for unknown headers.
    ///
    /// # Examples
    ///
    /// ```
    /// # use std::error::Error;
    /// # fn main() -> Result<(), Box<dyn Error>> {
    /// use tessera_serve::http::Header;
    ///
    /// // Create header from string
    /// let header: Header = "content-type".parse()?;
    /// assert_eq!(header, Header::ContentType);
    /// # Ok(())
    /// # }
    /// ```
    fn from_str(value: &str) -> Result<Self> {
        Header::ALL
            .into_iter()
            .find(|header| header.name().eq_ignore_ascii_case(value))
            .ok_or_else(|| Error::Header(value.to_string()))
    }
}

// ----------------------------------------------------------------------------

impl fmt::Display for Header {
    /// Formats the header for display.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::{Error, Header};

    #[test]
    fn test_parse() {
        let test_cases = vec![
            ("Allow", Header::Allow),
            ("content-length", Header::ContentLength),
            ("CONTENT-TYPE", Header::ContentType),
        ];
        for (name, expected) in test_cases {
            let header = name.parse::<Header>();
            assert_eq!(header, Ok(expected), "Failed for: {name}");
        }
    }

    #[test]
    fn test_unknown() {
        let res = "Host".parse::<Header>();
        assert_eq!(res, Err(Error::Header("Host".to_string())));
    }
}
