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

//! HTTP response extensions.

use crate::http::{Header, Status};

use super::Response;

// ----------------------------------------------------------------------------
// Constants
// ----------------------------------------------------------------------------

/// Content type of JSON responses.
pub const JSON_CONTENT_TYPE: &str = "application/json; charset=UTF-8";

/// Content type of plain text responses.
pub const TEXT_CONTENT_TYPE: &str = "text/plain; charset=utf-8";

/// Content type of XML responses.
pub const XML_CONTENT_TYPE: &str = "text/xml";

// ----------------------------------------------------------------------------
// Traits
// ----------------------------------------------------------------------------

/// Extension trait for the `Response` type providing additional functionality.
pub trait ResponseExt: Sized {
    /// Creates a response from a status code.
    ///
    /// The reason phrase is used as a plain text body, which is all a client
    /// gets to see for transport-level errors.
    ///
    /// # Examples
    ///
    /// ```
    /// use tessera_serve::http::{Header, Response, ResponseExt, Status};
    ///
    /// // Create response from status
    /// let res = Response::from_status(Status::BadRequest);
    /// assert_eq!(res.body, b"Bad Request");
    /// assert_eq!(res.headers.get(Header::ContentLength), Some("11"));
    /// ```
    #[must_use]
    fn from_status(status: Status) -> Response {
        Response::new() // fmt
            .status(status)
            .text(status.name())
    }

    /// Sets the given text as the body of the response.
    fn text<S>(self, content: S) -> Response
    where
        S: Into<String>;

    /// Sets the given serialized JSON as the body of the response.
    ///
    /// # Examples
    ///
    /// ```
    /// use tessera_serve::http::{Header, Response, ResponseExt};
    ///
    /// // Create JSON response
    /// let res = Response::new().json(r#"{"ok":true}"#);
    /// assert_eq!(
    ///     res.headers.get(Header::ContentType),
    ///     Some("application/json; charset=UTF-8")
    /// );
    /// ```
    fn json<B>(self, content: B) -> Response
    where
        B: Into<Vec<u8>>;

    /// Sets the given serialized XML as the body of the response.
    ///
    /// # Examples
    ///
    /// ```
    /// use tessera_serve::http::{Header, Response, ResponseExt};
    ///
    /// // Create XML response
    /// let res = Response::new().xml("<?xml version='1.0'?>");
    /// assert_eq!(res.headers.get(Header::ContentType), Some("text/xml"));
    /// assert_eq!(res.headers.get(Header::ContentLength), Some("21"));
    /// ```
    fn xml<B>(self, content: B) -> Response
    where
        B: Into<Vec<u8>>;
}

// ----------------------------------------------------------------------------
// Blanket implementations
// ----------------------------------------------------------------------------

impl ResponseExt for Response {
    fn text<S>(self, content: S) -> Response
    where
        S: Into<String>,
    {
        let content = content.into();
        self.header(Header::ContentType, TEXT_CONTENT_TYPE)
            .header(Header::ContentLength, content.len())
            .body(content)
    }

    fn json<B>(self, content: B) -> Response
    where
        B: Into<Vec<u8>>,
    {
        let content = content.into();
        self.header(Header::ContentType, JSON_CONTENT_TYPE)
            .header(Header::ContentLength, content.len())
            .body(content)
    }

    fn xml<B>(self, content: B) -> Response
    where
        B: Into<Vec<u8>>,
    {
        let content = content.into();
        self.header(Header::ContentType, XML_CONTENT_TYPE)
            .header(Header::ContentLength, content.len())
            .body(content)
    }
}
