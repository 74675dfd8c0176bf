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

//! HTTP request.

use std::borrow::Cow;
use std::fmt;
use std::str::{self, FromStr};

use super::component::{Header, Method, Status};
use super::headers::Headers;

mod error;

pub use error::{Error, Result};

// ----------------------------------------------------------------------------
// Constants
// ----------------------------------------------------------------------------

/// Maximum size of a request, including head and body.
const MAX_REQUEST_SIZE: usize = 8 * 1024 * 1024;

/// Maximum length of the request target.
const MAX_TARGET_LENGTH: usize = 2 * 1024;

/// Maximum length of a single header value.
const MAX_HEADER_VALUE_LENGTH: usize = 4 * 1024;

// ----------------------------------------------------------------------------
// Structs
// ----------------------------------------------------------------------------

/// HTTP request.
///
/// Requests are either built with the builder-like methods, which is what
/// tests and embedding servers usually do, or parsed from raw bytes with
/// [`Request::from_bytes`], in which case path, query and body borrow from
/// the given buffer.
///
/// # Examples
///
/// ```
/// use tessera_serve::http::{Header, Method, Request};
///
/// // Create request
/// let req = Request::new()
///     .method(Method::Post)
///     .path("/rpc")
///     .header(Header::ContentType, "application/json")
///     .body(r#"{"id":1,"method":"echo","params":["hi"]}"#);
/// ```
#[derive(Clone, Debug)]
pub struct Request<'a> {
    /// Request method.
    pub method: Method,
    /// Request path, without query.
    pub path: Cow<'a, str>,
    /// Request query, without the leading `?`.
    pub query: Option<Cow<'a, str>>,
    /// Request headers.
    pub headers: Headers,
    /// Request body.
    pub body: Cow<'a, [u8]>,
}

// ----------------------------------------------------------------------------
// Implementations
// ----------------------------------------------------------------------------

impl<'a> Request<'a> {
    /// Creates a request.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a request from the given bytes.
    ///
    /// The request head is parsed with [`httparse`], and everything after it
    /// is taken as the body. Unknown headers are skipped, so handlers only see
    /// the ones listed in [`Header`].
    ///
    /// # Errors
    ///
    /// This method returns [`Error::Incomplete`] if the buffer ends before the
    /// request head does, [`Error::Parser`] for malformed input, and
    /// [`Error::Component`] for an unknown method. Size limits and a request
    /// target not starting with `/` yield [`Error::Validation`].
    ///
    /// # Examples
    ///
    /// ```
    /// # use std::error::Error;
    /// # fn main() -> Result<(), Box<dyn Error>> {
    /// use tessera_serve::http::{Method, Request};
    ///
    /// // Create request from bytes
    /// let req = Request::from_bytes(b"POST /rpc?v=1 HTTP/1.1\r\n\r\n{}")?;
    /// assert_eq!(req.method, Method::Post);
    /// assert_eq!(req.path, "/rpc");
    /// assert_eq!(req.query.as_deref(), Some("v=1"));
    /// assert_eq!(req.body.as_ref(), b"{}");
    /// # Ok(())
    /// # }
    /// ```
    pub fn from_bytes(bytes: &'a [u8]) -> Result<Self> {
        if bytes.len() > MAX_REQUEST_SIZE {
            return Err(Error::Validation(Status::PayloadTooLarge));
        }

        // Initialize buffer for headers and request parser
        let mut headers = [httparse::EMPTY_HEADER; 64];
        let mut req = httparse::Request::new(&mut headers);

        let n = match req.parse(bytes)? {
            httparse::Status::Partial => return Err(Error::Incomplete),
            httparse::Status::Complete(n) => n,
        };

        // A complete parse always yields method and path
        let (Some(method), Some(target)) = (req.method, req.path) else {
            return Err(Error::Incomplete);
        };
        let method = method.parse()?;
        if target.len() > MAX_TARGET_LENGTH {
            return Err(Error::Validation(Status::UriTooLong));
        }

        // Proxy requests are not supported
        if !target.starts_with('/') {
            return Err(Error::Validation(Status::BadRequest));
        }
        let (path, query) = match target.split_once('?') {
            Some((path, query)) => (path, Some(Cow::Borrowed(query))),
            None => (target, None),
        };

        // Collect known headers, rejecting oversized values
        let mut map = Headers::new();
        for header in req.headers.iter() {
            if header.value.len() > MAX_HEADER_VALUE_LENGTH {
                let status = Status::RequestHeaderFieldsTooLarge;
                return Err(Error::Validation(status));
            }
            let Ok(name) = Header::from_str(header.name) else {
                continue;
            };
            if let Ok(value) = str::from_utf8(header.value) {
                map.insert(name, value);
            }
        }

        Ok(Request {
            method,
            path: Cow::Borrowed(path),
            query,
            headers: map,
            body: Cow::Borrowed(&bytes[n..]),
        })
    }
}

impl<'a> Request<'a> {
    /// Sets the method of the request.
    #[inline]
    #[must_use]
    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Sets the path of the request.
    #[inline]
    #[must_use]
    pub fn path<P>(mut self, path: P) -> Self
    where
        P: Into<Cow<'a, str>>,
    {
        self.path = path.into();
        self
    }

    /// Adds a header to the request.
    #[inline]
    #[must_use]
    pub fn header<V>(mut self, header: Header, value: V) -> Self
    where
        V: ToString,
    {
        self.headers.insert(header, value);
        self
    }

    /// Sets the body of the request.
    #[inline]
    #[must_use]
    pub fn body<B>(mut self, body: B) -> Self
    where
        B: Into<Vec<u8>>,
    {
        self.body = Cow::Owned(body.into());
        self
    }
}

// ----------------------------------------------------------------------------
// Trait implementations
// ----------------------------------------------------------------------------

impl Default for Request<'_> {
    /// Creates a default request, i.e. `GET /` without body.
    #[inline]
    fn default() -> Self {
        Self {
            method: Method::Get,
            path: Cow::Borrowed("/"),
            query: None,
            headers: Headers::default(),
            body: Cow::Borrowed(&[]),
        }
    }
}

// ----------------------------------------------------------------------------

impl fmt::Display for Request<'_> {
    /// Formats the request for display.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} {}", self.method, self.path)?;
        if let Some(query) = &self.query {
            write!(f, "?{query}")?;
        }
        write!(f, " HTTP/1.1\r\n{}\r\n", self.headers)?;
        write!(f, "[Body: {} bytes]\r\n", self.body.len())
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_bytes_headers() {
        let bytes = b"POST /rpc HTTP/1.1\r\n\
            Content-Type: application/json\r\n\
            X-Unknown: skipped\r\n\r\n\
            {\"id\":1}";
        let req = Request::from_bytes(bytes).expect("valid request");
        assert_eq!(req.method, Method::Post);
        assert_eq!(req.path, "/rpc");
        assert_eq!(req.query, None);
        assert_eq!(req.headers.len(), 1);
        assert_eq!(
            req.headers.get(Header::ContentType),
            Some("application/json")
        );
        assert_eq!(req.body.as_ref(), b"{\"id\":1}");
    }

    #[test]
    fn test_from_bytes_incomplete() {
        let res = Request::from_bytes(b"POST /rpc HTTP/1.1\r\nHost: x");
        assert!(matches!(res, Err(Error::Incomplete)));
    }

    #[test]
    fn test_from_bytes_validation() {
        let test_cases = vec![
            (b"GET http://example.com/ HTTP/1.1\r\n\r\n".to_vec(), 400),
            (
                format!("GET /{} HTTP/1.1\r\n\r\n", "a".repeat(4096))
                    .into_bytes(),
                414,
            ),
            (b"BREW /pot HTTP/1.1\r\n\r\n".to_vec(), 400),
        ];

        for (bytes, code) in test_cases {
            let err = Request::from_bytes(&bytes).expect_err("invalid request");
            assert_eq!(err.status().code(), code, "Failed for: {err}");
        }
    }
}
