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

//! JSON-RPC error.

use std::result;
use tessera_serve::http::Status;
use thiserror::Error;

use crate::json;

// ----------------------------------------------------------------------------
// Enums
// ----------------------------------------------------------------------------

/// JSON-RPC error.
///
/// These errors concern the transport, not the method call itself, which is
/// why they are never part of an RPC response. Failing method calls produce
/// a [`Fault`][] instead.
///
/// [`Fault`]: crate::rpc::Fault
#[derive(Debug, Error)]
pub enum Error {
    /// Request body is not a valid RPC request.
    #[error("bad request: {0}")]
    Request(String),

    /// Response could not be encoded.
    #[error(transparent)]
    Json(#[from] json::Error),
}

// ----------------------------------------------------------------------------
// Implementations
// ----------------------------------------------------------------------------

impl Error {
    /// Returns the status a server should answer this error with.
    ///
    /// # Examples
    ///
    /// ```
    /// use tessera::rpc::Error;
    /// use tessera_serve::http::Status;
    ///
    /// // Obtain status for error
    /// let err = Error::Request(String::from("missing id"));
    /// assert_eq!(err.status(), Status::BadRequest);
    /// ```
    #[must_use]
    pub fn status(&self) -> Status {
        match self {
            Error::Request(_) => Status::BadRequest,
            Error::Json(_) => Status::InternalServerError,
        }
    }
}

// ----------------------------------------------------------------------------
// Type aliases
// ----------------------------------------------------------------------------

/// JSON-RPC result.
pub type Result<T = ()> = result::Result<T, Error>;
