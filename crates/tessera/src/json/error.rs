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

//! JSON codec error.

use std::str::Utf8Error;
use std::result;
use thiserror::Error;

// ----------------------------------------------------------------------------
// Enums
// ----------------------------------------------------------------------------

/// JSON codec error.
#[derive(Debug, Error)]
pub enum Error {
    /// Value could not be encoded.
    #[error("encode error: {0}")]
    Encode(#[source] serde_json::Error),

    /// Input could not be decoded.
    #[error("decode error: {0}")]
    Decode(#[source] serde_json::Error),

    /// Input is not valid UTF-8.
    #[error(transparent)]
    Utf8(#[from] Utf8Error),

    /// No codec is registered under the given name.
    #[error("unknown codec: {0}")]
    UnknownCodec(String),

    /// Custom codec failure.
    #[error("{0}")]
    Custom(String),
}

// ----------------------------------------------------------------------------
// Implementations
// ----------------------------------------------------------------------------

impl Error {
    /// Creates a custom error, for use in user-supplied codecs.
    #[inline]
    pub fn custom<M>(message: M) -> Self
    where
        M: ToString,
    {
        Error::Custom(message.to_string())
    }
}

// ----------------------------------------------------------------------------
// Type aliases
// ----------------------------------------------------------------------------

/// JSON codec result.
pub type Result<T = ()> = result::Result<T, Error>;
