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
//! XML-RPC marshalling error.

use std::{result, str};
use thiserror::Error;

// ----------------------------------------------------------------------------
// Enums
// ----------------------------------------------------------------------------

/// XML-RPC marshalling error.
#[derive(Debug, Error)]
pub enum Error {
    /// XML error.
    #[error(transparent)]
    Xml(#[from] quick_xml::Error),

    /// Input is not UTF-8.
    #[error(transparent)]
    Utf8(#[from] str::Utf8Error),

    /// Element, text or end of input where it does not belong.
    #[error("unexpected {0}")]
    Unexpected(String),

    /// Value that does not match its type.
    #[error("invalid {kind} value: {value:?}")]
    Invalid {
        /// Value type.
        kind: &'static str,
        /// Value text.
        value: String,
    },

    /// Null without `allow_none`.
    #[error("cannot marshal None unless allow_none is enabled")]
    None,

    /// Integer outside of the 32-bit range.
    #[error("int exceeds XML-RPC limits")]
    Overflow,
}

// ----------------------------------------------------------------------------
// Type aliases
// ----------------------------------------------------------------------------

/// XML-RPC marshalling result.
pub type Result<T = ()> = result::Result<T, Error>;
