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

//! JSON-RPC fault.

use std::{error, fmt};

// ----------------------------------------------------------------------------
// Enums
// ----------------------------------------------------------------------------

/// JSON-RPC fault.
///
/// A fault is the failure of a single method call. It is reported back to
/// the caller inside an otherwise successful response, with the display of
/// the fault as its message.
///
/// Any error converts into a fault, so methods can use `?` on whatever they
/// call. For the same reason, faults are not errors themselves.
///
/// # Examples
///
/// ```
/// use std::io;
/// use tessera::rpc::Fault;
///
/// // Create fault from error
/// let err = io::Error::other("disk on fire");
/// let fault = Fault::from(err);
/// assert_eq!(fault.to_string(), "disk on fire");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Fault {
    /// No method with the given name is registered.
    NotFound(String),
    /// Method failed with the given message.
    Failure(String),
}

// ----------------------------------------------------------------------------
// Implementations
// ----------------------------------------------------------------------------

impl Fault {
    /// Creates a failure with the given message.
    #[inline]
    pub fn failure<M>(message: M) -> Self
    where
        M: ToString,
    {
        Fault::Failure(message.to_string())
    }
}

// ----------------------------------------------------------------------------
// Trait implementations
// ----------------------------------------------------------------------------

impl<E> From<E> for Fault
where
    E: error::Error,
{
    #[inline]
    fn from(err: E) -> Self {
        Fault::Failure(err.to_string())
    }
}

// ----------------------------------------------------------------------------

impl fmt::Display for Fault {
    /// Formats the fault for display.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Fault::NotFound(name) => write!(f, "method not found: {name}"),
            Fault::Failure(message) => f.write_str(message),
        }
    }
}
