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

//! Text utilities.

use regex::Regex;
use std::borrow::Cow;
use std::sync::LazyLock;

// ----------------------------------------------------------------------------
// Constants
// ----------------------------------------------------------------------------

/// Runs of control characters and spaces.
static SPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\x00-\x20]+").expect("invariant"));

// ----------------------------------------------------------------------------
// Functions
// ----------------------------------------------------------------------------

/// Replaces all runs of whitespace and control characters with one space.
///
/// The result is trimmed on both ends.
///
/// # Examples
///
/// ```
/// use tessera::escape::squeeze;
///
/// // Squeeze value
/// assert_eq!(squeeze("  a \t\r\n b\x00c  "), "a b c");
/// ```
#[must_use]
pub fn squeeze(value: &str) -> Cow<'_, str> {
    match SPACE_RE.replace_all(value, " ") {
        Cow::Borrowed(value) => Cow::Borrowed(value.trim()),
        Cow::Owned(value) => Cow::Owned(value.trim().to_string()),
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
