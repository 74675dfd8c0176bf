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

//! Linkify settings.

use serde::Deserialize;

// ----------------------------------------------------------------------------
// Structs
// ----------------------------------------------------------------------------

/// Linkify settings.
///
/// Extra parameters can only be static here. Computed parameters must be
/// set on the resulting [`Linkify`][] value.
///
/// [`Linkify`]: crate::escape::Linkify
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Linkify {
    /// Whether to shorten long link texts.
    pub shorten: bool,
    /// Extra attributes for every anchor.
    pub extra_params: String,
    /// Whether only URLs with an explicit protocol are linked.
    pub require_protocol: bool,
    /// Protocols that may be linked.
    pub permitted_protocols: Vec<String>,
}

// ----------------------------------------------------------------------------
// Trait implementations
// ----------------------------------------------------------------------------

impl Default for Linkify {
    fn default() -> Self {
        Self {
            shorten: false,
            extra_params: String::new(),
            require_protocol: false,
            permitted_protocols: vec![
                String::from("http"),
                String::from("https"),
            ],
        }
    }
}
