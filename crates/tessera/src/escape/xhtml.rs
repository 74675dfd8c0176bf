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

//! XHTML escaping.

use regex::{Captures, Regex};
use std::borrow::Cow;
use std::str::{self, Utf8Error};
use std::sync::LazyLock;

use super::entities;

// ----------------------------------------------------------------------------
// Constants
// ----------------------------------------------------------------------------

/// Entity regex, matching both `&name;` and `&#num;`.
static ENTITY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&(#?)(\w+?);").expect("invariant")
});

// ----------------------------------------------------------------------------
// Functions
// ----------------------------------------------------------------------------

/// Escapes a string so it is valid within XML or XHTML.
///
/// Each of `& < > " '` is replaced with its entity, everything else is left
/// unchanged. No allocation happens when there is nothing to escape.
///
/// # Examples
///
/// ```
/// use tessera::escape::xhtml_escape;
///
/// // Escape string
/// let value = xhtml_escape(r#"<a href="x">Tom & Jerry's</a>"#);
/// assert_eq!(
///     value,
///     "&lt;a href=&quot;x&quot;&gt;Tom &amp; Jerry&#39;s&lt;/a&gt;"
/// );
/// ```
#[must_use]
pub fn xhtml_escape(value: &str) -> Cow<'_, str> {
    let Some(start) = value.find(is_reserved) else {
        return Cow::Borrowed(value);
    };

    // Copy the clean prefix, then escape the rest character by character
    let mut escaped = String::with_capacity(value.len() + 16);
    escaped.push_str(&value[..start]);
    for c in value[start..].chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    Cow::Owned(escaped)
}

/// Escapes UTF-8 encoded bytes so they are valid within XML or XHTML.
///
/// # Errors
///
/// This function returns an error if the bytes are not valid UTF-8.
pub fn xhtml_escape_bytes(value: &[u8]) -> Result<Cow<'_, str>, Utf8Error> {
    str::from_utf8(value).map(xhtml_escape)
}

/// Un-escapes an XML-escaped string.
///
/// Entities are resolved in a single left-to-right scan. Decimal character
/// references are converted to their code point, named ones are looked up in
/// the HTML 4 entity table. Anything that cannot be resolved, like `&#x41;`,
/// `&#55296;` or `&bogus;`, is kept verbatim.
///
/// # Examples
///
/// ```
/// use tessera::escape::xhtml_unescape;
///
/// // Un-escape string
/// let value = xhtml_unescape("caf&eacute; &lt;3 &#9731; &nope;");
/// assert_eq!(value, "café <3 ☃ &nope;");
/// ```
#[must_use]
pub fn xhtml_unescape(value: &str) -> Cow<'_, str> {
    ENTITY_RE.replace_all(value, |caps: &Captures| {
        let name = &caps[2];
        let resolved = if caps[1].is_empty() {
            entities::lookup(name)
        } else {
            name.parse::<u32>().ok().and_then(char::from_u32)
        };

        // Keep the original text if the entity can't be resolved
        match resolved {
            Some(c) => c.to_string(),
            None => caps[0].to_string(),
        }
    })
}

/// Returns whether the character must be escaped.
#[inline]
fn is_reserved(c: char) -> bool {
    matches!(c, '&' | '<' | '>' | '"' | '\'')
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
