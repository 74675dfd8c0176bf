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

//! Linkification.

use ahash::AHashSet;
use regex::{Captures, Regex};
use std::borrow::Cow;
use std::fmt::{self, Write};
use std::sync::{Arc, LazyLock};

use super::xhtml::xhtml_escape;

// ----------------------------------------------------------------------------
// Constants
// ----------------------------------------------------------------------------

/// URL regex, applied to already escaped text.
///
/// Groups are the URL, the protocol and the slashes following the protocol.
/// The only entities allowed inside a URL are `&amp;` and `&quot;`, and the
/// last character must not be punctuation, so trailing dots or a closing
/// exclamation mark are not swallowed. Every repetition is bounded by a
/// distinct character class, so long runs of dots can't blow up matching.
static URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"\b((?:([\w-]+):(/{1,3})|www[.])",
        r"(?:(?:(?:[^\s&()]|&amp;|&quot;)*",
        r##"(?:[^!"#$%&'()*+,.:;<=>?@\[\]\^`{|}\~\s]))"##,
        r"|(?:\((?:[^\s&()]|&amp;|&quot;)*\)))+)",
    ))
    .expect("invariant")
});

/// Display length above which URLs are shortened.
const MAX_LEN: usize = 30;

/// Number of characters kept from the first path segment when shortening.
const SEGMENT_LEN: usize = 8;

// ----------------------------------------------------------------------------
// Enums
// ----------------------------------------------------------------------------

/// Extra attributes added to generated anchors.
#[derive(Clone)]
pub enum ExtraParams {
    /// Same attributes for every link.
    Static(String),
    /// Attributes computed from the final `href` of each link.
    Computed(Arc<dyn Fn(&str) -> String + Send + Sync>),
}

// ----------------------------------------------------------------------------
// Structs
// ----------------------------------------------------------------------------

/// Linkification options.
///
/// By default, `http` and `https` URLs as well as bare `www.` hosts are turned
/// into links, nothing is shortened, and no extra attributes are added.
///
/// # Examples
///
/// ```
/// use tessera::escape::Linkify;
///
/// // Create options and linkify text
/// let linkify = Linkify::new()
///     .extra_params(r#"rel="nofollow""#)
///     .require_protocol(true);
///
/// let html = linkify.apply("Go to https://example.com or www.example.com!");
/// assert_eq!(
///     html,
///     "Go to <a href=\"https://example.com\" rel=\"nofollow\">\
///      https://example.com</a> or www.example.com!"
/// );
/// ```
#[derive(Clone, Debug)]
pub struct Linkify {
    /// Whether long URLs are shortened for display.
    shorten: bool,
    /// Extra attributes for generated anchors.
    extra_params: ExtraParams,
    /// Whether URLs without protocol are left alone.
    require_protocol: bool,
    /// Protocols that may be linked.
    permitted_protocols: AHashSet<String>,
}

// ----------------------------------------------------------------------------
// Implementations
// ----------------------------------------------------------------------------

impl Linkify {
    /// Creates linkification options with defaults.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets whether long URLs are shortened for display.
    ///
    /// Shortened links keep the full URL in `href` and additionally carry it
    /// in a `title` attribute, so it is disclosed on mouse-over.
    #[inline]
    #[must_use]
    pub fn shorten(mut self, shorten: bool) -> Self {
        self.shorten = shorten;
        self
    }

    /// Sets extra attributes to add to every anchor.
    #[inline]
    #[must_use]
    pub fn extra_params<P>(mut self, params: P) -> Self
    where
        P: Into<ExtraParams>,
    {
        self.extra_params = params.into();
        self
    }

    /// Sets a function computing extra attributes from the final `href`.
    ///
    /// # Examples
    ///
    /// ```
    /// use tessera::escape::Linkify;
    ///
    /// // Mark links leaving the site as external
    /// let linkify = Linkify::new().extra_params_with(|href| {
    ///     if href.starts_with("http://example.com") {
    ///         String::from(r#"class="internal""#)
    ///     } else {
    ///         String::from(r#"class="external" rel="nofollow""#)
    ///     }
    /// });
    ///
    /// let html = linkify.apply("http://rust-lang.org");
    /// assert!(html.contains(r#"class="external""#));
    /// ```
    #[inline]
    #[must_use]
    pub fn extra_params_with<F>(self, f: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        self.extra_params(ExtraParams::Computed(Arc::new(f)))
    }

    /// Sets whether only URLs with an explicit protocol are linked.
    #[inline]
    #[must_use]
    pub fn require_protocol(mut self, require_protocol: bool) -> Self {
        self.require_protocol = require_protocol;
        self
    }

    /// Sets the protocols that may be linked, replacing the defaults.
    ///
    /// Be careful with what is permitted here, as including `javascript`
    /// opens the door to script injection.
    #[must_use]
    pub fn permitted_protocols<I, S>(mut self, protocols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let iter = protocols.into_iter();
        self.permitted_protocols = iter.map(Into::into).collect();
        self
    }

    /// Converts plain text into HTML with links.
    ///
    /// The whole text is escaped first, so the result is safe to embed into
    /// HTML, whether or not any links were found.
    #[must_use]
    pub fn apply(&self, text: &str) -> String {
        let text = xhtml_escape(text);
        URL_RE
            .replace_all(&text, |caps: &Captures| self.make_link(caps))
            .into_owned()
    }

    /// Creates an anchor for the matched URL, or returns it unchanged.
    fn make_link(&self, caps: &Captures) -> String {
        let url = &caps[1];
        let protocol = caps.get(2).map(|m| m.as_str());
        match protocol {
            None if self.require_protocol => return url.to_string(),
            Some(protocol) if !self.permitted_protocols.contains(protocol) => {
                return url.to_string();
            }
            _ => {}
        }

        // Default to http if no protocol was given
        let href = match protocol {
            Some(_) => Cow::Borrowed(url),
            None => Cow::Owned(format!("http://{url}")),
        };

        let mut params = self.extra_params.render(&href);
        let mut display = Cow::Borrowed(url);
        if self.shorten {
            // Protocol, colon and slashes are kept verbatim when shortening
            let prefix = protocol.map_or(0, |protocol| {
                protocol.len() + 1 + caps.get(3).map_or(0, |m| m.len())
            });
            if let Some(short) = shorten(url, prefix) {
                write!(params, " title=\"{href}\"").expect("invariant");
                display = Cow::Owned(short);
            }
        }
        format!("<a href=\"{href}\"{params}>{display}</a>")
    }
}

impl ExtraParams {
    /// Renders the attributes for the given `href`, with a leading space.
    fn render(&self, href: &str) -> String {
        let computed;
        let params = match self {
            ExtraParams::Static(params) => params.as_str(),
            ExtraParams::Computed(f) => {
                computed = f(href);
                computed.as_str()
            }
        };

        // Normalize surrounding whitespace to a single leading space
        let params = params.trim();
        if params.is_empty() {
            String::new()
        } else {
            format!(" {params}")
        }
    }
}

// ----------------------------------------------------------------------------
// Trait implementations
// ----------------------------------------------------------------------------

impl Default for Linkify {
    /// Creates linkification options with defaults.
    fn default() -> Self {
        Self {
            shorten: false,
            extra_params: ExtraParams::default(),
            require_protocol: false,
            permitted_protocols: AHashSet::from_iter([
                String::from("http"),
                String::from("https"),
            ]),
        }
    }
}

// ----------------------------------------------------------------------------

impl Default for ExtraParams {
    /// Creates empty extra attributes.
    #[inline]
    fn default() -> Self {
        ExtraParams::Static(String::new())
    }
}

impl From<&str> for ExtraParams {
    #[inline]
    fn from(params: &str) -> Self {
        ExtraParams::Static(params.to_string())
    }
}

impl From<String> for ExtraParams {
    #[inline]
    fn from(params: String) -> Self {
        ExtraParams::Static(params)
    }
}

impl fmt::Debug for ExtraParams {
    /// Formats the extra attributes for debugging.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtraParams::Static(params) => {
                f.debug_tuple("Static").field(params).finish()
            }
            ExtraParams::Computed(_) => f.write_str("Computed(..)"),
        }
    }
}

// ----------------------------------------------------------------------------
// Functions
// ----------------------------------------------------------------------------

/// Converts plain text into HTML with links, using default options.
///
/// # Examples
///
/// ```
/// use tessera::escape::linkify;
///
/// // Linkify text
/// let html = linkify("Hello www.example.com!");
/// assert_eq!(
///     html,
///     r#"Hello <a href="http://www.example.com">www.example.com</a>!"#
/// );
/// ```
#[must_use]
pub fn linkify(text: &str) -> String {
    Linkify::default().apply(text)
}

/// Shortens a URL for display, or returns nothing if it's short enough.
///
/// The host and the start of the first path segment are kept, with the
/// segment cut at its first `?` or `.`. If that is still too long, the URL is
/// hard-truncated, taking care not to split an entity like `&amp;`. Lengths
/// are measured in characters.
fn shorten(url: &str, prefix: usize) -> Option<String> {
    let len = url.chars().count();
    if len <= MAX_LEN {
        return None;
    }

    // Keep host and the beginning of the first path segment
    let mut parts = url[prefix..].split('/');
    let host = parts.next().unwrap_or_default();
    let mut short = match parts.next() {
        Some(segment) => {
            let segment = take_chars(segment, SEGMENT_LEN);
            let segment = segment.split(['?', '.']).next().unwrap_or_default();
            format!("{}{host}/{segment}", &url[..prefix])
        }
        None => url.to_string(),
    };

    // Hard-truncate if still considerably too long
    if short.chars().count() > MAX_LEN * 3 / 2 {
        short = take_chars(&short, MAX_LEN).to_string();
    }
    if short == url {
        return None;
    }

    // Avoid cutting an entity in half at the end
    if let Some(index) = short.rfind('&') {
        if short[..index].chars().count() > MAX_LEN - 5 {
            short.truncate(index);
        }
    }

    // Only use the shortened URL if it's actually shorter
    short.push_str("...");
    (short.chars().count() < len).then_some(short)
}

/// Returns the prefix of the string holding at most `n` characters.
fn take_chars(value: &str, n: usize) -> &str {
    value
        .char_indices()
        .nth(n)
        .map_or(value, |(index, _)| &value[..index])
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linkify() {
        let test_cases = vec![
            ("", ""),
            ("no links here", "no links here"),
            ("<b>bold</b>", "&lt;b&gt;bold&lt;/b&gt;"),
            (
                "Hello www.example.ltd!",
                concat!(
                    r#"Hello <a href="http://www.example.ltd">"#,
                    "www.example.ltd</a>!",
                ),
            ),
            (
                "see http://example.com.",
                r#"see <a href="http://example.com">http://example.com</a>."#,
            ),
            (
                "http://example.com/path?a=1&b=2",
                "<a href=\"http://example.com/path?a=1&amp;b=2\">\
                 http://example.com/path?a=1&amp;b=2</a>",
            ),
            (
                "(https://example.com/wiki/Rust_(language))",
                "(<a href=\"https://example.com/wiki/Rust_(language)\">\
                 https://example.com/wiki/Rust_(language)</a>)",
            ),
            ("javascript://alert(1)", "javascript://alert(1)"),
            ("ftp://files.example.com/a", "ftp://files.example.com/a"),
        ];

        for (text, expected) in test_cases {
            assert_eq!(linkify(text), expected, "Failed for: {text}");
        }
    }

    #[test]
    fn test_linkify_require_protocol() {
        let linkify = Linkify::new().require_protocol(true);
        assert_eq!(
            linkify.apply("Hello www.example.ltd!"),
            "Hello www.example.ltd!"
        );
        assert_eq!(
            linkify.apply("Hello http://example.ltd!"),
            r#"Hello <a href="http://example.ltd">http://example.ltd</a>!"#
        );
    }

    #[test]
    fn test_linkify_permitted_protocols() {
        let linkify = Linkify::new().permitted_protocols(["ftp"]);
        assert_eq!(
            linkify.apply("ftp://files.example.com/a or http://example.com"),
            "<a href=\"ftp://files.example.com/a\">ftp://files.example.com/a\
             </a> or http://example.com"
        );
    }

    #[test]
    fn test_linkify_extra_params() {
        let linkify = Linkify::new().extra_params("  rel=\"nofollow\"  ");
        assert_eq!(
            linkify.apply("http://a.com"),
            r#"<a href="http://a.com" rel="nofollow">http://a.com</a>"#
        );

        // Computed attributes receive the final href
        let linkify = Linkify::new().extra_params_with(|href| {
            format!("data-href=\"{href}\"")
        });
        assert_eq!(
            linkify.apply("www.a.com"),
            "<a href=\"http://www.a.com\" data-href=\"http://www.a.com\">\
             www.a.com</a>"
        );

        // Empty computed attributes add nothing
        let linkify = Linkify::new().extra_params_with(|_| String::new());
        assert_eq!(
            linkify.apply("http://a.com"),
            r#"<a href="http://a.com">http://a.com</a>"#
        );
    }

    #[test]
    fn test_linkify_shorten_without_protocol() {
        let linkify = Linkify::new().shorten(true);
        assert_eq!(
            linkify.apply(
                "Hello www.example.ltd/when/you/have/long/urls/what/to/do!"
            ),
            "Hello <a href=\"http://www.example.ltd/when/you/have/long/urls\
             /what/to/do\" title=\"http://www.example.ltd/when/you/have/long\
             /urls/what/to/do\">www.example.ltd/when...</a>!"
        );
    }

    #[test]
    fn test_linkify_shorten_long_domain() {
        let linkify = Linkify::new().shorten(true);
        let href = "http://www.my-super-duper-awesome-domain-example.ltd/when\
                    /you/have/long/urls/what/to/do/you/will/be/shocked?you=\
                    will&amp;xyz=1&amp;you=will&amp;not=dream&amp;today";
        assert_eq!(
            linkify.apply(
                "Hello my friends! Please visit www.my-super-duper-awesome-\
                 domain-example.ltd/when/you/have/long/urls/what/to/do/you/\
                 will/be/shocked?you=will&xyz=1&you=will&not=dream&today!"
            ),
            format!(
                "Hello my friends! Please visit <a href=\"{href}\" \
                 title=\"{href}\">www.my-super-duper-awesome-dom...</a>!"
            )
        );
    }

    #[test]
    fn test_linkify_shorten_avoids_splitting_entity() {
        let linkify = Linkify::new().shorten(true);
        let href = "http://www.the-big-super-duper-ultra&amp;awesome-domain-\
                    example.ltd/when/you/have/long/urls?you=will&amp;freakout";
        assert_eq!(
            linkify.apply(
                "Please visit www.the-big-super-duper-ultra&awesome-domain-\
                 example.ltd/when/you/have/long/urls?you=will&freakout!"
            ),
            format!(
                "Please visit <a href=\"{href}\" title=\"{href}\">\
                 www.the-big-super-duper-ultra...</a>!"
            )
        );
    }

    #[test]
    fn test_linkify_shorten_with_protocol() {
        let linkify = Linkify::new().shorten(true);
        let test_cases = vec![
            // Short enough, left alone
            (
                "http://example.com/a",
                r#"<a href="http://example.com/a">http://example.com/a</a>"#,
            ),
            // Host and start of first path segment
            (
                "https://example.com/articles/2024/some-long-slug",
                "<a href=\"https://example.com/articles/2024/some-long-slug\" \
                 title=\"https://example.com/articles/2024/some-long-slug\">\
                 https://example.com/articles...</a>",
            ),
            // Segment cut at first dot
            (
                "http://example.com/index.html?page=1&sort=desc",
                "<a href=\"http://example.com/index.html?\
                 page=1&amp;sort=desc\" \
                 title=\"http://example.com/index.html?page=1&amp;sort=desc\">\
                 http://example.com/index...</a>",
            ),
            // Hard-truncated without path
            (
                "http://www.a-very-long-domain-name-example.com",
                "<a href=\"http://www.a-very-long-domain-name-example.com\" \
                 title=\"http://www.a-very-long-domain-name-example.com\">\
                 http://www.a-very-long-domain-...</a>",
            ),
            // Not shorter after appending the ellipsis
            (
                "http://an-example-domain.co/abcdefghi",
                "<a href=\"http://an-example-domain.co/abcdefghi\">\
                 http://an-example-domain.co/abcdefghi</a>",
            ),
        ];

        for (text, expected) in test_cases {
            assert_eq!(linkify.apply(text), expected, "Failed for: {text}");
        }
    }

    #[test]
    fn test_linkify_trailing_dots() {
        let text = format!("www.{}!", ".".repeat(50_000));
        assert_eq!(linkify(&text), text);
    }

    #[test]
    fn test_take_chars() {
        assert_eq!(take_chars("ünïcödé", 3), "ünï");
        assert_eq!(take_chars("abc", 8), "abc");
    }
}
