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

//! Handler.

use super::http::{Request, Response};

// ----------------------------------------------------------------------------
// Traits
// ----------------------------------------------------------------------------

/// Handler.
///
/// A handler answers every [`Request`] it is given with a [`Response`]. It
/// sits at the end of a request processing chain, so there is nothing left
/// to defer to: failures must be turned into responses, e.g. a 400 for input
/// the handler cannot make sense of.
pub trait Handler {
    /// Handles the given request.
    ///
    /// This method must be infallible and should not panic.
    ///
    /// # Examples
    ///
    /// ```
    /// use tessera_serve::handler::Handler;
    /// use tessera_serve::http::{Method, Request, Response, ResponseExt};
    ///
    /// // Define handler echoing the request body
    /// struct Echo;
    ///
    /// impl Handler for Echo {
    ///     fn handle(&self, req: Request) -> Response {
    ///         Response::new().json(req.body.into_owned())
    ///     }
    /// }
    ///
    /// // Handle request with handler
    /// let req = Request::new().method(Method::Post).body("[1,2]");
    /// let res = Echo.handle(req);
    /// assert_eq!(res.body, b"[1,2]");
    /// ```
    fn handle(&self, req: Request) -> Response;
}
