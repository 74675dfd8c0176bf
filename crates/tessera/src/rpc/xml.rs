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
//! XML-RPC dispatcher.
//!
//! Serves the same [`Methods`] as [`JsonRpc`][] over XML-RPC. Every `POST`
//! is answered with `200 OK` and a method response, which carries a fault
//! for anything that went wrong, including input that cannot be parsed.
//!
//! Dotted method names address sub-handlers: `math.add` invokes `add` on
//! the sub-handler registered as `math`.
//!
//! [`JsonRpc`]: crate::rpc::JsonRpc

use ahash::AHashMap;
use serde_json::Value;
use std::fmt;
use tessera_serve::handler::Handler;
use tessera_serve::http::{
    Header, Method, Request, Response, ResponseExt, Status,
};

use crate::rpc::{self, Methods, catch_panic};

mod error;
mod marshal;

pub use error::{Error, Result};
pub use marshal::{Call, parse_call, write_fault, write_response};

// ----------------------------------------------------------------------------
// Constants
// ----------------------------------------------------------------------------

/// Separator between sub-handler prefix and method name.
const SEPARATOR: char = '.';

// ----------------------------------------------------------------------------
// Traits
// ----------------------------------------------------------------------------

/// Method path resolution, erasing the methods of sub-handlers.
trait Resolve {
    /// Resolves the given path and invokes the method.
    fn call(
        &self,
        path: &str,
        params: Vec<Value>,
    ) -> std::result::Result<Value, Fault>;
}

// ----------------------------------------------------------------------------
// Structs
// ----------------------------------------------------------------------------

/// XML-RPC fault.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Fault {
    /// Fault code.
    pub code: i32,
    /// Fault message.
    pub message: String,
}

/// XML-RPC handler.
///
/// # Examples
///
/// ```
/// use tessera::rpc::MethodTable;
/// use tessera::rpc::xml::XmlRpc;
/// use tessera_serve::handler::Handler;
/// use tessera_serve::http::{Header, Method, Request};
///
/// // Create handler with sub-handler
/// let math = MethodTable::new().typed("add", |(a, b): (i32, i32)| Ok(a + b));
/// let rpc = XmlRpc::new(MethodTable::new())
///     .sub_handler("math", XmlRpc::new(math));
///
/// // Handle request
/// let req = Request::new().method(Method::Post).body(
///     "<methodCall><methodName>math.add</methodName><params>\
///      <param><value><int>2</int></value></param>\
///      <param><value><int>3</int></value></param>\
///      </params></methodCall>",
/// );
/// let res = rpc.handle(req);
/// assert_eq!(res.headers.get(Header::ContentType), Some("text/xml"));
/// assert!(res.body.ends_with(b"<value><int>5</int></value>\n</param>\n\
///                             </params>\n</methodResponse>\n"));
/// ```
pub struct XmlRpc<M> {
    /// Methods.
    methods: M,
    /// Sub-handlers by prefix.
    sub_handlers: AHashMap<String, Box<dyn Resolve>>,
    /// Whether nulls may be written.
    allow_none: bool,
}

// ----------------------------------------------------------------------------
// Implementations
// ----------------------------------------------------------------------------

impl Fault {
    /// Code for unknown methods and sub-handlers.
    pub const NOT_FOUND: i32 = 8001;
    /// Code for everything else.
    pub const FAILURE: i32 = 8002;

    /// Creates a fault.
    pub fn new<M>(code: i32, message: M) -> Self
    where
        M: ToString,
    {
        Self { code, message: message.to_string() }
    }
}

// ----------------------------------------------------------------------------

impl<M> XmlRpc<M>
where
    M: Methods,
{
    /// Creates a handler for the given methods.
    pub fn new(methods: M) -> Self {
        Self {
            methods,
            sub_handlers: AHashMap::new(),
            allow_none: false,
        }
    }

    /// Registers a sub-handler for method names starting with `prefix.`.
    ///
    /// Registering a prefix again replaces the previous sub-handler. Only the
    /// top-level handler's `allow_none` setting applies.
    #[must_use]
    pub fn sub_handler<N>(mut self, prefix: &str, handler: XmlRpc<N>) -> Self
    where
        N: Methods + 'static,
    {
        self.sub_handlers.insert(prefix.to_string(), Box::new(handler));
        self
    }

    /// Sets whether null results are written as `<nil/>`.
    ///
    /// Otherwise, null results are reported as faults.
    #[inline]
    #[must_use]
    pub fn allow_none(mut self, allow_none: bool) -> Self {
        self.allow_none = allow_none;
        self
    }

    /// Returns the methods.
    #[inline]
    #[must_use]
    pub fn methods(&self) -> &M {
        &self.methods
    }

    /// Dispatches the given request body, returning the method response.
    ///
    /// This method is infallible, as all errors are reported as faults.
    #[must_use]
    pub fn dispatch(&self, body: &[u8]) -> Vec<u8> {
        let outcome = match parse_call(body) {
            Ok(Call { method, params }) => self.call(&method, params),
            Err(err) => Err(Fault::new(
                Fault::FAILURE,
                format!("can't deserialize input: {err}"),
            )),
        };

        #[cfg(feature = "tracing")]
        if let Err(fault) = &outcome {
            tracing::debug!(code = fault.code, "Call failed: {fault}");
        }

        // Results that cannot be written are faults, too
        let res = match outcome {
            Ok(value) => write_response(&value, self.allow_none)
                .unwrap_or_else(|err| {
                    write_fault(&Fault::new(
                        Fault::FAILURE,
                        format!("can't serialize output: {err}"),
                    ))
                }),
            Err(fault) => write_fault(&fault),
        };
        res.into_bytes()
    }
}

// ----------------------------------------------------------------------------
// Trait implementations
// ----------------------------------------------------------------------------

impl<M> Resolve for XmlRpc<M>
where
    M: Methods,
{
    fn call(
        &self,
        path: &str,
        params: Vec<Value>,
    ) -> std::result::Result<Value, Fault> {
        if let Some((prefix, path)) = path.split_once(SEPARATOR) {
            let Some(handler) = self.sub_handlers.get(prefix) else {
                return Err(Fault::new(
                    Fault::NOT_FOUND,
                    format!("no such subHandler {prefix}"),
                ));
            };
            return handler.call(path, params);
        }

        // Panics are not reported in detail
        catch_panic(|| self.methods.invoke(path, params))
            .unwrap_or_else(|_| Err(rpc::Fault::failure("error")))
            .map_err(Fault::from)
    }
}

// ----------------------------------------------------------------------------

impl<M> Handler for XmlRpc<M>
where
    M: Methods,
{
    /// Handles the given request.
    ///
    /// Only `POST` is allowed, all other methods are answered with `405`.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all))]
    fn handle(&self, req: Request) -> Response {
        if req.method != Method::Post {
            return Response::from_status(Status::MethodNotAllowed)
                .header(Header::Allow, Method::Post);
        }
        Response::new().status(Status::Ok).xml(self.dispatch(&req.body))
    }
}

// ----------------------------------------------------------------------------

impl From<rpc::Fault> for Fault {
    /// Creates a fault from the fault of a method.
    fn from(fault: rpc::Fault) -> Self {
        match fault {
            rpc::Fault::NotFound(name) => {
                let message = format!("function {name} not found");
                Fault::new(Fault::NOT_FOUND, message)
            }
            rpc::Fault::Failure(message) => {
                Fault::new(Fault::FAILURE, message)
            }
        }
    }
}

// ----------------------------------------------------------------------------

impl fmt::Display for Fault {
    /// Formats the fault for display.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

// ----------------------------------------------------------------------------

impl<M> fmt::Debug for XmlRpc<M>
where
    M: fmt::Debug,
{
    /// Formats the handler for debugging.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut prefixes: Vec<_> = self.sub_handlers.keys().collect();
        prefixes.sort();
        f.debug_struct("XmlRpc")
            .field("methods", &self.methods)
            .field("sub_handlers", &prefixes)
            .field("allow_none", &self.allow_none)
            .finish()
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
