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

//! JSON-RPC dispatcher.
//!
//! Requests are POSTed as JSON objects naming a method and its positional
//! parameters. Every request that can be parsed is answered with `200 OK`,
//! carrying either the result of the method or a fault, so failing methods
//! never surface as HTTP errors. Requests that cannot be parsed are rejected
//! with `400 Bad Request`.
//!
//! The same methods can be served over XML-RPC with [`xml::XmlRpc`].

use serde_json::Value;
use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use tessera_serve::handler::Handler;
use tessera_serve::http::{
    Header, Method, Request, Response, ResponseExt, Status,
};

use crate::json::Codecs;

mod error;
mod fault;
mod message;
mod methods;
pub mod xml;

pub use error::{Error, Result};
pub use fault::Fault;
pub use message::{RpcError, RpcRequest, RpcResponse};
pub use methods::{MethodTable, Methods};

// ----------------------------------------------------------------------------
// Structs
// ----------------------------------------------------------------------------

/// JSON-RPC handler.
///
/// The handler decodes requests and encodes responses with a [`Codecs`]
/// registry, which is the process-wide registry unless another one is set
/// with [`JsonRpc::with_codecs`].
///
/// # Examples
///
/// ```
/// use tessera::rpc::{JsonRpc, MethodTable};
/// use tessera_serve::handler::Handler;
/// use tessera_serve::http::{Method, Request, Status};
///
/// // Create handler
/// let rpc = JsonRpc::new(MethodTable::new().method("foo", |_| Ok("value")));
///
/// // Handle request
/// let req = Request::new()
///     .method(Method::Post)
///     .body(r#"{"id":1,"method":"foo"}"#);
/// let res = rpc.handle(req);
/// assert_eq!(res.status, Status::Ok);
/// assert_eq!(res.body, br#"{"error": null, "id": 1, "result": "value"}"#);
/// ```
pub struct JsonRpc<M> {
    /// Methods.
    methods: M,
    /// Codec registry.
    codecs: Arc<Codecs>,
}

// ----------------------------------------------------------------------------
// Implementations
// ----------------------------------------------------------------------------

impl<M> JsonRpc<M>
where
    M: Methods,
{
    /// Creates a handler for the given methods.
    pub fn new(methods: M) -> Self {
        Self { methods, codecs: Codecs::global() }
    }

    /// Uses the given codec registry instead of the process-wide one.
    #[inline]
    #[must_use]
    pub fn with_codecs(mut self, codecs: Arc<Codecs>) -> Self {
        self.codecs = codecs;
        self
    }

    /// Returns the methods.
    #[inline]
    #[must_use]
    pub fn methods(&self) -> &M {
        &self.methods
    }

    /// Dispatches the given request body, returning the encoded response.
    ///
    /// The leading arguments are passed to the method before the positional
    /// parameters of the request. Failing or panicking methods, as well as
    /// unknown method names, are reported inside the response.
    ///
    /// # Errors
    ///
    /// This method returns [`Error::Request`] if the body is not a valid RPC
    /// request, and [`Error::Json`] if the response cannot be encoded.
    pub fn dispatch(&self, body: &[u8], leading: &[Value]) -> Result<Vec<u8>> {
        let value = self
            .codecs
            .decode(body)
            .map_err(|err| Error::Request(err.to_string()))?;

        // Leading arguments come first
        let RpcRequest { id, method, params } = RpcRequest::try_from(value)?;
        let mut args = Vec::with_capacity(leading.len() + params.len());
        args.extend_from_slice(leading);
        args.extend(params);

        // Encode outcome, whether success or fault
        let outcome = self.invoke(&method, args);
        let res = RpcResponse::new(id, outcome);
        Ok(self.codecs.encode(&res)?.into_bytes())
    }

    /// Handles the given request, passing leading arguments to the method.
    ///
    /// Only `POST` is allowed, all other methods are answered with `405`.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all))]
    pub fn handle_with(&self, req: &Request, leading: &[Value]) -> Response {
        if req.method != Method::Post {
            return Response::from_status(Status::MethodNotAllowed)
                .header(Header::Allow, Method::Post);
        }

        // Transport errors are answered in plain text, without RPC response
        match self.dispatch(&req.body, leading) {
            Ok(body) => Response::new().status(Status::Ok).json(body),
            Err(err) => {
                #[cfg(feature = "tracing")]
                tracing::warn!("{err}");
                Response::from_status(err.status())
            }
        }
    }

    /// Invokes the given method, turning panics into faults.
    fn invoke(
        &self,
        name: &str,
        args: Vec<Value>,
    ) -> std::result::Result<Value, Fault> {
        let outcome = catch_panic(|| self.methods.invoke(name, args))
            .unwrap_or_else(|message| Err(Fault::Failure(message)));

        #[cfg(feature = "tracing")]
        match &outcome {
            Ok(_) => tracing::debug!(method = name, "Method succeeded"),
            Err(fault) => {
                tracing::debug!(method = name, "Method failed: {fault}");
            }
        }
        outcome
    }
}

// ----------------------------------------------------------------------------
// Trait implementations
// ----------------------------------------------------------------------------

impl<M> Handler for JsonRpc<M>
where
    M: Methods,
{
    #[inline]
    fn handle(&self, req: Request) -> Response {
        self.handle_with(&req, &[])
    }
}

// ----------------------------------------------------------------------------

impl<M> fmt::Debug for JsonRpc<M>
where
    M: fmt::Debug,
{
    /// Formats the handler for debugging.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsonRpc")
            .field("methods", &self.methods)
            .field("codecs", &self.codecs)
            .finish()
    }
}

// ----------------------------------------------------------------------------
// Functions
// ----------------------------------------------------------------------------

/// Runs the given function, returning the panic message if it panics.
fn catch_panic<F, T>(f: F) -> std::result::Result<T, String>
where
    F: FnOnce() -> T,
{
    panic::catch_unwind(AssertUnwindSafe(f))
        .map_err(|payload| panic_message(&*payload))
}

/// Extracts the message from a panic payload.
fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        String::from("method panicked")
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::json::Encoder;

    fn rpc() -> JsonRpc<MethodTable> {
        let methods = MethodTable::new()
            .method("foo", |_| Ok("value"))
            .method("args", Ok::<_, Fault>)
            .method("fail", |_| Err::<(), _>(Fault::failure("boom")))
            .method("panic", |_| -> std::result::Result<(), Fault> {
                panic!("exploded")
            })
            .typed("echo", |(text,): (String,)| Ok(text));
        JsonRpc::new(methods).with_codecs(Arc::new(Codecs::new()))
    }

    fn post(body: &str) -> Request<'static> {
        Request::new().method(Method::Post).path("/rpc").body(body)
    }

    fn decode(res: &Response) -> RpcResponse {
        serde_json::from_slice(&res.body).unwrap()
    }

    #[test]
    fn test_success() {
        let res = rpc().handle(post(r#"{"id":1, "method":"foo"}"#));
        assert_eq!(res.status, Status::Ok);
        let body = br#"{"error": null, "id": 1, "result": "value"}"#;
        assert_eq!(res.body, body);
    }

    #[test]
    fn test_compact_encoder() {
        let rpc = rpc();
        rpc.codecs.change_encoder("compact".parse().unwrap());
        let res = rpc.handle(post(r#"{"id":1, "method":"foo"}"#));
        assert_eq!(res.body, br#"{"error":null,"id":1,"result":"value"}"#);
    }

    #[test]
    fn test_content_type() {
        let res = rpc().handle(post(r#"{"id":1, "method":"foo"}"#));
        assert_eq!(
            res.headers.get(Header::ContentType),
            Some("application/json; charset=UTF-8")
        );
        let length = res.body.len().to_string();
        let content_length = res.headers.get(Header::ContentLength);
        assert_eq!(content_length, Some(length.as_str()));
    }

    #[test]
    fn test_faults() {
        let test_cases = vec![
            (
                r#"{"id":2,"method":"bar"}"#,
                json!(2),
                "method not found: bar",
            ),
            (r#"{"id":"x","method":"fail"}"#, json!("x"), "boom"),
            (r#"{"id":null,"method":"panic"}"#, Value::Null, "exploded"),
            (
                r#"{"id":[1],"method":"echo","params":[]}"#,
                json!([1]),
                "invalid params: invalid length 0, expected a tuple of size 1",
            ),
        ];

        for (body, id, message) in test_cases {
            let res = rpc().handle(post(body));
            assert_eq!(res.status, Status::Ok, "Failed for: {body}");

            // Faults are reported inside the response
            let res = decode(&res);
            assert_eq!(res.id, id, "Failed for: {body}");
            assert_eq!(res.result, Value::Null, "Failed for: {body}");
            assert_eq!(
                res.error,
                Some(RpcError { code: 0, message: message.to_string() }),
                "Failed for: {body}"
            );
        }
    }

    #[test]
    fn test_bad_request() {
        let test_cases = vec![
            "",
            "not json",
            "[1,2]",
            r#"{"method":"foo"}"#,
            r#"{"id":1}"#,
            r#"{"id":1,"method":1}"#,
            r#"{"id":1,"method":"foo","params":"x"}"#,
            r#"{"id":1,"method":"foo","params":null}"#,
        ];

        for body in test_cases {
            let res = rpc().handle(post(body));
            assert_eq!(res.status, Status::BadRequest, "Failed for: {body}");
            assert_eq!(res.body, b"Bad Request", "Failed for: {body}");
        }
    }

    #[test]
    fn test_invalid_utf8() {
        let req = Request::new().method(Method::Post).body(&b"\xff"[..]);
        assert_eq!(rpc().handle(req).status, Status::BadRequest);
    }

    #[test]
    fn test_method_not_allowed() {
        for method in [Method::Get, Method::Put, Method::Delete] {
            let req = Request::new()
                .method(method)
                .body(r#"{"id":1,"method":"foo"}"#);
            let res = rpc().handle(req);
            assert_eq!(
                res.status,
                Status::MethodNotAllowed,
                "Failed for: {method}"
            );
            assert_eq!(res.headers.get(Header::Allow), Some("POST"));
            assert_eq!(
                res.headers.get(Header::ContentType),
                Some("text/plain; charset=utf-8")
            );
        }
    }

    #[test]
    fn test_leading_args() {
        let req = post(r#"{"id":1,"method":"args","params":[2,3]}"#);
        let res = rpc().handle_with(&req, &[json!("session")]);
        assert_eq!(decode(&res).result, json!(["session", 2, 3]));
    }

    #[test]
    fn test_encoding_failure() {
        let rpc = rpc();
        rpc.codecs.change_encoder(Encoder::new(|_| {
            Err(crate::json::Error::custom("unsupported"))
        }));
        let res = rpc.handle(post(r#"{"id":1,"method":"foo"}"#));
        assert_eq!(res.status, Status::InternalServerError);
    }

    #[test]
    fn test_dispatch() {
        let req = br#"{"id":7,"method":"echo","params":["hi"]}"#;
        let body = rpc().dispatch(req, &[]).unwrap();
        assert_eq!(body, br#"{"error": null, "id": 7, "result": "hi"}"#);

        let err = rpc().dispatch(b"{}", &[]).unwrap_err();
        let missing_id = matches!(err, Error::Request(r) if r == "missing id");
        assert!(missing_id);
    }

    #[test]
    fn test_script_close_in_result() {
        let req = post(r#"{"id":1,"method":"echo","params":["</script>"]}"#);
        let res = rpc().handle(req);
        let body = br#"{"error": null, "id": 1, "result": "<\/script>"}"#;
        assert_eq!(res.body, body);
    }
}
