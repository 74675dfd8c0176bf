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

//! Request pipeline tests.

use serde_json::{Value, json};
use std::sync::Arc;
use tessera::escape::linkify;
use tessera::json::Codecs;
use tessera::rpc::xml::{XmlRpc, write_response};
use tessera::rpc::{Fault, JsonRpc, MethodTable, RpcResponse};
use tessera_serve::handler::Handler;
use tessera_serve::http::{Header, Request, Response, Status};

// ----------------------------------------------------------------------------
// Functions
// ----------------------------------------------------------------------------

fn rpc() -> JsonRpc<MethodTable> {
    let methods = MethodTable::new()
        .method("foo", |_| Ok("value"))
        .typed("linkify", |(text,): (String,)| Ok(linkify(&text)))
        .typed("div", |(a, b): (i64, i64)| {
            a.checked_div(b).ok_or_else(|| Fault::failure("division by zero"))
        });
    JsonRpc::new(methods).with_codecs(Arc::new(Codecs::new()))
}

fn xml_rpc() -> XmlRpc<MethodTable> {
    let math = MethodTable::new().typed("div", |(a, b): (i32, i32)| {
        a.checked_div(b).ok_or_else(|| Fault::failure("division by zero"))
    });
    XmlRpc::new(MethodTable::new()).sub_handler("math", XmlRpc::new(math))
}

fn roundtrip(raw: &[u8]) -> Response {
    let req = Request::from_bytes(raw).unwrap();
    rpc().handle(req)
}

fn post(body: &str) -> Vec<u8> {
    format!(
        "POST /rpc HTTP/1.1\r\nHost: localhost\r\n\
         Content-Type: application/json\r\nContent-Length: {}\r\n\r\n{body}",
        body.len()
    )
    .into_bytes()
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[test]
fn test_post() {
    let res = roundtrip(&post(r#"{"id":1, "method":"foo"}"#));
    assert_eq!(res.status, Status::Ok);
    assert_eq!(
        res.headers.get(Header::ContentType),
        Some("application/json; charset=UTF-8")
    );

    // Serialize response as it would be written to the socket
    let bytes = res.into_bytes();
    let body = br#"{"error": null, "id": 1, "result": "value"}"#;
    assert!(bytes.starts_with(b"HTTP/1.1 200 OK\r\n"));
    assert!(bytes.ends_with(body));
}

#[test]
fn test_methods() {
    let test_cases = vec![
        (
            r#"{"id":"a","method":"linkify","params":["see http://x.org"]}"#,
            json!(r#"see <a href="http://x.org">http://x.org</a>"#),
            None,
        ),
        (
            r#"{"id":"b","method":"div","params":[7,2]}"#,
            json!(3),
            None,
        ),
        (
            r#"{"id":"c","method":"div","params":[7,0]}"#,
            Value::Null,
            Some("division by zero"),
        ),
        (
            r#"{"id":"d","method":"bar"}"#,
            Value::Null,
            Some("method not found: bar"),
        ),
    ];

    for (body, result, message) in test_cases {
        let res = roundtrip(&post(body));
        assert_eq!(res.status, Status::Ok, "Failed for: {body}");

        // Decode response as a client would
        let res: RpcResponse = serde_json::from_slice(&res.body).unwrap();
        let error = res.error.map(|err| err.message);
        assert_eq!(res.result, result, "Failed for: {body}");
        assert_eq!(error.as_deref(), message, "Failed for: {body}");
    }
}

#[test]
fn test_rejected() {
    let test_cases = vec![
        (post("{"), Status::BadRequest),
        (post(r#"{"id":1}"#), Status::BadRequest),
        (
            b"GET /rpc HTTP/1.1\r\nHost: localhost\r\n\r\n".to_vec(),
            Status::MethodNotAllowed,
        ),
    ];

    for (raw, status) in test_cases {
        let res = roundtrip(&raw);
        assert_eq!(res.status, status, "Failed for: {status}");
        assert_eq!(
            res.headers.get(Header::ContentType),
            Some("text/plain; charset=utf-8"),
            "Failed for: {status}"
        );
    }
}

#[test]
fn test_incomplete() {
    let res = Request::from_bytes(b"POST /rpc HTTP/1.1\r\nHost: loc");
    let err = res.unwrap_err();
    assert_eq!(err.status(), Status::BadRequest);
}

#[test]
fn test_xml_post() {
    let body = "<?xml version='1.0'?>\n<methodCall>\n\
        <methodName>math.div</methodName>\n<params>\n\
        <param><value><int>7</int></value></param>\n\
        <param><value><i4>2</i4></value></param>\n\
        </params>\n</methodCall>\n";
    let raw = format!(
        "POST /xmlrpc HTTP/1.1\r\nHost: localhost\r\n\
         Content-Type: text/xml\r\nContent-Length: {}\r\n\r\n{body}",
        body.len()
    );
    let req = Request::from_bytes(raw.as_bytes()).unwrap();
    let res = xml_rpc().handle(req);
    assert_eq!(res.status, Status::Ok);
    assert_eq!(res.headers.get(Header::ContentType), Some("text/xml"));

    // Serialize response as it would be written to the socket
    let bytes = res.into_bytes();
    let expected = write_response(&json!(3), false).unwrap();
    assert!(bytes.starts_with(b"HTTP/1.1 200 OK\r\n"));
    assert!(bytes.ends_with(expected.as_bytes()));
}
