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

//! JSON-RPC messages.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::error::{Error, Result};
use super::fault::Fault;

// ----------------------------------------------------------------------------
// Structs
// ----------------------------------------------------------------------------

/// JSON-RPC request.
///
/// A request is an object with an `id` of any type, which is echoed back
/// verbatim, a `method` name and an optional array of positional `params`.
/// Unknown members are ignored.
#[derive(Clone, Debug, PartialEq)]
pub struct RpcRequest {
    /// Request identifier.
    pub id: Value,
    /// Method name.
    pub method: String,
    /// Positional parameters.
    pub params: Vec<Value>,
}

/// JSON-RPC response.
///
/// Exactly one of `result` and `error` carries information: on failure, the
/// result is `null`, on success, the error is.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RpcResponse {
    /// Method result.
    pub result: Value,
    /// Method fault.
    pub error: Option<RpcError>,
    /// Request identifier.
    pub id: Value,
}

/// JSON-RPC response error.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RpcError {
    /// Error code, always `0`.
    pub code: i64,
    /// Error message.
    pub message: String,
}

// ----------------------------------------------------------------------------
// Implementations
// ----------------------------------------------------------------------------

impl RpcResponse {
    /// Creates a response for the given request identifier and outcome.
    #[must_use]
    pub fn new(id: Value, outcome: std::result::Result<Value, Fault>) -> Self {
        match outcome {
            Ok(result) => Self { result, error: None, id },
            Err(fault) => Self {
                result: Value::Null,
                error: Some(RpcError::from(fault)),
                id,
            },
        }
    }
}

// ----------------------------------------------------------------------------
// Trait implementations
// ----------------------------------------------------------------------------

impl TryFrom<Value> for RpcRequest {
    type Error = Error;

    /// Attempts to create a request from a decoded body.
    ///
    /// # Errors
    ///
    /// This method returns [`Error::Request`] if the body is not an object,
    /// lacks `id` or `method`, or if `method` or `params` have the wrong type.
    fn try_from(value: Value) -> Result<Self> {
        let Value::Object(mut map) = value else {
            return Err(invalid("request", &value));
        };

        // Identifier is mandatory, but may be of any type, even null
        let id = take(&mut map, "id")?;
        let method = match take(&mut map, "method")? {
            Value::String(method) => method,
            value => return Err(invalid("method", &value)),
        };

        // Parameters are optional, but must be an array if present
        let params = match map.remove("params") {
            None => Vec::new(),
            Some(Value::Array(params)) => params,
            Some(value) => return Err(invalid("params", &value)),
        };
        Ok(Self { id, method, params })
    }
}

impl From<Fault> for RpcError {
    #[inline]
    fn from(fault: Fault) -> Self {
        Self { code: 0, message: fault.to_string() }
    }
}

// ----------------------------------------------------------------------------
// Functions
// ----------------------------------------------------------------------------

/// Removes the given member from the map, failing if it's missing.
fn take(map: &mut Map<String, Value>, key: &str) -> Result<Value> {
    map.remove(key)
        .ok_or_else(|| Error::Request(format!("missing {key}")))
}

/// Creates an error for a member of unexpected type.
fn invalid(key: &str, value: &Value) -> Error {
    let kind = match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    };
    Error::Request(format!("invalid {key} type: {kind}"))
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_request() {
        let test_cases = vec![
            (json!({ "id": 1, "method": "foo" }), json!(1), vec![]),
            (json!({ "id": null, "method": "foo" }), Value::Null, vec![]),
            (
                json!({
                    "id": "a",
                    "method": "foo",
                    "params": [1, "x"],
                    "extra": 0
                }),
                json!("a"),
                vec![json!(1), json!("x")],
            ),
        ];

        for (value, id, params) in test_cases {
            let req = RpcRequest::try_from(value.clone()).unwrap();
            assert_eq!(req.id, id, "Failed for: {value}");
            assert_eq!(req.method, "foo", "Failed for: {value}");
            assert_eq!(req.params, params, "Failed for: {value}");
        }
    }

    #[test]
    fn test_request_invalid() {
        let test_cases = vec![
            (json!([1, "foo"]), "invalid request type: array"),
            (json!({ "method": "foo" }), "missing id"),
            (json!({ "id": 1 }), "missing method"),
            (json!({ "id": 1, "method": 7 }), "invalid method type: number"),
            (
                json!({ "id": 1, "method": "foo", "params": { "a": 1 } }),
                "invalid params type: object",
            ),
            (
                json!({ "id": 1, "method": "foo", "params": null }),
                "invalid params type: null",
            ),
        ];

        for (value, expected) in test_cases {
            let err = RpcRequest::try_from(value.clone()).unwrap_err();
            assert!(
                matches!(&err, Error::Request(reason) if reason == expected),
                "Failed for: {value}"
            );
        }
    }

    #[test]
    fn test_response() {
        let res = RpcResponse::new(json!(1), Ok(json!("value")));
        assert_eq!(res.error, None);

        let fault = Fault::NotFound("bar".into());
        let res = RpcResponse::new(json!(2), Err(fault));
        assert_eq!(res.result, Value::Null);
        assert_eq!(
            res.error,
            Some(RpcError { code: 0, message: "method not found: bar".into() })
        );
    }
}
