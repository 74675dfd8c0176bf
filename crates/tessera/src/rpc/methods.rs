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

//! JSON-RPC methods.

use ahash::AHashMap;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt;

use super::fault::Fault;

// ----------------------------------------------------------------------------
// Traits
// ----------------------------------------------------------------------------

/// Set of methods callable over JSON-RPC or XML-RPC.
///
/// Implementors resolve a method name and invoke the method with positional
/// parameters. Unknown names must be answered with [`Fault::NotFound`].
pub trait Methods {
    /// Invokes the method with the given name and parameters.
    ///
    /// # Errors
    ///
    /// This method returns a [`Fault`] if the method does not exist or fails.
    fn invoke(&self, name: &str, params: Vec<Value>) -> Result<Value, Fault>;
}

// ----------------------------------------------------------------------------
// Structs
// ----------------------------------------------------------------------------

/// Method table.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use tessera::rpc::{MethodTable, Methods};
///
/// // Create method table
/// let methods = MethodTable::new()
///     .method("ping", |_| Ok("pong"))
///     .typed("add", |(a, b): (i64, i64)| Ok(a + b));
///
/// // Invoke method
/// let value = methods.invoke("add", vec![json!(1), json!(2)]);
/// assert_eq!(value, Ok(json!(3)));
/// ```
#[derive(Default)]
pub struct MethodTable {
    /// Methods by name.
    methods: AHashMap<String, Box<Method>>,
}

// ----------------------------------------------------------------------------
// Implementations
// ----------------------------------------------------------------------------

impl MethodTable {
    /// Creates an empty method table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a method taking raw positional parameters.
    ///
    /// Registering a name again replaces the previous method.
    #[must_use]
    pub fn method<F, R>(mut self, name: &str, f: F) -> Self
    where
        F: Fn(Vec<Value>) -> Result<R, Fault> + Send + Sync + 'static,
        R: Serialize,
    {
        let method = move |params: Vec<Value>| -> Result<Value, Fault> {
            let value = f(params)?;
            serde_json::to_value(value).map_err(Fault::from)
        };
        self.methods.insert(name.to_string(), Box::new(method));
        self
    }

    /// Registers a method taking typed parameters.
    ///
    /// The positional parameters are deserialized as a whole, usually into a
    /// tuple, so their number and types are checked before the method runs.
    #[must_use]
    pub fn typed<F, T, R>(self, name: &str, f: F) -> Self
    where
        F: Fn(T) -> Result<R, Fault> + Send + Sync + 'static,
        T: DeserializeOwned,
        R: Serialize,
    {
        self.method(name, move |params| {
            let args = serde_json::from_value(Value::Array(params));
            f(args.map_err(|err| {
                Fault::failure(format!("invalid params: {err}"))
            })?)
        })
    }

    /// Returns whether a method with the given name is registered.
    #[inline]
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.methods.contains_key(name)
    }
}

#[allow(clippy::must_use_candidate)]
impl MethodTable {
    /// Returns the number of methods.
    #[inline]
    pub fn len(&self) -> usize {
        self.methods.len()
    }

    /// Returns whether there are any methods.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }
}

// ----------------------------------------------------------------------------
// Trait implementations
// ----------------------------------------------------------------------------

impl Methods for MethodTable {
    fn invoke(&self, name: &str, params: Vec<Value>) -> Result<Value, Fault> {
        match self.methods.get(name) {
            Some(method) => method(params),
            None => Err(Fault::NotFound(name.to_string())),
        }
    }
}

// ----------------------------------------------------------------------------

impl fmt::Debug for MethodTable {
    /// Formats the method table for debugging.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.methods.keys().collect();
        names.sort();
        f.debug_struct("MethodTable")
            .field("methods", &names)
            .finish()
    }
}

// ----------------------------------------------------------------------------
// Blanket implementations
// ----------------------------------------------------------------------------

impl<F> Methods for F
where
    F: Fn(&str, Vec<Value>) -> Result<Value, Fault>,
{
    #[inline]
    fn invoke(&self, name: &str, params: Vec<Value>) -> Result<Value, Fault> {
        self(name, params)
    }
}

// ----------------------------------------------------------------------------
// Type aliases
// ----------------------------------------------------------------------------

/// Type-erased method.
type Method = dyn Fn(Vec<Value>) -> Result<Value, Fault> + Send + Sync;

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn methods() -> MethodTable {
        MethodTable::new()
            .method("foo", |_| Ok("value"))
            .method("count", |params| Ok(params.len()))
            .typed("echo", |(text,): (String,)| Ok(text))
            .typed("sort", |(mut items,): (Vec<i64>,)| {
                items.sort_unstable();
                Ok(items)
            })
    }

    #[test]
    fn test_invoke() {
        let methods = methods();
        let test_cases = vec![
            ("foo", vec![], json!("value")),
            ("count", vec![json!(1), json!(null)], json!(2)),
            ("echo", vec![json!("hi")], json!("hi")),
            ("sort", vec![json!([3, 1, 2])], json!([1, 2, 3])),
        ];

        for (name, params, expected) in test_cases {
            let outcome = methods.invoke(name, params);
            assert_eq!(outcome, Ok(expected), "Failed for: {name}");
        }
    }

    #[test]
    fn test_not_found() {
        let fault = methods().invoke("bar", vec![]).unwrap_err();
        assert_eq!(fault, Fault::NotFound("bar".into()));
        assert_eq!(fault.to_string(), "method not found: bar");
    }

    #[test]
    fn test_invalid_params() {
        let methods = methods();
        let test_cases = vec![
            ("echo", vec![]),
            ("echo", vec![json!("a"), json!("b")]),
            ("echo", vec![json!(1)]),
            ("sort", vec![json!(["x"])]),
        ];

        for (name, params) in test_cases {
            let fault = methods.invoke(name, params).unwrap_err();
            assert!(
                fault.to_string().starts_with("invalid params: "),
                "Failed for: {name}"
            );
        }
    }

    #[test]
    fn test_error_conversion() {
        let methods = MethodTable::new().typed("parse", |(text,): (String,)| {
            let value: i64 = text.parse()?;
            Ok(value)
        });
        let fault = methods.invoke("parse", vec![json!("x")]).unwrap_err();
        assert_eq!(fault, Fault::failure("invalid digit found in string"));
    }

    #[test]
    fn test_replace() {
        let methods = MethodTable::new()
            .method("foo", |_| Ok(1))
            .method("foo", |_| Ok(2));
        assert_eq!(methods.len(), 1);
        assert_eq!(methods.invoke("foo", vec![]), Ok(json!(2)));
    }

    #[test]
    fn test_closure() {
        let methods =
            |name: &str, _: Vec<Value>| -> Result<Value, Fault> {
                Ok(json!(name))
            };
        assert_eq!(methods.invoke("abc", vec![]), Ok(json!("abc")));
    }
}
