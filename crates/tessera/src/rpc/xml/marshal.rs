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
//! XML-RPC marshalling.
//!
//! Calls are parsed into [`Value`]s, and results are written back the way
//! Python's `xmlrpclib` writes them. Types map as follows:
//!
//! - `int`, `i4` and `i8` are numbers, written as `int` within 32 bits
//! - `boolean` is a boolean, written as `1` or `0`
//! - `double` is a number with a fraction, written with `{:?}`
//! - `string`, `dateTime.iso8601` and untyped values are strings
//! - `base64` must decode to UTF-8 and becomes a string
//! - `nil` is null, written only if explicitly allowed
//! - `array` and `struct` are arrays and objects

use base64::prelude::*;
use quick_xml::Reader;
use quick_xml::escape::partial_escape;
use quick_xml::events::Event;
use serde_json::{Map, Number, Value};
use std::str;

use super::Fault;
use super::error::{Error, Result};

// ----------------------------------------------------------------------------
// Constants
// ----------------------------------------------------------------------------

/// XML declaration, as written by `xmlrpclib`.
const DECLARATION: &str = "<?xml version='1.0'?>\n";

// ----------------------------------------------------------------------------
// Structs
// ----------------------------------------------------------------------------

/// XML-RPC method call.
#[derive(Clone, Debug, PartialEq)]
pub struct Call {
    /// Method name, possibly a dotted path.
    pub method: String,
    /// Positional parameters.
    pub params: Vec<Value>,
}

/// Pull parser over the events of a document.
struct Parser<'a> {
    /// Event reader.
    reader: Reader<&'a [u8]>,
}

// ----------------------------------------------------------------------------
// Enums
// ----------------------------------------------------------------------------

/// Structural event, i.e. anything but text.
enum Tag {
    /// Start tag.
    Open(String),
    /// End tag.
    Close(String),
    /// End of input.
    Eof,
}

// ----------------------------------------------------------------------------
// Implementations
// ----------------------------------------------------------------------------

impl<'a> Parser<'a> {
    /// Creates a parser for the given document.
    fn new(input: &'a str) -> Self {
        let mut reader = Reader::from_str(input);
        reader.config_mut().expand_empty_elements = true;
        Self { reader }
    }

    /// Returns the next event.
    fn event(&mut self) -> Result<Event<'a>> {
        Ok(self.reader.read_event()?)
    }

    /// Returns the next tag, skipping whitespace, comments and declarations.
    fn tag(&mut self) -> Result<Tag> {
        loop {
            match self.event()? {
                Event::Start(start) => {
                    return Ok(Tag::Open(utf8(start.name().as_ref())?));
                }
                Event::End(end) => {
                    return Ok(Tag::Close(utf8(end.name().as_ref())?));
                }
                Event::Eof => return Ok(Tag::Eof),
                Event::Text(text) => {
                    if !text.unescape()?.trim().is_empty() {
                        return Err(Error::Unexpected("text".into()));
                    }
                }
                Event::CData(_) => {
                    return Err(Error::Unexpected("text".into()));
                }
                _ => {}
            }
        }
    }

    /// Consumes the start tag with the given name.
    fn open(&mut self, name: &str) -> Result {
        match self.tag()? {
            Tag::Open(tag) if tag == name => Ok(()),
            tag => Err(tag.unexpected()),
        }
    }

    /// Consumes the end tag with the given name.
    fn close(&mut self, name: &str) -> Result {
        match self.tag()? {
            Tag::Close(tag) if tag == name => Ok(()),
            tag => Err(tag.unexpected()),
        }
    }

    /// Consumes the end of input.
    fn finish(&mut self) -> Result {
        match self.tag()? {
            Tag::Eof => Ok(()),
            tag => Err(tag.unexpected()),
        }
    }

    /// Returns the text up to the end tag of the current element.
    fn text(&mut self) -> Result<String> {
        let mut buffer = String::new();
        loop {
            match self.event()? {
                Event::Text(text) => buffer.push_str(&text.unescape()?),
                Event::CData(data) => {
                    buffer.push_str(str::from_utf8(&data.into_inner())?);
                }
                Event::End(_) => return Ok(buffer),
                Event::Start(start) => {
                    let name = utf8(start.name().as_ref())?;
                    return Err(Tag::Open(name).unexpected());
                }
                Event::Eof => return Err(Tag::Eof.unexpected()),
                _ => {}
            }
        }
    }

    /// Returns the value after a consumed `<value>` start tag.
    fn value(&mut self) -> Result<Value> {
        let mut buffer = String::new();
        loop {
            match self.event()? {
                Event::Text(text) => buffer.push_str(&text.unescape()?),
                Event::CData(data) => {
                    buffer.push_str(str::from_utf8(&data.into_inner())?);
                }

                // Untyped values are strings
                Event::End(_) => return Ok(Value::String(buffer)),
                Event::Start(start) => {
                    if !buffer.trim().is_empty() {
                        return Err(Error::Unexpected("text".into()));
                    }
                    let kind = utf8(start.name().as_ref())?;
                    let value = self.typed(&kind)?;
                    self.close("value")?;
                    return Ok(value);
                }
                Event::Eof => return Err(Tag::Eof.unexpected()),
                _ => {}
            }
        }
    }

    /// Returns the value after a consumed start tag of the given type.
    fn typed(&mut self, kind: &str) -> Result<Value> {
        match kind {
            "int" | "i4" | "i8" => {
                let text = self.text()?;
                match text.trim().parse::<i64>() {
                    Ok(value) => Ok(Value::from(value)),
                    Err(_) => Err(invalid("int", text)),
                }
            }
            "boolean" => {
                let text = self.text()?;
                match text.trim() {
                    "0" => Ok(Value::Bool(false)),
                    "1" => Ok(Value::Bool(true)),
                    _ => Err(invalid("boolean", text)),
                }
            }
            "double" => {
                let text = self.text()?;
                text.trim()
                    .parse::<f64>()
                    .ok()
                    .and_then(Number::from_f64)
                    .map(Value::Number)
                    .ok_or_else(|| invalid("double", text))
            }
            "string" | "dateTime.iso8601" => Ok(Value::String(self.text()?)),
            "base64" => {
                let text = self.text()?;
                let data: String = text.split_whitespace().collect();
                BASE64_STANDARD
                    .decode(data)
                    .ok()
                    .and_then(|bytes| String::from_utf8(bytes).ok())
                    .map(Value::String)
                    .ok_or_else(|| invalid("base64", text))
            }
            "nil" => {
                self.close("nil")?;
                Ok(Value::Null)
            }
            "array" => self.array(),
            "struct" => self.object(),
            _ => Err(Tag::Open(kind.to_string()).unexpected()),
        }
    }

    /// Returns the array after a consumed `<array>` start tag.
    fn array(&mut self) -> Result<Value> {
        self.open("data")?;
        let mut values = Vec::new();
        loop {
            match self.tag()? {
                Tag::Open(tag) if tag == "value" => values.push(self.value()?),
                Tag::Close(tag) if tag == "data" => break,
                tag => return Err(tag.unexpected()),
            }
        }
        self.close("array")?;
        Ok(Value::Array(values))
    }

    /// Returns the object after a consumed `<struct>` start tag.
    fn object(&mut self) -> Result<Value> {
        let mut members = Map::new();
        loop {
            match self.tag()? {
                Tag::Open(tag) if tag == "member" => {
                    self.open("name")?;
                    let name = self.text()?;
                    self.open("value")?;
                    members.insert(name, self.value()?);
                    self.close("member")?;
                }
                Tag::Close(tag) if tag == "struct" => break,
                tag => return Err(tag.unexpected()),
            }
        }
        Ok(Value::Object(members))
    }
}

impl Tag {
    /// Returns the error for a tag that does not belong where it is.
    fn unexpected(self) -> Error {
        Error::Unexpected(match self {
            Tag::Open(name) => format!("element <{name}>"),
            Tag::Close(name) => format!("end tag </{name}>"),
            Tag::Eof => String::from("end of input"),
        })
    }
}

// ----------------------------------------------------------------------------
// Functions
// ----------------------------------------------------------------------------

/// Parses a method call.
///
/// # Errors
///
/// This function returns an error if the input is not UTF-8, not well-formed
/// XML, or not a method call with values of known types.
///
/// # Examples
///
/// ```
/// # use std::error::Error;
/// # fn main() -> Result<(), Box<dyn Error>> {
/// use serde_json::json;
/// use tessera::rpc::xml::parse_call;
///
/// // Parse method call
/// let call = parse_call(
///     b"<methodCall><methodName>add</methodName><params>\
///       <param><value><int>2</int></value></param>\
///       </params></methodCall>",
/// )?;
/// assert_eq!(call.method, "add");
/// assert_eq!(call.params, [json!(2)]);
/// # Ok(())
/// # }
/// ```
pub fn parse_call(input: &[u8]) -> Result<Call> {
    let mut parser = Parser::new(str::from_utf8(input)?);
    parser.open("methodCall")?;
    parser.open("methodName")?;
    let method = parser.text()?;

    // Parameters are optional
    let mut params = Vec::new();
    match parser.tag()? {
        Tag::Open(tag) if tag == "params" => {
            loop {
                match parser.tag()? {
                    Tag::Open(tag) if tag == "param" => {
                        parser.open("value")?;
                        params.push(parser.value()?);
                        parser.close("param")?;
                    }
                    Tag::Close(tag) if tag == "params" => break,
                    tag => return Err(tag.unexpected()),
                }
            }
            parser.close("methodCall")?;
        }
        Tag::Close(tag) if tag == "methodCall" => {}
        tag => return Err(tag.unexpected()),
    }
    parser.finish()?;
    Ok(Call { method, params })
}

/// Writes a method response carrying the given value.
///
/// # Errors
///
/// This function returns [`Error::None`] for nulls, unless `allow_none` is
/// set, and [`Error::Overflow`] for integers outside of the 32-bit range.
pub fn write_response(value: &Value, allow_none: bool) -> Result<String> {
    let mut buffer = String::from(DECLARATION);
    buffer.push_str("<methodResponse>\n<params>\n<param>\n");
    write_value(&mut buffer, value, allow_none)?;
    buffer.push_str("</param>\n</params>\n</methodResponse>\n");
    Ok(buffer)
}

/// Writes a method response carrying the given fault.
#[must_use]
pub fn write_fault(fault: &Fault) -> String {
    let mut buffer = String::from(DECLARATION);
    buffer.push_str("<methodResponse>\n<fault>\n<value><struct>\n");
    buffer.push_str("<member>\n<name>faultCode</name>\n");
    buffer.push_str(&format!("<value><int>{}</int></value>\n", fault.code));
    buffer.push_str("</member>\n<member>\n<name>faultString</name>\n");
    write_string(&mut buffer, &fault.message);
    buffer.push_str("</member>\n</struct></value>\n</fault>\n");
    buffer.push_str("</methodResponse>\n");
    buffer
}

/// Writes the given value.
fn write_value(buffer: &mut String, value: &Value, allow_none: bool) -> Result {
    match value {
        Value::Null if allow_none => buffer.push_str("<value><nil/></value>"),
        Value::Null => return Err(Error::None),
        Value::Bool(value) => {
            let value = if *value { "1" } else { "0" };
            buffer.push_str(&format!("<value><boolean>{value}</boolean>"));
            buffer.push_str("</value>\n");
        }
        Value::Number(number) => match number.as_f64() {
            Some(value) if number.is_f64() => {
                buffer.push_str(&format!("<value><double>{value:?}</double>"));
                buffer.push_str("</value>\n");
            }
            _ => {
                let value = number
                    .as_i64()
                    .and_then(|value| i32::try_from(value).ok())
                    .ok_or(Error::Overflow)?;
                buffer.push_str(&format!("<value><int>{value}</int>"));
                buffer.push_str("</value>\n");
            }
        },
        Value::String(value) => write_string(buffer, value),
        Value::Array(values) => {
            buffer.push_str("<value><array><data>\n");
            for value in values {
                write_value(buffer, value, allow_none)?;
            }
            buffer.push_str("</data></array></value>\n");
        }
        Value::Object(members) => {
            buffer.push_str("<value><struct>\n");
            for (name, value) in members {
                buffer.push_str("<member>\n<name>");
                buffer.push_str(&partial_escape(name.as_str()));
                buffer.push_str("</name>\n");
                write_value(buffer, value, allow_none)?;
                buffer.push_str("</member>\n");
            }
            buffer.push_str("</struct></value>\n");
        }
    }
    Ok(())
}

/// Writes the given string value, escaping `&`, `<` and `>`.
fn write_string(buffer: &mut String, value: &str) {
    buffer.push_str("<value><string>");
    buffer.push_str(&partial_escape(value));
    buffer.push_str("</string></value>\n");
}

/// Returns the given tag name as a string.
fn utf8(name: &[u8]) -> Result<String> {
    Ok(str::from_utf8(name)?.to_string())
}

/// Returns an invalid value error.
fn invalid(kind: &'static str, value: String) -> Error {
    Error::Invalid { kind, value }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn call(params: &str) -> String {
        format!(
            "<?xml version='1.0'?>\n<methodCall>\n\
             <methodName>test</methodName>\n<params>\n{params}</params>\n\
             </methodCall>\n"
        )
    }

    fn param(value: &str) -> String {
        format!("<param>\n<value>{value}</value>\n</param>\n")
    }

    #[test]
    fn test_parse_types() {
        let test_cases = vec![
            ("<int>42</int>", json!(42)),
            ("<i4>-7</i4>", json!(-7)),
            ("<i8> 8589934592 </i8>", json!(8_589_934_592_i64)),
            ("<boolean>1</boolean>", json!(true)),
            ("<boolean>0</boolean>", json!(false)),
            ("<double>1.5</double>", json!(1.5)),
            ("<string>a &amp; b</string>", json!("a & b")),
            ("<string/>", json!("")),
            ("<string>  padded </string>", json!("  padded ")),
            ("untyped", json!("untyped")),
            ("", json!("")),
            ("<![CDATA[<raw>]]>", json!("<raw>")),
            (
                "<dateTime.iso8601>20251019T10:00:00</dateTime.iso8601>",
                json!("20251019T10:00:00"),
            ),
            ("<base64>aGVs\nbG8=</base64>", json!("hello")),
            ("<nil/>", Value::Null),
            (
                "<array><data>\n<value><int>1</int></value>\n\
                 <value>x</value>\n</data></array>",
                json!([1, "x"]),
            ),
            ("<array><data/></array>", json!([])),
            (
                "<struct>\n<member>\n<name>a</name>\n\
                 <value><boolean>1</boolean></value>\n</member>\n\
                 </struct>",
                json!({ "a": true }),
            ),
        ];

        for (value, expected) in test_cases {
            let input = call(&param(value));
            let call = parse_call(input.as_bytes()).unwrap();
            assert_eq!(call.method, "test", "Failed for: {value}");
            assert_eq!(call.params, [expected], "Failed for: {value}");
        }
    }

    #[test]
    fn test_parse_without_params() {
        let input = b"<methodCall><methodName>a.b</methodName></methodCall>";
        let call = parse_call(input).unwrap();
        assert_eq!(call.method, "a.b");
        assert!(call.params.is_empty());
    }

    #[test]
    fn test_parse_errors() {
        let test_cases = vec![
            (b"".to_vec(), "unexpected end of input"),
            (
                b"\xff".to_vec(),
                "invalid utf-8 sequence of 1 bytes from index 0",
            ),
            (
                b"<methodResponse></methodResponse>".to_vec(),
                "unexpected element <methodResponse>",
            ),
            (
                call(&param("<int>x</int>")).into_bytes(),
                r#"invalid int value: "x""#,
            ),
            (
                call(&param("<boolean>2</boolean>")).into_bytes(),
                r#"invalid boolean value: "2""#,
            ),
            (
                call(&param("<double>nan</double>")).into_bytes(),
                r#"invalid double value: "nan""#,
            ),
            (
                call(&param("<base64>/w==</base64>")).into_bytes(),
                r#"invalid base64 value: "/w==""#,
            ),
            (
                call(&param("<float>1</float>")).into_bytes(),
                "unexpected element <float>",
            ),
            (
                call(&param("x<int>1</int>")).into_bytes(),
                "unexpected text",
            ),
        ];

        for (input, expected) in test_cases {
            let err = parse_call(&input).unwrap_err();
            assert_eq!(err.to_string(), expected, "Failed for: {expected}");
        }
    }

    #[test]
    fn test_parse_malformed() {
        let input = call(&param("<int>1</i4>"));
        let err = parse_call(input.as_bytes()).unwrap_err();
        assert!(matches!(err, Error::Xml(_)));
    }

    #[test]
    fn test_write_response() {
        let value = json!({ "a": [1, 2.5, true], "b": "<x>" });
        let expected = "<?xml version='1.0'?>\n\
            <methodResponse>\n<params>\n<param>\n\
            <value><struct>\n\
            <member>\n<name>a</name>\n<value><array><data>\n\
            <value><int>1</int></value>\n\
            <value><double>2.5</double></value>\n\
            <value><boolean>1</boolean></value>\n\
            </data></array></value>\n</member>\n\
            <member>\n<name>b</name>\n\
            <value><string>&lt;x&gt;</string></value>\n</member>\n\
            </struct></value>\n\
            </param>\n</params>\n</methodResponse>\n";
        assert_eq!(write_response(&value, false).unwrap(), expected);
    }

    #[test]
    fn test_write_none() {
        let err = write_response(&Value::Null, false).unwrap_err();
        assert!(matches!(err, Error::None));
        let res = write_response(&json!([null]), true).unwrap();
        assert!(res.contains("<value><array><data>\n<value><nil/></value>"));
    }

    #[test]
    fn test_write_overflow() {
        for value in [json!(2_147_483_648_i64), json!(u64::MAX)] {
            let err = write_response(&value, false).unwrap_err();
            assert!(matches!(err, Error::Overflow), "Failed for: {value}");
        }
        assert!(write_response(&json!(i32::MIN), false).is_ok());
    }

    #[test]
    fn test_write_fault() {
        let fault = Fault::new(Fault::NOT_FOUND, "function a&b not found");
        let expected = "<?xml version='1.0'?>\n\
            <methodResponse>\n<fault>\n<value><struct>\n\
            <member>\n<name>faultCode</name>\n\
            <value><int>8001</int></value>\n</member>\n\
            <member>\n<name>faultString</name>\n\
            <value><string>function a&amp;b not found</string></value>\n\
            </member>\n</struct></value>\n</fault>\n</methodResponse>\n";
        assert_eq!(write_fault(&fault), expected);
    }
}
