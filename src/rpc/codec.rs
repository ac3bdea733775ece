//! XML-RPC message encoding.
//!
//! Requests are written directly as strings; responses are parsed with
//! `quick-xml` into a small element tree and then converted to [`Value`]s.
//!
//! # Value Encoding
//!
//! ```text
//! Int      <int>42</int>             Array   <array><data><value>..</value></data></array>
//! Bool     <boolean>1</boolean>      Struct  <struct><member><name>k</name><value>..</value></member></struct>
//! String   <string>x</string>        Nil     <nil/>
//! ```
//!
//! An untyped `<value>text</value>` decodes as a string.

use std::collections::BTreeMap;
use std::fmt::Write;

use quick_xml::escape::escape;
use quick_xml::events::Event;
use quick_xml::Reader;

use super::transport::RpcError;
use crate::value::Value;

/// Encode a `methodCall` document.
///
/// # Example
///
/// ```ignore
/// let body = encode_call("authenticate", &[Value::from("db"), Value::from("admin")]);
/// ```
pub fn encode_call(method: &str, params: &[Value]) -> String {
    let mut out = String::from("<?xml version=\"1.0\"?>\n<methodCall><methodName>");
    out.push_str(&escape(method));
    out.push_str("</methodName><params>");
    for param in params {
        out.push_str("<param>");
        write_value(&mut out, param);
        out.push_str("</param>");
    }
    out.push_str("</params></methodCall>\n");
    out
}

fn write_value(out: &mut String, value: &Value) {
    out.push_str("<value>");
    match value {
        Value::Nil => out.push_str("<nil/>"),
        Value::Bool(b) => {
            let _ = write!(out, "<boolean>{}</boolean>", u8::from(*b));
        }
        Value::Int(i) => {
            let _ = write!(out, "<int>{}</int>", i);
        }
        Value::Double(d) => {
            let _ = write!(out, "<double>{}</double>", d);
        }
        Value::String(s) => {
            let _ = write!(out, "<string>{}</string>", escape(s.as_str()));
        }
        Value::DateTime(s) => {
            let _ = write!(out, "<dateTime.iso8601>{}</dateTime.iso8601>", escape(s.as_str()));
        }
        Value::Base64(s) => {
            let _ = write!(out, "<base64>{}</base64>", escape(s.as_str()));
        }
        Value::Array(items) => {
            out.push_str("<array><data>");
            for item in items {
                write_value(out, item);
            }
            out.push_str("</data></array>");
        }
        Value::Struct(members) => {
            out.push_str("<struct>");
            for (name, member) in members {
                let _ = write!(out, "<member><name>{}</name>", escape(name.as_str()));
                write_value(out, member);
                out.push_str("</member>");
            }
            out.push_str("</struct>");
        }
    }
    out.push_str("</value>");
}

/// Decode a `methodResponse` document.
///
/// # Errors
///
/// - `RpcError::Fault` if the server answered with a `<fault>`
/// - `RpcError::Protocol` if the document is not well-formed XML-RPC
pub fn decode_response(body: &str) -> Result<Value, RpcError> {
    let root = parse_tree(body)?;
    if root.name != "methodResponse" {
        return Err(protocol(format!("expected <methodResponse>, found <{}>", root.name)));
    }

    if let Some(fault) = root.child("fault") {
        let value = decode_value(fault.required("value")?)?;
        return Err(fault_from_value(value));
    }

    let param = root.required("params")?.required("param")?;
    decode_value(param.required("value")?)
}

fn fault_from_value(value: Value) -> RpcError {
    let members = value.as_struct();
    let code = members
        .and_then(|m| m.get("faultCode"))
        .and_then(|c| match c {
            Value::Int(i) => Some(*i),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        })
        .unwrap_or_default();
    let message = members
        .and_then(|m| m.get("faultString"))
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    RpcError::Fault { code, message }
}

fn protocol(message: impl Into<String>) -> RpcError {
    RpcError::Protocol(message.into())
}

/// Deepest element nesting accepted in a response.
///
/// Each array or struct level costs three elements, so this allows
/// roughly 80 levels of nested data.
const MAX_DEPTH: usize = 256;

/// Minimal element tree: enough structure for XML-RPC, nothing more.
#[derive(Debug, Default)]
struct Node {
    name: String,
    text: String,
    children: Vec<Node>,
}

impl Node {
    fn child(&self, name: &str) -> Option<&Node> {
        self.children.iter().find(|c| c.name == name)
    }

    fn required(&self, name: &str) -> Result<&Node, RpcError> {
        self.child(name)
            .ok_or_else(|| protocol(format!("<{}> is missing <{}>", self.name, name)))
    }
}

fn parse_tree(body: &str) -> Result<Node, RpcError> {
    let mut reader = Reader::from_str(body);
    reader.config_mut().expand_empty_elements = true;

    let mut stack: Vec<Node> = Vec::new();
    let mut root: Option<Node> = None;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| protocol(format!("malformed XML at byte {}: {}", reader.buffer_position(), e)))?;

        match event {
            Event::Start(start) => {
                if root.is_some() {
                    return Err(protocol("trailing content after document element"));
                }
                if stack.len() >= MAX_DEPTH {
                    return Err(protocol(format!("elements nested deeper than {}", MAX_DEPTH)));
                }
                stack.push(Node {
                    name: String::from_utf8_lossy(start.local_name().as_ref()).into_owned(),
                    ..Node::default()
                });
            }
            Event::End(_) => {
                let node = stack
                    .pop()
                    .ok_or_else(|| protocol("unbalanced closing tag"))?;
                match stack.last_mut() {
                    Some(parent) => parent.children.push(node),
                    None => root = Some(node),
                }
            }
            Event::Text(text) => {
                if let Some(top) = stack.last_mut() {
                    let unescaped = text
                        .unescape()
                        .map_err(|e| protocol(format!("invalid text content: {}", e)))?;
                    top.text.push_str(&unescaped);
                }
            }
            Event::CData(cdata) => {
                if let Some(top) = stack.last_mut() {
                    top.text
                        .push_str(&String::from_utf8_lossy(&cdata.into_inner()));
                }
            }
            Event::Eof => break,
            // Declarations, comments, processing instructions
            _ => {}
        }
    }

    if !stack.is_empty() {
        return Err(protocol("unexpected end of document"));
    }
    root.ok_or_else(|| protocol("empty response body"))
}

fn decode_value(node: &Node) -> Result<Value, RpcError> {
    let typed = match node.children.as_slice() {
        [] => return Ok(Value::String(node.text.clone())),
        [typed] => typed,
        _ => return Err(protocol("<value> holds more than one element")),
    };

    let text = typed.text.as_str();
    match typed.name.as_str() {
        "int" | "i4" | "i8" => text
            .trim()
            .parse()
            .map(Value::Int)
            .map_err(|_| protocol(format!("invalid integer: {:?}", text))),
        "boolean" => match text.trim() {
            "1" | "true" => Ok(Value::Bool(true)),
            "0" | "false" => Ok(Value::Bool(false)),
            other => Err(protocol(format!("invalid boolean: {:?}", other))),
        },
        "double" => text
            .trim()
            .parse()
            .map(Value::Double)
            .map_err(|_| protocol(format!("invalid double: {:?}", text))),
        "string" => Ok(Value::String(text.to_string())),
        "nil" => Ok(Value::Nil),
        "dateTime.iso8601" => Ok(Value::DateTime(text.trim().to_string())),
        "base64" => Ok(Value::Base64(
            text.chars().filter(|c| !c.is_whitespace()).collect(),
        )),
        "array" => {
            let data = typed.required("data")?;
            data.children
                .iter()
                .filter(|c| c.name == "value")
                .map(decode_value)
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array)
        }
        "struct" => {
            let mut members = BTreeMap::new();
            for member in typed.children.iter().filter(|c| c.name == "member") {
                let name = member.required("name")?.text.clone();
                let value = decode_value(member.required("value")?)?;
                members.insert(name, value);
            }
            Ok(Value::Struct(members))
        }
        other => Err(protocol(format!("unsupported value type <{}>", other))),
    }
}
