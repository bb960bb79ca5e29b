//! Incoming HTTP request type.
//!
//! One `Request` is exclusively owned by the task handling it; it moves
//! through the middleware chain by value and ends up in the matched handler.

use std::collections::HashMap;

use bytes::Bytes;
use http::{HeaderMap, Method};
use http_body_util::combinators::UnsyncBoxBody;
use serde_json::Value;

use crate::error::Error;

/// The request byte stream as delivered by the transport. Consumed at most
/// once, by the body-reading middleware.
pub(crate) type BodyStream = UnsyncBoxBody<Bytes, Error>;

/// An incoming HTTP request.
pub struct Request {
    method: Method,
    path: String,
    headers: HeaderMap,
    params: HashMap<String, String>,
    stream: Option<BodyStream>,
    body: Option<Value>,
}

impl Request {
    pub(crate) fn new(
        method: Method,
        path: impl Into<String>,
        headers: HeaderMap,
        stream: BodyStream,
    ) -> Self {
        Self {
            method,
            path: path.into(),
            headers,
            params: HashMap::new(),
            stream: Some(stream),
            body: None,
        }
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    /// The request path, query string excluded.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Case-insensitive header lookup; `None` for absent or non-UTF-8 values.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }

    /// Returns a named path parameter, populated when a parameterized route
    /// matched. For a route `/users/:id`, `req.param("id")` on `/users/42`
    /// returns `Some("42")`.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// The structured body attached by the body-reading middleware; `None`
    /// until that step has run.
    pub fn body(&self) -> Option<&Value> {
        self.body.as_ref()
    }

    pub(crate) fn set_params(&mut self, params: HashMap<String, String>) {
        self.params = params;
    }

    pub(crate) fn set_body(&mut self, body: Value) {
        self.body = Some(body);
    }

    /// Takes the unconsumed byte stream. An already-consumed stream reads as
    /// empty.
    pub(crate) fn take_stream(&mut self) -> BodyStream {
        self.stream.take().unwrap_or_else(empty_stream)
    }
}

pub(crate) fn empty_stream() -> BodyStream {
    use http_body_util::{BodyExt, Empty};
    Empty::<Bytes>::new().map_err(|never| match never {}).boxed_unsync()
}

#[cfg(test)]
impl Request {
    pub(crate) fn test(method: Method, path: &str) -> Self {
        Self::new(method, path, HeaderMap::new(), empty_stream())
    }

    pub(crate) fn test_with_body(method: Method, path: &str, body: &[u8]) -> Self {
        use http_body_util::{BodyExt, Full};
        let stream = Full::new(Bytes::copy_from_slice(body))
            .map_err(|never| match never {})
            .boxed_unsync();
        Self::new(method, path, HeaderMap::new(), stream)
    }
}
