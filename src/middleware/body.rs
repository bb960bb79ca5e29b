//! Body-reading middleware.

use http_body_util::BodyExt;
use serde_json::Value;

use super::{Next, Step, StepFuture};
use crate::error::HttpError;
use crate::request::Request;

/// Reads the request byte stream to completion and attaches the parsed JSON
/// value to the request before the chain proceeds.
///
/// An empty body parses to `{}`. A body that is not valid JSON fails the
/// request with `400 BadRequestException` / `Invalid JSON body`; a transport
/// failure while reading propagates unchanged. In both failure cases nothing
/// downstream runs.
#[derive(Clone, Copy, Debug, Default)]
pub struct BodyReader;

impl BodyReader {
    pub fn new() -> Self {
        Self
    }
}

impl Step for BodyReader {
    fn call<'a>(&'a self, mut req: Request, next: Next<'a>) -> StepFuture<'a> {
        Box::pin(async move {
            let bytes = req.take_stream().collect().await?.to_bytes();

            let body = if bytes.is_empty() {
                Value::Object(serde_json::Map::new())
            } else {
                serde_json::from_slice(&bytes)
                    .map_err(|_| HttpError::bad_request("Invalid JSON body"))?
            };

            req.set_body(body);
            next.run(req).await
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::pin::Pin;
    use std::sync::{Arc, Mutex};
    use std::task::{Context, Poll};

    use bytes::Bytes;
    use http::{HeaderMap, Method, StatusCode};

    use crate::error::Error;
    use crate::handler::{BoxedHandler, Handler};
    use crate::middleware::Chain;
    use crate::response::Response;

    /// Terminal that stashes the request body the chain delivered.
    fn capture(slot: &Arc<Mutex<Option<Value>>>) -> BoxedHandler {
        let slot = Arc::clone(slot);
        (move |req: Request| {
            let slot = Arc::clone(&slot);
            async move {
                *slot.lock().unwrap() = req.body().cloned();
                Ok::<_, HttpError>(Response::status(StatusCode::NO_CONTENT))
            }
        })
        .into_boxed_handler()
    }

    fn reader_chain() -> Chain {
        let mut chain = Chain::new();
        chain.push(BodyReader::new());
        chain
    }

    #[tokio::test]
    async fn parsed_body_round_trips() {
        let slot = Arc::new(Mutex::new(None));
        let req = Request::test_with_body(Method::POST, "/users", br#"{"name":"alice","tags":[1,2]}"#);

        reader_chain().run(req, capture(&slot)).await.unwrap();

        assert_eq!(
            slot.lock().unwrap().take().unwrap(),
            serde_json::json!({"name": "alice", "tags": [1, 2]}),
        );
    }

    #[tokio::test]
    async fn empty_body_parses_to_an_empty_object() {
        let slot = Arc::new(Mutex::new(None));
        let req = Request::test(Method::POST, "/users");

        reader_chain().run(req, capture(&slot)).await.unwrap();

        assert_eq!(slot.lock().unwrap().take().unwrap(), serde_json::json!({}));
    }

    #[tokio::test]
    async fn malformed_json_fails_without_proceeding() {
        let slot = Arc::new(Mutex::new(None));
        let req = Request::test_with_body(Method::POST, "/users", b"{not json");

        let err = reader_chain().run(req, capture(&slot)).await.unwrap_err();

        let Error::Http(http_err) = err else {
            panic!("expected a classified error");
        };
        assert_eq!(http_err.status_code(), 400);
        assert_eq!(http_err.kind(), "BadRequestException");
        assert_eq!(http_err.message(), "Invalid JSON body");
        assert!(slot.lock().unwrap().is_none());
    }

    /// A stream that fails mid-read, the way a dropped connection does.
    struct FailingStream;

    impl hyper::body::Body for FailingStream {
        type Data = Bytes;
        type Error = Error;

        fn poll_frame(
            self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
        ) -> Poll<Option<Result<hyper::body::Frame<Bytes>, Error>>> {
            Poll::Ready(Some(Err(Error::Io(std::io::Error::other("connection reset")))))
        }
    }

    #[tokio::test]
    async fn transport_failure_propagates_without_proceeding() {
        let slot = Arc::new(Mutex::new(None));
        let req = Request::new(
            Method::POST,
            "/users",
            HeaderMap::new(),
            FailingStream.boxed_unsync(),
        );

        let err = reader_chain().run(req, capture(&slot)).await.unwrap_err();

        assert!(matches!(err, Error::Io(_)));
        assert!(slot.lock().unwrap().is_none());
    }
}
