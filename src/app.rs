//! The dispatcher: the composition root.
//!
//! An [`App`] is a middleware chain whose terminal position resolves the
//! route table and invokes the matched handler. [`App::handle`] is total: any
//! error escaping the chain or the handler crosses the error boundary exactly
//! once and comes back as a response. Nothing below this point writes a
//! failure to the wire.

use std::sync::Arc;

use crate::exception;
use crate::handler::{BoxFuture, BoxedHandler, ErasedHandler};
use crate::middleware::{Chain, Step};
use crate::request::Request;
use crate::response::Response;
use crate::router::Router;

/// An application: an ordered middleware chain ending in route resolution.
///
/// Build one at startup and hand it to [`Server::serve`](crate::Server::serve),
/// which shares it across connection tasks.
///
/// ```rust,no_run
/// use tsuji::middleware::{BodyReader, Trace};
/// use tsuji::{App, Router};
///
/// let app = App::new(Router::new())
///     .with(Trace::new())
///     .with(BodyReader::new());
/// ```
pub struct App {
    chain: Chain,
    terminal: BoxedHandler,
}

impl App {
    pub fn new(router: Router) -> Self {
        Self {
            chain: Chain::new(),
            terminal: Arc::new(RouteDispatch { router }),
        }
    }

    /// Appends a middleware step. Steps run in registration order, before
    /// the matched handler.
    #[must_use]
    pub fn with(mut self, step: impl Step) -> Self {
        self.chain.push(step);
        self
    }

    /// Handles one request to completion.
    pub async fn handle(&self, req: Request) -> Response {
        match self.chain.run(req, Arc::clone(&self.terminal)).await {
            Ok(response) => response,
            Err(error) => exception::translate(&error),
        }
    }
}

/// The chain's terminal position: resolve the route table, attach the
/// extracted parameters, invoke the handler.
struct RouteDispatch {
    router: Router,
}

impl ErasedHandler for RouteDispatch {
    fn call(&self, mut req: Request) -> BoxFuture {
        let (handler, params) = self.router.resolve(req.method(), req.path());
        req.set_params(params);
        handler.call(req)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use http::{Method, StatusCode};
    use serde_json::{Value, json};

    use crate::error::HttpError;
    use crate::middleware::BodyReader;

    fn users_app() -> App {
        let router = Router::new()
            .get("/users/:id", |req: Request| async move {
                let id = req.param("id").unwrap_or_default().to_owned();
                if id == "0" {
                    return Err(HttpError::not_found("User not found")
                        .with_context(json!({"id": id})));
                }
                Ok(Response::json(serde_json::to_vec(&json!({"id": id})).unwrap()))
            })
            .get("/users/me", |_req: Request| async {
                Ok::<_, HttpError>(Response::json(br#"{"id":"me"}"#.to_vec()))
            })
            .post("/users", |req: Request| async move {
                let body = req.body().cloned().unwrap_or(Value::Null);
                Ok::<_, HttpError>(
                    Response::builder()
                        .status(StatusCode::CREATED)
                        .json(serde_json::to_vec(&body).unwrap()),
                )
            })
            .get("/boom", |_req: Request| async {
                Err::<Response, _>(std::io::Error::other("handler blew up"))
            });

        App::new(router).with(BodyReader::new())
    }

    fn body_json(response: &Response) -> Value {
        serde_json::from_slice(response.body()).unwrap()
    }

    #[tokio::test]
    async fn unregistered_routes_answer_the_default_404() {
        let response = users_app().handle(Request::test(Method::GET, "/nope")).await;
        assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(&response), json!({"message": "Route not found"}));
    }

    #[tokio::test]
    async fn exact_routes_beat_parameterized_ones() {
        let response = users_app().handle(Request::test(Method::GET, "/users/me")).await;
        assert_eq!(response.status_code(), StatusCode::OK);
        assert_eq!(body_json(&response), json!({"id": "me"}));
    }

    #[tokio::test]
    async fn parameterized_routes_bind_their_segments() {
        let response = users_app().handle(Request::test(Method::GET, "/users/42")).await;
        assert_eq!(body_json(&response), json!({"id": "42"}));
    }

    #[tokio::test]
    async fn classified_handler_errors_serialize_in_full() {
        let response = users_app().handle(Request::test(Method::GET, "/users/0")).await;
        assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            body_json(&response),
            json!({
                "name": "NotFoundException",
                "statusCode": 404,
                "message": "User not found",
                "context": {"id": "0"},
            }),
        );
    }

    #[tokio::test]
    async fn unclassified_handler_errors_render_opaque() {
        let response = users_app().handle(Request::test(Method::GET, "/boom")).await;
        assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_json(&response), json!({"message": "Internal Server Error"}));
    }

    #[tokio::test]
    async fn posted_bodies_reach_the_handler_parsed() {
        let req = Request::test_with_body(Method::POST, "/users", br#"{"name":"alice"}"#);
        let response = users_app().handle(req).await;
        assert_eq!(response.status_code(), StatusCode::CREATED);
        assert_eq!(body_json(&response), json!({"name": "alice"}));
    }

    #[tokio::test]
    async fn malformed_bodies_answer_400_before_any_handler() {
        let req = Request::test_with_body(Method::POST, "/users", b"not json");
        let response = users_app().handle(req).await;
        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

        let body = body_json(&response);
        assert_eq!(body["name"], "BadRequestException");
        assert_eq!(body["statusCode"], 400);
        assert_eq!(body["message"], "Invalid JSON body");
    }
}
