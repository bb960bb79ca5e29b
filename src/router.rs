//! Two-tier request router.
//!
//! Routes are keyed by `(method, pattern)` and stored in two tiers: an exact
//! map for patterns without parameter segments, and an ordered list of
//! parameterized patterns per method. Resolution consults the exact tier
//! first, so `GET /users/me` wins over `GET /users/:id` no matter which was
//! registered first. Precedence is structural, not an accident of iteration
//! order.
//!
//! Build the table once at startup and hand it to the dispatcher; it is
//! immutable afterwards, so concurrent lookups need no synchronization.

use std::collections::HashMap;
use std::sync::Arc;

use http::{Method, StatusCode};

use crate::error::HttpError;
use crate::handler::{BoxedHandler, Handler};
use crate::matcher::match_path;
use crate::request::Request;
use crate::response::Response;

/// The application route table.
///
/// Registrations chain, and route groups from separate collaborators merge
/// into one table:
///
/// ```rust,no_run
/// # use tsuji::{HttpError, Request, Response, Router};
/// # async fn get_user(_: Request) -> Result<Response, HttpError> { Ok(Response::text("")) }
/// # async fn create_user(_: Request) -> Result<Response, HttpError> { Ok(Response::text("")) }
/// # fn health_routes() -> Router { Router::new() }
/// let table = Router::new()
///     .get("/users/:id", get_user)
///     .post("/users", create_user)
///     .merge(health_routes());
/// ```
pub struct Router {
    exact: HashMap<Method, HashMap<String, BoxedHandler>>,
    parameterized: HashMap<Method, Vec<(String, BoxedHandler)>>,
    not_found: BoxedHandler,
}

impl Router {
    pub fn new() -> Self {
        Self {
            exact: HashMap::new(),
            parameterized: HashMap::new(),
            not_found: route_not_found.into_boxed_handler(),
        }
    }

    /// Registers a handler for a method + pattern pair. Returns `self` so
    /// registrations chain.
    ///
    /// # Panics
    ///
    /// Panics if the `(method, pattern)` pair is already registered. Route
    /// tables are built once at startup; a duplicate is a wiring defect.
    pub fn on(mut self, method: Method, pattern: &str, handler: impl Handler) -> Self {
        let handler = handler.into_boxed_handler();
        if pattern.split('/').any(|segment| segment.starts_with(':')) {
            let routes = self.parameterized.entry(method.clone()).or_default();
            if routes.iter().any(|(existing, _)| existing == pattern) {
                panic!("duplicate route `{method} {pattern}`");
            }
            routes.push((pattern.to_owned(), handler));
        } else if self
            .exact
            .entry(method.clone())
            .or_default()
            .insert(pattern.to_owned(), handler)
            .is_some()
        {
            panic!("duplicate route `{method} {pattern}`");
        }
        self
    }

    pub fn get(self, pattern: &str, handler: impl Handler) -> Self {
        self.on(Method::GET, pattern, handler)
    }

    pub fn post(self, pattern: &str, handler: impl Handler) -> Self {
        self.on(Method::POST, pattern, handler)
    }

    pub fn put(self, pattern: &str, handler: impl Handler) -> Self {
        self.on(Method::PUT, pattern, handler)
    }

    pub fn patch(self, pattern: &str, handler: impl Handler) -> Self {
        self.on(Method::PATCH, pattern, handler)
    }

    pub fn delete(self, pattern: &str, handler: impl Handler) -> Self {
        self.on(Method::DELETE, pattern, handler)
    }

    /// Folds another router's routes into this one, keeping this one's
    /// fallback.
    ///
    /// # Panics
    ///
    /// Panics if the two tables share a `(method, pattern)` pair.
    pub fn merge(mut self, other: Router) -> Self {
        for (method, routes) in other.exact {
            for (pattern, handler) in routes {
                if self
                    .exact
                    .entry(method.clone())
                    .or_default()
                    .insert(pattern.clone(), handler)
                    .is_some()
                {
                    panic!("duplicate route `{method} {pattern}`");
                }
            }
        }
        for (method, routes) in other.parameterized {
            let own = self.parameterized.entry(method.clone()).or_default();
            for (pattern, handler) in routes {
                if own.iter().any(|(existing, _)| *existing == pattern) {
                    panic!("duplicate route `{method} {pattern}`");
                }
                own.push((pattern, handler));
            }
        }
        self
    }

    /// Resolves a request to a handler plus extracted parameters.
    ///
    /// Exact tier first, then the parameterized list in registration order,
    /// then the designated not-found handler. Resolution itself never fails.
    pub(crate) fn resolve(
        &self,
        method: &Method,
        path: &str,
    ) -> (BoxedHandler, HashMap<String, String>) {
        if let Some(handler) = self.exact.get(method).and_then(|routes| routes.get(path)) {
            return (Arc::clone(handler), HashMap::new());
        }

        if let Some(routes) = self.parameterized.get(method) {
            for (pattern, handler) in routes {
                if let Some(params) = match_path(pattern, path) {
                    return (Arc::clone(handler), params);
                }
            }
        }

        (Arc::clone(&self.not_found), HashMap::new())
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

/// The designated fallback for unresolved requests. Must never fail;
/// it is the floor the dispatcher stands on.
async fn route_not_found(_req: Request) -> Result<Response, HttpError> {
    Ok(Response::builder()
        .status(StatusCode::NOT_FOUND)
        .json(br#"{"message":"Route not found"}"#.to_vec()))
}
