//! # tsuji
//!
//! A minimal HTTP server toolkit. Three pieces do the real work; everything
//! else stays out of the way:
//!
//! - **Routing** — `(method, pattern)` pairs with `:name` parameter segments,
//!   stored in two tiers so an exact pattern always beats a parameterized one
//!   (`GET /users/me` wins over `GET /users/:id`, whatever the registration
//!   order). Unresolved requests get a structured 404, never an error.
//! - **Middleware** — an ordered chain of async [`middleware::Step`]s ahead
//!   of the matched handler. Each step gets an explicit continuation and may
//!   proceed, short-circuit with its own response, or fail; advancing the
//!   chain twice from one step is detected and surfaced, not ignored.
//! - **One error boundary** — handlers and steps return typed errors, and a
//!   single translator at the dispatcher turns them into responses:
//!   classified 4xx errors echo their full detail, everything else crosses
//!   the wire as an opaque 500 while the raw error goes to the log.
//!
//! What tsuji intentionally leaves to collaborators: entity validation,
//! persistence, use-case orchestration. Handlers are plain async functions;
//! wire your domain up behind them.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use tsuji::middleware::{BodyReader, Trace};
//! use tsuji::{App, HttpError, Request, Response, Router, Server, health};
//!
//! #[tokio::main]
//! async fn main() {
//!     let router = Router::new()
//!         .get("/users/:id", get_user)
//!         .get("/healthz", health::liveness);
//!
//!     let app = App::new(router)
//!         .with(Trace::new())
//!         .with(BodyReader::new());
//!
//!     Server::bind("0.0.0.0:3000").serve(app).await.expect("server error");
//! }
//!
//! async fn get_user(req: Request) -> Result<Response, HttpError> {
//!     let id = req.param("id").ok_or_else(|| HttpError::not_found("User not found"))?;
//!     Ok(Response::json(format!(r#"{{"id":"{id}"}}"#).into_bytes()))
//! }
//! ```

mod app;
mod error;
mod exception;
mod handler;
mod matcher;
mod request;
mod response;
mod router;
mod server;

pub mod health;
pub mod middleware;

pub use app::App;
pub use error::{Error, HttpError};
pub use handler::Handler;
pub use http::{Method, StatusCode};
pub use matcher::match_path;
pub use request::Request;
pub use response::{IntoResponse, Response, ResponseBuilder};
pub use router::Router;
pub use server::Server;
